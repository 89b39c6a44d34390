use std::ops::Mul;

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }

    pub fn cast<U: From<T>>(self) -> Size<U> {
        Size {
            width: U::from(self.width),
            height: U::from(self.height),
        }
    }
}

impl Size<u32> {
    pub fn as_f32(self) -> Size<f32> {
        Size {
            width: self.width as f32,
            height: self.height as f32,
        }
    }
}

impl<T: Mul + Copy> Mul<T> for Size<T> {
    type Output = Size<<T as Mul>::Output>;

    fn mul(self, rhs: T) -> Self::Output {
        Size {
            width: self.width * rhs,
            height: self.height * rhs,
        }
    }
}

/// An x/y position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

impl<T> Pos<T> {
    pub fn new(x: T, y: T) -> Self {
        Pos { x, y }
    }
}

/// An axis-aligned rectangle (origin at top-left, y-down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl Rect<f32> {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Device pixel ratio between logical and physical pixels.
///
/// A scale factor of 2.0 means one logical pixel covers a 2x2 block of
/// physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(pub f32);

impl ScaleFactor {
    pub const IDENTITY: ScaleFactor = ScaleFactor(1.0);

    /// Convert a logical dimension to physical pixels.
    #[inline]
    pub fn to_physical(&self, logical: f32) -> f32 {
        logical * self.0
    }

    /// Convert a physical dimension to logical pixels.
    #[inline]
    pub fn to_logical(&self, physical: f32) -> f32 {
        physical / self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_scalar_mul() {
        let size = Size::new(800.0f32, 600.0) * 2.0;
        assert_eq!(size, Size::new(1600.0, 1200.0));
    }

    #[test]
    fn scale_factor_round_trip() {
        let dpr = ScaleFactor(2.0);
        assert_eq!(dpr.to_physical(100.0), 200.0);
        assert_eq!(dpr.to_logical(200.0), 100.0);
    }

    #[test]
    fn rect_edges() {
        let rect = Rect::new(10.0f32, 20.0, 100.0, 50.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
    }
}
