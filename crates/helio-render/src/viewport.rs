use helio_core::geometry::{ScaleFactor, Size};

/// The physical pixel area a chart draws into, plus its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Size in physical (device) pixels.
    pub size: Size<f32>,
    /// Ratio between logical and physical pixels.
    pub scale_factor: ScaleFactor,
}

impl Viewport {
    pub fn new(size: Size<f32>, scale_factor: ScaleFactor) -> Self {
        Self { size, scale_factor }
    }

    /// Viewport from a logical size and a device pixel ratio.
    pub fn from_logical(logical: Size<f32>, scale_factor: ScaleFactor) -> Self {
        Self {
            size: logical * scale_factor.0,
            scale_factor,
        }
    }

    /// Size in logical pixels.
    pub fn to_logical(&self) -> Size<f32> {
        Size::new(
            self.scale_factor.to_logical(self.size.width),
            self.scale_factor.to_logical(self.size.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_round_trip() {
        let viewport = Viewport::from_logical(Size::new(400.0, 300.0), ScaleFactor(2.0));
        assert_eq!(viewport.size, Size::new(800.0, 600.0));
        assert_eq!(viewport.to_logical(), Size::new(400.0, 300.0));
    }
}
