//! Error taxonomy for the rendering engine.
//!
//! Initialization errors are caught at the tier that attempted them and
//! converted into a fallback attempt; only exhaustion of all tiers reaches the
//! caller. Per-frame errors are logged and the frame is dropped so rendering
//! continues on the next trigger.

/// Rendering engine error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The requested graphics API or device could not be obtained.
    /// Triggers fallback to the next backend tier.
    BackendUnavailable(String),
    /// Shader compilation or pipeline validation failed.
    /// Fatal for the attempting backend; triggers fallback.
    ShaderCompile(String),
    /// Buffer or texture allocation failed. Fatal for the current frame only.
    ResourceExhaustion(String),
    /// The graphics device was lost (driver reset). The shared device cache
    /// is invalidated; the engine must be re-created against a fresh surface.
    DeviceLost,
    /// The render surface rejected the frame (outdated, misconfigured).
    Surface(String),
    /// Per-frame inputs failed validation.
    InvalidProps(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            Self::ShaderCompile(msg) => write!(f, "Shader compilation failed: {}", msg),
            Self::ResourceExhaustion(msg) => write!(f, "GPU resource exhaustion: {}", msg),
            Self::DeviceLost => write!(f, "Graphics device lost"),
            Self::Surface(msg) => write!(f, "Surface error: {}", msg),
            Self::InvalidProps(msg) => write!(f, "Invalid render props: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}
