//! Profiling utilities based on the `puffin` crate.
//!
//! With the `profiling` feature enabled, `profile_function!` and
//! `profile_scope!` record puffin scopes and [`init_profiling`] starts the
//! puffin HTTP server. Without the feature, the macros expand to nothing.

#[cfg(feature = "profiling")]
pub use puffin::{GlobalProfiler, profile_function, profile_scope};

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_function {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "profiling"))]
pub use crate::{profile_function, profile_scope};

#[cfg(feature = "profiling")]
mod server {
    use std::sync::OnceLock;

    /// Global profiling server instance.
    static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

    /// Enable puffin scopes and start the puffin server on the default port.
    pub fn init_profiling() {
        puffin::set_scopes_on(true);

        match puffin_http::Server::new("0.0.0.0:8585") {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        }
    }

    /// Mark the start of a new frame for profiling.
    #[inline]
    pub fn new_frame() {
        puffin::GlobalProfiler::lock().new_frame();
    }
}

#[cfg(feature = "profiling")]
pub use server::{init_profiling, new_frame};
