pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter("info,wgpu_core=warn,wgpu_hal=warn,naga=warn")
        .init();
}

/// Like [`init`], but does not panic if a global subscriber is already set.
///
/// Tests call this from multiple entry points.
pub fn try_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info,wgpu_core=warn,wgpu_hal=warn,naga=warn")
        .try_init();
}
