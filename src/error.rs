/// Errors raised while fetching or parsing the scene asset.
///
/// None of these reach the user: the walkthrough logs them and stays inert.
#[derive(thiserror::Error, Debug)]
pub enum SceneLoadError {
    /// Reading the asset from disk failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The browser fetch failed or returned a non-success status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The bytes are not a valid glTF/GLB document
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    /// The document has no scene to instantiate
    #[error("glTF document contains no scene")]
    NoScene,
}

/// Errors raised while bringing up the GPU surface.
#[derive(thiserror::Error, Debug)]
pub enum GpuInitError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}
