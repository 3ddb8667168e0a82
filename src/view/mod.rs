// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{CameraUniform, LightingUniform, SceneRenderer};
pub use gpu_init::GpuContext;
