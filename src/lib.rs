pub mod error;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod time;

pub use error::RenderError;
pub use renderer::{Material, Renderer, RendererStats};
pub use scene::{Camera, Scene, World};
pub use settings::RenderSettings;
pub use time::Time;

pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
