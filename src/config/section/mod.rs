//! Settings file sections.

mod paths;
mod render;
mod serve;
mod sync;

pub use paths::PathsConfig;
pub use render::RenderConfig;
pub use serve::ServeConfig;
pub use sync::SyncConfig;
