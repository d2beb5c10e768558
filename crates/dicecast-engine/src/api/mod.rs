pub mod config;
pub mod types;

pub use config::OverlayConfig;
pub use types::{DieKind, DisplayMode, RollEvent, RollEventError, Side};
