pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::EffectiveConfig;
pub use core::{
    engine::DeckEngine,
    pipeline::{LocalStorage, LyricsPipeline},
};
pub use utils::error::{DeckError, Result};
