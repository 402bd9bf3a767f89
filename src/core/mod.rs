pub mod deriver;
pub mod engine;
pub mod pipeline;
pub mod renderer;

pub use crate::domain::model::{DerivedNote, Note, RenderedCard, Song, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
