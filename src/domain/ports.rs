use std::path::{Path, PathBuf};

use crate::domain::model::{Song, TransformResult};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    /// Regular files directly inside `dir`, sorted by path so every run sees
    /// the same order regardless of how the OS lists the directory.
    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Writes the full contents in one step: either the file appears complete
    /// under `path` or not at all, never half-written.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn source_dir(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn extensions(&self) -> &[String];
}

pub trait Pipeline: Send + Sync {
    fn extract(&self) -> Result<Vec<Song>>;
    fn transform(&self, songs: Vec<Song>) -> Result<TransformResult>;
    fn load(&self, result: TransformResult) -> Result<String>;
}
