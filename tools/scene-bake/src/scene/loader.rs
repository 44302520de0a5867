//! Scene loading

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::Scene;
use crate::error::{ImportError, Result};

/// Produces a [`Scene`] from a file on disk
pub trait SceneLoader {
    /// Extension probed when the literal path does not exist (no dot)
    fn extension(&self) -> &str;

    fn load(&self, path: &Path) -> Result<Scene>;
}

/// Loads scenes previously dumped as JSON
#[derive(Debug, Clone)]
pub struct JsonSceneLoader {
    extension: String,
}

impl JsonSceneLoader {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl Default for JsonSceneLoader {
    fn default() -> Self {
        Self::new("json")
    }
}

impl SceneLoader for JsonSceneLoader {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn load(&self, path: &Path) -> Result<Scene> {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ImportError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
