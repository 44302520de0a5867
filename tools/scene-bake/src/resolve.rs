//! Input file resolution
//!
//! Strategies are tried in order. A strategy either names a scene file that
//! exists, hands back a finished model from another importer, or passes.

use std::path::{Path, PathBuf};

use model_common::Model;

use crate::content::ContentImporter;
use crate::error::{ImportError, Result};

/// Importer consulted when no scene file could be found
pub trait FallbackImporter {
    /// `Ok(None)` when this importer does not handle `path`
    fn import(&self, path: &Path, content: &mut dyn ContentImporter) -> Result<Option<Model>>;
}

impl<F> FallbackImporter for F
where
    F: Fn(&Path, &mut dyn ContentImporter) -> Result<Option<Model>>,
{
    fn import(&self, path: &Path, content: &mut dyn ContentImporter) -> Result<Option<Model>> {
        self(path, content)
    }
}

pub enum ResolveStrategy {
    /// The path exactly as given
    AsGiven,
    /// The path with an extension appended (no dot)
    WithExtension(String),
    /// Hand the path to another importer
    Delegate(Box<dyn FallbackImporter>),
}

impl std::fmt::Debug for ResolveStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveStrategy::AsGiven => write!(f, "AsGiven"),
            ResolveStrategy::WithExtension(ext) => write!(f, "WithExtension({ext:?})"),
            ResolveStrategy::Delegate(_) => write!(f, "Delegate(..)"),
        }
    }
}

/// Outcome of resolving an input path
#[derive(Debug)]
pub enum Resolved {
    /// A scene file to load
    Scene(PathBuf),
    /// A model produced by a fallback importer
    Model(Model),
}

/// `path` with `.ext` appended to the full file name
pub fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Try `strategies` in order
pub fn resolve(
    path: &Path,
    strategies: &[ResolveStrategy],
    content: &mut dyn ContentImporter,
) -> Result<Resolved> {
    for strategy in strategies {
        match strategy {
            ResolveStrategy::AsGiven => {
                if path.is_file() {
                    tracing::debug!("Resolved {} as given", path.display());
                    return Ok(Resolved::Scene(path.to_path_buf()));
                }
            }
            ResolveStrategy::WithExtension(ext) => {
                let candidate = with_extension(path, ext);
                if candidate.is_file() {
                    tracing::debug!("Resolved {} as {}", path.display(), candidate.display());
                    return Ok(Resolved::Scene(candidate));
                }
            }
            ResolveStrategy::Delegate(importer) => {
                if let Some(model) = importer.import(path, content)? {
                    tracing::debug!("Fallback importer handled {}", path.display());
                    return Ok(Resolved::Model(model));
                }
            }
        }
    }
    Err(ImportError::NotFound(path.to_path_buf()))
}
