//! Import error types
//!
//! Unsupported input is its own category: callers can tell "this scene uses
//! something the baker does not handle" apart from I/O and parse failures
//! via [`ImportError::is_unsupported`].

use std::path::PathBuf;

use crate::scene::{MappingMode, ReferenceMode, RotationOrder};

/// Attribute layer a mapping/reference combination was rejected for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Normals,
    TexCoords,
    Materials,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Normals => write!(f, "normal"),
            LayerKind::TexCoords => write!(f, "uv"),
            LayerKind::Materials => write!(f, "material"),
        }
    }
}

/// Scene content the baker refuses to approximate
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnsupportedInput {
    #[error("node '{node}' uses rotation order {order:?} (only Xyz is supported)")]
    RotationOrder { node: String, order: RotationOrder },

    #[error("mesh '{mesh}' has {count} skin deformers (at most 1 is supported)")]
    TooManyDeformers { mesh: String, count: usize },

    #[error("control point {control_point} of mesh '{mesh}' has more than {max} skin influences")]
    TooManyInfluences {
        mesh: String,
        control_point: usize,
        max: usize,
    },

    #[error("mesh '{mesh}' {layer} layer uses mapping {mapping:?} with reference {reference:?}")]
    LayerMode {
        mesh: String,
        layer: LayerKind,
        mapping: MappingMode,
        reference: ReferenceMode,
    },

    #[error("polygon {polygon} of mesh '{mesh}' has {count} vertices (at least 3 required)")]
    DegeneratePolygon {
        mesh: String,
        polygon: usize,
        count: usize,
    },

    #[error("mesh '{mesh}' needs {count} vertices (maximum is {max})")]
    TooManyVertices {
        mesh: String,
        count: usize,
        max: usize,
    },
}

/// Error type for a whole import call
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported input: {0}")]
    Unsupported(#[from] UnsupportedInput),

    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("malformed scene: {0}")]
    MalformedScene(String),

    #[error("content import failed: {0}")]
    Content(String),
}

impl ImportError {
    /// True for every fatal unsupported-input condition
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ImportError::Unsupported(_))
    }

    pub fn unsupported(&self) -> Option<&UnsupportedInput> {
        match self {
            ImportError::Unsupported(u) => Some(u),
            _ => None,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ImportError::MalformedScene(message.into())
    }
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
