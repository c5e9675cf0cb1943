use thiserror::Error;

/// Errors raised while turning a scene description into a `World`.
///
/// Rendering itself never fails; singular transforms are rejected with a
/// panic when they are assigned, and rays that miss produce black.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Reading a scene or model file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The scene file is not valid JSON for the scene schema.
    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),

    /// A shape entry named a kind this tracer does not know.
    #[error("unknown shape type '{0}'")]
    UnknownShape(String),

    /// A pattern entry named a kind this tracer does not know.
    #[error("unknown pattern type '{0}'")]
    UnknownPattern(String),

    /// A CSG entry named an operation other than union/intersection/difference.
    #[error("unknown CSG operation '{0}'")]
    UnknownCsgOperation(String),

    /// A shape entry is missing a field its kind requires.
    #[error("shape '{kind}' is missing field '{field}'")]
    MissingField {
        kind: String,
        field: &'static str,
    },

    /// A point, vector or color had the wrong number of components.
    #[error("expected {expected} components in '{field}', found {found}")]
    BadArity {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}

pub type Result<T> = std::result::Result<T, SceneError>;
