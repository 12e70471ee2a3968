//! Error types for lattice resolution and unit cell geometry.

use thiserror::Error;

/// Errors raised while resolving a lattice or querying a unit cell.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CrystalError {
    /// The raw lattice parameters are invalid or under-determined for the
    /// crystal system they were classified into.
    #[error("lattice error: {0}")]
    Lattice(String),

    /// The metric tensor (or a matrix derived from it) cannot be inverted,
    /// or its determinant is not positive.
    #[error("singular lattice: determinant {determinant} is not positive")]
    SingularLattice {
        /// Determinant of the offending matrix.
        determinant: f64,
    },

    /// A vector or coordinate had the wrong number of components.
    #[error("expected a {expected}-component vector, got {got} components")]
    Shape {
        /// Number of components required.
        expected: usize,
        /// Number of components supplied.
        got: usize,
    },

    /// A Miller-Bravais index whose third component is not -(h + k).
    #[error("Miller-Bravais index ({h} {k} {i} {l}) requires i = -(h + k)")]
    InconsistentBravaisIndex { h: i32, k: i32, i: i32, l: i32 },

    /// The (000) reflection has no d-spacing.
    #[error("Miller indices cannot all be zero")]
    ZeroIndices,

    /// A resolver configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration document could not be parsed or written.
    #[error("configuration serialization failed: {0}")]
    Config(#[from] serde_json::Error),
}

impl CrystalError {
    pub(crate) fn lattice(msg: impl Into<String>) -> Self {
        CrystalError::Lattice(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CrystalError>;
