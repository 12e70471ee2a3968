//! Unit cell geometry for crystallography.
//!
//! Partially specified lattice parameters are resolved into a complete cell
//! of a known lattice system ([`resolve`]), from which a [`UnitCell`] derives
//! the metric tensors, volumes, reciprocal lattice and coordinate transforms.
//!
//! ```no_run
//! use unitcell::{RawLatticeSpec, Space, UnitCell};
//!
//! let cell = UnitCell::new(&RawLatticeSpec::new(5.0).with_c(2.0).with_ga(120.0))?;
//! let d = cell.plane_dspacing(&[1.0, 0.0, 0.0])?;
//! let len = cell.vector_magnitude(&[1.0, 1.0, 0.0], Space::Direct)?;
//! # Ok::<(), unitcell::CrystalError>(())
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod physics;
pub mod utils;

pub use config::ResolverConfig;
pub use error::{CrystalError, Result};
pub use model::{
    CrystalSystem, MillerIndex, MillerPlane, PrincipalAxis, RawLatticeSpec, ReciprocalLattice,
    ResolvedLattice,
};
pub use physics::{resolve, resolve_with, Space, UnitCell};
