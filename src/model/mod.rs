//src/model/mod.rs
pub mod lattice;
pub mod miller;

// Re-exports for cleaner imports
pub use lattice::{CrystalSystem, PrincipalAxis, RawLatticeSpec, ReciprocalLattice, ResolvedLattice};
pub use miller::{MillerIndex, MillerPlane};
