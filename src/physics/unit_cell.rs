// src/physics/unit_cell.rs
//
// Derived geometry of a resolved lattice: metric tensors, volumes, the
// reciprocal cell and the fractional <-> Cartesian transforms.

use crate::config::ResolverConfig;
use crate::error::{CrystalError, Result};
use crate::model::lattice::{CrystalSystem, RawLatticeSpec, ReciprocalLattice, ResolvedLattice};
use crate::model::miller::{MillerIndex, MillerPlane};
use crate::physics::resolver;
use crate::utils::linalg;
use nalgebra::{Matrix3, Vector3};
use rayon::prelude::*;

/// Which metric a vector is measured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    /// Fractional coordinates / lattice directions [uvw]
    Direct,
    /// Reciprocal lattice vectors (hkl)
    Reciprocal,
}

/// A fully resolved unit cell with every derived quantity precomputed.
///
/// A `UnitCell` is immutable apart from [`UnitCell::update`], which swaps in
/// a complete new snapshot or leaves the cell untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    lattice: ResolvedLattice,
    config: ResolverConfig,
    metric_tensor: Matrix3<f64>,
    reciprocal_metric_tensor: Matrix3<f64>,
    volume: f64,
    reciprocal_volume: f64,
    reciprocal_lattice: ReciprocalLattice,
    orthonormalisation: Matrix3<f64>,
    fractionalisation: Matrix3<f64>,
}

impl UnitCell {
    /// Resolve `raw` with exact comparisons and build the cell.
    pub fn new(raw: &RawLatticeSpec) -> Result<Self> {
        Self::with_config(raw, ResolverConfig::default())
    }

    pub fn with_config(raw: &RawLatticeSpec, config: ResolverConfig) -> Result<Self> {
        let lattice = resolver::resolve_with(raw, &config)?;
        Self::build(lattice, config)
    }

    /// Build directly from an already resolved lattice. The cell keeps the
    /// exact default config, which a later [`UnitCell::update`] resolves with.
    pub fn from_lattice(lattice: ResolvedLattice) -> Result<Self> {
        Self::from_lattice_with(lattice, ResolverConfig::default())
    }

    /// As [`UnitCell::from_lattice`], keeping `config` for later updates.
    pub fn from_lattice_with(lattice: ResolvedLattice, config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        lattice.check()?;
        Self::build(lattice, config)
    }

    /// Build from a metric tensor. The lattice parameters it encodes are
    /// re-classified with `config`; recovered angles carry rounding noise,
    /// so a non-zero angle tolerance is usually wanted.
    pub fn from_metric_tensor(tensor: &Matrix3<f64>, config: ResolverConfig) -> Result<Self> {
        let scale = tensor.diagonal().amax();
        if (tensor - tensor.transpose()).amax() > linalg::ZERO_SNAP * scale.max(1.0) {
            return Err(CrystalError::lattice("metric tensor must be symmetric"));
        }
        if linalg::is_degenerate(tensor) {
            return Err(CrystalError::SingularLattice {
                determinant: tensor.determinant(),
            });
        }

        let ([a, b, c], [al, be, ga]) = linalg::cell_from_metric(tensor);
        let raw = RawLatticeSpec::from_parameters(a, b, c, al, be, ga);
        Self::with_config(&raw, config)
    }

    /// Re-resolve with new parameters. On error `self` is left unchanged.
    pub fn update(&mut self, raw: &RawLatticeSpec) -> Result<()> {
        let next = Self::with_config(raw, self.config)?;
        *self = next;
        Ok(())
    }

    fn build(lattice: ResolvedLattice, config: ResolverConfig) -> Result<Self> {
        // --- 1. Direct metric ---
        let metric_tensor = linalg::metric_tensor(lattice.lengths(), lattice.angles_radians());
        let reciprocal_metric_tensor = linalg::invert_metric(&metric_tensor)?;
        let volume = metric_tensor.determinant().sqrt();

        // --- 2. Reciprocal metric ---
        let reciprocal_volume = reciprocal_metric_tensor.determinant().sqrt();

        let (r_lengths, r_angles) = linalg::cell_from_metric(&reciprocal_metric_tensor);
        let reciprocal_lattice = ReciprocalLattice {
            a: r_lengths[0],
            b: r_lengths[1],
            c: r_lengths[2],
            al: r_angles[0],
            be: r_angles[1],
            ga: r_angles[2],
        };

        // --- 3. Cartesian frame ---
        let orthonormalisation = orthonormalisation_matrix(&lattice, &reciprocal_lattice);
        let fractionalisation = linalg::invert(&orthonormalisation)?;

        log::debug!(
            "{} cell: volume {:.6} A^3, reciprocal volume {:.6e}",
            lattice.crystal_system(),
            volume,
            reciprocal_volume
        );

        Ok(Self {
            lattice,
            config,
            metric_tensor,
            reciprocal_metric_tensor,
            volume,
            reciprocal_volume,
            reciprocal_lattice,
            orthonormalisation,
            fractionalisation,
        })
    }

    // --- Accessors ---

    pub fn lattice(&self) -> &ResolvedLattice {
        &self.lattice
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn metric_tensor(&self) -> &Matrix3<f64> {
        &self.metric_tensor
    }

    pub fn reciprocal_metric_tensor(&self) -> &Matrix3<f64> {
        &self.reciprocal_metric_tensor
    }

    /// Cell volume in cubic Angstroms
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn reciprocal_volume(&self) -> f64 {
        self.reciprocal_volume
    }

    pub fn reciprocal_lattice(&self) -> &ReciprocalLattice {
        &self.reciprocal_lattice
    }

    /// Fractional -> Cartesian, applied as `cart = M * frac`
    pub fn orthonormalisation_matrix(&self) -> &Matrix3<f64> {
        &self.orthonormalisation
    }

    /// Cartesian -> fractional, the inverse of the orthonormalisation matrix
    pub fn fractionalisation_matrix(&self) -> &Matrix3<f64> {
        &self.fractionalisation
    }

    pub fn crystal_system(&self) -> CrystalSystem {
        self.lattice.crystal_system()
    }

    pub fn crystal_family(&self) -> CrystalSystem {
        self.lattice.crystal_family()
    }

    // --- Metric queries ---

    fn tensor(&self, space: Space) -> &Matrix3<f64> {
        match space {
            Space::Direct => &self.metric_tensor,
            Space::Reciprocal => &self.reciprocal_metric_tensor,
        }
    }

    /// Length of `v` measured with the direct or reciprocal metric.
    pub fn vector_magnitude(&self, v: &[f64], space: Space) -> Result<f64> {
        let v = linalg::to_vector3(v)?;
        Ok(linalg::tensor_norm(&v, self.tensor(space)))
    }

    /// Interplanar spacing d(hkl) in Angstroms.
    pub fn plane_dspacing(&self, hkl: &[f64]) -> Result<f64> {
        let hkl = linalg::to_vector3(hkl)?;
        let q = linalg::tensor_norm(&hkl, &self.reciprocal_metric_tensor);
        if q == 0.0 {
            return Err(CrystalError::ZeroIndices);
        }
        Ok(1.0 / q)
    }

    /// d-spacings for many planes at once, in input order.
    pub fn dspacings(&self, indices: &[MillerIndex]) -> Result<Vec<MillerPlane>> {
        indices
            .par_iter()
            .map(|idx| {
                self.plane_dspacing(&idx.to_vector())
                    .map(|d| MillerPlane::new(*idx, d))
            })
            .collect()
    }

    // --- Coordinate transforms ---

    /// Fractional -> Cartesian (Angstroms), relative to an optional
    /// fractional origin.
    pub fn cartesian_coordinates(&self, point: &[f64], origin: Option<&[f64]>) -> Result<Vector3<f64>> {
        let p = relative_to(point, origin)?;
        Ok(self.orthonormalisation * p)
    }

    /// Cartesian (Angstroms) -> fractional, relative to an optional
    /// Cartesian origin.
    pub fn crystal_coordinates(&self, point: &[f64], origin: Option<&[f64]>) -> Result<Vector3<f64>> {
        let p = relative_to(point, origin)?;
        Ok(self.fractionalisation * p)
    }

    // --- Geometry between fractional points ---

    /// Distance between two fractional positions (Angstroms).
    pub fn distance(&self, p1: &[f64], p2: &[f64]) -> Result<f64> {
        let d = linalg::to_vector3(p2)? - linalg::to_vector3(p1)?;
        Ok(linalg::tensor_norm(&d, &self.metric_tensor))
    }

    /// v1 · v2 for two lattice vectors (Angstrom^2)
    pub fn lattice_dot_product(&self, v1: &[f64], v2: &[f64]) -> Result<f64> {
        let v1 = linalg::to_vector3(v1)?;
        let v2 = linalg::to_vector3(v2)?;
        Ok(linalg::tensor_product(&v1, &self.metric_tensor, &v2))
    }

    /// v1 x v2 for two lattice vectors, returned in fractional coordinates.
    pub fn lattice_cross_product(&self, v1: &[f64], v2: &[f64]) -> Result<Vector3<f64>> {
        let c1 = self.orthonormalisation * linalg::to_vector3(v1)?;
        let c2 = self.orthonormalisation * linalg::to_vector3(v2)?;
        Ok(self.fractionalisation * c1.cross(&c2))
    }

    /// Angle between two lattice vectors in degrees.
    pub fn angle_between(&self, v1: &[f64], v2: &[f64]) -> Result<f64> {
        let v1 = linalg::to_vector3(v1)?;
        let v2 = linalg::to_vector3(v2)?;
        let norm = linalg::tensor_norm(&v1, &self.metric_tensor)
            * linalg::tensor_norm(&v2, &self.metric_tensor);
        if norm == 0.0 {
            return Err(CrystalError::lattice("angle is undefined for a zero-length vector"));
        }
        let cos = linalg::tensor_product(&v1, &self.metric_tensor, &v2) / norm;
        Ok(cos.clamp(-1.0, 1.0).acos().to_degrees())
    }

    /// Angle p1-p2-p3 at the vertex p2, in degrees.
    pub fn bond_angle(&self, p1: &[f64], p2: &[f64], p3: &[f64]) -> Result<f64> {
        let center = linalg::to_vector3(p2)?;
        let v1 = linalg::to_vector3(p1)? - center;
        let v3 = linalg::to_vector3(p3)? - center;
        self.angle_between(v1.as_slice(), v3.as_slice())
    }

    /// Signed torsion angle p1-p2-p3-p4 in degrees, in (-180, 180].
    pub fn dihedral_angle(&self, p1: &[f64], p2: &[f64], p3: &[f64], p4: &[f64]) -> Result<f64> {
        let q1 = self.cartesian_coordinates(p1, None)?;
        let q2 = self.cartesian_coordinates(p2, None)?;
        let q3 = self.cartesian_coordinates(p3, None)?;
        let q4 = self.cartesian_coordinates(p4, None)?;

        let b1 = q2 - q1;
        let b2 = q3 - q2;
        let b3 = q4 - q3;
        let axis = b2
            .try_normalize(0.0)
            .ok_or_else(|| CrystalError::lattice("dihedral is undefined when p2 and p3 coincide"))?;

        // Normals of the (b1, b2) and (b2, b3) planes
        let v = b1.cross(&b2);
        let w = b2.cross(&b3);

        Ok(axis.dot(&v.cross(&w)).atan2(v.dot(&w)).to_degrees())
    }
}

/// Upper triangular matrix placing a along x and b in the xy plane.
///
/// ```text
/// | a    b·cos γ    c·cos β          |
/// | 0    b·sin γ   -c·sin β·cos α*   |
/// | 0    0          1/c*             |
/// ```
fn orthonormalisation_matrix(lattice: &ResolvedLattice, reciprocal: &ReciprocalLattice) -> Matrix3<f64> {
    let [a, b, c] = lattice.lengths();
    let [_, be, ga] = lattice.angles_radians();
    let al_star = reciprocal.al.to_radians();

    Matrix3::new(
        a,
        linalg::snap_to_zero(b * ga.cos()),
        linalg::snap_to_zero(c * be.cos()),
        0.0,
        b * ga.sin(),
        linalg::snap_to_zero(-c * be.sin() * al_star.cos()),
        0.0,
        0.0,
        1.0 / reciprocal.c,
    )
}

fn relative_to(point: &[f64], origin: Option<&[f64]>) -> Result<Vector3<f64>> {
    let p = linalg::to_vector3(point)?;
    match origin {
        Some(o) => Ok(p - linalg::to_vector3(o)?),
        None => Ok(p),
    }
}
