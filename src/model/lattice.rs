// src/model/lattice.rs

use crate::error::{CrystalError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const RIGHT_ANGLE: f64 = 90.0;

/// The seven lattice systems, with the rhombohedral setting kept apart from
/// the hexagonal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrystalSystem {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Rhombohedral,
    Hexagonal,
    Cubic,
}

impl CrystalSystem {
    /// Crystal family of this lattice system. Rhombohedral lattices belong to
    /// the hexagonal family; every other system is its own family.
    pub fn crystal_family(self) -> CrystalSystem {
        match self {
            CrystalSystem::Rhombohedral => CrystalSystem::Hexagonal,
            other => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CrystalSystem::Triclinic => "Triclinic",
            CrystalSystem::Monoclinic => "Monoclinic",
            CrystalSystem::Orthorhombic => "Orthorhombic",
            CrystalSystem::Tetragonal => "Tetragonal",
            CrystalSystem::Rhombohedral => "Rhombohedral",
            CrystalSystem::Hexagonal => "Hexagonal",
            CrystalSystem::Cubic => "Cubic",
        }
    }
}

impl fmt::Display for CrystalSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique (highest symmetry) axis of a lattice. Only meaningful for
/// monoclinic cells, where it selects which angle differs from 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrincipalAxis {
    A,
    B,
    C,
    #[default]
    None,
}

impl PrincipalAxis {
    /// Index of the angle measured around this axis (al, be, ga).
    pub fn angle_slot(self) -> Option<usize> {
        match self {
            PrincipalAxis::A => Some(0),
            PrincipalAxis::B => Some(1),
            PrincipalAxis::C => Some(2),
            PrincipalAxis::None => None,
        }
    }

    pub(crate) fn from_angle_slot(slot: usize) -> Self {
        match slot {
            0 => PrincipalAxis::A,
            1 => PrincipalAxis::B,
            _ => PrincipalAxis::C,
        }
    }
}

/// User supplied lattice parameters. Any field may be left out; a missing
/// value is inferred from the symmetry the remaining values imply.
///
/// Lengths are in Angstroms, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLatticeSpec {
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,
    pub al: Option<f64>,
    pub be: Option<f64>,
    pub ga: Option<f64>,
    pub principal_axis: PrincipalAxis,
}

impl RawLatticeSpec {
    /// Start a specification from the `a` length.
    pub fn new(a: f64) -> Self {
        Self {
            a: Some(a),
            ..Default::default()
        }
    }

    /// Fully specified cell; resolves to whatever system the values imply.
    pub fn from_parameters(a: f64, b: f64, c: f64, al: f64, be: f64, ga: f64) -> Self {
        Self {
            a: Some(a),
            b: Some(b),
            c: Some(c),
            al: Some(al),
            be: Some(be),
            ga: Some(ga),
            principal_axis: PrincipalAxis::None,
        }
    }

    pub fn with_b(mut self, b: f64) -> Self {
        self.b = Some(b);
        self
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = Some(c);
        self
    }

    pub fn with_al(mut self, al: f64) -> Self {
        self.al = Some(al);
        self
    }

    pub fn with_be(mut self, be: f64) -> Self {
        self.be = Some(be);
        self
    }

    pub fn with_ga(mut self, ga: f64) -> Self {
        self.ga = Some(ga);
        self
    }

    pub fn with_principal_axis(mut self, axis: PrincipalAxis) -> Self {
        self.principal_axis = axis;
        self
    }

    pub fn lengths(&self) -> [Option<f64>; 3] {
        [self.a, self.b, self.c]
    }

    pub fn angles(&self) -> [Option<f64>; 3] {
        [self.al, self.be, self.ga]
    }
}

/// Fully specified lattice, consistent with its crystal system.
///
/// Only the resolver builds these, so the fields stay private. Deserialized
/// values go through [`ResolvedLattice::check`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatticeRecord")]
pub struct ResolvedLattice {
    a: f64,
    b: f64,
    c: f64,
    al: f64,
    be: f64,
    ga: f64,
    principal_axis: PrincipalAxis,
    crystal_system: CrystalSystem,
}

impl ResolvedLattice {
    pub(crate) fn new(
        lengths: [f64; 3],
        angles: [f64; 3],
        principal_axis: PrincipalAxis,
        crystal_system: CrystalSystem,
    ) -> Self {
        Self {
            a: lengths[0],
            b: lengths[1],
            c: lengths[2],
            al: angles[0],
            be: angles[1],
            ga: angles[2],
            principal_axis,
            crystal_system,
        }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn al(&self) -> f64 {
        self.al
    }

    pub fn be(&self) -> f64 {
        self.be
    }

    pub fn ga(&self) -> f64 {
        self.ga
    }

    pub fn principal_axis(&self) -> PrincipalAxis {
        self.principal_axis
    }

    pub fn crystal_system(&self) -> CrystalSystem {
        self.crystal_system
    }

    pub fn crystal_family(&self) -> CrystalSystem {
        self.crystal_system.crystal_family()
    }

    pub fn lengths(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    /// Angles in degrees (al, be, ga)
    pub fn angles(&self) -> [f64; 3] {
        [self.al, self.be, self.ga]
    }

    pub fn angles_radians(&self) -> [f64; 3] {
        [self.al.to_radians(), self.be.to_radians(), self.ga.to_radians()]
    }

    /// Verify the parameters are in range and carry the symmetry their
    /// crystal system demands.
    pub fn check(&self) -> Result<()> {
        for (name, v) in ["a", "b", "c"].iter().zip(self.lengths()) {
            if !v.is_finite() || v <= 0.0 {
                return Err(CrystalError::lattice(format!(
                    "length {} must be positive, got {}",
                    name, v
                )));
            }
        }
        for (name, v) in ["al", "be", "ga"].iter().zip(self.angles()) {
            if !v.is_finite() || v <= 0.0 || v >= 180.0 {
                return Err(CrystalError::lattice(format!(
                    "angle {} must lie strictly between 0 and 180 degrees, got {}",
                    name, v
                )));
            }
        }

        let [a, b, c] = self.lengths();
        let [al, be, ga] = self.angles();
        let right = |x: f64| x == RIGHT_ANGLE;
        let consistent = match self.crystal_system {
            CrystalSystem::Cubic => a == b && a == c && right(al) && right(be) && right(ga),
            CrystalSystem::Tetragonal => a == b && right(al) && right(be) && right(ga),
            CrystalSystem::Orthorhombic => right(al) && right(be) && right(ga),
            CrystalSystem::Hexagonal => a == b && right(al) && right(be) && ga == 120.0,
            CrystalSystem::Rhombohedral => a == b && a == c && al == be && al == ga,
            CrystalSystem::Monoclinic => self.angles().iter().filter(|&&x| right(x)).count() >= 2,
            CrystalSystem::Triclinic => true,
        };
        if !consistent {
            return Err(CrystalError::lattice(format!(
                "parameters ({}, {}, {}, {}, {}, {}) do not fit a {} lattice",
                a, b, c, al, be, ga, self.crystal_system
            )));
        }
        Ok(())
    }
}

/// Unchecked wire form of [`ResolvedLattice`].
#[derive(Deserialize)]
struct LatticeRecord {
    a: f64,
    b: f64,
    c: f64,
    al: f64,
    be: f64,
    ga: f64,
    #[serde(default)]
    principal_axis: PrincipalAxis,
    crystal_system: CrystalSystem,
}

impl TryFrom<LatticeRecord> for ResolvedLattice {
    type Error = CrystalError;

    fn try_from(r: LatticeRecord) -> Result<Self> {
        let lattice = Self::new(
            [r.a, r.b, r.c],
            [r.al, r.be, r.ga],
            r.principal_axis,
            r.crystal_system,
        );
        lattice.check()?;
        Ok(lattice)
    }
}

/// Lengths (1/Angstrom) and angles (degrees) of the reciprocal lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalLattice {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub al: f64,
    pub be: f64,
    pub ga: f64,
}
