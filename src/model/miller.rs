// src/model/miller.rs
use crate::error::{CrystalError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;

/// Miller indices (h k l) of a lattice plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl MillerIndex {
    pub fn new(h: i32, k: i32, l: i32) -> Self {
        Self { h, k, l }
    }

    /// Convert four-index (h k i l) hexagonal notation, checking i = -(h + k).
    pub fn from_bravais(h: i32, k: i32, i: i32, l: i32) -> Result<Self> {
        if i != -(h + k) {
            return Err(CrystalError::InconsistentBravaisIndex { h, k, i, l });
        }
        Ok(Self { h, k, l })
    }

    /// Accepts either three (hkl) or four (hkil) components.
    pub fn from_slice(indices: &[i32]) -> Result<Self> {
        match *indices {
            [h, k, l] => Ok(Self::new(h, k, l)),
            [h, k, i, l] => Self::from_bravais(h, k, i, l),
            _ => Err(CrystalError::Shape {
                expected: 3,
                got: indices.len(),
            }),
        }
    }

    /// The redundant third index of the four-index notation.
    pub fn bravais_i(&self) -> i32 {
        -(self.h + self.k)
    }

    pub fn is_zero(&self) -> bool {
        self.h == 0 && self.k == 0 && self.l == 0
    }

    pub fn to_vector(&self) -> [f64; 3] {
        [self.h as f64, self.k as f64, self.l as f64]
    }
}

impl From<[i32; 3]> for MillerIndex {
    fn from(hkl: [i32; 3]) -> Self {
        Self::new(hkl[0], hkl[1], hkl[2])
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({} {} {})", self.h, self.k, self.l)
    }
}

/// A lattice plane together with its interplanar spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MillerPlane {
    pub index: MillerIndex,
    /// Interplanar spacing in Angstroms
    pub d_spacing: f64,
}

impl MillerPlane {
    pub fn new(index: MillerIndex, d_spacing: f64) -> Self {
        Self { index, d_spacing }
    }

    /// Scattering vector magnitude Q = 2π/d (1/Angstrom)
    pub fn q_spacing(&self) -> f64 {
        2.0 * PI / self.d_spacing
    }

    /// Largest spacing first, ties broken on the indices so the order is stable.
    pub(crate) fn cmp_by_spacing(a: &Self, b: &Self) -> Ordering {
        b.d_spacing
            .partial_cmp(&a.d_spacing)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.index.cmp(&a.index))
    }
}
