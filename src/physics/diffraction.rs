// src/physics/diffraction.rs
use crate::model::miller::{MillerIndex, MillerPlane};
use crate::physics::unit_cell::UnitCell;
use crate::utils::linalg;
use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Cu K-alpha1 wavelength (Angstroms)
pub const CU_K_ALPHA1: f64 = 1.5406;

/// Largest |h|, |k| or |l| a plane search will scan.
pub const MAX_MILLER_INDEX: i32 = 100;

/// Scattering vector magnitude Q (1/Angstrom) -> d-spacing (Angstrom)
pub fn q_to_d(q: f64) -> f64 {
    2.0 * PI / q
}

/// d-spacing (Angstrom) -> Q (1/Angstrom)
pub fn d_to_q(d: f64) -> f64 {
    2.0 * PI / d
}

/// Bragg angle 2θ (degrees) for a spacing, or `None` when λ/2d > 1
/// (the plane cannot diffract at this wavelength).
pub fn d_to_two_theta(d: f64, wavelength: f64) -> Option<f64> {
    let sin_theta = wavelength / (2.0 * d);
    if !(0.0..=1.0).contains(&sin_theta) {
        return None;
    }
    Some(2.0 * sin_theta.asin().to_degrees())
}

/// Spacing (Angstrom) diffracting at 2θ (degrees)
pub fn two_theta_to_d(two_theta: f64, wavelength: f64) -> f64 {
    wavelength / (2.0 * (two_theta.to_radians() / 2.0).sin())
}

/// Q (1/Angstrom) -> 2θ (degrees), `None` when out of reach of the wavelength
pub fn q_to_two_theta(q: f64, wavelength: f64) -> Option<f64> {
    d_to_two_theta(q_to_d(q), wavelength)
}

/// 2θ (degrees) -> Q (1/Angstrom)
pub fn two_theta_to_q(two_theta: f64, wavelength: f64) -> f64 {
    d_to_q(two_theta_to_d(two_theta, wavelength))
}

/// Every non-zero (hkl) with d(hkl) >= `d_min`, largest spacing first.
///
/// Searches needing an index above [`MAX_MILLER_INDEX`] are refused with a
/// warning and yield an empty list.
pub fn planes_within(cell: &UnitCell, d_min: f64) -> Vec<MillerPlane> {
    if !(d_min > 0.0) || !d_min.is_finite() {
        log::warn!("Plane search needs a positive finite d_min, got {}", d_min);
        return Vec::new();
    }

    // |h| = |r* . a| <= |a| / d, likewise for k and l
    let lattice = cell.lattice();
    let longest = lattice.lengths().iter().fold(0.0f64, |m, &x| m.max(x));
    if longest / d_min > MAX_MILLER_INDEX as f64 {
        log::warn!(
            "d_min {} needs indices up to {:.0}, above the limit of {}",
            d_min,
            (longest / d_min).floor(),
            MAX_MILLER_INDEX
        );
        return Vec::new();
    }
    let bound = |length: f64| (length / d_min).floor() as i32;
    let (h_max, k_max, l_max) = (bound(lattice.a()), bound(lattice.b()), bound(lattice.c()));
    let g_star = cell.reciprocal_metric_tensor();

    let mut planes: Vec<MillerPlane> = (-h_max..=h_max)
        .into_par_iter()
        .flat_map_iter(|h| {
            let mut found = Vec::new();
            for k in -k_max..=k_max {
                for l in -l_max..=l_max {
                    let index = MillerIndex::new(h, k, l);
                    if index.is_zero() {
                        continue;
                    }
                    let q = linalg::tensor_norm(&Vector3::from(index.to_vector()), g_star);
                    if q == 0.0 {
                        continue;
                    }
                    let d = 1.0 / q;
                    if d >= d_min {
                        found.push(MillerPlane::new(index, d));
                    }
                }
            }
            found
        })
        .collect();

    planes.sort_by(MillerPlane::cmp_by_spacing);
    log::debug!("{} planes with d >= {}", planes.len(), d_min);
    planes
}

/// Settings for a reflection position listing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffractionSettings {
    pub wavelength: f64,
    pub min_two_theta: f64,
    pub max_two_theta: f64,
}

impl Default for DiffractionSettings {
    fn default() -> Self {
        Self {
            wavelength: CU_K_ALPHA1,
            min_two_theta: 10.0,
            max_two_theta: 90.0,
        }
    }
}

/// A lattice plane placed on the 2θ axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub plane: MillerPlane,
    pub two_theta: f64,
}

/// Bragg positions of every plane inside the 2θ window, sorted by angle.
pub fn reflections(cell: &UnitCell, settings: &DiffractionSettings) -> Vec<Reflection> {
    if !(settings.wavelength > 0.0) || settings.max_two_theta <= settings.min_two_theta {
        return Vec::new();
    }

    let max_angle = settings.max_two_theta.min(180.0);
    let d_min = two_theta_to_d(max_angle, settings.wavelength);

    let mut peaks: Vec<Reflection> = planes_within(cell, d_min)
        .into_iter()
        .filter_map(|plane| {
            let two_theta = d_to_two_theta(plane.d_spacing, settings.wavelength)?;
            (two_theta >= settings.min_two_theta && two_theta <= settings.max_two_theta)
                .then_some(Reflection { plane, two_theta })
        })
        .collect();

    // Sort by angle
    peaks.sort_by(|a, b| a.two_theta.partial_cmp(&b.two_theta).unwrap_or(Ordering::Equal));
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lattice::RawLatticeSpec;
    use approx::assert_relative_eq;

    #[test]
    fn test_q_d_conversion() {
        assert_relative_eq!(q_to_d(2.0 * PI), 1.0);
        assert_relative_eq!(d_to_q(q_to_d(3.7)), 3.7, epsilon = 1e-12);
    }

    #[test]
    fn test_q_two_theta_conversion() {
        let d = 5.43018 / 3f64.sqrt();
        let q = d_to_q(d);
        let two_theta = q_to_two_theta(q, CU_K_ALPHA1).unwrap();
        assert_relative_eq!(two_theta, 28.4465, epsilon = 1e-3);
        assert_relative_eq!(two_theta_to_q(two_theta, CU_K_ALPHA1), q, epsilon = 1e-10);

        // Q beyond 4π/λ never diffracts
        assert_eq!(q_to_two_theta(10.0, CU_K_ALPHA1), None);
    }

    #[test]
    fn test_bragg_angle() {
        // Si (111), a = 5.43018
        let d = 5.43018 / 3f64.sqrt();
        let two_theta = d_to_two_theta(d, CU_K_ALPHA1).unwrap();
        assert_relative_eq!(two_theta, 28.4465, epsilon = 1e-3);
        assert_relative_eq!(two_theta_to_d(two_theta, CU_K_ALPHA1), d, epsilon = 1e-10);

        // λ / 2d > 1
        assert_eq!(d_to_two_theta(0.5, CU_K_ALPHA1), None);
    }

    #[test]
    fn test_planes_within_cubic() {
        let cell = UnitCell::new(&RawLatticeSpec::new(4.0)).unwrap();
        let planes = planes_within(&cell, 2.0);

        // {100}, {110}, {111}, {200}
        assert_eq!(planes.len(), 6 + 12 + 8 + 6);
        assert_eq!(planes[0].index, MillerIndex::new(1, 0, 0));
        assert_relative_eq!(planes[0].d_spacing, 4.0, epsilon = 1e-12);
        assert_relative_eq!(planes.last().unwrap().d_spacing, 2.0, epsilon = 1e-12);
        assert!(planes.windows(2).all(|w| w[0].d_spacing >= w[1].d_spacing));
        assert!(planes.iter().all(|p| !p.index.is_zero()));
    }

    #[test]
    fn test_planes_within_triclinic_agree_with_cell() {
        let cell = UnitCell::new(&RawLatticeSpec::from_parameters(
            8.28, 12.97, 7.15, 91.05, 116.26, 90.15,
        ))
        .unwrap();
        let planes = planes_within(&cell, 3.0);
        assert!(!planes.is_empty());
        for plane in &planes {
            assert!(plane.d_spacing >= 3.0);
            assert_relative_eq!(
                cell.plane_dspacing(&plane.index.to_vector()).unwrap(),
                plane.d_spacing,
                epsilon = 1e-12
            );
        }
        assert_eq!(planes[0].index.k.abs(), 1);
        assert_relative_eq!(planes[0].d_spacing, 12.966894, epsilon = 1e-5);
    }

    #[test]
    fn test_planes_within_rejects_bad_bound() {
        let cell = UnitCell::new(&RawLatticeSpec::new(4.0)).unwrap();
        assert!(planes_within(&cell, 0.0).is_empty());
        assert!(planes_within(&cell, f64::NAN).is_empty());
        assert!(planes_within(&cell, 10.0).is_empty());
    }

    #[test]
    fn test_planes_within_refuses_huge_search() {
        let cell = UnitCell::new(&RawLatticeSpec::new(5.0)).unwrap();
        assert!(planes_within(&cell, 1e-9).is_empty());

        let planes = planes_within(&cell, 0.5);
        assert!(planes.iter().any(|p| p.index == MillerIndex::new(5, 0, 0)));

        let settings = DiffractionSettings {
            wavelength: 1e-6,
            ..Default::default()
        };
        assert!(reflections(&cell, &settings).is_empty());
    }

    #[test]
    fn test_reflections_sorted_by_angle() {
        let cell = UnitCell::new(&RawLatticeSpec::new(5.43018)).unwrap();
        let peaks = reflections(&cell, &DiffractionSettings::default());

        assert!(!peaks.is_empty());
        assert!(peaks.windows(2).all(|w| w[0].two_theta <= w[1].two_theta));
        assert!(peaks.iter().all(|p| p.two_theta >= 10.0 && p.two_theta <= 90.0));
        // Lowest angle reflections come from the {100} family
        assert_relative_eq!(peaks[0].plane.d_spacing, 5.43018, epsilon = 1e-9);
    }
}
