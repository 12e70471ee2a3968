// src/physics/resolver.rs
//
// Classification of partially specified lattice parameters.
//
// Branches are evaluated in a fixed priority order; later branches assume
// that earlier ones did not match.

use crate::config::ResolverConfig;
use crate::error::{CrystalError, Result};
use crate::model::lattice::{CrystalSystem, PrincipalAxis, RawLatticeSpec, ResolvedLattice};

const RIGHT_ANGLE: f64 = 90.0;
const HEXAGONAL_GAMMA: f64 = 120.0;

/// Resolve raw lattice parameters using exact comparisons.
pub fn resolve(raw: &RawLatticeSpec) -> Result<ResolvedLattice> {
    resolve_with(raw, &ResolverConfig::default())
}

/// Resolve raw lattice parameters, filling in omitted values from the
/// symmetry they imply.
///
/// # Errors
/// `CrystalError::Lattice` when a value is out of range, or when the input is
/// under-determined for the crystal system it was classified into.
pub fn resolve_with(raw: &RawLatticeSpec, config: &ResolverConfig) -> Result<ResolvedLattice> {
    config.validate()?;
    validate_input(raw)?;

    let lattice = classify(raw, config)?;
    log::debug!(
        "Resolved {} lattice: a={} b={} c={} al={} be={} ga={} axis={:?}",
        lattice.crystal_system(),
        lattice.a(),
        lattice.b(),
        lattice.c(),
        lattice.al(),
        lattice.be(),
        lattice.ga(),
        lattice.principal_axis()
    );
    Ok(lattice)
}

fn validate_input(raw: &RawLatticeSpec) -> Result<()> {
    for (name, value) in ["a", "b", "c"].iter().zip(raw.lengths()) {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                return Err(CrystalError::lattice(format!(
                    "length {} must be positive, got {}",
                    name, v
                )));
            }
        }
    }
    for (name, value) in ["al", "be", "ga"].iter().zip(raw.angles()) {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 || v >= 180.0 {
                return Err(CrystalError::lattice(format!(
                    "angle {} must lie strictly between 0 and 180 degrees, got {}",
                    name, v
                )));
            }
        }
    }
    Ok(())
}

fn classify(raw: &RawLatticeSpec, cfg: &ResolverConfig) -> Result<ResolvedLattice> {
    let lengths = raw.lengths();
    let angles = raw.angles();

    // 1. Implicit rhombohedral: one length and one angle
    let given_lengths: Vec<f64> = lengths.iter().flatten().copied().collect();
    let given_angles: Vec<f64> = angles.iter().flatten().copied().collect();
    if given_lengths.len() == 1 && given_angles.len() == 1 {
        return Ok(ResolvedLattice::new(
            [given_lengths[0]; 3],
            [given_angles[0]; 3],
            PrincipalAxis::None,
            CrystalSystem::Rhombohedral,
        ));
    }

    let a = raw
        .a
        .ok_or_else(|| CrystalError::lattice("the a length must be given"))?;

    // 2. Explicit rhombohedral: everything given, all equal, not 90
    if let ([Some(_), Some(b), Some(c)], [Some(al), Some(be), Some(ga)]) = (lengths, angles) {
        if cfg.lengths_equal(a, b)
            && cfg.lengths_equal(a, c)
            && cfg.angles_equal(al, be)
            && cfg.angles_equal(al, ga)
            && !cfg.angles_equal(al, RIGHT_ANGLE)
        {
            return Ok(ResolvedLattice::new(
                [a; 3],
                [al; 3],
                PrincipalAxis::None,
                CrystalSystem::Rhombohedral,
            ));
        }
    }

    // 3. General case: unspecified angles are right angles
    let angles = angles.map(|v| v.unwrap_or(RIGHT_ANGLE));
    let compared = [
        cfg.angles_equal(angles[0], angles[1]),
        cfg.angles_equal(angles[0], angles[2]),
        cfg.angles_equal(angles[1], angles[2]),
    ];

    match compared.iter().filter(|&&eq| eq).count() {
        0 => triclinic(a, raw.b, raw.c, angles, "Triclinic requires three lengths and three angles"),
        1 => {
            // The unique angle is the one missing from the equal pair
            let unique = if compared[0] {
                2
            } else if compared[1] {
                1
            } else {
                0
            };
            if angles.iter().any(|&x| cfg.angles_equal(x, HEXAGONAL_GAMMA)) {
                hexagonal(a, raw.b, raw.c, cfg)
            } else {
                monoclinic(a, raw, angles, unique, cfg)
            }
        }
        // With a non-zero tolerance comparisons need not be transitive; two
        // matches are treated as three.
        _ => equal_angles(a, raw.b, raw.c, angles[0], cfg),
    }
}

fn equal_angles(
    a: f64,
    b: Option<f64>,
    c: Option<f64>,
    angle: f64,
    cfg: &ResolverConfig,
) -> Result<ResolvedLattice> {
    let (lengths, system) = match (b, c) {
        (None, None) => ([a; 3], CrystalSystem::Cubic),
        (None, Some(c)) => ([a, a, c], CrystalSystem::Tetragonal),
        // Two lengths given: the second one is c
        (Some(b), None) => ([a, a, b], CrystalSystem::Tetragonal),
        (Some(b), Some(c)) if cfg.lengths_equal(a, b) => ([a, a, c], CrystalSystem::Tetragonal),
        (Some(b), Some(c)) => ([a, b, c], CrystalSystem::Orthorhombic),
    };

    let right = cfg.angles_equal(angle, RIGHT_ANGLE);
    // {a, c} names the unique axis, so it stays tetragonal even when c = a
    let c_axis_given = right && b.is_none() && c.is_some();
    let all_equal = !c_axis_given
        && cfg.lengths_equal(lengths[0], lengths[1])
        && cfg.lengths_equal(lengths[0], lengths[2]);

    if all_equal {
        return Ok(if right {
            ResolvedLattice::new([a; 3], [RIGHT_ANGLE; 3], PrincipalAxis::None, CrystalSystem::Cubic)
        } else {
            ResolvedLattice::new([a; 3], [angle; 3], PrincipalAxis::None, CrystalSystem::Rhombohedral)
        });
    }

    if !right {
        // Equal oblique angles with unequal edges carry no extra symmetry
        return triclinic(
            a,
            b,
            c,
            [angle; 3],
            "Lattice with equal oblique angles requires a = b = c or all three lengths",
        );
    }

    let axis = match system {
        CrystalSystem::Tetragonal => PrincipalAxis::C,
        _ => PrincipalAxis::None,
    };
    Ok(ResolvedLattice::new(lengths, [RIGHT_ANGLE; 3], axis, system))
}

fn hexagonal(
    a: f64,
    b: Option<f64>,
    c: Option<f64>,
    cfg: &ResolverConfig,
) -> Result<ResolvedLattice> {
    let lengths = match (b, c) {
        (None, Some(c)) => [a, a, c],
        (Some(b), None) => [a, a, b],
        (Some(b), Some(c)) if cfg.lengths_equal(a, b) => [a, a, c],
        (Some(_), Some(_)) => {
            return Err(CrystalError::lattice("Hexagonal requires a = b"));
        }
        (None, None) => {
            return Err(CrystalError::lattice(
                "Hexagonal requires at least two lengths",
            ));
        }
    };
    Ok(ResolvedLattice::new(
        lengths,
        [RIGHT_ANGLE, RIGHT_ANGLE, HEXAGONAL_GAMMA],
        PrincipalAxis::C,
        CrystalSystem::Hexagonal,
    ))
}

fn monoclinic(
    a: f64,
    raw: &RawLatticeSpec,
    angles: [f64; 3],
    unique: usize,
    cfg: &ResolverConfig,
) -> Result<ResolvedLattice> {
    let pair_right = (0..3)
        .filter(|&i| i != unique)
        .all(|i| cfg.angles_equal(angles[i], RIGHT_ANGLE));
    if !pair_right {
        return triclinic(
            a,
            raw.b,
            raw.c,
            angles,
            "Lattice with two equal oblique angles requires all three lengths",
        );
    }

    let (b, c) = match (raw.b, raw.c) {
        (Some(b), Some(c)) => (b, c),
        _ => {
            return Err(CrystalError::lattice(
                "Monoclinic requires all three lengths",
            ))
        }
    };

    let axis = match raw.principal_axis {
        PrincipalAxis::None => PrincipalAxis::from_angle_slot(unique),
        explicit => explicit,
    };
    let mut resolved = [RIGHT_ANGLE; 3];
    if let Some(slot) = axis.angle_slot() {
        resolved[slot] = angles[unique];
    }

    Ok(ResolvedLattice::new(
        [a, b, c],
        resolved,
        axis,
        CrystalSystem::Monoclinic,
    ))
}

fn triclinic(
    a: f64,
    b: Option<f64>,
    c: Option<f64>,
    angles: [f64; 3],
    missing: &str,
) -> Result<ResolvedLattice> {
    match (b, c) {
        (Some(b), Some(c)) => {
            let lattice = ResolvedLattice::new(
                [a, b, c],
                angles,
                PrincipalAxis::None,
                CrystalSystem::Triclinic,
            );
            if !(angles[0] != angles[1] && angles[0] != angles[2] && angles[1] != angles[2]) {
                log::warn!(
                    "Angles {:?} fit no higher symmetry for lengths ({}, {}, {}); treating cell as triclinic",
                    angles,
                    a,
                    b,
                    c
                );
            }
            Ok(lattice)
        }
        _ => Err(CrystalError::lattice(missing)),
    }
}
