use approx::assert_relative_eq;
use unitcell::physics::diffraction;
use unitcell::utils::report;
use unitcell::{
    resolve, CrystalError, CrystalSystem, MillerIndex, PrincipalAxis, RawLatticeSpec,
    ResolverConfig, Space, UnitCell,
};

#[test]
fn hexagonal_cell_end_to_end() {
    let cell = UnitCell::new(&RawLatticeSpec::new(5.0).with_c(2.0).with_ga(120.0)).unwrap();
    let g = cell.metric_tensor();

    assert_relative_eq!(g[(0, 1)], -12.5, epsilon = 1e-9);
    assert_eq!(g[(0, 2)], 0.0);
    assert_eq!(g[(1, 2)], 0.0);
    assert_eq!(cell.lattice().principal_axis(), PrincipalAxis::C);
    assert_eq!(cell.crystal_family(), CrystalSystem::Hexagonal);

    // d(100) = sqrt(3)/2 * a for a hexagonal net
    let d100 = cell.plane_dspacing(&[1.0, 0.0, 0.0]).unwrap();
    assert_relative_eq!(d100, 5.0 * 3f64.sqrt() / 2.0, epsilon = 1e-9);

    // (1 0 -1 0) is the same plane in four-index notation
    let idx = MillerIndex::from_slice(&[1, 0, -1, 0]).unwrap();
    let planes = cell.dspacings(&[idx]).unwrap();
    assert_relative_eq!(planes[0].d_spacing, d100, epsilon = 1e-12);
}

#[test]
fn reciprocal_volume_matches_determinant_relation() {
    let cell = UnitCell::new(&RawLatticeSpec::from_parameters(
        7.19196, 8.12720, 8.12771, 82.4809, 69.2610, 69.2584,
    ))
    .unwrap();

    let det_g = cell.metric_tensor().determinant();
    let det_g_star = cell.reciprocal_metric_tensor().determinant();
    assert_relative_eq!(det_g * det_g_star, 1.0, epsilon = 1e-9);
    assert_relative_eq!(cell.volume() * cell.volume(), det_g, max_relative = 1e-12);
}

#[test]
fn monoclinic_principal_axis_overrides() {
    let base = RawLatticeSpec::new(5.0).with_b(6.0).with_c(7.0).with_be(105.0);

    let b_axis = UnitCell::new(&base).unwrap();
    assert_eq!(b_axis.crystal_system(), CrystalSystem::Monoclinic);
    assert_eq!(b_axis.lattice().angles(), [90.0, 105.0, 90.0]);

    let a_axis = UnitCell::new(&base.with_principal_axis(PrincipalAxis::A)).unwrap();
    assert_eq!(a_axis.lattice().principal_axis(), PrincipalAxis::A);
    assert_eq!(a_axis.lattice().angles(), [105.0, 90.0, 90.0]);

    let c_axis = UnitCell::new(&base.with_principal_axis(PrincipalAxis::C)).unwrap();
    assert_eq!(c_axis.lattice().angles(), [90.0, 90.0, 105.0]);

    // Same lengths and the same oblique angle: same volume whatever the axis
    assert_relative_eq!(a_axis.volume(), c_axis.volume(), epsilon = 1e-9);
    assert_relative_eq!(a_axis.volume(), b_axis.volume(), epsilon = 1e-9);
}

#[test]
fn missing_lengths_are_reported() {
    let err = resolve(&RawLatticeSpec::new(2.0).with_al(80.0).with_be(70.0).with_ga(60.0))
        .unwrap_err();
    assert!(matches!(err, CrystalError::Lattice(_)));

    let err = UnitCell::new(&RawLatticeSpec::new(2.0).with_c(5.0).with_al(95.0)).unwrap_err();
    assert!(err.to_string().contains("Monoclinic"));
}

#[test]
fn update_swaps_whole_snapshot() {
    let mut cell = UnitCell::new(&RawLatticeSpec::new(3.0)).unwrap();
    assert_relative_eq!(cell.volume(), 27.0, epsilon = 1e-9);

    cell.update(&RawLatticeSpec::new(2.0).with_b(3.0).with_c(5.0)).unwrap();
    assert_eq!(cell.crystal_system(), CrystalSystem::Orthorhombic);
    assert_relative_eq!(cell.volume(), 30.0, epsilon = 1e-9);
    assert_relative_eq!(cell.reciprocal_lattice().c, 0.2, epsilon = 1e-12);

    let snapshot = cell.clone();
    assert!(cell.update(&RawLatticeSpec::default()).is_err());
    assert_eq!(cell, snapshot);
}

#[test]
fn tolerant_config_from_json() {
    let config = ResolverConfig::from_json(
        r#"{ "length_tolerance": 0.0001, "angle_tolerance": 0.001 }"#,
    )
    .unwrap();
    let raw = RawLatticeSpec::from_parameters(5.4301, 5.43015, 5.4301, 90.0, 90.0005, 90.0);

    let exact = UnitCell::new(&raw).unwrap();
    let tolerant = UnitCell::with_config(&raw, config).unwrap();
    assert_ne!(exact.crystal_system(), CrystalSystem::Cubic);
    assert_eq!(tolerant.crystal_system(), CrystalSystem::Cubic);
    assert_eq!(tolerant.config(), &config);
}

#[test]
fn coordinates_roundtrip_through_cartesian_frame() {
    let cell = UnitCell::new(&RawLatticeSpec::from_parameters(
        8.28, 12.97, 7.15, 91.05, 116.26, 90.15,
    ))
    .unwrap();
    let frac = [0.25, -0.5, 0.75];
    let cart = cell.cartesian_coordinates(&frac, None).unwrap();

    // Cartesian length equals the metric length
    let metric = cell.vector_magnitude(&frac, Space::Direct).unwrap();
    assert_relative_eq!(cart.norm(), metric, epsilon = 1e-10);

    let back = cell.crystal_coordinates(cart.as_slice(), None).unwrap();
    for (x, y) in back.iter().zip(frac.iter()) {
        assert_relative_eq!(*x, *y, epsilon = 1e-12);
    }
}

#[test]
fn plane_listing_and_report() {
    let cell = UnitCell::new(&RawLatticeSpec::new(5.43018)).unwrap();
    let planes = diffraction::planes_within(&cell, 1.5);
    assert!(planes.iter().all(|p| p.d_spacing >= 1.5));

    let table = report::plane_table(&planes, diffraction::CU_K_ALPHA1, 5);
    assert!(table.contains("(1 0 0)"));

    let summary = report::cell_summary(&cell);
    assert!(summary.contains("System: Cubic"));
    assert!(summary.contains("Volume: 160.1189"));
}
