// src/utils/report.rs

use crate::model::miller::MillerPlane;
use crate::physics::diffraction;
use crate::physics::unit_cell::UnitCell;

/// Plain-text overview of a cell: parameters, volumes and reciprocal cell
pub fn cell_summary(cell: &UnitCell) -> String {
    let lat = cell.lattice();
    let rec = cell.reciprocal_lattice();

    let mut out = String::new();
    out.push_str(&format!("System: {}\n", lat.crystal_system()));
    out.push_str(&format!("Family: {}\n", cell.crystal_family()));
    if let Some(slot) = lat.principal_axis().angle_slot() {
        out.push_str(&format!("Unique axis: {}\n", ["a", "b", "c"][slot]));
    }
    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!(
        "{:<10} {:<12} {:<12} {:<12}\n",
        "", "a", "b", "c"
    ));
    out.push_str(&format!(
        "{:<10} {:<12.5} {:<12.5} {:<12.5}\n",
        "Direct", lat.a(), lat.b(), lat.c()
    ));
    out.push_str(&format!(
        "{:<10} {:<12.6} {:<12.6} {:<12.6}\n",
        "Recip.", rec.a, rec.b, rec.c
    ));
    out.push_str(&format!(
        "{:<10} {:<12} {:<12} {:<12}\n",
        "", "alpha", "beta", "gamma"
    ));
    out.push_str(&format!(
        "{:<10} {:<12.4} {:<12.4} {:<12.4}\n",
        "Direct", lat.al(), lat.be(), lat.ga()
    ));
    out.push_str(&format!(
        "{:<10} {:<12.4} {:<12.4} {:<12.4}\n",
        "Recip.", rec.al, rec.be, rec.ga
    ));
    out.push_str("--------------------------------------------------\n");
    out.push_str(&format!("Volume: {:.4} Å³\n", cell.volume()));
    out.push_str(&format!("Reciprocal volume: {:.6e} Å⁻³\n", cell.reciprocal_volume()));

    out
}

/// d-spacing table. 2θ is shown for the given wavelength, or "-" where the
/// plane cannot diffract.
pub fn plane_table(planes: &[MillerPlane], wavelength: f64, limit: usize) -> String {
    if planes.is_empty() {
        return "No planes.".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<14} {:<12} {:<12} {:<10}\n",
        "(h k l)", "d (Å)", "Q (1/Å)", "2θ (°)"
    ));
    out.push_str("--------------------------------------------------\n");

    for plane in planes.iter().take(limit) {
        let two_theta = diffraction::d_to_two_theta(plane.d_spacing, wavelength)
            .map(|t| format!("{:.3}", t))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<14} {:<12.5} {:<12.5} {:<10}\n",
            plane.index.to_string(),
            plane.d_spacing,
            plane.q_spacing(),
            two_theta
        ));
    }

    if planes.len() > limit {
        out.push_str(&format!("... and {} more planes.\n", planes.len() - limit));
    }

    out
}
