// src/utils/linalg.rs

use crate::error::{CrystalError, Result};
use nalgebra::{Matrix3, Vector3};

/// Magnitude below which tensor elements and quadratic forms are treated as 0.
pub const ZERO_SNAP: f64 = 1e-10;

/// Replace floating point noise (e.g. `cos(90°)`) with an exact zero.
pub fn snap_to_zero(value: f64) -> f64 {
  if value.abs() < ZERO_SNAP {
    0.0
  } else {
    value
  }
}

/// Build the metric tensor from cell lengths and angles (radians)
///
/// # Formula
/// ```text
///     | a²          ab·cos γ    ac·cos β |
/// G = | ab·cos γ    b²          bc·cos α |
///     | ac·cos β    bc·cos α    c²       |
/// ```
pub fn metric_tensor(lengths: [f64; 3], angles: [f64; 3]) -> Matrix3<f64> {
  let [a, b, c] = lengths;
  let [al, be, ga] = angles;

  let ab = snap_to_zero(a * b * ga.cos());
  let ac = snap_to_zero(a * c * be.cos());
  let bc = snap_to_zero(b * c * al.cos());

  Matrix3::new(
    a * a, ab, ac, //
    ab, b * b, bc, //
    ac, bc, c * c,
  )
}

/// det(G) / (a·b·c)² below which a cell counts as flat.
pub const SINGULAR_FLOOR: f64 = 1e-10;

/// True when det(G) is not safely above zero relative to the squared edge
/// lengths. Rounding can leave a flat cell with a tiny positive determinant.
pub fn is_degenerate(tensor: &Matrix3<f64>) -> bool {
  let scale = tensor[(0, 0)] * tensor[(1, 1)] * tensor[(2, 2)];
  let determinant = tensor.determinant();
  !(scale > 0.0) || !(determinant > SINGULAR_FLOOR * scale)
}

/// Invert a metric tensor, refusing non-physical (non positive-definite) cells.
pub fn invert_metric(tensor: &Matrix3<f64>) -> Result<Matrix3<f64>> {
  let determinant = tensor.determinant();
  if is_degenerate(tensor) {
    return Err(CrystalError::SingularLattice { determinant });
  }
  tensor
    .try_inverse()
    .ok_or(CrystalError::SingularLattice { determinant })
}

/// Invert a general 3x3 transform.
pub fn invert(matrix: &Matrix3<f64>) -> Result<Matrix3<f64>> {
  matrix
    .try_inverse()
    .ok_or_else(|| CrystalError::SingularLattice {
      determinant: matrix.determinant(),
    })
}

/// Lengths and angles (degrees) recovered from a metric tensor.
pub fn cell_from_metric(tensor: &Matrix3<f64>) -> ([f64; 3], [f64; 3]) {
  let lengths = [
    tensor[(0, 0)].sqrt(),
    tensor[(1, 1)].sqrt(),
    tensor[(2, 2)].sqrt(),
  ];
  // Angle i sits between the two other axes
  let angle = |j: usize, k: usize| {
    (tensor[(j, k)] / (lengths[j] * lengths[k]))
      .clamp(-1.0, 1.0)
      .acos()
      .to_degrees()
  };
  (lengths, [angle(1, 2), angle(0, 2), angle(0, 1)])
}

/// Coerce a slice into a 3-vector.
pub fn to_vector3(values: &[f64]) -> Result<Vector3<f64>> {
  match *values {
    [x, y, z] => Ok(Vector3::new(x, y, z)),
    _ => Err(CrystalError::Shape {
      expected: 3,
      got: values.len(),
    }),
  }
}

/// vᵀ · G · w
pub fn tensor_product(v: &Vector3<f64>, tensor: &Matrix3<f64>, w: &Vector3<f64>) -> f64 {
  v.dot(&(tensor * w))
}

/// |v| = sqrt(vᵀ · G · v), with rounding artifacts near zero removed
pub fn tensor_norm(v: &Vector3<f64>, tensor: &Matrix3<f64>) -> f64 {
  let product = tensor_product(v, tensor, v);
  if product.abs() <= ZERO_SNAP {
    0.0
  } else {
    product.sqrt()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_relative_eq;

  #[test]
  fn test_cubic_metric_is_diagonal() {
    let right = 90f64.to_radians();
    let g = metric_tensor([3.0, 3.0, 3.0], [right; 3]);

    assert_eq!(g, Matrix3::from_diagonal_element(9.0));
  }

  #[test]
  fn test_snap_to_zero() {
    assert_eq!(snap_to_zero(5e-11), 0.0);
    assert_eq!(snap_to_zero(-5e-11), 0.0);
    assert_eq!(snap_to_zero(2e-10), 2e-10);
  }

  #[test]
  fn test_invert_rejects_degenerate() {
    let flat = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, 0.0));
    assert!(matches!(
      invert_metric(&flat),
      Err(CrystalError::SingularLattice { .. })
    ));

    let negative = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
    assert!(invert_metric(&negative).is_err());
  }

  #[test]
  fn test_rounding_residue_counts_as_flat() {
    // Three 120° angles: coplanar axes, det(G) is zero up to rounding
    let flat = metric_tensor([3.0; 3], [120f64.to_radians(); 3]);
    assert!(flat.determinant().abs() < 1e-9);
    assert!(is_degenerate(&flat));
    assert!(matches!(
      invert_metric(&flat),
      Err(CrystalError::SingularLattice { .. })
    ));

    let sound = metric_tensor([3.0; 3], [100f64.to_radians(); 3]);
    assert!(!is_degenerate(&sound));
  }

  #[test]
  fn test_cell_from_metric_roundtrip() {
    let angles = [82.4809f64, 69.2610, 69.2584];
    let g = metric_tensor(
      [7.19196, 8.12720, 8.12771],
      angles.map(|x| x.to_radians()),
    );
    let (lengths, back) = cell_from_metric(&g);

    assert_relative_eq!(lengths[0], 7.19196, epsilon = 1e-10);
    assert_relative_eq!(lengths[2], 8.12771, epsilon = 1e-10);
    for (x, y) in back.iter().zip(angles.iter()) {
      assert_relative_eq!(*x, *y, epsilon = 1e-9);
    }
  }

  #[test]
  fn test_to_vector3_shape() {
    assert_eq!(to_vector3(&[1.0, 2.0, 3.0]).unwrap(), Vector3::new(1.0, 2.0, 3.0));
    assert!(matches!(
      to_vector3(&[1.0, 2.0]),
      Err(CrystalError::Shape { expected: 3, got: 2 })
    ));
    assert!(to_vector3(&[1.0, 2.0, 3.0, 4.0]).is_err());
  }

  #[test]
  fn test_tensor_norm() {
    let g = Matrix3::from_diagonal(&Vector3::new(4.0, 9.0, 25.0));
    assert_relative_eq!(tensor_norm(&Vector3::new(1.0, 1.0, 1.0), &g), 38f64.sqrt());
    assert_eq!(tensor_norm(&Vector3::zeros(), &g), 0.0);
  }
}
