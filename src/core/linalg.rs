//! Fixed-size linear algebra for the four-component field state.

use nalgebra as na;

/// 4D vector alias.
pub type Vec4 = na::Vector4<f64>;
/// 4x4 matrix alias.
pub type Mat4 = na::Matrix4<f64>;

/// Build a 4x4 matrix from row-major nested rows.
///
/// Returns `None` unless `rows` is exactly four rows of four values.
pub fn mat4_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Option<Mat4> {
    if rows.len() != 4 || rows.iter().any(|r| r.as_ref().len() != 4) {
        return None;
    }
    Some(Mat4::from_fn(|i, j| rows[i].as_ref()[j]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_to_row_major_entries() {
        let rows = [
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ];
        let m = mat4_from_rows(&rows).expect("4x4");
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m[(2, 0)], 9.0);
        let v = m * Vec4::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!(v, Vec4::new(1.0, 5.0, 9.0, 13.0));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        assert!(mat4_from_rows::<Vec<f64>>(&[]).is_none());
        assert!(mat4_from_rows(&vec![vec![0.0; 4]; 3]).is_none());
        assert!(mat4_from_rows(&vec![vec![0.0; 4]; 5]).is_none());
        let ragged = vec![vec![0.0; 4], vec![0.0; 4], vec![0.0; 3], vec![0.0; 4]];
        assert!(mat4_from_rows(&ragged).is_none());
    }
}
