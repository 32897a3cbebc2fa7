//! 4x4 Matrix utilities for model transforms
//!
//! Matrices are plain column-major arrays (`m[column][row]`), which keeps
//! them trivially serializable and cheap to compare. This module provides
//! what the world-transform filter needs: point transforms, the normal
//! matrix (inverse-transpose of the linear part) and identity checks.

use crate::Vec3;

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f64; 4]; 4];

/// 3x3 matrix type (column-major)
pub type Mat3 = [[f64; 3]; 3];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Pivots smaller than this are treated as singular
const SINGULAR_EPSILON: f64 = 1e-14;

/// Create a rotation matrix in a specific 2D plane.
///
/// # Arguments
/// * `angle` - Rotation angle in radians
/// * `p1`, `p2` - Indices of the axes forming the rotation plane (0=X, 1=Y, 2=Z)
///
/// # Example
/// ```
/// use meshprep_math::mat4::plane_rotation;
/// // Rotate about Z (the XY plane)
/// let yaw = plane_rotation(0.5, 0, 1);
/// ```
pub fn plane_rotation(angle: f64, p1: usize, p2: usize) -> Mat4 {
    let cs = angle.cos();
    let sn = angle.sin();

    let mut m = IDENTITY;

    m[p1][p1] = cs;
    m[p2][p2] = cs;
    m[p1][p2] = sn;
    m[p2][p1] = -sn;

    m
}

/// Create a translation matrix
pub fn from_translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Create a (possibly non-uniform) scale matrix
pub fn from_scale(s: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = s.x;
    m[1][1] = s.y;
    m[2][2] = s.z;
    m
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f64; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1) by an affine matrix
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0],
        m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1],
        m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2],
    )
}

/// Transform a vector by a 3x3 matrix
pub fn transform_vector(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Upper-left 3x3 (linear part) of a 4x4 matrix
pub fn get_matrix3(m: &Mat4) -> Mat3 {
    [
        [m[0][0], m[0][1], m[0][2]],
        [m[1][0], m[1][1], m[1][2]],
        [m[2][0], m[2][1], m[2][2]],
    ]
}

/// Transpose a matrix
pub fn transpose(m: Mat4) -> Mat4 {
    [
        [m[0][0], m[1][0], m[2][0], m[3][0]],
        [m[0][1], m[1][1], m[2][1], m[3][1]],
        [m[0][2], m[1][2], m[2][2], m[3][2]],
        [m[0][3], m[1][3], m[2][3], m[3][3]],
    ]
}

/// Invert a matrix with Gauss-Jordan elimination
///
/// Returns `None` if the matrix is singular.
#[allow(clippy::needless_range_loop)]
pub fn inverse(m: Mat4) -> Option<Mat4> {
    // Row-major augmented [M | I]
    let mut a = [[0.0f64; 8]; 4];
    for r in 0..4 {
        for c in 0..4 {
            a[r][c] = m[c][r];
        }
        a[r][4 + r] = 1.0;
    }

    for col in 0..4 {
        let pivot = (col..4).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < SINGULAR_EPSILON {
            return None;
        }
        a.swap(col, pivot);

        let p = a[col][col];
        for k in 0..8 {
            a[col][k] /= p;
        }

        let pivot_row = a[col];
        for r in 0..4 {
            if r == col {
                continue;
            }
            let factor = a[r][col];
            if factor != 0.0 {
                for k in 0..8 {
                    a[r][k] -= factor * pivot_row[k];
                }
            }
        }
    }

    let mut result = [[0.0f64; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            result[c][r] = a[r][4 + c];
        }
    }
    Some(result)
}

/// Matrix that transforms direction vectors (normals, tangents) consistently
/// with `m`: the transpose of the inverse of its linear part.
///
/// Returns `None` if `m` is singular.
pub fn normal_matrix(m: Mat4) -> Option<Mat3> {
    inverse(m).map(|inv| get_matrix3(&transpose(inv)))
}

/// Whether `m` is exactly the identity
#[inline]
pub fn is_identity(m: &Mat4) -> bool {
    *m == IDENTITY
}
