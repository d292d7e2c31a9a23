//! Vector helpers shared by every decision tier
//!
//! Thin layer over `glam::Vec3`. Y is up; the ground plane is XZ.
//! Every function is total: degenerate input yields the zero vector.

use glam::Vec3;

/// Vectors shorter than this normalize to zero
pub const NORMALIZE_EPSILON: f32 = 1e-4;

/// Euclidean distance in 3D
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Horizontal distance, ignoring height
pub fn distance_xz(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit vector in the direction of `v`, or zero if `v` is (nearly) zero
pub fn normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len < NORMALIZE_EPSILON {
        Vec3::ZERO
    } else {
        v / len
    }
}

/// Normalized direction pointing from `src` to `dst`
pub fn direction_to(src: Vec3, dst: Vec3) -> Vec3 {
    normalize(dst - src)
}

/// Rotate `v` around the Y axis by `degrees`
///
/// Positive angles turn +Z toward +X.
pub fn rotate_y(v: Vec3, degrees: f32) -> Vec3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

/// Ground-plane right vector for a facing direction
///
/// Facing +Z gives +X. A facing with no horizontal component yields zero.
pub fn right_of(forward: Vec3) -> Vec3 {
    normalize(Vec3::new(forward.z, 0.0, -forward.x))
}

/// Whether `v` is the zero vector or has unit length (within `tolerance`)
pub fn is_unit_or_zero(v: Vec3, tolerance: f32) -> bool {
    v == Vec3::ZERO || (v.length() - 1.0).abs() <= tolerance
}
