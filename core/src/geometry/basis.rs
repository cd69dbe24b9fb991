//! Orthonormal Basis

use super::vector3::{Vector3, Vector3f};
use crate::pbrt::*;

/// An orthonormal frame built around a unit normal. It is the local shading
/// coordinate system: `tangent_u`, `tangent_v` and `normal` map to the x, y
/// and z axes respectively.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Basis3f {
    /// The unit normal.
    normal: Vector3f,

    /// First tangent.
    tangent_u: Vector3f,

    /// Second tangent.
    tangent_v: Vector3f,
}

impl Basis3f {
    /// The basis aligned with the world axes with the normal along +z.
    pub const IDENTITY: Self = Self {
        normal: Vector3 { x: 0.0, y: 0.0, z: 1.0 },
        tangent_u: Vector3 { x: 1.0, y: 0.0, z: 0.0 },
        tangent_v: Vector3 { x: 0.0, y: 1.0, z: 0.0 },
    };

    /// Create a new `Basis3f` from a unit normal and a tangent. The tangent need
    /// not be unit length or perpendicular to the normal; it is projected into
    /// the plane of the normal. If it is parallel to the normal an arbitrary
    /// perpendicular is used instead.
    ///
    /// * `normal`    - The unit normal.
    /// * `tangent_u` - Tangent giving the orientation of the frame.
    pub fn new(normal: Vector3f, tangent_u: Vector3f) -> Self {
        debug_assert!(is_unit(&normal), "Basis normal {} is not unit length", normal);

        let v = normal.cross(&tangent_u);
        let v_length_squared = v.length_squared();
        if v_length_squared < Float::MIN_POSITIVE || !v_length_squared.is_finite() {
            return Self::from_normal(normal);
        }

        let tangent_v = v / v_length_squared.sqrt();
        let tangent_u = tangent_v.cross(&normal);
        Self {
            normal,
            tangent_u,
            tangent_v,
        }
    }

    /// Create a new `Basis3f` from a unit normal with an arbitrary orientation.
    ///
    /// * `normal` - The unit normal.
    pub fn from_normal(normal: Vector3f) -> Self {
        let (tangent_u, tangent_v) = coordinate_system_vectors(&normal);
        Self {
            normal,
            tangent_u,
            tangent_v,
        }
    }

    /// Returns the unit normal.
    #[inline(always)]
    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    /// Returns the first tangent.
    #[inline(always)]
    pub fn tangent_u(&self) -> Vector3f {
        self.tangent_u
    }

    /// Returns the second tangent.
    #[inline(always)]
    pub fn tangent_v(&self) -> Vector3f {
        self.tangent_v
    }

    /// Transforms a vector from world space to local space.
    ///
    /// * `v` - The vector to transform.
    pub fn world_to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.tangent_u), v.dot(&self.tangent_v), v.dot(&self.normal))
    }

    /// Transforms a vector from local space to world space.
    ///
    /// * `v` - The vector to transform.
    pub fn local_to_world(&self, v: &Vector3f) -> Vector3f {
        self.tangent_u * v.x + self.tangent_v * v.y + self.normal * v.z
    }
}

impl Default for Basis3f {
    /// Returns the basis aligned with the world axes with the normal along +z.
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Returns two unit vectors that together with the given unit vector form an
/// orthonormal coordinate system.
///
/// A second vector is constructed from the first by zeroing one of the
/// coordinates and swapping the remaining 2 and negating one of them. The
/// third vector is the cross product of the first and second.
///
/// * `v1` - The unit vector.
pub fn coordinate_system_vectors(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if abs(v1.x) > abs(v1.y) {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}

/// Returns true if the vector is unit length within a small tolerance.
fn is_unit(v: &Vector3f) -> bool {
    abs(v.length_squared() - 1.0) < 1e-3
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
