//! Vector math operations for Vec3
//! Provides methods for normalization, dot and cross products, angle
//! calculations, and the axis geometry used by the rotation trackers.

use super::Vec3;

impl Vec3 {
    /// Calculates the squared magnitude (length) of the vector.
    ///
    /// More efficient than `norm()` as it avoids the square root operation;
    /// use it when only comparing magnitudes.
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert_eq!(v.norm_squared(), 25.0);
    /// ```
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Calculates the magnitude (length) of the vector.
    ///
    /// Returns the Euclidean norm: √(x² + y² + z²)
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert_eq!(v.norm(), 5.0);
    /// ```
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Returns a unit vector in the same direction as this vector.
    ///
    /// If the vector has zero or near-zero magnitude (within floating-point
    /// epsilon), returns the zero vector to avoid division by zero.
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert!((v.normalize().norm() - 1.0).abs() < f64::EPSILON);
    /// assert_eq!(Vec3::zero().normalize(), Vec3::zero());
    /// ```
    pub fn normalize(&self) -> Self {
        let norm_sq = self.norm_squared();
        if norm_sq > f64::EPSILON * f64::EPSILON {
            let inv_norm = norm_sq.sqrt().recip();
            Vec3 {
                x: self.x * inv_norm,
                y: self.y * inv_norm,
                z: self.z * inv_norm,
            }
        } else {
            Vec3::zero()
        }
    }

    /// Calculates the dot product (scalar product) with another vector.
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let a = Vec3::new(1.0, 2.0, 3.0);
    /// let b = Vec3::new(4.0, 5.0, 6.0);
    /// assert_eq!(a.dot(&b), 32.0);
    /// ```
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Calculates the cross product with another vector.
    ///
    /// The result is perpendicular to both inputs and follows the right-hand
    /// rule; it vanishes for parallel vectors.
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let x = Vec3::new(1.0, 0.0, 0.0);
    /// let y = Vec3::new(0.0, 1.0, 0.0);
    /// assert_eq!(x.cross(&y), Vec3::new(0.0, 0.0, 1.0));
    /// ```
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Calculates the unsigned angle between two vectors in radians.
    ///
    /// Uses the dot product formula: θ = arccos((a·b)/(|a||b|)).
    /// Returns 0 for zero vectors. The result is always in `[0, π]`.
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// use std::f64::consts::PI;
    /// let x = Vec3::new(1.0, 0.0, 0.0);
    /// let y = Vec3::new(0.0, 1.0, 0.0);
    /// assert!((x.angle_between(&y) - PI / 2.0).abs() < 1e-10);
    /// ```
    pub fn angle_between(&self, other: &Self) -> f64 {
        let dot_product = self.dot(other);
        let norm_product_sq = self.norm_squared() * other.norm_squared();
        if norm_product_sq > f64::EPSILON * f64::EPSILON {
            // Clamp against rounding drift before acos
            (dot_product / norm_product_sq.sqrt()).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }

    /// Calculates the signed angle from this vector to `other`, measured
    /// about `axis`, in radians.
    ///
    /// The sign follows the right-hand rule around `axis`: positive when
    /// `other` is reached from `self` by a counter-clockwise rotation seen
    /// from the tip of the axis. The result is in `(-π, π]`. Both vectors
    /// are expected to be non-zero and roughly perpendicular to the axis,
    /// which the rotation trackers guarantee by construction.
    ///
    /// # Arguments
    /// * `other` - The target vector
    /// * `axis` - The **normalized** rotation axis
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// use std::f64::consts::PI;
    /// let x = Vec3::new(1.0, 0.0, 0.0);
    /// let y = Vec3::new(0.0, 1.0, 0.0);
    /// let z = Vec3::new(0.0, 0.0, 1.0);
    /// assert!((x.oriented_angle(&y, &z) - PI / 2.0).abs() < 1e-10);
    /// assert!((y.oriented_angle(&x, &z) + PI / 2.0).abs() < 1e-10);
    /// ```
    pub fn oriented_angle(&self, other: &Self, axis: &Self) -> f64 {
        let unsigned = self.angle_between(other);
        if self.cross(other).dot(axis) < 0.0 {
            -unsigned
        } else {
            unsigned
        }
    }

    /// Projects this point onto the infinite line through `origin` with
    /// direction `axis`, returning the closest point on the line.
    ///
    /// # Arguments
    /// * `origin` - A point on the line
    /// * `axis` - The **normalized** direction of the line
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let p = Vec3::new(3.0, 4.0, 7.0);
    /// let z = Vec3::new(0.0, 0.0, 1.0);
    /// let on_axis = p.project_onto_axis(&Vec3::zero(), &z);
    /// assert_eq!(on_axis, Vec3::new(0.0, 0.0, 7.0));
    /// ```
    pub fn project_onto_axis(&self, origin: &Self, axis: &Self) -> Self {
        let relative = self - origin;
        let along = relative.dot(axis);
        origin + &(*axis * along)
    }

    /// Returns the component of this point perpendicular to the line through
    /// `origin` with direction `axis` (the radial offset from the axis).
    ///
    /// The norm of the result is the distance between the point and the
    /// line; the rotation trackers use it to reject atoms sitting on the
    /// rotation axis.
    pub fn reject_from_axis(&self, origin: &Self, axis: &Self) -> Self {
        self - &self.project_onto_axis(origin, axis)
    }

    /// Checks if this vector is approximately equal to another within an
    /// epsilon tolerance, compared per component.
    ///
    /// # Examples
    /// ```
    /// # use steering_lib::vector::Vec3;
    /// let v1 = Vec3::new(1.0, 2.0, 3.0);
    /// let v2 = Vec3::new(1.0000001, 2.0000001, 3.0000001);
    /// assert!(v1.approx_eq(&v2, 1e-6));
    /// assert!(!v1.approx_eq(&v2, 1e-8));
    /// ```
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        let epsilon = epsilon.max(f64::EPSILON); // Ensure non-zero epsilon
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}
