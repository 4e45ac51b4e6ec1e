//! # Vector operations for Vec3
//! This module provides implementations of the arithmetic operations for the
//! `Vec3` struct: addition, subtraction, scalar multiplication, scalar
//! division, and negation, via Rust's operator overloading traits
//! (`Add`, `Sub`, `Mul`, `Div`, `Neg`).

use super::Vec3;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Vector addition by value (Vec3 + Vec3).
///
/// # Examples
/// ```
/// # use steering_lib::vector::Vec3;
/// let a = Vec3::new(1.0, 2.0, 3.0);
/// let b = Vec3::new(4.0, 5.0, 6.0);
/// assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
/// ```
impl Add for Vec3 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Vec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

/// Vector addition by reference (&Vec3 + &Vec3).
///
/// Preserves the original vectors; this is the common pattern in the
/// per-cycle update loops where positions are reused across operations.
impl Add for &Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: &Vec3) -> Self::Output {
        Vec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

/// Vector subtraction by value (Vec3 - Vec3).
///
/// The result is the displacement from `rhs` to `self`.
///
/// # Examples
/// ```
/// # use steering_lib::vector::Vec3;
/// let a = Vec3::new(5.0, 7.0, 9.0);
/// let b = Vec3::new(1.0, 2.0, 3.0);
/// assert_eq!(a - b, Vec3::new(4.0, 5.0, 6.0));
/// ```
impl Sub for Vec3 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// Vector subtraction by reference (&Vec3 - &Vec3).
impl Sub for &Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: &Vec3) -> Self::Output {
        Vec3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// Scalar multiplication (Vec3 * f64).
///
/// # Examples
/// ```
/// # use steering_lib::vector::Vec3;
/// let v = Vec3::new(1.0, -2.0, 3.0);
/// assert_eq!(v * 2.0, Vec3::new(2.0, -4.0, 6.0));
/// ```
impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Vec3 {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

/// Scalar multiplication with the scalar on the left (f64 * Vec3).
impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline]
    fn mul(self, vector: Vec3) -> Self::Output {
        vector * self
    }
}

/// Scalar division (Vec3 / f64).
///
/// Division by zero follows IEEE 754 semantics and produces infinities;
/// callers on the centroid path guard against empty selections instead.
impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline]
    fn div(self, scalar: f64) -> Self::Output {
        Vec3 {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

/// Negation (-Vec3).
///
/// # Examples
/// ```
/// # use steering_lib::vector::Vec3;
/// let v = Vec3::new(1.0, -2.0, 3.0);
/// assert_eq!(-v, Vec3::new(-1.0, 2.0, -3.0));
/// ```
impl Neg for Vec3 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}
