//! Point type and tolerance-based float comparison

use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

/// ULP factor used by [`compare`] and by `Point` equality
pub const DEFAULT_ULP: u32 = 10;

/// Floating point types that support ULP-scaled approximate equality
pub trait UlpEq: Copy {
    /// Returns true when `self` and `other` differ by less than
    /// `EPSILON * |self + other| * ulp`, or by less than the smallest
    /// normal magnitude.
    fn ulp_eq(self, other: Self, ulp: u32) -> bool;
}

macro_rules! impl_ulp_eq {
    ($t:ty) => {
        impl UlpEq for $t {
            #[inline]
            fn ulp_eq(self, other: Self, ulp: u32) -> bool {
                let diff = (self - other).abs();
                diff < <$t>::EPSILON * (self + other).abs() * ulp as $t
                    || diff < <$t>::MIN_POSITIVE
            }
        }
    };
}

impl_ulp_eq!(f32);
impl_ulp_eq!(f64);

/// Compare two reals with the default ULP factor
///
/// This is not an equivalence relation: it is not transitive, and NaN or
/// infinite inputs never compare equal. That is inherent to tolerance-based
/// float comparison.
pub fn compare<T: UlpEq>(x: T, y: T) -> bool {
    x.ulp_eq(y, DEFAULT_ULP)
}

/// Compare two reals with an explicit ULP factor
pub fn compare_ulp<T: UlpEq>(x: T, y: T, ulp: u32) -> bool {
    x.ulp_eq(y, ulp)
}

/// A 3D point with single precision coordinates
///
/// The layout is `#[repr(C)]` and `Pod`, so a slice of points can be viewed
/// as a flat `x0, y0, z0, x1, ...` float buffer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    /// Create a point from its components
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The point at (0, 0, 0)
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        compare(self.x, other.x) && compare(self.y, other.y) && compare(self.z, other.z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.x, self.y, self.z)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul for Point {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        Point::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Div for Point {
    type Output = Point;

    fn div(self, rhs: Point) -> Point {
        Point::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Sum for Point {
    fn sum<I: Iterator<Item = Point>>(iter: I) -> Point {
        iter.fold(Point::origin(), Add::add)
    }
}

impl<'a> Sum<&'a Point> for Point {
    fn sum<I: Iterator<Item = &'a Point>>(iter: I) -> Point {
        iter.copied().sum()
    }
}

impl From<[f32; 3]> for Point {
    fn from(v: [f32; 3]) -> Self {
        Point::new(v[0], v[1], v[2])
    }
}

impl From<Point> for [f32; 3] {
    fn from(p: Point) -> Self {
        p.to_array()
    }
}

impl From<Point3<f32>> for Point {
    fn from(p: Point3<f32>) -> Self {
        Point::new(p.x, p.y, p.z)
    }
}

impl From<Point> for Point3<f32> {
    fn from(p: Point) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}
