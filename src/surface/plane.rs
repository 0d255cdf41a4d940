use crate::error::{Result, SurfaceError};
use crate::math::{Point3, TOLERANCE};

/// An infinite plane defined implicitly by `a*x + b*y + c*z - d = 0`.
///
/// The halfspace sign convention follows the defining equation: points with
/// `a*x + b*y + c*z > d` evaluate positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
}

impl Plane {
    /// Creates a plane from its four coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal `(a, b, c)` is (numerically) zero.
    pub fn new(name: &str, a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        if a.abs() < TOLERANCE && b.abs() < TOLERANCE && c.abs() < TOLERANCE {
            return Err(SurfaceError::DegeneratePlane { name: name.into() }.into());
        }
        Ok(Self { a, b, c, d })
    }

    /// Creates a plane passing through three points.
    ///
    /// The normal is `(p2 - p1) x (p3 - p1)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are collinear.
    pub fn from_points(name: &str, p1: &Point3, p2: &Point3, p3: &Point3) -> Result<Self> {
        let u = p2 - p1;
        let v = p3 - p1;
        let normal = u.cross(&v);
        if normal.norm() < TOLERANCE {
            return Err(SurfaceError::CollinearPoints { name: name.into() }.into());
        }
        let d = normal.dot(&p1.coords);
        Ok(Self {
            a: normal.x,
            b: normal.y,
            c: normal.z,
            d,
        })
    }

    /// Signed value of the defining equation at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        self.a * point.x + self.b * point.y + self.c * point.z - self.d
    }

    /// Coefficients in serialization order.
    #[must_use]
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        vec![("a", self.a), ("b", self.b), ("c", self.c), ("d", self.d)]
    }
}
