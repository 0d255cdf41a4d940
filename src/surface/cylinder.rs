use crate::error::{Result, SurfaceError};
use crate::math::{Point3, TOLERANCE};

/// Coordinate axis an infinite cylinder is aligned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// An infinite cylinder aligned with a coordinate axis.
///
/// For an x-aligned cylinder the defining equation is
/// `(y - y0)^2 + (z - z0)^2 - r^2 = 0`; the y- and z-aligned variants
/// permute accordingly. Points outside the cylinder evaluate positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    axis: Axis,
    /// Center coordinate along the first off-axis direction.
    c1: f64,
    /// Center coordinate along the second off-axis direction.
    c2: f64,
    r: f64,
}

impl Cylinder {
    /// Creates a cylinder aligned with `axis`.
    ///
    /// `c1` and `c2` are the axis center coordinates in the two remaining
    /// directions, in x-before-y-before-z order.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not strictly positive.
    pub fn new(name: &str, axis: Axis, c1: f64, c2: f64, r: f64) -> Result<Self> {
        if r < TOLERANCE {
            return Err(SurfaceError::NonPositiveRadius {
                name: name.into(),
                radius: r,
            }
            .into());
        }
        Ok(Self { axis, c1, c2, r })
    }

    /// Signed value of the defining equation at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        let (u, v) = match self.axis {
            Axis::X => (point.y, point.z),
            Axis::Y => (point.x, point.z),
            Axis::Z => (point.x, point.y),
        };
        let du = u - self.c1;
        let dv = v - self.c2;
        du * du + dv * dv - self.r * self.r
    }

    /// Returns the alignment axis.
    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.r
    }

    /// Coefficients in serialization order, named per axis variant.
    #[must_use]
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        let (n1, n2) = match self.axis {
            Axis::X => ("y0", "z0"),
            Axis::Y => ("x0", "z0"),
            Axis::Z => ("x0", "y0"),
        };
        vec![(n1, self.c1), (n2, self.c2), ("r", self.r)]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn z_cylinder_ignores_z() {
        let c = Cylinder::new("c", Axis::Z, 0.0, 0.0, 1.0).unwrap();
        assert_relative_eq!(c.evaluate(&Point3::new(0.0, 0.0, 10.0)), -1.0);
        assert_relative_eq!(c.evaluate(&Point3::new(2.0, 0.0, -3.0)), 3.0);
    }

    #[test]
    fn x_cylinder_offset_center() {
        let c = Cylinder::new("c", Axis::X, 1.0, 2.0, 1.0).unwrap();
        assert_relative_eq!(c.evaluate(&Point3::new(5.0, 1.0, 2.0)), -1.0);
        assert_relative_eq!(c.evaluate(&Point3::new(0.0, 3.0, 2.0)), 3.0);
    }

    #[test]
    fn invalid_radius() {
        assert!(Cylinder::new("c", Axis::Y, 0.0, 0.0, -0.5).is_err());
    }
}
