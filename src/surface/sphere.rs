use crate::error::{Result, SurfaceError};
use crate::math::{Point3, TOLERANCE};

/// A sphere defined implicitly by
/// `(x - x0)^2 + (y - y0)^2 + (z - z0)^2 - r^2 = 0`.
///
/// Points outside the sphere evaluate positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    x0: f64,
    y0: f64,
    z0: f64,
    r: f64,
}

impl Sphere {
    /// Creates a sphere from its center and radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is not strictly positive.
    pub fn new(name: &str, center: Point3, r: f64) -> Result<Self> {
        if r < TOLERANCE {
            return Err(SurfaceError::NonPositiveRadius {
                name: name.into(),
                radius: r,
            }
            .into());
        }
        Ok(Self {
            x0: center.x,
            y0: center.y,
            z0: center.z,
            r,
        })
    }

    /// Signed value of the defining equation at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        let dx = point.x - self.x0;
        let dy = point.y - self.y0;
        let dz = point.z - self.z0;
        dx * dx + dy * dy + dz * dz - self.r * self.r
    }

    /// Returns the radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.r
    }

    /// Coefficients in serialization order.
    #[must_use]
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("x0", self.x0),
            ("y0", self.y0),
            ("z0", self.z0),
            ("r", self.r),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn evaluate_inside_and_outside() {
        let s = Sphere::new("s", Point3::origin(), 1.0).unwrap();
        assert_relative_eq!(s.evaluate(&Point3::origin()), -1.0);
        assert_relative_eq!(s.evaluate(&Point3::new(2.0, 0.0, 0.0)), 3.0);
    }

    #[test]
    fn offset_center() {
        let s = Sphere::new("s", Point3::new(1.0, 2.0, 3.0), 2.0).unwrap();
        assert_relative_eq!(s.evaluate(&Point3::new(1.0, 2.0, 3.0)), -4.0);
        assert_relative_eq!(s.evaluate(&Point3::new(3.0, 2.0, 3.0)), 0.0);
    }

    #[test]
    fn invalid_radius() {
        assert!(Sphere::new("s", Point3::origin(), 0.0).is_err());
        assert!(Sphere::new("s", Point3::origin(), -1.0).is_err());
    }
}
