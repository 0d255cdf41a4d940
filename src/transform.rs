use crate::error::{Result, TransformError};
use crate::math::Vector3;

/// A spatial transformation record.
///
/// Transformations are not applied eagerly: entities accumulate an ordered
/// list of records that downstream consumers replay when realizing the
/// geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transformation {
    /// Displacement along each axis.
    Translation(Vector3),
    /// Rotation angles about the x, y and z axes.
    Rotation(Vector3),
    /// Per-axis scale factors, each strictly positive.
    Scaling(Vector3),
}

impl Transformation {
    /// Creates a translation record.
    #[must_use]
    pub fn translation(displacement: Vector3) -> Self {
        Self::Translation(displacement)
    }

    /// Creates a rotation record from per-axis angles.
    #[must_use]
    pub fn rotation(angles: Vector3) -> Self {
        Self::Rotation(angles)
    }

    /// Creates a scaling record.
    ///
    /// # Errors
    ///
    /// Returns an error if any factor is zero or negative.
    pub fn scaling(factors: Vector3) -> Result<Self> {
        for factor in [factors.x, factors.y, factors.z] {
            if factor <= 0.0 {
                return Err(TransformError::NonPositiveScale { factor }.into());
            }
        }
        Ok(Self::Scaling(factors))
    }

    /// Returns the transformation kind as a lowercase tag.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Translation(_) => "translation",
            Self::Rotation(_) => "rotation",
            Self::Scaling(_) => "scaling",
        }
    }

    /// Returns the three values carried by the record.
    #[must_use]
    pub fn values(&self) -> [f64; 3] {
        let v = match self {
            Self::Translation(v) | Self::Rotation(v) | Self::Scaling(v) => v,
        };
        [v.x, v.y, v.z]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn scaling_rejects_non_positive_factors() {
        assert!(Transformation::scaling(Vector3::new(1.0, 0.0, 1.0)).is_err());
        assert!(Transformation::scaling(Vector3::new(-2.0, 1.0, 1.0)).is_err());
        assert!(Transformation::scaling(Vector3::new(0.5, 2.0, 1.0)).is_ok());
    }

    #[test]
    fn translation_accepts_any_values() {
        let t = Transformation::translation(Vector3::new(-1.0, 0.0, 3.5));
        assert_eq!(t.kind_name(), "translation");
        assert_eq!(t.values(), [-1.0, 0.0, 3.5]);
    }
}
