mod cylinder;
mod plane;
mod sphere;

pub use cylinder::{Axis, Cylinder};
pub use plane::Plane;
pub use sphere::Sphere;

use crate::error::{Result, SurfaceError};
use crate::math::{Point3, TOLERANCE};
use crate::region::Region;
use crate::transform::Transformation;

slotmap::new_key_type! {
    /// Slot key for a surface within a geometry store.
    pub struct SurfaceKey;
}

/// Handle to a surface owned by a [`GeometryStore`](crate::store::GeometryStore).
///
/// Handles remember the store that created them; passing one to a different
/// store is rejected rather than silently resolving a name-equal stranger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    pub(crate) store: u64,
    pub(crate) key: SurfaceKey,
}

impl SurfaceId {
    /// Builds the halfspace region on the positive side of this surface.
    #[must_use]
    pub fn pos(self) -> Region {
        Region::halfspace(self, Halfspace::Positive)
    }

    /// Builds the halfspace region on the negative side of this surface.
    ///
    /// The unary minus operator does the same thing.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn neg(self) -> Region {
        Region::halfspace(self, Halfspace::Negative)
    }
}

impl std::ops::Neg for SurfaceId {
    type Output = Region;

    fn neg(self) -> Region {
        SurfaceId::neg(self)
    }
}

/// Side of a surface, per the sign of its defining equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Halfspace {
    Positive,
    Negative,
}

impl Halfspace {
    /// Returns the sign glyph used in the postfix token stream.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Halfspace::Positive => '+',
            Halfspace::Negative => '-',
        }
    }
}

/// The closed set of implicit surface kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceKind {
    Plane(Plane),
    Sphere(Sphere),
    Cylinder(Cylinder),
}

impl SurfaceKind {
    /// Signed value of the defining equation at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        match self {
            SurfaceKind::Plane(p) => p.evaluate(point),
            SurfaceKind::Sphere(s) => s.evaluate(point),
            SurfaceKind::Cylinder(c) => c.evaluate(point),
        }
    }

    /// Returns the kind as a lowercase tag used in serialization.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            SurfaceKind::Plane(_) => "plane",
            SurfaceKind::Sphere(_) => "sphere",
            SurfaceKind::Cylinder(c) => match c.axis() {
                Axis::X => "x_cylinder",
                Axis::Y => "y_cylinder",
                Axis::Z => "z_cylinder",
            },
        }
    }

    /// Coefficients in serialization order.
    #[must_use]
    pub fn coefficients(&self) -> Vec<(&'static str, f64)> {
        match self {
            SurfaceKind::Plane(p) => p.coefficients(),
            SurfaceKind::Sphere(s) => s.coefficients(),
            SurfaceKind::Cylinder(c) => c.coefficients(),
        }
    }
}

/// A named implicit surface.
///
/// Surfaces are created through the store factories and are immutable
/// afterwards, except for store-mediated renames and appended
/// transformation records. Equality is structural: kind, coefficients and
/// transformations; the name is the lookup key, not part of the value.
#[derive(Debug, Clone)]
pub struct Surface {
    name: String,
    kind: SurfaceKind,
    transforms: Vec<Transformation>,
}

impl Surface {
    pub(crate) fn new(name: &str, kind: SurfaceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transforms: Vec::new(),
        }
    }

    /// Returns the surface name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the surface kind and coefficients.
    #[must_use]
    pub fn kind(&self) -> &SurfaceKind {
        &self.kind
    }

    /// Signed value of the defining equation at `point`.
    #[must_use]
    pub fn evaluate(&self, point: &Point3) -> f64 {
        self.kind.evaluate(point)
    }

    /// Classifies `point` as lying on the positive or negative side.
    ///
    /// # Errors
    ///
    /// Returns an error if the point lies exactly on the surface: the
    /// query has no well-defined answer there.
    pub fn halfspace_of(&self, point: &Point3) -> Result<Halfspace> {
        let value = self.evaluate(point);
        if value.abs() < TOLERANCE {
            return Err(SurfaceError::AmbiguousHalfspace {
                name: self.name.clone(),
            }
            .into());
        }
        if value > 0.0 {
            Ok(Halfspace::Positive)
        } else {
            Ok(Halfspace::Negative)
        }
    }

    /// Returns the accumulated transformation records, oldest first.
    #[must_use]
    pub fn transformations(&self) -> &[Transformation] {
        &self.transforms
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.into();
    }

    pub(crate) fn push_transformation(&mut self, t: Transformation) {
        self.transforms.push(t);
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.transforms == other.transforms
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn halfspace_classification() {
        let s = Surface::new(
            "s",
            SurfaceKind::Sphere(Sphere::new("s", Point3::origin(), 1.0).unwrap()),
        );
        assert_eq!(
            s.halfspace_of(&Point3::origin()).unwrap(),
            Halfspace::Negative
        );
        assert_eq!(
            s.halfspace_of(&Point3::new(2.0, 0.0, 0.0)).unwrap(),
            Halfspace::Positive
        );
    }

    #[test]
    fn point_on_surface_is_ambiguous() {
        let s = Surface::new(
            "s",
            SurfaceKind::Sphere(Sphere::new("s", Point3::origin(), 1.0).unwrap()),
        );
        assert!(s.halfspace_of(&Point3::new(1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn structural_equality_ignores_name() {
        let a = Surface::new(
            "a",
            SurfaceKind::Sphere(Sphere::new("a", Point3::origin(), 1.0).unwrap()),
        );
        let b = Surface::new(
            "b",
            SurfaceKind::Sphere(Sphere::new("b", Point3::origin(), 1.0).unwrap()),
        );
        let c = Surface::new(
            "c",
            SurfaceKind::Sphere(Sphere::new("c", Point3::origin(), 2.0).unwrap()),
        );
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
