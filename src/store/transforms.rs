use super::GeometryStore;
use crate::error::Result;
use crate::lattice::LatticeId;
use crate::math::Vector3;
use crate::region::Region;
use crate::surface::{SurfaceId, SurfaceKey};
use crate::transform::Transformation;
use crate::universe::UniverseId;

/// What a transformation applies to.
///
/// A region target fans the record out to every surface the region
/// references.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Surface(SurfaceId),
    Universe(UniverseId),
    Lattice(LatticeId),
    Region(&'a Region),
}

impl From<SurfaceId> for Target<'_> {
    fn from(id: SurfaceId) -> Self {
        Target::Surface(id)
    }
}

impl From<UniverseId> for Target<'_> {
    fn from(id: UniverseId) -> Self {
        Target::Universe(id)
    }
}

impl From<LatticeId> for Target<'_> {
    fn from(id: LatticeId) -> Self {
        Target::Lattice(id)
    }
}

impl<'a> From<&'a Region> for Target<'a> {
    fn from(region: &'a Region) -> Self {
        Target::Region(region)
    }
}

impl GeometryStore {
    /// Appends a transformation record to the target.
    ///
    /// Ownership of the target is validated before anything is mutated;
    /// for a region target every referenced surface receives the record
    /// once, duplicates notwithstanding.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not owned by this store.
    pub fn apply_transformation<'a>(
        &mut self,
        target: impl Into<Target<'a>>,
        transformation: Transformation,
    ) -> Result<()> {
        match target.into() {
            Target::Surface(id) => {
                self.surface_mut(id)?.push_transformation(transformation);
            }
            Target::Universe(id) => {
                self.universe_mut(id)?.push_transformation(transformation);
            }
            Target::Lattice(id) => {
                self.lattice_mut(id)?.push_transformation(transformation);
            }
            Target::Region(region) => {
                self.check_region_surfaces(region)?;
                let mut seen: Vec<SurfaceKey> = Vec::new();
                for id in region.surfaces() {
                    if seen.contains(&id.key) {
                        continue;
                    }
                    seen.push(id.key);
                    self.surface_mut(*id)?.push_transformation(transformation);
                }
            }
        }
        Ok(())
    }

    /// Appends a translation record to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not owned by this store.
    pub fn translate<'a>(
        &mut self,
        target: impl Into<Target<'a>>,
        displacement: Vector3,
    ) -> Result<()> {
        self.apply_transformation(target, Transformation::translation(displacement))
    }

    /// Appends a rotation record to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is not owned by this store.
    pub fn rotate<'a>(&mut self, target: impl Into<Target<'a>>, angles: Vector3) -> Result<()> {
        self.apply_transformation(target, Transformation::rotation(angles))
    }

    /// Appends a scaling record to the target.
    ///
    /// # Errors
    ///
    /// Returns an error if any factor is not strictly positive or the
    /// target is not owned by this store.
    pub fn scale<'a>(&mut self, target: impl Into<Target<'a>>, factors: Vector3) -> Result<()> {
        let transformation = Transformation::scaling(factors)?;
        self.apply_transformation(target, transformation)
    }
}
