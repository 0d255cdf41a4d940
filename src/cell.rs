use crate::error::{CellError, Result};
use crate::lattice::LatticeId;
use crate::region::Region;
use crate::universe::UniverseId;

slotmap::new_key_type! {
    /// Slot key for a cell within a geometry store.
    pub struct CellKey;
}

/// Handle to a cell owned by a [`GeometryStore`](crate::store::GeometryStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId {
    pub(crate) store: u64,
    pub(crate) key: CellKey,
}

/// What occupies the space a cell's region describes.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Void,
    /// An opaque material name; the material system itself lives elsewhere.
    Material(String),
    Universe(UniverseId),
    Lattice(LatticeId),
}

impl Fill {
    /// Returns the fill kind tag.
    #[must_use]
    pub fn fill_type(&self) -> FillType {
        match self {
            Fill::Void => FillType::Void,
            Fill::Material(_) => FillType::Material,
            Fill::Universe(_) => FillType::Universe,
            Fill::Lattice(_) => FillType::Lattice,
        }
    }
}

/// Kind tag of a cell fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillType {
    Void,
    Material,
    Universe,
    Lattice,
}

impl FillType {
    /// Returns the tag as a lowercase string.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FillType::Void => "void",
            FillType::Material => "material",
            FillType::Universe => "universe",
            FillType::Lattice => "lattice",
        }
    }
}

/// A named region paired with what fills it.
///
/// Cells are owned by the store and referenced by universes by identity;
/// they are never copied between containers. Equality compares name,
/// region and fill; within one store the fill handles are identity, which
/// makes the comparison recursive for universe and lattice fills.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    name: String,
    region: Region,
    fill: Fill,
}

impl Cell {
    pub(crate) fn new(name: &str, region: Region, fill: Fill) -> Self {
        Self {
            name: name.into(),
            region,
            fill,
        }
    }

    /// Returns the cell name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cell's region.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Returns the cell's fill.
    #[must_use]
    pub fn fill(&self) -> &Fill {
        &self.fill
    }

    /// Returns the fill kind tag.
    #[must_use]
    pub fn fill_type(&self) -> FillType {
        self.fill.fill_type()
    }

    /// Returns the material name of a material-filled cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the fill is not a material.
    pub fn material(&self) -> Result<&str> {
        match &self.fill {
            Fill::Material(name) => Ok(name),
            other => Err(self.mismatch(FillType::Material, other.fill_type()).into()),
        }
    }

    /// Returns the universe filling a universe-filled cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the fill is not a universe.
    pub fn universe(&self) -> Result<UniverseId> {
        match &self.fill {
            Fill::Universe(id) => Ok(*id),
            other => Err(self.mismatch(FillType::Universe, other.fill_type()).into()),
        }
    }

    /// Returns the lattice filling a lattice-filled cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the fill is not a lattice.
    pub fn lattice(&self) -> Result<LatticeId> {
        match &self.fill {
            Fill::Lattice(id) => Ok(*id),
            other => Err(self.mismatch(FillType::Lattice, other.fill_type()).into()),
        }
    }

    fn mismatch(&self, expected: FillType, actual: FillType) -> CellError {
        CellError::FillTypeMismatch {
            cell: self.name.clone(),
            expected: expected.name(),
            actual: actual.name(),
        }
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.into();
    }

    pub(crate) fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// Rewrites every handle this cell holds, used when cells move between
    /// stores.
    pub(crate) fn relink<FS, FU, FL>(&mut self, fs: FS, fu: FU, fl: FL)
    where
        FS: Fn(crate::surface::SurfaceId) -> crate::surface::SurfaceId,
        FU: Fn(UniverseId) -> UniverseId,
        FL: Fn(LatticeId) -> LatticeId,
    {
        self.region.relink_surfaces(fs);
        match &mut self.fill {
            Fill::Universe(u) => *u = fu(*u),
            Fill::Lattice(l) => *l = fl(*l),
            Fill::Void | Fill::Material(_) => {}
        }
    }
}
