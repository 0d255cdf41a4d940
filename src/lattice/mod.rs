mod cartesian;
mod hexagonal;

pub use cartesian::CartesianShape;
pub use hexagonal::HexagonalShape;

use std::collections::BTreeMap;

use crate::error::{LatticeError, Result};
use crate::math::Point3;
use crate::transform::Transformation;
use crate::universe::UniverseId;

slotmap::new_key_type! {
    /// Slot key for a lattice within a geometry store.
    pub struct LatticeKey;
}

/// Handle to a lattice owned by a [`GeometryStore`](crate::store::GeometryStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeId {
    pub(crate) store: u64,
    pub(crate) key: LatticeKey,
}

/// Kind tag of a lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeKind {
    Cartesian,
    Hexagonal,
}

/// What fills lattice positions outside the grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outer {
    #[default]
    Void,
    Material(String),
    Universe(UniverseId),
}

/// A value in a lattice dimension/attribute map.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionValue {
    Int(i64),
    Real(f64),
    Str(String),
}

/// Geometric shape of a lattice, fixing its index space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatticeShape {
    Cartesian(CartesianShape),
    Hexagonal(HexagonalShape),
}

/// A 2-D grid of universes with a fallback fill outside the grid.
///
/// A lattice may be created from its dimensions alone and populated later;
/// cells may reference it while the grid is still unset. The universe grid
/// holds non-owning references into the store that owns this lattice.
/// Equality compares name, shape, pitch, outer fill and the grid
/// element-wise by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    name: String,
    pitch: f64,
    shape: LatticeShape,
    grid: Option<Vec<Vec<UniverseId>>>,
    outer: Outer,
    transforms: Vec<Transformation>,
}

impl Lattice {
    pub(crate) fn new(name: &str, pitch: f64, shape: LatticeShape) -> Result<Self> {
        if pitch <= 0.0 {
            return Err(LatticeError::NonPositivePitch {
                name: name.into(),
                pitch,
            }
            .into());
        }
        Ok(Self {
            name: name.into(),
            pitch,
            shape,
            grid: None,
            outer: Outer::Void,
            transforms: Vec::new(),
        })
    }

    /// Returns the lattice name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the center-to-center spacing of grid cells.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Returns the kind tag.
    #[must_use]
    pub fn kind(&self) -> LatticeKind {
        match self.shape {
            LatticeShape::Cartesian(_) => LatticeKind::Cartesian,
            LatticeShape::Hexagonal(_) => LatticeKind::Hexagonal,
        }
    }

    /// Returns the shape, fixing the valid index space.
    #[must_use]
    pub fn shape(&self) -> &LatticeShape {
        &self.shape
    }

    /// Returns the universe grid, if it has been set.
    #[must_use]
    pub fn grid(&self) -> Option<&[Vec<UniverseId>]> {
        self.grid.as_deref()
    }

    /// Returns the fill used outside the grid.
    #[must_use]
    pub fn outer(&self) -> &Outer {
        &self.outer
    }

    /// Returns the accumulated transformation records, oldest first.
    #[must_use]
    pub fn transformations(&self) -> &[Transformation] {
        &self.transforms
    }

    /// Whether `(row, col)` addresses a position of this lattice's shape.
    ///
    /// Validity is a property of the shape: it does not require the grid to
    /// be populated.
    #[must_use]
    pub fn is_valid_index(&self, row: usize, col: usize) -> bool {
        match &self.shape {
            LatticeShape::Cartesian(s) => s.is_valid_index(row, col),
            LatticeShape::Hexagonal(s) => s.is_valid_index(row, col),
        }
    }

    /// Maps a point in the lattice frame to the grid cell containing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the point falls outside the lattice bounds.
    pub fn index_of_point(&self, point: &Point3) -> Result<(usize, usize)> {
        match &self.shape {
            LatticeShape::Cartesian(s) => s.index_of_point(&self.name, self.pitch, point),
            LatticeShape::Hexagonal(s) => s.index_of_point(&self.name, self.pitch, point),
        }
    }

    /// Returns the universe at a grid position.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is unset or the index is invalid.
    pub fn universe_at(&self, row: usize, col: usize) -> Result<UniverseId> {
        if !self.is_valid_index(row, col) {
            return Err(self.invalid_index(row, col).into());
        }
        let grid = self.grid.as_ref().ok_or_else(|| LatticeError::GridNotSet {
            name: self.name.clone(),
        })?;
        grid.get(row)
            .and_then(|r| r.get(col))
            .copied()
            .ok_or_else(|| self.invalid_index(row, col).into())
    }

    /// Returns every grid position holding the given universe, in row-major
    /// order. An unset grid yields no positions.
    #[must_use]
    pub fn indices_of(&self, universe: UniverseId) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        if let Some(grid) = &self.grid {
            for (row, cells) in grid.iter().enumerate() {
                for (col, u) in cells.iter().enumerate() {
                    if *u == universe {
                        found.push((row, col));
                    }
                }
            }
        }
        found
    }

    /// Returns the distinct universes this lattice references, grid
    /// positions first in row-major order, then the outer fill.
    #[must_use]
    pub fn unique_universes(&self) -> Vec<UniverseId> {
        let mut unique = Vec::new();
        if let Some(grid) = &self.grid {
            for row in grid {
                for u in row {
                    if !unique.contains(u) {
                        unique.push(*u);
                    }
                }
            }
        }
        if let Outer::Universe(u) = &self.outer {
            if !unique.contains(u) {
                unique.push(*u);
            }
        }
        unique
    }

    /// Whether the universe appears in the grid or the outer fill.
    #[must_use]
    pub fn contains_universe(&self, universe: UniverseId) -> bool {
        if let Outer::Universe(u) = &self.outer {
            if *u == universe {
                return true;
            }
        }
        self.grid
            .as_ref()
            .is_some_and(|grid| grid.iter().any(|row| row.contains(&universe)))
    }

    /// Returns the dimension/attribute map.
    ///
    /// Cartesian lattices report `nrow`, `ncol` and `pitch`; hexagonal
    /// lattices report `nrow`, `nring`, `pitch` and `orientation`.
    #[must_use]
    pub fn dimensions(&self) -> BTreeMap<String, DimensionValue> {
        let mut dims = BTreeMap::new();
        dims.insert("pitch".into(), DimensionValue::Real(self.pitch));
        match &self.shape {
            LatticeShape::Cartesian(s) => {
                dims.insert("nrow".into(), int_value(s.nrow()));
                dims.insert("ncol".into(), int_value(s.ncol()));
            }
            LatticeShape::Hexagonal(s) => {
                dims.insert("nrow".into(), int_value(s.rows()));
                dims.insert("nring".into(), int_value(s.rings()));
                // Rows run along x, so the hexagons sit flat side up.
                dims.insert("orientation".into(), DimensionValue::Str("y".into()));
            }
        }
        dims
    }

    pub(crate) fn set_universe_at(
        &mut self,
        row: usize,
        col: usize,
        universe: UniverseId,
    ) -> Result<()> {
        if !self.is_valid_index(row, col) {
            return Err(self.invalid_index(row, col).into());
        }
        if self.grid.is_none() {
            return Err(LatticeError::GridNotSet {
                name: self.name.clone(),
            }
            .into());
        }
        // A committed grid always matches the shape, so the slot exists.
        if let Some(slot) = self
            .grid
            .as_mut()
            .and_then(|g| g.get_mut(row))
            .and_then(|r| r.get_mut(col))
        {
            *slot = universe;
        }
        Ok(())
    }

    /// Replaces the whole universe grid after validating its shape.
    pub(crate) fn set_grid(&mut self, grid: Vec<Vec<UniverseId>>) -> Result<()> {
        let lengths: Vec<usize> = grid.iter().map(Vec::len).collect();
        match &self.shape {
            LatticeShape::Cartesian(s) => s.validate_grid(&self.name, &lengths)?,
            LatticeShape::Hexagonal(s) => s.validate_grid(&self.name, &lengths)?,
        }
        self.grid = Some(grid);
        Ok(())
    }

    pub(crate) fn set_outer(&mut self, outer: Outer) {
        self.outer = outer;
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.into();
    }

    pub(crate) fn push_transformation(&mut self, t: Transformation) {
        self.transforms.push(t);
    }

    /// Rewrites every universe handle, used when lattices move between
    /// stores.
    pub(crate) fn relink_universes<F: Fn(UniverseId) -> UniverseId>(&mut self, f: F) {
        if let Some(grid) = &mut self.grid {
            for row in grid {
                for u in row {
                    *u = f(*u);
                }
            }
        }
        if let Outer::Universe(u) = &mut self.outer {
            *u = f(*u);
        }
    }

    fn invalid_index(&self, row: usize, col: usize) -> LatticeError {
        LatticeError::InvalidIndex {
            name: self.name.clone(),
            row,
            col,
        }
    }
}

fn int_value(n: usize) -> DimensionValue {
    #[allow(clippy::cast_possible_wrap)]
    DimensionValue::Int(n as i64)
}
