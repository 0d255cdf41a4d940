use super::GeometryStore;
use crate::error::{EntityKind, Result};
use crate::lattice::{
    CartesianShape, HexagonalShape, Lattice, LatticeId, LatticeShape, Outer,
};
use crate::universe::UniverseId;

impl GeometryStore {
    // --- Lattice factories ---

    /// Creates a Cartesian lattice with declared dimensions and no grid.
    ///
    /// The universe grid can be populated later with
    /// [`Self::set_lattice_universes`]; cells may reference the lattice
    /// before that happens.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, a dimension is
    /// zero, or the pitch is not strictly positive.
    pub fn create_cartesian_lattice(
        &mut self,
        name: &str,
        nrow: usize,
        ncol: usize,
        pitch: f64,
    ) -> Result<LatticeId> {
        self.admit_name(EntityKind::Lattice, name)?;
        let shape = LatticeShape::Cartesian(CartesianShape::new(name, nrow, ncol)?);
        Ok(self.insert_lattice(Lattice::new(name, pitch, shape)?))
    }

    /// Creates a Cartesian lattice from a universe grid, inferring its
    /// dimensions.
    ///
    /// # Errors
    ///
    /// As [`Self::create_cartesian_lattice`], plus an error if the grid is
    /// ragged or any universe is not owned by this store.
    pub fn create_cartesian_lattice_with_universes(
        &mut self,
        name: &str,
        pitch: f64,
        grid: Vec<Vec<UniverseId>>,
    ) -> Result<LatticeId> {
        self.admit_name(EntityKind::Lattice, name)?;
        self.check_grid_universes(&grid)?;
        let lengths: Vec<usize> = grid.iter().map(Vec::len).collect();
        let shape = LatticeShape::Cartesian(CartesianShape::infer(name, &lengths)?);
        let mut lattice = Lattice::new(name, pitch, shape)?;
        lattice.set_grid(grid)?;
        Ok(self.insert_lattice(lattice))
    }

    /// Creates a hexagonal lattice with the declared ring count and no
    /// grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, the ring count is
    /// zero, or the pitch is not strictly positive.
    pub fn create_hexagonal_lattice(
        &mut self,
        name: &str,
        rings: usize,
        pitch: f64,
    ) -> Result<LatticeId> {
        self.admit_name(EntityKind::Lattice, name)?;
        let shape = LatticeShape::Hexagonal(HexagonalShape::new(name, rings)?);
        Ok(self.insert_lattice(Lattice::new(name, pitch, shape)?))
    }

    /// Creates a hexagonal lattice from a universe grid, inferring the
    /// ring count from the row count.
    ///
    /// # Errors
    ///
    /// As [`Self::create_hexagonal_lattice`], plus an error if the rows do
    /// not form a hexagonal profile or any universe is not owned by this
    /// store.
    pub fn create_hexagonal_lattice_with_universes(
        &mut self,
        name: &str,
        pitch: f64,
        grid: Vec<Vec<UniverseId>>,
    ) -> Result<LatticeId> {
        self.admit_name(EntityKind::Lattice, name)?;
        self.check_grid_universes(&grid)?;
        let lengths: Vec<usize> = grid.iter().map(Vec::len).collect();
        let shape = LatticeShape::Hexagonal(HexagonalShape::infer(name, &lengths)?);
        let mut lattice = Lattice::new(name, pitch, shape)?;
        lattice.set_grid(grid)?;
        Ok(self.insert_lattice(lattice))
    }

    fn insert_lattice(&mut self, lattice: Lattice) -> LatticeId {
        let name = lattice.name().to_owned();
        let key = self.lattices.insert(lattice);
        self.lattice_index.insert(name, key);
        self.lattice_id(key)
    }

    fn check_grid_universes(&self, grid: &[Vec<UniverseId>]) -> Result<()> {
        for row in grid {
            for universe in row {
                self.universe(*universe)?;
            }
        }
        Ok(())
    }

    // --- Grid mutation ---

    /// Places a universe at one grid position.
    ///
    /// # Errors
    ///
    /// Returns an error if either handle is not owned by this store, the
    /// grid is unset, or the index is invalid.
    pub fn add_universe_to_lattice(
        &mut self,
        lattice: LatticeId,
        universe: UniverseId,
        index: (usize, usize),
    ) -> Result<()> {
        self.universe(universe)?;
        self.lattice(lattice)?;
        self.lattice_mut(lattice)?
            .set_universe_at(index.0, index.1, universe)
    }

    /// Replaces a lattice's whole universe grid.
    ///
    /// The grid's shape is validated against the lattice's declared
    /// dimensions before anything is committed, so a rejected grid leaves
    /// the previous one in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a handle is not owned by this store or the grid
    /// shape does not match.
    pub fn set_lattice_universes(
        &mut self,
        lattice: LatticeId,
        grid: Vec<Vec<UniverseId>>,
    ) -> Result<()> {
        self.lattice(lattice)?;
        self.check_grid_universes(&grid)?;
        self.lattice_mut(lattice)?.set_grid(grid)
    }

    /// Sets the fill used outside a lattice's grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the lattice — or the universe named by a
    /// universe outer fill — is not owned by this store.
    pub fn set_lattice_outer(&mut self, lattice: LatticeId, outer: Outer) -> Result<()> {
        if let Outer::Universe(universe) = &outer {
            self.universe(*universe)?;
        }
        self.lattice_mut(lattice)?.set_outer(outer);
        Ok(())
    }

    /// Resets a lattice's outer fill to void.
    ///
    /// # Errors
    ///
    /// Returns an error if the lattice is not owned by this store.
    pub fn reset_lattice_outer(&mut self, lattice: LatticeId) -> Result<()> {
        self.lattice_mut(lattice)?.set_outer(Outer::Void);
        Ok(())
    }

    /// Returns every grid position holding the named universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the lattice is not owned by this store or no
    /// universe of that name exists.
    pub fn lattice_universe_indices(
        &self,
        lattice: LatticeId,
        universe_name: &str,
    ) -> Result<Vec<(usize, usize)>> {
        let universe = self.universe_named(universe_name)?;
        Ok(self.lattice(lattice)?.indices_of(universe))
    }
}
