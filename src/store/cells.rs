use tracing::warn;

use super::GeometryStore;
use crate::cell::{Cell, CellId, Fill};
use crate::error::{EntityKind, Result, StoreError};
use crate::lattice::LatticeId;
use crate::region::Region;
use crate::universe::UniverseId;

impl GeometryStore {
    // --- Cell factories ---
    //
    // Every factory validates the name, the region's surfaces and the fill
    // reference before anything is inserted; a failed call leaves the
    // store untouched. Without an explicit target universe the new cell
    // lands in the root universe.

    /// Creates a void cell in the root universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the region
    /// references a surface not owned by this store.
    pub fn create_cell(&mut self, name: &str, region: Region) -> Result<CellId> {
        let root = self.root_universe();
        self.insert_cell(name, region, Fill::Void, root)
    }

    /// Creates a void cell in the given universe.
    ///
    /// # Errors
    ///
    /// As [`Self::create_cell`], plus an error if the target universe is
    /// not owned by this store.
    pub fn create_cell_in(
        &mut self,
        name: &str,
        region: Region,
        universe: UniverseId,
    ) -> Result<CellId> {
        self.insert_cell(name, region, Fill::Void, universe)
    }

    /// Creates a material-filled cell in the root universe.
    ///
    /// The material is an opaque name; the store does not interpret it.
    ///
    /// # Errors
    ///
    /// As [`Self::create_cell`].
    pub fn create_material_cell(
        &mut self,
        name: &str,
        material: &str,
        region: Region,
    ) -> Result<CellId> {
        let root = self.root_universe();
        self.insert_cell(name, region, Fill::Material(material.into()), root)
    }

    /// Creates a material-filled cell in the given universe.
    ///
    /// # Errors
    ///
    /// As [`Self::create_cell_in`].
    pub fn create_material_cell_in(
        &mut self,
        name: &str,
        material: &str,
        region: Region,
        universe: UniverseId,
    ) -> Result<CellId> {
        self.insert_cell(name, region, Fill::Material(material.into()), universe)
    }

    /// Creates a universe-filled cell in the root universe.
    ///
    /// # Errors
    ///
    /// As [`Self::create_cell`], plus an error if the filling universe is
    /// not owned by this store.
    pub fn create_universe_cell(
        &mut self,
        name: &str,
        fill: UniverseId,
        region: Region,
    ) -> Result<CellId> {
        let root = self.root_universe();
        self.insert_cell(name, region, Fill::Universe(fill), root)
    }

    /// Creates a universe-filled cell in the given universe.
    ///
    /// # Errors
    ///
    /// As [`Self::create_universe_cell`], plus an error if the cell would
    /// be added to the very universe that fills it.
    pub fn create_universe_cell_in(
        &mut self,
        name: &str,
        fill: UniverseId,
        region: Region,
        universe: UniverseId,
    ) -> Result<CellId> {
        self.insert_cell(name, region, Fill::Universe(fill), universe)
    }

    /// Creates a lattice-filled cell in the root universe.
    ///
    /// # Errors
    ///
    /// As [`Self::create_cell`], plus an error if the filling lattice is
    /// not owned by this store.
    pub fn create_lattice_cell(
        &mut self,
        name: &str,
        fill: LatticeId,
        region: Region,
    ) -> Result<CellId> {
        let root = self.root_universe();
        self.insert_cell(name, region, Fill::Lattice(fill), root)
    }

    /// Creates a lattice-filled cell in the given universe.
    ///
    /// # Errors
    ///
    /// As [`Self::create_lattice_cell`], plus an error if the target
    /// universe appears anywhere in the filling lattice.
    pub fn create_lattice_cell_in(
        &mut self,
        name: &str,
        fill: LatticeId,
        region: Region,
        universe: UniverseId,
    ) -> Result<CellId> {
        self.insert_cell(name, region, Fill::Lattice(fill), universe)
    }

    fn insert_cell(
        &mut self,
        name: &str,
        region: Region,
        fill: Fill,
        target: UniverseId,
    ) -> Result<CellId> {
        self.admit_name(EntityKind::Cell, name)?;
        self.check_region_surfaces(&region)?;
        self.universe(target)?;
        self.check_containment(name, &fill, target)?;
        let key = self.cells.insert(Cell::new(name, region, fill));
        self.cell_index.insert(name.to_owned(), key);
        let id = self.cell_id(key);
        self.universe_mut(target)?.push_cell(id);
        Ok(id)
    }

    /// Rejects a fill that would make a universe contain itself.
    fn check_containment(&self, cell_name: &str, fill: &Fill, target: UniverseId) -> Result<()> {
        match fill {
            Fill::Void | Fill::Material(_) => Ok(()),
            Fill::Universe(u) => {
                self.universe(*u)?;
                if *u == target {
                    return Err(StoreError::SelfContainingUniverse {
                        cell: cell_name.into(),
                    }
                    .into());
                }
                Ok(())
            }
            Fill::Lattice(l) => {
                if self.lattice(*l)?.contains_universe(target) {
                    return Err(StoreError::SelfContainingLattice {
                        cell: cell_name.into(),
                    }
                    .into());
                }
                Ok(())
            }
        }
    }

    /// Replaces the region of an existing cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell is not owned by this store or the new
    /// region references a surface that is not.
    pub fn update_cell_region(&mut self, cell: CellId, region: Region) -> Result<()> {
        self.cell(cell)?;
        self.check_region_surfaces(&region)?;
        self.cell_mut(cell)?.set_region(region);
        Ok(())
    }

    // --- Universe membership ---

    /// Adds a cell to a universe.
    ///
    /// Adding a cell the universe already holds is a warned no-op, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if either handle is not owned by this store, or
    /// the cell's fill would make the universe contain itself.
    pub fn add_cell_to_universe(&mut self, universe: UniverseId, cell: CellId) -> Result<()> {
        let cell_name = self.cell(cell)?.name().to_owned();
        let target = self.universe(universe)?;
        if target.contains(cell) {
            warn!(
                cell = %cell_name,
                universe = %target.name(),
                "cell is already present in universe, skipping"
            );
            return Ok(());
        }
        let fill = self.cell(cell)?.fill().clone();
        self.check_containment(&cell_name, &fill, universe)?;
        self.universe_mut(universe)?.push_cell(cell);
        Ok(())
    }

    /// Adds a list of cells to a universe, in order.
    ///
    /// # Errors
    ///
    /// As [`Self::add_cell_to_universe`]; cells before the failing one stay
    /// added.
    pub fn add_cells_to_universe(&mut self, universe: UniverseId, cells: &[CellId]) -> Result<()> {
        for cell in cells {
            self.add_cell_to_universe(universe, *cell)?;
        }
        Ok(())
    }

    /// Removes a cell from a universe.
    ///
    /// # Errors
    ///
    /// Returns an error if either handle is not owned by this store or the
    /// universe does not hold the cell.
    pub fn remove_cell_from_universe(&mut self, universe: UniverseId, cell: CellId) -> Result<()> {
        let cell_name = self.cell(cell)?.name().to_owned();
        let target = self.universe(universe)?;
        if !target.contains(cell) {
            return Err(StoreError::CellNotInUniverse {
                universe: target.name().into(),
                cell: cell_name,
            }
            .into());
        }
        self.universe_mut(universe)?.remove_cell(cell);
        Ok(())
    }

    /// Removes a list of cells from a universe.
    ///
    /// # Errors
    ///
    /// As [`Self::remove_cell_from_universe`]; cells before the failing one
    /// stay removed.
    pub fn remove_cells_from_universe(
        &mut self,
        universe: UniverseId,
        cells: &[CellId],
    ) -> Result<()> {
        for cell in cells {
            self.remove_cell_from_universe(universe, *cell)?;
        }
        Ok(())
    }

    /// Empties a universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not owned by this store.
    pub fn remove_all_cells_from_universe(&mut self, universe: UniverseId) -> Result<()> {
        self.universe_mut(universe)?.clear_cells();
        Ok(())
    }

    /// Whether the universe holds a cell of the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not owned by this store.
    pub fn universe_has_cell(&self, universe: UniverseId, cell_name: &str) -> Result<bool> {
        Ok(self.find_cell_in(universe, cell_name)?.is_some())
    }

    /// Returns the universe's cell of the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not owned by this store or
    /// holds no cell of that name.
    pub fn universe_cell(&self, universe: UniverseId, cell_name: &str) -> Result<CellId> {
        match self.find_cell_in(universe, cell_name)? {
            Some(cell) => Ok(cell),
            None => Err(StoreError::CellNotInUniverse {
                universe: self.universe(universe)?.name().into(),
                cell: cell_name.into(),
            }
            .into()),
        }
    }

    fn find_cell_in(&self, universe: UniverseId, cell_name: &str) -> Result<Option<CellId>> {
        let target = self.universe(universe)?;
        Ok(target
            .cells()
            .iter()
            .find(|c| {
                self.cells
                    .get(c.key)
                    .is_some_and(|cell| cell.name() == cell_name)
            })
            .copied())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CsgError;
    use crate::math::Point3;

    fn store_with_sphere() -> (GeometryStore, crate::surface::SurfaceId) {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("surf1", Point3::origin(), 1.0).unwrap();
        (store, s)
    }

    #[test]
    fn cells_default_to_the_root_universe() {
        let (mut store, s) = store_with_sphere();
        let other = store.create_universe("add_univ").unwrap();
        store.create_cell("void_cell1", s.pos()).unwrap();
        store.create_cell_in("void_cell2", s.pos(), other).unwrap();

        let root = store.root_universe();
        assert!(store.universe_has_cell(root, "void_cell1").unwrap());
        assert!(!store.universe_has_cell(other, "void_cell1").unwrap());
        assert!(store.universe_has_cell(other, "void_cell2").unwrap());
        assert!(!store.universe_has_cell(root, "void_cell2").unwrap());
    }

    #[test]
    fn material_and_universe_fills() {
        let (mut store, s) = store_with_sphere();
        let inner = store.create_universe("inner").unwrap();
        let m = store
            .create_material_cell("mat_cell", "matname", s.pos())
            .unwrap();
        let u = store.create_universe_cell("univ_cell", inner, s.neg()).unwrap();
        assert_eq!(store.cell(m).unwrap().material().unwrap(), "matname");
        assert_eq!(store.cell(u).unwrap().universe().unwrap(), inner);
        assert!(store.cell(u).unwrap().material().is_err());
    }

    #[test]
    fn duplicate_cell_names_are_rejected() {
        let (mut store, s) = store_with_sphere();
        store.create_cell("c", s.pos()).unwrap();
        assert!(store.create_cell("c", s.neg()).is_err());
    }

    #[test]
    fn universe_cell_cannot_be_added_to_its_own_fill() {
        let (mut store, s) = store_with_sphere();
        let u = store.create_universe("u").unwrap();
        let r = store.create_universe_cell_in("c", u, s.pos(), u);
        assert!(matches!(
            r,
            Err(CsgError::Store(StoreError::SelfContainingUniverse { .. }))
        ));
    }

    #[test]
    fn lattice_cell_cannot_land_in_a_gridded_universe() {
        let (mut store, s) = store_with_sphere();
        let u = store.create_universe("lat_univ").unwrap();
        let lat = store
            .create_cartesian_lattice_with_universes("lat", 1.0, vec![vec![u, u]])
            .unwrap();
        let r = store.create_lattice_cell_in("c", lat, s.pos(), u);
        assert!(matches!(
            r,
            Err(CsgError::Store(StoreError::SelfContainingLattice { .. }))
        ));
        // but a different universe is fine
        store.create_lattice_cell("ok", lat, s.pos()).unwrap();
    }

    #[test]
    fn region_surfaces_must_be_owned() {
        let (mut store, _) = store_with_sphere();
        let mut other = GeometryStore::new();
        let foreign = other.create_sphere("surf1", Point3::origin(), 1.0).unwrap();
        assert!(store.create_cell("c", foreign.pos()).is_err());
    }

    #[test]
    fn update_cell_region() {
        let (mut store, s) = store_with_sphere();
        let c = store.create_cell("c1", s.pos()).unwrap();
        store.update_cell_region(c, s.neg()).unwrap();
        assert_eq!(*store.cell(c).unwrap().region(), s.neg());

        // a cell from another store cannot be updated through this one
        let mut other = GeometryStore::new();
        let s2 = other.create_sphere("surf1", Point3::origin(), 1.0).unwrap();
        let c2 = other.create_cell("c1", s2.pos()).unwrap();
        assert!(store.update_cell_region(c2, s.neg()).is_err());
    }

    #[test]
    fn add_and_remove_cells() {
        let (mut store, s) = store_with_sphere();
        let c1 = store.create_cell("c1", s.pos()).unwrap();
        let c2 = store.create_cell("c2", s.neg()).unwrap();
        let c3 = store.create_cell("c3", s.neg().or(&s.pos()).unwrap()).unwrap();
        let u = store.create_universe("univ").unwrap();

        store.add_cells_to_universe(u, &[c1, c2]).unwrap();
        assert_eq!(store.universe(u).unwrap().cells().len(), 2);
        store.add_cell_to_universe(u, c3).unwrap();
        assert_eq!(store.universe(u).unwrap().cells().len(), 3);

        // re-adding is a warned no-op
        store.add_cell_to_universe(u, c1).unwrap();
        assert_eq!(store.universe(u).unwrap().cells().len(), 3);

        store.remove_cell_from_universe(u, c1).unwrap();
        assert_eq!(store.universe(u).unwrap().cells().len(), 2);
        store.remove_cells_from_universe(u, &[c2, c3]).unwrap();
        assert!(store.universe(u).unwrap().cells().is_empty());

        // removing an absent cell is an error
        assert!(store.remove_cell_from_universe(u, c1).is_err());
    }

    #[test]
    fn membership_rejects_foreign_handles() {
        let (mut store, s) = store_with_sphere();
        let c1 = store.create_cell("c1", s.pos()).unwrap();
        let u = store.create_universe("univ").unwrap();

        let mut other = GeometryStore::new();
        let s2 = other.create_sphere("surf1", Point3::origin(), 1.0).unwrap();
        let foreign_cell = other.create_cell("c1", s2.pos()).unwrap();
        let foreign_univ = other.create_universe("univ").unwrap();

        assert!(store.add_cell_to_universe(u, foreign_cell).is_err());
        assert!(store.add_cell_to_universe(foreign_univ, c1).is_err());
        assert!(store.remove_cell_from_universe(u, foreign_cell).is_err());
        assert!(store.remove_cell_from_universe(foreign_univ, c1).is_err());
    }

    #[test]
    fn universe_cell_lookup_by_name() {
        let (mut store, s) = store_with_sphere();
        let c1 = store.create_cell("c1", s.pos()).unwrap();
        let root = store.root_universe();
        assert_eq!(store.universe_cell(root, "c1").unwrap(), c1);
        assert!(store.universe_cell(root, "missing").is_err());
    }

    #[test]
    fn create_universe_with_cells() {
        let (mut store, s) = store_with_sphere();
        let c1 = store.create_cell("c1", s.pos()).unwrap();
        let c2 = store.create_cell("c2", s.neg()).unwrap();
        let u = store.create_universe_with_cells("louise", &[c1, c2]).unwrap();
        assert_eq!(store.universe(u).unwrap().cells(), &[c1, c2]);
    }
}
