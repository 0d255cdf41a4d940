mod cells;
mod clone;
mod join;
mod lattices;
mod linking;
mod region_ops;
mod serialize;
mod transforms;

pub use join::JoinMode;
pub use transforms::Target;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::SlotMap;

use crate::cell::{Cell, CellId, CellKey};
use crate::error::{EntityKind, Result, StoreError};
use crate::lattice::{Lattice, LatticeId, LatticeKey};
use crate::math::Point3;
use crate::surface::{Axis, Cylinder, Plane, Sphere, Surface, SurfaceId, SurfaceKey, SurfaceKind};
use crate::universe::{Universe, UniverseId, UniverseKey};

/// Name given to the automatically created root universe.
pub const DEFAULT_ROOT_NAME: &str = "ROOT_UNIVERSE";

/// Region operator glyphs, reserved so entity names round-trip through the
/// postfix string form unambiguously.
const RESERVED_SYMBOLS: [char; 5] = ['+', '-', '~', '|', '&'];

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// The single owning container for a geometry.
///
/// All surfaces, cells, universes and lattices live in the store's arenas;
/// everything else holds [`SurfaceId`]-style handles. The store is the only
/// mutator of the object graph, and every handle passed into an operation
/// is revalidated to belong to this store instance — a handle minted by
/// another store is rejected even when an entity of the same name exists
/// here.
#[derive(Debug)]
pub struct GeometryStore {
    id: u64,
    surfaces: SlotMap<SurfaceKey, Surface>,
    cells: SlotMap<CellKey, Cell>,
    universes: SlotMap<UniverseKey, Universe>,
    lattices: SlotMap<LatticeKey, Lattice>,
    surface_index: HashMap<String, SurfaceKey>,
    cell_index: HashMap<String, CellKey>,
    universe_index: HashMap<String, UniverseKey>,
    lattice_index: HashMap<String, LatticeKey>,
    root: UniverseKey,
}

impl GeometryStore {
    /// Creates an empty store holding only the root universe.
    #[must_use]
    pub fn new() -> Self {
        let id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        let mut universes = SlotMap::with_key();
        let root = universes.insert(Universe::new(DEFAULT_ROOT_NAME, true));
        let mut universe_index = HashMap::new();
        universe_index.insert(DEFAULT_ROOT_NAME.to_owned(), root);
        Self {
            id,
            surfaces: SlotMap::with_key(),
            cells: SlotMap::with_key(),
            universes,
            lattices: SlotMap::with_key(),
            surface_index: HashMap::new(),
            cell_index: HashMap::new(),
            universe_index,
            lattice_index: HashMap::new(),
            root,
        }
    }

    // --- Name validation ---

    pub(crate) fn validate_name(name: &str) -> Result<()> {
        if name.chars().any(char::is_whitespace) {
            return Err(StoreError::NameWhitespace { name: name.into() }.into());
        }
        if let Some(symbol) = name.chars().find(|c| RESERVED_SYMBOLS.contains(c)) {
            return Err(StoreError::NameSymbol {
                name: name.into(),
                symbol,
            }
            .into());
        }
        Ok(())
    }

    fn check_name_free(&self, kind: EntityKind, name: &str) -> Result<()> {
        let taken = match kind {
            EntityKind::Surface => self.surface_index.contains_key(name),
            EntityKind::Cell => self.cell_index.contains_key(name),
            EntityKind::Universe => self.universe_index.contains_key(name),
            EntityKind::Lattice => self.lattice_index.contains_key(name),
        };
        if taken {
            return Err(StoreError::DuplicateName {
                kind,
                name: name.into(),
            }
            .into());
        }
        Ok(())
    }

    /// Runs both name checks a factory needs before inserting.
    fn admit_name(&self, kind: EntityKind, name: &str) -> Result<()> {
        Self::validate_name(name)?;
        self.check_name_free(kind, name)
    }

    fn foreign(kind: EntityKind) -> StoreError {
        StoreError::Foreign { kind }
    }

    // --- Handle resolution ---

    /// Returns the surface behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle was minted by a different store.
    pub fn surface(&self, id: SurfaceId) -> Result<&Surface> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Surface).into());
        }
        self.surfaces
            .get(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Surface).into())
    }

    pub(crate) fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut Surface> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Surface).into());
        }
        self.surfaces
            .get_mut(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Surface).into())
    }

    /// Returns the cell behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle was minted by a different store.
    pub fn cell(&self, id: CellId) -> Result<&Cell> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Cell).into());
        }
        self.cells
            .get(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Cell).into())
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Cell).into());
        }
        self.cells
            .get_mut(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Cell).into())
    }

    /// Returns the universe behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle was minted by a different store.
    pub fn universe(&self, id: UniverseId) -> Result<&Universe> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Universe).into());
        }
        self.universes
            .get(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Universe).into())
    }

    pub(crate) fn universe_mut(&mut self, id: UniverseId) -> Result<&mut Universe> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Universe).into());
        }
        self.universes
            .get_mut(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Universe).into())
    }

    /// Returns the lattice behind a handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle was minted by a different store.
    pub fn lattice(&self, id: LatticeId) -> Result<&Lattice> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Lattice).into());
        }
        self.lattices
            .get(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Lattice).into())
    }

    pub(crate) fn lattice_mut(&mut self, id: LatticeId) -> Result<&mut Lattice> {
        if id.store != self.id {
            return Err(Self::foreign(EntityKind::Lattice).into());
        }
        self.lattices
            .get_mut(id.key)
            .ok_or_else(|| Self::foreign(EntityKind::Lattice).into())
    }

    // --- Name lookups ---

    /// Looks a surface up by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no surface of that name exists.
    pub fn surface_named(&self, name: &str) -> Result<SurfaceId> {
        self.surface_index
            .get(name)
            .map(|key| self.surface_id(*key))
            .ok_or_else(|| self.unknown(EntityKind::Surface, name).into())
    }

    /// Looks a cell up by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no cell of that name exists.
    pub fn cell_named(&self, name: &str) -> Result<CellId> {
        self.cell_index
            .get(name)
            .map(|key| self.cell_id(*key))
            .ok_or_else(|| self.unknown(EntityKind::Cell, name).into())
    }

    /// Looks a universe up by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no universe of that name exists.
    pub fn universe_named(&self, name: &str) -> Result<UniverseId> {
        self.universe_index
            .get(name)
            .map(|key| self.universe_id(*key))
            .ok_or_else(|| self.unknown(EntityKind::Universe, name).into())
    }

    /// Looks a lattice up by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no lattice of that name exists.
    pub fn lattice_named(&self, name: &str) -> Result<LatticeId> {
        self.lattice_index
            .get(name)
            .map(|key| self.lattice_id(*key))
            .ok_or_else(|| self.unknown(EntityKind::Lattice, name).into())
    }

    fn unknown(&self, kind: EntityKind, name: &str) -> StoreError {
        StoreError::UnknownName {
            kind,
            name: name.into(),
        }
    }

    /// Returns a handle to every surface.
    #[must_use]
    pub fn all_surfaces(&self) -> Vec<SurfaceId> {
        self.surfaces.keys().map(|k| self.surface_id(k)).collect()
    }

    /// Returns a handle to every cell.
    #[must_use]
    pub fn all_cells(&self) -> Vec<CellId> {
        self.cells.keys().map(|k| self.cell_id(k)).collect()
    }

    /// Returns a handle to every universe, the root included.
    #[must_use]
    pub fn all_universes(&self) -> Vec<UniverseId> {
        self.universes.keys().map(|k| self.universe_id(k)).collect()
    }

    /// Returns a handle to every lattice.
    #[must_use]
    pub fn all_lattices(&self) -> Vec<LatticeId> {
        self.lattices.keys().map(|k| self.lattice_id(k)).collect()
    }

    /// Returns the root universe handle.
    #[must_use]
    pub fn root_universe(&self) -> UniverseId {
        self.universe_id(self.root)
    }

    pub(crate) fn surface_id(&self, key: SurfaceKey) -> SurfaceId {
        SurfaceId {
            store: self.id,
            key,
        }
    }

    pub(crate) fn cell_id(&self, key: CellKey) -> CellId {
        CellId {
            store: self.id,
            key,
        }
    }

    pub(crate) fn universe_id(&self, key: UniverseKey) -> UniverseId {
        UniverseId {
            store: self.id,
            key,
        }
    }

    pub(crate) fn lattice_id(&self, key: LatticeKey) -> LatticeId {
        LatticeId {
            store: self.id,
            key,
        }
    }

    // --- Surface factories ---

    /// Creates a plane `a*x + b*y + c*z - d = 0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the normal is
    /// zero.
    pub fn create_plane(
        &mut self,
        name: &str,
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    ) -> Result<SurfaceId> {
        self.admit_name(EntityKind::Surface, name)?;
        let kind = SurfaceKind::Plane(Plane::new(name, a, b, c, d)?);
        Ok(self.insert_surface(name, kind))
    }

    /// Creates a plane through three points.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the points are
    /// collinear.
    pub fn create_plane_from_points(
        &mut self,
        name: &str,
        p1: &Point3,
        p2: &Point3,
        p3: &Point3,
    ) -> Result<SurfaceId> {
        self.admit_name(EntityKind::Surface, name)?;
        let kind = SurfaceKind::Plane(Plane::from_points(name, p1, p2, p3)?);
        Ok(self.insert_surface(name, kind))
    }

    /// Creates a sphere centered at `center`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the radius is
    /// not strictly positive.
    pub fn create_sphere(&mut self, name: &str, center: Point3, r: f64) -> Result<SurfaceId> {
        self.admit_name(EntityKind::Surface, name)?;
        let kind = SurfaceKind::Sphere(Sphere::new(name, center, r)?);
        Ok(self.insert_surface(name, kind))
    }

    /// Creates an infinite cylinder along the x axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the radius is
    /// not strictly positive.
    pub fn create_x_cylinder(&mut self, name: &str, y0: f64, z0: f64, r: f64) -> Result<SurfaceId> {
        self.create_cylinder(name, Axis::X, y0, z0, r)
    }

    /// Creates an infinite cylinder along the y axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the radius is
    /// not strictly positive.
    pub fn create_y_cylinder(&mut self, name: &str, x0: f64, z0: f64, r: f64) -> Result<SurfaceId> {
        self.create_cylinder(name, Axis::Y, x0, z0, r)
    }

    /// Creates an infinite cylinder along the z axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or the radius is
    /// not strictly positive.
    pub fn create_z_cylinder(&mut self, name: &str, x0: f64, y0: f64, r: f64) -> Result<SurfaceId> {
        self.create_cylinder(name, Axis::Z, x0, y0, r)
    }

    fn create_cylinder(
        &mut self,
        name: &str,
        axis: Axis,
        c1: f64,
        c2: f64,
        r: f64,
    ) -> Result<SurfaceId> {
        self.admit_name(EntityKind::Surface, name)?;
        let kind = SurfaceKind::Cylinder(Cylinder::new(name, axis, c1, c2, r)?);
        Ok(self.insert_surface(name, kind))
    }

    fn insert_surface(&mut self, name: &str, kind: SurfaceKind) -> SurfaceId {
        let key = self.surfaces.insert(Surface::new(name, kind));
        self.surface_index.insert(name.to_owned(), key);
        self.surface_id(key)
    }

    // --- Universe factory ---

    /// Creates an empty universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken.
    pub fn create_universe(&mut self, name: &str) -> Result<UniverseId> {
        self.admit_name(EntityKind::Universe, name)?;
        let key = self.universes.insert(Universe::new(name, false));
        self.universe_index.insert(name.to_owned(), key);
        Ok(self.universe_id(key))
    }

    /// Creates a universe already holding the given cells, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or taken, or any cell is not
    /// owned by this store.
    pub fn create_universe_with_cells(
        &mut self,
        name: &str,
        cells: &[CellId],
    ) -> Result<UniverseId> {
        for cell in cells {
            self.cell(*cell)?;
        }
        let universe = self.create_universe(name)?;
        self.add_cells_to_universe(universe, cells)?;
        Ok(universe)
    }

    // --- Renames ---

    /// Renames a surface and re-keys the lookup index.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is not owned by this store, or the
    /// new name is invalid or taken. Renaming to the current name is a
    /// no-op.
    pub fn rename_surface(&mut self, id: SurfaceId, new_name: &str) -> Result<()> {
        let old = self.surface(id)?.name().to_owned();
        if old == new_name {
            return Ok(());
        }
        self.admit_name(EntityKind::Surface, new_name)?;
        self.surface_mut(id)?.set_name(new_name);
        self.surface_index.remove(&old);
        self.surface_index.insert(new_name.to_owned(), id.key);
        Ok(())
    }

    /// Renames a cell and re-keys the lookup index.
    ///
    /// # Errors
    ///
    /// Returns an error if the cell is not owned by this store, or the new
    /// name is invalid or taken. Renaming to the current name is a no-op.
    pub fn rename_cell(&mut self, id: CellId, new_name: &str) -> Result<()> {
        let old = self.cell(id)?.name().to_owned();
        if old == new_name {
            return Ok(());
        }
        self.admit_name(EntityKind::Cell, new_name)?;
        self.cell_mut(id)?.set_name(new_name);
        self.cell_index.remove(&old);
        self.cell_index.insert(new_name.to_owned(), id.key);
        Ok(())
    }

    /// Renames a universe and re-keys the lookup index.
    ///
    /// The root universe may be renamed like any other.
    ///
    /// # Errors
    ///
    /// Returns an error if the universe is not owned by this store, or the
    /// new name is invalid or taken. Renaming to the current name is a
    /// no-op.
    pub fn rename_universe(&mut self, id: UniverseId, new_name: &str) -> Result<()> {
        let old = self.universe(id)?.name().to_owned();
        if old == new_name {
            return Ok(());
        }
        self.admit_name(EntityKind::Universe, new_name)?;
        self.universe_mut(id)?.set_name(new_name);
        self.universe_index.remove(&old);
        self.universe_index.insert(new_name.to_owned(), id.key);
        Ok(())
    }

    /// Renames the root universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the new name is invalid or taken.
    pub fn rename_root_universe(&mut self, new_name: &str) -> Result<()> {
        self.rename_universe(self.root_universe(), new_name)
    }

    /// Renames a lattice and re-keys the lookup index.
    ///
    /// # Errors
    ///
    /// Returns an error if the lattice is not owned by this store, or the
    /// new name is invalid or taken. Renaming to the current name is a
    /// no-op.
    pub fn rename_lattice(&mut self, id: LatticeId, new_name: &str) -> Result<()> {
        let old = self.lattice(id)?.name().to_owned();
        if old == new_name {
            return Ok(());
        }
        self.admit_name(EntityKind::Lattice, new_name)?;
        self.lattice_mut(id)?.set_name(new_name);
        self.lattice_index.remove(&old);
        self.lattice_index.insert(new_name.to_owned(), id.key);
        Ok(())
    }
}

impl Default for GeometryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::CsgError;

    #[test]
    fn new_store_has_only_the_root_universe() {
        let store = GeometryStore::new();
        let root = store.root_universe();
        assert!(store.universe(root).unwrap().is_root());
        assert_eq!(store.universe(root).unwrap().name(), DEFAULT_ROOT_NAME);
        assert_eq!(store.all_universes(), vec![root]);
        assert!(store.all_surfaces().is_empty());
    }

    #[test]
    fn add_and_get_surface() {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("surf", Point3::origin(), 1.0).unwrap();
        assert_eq!(store.surface_named("surf").unwrap(), s);
        assert_eq!(store.surface(s).unwrap().name(), "surf");
        assert!(store.surface_named("fake_name").is_err());
        // same name again is rejected
        assert!(store
            .create_sphere("surf", Point3::origin(), 2.0)
            .is_err());
        assert_eq!(store.all_surfaces().len(), 1);
    }

    #[test]
    fn name_validation_distinguishes_whitespace_and_symbols() {
        let mut store = GeometryStore::new();
        let ws = store.create_sphere("bad name", Point3::origin(), 1.0);
        assert!(matches!(
            ws,
            Err(CsgError::Store(StoreError::NameWhitespace { .. }))
        ));
        let sym = store.create_sphere("bad|name", Point3::origin(), 1.0);
        assert!(matches!(
            sym,
            Err(CsgError::Store(StoreError::NameSymbol { symbol: '|', .. }))
        ));
    }

    #[test]
    fn foreign_surface_handles_are_rejected() {
        let mut store1 = GeometryStore::new();
        let mut store2 = GeometryStore::new();
        let s1 = store1.create_sphere("surf", Point3::origin(), 1.0).unwrap();
        store2.create_sphere("surf", Point3::origin(), 1.0).unwrap();
        // name-equal surface exists in store2, but s1 is not its instance
        assert!(store2.surface(s1).is_err());
        assert!(store2.rename_surface(s1, "ringo").is_err());
    }

    #[test]
    fn rename_surface_rekeys_the_index() {
        let mut store = GeometryStore::new();
        let s1 = store.create_sphere("surf1", Point3::origin(), 1.0).unwrap();
        let s2 = store.create_sphere("surf2", Point3::origin(), 2.0).unwrap();
        store.rename_surface(s1, "george").unwrap();
        assert_eq!(store.surface(s1).unwrap().name(), "george");
        assert_eq!(store.surface_named("george").unwrap(), s1);
        assert!(store.surface_named("surf1").is_err());
        // renaming onto a taken name fails
        assert!(store.rename_surface(s2, "george").is_err());
        // renaming to the current name is a no-op
        store.rename_surface(s2, "surf2").unwrap();
    }

    #[test]
    fn create_universe_and_lookup() {
        let mut store = GeometryStore::new();
        let u = store.create_universe("thelma").unwrap();
        assert_eq!(store.universe_named("thelma").unwrap(), u);
        assert!(store.universe(u).unwrap().cells().is_empty());
        assert!(store.create_universe("thelma").is_err());
        assert!(store.universe_named("louise").is_err());
        assert_eq!(store.all_universes().len(), 2);
    }

    #[test]
    fn rename_root_universe() {
        let mut store = GeometryStore::new();
        store.rename_root_universe("simon").unwrap();
        let root = store.root_universe();
        assert_eq!(store.universe(root).unwrap().name(), "simon");
        // rename by passing the handle explicitly
        store.rename_universe(root, "alvin").unwrap();
        assert_eq!(store.universe(root).unwrap().name(), "alvin");
        assert!(store.universe_named(DEFAULT_ROOT_NAME).is_err());
        // renaming another universe onto the root's name fails
        let u = store.create_universe("new_univ").unwrap();
        assert!(store.rename_universe(u, "alvin").is_err());
    }
}
