use std::collections::{HashMap, HashSet};

use super::GeometryStore;
use crate::cell::{CellId, CellKey};
use crate::error::{EntityKind, Result, StoreError};
use crate::lattice::{LatticeId, LatticeKey};
use crate::surface::{SurfaceId, SurfaceKey};
use crate::universe::{Universe, UniverseId, UniverseKey};

/// How [`GeometryStore::join`] treats the two root universes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinMode {
    /// The other store's root cells merge directly into this store's
    /// root; the other root ceases to exist as a separate universe.
    MergeRoots,
    /// This store's root is untouched; the other root's cells become a
    /// new universe with the given name.
    OtherAsUniverse(String),
    /// Both roots' cells are extracted into two new named universes — the
    /// first name takes this store's root cells — leaving this store's
    /// root empty.
    BothAsUniverses(String, String),
}

impl GeometryStore {
    /// Absorbs another store's surfaces, cells, universes and lattices.
    ///
    /// Every carried entity keeps its name; the two roots are combined
    /// according to `mode`. All name collisions across the four
    /// collections are checked before anything moves, so a failed join
    /// leaves this store untouched (the other store is consumed either
    /// way).
    ///
    /// # Errors
    ///
    /// Returns an error if any carried or newly introduced name collides
    /// with one already present here, or a mode name is invalid.
    pub fn join(&mut self, other: GeometryStore, mode: JoinMode) -> Result<()> {
        // Validation phase: nothing is mutated until every check passes.
        for name in other.surface_index.keys() {
            self.check_name_free(EntityKind::Surface, name)?;
        }
        for name in other.cell_index.keys() {
            self.check_name_free(EntityKind::Cell, name)?;
        }
        for name in other.lattice_index.keys() {
            self.check_name_free(EntityKind::Lattice, name)?;
        }
        let mut incoming: Vec<&str> = Vec::new();
        match &mode {
            JoinMode::MergeRoots => {}
            JoinMode::OtherAsUniverse(name) => incoming.push(name),
            JoinMode::BothAsUniverses(first, second) => {
                incoming.push(first);
                incoming.push(second);
            }
        }
        for (name, key) in &other.universe_index {
            if *key != other.root {
                incoming.push(name);
            }
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for name in &incoming {
            Self::validate_name(name)?;
            self.check_name_free(EntityKind::Universe, name)?;
            if !seen.insert(name) {
                return Err(StoreError::DuplicateName {
                    kind: EntityKind::Universe,
                    name: (*name).to_owned(),
                }
                .into());
            }
        }

        // Commit phase: move the arenas over, building old-to-new key
        // maps, then relink every carried handle.
        let GeometryStore {
            mut surfaces,
            mut cells,
            mut universes,
            mut lattices,
            root: other_root,
            ..
        } = other;

        let mut smap: HashMap<SurfaceKey, SurfaceKey> = HashMap::new();
        for (key, surface) in surfaces.drain() {
            let name = surface.name().to_owned();
            let new_key = self.surfaces.insert(surface);
            self.surface_index.insert(name, new_key);
            smap.insert(key, new_key);
        }
        let mut cmap: HashMap<CellKey, CellKey> = HashMap::new();
        for (key, cell) in cells.drain() {
            let name = cell.name().to_owned();
            let new_key = self.cells.insert(cell);
            self.cell_index.insert(name, new_key);
            cmap.insert(key, new_key);
        }
        let mut lmap: HashMap<LatticeKey, LatticeKey> = HashMap::new();
        for (key, lattice) in lattices.drain() {
            let name = lattice.name().to_owned();
            let new_key = self.lattices.insert(lattice);
            self.lattice_index.insert(name, new_key);
            lmap.insert(key, new_key);
        }

        let mut umap: HashMap<UniverseKey, UniverseKey> = HashMap::new();
        let mut carried_universes: Vec<UniverseKey> = Vec::new();
        let mut merged_root_cells: Vec<CellId> = Vec::new();
        for (key, mut universe) in universes.drain() {
            if key == other_root {
                match &mode {
                    JoinMode::MergeRoots => {
                        // Cells re-home into this store's root below.
                        merged_root_cells = universe.take_cells();
                        umap.insert(key, self.root);
                    }
                    JoinMode::OtherAsUniverse(name)
                    | JoinMode::BothAsUniverses(_, name) => {
                        universe.set_name(name);
                        universe.clear_root();
                        let new_key = self.universes.insert(universe);
                        self.universe_index.insert(name.clone(), new_key);
                        umap.insert(key, new_key);
                        carried_universes.push(new_key);
                    }
                }
            } else {
                let name = universe.name().to_owned();
                let new_key = self.universes.insert(universe);
                self.universe_index.insert(name, new_key);
                umap.insert(key, new_key);
                carried_universes.push(new_key);
            }
        }

        // Relink only the carried entities: pre-existing ones already hold
        // keys of this store, and foreign keys could collide with them.
        let id = self.id;
        let map_s = |old: SurfaceId| SurfaceId {
            store: id,
            key: smap.get(&old.key).copied().unwrap_or(old.key),
        };
        let map_c = |old: CellId| CellId {
            store: id,
            key: cmap.get(&old.key).copied().unwrap_or(old.key),
        };
        let map_u = |old: UniverseId| UniverseId {
            store: id,
            key: umap.get(&old.key).copied().unwrap_or(old.key),
        };
        let map_l = |old: LatticeId| LatticeId {
            store: id,
            key: lmap.get(&old.key).copied().unwrap_or(old.key),
        };
        for new_key in cmap.values() {
            if let Some(cell) = self.cells.get_mut(*new_key) {
                cell.relink(&map_s, &map_u, &map_l);
            }
        }
        for new_key in &carried_universes {
            if let Some(universe) = self.universes.get_mut(*new_key) {
                universe.relink_cells(&map_c);
            }
        }
        for new_key in lmap.values() {
            if let Some(lattice) = self.lattices.get_mut(*new_key) {
                lattice.relink_universes(&map_u);
            }
        }

        // Root handling per mode.
        match &mode {
            JoinMode::MergeRoots => {
                let remapped: Vec<CellId> =
                    merged_root_cells.iter().map(|c| map_c(*c)).collect();
                if let Some(root) = self.universes.get_mut(self.root) {
                    root.extend_cells(remapped);
                }
            }
            JoinMode::BothAsUniverses(first, _) => {
                let moved = self
                    .universes
                    .get_mut(self.root)
                    .map(Universe::take_cells)
                    .unwrap_or_default();
                let mut extracted = Universe::new(first, false);
                extracted.extend_cells(moved);
                let new_key = self.universes.insert(extracted);
                self.universe_index.insert(first.clone(), new_key);
            }
            JoinMode::OtherAsUniverse(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    /// Base with one root cell; paired base with a root cell and a cell
    /// in an extra universe.
    fn two_bases() -> (GeometryStore, GeometryStore) {
        let mut base1 = GeometryStore::new();
        let s1 = base1.create_sphere("s1", Point3::origin(), 1.0).unwrap();
        base1.create_cell("c1", s1.pos()).unwrap();

        let mut base2 = GeometryStore::new();
        let s2 = base2.create_sphere("s2", Point3::origin(), 1.0).unwrap();
        base2.create_cell("c2", s2.pos()).unwrap();
        let extra = base2.create_universe("extra_univ").unwrap();
        base2.create_cell_in("c3", s2.neg(), extra).unwrap();
        (base1, base2)
    }

    #[test]
    fn merge_roots() {
        let (mut base1, base2) = two_bases();
        base1.join(base2, JoinMode::MergeRoots).unwrap();

        assert_eq!(base1.all_universes().len(), 2);
        assert_eq!(base1.all_cells().len(), 3);
        assert_eq!(base1.all_surfaces().len(), 2);

        let root = base1.root_universe();
        assert_eq!(base1.universe(root).unwrap().cells().len(), 2);
        assert!(base1.universe_has_cell(root, "c1").unwrap());
        assert!(base1.universe_has_cell(root, "c2").unwrap());

        let extra = base1.universe_named("extra_univ").unwrap();
        assert_eq!(base1.universe(extra).unwrap().cells().len(), 1);
        assert!(base1.universe_has_cell(extra, "c3").unwrap());

        // the only ROOT_UNIVERSE left is base1's own
        assert!(base1.universe_named(crate::store::DEFAULT_ROOT_NAME).is_ok());
        // carried regions resolve against the joined store
        let c2 = base1.cell_named("c2").unwrap();
        let cell = base1.cell(c2).unwrap();
        base1.check_region_surfaces(cell.region()).unwrap();
    }

    #[test]
    fn other_root_becomes_a_new_universe() {
        let (mut base1, base2) = two_bases();
        base1
            .join(base2, JoinMode::OtherAsUniverse("new_univ".into()))
            .unwrap();

        assert_eq!(base1.all_universes().len(), 3);
        assert_eq!(base1.all_cells().len(), 3);
        assert_eq!(base1.all_surfaces().len(), 2);

        let root = base1.root_universe();
        assert_eq!(base1.universe(root).unwrap().cells().len(), 1);
        assert!(base1.universe_has_cell(root, "c1").unwrap());

        let new_univ = base1.universe_named("new_univ").unwrap();
        assert_eq!(base1.universe(new_univ).unwrap().cells().len(), 1);
        assert!(base1.universe_has_cell(new_univ, "c2").unwrap());
        assert!(!base1.universe(new_univ).unwrap().is_root());

        let extra = base1.universe_named("extra_univ").unwrap();
        assert!(base1.universe_has_cell(extra, "c3").unwrap());
    }

    #[test]
    fn both_roots_become_new_universes() {
        let (mut base1, base2) = two_bases();
        base1
            .join(
                base2,
                JoinMode::BothAsUniverses("new_univ1".into(), "new_univ2".into()),
            )
            .unwrap();

        assert_eq!(base1.all_universes().len(), 4);
        assert_eq!(base1.all_cells().len(), 3);
        assert_eq!(base1.all_surfaces().len(), 2);

        let root = base1.root_universe();
        assert!(base1.universe(root).unwrap().cells().is_empty());

        let new1 = base1.universe_named("new_univ1").unwrap();
        assert!(base1.universe_has_cell(new1, "c1").unwrap());
        let new2 = base1.universe_named("new_univ2").unwrap();
        assert!(base1.universe_has_cell(new2, "c2").unwrap());
        let extra = base1.universe_named("extra_univ").unwrap();
        assert!(base1.universe_has_cell(extra, "c3").unwrap());
        assert_eq!(base1.universe(extra).unwrap().cells().len(), 1);
    }

    #[test]
    fn name_collisions_abort_before_any_change() {
        let mut base1 = GeometryStore::new();
        let s = base1.create_sphere("shared", Point3::origin(), 1.0).unwrap();
        base1.create_cell("c1", s.pos()).unwrap();

        let mut base2 = GeometryStore::new();
        base2.create_sphere("shared", Point3::origin(), 2.0).unwrap();

        let before = base1.clone();
        assert!(base1.join(base2, JoinMode::MergeRoots).is_err());
        assert!(base1 == before, "failed join must leave the store unchanged");
    }

    #[test]
    fn join_preserves_universe_fills_across_stores() {
        let mut base1 = GeometryStore::new();
        let mut base2 = GeometryStore::new();
        let s2 = base2.create_sphere("s2", Point3::origin(), 1.0).unwrap();
        let inner = base2.create_universe("inner").unwrap();
        base2.create_material_cell_in("mat", "m", s2.neg(), inner).unwrap();
        base2.create_universe_cell("holder", inner, s2.pos()).unwrap();

        base1.join(base2, JoinMode::MergeRoots).unwrap();
        let holder = base1.cell_named("holder").unwrap();
        let filled = base1.cell(holder).unwrap().universe().unwrap();
        assert_eq!(base1.universe(filled).unwrap().name(), "inner");
        assert!(base1.universe(filled).is_ok(), "fill handle must be relinked");
    }

    #[test]
    fn duplicate_mode_names_are_rejected() {
        let (mut base1, base2) = two_bases();
        let result = base1.join(
            base2,
            JoinMode::BothAsUniverses("same".into(), "same".into()),
        );
        assert!(result.is_err());
    }
}
