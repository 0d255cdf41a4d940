use std::collections::HashMap;
use std::sync::atomic::Ordering;

use slotmap::SlotMap;

use super::{GeometryStore, NEXT_STORE_ID};
use crate::cell::{Cell, CellId, CellKey, Fill};
use crate::lattice::{Lattice, LatticeId, LatticeKey, Outer};
use crate::surface::{SurfaceId, SurfaceKey};
use crate::universe::{Universe, UniverseId, UniverseKey};

impl Clone for GeometryStore {
    /// Deep-copies every collection into a brand-new store and re-links
    /// every internal handle to point within it.
    ///
    /// The clone compares equal to the source until either side is
    /// mutated; handles minted by the source are not valid on the clone.
    fn clone(&self) -> Self {
        let id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        let mut out = GeometryStore {
            id,
            surfaces: SlotMap::with_key(),
            cells: SlotMap::with_key(),
            universes: SlotMap::with_key(),
            lattices: SlotMap::with_key(),
            surface_index: HashMap::new(),
            cell_index: HashMap::new(),
            universe_index: HashMap::new(),
            lattice_index: HashMap::new(),
            root: UniverseKey::default(),
        };

        let mut smap: HashMap<SurfaceKey, SurfaceKey> = HashMap::new();
        for (key, surface) in &self.surfaces {
            let new_key = out.surfaces.insert(surface.clone());
            out.surface_index.insert(surface.name().to_owned(), new_key);
            smap.insert(key, new_key);
        }
        let mut cmap: HashMap<CellKey, CellKey> = HashMap::new();
        for (key, cell) in &self.cells {
            let new_key = out.cells.insert(cell.clone());
            out.cell_index.insert(cell.name().to_owned(), new_key);
            cmap.insert(key, new_key);
        }
        let mut umap: HashMap<UniverseKey, UniverseKey> = HashMap::new();
        for (key, universe) in &self.universes {
            let new_key = out.universes.insert(universe.clone());
            out.universe_index.insert(universe.name().to_owned(), new_key);
            umap.insert(key, new_key);
        }
        let mut lmap: HashMap<LatticeKey, LatticeKey> = HashMap::new();
        for (key, lattice) in &self.lattices {
            let new_key = out.lattices.insert(lattice.clone());
            out.lattice_index.insert(lattice.name().to_owned(), new_key);
            lmap.insert(key, new_key);
        }
        out.root = umap.get(&self.root).copied().unwrap_or_default();

        // A well-formed source only holds handles its arenas resolve, so
        // every lookup below hits; unknown keys are passed through.
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
        for cell in out.cells.values_mut() {
            cell.relink(&map_s, &map_u, &map_l);
        }
        for universe in out.universes.values_mut() {
            universe.relink_cells(&map_c);
        }
        for lattice in out.lattices.values_mut() {
            lattice.relink_universes(&map_u);
        }
        out
    }
}

/// Structural, name-based equality.
///
/// Handles differ between stores by construction, so two stores compare
/// equal when their collections hold the same names and every name-equal
/// pair of entities matches once its handles are resolved to names. This
/// is what makes `store.clone() == store` hold.
impl PartialEq for GeometryStore {
    fn eq(&self, other: &Self) -> bool {
        self.surfaces_match(other)
            && self.cells_match(other)
            && self.universes_match(other)
            && self.lattices_match(other)
    }
}

impl GeometryStore {
    fn surfaces_match(&self, other: &Self) -> bool {
        if self.surface_index.len() != other.surface_index.len() {
            return false;
        }
        self.surface_index.iter().all(|(name, key)| {
            let mine = self.surfaces.get(*key);
            let theirs = other
                .surface_index
                .get(name)
                .and_then(|k| other.surfaces.get(*k));
            match (mine, theirs) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        })
    }

    fn cells_match(&self, other: &Self) -> bool {
        if self.cell_index.len() != other.cell_index.len() {
            return false;
        }
        self.cell_index.iter().all(|(name, key)| {
            let mine = self.cells.get(*key);
            let theirs = other
                .cell_index
                .get(name)
                .and_then(|k| other.cells.get(*k));
            match (mine, theirs) {
                (Some(a), Some(b)) => {
                    self.cell_signature(a).is_some()
                        && self.cell_signature(a) == other.cell_signature(b)
                }
                _ => false,
            }
        })
    }

    /// Region postfix, fill tag and resolved fill name; `None` when a
    /// handle fails to resolve.
    fn cell_signature(&self, cell: &Cell) -> Option<(Vec<String>, &'static str, Option<String>)> {
        let postfix = self.region_to_postfix(cell.region()).ok()?;
        let fill_name = match cell.fill() {
            Fill::Void => None,
            Fill::Material(material) => Some(material.clone()),
            Fill::Universe(u) => Some(self.universes.get(u.key)?.name().to_owned()),
            Fill::Lattice(l) => Some(self.lattices.get(l.key)?.name().to_owned()),
        };
        Some((postfix, cell.fill_type().name(), fill_name))
    }

    fn universes_match(&self, other: &Self) -> bool {
        if self.universe_index.len() != other.universe_index.len() {
            return false;
        }
        self.universe_index.iter().all(|(name, key)| {
            let mine = self.universes.get(*key);
            let theirs = other
                .universe_index
                .get(name)
                .and_then(|k| other.universes.get(*k));
            match (mine, theirs) {
                (Some(a), Some(b)) => {
                    a.is_root() == b.is_root()
                        && a.transformations() == b.transformations()
                        && self.cell_names(a).is_some()
                        && self.cell_names(a) == other.cell_names(b)
                }
                _ => false,
            }
        })
    }

    fn cell_names(&self, universe: &Universe) -> Option<Vec<String>> {
        universe
            .cells()
            .iter()
            .map(|c| self.cells.get(c.key).map(|cell| cell.name().to_owned()))
            .collect()
    }

    fn lattices_match(&self, other: &Self) -> bool {
        if self.lattice_index.len() != other.lattice_index.len() {
            return false;
        }
        self.lattice_index.iter().all(|(name, key)| {
            let mine = self.lattices.get(*key);
            let theirs = other
                .lattice_index
                .get(name)
                .and_then(|k| other.lattices.get(*k));
            match (mine, theirs) {
                (Some(a), Some(b)) => {
                    a.kind() == b.kind()
                        && a.dimensions() == b.dimensions()
                        && a.transformations() == b.transformations()
                        && self.lattice_signature(a).is_some()
                        && self.lattice_signature(a) == other.lattice_signature(b)
                }
                _ => false,
            }
        })
    }

    /// Grid and outer fill with universes resolved to names; `None` when a
    /// handle fails to resolve.
    #[allow(clippy::type_complexity)]
    fn lattice_signature(
        &self,
        lattice: &Lattice,
    ) -> Option<(Option<Vec<Vec<String>>>, &'static str, Option<String>)> {
        let grid = match lattice.grid() {
            None => None,
            Some(rows) => {
                let mut resolved = Vec::with_capacity(rows.len());
                for row in rows {
                    let names: Option<Vec<String>> = row
                        .iter()
                        .map(|u| self.universes.get(u.key).map(|x| x.name().to_owned()))
                        .collect();
                    resolved.push(names?);
                }
                Some(resolved)
            }
        };
        let (outer_tag, outer_name) = match lattice.outer() {
            Outer::Void => ("void", None),
            Outer::Material(material) => ("material", Some(material.clone())),
            Outer::Universe(u) => ("universe", Some(self.universes.get(u.key)?.name().to_owned())),
        };
        Some((grid, outer_tag, outer_name))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;

    /// Builds a store exercising every cross-reference kind.
    fn rich_store() -> GeometryStore {
        let mut store = GeometryStore::new();
        let inner_univ = store.create_universe("univ1").unwrap();
        let inner_surf = store
            .create_sphere("inner_surf", Point3::origin(), 3.0)
            .unwrap();
        store
            .create_material_cell_in("cell_inner", "mat1", inner_surf.neg(), inner_univ)
            .unwrap();
        let outer_surf = store
            .create_sphere("outer_surf", Point3::origin(), 5.0)
            .unwrap();
        store
            .create_universe_cell("cell_univ_fill", inner_univ, outer_surf.neg())
            .unwrap();
        store.create_cell("cell_void", outer_surf.pos()).unwrap();
        let lat = store
            .create_cartesian_lattice_with_universes("lat1", 1.0, vec![vec![inner_univ]])
            .unwrap();
        store
            .create_lattice_cell("cell_lat", lat, outer_surf.neg())
            .unwrap();
        store
    }

    #[test]
    fn clone_compares_equal_until_mutated() {
        let mut store = rich_store();
        let copy = store.clone();
        assert!(store == copy);

        store.create_sphere("new_surf", Point3::origin(), 6.0).unwrap();
        assert!(store != copy);
    }

    #[test]
    fn clone_is_fully_relinked() {
        let store = rich_store();
        let copy = store.clone();
        // every handle the clone returns resolves against the clone
        for cell in copy.all_cells() {
            let cell = copy.cell(cell).unwrap();
            copy.check_region_surfaces(cell.region()).unwrap();
        }
        let univ = copy.universe_named("univ1").unwrap();
        assert!(copy.universe(univ).is_ok());
        // and source handles are rejected by the clone
        let source_univ = store.universe_named("univ1").unwrap();
        assert!(copy.universe(source_univ).is_err());
    }

    #[test]
    fn clone_diverges_when_the_clone_mutates() {
        let store = rich_store();
        let mut copy = store.clone();
        assert!(store == copy);
        let univ = copy.universe_named("univ1").unwrap();
        copy.rename_universe(univ, "renamed").unwrap();
        assert!(store != copy);
    }

    #[test]
    fn equality_is_structural_not_handle_based() {
        // two stores built the same way compare equal despite distinct ids
        let a = rich_store();
        let b = rich_store();
        assert!(a == b);
    }
}
