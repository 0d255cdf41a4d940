use std::collections::{HashSet, VecDeque};

use tracing::warn;

use super::GeometryStore;
use crate::cell::Fill;
use crate::universe::UniverseKey;

impl GeometryStore {
    /// Reports every universe not reachable from the root.
    ///
    /// The traversal follows cell fills and, through lattices, grid
    /// positions and universe outer fills. Orphans are reported as
    /// warnings and returned sorted by name; an unreachable universe is
    /// suspicious but never an error.
    #[must_use]
    pub fn check_universe_linking(&self) -> Vec<String> {
        let mut visited: HashSet<UniverseKey> = HashSet::new();
        let mut queue: VecDeque<UniverseKey> = VecDeque::new();
        visited.insert(self.root);
        queue.push_back(self.root);

        while let Some(key) = queue.pop_front() {
            let Some(universe) = self.universes.get(key) else {
                continue;
            };
            for cell in universe.cells() {
                let Some(cell) = self.cells.get(cell.key) else {
                    continue;
                };
                match cell.fill() {
                    Fill::Universe(id) => {
                        if visited.insert(id.key) {
                            queue.push_back(id.key);
                        }
                    }
                    Fill::Lattice(id) => {
                        if let Some(lattice) = self.lattices.get(id.key) {
                            for linked in lattice.unique_universes() {
                                if visited.insert(linked.key) {
                                    queue.push_back(linked.key);
                                }
                            }
                        }
                    }
                    Fill::Void | Fill::Material(_) => {}
                }
            }
        }

        let mut orphans: Vec<String> = self
            .universes
            .iter()
            .filter(|(key, _)| !visited.contains(key))
            .map(|(_, universe)| universe.name().to_owned())
            .collect();
        orphans.sort();
        for name in &orphans {
            warn!(universe = %name, "universe is not linked to the root universe");
        }
        orphans
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::lattice::Outer;
    use crate::math::Point3;

    #[test]
    fn unlinked_universe_is_reported_until_filled_in() {
        let mut store = GeometryStore::new();
        store.create_universe("univ1").unwrap();
        assert_eq!(store.check_universe_linking(), vec!["univ1".to_owned()]);

        // linking it through a root cell clears the report
        let s = store.create_sphere("surf1", Point3::origin(), 1.0).unwrap();
        let u = store.universe_named("univ1").unwrap();
        store.create_universe_cell("c1", u, s.pos()).unwrap();
        assert!(store.check_universe_linking().is_empty());
    }

    #[test]
    fn lattice_grids_and_outer_fills_link_universes() {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("s", Point3::origin(), 1.0).unwrap();
        let grid_univ = store.create_universe("grid_univ").unwrap();
        let outer_univ = store.create_universe("outer_univ").unwrap();
        let lat = store
            .create_cartesian_lattice_with_universes("lat", 1.0, vec![vec![grid_univ]])
            .unwrap();
        store
            .set_lattice_outer(lat, Outer::Universe(outer_univ))
            .unwrap();

        // nothing references the lattice yet, so both universes are orphans
        assert_eq!(
            store.check_universe_linking(),
            vec!["grid_univ".to_owned(), "outer_univ".to_owned()]
        );

        store.create_lattice_cell("latt_cell", lat, s.neg()).unwrap();
        assert!(store.check_universe_linking().is_empty());
    }

    #[test]
    fn reachability_is_transitive() {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("s", Point3::origin(), 1.0).unwrap();
        let a = store.create_universe("a").unwrap();
        let b = store.create_universe("b").unwrap();
        // root -> c_root -> a -> c_a -> b
        store.create_universe_cell("c_root", a, s.pos()).unwrap();
        store.create_universe_cell_in("c_a", b, s.neg(), a).unwrap();
        assert!(store.check_universe_linking().is_empty());
    }
}
