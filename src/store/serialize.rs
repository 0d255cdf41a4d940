use serde_json::{json, Map, Value};

use super::GeometryStore;
use crate::cell::Fill;
use crate::error::Result;

impl GeometryStore {
    /// Serializes the geometry as a JSON tree.
    ///
    /// The top level holds `SURFACES`, `CELLS` and `UNIVERSES` objects
    /// keyed by entity name. Each surface records its `TYPE` tag and a
    /// `COEFFICIENTS` object; cells record their postfix `REGION` string
    /// and fill; universes record their ordered cell names and whether
    /// they are the root.
    ///
    /// # Errors
    ///
    /// Returns an error if a cell's region fails to render, which only
    /// happens when the store's internal cross-references are broken.
    pub fn to_json(&self) -> Result<Value> {
        let mut surfaces = Map::new();
        for (name, key) in &self.surface_index {
            let Some(surface) = self.surfaces.get(*key) else {
                continue;
            };
            let mut coefficients = Map::new();
            for (coeff, value) in surface.kind().coefficients() {
                coefficients.insert(coeff.to_owned(), json!(value));
            }
            surfaces.insert(
                name.clone(),
                json!({
                    "TYPE": surface.kind().type_name(),
                    "COEFFICIENTS": Value::Object(coefficients),
                }),
            );
        }

        let mut cells = Map::new();
        for (name, key) in &self.cell_index {
            let Some(cell) = self.cells.get(*key) else {
                continue;
            };
            let mut entry = Map::new();
            entry.insert(
                "REGION".to_owned(),
                json!(self.region_postfix_string(cell.region())?),
            );
            entry.insert("FILL_TYPE".to_owned(), json!(cell.fill_type().name()));
            match cell.fill() {
                Fill::Void => {}
                Fill::Material(material) => {
                    entry.insert("FILL".to_owned(), json!(material));
                }
                Fill::Universe(u) => {
                    entry.insert("FILL".to_owned(), json!(self.universe(*u)?.name()));
                }
                Fill::Lattice(l) => {
                    entry.insert("FILL".to_owned(), json!(self.lattice(*l)?.name()));
                }
            }
            cells.insert(name.clone(), Value::Object(entry));
        }

        let mut universes = Map::new();
        for (name, key) in &self.universe_index {
            let Some(universe) = self.universes.get(*key) else {
                continue;
            };
            let cell_names: Vec<String> = universe
                .cells()
                .iter()
                .filter_map(|c| self.cells.get(c.key).map(|cell| cell.name().to_owned()))
                .collect();
            universes.insert(
                name.clone(),
                json!({
                    "CELLS": cell_names,
                    "ROOT": universe.is_root(),
                }),
            );
        }

        Ok(json!({
            "SURFACES": Value::Object(surfaces),
            "CELLS": Value::Object(cells),
            "UNIVERSES": Value::Object(universes),
        }))
    }

    /// Serializes the geometry as a compact JSON string.
    ///
    /// # Errors
    ///
    /// As [`Self::to_json`].
    pub fn to_json_string(&self) -> Result<String> {
        Ok(self.to_json()?.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::store::DEFAULT_ROOT_NAME;

    #[test]
    fn surfaces_serialize_with_type_and_coefficients() {
        let mut store = GeometryStore::new();
        store
            .create_sphere("s", Point3::new(1.0, 2.0, 3.0), 4.0)
            .unwrap();
        store.create_plane("p", 1.0, 0.0, 0.0, 2.0).unwrap();
        let doc = store.to_json().unwrap();

        assert_eq!(doc["SURFACES"]["s"]["TYPE"], json!("sphere"));
        assert_eq!(
            doc["SURFACES"]["s"]["COEFFICIENTS"],
            json!({"x0": 1.0, "y0": 2.0, "z0": 3.0, "r": 4.0})
        );
        assert_eq!(doc["SURFACES"]["p"]["TYPE"], json!("plane"));
        assert_eq!(
            doc["SURFACES"]["p"]["COEFFICIENTS"],
            json!({"a": 1.0, "b": 0.0, "c": 0.0, "d": 2.0})
        );
    }

    #[test]
    fn cells_serialize_region_and_fill() {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("s", Point3::origin(), 1.0).unwrap();
        store.create_material_cell("fuel", "uo2", s.neg()).unwrap();
        store.create_cell("outside", s.pos()).unwrap();
        let doc = store.to_json().unwrap();

        assert_eq!(doc["CELLS"]["fuel"]["REGION"], json!("s -"));
        assert_eq!(doc["CELLS"]["fuel"]["FILL_TYPE"], json!("material"));
        assert_eq!(doc["CELLS"]["fuel"]["FILL"], json!("uo2"));
        assert_eq!(doc["CELLS"]["outside"]["FILL_TYPE"], json!("void"));
        assert!(doc["CELLS"]["outside"].get("FILL").is_none());
    }

    #[test]
    fn universes_serialize_ordered_cells_and_root_flag() {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("s", Point3::origin(), 1.0).unwrap();
        store.create_cell("c1", s.pos()).unwrap();
        store.create_cell("c2", s.neg()).unwrap();
        let doc = store.to_json().unwrap();

        assert_eq!(
            doc["UNIVERSES"][DEFAULT_ROOT_NAME]["CELLS"],
            json!(["c1", "c2"])
        );
        assert_eq!(doc["UNIVERSES"][DEFAULT_ROOT_NAME]["ROOT"], json!(true));
    }

    #[test]
    fn output_round_trips_through_a_string() {
        let mut store = GeometryStore::new();
        let s = store.create_sphere("s", Point3::origin(), 1.0).unwrap();
        store.create_cell("c", s.neg()).unwrap();
        let text = store.to_json_string().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, store.to_json().unwrap());
    }
}
