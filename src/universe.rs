use crate::cell::CellId;
use crate::transform::Transformation;

slotmap::new_key_type! {
    /// Slot key for a universe within a geometry store.
    pub struct UniverseKey;
}

/// Handle to a universe owned by a [`GeometryStore`](crate::store::GeometryStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniverseId {
    pub(crate) store: u64,
    pub(crate) key: UniverseKey,
}

/// A named, ordered set of cell references.
///
/// Exactly one universe per store is the root; it is created automatically
/// when the store is constructed. Universes never own their cells — the
/// store does — and all membership mutation goes through the store.
/// Equality compares the name and the ordered cell list by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    name: String,
    cells: Vec<CellId>,
    root: bool,
    transforms: Vec<Transformation>,
}

impl Universe {
    pub(crate) fn new(name: &str, root: bool) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            root,
            transforms: Vec::new(),
        }
    }

    /// Returns the universe name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the store's root universe.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Returns the cell references in insertion order.
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Whether the universe holds the given cell.
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }

    /// Returns the accumulated transformation records, oldest first.
    #[must_use]
    pub fn transformations(&self) -> &[Transformation] {
        &self.transforms
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.into();
    }

    pub(crate) fn push_cell(&mut self, cell: CellId) {
        self.cells.push(cell);
    }

    pub(crate) fn remove_cell(&mut self, cell: CellId) {
        self.cells.retain(|c| *c != cell);
    }

    pub(crate) fn clear_cells(&mut self) {
        self.cells.clear();
    }

    pub(crate) fn take_cells(&mut self) -> Vec<CellId> {
        std::mem::take(&mut self.cells)
    }

    pub(crate) fn extend_cells(&mut self, cells: impl IntoIterator<Item = CellId>) {
        self.cells.extend(cells);
    }

    pub(crate) fn clear_root(&mut self) {
        self.root = false;
    }

    pub(crate) fn push_transformation(&mut self, t: Transformation) {
        self.transforms.push(t);
    }

    /// Rewrites every cell handle, used when universes move between stores.
    pub(crate) fn relink_cells<F: Fn(CellId) -> CellId>(&mut self, f: F) {
        for cell in &mut self.cells {
            *cell = f(*cell);
        }
    }
}
