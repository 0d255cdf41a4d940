use std::fmt;

use thiserror::Error;

/// Top-level error type for the csgkit modeling kernel.
#[derive(Debug, Error)]
pub enum CsgError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Cell(#[from] CellError),

    #[error(transparent)]
    Lattice(#[from] LatticeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Kind of entity owned by a geometry store, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Surface,
    Cell,
    Universe,
    Lattice,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Surface => "surface",
            EntityKind::Cell => "cell",
            EntityKind::Universe => "universe",
            EntityKind::Lattice => "lattice",
        };
        f.write_str(s)
    }
}

/// Errors related to implicit surface construction and classification.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface {name} requires a strictly positive radius, got {radius}")]
    NonPositiveRadius { name: String, radius: f64 },

    #[error("plane {name} has a zero normal vector")]
    DegeneratePlane { name: String },

    #[error("plane {name} cannot be built from collinear points")]
    CollinearPoints { name: String },

    #[error("point lies exactly on surface {name}, its halfspace is ambiguous")]
    AmbiguousHalfspace { name: String },
}

/// Errors related to boolean region composition and the postfix stream.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("an empty region cannot be an operand of {operator}")]
    EmptyOperand { operator: &'static str },

    #[error("postfix operator {token} is missing an operand")]
    MissingOperand { token: String },

    #[error("postfix stream leaves {count} unresolved operands")]
    DanglingOperands { count: usize },

    #[error("unexpected postfix token {token}")]
    UnexpectedToken { token: String },
}

/// Errors related to cells and their fills.
#[derive(Debug, Error)]
pub enum CellError {
    #[error("cell {cell} has a {actual} fill, not a {expected} fill")]
    FillTypeMismatch {
        cell: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Errors related to lattice shape and indexing.
#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("lattice {name} requires a strictly positive pitch, got {pitch}")]
    NonPositivePitch { name: String, pitch: f64 },

    #[error("lattice {name} grid has the wrong shape: {detail}")]
    GridShape { name: String, detail: String },

    #[error("lattice {name} has no universe grid set")]
    GridNotSet { name: String },

    #[error("index ({row}, {col}) is not valid for lattice {name}")]
    InvalidIndex {
        name: String,
        row: usize,
        col: usize,
    },

    #[error("point is outside the bounds of lattice {name}")]
    PointOutsideLattice { name: String },

    #[error("({ring}, {pos}) is not a valid ring-form hexagonal index")]
    InvalidRingIndex { ring: usize, pos: usize },

    #[error("({row}, {col}) is not a valid row-form hexagonal index")]
    InvalidRowIndex { row: usize, col: usize },
}

/// Errors related to spatial transformations.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("scale factors must be strictly positive, got {factor}")]
    NonPositiveScale { factor: f64 },
}

/// Errors raised by the owning geometry store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} with name {name} already exists in the geometry")]
    DuplicateName { kind: EntityKind, name: String },

    #[error("name {name:?} contains whitespace, which is not allowed")]
    NameWhitespace { name: String },

    #[error("name {name:?} contains the reserved operator character '{symbol}'")]
    NameSymbol { name: String, symbol: char },

    #[error("no {kind} by name {name} exists in the geometry")]
    UnknownName { kind: EntityKind, name: String },

    #[error("{kind} is not owned by this geometry store")]
    Foreign { kind: EntityKind },

    #[error("universe {universe} has no cell named {cell}")]
    CellNotInUniverse { universe: String, cell: String },

    #[error("cell {cell} cannot be filled with the same universe to which it is being added")]
    SelfContainingUniverse { cell: String },

    #[error(
        "cell {cell} cannot be filled with a lattice containing the same universe \
         to which it is being added"
    )]
    SelfContainingLattice { cell: String },
}

/// Convenience type alias for results using [`CsgError`].
pub type Result<T> = std::result::Result<T, CsgError>;
