use crate::error::{LatticeError, Result};
use crate::math::Point3;

/// Shape of a Cartesian lattice: a rectangular `nrow x ncol` grid.
///
/// The lattice is centered on the origin of its local frame. Column index
/// grows with `+x`, row index grows with `-y`, so row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartesianShape {
    nrow: usize,
    ncol: usize,
}

impl CartesianShape {
    pub(crate) fn new(name: &str, nrow: usize, ncol: usize) -> Result<Self> {
        if nrow == 0 || ncol == 0 {
            return Err(LatticeError::GridShape {
                name: name.into(),
                detail: format!("dimensions must be at least 1 x 1, got {nrow} x {ncol}"),
            }
            .into());
        }
        Ok(Self { nrow, ncol })
    }

    /// Infers the shape from per-row lengths, rejecting ragged input.
    pub(crate) fn infer(name: &str, row_lengths: &[usize]) -> Result<Self> {
        let nrow = row_lengths.len();
        let ncol = row_lengths.first().copied().unwrap_or(0);
        for (row, len) in row_lengths.iter().enumerate() {
            if *len != ncol {
                return Err(LatticeError::GridShape {
                    name: name.into(),
                    detail: format!(
                        "row {row} has {len} universes where {ncol} were expected"
                    ),
                }
                .into());
            }
        }
        Self::new(name, nrow, ncol)
    }

    pub(crate) fn validate_grid(&self, name: &str, row_lengths: &[usize]) -> Result<()> {
        let inferred = Self::infer(name, row_lengths)?;
        if inferred != *self {
            return Err(LatticeError::GridShape {
                name: name.into(),
                detail: format!(
                    "expected {} x {}, got {} x {}",
                    self.nrow, self.ncol, inferred.nrow, inferred.ncol
                ),
            }
            .into());
        }
        Ok(())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    /// Whether `(row, col)` addresses a grid position.
    #[must_use]
    pub fn is_valid_index(&self, row: usize, col: usize) -> bool {
        row < self.nrow && col < self.ncol
    }

    /// Maps a point in the lattice frame to the grid cell containing it.
    pub(crate) fn index_of_point(
        &self,
        name: &str,
        pitch: f64,
        point: &Point3,
    ) -> Result<(usize, usize)> {
        #[allow(clippy::cast_precision_loss)]
        let (nrow, ncol) = (self.nrow as f64, self.ncol as f64);
        let u = point.x / pitch + ncol / 2.0;
        let v = nrow / 2.0 - point.y / pitch;
        if !(u >= 0.0 && u < ncol && v >= 0.0 && v < nrow) {
            return Err(LatticeError::PointOutsideLattice { name: name.into() }.into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (v.floor() as usize, u.floor() as usize);
        Ok(index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn infer_rejects_ragged_rows() {
        assert!(CartesianShape::infer("lat", &[3, 2]).is_err());
        let shape = CartesianShape::infer("lat", &[3, 3]).unwrap();
        assert_eq!(shape.nrow(), 2);
        assert_eq!(shape.ncol(), 3);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(CartesianShape::new("lat", 0, 3).is_err());
        assert!(CartesianShape::infer("lat", &[]).is_err());
    }

    #[test]
    fn index_bounds() {
        let shape = CartesianShape::new("lat", 2, 3).unwrap();
        assert!(shape.is_valid_index(1, 2));
        assert!(!shape.is_valid_index(2, 0));
        assert!(!shape.is_valid_index(0, 3));
    }

    #[test]
    fn point_lookup_covers_the_grid() {
        // 2 x 2 lattice with unit pitch spans [-1, 1] in x and y
        let shape = CartesianShape::new("lat", 2, 2).unwrap();
        let idx = |x: f64, y: f64| shape.index_of_point("lat", 1.0, &Point3::new(x, y, 0.0));
        assert_eq!(idx(-0.5, 0.5).unwrap(), (0, 0));
        assert_eq!(idx(0.5, 0.5).unwrap(), (0, 1));
        assert_eq!(idx(-0.5, -0.5).unwrap(), (1, 0));
        assert_eq!(idx(0.5, -0.5).unwrap(), (1, 1));
        assert!(idx(1.5, 0.0).is_err());
        assert!(idx(0.0, -1.5).is_err());
    }
}
