use crate::error::{LatticeError, Result};
use crate::math::Point3;

/// Shape of a hexagonal lattice: concentric rings of hexagonal cells.
///
/// The grid is stored row-form: `2 * rings - 1` rows, where row `r`
/// (0-indexed, center row at `rings - 1`) holds `rows - |r - center|`
/// cells. Ring-form addresses the same cells by `(ring, position)`: ring 0
/// is the single center cell and ring `k > 0` has `6 * k` positions,
/// position 0 at the bottom-right vertex, counting counter-clockwise along
/// six straight sides of length `k`.
///
/// Internally both forms map through axial coordinates `(q, r)`: `r` is the
/// row offset from the center row and `q` the column offset along a row,
/// skewed so that the three axial directions are symmetric. Row index grows
/// with `-y` in the lattice frame, matching the Cartesian convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexagonalShape {
    rings: usize,
}

/// Ring-side start corners in axial coordinates, as multiples of the ring
/// index. Side 0 starts at the bottom-right vertex; the walk is
/// counter-clockwise.
const CORNERS: [(i64, i64); 6] = [(0, 1), (1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1)];

/// Axial step directions along each side.
const DIRECTIONS: [(i64, i64); 6] = [(1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1), (1, 0)];

impl HexagonalShape {
    pub(crate) fn new(name: &str, rings: usize) -> Result<Self> {
        if rings == 0 {
            return Err(LatticeError::GridShape {
                name: name.into(),
                detail: "at least one ring is required".into(),
            }
            .into());
        }
        Ok(Self { rings })
    }

    /// Infers the shape from per-row lengths, validating the hexagonal
    /// profile.
    pub(crate) fn infer(name: &str, row_lengths: &[usize]) -> Result<Self> {
        let rows = row_lengths.len();
        if rows % 2 == 0 {
            return Err(LatticeError::GridShape {
                name: name.into(),
                detail: format!("an odd number of rows is required, got {rows}"),
            }
            .into());
        }
        let shape = Self::new(name, (rows + 1) / 2)?;
        shape.validate_grid(name, row_lengths)?;
        Ok(shape)
    }

    pub(crate) fn validate_grid(&self, name: &str, row_lengths: &[usize]) -> Result<()> {
        if row_lengths.len() != self.rows() {
            return Err(LatticeError::GridShape {
                name: name.into(),
                detail: format!(
                    "expected {} rows, got {}",
                    self.rows(),
                    row_lengths.len()
                ),
            }
            .into());
        }
        for (row, len) in row_lengths.iter().enumerate() {
            let expected = self.row_length(row);
            if *len != expected {
                return Err(LatticeError::GridShape {
                    name: name.into(),
                    detail: format!(
                        "row {row} has {len} universes where {expected} were expected"
                    ),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Returns the number of rings.
    #[must_use]
    pub fn rings(&self) -> usize {
        self.rings
    }

    /// Returns the number of rows in row-form.
    #[must_use]
    pub fn rows(&self) -> usize {
        2 * self.rings - 1
    }

    /// Returns the number of cells in the given row.
    ///
    /// The row index must be less than [`Self::rows`].
    #[must_use]
    pub fn row_length(&self, row: usize) -> usize {
        let center = self.rings - 1;
        self.rows() - row.abs_diff(center)
    }

    /// Whether `(row, col)` addresses a grid position.
    #[must_use]
    pub fn is_valid_index(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.row_length(row)
    }

    /// Converts a ring-form index to row-form.
    ///
    /// # Errors
    ///
    /// Returns an error if `ring` is beyond the outermost ring or `pos` is
    /// not one of the ring's positions.
    pub fn ring_to_row(&self, ring: usize, pos: usize) -> Result<(usize, usize)> {
        if ring >= self.rings || (ring == 0 && pos != 0) || (ring > 0 && pos >= 6 * ring) {
            return Err(LatticeError::InvalidRingIndex { ring, pos }.into());
        }
        if ring == 0 {
            let center = self.rings - 1;
            return Ok((center, center));
        }
        #[allow(clippy::cast_possible_wrap)]
        let k = ring as i64;
        let side = pos / ring;
        #[allow(clippy::cast_possible_wrap)]
        let off = (pos % ring) as i64;
        let (cq, cr) = CORNERS[side];
        let (dq, dr) = DIRECTIONS[side];
        let q = cq * k + off * dq;
        let r = cr * k + off * dr;
        Ok(self.index_from_axial(q, r))
    }

    /// Converts a row-form index to ring-form.
    ///
    /// # Errors
    ///
    /// Returns an error if `(row, col)` is not a valid grid index.
    pub fn row_to_ring(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        if !self.is_valid_index(row, col) {
            return Err(LatticeError::InvalidRowIndex { row, col }.into());
        }
        let (q, r) = self.axial_from_index(row, col);
        let k = (q.abs() + r.abs() + (q + r).abs()) / 2;
        if k == 0 {
            return Ok((0, 0));
        }
        // Resolve which of the six sides the cell lies on, then the offset
        // from that side's start corner.
        let (side, off) = if q + r == k && q < k {
            (0, q)
        } else if q == k && r > -k {
            (1, -r)
        } else if r == -k && q > 0 {
            (2, k - q)
        } else if q + r == -k && q > -k {
            (3, -q)
        } else if q == -k && r < k {
            (4, r)
        } else {
            (5, q + k)
        };
        #[allow(clippy::cast_sign_loss)]
        let index = (k as usize, (side * k + off) as usize);
        Ok(index)
    }

    /// Maps a point in the lattice frame to the row-form cell containing it.
    ///
    /// Cells are regular hexagons with flat-to-flat width `pitch`, rows
    /// running along `x`.
    pub(crate) fn index_of_point(
        &self,
        name: &str,
        pitch: f64,
        point: &Point3,
    ) -> Result<(usize, usize)> {
        let size = pitch / 3f64.sqrt();
        // Row index grows downward; flip y once here.
        let y = -point.y;
        let qf = ((3f64.sqrt() / 3.0) * point.x - y / 3.0) / size;
        let rf = (2.0 / 3.0) * y / size;
        let (q, r) = cube_round(qf, rf);
        let ring = (q.abs() + r.abs() + (q + r).abs()) / 2;
        #[allow(clippy::cast_possible_wrap)]
        let outermost = self.rings as i64 - 1;
        if ring > outermost {
            return Err(LatticeError::PointOutsideLattice { name: name.into() }.into());
        }
        Ok(self.index_from_axial(q, r))
    }

    fn axial_from_index(&self, row: usize, col: usize) -> (i64, i64) {
        #[allow(clippy::cast_possible_wrap)]
        let n = self.rings as i64 - 1;
        #[allow(clippy::cast_possible_wrap)]
        let r = row as i64 - n;
        #[allow(clippy::cast_possible_wrap)]
        let q = col as i64 - n + 0.max(-r);
        (q, r)
    }

    fn index_from_axial(&self, q: i64, r: i64) -> (usize, usize) {
        #[allow(clippy::cast_possible_wrap)]
        let n = self.rings as i64 - 1;
        #[allow(clippy::cast_sign_loss)]
        let index = ((r + n) as usize, (q + n - 0.max(-r)) as usize);
        index
    }
}

/// Rounds fractional axial coordinates to the nearest hexagonal cell.
///
/// The three cube coordinates are rounded independently, then the one with
/// the largest rounding error is recomputed from the other two so the cube
/// constraint `q + y + r = 0` holds again. A third coordinate that is
/// largest needs no correction here since only `q` and `r` are returned.
fn cube_round(qf: f64, rf: f64) -> (i64, i64) {
    let yf = -qf - rf;
    let mut q = qf.round();
    let y = yf.round();
    let mut r = rf.round();
    let dq = (q - qf).abs();
    let dy = (y - yf).abs();
    let dr = (r - rf).abs();
    if dq > dy && dq > dr {
        q = -y - r;
    } else if dr >= dy {
        r = -q - y;
    }
    #[allow(clippy::cast_possible_truncation)]
    let rounded = (q as i64, r as i64);
    rounded
}
