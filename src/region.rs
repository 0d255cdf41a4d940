use crate::error::{RegionError, Result};
use crate::surface::{Halfspace, SurfaceId};

/// Kind tag of a boolean region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Empty,
    Halfspace,
    Complement,
    Intersection,
    Union,
}

/// Boolean operator appearing in the postfix token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Complement,
    Intersection,
    Union,
}

impl Operator {
    /// Returns the operator glyph used in the postfix token stream.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Operator::Complement => '~',
            Operator::Intersection => '&',
            Operator::Union => '|',
        }
    }

    /// Returns the region kind a stream ending in this operator has.
    #[must_use]
    pub fn kind(self) -> RegionKind {
        match self {
            Operator::Complement => RegionKind::Complement,
            Operator::Intersection => RegionKind::Intersection,
            Operator::Union => RegionKind::Union,
        }
    }

    fn operand_error(self) -> RegionError {
        let operator = match self {
            Operator::Complement => "~",
            Operator::Intersection => "&",
            Operator::Union => "|",
        };
        RegionError::EmptyOperand { operator }
    }
}

/// One token of a region's postfix stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    /// Pushes the referenced surface as an operand.
    Surface(SurfaceId),
    /// Pops a surface operand and selects one of its halfspaces.
    Sign(Halfspace),
    /// Pops one (`~`) or two (`&`, `|`) region operands.
    Op(Operator),
}

/// A boolean composition of surface halfspaces.
///
/// Regions are plain values: they are copied freely, never owned by a
/// store, and immutable once built — every operator produces a new region.
/// The postfix token stream is the single source of truth; the flat surface
/// list exists so a store can validate ownership of every referenced
/// surface (duplicates are allowed).
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    kind: RegionKind,
    tokens: Vec<Token>,
    surfaces: Vec<SurfaceId>,
}

impl Region {
    /// Creates the empty region.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kind: RegionKind::Empty,
            tokens: Vec::new(),
            surfaces: Vec::new(),
        }
    }

    /// Creates the halfspace region on the given side of a surface.
    ///
    /// [`SurfaceId::pos`] and [`SurfaceId::neg`] are the usual entry
    /// points.
    #[must_use]
    pub fn halfspace(surface: SurfaceId, sign: Halfspace) -> Self {
        Self {
            kind: RegionKind::Halfspace,
            tokens: vec![Token::Surface(surface), Token::Sign(sign)],
            surfaces: vec![surface],
        }
    }

    /// Returns the region kind.
    #[must_use]
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Whether this is the empty region.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind == RegionKind::Empty
    }

    /// Returns the postfix token stream.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns every surface the region references, duplicates included.
    #[must_use]
    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }

    /// Intersects this region with another.
    ///
    /// # Errors
    ///
    /// Returns an error if either operand is the empty region.
    pub fn and(&self, other: &Region) -> Result<Region> {
        self.binary(other, Operator::Intersection)
    }

    /// Unions this region with another.
    ///
    /// # Errors
    ///
    /// Returns an error if either operand is the empty region.
    pub fn or(&self, other: &Region) -> Result<Region> {
        self.binary(other, Operator::Union)
    }

    /// Complements this region.
    ///
    /// # Errors
    ///
    /// Returns an error if this is the empty region.
    pub fn complement(&self) -> Result<Region> {
        if self.is_empty() {
            return Err(Operator::Complement.operand_error().into());
        }
        let mut tokens = self.tokens.clone();
        tokens.push(Token::Op(Operator::Complement));
        Ok(Region {
            kind: RegionKind::Complement,
            tokens,
            surfaces: self.surfaces.clone(),
        })
    }

    /// In-place intersection.
    ///
    /// # Errors
    ///
    /// Returns an error if either operand is the empty region; `self` is
    /// left untouched on error.
    pub fn and_assign(&mut self, other: &Region) -> Result<()> {
        *self = self.and(other)?;
        Ok(())
    }

    /// In-place union.
    ///
    /// # Errors
    ///
    /// Returns an error if either operand is the empty region; `self` is
    /// left untouched on error.
    pub fn or_assign(&mut self, other: &Region) -> Result<()> {
        *self = self.or(other)?;
        Ok(())
    }

    /// Rewrites every surface handle, used when regions move between
    /// stores.
    pub(crate) fn relink_surfaces<F: Fn(SurfaceId) -> SurfaceId>(&mut self, f: F) {
        for token in &mut self.tokens {
            if let Token::Surface(id) = token {
                *id = f(*id);
            }
        }
        for id in &mut self.surfaces {
            *id = f(*id);
        }
    }

    fn binary(&self, other: &Region, op: Operator) -> Result<Region> {
        if self.is_empty() || other.is_empty() {
            return Err(op.operand_error().into());
        }
        let mut tokens = Vec::with_capacity(self.tokens.len() + other.tokens.len() + 1);
        tokens.extend_from_slice(&self.tokens);
        tokens.extend_from_slice(&other.tokens);
        tokens.push(Token::Op(op));
        let mut surfaces = Vec::with_capacity(self.surfaces.len() + other.surfaces.len());
        surfaces.extend_from_slice(&self.surfaces);
        surfaces.extend_from_slice(&other.surfaces);
        Ok(Region {
            kind: op.kind(),
            tokens,
            surfaces,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::surface::SurfaceKey;
    use slotmap::SlotMap;

    fn surface_ids(n: usize) -> Vec<SurfaceId> {
        let mut keys: SlotMap<SurfaceKey, ()> = SlotMap::with_key();
        (0..n)
            .map(|_| SurfaceId {
                store: 1,
                key: keys.insert(()),
            })
            .collect()
    }

    #[test]
    fn halfspace_region_shape() {
        let ids = surface_ids(1);
        let r = ids[0].pos();
        assert_eq!(r.kind(), RegionKind::Halfspace);
        assert_eq!(r.tokens().len(), 2);
        assert_eq!(r.surfaces(), &[ids[0]]);
    }

    #[test]
    fn intersection_concatenates_postfix_streams() {
        let ids = surface_ids(2);
        let r = ids[0].pos().and(&ids[1].neg()).unwrap();
        assert_eq!(r.kind(), RegionKind::Intersection);
        assert_eq!(r.tokens().len(), 5);
        assert_eq!(
            r.tokens()[4],
            Token::Op(Operator::Intersection),
            "combining operator must come last"
        );
        assert_eq!(r.surfaces().len(), 2);
    }

    #[test]
    fn empty_operands_are_rejected() {
        let ids = surface_ids(1);
        let half = ids[0].pos();
        assert!(half.and(&Region::empty()).is_err());
        assert!(Region::empty().or(&half).is_err());
        assert!(Region::empty().complement().is_err());
    }

    #[test]
    fn complement_appends_one_token() {
        let ids = surface_ids(1);
        let r = ids[0].neg().complement().unwrap();
        assert_eq!(r.kind(), RegionKind::Complement);
        assert_eq!(r.tokens().len(), 3);
    }

    #[test]
    fn assign_operators_replace_in_place() {
        let ids = surface_ids(2);
        let mut r = ids[0].pos();
        r.and_assign(&ids[1].neg()).unwrap();
        assert_eq!(r.kind(), RegionKind::Intersection);

        let mut e = ids[0].pos();
        assert!(e.or_assign(&Region::empty()).is_err());
        assert_eq!(e.kind(), RegionKind::Halfspace, "untouched on error");
    }

    #[test]
    fn duplicate_surfaces_are_kept_in_the_flat_list() {
        let ids = surface_ids(1);
        let r = ids[0].pos().or(&ids[0].neg()).unwrap();
        assert_eq!(r.surfaces().len(), 2);
    }
}
