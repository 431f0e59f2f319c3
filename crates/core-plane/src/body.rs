use crate::TypeId;

/// A tile's content: a single type, or a non-Manhattan split into two
/// half-types either side of a diagonal (spec §3 "Tile" / §9 "Split-tile
/// body encoded by bit-packing"). Modeled as a tagged union rather than the
/// source's bit-packed word, per the redesign note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Solid(TypeId),
    Diagonal(Diagonal),
}

/// Which way the diagonal cuts the tile's bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Rises left-to-right, like `/`. The lower-right triangle is `right`.
    Slash,
    /// Falls left-to-right, like `\`. The upper-right triangle is `right`.
    Backslash,
}

/// Scratch bit distinguishing which of a diagonal's two triangular halves a
/// traversal currently cares about. Spec §9 calls out that the source reuses
/// the body word's `side` bit for this and asks for an explicit field
/// instead; callers that need it pass `Side` alongside a tile reference
/// rather than mutating the tile itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagonal {
    pub left: TypeId,
    pub right: TypeId,
    pub direction: Direction,
}

impl Body {
    pub fn is_split(&self) -> bool {
        matches!(self, Body::Diagonal(_))
    }

    /// The type visible on the given half of a (possibly non-split) tile.
    /// For a solid tile both halves are the same type.
    pub fn half(&self, side: Side) -> TypeId {
        match (self, side) {
            (Body::Solid(t), _) => *t,
            (Body::Diagonal(d), Side::Left) => d.left,
            (Body::Diagonal(d), Side::Right) => d.right,
        }
    }

    /// Build a diagonal from its two new half-types, collapsing to a solid
    /// tile when they turn out equal (spec §4.2 step 4, INV-NOSPLITDEGEN).
    pub fn diagonal_or_collapse(left: TypeId, right: TypeId, direction: Direction) -> Body {
        if left == right {
            Body::Solid(left)
        } else {
            Body::Diagonal(Diagonal {
                left,
                right,
                direction,
            })
        }
    }
}
