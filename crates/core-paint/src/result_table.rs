use core_plane::TypeId;

/// Maps the type a tile currently has to the type it should have after a
/// paint call (spec §6 "Result-table contract"). Applied independently to
/// each half of a split tile, so a table never needs to know whether it is
/// looking at a whole tile or one triangular half of one.
pub trait ResultTable {
    fn lookup(&self, old: TypeId) -> TypeId;
}

impl<F: Fn(TypeId) -> TypeId> ResultTable for F {
    fn lookup(&self, old: TypeId) -> TypeId {
        self(old)
    }
}

/// An interaction table that reports every type as interacting with it -
/// used by callers of [`crate::fracture_plane`] that want an unconditional
/// Manhattan-alignment pass with no paint attached, rather than preserving
/// non-interacting split tiles.
pub struct AlwaysInteracts;

impl ResultTable for AlwaysInteracts {
    fn lookup(&self, old: TypeId) -> TypeId {
        old.wrapping_add(1)
    }
}

/// The small family of result tables every caller in this workspace actually
/// needs (spec's `paint`/`write`/`erase`/`single`/`constant` table
/// constructors, plus the `xor`/`mark` methods spec §4.2 names separately).
/// This also doubles as the `method` parameter spec's interfaces list
/// alongside `result_table`: a `Method` carries both the mapping and the
/// mode in one value, which is what `paint_plane` actually consults to
/// decide whether to apply the mark-scratch bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Paint unconditionally to `new`, ignoring whatever type was there.
    /// Covers the source's `write`, `single`, and `constant` table
    /// constructors, which differ from each other only in caller-facing
    /// name, not behavior.
    Paint(TypeId),
    /// `target -> background`, every other old type passes through
    /// unchanged. Covers the source's `erase` table: erasing one type must
    /// leave tiles of any other type already inside the area alone.
    Erase { target: TypeId, background: TypeId },
    /// Bitwise XOR the existing type against `mask`, unconditionally (spec
    /// §4.2 step 2: "use the table's first entry unconditionally"). Used by
    /// DRC-style marking passes that toggle a single design-rule bit
    /// without touching the rest of a tile's type.
    Xor(TypeId),
    /// Paint unconditionally to `new`, like [`Method::Paint`], but
    /// `paint_plane` additionally consults `epoch` so a tile already marked
    /// at that epoch is skipped outright (spec §4.2 "method ∈ {normal,
    /// xor, mark}" - "so no tile is visited twice", required by
    /// overlap-sensitive callers such as the DRC). A caller that wants
    /// several overlapping paints to share one visited-set draws `epoch`
    /// once from [`core_plane::Plane::next_epoch`] and reuses it across
    /// calls; the dedup bookkeeping itself lives in `paint_plane`, not in
    /// this lookup.
    Mark { new: TypeId, epoch: u64 },
}

impl ResultTable for Method {
    fn lookup(&self, old: TypeId) -> TypeId {
        match self {
            Method::Paint(new) => *new,
            Method::Erase { target, background } => {
                if old == *target {
                    *background
                } else {
                    old
                }
            }
            Method::Xor(mask) => old ^ mask,
            Method::Mark { new, .. } => *new,
        }
    }
}
