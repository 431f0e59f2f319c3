use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};

use core_geom::{Point, Rect};
use tracing::trace;

use crate::body::Body;
use crate::cancel::CancellationToken;
use crate::tile::{Tile, TileId};
use crate::typeid::TypeId;

static NEXT_PLANE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one `Plane` instance, carried on undo events so a replay log
/// spanning several planes (e.g. a layout plane and a channel-map plane)
/// knows which one a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneId(u64);

/// The corner-stitched tile partition of one bounded rectangle (spec §3
/// "Plane"). Tiles live in a free-list-backed slab so joining a tile away
/// returns its slot for reuse instead of leaking it (spec §5 "Resources").
pub struct Plane {
    id: PlaneId,
    bounds: Rect,
    slab: Vec<Option<Tile>>,
    free: Vec<u32>,
    hint: TileId,
    next_epoch: u64,
}

impl Plane {
    /// Build a plane that is one single tile of `initial_type` spanning
    /// `bounds`. `bounds` is the large-but-finite sentinel region spec §3
    /// accepts in place of a truly infinite universe.
    pub fn new(bounds: Rect, initial_type: TypeId) -> Self {
        assert!(!bounds.is_empty(), "plane bounds must be non-empty");
        let mut slab = Vec::new();
        slab.push(Some(Tile::new(bounds, Body::Solid(initial_type))));
        Self {
            id: PlaneId(NEXT_PLANE_ID.fetch_add(1, Ordering::Relaxed)),
            bounds,
            slab,
            free: Vec::new(),
            hint: TileId(0),
            next_epoch: 1,
        }
    }

    pub fn id(&self) -> PlaneId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn hint(&self) -> TileId {
        self.hint
    }

    pub fn get(&self, id: TileId) -> &Tile {
        self.slab[id.index()]
            .as_ref()
            .expect("dangling TileId: tile was freed")
    }

    pub fn get_mut(&mut self, id: TileId) -> &mut Tile {
        self.slab[id.index()]
            .as_mut()
            .expect("dangling TileId: tile was freed")
    }

    pub fn active_ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.slab
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|_| TileId(i as u32)))
    }

    pub fn tile_count(&self) -> usize {
        self.slab.len() - self.free.len()
    }

    pub fn is_active(&self, id: TileId) -> bool {
        id.is_some() && self.slab.get(id.index()).is_some_and(Option::is_some)
    }

    /// Monotonic counter for the `mark` paint method (spec §9's epoch-counter
    /// alternative to a scratch `client` field): a fresh call to this gives
    /// every subsequent `Tile::is_marked` check against the returned value a
    /// clean slate, with no second pass needed to clear old marks.
    pub fn next_epoch(&mut self) -> u64 {
        let e = self.next_epoch;
        self.next_epoch += 1;
        e
    }

    pub fn mark_tile(&mut self, id: TileId, epoch: u64) {
        self.get_mut(id).mark_epoch = epoch;
    }

    fn alloc(&mut self, tile: Tile) -> TileId {
        if let Some(idx) = self.free.pop() {
            self.slab[idx as usize] = Some(tile);
            TileId(idx)
        } else {
            self.slab.push(Some(tile));
            TileId((self.slab.len() - 1) as u32)
        }
    }

    fn dealloc(&mut self, id: TileId) {
        self.slab[id.index()] = None;
        self.free.push(id.0);
    }

    /// Point location (spec §4.1): walk from `hint` toward `target`, updating
    /// `hint` to the tile found. The reference implementation in this crate
    /// trades the source's O(sqrt n)-from-a-good-hint pointer walk for a
    /// bounded scan (see DESIGN.md); the externally observable behavior -
    /// correct tile, updated hint - is identical.
    pub fn locate(&mut self, target: Point) -> TileId {
        if let Some(found) = self.find_containing(target) {
            self.hint = found;
            return found;
        }
        panic!("point {target:?} is outside plane bounds {:?}", self.bounds);
    }

    fn find_containing(&self, target: Point) -> Option<TileId> {
        if let Some(t) = self.slab[self.hint.index()].as_ref()
            && t.rect.contains_point(target)
        {
            return Some(self.hint);
        }
        self.active_ids()
            .find(|&id| self.get(id).rect.contains_point(target))
    }

    /// Tiles overlapping the given side's neighbor query, by corner-stitch
    /// definition (spec §3):
    /// - `tr`: right-edge neighbor found at the top.
    /// - `bl`: left-edge neighbor found at the bottom.
    /// - `rt`: top-edge neighbor found at the right.
    /// - `lb`: bottom-edge neighbor found at the left.
    fn find_tr(&self, r: Rect) -> TileId {
        self.active_ids()
            .find(|&id| {
                let o = self.get(id).rect;
                o.x_lo == r.x_hi && o.y_lo < r.y_hi && r.y_hi <= o.y_hi
            })
            .unwrap_or(TileId::NONE)
    }

    fn find_bl(&self, r: Rect) -> TileId {
        self.active_ids()
            .find(|&id| {
                let o = self.get(id).rect;
                o.x_hi == r.x_lo && o.y_lo <= r.y_lo && r.y_lo < o.y_hi
            })
            .unwrap_or(TileId::NONE)
    }

    fn find_rt(&self, r: Rect) -> TileId {
        self.active_ids()
            .find(|&id| {
                let o = self.get(id).rect;
                o.y_lo == r.y_hi && o.x_lo < r.x_hi && r.x_hi <= o.x_hi
            })
            .unwrap_or(TileId::NONE)
    }

    fn find_lb(&self, r: Rect) -> TileId {
        self.active_ids()
            .find(|&id| {
                let o = self.get(id).rect;
                o.y_hi == r.y_lo && o.x_lo <= r.x_lo && r.x_lo < o.x_hi
            })
            .unwrap_or(TileId::NONE)
    }

    /// Recompute the four corner-stitch pointers for every tile whose rect
    /// touches `region` expanded by one unit, after a mutation inside
    /// `region`. Bounded to the affected neighborhood rather than the whole
    /// plane.
    pub(crate) fn restitch_region(&mut self, region: Rect) {
        let expanded = Rect::new(
            region.x_lo - 1,
            region.y_lo - 1,
            region.x_hi + 1,
            region.y_hi + 1,
        );
        let affected: Vec<TileId> = self
            .active_ids()
            .filter(|&id| self.get(id).rect.intersects(&expanded))
            .collect();
        for id in affected {
            let r = self.get(id).rect;
            let tr = self.find_tr(r);
            let bl = self.find_bl(r);
            let rt = self.find_rt(r);
            let lb = self.find_lb(r);
            let t = self.get_mut(id);
            t.tr = tr;
            t.bl = bl;
            t.rt = rt;
            t.lb = lb;
        }
    }

    /// `can_merge_y`/`can_merge_x` (spec §4.1): two tiles may join along the
    /// given axis when they share the full perpendicular span, have equal
    /// bodies, and neither is a split tile.
    pub fn can_merge_y(&self, a: TileId, b: TileId) -> bool {
        let ta = self.get(a);
        let tb = self.get(b);
        ta.rect.x_lo == tb.rect.x_lo
            && ta.rect.x_hi == tb.rect.x_hi
            && ta.body == tb.body
            && !ta.body.is_split()
    }

    pub fn can_merge_x(&self, a: TileId, b: TileId) -> bool {
        let ta = self.get(a);
        let tb = self.get(b);
        ta.rect.y_lo == tb.rect.y_lo
            && ta.rect.y_hi == tb.rect.y_hi
            && ta.body == tb.body
            && !ta.body.is_split()
    }

    /// Vertical split at `y` (spec §4.1): `id` becomes a bottom tile keeping
    /// the old body and a new top tile copying it. Returns `(bottom, top)`.
    pub fn split_y(&mut self, id: TileId, y: i64) -> (TileId, TileId) {
        let tile = self.get(id).clone_for_split();
        debug_assert!(tile.rect.y_lo < y && y < tile.rect.y_hi);

        let bottom_rect = Rect::new(tile.rect.x_lo, tile.rect.y_lo, tile.rect.x_hi, y);
        let top_rect = Rect::new(tile.rect.x_lo, y, tile.rect.x_hi, tile.rect.y_hi);

        self.get_mut(id).rect = bottom_rect;
        let top_id = self.alloc(Tile::new(top_rect, tile.body));

        trace!(target: "plane.stitch", tile = id.0, y, "split_y");
        self.restitch_region(tile.rect);
        (id, top_id)
    }

    /// Horizontal split at `x` (spec §4.1): `id` becomes a left tile keeping
    /// the old body and a new right tile copying it. Returns `(left, right)`.
    pub fn split_x(&mut self, id: TileId, x: i64) -> (TileId, TileId) {
        let tile = self.get(id).clone_for_split();
        debug_assert!(tile.rect.x_lo < x && x < tile.rect.x_hi);

        let left_rect = Rect::new(tile.rect.x_lo, tile.rect.y_lo, x, tile.rect.y_hi);
        let right_rect = Rect::new(x, tile.rect.y_lo, tile.rect.x_hi, tile.rect.y_hi);

        self.get_mut(id).rect = left_rect;
        let right_id = self.alloc(Tile::new(right_rect, tile.body));

        trace!(target: "plane.stitch", tile = id.0, x, "split_x");
        self.restitch_region(tile.rect);
        (id, right_id)
    }

    /// Join two vertically stacked tiles (`bottom` below `top`) into one.
    /// Precondition: `can_merge_y(bottom, top)`. Returns the surviving id,
    /// which is always `bottom`'s (the other slot is freed).
    pub fn join_y(&mut self, bottom: TileId, top: TileId) -> TileId {
        debug_assert!(self.can_merge_y(bottom, top));
        let merged_rect = Rect::new(
            self.get(bottom).rect.x_lo,
            self.get(bottom).rect.y_lo,
            self.get(bottom).rect.x_hi,
            self.get(top).rect.y_hi,
        );
        self.get_mut(bottom).rect = merged_rect;
        self.dealloc(top);
        trace!(target: "plane.stitch", survivor = bottom.0, freed = top.0, "join_y");
        self.restitch_region(merged_rect);
        bottom
    }

    /// Join two horizontally adjacent tiles (`left` then `right`).
    /// Precondition: `can_merge_x(left, right)`. Returns the surviving id,
    /// which is always `left`'s.
    pub fn join_x(&mut self, left: TileId, right: TileId) -> TileId {
        debug_assert!(self.can_merge_x(left, right));
        let merged_rect = Rect::new(
            self.get(left).rect.x_lo,
            self.get(left).rect.y_lo,
            self.get(right).rect.x_hi,
            self.get(left).rect.y_hi,
        );
        self.get_mut(left).rect = merged_rect;
        self.dealloc(right);
        trace!(target: "plane.stitch", survivor = left.0, freed = right.0, "join_x");
        self.restitch_region(merged_rect);
        left
    }

    /// Replace a tile's body in place, used once a paint call has decided on
    /// a final type for a tile that needs no further clipping.
    pub fn set_body(&mut self, id: TileId, body: Body) {
        self.get_mut(id).body = body;
    }

    /// Free a tile outright, without requiring a mergeable neighbor. Used by
    /// the non-Manhattan re-merge pass, which reassembles several tiles into
    /// one and so can't go through the equal-body check `join_x`/`join_y`
    /// enforce.
    pub fn free(&mut self, id: TileId) {
        self.dealloc(id);
    }

    /// Resize `id` to `rect` and give it `body` directly, bypassing the
    /// equal-body merge check. The caller is responsible for having already
    /// freed whatever other tiles `rect` now covers (spec §4.4 re-merge:
    /// reassembling four quartered tiles into one doesn't fit the ordinary
    /// join primitives, since three of the four pieces don't share the
    /// survivor's body).
    pub fn reshape(&mut self, id: TileId, rect: Rect, body: Body) {
        {
            let t = self.get_mut(id);
            t.rect = rect;
            t.body = body;
        }
        self.restitch_region(rect);
    }

    /// Replay primitive for `UndoEvent::Split`/`UndoEvent::Join` records
    /// (spec §6 `split_tile_at_point`, "used only by undo replay"): locate
    /// the tile sitting at `point` and split it along the recorded axis.
    /// `split_x = true` replays a horizontal split at `point.x` (left/right);
    /// `false` replays a vertical split at `point.y` (bottom/top).
    pub fn split_tile_at_point(&mut self, point: Point, split_x: bool) -> (TileId, TileId) {
        let id = self.locate(point);
        if split_x {
            self.split_x(id, point.x)
        } else {
            self.split_y(id, point.y)
        }
    }

    /// Non-recursive area enumeration (spec §4.1 "Enumeration order"): visit
    /// every tile overlapping `area` starting at the top-left, sweeping each
    /// row left to right before dropping to the next row down. Ties at a
    /// shared top edge break left-to-right, which is what a corner-stitch
    /// walk that starts at the top-left and follows `rt`/`tr` links produces
    /// as well. `visit` may return `ControlFlow::Break` to abort early (spec
    /// §6 `search_paint_area`). Polls `cancel` once per tile, matching the
    /// "checked between tile visits" granularity spec §5 asks for.
    pub fn search_area<R>(
        &mut self,
        area: Rect,
        cancel: &CancellationToken,
        mut visit: impl FnMut(&mut Plane, TileId) -> ControlFlow<R>,
    ) -> Option<R> {
        if area.is_empty() {
            return None;
        }

        let mut ids: Vec<TileId> = self
            .active_ids()
            .filter(|&id| self.get(id).rect.intersects(&area))
            .collect();
        ids.sort_by_key(|&id| {
            let r = self.get(id).rect;
            (std::cmp::Reverse(r.y_hi), r.x_lo)
        });

        for id in ids {
            if cancel.is_cancelled() {
                return None;
            }
            if let ControlFlow::Break(r) = visit(self, id) {
                return Some(r);
            }
        }

        None
    }
}

impl Tile {
    fn clone_for_split(&self) -> Tile {
        Tile::new(self.rect, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_plane_is_one_tile() {
        let plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        assert_eq!(plane.tile_count(), 1);
        let only = plane.active_ids().next().unwrap();
        assert_eq!(plane.get(only).body(), Body::Solid(0));
    }

    #[test]
    fn locate_finds_containing_tile() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let id = plane.locate(Point::new(50, 50));
        assert_eq!(plane.get(id).rect(), Rect::new(0, 0, 100, 100));
    }

    #[test]
    #[should_panic]
    fn locate_outside_bounds_panics() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        plane.locate(Point::new(200, 200));
    }

    #[test]
    fn split_y_then_join_y_round_trips() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        let (bottom, top) = plane.split_y(whole, 40);
        assert_eq!(plane.get(bottom).rect(), Rect::new(0, 0, 100, 40));
        assert_eq!(plane.get(top).rect(), Rect::new(0, 40, 100, 100));
        assert!(plane.can_merge_y(bottom, top));

        let merged = plane.join_y(bottom, top);
        assert_eq!(plane.get(merged).rect(), Rect::new(0, 0, 100, 100));
        assert_eq!(plane.tile_count(), 1);
    }

    #[test]
    fn split_x_then_join_x_round_trips() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        let (left, right) = plane.split_x(whole, 30);
        assert_eq!(plane.get(left).rect(), Rect::new(0, 0, 30, 100));
        assert_eq!(plane.get(right).rect(), Rect::new(30, 0, 100, 100));
        assert!(plane.can_merge_x(left, right));

        let merged = plane.join_x(left, right);
        assert_eq!(plane.get(merged).rect(), Rect::new(0, 0, 100, 100));
        assert_eq!(plane.tile_count(), 1);
    }

    #[test]
    fn different_bodies_cannot_merge() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        let (bottom, top) = plane.split_y(whole, 40);
        plane.set_body(top, Body::Solid(7));
        assert!(!plane.can_merge_y(bottom, top));
    }

    #[test]
    fn freed_slot_is_reused() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        let (bottom, top) = plane.split_y(whole, 40);
        plane.join_y(bottom, top);
        let reused = plane.locate(Point::new(50, 50));
        let (_, new_top) = plane.split_y(reused, 60);
        assert!(new_top.index() < plane.slab.len());
    }

    #[test]
    fn restitching_connects_neighbors() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        let (bottom, top) = plane.split_y(whole, 40);
        assert_eq!(plane.get(bottom).rt(), top);
        assert_eq!(plane.get(top).lb(), bottom);
    }

    #[test]
    fn search_area_visits_every_overlapping_tile_once() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        let (bottom, _top) = plane.split_y(whole, 50);
        plane.split_x(bottom, 50);

        let cancel = CancellationToken::new();
        let mut visited = Vec::new();
        plane.search_area(Rect::new(0, 0, 100, 100), &cancel, |p, id| {
            visited.push(p.get(id).rect());
            ControlFlow::<()>::Continue(())
        });
        assert_eq!(visited.len(), 3);
    }

    #[test]
    fn search_area_honors_cancellation() {
        let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
        let whole = plane.locate(Point::new(50, 50));
        plane.split_y(whole, 50);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut visited = 0;
        plane.search_area(Rect::new(0, 0, 100, 100), &cancel, |_p, _id| {
            visited += 1;
            ControlFlow::<()>::Continue(())
        });
        assert_eq!(visited, 0);
    }
}
