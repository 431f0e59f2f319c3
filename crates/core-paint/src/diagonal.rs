use std::collections::HashSet;

use core_geom::{Rect, mul_wide, round_div};
use core_plane::{Body, CancellationToken, Direction, Plane, TileId, TypeId, UndoEvent, UndoSink};

use crate::clip::collapse_if_degenerate;
use crate::paint::merge_to_fixed_point;
use crate::result_table::{Method, ResultTable};

/// Manhattan-align every tile touching `rect`'s boundary against `table`
/// (spec §6 `fracture_plane`, `interaction_table`). A solid tile always
/// clips. A split (diagonal) tile only clips if `table` would actually
/// change one of its two halves - a split tile neither of whose halves
/// interacts with `table` is left alone rather than Manhattan-aligned for
/// no reason (spec §4.3 step 1 "non-interacting split tiles are skipped").
///
/// This is the same boundary-clipping pass [`crate::paint_plane`] runs
/// before applying a result table, generalized with the straddling-split
/// skip [`crate::paint::clip_to_area`] doesn't need (that caller always
/// paints unconditionally, so it never has a reason to leave a straddling
/// tile unclipped). Exposed on its own because [`paint_diagonal`] needs the
/// alignment step without a type change attached to it, and a caller may
/// want to pre-fracture a region before a batch of diagonal paints.
pub fn fracture_plane(
    plane: &mut Plane,
    rect: Rect,
    table: &dyn ResultTable,
    undo: &mut dyn UndoSink,
    cancel: &CancellationToken,
) {
    let Some(rect) = rect.intersection(&plane.bounds()) else {
        return;
    };
    clip_to_area_respecting(plane, rect, table, undo, cancel);
}

/// Like [`crate::paint::clip_to_area`], but a split tile that doesn't
/// interact with `table` on either half is added to a permanent skip set
/// instead of being clipped - without that set the same non-interacting
/// tile would be rediscovered as still straddling on every pass and the
/// loop would never terminate.
fn clip_to_area_respecting(
    plane: &mut Plane,
    area: Rect,
    table: &dyn ResultTable,
    undo: &mut dyn UndoSink,
    cancel: &CancellationToken,
) {
    let mut skip: HashSet<TileId> = HashSet::new();
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let straddling = plane.active_ids().find(|&id| {
            if skip.contains(id) {
                return false;
            }
            let r = plane.get(id).rect();
            r.intersects(&area) && !area.contains_rect(&r)
        });
        let Some(id) = straddling else { break };

        if let Body::Diagonal(d) = plane.get(id).body() {
            if table.lookup(d.left) == d.left && table.lookup(d.right) == d.right {
                skip.insert(id);
                continue;
            }
        }
        crate::paint::clip_one(plane, id, area, undo);
    }
}

/// Paint a diagonal cut across `rect` (spec §4.3 "Diagonal paint"): the
/// triangular half on the upper-left side of the cut (for [`Direction::Slash`])
/// or upper-right side (for [`Direction::Backslash`]) is looked up through
/// `left`, the other half through `right`. Pre-existing tiles inside `rect`
/// are fractured against the cut line rather than required to already be a
/// single tile, and non-target old types on either side pass through
/// unchanged when `left`/`right` is a [`Method::Erase`] (spec §6
/// `result_table`).
///
/// The cut line runs corner to corner of `rect` itself, independent of
/// whatever tiling already exists inside it; every affected tile is
/// reclassified against that one line, not against its own corners.
#[allow(clippy::too_many_arguments)]
pub fn paint_diagonal(
    plane: &mut Plane,
    rect: Rect,
    direction: Direction,
    left: &Method,
    right: &Method,
    undo: &mut dyn UndoSink,
    cancel: &CancellationToken,
) {
    let Some(rect) = rect.intersection(&plane.bounds()) else {
        return;
    };
    if rect.is_empty() {
        return;
    }

    let interacts = |old: TypeId| {
        if left.lookup(old) != old || right.lookup(old) != old {
            old.wrapping_add(1)
        } else {
            old
        }
    };
    fracture_plane(plane, rect, &interacts, undo, cancel);
    if cancel.is_cancelled() {
        return;
    }

    let mut work: Vec<TileId> = plane
        .active_ids()
        .filter(|&id| rect.contains_rect(&plane.get(id).rect()))
        .collect();

    while let Some(id) = work.pop() {
        if cancel.is_cancelled() {
            return;
        }
        if !plane.is_active(id) {
            continue;
        }
        classify_or_fracture(plane, id, rect, direction, left, right, undo, &mut work);
    }

    merge_to_fixed_point(plane, rect);
}

/// Line height at `x`, for the cut corner-to-corner of `reference`.
fn y_at(reference: Rect, direction: Direction, x: i64) -> i64 {
    let span_y = reference.y_hi - reference.y_lo;
    let span_x = reference.x_hi - reference.x_lo;
    match direction {
        Direction::Slash => reference.y_lo + round_div(mul_wide(span_y, x - reference.x_lo), span_x),
        Direction::Backslash => {
            reference.y_hi - round_div(mul_wide(span_y, x - reference.x_lo), span_x)
        }
    }
}

/// Line x-position at `y`, for the same cut.
fn x_at(reference: Rect, direction: Direction, y: i64) -> i64 {
    let span_y = reference.y_hi - reference.y_lo;
    let span_x = reference.x_hi - reference.x_lo;
    match direction {
        Direction::Slash => reference.x_lo + round_div(mul_wide(span_x, y - reference.y_lo), span_y),
        Direction::Backslash => {
            reference.x_lo + round_div(mul_wide(span_x, reference.y_hi - y), span_y)
        }
    }
}

/// `Slash`'s upper-left triangle is `left`, lower-right is `right`.
/// `Backslash`'s upper-right triangle is `right`, lower-left is `left`.
fn above_below_methods<'a>(direction: Direction, left: &'a Method, right: &'a Method) -> (&'a Method, &'a Method) {
    match direction {
        Direction::Slash => (left, right),
        Direction::Backslash => (right, left),
    }
}

/// Reclassify one tile against the cut line. A tile entirely on one side is
/// painted solid outright. A straddling tile is fractured - by an x-band
/// split when the cut crosses its left/right edges, by a y-band split when
/// it crosses its top/bottom edges - and the resulting pieces are pushed
/// back onto `work` so the loop reclassifies each of them in turn (case
/// analysis and quartering fallback, spec §4.3).
#[allow(clippy::too_many_arguments)]
fn classify_or_fracture(
    plane: &mut Plane,
    id: TileId,
    rect: Rect,
    direction: Direction,
    left: &Method,
    right: &Method,
    undo: &mut dyn UndoSink,
    work: &mut Vec<TileId>,
) {
    let r = plane.get(id).rect();
    let (above, below) = above_below_methods(direction, left, right);

    let y_left = y_at(rect, direction, r.x_lo);
    let y_right = y_at(rect, direction, r.x_hi);

    if y_left >= r.y_hi && y_right >= r.y_hi {
        paint_solid(plane, id, above, undo);
        return;
    }
    if y_left <= r.y_lo && y_right <= r.y_lo {
        paint_solid(plane, id, below, undo);
        return;
    }

    let xc0 = x_at(rect, direction, r.y_lo);
    let xc1 = x_at(rect, direction, r.y_hi);
    let xa = xc0.min(xc1);
    let xb = xc0.max(xc1);

    if xa > r.x_lo && xb < r.x_hi {
        // The cut enters and exits through the tile's left/right edges: an
        // x-band split with the crossing band in the middle. The two outer
        // bands no longer straddle once narrowed, and the middle band's
        // crossing now runs top to bottom, so pushing all three back onto
        // `work` reduces every one of them to an already-handled case.
        let old_type = match plane.get(id).body() {
            Body::Solid(t) => t,
            Body::Diagonal(d) => d.left,
        };
        let (left_of_band, rest) = plane.split_x(id, xa);
        let (band, right_of_band) = plane.split_x(rest, xb);
        plane.set_body(left_of_band, Body::Solid(old_type));
        plane.set_body(band, Body::Solid(old_type));
        plane.set_body(right_of_band, Body::Solid(old_type));
        work.push(left_of_band);
        work.push(band);
        work.push(right_of_band);
        return;
    }

    // Otherwise the cut enters/exits through the tile's top/bottom edges.
    let ya = y_left.min(y_right).clamp(r.y_lo, r.y_hi);
    let yb = y_left.max(y_right).clamp(r.y_lo, r.y_hi);
    if ya > r.y_lo {
        let (below_band, rest) = plane.split_y(id, ya);
        paint_solid(plane, below_band, below, undo);
        work.push(rest);
        return;
    }
    if yb < r.y_hi {
        let (rest, above_band) = plane.split_y(id, yb);
        paint_solid(plane, above_band, above, undo);
        work.push(rest);
        return;
    }

    // r.y_lo == ya and r.y_hi == yb: the tile's own corners already lie on
    // the cut, so it becomes a single diagonal tile spanning itself. Read
    // whatever was there first and run it through `left`/`right` rather than
    // overwriting outright, so an erase-style method leaves a non-target old
    // type alone on either half.
    let (old_left, old_right) = match plane.get(id).body() {
        Body::Solid(t) => (t, t),
        Body::Diagonal(d) => (d.left, d.right),
    };
    let new_left = left.lookup(old_left);
    let new_right = right.lookup(old_right);
    if new_left == old_left && new_right == old_right {
        return;
    }
    let rect_now = plane.get(id).rect();
    if new_left != old_left {
        undo.record(UndoEvent::Paint {
            rect: rect_now,
            old: old_left,
            new: new_left,
            plane_id: plane.id(),
        });
    }
    if new_right != old_right {
        undo.record(UndoEvent::Paint {
            rect: rect_now,
            old: old_right,
            new: new_right,
            plane_id: plane.id(),
        });
    }
    plane.set_body(id, Body::diagonal_or_collapse(new_left, new_right, direction));
    collapse_if_degenerate(plane, id);
}

fn paint_solid(plane: &mut Plane, id: TileId, method: &Method, undo: &mut dyn UndoSink) {
    let rect = plane.get(id).rect();
    let old = match plane.get(id).body() {
        Body::Solid(t) => t,
        Body::Diagonal(d) => d.left,
    };
    let new = method.lookup(old);
    if old != new {
        plane.set_body(id, Body::Solid(new));
        undo.record(UndoEvent::Paint {
            rect,
            old,
            new,
            plane_id: plane.id(),
        });
    }
}
