use std::collections::HashSet;

use core_geom::Rect;
use core_plane::{Body, CancellationToken, Plane, TileId, UndoEvent, UndoSink};
use tracing::trace;

use crate::clip::{collapse_if_degenerate, quarter_at_x, quarter_at_y};
use crate::result_table::{Method, ResultTable};

/// Apply `method` to every tile overlapping `area` (spec §4.2 "Rectangular
/// paint primitive"). Clips tiles straddling `area`'s boundary first so the
/// result-table application never touches geometry outside the requested
/// rectangle, then re-merges the painted region back down to maximal tiles
/// (INV-MAXSTRIP).
///
/// A no-op (spec §7.1) when `area` is empty or lies entirely outside the
/// plane's bounds. Polls `cancel` between tiles so a caller can abort a
/// large paint midway; an aborted paint leaves the plane in a well-formed
/// but partially painted state, with every mutation made so far already on
/// `undo`.
pub fn paint_plane(
    plane: &mut Plane,
    area: Rect,
    method: &Method,
    undo: &mut dyn UndoSink,
    cancel: &CancellationToken,
) {
    let Some(area) = area.intersection(&plane.bounds()) else {
        return;
    };

    clip_to_area(plane, area, undo, cancel);
    if cancel.is_cancelled() {
        return;
    }
    repaint_interior(plane, area, method, undo, cancel);
    if cancel.is_cancelled() {
        return;
    }
    merge_to_fixed_point(plane, area);
}

/// Clip order is top, bottom, right, left (spec §4.2): whichever edge of
/// `area` a tile straddles first in that order is the one it gets split on
/// this iteration. Repeats until every tile overlapping `area` is either
/// fully inside it or fully outside it.
pub(crate) fn clip_to_area(plane: &mut Plane, area: Rect, undo: &mut dyn UndoSink, cancel: &CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let straddling = plane.active_ids().find(|&id| {
            let r = plane.get(id).rect();
            r.intersects(&area) && !area.contains_rect(&r)
        });
        let Some(id) = straddling else { break };
        clip_one(plane, id, area, undo);
    }
}

pub(crate) fn clip_one(plane: &mut Plane, id: TileId, area: Rect, undo: &mut dyn UndoSink) {
    let r = plane.get(id).rect();
    let is_split = plane.get(id).body().is_split();

    if r.y_hi > area.y_hi && r.y_lo < area.y_hi {
        split_y_preserving_diagonal(plane, id, area.y_hi, is_split, undo);
    } else if r.y_lo < area.y_lo && r.y_hi > area.y_lo {
        split_y_preserving_diagonal(plane, id, area.y_lo, is_split, undo);
    } else if r.x_hi > area.x_hi && r.x_lo < area.x_hi {
        split_x_preserving_diagonal(plane, id, area.x_hi, is_split, undo);
    } else if r.x_lo < area.x_lo && r.x_hi > area.x_lo {
        split_x_preserving_diagonal(plane, id, area.x_lo, is_split, undo);
    }
}

fn split_y_preserving_diagonal(
    plane: &mut Plane,
    id: TileId,
    y: i64,
    is_split: bool,
    undo: &mut dyn UndoSink,
) {
    if is_split {
        quarter_at_y(plane, id, y, undo);
    } else {
        plane.split_y(id, y);
    }
}

fn split_x_preserving_diagonal(
    plane: &mut Plane,
    id: TileId,
    x: i64,
    is_split: bool,
    undo: &mut dyn UndoSink,
) {
    if is_split {
        quarter_at_x(plane, id, x, undo);
    } else {
        plane.split_x(id, x);
    }
}

/// Apply `method` to every tile now fully contained in `area`. Split tiles
/// get the table applied to each half independently (spec §4.2 "per-half
/// application"), collapsing back to a solid tile when both halves land on
/// the same type afterward (INV-NOSPLITDEGEN).
///
/// `Method::Mark` additionally skips any tile already marked at its carried
/// epoch, and marks every tile it does visit at that epoch - a caller that
/// wants several overlapping `paint_plane` calls to share one "visited" set
/// (spec §4.2's DRC-style "so no tile is visited twice") draws that epoch
/// once from [`Plane::next_epoch`] and carries it into each call's `Method`.
fn repaint_interior(
    plane: &mut Plane,
    area: Rect,
    method: &Method,
    undo: &mut dyn UndoSink,
    cancel: &CancellationToken,
) {
    let mark_epoch = match method {
        Method::Mark { epoch, .. } => Some(*epoch),
        _ => None,
    };

    let targets: Vec<TileId> = plane
        .active_ids()
        .filter(|&id| area.contains_rect(&plane.get(id).rect()))
        .collect();

    for id in targets {
        if cancel.is_cancelled() {
            return;
        }
        if let Some(epoch) = mark_epoch {
            if plane.get(id).is_marked(epoch) {
                continue;
            }
        }
        let rect = plane.get(id).rect();
        match plane.get(id).body() {
            Body::Solid(old) => {
                let new = method.lookup(old);
                if new != old {
                    plane.set_body(id, Body::Solid(new));
                    undo.record(UndoEvent::Paint {
                        rect,
                        old,
                        new,
                        plane_id: plane.id(),
                    });
                }
            }
            Body::Diagonal(d) => {
                let new_left = method.lookup(d.left);
                let new_right = method.lookup(d.right);
                if new_left != d.left {
                    undo.record(UndoEvent::Paint {
                        rect,
                        old: d.left,
                        new: new_left,
                        plane_id: plane.id(),
                    });
                }
                if new_right != d.right {
                    undo.record(UndoEvent::Paint {
                        rect,
                        old: d.right,
                        new: new_right,
                        plane_id: plane.id(),
                    });
                }
                if new_left != d.left || new_right != d.right {
                    plane.set_body(id, Body::diagonal_or_collapse(new_left, new_right, d.direction));
                    collapse_if_degenerate(plane, id);
                }
            }
        }
        if let Some(epoch) = mark_epoch {
            plane.mark_tile(id, epoch);
        }
    }
}

/// Re-merge the painted region back down to maximal tiles. The source
/// distinguishes a cheap pre-scan / fast-path commit from a `slow_merge`
/// fallback as a performance optimization; both paths must reach the same
/// maximal tiling, so this crate runs one merge loop to a fixed point
/// instead of reproducing the two-tier dispatch (see DESIGN.md).
pub(crate) fn merge_to_fixed_point(plane: &mut Plane, region: Rect) {
    let expanded = Rect::new(
        region.x_lo - 1,
        region.y_lo - 1,
        region.x_hi + 1,
        region.y_hi + 1,
    );
    let mut passes = 0u32;
    loop {
        let candidates: Vec<TileId> = plane
            .active_ids()
            .filter(|&id| plane.get(id).rect().intersects(&expanded))
            .collect();

        let mut merged = false;
        for id in candidates {
            if !plane.is_active(id) {
                continue;
            }
            let tr = plane.get(id).tr();
            if tr.is_some() && plane.is_active(tr) && plane.can_merge_x(id, tr) {
                plane.join_x(id, tr);
                merged = true;
                break;
            }
            let rt = plane.get(id).rt();
            if rt.is_some() && plane.is_active(rt) && plane.can_merge_y(id, rt) {
                plane.join_y(id, rt);
                merged = true;
                break;
            }
        }
        if !merged {
            break;
        }
        passes += 1;
    }
    trace!(target: "core_paint::merge", passes, "merge_to_fixed_point_done");
}
