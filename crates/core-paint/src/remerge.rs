use core_geom::{Point, Rect};
use core_plane::{Body, Diagonal, Direction, Plane, TileId, UndoEvent, UndoSink};
use tracing::trace;

/// Look for quartered diagonal tiles inside `region` that can be
/// reassembled into one larger diagonal tile spanning all four of their
/// quadrants, and merge every one found (spec §4.4 "Non-Manhattan re-merge
/// pass"). Returns the number of tiles reassembled.
///
/// This is the inverse of the quartering [`crate::clip`] performs when a
/// Manhattan cut clips a diagonal tile: if the two solid quadrants it left
/// behind are still exactly the types the cut carried away, and the two
/// diagonal quadrants still agree on direction and half-types, the four
/// pieces are recombined. Spec §9 explicitly does not require this pass to
/// reach a unique canonical form, so callers run it opportunistically
/// rather than to a fixed point that's guaranteed reachable.
///
/// `once` runs at most a single reassembly before returning (spec §6's
/// `once_flag`), for callers that want to fold one merge into a larger
/// batch of work rather than exhaust the region in one call.
pub fn merge_nm_tiles(plane: &mut Plane, region: Rect, once: bool, undo: &mut dyn UndoSink) -> usize {
    let mut merges = 0;
    loop {
        let diag_ids: Vec<TileId> = plane
            .active_ids()
            .filter(|&id| plane.get(id).rect().intersects(&region) && plane.get(id).body().is_split())
            .collect();

        let mut found = None;
        'search: for &a in &diag_ids {
            if !plane.is_active(a) {
                continue;
            }
            let Body::Diagonal(d) = plane.get(a).body() else {
                continue;
            };
            let r = plane.get(a).rect();

            let partner_origin = match d.direction {
                // `a` plays bl; partner plays tr, up and to the right.
                Direction::Slash => Point::new(r.x_hi, r.y_hi),
                // `a` plays br; partner plays tl, up and to the left.
                Direction::Backslash => Point::new(r.x_lo, r.y_hi),
            };

            let partner = diag_ids.iter().copied().find(|&id| {
                id != a
                    && plane.is_active(id)
                    && {
                        let pr = plane.get(id).rect();
                        match d.direction {
                            Direction::Slash => pr.x_lo == partner_origin.x && pr.y_lo == partner_origin.y,
                            Direction::Backslash => pr.x_hi == partner_origin.x && pr.y_lo == partner_origin.y,
                        }
                    }
            });
            let Some(b) = partner else { continue };
            let Body::Diagonal(d2) = plane.get(b).body() else {
                continue;
            };
            if d2.direction != d.direction || d2.left != d.left || d2.right != d.right {
                continue;
            }
            let r_b = plane.get(b).rect();

            let full = match d.direction {
                Direction::Slash => Rect::new(r.x_lo, r.y_lo, r_b.x_hi, r_b.y_hi),
                Direction::Backslash => Rect::new(r_b.x_lo, r.y_lo, r.x_hi, r_b.y_hi),
            };

            let (solid_a_rect, solid_a_type, solid_b_rect, solid_b_type) = match d.direction {
                Direction::Slash => (
                    Rect::new(r.x_hi, r.y_lo, r_b.x_hi, r.y_hi),
                    d.right,
                    Rect::new(r.x_lo, r.y_hi, r.x_hi, r_b.y_hi),
                    d.left,
                ),
                Direction::Backslash => (
                    Rect::new(r_b.x_hi, r.y_lo, full.x_hi, r.y_hi),
                    d.right,
                    Rect::new(full.x_lo, r.y_hi, r.x_lo, r_b.y_hi),
                    d.left,
                ),
            };

            let solid_a = plane.active_ids().find(|&id| {
                plane.is_active(id)
                    && plane.get(id).rect() == solid_a_rect
                    && plane.get(id).body() == Body::Solid(solid_a_type)
            });
            let solid_b = plane.active_ids().find(|&id| {
                plane.is_active(id)
                    && plane.get(id).rect() == solid_b_rect
                    && plane.get(id).body() == Body::Solid(solid_b_type)
            });
            let (Some(sa), Some(sb)) = (solid_a, solid_b) else {
                continue 'search;
            };

            found = Some((a, b, sa, sb, full, d));
            break;
        }

        let Some((a, b, sa, sb, full, d)) = found else {
            break;
        };

        let survivor = reassemble(plane, a, b, sa, sb, full, d);
        undo.record(UndoEvent::Join {
            point: Point::new(full.x_lo, full.y_lo),
            split_x: false,
            plane_id: plane.id(),
        });
        let _ = survivor;
        merges += 1;
        trace!(target: "core_paint::merge", merges, "merge_nm_tiles_reassembled_one");
        if once {
            break;
        }
    }
    merges
}

fn reassemble(
    plane: &mut Plane,
    a: TileId,
    b: TileId,
    sa: TileId,
    sb: TileId,
    full: Rect,
    d: Diagonal,
) -> TileId {
    // Three of the four quadrants get freed outright and the fourth is
    // resized to cover the whole reassembled rect: the ordinary join_x/join_y
    // primitives require matching bodies on both sides, which doesn't hold
    // here (two quadrants are solid, one diagonal quadrant is being freed
    // too), so this bypasses them via `Plane::reshape`.
    plane.free(b);
    plane.free(sa);
    plane.free(sb);
    plane.reshape(a, full, Body::Diagonal(d));
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_plane::{CancellationToken, Plane, VecSink};

    #[test]
    fn reassembles_a_quartered_slash_tile() {
        let mut plane = Plane::new(Rect::new(0, 0, 10, 10), 0);
        let mut undo = VecSink::default();
        let whole = plane.locate(Point::new(5, 5));
        plane.set_body(whole, Body::Diagonal(Diagonal { left: 1, right: 2, direction: Direction::Slash }));

        let quads = crate::clip::quarter_at_y(&mut plane, whole, 5, &mut undo);
        let _ = quads;

        let cancel = CancellationToken::new();
        let _ = cancel;
        let merges = merge_nm_tiles(&mut plane, Rect::new(0, 0, 10, 10), false, &mut undo);
        assert_eq!(merges, 1);
        assert_eq!(plane.tile_count(), 1);
    }
}
