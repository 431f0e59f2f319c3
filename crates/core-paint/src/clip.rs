use core_geom::{Point, mul_wide, round_div};
use core_plane::{Body, Diagonal, Direction, Plane, TileId, UndoEvent, UndoSink};

/// The four quadrants produced by quartering a split tile at an interior
/// Manhattan cut line (spec §4.2a "Non-Manhattan clip"). Exactly two
/// quadrants come out solid and two stay diagonal, because a straight line
/// through one quadrant's far corner necessarily continues straight through
/// the opposite quadrant's near corner.
pub(crate) struct Quadrants {
    pub bl: TileId,
    pub br: TileId,
    pub tl: TileId,
    pub tr: TileId,
}

/// Quarter a diagonal tile at a horizontal cut line `yc` strictly inside its
/// rect. The cut's x-intercept with the tile's diagonal is rounded with the
/// same non-canonical rule the router uses for channel geometry
/// (`core_geom::round_div`), so a half-unit intercept always rounds up
/// rather than toward even or toward zero.
pub(crate) fn quarter_at_y(
    plane: &mut Plane,
    id: TileId,
    yc: i64,
    undo: &mut dyn UndoSink,
) -> Quadrants {
    let tile = plane.get(id).clone();
    let r = tile.rect();
    let diag = match tile.body() {
        Body::Diagonal(d) => d,
        Body::Solid(_) => unreachable!("quarter_at_y called on a solid tile"),
    };
    debug_assert!(r.y_lo < yc && yc < r.y_hi);

    let xc = match diag.direction {
        Direction::Slash => r.x_lo + round_div(mul_wide(r.x_hi - r.x_lo, yc - r.y_lo), r.y_hi - r.y_lo),
        Direction::Backslash => {
            r.x_lo + round_div(mul_wide(r.x_hi - r.x_lo, r.y_hi - yc), r.y_hi - r.y_lo)
        }
    };
    debug_assert!(r.x_lo <= xc && xc <= r.x_hi);

    if xc <= r.x_lo || xc >= r.x_hi {
        // The rounded intercept lands exactly on this tile's left or right
        // edge, so a full quartering would produce a zero-width column. Fall
        // back to a plain y-split instead, with whichever column would have
        // survived covering the whole band (spec §7 item 3: the geometry
        // perturbation here is reporting a two-way split where four-way
        // quartering was requested).
        let (bottom, top) = plane.split_y(id, yc);
        let left_vanishes = xc <= r.x_lo;
        let (bottom_body, top_body) = match (diag.direction, left_vanishes) {
            (Direction::Slash, true) => (Body::Solid(diag.right), Body::Diagonal(diag)),
            (Direction::Slash, false) => (Body::Diagonal(diag), Body::Solid(diag.left)),
            (Direction::Backslash, true) => (Body::Diagonal(diag), Body::Solid(diag.right)),
            (Direction::Backslash, false) => (Body::Solid(diag.left), Body::Diagonal(diag)),
        };
        plane.set_body(bottom, bottom_body);
        plane.set_body(top, top_body);
        undo.record(UndoEvent::Split {
            point: Point::new(xc, yc),
            split_x: true,
            plane_id: plane.id(),
        });
        return Quadrants { bl: bottom, br: bottom, tl: top, tr: top };
    }

    let (bottom, top) = plane.split_y(id, yc);
    let (bl, br) = plane.split_x(bottom, xc);
    let (tl, tr) = plane.split_x(top, xc);

    let quads = match diag.direction {
        Direction::Slash => {
            plane.set_body(bl, Body::Diagonal(diag));
            plane.set_body(br, Body::Solid(diag.right));
            plane.set_body(tl, Body::Solid(diag.left));
            plane.set_body(tr, Body::Diagonal(diag));
            Quadrants { bl, br, tl, tr }
        }
        Direction::Backslash => {
            plane.set_body(bl, Body::Solid(diag.left));
            plane.set_body(br, Body::Diagonal(diag));
            plane.set_body(tl, Body::Diagonal(diag));
            plane.set_body(tr, Body::Solid(diag.right));
            Quadrants { bl, br, tl, tr }
        }
    };

    undo.record(UndoEvent::Split {
        point: Point::new(xc, yc),
        split_x: true,
        plane_id: plane.id(),
    });
    quads
}

/// Quarter a diagonal tile at a vertical cut line `xc` strictly inside its
/// rect. Mirror image of [`quarter_at_y`].
pub(crate) fn quarter_at_x(
    plane: &mut Plane,
    id: TileId,
    xc: i64,
    undo: &mut dyn UndoSink,
) -> Quadrants {
    let tile = plane.get(id).clone();
    let r = tile.rect();
    let diag = match tile.body() {
        Body::Diagonal(d) => d,
        Body::Solid(_) => unreachable!("quarter_at_x called on a solid tile"),
    };
    debug_assert!(r.x_lo < xc && xc < r.x_hi);

    let yc = match diag.direction {
        Direction::Slash => r.y_lo + round_div(mul_wide(r.y_hi - r.y_lo, xc - r.x_lo), r.x_hi - r.x_lo),
        Direction::Backslash => {
            r.y_hi - round_div(mul_wide(r.y_hi - r.y_lo, xc - r.x_lo), r.x_hi - r.x_lo)
        }
    };
    debug_assert!(r.y_lo <= yc && yc <= r.y_hi);

    if yc <= r.y_lo || yc >= r.y_hi {
        // Mirror of the degenerate fallback in `quarter_at_y`: the rounded
        // intercept lands exactly on this tile's bottom or top edge, so fall
        // back to a plain x-split with whichever row would have survived
        // covering the whole column.
        let (left, right) = plane.split_x(id, xc);
        let bottom_vanishes = yc <= r.y_lo;
        let (left_body, right_body) = match (diag.direction, bottom_vanishes) {
            (Direction::Slash, true) => (Body::Solid(diag.left), Body::Diagonal(diag)),
            (Direction::Slash, false) => (Body::Diagonal(diag), Body::Solid(diag.right)),
            (Direction::Backslash, true) => (Body::Diagonal(diag), Body::Solid(diag.right)),
            (Direction::Backslash, false) => (Body::Solid(diag.left), Body::Diagonal(diag)),
        };
        plane.set_body(left, left_body);
        plane.set_body(right, right_body);
        undo.record(UndoEvent::Split {
            point: Point::new(xc, yc),
            split_x: false,
            plane_id: plane.id(),
        });
        return Quadrants { bl: left, br: right, tl: left, tr: right };
    }

    let (left, right) = plane.split_x(id, xc);
    let (bl, tl) = plane.split_y(left, yc);
    let (br, tr) = plane.split_y(right, yc);

    let quads = match diag.direction {
        Direction::Slash => {
            plane.set_body(bl, Body::Diagonal(diag));
            plane.set_body(br, Body::Solid(diag.right));
            plane.set_body(tl, Body::Solid(diag.left));
            plane.set_body(tr, Body::Diagonal(diag));
            Quadrants { bl, br, tl, tr }
        }
        Direction::Backslash => {
            plane.set_body(bl, Body::Solid(diag.left));
            plane.set_body(br, Body::Diagonal(diag));
            plane.set_body(tl, Body::Diagonal(diag));
            plane.set_body(tr, Body::Solid(diag.right));
            Quadrants { bl, br, tl, tr }
        }
    };

    undo.record(UndoEvent::Split {
        point: Point::new(xc, yc),
        split_x: false,
        plane_id: plane.id(),
    });
    quads
}

/// Collapse a diagonal tile whose two halves have become equal (INV-NOSPLITDEGEN).
/// Called after any result-table application that might have painted both
/// halves to the same type.
pub(crate) fn collapse_if_degenerate(plane: &mut Plane, id: TileId) {
    if let Body::Diagonal(Diagonal { left, right, .. }) = plane.get(id).body()
        && left == right
    {
        plane.set_body(id, Body::Solid(left));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::Rect;
    use core_plane::VecSink;

    /// A thin slash tile whose cut's rounded x-intercept lands exactly on
    /// the tile's left edge must not produce a zero-width column or corrupt
    /// the tiling - it falls back to a plain two-way split instead.
    #[test]
    fn quarter_at_y_falls_back_when_intercept_lands_on_an_edge() {
        let mut plane = Plane::new(Rect::new(0, 0, 2, 100), 0);
        let whole = plane.locate(Point::new(1, 1));
        plane.set_body(
            whole,
            Body::Diagonal(Diagonal { left: 1, right: 2, direction: Direction::Slash }),
        );
        let mut undo = VecSink::default();

        quarter_at_y(&mut plane, whole, 1, &mut undo);

        let total: i64 = plane.active_ids().map(|id| plane.get(id).rect().area()).sum();
        assert_eq!(total, Rect::new(0, 0, 2, 100).area());
        for id in plane.active_ids() {
            let r = plane.get(id).rect();
            assert!(r.x_lo < r.x_hi && r.y_lo < r.y_hi);
        }
    }
}
