use std::ops::ControlFlow;

use core_geom::{Point, Rect};
use core_plane::{CancellationToken, Plane};

/// INV-COVER: the active tiles of a plane always exactly cover its bounds,
/// with no gaps and no overlaps, regardless of how many splits and joins
/// have happened.
fn total_tile_area(plane: &Plane) -> i64 {
    plane.active_ids().map(|id| plane.get(id).rect().area()).sum()
}

#[test]
fn inv_cover_holds_after_splits_and_joins() {
    let bounds = Rect::new(0, 0, 1000, 1000);
    let mut plane = Plane::new(bounds, 0);
    assert_eq!(total_tile_area(&plane), bounds.area());

    let whole = plane.locate(Point::new(500, 500));
    let (bottom, top) = plane.split_y(whole, 400);
    assert_eq!(total_tile_area(&plane), bounds.area());

    let (left, right) = plane.split_x(bottom, 300);
    assert_eq!(total_tile_area(&plane), bounds.area());

    plane.join_x(left, right);
    assert_eq!(total_tile_area(&plane), bounds.area());

    let bottom_again = plane.locate(Point::new(500, 200));
    plane.join_y(bottom_again, top);
    assert_eq!(total_tile_area(&plane), bounds.area());
    assert_eq!(plane.tile_count(), 1);
}

/// INV-STITCH: every tile's `tr`/`bl`/`rt`/`lb` pointers name a tile whose
/// shared-edge geometry actually matches the corner-stitch definition, or
/// `TileId::NONE` when nothing is there.
#[test]
fn inv_stitch_neighbors_are_geometrically_consistent() {
    let mut plane = Plane::new(Rect::new(0, 0, 200, 200), 0);
    let whole = plane.locate(Point::new(100, 100));
    let (bottom, top) = plane.split_y(whole, 120);
    plane.split_x(bottom, 80);

    for id in plane.active_ids().collect::<Vec<_>>() {
        let r = plane.get(id).rect();
        let tr = plane.get(id).tr();
        if tr.is_some() {
            let o = plane.get(tr).rect();
            assert_eq!(o.x_lo, r.x_hi);
            assert!(o.y_lo < r.y_hi && r.y_hi <= o.y_hi);
        }
    }
    assert!(plane.get(top).lb().is_some());
}

/// Point location always resolves to a tile whose rect actually contains the
/// query point, and never panics for any point inside bounds.
#[test]
fn point_location_is_exhaustive_over_a_grid() {
    let bounds = Rect::new(0, 0, 64, 64);
    let mut plane = Plane::new(bounds, 0);
    let whole = plane.locate(Point::new(1, 1));
    plane.split_y(whole, 32);
    let left_half = plane.locate(Point::new(1, 1));
    plane.split_x(left_half, 16);

    for x in 0..64 {
        for y in 0..64 {
            let id = plane.locate(Point::new(x, y));
            assert!(plane.get(id).rect().contains_point(Point::new(x, y)));
        }
    }
}

/// `search_area` must visit each tile intersecting the query rect exactly
/// once and never a tile entirely outside it.
#[test]
fn search_area_only_visits_overlapping_tiles() {
    let mut plane = Plane::new(Rect::new(0, 0, 100, 100), 0);
    let whole = plane.locate(Point::new(50, 50));
    plane.split_x(whole, 50);

    let cancel = CancellationToken::new();
    let mut count = 0;
    plane.search_area(Rect::new(0, 0, 40, 100), &cancel, |p, id| {
        assert!(p.get(id).rect().intersects(&Rect::new(0, 0, 40, 100)));
        count += 1;
        ControlFlow::<()>::Continue(())
    });
    assert_eq!(count, 1);
}
