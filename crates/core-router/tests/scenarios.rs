use core_geom::{Point, Rect};
use core_plane::CancellationToken;
use core_router::{Channel, ChannelKind, Feedback, Pin, PinSide, SearchMode, build_channel_map, process_terminal};

/// Scenario 5: two normal channels abutting at a shared edge, pins at both
/// ends, no blockages. The returned path's length equals the grid-Manhattan
/// distance between the two end pins.
#[test]
fn router_fast_path_matches_manhattan_distance() {
    let mut a = Channel::new(Rect::new(0, 0, 10, 10), ChannelKind::Normal, 100);
    a.left.push(Pin { point: Point::new(0, 5), side: PinSide::Left, net_id: None });
    a.right.push(Pin { point: Point::new(10, 5), side: PinSide::Right, net_id: None });

    let mut b = Channel::new(Rect::new(10, 0, 20, 10), ChannelKind::Normal, 100);
    b.left.push(Pin { point: Point::new(10, 5), side: PinSide::Left, net_id: None });
    b.right.push(Pin { point: Point::new(20, 5), side: PinSide::Right, net_id: None });

    let bounds = Rect::new(0, 0, 20, 10);
    let mut feedback = Feedback::default();
    let cancel = CancellationToken::new();
    let map = build_channel_map(bounds, vec![a, b], &mut feedback, &cancel);

    let start = Point::new(0, 5);
    let dest = Point::new(20, 5);
    let path = process_terminal(&map, &[start], dest, 1_000, SearchMode::Fast, 10_000, 0, &|_| 0, &cancel)
        .expect("a path should be found");

    let raw_len: i64 = path.windows(2).map(|w| (w[0].x - w[1].x).abs() + (w[0].y - w[1].y).abs()).sum();
    assert_eq!(raw_len, (dest.x - start.x).abs() + (dest.y - start.y).abs());
}

/// Scenario 6: destination pin lies inside a blocked tile. Expect an
/// immediate `None` with no search performed.
#[test]
fn router_returns_null_for_blocked_destination() {
    let blocked = Channel::new(Rect::new(0, 0, 10, 10), ChannelKind::Blocked, 100);
    let bounds = Rect::new(0, 0, 10, 10);
    let mut feedback = Feedback::default();
    let cancel = CancellationToken::new();
    let map = build_channel_map(bounds, vec![blocked], &mut feedback, &cancel);

    let start = Point::new(0, 0);
    let dest = Point::new(5, 5);
    let path = process_terminal(&map, &[start], dest, 1_000, SearchMode::Fast, 10_000, 0, &|_| 0, &cancel);
    assert!(path.is_none());
}

/// A cancelled token stops the search before it can find anything, even
/// when a path objectively exists.
#[test]
fn cancelled_search_returns_none() {
    let mut a = Channel::new(Rect::new(0, 0, 10, 10), ChannelKind::Normal, 100);
    a.left.push(Pin { point: Point::new(0, 5), side: PinSide::Left, net_id: None });
    a.right.push(Pin { point: Point::new(10, 5), side: PinSide::Right, net_id: None });

    let bounds = Rect::new(0, 0, 10, 10);
    let mut feedback = Feedback::default();
    let build_cancel = CancellationToken::new();
    let map = build_channel_map(bounds, vec![a], &mut feedback, &build_cancel);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let path = process_terminal(
        &map,
        &[Point::new(0, 5)],
        Point::new(10, 5),
        1_000,
        SearchMode::Fast,
        10_000,
        0,
        &|_| 0,
        &cancel,
    );
    assert!(path.is_none());
}
