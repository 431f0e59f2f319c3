use std::collections::HashMap;

use core_geom::Rect;
use core_paint::{AlwaysInteracts, Method, fracture_plane, paint_plane};
use core_plane::{CancellationToken, NullSink, Plane, TileId, TypeId};

use crate::feedback::Feedback;
use crate::types::{Channel, ChannelId, ChannelKind, PinSide};

/// Reserved type painted over any part of the plane not covered by a
/// channel descriptor. Never returned by [`ChannelMap::kind_of`].
const UNASSIGNED: TypeId = TypeId::MAX - 1;

/// A tile plane whose tiles carry [`ChannelKind`]s instead of layout types,
/// plus the channel table each tile's `client` weak-reference indexes into
/// (spec §3 "Channel-map tile", §4.5).
pub struct ChannelMap {
    plane: Plane,
    channels: Vec<Channel>,
    tile_channel: HashMap<TileId, ChannelId>,
}

impl ChannelMap {
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn plane_mut(&mut self) -> &mut Plane {
        &mut self.plane
    }

    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.0 as usize]
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> &mut Channel {
        &mut self.channels[id.0 as usize]
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel_of_tile(&self, tile: TileId) -> Option<ChannelId> {
        self.tile_channel.get(&tile).copied()
    }

    pub fn kind_of(&self, tile: TileId) -> Option<ChannelKind> {
        ChannelKind::from_type(self.plane.get(tile).body().half(core_plane::Side::Left))
    }
}

/// Build a channel map from a list of channel descriptors (spec §4.5). Runs
/// every numbered step: paint, one-channel-one-tile, density-driven
/// blockage painting, flood propagation, river splitting, and the
/// river-completeness check.
pub fn build_channel_map(
    bounds: Rect,
    descriptors: Vec<Channel>,
    feedback: &mut Feedback,
    cancel: &CancellationToken,
) -> ChannelMap {
    let mut plane = Plane::new(bounds, UNASSIGNED);
    let mut channels = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        if descriptor.is_degenerate() {
            feedback.push(
                format!("degenerate channel at {:?} dropped from routable set", descriptor.rect),
                None,
            );
            continue;
        }
        channels.push(descriptor);
    }

    // Step 1: paint every channel's area with its kind.
    for channel in &channels {
        paint_plane(
            &mut plane,
            channel.rect,
            &Method::Paint(channel.kind.to_type()),
            &mut NullSink,
            cancel,
        );
    }

    // Step 2 (part one): re-fracture at every channel boundary so two
    // same-kind channels that happen to abut never get merged into one
    // tile by the ordinary paint engine's merge step, which only compares
    // body equality and knows nothing about channel identity.
    for channel in &channels {
        fracture_plane(&mut plane, channel.rect, &AlwaysInteracts, &mut NullSink, cancel);
    }

    let mut tile_channel = HashMap::new();
    assign_tile_channels(&plane, &channels, &mut tile_channel);

    // Step 3: density-driven blockage painting over normal channels.
    for idx in 0..channels.len() {
        if cancel.is_cancelled() {
            break;
        }
        paint_density_blockages(&mut plane, &channels[idx], cancel);
    }
    assign_tile_channels(&plane, &channels, &mut tile_channel);

    // Step 4: flood the blockage outward through adjoining river tiles.
    flood_blockages(&mut plane, &channels, &tile_channel, cancel);
    assign_tile_channels(&plane, &channels, &mut tile_channel);

    // Step 5: split river tiles so no boundary interrupts a distinct
    // neighboring-channel segment along their usable side.
    split_river_tiles(&mut plane, &tile_channel, cancel);
    assign_tile_channels(&plane, &channels, &mut tile_channel);

    // Step 6: river-completeness check.
    river_completeness_check(&mut plane, &mut channels, &tile_channel, cancel);
    assign_tile_channels(&plane, &channels, &mut tile_channel);

    ChannelMap {
        plane,
        channels,
        tile_channel,
    }
}

/// Re-derive each tile's channel back-reference from scratch. Cheap enough
/// to call after every structural pass rather than try to keep the map
/// incrementally consistent through splits it didn't initiate itself.
fn assign_tile_channels(plane: &Plane, channels: &[Channel], out: &mut HashMap<TileId, ChannelId>) {
    out.clear();
    for id in plane.active_ids() {
        let rect = plane.get(id).rect();
        for (idx, channel) in channels.iter().enumerate() {
            if channel.rect.contains_rect(&rect) {
                out.insert(id, ChannelId(idx as u32));
                break;
            }
        }
    }
}

fn type_of(plane: &Plane, id: TileId) -> TypeId {
    plane.get(id).body().half(core_plane::Side::Left)
}

fn paint_density_blockages(plane: &mut Plane, channel: &Channel, cancel: &CancellationToken) {
    if channel.kind != ChannelKind::Normal {
        return;
    }
    for (i, &density) in channel.col_density.iter().enumerate() {
        if density < channel.capacity {
            continue;
        }
        let x = channel.rect.x_lo + i as i64;
        let strip = Rect::new(x, channel.rect.y_lo, x + 1, channel.rect.y_hi);
        paint_plane(plane, strip, &Method::Paint(ChannelKind::VRiver.to_type()), &mut NullSink, cancel);
    }
    for (j, &density) in channel.row_density.iter().enumerate() {
        if density < channel.capacity {
            continue;
        }
        let y = channel.rect.y_lo + j as i64;
        let strip = Rect::new(channel.rect.x_lo, y, channel.rect.x_hi, y + 1);
        paint_plane(plane, strip, &Method::Paint(ChannelKind::HRiver.to_type()), &mut NullSink, cancel);
    }
}

/// All active tiles directly stitched along `id`'s right edge, bottom to
/// top; the classic corner-stitch "walk down the chain" enumerator.
fn right_neighbors(plane: &Plane, id: TileId) -> Vec<TileId> {
    let rect = plane.get(id).rect();
    let mut out = Vec::new();
    let mut cur = plane.get(id).tr();
    while cur.is_some() {
        let r = plane.get(cur).rect();
        if r.y_hi <= rect.y_lo {
            break;
        }
        out.push(cur);
        cur = plane.get(cur).bl();
    }
    out
}

fn left_neighbors(plane: &Plane, id: TileId) -> Vec<TileId> {
    let rect = plane.get(id).rect();
    let mut out = Vec::new();
    let mut cur = plane.get(id).bl();
    while cur.is_some() {
        let r = plane.get(cur).rect();
        if r.y_lo >= rect.y_hi {
            break;
        }
        out.push(cur);
        cur = plane.get(cur).tr();
    }
    out
}

fn top_neighbors(plane: &Plane, id: TileId) -> Vec<TileId> {
    let rect = plane.get(id).rect();
    let mut out = Vec::new();
    let mut cur = plane.get(id).rt();
    while cur.is_some() {
        let r = plane.get(cur).rect();
        if r.x_lo >= rect.x_hi {
            break;
        }
        out.push(cur);
        cur = plane.get(cur).lb();
    }
    out
}

fn bottom_neighbors(plane: &Plane, id: TileId) -> Vec<TileId> {
    let rect = plane.get(id).rect();
    let mut out = Vec::new();
    let mut cur = plane.get(id).lb();
    while cur.is_some() {
        let r = plane.get(cur).rect();
        if r.x_hi <= rect.x_lo {
            break;
        }
        out.push(cur);
        cur = plane.get(cur).rt();
    }
    out
}

/// Propagate a blockage outward through adjoining river tiles until a pass
/// makes no further progress (spec §4.5 step 4). A river tile only takes on
/// the neighboring blockage if its usable (pin-bearing) side actually faces
/// it and that side still has an uncommitted pin - otherwise the river
/// segment is already spoken for and stays as-is.
fn flood_blockages(
    plane: &mut Plane,
    channels: &[Channel],
    tile_channel: &HashMap<TileId, ChannelId>,
    cancel: &CancellationToken,
) {
    // (edge enumerator, the `PinSide` of the *neighbor* that would face back
    // toward this tile, i.e. the side the neighbor's pins must be usable on)
    let edges: [(fn(&Plane, TileId) -> Vec<TileId>, PinSide); 4] = [
        (right_neighbors, PinSide::Left),
        (left_neighbors, PinSide::Right),
        (top_neighbors, PinSide::Bottom),
        (bottom_neighbors, PinSide::Top),
    ];

    loop {
        if cancel.is_cancelled() {
            return;
        }
        let mut changed = false;
        let candidates: Vec<TileId> = plane
            .active_ids()
            .filter(|&id| {
                matches!(
                    ChannelKind::from_type(type_of(plane, id)),
                    Some(ChannelKind::Blocked | ChannelKind::HRiver | ChannelKind::VRiver)
                )
            })
            .collect();

        for id in candidates {
            if !plane.is_active(id) {
                continue;
            }
            let kind = match ChannelKind::from_type(type_of(plane, id)) {
                Some(k) => k,
                None => continue,
            };
            let source_rect = plane.get(id).rect();

            for &(enumerate, facing_side) in &edges {
                for n in enumerate(plane, id) {
                    let Some(nkind) = ChannelKind::from_type(type_of(plane, n)) else {
                        continue;
                    };
                    if nkind != ChannelKind::Normal {
                        continue;
                    }
                    let Some(nchan) = tile_channel.get(&n).map(|c| &channels[c.0 as usize]) else {
                        continue;
                    };
                    let facing_pins: &[crate::types::Pin] = match facing_side {
                        PinSide::Top => &nchan.top,
                        PinSide::Bottom => &nchan.bottom,
                        PinSide::Left => &nchan.left,
                        PinSide::Right => &nchan.right,
                    };
                    let has_usable = facing_pins
                        .iter()
                        .any(|p| p.net_id.is_none() && pin_side_touches(facing_side, plane.get(n).rect(), source_rect));
                    if !has_usable {
                        continue;
                    }
                    paint_plane(plane, plane.get(n).rect(), &Method::Paint(kind.to_type()), &mut NullSink, cancel);
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }
}

/// Ensure no vertical (for a horizontal river) or horizontal (for a
/// vertical river) boundary interrupts a river tile's usable side except at
/// its very ends, by splitting the river tile wherever a neighbor along
/// that side changes (spec §4.5 step 5).
fn split_river_tiles(plane: &mut Plane, tile_channel: &HashMap<TileId, ChannelId>, cancel: &CancellationToken) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let rivers: Vec<TileId> = plane
            .active_ids()
            .filter(|&id| matches!(ChannelKind::from_type(type_of(plane, id)), Some(ChannelKind::HRiver | ChannelKind::VRiver)))
            .collect();

        let mut split_point = None;
        'search: for id in rivers {
            let kind = ChannelKind::from_type(type_of(plane, id)).unwrap();
            let rect = plane.get(id).rect();
            let usable = match kind {
                ChannelKind::VRiver => [left_neighbors(plane, id), right_neighbors(plane, id)],
                ChannelKind::HRiver => [bottom_neighbors(plane, id), top_neighbors(plane, id)],
                _ => unreachable!(),
            };
            for side in usable {
                for n in side {
                    let nb_channel = tile_channel.get(&n).copied();
                    let nr = plane.get(n).rect();
                    let (lo, hi) = match kind {
                        ChannelKind::VRiver => (nr.y_lo, nr.y_hi),
                        ChannelKind::HRiver => (nr.x_lo, nr.x_hi),
                        _ => unreachable!(),
                    };
                    let (rect_lo, rect_hi) = match kind {
                        ChannelKind::VRiver => (rect.y_lo, rect.y_hi),
                        ChannelKind::HRiver => (rect.x_lo, rect.x_hi),
                        _ => unreachable!(),
                    };
                    if lo > rect_lo && lo < rect_hi {
                        split_point = Some((id, lo, kind));
                        let _ = nb_channel;
                        break 'search;
                    }
                    if hi > rect_lo && hi < rect_hi {
                        split_point = Some((id, hi, kind));
                        break 'search;
                    }
                }
            }
        }

        let Some((id, coord, kind)) = split_point else {
            break;
        };
        match kind {
            ChannelKind::VRiver => {
                plane.split_y(id, coord);
            }
            ChannelKind::HRiver => {
                plane.split_x(id, coord);
            }
            _ => unreachable!(),
        }
    }
}

/// If every pin on a river channel's usable side is already committed to a
/// net, the river can carry no more through-traffic: repaint it as blocked
/// (spec §4.5 step 6).
fn river_completeness_check(
    plane: &mut Plane,
    channels: &mut [Channel],
    tile_channel: &HashMap<TileId, ChannelId>,
    cancel: &CancellationToken,
) {
    let rivers: Vec<TileId> = plane
        .active_ids()
        .filter(|&id| matches!(ChannelKind::from_type(type_of(plane, id)), Some(ChannelKind::HRiver | ChannelKind::VRiver)))
        .collect();

    for id in rivers {
        let Some(channel_id) = tile_channel.get(&id).copied() else {
            continue;
        };
        let channel = &channels[channel_id.0 as usize];
        let usable_sides: [&[crate::types::Pin]; 2] = match channel.kind {
            ChannelKind::VRiver => [&channel.left, &channel.right],
            ChannelKind::HRiver => [&channel.top, &channel.bottom],
            _ => continue,
        };
        let all_committed = usable_sides.iter().all(|side| side.iter().all(|p| p.net_id.is_some()));
        if all_committed && !usable_sides.iter().all(|s| s.is_empty()) {
            let rect = plane.get(id).rect();
            paint_plane(plane, rect, &Method::Paint(ChannelKind::Blocked.to_type()), &mut NullSink, cancel);
            channels[channel_id.0 as usize].kind = ChannelKind::Blocked;
        }
    }
}

pub fn pin_side_touches(side: PinSide, rect: Rect, other: Rect) -> bool {
    match side {
        PinSide::Top => rect.y_hi == other.y_lo,
        PinSide::Bottom => rect.y_lo == other.y_hi,
        PinSide::Left => rect.x_lo == other.x_hi,
        PinSide::Right => rect.x_hi == other.x_lo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::Point;

    #[test]
    fn two_abutting_normal_channels_stay_one_tile_each() {
        let bounds = Rect::new(0, 0, 20, 10);
        let a = Channel::new(Rect::new(0, 0, 10, 10), ChannelKind::Normal, 4);
        let b = Channel::new(Rect::new(10, 0, 20, 10), ChannelKind::Normal, 4);
        let mut feedback = Feedback::default();
        let cancel = CancellationToken::new();
        let map = build_channel_map(bounds, vec![a, b], &mut feedback, &cancel);

        let left_tile = map.plane.locate(Point::new(5, 5));
        let right_tile = map.plane.locate(Point::new(15, 5));
        assert_ne!(left_tile, right_tile);
        assert_eq!(map.plane.get(left_tile).rect(), Rect::new(0, 0, 10, 10));
        assert_eq!(map.plane.get(right_tile).rect(), Rect::new(10, 0, 20, 10));
    }

    #[test]
    fn degenerate_channel_is_reported_and_dropped() {
        let bounds = Rect::new(0, 0, 10, 10);
        let degenerate = Channel::new(Rect::new(3, 3, 3, 8), ChannelKind::Normal, 4);
        let mut feedback = Feedback::default();
        let cancel = CancellationToken::new();
        let map = build_channel_map(bounds, vec![degenerate], &mut feedback, &cancel);

        assert_eq!(map.channels().len(), 0);
        assert_eq!(feedback.entries.len(), 1);
    }

    #[test]
    fn saturated_column_becomes_a_vertical_river() {
        let bounds = Rect::new(0, 0, 10, 10);
        let mut channel = Channel::new(bounds, ChannelKind::Normal, 2);
        channel.col_density[3] = 2;
        let mut feedback = Feedback::default();
        let cancel = CancellationToken::new();
        let map = build_channel_map(bounds, vec![channel], &mut feedback, &cancel);

        let id = map.plane.locate(Point::new(3, 5));
        assert_eq!(map.kind_of(id), Some(ChannelKind::VRiver));
    }
}
