use tracing::debug;

use crate::types::{Channel, Pin, PinSide};

/// Which reflection of a channel's pin layout `route_channel_oriented`
/// settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Normal,
    MirroredLeftRight,
}

fn mirror_left_right(channel: &Channel) -> Channel {
    let mirror_x = |p: Pin| -> Pin {
        let mirrored_x = channel.rect.x_lo + channel.rect.x_hi - p.point.x;
        let side = match p.side {
            PinSide::Left => PinSide::Right,
            PinSide::Right => PinSide::Left,
            other => other,
        };
        Pin {
            point: core_geom::Point::new(mirrored_x, p.point.y),
            side,
            net_id: p.net_id,
        }
    };
    Channel {
        rect: channel.rect,
        kind: channel.kind,
        top: channel.top.iter().copied().map(mirror_x).collect(),
        bottom: channel.bottom.iter().copied().map(mirror_x).collect(),
        left: channel.right.iter().copied().map(mirror_x).collect(),
        right: channel.left.iter().copied().map(mirror_x).collect(),
        col_density: channel.col_density.iter().rev().copied().collect(),
        row_density: channel.row_density.clone(),
        capacity: channel.capacity,
    }
}

/// Route one channel, trying the mirrored layout if the first attempt
/// reports errors and keeping whichever orientation did better (spec §4.7).
/// The actual greedy channel router is supplied by the caller as
/// `route_channel` - spec.md specifies it only as the black-box call
/// `route_channel(c) -> error_count`.
pub fn route_channel_oriented(channel: &Channel, route_channel: impl Fn(&Channel) -> usize) -> (Orientation, usize) {
    let normal_errors = route_channel(channel);
    if normal_errors == 0 {
        debug!(target: "router.search", errors = 0, "channel_routed_normal_orientation");
        return (Orientation::Normal, 0);
    }

    let mirrored = mirror_left_right(channel);
    let mirrored_errors = route_channel(&mirrored);

    if mirrored_errors < normal_errors {
        debug!(
            target: "router.search",
            normal_errors,
            mirrored_errors,
            "channel_routed_mirrored_orientation"
        );
        (Orientation::MirroredLeftRight, mirrored_errors)
    } else {
        (Orientation::Normal, normal_errors)
    }
}
