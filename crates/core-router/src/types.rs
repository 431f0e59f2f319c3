use core_geom::{Point, Rect};
use core_plane::TypeId;

/// A stable handle into a [`crate::channel_map::ChannelMap`]'s channel table.
/// Channels own their tiles; a tile only ever holds this index back, never a
/// pointer or a cloned `Channel` (spec §9 "the `client` pointer... is a
/// back-reference, not ownership").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub(crate) u32);

/// What a channel-map tile's body means (spec §3 "Channel"). Encoded as a
/// `TypeId` when painted onto the plane so the ordinary paint engine can be
/// reused unmodified for channel-map construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Normal,
    HRiver,
    VRiver,
    Blocked,
}

impl ChannelKind {
    pub(crate) fn to_type(self) -> TypeId {
        match self {
            ChannelKind::Normal => 0,
            ChannelKind::HRiver => 1,
            ChannelKind::VRiver => 2,
            ChannelKind::Blocked => 3,
        }
    }

    pub(crate) fn from_type(t: TypeId) -> Option<ChannelKind> {
        match t {
            0 => Some(ChannelKind::Normal),
            1 => Some(ChannelKind::HRiver),
            2 => Some(ChannelKind::VRiver),
            3 => Some(ChannelKind::Blocked),
            _ => None,
        }
    }
}

/// Which edge of a channel's rectangle a pin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// A fixed grid-point on a channel boundary through which a net may enter or
/// leave (spec GLOSSARY "Pin"). `net_id` is `None` for an uncommitted pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pin {
    pub point: Point,
    pub side: PinSide,
    pub net_id: Option<u32>,
}

/// A rectangular routing region (spec §3 "Channel"). Density and capacity
/// are per-grid-line counts over the channel's width/length grid; `client`
/// from the source ("density maps") is represented directly as these two
/// arrays rather than a second back-reference, since nothing else in this
/// workspace needs to share them.
#[derive(Debug, Clone)]
pub struct Channel {
    pub rect: Rect,
    pub kind: ChannelKind,
    pub top: Vec<Pin>,
    pub bottom: Vec<Pin>,
    pub left: Vec<Pin>,
    pub right: Vec<Pin>,
    /// Density of nets crossing each column (indexed left-to-right).
    pub col_density: Vec<u32>,
    /// Density of nets crossing each row (indexed bottom-to-top).
    pub row_density: Vec<u32>,
    pub capacity: u32,
}

impl Channel {
    pub fn new(rect: Rect, kind: ChannelKind, capacity: u32) -> Self {
        let width = rect.width().max(0) as usize;
        let height = rect.height().max(0) as usize;
        Self {
            rect,
            kind,
            top: Vec::new(),
            bottom: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
            col_density: vec![0; width],
            row_density: vec![0; height],
            capacity,
        }
    }

    /// All pins on every side, for code that doesn't care which edge.
    pub fn all_pins(&self) -> impl Iterator<Item = &Pin> {
        self.top
            .iter()
            .chain(self.bottom.iter())
            .chain(self.left.iter())
            .chain(self.right.iter())
    }

    /// Length-to-width ratio of the channel's long axis, used by §4.7's
    /// orientation preference (the router performs best on long, narrow
    /// channels).
    pub fn long_axis_ratio(&self) -> f64 {
        let w = self.rect.width().max(1) as f64;
        let h = self.rect.height().max(1) as f64;
        w.max(h) / w.min(h)
    }

    /// Whether a channel is degenerate and must be kept out of the routable
    /// set (spec §7 "Channel construction: degenerate channel").
    pub fn is_degenerate(&self) -> bool {
        self.rect.is_empty()
    }
}
