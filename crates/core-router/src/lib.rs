//! Channel map construction and global path search built on top of
//! `core-plane`/`core-paint`.
//!
//! This crate treats a `Plane` as a grid of routing channels rather than
//! layout geometry: channel kinds are painted with the ordinary paint
//! engine, and a separate weak-reference table tracks which `Channel` each
//! tile belongs to (spec §4.5, §9 "the `client` pointer... is a
//! back-reference, not ownership"). Path search and single-channel
//! orientation wrapping (§4.6, §4.7) build on that map.

mod channel_map;
mod feedback;
mod route;
mod search;
mod types;

pub use channel_map::{ChannelMap, build_channel_map};
pub use feedback::{Feedback, FeedbackEntry};
pub use route::{Orientation, route_channel_oriented};
pub use search::{Path, SearchMode, process_terminal};
pub use types::{Channel, ChannelId, ChannelKind, Pin, PinSide};
