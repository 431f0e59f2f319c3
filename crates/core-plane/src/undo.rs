use core_geom::{Point, Rect};

use crate::plane::PlaneId;
use crate::TypeId;

/// One record of a committed mutation (spec §3 "Paint Undo Event", §6 "Undo
/// sink contract"). The sink is external and append-only: the engine never
/// inspects what a sink does with these and never fails because a sink
/// failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoEvent {
    Paint {
        rect: Rect,
        old: TypeId,
        new: TypeId,
        plane_id: PlaneId,
    },
    Split {
        point: Point,
        split_x: bool,
        plane_id: PlaneId,
    },
    Join {
        point: Point,
        split_x: bool,
        plane_id: PlaneId,
    },
}

/// Collaborator interface consumed by every mutating operation in this
/// workspace. Implementations must not fail; a sink that wants to drop
/// records under backpressure does so silently rather than erroring the
/// paint call (spec §6 "never fails").
pub trait UndoSink {
    fn record(&mut self, event: UndoEvent);
}

/// The default sink: discards everything. Used when a caller has no undo
/// log to feed (e.g. the router's internal channel-map construction).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl UndoSink for NullSink {
    fn record(&mut self, _event: UndoEvent) {}
}

/// A simple in-memory sink, handy for tests and for the CLI's `undo`
/// command.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub events: Vec<UndoEvent>,
}

impl UndoSink for VecSink {
    fn record(&mut self, event: UndoEvent) {
        self.events.push(event);
    }
}

impl<S: UndoSink + ?Sized> UndoSink for &mut S {
    fn record(&mut self, event: UndoEvent) {
        (**self).record(event);
    }
}
