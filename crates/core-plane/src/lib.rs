//! The corner-stitched tile plane: the substrate every other crate in this
//! workspace mutates.
//!
//! A `Plane` tiles a single bounded rectangle with `Tile`s that are either a
//! uniform rectangle or a diagonal split between two half-types. Tiles are
//! addressed by a stable [`TileId`] rather than a pointer, and own four
//! corner-stitch neighbor references (`tr`/`bl`/`rt`/`lb`) per spec §3. See
//! `DESIGN.md` for how neighbor maintenance is implemented relative to the
//! historical pointer-patching algorithm.

mod body;
mod cancel;
mod plane;
mod tile;
mod typeid;
mod undo;

pub use body::{Body, Diagonal, Direction, Side};
pub use cancel::CancellationToken;
pub use plane::{Plane, PlaneId};
pub use tile::{Tile, TileId};
pub use typeid::{OUTSIDE, TypeId};
pub use undo::{NullSink, UndoEvent, UndoSink, VecSink};
