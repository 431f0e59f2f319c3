//! Integer geometry primitives shared by the plane, paint, and router crates.
//!
//! Coordinates throughout this codebase are signed grid integers, never
//! floats: the tile plane is an exact partition and any rounding has to be a
//! single, auditable rule rather than whatever a float library happens to do.

pub mod point;
pub mod rect;
pub mod round;

pub use point::Point;
pub use rect::Rect;
pub use round::round_div;
