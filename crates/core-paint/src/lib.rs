//! Rectangular and non-Manhattan paint on top of a [`core_plane::Plane`].
//!
//! This crate owns every operation that changes what a plane's tiles mean:
//! applying a result table over a rectangle, cutting a diagonal across one,
//! and the clipping/quartering/re-merging machinery both of those lean on.
//! The plane itself stays a dumb, geometry-only structure - see
//! `core_plane`.

mod clip;
mod diagonal;
mod paint;
mod remerge;
mod result_table;

pub use diagonal::{fracture_plane, paint_diagonal};
pub use paint::paint_plane;
pub use remerge::merge_nm_tiles;
pub use result_table::{AlwaysInteracts, Method, ResultTable};
