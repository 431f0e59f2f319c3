/// A tile's content type. Meaning is caller-defined (e.g. "space", "metal1",
/// "poly"); the engine never interprets the value beyond equality.
pub type TypeId = u32;

/// Reserved type carried by the plane's perimeter so that a caller can
/// recognize "off the edge of the defined universe" without a special case
/// in every neighbor walk (spec §3 "Plane" sentinel tiles).
pub const OUTSIDE: TypeId = TypeId::MAX;
