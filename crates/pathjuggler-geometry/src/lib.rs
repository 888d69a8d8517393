//! 2D geometry used by the compatibility algorithms.

pub mod primitives;
pub mod region;

pub use cavalier_contours::polyline::{PlineVertex, Polyline};
pub use primitives::{angle, compass, direction, Direction};
pub use region::{outlines_intersect, path_to_polyline, OverlapCoords};
