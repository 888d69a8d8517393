//! Compatibility checks and corrections for the paths of glyph layers.
//!
//! Layers of a glyph interpolate only when their paths agree in count, order, node structure,
//! winding and starting point. This crate checks that agreement segment by segment and repairs
//! it where it can.

pub mod batch;
pub mod checker;
pub mod compare;
pub mod ordering;
pub mod outcome;
pub mod settings;
pub mod starting_point;
pub mod winding;

pub use batch::{run_batch, BatchAbort, BatchError, BatchReport, Command, Selection};
pub use checker::{
    all_paths_directionally_compatible, masters_compatible, paths_compatible,
    paths_directionally_compatible,
};
pub use compare::{is_corner, is_horizontal, is_similar_angle, is_similar_direction};
pub use ordering::{
    check_path_ordering, check_path_ordering_lists, correct_path_ordering, OrderingMismatch,
};
pub use outcome::{ErrorKind, Incompatibility, Outcome};
pub use settings::{Settings, SettingsError};
pub use starting_point::{
    find_matching_starting_node, reestablish_starting_point_compatibility, set_starting_point,
    set_starting_points,
};
pub use winding::{correct_path_direction, DirectionChange};
