//! Outline data model shared by the path juggling crates.
//!
//! A [`Font`] holds [`Glyph`]s, each glyph holds one [`Layer`] per interpolation master (plus
//! bracket, brace and backup layers), and each layer holds an ordered list of [`Shape`]s. Only
//! [`Path`] shapes take part in compatibility work; components ride along untouched.

pub mod error;
pub mod layer;
pub mod node;
pub mod path;

pub use error::ModelError;
pub use kurbo::{Point, Rect};
pub use layer::{Component, Font, Glyph, Layer, LayerKind, Shape};
pub use node::{Node, NodeKind};
pub use path::{Path, Winding};
