use thiserror::Error;

/// Coarse classification of a reported incompatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Path, node or segment counts differ between the layers being compared.
    StructuralIncompatibility,
    /// An exhaustive search found no compatible arrangement.
    MatchNotFound,
    /// A path has no on-curve nodes, so it has no centre of mass.
    DefinednessFailure,
}

/// A per-glyph warning. These are values, not faults: the batch keeps going after one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("{glyph}: does not have compatible masters")]
    MastersIncompatible { glyph: String },

    #[error("{glyph}: has compatible masters, but they are not directionally compatible")]
    NotDirectionallyCompatible { glyph: String },

    #[error("{glyph}: has compatible masters, but the paths appear to be switched")]
    PathsSwitched { glyph: String },

    #[error("{glyph}: path {path} has no on-curve nodes")]
    UndefinedCentre { glyph: String, path: usize },

    #[error(
        "{glyph}: Layer {layer} has {count} paths; layer {reference} has {reference_count} paths"
    )]
    PathCount {
        glyph: String,
        layer: String,
        count: usize,
        reference: String,
        reference_count: usize,
    },

    #[error("{glyph}: Unable to make layer {layer} compatible by shifting starting points")]
    StartingPoints { glyph: String, layer: String },

    #[error("{glyph}: cannot be made compatible.{}", reorder_detail(.path_count, .no_match))]
    Reordering {
        glyph: String,
        path_count: bool,
        no_match: bool,
    },
}

fn reorder_detail(path_count: &bool, no_match: &bool) -> String {
    let mut detail = String::new();
    if *path_count {
        detail.push_str(" Not all masters contain the same number of paths.");
    }
    if *no_match {
        detail.push_str(" Could not find a matching compatible path.");
    }
    detail
}

impl Incompatibility {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Incompatibility::MastersIncompatible { .. } | Incompatibility::PathCount { .. } => {
                ErrorKind::StructuralIncompatibility
            }
            Incompatibility::Reordering { path_count, .. } if *path_count => {
                ErrorKind::StructuralIncompatibility
            }
            Incompatibility::UndefinedCentre { .. } => ErrorKind::DefinednessFailure,
            Incompatibility::NotDirectionallyCompatible { .. }
            | Incompatibility::PathsSwitched { .. }
            | Incompatibility::StartingPoints { .. }
            | Incompatibility::Reordering { .. } => ErrorKind::MatchNotFound,
        }
    }

    #[must_use]
    pub fn glyph(&self) -> &str {
        match self {
            Incompatibility::MastersIncompatible { glyph }
            | Incompatibility::NotDirectionallyCompatible { glyph }
            | Incompatibility::PathsSwitched { glyph }
            | Incompatibility::UndefinedCentre { glyph, .. }
            | Incompatibility::PathCount { glyph, .. }
            | Incompatibility::StartingPoints { glyph, .. }
            | Incompatibility::Reordering { glyph, .. } => glyph,
        }
    }
}

/// Status lines and warnings produced by one operation on one glyph or layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub status: Vec<String>,
    pub warnings: Vec<Incompatibility>,
}

impl Outcome {
    #[must_use]
    pub fn status(text: impl Into<String>) -> Self {
        Self {
            status: vec![text.into()],
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn warning(warning: Incompatibility) -> Self {
        Self {
            status: Vec::new(),
            warnings: vec![warning],
        }
    }

    #[must_use]
    pub fn with_warning(mut self, warning: Incompatibility) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn merge(&mut self, other: Outcome) {
        self.status.extend(other.status);
        self.warnings.extend(other.warnings);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
