use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    Master,
    Bracket,
    Brace,
    Backup,
}

impl LayerKind {
    /// Masters and their bracket/brace variants interpolate; backups do not.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, LayerKind::Backup)
    }
}

/// Reference to another glyph placed in a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub glyph: String,
    #[serde(default)]
    pub offset: [f64; 2],
}

/// Layer content. Written as a bare map: paths carry `nodes`, components carry `glyph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape {
    Path(Path),
    Component(Component),
}

impl Shape {
    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Shape::Path(p) => Some(p),
            Shape::Component(_) => None,
        }
    }

    pub fn as_path_mut(&mut self) -> Option<&mut Path> {
        match self {
            Shape::Path(p) => Some(p),
            Shape::Component(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Layer {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            shapes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_paths(name: impl Into<String>, kind: LayerKind, paths: Vec<Path>) -> Self {
        let mut layer = Self::new(name, kind);
        layer.shapes = paths.into_iter().map(Shape::Path).collect();
        layer
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.kind.is_active()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.shapes.iter().filter_map(Shape::as_path)
    }

    pub fn paths_mut(&mut self) -> impl Iterator<Item = &mut Path> + '_ {
        self.shapes.iter_mut().filter_map(Shape::as_path_mut)
    }

    #[must_use]
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths().nth(index)
    }

    pub fn path_mut(&mut self, index: usize) -> Option<&mut Path> {
        self.paths_mut().nth(index)
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths().count()
    }

    #[must_use]
    pub fn has_paths(&self) -> bool {
        self.paths().next().is_some()
    }

    /// Drop every path shape and append `paths` after the remaining (non-path) shapes.
    pub fn replace_paths(&mut self, paths: Vec<Path>) {
        self.shapes.retain(|s| s.as_path().is_none());
        self.shapes.extend(paths.into_iter().map(Shape::Path));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub name: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Glyph {
    #[must_use]
    pub fn new(name: impl Into<String>, layers: Vec<Layer>) -> Self {
        Self {
            name: name.into(),
            layers,
        }
    }

    pub fn active_layers(&self) -> impl Iterator<Item = (usize, &Layer)> + '_ {
        self.layers.iter().enumerate().filter(|(_, l)| l.is_active())
    }

    #[must_use]
    pub fn layer_index(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    #[must_use]
    pub fn first_master_index(&self) -> Option<usize> {
        self.layers
            .iter()
            .position(|l| l.kind == LayerKind::Master)
    }

    #[must_use]
    pub fn has_paths_in_active_layers(&self) -> bool {
        self.active_layers().any(|(_, l)| l.has_paths())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default)]
    pub glyphs: Vec<Glyph>,
}

impl Font {
    pub fn from_yaml_str(s: &str) -> Result<Self, ModelError> {
        let font: Font = serde_yaml::from_str(s)?;
        font.validate()?;
        Ok(font)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        let font: Font = serde_json::from_str(s)?;
        font.validate()?;
        Ok(font)
    }

    pub fn to_yaml_string(&self) -> Result<String, ModelError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn glyph(&self, name: &str) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.name == name)
    }

    fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for glyph in &self.glyphs {
            if !seen.insert(glyph.name.as_str()) {
                return Err(ModelError::DuplicateGlyph {
                    glyph: glyph.name.clone(),
                });
            }
            let mut layers = HashSet::new();
            for layer in &glyph.layers {
                if !layers.insert(layer.name.as_str()) {
                    return Err(ModelError::DuplicateLayer {
                        glyph: glyph.name.clone(),
                        layer: layer.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};

    const SAMPLE: &str = r#"
glyphs:
  - name: i
    layers:
      - name: Regular
        shapes:
          - glyph: dotaccent
          - nodes:
              - { x: 0, y: 0 }
              - { x: 10, y: 0 }
              - { x: 10, y: 100, type: line }
      - name: Regular backup
        kind: backup
"#;

    #[test]
    fn parses_yaml_with_defaults() {
        let font = Font::from_yaml_str(SAMPLE).unwrap();
        let glyph = font.glyph("i").unwrap();
        assert_eq!(glyph.layers.len(), 2);
        assert_eq!(glyph.layers[0].kind, LayerKind::Master);
        assert_eq!(glyph.layers[0].path_count(), 1);
        assert_eq!(glyph.layers[0].shapes.len(), 2);
        assert_eq!(glyph.layers[0].path(0).unwrap().nodes[2].kind, NodeKind::Line);
        assert!(!glyph.layers[1].is_active());
        assert_eq!(glyph.active_layers().count(), 1);
        assert_eq!(glyph.first_master_index(), Some(0));
    }

    #[test]
    fn replace_paths_keeps_components_first() {
        let mut font = Font::from_yaml_str(SAMPLE).unwrap();
        let layer = &mut font.glyphs[0].layers[0];
        let a = Path::polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let b = Path::new(vec![Node::line(5.0, 5.0)]);
        layer.replace_paths(vec![a.clone(), b.clone()]);
        assert!(matches!(layer.shapes[0], Shape::Component(_)));
        assert_eq!(layer.path(0), Some(&a));
        assert_eq!(layer.path(1), Some(&b));
    }

    #[test]
    fn rejects_duplicate_layers() {
        let yaml = "glyphs:\n  - name: a\n    layers:\n      - name: Bold\n      - name: Bold\n";
        let err = Font::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateLayer { .. }));
    }

    #[test]
    fn json_roundtrip_preserves_shapes() {
        let font = Font::from_yaml_str(SAMPLE).unwrap();
        let json = font.to_json_string().unwrap();
        assert_eq!(Font::from_json_str(&json).unwrap(), font);
    }
}
