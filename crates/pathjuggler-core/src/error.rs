use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("glyph \"{glyph}\" is defined more than once")]
    DuplicateGlyph { glyph: String },

    #[error("layer \"{layer}\" is defined more than once in glyph \"{glyph}\"")]
    DuplicateLayer { glyph: String, layer: String },
}
