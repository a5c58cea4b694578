pub mod options;

use std::path::Path;

use crate::error::{EngineError, Result};

pub use options::{EngineOptions, MergedOptions, RenderOptions, Toggle};

/// Load EngineOptions from a TOML file, or from `engine.toml` inside a directory.
pub fn load_options(path: &Path) -> Result<EngineOptions> {
    let options_path = if path.is_dir() {
        path.join("engine.toml")
    } else {
        path.to_path_buf()
    };

    let content = std::fs::read_to_string(&options_path).map_err(|e| EngineError::Io {
        context: format!("reading {}", options_path.display()),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| EngineError::ConfigParse { source: e })
}
