use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tera::{Context, Value};

use crate::error::{EngineError, Result};

/// Engine-wide options, set by `Engine::configure`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineOptions {
    /// Directory the file-system loader resolves template names against.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Where to load script filters from.
    #[serde(default)]
    pub filters: Toggle,

    /// Where to load script tags from.
    #[serde(default)]
    pub tags: Toggle,

    /// Extension reported alongside rendered output.
    #[serde(rename = "destExt", default = "default_dest_ext")]
    pub dest_ext: String,

    /// Suppress error logging.
    #[serde(default)]
    pub silent: bool,

    /// HTML-escape every `{{ }}` output, whatever the template is called.
    #[serde(default = "default_autoescape")]
    pub autoescape: bool,
}

fn default_root() -> PathBuf {
    PathBuf::from("./templates")
}

fn default_dest_ext() -> String {
    ".html".to_string()
}

fn default_autoescape() -> bool {
    true
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            root: default_root(),
            filters: Toggle::default(),
            tags: Toggle::default(),
            dest_ext: default_dest_ext(),
            silent: false,
            autoescape: default_autoescape(),
        }
    }
}

impl From<&str> for EngineOptions {
    fn from(root: &str) -> Self {
        PathBuf::from(root).into()
    }
}

impl From<&Path> for EngineOptions {
    fn from(root: &Path) -> Self {
        root.to_path_buf().into()
    }
}

impl From<PathBuf> for EngineOptions {
    fn from(root: PathBuf) -> Self {
        Self {
            root,
            ..Self::default()
        }
    }
}

/// Either a switch or an explicit directory.
///
/// `true` means the conventional directory under the template root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Toggle {
    Enabled(bool),
    Path(PathBuf),
}

impl Default for Toggle {
    fn default() -> Self {
        Toggle::Enabled(false)
    }
}

impl Toggle {
    /// The directory this toggle points at, if it is on.
    pub fn dir(&self, root: &Path, conventional: &str) -> Option<PathBuf> {
        match self {
            Toggle::Enabled(false) => None,
            Toggle::Enabled(true) => Some(root.join(conventional)),
            Toggle::Path(path) => Some(path.clone()),
        }
    }
}

/// Per-call overrides passed to `render` and `render_file`.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub dest_ext: Option<String>,
    pub silent: Option<bool>,
    /// Data made available to the template.
    pub locals: serde_json::Map<String, Value>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options whose locals are the fields of `data`.
    pub fn with_locals<T: Serialize>(data: &T) -> Result<Self> {
        let value = serde_json::to_value(data).map_err(|e| EngineError::Context { source: e })?;
        let locals = match value {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(EngineError::Context {
                    source: serde::de::Error::custom(format!(
                        "expected an object, found {other}"
                    )),
                })
            }
        };
        Ok(Self {
            locals,
            ..Self::default()
        })
    }

    pub fn local(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.locals.insert(key.into(), value.into());
        self
    }

    pub fn dest_ext(mut self, ext: impl Into<String>) -> Self {
        self.dest_ext = Some(ext.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }
}

/// The options in effect for a single render.
#[derive(Debug, Clone)]
pub struct MergedOptions {
    pub options: EngineOptions,
    pub locals: serde_json::Map<String, Value>,
}

impl EngineOptions {
    /// Merge caller overrides onto a copy of these options.
    pub fn merge(&self, overrides: Option<&RenderOptions>) -> MergedOptions {
        let mut options = self.clone();
        let Some(overrides) = overrides else {
            return MergedOptions {
                options,
                locals: serde_json::Map::new(),
            };
        };

        if let Some(ext) = &overrides.dest_ext {
            options.dest_ext = ext.clone();
        }
        if let Some(silent) = overrides.silent {
            options.silent = silent;
        }

        MergedOptions {
            options,
            locals: overrides.locals.clone(),
        }
    }
}

impl MergedOptions {
    /// Build the Tera context: option keys, then globals, then locals.
    pub fn context(&self, globals: &Context) -> Context {
        let mut context = Context::new();
        context.insert("root", &self.options.root);
        context.insert("filters", &self.options.filters);
        context.insert("tags", &self.options.tags);
        context.insert("destExt", &self.options.dest_ext);
        context.insert("silent", &self.options.silent);
        context.extend(globals.clone());
        for (key, value) in &self.locals {
            context.insert(key, value);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_conventions() {
        let options = EngineOptions::default();
        assert_eq!(options.root, PathBuf::from("./templates"));
        assert_eq!(options.filters, Toggle::Enabled(false));
        assert_eq!(options.tags, Toggle::Enabled(false));
        assert_eq!(options.dest_ext, ".html");
        assert!(!options.silent);
        assert!(options.autoescape);
    }

    #[test]
    fn root_path_converts_to_options() {
        let options: EngineOptions = "site/templates".into();
        assert_eq!(options.root, PathBuf::from("site/templates"));
        assert_eq!(options.dest_ext, ".html");
    }

    #[test]
    fn merge_without_overrides_equals_empty_overrides() {
        let options = EngineOptions::default();
        let none = options.merge(None);
        let empty = options.merge(Some(&RenderOptions::default()));
        assert_eq!(none.options, empty.options);
        assert_eq!(none.locals, empty.locals);
    }

    #[test]
    fn merge_never_mutates_engine_options() {
        let options = EngineOptions::default();
        let overrides = RenderOptions::new().dest_ext(".txt").silent(true);
        let merged = options.merge(Some(&overrides));
        assert_eq!(merged.options.dest_ext, ".txt");
        assert!(merged.options.silent);
        assert_eq!(options.dest_ext, ".html");
        assert!(!options.silent);
    }

    #[test]
    fn locals_override_globals_and_option_keys() {
        let mut globals = Context::new();
        globals.insert("site", "global");
        globals.insert("destExt", "from-global");

        let overrides = RenderOptions::new().local("site", "local");
        let merged = EngineOptions::default().merge(Some(&overrides));
        let context = merged.context(&globals).into_json();

        assert_eq!(context["site"], "local");
        assert_eq!(context["destExt"], "from-global");
        assert_eq!(context["root"], "./templates");
    }

    #[test]
    fn with_locals_rejects_non_objects() {
        assert!(RenderOptions::with_locals(&[1, 2, 3]).is_err());
        let options = RenderOptions::with_locals(&serde_json::json!({"thing": [1, 2, 3]})).unwrap();
        assert_eq!(options.locals["thing"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn toggle_resolves_directories() {
        let root = Path::new("tpl");
        assert_eq!(Toggle::Enabled(false).dir(root, "filters"), None);
        assert_eq!(
            Toggle::Enabled(true).dir(root, "filters"),
            Some(PathBuf::from("tpl/filters"))
        );
        assert_eq!(
            Toggle::Path(PathBuf::from("scripts")).dir(root, "filters"),
            Some(PathBuf::from("scripts"))
        );
    }
}
