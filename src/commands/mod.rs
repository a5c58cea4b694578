pub mod render;
pub mod string;

use std::path::Path;

use engine_tera::{load_options, Engine, EngineOptions, RenderOptions};
use tera::Value;

use crate::cli::CommonArgs;

/// Configure an engine from `--config` and `--root`, falling back to `default_root`.
pub fn build_engine(common: &CommonArgs, default_root: &Path) -> miette::Result<Engine> {
    let mut options = match &common.config {
        Some(path) => load_options(path)?,
        None => EngineOptions::from(default_root),
    };
    if let Some(root) = &common.root {
        options.root = root.clone();
    }
    if common.silent {
        options.silent = true;
    }

    Ok(Engine::with_options(options)?)
}

/// Turn `-d key=value` pairs into render locals. Values that parse as JSON
/// keep their type.
pub fn render_options(data: &[String]) -> RenderOptions {
    data.iter()
        .filter_map(|kv| kv.split_once('='))
        .fold(RenderOptions::new(), |options, (key, value)| {
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
            options.local(key, value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(config: Option<&Path>, silent: bool) -> CommonArgs {
        CommonArgs {
            root: None,
            config: config.map(Path::to_path_buf),
            data: Vec::new(),
            silent,
        }
    }

    #[test]
    fn silent_comes_from_flag_or_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string().replace('\\', "/");

        let loud = build_engine(&args(None, false), dir.path()).unwrap();
        assert!(!loud.options().silent);

        let quiet = build_engine(&args(None, true), dir.path()).unwrap();
        assert!(quiet.options().silent);

        let config = dir.path().join("engine.toml");
        std::fs::write(&config, format!("root = \"{root}\"\nsilent = true\n")).unwrap();
        let from_config = build_engine(&args(Some(&config), false), dir.path()).unwrap();
        assert!(from_config.options().silent);
    }

    #[test]
    fn data_pairs_keep_json_types() {
        let data = vec![
            "thing=[1,2,3]".to_string(),
            "name=Jon".to_string(),
            "count=3".to_string(),
            "ignored".to_string(),
        ];
        let options = render_options(&data);
        assert_eq!(options.locals["thing"], serde_json::json!([1, 2, 3]));
        assert_eq!(options.locals["name"], Value::from("Jon"));
        assert_eq!(options.locals["count"], Value::from(3));
        assert!(!options.locals.contains_key("ignored"));
    }
}
