use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rhai::{Dynamic, Engine, Scope, AST};
use tera::Value;

use crate::error::{EngineError, Result};

/// Create a sandboxed Rhai engine for filter and tag scripts.
pub fn create_engine() -> Engine {
    let mut engine = Engine::new();

    // Limit recursion and operations for safety
    engine.set_max_call_levels(32);
    engine.set_max_operations(100_000);
    engine.set_max_string_size(10 * 1024 * 1024); // 10MB

    engine
}

/// A compiled `.rhai` file, usable as a Tera filter or function.
#[derive(Clone)]
pub struct Script {
    name: String,
    engine: Arc<Engine>,
    ast: AST,
}

impl Script {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn eval(&self, value: Option<&Value>, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let mut scope = Scope::new();
        if let Some(value) = value {
            scope.push_dynamic("value", self.to_dynamic(value)?);
        }
        let args: serde_json::Map<String, Value> =
            args.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        scope.push_dynamic("args", self.to_dynamic(&Value::Object(args))?);

        let result: Dynamic = self
            .engine
            .eval_ast_with_scope(&mut scope, &self.ast)
            .map_err(|e| tera::Error::msg(format!("script '{}' failed: {e}", self.name)))?;

        rhai::serde::from_dynamic(&result)
            .map_err(|e| tera::Error::msg(format!("script '{}' returned {e}", self.name)))
    }

    fn to_dynamic(&self, value: &Value) -> tera::Result<Dynamic> {
        rhai::serde::to_dynamic(value)
            .map_err(|e| tera::Error::msg(format!("script '{}' input: {e}", self.name)))
    }
}

impl tera::Filter for Script {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.eval(Some(value), args)
    }
}

impl tera::Function for Script {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.eval(None, args)
    }
}

/// Compile every `*.rhai` file in `dir`, named by file stem.
pub fn load_scripts(dir: &Path) -> Result<Vec<Script>> {
    if !dir.is_dir() {
        return Err(EngineError::ScriptDir {
            path: dir.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| EngineError::Io {
            context: format!("reading script directory {}", dir.display()),
            source: e,
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "rhai"))
        .collect();
    paths.sort();

    let engine = Arc::new(create_engine());
    paths
        .iter()
        .map(|path| compile(&engine, path))
        .collect()
}

fn compile(engine: &Arc<Engine>, path: &Path) -> Result<Script> {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
        context: format!("reading script {}", path.display()),
        source: e,
    })?;
    let ast = engine.compile(&source).map_err(|e| EngineError::Script {
        name: name.clone(),
        message: e.to_string(),
    })?;

    Ok(Script {
        name,
        engine: Arc::clone(engine),
        ast,
    })
}
