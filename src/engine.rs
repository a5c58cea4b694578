use std::io::Write;

use console::style;
use serde::Serialize;

use crate::config::{EngineOptions, MergedOptions, RenderOptions};
use crate::environment::Environment;
use crate::error::{EngineError, Result};

/// Output of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    /// The extension the output should be written with, e.g. `.html`.
    pub ext: String,
}

/// What a build pipeline needs from a template engine.
pub trait RenderEngine {
    fn render(&self, source: &str, options: Option<&RenderOptions>) -> Result<Rendered>;

    fn render_file(&self, path: &str, options: Option<&RenderOptions>) -> Result<Rendered>;

    fn render_sync(&self, source: &str, context: &tera::Context) -> Result<String>;

    fn dest_ext(&self) -> &str;
}

/// Tera behind the render-engine interface.
///
/// Renders take `&self` and can run from many threads at once; `configure`
/// and the `add_*` registrations need `&mut self`, so they cannot overlap a
/// render in flight.
#[derive(Clone, Default)]
pub struct Engine {
    options: EngineOptions,
    env: Option<Environment>,
}

impl Engine {
    /// An unconfigured engine with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine and configure it in one step.
    pub fn with_options(options: impl Into<EngineOptions>) -> Result<Self> {
        let mut engine = Self::new();
        engine.configure(options)?;
        Ok(engine)
    }

    /// Replace the environment with a fresh one rooted at `options.root`.
    ///
    /// Accepts a root path or a full `EngineOptions`. Globals, tags and
    /// filters registered before are dropped. On error the engine is left
    /// unconfigured.
    pub fn configure(&mut self, options: impl Into<EngineOptions>) -> Result<()> {
        self.env = None;
        self.options = options.into();
        self.env = Some(Environment::new(&self.options)?);
        Ok(())
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn is_configured(&self) -> bool {
        self.env.is_some()
    }

    /// Make `value` visible to every template as `name`, replacing any
    /// global of the same name.
    pub fn add_global<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        self.env_mut()?.add_global(name, value);
        Ok(())
    }

    /// Register a tag, called from templates as `{{ name(key=value) }}`.
    pub fn add_tag<F: tera::Function + 'static>(&mut self, name: &str, tag: F) -> Result<()> {
        self.env_mut()?.add_tag(name, tag);
        Ok(())
    }

    /// Register a filter, used from templates as `{{ value | name }}`.
    pub fn add_filter<F: tera::Filter + 'static>(&mut self, name: &str, filter: F) -> Result<()> {
        self.env_mut()?.add_filter(name, filter);
        Ok(())
    }

    fn env(&self) -> Result<&Environment> {
        self.env.as_ref().ok_or(EngineError::NotConfigured)
    }

    fn env_mut(&mut self) -> Result<&mut Environment> {
        self.env.as_mut().ok_or(EngineError::NotConfigured)
    }
}

/// Turn a render result into the caller's result, logging failures to `log`
/// unless the merged options are silent.
fn finish(
    merged: MergedOptions,
    result: Result<String>,
    log: &mut impl Write,
) -> Result<Rendered> {
    match result {
        Ok(content) => Ok(Rendered {
            content,
            ext: merged.options.dest_ext,
        }),
        Err(err) => {
            if !merged.options.silent {
                report(log, &err);
            }
            Err(err)
        }
    }
}

impl RenderEngine for Engine {
    fn render(&self, source: &str, options: Option<&RenderOptions>) -> Result<Rendered> {
        let merged = self.options.merge(options);
        let result = self.env().and_then(|env| {
            let context = merged.context(env.globals());
            env.render_string(source, &context)
        });
        finish(merged, result, &mut std::io::stderr())
    }

    fn render_file(&self, path: &str, options: Option<&RenderOptions>) -> Result<Rendered> {
        let merged = self.options.merge(options);
        let result = self.env().and_then(|env| {
            let context = merged.context(env.globals());
            env.render_file(path, &context)
        });
        finish(merged, result, &mut std::io::stderr())
    }

    /// Render `source` with exactly `context` plus globals. Nothing is logged;
    /// the error is handed back as the value.
    fn render_sync(&self, source: &str, context: &tera::Context) -> Result<String> {
        let env = self.env()?;
        let mut full = env.globals().clone();
        full.extend(context.clone());
        env.render_string(source, &full)
    }

    fn dest_ext(&self) -> &str {
        &self.options.dest_ext
    }
}

fn report(log: &mut impl Write, err: &EngineError) {
    let _ = writeln!(log, "{} {}", style("error:").red().bold(), style(err).red());
    if let (Some(file), Some(line)) = (err.filename(), err.line()) {
        let _ = writeln!(log, "  {} {}:{}", style("-->").dim(), file, line);
    }
}
