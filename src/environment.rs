use serde::Serialize;
use tera::{Context, Tera};

use crate::config::EngineOptions;
use crate::error::{EngineError, Result};
use crate::loader::Loader;
use crate::scripts::load_scripts;

/// Name string templates are registered under.
pub const STRING_TEMPLATE: &str = "<string>";

/// A configured Tera instance plus the globals and loader that go with it.
#[derive(Clone)]
pub struct Environment {
    tera: Tera,
    globals: Context,
    loader: Loader,
}

impl Environment {
    pub fn new(options: &EngineOptions) -> Result<Self> {
        let loader = Loader::new(&options.root)?;
        let mut tera = Tera::default();
        // Tera picks escaping by name suffix; string and file renders must agree.
        tera.autoescape_on(if options.autoescape { vec![""] } else { vec![] });

        let mut env = Self {
            tera,
            globals: Context::new(),
            loader,
        };

        if let Some(dir) = options.filters.dir(&options.root, "filters") {
            for script in load_scripts(&dir)? {
                let name = script.name().to_string();
                env.tera.register_filter(&name, script);
            }
        }
        if let Some(dir) = options.tags.dir(&options.root, "tags") {
            for script in load_scripts(&dir)? {
                let name = script.name().to_string();
                env.tera.register_function(&name, script);
            }
        }

        Ok(env)
    }

    pub fn globals(&self) -> &Context {
        &self.globals
    }

    pub fn add_global<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        self.globals.insert(name, value);
    }

    pub fn add_tag<F: tera::Function + 'static>(&mut self, name: &str, tag: F) {
        self.tera.register_function(name, tag);
    }

    pub fn add_filter<F: tera::Filter + 'static>(&mut self, name: &str, filter: F) {
        self.tera.register_filter(name, filter);
    }

    /// Render in-memory source. Parse and render failures come back the same way.
    pub fn render_string(&self, source: &str, context: &Context) -> Result<String> {
        let mut tera = self.tera.clone();
        tera.add_raw_template(STRING_TEMPLATE, source)
            .and_then(|_| tera.render(STRING_TEMPLATE, context))
            .map_err(|e| EngineError::template(STRING_TEMPLATE, e))
    }

    /// Render a template by name, reading it and its dependencies fresh from disk.
    pub fn render_file(&self, name: &str, context: &Context) -> Result<String> {
        let templates = self.loader.load(name)?;
        let template_name = templates
            .first()
            .map_or_else(|| name.to_string(), |(first, _)| first.clone());

        let mut tera = self.tera.clone();
        tera.add_raw_templates(templates)
            .and_then(|_| tera.render(&template_name, context))
            .map_err(|e| EngineError::template(template_name.clone(), e))
    }
}
