//! Tera exposed through a render-engine interface for build pipelines.
//!
//! ```no_run
//! use engine_tera::{Engine, RenderEngine, RenderOptions};
//!
//! let engine = Engine::with_options("./templates")?;
//! let options = RenderOptions::new().local("thing", vec![1, 2, 3]);
//! let out = engine.render("{% for item in thing %}{{ item }}{% endfor %}", Some(&options))?;
//! assert_eq!(out.content, "123");
//! # Ok::<(), engine_tera::EngineError>(())
//! ```

pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod loader;
pub mod scripts;

pub use config::{load_options, EngineOptions, RenderOptions, Toggle};
pub use engine::{Engine, RenderEngine, Rendered};
pub use error::{EngineError, Result};
