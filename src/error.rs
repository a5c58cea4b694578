#![allow(unused_assignments)]

use std::error::Error as _;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::OnceLock;

use miette::Diagnostic;
use regex_lite::Regex;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("Render engine is not configured")]
    #[diagnostic(help("Call `Engine::configure` with a template root before rendering"))]
    NotConfigured,

    #[error("Template root is not a directory: {path}")]
    #[diagnostic(help("Point `root` at an existing directory of templates"))]
    InvalidRoot { path: PathBuf },

    #[error("Script directory not found: {path}")]
    #[diagnostic(help("Set `filters`/`tags` to false or create the directory"))]
    ScriptDir { path: PathBuf },

    #[error("Script '{name}' failed to compile: {message}")]
    #[diagnostic(help("Check the Rhai script for errors"))]
    Script { name: String, message: String },

    #[error("{} (file: {}, line: {})", .message, .filename, .line.map_or_else(|| "?".to_string(), |l| l.to_string()))]
    #[diagnostic(help("Check your Tera template syntax"))]
    Template {
        message: String,
        filename: String,
        line: Option<usize>,
        #[source]
        source: tera::Error,
    },

    #[error("Template not found: {name} (root: {})", .root.display())]
    #[diagnostic(help("Template names are resolved relative to the configured root"))]
    NotFound { name: String, root: PathBuf },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse engine options")]
    #[diagnostic(help("Check the TOML syntax of your options file"))]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },

    #[error("Render context must serialize to an object")]
    Context {
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Wrap a Tera error, recording the template it came from and the line
    /// Tera points at, if any.
    ///
    /// `filename` is the template being rendered; a parse failure in a
    /// template it pulled in is attributed to that template instead.
    pub fn template(filename: impl Into<String>, source: tera::Error) -> Self {
        let message = error_chain(&source);
        let line = line_number(&message);
        let filename = failed_template(&message).unwrap_or_else(|| filename.into());
        EngineError::Template {
            message,
            filename,
            line,
            source,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            EngineError::Template { filename, .. } => Some(filename),
            EngineError::NotFound { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            EngineError::Template { line, .. } => *line,
            _ => None,
        }
    }
}

/// Tera nests the useful part of a message (parse position, missing
/// variable) in the source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    message
}

fn line_number(message: &str) -> Option<usize> {
    static POSITION: OnceLock<Regex> = OnceLock::new();
    let re = POSITION.get_or_init(|| Regex::new(r"-->\s*(\d+):(\d+)").expect("valid regex"));
    re.captures(message)?.get(1)?.as_str().parse().ok()
}

fn failed_template(message: &str) -> Option<String> {
    static PARSE: OnceLock<Regex> = OnceLock::new();
    let re = PARSE.get_or_init(|| Regex::new(r"Failed to parse '([^']+)'").expect("valid regex"));
    Some(re.captures(message)?.get(1)?.as_str().to_string())
}
