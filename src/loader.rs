use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{EngineError, Result};

/// Script files live next to templates but are never rendered.
const SCRIPT_EXTENSION: &str = "rhai";

/// Resolves template names against a root directory on disk.
#[derive(Debug, Clone)]
pub struct Loader {
    root: PathBuf,
}

impl Loader {
    pub fn new(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(EngineError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }
        let root = root.canonicalize().map_err(|e| EngineError::Io {
            context: format!("resolving template root {}", root.display()),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// Map a template name to its file, refusing anything outside the root.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let not_found = || EngineError::NotFound {
            name: name.to_string(),
            root: self.root.clone(),
        };

        let path = self
            .root
            .join(name.trim_start_matches('/'))
            .canonicalize()
            .map_err(|_| not_found())?;

        if !path.starts_with(&self.root)
            || !path.is_file()
            || path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION)
            || is_binary_file(&path)
        {
            return Err(not_found());
        }
        Ok(path)
    }

    /// The name Tera knows a resolved file by: its `/`-separated path under the root.
    pub fn template_name(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Read `name` and every template it includes, extends or imports.
    ///
    /// The requested template comes first. Unrelated files under the root are
    /// never read, so a broken draft cannot fail other renders.
    pub fn load(&self, name: &str) -> Result<Vec<(String, String)>> {
        let path = self.resolve(name)?;
        let mut queue = VecDeque::from([(self.template_name(&path), path)]);
        let mut seen = HashSet::new();
        let mut templates = Vec::new();

        while let Some((name, path)) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|e| EngineError::Io {
                context: format!("reading template {}", path.display()),
                source: e,
            })?;
            for reference in references(&source) {
                // Unresolvable targets are left to Tera (`ignore missing`, or its own error).
                if !seen.contains(&reference) {
                    if let Ok(path) = self.resolve(&reference) {
                        queue.push_back((reference, path));
                    }
                }
            }
            templates.push((name, source));
        }

        Ok(templates)
    }
}

/// Template names named by `include`, `extends` and `import` tags.
fn references(source: &str) -> Vec<String> {
    static TAG: OnceLock<Regex> = OnceLock::new();
    static NAME: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| {
        Regex::new(r"(?s)\{%-?\s*(?:include|extends|import)\s+(.*?)-?%\}").expect("valid regex")
    });
    let name =
        NAME.get_or_init(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).expect("valid regex"));

    tag.captures_iter(source)
        .filter_map(|c| c.get(1))
        .flat_map(|args| name.captures_iter(args.as_str()))
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Detect binary files using content_inspector (BOM-aware, null-byte scanning).
///
/// Reads only the first 8KB to avoid unnecessary allocation for large files.
pub fn is_binary_file(path: &Path) -> bool {
    use std::io::Read;

    let Ok(file) = std::fs::File::open(path) else {
        return false;
    };

    let mut buf = [0u8; 8192];
    let Ok(n) = file.take(8192).read(&mut buf) else {
        return false;
    };

    !content_inspector::inspect(&buf[..n]).is_text()
}
