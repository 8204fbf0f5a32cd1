use crate::engine::error::EngineError;
use phf::phf_map;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of protocol templates stored on disk.
pub const TEMPLATE_EXTENSION: &str = "ot2";

static BUILTIN: phf::Map<&'static str, &'static str> = phf_map! {
    "sanger" => include_str!("../../../templates/sanger.ot2"),
    "elisa" => include_str!("../../../templates/elisa.ot2"),
    "labware" => include_str!("../../../templates/labware.ot2"),
    "calibrate" => include_str!("../../../templates/calibrate.ot2"),
};

/// Read-only access to protocol templates by name.
///
/// Templates are static assets; implementations may be called repeatedly and
/// must return the same text for the same name.
pub trait TemplateSource {
    /// Returns the raw text of the template called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TemplateNotFound`] when no template has that
    /// name, or [`EngineError::TemplateIo`] when it exists but cannot be read.
    fn load(&self, name: &str) -> Result<String, EngineError>;

    /// Lists the names this source can load, sorted.
    fn names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn load(&self, name: &str) -> Result<String, EngineError> {
        (**self).load(name)
    }

    fn names(&self) -> Vec<String> {
        (**self).names()
    }
}

/// Templates compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn load(&self, name: &str) -> Result<String, EngineError> {
        BUILTIN
            .get(name)
            .map(|text| text.to_string())
            .ok_or_else(|| EngineError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }
}

/// Templates stored as `<name>.ot2` files in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        is_valid_template_name(name)
            .then(|| self.root.join(format!("{}.{}", name, TEMPLATE_EXTENSION)))
    }
}

impl TemplateSource for DirectoryTemplates {
    fn load(&self, name: &str) -> Result<String, EngineError> {
        let not_found = || EngineError::TemplateNotFound {
            name: name.to_string(),
        };
        let path = self.path_for(name).ok_or_else(not_found)?;
        debug!("Loading template '{}' from {:?}", name, path);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(EngineError::TemplateIo {
                name: name.to_string(),
                source: e,
            }),
        }
    }

    fn names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .filter(|name| is_valid_template_name(name))
            .collect();
        names.sort();
        names
    }
}

/// An override directory layered over the built-in templates.
#[derive(Debug, Clone)]
pub struct LayeredTemplates {
    overrides: Option<DirectoryTemplates>,
}

impl LayeredTemplates {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self {
            overrides: override_dir.map(DirectoryTemplates::new),
        }
    }

    pub fn builtin_only() -> Self {
        Self { overrides: None }
    }
}

impl TemplateSource for LayeredTemplates {
    fn load(&self, name: &str) -> Result<String, EngineError> {
        if let Some(dir) = &self.overrides {
            match dir.load(name) {
                Err(EngineError::TemplateNotFound { .. }) => {}
                other => return other,
            }
        }
        BuiltinTemplates.load(name)
    }

    fn names(&self) -> Vec<String> {
        let mut names = BuiltinTemplates.names();
        if let Some(dir) = &self.overrides {
            names.extend(dir.names());
        }
        names.sort();
        names.dedup();
        names
    }
}

/// Template names map directly onto file names, so they are restricted to a
/// safe alphabet.
pub fn is_valid_template_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::template::ProtocolTemplate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn every_builtin_template_has_exactly_one_marker() {
        for name in BuiltinTemplates.names() {
            let text = BuiltinTemplates.load(&name).unwrap();
            ProtocolTemplate::parse(name.as_str(), text)
                .unwrap_or_else(|e| panic!("builtin template '{}' is invalid: {}", name, e));
        }
    }

    #[test]
    fn builtin_names_are_sorted() {
        assert_eq!(
            BuiltinTemplates.names(),
            vec!["calibrate", "elisa", "labware", "sanger"]
        );
    }

    #[test]
    fn unknown_builtin_is_not_found() {
        assert!(matches!(
            BuiltinTemplates.load("pcr"),
            Err(EngineError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn directory_templates_load_by_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("custom.ot2"), "# ot2:parameters\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = DirectoryTemplates::new(dir.path());
        assert_eq!(source.load("custom").unwrap(), "# ot2:parameters\n");
        assert_eq!(source.names(), vec!["custom"]);
        assert!(matches!(
            source.load("missing"),
            Err(EngineError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn directory_templates_refuse_path_like_names() {
        let dir = tempdir().unwrap();
        let source = DirectoryTemplates::new(dir.path());
        for name in ["../secret", "a/b", "", "x.y"] {
            assert!(matches!(
                source.load(name),
                Err(EngineError::TemplateNotFound { .. })
            ));
        }
    }

    #[test]
    fn layered_templates_prefer_overrides_and_fall_back_to_builtin() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("elisa.ot2"), "# custom\n# ot2:parameters\n").unwrap();

        let source = LayeredTemplates::new(Some(dir.path().to_path_buf()));
        assert!(source.load("elisa").unwrap().starts_with("# custom"));
        assert_eq!(
            source.load("labware").unwrap(),
            BuiltinTemplates.load("labware").unwrap()
        );
        assert_eq!(source.names().len(), 4);
    }
}
