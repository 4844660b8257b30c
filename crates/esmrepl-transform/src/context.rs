/// Per-unit transform state
///
/// A `TransformContext` lives for one rewritten unit (a preloaded file or the
/// whole interactive session) and keeps the synthetic names emitted for that
/// unit consistent across rewrite passes.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;
use uuid::Uuid;

/// Process-unique token used to build synthetic identifiers and sentinel messages.
///
/// The token is a bare hex string, so it is valid inside a JavaScript identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextId(String);

impl ContextId {
    /// Generate a token that no other context in this process shares.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiers and flags the rewriter needs to stay consistent within one unit.
#[derive(Debug, Clone)]
pub struct TransformContext {
    id: ContextId,
    /// Absolute directory containing the unit
    directory: PathBuf,
    /// Absolute path of the unit (None for interactive input)
    file: Option<PathBuf>,
    /// Set the first time an `import.meta` reference is rewritten
    meta_referenced: bool,
    /// Set once the synthetic metadata object has been declared
    meta_declaration_emitted: bool,
}

impl TransformContext {
    /// Create a context for an absolute file path.
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        let file = path.into();
        let directory = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| file.clone());

        Self {
            id: ContextId::fresh(),
            directory,
            file: Some(file),
            meta_referenced: false,
            meta_declaration_emitted: false,
        }
    }

    /// Create a context for input that has no file of its own.
    pub fn for_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            id: ContextId::fresh(),
            directory: directory.into(),
            file: None,
            meta_referenced: false,
            meta_declaration_emitted: false,
        }
    }

    pub fn id(&self) -> &ContextId {
        &self.id
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn meta_referenced(&self) -> bool {
        self.meta_referenced
    }

    pub fn meta_declaration_emitted(&self) -> bool {
        self.meta_declaration_emitted
    }

    /// Name standing in for `import.meta` in this unit.
    pub fn meta_identifier(&self) -> String {
        format!("_{}_import_meta", self.id)
    }

    /// `file://` URL of the unit, percent-encoded.
    ///
    /// Interactive contexts use their directory, with a trailing slash.
    pub fn module_url(&self) -> String {
        let url = match &self.file {
            Some(file) => Url::from_file_path(file),
            None => Url::from_directory_path(&self.directory),
        };
        match url {
            Ok(url) => url.to_string(),
            // Relative paths cannot be expressed as file URLs; keep them readable.
            Err(()) => {
                let path = self.file.as_deref().unwrap_or(&self.directory);
                format!("file://{}", path.display())
            }
        }
    }

    pub(crate) fn mark_meta_referenced(&mut self) {
        self.meta_referenced = true;
    }

    /// The metadata declaration, the first time it is needed and never again.
    pub(crate) fn take_meta_declaration(&mut self) -> Option<String> {
        if !self.meta_referenced || self.meta_declaration_emitted {
            return None;
        }
        self.meta_declaration_emitted = true;

        let url = serde_json::Value::String(self.module_url());
        Some(format!("const {} = {{ url: {} }};", self.meta_identifier(), url))
    }
}
