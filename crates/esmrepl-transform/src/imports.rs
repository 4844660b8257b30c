/// Dynamic-import replacements for static imports and re-exports
///
/// Every static import becomes a `const` destructuring of `await import(...)`,
/// binding into the shared scope under the same local names.

use swc_core::ecma::ast::{
    ExportSpecifier, ImportDecl, ImportPhase, ImportSpecifier, ModuleExportName, NamedExport,
};

use crate::error::{Result, TransformError};

/// Local names a single import statement binds.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportBindings {
    /// `(exported name, local alias)` in source order; `default` for default imports
    pub named: Vec<(String, String)>,
    /// Alias bound to the whole module object
    pub namespace: Option<String>,
}

impl ImportBindings {
    /// Collect the bindings of an `import` declaration.
    pub fn from_import(decl: &ImportDecl) -> Result<Self> {
        if !matches!(decl.phase, ImportPhase::Evaluation) {
            return Err(TransformError::unsupported(format!(
                "phase imports of {}",
                quote(&decl.src.value)
            )));
        }

        let mut bindings = Self::default();
        for specifier in &decl.specifiers {
            match specifier {
                ImportSpecifier::Default(s) => {
                    bindings.named.push(("default".to_string(), s.local.sym.to_string()));
                }
                ImportSpecifier::Named(s) => {
                    let exported = match &s.imported {
                        Some(name) => property_key(name),
                        None => s.local.sym.to_string(),
                    };
                    bindings.named.push((exported, s.local.sym.to_string()));
                }
                ImportSpecifier::Namespace(s) => {
                    bindings.namespace = Some(s.local.sym.to_string());
                }
            }
        }
        Ok(bindings)
    }

    /// Collect the bindings of an `export ... from` declaration.
    ///
    /// Re-exported names are bound into the shared scope under their exported
    /// name, which is where later units look for them.
    pub fn from_reexport(export: &NamedExport) -> Result<Self> {
        let mut bindings = Self::default();
        for specifier in &export.specifiers {
            match specifier {
                ExportSpecifier::Named(s) => {
                    let local = binding_name(s.exported.as_ref().unwrap_or(&s.orig))?;
                    bindings.named.push((property_key(&s.orig), local));
                }
                ExportSpecifier::Namespace(s) => {
                    bindings.namespace = Some(binding_name(&s.name)?);
                }
                ExportSpecifier::Default(s) => {
                    bindings.named.push(("default".to_string(), s.exported.sym.to_string()));
                }
            }
        }
        Ok(bindings)
    }

    /// Render the replacement statement loading `source` exactly once.
    pub fn render(&self, source: &str) -> String {
        let load = format!("await import({})", quote(source));
        let pattern = self.pattern();

        match (&pattern, &self.namespace) {
            (None, None) => format!("{};", load),
            (None, Some(ns)) => format!("const {} = {};", ns, load),
            (Some(pattern), None) => format!("const {} = {};", pattern, load),
            (Some(pattern), Some(ns)) => format!(
                "const [{}, {}] = await (async () => {{ const m = {}; return [m, m]; }})();",
                pattern, ns, load
            ),
        }
    }

    /// Object pattern mapping exported names to local aliases.
    fn pattern(&self) -> Option<String> {
        if self.named.is_empty() {
            return None;
        }
        let entries: Vec<String> = self
            .named
            .iter()
            .map(|(exported, local)| format!("{}: {}", exported, local))
            .collect();
        Some(format!("{{ {} }}", entries.join(", ")))
    }
}

/// JavaScript string literal for `s`.
pub(crate) fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Property key for an export name; string names are quoted.
fn property_key(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => quote(&s.value),
    }
}

/// Identifier a re-export can be bound to in the shared scope.
fn binding_name(name: &ModuleExportName) -> Result<String> {
    match name {
        ModuleExportName::Ident(ident) => Ok(ident.sym.to_string()),
        ModuleExportName::Str(s) => Err(TransformError::unsupported(format!(
            "re-export under string name {} has no binding in the shared scope",
            quote(&s.value)
        ))),
    }
}
