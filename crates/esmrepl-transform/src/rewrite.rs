/// Module syntax rewriter
///
/// Rewrites the top-level module declarations of a source into ordinary
/// statements and replaces `import.meta` with a per-unit synthetic object:
///
/// - `import ... from "m"` binds the same local names from `await import("m")`
/// - `export <decl>` and `export default <decl>` drop the `export` qualifier
/// - `export { a, b }` is removed, the bindings already live in the shared scope
/// - `export ... from "m"` binds the re-exported names like an import would
/// - `import.meta` (at any depth) becomes `_<id>_import_meta`
///
/// The output keeps every untouched statement on its original line.

use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{
    DefaultDecl, Expr, ExprStmt, Lit, MetaPropExpr, MetaPropKind, ModuleDecl, ModuleItem, Stmt,
};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::context::TransformContext;
use crate::error::Result;
use crate::imports::{quote, ImportBindings};
use crate::parser::{parse_module, ParsedModule};
use crate::splice::Splicer;

/// Rewrite `source` so it evaluates without module syntax.
///
/// Only `ctx`'s metadata flags change, and only when the rewrite succeeds.
/// A failed parse reports the placeholder file name; callers substitute the
/// real path with `TransformError::with_file`.
pub fn rewrite(source: &str, ctx: &mut TransformContext) -> Result<String> {
    let parsed = parse_module(source)?;
    let mut splicer = Splicer::new(source);

    if parsed.module.shebang.is_some() {
        let end = source.find('\n').unwrap_or(source.len());
        splicer.delete(0, end);
    }

    for item in &parsed.module.body {
        if let ModuleItem::ModuleDecl(decl) = item {
            rewrite_module_decl(&parsed, decl, &mut splicer)?;
        }
    }

    let mut meta = MetaCollector::default();
    parsed.module.visit_with(&mut meta);
    if !meta.spans.is_empty() {
        let ident = ctx.meta_identifier();
        for span in &meta.spans {
            splicer.replace(parsed.offset(span.lo), parsed.offset(span.hi), ident.as_str());
        }
        ctx.mark_meta_referenced();
    }

    // Declared on the first line, after any directive prologue, so line
    // numbers stay put and `"use strict"` stays a directive.
    let mut prefix = None;
    if let Some(decl) = ctx.take_meta_declaration() {
        match directive_prologue_end(&parsed) {
            Some(end) => {
                let separator = if source[..end].ends_with(';') { " " } else { "; " };
                splicer.insert(end, format!("{}{}", separator, decl));
            }
            None => prefix = Some(decl),
        }
    }

    let body = if splicer.is_empty() {
        source.to_string()
    } else {
        splicer.finish()
    };

    Ok(match prefix {
        Some(decl) => format!("{} {}", decl, body),
        None => body,
    })
}

/// Byte offset just past the last leading string-literal directive.
fn directive_prologue_end(parsed: &ParsedModule) -> Option<usize> {
    parsed
        .module
        .body
        .iter()
        .take_while(|item| is_directive(item))
        .last()
        .map(|item| parsed.offset(item.span().hi))
}

fn is_directive(item: &ModuleItem) -> bool {
    match item {
        ModuleItem::Stmt(Stmt::Expr(ExprStmt { expr, .. })) => {
            matches!(&**expr, Expr::Lit(Lit::Str(_)))
        }
        _ => false,
    }
}

/// Queue the edits for one top-level module declaration.
fn rewrite_module_decl(
    parsed: &ParsedModule,
    decl: &ModuleDecl,
    splicer: &mut Splicer<'_>,
) -> Result<()> {
    let at = |pos| parsed.offset(pos);

    match decl {
        ModuleDecl::Import(import) => {
            let text = ImportBindings::from_import(import)?.render(&import.src.value);
            splicer.replace(at(import.span.lo), at(import.span.hi), text);
        }
        ModuleDecl::ExportDecl(export) => {
            splicer.delete(at(export.span.lo), at(export.decl.span().lo));
        }
        ModuleDecl::ExportDefaultDecl(export) => {
            let inner = export.decl.span();
            splicer.delete(at(export.span.lo), at(inner.lo));

            let anonymous = match &export.decl {
                DefaultDecl::Fn(f) => f.ident.is_none(),
                DefaultDecl::Class(c) => c.ident.is_none(),
                DefaultDecl::TsInterfaceDecl(_) => false,
            };
            // A nameless function or class is only valid as an expression.
            // The semicolons keep it from merging with the lines around it
            // when the source leaves them out.
            if anonymous {
                splicer.insert(at(inner.lo), ";(");
                splicer.insert(at(inner.hi), ");");
            }
        }
        ModuleDecl::ExportDefaultExpr(export) => {
            let inner = export.expr.span();
            splicer.replace(at(export.span.lo), at(inner.lo), ";(");
            splicer.insert(at(inner.hi), ")");
        }
        ModuleDecl::ExportNamed(export) => {
            let text = match &export.src {
                Some(src) => ImportBindings::from_reexport(export)?.render(&src.value),
                None => String::new(),
            };
            splicer.replace(at(export.span.lo), at(export.span.hi), text);
        }
        ModuleDecl::ExportAll(export) => {
            let text = format!("await import({});", quote(&export.src.value));
            splicer.replace(at(export.span.lo), at(export.span.hi), text);
        }
        // TypeScript-only declarations never come out of the ES parser.
        _ => {}
    }
    Ok(())
}

/// Finds every `import.meta` in a module, however deeply nested.
#[derive(Default)]
struct MetaCollector {
    spans: Vec<Span>,
}

impl Visit for MetaCollector {
    fn visit_meta_prop_expr(&mut self, node: &MetaPropExpr) {
        if matches!(node.kind, MetaPropKind::ImportMeta) {
            self.spans.push(node.span);
        }
    }
}
