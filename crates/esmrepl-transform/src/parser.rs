/// Parser collaborator
///
/// Wraps the swc ECMAScript parser. Sources are parsed as modules targeting
/// the latest edition, so `import`, `export`, `import.meta` and top-level
/// `await` are all accepted.

use swc_core::common::sync::Lrc;
use swc_core::common::{BytePos, FileName, SourceFile, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::parser::error::Error as ParserError;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{Parser, StringInput, Syntax};

use crate::error::{Result, SyntaxError, TransformError, PLACEHOLDER_FILE_NAME};

/// A parsed module together with the position its source starts at.
///
/// Spans in `module` are absolute; subtract `start` to get byte offsets into
/// the parsed text.
pub struct ParsedModule {
    pub module: Module,
    pub start: BytePos,
}

impl ParsedModule {
    /// Byte offset into the parsed text for a span position.
    pub fn offset(&self, pos: BytePos) -> usize {
        pos.0.saturating_sub(self.start.0) as usize
    }
}

/// Parse `source` as an ES module.
///
/// Recoverable errors the parser collects along the way fail the parse too.
pub fn parse_module(source: &str) -> Result<ParsedModule> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom(PLACEHOLDER_FILE_NAME.into()).into(),
        source.to_string(),
    );

    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        EsVersion::EsNext,
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let module = parser
        .parse_module()
        .map_err(|e| syntax_error(&cm, &fm, source, e))?;

    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(syntax_error(&cm, &fm, source, e));
    }

    Ok(ParsedModule {
        module,
        start: fm.start_pos,
    })
}

/// Convert a parser error into a positioned `SyntaxError`.
fn syntax_error(
    cm: &SourceMap,
    fm: &SourceFile,
    source: &str,
    err: ParserError,
) -> TransformError {
    let span = err.span();
    let message = err.into_kind().msg().to_string();

    let (line, column, offset) = if span.lo < fm.start_pos || span.lo > fm.end_pos {
        (1, 0, 0)
    } else {
        let loc = cm.lookup_char_pos(span.lo);
        (loc.line, loc.col.0, (span.lo.0 - fm.start_pos.0) as usize)
    };

    TransformError::Syntax(SyntaxError {
        file: PLACEHOLDER_FILE_NAME.to_string(),
        message,
        line,
        column,
        incomplete: !source.trim().is_empty() && offset >= source.trim_end().len(),
    })
}
