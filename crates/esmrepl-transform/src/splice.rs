//! Line-preserving source splicing.
//!
//! Rewritten statements replace their original text in place. Replacements
//! are padded with the newlines they remove so untouched code keeps its line.

/// One replacement of the byte range `start..end`; an insertion when equal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

#[derive(Debug)]
pub(crate) struct Splicer<'a> {
    source: &'a str,
    edits: Vec<Edit>,
}

impl<'a> Splicer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        let end = end.min(self.source.len());
        let start = start.min(end);
        self.edits.push(Edit {
            start,
            end,
            text: text.into(),
        });
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at, at, text);
    }

    pub fn delete(&mut self, start: usize, end: usize) {
        self.replace(start, end, "");
    }

    /// Apply every edit and return the new text.
    ///
    /// Edits must not overlap; insertions may sit on either boundary of a
    /// replacement and are applied in the order they were added.
    pub fn finish(mut self) -> String {
        self.edits.sort_by_key(|e| (e.start, e.end));

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for edit in &self.edits {
            debug_assert!(edit.start >= cursor, "overlapping edits: {:?}", self.edits);
            let start = edit.start.max(cursor);
            out.push_str(&self.source[cursor..start]);
            out.push_str(&edit.text);

            let removed = self.source[start..edit.end].matches('\n').count();
            let added = edit.text.matches('\n').count();
            for _ in added..removed {
                out.push('\n');
            }
            cursor = edit.end.max(cursor);
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}
