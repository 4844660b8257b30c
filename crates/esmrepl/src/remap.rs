//! Mapping runtime stack frames back to source files.

use regex::Regex;

/// A stack whose first frame in the unit now points at the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapped {
    /// Line in the original file
    pub line: usize,
    pub column: usize,
    pub stack: String,
}

/// Rewrite the first `at <unit>:<line>:<col>` frame of `stack` to `path`.
///
/// The frame may also be a named one, `at f (<unit>:<line>:<col>)`. Lines are
/// shifted up by one for the prelude line that precedes every unit body.
/// Returns None when no frame belongs to the unit.
pub fn remap_stack(stack: &str, unit: &str, path: &str) -> Option<Remapped> {
    let pattern = format!(
        r"\bat (?:[^\n(]*\()?(?P<loc>{}:(?P<line>\d+):(?P<col>\d+))",
        regex::escape(unit)
    );
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(stack)?;

    let loc = caps.name("loc")?;
    let line: usize = caps["line"].parse().ok()?;
    let column: usize = caps["col"].parse().ok()?;
    let line = line.saturating_sub(1);

    let mut remapped = String::with_capacity(stack.len() + path.len());
    remapped.push_str(&stack[..loc.start()]);
    remapped.push_str(&format!("{}:{}:{}", path, line, column));
    remapped.push_str(&stack[loc.end()..]);

    Some(Remapped {
        line,
        column,
        stack: remapped,
    })
}
