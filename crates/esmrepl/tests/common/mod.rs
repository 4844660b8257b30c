//! A scripted stand-in for the Node runtime.
//!
//! Understands just enough line-oriented JavaScript for driver tests:
//!
//! - `var x = ...;`, `const x = ...;`, `globalThis.x = ...;` define `x`
//! - `use(x);` throws a ReferenceError unless `x` is defined
//! - `throw new Error("msg");` throws an Error
//! - `throw 42;` throws a non-error value
//! - `fail_in_dependency("msg");` throws an Error from outside the unit
//! - `hang();` makes the unit never report anything
//!
//! Everything else is ignored. A unit that does not throw completes with
//! `undefined`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use esmrepl_eval::{EvalEvent, EventSink, Evaluator, Listener, SharedContext, Thrown};
use tokio::sync::mpsc::unbounded_channel;

#[derive(Default)]
pub struct World {
    pub globals: HashSet<String>,
    /// Every submitted `(unit, code)`, in order
    pub submissions: Vec<(String, String)>,
}

pub type SharedWorld = Rc<RefCell<World>>;

pub fn world() -> SharedWorld {
    Rc::new(RefCell::new(World::default()))
}

pub struct ScriptedEvaluator {
    world: SharedWorld,
    sink: Option<EventSink>,
}

impl ScriptedEvaluator {
    pub fn session(world: &SharedWorld) -> (Self, Listener) {
        let (tx, rx) = unbounded_channel();
        let evaluator = Self {
            world: Rc::clone(world),
            sink: Some(tx),
        };
        (evaluator, rx)
    }

    /// Simulate the runtime dying: the listener closes.
    pub fn crash(&mut self) {
        self.sink = None;
    }

    fn emit(&self, event: EvalEvent) {
        if let Some(sink) = &self.sink {
            let _ = sink.send(event);
        }
    }

    fn run(&self, code: &str, unit: &str) -> EvalEvent {
        for (index, line) in code.lines().enumerate() {
            let number = index + 1;
            for statement in line.split_inclusive(';') {
                let column = line.find(statement.trim_start()).unwrap_or(0) + 1;
                if let Some(event) = self.step(statement.trim(), unit, number, column) {
                    return event;
                }
            }
        }
        EvalEvent::Completed {
            unit: unit.to_string(),
            value: "undefined".to_string(),
        }
    }

    fn step(&self, statement: &str, unit: &str, line: usize, column: usize) -> Option<EvalEvent> {
        let mut world = self.world.borrow_mut();

        for prefix in ["var ", "const ", "let ", "globalThis."] {
            if let Some(rest) = statement.strip_prefix(prefix) {
                let name: String = rest
                    .chars()
                    .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
                    .collect();
                if !name.is_empty() {
                    world.globals.insert(name);
                }
                return None;
            }
        }

        if let Some(name) = call_argument(statement, "use(") {
            if world.globals.contains(name) {
                return None;
            }
            let message = format!("{} is not defined", name);
            let thrown = Thrown::error(Some(unit), &message)
                .with_name("ReferenceError")
                .with_stack(format!(
                    "ReferenceError: {}\n    at {}:{}:{}\n    at Script.runInThisContext (node:vm:122:12)",
                    message, unit, line, column
                ));
            return Some(EvalEvent::Thrown(thrown));
        }

        if let Some(literal) = call_argument(statement, "throw new Error(") {
            let message: String = serde_json::from_str(literal).unwrap_or_default();
            let thrown = Thrown::error(Some(unit), &message).with_stack(format!(
                "Error: {}\n    at {}:{}:{}",
                message, unit, line, column
            ));
            return Some(EvalEvent::Thrown(thrown));
        }

        if let Some(literal) = call_argument(statement, "fail_in_dependency(") {
            let message: String = serde_json::from_str(literal).unwrap_or_default();
            let thrown = Thrown::error(Some(unit), &message).with_stack(format!(
                "Error: {}\n    at helper (/lib/dependency.js:10:3)",
                message
            ));
            return Some(EvalEvent::Thrown(thrown));
        }

        if let Some(value) = statement.strip_prefix("throw ") {
            let mut thrown = Thrown::error(Some(unit), value.trim_end_matches(';'));
            thrown.is_error = false;
            thrown.name = None;
            return Some(EvalEvent::Thrown(thrown));
        }

        None
    }
}

/// The text between `open` and the closing `);`.
fn call_argument<'a>(statement: &'a str, open: &str) -> Option<&'a str> {
    statement.strip_prefix(open)?.strip_suffix(");")
}

impl Evaluator for ScriptedEvaluator {
    async fn eval(
        &mut self,
        code: &str,
        _context: &SharedContext,
        unit: &str,
    ) -> esmrepl_eval::Result<()> {
        if self.sink.is_none() {
            return Err(esmrepl_eval::Error::RuntimeExited);
        }
        self.world
            .borrow_mut()
            .submissions
            .push((unit.to_string(), code.to_string()));
        if code.lines().any(|line| line.trim() == "hang();") {
            return Ok(());
        }
        let event = self.run(code, unit);
        self.emit(event);
        Ok(())
    }
}
