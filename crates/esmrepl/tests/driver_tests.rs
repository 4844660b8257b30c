mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::{world, ScriptedEvaluator, SharedWorld};
use esmrepl::{argv_prelude, Driver, LoadError};
use esmrepl_eval::SharedContext;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn driver(world: &SharedWorld, dir: &Path) -> Driver<ScriptedEvaluator> {
    let (evaluator, listener) = ScriptedEvaluator::session(world);
    Driver::new(evaluator, listener, SharedContext::global(), dir)
}

const A: &str = "export const answer = 42;\n";
const B: &str = "// uses a.js\nconst local = 1;\nuse(answer);\n";

#[tokio::test]
async fn test_files_load_in_order_into_shared_scope() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.js", A);
    let b = write(dir.path(), "b.js", B);
    let world = world();
    let mut driver = driver(&world, dir.path());

    driver.load_all(&[a.clone(), b.clone()]).await.unwrap();

    let world = world.borrow();
    assert!(world.globals.contains("answer"));
    assert!(world.globals.contains("local"));
    assert_eq!(world.submissions.len(), 2);

    let (unit, code) = &world.submissions[0];
    assert!(unit.starts_with("REPL_"));
    assert_eq!(code.lines().next(), Some(""));
    assert_eq!(code.lines().nth(1), Some("const answer = 42;"));
    assert!(code.trim_end().ends_with(&format!(
        "throw new Error(\"success_{}\");",
        unit.trim_start_matches("REPL_")
    )));

    assert_eq!(driver.current().file(), Some(b.as_path()));
}

#[tokio::test]
async fn test_failure_is_reported_against_the_file() {
    let dir = TempDir::new().unwrap();
    let b = write(dir.path(), "b.js", B);
    let world = world();
    let mut driver = driver(&world, dir.path());

    let err = driver.load_all(&[b.clone()]).await.unwrap_err();
    match &err {
        LoadError::Attributed {
            path, line, column, ..
        } => {
            assert_eq!(path, &b.display().to_string());
            assert_eq!(*line, 3);
            assert_eq!(*column, 1);
        }
        other => panic!("expected attributed error, got {other:?}"),
    }

    let report = err.to_string();
    assert!(report.starts_with("ReferenceError: answer is not defined"));
    assert!(report.contains(&format!("at {}:3:1", b.display())));
}

#[tokio::test]
async fn test_program_prelude_keeps_line_numbers() {
    let dir = TempDir::new().unwrap();
    let b = write(dir.path(), "prog.js", B);
    let world = world();
    let mut driver = driver(&world, dir.path());

    let prelude = argv_prelude("prog.js", &["--flag".to_string()]);
    let err = driver.load_file(&b, &prelude).await.unwrap_err();
    assert!(matches!(err, LoadError::Attributed { line: 3, .. }));

    let world = world.borrow();
    let (_, code) = &world.submissions[0];
    assert_eq!(code.lines().next(), Some(prelude.as_str()));
}

#[tokio::test]
async fn test_loading_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let b = write(dir.path(), "b.js", B);
    let a = write(dir.path(), "a.js", A);
    let world = world();
    let mut driver = driver(&world, dir.path());

    assert!(driver.load_all(&[b, a]).await.is_err());
    assert_eq!(world.borrow().submissions.len(), 1);
    assert!(!world.borrow().globals.contains("answer"));
}

#[tokio::test]
async fn test_syntax_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let bad = write(dir.path(), "bad.js", "const ok = 1;\nlet = ;\n");
    let world = world();
    let mut driver = driver(&world, dir.path());

    let err = driver.load_all(&[bad.clone()]).await.unwrap_err();
    assert!(matches!(err, LoadError::Syntax(_)));
    assert!(err.to_string().contains(&bad.display().to_string()));
    assert!(world.borrow().submissions.is_empty());
}

#[tokio::test]
async fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let world = world();
    let mut driver = driver(&world, dir.path());

    let err = driver
        .load_all(&[dir.path().join("missing.js")])
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert!(err.to_string().contains("missing.js"));
}

#[tokio::test]
async fn test_failure_outside_the_file() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "dep.js", "fail_in_dependency(\"boom\");\n");
    let world = world();
    let mut driver = driver(&world, dir.path());

    match driver.load_all(&[file]).await.unwrap_err() {
        LoadError::Unattributed { message, stack } => {
            assert_eq!(message, "boom");
            assert!(stack.unwrap().contains("/lib/dependency.js:10:3"));
        }
        other => panic!("expected unattributed error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_thrown_non_error_value() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "value.js", "throw 42;\n");
    let world = world();
    let mut driver = driver(&world, dir.path());

    let err = driver.load_all(&[file]).await.unwrap_err();
    assert_eq!(err.to_string(), "42");
}

#[tokio::test]
async fn test_runtime_gone() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.js", A);
    let world = world();
    let (mut evaluator, listener) = ScriptedEvaluator::session(&world);
    evaluator.crash();
    let mut driver = Driver::new(evaluator, listener, SharedContext::global(), dir.path());

    let err = driver.load_all(&[a]).await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Runtime(esmrepl_eval::Error::RuntimeExited)
    ));
}

#[tokio::test]
async fn test_location_globals_follow_last_file() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.js", A);
    let world = world();
    let mut driver = driver(&world, dir.path());

    driver.load_all(&[a.clone()]).await.unwrap();
    driver.seed_location_globals().await.unwrap();

    let world = world.borrow();
    let (_, code) = world.submissions.last().unwrap();
    let filename = serde_json::Value::String(a.display().to_string()).to_string();
    assert!(code.contains(&format!("globalThis.__filename = {};", filename)));
    assert!(code.contains("typeof __dirname === \"undefined\""));
}

#[tokio::test]
async fn test_location_globals_without_files() {
    let dir = TempDir::new().unwrap();
    let world = world();
    let mut driver = driver(&world, dir.path());

    driver.seed_location_globals().await.unwrap();
    let (_, code) = world.borrow().submissions[0].clone();
    assert!(code.contains("globalThis.__filename = undefined;"));
    assert!(driver.current().file().is_none());
}
