//! Integration tests for the build pipeline
//!
//! Config resolution, entry points and compilation wired together through
//! `Builder`, with the compiler replaced by a scripted engine.

mod common;

use common::{create_project, handlers, paths, FakeEngine};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use tsbuild::{BuildError, Builder};
use tsbuild_config::ConfigError;

const TSCONFIG: &str = r#"{
    // project options
    "compilerOptions": {
        "target": "es2019",
        "rootDir": "./src",
        "outDir": "dist",
    },
}"#;

/// Logger that keeps every message it receives
fn recording_logger() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) + 'static) {
    let messages = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&messages);
    (messages, move |message: &str| {
        sink.borrow_mut().push(message.to_string())
    })
}

#[test]
fn test_build_compiles_handlers() {
    let project = create_project(&[
        ("tsconfig.json", TSCONFIG),
        ("src/users.ts", "export const get = () => 1;"),
        ("src/orders.ts", "export const list = () => 2;"),
    ]);
    let engine = FakeEngine::emitting(&["dist/orders.js", "dist/users.js", "dist/users.js.map"]);

    let context = Builder::new(project.path())
        .with_target("aws")
        .with_handlers(handlers(&[
            ("users", "src/users.get"),
            ("orders", "src/orders.list"),
        ]))
        .build(&engine)
        .unwrap();

    assert_eq!(context.entry_points, paths(&["src/orders.ts", "src/users.ts"]));
    assert_eq!(context.emitted, paths(&["dist/orders.js", "dist/users.js"]));
    assert_eq!(context.stats.entry_points, 2);
    assert_eq!(context.stats.emitted_files, 2);
    assert!(context.stats.total_time >= context.stats.compilation_time);

    let calls = engine.calls.borrow();
    assert_eq!(calls.len(), 1);
    let options = &calls[0].1;
    assert_eq!(options.get_str("target"), Some("es2019"));
    assert_eq!(options.root_dir(), project.path().to_str());
    assert!(options.list_emitted_files());
}

#[test]
fn test_build_without_config_uses_defaults() {
    let project = create_project(&[("handler.ts", "")]);
    let engine = FakeEngine::emitting(&["handler.js"]);

    let context = Builder::new(project.path())
        .with_handlers(handlers(&[("fn", "handler.main")]))
        .build(&engine)
        .unwrap();

    assert_eq!(context.options.get_str("target"), Some("es5"));
    assert_eq!(context.options.root_dir(), Some("./"));
}

#[test]
fn test_build_logs_root_dir_override_and_progress() {
    let project = create_project(&[("tsconfig.json", TSCONFIG), ("src/app.ts", "")]);
    let engine = FakeEngine::emitting(&["dist/app.js"]);
    let (messages, logger) = recording_logger();

    Builder::new(project.path())
        .with_target("aws")
        .with_handlers(handlers(&[("app", "src/app.main")]))
        .with_logger(logger)
        .with_verbose(true)
        .build(&engine)
        .unwrap();

    let messages = messages.borrow();
    assert!(messages[0].starts_with("Warning: \"rootDir\""), "{:?}", messages);
    assert!(messages.contains(&"Resolving entry points for target 'aws'".to_string()));
    assert!(messages.contains(&"Compiling 1 entry point".to_string()));
    assert!(messages.iter().any(|m| m.starts_with("Emitted 1 file in ")));
}

#[test]
fn test_quiet_build_logs_only_warnings() {
    let project = create_project(&[("tsconfig.json", TSCONFIG), ("src/app.ts", "")]);
    let engine = FakeEngine::emitting(&["dist/app.js"]);
    let (messages, logger) = recording_logger();

    Builder::new(project.path())
        .with_handlers(handlers(&[("app", "src/app.main")]))
        .with_logger(logger)
        .build(&engine)
        .unwrap();

    assert_eq!(messages.borrow().len(), 1);
}

#[test]
fn test_custom_config_file() {
    let project = create_project(&[
        ("tsconfig.build.json", r#"{"compilerOptions": {"target": "es2022"}}"#),
        ("src/app.ts", ""),
    ]);
    let engine = FakeEngine::emitting(&[]);

    let context = Builder::new(project.path())
        .with_config_file("tsconfig.build.json")
        .with_handlers(handlers(&[("app", "src/app.main")]))
        .build(&engine)
        .unwrap();

    assert_eq!(context.options.get_str("target"), Some("es2022"));
}

#[test]
fn test_config_error_stops_before_compile() {
    let project = create_project(&[
        ("tsconfig.json", "{ \"compilerOptions\": { \"target\": } }"),
        ("src/app.ts", ""),
    ]);
    let engine = FakeEngine::emitting(&[]);

    let result = Builder::new(project.path())
        .with_handlers(handlers(&[("app", "src/app.main")]))
        .build(&engine);

    assert!(
        matches!(result, Err(BuildError::Config(ConfigError::Parse { .. }))),
        "{:?}",
        result.map(|c| c.emitted)
    );
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_entry_point_error_stops_before_compile() {
    let project = create_project(&[]);
    let engine = FakeEngine::emitting(&[]);

    let result = Builder::new(project.path())
        .with_handlers(handlers(&[("app", "handler")]))
        .build(&engine);

    assert!(matches!(result, Err(BuildError::HandlerNameUnresolvable { .. })));
    assert_eq!(engine.call_count(), 0);
}

#[test]
fn test_google_build_uses_manifest() {
    let project = create_project(&[
        ("package.json", r#"{"main": "lib/index.js"}"#),
        ("lib/index.ts", ""),
    ]);
    let engine = FakeEngine::emitting(&["lib/index.js"]);

    let context = Builder::new(project.path())
        .with_target("google")
        .with_handlers(handlers(&[("ignored", "src/ignored.main")]))
        .build(&engine)
        .unwrap();

    assert_eq!(context.entry_points, paths(&["lib/index.ts"]));
}

#[test]
fn test_watch_files_lists_program() {
    let project = create_project(&[("src/app.ts", "")]);
    let engine = FakeEngine::listing(&["src/app.ts", "src/util.ts"]);

    let files = Builder::new(project.path())
        .with_handlers(handlers(&[("app", "src/app.main")]))
        .watch_files(&engine)
        .unwrap();

    assert_eq!(files, paths(&["src/app.ts", "src/util.ts"]));
    assert_eq!(engine.calls.borrow()[0].0, paths(&["src/app.ts"]));
}
