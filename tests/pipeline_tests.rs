//! End-to-end runs through the engine: registry, readers, scheduler, stores.

use std::sync::Arc;

use opfeed_core::config::{EngineConfig, ReaderKind};
use opfeed_core::prelude::{DataType, Describe, Field, Row, Scalar, Schema};
use opfeed_exec::{Engine, ExecError, FnOperator, OpError, Operator, OperatorSpec};
use opfeed_reader::{InputBundle, ReaderError};
use opfeed_store::ColumnStore;
use serde_json::json;

fn pairs_store(rows: &[(i64, i64)], sealed: bool) -> ColumnStore {
    let store = ColumnStore::new(Schema::new(vec![
        Field::new("a", DataType::Int64, false),
        Field::new("b", DataType::Int64, false),
    ]));
    for &(a, b) in rows {
        store.append(vec![Scalar::I64(a), Scalar::I64(b)]).unwrap();
    }
    if sealed {
        store.seal().unwrap();
    }
    store
}

fn single(name: &str) -> ColumnStore {
    ColumnStore::new(Schema::new(vec![Field::new(name, DataType::Int64, true)]))
}

fn ints(store: &ColumnStore, column: &str) -> Vec<i64> {
    store
        .column(column)
        .unwrap()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}

#[test]
fn test_chained_operators_drain_end_to_end() {
    let input = pairs_store(&[(1, 2), (3, 4), (5, 6), (7, 8)], true);
    let sums = single("sum");
    let out = single("s");

    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine
        .add_operator(
            OperatorSpec::new("builtin/add", &input)
                .args(json!({"left": "x", "right": "y"}))
                .input("x", "a")
                .input("y", "b")
                .output(&sums),
        )
        .unwrap();
    engine
        .add_operator(
            OperatorSpec::new("builtin/select", &sums)
                .args(json!({"outputs": ["s"]}))
                .input("s", "sum")
                .reader(ReaderKind::Batch { size: 2 })
                .output(&out),
        )
        .unwrap();

    let summary = engine.run().unwrap();
    assert!(summary.finished);
    assert_eq!(summary.tasks_executed, 8);
    assert_eq!(ints(&sums, "sum"), vec![3, 7, 11, 15]);
    assert_eq!(ints(&out, "s"), vec![3, 7, 11, 15]);
    assert!(sums.is_sealed().unwrap());
    assert!(out.is_sealed().unwrap());
}

#[test]
fn test_run_resumes_after_more_rows_arrive() {
    let input = pairs_store(&[(1, 1), (2, 2)], false);
    let out = single("sum");
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine
        .add_operator(
            OperatorSpec::new("builtin/add", &input)
                .input("a", "a")
                .input("b", "b")
                .output(&out),
        )
        .unwrap();

    let first = engine.run().unwrap();
    assert!(!first.finished);
    assert_eq!(ints(&out, "sum"), vec![2, 4]);
    assert!(!out.is_sealed().unwrap());

    input.append(vec![Scalar::I64(3), Scalar::I64(3)]).unwrap();
    input.seal().unwrap();
    let second = engine.run().unwrap();
    assert!(second.finished);
    assert_eq!(second.tasks_executed, 1);
    assert_eq!(ints(&out, "sum"), vec![2, 4, 6]);
}

#[test]
fn test_empty_rows_pass_through_as_empty_markers() {
    let input = pairs_store(&[(1, 2)], false);
    input.append_empty().unwrap();
    input.seal().unwrap();
    let out = single("n");

    let count: Arc<dyn Operator> = Arc::new(FnOperator::new("count-inputs", |b: &InputBundle| {
        if b.is_empty() {
            Ok(Row::empty())
        } else {
            Ok(Row::new(vec![Scalar::I64(b.len() as i64)]))
        }
    }));
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine
        .add_instance(
            OperatorSpec::new("local/count", &input)
                .input("a", "a")
                .input("b", "b")
                .output(&out),
            count,
        )
        .unwrap();
    assert!(engine.run().unwrap().finished);
    assert_eq!(out.len().unwrap(), 2);
    let rows = out.rows().unwrap();
    assert_eq!(rows[0], Row::new(vec![Scalar::I64(2)]));
    assert!(rows[1].is_empty());
}

#[test]
fn test_operator_failure_surfaces_with_its_key() {
    let input = pairs_store(&[(1, 2), (-1, 0)], true);
    let picky: Arc<dyn Operator> = Arc::new(FnOperator::new("picky", |b: &InputBundle| {
        match b["a"].as_i64() {
            Some(v) if v >= 0 => Ok(Row::new(vec![Scalar::I64(v)])),
            _ => Err(OpError::BadInput {
                name: "a".into(),
                reason: "negative".into(),
            }),
        }
    }));
    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine
        .add_instance(OperatorSpec::new("local/picky", &input).input("a", "a"), picky)
        .unwrap();
    match engine.run() {
        Err(ExecError::Operator { op, source }) => {
            assert_eq!(op, "local/picky");
            assert_eq!(source.to_string(), "input 'a': negative");
        }
        other => panic!("expected an operator failure, got {other:?}"),
    }
}

#[test]
fn test_binding_errors() {
    let input = pairs_store(&[], true);
    let mut engine = Engine::new(EngineConfig::default()).unwrap();

    let err = engine
        .add_operator(OperatorSpec::new("acme/resnet50", &input))
        .unwrap_err();
    assert!(matches!(err, ExecError::OperatorNotFound(ref f) if f == "acme/resnet50"));

    let err = engine
        .add_operator(
            OperatorSpec::new("builtin/select", &input)
                .args(json!({"outputs": ["z"]}))
                .input("z", "zeta"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ExecError::Reader(ReaderError::UnknownColumn { ref column, .. }) if column == "zeta"
    ));

    let sealed = single("x");
    sealed.seal().unwrap();
    let err = engine
        .add_operator(
            OperatorSpec::new("builtin/add", &input)
                .input("a", "a")
                .input("b", "b")
                .output(&sealed),
        )
        .unwrap_err();
    assert!(matches!(err, ExecError::Invalid(_)));
}

#[test]
fn test_output_store_has_a_single_producer() {
    let empty = pairs_store(&[], true);
    let busy = pairs_store(&[(1, 0), (2, 0), (3, 0)], true);
    let out = single("a");
    let select = || json!({"outputs": ["a"]});

    let mut engine = Engine::new(EngineConfig::default()).unwrap();
    engine
        .add_operator(
            OperatorSpec::new("builtin/select", &empty)
                .args(select())
                .input("a", "a")
                .output(&out),
        )
        .unwrap();
    let err = engine
        .add_operator(
            OperatorSpec::new("builtin/select", &busy)
                .args(select())
                .input("a", "a")
                .output(&out.clone()),
        )
        .unwrap_err();
    assert!(matches!(err, ExecError::Invalid(ref msg) if msg.contains("already written by OpId(0)")));

    // The rejected binding left nothing behind; the first producer still drains.
    assert_eq!(engine.scheduler().contexts().len(), 1);
    assert!(engine.run().unwrap().finished);
    assert_eq!(out.len().unwrap(), 0);
    assert!(out.is_sealed().unwrap());
}

#[test]
fn test_yaml_config_drives_default_reader() {
    let cfg = EngineConfig::from_yaml_str(
        "num_executors: 2\nmax_tasks_per_executor: 1\ndefault_reader:\n  kind: window\n  size: 2\n  step: 2\n",
    )
    .unwrap();
    assert_eq!(cfg.default_reader, ReaderKind::Window { size: 2, step: 2 });
    assert_eq!(cfg.tasks_per_step, 1);

    let input = pairs_store(&[(1, 0), (2, 0), (3, 0)], true);
    let out = single("a");
    let mut engine = Engine::new(cfg).unwrap();
    engine
        .add_operator(
            OperatorSpec::new("builtin/select", &input)
                .args(json!({"outputs": ["a"]}))
                .input("a", "a")
                .output(&out),
        )
        .unwrap();
    let summary = engine.run().unwrap();
    assert!(summary.finished);
    assert_eq!(ints(&out, "a"), vec![1, 2, 3]);

    let text = engine.serialize_repr();
    assert!(text.starts_with("Engine:\n"));
    assert!(text.contains("reader: window"));
    assert!(text.contains("state: exhausted"));
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(EngineConfig::from_yaml_str("num_executors: 0\n").is_err());
    let cfg = EngineConfig {
        tasks_per_step: 0,
        ..EngineConfig::default()
    };
    assert!(matches!(Engine::new(cfg), Err(ExecError::Config(_))));
}

#[test]
fn test_config_from_env() {
    std::env::set_var("OPFEED_NUM_EXECUTORS", "7");
    std::env::set_var("OPFEED_READER", "batch:16");
    std::env::set_var("OPFEED_MAX_IDLE_STEPS", "not-a-number");
    let cfg = EngineConfig::from_env();
    std::env::remove_var("OPFEED_NUM_EXECUTORS");
    std::env::remove_var("OPFEED_READER");
    std::env::remove_var("OPFEED_MAX_IDLE_STEPS");

    assert_eq!(cfg.num_executors, 7);
    assert_eq!(cfg.default_reader, ReaderKind::Batch { size: 16 });
    assert_eq!(cfg.max_idle_steps, EngineConfig::default().max_idle_steps);
}
