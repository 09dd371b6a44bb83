//! Tests for unit execution and chain composition
//!
//! Copyright (c) 2025 Conveyor Team
//! Licensed under the Apache-2.0 license

use super::built_in::{Case, ChangeCase, MovingAverage, NumberKind, PassThrough, StringToNumber};
use super::*;
use crate::types::ObjectType;
use crate::value::Record;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Unit with configurable types that counts its transforms
#[derive(Debug)]
struct Recorder {
    accepts: TypeDescriptor,
    generates: TypeDescriptor,
    runs: Arc<AtomicUsize>,
    resets: Arc<AtomicUsize>,
    streaming: bool,
    fail: bool,
    state: UnitState,
}

impl Recorder {
    fn new(accepts: TypeDescriptor, generates: TypeDescriptor) -> Self {
        Self {
            accepts,
            generates,
            runs: Arc::new(AtomicUsize::new(0)),
            resets: Arc::new(AtomicUsize::new(0)),
            streaming: false,
            fail: false,
            state: UnitState::new(),
        }
    }

    fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn runs(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.runs)
    }

    fn resets(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.resets)
    }
}

impl Conversion for Recorder {
    fn id(&self) -> &'static str {
        "recorder"
    }

    fn accepts(&self) -> TypeDescriptor {
        self.accepts.clone()
    }

    fn generates(&self) -> TypeDescriptor {
        self.generates.clone()
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("recorder told to fail");
        }
        Ok(input)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(Recorder {
            accepts: self.accepts.clone(),
            generates: self.generates.clone(),
            runs: self.runs(),
            resets: self.resets(),
            streaming: self.streaming,
            fail: self.fail,
            state: UnitState::new(),
        })
    }
}

/// Stops its own chain from inside a stage
#[derive(Debug)]
struct StopChain {
    chain: StopHandle,
    state: UnitState,
}

impl Conversion for StopChain {
    fn id(&self) -> &'static str {
        "stop-chain"
    }

    fn accepts(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn generates(&self) -> TypeDescriptor {
        TypeDescriptor::Unknown
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        self.chain.stop();
        Ok(input)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(StopChain {
            chain: self.chain.clone(),
            state: UnitState::new(),
        })
    }
}

struct Flow;

impl Owner for Flow {
    fn name(&self) -> String {
        "flow".to_string()
    }
}

#[test]
fn test_missing_input_is_rejected() {
    let mut unit = PassThrough::new();
    let diagnostic = unit.convert().unwrap_err();
    assert_eq!(
        diagnostic,
        Diagnostic::InputValidation {
            message: "No input provided".to_string()
        }
    );

    unit.set_input(Value::Null);
    assert_eq!(unit.convert().unwrap_err().kind(), DiagnosticKind::InputValidation);
}

#[test]
fn test_type_gate_never_runs_transform() {
    let recorder = Recorder::new(TypeDescriptor::Text, TypeDescriptor::Text);
    let runs = recorder.runs();
    let mut unit = recorder;

    unit.set_input(Value::from(1));
    let diagnostic = unit.convert().unwrap_err();
    assert_eq!(diagnostic.kind(), DiagnosticKind::InputValidation);
    assert!(diagnostic.to_string().contains("integer"));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(unit.output().is_none());
}

#[test]
fn test_type_gate_accepts_subtypes() {
    let shape = ObjectType::new("Shape");
    let circle = ObjectType::extending("Circle", &shape);
    let mut unit = Recorder::new(TypeDescriptor::object(&shape), TypeDescriptor::Unknown);

    unit.set_input(Record::new(circle).into());
    unit.convert().unwrap();

    unit.set_input(Record::new(ObjectType::new("Square")).into());
    assert!(unit.convert().is_err());
}

#[test]
fn test_failed_transform_clears_output() {
    let mut unit = StringToNumber::default();
    unit.set_input(Value::text("1"));
    unit.convert().unwrap();

    unit.state_mut().set_input(Value::text("x"));
    assert!(unit.convert().is_err());
    assert!(unit.output().is_none());
}

#[test]
fn test_transform_error_names_declared_types() {
    let mut unit = Recorder::new(TypeDescriptor::Text, TypeDescriptor::Float).failing();
    unit.set_input(Value::text("a"));
    match unit.convert().unwrap_err() {
        Diagnostic::Transform {
            message,
            accepts,
            generates,
        } => {
            assert_eq!(message, "recorder told to fail");
            assert_eq!(accepts, TypeDescriptor::Text);
            assert_eq!(generates, TypeDescriptor::Float);
        }
        other => panic!("unexpected diagnostic: {}", other),
    }
}

#[test]
fn test_set_input_resets_stateless_units_only() {
    let stateless = Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Unknown);
    let stateless_resets = stateless.resets();
    let mut stateless = stateless;

    let streaming = Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Unknown).streaming();
    let streaming_resets = streaming.resets();
    let mut streaming = streaming;

    for unit in [&mut stateless as &mut dyn Conversion, &mut streaming] {
        unit.set_input(Value::from(1));
        unit.convert().unwrap();
        unit.set_input(Value::from(2));
        assert!(unit.output().is_none());
    }

    assert_eq!(stateless_resets.load(Ordering::SeqCst), 2);
    assert_eq!(streaming_resets.load(Ordering::SeqCst), 0);
}

#[test]
fn test_stop_request_is_cleared_by_convert() {
    let mut unit = PassThrough::new();
    unit.stop_execution();
    assert!(unit.is_stopped());

    unit.set_input(Value::from(1));
    unit.convert().unwrap();
    assert!(!unit.is_stopped());
}

#[test]
fn test_clean_up_is_idempotent() {
    let mut unit = PassThrough::new();
    unit.set_input(Value::from(1));
    unit.convert().unwrap();
    unit.clean_up();
    unit.clean_up();
    assert!(unit.input().is_none());
    assert!(unit.output().is_none());
}

#[test]
fn test_empty_chain_is_identity() {
    let mut chain = Chain::new();
    assert_eq!(chain.accepts(), TypeDescriptor::Unknown);
    assert_eq!(chain.generates(), TypeDescriptor::Unknown);

    let input = Value::from(vec![Value::from(1), Value::text("two")]);
    chain.set_input(input.clone());
    chain.convert().unwrap();
    assert_eq!(chain.output(), Some(&input));
}

#[test]
fn test_chain_runs_stages_in_order() {
    let mut chain = Chain::new()
        .with_stage(ChangeCase::new(Case::Upper))
        .with_stage(Recorder::new(TypeDescriptor::Text, TypeDescriptor::Text));

    assert_eq!(chain.accepts(), TypeDescriptor::Text);
    assert_eq!(chain.generates(), TypeDescriptor::Text);

    chain.set_input(Value::text("abc"));
    chain.convert().unwrap();
    assert_eq!(chain.output(), Some(&Value::text("ABC")));
}

#[test]
fn test_incompatible_chain_fails_before_any_stage_runs() {
    let first = Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Integer);
    let second = Recorder::new(TypeDescriptor::Text, TypeDescriptor::Text);
    let first_runs = first.runs();
    let second_runs = second.runs();

    let mut chain = Chain::new().with_stage(first).with_stage(second);
    chain.set_input(Value::from(1));
    let diagnostic = chain.convert().unwrap_err();

    assert_eq!(diagnostic.kind(), DiagnosticKind::Configuration);
    assert_eq!(
        diagnostic.to_string(),
        "Configuration error: stage 1 generates integer but stage 2 accepts string"
    );
    assert_eq!(first_runs.load(Ordering::SeqCst), 0);
    assert_eq!(second_runs.load(Ordering::SeqCst), 0);
    assert!(chain.output().is_none());
}

#[test]
fn test_wildcards_are_compatible() {
    let mut chain = Chain::new()
        .with_stage(PassThrough::new())
        .with_stage(StringToNumber::default())
        .with_stage(Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Unknown));
    assert!(chain.verify().is_ok());

    // integer is assignable to number
    let mut chain = Chain::new()
        .with_stage(StringToNumber::default())
        .with_stage(MovingAverage::new(2));
    assert!(chain.verify().is_ok());
}

#[test]
fn test_compatibility_verdict_is_memoized() {
    let mut chain = Chain::new()
        .with_stage(ChangeCase::default())
        .with_stage(StringToNumber::default());

    for input in ["1", "2", "3"] {
        chain.set_input(Value::text(input));
        chain.convert().unwrap();
    }
    assert_eq!(chain.compatibility_checks(), 1);

    chain.push(Box::new(PassThrough::new()));
    chain.set_input(Value::text("4"));
    chain.convert().unwrap();
    assert_eq!(chain.compatibility_checks(), 2);
}

#[test]
fn test_stage_failure_is_prefixed_with_index() {
    let mut chain = Chain::new()
        .with_stage(PassThrough::new())
        .with_stage(StringToNumber::default());

    chain.set_input(Value::text("not a number"));
    let diagnostic = chain.convert().unwrap_err();
    assert!(diagnostic.to_string().starts_with("Stage 2: "));
    assert_eq!(diagnostic.kind(), DiagnosticKind::Transform);
    assert_eq!(diagnostic.stage_trail(), vec![2]);
    assert!(chain.output().is_none());
}

#[test]
fn test_stage_failure_aborts_the_chain() {
    let failing = Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Unknown).failing();
    let after = Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Unknown);
    let after_runs = after.runs();

    let mut chain = Chain::new().with_stage(failing).with_stage(after);
    chain.set_input(Value::from(1));
    assert!(chain.convert().is_err());
    assert_eq!(after_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_nested_chain_diagnostics() {
    let inner = Chain::new()
        .with_stage(PassThrough::new())
        .with_stage(StringToNumber::new(NumberKind::Float));
    let mut outer = Chain::new().with_stage(ChangeCase::default()).with_stage(inner);

    outer.set_input(Value::text("abc"));
    let diagnostic = outer.convert().unwrap_err();
    assert!(diagnostic.to_string().starts_with("Stage 2: Stage 2: "));
    assert_eq!(diagnostic.kind(), DiagnosticKind::Transform);
}

#[test]
fn test_chain_associativity() {
    let build = || -> Vec<Box<dyn Conversion>> {
        vec![
            Box::new(ChangeCase::new(Case::Lower)),
            Box::new(StringToNumber::new(NumberKind::Number)),
            Box::new(MovingAverage::new(1)),
        ]
    };

    let mut flat = Chain::new();
    flat.set_stages(build());

    // (a b) c
    let mut stages = build().into_iter();
    let mut head = Chain::new();
    head.set_stages(stages.by_ref().take(2).collect());
    let mut left = Chain::new().with_stage(head);
    stages.for_each(|stage| left.push(stage));

    // a (b c)
    let mut stages = build().into_iter();
    let mut right = Chain::new();
    right.push(stages.next().unwrap());
    let mut tail = Chain::new();
    tail.set_stages(stages.collect());
    right.push(Box::new(tail));

    for input in ["3", "4.5", "-2"] {
        let mut outputs = Vec::new();
        for chain in [&mut flat, &mut left, &mut right] {
            chain.set_input(Value::text(input));
            chain.convert().unwrap();
            outputs.push(chain.output().cloned());
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }
}

#[test]
fn test_stop_is_honoured_between_stages() {
    let mut chain = Chain::new();
    let chain_handle = chain.stop_handle();
    let after = Recorder::new(TypeDescriptor::Unknown, TypeDescriptor::Unknown);
    let after_runs = after.runs();
    chain.push(Box::new(StopChain {
        chain: chain_handle,
        state: UnitState::new(),
    }));
    chain.push(Box::new(after));

    chain.set_input(Value::from(1));
    let diagnostic = chain.convert().unwrap_err();
    assert_eq!(diagnostic, Diagnostic::Stopped);
    assert_eq!(after_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_chain_stop_reaches_running_stage() {
    let mut chain = Chain::new().with_stage(PassThrough::new());
    chain.stop_handle().stop();
    assert!(chain.stages()[0].is_stopped());
}

#[test]
fn test_reconfiguration_resets_output() {
    let mut chain = Chain::new().with_stage(PassThrough::new());
    chain.set_input(Value::from(1));
    chain.convert().unwrap();
    assert!(chain.has_output());

    chain.push(Box::new(PassThrough::new()));
    assert!(!chain.has_output());

    chain.set_input(Value::from(1));
    chain.convert().unwrap();
    let _ = chain.stage_mut(0);
    assert!(!chain.has_output());
}

#[test]
fn test_owner_propagates_to_stages() {
    let owner: Arc<dyn Owner> = Arc::new(Flow);
    let mut chain = Chain::new().with_stage(PassThrough::new());
    chain.set_owner(&owner);
    assert_eq!(chain.stages()[0].owner().map(|o| o.name()), Some("flow".to_string()));

    // stages added later inherit the owner too
    chain.push(Box::new(PassThrough::new()));
    assert!(chain.stages()[1].owner().is_some());
}

#[test]
fn test_shallow_copy_has_fresh_state() {
    let mut chain = Chain::new()
        .with_stage(ChangeCase::default())
        .with_stage(StringToNumber::new(NumberKind::Float));
    chain.set_input(Value::text("1.5"));
    chain.convert().unwrap();

    let mut copy = chain.shallow_copy();
    assert!(copy.input().is_none());
    assert!(copy.output().is_none());
    assert_eq!(copy.accepts(), TypeDescriptor::Text);
    assert_eq!(copy.generates(), TypeDescriptor::Float);

    copy.set_input(Value::text("2"));
    copy.convert().unwrap();
    assert_eq!(copy.output(), Some(&Value::Float(2.0)));
    assert_eq!(chain.output(), Some(&Value::Float(1.5)));
}

#[test]
fn test_clean_up_reaches_stages() {
    let mut chain = Chain::new().with_stage(PassThrough::new());
    chain.set_input(Value::from(1));
    chain.convert().unwrap();
    chain.clean_up();
    assert!(chain.output().is_none());
    assert!(chain.stages()[0].input().is_none());
}
