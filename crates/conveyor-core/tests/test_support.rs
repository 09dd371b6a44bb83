//! Shared test support utilities for integration tests

#![allow(dead_code)]

use conveyor_core::{
    Conversion, ObjectType, Record, TypeDescriptor, UnitState, Value,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Unit accepting a configurable type and forwarding its input
#[derive(Debug)]
pub struct Gate {
    accepts: TypeDescriptor,
    runs: Arc<AtomicUsize>,
    state: UnitState,
}

impl Gate {
    pub fn new(accepts: TypeDescriptor) -> Self {
        Self {
            accepts,
            runs: Arc::new(AtomicUsize::new(0)),
            state: UnitState::new(),
        }
    }

    /// Counter of transform calls, shared with shallow copies
    pub fn runs(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.runs)
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Conversion for Gate {
    fn id(&self) -> &'static str {
        "gate"
    }

    fn accepts(&self) -> TypeDescriptor {
        self.accepts.clone()
    }

    fn generates(&self) -> TypeDescriptor {
        self.accepts.clone()
    }

    fn state(&self) -> &UnitState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut UnitState {
        &mut self.state
    }

    fn transform(&mut self, input: Value) -> anyhow::Result<Value> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(input)
    }

    fn shallow_copy(&self) -> Box<dyn Conversion> {
        Box::new(Gate {
            accepts: self.accepts.clone(),
            runs: self.runs(),
            state: UnitState::new(),
        })
    }
}

/// Object with `scalars` integer properties and a list property holding
/// `elements` integers
pub fn flat_record(scalars: usize, elements: usize) -> Value {
    let record = (0..scalars).fold(Record::new(ObjectType::new("Flat")), |record, i| {
        record.with(format!("f{}", i), TypeDescriptor::Integer, i as i64)
    });
    let items: Vec<Value> = (0..elements).map(|i| Value::from(i as i64)).collect();
    record.with("items", TypeDescriptor::List, items).into()
}

/// Nodes a complete traversal of `value` visits, computed through the bean API
pub fn expected_nodes(value: &Value) -> usize {
    1 + child_nodes(value)
}

fn child_nodes(value: &Value) -> usize {
    let Some(object) = value.as_object() else {
        return 0;
    };
    object
        .properties()
        .into_iter()
        .filter(|p| p.readable)
        .map(|p| match object.read(&p.name) {
            Ok(Value::Null) | Err(_) => 0,
            Ok(v) => match v.elements() {
                Some(items) => items.iter().map(expected_nodes).sum(),
                None => expected_nodes(&v),
            },
        })
        .sum()
}

/// Configuration document used across tests
pub fn experiment() -> Value {
    Value::parse_json(
        r#"{
            "name": "baseline",
            "seed": 42,
            "classifier": {"type": "ridge", "ridge": 1e-8, "iterations": 100},
            "folds": [
                {"train": 0.8, "test": 0.2},
                {"train": 0.7, "test": 0.3}
            ],
            "tags": ["fast", null, "stable"]
        }"#,
    )
    .unwrap()
}

/// Strategy for scalar values
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
    ]
}

/// Strategy for acyclic object graphs of records and lists
pub fn graph_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            proptest::collection::vec((field_name_strategy(), inner), 0..5).prop_map(|fields| {
                let record = fields.into_iter().fold(
                    Record::new(ObjectType::new("Node")),
                    |record, (name, value)| record.with(name, TypeDescriptor::Unknown, value),
                );
                Value::object(record)
            }),
        ]
    })
}

/// Property names, including ones that need quoting in a path
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,6}",
        1 => "[a-z.\\[\\]\"]{0,4}",
    ]
}

/// Strategy for a graph whose root is always an object
pub fn object_root_strategy() -> impl Strategy<Value = Value> {
    proptest::collection::vec((field_name_strategy(), graph_strategy()), 0..5).prop_map(|fields| {
        let record = fields.into_iter().fold(
            Record::new(ObjectType::new("Root")),
            |record, (name, value)| record.with(name, TypeDescriptor::Unknown, value),
        );
        Value::object(record)
    })
}
