//! Tests for the traversal engine

use super::*;
use crate::types::ObjectType;
use crate::value::{Array, Bean, PropertyDescriptor, Record};

/// Bean whose `broken` getter always fails
#[derive(Debug, Clone)]
struct Flaky {
    inner: Value,
}

impl Bean for Flaky {
    fn object_type(&self) -> ObjectType {
        ObjectType::new("Flaky")
    }

    fn properties(&self) -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::new("broken", TypeDescriptor::Text),
            PropertyDescriptor::new("inner", TypeDescriptor::any_object()),
        ]
    }

    fn read(&self, name: &str) -> Result<Value, AccessError> {
        match name {
            "broken" => Err(AccessError::failed("sensor offline")),
            "inner" => Ok(self.inner.clone()),
            _ => Err(AccessError::UnknownProperty {
                name: name.to_string(),
            }),
        }
    }

    fn write(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        match name {
            "inner" => {
                self.inner = value;
                Ok(())
            }
            _ => Err(AccessError::NotWritable {
                name: name.to_string(),
            }),
        }
    }

    fn deep_copy(&self) -> Box<dyn Bean> {
        Box::new(Flaky {
            inner: self.inner.deep_copy(),
        })
    }
}

fn leaf(name: &str, weight: f64) -> Record {
    Record::new(ObjectType::new("Leaf"))
        .with("name", TypeDescriptor::Text, name)
        .with("weight", TypeDescriptor::Float, weight)
}

/// Root with 3 scalar properties, 1 nested object and 3 elements:
/// `label`, `inner`, `inner.name`, `inner.weight`, `scores[0..2]`, `skipped` (null)
fn tree() -> Value {
    let scores = Array::new(TypeDescriptor::Integer, vec![1.into(), 2.into(), 3.into()]).unwrap();
    Record::new(ObjectType::new("Tree"))
        .with("label", TypeDescriptor::Text, "root")
        .with("inner", TypeDescriptor::any_object(), leaf("a", 0.5))
        .with("scores", TypeDescriptor::array_of(TypeDescriptor::Integer), scores)
        .with("skipped", TypeDescriptor::Text, Value::Null)
        .into()
}

fn paths(root: &Value) -> Vec<String> {
    Traverser::new()
        .collect_paths(root)
        .unwrap()
        .into_iter()
        .map(|(path, _)| path.to_string())
        .collect()
}

#[test]
fn test_visits_every_node_once_in_order() {
    assert_eq!(
        paths(&tree()),
        vec![
            "",
            "label",
            "inner",
            "inner.name",
            "inner.weight",
            "scores[0]",
            "scores[1]",
            "scores[2]",
        ]
    );
}

#[test]
fn test_report_counts_root_properties_and_elements() {
    let mut observer = |_: &Node| Visit::Continue;
    let report = Traverser::new().traverse(&tree(), &mut observer).unwrap();
    // 4 non-null properties + 3 elements + root
    assert_eq!(report.visited, 8);
    assert!(report.is_complete());
}

#[test]
fn test_node_metadata() {
    let root = tree();
    let mut seen = Vec::new();
    let mut observer = |node: &Node| {
        seen.push((
            node.path().to_string(),
            node.property().map(|p| p.name.clone()),
            node.parent().map(|p| p.object_type().name().to_string()),
            node.is_element(),
            node.depth(),
        ));
        Visit::Continue
    };
    Traverser::new().traverse(&root, &mut observer).unwrap();

    assert_eq!(seen[0], (String::new(), None, None, false, 0));
    assert_eq!(
        seen[3],
        (
            "inner.name".to_string(),
            Some("name".to_string()),
            Some("Leaf".to_string()),
            false,
            2
        )
    );
    assert_eq!(
        seen[6],
        (
            "scores[1]".to_string(),
            Some("scores".to_string()),
            Some("Tree".to_string()),
            true,
            1
        )
    );
}

#[test]
fn test_skip_children() {
    let mut observer = |node: &Node| {
        if node.path().to_string() == "inner" {
            Visit::SkipChildren
        } else {
            Visit::Continue
        }
    };
    let report = Traverser::new().traverse(&tree(), &mut observer).unwrap();
    assert_eq!(report.visited, 6);
}

#[test]
fn test_list_elements_are_indexed() {
    let root: Value = Record::new(ObjectType::new("Holder"))
        .with(
            "items",
            TypeDescriptor::List,
            vec![Value::from(leaf("x", 1.0)), Value::Null, Value::text("t")],
        )
        .into();
    assert_eq!(
        paths(&root),
        vec!["", "items[0]", "items[0].name", "items[0].weight", "items[1]", "items[2]"]
    );
}

#[test]
fn test_read_failures_are_reported_not_fatal() {
    let root = Value::object(Flaky {
        inner: leaf("b", 2.0).into(),
    });
    let mut observer = |_: &Node| Visit::Continue;
    let report = Traverser::new().traverse(&root, &mut observer).unwrap();

    assert_eq!(report.visited, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path.to_string(), "broken");
    assert_eq!(report.failures[0].error, AccessError::failed("sensor offline"));
    assert!(!report.is_complete());
}

#[test]
fn test_write_only_properties_are_not_visited() {
    let root: Value = Record::new(ObjectType::new("Secretive"))
        .with_field(
            PropertyDescriptor::new("token", TypeDescriptor::Text).write_only(),
            "s3cr3t",
        )
        .into();
    assert_eq!(paths(&root), vec![""]);
}

#[test]
fn test_scalar_root() {
    assert_eq!(paths(&Value::from(5)), vec![""]);
}

#[test]
fn test_traverser_is_single_use() {
    let root = tree();
    let mut observer = |_: &Node| Visit::Continue;
    let mut traverser = Traverser::new();
    assert_eq!(traverser.state(), TraversalState::Idle);

    traverser.traverse(&root, &mut observer).unwrap();
    assert_eq!(traverser.state(), TraversalState::Done);
    assert_eq!(
        traverser.traverse(&root, &mut observer),
        Err(TraversalError::AlreadyUsed)
    );

    traverser.reset();
    assert!(traverser.traverse(&root, &mut observer).is_ok());
}

#[test]
fn test_cycle_detection() {
    let a = ObjectRef::new(
        Record::new(ObjectType::new("Link"))
            .with("id", TypeDescriptor::Integer, 1)
            .with("next", TypeDescriptor::any_object(), Value::Null),
    );
    let b = ObjectRef::new(
        Record::new(ObjectType::new("Link"))
            .with("id", TypeDescriptor::Integer, 2)
            .with("next", TypeDescriptor::any_object(), Value::Object(a.clone())),
    );
    a.write("next", Value::Object(b)).unwrap();

    let root = Value::Object(a);
    let report = Traverser::new()
        .with_cycle_detection(true)
        .traverse(&root, &mut |_: &Node| Visit::Continue)
        .unwrap();

    // a, a.id, a.next (b), b.id; b.next is a again
    assert_eq!(report.visited, 4);
    assert_eq!(report.skipped_cycles, 1);
}

#[test]
fn test_shared_objects_without_cycles_are_visited_per_path() {
    let shared = Value::from(leaf("s", 1.0));
    let root: Value = Record::new(ObjectType::new("Pair"))
        .with("left", TypeDescriptor::any_object(), shared.clone())
        .with("right", TypeDescriptor::any_object(), shared)
        .into();
    assert_eq!(paths(&root).len(), 7);
}

#[test]
fn test_cycle_detection_still_visits_shared_objects() {
    let shared = Value::from(leaf("s", 1.0));
    let root: Value = Record::new(ObjectType::new("Pair"))
        .with("left", TypeDescriptor::any_object(), shared.clone())
        .with("right", TypeDescriptor::any_object(), shared)
        .into();

    let mut seen = Vec::new();
    let report = Traverser::new()
        .with_cycle_detection(true)
        .traverse(&root, &mut |node: &Node| {
            seen.push(node.path().to_string());
            Visit::Continue
        })
        .unwrap();

    assert_eq!(
        seen,
        vec!["", "left", "left.name", "left.weight", "right", "right.name", "right.weight"]
    );
    assert_eq!(report.skipped_cycles, 0);
}

#[test]
fn test_write_back_scalar_and_element() {
    let root = tree();
    let mut nodes = Vec::new();
    let mut observer = |node: &Node| {
        nodes.push(node.clone());
        Visit::Continue
    };
    Traverser::new().traverse(&root, &mut observer).unwrap();

    let label = nodes.iter().find(|n| n.path().to_string() == "label").unwrap();
    label.write_back(Value::text("renamed")).unwrap();

    let score = nodes.iter().find(|n| n.path().to_string() == "scores[2]").unwrap();
    write_back(score, Value::from(30)).unwrap();
    assert!(write_back(score, Value::text("x")).is_err());

    assert!(nodes[0].write_back(Value::Null).is_err());

    let object = root.as_object().unwrap();
    assert_eq!(object.read("label").unwrap(), Value::text("renamed"));
    assert_eq!(
        object.read("scores").unwrap().elements().unwrap()[2],
        Value::Integer(30)
    );
}
