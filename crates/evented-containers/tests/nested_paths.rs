use std::sync::{Arc, Mutex};

use evented_containers::{ElementType, NestableEventedList, NestedEvent, NestedValue, Node, INSERTED, MOVED, REMOVED};
use evented_emitter::{Callback, ErrorKind, Event};
use serde_json::{json, Value};

type Recorded = Arc<Mutex<Vec<(String, Vec<usize>, Value)>>>;

/// Records `(kind, index path, serialized fields)` for every event on `list`.
fn record(list: &NestableEventedList<Value>) -> Recorded {
    let log: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    list.events()
        .connect_all(&Callback::new(move |ev: &Event<NestedEvent<Value>>| {
            let index = ev.payload().index().cloned().unwrap_or_default();
            let fields = Value::Object(ev.fields().unwrap());
            sink.lock().unwrap().push((ev.kind().to_string(), index, fields));
        }));
    log
}

fn leaf(v: Value) -> Node<Value> {
    Node::Leaf(v)
}

fn group(nodes: Vec<Node<Value>>) -> Node<Value> {
    Node::Group(NestableEventedList::from_nodes(nodes))
}

/// `[1, [2, [3, 4]], [5]]`
fn tree() -> NestableEventedList<Value> {
    NestableEventedList::with_nodes(
        ElementType::integer(),
        vec![
            leaf(json!(1)),
            group(vec![leaf(json!(2)), group(vec![leaf(json!(3)), leaf(json!(4))])]),
            group(vec![leaf(json!(5))]),
        ],
    )
    .unwrap()
}

#[test]
fn insert_then_get_round_trips_at_every_depth() {
    let mut tree = tree();
    for path in [vec![0isize], vec![1, 0], vec![1, 1, 2], vec![2, -1]] {
        let at = tree.insert(&path, leaf(json!(42))).unwrap();
        let resolved: Vec<isize> = at.iter().map(|&i| i as isize).collect();
        assert_eq!(tree.get(&resolved).unwrap().as_leaf(), Some(&json!(42)), "path {path:?}");
        tree.remove(&resolved).unwrap();
    }
    assert_eq!(tree.snapshot(), self::tree().snapshot());
}

#[test]
fn root_sees_descendant_events_as_named_fields() {
    let mut tree = tree();
    let log = record(&tree);
    tree.insert(&[1, 1, 0], leaf(json!(9))).unwrap();
    tree.remove(&[2]).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4);
    assert_eq!(log[1], (INSERTED.to_string(), vec![1, 1, 0], json!({"index": [1, 1, 0], "value": 9})));
    assert_eq!(log[3], (REMOVED.to_string(), vec![2], json!({"index": [2], "value": [5]})));
}

#[test]
fn cross_group_move_keeps_value_and_emits_one_moved() {
    let mut tree = tree();
    let log = record(&tree);
    let original = tree.get(&[1, 1, 1]).unwrap().snapshot();

    assert!(tree.move_item(&[1, 1, 1], &[2, 0]).unwrap());

    assert_eq!(tree.get(&[2, 0]).unwrap().snapshot(), original);
    let log = log.lock().unwrap();
    let kinds: Vec<&str> = log.iter().map(|(k, _, _)| k.as_str()).collect();
    assert_eq!(kinds, vec!["moving", MOVED]);
    assert_eq!(log[1].2, json!({"index": [1, 1, 1], "new_index": [2, 0], "value": 4}));
}

#[test]
fn moving_a_group_carries_its_subtree() {
    let mut tree = tree();
    tree.move_item(&[1, 1], &[-1]).unwrap();
    assert_eq!(
        tree.snapshot(),
        vec![
            NestedValue::Leaf(json!(1)),
            NestedValue::Group(vec![NestedValue::Leaf(json!(2))]),
            NestedValue::Group(vec![NestedValue::Leaf(json!(5))]),
            NestedValue::Group(vec![NestedValue::Leaf(json!(3)), NestedValue::Leaf(json!(4))]),
        ]
    );
    let log = record(&tree);
    tree.group_mut(&[3]).unwrap().push(leaf(json!(6))).unwrap();
    assert_eq!(log.lock().unwrap()[1].1, vec![3, 2]);
}

#[test]
fn type_violations_leave_the_tree_unchanged() {
    let mut tree = tree();
    let before = tree.snapshot();
    let err = tree.insert(&[1, 1, 0], leaf(json!("x"))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = tree.set(&[2, 0], group(vec![leaf(json!(null))])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.leaf_paths().len(), 5);
}

#[test]
fn listener_on_middle_group_sees_relative_paths() {
    let mut tree = tree();
    let middle = record(tree.group(&[1]).unwrap());
    let root = record(&tree);
    tree.set(&[1, 1, 0], leaf(json!(30))).unwrap();
    assert_eq!(middle.lock().unwrap()[0].1, vec![1, 0]);
    assert_eq!(root.lock().unwrap()[0].1, vec![1, 1, 0]);
    assert_eq!(
        root.lock().unwrap()[0].2,
        json!({"index": [1, 1, 0], "old_value": 3, "new_value": 30})
    );
}

#[test]
fn removed_then_reinserted_group_reports_new_position() {
    let mut tree = tree();
    let Node::Group(child) = tree.remove(&[2]).unwrap() else {
        panic!("expected a group");
    };
    tree.insert(&[0], Node::Group(child)).unwrap();
    let log = record(&tree);
    tree.insert(&[0, 0], leaf(json!(0))).unwrap();
    assert_eq!(
        *log.lock().unwrap().last().unwrap(),
        (INSERTED.to_string(), vec![0, 0], json!({"index": [0, 0], "value": 0}))
    );
    assert!(matches!(
        log.lock().unwrap()[0].2,
        Value::Object(ref m) if m.len() == 1
    ));
}
