use std::sync::{Arc, Mutex};

use evented_containers::{ElementType, EventedList, FlatEvent, ListEvent};
use evented_emitter::{Callback, Event};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(isize, i32),
    Remove(isize),
    Move(isize, isize),
    Set(isize, i32),
    Extend(Vec<i32>),
    RemoveRange(usize, usize),
    Reverse,
    Sort,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-8isize..8, -50i32..50).prop_map(|(i, v)| Op::Insert(i, v)),
        (-8isize..8).prop_map(Op::Remove),
        (-8isize..8, -8isize..8).prop_map(|(i, j)| Op::Move(i, j)),
        (-8isize..8, -50i32..50).prop_map(|(i, v)| Op::Set(i, v)),
        prop::collection::vec(-50i32..50, 0..4).prop_map(Op::Extend),
        (0usize..6, 0usize..6).prop_map(|(a, b)| Op::RemoveRange(a.min(b), a.max(b))),
        Just(Op::Reverse),
        Just(Op::Sort),
    ]
}

fn apply(list: &mut EventedList<i32>, op: &Op) -> bool {
    match op {
        Op::Insert(i, v) => list.insert(*i, *v).is_ok(),
        Op::Remove(i) => list.remove(*i).is_ok(),
        Op::Move(i, j) => list.move_item(*i, *j).is_ok(),
        Op::Set(i, v) => list.set(*i, *v).is_ok(),
        Op::Extend(values) => list.extend(values.clone()).is_ok(),
        Op::RemoveRange(a, b) => list.remove_range(*a..*b).is_ok(),
        Op::Reverse => list.reverse().is_ok(),
        Op::Sort => list.sort_by(|a, b| a.cmp(b)).is_ok(),
    }
}

/// Rebuilds a plain `Vec` from post-events alone.
fn replay(initial: &[i32], events: &[FlatEvent<i32>]) -> Vec<i32> {
    let mut out = initial.to_vec();
    for ev in events {
        match ev {
            ListEvent::Inserted { index, value } => out.insert(*index, *value),
            ListEvent::Removed { index, value } => {
                assert_eq!(out.remove(*index), *value);
            }
            ListEvent::Moved { index, new_index, value } => {
                let moved = out.remove(*index);
                assert_eq!(moved, *value);
                out.insert(*new_index, moved);
            }
            ListEvent::Changed { index, old_value, new_value } => {
                assert_eq!(out[*index], *old_value);
                out[*index] = *new_value;
            }
            ListEvent::Reordered { value } => assert_eq!(&out, value),
            ListEvent::Inserting { .. } | ListEvent::Removing { .. } | ListEvent::Moving { .. } => {}
        }
    }
    out
}

fn pairs_are_balanced(events: &[FlatEvent<i32>]) -> bool {
    let mut pending: Option<&FlatEvent<i32>> = None;
    for ev in events {
        if ev.is_pre_event() {
            if pending.is_some() {
                return false;
            }
            pending = Some(ev);
            continue;
        }
        if let Some(pre) = pending.take() {
            let matched = matches!(
                (pre, ev),
                (ListEvent::Inserting { .. }, ListEvent::Inserted { .. })
                    | (ListEvent::Removing { .. }, ListEvent::Removed { .. })
                    | (ListEvent::Moving { .. }, ListEvent::Moved { .. })
            );
            if !matched || pre.index() != ev.index() || pre.new_index() != ev.new_index() {
                return false;
            }
        }
    }
    pending.is_none()
}

proptest! {
    #[test]
    fn replaying_events_reproduces_the_list(
        initial in prop::collection::vec(-50i32..50, 0..6),
        ops in prop::collection::vec(op(), 0..24),
    ) {
        let mut list = EventedList::with_items(ElementType::any(), initial.clone()).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        list.events()
            .connect_all(&Callback::new(move |ev: &Event<FlatEvent<i32>>| {
                sink.lock().unwrap().push(ev.payload().clone());
            }));

        for op in &ops {
            let before = list.to_vec();
            let logged = log.lock().unwrap().len();
            if !apply(&mut list, op) {
                // failed calls change nothing and announce nothing
                prop_assert_eq!(list.to_vec(), before);
                prop_assert_eq!(log.lock().unwrap().len(), logged);
            }
        }

        let events = log.lock().unwrap().clone();
        prop_assert_eq!(replay(&initial, &events), list.to_vec());
        prop_assert!(pairs_are_balanced(&events));
    }
}
