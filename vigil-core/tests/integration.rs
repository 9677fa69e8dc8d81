//! Integration Tests for Reactive System
//!
//! These tests verify that observation, registries, and watchers work
//! together correctly.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use vigil_core::reactive::{observe, reactive, set, List, Record, Value, Watcher};

fn counter() -> (Arc<AtomicI32>, impl Fn(&Value) + Send + Sync + 'static) {
    let hits = Arc::new(AtomicI32::new(0));
    let hits_clone = hits.clone();
    (hits, move |_: &Value| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    })
}

fn record_of(value: &Value) -> Record {
    value.as_record().expect("record").clone()
}

/// Assigning a property notifies its watcher; assigning the same value again
/// does not.
#[test]
fn scenario_a_count_watcher() {
    let x = reactive(Value::from_json(json!({"count": 0})));
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let _w = Watcher::new(&x, "count", move |v| sink.lock().push(v.clone())).unwrap();

    let record = record_of(&x);
    record.assign("count", 1);
    assert_eq!(*log.lock(), vec![Value::from(1)]);

    record.assign("count", 1);
    assert_eq!(*log.lock(), vec![Value::from(1)]);
}

/// Pushing onto an observed list notifies a watcher that read the list.
#[test]
fn scenario_b_list_push() {
    let arr = reactive(Value::List(List::from(vec![
        Value::from(1),
        Value::from(2),
        Value::from(3),
    ])));
    let (hits, sink) = counter();
    let _w = Watcher::new(&arr, "", sink).unwrap();

    let list = arr.as_list().unwrap().clone();
    list.push(4);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(list.get(3), Some(Value::from(4)));

    let pushed = Record::new();
    pushed.assign("c", 4);
    list.push(pushed.clone());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(pushed.is_observed());
    assert!(pushed.is_reactive("c"));
}

/// A key added by plain assignment after observation is not reactive.
#[test]
fn scenario_c_plain_new_key_is_inert() {
    let x = reactive(Value::from_json(json!({"count": 0})));
    let (hits, sink) = counter();
    let _root = Watcher::new(&x, "", sink).unwrap();
    let (late_hits, late_sink) = counter();
    let _late = Watcher::new(&x, "late", late_sink).unwrap();

    let record = record_of(&x);
    record.assign("late", 1);
    record.assign("late", 2);

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(late_hits.load(Ordering::SeqCst), 0);
    assert!(!record.is_reactive("late"));
}

/// `set` is the sanctioned way to add a reactive key.
#[test]
fn explicit_set_adds_reactive_key() {
    let x = reactive(Value::from_json(json!({})));
    let record = record_of(&x);

    set(&record, "dong", "dong");
    let (hits, sink) = counter();
    let _w = Watcher::new(&x, "dong", sink).unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    record.assign("dong", "ding");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Reading a key several times during one tracked read registers once.
#[test]
fn repeated_reads_register_once() {
    let x = reactive(Value::from_json(json!({"count": 0})));
    let record = record_of(&x);
    let reader = record.clone();
    let (hits, sink) = counter();

    let watcher = Watcher::with_accessor(
        move || {
            reader.get("count");
            reader.get("count");
            reader.get("count").unwrap_or_default()
        },
        sink,
    );
    assert_eq!(watcher.dependency_count(), 1);

    record.assign("count", 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Watchers on one key run once each, in the order they were created.
#[test]
fn notification_follows_registration_order() {
    let x = reactive(Value::from_json(json!({"count": 0})));
    let order = Arc::new(Mutex::new(Vec::new()));

    let watchers: Vec<Watcher> = (0..3)
        .map(|i| {
            let order = order.clone();
            Watcher::new(&x, "count", move |_| order.lock().push(i)).unwrap()
        })
        .collect();

    record_of(&x).assign("count", 5);
    assert_eq!(*order.lock(), vec![0, 1, 2]);
    assert!(watchers.iter().all(|w| w.update_count() == 1));
}

/// Each of the seven mutating operations notifies exactly once.
#[test]
fn every_list_mutation_notifies_once() {
    type Op = Box<dyn Fn(&List)>;
    fn op(f: impl Fn(&List) + 'static) -> Op {
        Box::new(f)
    }

    let operations: Vec<(&str, Op)> = vec![
        ("push", op(|l| {
            l.push(9);
        })),
        ("pop", op(|l| {
            l.pop();
        })),
        ("shift", op(|l| {
            l.shift();
        })),
        ("unshift", op(|l| {
            l.unshift(0);
        })),
        ("sort", op(|l| l.sort())),
        ("reverse", op(|l| l.reverse())),
        ("splice", op(|l| {
            l.splice(1, 1, vec![Value::from(7)]);
        })),
    ];

    for (name, op) in operations {
        let state = reactive(Value::from_json(json!({"items": [3, 1, 2]})));
        let (hits, sink) = counter();
        let _w = Watcher::new(&state, "items", sink).unwrap();

        let list = state.get("items").unwrap().as_list().unwrap().clone();
        op(&list);
        assert_eq!(hits.load(Ordering::SeqCst), 1, "{name} should notify once");
    }
}

/// Reading an observed list never notifies.
#[test]
fn list_reads_do_not_notify() {
    let arr = reactive(Value::from_json(json!([1, 2, 3])));
    let (hits, sink) = counter();
    let _w = Watcher::new(&arr, "", sink).unwrap();

    let list = arr.as_list().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(0), Some(Value::from(1)));
    assert!(list.contains(&Value::from(2)));
    assert_eq!(list.to_vec().len(), 3);
    assert_eq!(list.last(), Some(Value::from(3)));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

/// Index assignment on a list is not tracked.
#[test]
fn list_index_assignment_is_not_tracked() {
    let arr = reactive(Value::from_json(json!([1, 2, 3])));
    let (hits, sink) = counter();
    let _w = Watcher::new(&arr, "", sink).unwrap();

    assert!(arr.as_list().unwrap().set_index(0, 10));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(arr.get("0"), Some(Value::from(10)));
}

/// Observing twice neither rewraps keys nor duplicates registries.
#[test]
fn observe_is_idempotent() {
    let x = Value::from_json(json!({"a": {"b": 1}, "n": 0}));
    observe(&x);

    let record = record_of(&x);
    let n_dep = record.dep_id("n");
    let inner = record_of(&record.get("a").unwrap());
    let b_dep = inner.dep_id("b");

    observe(&x);
    observe(&x);

    assert_eq!(record.dep_id("n"), n_dep);
    assert_eq!(inner.dep_id("b"), b_dep);

    let (hits, sink) = counter();
    let _w = Watcher::new(&x, "n", sink).unwrap();
    record.assign("n", 1);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// A replacement record is observed, and writes into it reach watchers that
/// read it through the parent key, including watchers created before the
/// replacement.
#[test]
fn deep_propagation_through_replaced_record() {
    let x = reactive(Value::from_json(json!({"a": {"b": 1}})));
    let root = record_of(&x);

    let (old_hits, old_sink) = counter();
    let _old = Watcher::new(&x, "a", old_sink).unwrap();

    let replacement = Record::new();
    replacement.assign("c", 1);
    root.assign("a", replacement.clone());
    assert_eq!(old_hits.load(Ordering::SeqCst), 1);
    assert!(replacement.is_observed());

    let (a_hits, a_sink) = counter();
    let _a = Watcher::new(&x, "a", a_sink).unwrap();
    let (c_hits, c_sink) = counter();
    let _c = Watcher::new(&x, "a.c", c_sink).unwrap();

    replacement.assign("c", 2);
    assert_eq!(old_hits.load(Ordering::SeqCst), 2);
    assert_eq!(a_hits.load(Ordering::SeqCst), 1);
    assert_eq!(c_hits.load(Ordering::SeqCst), 1);
}

/// Every replacement carries the readers of the key along.
#[test]
fn repeated_replacement_keeps_earlier_watchers() {
    let x = reactive(Value::from_json(json!({"a": {"b": 1}})));
    let root = record_of(&x);
    let (hits, sink) = counter();
    let _w = Watcher::new(&x, "a", sink).unwrap();

    let first = Record::new();
    first.assign("c", 1);
    root.assign("a", first.clone());
    let second = Value::from_json(json!({"c": 1}));
    root.assign("a", second.clone());
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    record_of(&second).assign("c", 2);
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    let items = Value::from_json(json!([1]));
    root.assign("a", items.clone());
    items.as_list().unwrap().push(2);
    assert_eq!(hits.load(Ordering::SeqCst), 5);
}

/// Replacing a record with a structurally equal but distinct one notifies.
#[test]
fn distinct_equal_record_still_notifies() {
    let x = reactive(Value::from_json(json!({"a": {"b": 1}})));
    let (hits, sink) = counter();
    let _w = Watcher::new(&x, "a", sink).unwrap();

    let root = record_of(&x);
    root.assign("a", Value::from_json(json!({"b": 1})));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let current = root.get("a").unwrap();
    root.assign("a", current);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// A watcher on a nested path runs once per nested write even though it is
/// registered on both the key and its containing record.
#[test]
fn nested_path_write_updates_once() {
    let x = reactive(Value::from_json(json!({"a": {"b": 1}})));
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let _w = Watcher::new(&x, "a.b", move |v| sink.lock().push(v.clone())).unwrap();

    let inner = record_of(&record_of(&x).get("a").unwrap());
    inner.assign("b", 2);
    assert_eq!(*log.lock(), vec![Value::from(2)]);
}

/// Updates run synchronously, including cascades.
#[test]
fn cascading_updates_complete_before_write_returns() {
    let x = reactive(Value::from_json(json!({"source": 1, "mirror": 1})));
    let root = record_of(&x);

    let writer = root.clone();
    let _copy = Watcher::new(&x, "source", move |v| writer.assign("mirror", v.clone())).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _mirror = Watcher::new(&x, "mirror", move |v| sink.lock().push(v.clone())).unwrap();

    root.assign("source", 2);
    assert_eq!(*seen.lock(), vec![Value::from(2)]);
    assert_eq!(root.get("mirror"), Some(Value::from(2)));
}

/// Dropping a watcher stops its updates.
#[test]
fn dropped_watcher_stops_updating() {
    let x = reactive(Value::from_json(json!({"count": 0})));
    let (hits, sink) = counter();
    let w = Watcher::new(&x, "count", sink).unwrap();

    let root = record_of(&x);
    root.assign("count", 1);
    drop(w);
    root.assign("count", 2);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

/// Watchers on a list element path see list mutations.
#[test]
fn list_element_path_sees_mutations() {
    let x = reactive(Value::from_json(json!({"items": ["a", "b"]})));
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let _w = Watcher::new(&x, "items.0", move |v| sink.lock().push(v.clone())).unwrap();

    let list = x.get("items").unwrap().as_list().unwrap().clone();
    list.shift();
    assert_eq!(*log.lock(), vec![Value::from("b")]);
}
