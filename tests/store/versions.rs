use mdb::{Payload, Store, Value};

fn fields(name: &str, revision: i64) -> Payload {
    let mut payload = Payload::new();
    payload.insert("name".into(), Value::from(name));
    payload.insert("revision".into(), Value::Int(revision));
    payload
}

fn revision(store: &Store, id: &str, at: u64) -> Option<i64> {
    store
        .get(id, Some(at))
        .unwrap()
        .and_then(|node| match node.field("revision") {
            Some(Value::Int(r)) => Some(*r),
            _ => None,
        })
}

#[test]
fn reads_see_greatest_write_not_after_version() {
    let store = Store::new();
    // Interleave writes to two ids so store versions and per-id revisions differ.
    let mut writes: Vec<(&str, i64, u64)> = Vec::new();
    for r in 1..=4 {
        for id in ["x", "y"] {
            let version = store.put(id, None, fields(id, r)).unwrap();
            writes.push((id, r, version));
        }
    }

    for at in 0..=store.head().unwrap() {
        for id in ["x", "y"] {
            let expected = writes
                .iter()
                .filter(|(w, _, v)| *w == id && *v <= at)
                .map(|(_, r, _)| *r)
                .last();
            assert_eq!(revision(&store, id, at), expected, "{} at {}", id, at);
        }
    }
}

#[test]
fn tombstones_hide_later_reads_only() {
    let store = Store::new();
    let written = store.put("x", None, fields("x", 1)).unwrap();
    let deleted = store.delete("x").unwrap();

    assert_eq!(revision(&store, "x", written), Some(1));
    assert!(store.get("x", Some(deleted)).unwrap().is_none());
    assert!(store.get("x", None).unwrap().is_none());

    let history = store.history("x").unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[1].deleted);
}

#[test]
fn traversal_skips_deleted_nodes() {
    let store = Store::new();
    store.put("root", None, fields("root", 1)).unwrap();
    store.put("a", Some("root"), fields("a", 1)).unwrap();
    store.put("b", Some("root"), fields("b", 1)).unwrap();
    let deleted_at = store.delete("a").unwrap();
    store.put("c", Some("root"), fields("c", 1)).unwrap();

    for at in 0..=store.head().unwrap() {
        let ids: Vec<String> = store.all(Some(at)).unwrap().map(|n| n.id).collect();
        if at >= deleted_at {
            assert!(!ids.contains(&"a".to_string()), "a visible at {}", at);
        }
    }

    let ids: Vec<String> = store.all(None).unwrap().map(|n| n.id).collect();
    assert_eq!(ids, ["root", "b", "c"]);
}

#[test]
fn traversal_is_restartable() {
    let store = Store::new();
    for id in ["a", "b", "c"] {
        store.put(id, None, fields(id, 1)).unwrap();
    }
    let mut all = store.all(None).unwrap();
    let first: Vec<String> = all.by_ref().map(|n| n.id).collect();
    assert!(all.next().is_none());

    all.restart();
    let second: Vec<String> = all.map(|n| n.id).collect();
    assert_eq!(first, second);
    assert_eq!(first, ["a", "b", "c"]);
}

#[test]
fn pinned_view_ignores_later_writes() {
    let store = Store::new();
    store.put("root", None, fields("root", 1)).unwrap();
    let view = store.read().unwrap();

    store.put("late", Some("root"), fields("late", 1)).unwrap();
    store.put("root", None, fields("root", 2)).unwrap();

    assert!(view.get("late").unwrap().is_none());
    assert!(view.children("root").unwrap().is_empty());
    assert_eq!(view.all().unwrap().count(), 1);
    assert_eq!(
        view.get("root").unwrap().unwrap().field("revision"),
        Some(&Value::Int(1))
    );
}

#[test]
fn paths_follow_names() {
    let store = Store::new();
    store.put("root", None, fields("site", 1)).unwrap();
    store.put("n", Some("root"), fields("news", 1)).unwrap();
    store.put("t", Some("n"), fields("today", 1)).unwrap();

    assert_eq!(store.path("root", None).unwrap().as_deref(), Some("/"));
    assert_eq!(store.path("t", None).unwrap().as_deref(), Some("/news/today"));
    assert!(store.path("missing", None).unwrap().is_none());
}
