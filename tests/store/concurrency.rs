use std::sync::Barrier;
use std::thread;

use mdb::{Payload, Store, StoreError, Value};

fn fields(writer: usize) -> Payload {
    let mut payload = Payload::new();
    payload.insert("writer".into(), Value::Int(writer as i64));
    payload
}

#[test]
fn racing_writers_on_one_id_exactly_one_wins() {
    for _ in 0..50 {
        let store = Store::new();
        let barrier = Barrier::new(2);

        let results: Vec<Result<u64, StoreError>> = thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|writer| {
                    let store = &store;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        store.put_if("x", 0, None, fields(writer))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let wins = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_conflict()))
            .count();
        assert_eq!((wins, conflicts), (1, 1), "{:?}", results);
        assert_eq!(store.head().unwrap(), 1);
        assert_eq!(store.history("x").unwrap().len(), 1);
    }
}

#[test]
fn racing_puts_reject_writers_whose_base_moved() {
    let store = Store::new();
    store.put("x", None, fields(0)).unwrap();
    let barrier = Barrier::new(4);

    let results: Vec<Result<u64, StoreError>> = thread::scope(|s| {
        let handles: Vec<_> = (1..=4)
            .map(|writer| {
                let store = &store;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    (0..2000)
                        .map(|_| store.put("x", None, fields(writer)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let mut wins: Vec<u64> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    assert_eq!(wins.len() + conflicts, results.len());
    assert!(conflicts > 0, "overlapping puts all committed");

    wins.sort_unstable();
    let expected: Vec<u64> = (2..=wins.len() as u64 + 1).collect();
    assert_eq!(wins, expected);
    assert_eq!(store.history("x").unwrap().len(), wins.len() + 1);
}

#[test]
fn held_claim_rejects_second_writer() {
    let store = Store::new();
    let claim = store.claim("x").unwrap();

    thread::scope(|s| {
        let result = s.spawn(|| store.put("x", None, fields(2))).join().unwrap();
        match result {
            Err(StoreError::Conflict { id, expected, .. }) => {
                assert_eq!(id, "x");
                assert_eq!(expected, None);
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    });

    claim.put(None, fields(1)).unwrap();
    drop(claim);
    assert_eq!(store.put("x", None, fields(3)).unwrap(), 2);
}

#[test]
fn writers_on_distinct_ids_all_commit() {
    let store = Store::new();
    thread::scope(|s| {
        for writer in 0..8 {
            let store = &store;
            s.spawn(move || {
                for round in 0..10 {
                    let id = format!("w{}-{}", writer, round);
                    store.put(&id, None, fields(writer)).unwrap();
                }
            });
        }
    });

    assert_eq!(store.head().unwrap(), 80);
    assert_eq!(store.len().unwrap(), 80);
    let versions: Vec<u64> = store.export().unwrap().iter().map(|n| n.version).collect();
    assert_eq!(versions, (1..=80).collect::<Vec<_>>());
}

#[test]
fn readers_do_not_block_on_each_other() {
    let store = Store::new();
    store.put("x", None, fields(0)).unwrap();
    let view = store.read().unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            let view = view.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    assert!(view.get("x").unwrap().is_some());
                }
            });
        }
        s.spawn(|| {
            for writer in 1..50 {
                let _ = store.put("x", None, fields(writer));
            }
        });
    });
    assert_eq!(view.version(), 1);
}
