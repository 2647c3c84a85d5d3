use mdb::service::{encode_query, Reply};
use mdb::{Payload, Value};

use crate::support::{demo_service, items, keys};

#[test]
fn wildcard_lists_every_node() {
    let (_dir, service) = demo_service();
    let result = items(service.handle(&encode_query("*"), None));
    assert_eq!(keys(&result), ["root", "/about", "/news", "/news/today"]);
}

#[test]
fn items_carry_fields_and_meta() {
    let (_dir, service) = demo_service();
    let result = items(service.handle(&encode_query("/news/today"), None));
    assert_eq!(result.len(), 1);

    let today = &result[0];
    assert_eq!(today["kind"], "Page");
    assert_eq!(today["key"], "/news/today");
    assert_eq!(today["_path"], "/news/today");
    assert_eq!(today["name"], "today");
    assert_eq!(today["title"], "Today");
    assert_eq!(today["content"], "<p>This is some content!</p>");
    assert!(today["_version"].as_u64().unwrap() > 0);
}

#[test]
fn id_lookup_and_empty_results() {
    let (_dir, service) = demo_service();
    assert_eq!(keys(&items(service.handle(&encode_query("#/about"), None))), ["/about"]);
    assert!(items(service.handle(&encode_query("#/nowhere"), None)).is_empty());
    assert!(items(service.handle(&encode_query("//Form"), None)).is_empty());
}

#[test]
fn historical_reads_ignore_later_writes() {
    let (_dir, service) = demo_service();
    let before = service.store().head().unwrap();

    let mut fields = Payload::new();
    fields.insert("name".into(), Value::from("contact"));
    fields.insert("kind".into(), Value::from("Page"));
    service.store().put("/contact", Some("root"), fields).unwrap();

    let now = items(service.handle(&encode_query("//Page"), None));
    let then = items(service.handle(&encode_query("//Page"), Some(before)));
    assert_eq!(now.len(), then.len() + 1);
    assert!(keys(&now).contains(&"/contact".to_string()));
}

#[test]
fn syntax_errors_are_replies_not_failures() {
    let (_dir, service) = demo_service();
    for bad in ["", "news//", "news[two]", "$"] {
        match service.handle(&encode_query(bad), None) {
            Reply::Error { condition, message } => {
                assert_eq!(condition, "undefined-condition", "{:?}", bad);
                assert!(message.contains("position"), "{}", message);
            }
            other => panic!("{:?} should fail, got {:?}", bad, other),
        }
    }
}

#[test]
fn undecodable_payload_is_bad_request() {
    let (_dir, service) = demo_service();
    match service.handle("***", None) {
        Reply::Error { condition, .. } => assert_eq!(condition, "bad-request"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn future_version_is_item_not_found() {
    let (_dir, service) = demo_service();
    let head = service.store().head().unwrap();
    let reply = service.handle(&encode_query("*"), Some(head + 1));
    assert!(reply.is_error());
    match reply {
        Reply::Error { condition, .. } => assert_eq!(condition, "item-not-found"),
        other => panic!("unexpected {:?}", other),
    }
}
