use std::fs;

use mdb::service::{decode_result, Reply};
use mdb::{snapshot, QueryService};
use serde_json::Value;

/// Service over a freshly loaded demo site. The temp dir must outlive it.
pub fn demo_service() -> (tempfile::TempDir, QueryService) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("about.yaml"),
        "kind: Page\ndescription: A page about this demo.\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("news--today.yaml"),
        "kind: Page\ncontent: <p>This is some content!</p>\n",
    )
    .unwrap();
    let path = dir.path().join("demo.data");
    let store = snapshot::load(dir.path(), &path).unwrap();
    (dir, QueryService::new(store))
}

/// Decode a successful reply into its JSON items.
pub fn items(reply: Reply) -> Vec<Value> {
    match reply {
        Reply::Result(encoded) => {
            let text = decode_result(&encoded).unwrap();
            serde_json::from_str(&text).unwrap()
        }
        other => panic!("expected a result, got {:?}", other),
    }
}

pub fn keys(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|item| item["key"].as_str().unwrap().to_string())
        .collect()
}
