use std::fs;
use std::path::Path;

use mdb::Store;

/// A small site laid out the way the loader expects.
pub fn demo_site(dir: &Path) {
    let files = [
        ("about.yaml", "kind: Page\ndescription: A page about this demo.\n"),
        (
            "news--first-post.yaml",
            "kind: Page\ncontent: <p>This is some content!</p>\ntags: [intro, news]\n",
        ),
        ("news--second-post.yaml", "kind: Page\nweight: 2.5\n"),
        ("news.yaml", "description: Latest news\n"),
        ("contact--form.yaml", "kind: Form\nfields:\n  email: required\n"),
    ];
    for (name, body) in files {
        fs::write(dir.join(name), body).unwrap();
    }
}

/// Every id ever written, with what each version reads back.
pub fn all_reads(store: &Store) -> Vec<(u64, String, Option<mdb::Node>)> {
    let nodes = store.export().unwrap();
    let mut ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
    ids.sort();
    ids.dedup();

    let mut reads = Vec::new();
    for at in 0..=store.head().unwrap() {
        for id in &ids {
            reads.push((at, id.clone(), store.get(id, Some(at)).unwrap()));
        }
    }
    reads
}
