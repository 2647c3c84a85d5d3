use std::fs;

use mdb::query;
use mdb::snapshot::{self, FOLDER_KIND, ROOT_ID};

use crate::support::{all_reads, demo_site};

#[test]
fn snapshot_round_trip_preserves_every_read() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    let path = snapshot::default_snapshot_path(dir.path(), Some("demo"));

    let built = snapshot::load(dir.path(), &path).unwrap();
    assert!(path.exists());
    let restored = snapshot::load(dir.path(), &path).unwrap();

    assert_eq!(built.head().unwrap(), restored.head().unwrap());
    assert_eq!(all_reads(&built), all_reads(&restored));

    for text in ["*", "//Page", "/news/*[2]", "#/contact/form", "news/.."] {
        for at in [None, Some(3)] {
            let a = query::evaluate(text, &built, at).unwrap();
            let b = query::evaluate(text, &restored, at).unwrap();
            assert_eq!(a, b, "{} at {:?}", text, at);
        }
    }
}

#[test]
fn loaded_tree_shape() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    let path = dir.path().join("demo.data");
    let store = snapshot::load(dir.path(), &path).unwrap();

    let root = store.get(ROOT_ID, None).unwrap().unwrap();
    assert_eq!(root.kind(), FOLDER_KIND);
    assert!(root.is_root());

    let top: Vec<String> = store
        .children(ROOT_ID, None)
        .unwrap()
        .into_iter()
        .map(|n| n.name().to_string())
        .collect();
    assert_eq!(top, ["about", "contact", "news"]);

    let news = store.get("/news", None).unwrap().unwrap();
    assert_eq!(news.kind(), FOLDER_KIND);
    assert_eq!(news.field_str("description"), Some("Latest news"));

    let pages = query::evaluate("//Page", &store, None).unwrap();
    let names: Vec<&str> = pages.iter().map(|n| n.name()).collect();
    assert_eq!(names, ["about", "first-post", "second-post"]);
}

#[test]
fn deleting_the_snapshot_forces_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    let path = dir.path().join("demo.data");

    let first = snapshot::load(dir.path(), &path).unwrap();
    fs::remove_file(&path).unwrap();
    let second = snapshot::load(dir.path(), &path).unwrap();

    assert!(path.exists());
    assert_eq!(first.export().unwrap(), second.export().unwrap());
}

#[test]
fn corrupt_snapshot_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    let path = dir.path().join("demo.data");
    fs::write(&path, b"\x00\x01\x02 this is not a snapshot").unwrap();

    let store = snapshot::load(dir.path(), &path).unwrap();
    assert!(store.get("/news/first-post", None).unwrap().is_some());

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(snapshot::MAGIC));
}

#[test]
fn edited_source_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    let path = dir.path().join("demo.data");
    snapshot::load(dir.path(), &path).unwrap();

    fs::write(dir.path().join("about.yaml"), "kind: Page\ntitle: About Us\n").unwrap();
    let store = snapshot::load(dir.path(), &path).unwrap();
    let about = store.get("/about", None).unwrap().unwrap();
    assert_eq!(about.title(), Some("About Us"));
}

#[test]
fn unparsable_source_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    fs::write(dir.path().join("broken.yaml"), "kind: Page\n  bad indent: [\n").unwrap();

    let err = snapshot::load(dir.path(), &dir.path().join("demo.data")).unwrap_err();
    assert!(err.is_source_format(), "{}", err);
}

#[test]
fn single_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("site.yaml");
    fs::write(
        &source,
        "about:\n  kind: Page\n/news/today:\n  kind: Page\n  title: Today\n",
    )
    .unwrap();
    let path = snapshot::default_snapshot_path(&source, None);
    assert_eq!(path, dir.path().join("site.data"));

    let built = snapshot::load(&source, &path).unwrap();
    let restored = snapshot::load(&source, &path).unwrap();
    assert_eq!(all_reads(&built), all_reads(&restored));
    assert_eq!(
        built.path("/news/today", None).unwrap().as_deref(),
        Some("/news/today")
    );
}

#[test]
fn renamed_source_dir_rebuilds_the_root() {
    let parent = tempfile::tempdir().unwrap();
    let alpha = parent.path().join("alpha");
    let beta = parent.path().join("beta");
    fs::create_dir(&alpha).unwrap();
    demo_site(&alpha);
    let path = parent.path().join("site.data");

    let before = snapshot::load(&alpha, &path).unwrap();
    assert_eq!(before.get(ROOT_ID, None).unwrap().unwrap().name(), "alpha");

    fs::rename(&alpha, &beta).unwrap();
    let after = snapshot::load(&beta, &path).unwrap();
    assert_eq!(after.get(ROOT_ID, None).unwrap().unwrap().name(), "beta");
}

#[test]
fn non_utf8_source_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    demo_site(dir.path());
    fs::write(dir.path().join("bad.yaml"), [0xff, 0xfe]).unwrap();

    let err = snapshot::load(dir.path(), &dir.path().join("demo.data")).unwrap_err();
    assert!(err.is_source_format(), "{}", err);
}
