use std::path::PathBuf;

use yang_compat_core::parse_file;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_yin_statements_and_arguments() {
    let node = parse_file(&fixture("fixtures/example-system@2023-01-01.yin")).expect("parse should succeed");
    assert_eq!(node.tag, "module");
    assert_eq!(node.attr("name"), Some("example-system"));
    assert_eq!(node.child_attr("namespace", "uri"), Some("urn:example:system"));

    let revision = node.get_child("revision").expect("revision should exist");
    assert_eq!(revision.child_text("description", "text"), Some("Initial revision."));

    let system = node.get_child("container").expect("container should exist");
    let leaves = system.get_children("leaf");
    assert_eq!(leaves.len(), 3);
    assert_eq!(leaves[0].attr("name"), Some("hostname"));
    assert!(node.text.is_none());
}

#[test]
fn parses_every_fixture_root() {
    for name in [
        "fixtures/example-types.yin",
        "fixtures/example-system@2023-01-01.yin",
        "fixtures/example-system@2024-01-01.yin",
    ] {
        let root = parse_file(&fixture(name)).expect("fixture parse");
        assert_eq!(root.tag, "module", "{name}");
    }
}
