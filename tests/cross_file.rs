//! Inheritance across files on disk.

use std::fs;
use std::path::Path;

use compose_linearise::{Lineariser, Mapping, Value};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Dig a service's resolved fields out of linearised output, accepting
/// both document shapes.
fn service(resolved: &str, name: &str) -> Mapping {
    let doc: Value = resolved.parse().unwrap();
    let root = doc.as_mapping().unwrap();
    let services = match root.get("services") {
        Some(wrapped) => wrapped.as_mapping().unwrap(),
        None => root,
    };
    services.get(name).unwrap().as_mapping().unwrap().clone()
}

#[test]
fn a_service_extends_one_from_another_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "common.yml",
        "base:\n  image: mysql\n  ports: [3306]\n",
    );
    let main = "version: \"2\"\nservices:\n  web:\n    extends:\n      service: base\n      file: common.yml\n    ports: [8080]\n";

    let resolved = Lineariser::with_base_dir(dir.path()).linearise(main).unwrap();

    let web = service(&resolved, "web");
    assert_eq!(web.get("image").unwrap().as_str(), Some("mysql"));
    assert_eq!(
        *web.get("ports").unwrap(),
        "[3306, 8080]".parse::<Value>().unwrap()
    );
    assert!(web.get("extends").is_none());
}

#[test]
fn nested_references_resolve_against_their_own_files_directory() {
    let dir = TempDir::new().unwrap();
    // sub/common.yml refers to deep.yml relative to itself, not to the
    // directory the top-level document was resolved from.
    write(
        dir.path(),
        "sub/common.yml",
        "mid:\n  extends:\n    service: base\n    file: deep.yml\n  restart: always\n",
    );
    write(dir.path(), "sub/deep.yml", "base:\n  image: app\n");
    let main = "web:\n  extends:\n    service: mid\n    file: sub/common.yml\n  ports: [80]\n";

    let resolved = Lineariser::with_base_dir(dir.path()).linearise(main).unwrap();

    let web = service(&resolved, "web");
    assert_eq!(web.get("image").unwrap().as_str(), Some("app"));
    assert_eq!(web.get("restart").unwrap().as_str(), Some("always"));
}

#[test]
fn two_services_may_extend_from_the_same_file() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "common.yml",
        "base:\n  environment:\n    TZ: UTC\n",
    );
    let main = "a:\n  extends:\n    service: base\n    file: common.yml\n  image: one\n\
                b:\n  extends:\n    service: base\n    file: common.yml\n  image: two\n";

    let resolved = Lineariser::with_base_dir(dir.path()).linearise(main).unwrap();

    for (name, image) in [("a", "one"), ("b", "two")] {
        let fields = service(&resolved, name);
        assert_eq!(fields.get("image").unwrap().as_str(), Some(image));
        assert_eq!(
            *fields.get("environment").unwrap(),
            "TZ: UTC".parse::<Value>().unwrap()
        );
    }
}

#[test]
fn a_wrapped_referenced_file_works_too() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "common.yml",
        "version: \"2\"\nservices:\n  base:\n    image: mysql\n",
    );
    let main = "db:\n  extends:\n    service: base\n    file: common.yml\n";

    let resolved = Lineariser::with_base_dir(dir.path()).linearise(main).unwrap();
    assert_eq!(
        service(&resolved, "db").get("image").unwrap().as_str(),
        Some("mysql")
    );
}

#[test]
fn a_dangling_name_in_the_referenced_file_inherits_nothing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "common.yml", "base:\n  image: mysql\n");
    let main = "db:\n  extends:\n    service: missing\n    file: common.yml\n  image: own\n";

    let resolved = Lineariser::with_base_dir(dir.path()).linearise(main).unwrap();
    let db = service(&resolved, "db");
    assert_eq!(db.get("image").unwrap().as_str(), Some("own"));
    assert_eq!(db.len(), 1);
}

#[test]
fn a_missing_referenced_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let main = "db:\n  extends:\n    service: base\n    file: missing.yml\n";

    let err = Lineariser::with_base_dir(dir.path())
        .linearise(main)
        .unwrap_err();
    assert!(err.to_string().contains("missing.yml"));
}

#[test]
fn a_malformed_referenced_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "common.yml", "base: [unclosed\n");
    let main = "db:\n  extends:\n    service: base\n    file: common.yml\n";

    let err = Lineariser::with_base_dir(dir.path())
        .linearise(main)
        .unwrap_err();
    assert!(err.to_string().contains("common.yml"));
}

#[test]
fn linearise_path_resolves_relative_to_the_document() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "common.yml", "base:\n  image: mysql\n");
    write(
        dir.path(),
        "main.yml",
        "db:\n  extends:\n    service: base\n    file: common.yml\n",
    );

    // The lineariser's own base directory is irrelevant here: the document
    // was loaded from a path, so references resolve against its directory.
    let resolved = Lineariser::new()
        .linearise_path(dir.path().join("main.yml"))
        .unwrap();
    assert_eq!(
        service(&resolved, "db").get("image").unwrap().as_str(),
        Some("mysql")
    );
}
