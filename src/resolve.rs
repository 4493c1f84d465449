//! Resolution of `extends:` inheritance between services.
//!
//! Each service may name a single parent, either in the same document or in
//! another file on disk.  Resolution walks the services in declaration
//! order, replaces each `extends` field with the parent's resolved fields,
//! and combines the child's own fields on top.

use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::errors::*;
use crate::merge::Combine;
use crate::value::{Mapping, Value};

/// The field naming a service's parent.
const EXTENDS: &str = "extends";

/// The top-level key under which a wrapped document nests its services.
pub(crate) const SERVICES: &str = "services";

/// Resolve every service in `services`, in declaration order, producing a
/// registry of fully self-contained descriptions.
///
/// Parents named by a bare service name are looked up in the registry as
/// populated so far, so a service can only inherit from services declared
/// earlier in the document.  Extending a name that has not been resolved
/// yet, or does not exist at all, yields an empty parent and a warning,
/// never an error.  Unreadable or malformed `file` references, on the other
/// hand, abort the whole resolution.
pub fn resolve_registry(base_dir: &Path, services: &Mapping) -> Result<Mapping> {
    let mut registry = Mapping::with_capacity(services.len());
    for (name, description) in services {
        let resolved = match description {
            Value::Mapping(fields) => match fields.get(EXTENDS) {
                Some(extends) => {
                    let parent = resolve_parent(base_dir, name, extends, &registry)?;
                    let mut own = fields.clone();
                    own.remove(EXTENDS);
                    Value::Mapping(parent.combine(&own))
                }
                None => description.clone(),
            },
            other => other.clone(),
        };
        registry.insert(name.clone(), resolved);
    }
    Ok(registry)
}

/// Locate the services mapping in a parsed document, whichever of the two
/// accepted shapes it uses: nested under a top-level `services` key, or the
/// whole document as a flat map of services.
pub fn document_services(document: &Value) -> Result<&Mapping> {
    let root = document.as_mapping().ok_or_else(|| {
        ErrorKind::InvalidStructure("top-level document is not a mapping".to_owned())
    })?;
    match root.get(SERVICES) {
        Some(Value::Mapping(services)) => Ok(services),
        Some(_) => {
            Err(ErrorKind::InvalidStructure("`services` is not a mapping".to_owned()).into())
        }
        None => Ok(root),
    }
}

fn resolve_parent(
    base_dir: &Path,
    name: &str,
    extends: &Value,
    registry: &Mapping,
) -> Result<Mapping> {
    match extends {
        Value::Scalar(scalar) => match scalar.as_str() {
            Some(parent) => Ok(lookup(registry, name, parent)),
            None => {
                warn!(
                    "service '{}': `extends` value is not a service name; \
                     treating the parent as empty",
                    name
                );
                Ok(Mapping::new())
            }
        },
        Value::Mapping(reference) => {
            let service = reference.get("service").and_then(Value::as_str);
            match reference.get("file") {
                Some(file) => {
                    let relative = file.as_str().ok_or_else(|| {
                        ErrorKind::InvalidStructure(format!(
                            "`extends.file` of service '{}' is not a string",
                            name
                        ))
                    })?;
                    resolve_file_reference(&base_dir.join(relative), name, service)
                }
                None => match service {
                    Some(parent) => Ok(lookup(registry, name, parent)),
                    None => {
                        if reference.contains_key("service") {
                            warn!(
                                "service '{}': `extends.service` is not a string; \
                                 treating the parent as empty",
                                name
                            );
                        }
                        Ok(Mapping::new())
                    }
                },
            }
        }
        Value::Sequence(_) => {
            warn!(
                "service '{}': `extends` value is neither a name nor a mapping; \
                 treating the parent as empty",
                name
            );
            Ok(Mapping::new())
        }
    }
}

/// Fetch a parent's resolved fields from the registry, degrading to an
/// empty parent when the name is unknown.
fn lookup(registry: &Mapping, child: &str, parent: &str) -> Mapping {
    match registry.get(parent) {
        Some(Value::Mapping(fields)) => fields.clone(),
        Some(_) => {
            warn!(
                "service '{}' extends '{}', which is not a mapping; \
                 treating the parent as empty",
                child, parent
            );
            Mapping::new()
        }
        None => {
            warn!(
                "service '{}' extends undefined service '{}'; \
                 treating the parent as empty",
                child, parent
            );
            Mapping::new()
        }
    }
}

/// Resolve a `{service, file}` reference: read and parse the other
/// document, resolve its whole registry with its own directory as the base
/// for any further relative references, and pick out the named service.
fn resolve_file_reference(
    path: &Path,
    child: &str,
    service: Option<&str>,
) -> Result<Mapping> {
    let text = fs::read_to_string(path).chain_err(|| ErrorKind::ReadFile(path.to_owned()))?;
    let document = codec::parse(&text)
        .chain_err(|| ErrorKind::ParseDocument(path.display().to_string()))?;
    let services =
        document_services(&document).chain_err(|| format!("in file '{}'", path.display()))?;
    let base_dir = match path.parent() {
        Some(parent) => parent.to_owned(),
        None => PathBuf::from("."),
    };
    let registry = resolve_registry(&base_dir, services)?;
    match service {
        Some(parent) => Ok(lookup(&registry, child, parent)),
        None => {
            warn!(
                "service '{}': `extends` names file '{}' but no service; \
                 treating the parent as empty",
                child,
                path.display()
            );
            Ok(Mapping::new())
        }
    }
}

#[cfg(test)]
fn services(yaml: &str) -> Mapping {
    let document: Value = yaml.parse().unwrap();
    match document {
        Value::Mapping(entries) => entries,
        _ => panic!("expected a mapping"),
    }
}

#[cfg(test)]
fn resolve(yaml: &str) -> Mapping {
    resolve_registry(Path::new("."), &services(yaml)).unwrap()
}

#[test]
fn services_without_extends_pass_through() {
    let input = "web:\n  image: nginx\ndb:\n  image: mysql\n";
    let registry = resolve(input);
    assert_eq!(registry, services(input));
    let keys: Vec<_> = registry.keys().map(String::as_str).collect();
    assert_eq!(keys, ["web", "db"]);
}

#[test]
fn non_mapping_descriptions_pass_through() {
    let registry = resolve("web: nginx\n");
    assert_eq!(registry, services("web: nginx\n"));
}

#[test]
fn a_service_extends_an_earlier_one_by_name() {
    let registry = resolve(
        "common:\n  image: mysql\n  ports: [3306]\ndb:\n  extends: common\n  ports: [13306]\n",
    );
    let db = registry.get("db").unwrap().as_mapping().unwrap();
    assert_eq!(db.get("image").unwrap().as_str(), Some("mysql"));
    assert_eq!(
        *db.get("ports").unwrap(),
        "[3306, 13306]".parse::<Value>().unwrap()
    );
    assert!(db.get(EXTENDS).is_none());
}

#[test]
fn extends_may_spell_the_name_in_mapping_form() {
    let registry =
        resolve("common:\n  image: mysql\ndb:\n  extends:\n    service: common\n");
    let db = registry.get("db").unwrap().as_mapping().unwrap();
    assert_eq!(db.get("image").unwrap().as_str(), Some("mysql"));
}

#[test]
fn extends_with_neither_service_nor_file_keeps_only_child_fields() {
    let registry = resolve("db:\n  extends: {}\n  image: mysql\n");
    assert_eq!(registry, services("db:\n  image: mysql\n"));
}

#[test]
fn dangling_references_resolve_to_an_empty_parent() {
    let registry = resolve("db:\n  extends: nowhere\n  image: mysql\n");
    assert_eq!(registry, services("db:\n  image: mysql\n"));
}

#[test]
fn extending_a_later_sibling_sees_an_empty_parent() {
    // Lookup happens against the registry as populated so far, so
    // declaration order matters: `db` here inherits nothing.
    let registry = resolve("db:\n  extends: common\n  ports: [3306]\ncommon:\n  image: mysql\n");
    let db = registry.get("db").unwrap().as_mapping().unwrap();
    assert!(db.get("image").is_none());
    assert_eq!(*db.get("ports").unwrap(), "[3306]".parse::<Value>().unwrap());
}

#[test]
fn inheritance_chains_flatten_completely() {
    let registry = resolve(
        "base:\n  image: app\n  ports: [80]\n\
         mid:\n  extends: base\n  ports: [81]\n\
         leaf:\n  extends: mid\n  ports: [82]\n",
    );
    let leaf = registry.get("leaf").unwrap().as_mapping().unwrap();
    assert_eq!(leaf.get("image").unwrap().as_str(), Some("app"));
    assert_eq!(
        *leaf.get("ports").unwrap(),
        "[80, 81, 82]".parse::<Value>().unwrap()
    );
}

#[test]
fn child_fields_win_and_environments_merge() {
    let registry = resolve(
        "common:\n  image: a\n  environment:\n    A: 1\n    B: 2\n\
         app:\n  extends: common\n  image: b\n  environment:\n    B: 3\n    C: 4\n",
    );
    let app = registry.get("app").unwrap().as_mapping().unwrap();
    assert_eq!(app.get("image").unwrap().as_str(), Some("b"));
    assert_eq!(
        *app.get("environment").unwrap(),
        "A: 1\nB: 3\nC: 4".parse::<Value>().unwrap()
    );
}

#[test]
fn non_string_file_references_are_fatal() {
    let result = resolve_registry(
        Path::new("."),
        &services("db:\n  extends:\n    service: a\n    file: [broken]\n"),
    );
    assert!(result.is_err());
}

#[test]
fn document_services_handles_both_shapes() {
    let wrapped: Value = "version: \"2\"\nservices:\n  web:\n    image: nginx\n"
        .parse()
        .unwrap();
    assert!(document_services(&wrapped).unwrap().contains_key("web"));

    let flat: Value = "web:\n  image: nginx\n".parse().unwrap();
    assert!(document_services(&flat).unwrap().contains_key("web"));

    let broken: Value = "services: 42\n".parse().unwrap();
    assert!(document_services(&broken).is_err());
}
