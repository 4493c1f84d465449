//! The boundary between raw YAML text and the generic [`Value`] tree.
//!
//! Everything else in this crate manipulates trees; only this module knows
//! which YAML library does the actual scanning and emitting.

use yaml_rust::{yaml, Yaml, YamlEmitter, YamlLoader};

use crate::errors::*;
use crate::value::{Mapping, Scalar, Value};

/// Parse a single YAML document into a tree.
///
/// Empty input and multi-document streams are rejected: a compose file is
/// always exactly one document.
pub fn parse(text: &str) -> Result<Value> {
    let mut documents = YamlLoader::load_from_str(text)?;
    if documents.len() > 1 {
        return Err(
            ErrorKind::InvalidStructure("expected a single YAML document".to_owned()).into(),
        );
    }
    match documents.pop() {
        Some(document) => from_yaml(document),
        None => Err(ErrorKind::InvalidStructure("empty YAML document".to_owned()).into()),
    }
}

/// Serialize a tree back to YAML text.
///
/// The emitter prefixes its output with a `---` document marker; the
/// lineariser's cosmetic trim removes it again.
pub fn dump(value: &Value) -> Result<String> {
    let yaml = to_yaml(value);
    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&yaml)
        .map_err(|err| ErrorKind::DumpDocument(format!("{:?}", err)))?;
    Ok(out)
}

fn from_yaml(yaml: Yaml) -> Result<Value> {
    match yaml {
        Yaml::Null => Ok(Value::Scalar(Scalar::Null)),
        Yaml::Boolean(flag) => Ok(Value::Scalar(Scalar::Bool(flag))),
        Yaml::Integer(number) => Ok(Value::Scalar(Scalar::Int(number))),
        Yaml::Real(text) => Ok(Value::Scalar(Scalar::Float(text))),
        Yaml::String(text) => Ok(Value::Scalar(Scalar::Str(text))),
        Yaml::Array(items) => {
            let mut sequence = Vec::with_capacity(items.len());
            for item in items {
                sequence.push(from_yaml(item)?);
            }
            Ok(Value::Sequence(sequence))
        }
        Yaml::Hash(entries) => {
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, value) in entries {
                let key = match from_yaml(key)? {
                    Value::Scalar(scalar) => scalar.to_text(),
                    _ => {
                        return Err(ErrorKind::InvalidStructure(
                            "mapping key is not a scalar".to_owned(),
                        )
                        .into())
                    }
                };
                mapping.insert(key, from_yaml(value)?);
            }
            Ok(Value::Mapping(mapping))
        }
        Yaml::Alias(_) | Yaml::BadValue => {
            Err(ErrorKind::InvalidStructure("unsupported YAML node".to_owned()).into())
        }
    }
}

fn to_yaml(value: &Value) -> Yaml {
    match value {
        Value::Scalar(Scalar::Null) => Yaml::Null,
        Value::Scalar(Scalar::Bool(flag)) => Yaml::Boolean(*flag),
        Value::Scalar(Scalar::Int(number)) => Yaml::Integer(*number),
        Value::Scalar(Scalar::Float(text)) => Yaml::Real(text.clone()),
        Value::Scalar(Scalar::Str(text)) => Yaml::String(text.clone()),
        Value::Sequence(items) => Yaml::Array(items.iter().map(to_yaml).collect()),
        Value::Mapping(entries) => {
            let mut hash = yaml::Hash::with_capacity(entries.len());
            for (key, value) in entries {
                hash.insert(Yaml::String(key.clone()), to_yaml(value));
            }
            Yaml::Hash(hash)
        }
    }
}

#[test]
fn parse_rejects_malformed_yaml() {
    assert!(parse("services: [unclosed").is_err());
}

#[test]
fn parse_rejects_empty_and_multi_document_streams() {
    assert!(parse("").is_err());
    assert!(parse("---\na: 1\n---\nb: 2\n").is_err());
}

#[test]
fn scalar_keys_are_stringified() {
    let doc = parse("80: http\ntrue: yes\n").unwrap();
    let keys: Vec<_> = doc.as_mapping().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["80", "true"]);
}

#[test]
fn dump_starts_with_a_document_marker() {
    let doc = parse("image: nginx").unwrap();
    let out = dump(&doc).unwrap();
    assert!(out.starts_with("---"));
    assert!(out.contains("image: nginx"));
}

#[test]
fn trees_round_trip_through_the_codec() {
    let text = "web:\n  image: nginx\n  ports:\n    - 80\n    - 443\ndb:\n  image: mysql\n";
    let doc = parse(text).unwrap();
    let again = parse(&dump(&doc).unwrap()).unwrap();
    assert_eq!(doc, again);
}
