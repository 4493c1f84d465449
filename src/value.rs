//! A generic, loosely-typed document tree.
//!
//! `docker-compose.yml` inheritance works on whatever the author wrote, not
//! on a fixed schema, so we represent a document as a small closed union of
//! scalars, sequences and mappings, and pattern-match on it explicitly
//! everywhere.  Mappings remember their insertion order, which keeps the
//! resolved output readable and diffable against the input.

use linked_hash_map::LinkedHashMap;
use std::str::FromStr;

use crate::codec;
use crate::errors::*;

/// An ordered mapping from field name to value, with unique keys.
pub type Mapping = LinkedHashMap<String, Value>;

/// A single node in a document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A leaf value: a string, number, boolean or null.
    Scalar(Scalar),
    /// An ordered list of values.
    Sequence(Vec<Value>),
    /// An ordered map of named values.
    Mapping(Mapping),
}

/// A leaf value in a document tree.
///
/// We keep the distinction between the YAML scalar types so that values
/// survive a round-trip unchanged: a port number `80` must not come back
/// out as the string `"80"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// An explicit or implicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating-point number, kept as its source text so we never
    /// reformat it.
    Float(String),
    /// A string.
    Str(String),
}

impl Value {
    /// Return the string slice of a string scalar, or `None` for any other
    /// kind of value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(scalar) => scalar.as_str(),
            _ => None,
        }
    }

    /// Return a reference to this value's entries if it is a sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Return a reference to this value's fields if it is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }
}

impl Scalar {
    /// Return the string slice of a `Str` scalar, or `None` otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(text) => Some(text),
            _ => None,
        }
    }

    /// The canonical text form of this scalar, as it would appear as a
    /// mapping key.
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Null => "~".to_owned(),
            Scalar::Bool(flag) => flag.to_string(),
            Scalar::Int(number) => number.to_string(),
            Scalar::Float(text) => text.clone(),
            Scalar::Str(text) => text.clone(),
        }
    }
}

impl FromStr for Value {
    type Err = Error;

    /// Parse a single YAML document into a tree.
    ///
    /// ```
    /// use compose_linearise::Value;
    ///
    /// let doc: Value = "image: nginx".parse().unwrap();
    /// let fields = doc.as_mapping().unwrap();
    /// assert_eq!(fields.get("image").unwrap().as_str(), Some("nginx"));
    /// ```
    fn from_str(text: &str) -> Result<Value> {
        codec::parse(text)
    }
}

#[test]
fn scalars_keep_their_yaml_type() {
    let doc: Value = "[80, \"80\", 8.5, true, ~]".parse().unwrap();
    let items = doc.as_sequence().unwrap();
    assert_eq!(items[0], Value::Scalar(Scalar::Int(80)));
    assert_eq!(items[1], Value::Scalar(Scalar::Str("80".to_owned())));
    assert_eq!(items[2], Value::Scalar(Scalar::Float("8.5".to_owned())));
    assert_eq!(items[3], Value::Scalar(Scalar::Bool(true)));
    assert_eq!(items[4], Value::Scalar(Scalar::Null));
}

#[test]
fn mappings_preserve_declaration_order() {
    let doc: Value = "z: 1\na: 2\nm: 3".parse().unwrap();
    let keys: Vec<_> = doc.as_mapping().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn accessors_reject_other_kinds() {
    let doc: Value = "- 1\n- 2".parse().unwrap();
    assert!(doc.as_mapping().is_none());
    assert!(doc.as_str().is_none());
    assert_eq!(doc.as_sequence().unwrap().len(), 2);
}
