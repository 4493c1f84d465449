//! The top-level entry point: linearising a whole document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::errors::*;
use crate::resolve::{self, SERVICES};
use crate::value::{Mapping, Value};

#[cfg(test)]
use lazy_static::lazy_static;
#[cfg(test)]
use regex::Regex;

/// The characters stripped from both ends of the serialized output by
/// default.  The dash entry removes the `---` document marker the emitter
/// writes; the rest are plain whitespace.
pub const DEFAULT_TRIM_CHARS: &[char] = &['-', ' ', '\u{c}', '\u{b}', '\r', '\t', '\n'];

/// Resolves every `extends` relationship in a document and re-serializes
/// it, so that each service description stands on its own.
///
/// A document may nest its services under a top-level `services` key
/// alongside other keys such as `version`, or it may be a bare map of
/// services; both shapes are accepted, and non-service keys pass through
/// untouched.
#[derive(Debug, Clone)]
pub struct Lineariser {
    /// The directory against which relative `file` references in
    /// `extends` are resolved.
    base_dir: PathBuf,
    /// The characters trimmed from both ends of the serialized output.
    trim_chars: Vec<char>,
}

impl Lineariser {
    /// Create a lineariser which resolves relative `file` references
    /// against the current working directory.
    pub fn new() -> Lineariser {
        Lineariser::with_base_dir(".")
    }

    /// Create a lineariser which resolves relative `file` references
    /// against `base_dir`.
    pub fn with_base_dir<P: Into<PathBuf>>(base_dir: P) -> Lineariser {
        Lineariser {
            base_dir: base_dir.into(),
            trim_chars: DEFAULT_TRIM_CHARS.to_vec(),
        }
    }

    /// Replace the set of characters trimmed from the ends of the
    /// serialized output.  This is purely cosmetic and never changes the
    /// meaning of the document.
    pub fn trim_chars<I>(mut self, chars: I) -> Lineariser
    where
        I: IntoIterator<Item = char>,
    {
        self.trim_chars = chars.into_iter().collect();
        self
    }

    /// Linearise a document given as YAML text.
    ///
    /// ```
    /// use compose_linearise::Lineariser;
    ///
    /// let resolved = Lineariser::new()
    ///     .linearise("a:\n  image: nginx\nb:\n  extends: a\n")
    ///     .unwrap();
    /// assert_eq!(resolved, "a:\n  image: nginx\nb:\n  image: nginx");
    /// ```
    pub fn linearise(&self, text: &str) -> Result<String> {
        self.linearise_with(text, &self.base_dir, "<string>")
    }

    /// Linearise the document stored at `path`.  Relative `file`
    /// references are resolved against the document's own directory.
    pub fn linearise_path<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).chain_err(|| ErrorKind::ReadFile(path.to_owned()))?;
        let base_dir = match path.parent() {
            Some(parent) => parent.to_owned(),
            None => PathBuf::from("."),
        };
        self.linearise_with(&text, &base_dir, &path.display().to_string())
    }

    fn linearise_with(&self, text: &str, base_dir: &Path, source: &str) -> Result<String> {
        let document = codec::parse(text)
            .chain_err(|| ErrorKind::ParseDocument(source.to_owned()))?;
        let root = match &document {
            Value::Mapping(root) => root,
            _ => {
                return Err(ErrorKind::InvalidStructure(
                    "top-level document is not a mapping".to_owned(),
                )
                .into())
            }
        };
        let output = match root.get(SERVICES) {
            Some(services) => {
                let services = services.as_mapping().ok_or_else(|| {
                    ErrorKind::InvalidStructure("`services` is not a mapping".to_owned())
                })?;
                // Rebuild the document in its own key order, replacing the
                // services and passing every sibling key through verbatim.
                let mut out = Mapping::with_capacity(root.len());
                for (key, value) in root {
                    let value = if key.as_str() == SERVICES {
                        Value::Mapping(resolve::resolve_registry(base_dir, services)?)
                    } else {
                        value.clone()
                    };
                    out.insert(key.clone(), value);
                }
                out
            }
            None => resolve::resolve_registry(base_dir, root)?,
        };
        let serialized = codec::dump(&Value::Mapping(output))?;
        Ok(serialized.trim_matches(&self.trim_chars[..]).to_owned())
    }
}

impl Default for Lineariser {
    fn default() -> Lineariser {
        Lineariser::new()
    }
}

/// Normalize YAML-format data for comparison purposes.  Used by unit
/// tests.
#[cfg(test)]
fn normalize_yaml(yaml: &str) -> String {
    lazy_static! {
        // Trailing whitespace before a newline.
        static ref WS_NL: Regex = Regex::new(" +\n").unwrap();

        static ref NL_EOS: Regex = Regex::new("\n$").unwrap();
    }

    NL_EOS
        .replace_all(&WS_NL.replace_all(yaml, "\n"), "")
        .into_owned()
}

#[cfg(test)]
fn linearise(text: &str) -> String {
    Lineariser::new().linearise(text).unwrap()
}

#[test]
fn flat_documents_resolve_in_place() {
    let out = linearise("common:\n  image: mysql\ndb:\n  extends: common\n  ports: [3306]\n");
    let doc: Value = out.parse().unwrap();
    let db = doc.as_mapping().unwrap().get("db").unwrap().as_mapping().unwrap();
    assert_eq!(db.get("image").unwrap().as_str(), Some("mysql"));
    assert!(db.get("extends").is_none());
}

#[test]
fn wrapped_documents_keep_their_sibling_keys() {
    let out = linearise(
        "version: \"2\"\nservices:\n  common:\n    image: mysql\n  db:\n    extends: common\nnetworks:\n  front: {}\n",
    );
    let doc: Value = out.parse().unwrap();
    let root = doc.as_mapping().unwrap();
    assert_eq!(root.get("version").unwrap().as_str(), Some("2"));
    assert!(root.get("networks").unwrap().as_mapping().unwrap().contains_key("front"));
    // Sibling keys stay where they were declared.
    let keys: Vec<_> = root.keys().map(String::as_str).collect();
    assert_eq!(keys, ["version", "services", "networks"]);
    let db = root.get("services").unwrap().as_mapping().unwrap().get("db").unwrap();
    assert_eq!(db.as_mapping().unwrap().get("image").unwrap().as_str(), Some("mysql"));
}

#[test]
fn documents_without_extends_pass_through() {
    let input = "version: \"2\"\nservices:\n  web:\n    image: nginx\n    ports:\n      - 80\n";
    let out = linearise(input);
    assert_eq!(
        out.parse::<Value>().unwrap(),
        input.parse::<Value>().unwrap()
    );
}

#[test]
fn child_scalars_override_and_sequences_concatenate() {
    let out = linearise(
        "services:\n  base:\n    image: \"a\"\n    ports: [80]\n  web:\n    extends: base\n    image: \"b\"\n    ports: [443]\n",
    );
    let doc: Value = out.parse().unwrap();
    let web = doc
        .as_mapping()
        .unwrap()
        .get("services")
        .unwrap()
        .as_mapping()
        .unwrap()
        .get("web")
        .unwrap()
        .as_mapping()
        .unwrap();
    assert_eq!(web.get("image").unwrap().as_str(), Some("b"));
    assert_eq!(*web.get("ports").unwrap(), "[80, 443]".parse::<Value>().unwrap());
}

#[test]
fn linearising_is_idempotent() {
    let once = linearise(
        "common:\n  image: mysql\n  environment:\n    TZ: UTC\ndb:\n  extends: common\n  environment:\n    DB: app\n",
    );
    let twice = linearise(&once);
    assert_eq!(once, twice);
}

#[test]
fn output_is_trimmed_of_the_document_marker() {
    let out = linearise("web:\n  image: nginx\n");
    assert_eq!(normalize_yaml(&out), "web:\n  image: nginx");
}

#[test]
fn the_trim_character_set_is_configurable() {
    let lineariser = Lineariser::new().trim_chars(['\n', ' ']);
    let out = lineariser.linearise("web:\n  image: nginx\n").unwrap();
    assert!(out.starts_with("---"));
}

#[test]
fn unresolvable_documents_are_rejected() {
    let lineariser = Lineariser::new();
    assert!(lineariser.linearise("").is_err());
    assert!(lineariser.linearise("- just\n- a\n- list\n").is_err());
    assert!(lineariser.linearise("services: 42\n").is_err());
    assert!(lineariser.linearise("services: [unclosed").is_err());
}

#[test]
fn parse_errors_name_the_source() {
    let err = Lineariser::new().linearise("a: [").unwrap_err();
    assert!(err.to_string().contains("<string>"));
}
