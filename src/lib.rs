//! Resolve `extends:` inheritance in `docker-compose.yml` files.
//!
//! A service description may name another service as its base, either in
//! the same document or in another file on disk, and override or add to
//! the fields it inherits.  Downstream tools should never have to
//! understand that inheritance: this library rewrites a document so that
//! every `extends` relationship is resolved and inlined, leaving each
//! service fully self-contained.
//!
//! Inherited fields merge type-aware: a child's scalar replaces the
//! parent's, sequences concatenate (parent entries first), and mappings
//! such as `environment` merge key by key, recursively.
//!
//! ```
//! use compose_linearise::{Lineariser, Value};
//!
//! let yaml = r#"---
//! version: "2"
//! services:
//!   common:
//!     image: mysql
//!     environment:
//!       TZ: UTC
//!   db:
//!     extends: common
//!     environment:
//!       MYSQL_DATABASE: app
//! "#;
//!
//! let resolved = Lineariser::new().linearise(yaml).unwrap();
//!
//! let doc: Value = resolved.parse().unwrap();
//! let services = doc.as_mapping().unwrap().get("services").unwrap();
//! let db = services.as_mapping().unwrap().get("db").unwrap().as_mapping().unwrap();
//! assert_eq!(db.get("image").unwrap().as_str(), Some("mysql"));
//! assert!(db.get("extends").is_none());
//!
//! let environment = db.get("environment").unwrap().as_mapping().unwrap();
//! assert_eq!(environment.get("TZ").unwrap().as_str(), Some("UTC"));
//! assert_eq!(environment.get("MYSQL_DATABASE").unwrap().as_str(), Some("app"));
//! ```
//!
//! A parent in another file is named with the two-key mapping form, and the
//! path is resolved against the lineariser's base directory:
//!
//! ```yaml
//! web:
//!   extends:
//!     service: base
//!     file: common.yml
//! ```
//!
//! A parent named by a bare service name must be declared earlier in the
//! document than the service extending it; an unknown (or not yet
//! resolved) name is not an error, the child simply inherits nothing and a
//! warning is logged.

// Enable as many useful Rust and Clippy warnings as we can stand.  We'd
// also enable `trivial_casts`, but we're waiting for
// https://github.com/rust-lang/rust/issues/23416.
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces,
    clippy::all
)]

pub mod codec;
pub mod errors;
mod lineariser;
pub mod merge;
pub mod resolve;
pub mod value;

pub use crate::lineariser::{Lineariser, DEFAULT_TRIM_CHARS};
pub use crate::merge::Combine;
pub use crate::value::{Mapping, Scalar, Value};
