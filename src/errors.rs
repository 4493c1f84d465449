//! We provide fancy error-handling support thanks to the [`error_chain`
//! crate][error_chain].  The primary advantage of `error_chain` is that it
//! provides support for backtraces.  The secondary advantage of this crate
//! is that it gives us nice, structured error types.
//!
//! [error_chain]: https://github.com/brson/error-chain

// Sadly, this macro does not generate complete documentation.
#![allow(missing_docs)]

use error_chain::error_chain;
use std::path::PathBuf;

error_chain! {
    // These are external, non-`error_chain` error types that we can
    // automatically wrap.
    foreign_links {
        // The YAML scanner choked on the raw text of a document.
        YamlScan(::yaml_rust::ScanError);
    }

    // These are our "native" error types.
    errors {
        /// An error occurred reading a file.
        ReadFile(path: PathBuf) {
            description("error reading file")
            display("error reading file '{}'", path.display())
        }

        /// A document could not be parsed as YAML.  The string names the
        /// source the text came from: a file path, or `<string>` for
        /// in-memory input.
        ParseDocument(source: String) {
            description("cannot parse YAML document")
            display("cannot parse YAML document from '{}'", source)
        }

        /// A resolved document could not be serialized back to YAML.
        DumpDocument(detail: String) {
            description("cannot serialize YAML document")
            display("cannot serialize YAML document: {}", detail)
        }

        /// The document parsed, but its shape is not one we can resolve:
        /// a non-mapping root, a non-mapping `services` value, an empty or
        /// multi-document stream, and similar configuration mistakes.
        InvalidStructure(reason: String) {
            description("invalid document structure")
            display("invalid document structure: {}", reason)
        }
    }
}
