//! This crate reads `.bib` files in pure, safe rust and normalizes their
//! fields with a pipeline of customizations.
//!
//! `.bib` files are popular in reference management since many resources
//! allow to export metadata in a BibTeχ or BibLaTeχ file. One entry
//! in such a file can look like this:
//!
//! ```tex
//! @book{DBLP:books/aw/Knuth73a,
//!     author    = {Donald E. Knuth},
//!     title     = {The Art of Computer Programming, Volume {I:} Fundamental Algorithms,
//!                  2nd Edition},
//!     publisher = {Addison-Wesley},
//!     year      = {1973},
//!     url       = {https://www.worldcat.org/oclc/310903895},
//!     isbn      = {0201038218},
//!  }
//! ```
//!
//! ([original source](https://dblp.uni-trier.de/rec/books/aw/Knuth73a.html?view=bibtex&param=2))
//! In this example, we call `book` the `kind` or `type` and `DBLP:books/aw/Knuth73a` the `id`.
//! Then we have a sequence of fields with a name (like `year`) and data (like `1973`).
//! The formal grammar is not well-specified, but [Tame the BeaST](https://ftp.rrze.uni-erlangen.de/ctan/info/bibtex/tamethebeast/ttb_en.pdf)
//! provides some insights.
//!
//! Parsing never fails on bad data: a malformed entry is dropped, reported
//! through [`Database::skipped`], and parsing continues with the next line
//! starting with `@`. `@string` macros are expanded, `@comment` and
//! `@preamble` blocks are ignored.
//!
//! ```rust
//! use bibtexcustom::customization::{self, Pipeline};
//!
//! let src = r#"@string{me = "Jean"}
//! @article{k1, author = me # " and Pierre", pages = "12-23"}"#;
//!
//! let raw = bibtexcustom::parse(src, None);
//! assert_eq!(raw.as_list()[0].get_str("author"), Some("Jean and Pierre"));
//!
//! let pipeline = Pipeline::new()
//!     .then(customization::author)
//!     .then(customization::page_double_hyphen);
//! let db = bibtexcustom::parse(src, Some(&pipeline));
//! let record = db.as_map()["k1"];
//! assert_eq!(record.get("author"), Some(&vec!["Jean", "Pierre"].into()));
//! assert_eq!(record.get_str("pages"), Some("12--23"));
//! ```
//!
//! Field data starts out as text; customizations may turn it into lists
//! and maps (see [`Value`]). They are plain `fn(Record) -> Record` and are
//! applied in the order the caller chooses.

mod config;
mod database;
mod errors;
mod lexer;
mod parser;
mod types;

pub mod customization;
pub mod encoding;

pub use crate::config::{ParserConfig, FIELD_ALIASES, MONTH_STRINGS, STANDARD_TYPES};
pub use crate::customization::{Customization, Pipeline};
pub use crate::database::Database;
pub use crate::errors::{Error, Result, SkippedEntry, StructuralError};
pub use crate::lexer::Position;
pub use crate::parser::{BibEntries, Parser};
pub use crate::types::{Record, Value};

/// Parses `text` and applies `customization` to every record, in order.
/// An empty text gives an empty database.
pub fn parse(text: &str, customization: Option<&dyn Customization>) -> Database {
    let mut db = Parser::from_string(text.to_string()).parse();
    if let Some(customization) = customization {
        db.customize(customization);
    }
    db
}

/// Like [`parse`], for input that still has to be checked for UTF-8.
pub fn parse_bytes(bytes: &[u8], customization: Option<&dyn Customization>) -> Result<Database> {
    let text = std::str::from_utf8(bytes)?;
    Ok(parse(text, customization))
}
