//! Record customizations: whole-record rewrites turning raw field text
//! into normalized values.
//!
//! Every built-in is a plain `fn(Record) -> Record` and can be used on its
//! own, composed in a closure, or collected into a [`Pipeline`]. The order
//! of composition is up to the caller; different orders need not agree.
//! For instance splitting `author` before homogenizing the encoding leaves
//! the names encoded element-wise, while the reverse order encodes the
//! joined text first.
//!
//! ```rust
//! use bibtexcustom::customization::{self, Pipeline};
//!
//! let pipeline = Pipeline::new()
//!     .then(customization::author)
//!     .then(customization::page_double_hyphen);
//! let db = bibtexcustom::parse(
//!     "@article{k1, author = {A and B}, pages = {12-23}}",
//!     Some(&pipeline),
//! );
//! let record = &db.as_list()[0];
//! assert_eq!(record.get("author"), Some(&vec!["A", "B"].into()));
//! assert_eq!(record.get_str("pages"), Some("12--23"));
//! ```

mod fields;
mod latex;
mod names;

use std::fmt;

use crate::types::{Record, Value};

pub use self::fields::{
    doi, doi_link, find_doi, journal, keyword, kind, link, page_double_hyphen, parse_link,
};
pub use self::latex::{convert_to_unicode, homogenize_latex_encoding, protect_uppercase};
pub use self::names::{author, editor, split_names, tidy_name, tidy_names};

/// A pure rewrite of one record.
pub trait Customization {
    fn apply(&self, record: Record) -> Record;
}

impl<F> Customization for F
where
    F: Fn(Record) -> Record,
{
    fn apply(&self, record: Record) -> Record {
        self(record)
    }
}

/// An ordered list of customizations, applied first to last.
/// An empty pipeline is the identity.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Customization>>,
}

impl Pipeline {
    pub fn new() -> Pipeline {
        Self::default()
    }

    /// Appends a step.
    pub fn then<C: Customization + 'static>(mut self, step: C) -> Pipeline {
        self.steps.push(Box::new(step));
        self
    }

    pub fn push<C: Customization + 'static>(&mut self, step: C) {
        self.steps.push(Box::new(step));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Field normalization followed by conversion to Unicode. Names end up
    /// as "Last, First" lists, `pages` uses `--` and escapes are decoded.
    pub fn unicode() -> Pipeline {
        Pipeline::new()
            .then(kind)
            .then(author)
            .then(editor)
            .then(tidy_names)
            .then(journal)
            .then(keyword)
            .then(link)
            .then(page_double_hyphen)
            .then(doi)
            .then(convert_to_unicode)
    }

    /// Homogenized LaTeX encoding followed by field normalization.
    pub fn latex() -> Pipeline {
        Pipeline::new()
            .then(homogenize_latex_encoding)
            .then(kind)
            .then(author)
            .then(editor)
            .then(tidy_names)
            .then(journal)
            .then(keyword)
            .then(link)
            .then(page_double_hyphen)
            .then(doi)
    }
}

impl Customization for Pipeline {
    fn apply(&self, record: Record) -> Record {
        self.steps.iter().fold(record, |record, step| step.apply(record))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// Rewrites `name` if it holds plain text. Fields of any other shape, and
/// text for which `f` returns `None`, are left as they are.
pub(crate) fn rewrite_text<F>(mut record: Record, name: &str, f: F) -> Record
where
    F: FnOnce(&str) -> Option<Value>,
{
    let rewritten = match record.fields.get(name) {
        Some(Value::Text(text)) => f(text),
        _ => None,
    };
    if let Some(value) = rewritten {
        record.fields.insert(name.to_string(), value);
    }
    record
}
