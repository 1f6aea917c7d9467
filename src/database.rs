use std::collections::HashMap;
use std::slice;
use std::vec;

use crate::customization::Customization;
use crate::errors::SkippedEntry;
use crate::types::Record;

/// All records of one parse pass, in input order.
#[derive(Clone, Debug, Default)]
pub struct Database {
    pub(crate) records: Vec<Record>,
    pub(crate) skipped: Vec<SkippedEntry>,
}

impl Database {
    pub fn new() -> Database {
        Self::default()
    }

    pub fn as_list(&self) -> &[Record] {
        &self.records
    }

    pub fn into_list(self) -> Vec<Record> {
        self.records
    }

    /// Records keyed by `id`. If several records share an `id`, the last
    /// one in input order wins.
    pub fn as_map(&self) -> HashMap<&str, &Record> {
        self.records.iter().map(|r| (r.id.as_str(), r)).collect()
    }

    /// Looks up a record by `id` with the same precedence as [`Database::as_map`].
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().rev().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Entries dropped because they were malformed.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Replaces every record by the customization's output, once each,
    /// in database order.
    pub fn customize(&mut self, customization: &dyn Customization) {
        let records = std::mem::take(&mut self.records);
        self.records = records
            .into_iter()
            .map(|record| {
                log::trace!("customizing record '{}'", record.id);
                customization.apply(record)
            })
            .collect();
    }
}

impl IntoIterator for Database {
    type Item = Record;
    type IntoIter = vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<Record> for Database {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Database {
            records: iter.into_iter().collect(),
            skipped: Vec::new(),
        }
    }
}

impl<'d> IntoIterator for &'d Database {
    type Item = &'d Record;
    type IntoIter = slice::Iter<'d, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Database {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Database {
        Database {
            records: vec![
                Record::new("article", "a").with("title", "first"),
                Record::new("book", "b"),
                Record::new("misc", "a").with("title", "second"),
            ],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_map_last_write_wins() {
        let db = sample();
        let map = db.as_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"].kind, "misc");
        assert_eq!(db.get("a").and_then(|r| r.get_str("title")), Some("second"));
    }

    #[test]
    fn test_customize_in_order() {
        let mut db = sample();
        let seen = std::cell::RefCell::new(Vec::new());
        let record_order = |record: Record| {
            seen.borrow_mut().push(record.id.clone());
            record.with("seen", "yes")
        };
        db.customize(&record_order);
        assert_eq!(*seen.borrow(), vec!["a", "b", "a"]);
        assert!(db.iter().all(|r| r.get_str("seen") == Some("yes")));
    }
}
