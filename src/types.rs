use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

/// The data of one field.
///
/// Every field starts out as `Text`. Customizations may turn it into a
/// `List` (e.g. split author names) or a `Map` (e.g. a structured journal
/// reference), and lists may hold maps (e.g. parsed links).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Text(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Applies `f` to every string nested in this value, leaving the
    /// list and map structure as it is.
    pub fn map_text<F: FnMut(&str) -> String>(self, f: &mut F) -> Value {
        match self {
            Self::Text(s) => Self::Text(f(&s)),
            Self::List(items) => Self::List(items.into_iter().map(|v| v.map_text(f)).collect()),
            Self::Map(map) => Self::Map(map.into_iter().map(|(k, v)| (k, v.map_text(f))).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// One entry in a `.bib` file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// entry type, lower-cased, e.g. “article”
    pub kind: String,
    /// citation key, case preserved, e.g. “DBLP:books/lib/Knuth97”
    pub id: String,
    /// map of fields with lower-case names, e.g. “author” mapped to “Donald Ervin Knuth”
    pub fields: HashMap<String, Value>,
}

impl Record {
    pub fn new<K: Into<String>, I: Into<String>>(kind: K, id: I) -> Record {
        Record {
            kind: kind.into(),
            id: id.into(),
            fields: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The field's data if it is still plain text.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Sets a field, folding its name to lower-case. Returns the previous data.
    pub fn insert<V: Into<Value>>(&mut self, name: &str, value: V) -> Option<Value> {
        self.fields.insert(name.to_lowercase(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Builder-style variant of [`Record::insert`].
    pub fn with<V: Into<Value>>(mut self, name: &str, value: V) -> Record {
        self.insert(name, value);
        self
    }

    /// The raw key of the entry this one inherits from. It is never resolved.
    pub fn crossref(&self) -> Option<&str> {
        self.get_str("crossref")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let sorted: BTreeMap<&String, &Value> = self.fields.iter().collect();
        let mut map = serializer.serialize_map(Some(sorted.len() + 2))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry("id", &self.id)?;
        for (name, value) in sorted {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_folds_case() {
        let mut record = Record::new("article", "Cesar2013");
        record.insert("Author", "Jean César");
        assert_eq!(record.get_str("author"), Some("Jean César"));
        assert_eq!(record.get("Author"), None);
        assert_eq!(
            record.insert("AUTHOR", "Someone else"),
            Some(Value::from("Jean César"))
        );
    }

    #[test]
    fn test_map_text_keeps_shape() {
        let mut link = BTreeMap::new();
        link.insert("url".to_string(), Value::from("a"));
        let value = Value::List(vec![Value::from("b"), Value::Map(link)]);
        let upper = value.map_text(&mut |s| s.to_uppercase());

        let mut expected_link = BTreeMap::new();
        expected_link.insert("url".to_string(), Value::from("A"));
        assert_eq!(
            upper,
            Value::List(vec![Value::from("B"), Value::Map(expected_link)])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec!["A", "B"]).to_string(), "A; B");
        let mut journal = BTreeMap::new();
        journal.insert("id".to_string(), Value::from("NiceJournal"));
        journal.insert("name".to_string(), Value::from("Nice Journal"));
        assert_eq!(
            Value::Map(journal).to_string(),
            "{id: NiceJournal, name: Nice Journal}"
        );
    }

    #[test]
    fn test_crossref() {
        let record = Record::new("inbook", "x").with("crossref", "parentkey");
        assert_eq!(record.crossref(), Some("parentkey"));
    }
}
