use crate::customization::rewrite_text;
use crate::types::{Record, Value};

/// Particles that belong to the last name, e.g. “van” in “Ludwig van Beethoven”.
const PARTICLES: &[&str] = &["ben", "de", "der", "la", "le", "van", "von"];

const SUFFIXES: &[&str] = &["jr", "jr.", "junior"];

/// Brace balance of one word, ignoring escaped braces.
fn brace_delta(word: &str) -> i32 {
    let mut delta = 0;
    let mut escape = false;
    for chr in word.chars() {
        match chr {
            _ if escape => escape = false,
            '\\' => escape = true,
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Whitespace-separated words, keeping braced groups like
/// “{Barnes and Noble}” together.
fn grouped_words(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    let mut depth = 0;
    for word in text.split_whitespace() {
        if depth > 0 {
            if let Some(last) = words.last_mut() {
                last.push(' ');
                last.push_str(word);
            }
        } else {
            words.push(word.to_string());
        }
        depth = (depth + brace_delta(word)).max(0);
    }
    words
}

/// Splits a name list on the word `and`. Occurrences inside braces do
/// not count, whitespace inside each name is collapsed and empty names
/// are dropped.
pub fn split_names(names: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for word in grouped_words(names) {
        if word == "and" {
            if !current.is_empty() {
                result.push(current.join(" "));
            }
            current.clear();
        } else {
            current.push(word);
        }
    }
    if !current.is_empty() {
        result.push(current.join(" "));
    }
    result
}

fn split_name_field(record: Record, name: &str) -> Record {
    rewrite_text(record, name, |text| {
        if text.trim().is_empty() {
            None
        } else {
            Some(Value::from(split_names(text)))
        }
    })
}

/// Splits `author` into a list of names.
pub fn author(record: Record) -> Record {
    split_name_field(record, "author")
}

/// Splits `editor` into a list of names.
pub fn editor(record: Record) -> Record {
    split_name_field(record, "editor")
}

/// Position of the first comma outside braces.
fn top_level_comma(name: &str) -> Option<usize> {
    let mut depth = 0;
    for (i, chr) in name.char_indices() {
        match chr {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Rewrites “First Middle Last” as “Last, First Middle”. Names already
/// in comma form and single words are returned trimmed but unchanged.
pub fn tidy_name(name: &str) -> String {
    let name = name.trim();
    if let Some(comma) = top_level_comma(name) {
        let last = name[..comma].trim();
        let firsts = name[comma + 1..].split_whitespace().collect::<Vec<_>>().join(" ");
        if firsts.is_empty() {
            return last.to_string();
        }
        return format!("{}, {}", last, firsts);
    }

    let mut words = grouped_words(name);
    if words.len() < 2 {
        return name.to_string();
    }
    let mut suffix = None;
    if words.len() > 2 && SUFFIXES.contains(&words[words.len() - 1].to_lowercase().as_str()) {
        suffix = words.pop();
    }
    let mut last = words.pop().unwrap_or_default();
    while words.len() > 1 && PARTICLES.contains(&words[words.len() - 1].as_str()) {
        if let Some(particle) = words.pop() {
            last = format!("{} {}", particle, last);
        }
    }
    match suffix {
        Some(suffix) => format!("{}, {}, {}", last, suffix, words.join(" ")),
        None => format!("{}, {}", last, words.join(" ")),
    }
}

fn tidy_list(mut record: Record, name: &str) -> Record {
    if let Some(Value::List(items)) = record.fields.get_mut(name) {
        for item in items.iter_mut() {
            if let Value::Text(text) = item {
                *text = tidy_name(text);
            }
        }
    }
    record
}

/// Brings every name of a split `author` or `editor` list into
/// “Last, First” form. Text fields are left alone, so run it after
/// [`author`] and [`editor`].
pub fn tidy_names(record: Record) -> Record {
    let record = tidy_list(record, "author");
    tidy_list(record, "editor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_names() {
        assert_eq!(split_names("A and B"), vec!["A", "B"]);
        assert_eq!(
            split_names("Bird, R.B. and Armstrong, R.C. and\n  Hassager, O."),
            vec!["Bird, R.B.", "Armstrong, R.C.", "Hassager, O."]
        );
        assert_eq!(split_names("Jean  César"), vec!["Jean César"]);
        assert_eq!(split_names("and A and and B and"), vec!["A", "B"]);
        assert_eq!(split_names("Ferdinand Anderson"), vec!["Ferdinand Anderson"]);
        assert_eq!(split_names("A AND B"), vec!["A AND B"]);
    }

    #[test]
    fn test_split_names_respects_braces() {
        assert_eq!(
            split_names("{Barnes and Noble} and Smith, J."),
            vec!["{Barnes and Noble}", "Smith, J."]
        );
    }

    #[test]
    fn test_author_field_shapes() {
        let record = author(Record::new("article", "k").with("author", "A and B"));
        assert_eq!(record.get("author"), Some(&vec!["A", "B"].into()));

        let again = author(record.clone());
        assert_eq!(again, record);

        let blank = author(Record::new("article", "k").with("author", "  "));
        assert_eq!(blank.get_str("author"), Some("  "));

        let missing = author(Record::new("article", "k"));
        assert_eq!(missing.get("author"), None);
    }

    #[test]
    fn test_tidy_name() {
        assert_eq!(tidy_name("Jean César"), "César, Jean");
        assert_eq!(tidy_name("Bird, R.B."), "Bird, R.B.");
        assert_eq!(tidy_name("A"), "A");
        assert_eq!(tidy_name("Donald Ervin Knuth"), "Knuth, Donald Ervin");
        assert_eq!(tidy_name("Ludwig van Beethoven"), "van Beethoven, Ludwig");
        assert_eq!(tidy_name("Martin Luther King Jr."), "King, Jr., Martin Luther");
        assert_eq!(tidy_name("{Barnes and Noble}"), "{Barnes and Noble}");
        assert_eq!(tidy_name("John {Doe Smith}"), "{Doe Smith}, John");
    }

    #[test]
    fn test_tidy_names_on_lists_only() {
        let record = Record::new("book", "k")
            .with("author", vec!["Jean César"])
            .with("editor", "Jean César");
        let record = tidy_names(record);
        assert_eq!(record.get("author"), Some(&vec!["César, Jean"].into()));
        assert_eq!(record.get_str("editor"), Some("Jean César"));
    }
}
