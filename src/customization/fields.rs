use std::collections::BTreeMap;

use crate::customization::rewrite_text;
use crate::types::{Record, Value};

/// Fields scanned by [`doi`], in order of precedence.
const DOI_SOURCES: &[&str] = &["url", "link", "note", "howpublished"];

/// Lower-cases the entry type.
pub fn kind(mut record: Record) -> Record {
    record.kind = record.kind.to_lowercase();
    record
}

fn split_keywords(text: &str) -> Value {
    Value::from(
        text.split(|c: char| c == ',' || c == ';')
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
            .collect::<Vec<_>>(),
    )
}

/// Splits `keyword` and `keywords` on commas and semicolons.
pub fn keyword(record: Record) -> Record {
    let record = rewrite_text(record, "keyword", |text| Some(split_keywords(text)));
    rewrite_text(record, "keywords", |text| Some(split_keywords(text)))
}

/// Parses one `url[:anchor][:mimetype]` token. The colon of a URL
/// scheme (`https://`) does not separate parts, and a part containing a
/// slash is taken as the mimetype.
pub fn parse_link(token: &str) -> Option<BTreeMap<String, Value>> {
    let scheme_end = token.find("://").map_or(0, |i| i + 3);
    let mut parts = token[scheme_end..].split(':');
    let url_tail = parts.next()?;
    if url_tail.is_empty() {
        return None;
    }
    let mut link = BTreeMap::new();
    link.insert(
        "url".to_string(),
        Value::from(&token[..scheme_end + url_tail.len()]),
    );

    let rest: Vec<&str> = parts.collect();
    if rest.len() > 2 {
        return None;
    }
    for (i, part) in rest.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        let is_last = i + 1 == rest.len();
        if part.contains('/') {
            if !is_last || link.contains_key("mimetype") {
                return None;
            }
            link.insert("mimetype".to_string(), Value::from(*part));
        } else {
            if link.contains_key("anchor") {
                return None;
            }
            link.insert("anchor".to_string(), Value::from(*part));
        }
    }
    Some(link)
}

/// Turns `link` into a list of `{url, anchor, mimetype}` maps. Tokens are
/// separated by whitespace or semicolons; tokens that do not parse are
/// dropped.
pub fn link(record: Record) -> Record {
    rewrite_text(record, "link", |text| {
        let links = text
            .split(|c: char| c.is_whitespace() || c == ';')
            .filter(|token| !token.is_empty())
            .filter_map(|token| {
                let parsed = parse_link(token);
                if parsed.is_none() {
                    log::debug!("ignoring malformed link '{}'", token);
                }
                parsed
            })
            .map(Value::Map)
            .collect();
        Some(Value::List(links))
    })
}

/// A page number like `12`, `e12` or `12a`: alphanumeric, starting or
/// ending with a digit.
fn is_page_token(token: &str) -> bool {
    let starts = token.chars().next().map_or(false, |c| c.is_ascii_digit());
    let ends = token.chars().last().map_or(false, |c| c.is_ascii_digit());
    (starts || ends) && token.chars().all(char::is_alphanumeric)
}

/// Rewrites the first hyphen between two page numbers as `--`.
/// Nothing happens if `--` is already present.
fn double_hyphen(pages: &str) -> Option<String> {
    if pages.contains("--") {
        return None;
    }
    for (i, chr) in pages.char_indices() {
        if chr != '-' {
            continue;
        }
        let before = pages[..i].trim_end();
        let before = before
            .rsplit(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or("");
        let after = pages[i + 1..].trim_start();
        let after = after
            .split(|c: char| !c.is_alphanumeric())
            .next()
            .unwrap_or("");
        if is_page_token(before) && is_page_token(after) {
            return Some(format!("{}-{}", &pages[..=i], &pages[i + 1..]));
        }
    }
    None
}

/// `pages = {12-23}` becomes `12--23`.
pub fn page_double_hyphen(record: Record) -> Record {
    rewrite_text(record, "pages", |pages| double_hyphen(pages).map(Value::from))
}

/// Turns `journal` into `{id, name}`, where `id` keeps only the
/// alphanumeric characters of the name.
pub fn journal(record: Record) -> Record {
    rewrite_text(record, "journal", |name| {
        let mut journal = BTreeMap::new();
        let id: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
        journal.insert("id".to_string(), Value::from(id));
        journal.insert("name".to_string(), Value::from(name));
        Some(Value::Map(journal))
    })
}

/// Finds the first DOI (`10.<digits>/<suffix>`) in `text`. Trailing
/// punctuation is not part of the match.
pub fn find_doi(text: &str) -> Option<&str> {
    let mut search = 0;
    while let Some(found) = text[search..].find("10.") {
        let start = search + found;
        search = start + 3;
        if text[..start]
            .chars()
            .last()
            .map_or(false, |c| c.is_ascii_alphanumeric())
        {
            continue;
        }
        let registrant = &text[start + 3..];
        if !registrant.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let registrant_len = registrant
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .count();
        let suffix = match registrant[registrant_len..].strip_prefix('/') {
            Some(suffix) => suffix,
            None => continue,
        };
        let suffix_len: usize = suffix
            .chars()
            .take_while(|c| !c.is_whitespace() && !matches!(*c, '"' | '{' | '}' | '<' | '>'))
            .map(char::len_utf8)
            .sum();
        let suffix = suffix[..suffix_len].trim_end_matches(&['.', ',', ';'][..]);
        if suffix.is_empty() {
            continue;
        }
        let end = start + 3 + registrant_len + 1 + suffix.len();
        return Some(&text[start..end]);
    }
    None
}

fn find_doi_in(value: &Value) -> Option<&str> {
    match value {
        Value::Text(text) => find_doi(text),
        Value::List(items) => items.iter().find_map(find_doi_in),
        Value::Map(map) => map.values().find_map(find_doi_in),
    }
}

/// Sets `doi` from the first DOI found in `url`, `link`, `note` or
/// `howpublished`. The source field keeps its text.
pub fn doi(mut record: Record) -> Record {
    let found = DOI_SOURCES
        .iter()
        .find_map(|name| record.get(name).and_then(find_doi_in))
        .map(str::to_string);
    if let Some(found) = found {
        record.insert("doi", found);
    }
    record
}

/// Adds `{url: https://doi.org/<doi>, anchor: doi}` to the `link` list
/// unless a link anchored `doi` is there already. Expects [`link`] to
/// have run; a text `link` is left alone.
pub fn doi_link(mut record: Record) -> Record {
    let target = match record.get_str("doi") {
        Some(doi) if doi.starts_with("10.") => format!("https://doi.org/{}", doi.trim()),
        Some(doi) => doi.trim().to_string(),
        None => return record,
    };
    let mut entry = BTreeMap::new();
    entry.insert("url".to_string(), Value::from(target));
    entry.insert("anchor".to_string(), Value::from("doi"));

    match record.fields.get_mut("link") {
        None => {
            record.insert("link", Value::List(vec![Value::Map(entry)]));
        }
        Some(Value::List(links)) => {
            let anchored = links.iter().any(|link| {
                link.as_map()
                    .and_then(|map| map.get("anchor"))
                    .map_or(false, |anchor| anchor == "doi")
            });
            if !anchored {
                links.push(Value::Map(entry));
            }
        }
        Some(_) => {}
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn link_map(pairs: &[(&str, &str)]) -> Value {
        Value::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect(),
        )
    }

    #[test]
    fn test_kind() {
        assert_eq!(kind(Record::new("InProceedings", "k")).kind, "inproceedings");
    }

    #[test]
    fn test_keyword() {
        let record = keyword(
            Record::new("article", "k")
                .with("keyword", "keyword1, keyword2")
                .with("keywords", " a;b ,, c "),
        );
        assert_eq!(record.get("keyword"), Some(&vec!["keyword1", "keyword2"].into()));
        assert_eq!(record.get("keywords"), Some(&vec!["a", "b", "c"].into()));
    }

    #[test]
    fn test_parse_link() {
        assert_eq!(
            parse_link("https://example.org/paper.pdf:fulltext:application/pdf").map(Value::Map),
            Some(link_map(&[
                ("url", "https://example.org/paper.pdf"),
                ("anchor", "fulltext"),
                ("mimetype", "application/pdf"),
            ]))
        );
        assert_eq!(
            parse_link("papers/x.pdf:application/pdf").map(Value::Map),
            Some(link_map(&[("url", "papers/x.pdf"), ("mimetype", "application/pdf")]))
        );
        assert_eq!(
            parse_link("http://a.org").map(Value::Map),
            Some(link_map(&[("url", "http://a.org")]))
        );
        assert_eq!(parse_link(":anchor"), None);
        assert_eq!(parse_link("a:b:c:d"), None);
        assert_eq!(parse_link("a:text/html:anchor"), None);
    }

    #[test]
    fn test_link() {
        let record = link(Record::new("misc", "k").with(
            "link",
            "http://a.org:home; b.pdf:application/pdf\n:broken",
        ));
        assert_eq!(
            record.get("link"),
            Some(&Value::List(vec![
                link_map(&[("url", "http://a.org"), ("anchor", "home")]),
                link_map(&[("url", "b.pdf"), ("mimetype", "application/pdf")]),
            ]))
        );
    }

    #[test]
    fn test_double_hyphen() {
        assert_eq!(double_hyphen("12-23"), Some("12--23".to_string()));
        assert_eq!(double_hyphen("12 - 23"), Some("12 -- 23".to_string()));
        assert_eq!(double_hyphen("e12-e18"), Some("e12--e18".to_string()));
        assert_eq!(double_hyphen("1-2, 5-6"), Some("1--2, 5-6".to_string()));
        assert_eq!(double_hyphen("12--23"), None);
        assert_eq!(double_hyphen("-12"), None);
        assert_eq!(double_hyphen("42"), None);
        assert_eq!(double_hyphen("Jean-Pierre"), None);
        assert_eq!(double_hyphen("pp. iv-x"), None);
        assert_eq!(double_hyphen("see Jean-Pierre, 3-7"), Some("see Jean-Pierre, 3--7".to_string()));
    }

    #[test]
    fn test_page_double_hyphen_ignores_words() {
        let record = page_double_hyphen(Record::new("book", "k").with("pages", "Jean-Pierre"));
        assert_eq!(record.get_str("pages"), Some("Jean-Pierre"));
    }

    #[test]
    fn test_page_double_hyphen_idempotent() {
        let once = page_double_hyphen(Record::new("article", "k").with("pages", "12-23"));
        assert_eq!(once.get_str("pages"), Some("12--23"));
        assert_eq!(page_double_hyphen(once.clone()), once);
    }

    #[test]
    fn test_journal() {
        let record = journal(Record::new("article", "k").with("journal", "Nice Journal"));
        assert_eq!(
            record.get("journal"),
            Some(&link_map(&[("id", "NiceJournal"), ("name", "Nice Journal")]))
        );
        assert_eq!(journal(record.clone()), record);
    }

    #[test]
    fn test_find_doi() {
        assert_eq!(find_doi("see doi:10.1000/xyz123."), Some("10.1000/xyz123"));
        assert_eq!(
            find_doi("https://doi.org/10.1145/3290605.3300233"),
            Some("10.1145/3290605.3300233")
        );
        assert_eq!(find_doi("{10.1000/abc}"), Some("10.1000/abc"));
        assert_eq!(find_doi("version 210.5/x"), None);
        assert_eq!(find_doi("10.abc/x"), None);
        assert_eq!(find_doi("10.1000/"), None);
        assert_eq!(find_doi("nothing here"), None);
    }

    #[test]
    fn test_doi_keeps_source() {
        let record = doi(Record::new("article", "k")
            .with("note", "Published as 10.1000/182")
            .with("doi", "stale"));
        assert_eq!(record.get_str("doi"), Some("10.1000/182"));
        assert_eq!(record.get_str("note"), Some("Published as 10.1000/182"));
    }

    #[test]
    fn test_doi_prefers_url() {
        let record = doi(Record::new("article", "k")
            .with("note", "10.1000/from-note")
            .with("url", "https://doi.org/10.1000/from-url"));
        assert_eq!(record.get_str("doi"), Some("10.1000/from-url"));
    }

    #[test]
    fn test_doi_link() {
        let record = doi_link(Record::new("article", "k").with("doi", "10.1000/182"));
        let expected = Value::List(vec![link_map(&[
            ("url", "https://doi.org/10.1000/182"),
            ("anchor", "doi"),
        ])]);
        assert_eq!(record.get("link"), Some(&expected));
        assert_eq!(doi_link(record.clone()), record);

        let text_link = doi_link(
            Record::new("article", "k")
                .with("doi", "10.1000/182")
                .with("link", "http://a.org"),
        );
        assert_eq!(text_link.get_str("link"), Some("http://a.org"));
    }
}
