use crate::encoding::EncodingConverter;
use crate::types::{Record, Value};

/// Wraps uppercase ASCII letters in braces so that bibliography styles
/// keep their case, e.g. “An amazing title” becomes “{A}n amazing title”.
/// Letters right after `{` or right before `}` count as protected already,
/// and control sequence names are never touched.
pub fn protect_uppercase(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let chr = chars[i];
        if chr == '\\' {
            result.push(chr);
            i += 1;
            if chars.get(i).map_or(false, char::is_ascii_alphabetic) {
                while let Some(&letter) = chars.get(i).filter(|c| c.is_ascii_alphabetic()) {
                    result.push(letter);
                    i += 1;
                }
            } else if let Some(&symbol) = chars.get(i) {
                result.push(symbol);
                i += 1;
            }
            continue;
        }
        let protected = (i > 0 && chars[i - 1] == '{') || chars.get(i + 1) == Some(&'}');
        if chr.is_ascii_uppercase() && !protected {
            result.push('{');
            result.push(chr);
            result.push('}');
        } else {
            result.push(chr);
        }
        i += 1;
    }
    result
}

/// Decodes every TeX escape in every field, lists and maps included.
pub fn convert_to_unicode(mut record: Record) -> Record {
    let converter = EncodingConverter::builtin();
    record.fields = record
        .fields
        .into_iter()
        .map(|(name, value)| (name, value.map_text(&mut |text| converter.decode(text))))
        .collect();
    record
}

/// Brings every field into one LaTeX spelling: accented characters,
/// escaped or not, become braced escapes like `{\'e}`, and uppercase
/// letters of `title` are protected with braces.
pub fn homogenize_latex_encoding(mut record: Record) -> Record {
    let converter = EncodingConverter::builtin();
    record.fields = record
        .fields
        .into_iter()
        .map(|(name, value)| {
            let mut value = value.map_text(&mut |text| converter.normalize(text));
            if name == "title" {
                log::trace!("protecting uppercase letters in title of '{}'", record.id);
                value = value.map_text(&mut |text| protect_uppercase(text));
            }
            (name, value)
        })
        .collect();
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_protect_uppercase() {
        assert_eq!(protect_uppercase("An amazing title"), "{A}n amazing title");
        assert_eq!(
            protect_uppercase("Dynamics of Polymeric Liquid"),
            "{D}ynamics of {P}olymeric {L}iquid"
        );
        assert_eq!(protect_uppercase("{A}n {DNA} test"), "{A}n {D{N}A} test");
        assert_eq!(protect_uppercase(r"\LaTeX{} and {\'E}cole"), r"\LaTeX{} and {\'E}cole");
        assert_eq!(protect_uppercase(r"{\c C}a"), r"{\c C}a");
    }

    #[test]
    fn test_protect_uppercase_idempotent() {
        let once = protect_uppercase("Dynamics of Polymeric Liquid");
        assert_eq!(protect_uppercase(&once), once);
    }

    #[test]
    fn test_convert_to_unicode() {
        let record = convert_to_unicode(
            Record::new("article", "Laide2013")
                .with("author", vec![r"Laid{\'e}, Jean"])
                .with("title", r"{\`a} la carte"),
        );
        assert_eq!(record.get("author"), Some(&vec!["Laidé, Jean"].into()));
        assert_eq!(record.get_str("title"), Some("à la carte"));
        assert_eq!(record.id, "Laide2013");
    }

    #[test]
    fn test_homogenize() {
        let record = homogenize_latex_encoding(
            Record::new("article", "Cesar_2013")
                .with("title", "An amazing title: à")
                .with("journal", "Elémentaire")
                .with("author", r"Jean C\'esar"),
        );
        assert_eq!(record.get_str("title"), Some(r"{A}n amazing title: {\`a}"));
        assert_eq!(record.get_str("journal"), Some(r"El{\'e}mentaire"));
        assert_eq!(record.get_str("author"), Some(r"Jean C{\'e}sar"));
        assert_eq!(homogenize_latex_encoding(record.clone()), record);
    }

    #[test]
    fn test_homogenize_recurses_into_lists() {
        let record = homogenize_latex_encoding(
            Record::new("article", "k").with("author", vec!["Jean César", "Ben Loaeb"]),
        );
        assert_eq!(
            record.get("author"),
            Some(&Value::from(vec![r"Jean C{\'e}sar", "Ben Loaeb"]))
        );
    }
}
