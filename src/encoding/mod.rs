//! Conversion between TeX escapes (`{\'e}`) and the characters they stand
//! for (`é`), driven by an [`EncodingTable`].

mod table;

pub use self::table::{EncodingTable, Escape};

/// Decodes and encodes text with a borrowed, read-only table.
#[derive(Clone, Copy, Debug)]
pub struct EncodingConverter<'t> {
    table: &'t EncodingTable,
}

impl EncodingConverter<'static> {
    /// A converter over [`EncodingTable::builtin`].
    pub fn builtin() -> EncodingConverter<'static> {
        EncodingConverter::new(EncodingTable::builtin())
    }
}

impl<'t> EncodingConverter<'t> {
    pub fn new(table: &'t EncodingTable) -> EncodingConverter<'t> {
        EncodingConverter { table }
    }

    /// Replaces every escape known to the table by its character.
    /// Accepts `\'e`, `\'{e}`, `{\'e}`, `{\'{e}}`, `\c c` and `\'\i`.
    pub fn decode(&self, text: &str) -> String {
        self.decode_where(text, |_| true)
    }

    /// Replaces every non-ASCII character known to the table by its
    /// braced escape. Text that is already escaped is left alone.
    pub fn encode(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        for chr in text.chars() {
            match self.table.escape_for(chr) {
                Some(escape) if !chr.is_ascii() => result.push_str(&escape.to_latex()),
                _ => result.push(chr),
            }
        }
        result
    }

    /// Brings every reversible escape into its canonical braced spelling.
    /// One-way escapes such as `\&` are kept verbatim.
    pub fn normalize(&self, text: &str) -> String {
        self.encode(&self.decode_where(text, |escape| escape.reversible))
    }

    fn decode_where<F: Fn(&Escape) -> bool>(&self, text: &str, accept: F) -> String {
        let mut result = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(chr) = rest.chars().next() {
            if rest.starts_with("{\\") {
                if let Some((escape, len)) = self.match_escape(&rest[1..]) {
                    if accept(escape) && rest[1 + len..].starts_with('}') {
                        result.push(escape.chr);
                        rest = &rest[len + 2..];
                        continue;
                    }
                }
            }
            if chr == '\\' {
                if let Some((escape, len)) = self.match_escape(rest) {
                    if accept(escape) {
                        result.push(escape.chr);
                        rest = &rest[len..];
                        continue;
                    }
                }
                // keep unknown control sequences intact, including `\\`
                let skip = rest[1..].chars().next().map_or(1, |c| 1 + c.len_utf8());
                result.push_str(&rest[..skip]);
                rest = &rest[skip..];
                continue;
            }
            result.push(chr);
            rest = &rest[chr.len_utf8()..];
        }
        result
    }

    /// Matches an escape at the start of `src`, which starts with a
    /// backslash. Returns the row and the number of bytes consumed.
    fn match_escape(&self, src: &str) -> Option<(&'t Escape, usize)> {
        let body = src.strip_prefix('\\')?;
        let first = body.chars().next()?;
        let command_len = if first.is_ascii_alphabetic() {
            body.chars().take_while(char::is_ascii_alphabetic).count()
        } else {
            first.len_utf8()
        };
        let command = &body[..command_len];
        let mut consumed = 1 + command_len;

        if !self.table.takes_argument(command) {
            let escape = self.table.lookup(command, "")?;
            if first.is_ascii_alphabetic() {
                let after = &src[consumed..];
                if after.starts_with("{}") {
                    consumed += 2;
                } else {
                    consumed += after.len() - after.trim_start_matches(' ').len();
                }
            }
            return Some((escape, consumed));
        }

        let after = &src[consumed..];
        let (argument, argument_len) = if let Some(inner) = after.strip_prefix('{') {
            let end = inner.find('}')?;
            (dotless(&inner[..end]), end + 2)
        } else if first.is_ascii_alphabetic() {
            let spaces = after.len() - after.trim_start_matches(' ').len();
            if spaces == 0 {
                return None;
            }
            let (argument, len) = leading_argument(&after[spaces..])?;
            (argument, spaces + len)
        } else {
            leading_argument(after)?
        };
        let escape = self.table.lookup(command, argument)?;
        consumed += argument_len;
        Some((escape, consumed))
    }
}

/// `\i` and `\j` as accent arguments stand for plain `i` and `j`.
fn dotless(argument: &str) -> &str {
    match argument {
        "\\i" => "i",
        "\\j" => "j",
        other => other,
    }
}

fn leading_argument(src: &str) -> Option<(&str, usize)> {
    if src.starts_with("\\i") || src.starts_with("\\j") {
        let next = src[2..].chars().next();
        if !next.map_or(false, |c| c.is_ascii_alphabetic()) {
            return Some((dotless(&src[..2]), 2));
        }
    }
    let chr = src.chars().next().filter(char::is_ascii_alphabetic)?;
    Some((&src[..chr.len_utf8()], chr.len_utf8()))
}
