use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Control words standing for a character on their own, e.g. `\ss`.
/// Listed before the accents so that they win when encoding.
const LETTERS: &[(&str, char)] = &[
    ("AA", 'Å'),
    ("aa", 'å'),
    ("AE", 'Æ'),
    ("ae", 'æ'),
    ("DH", 'Ð'),
    ("dh", 'ð'),
    ("i", 'ı'),
    ("j", 'ȷ'),
    ("L", 'Ł'),
    ("l", 'ł'),
    ("NG", 'Ŋ'),
    ("ng", 'ŋ'),
    ("O", 'Ø'),
    ("o", 'ø'),
    ("OE", 'Œ'),
    ("oe", 'œ'),
    ("ss", 'ß'),
    ("TH", 'Þ'),
    ("th", 'þ'),
    ("pounds", '£'),
    ("S", '§'),
    ("P", '¶'),
    ("copyright", '©'),
    ("textregistered", '®'),
    ("textdegree", '°'),
    ("guillemotleft", '«'),
    ("guillemotright", '»'),
    ("textquestiondown", '¿'),
    ("textexclamdown", '¡'),
];

/// Escaped TeX specials. Decoding them is fine, re-escaping them is not
/// (a `%` in a URL must stay as it is), so they only work one way.
const SPECIALS: &[(&str, char)] = &[
    ("&", '&'),
    ("%", '%'),
    ("$", '$'),
    ("#", '#'),
    ("_", '_'),
    ("{", '{'),
    ("}", '}'),
];

/// Accent command, base letter, accented character.
const ACCENTS: &[(&str, &str, char)] = &[
    ("`", "A", 'À'),
    ("'", "A", 'Á'),
    ("^", "A", 'Â'),
    ("~", "A", 'Ã'),
    ("\"", "A", 'Ä'),
    ("r", "A", 'Å'),
    ("c", "C", 'Ç'),
    ("`", "E", 'È'),
    ("'", "E", 'É'),
    ("^", "E", 'Ê'),
    ("\"", "E", 'Ë'),
    ("`", "I", 'Ì'),
    ("'", "I", 'Í'),
    ("^", "I", 'Î'),
    ("\"", "I", 'Ï'),
    ("~", "N", 'Ñ'),
    ("`", "O", 'Ò'),
    ("'", "O", 'Ó'),
    ("^", "O", 'Ô'),
    ("~", "O", 'Õ'),
    ("\"", "O", 'Ö'),
    ("`", "U", 'Ù'),
    ("'", "U", 'Ú'),
    ("^", "U", 'Û'),
    ("\"", "U", 'Ü'),
    ("'", "Y", 'Ý'),
    ("`", "a", 'à'),
    ("'", "a", 'á'),
    ("^", "a", 'â'),
    ("~", "a", 'ã'),
    ("\"", "a", 'ä'),
    ("r", "a", 'å'),
    ("c", "c", 'ç'),
    ("`", "e", 'è'),
    ("'", "e", 'é'),
    ("^", "e", 'ê'),
    ("\"", "e", 'ë'),
    ("`", "i", 'ì'),
    ("'", "i", 'í'),
    ("^", "i", 'î'),
    ("\"", "i", 'ï'),
    ("~", "n", 'ñ'),
    ("`", "o", 'ò'),
    ("'", "o", 'ó'),
    ("^", "o", 'ô'),
    ("~", "o", 'õ'),
    ("\"", "o", 'ö'),
    ("`", "u", 'ù'),
    ("'", "u", 'ú'),
    ("^", "u", 'û'),
    ("\"", "u", 'ü'),
    ("'", "y", 'ý'),
    ("\"", "y", 'ÿ'),
    ("=", "A", 'Ā'),
    ("=", "a", 'ā'),
    ("u", "A", 'Ă'),
    ("u", "a", 'ă'),
    ("k", "A", 'Ą'),
    ("k", "a", 'ą'),
    ("'", "C", 'Ć'),
    ("'", "c", 'ć'),
    ("^", "C", 'Ĉ'),
    ("^", "c", 'ĉ'),
    (".", "C", 'Ċ'),
    (".", "c", 'ċ'),
    ("v", "C", 'Č'),
    ("v", "c", 'č'),
    ("v", "D", 'Ď'),
    ("v", "d", 'ď'),
    ("=", "E", 'Ē'),
    ("=", "e", 'ē'),
    ("u", "E", 'Ĕ'),
    ("u", "e", 'ĕ'),
    (".", "E", 'Ė'),
    (".", "e", 'ė'),
    ("k", "E", 'Ę'),
    ("k", "e", 'ę'),
    ("v", "E", 'Ě'),
    ("v", "e", 'ě'),
    ("^", "G", 'Ĝ'),
    ("^", "g", 'ĝ'),
    ("u", "G", 'Ğ'),
    ("u", "g", 'ğ'),
    (".", "G", 'Ġ'),
    (".", "g", 'ġ'),
    ("c", "G", 'Ģ'),
    ("c", "g", 'ģ'),
    ("^", "H", 'Ĥ'),
    ("^", "h", 'ĥ'),
    ("~", "I", 'Ĩ'),
    ("~", "i", 'ĩ'),
    ("=", "I", 'Ī'),
    ("=", "i", 'ī'),
    ("u", "I", 'Ĭ'),
    ("u", "i", 'ĭ'),
    ("k", "I", 'Į'),
    ("k", "i", 'į'),
    (".", "I", 'İ'),
    ("^", "J", 'Ĵ'),
    ("^", "j", 'ĵ'),
    ("c", "K", 'Ķ'),
    ("c", "k", 'ķ'),
    ("'", "L", 'Ĺ'),
    ("'", "l", 'ĺ'),
    ("c", "L", 'Ļ'),
    ("c", "l", 'ļ'),
    ("v", "L", 'Ľ'),
    ("v", "l", 'ľ'),
    ("'", "N", 'Ń'),
    ("'", "n", 'ń'),
    ("c", "N", 'Ņ'),
    ("c", "n", 'ņ'),
    ("v", "N", 'Ň'),
    ("v", "n", 'ň'),
    ("=", "O", 'Ō'),
    ("=", "o", 'ō'),
    ("u", "O", 'Ŏ'),
    ("u", "o", 'ŏ'),
    ("H", "O", 'Ő'),
    ("H", "o", 'ő'),
    ("'", "R", 'Ŕ'),
    ("'", "r", 'ŕ'),
    ("c", "R", 'Ŗ'),
    ("c", "r", 'ŗ'),
    ("v", "R", 'Ř'),
    ("v", "r", 'ř'),
    ("'", "S", 'Ś'),
    ("'", "s", 'ś'),
    ("^", "S", 'Ŝ'),
    ("^", "s", 'ŝ'),
    ("c", "S", 'Ş'),
    ("c", "s", 'ş'),
    ("v", "S", 'Š'),
    ("v", "s", 'š'),
    ("c", "T", 'Ţ'),
    ("c", "t", 'ţ'),
    ("v", "T", 'Ť'),
    ("v", "t", 'ť'),
    ("~", "U", 'Ũ'),
    ("~", "u", 'ũ'),
    ("=", "U", 'Ū'),
    ("=", "u", 'ū'),
    ("u", "U", 'Ŭ'),
    ("u", "u", 'ŭ'),
    ("r", "U", 'Ů'),
    ("r", "u", 'ů'),
    ("H", "U", 'Ű'),
    ("H", "u", 'ű'),
    ("k", "U", 'Ų'),
    ("k", "u", 'ų'),
    ("^", "W", 'Ŵ'),
    ("^", "w", 'ŵ'),
    ("^", "Y", 'Ŷ'),
    ("^", "y", 'ŷ'),
    ("\"", "Y", 'Ÿ'),
    ("'", "Z", 'Ź'),
    ("'", "z", 'ź'),
    (".", "Z", 'Ż'),
    (".", "z", 'ż'),
    ("v", "Z", 'Ž'),
    ("v", "z", 'ž'),];

/// One row of an [`EncodingTable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Escape {
    /// control sequence without the backslash, e.g. `'` or `ss`
    pub command: String,
    /// the accented letter, empty for control words like `\ss`
    pub argument: String,
    pub chr: char,
    /// whether `chr` is encoded back to this escape
    pub reversible: bool,
}

impl Escape {
    pub fn new(command: &str, argument: &str, chr: char) -> Escape {
        Escape {
            command: command.to_string(),
            argument: argument.to_string(),
            chr,
            reversible: true,
        }
    }

    pub fn one_way(command: &str, chr: char) -> Escape {
        Escape {
            reversible: false,
            ..Escape::new(command, "", chr)
        }
    }

    /// The braced TeX spelling, e.g. `{\'e}`, `{\c c}` or `{\ss}`.
    pub fn to_latex(&self) -> String {
        let separator = if !self.argument.is_empty()
            && self.command.chars().all(|c| c.is_ascii_alphabetic())
        {
            " "
        } else {
            ""
        };
        format!("{{\\{}{}{}}}", self.command, separator, self.argument)
    }
}

/// Read-only mapping between TeX escapes and the characters they stand for.
#[derive(Debug, Default)]
pub struct EncodingTable {
    // command -> argument -> row
    decode: HashMap<String, HashMap<String, Escape>>,
    encode: HashMap<char, Escape>,
}

static BUILTIN: Lazy<EncodingTable> = Lazy::new(|| {
    let letters = LETTERS.iter().map(|&(cmd, chr)| Escape::new(cmd, "", chr));
    let specials = SPECIALS.iter().map(|&(cmd, chr)| Escape::one_way(cmd, chr));
    let accents = ACCENTS
        .iter()
        .map(|&(cmd, arg, chr)| Escape::new(cmd, arg, chr));
    EncodingTable::from_escapes(letters.chain(specials).chain(accents))
});

impl EncodingTable {
    /// The table shipped with this crate: Latin-1 and Latin Extended-A
    /// accents, the usual special letters and the escaped TeX specials.
    pub fn builtin() -> &'static EncodingTable {
        &BUILTIN
    }

    /// Builds a table. When several rows decode to the same character,
    /// the first reversible one is used for encoding.
    pub fn from_escapes<I: IntoIterator<Item = Escape>>(escapes: I) -> EncodingTable {
        let mut table = EncodingTable::default();
        for escape in escapes {
            if escape.reversible {
                table.encode.entry(escape.chr).or_insert_with(|| escape.clone());
            }
            table
                .decode
                .entry(escape.command.clone())
                .or_default()
                .insert(escape.argument.clone(), escape);
        }
        table
    }

    pub fn lookup(&self, command: &str, argument: &str) -> Option<&Escape> {
        self.decode.get(command)?.get(argument)
    }

    /// Whether `command` is an accent, i.e. takes a letter as argument.
    pub fn takes_argument(&self, command: &str) -> bool {
        self.decode
            .get(command)
            .map_or(false, |args| args.keys().any(|arg| !arg.is_empty()))
    }

    pub fn escape_for(&self, chr: char) -> Option<&Escape> {
        self.encode.get(&chr)
    }

    pub fn len(&self) -> usize {
        self.decode.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.decode.is_empty()
    }
}
