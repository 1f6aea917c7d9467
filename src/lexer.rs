use std::fmt;

/// The two kinds of grouping delimiters. An entry may be enclosed in either,
/// field data only ever uses braces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Delim {
    Brace,
    Paren,
}

impl Delim {
    pub(crate) fn open_char(self) -> char {
        match self {
            Self::Brace => '{',
            Self::Paren => '(',
        }
    }

    pub(crate) fn close_char(self) -> char {
        match self {
            Self::Brace => '}',
            Self::Paren => ')',
        }
    }
}

/// A token is one structural unit of a bib file.
/// Remember, that bib file entry looks as follows:
///
/// ```tex
/// @Book{works:4,
///   author     = {Shakespeare, William},
///   title      = "Sonnets",
/// }
/// ```
///
/// In this case, the lexer emits (At, Word("Book"), Open(Brace),
/// Word("works:4"), Comma, Space, Word("author"), Space, Assign, Space,
/// Open(Brace), Word("Shakespeare"), Comma, ...). The lexer knows nothing
/// about entries: it is the record builder's job to track nesting and
/// quoting and to recover from malformed input. Token is just the data
/// contract between the two and not meant to be externally visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token<'s> {
    At,
    /// a run of non-structural, non-whitespace characters;
    /// a backslash always takes the following character with it
    Word(&'s str),
    Open(Delim),
    Close(Delim),
    Quote,
    Comma,
    Assign,
    Concat,
    Space(&'s str),
    EndOfFile,
}

impl<'s> fmt::Display for Token<'s> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At => write!(f, "@"),
            Self::Word(s) | Self::Space(s) => write!(f, "{}", s),
            Self::Open(d) => write!(f, "{}", d.open_char()),
            Self::Close(d) => write!(f, "{}", d.close_char()),
            Self::Quote => write!(f, "\""),
            Self::Comma => write!(f, ","),
            Self::Assign => write!(f, "="),
            Self::Concat => write!(f, "#"),
            Self::EndOfFile => write!(f, "end of file"),
        }
    }
}

/// A line/column location in the source, both starting at 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} col {}", self.line, self.col)
    }
}

/// Additional source code information attached to a Token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TokenInfo {
    /// byte offset of the token's first character
    pub(crate) offset: usize,
    pub(crate) pos: Position,
    /// only whitespace precedes this token on its line
    pub(crate) line_start: bool,
}

pub(crate) struct LexingIterator<'s> {
    src: &'s str,
    offset: usize,
    lineno: usize,
    colno: usize,
    line_start: bool,
    eof: bool,
}

impl<'s> LexingIterator<'s> {
    fn peek_char(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn bump(&mut self, chr: char) {
        self.offset += chr.len_utf8();
        if chr == '\n' {
            self.lineno += 1;
            self.colno = 1;
            self.line_start = true;
        } else {
            self.colno += 1;
        }
    }

    fn info(&self) -> TokenInfo {
        TokenInfo {
            offset: self.offset,
            pos: Position {
                line: self.lineno,
                col: self.colno,
            },
            line_start: self.line_start,
        }
    }

    /// skips a `%` line comment, leaving the newline in place
    fn skip_comment(&mut self) {
        while let Some(chr) = self.peek_char() {
            if chr == '\n' {
                break;
            }
            self.bump(chr);
        }
    }

    fn lex_space(&mut self) -> &'s str {
        let start = self.offset;
        while let Some(chr) = self.peek_char() {
            if !chr.is_whitespace() {
                break;
            }
            self.bump(chr);
        }
        &self.src[start..self.offset]
    }

    fn lex_word(&mut self) -> &'s str {
        let start = self.offset;
        while let Some(chr) = self.peek_char() {
            if chr.is_whitespace() || is_structural(chr) {
                break;
            }
            self.bump(chr);
            if chr == '\\' {
                if let Some(escaped) = self.peek_char() {
                    self.bump(escaped);
                }
            }
        }
        &self.src[start..self.offset]
    }
}

fn is_structural(chr: char) -> bool {
    matches!(chr, '@' | '{' | '}' | '(' | ')' | '"' | ',' | '=' | '#')
}

impl<'s> Iterator for LexingIterator<'s> {
    type Item = (Token<'s>, TokenInfo);

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof {
            return None;
        }
        loop {
            let info = self.info();
            let chr = match self.peek_char() {
                Some(chr) => chr,
                None => {
                    self.eof = true;
                    return Some((Token::EndOfFile, info));
                }
            };

            if chr == '%' && self.line_start {
                self.skip_comment();
                continue;
            }
            if chr.is_whitespace() {
                return Some((Token::Space(self.lex_space()), info));
            }

            let token = match chr {
                '@' => Token::At,
                '{' => Token::Open(Delim::Brace),
                '}' => Token::Close(Delim::Brace),
                '(' => Token::Open(Delim::Paren),
                ')' => Token::Close(Delim::Paren),
                '"' => Token::Quote,
                ',' => Token::Comma,
                '=' => Token::Assign,
                '#' => Token::Concat,
                _ => {
                    let word = self.lex_word();
                    self.line_start = false;
                    return Some((Token::Word(word), info));
                }
            };
            self.bump(chr);
            self.line_start = false;
            return Some((token, info));
        }
    }
}

/// Scans a whole in-memory buffer. Never fails; malformed input is
/// the record builder's concern.
pub(crate) struct Lexer<'s> {
    src: &'s str,
}

impl<'s> Lexer<'s> {
    pub(crate) fn new(src: &'s str) -> Lexer<'s> {
        Lexer { src }
    }

    pub(crate) fn iter(&self) -> LexingIterator<'s> {
        LexingIterator {
            src: self.src,
            offset: 0,
            lineno: 1,
            colno: 1,
            line_start: true,
            eof: false,
        }
    }

    /// Tokenize the entire source. The last token is always `EndOfFile`.
    pub(crate) fn tokenize(&self) -> Vec<(Token<'s>, TokenInfo)> {
        self.iter().collect()
    }
}
