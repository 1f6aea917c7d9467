use std::collections::HashMap;
use std::fs;
use std::path;
use std::str;

use crate::config::{ParserConfig, MONTH_STRINGS};
use crate::customization::Customization;
use crate::database::Database;
use crate::errors::{Error, SkippedEntry, StructuralError};
use crate::lexer::{Delim, Lexer, Token, TokenInfo};
use crate::types::Record;

/// Parser turning a `.bib` source into a [`Database`]
pub struct Parser {
    pub(crate) src: String,
    pub(crate) config: ParserConfig,
    pub(crate) customization: Option<Box<dyn Customization>>,
}

impl Parser {
    /// Use a file at some filepath as source for the parsing process.
    pub fn from_file<P: AsRef<path::Path>>(path: P) -> Result<Parser, Error> {
        let bytes = fs::read(path)?;
        Ok(Parser::from_string(String::from_utf8(bytes)?))
    }

    /// Use a string as source for the parsing process.
    pub fn from_string(data: String) -> Parser {
        Parser {
            src: data,
            config: ParserConfig::default(),
            customization: None,
        }
    }

    /// Use raw bytes as source; they have to be UTF-8.
    pub fn from_bytes(data: &[u8]) -> Result<Parser, Error> {
        Ok(Parser::from_string(str::from_utf8(data)?.to_string()))
    }

    pub fn with_config(mut self, config: ParserConfig) -> Parser {
        self.config = config;
        self
    }

    /// Customization applied to every record once the source is parsed.
    pub fn with_customization<C: Customization + 'static>(mut self, customization: C) -> Parser {
        self.customization = Some(Box::new(customization));
        self
    }

    /// Iterates over the raw, uncustomized entries. Malformed entries are
    /// yielded as `Err` and the iteration continues with the next entry.
    pub fn iter(&self) -> BibEntries<'_> {
        BibEntries::new(&self.src, &self.config)
    }

    /// Parses the whole source and applies the customization, if any.
    pub fn parse(&self) -> Database {
        let mut db = Database::new();
        for result in self.iter() {
            match result {
                Ok(record) => db.records.push(record),
                Err(skipped) => {
                    log::warn!("{}", skipped);
                    db.skipped.push(skipped);
                }
            }
        }
        log::debug!(
            "parsed {} records, skipped {} malformed entries",
            db.records.len(),
            db.skipped.len()
        );
        if let Some(customization) = &self.customization {
            db.customize(customization.as_ref());
        }
        db
    }
}

impl str::FromStr for Parser {
    type Err = Error;

    /// Use a string as source for the parsing process.
    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Ok(Parser::from_string(data.to_string()))
    }
}

/// A stateful iterator yielding one record after another
pub struct BibEntries<'s> {
    src: &'s str,
    config: &'s ParserConfig,
    tokens: Vec<(Token<'s>, TokenInfo)>,
    cursor: usize,
    macros: HashMap<String, String>,
    // what is known about the entry being read, for diagnostics
    current_kind: Option<String>,
    current_id: Option<String>,
}

impl<'s> BibEntries<'s> {
    fn new(src: &'s str, config: &'s ParserConfig) -> BibEntries<'s> {
        let mut macros = HashMap::new();
        if config.common_strings {
            for (name, value) in MONTH_STRINGS {
                macros.insert(name.to_string(), value.to_string());
            }
        }
        BibEntries {
            src,
            config,
            tokens: Lexer::new(src).tokenize(),
            cursor: 0,
            macros,
            current_kind: None,
            current_id: None,
        }
    }

    fn peek(&self) -> (Token<'s>, TokenInfo) {
        // the token list always ends with EndOfFile, and the cursor never passes it
        self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> (Token<'s>, TokenInfo) {
        let current = self.peek();
        if current.0 != Token::EndOfFile {
            self.cursor += 1;
        }
        current
    }

    fn skip_space(&mut self) {
        while let (Token::Space(_), _) = self.peek() {
            self.bump();
        }
    }

    /// An `@` at the start of a line where a field name is expected
    /// begins a new block. Inside delimiters, only matching counts.
    fn at_boundary(&self) -> bool {
        matches!(self.peek(), (Token::At, info) if info.line_start)
    }

    fn unexpected(&self, action: &'static str) -> StructuralError {
        let (token, info) = self.peek();
        match token {
            Token::EndOfFile => StructuralError::Incomplete { action },
            _ => StructuralError::UnexpectedToken {
                found: token.to_string(),
                action,
                at: info.pos,
            },
        }
    }

    /// Moves to the next `@` that begins a line, at or after the cursor.
    fn resync(&mut self) {
        loop {
            match self.peek() {
                (Token::EndOfFile, _) => return,
                (Token::At, info) if info.line_start => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Reads one `@...` block after its `@`. Returns `None` for blocks
    /// that do not become records.
    fn read_block(&mut self) -> Result<Option<Record>, StructuralError> {
        self.skip_space();
        let (token, info) = self.peek();
        let kind = match token {
            Token::Word(kind) => kind,
            _ => return Err(StructuralError::MissingType { at: info.pos }),
        };
        self.bump();
        self.current_kind = Some(kind.to_string());

        match kind.to_lowercase().as_str() {
            "comment" => {
                self.skip_comment()?;
                Ok(None)
            }
            "preamble" => {
                self.skip_space();
                self.skip_delimited()?;
                Ok(None)
            }
            "string" => {
                self.read_macro()?;
                Ok(None)
            }
            lower => {
                let record = self.read_entry(lower)?;
                if self.config.accepts_type(&record.kind) {
                    Ok(Some(record))
                } else {
                    log::debug!("ignoring entry '{}' of type '{}'", record.id, record.kind);
                    Ok(None)
                }
            }
        }
    }

    /// `@comment{...}` is skipped up to its closing delimiter, a bare
    /// `@comment` up to the end of its line.
    fn skip_comment(&mut self) -> Result<(), StructuralError> {
        loop {
            match self.peek() {
                (Token::Space(space), _) if space.contains('\n') => return Ok(()),
                (Token::Space(_), _) => {
                    self.bump();
                }
                (Token::Open(_), _) => return self.skip_delimited(),
                _ => break,
            }
        }
        loop {
            match self.peek() {
                (Token::EndOfFile, _) => return Ok(()),
                (Token::Space(space), _) if space.contains('\n') => return Ok(()),
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn expect_open(&mut self) -> Result<(Delim, TokenInfo), StructuralError> {
        match self.peek() {
            (Token::Open(delim), info) => {
                self.bump();
                Ok((delim, info))
            }
            _ => Err(self.unexpected("expecting '{' or '('")),
        }
    }

    /// Skips a delimited body without interpreting it. Quotes only matter
    /// in parenthesized bodies, where they may hide a `)`.
    fn skip_delimited(&mut self) -> Result<(), StructuralError> {
        let (delim, open) = self.expect_open()?;
        let mut braces = 0usize;
        let mut parens = 0usize;
        let mut quoted = false;
        loop {
            let (token, _) = self.bump();
            match (delim, token) {
                (_, Token::EndOfFile) => {
                    return Err(StructuralError::UnmatchedDelimiter { opened: open.pos })
                }
                (Delim::Brace, Token::Close(Delim::Brace)) if braces == 0 => return Ok(()),
                (Delim::Paren, Token::Close(Delim::Paren)) if braces == 0 && !quoted && parens == 0 => {
                    return Ok(())
                }
                (Delim::Paren, Token::Open(Delim::Paren)) if braces == 0 && !quoted => parens += 1,
                (Delim::Paren, Token::Close(Delim::Paren)) if braces == 0 && !quoted => parens -= 1,
                (Delim::Paren, Token::Quote) if braces == 0 => quoted = !quoted,
                (_, Token::Open(Delim::Brace)) => braces += 1,
                (_, Token::Close(Delim::Brace)) => braces = braces.saturating_sub(1),
                _ => {}
            }
        }
    }

    /// `@string{name = value}` defines a macro.
    fn read_macro(&mut self) -> Result<(), StructuralError> {
        self.skip_space();
        let (delim, _) = self.expect_open()?;
        self.skip_space();
        let name = match self.peek() {
            (Token::Word(name), _) => name,
            _ => return Err(self.unexpected("reading macro name")),
        };
        self.bump();
        self.skip_space();
        self.expect_assign(name)?;
        let value = self.read_value()?;
        self.skip_space();
        if let (Token::Comma, _) = self.peek() {
            self.bump();
            self.skip_space();
        }
        match self.peek() {
            (Token::Close(d), _) if d == delim => {
                self.bump();
            }
            _ => return Err(self.unexpected("expecting end of @string")),
        }
        log::debug!("defined macro '{}' = '{}'", name, value);
        self.macros.insert(name.to_lowercase(), value);
        Ok(())
    }

    fn expect_assign(&mut self, name: &str) -> Result<(), StructuralError> {
        match self.peek() {
            (Token::Assign, _) => {
                self.bump();
                Ok(())
            }
            (_, info) => Err(StructuralError::MissingAssign {
                name: name.to_string(),
                at: info.pos,
            }),
        }
    }

    /// Reads `{key, name = value, ...}` or the parenthesized form.
    fn read_entry(&mut self, kind: &str) -> Result<Record, StructuralError> {
        self.skip_space();
        let (delim, open) = self.expect_open()?;
        self.skip_space();

        let id = self.read_key(delim)?;
        self.current_id = Some(id.to_string());
        let mut record = Record::new(kind, id);

        loop {
            self.skip_space_and_comments();
            if self.at_boundary() {
                return Err(StructuralError::UnmatchedDelimiter { opened: open.pos });
            }
            match self.peek() {
                (Token::Close(d), _) if d == delim => {
                    self.bump();
                    return Ok(record);
                }
                (Token::Comma, _) => {
                    self.bump();
                }
                (Token::Word(name), _) => {
                    self.bump();
                    self.skip_space();
                    self.expect_assign(name)?;
                    let value = self.read_value()?;
                    record
                        .fields
                        .insert(self.config.field_name(name), value.into());
                    self.skip_space_and_comments();
                    match self.peek() {
                        (Token::Comma, _) => {}
                        (Token::Close(d), _) if d == delim => {}
                        _ if self.at_boundary() => {}
                        _ => return Err(self.unexpected("expecting ',' between fields")),
                    }
                }
                _ => return Err(self.unexpected("reading field name")),
            }
        }
    }

    /// The citation key runs up to the first comma, blank or `=`, or to
    /// the closing delimiter, so it may contain `#`, quotes and nested
    /// delimiters.
    fn read_key(&mut self, delim: Delim) -> Result<&'s str, StructuralError> {
        let (_, first) = self.peek();
        let mut depth = 0usize;
        loop {
            if self.at_boundary() {
                break;
            }
            match self.peek() {
                (Token::Comma, _)
                | (Token::Space(_), _)
                | (Token::Assign, _)
                | (Token::EndOfFile, _) => break,
                (Token::Close(d), _) if d == delim && depth == 0 => break,
                (Token::Open(_), _) => {
                    depth += 1;
                    self.bump();
                }
                (Token::Close(_), _) => {
                    depth = depth.saturating_sub(1);
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
        let (_, end) = self.peek();
        match &self.src[first.offset..end.offset] {
            "" => Err(StructuralError::MissingKey { at: first.pos }),
            key => Ok(key),
        }
    }

    /// Skips blanks and `%` comments. Between fields a `%` comments out
    /// the rest of its line; inside values it is plain text.
    fn skip_space_and_comments(&mut self) {
        loop {
            self.skip_space();
            match self.peek() {
                (Token::Word(word), _) if word.starts_with('%') => loop {
                    match self.peek() {
                        (Token::EndOfFile, _) => return,
                        (Token::Space(space), _) if space.contains('\n') => break,
                        _ => {
                            self.bump();
                        }
                    }
                },
                _ => return,
            }
        }
    }

    /// Reads fragments joined by `#` and concatenates them.
    fn read_value(&mut self) -> Result<String, StructuralError> {
        let mut value = String::new();
        loop {
            self.skip_space();
            if self.at_boundary() {
                return Err(self.unexpected("reading field value"));
            }
            match self.peek() {
                (Token::Open(Delim::Brace), _) => value.push_str(self.read_braced()?),
                (Token::Quote, _) => value.push_str(self.read_quoted()?),
                (Token::Word(word), _) => {
                    self.bump();
                    value.push_str(self.resolve(word));
                }
                _ => return Err(self.unexpected("reading field value")),
            }
            self.skip_space();
            match self.peek() {
                (Token::Concat, _) => {
                    self.bump();
                }
                _ => return Ok(value),
            }
        }
    }

    /// Numbers are literal; other bare words are macro references, and
    /// undefined macros stand for themselves.
    fn resolve(&self, word: &'s str) -> &str {
        if word.chars().all(|c| c.is_ascii_digit()) {
            return word;
        }
        match self.macros.get(&word.to_lowercase()) {
            Some(value) => value,
            None => {
                log::debug!("macro '{}' is undefined, using it literally", word);
                word
            }
        }
    }

    /// Returns the text between a brace and its matching brace.
    fn read_braced(&mut self) -> Result<&'s str, StructuralError> {
        let (_, open) = self.bump();
        let mut depth = 0usize;
        loop {
            let (token, info) = self.bump();
            match token {
                Token::Open(Delim::Brace) => depth += 1,
                Token::Close(Delim::Brace) if depth == 0 => {
                    return Ok(&self.src[open.offset + 1..info.offset]);
                }
                Token::Close(Delim::Brace) => depth -= 1,
                Token::EndOfFile => {
                    return Err(StructuralError::UnmatchedDelimiter { opened: open.pos })
                }
                _ => {}
            }
        }
    }

    /// Returns the text between two quotes. Quotes inside braces are
    /// plain characters.
    fn read_quoted(&mut self) -> Result<&'s str, StructuralError> {
        let (_, open) = self.bump();
        let mut depth = 0usize;
        loop {
            let (token, info) = self.bump();
            match token {
                Token::Quote if depth == 0 => {
                    return Ok(&self.src[open.offset + 1..info.offset]);
                }
                Token::Open(Delim::Brace) => depth += 1,
                Token::Close(Delim::Brace) if depth == 0 => {
                    return Err(StructuralError::UnexpectedToken {
                        found: token.to_string(),
                        action: "reading quoted field value",
                        at: info.pos,
                    })
                }
                Token::Close(Delim::Brace) => depth -= 1,
                Token::EndOfFile => {
                    return Err(StructuralError::UnmatchedDelimiter { opened: open.pos })
                }
                _ => {}
            }
        }
    }
}

impl<'s> Iterator for BibEntries<'s> {
    type Item = Result<Record, SkippedEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // between blocks, everything up to the next `@` is ignored text
            let start = loop {
                match self.bump() {
                    (Token::EndOfFile, _) => return None,
                    (Token::At, info) => break info.pos,
                    _ => {}
                }
            };
            let resume = self.cursor;
            self.current_kind = None;
            self.current_id = None;

            match self.read_block() {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(error) => {
                    // whatever the failed block swallowed is read again,
                    // starting at the first line-initial `@` after its own
                    self.cursor = resume;
                    self.resync();
                    return Some(Err(SkippedEntry {
                        kind: self.current_kind.take(),
                        id: self.current_id.take(),
                        start,
                        error,
                    }));
                }
            }
        }
    }
}
