//! Tokenizer for `.proto` sources
//!
//! Produces a flat token vector with 1-based positions. Comments, whitespace
//! and a leading byte-order mark are dropped; string literals keep their
//! quotes and escape sequences verbatim so they can be printed back unchanged.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Int(String),
    Float(String),
    /// Raw literal including the surrounding quotes
    Str(String),
    Symbol(char),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Int(s) => write!(f, "integer {}", s),
            TokenKind::Float(s) => write!(f, "float {}", s),
            TokenKind::Str(s) => write!(f, "string {}", s),
            TokenKind::Symbol(c) => write!(f, "'{}'", c),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("{line}:{column}: unterminated string literal")]
    UnterminatedString { line: usize, column: usize },

    #[error("{line}:{column}: unterminated block comment")]
    UnterminatedComment { line: usize, column: usize },

    #[error("{line}:{column}: unexpected character '{ch}'")]
    UnexpectedChar { ch: char, line: usize, column: usize },
}

const SYMBOLS: &[char] = &[
    ';', ',', '.', '=', '(', ')', '{', '}', '[', ']', '<', '>', ':', '/', '+', '-',
];

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            let (line, column) = (self.line, self.column);

            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    line,
                    column,
                });
                return Ok(tokens);
            };

            let kind = if c.is_ascii_alphabetic() || c == '_' {
                TokenKind::Ident(self.take_while(|c| c.is_ascii_alphanumeric() || c == '_'))
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
            {
                self.number()
            } else if c == '"' || c == '\'' {
                self.string(line, column)?
            } else if SYMBOLS.contains(&c) {
                self.bump();
                TokenKind::Symbol(c)
            } else {
                return Err(LexError::UnexpectedChar { ch: c, line, column });
            };

            tokens.push(Token { kind, line, column });
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(LexError::UnterminatedComment { line, column }),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn number(&mut self) -> TokenKind {
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            let mut text = String::new();
            text.extend(self.bump());
            text.extend(self.bump());
            text.push_str(&self.take_while(|c| c.is_ascii_hexdigit()));
            return TokenKind::Int(text);
        }

        let mut text = self.take_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            text.extend(self.bump());
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                text.extend(self.bump());
                if signed {
                    text.extend(self.bump());
                }
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }

        if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        let mut text = String::new();
        let quote = self.bump().unwrap_or('"');
        text.push(quote);

        loop {
            match self.bump() {
                Some('\\') => {
                    text.push('\\');
                    match self.bump() {
                        Some('\n') | None => {
                            return Err(LexError::UnterminatedString { line, column })
                        }
                        Some(escaped) => text.push(escaped),
                    }
                }
                Some('\n') | None => return Err(LexError::UnterminatedString { line, column }),
                Some(c) => {
                    text.push(c);
                    if c == quote {
                        return Ok(TokenKind::Str(text));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_field() {
        assert_eq!(
            kinds("repeated Foo bar = 12;"),
            vec![
                TokenKind::Ident("repeated".into()),
                TokenKind::Ident("Foo".into()),
                TokenKind::Ident("bar".into()),
                TokenKind::Symbol('='),
                TokenKind::Int("12".into()),
                TokenKind::Symbol(';'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// leading\nmessage /* inline */ A {}\n/* trailing\n block */";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident("message".into()),
                TokenKind::Ident("A".into()),
                TokenKind::Symbol('{'),
                TokenKind::Symbol('}'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("0x1F 017 1.5 .25 3e10 2E-3 7"),
            vec![
                TokenKind::Int("0x1F".into()),
                TokenKind::Int("017".into()),
                TokenKind::Float("1.5".into()),
                TokenKind::Float(".25".into()),
                TokenKind::Float("3e10".into()),
                TokenKind::Float("2E-3".into()),
                TokenKind::Int("7".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_qualified_type_keeps_dots_as_symbols() {
        assert_eq!(
            kinds(".foo.Bar"),
            vec![
                TokenKind::Symbol('.'),
                TokenKind::Ident("foo".into()),
                TokenKind::Symbol('.'),
                TokenKind::Ident("Bar".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_keep_escapes_verbatim() {
        assert_eq!(
            kinds(r#""a\"b" 'c'"#),
            vec![
                TokenKind::Str(r#""a\"b""#.into()),
                TokenKind::Str("'c'".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        assert_eq!(
            kinds("\u{feff}syntax"),
            vec![TokenKind::Ident("syntax".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a\n  b").unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("option x = \"abc\n;").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { line: 1, column: 12 });
    }

    #[test]
    fn test_unterminated_comment() {
        let err = tokenize("message A {} /* never closed").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { line: 1, .. }));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("message A { @ }").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedChar {
                ch: '@',
                line: 1,
                column: 13
            }
        );
    }
}
