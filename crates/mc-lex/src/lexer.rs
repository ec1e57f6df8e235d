//! Character-level lexer.
//!
//! `Lexer` walks the source text byte-by-byte (the language's grammar is
//! ASCII-only — identifiers, keywords, and operators never need Unicode
//! properties), tracking line/column as it goes, and reports malformed
//! input (unterminated strings, unterminated block comments) to the shared
//! [`Handler`] rather than panicking, so a single bad token does not stop
//! the rest of the file from being lexed.

use mc_util::{Handler, Span};

use crate::token::{SpannedToken, Token};

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    handler: &'a Handler,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            handler,
        }
    }

    /// Lex the whole source into a token stream, terminated by `Token::Eof`.
    pub fn tokenize(mut self) -> Vec<SpannedToken> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.kind == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let (start_line, start_col) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(c) = self.peek() {
                        if c == b'*' && self.peek_at(1) == Some(b'/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        self.handler.syntax_error(
                            "unterminated block comment",
                            start_line,
                            start_col,
                        );
                    }
                }
                _ => break,
            }
        }
    }

    /// Produce the next token, advancing the cursor past it.
    pub fn next_token(&mut self) -> SpannedToken {
        self.skip_trivia();

        let start = self.pos;
        let (line, column) = (self.line, self.column);

        let Some(c) = self.peek() else {
            return SpannedToken {
                kind: Token::Eof,
                span: Span::new(start, start, line, column),
            };
        };

        let kind = if c.is_ascii_digit() {
            self.lex_number()
        } else if c == b'"' {
            self.lex_string(line, column)
        } else if c.is_ascii_alphabetic() || c == b'_' {
            self.lex_ident_or_keyword()
        } else {
            self.lex_operator(line, column)
        };

        SpannedToken {
            kind,
            span: Span::new(start, self.pos, line, column),
        }
    }

    fn lex_ident_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.advance();
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        Token::keyword(text).unwrap_or_else(|| Token::Ident(text.to_string()))
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => Token::FloatLiteral(v),
                Err(_) => {
                    self.handler
                        .syntax_error(format!("malformed float literal `{text}`"), self.line, self.column);
                    Token::FloatLiteral(0.0)
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => Token::IntLiteral(v),
                Err(_) => {
                    self.handler
                        .syntax_error(format!("malformed integer literal `{text}`"), self.line, self.column);
                    Token::IntLiteral(0)
                }
            }
        }
    }

    fn lex_string(&mut self, start_line: u32, start_col: u32) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    self.handler
                        .syntax_error("unterminated string literal", start_line, start_col);
                    break;
                }
                Some(b'"') => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.advance() {
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'\\') => value.push('\\'),
                        Some(b'"') => value.push('"'),
                        Some(other) => value.push(other as char),
                        None => break,
                    }
                }
                Some(c) => {
                    value.push(c as char);
                    self.advance();
                }
            }
        }
        Token::StringLiteral(value)
    }

    fn lex_operator(&mut self, line: u32, col: u32) -> Token {
        let c = self.advance().unwrap();
        match c {
            b':' => Token::Colon,
            b',' => Token::Comma,
            b';' => Token::Semicolon,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'%' => Token::Percent,
            b'<' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::EqEq
                } else {
                    Token::Assign
                }
            }
            b'!' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Token::NotEq
                } else {
                    Token::Bang
                }
            }
            b'&' if self.peek() == Some(b'&') => {
                self.advance();
                Token::AndAnd
            }
            b'|' if self.peek() == Some(b'|') => {
                self.advance();
                Token::OrOr
            }
            other => {
                self.handler
                    .syntax_error(format!("unexpected character `{}`", other as char), line, col);
                // Recover by treating it as the next char; the parser will
                // trip over whatever follows rather than the lexer looping.
                self.next_token_kind_after_error()
            }
        }
    }

    fn next_token_kind_after_error(&mut self) -> Token {
        self.next_token().kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        let handler = Handler::new();
        let tokens = Lexer::new(src, &handler).tokenize();
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_smallest_valid_program() {
        let toks = lex(": main () : i32 { return 0; }");
        assert_eq!(
            toks,
            vec![
                Token::Colon,
                Token::Ident("main".into()),
                Token::LParen,
                Token::RParen,
                Token::Colon,
                Token::I32,
                Token::LBrace,
                Token::Return,
                Token::IntLiteral(0),
                Token::Semicolon,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        assert_eq!(lex("1"), vec![Token::IntLiteral(1), Token::Eof]);
        assert_eq!(lex("1.5"), vec![Token::FloatLiteral(1.5), Token::Eof]);
        // a bare trailing dot is not part of a float literal
        assert_eq!(lex("1."), vec![Token::IntLiteral(1), Token::Eof]);
    }

    #[test]
    fn maximal_munch_for_two_char_operators() {
        assert_eq!(lex("<="), vec![Token::Le, Token::Eof]);
        assert_eq!(lex("<"), vec![Token::Lt, Token::Eof]);
        assert_eq!(lex("=="), vec![Token::EqEq, Token::Eof]);
        assert_eq!(lex("&&"), vec![Token::AndAnd, Token::Eof]);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(lex("// hi\n1"), vec![Token::IntLiteral(1), Token::Eof]);
        assert_eq!(lex("/* hi */1"), vec![Token::IntLiteral(1), Token::Eof]);
    }

    #[test]
    fn unterminated_string_reports_error_but_recovers() {
        let handler = Handler::new();
        let tokens = Lexer::new("\"abc", &handler).tokenize();
        assert!(handler.has_errors());
        assert_eq!(tokens[0].kind, Token::StringLiteral("abc".into()));
    }

    #[test]
    fn string_escapes_are_unescaped() {
        assert_eq!(
            lex("\"a\\nb\""),
            vec![Token::StringLiteral("a\nb".into()), Token::Eof]
        );
    }

    #[test]
    fn keywords_are_not_identifiers() {
        assert_eq!(lex("while"), vec![Token::While, Token::Eof]);
        assert_eq!(lex("whilex"), vec![Token::Ident("whilex".into()), Token::Eof]);
    }

    #[test]
    fn tracks_line_and_column() {
        let handler = Handler::new();
        let tokens = Lexer::new("a\nb", &handler).tokenize();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 1);
    }
}
