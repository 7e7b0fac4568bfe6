use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Illegal(Rc<str>),
    Ident(Rc<str>),
    Int(Rc<str>),
    String(Rc<str>),

    // Operators
    Assign,
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,

    Equal,
    NotEqual,

    GreaterThan,
    LessThan,

    // Delimiters
    Comma,
    Colon,
    SemiColon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Keywords
    Function,
    Let,
    True,
    False,
    If,
    Else,
    Return,

    Eof,
}

impl TokenKind {
    /// The text this kind of token was read from. Payload-carrying kinds
    /// return their payload.
    pub fn literal(&self) -> &str {
        use TokenKind::*;
        match self {
            Illegal(text) | Ident(text) | Int(text) | String(text) => text.as_ref(),
            Assign => "=",
            Plus => "+",
            Minus => "-",
            Bang => "!",
            Asterisk => "*",
            Slash => "/",
            Equal => "==",
            NotEqual => "!=",
            GreaterThan => ">",
            LessThan => "<",
            Comma => ",",
            Colon => ":",
            SemiColon => ";",
            LParen => "(",
            RParen => ")",
            LBrace => "{",
            RBrace => "}",
            LBracket => "[",
            RBracket => "]",
            Function => "fn",
            Let => "let",
            True => "true",
            False => "false",
            If => "if",
            Else => "else",
            Return => "return",
            Eof => "",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TokenKind::*;
        match self {
            Illegal(text) => write!(f, "illegal `{}`", text),
            Ident(name) => write!(f, "identifier `{}`", name),
            Int(value) => write!(f, "integer `{}`", value),
            String(value) => write!(f, "string \"{}\"", value),
            Eof => write!(f, "end of input"),
            other => write!(f, "`{}`", other.literal()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn literal(&self) -> &str {
        self.kind.literal()
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.start)
    }
}

fn keywords(ident: &str) -> Option<TokenKind> {
    match ident {
        "fn" => Some(TokenKind::Function),
        "let" => Some(TokenKind::Let),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "return" => Some(TokenKind::Return),
        _ => None,
    }
}

/// Pull-based lexer over a source buffer.
///
/// [`Tokenizer::next_token`] yields [`TokenKind::Eof`] forever once the input
/// is exhausted. The [`Iterator`] implementation stops before `Eof` instead,
/// which is what the parser consumes.
#[derive(Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        let iter = input.char_indices().peekable();
        Self { input, iter }
    }

    fn is_letter(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_'
    }

    fn is_whitespace(ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\n' | '\r')
    }

    fn read_identifier(&mut self, start: usize) -> TokenKind {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_letter(*ch) || ch.is_ascii_digit())
            .is_some()
        {}

        let end = self.next_idx();
        let ident = &self.input[start..end];
        keywords(ident).unwrap_or_else(|| TokenKind::Ident(ident.into()))
    }

    fn read_number(&mut self, start: usize) -> TokenKind {
        while self.iter.next_if(|(_, ch)| ch.is_ascii_digit()).is_some() {}

        let end = self.next_idx();
        TokenKind::Int(self.input[start..end].into())
    }

    // Backslashes are not escapes: everything up to the closing quote (or the
    // end of input) is the literal.
    fn read_string(&mut self, start: usize) -> TokenKind {
        let content_start = start + 1;
        let mut content_end = self.input.len();
        for (idx, ch) in self.iter.by_ref() {
            if ch == '"' {
                content_end = idx;
                break;
            }
        }
        TokenKind::String(self.input[content_start..content_end].into())
    }

    fn next_idx(&mut self) -> usize {
        self.iter
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn either(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.iter.next_if(|(_, ch)| *ch == second).is_some() {
            double
        } else {
            single
        }
    }

    pub fn next_token(&mut self) -> Token {
        while self
            .iter
            .next_if(|(_, ch)| Self::is_whitespace(*ch))
            .is_some()
        {}

        let Some((start, ch)) = self.iter.next() else {
            return Token {
                kind: TokenKind::Eof,
                start: self.input.len(),
                end: self.input.len(),
            };
        };

        let kind = match ch {
            '=' => self.either('=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.either('=', TokenKind::NotEqual, TokenKind::Bang),
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '<' => TokenKind::LessThan,
            '>' => TokenKind::GreaterThan,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::SemiColon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '"' => self.read_string(start),
            c if Self::is_letter(c) => self.read_identifier(start),
            c if c.is_ascii_digit() => self.read_number(start),
            c => TokenKind::Illegal(c.to_string().into()),
        };

        Token {
            kind,
            start,
            end: self.next_idx(),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        match token.kind {
            TokenKind::Eof => None,
            _ => Some(token),
        }
    }
}
