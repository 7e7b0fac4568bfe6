//! Front half of the Monkey pipeline: source text to tokens to syntax tree.

pub mod ast;
pub mod lexer;
pub mod parser;

use lexer::{Token, TokenKind, Tokenizer};

/// Lexes the whole input. The last token is always [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = tokenizer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

/// Parses `source`, returning the program together with every syntax error
/// found. Callers must check the error list before trusting the program.
pub fn parse(source: &str) -> (ast::Program, Vec<parser::ParseError>) {
    parser::Parser::new(Tokenizer::new(source)).parse_program_with_errors()
}
