pub mod error;
pub mod expressions;
pub mod statements;

use crate::ast::Program;
use crate::lexer::{Token, TokenKind};
pub use error::ParseError;
use statements::parse_statement;

pub struct Parser<'a> {
    pub(crate) iter: std::iter::Peekable<crate::lexer::Tokenizer<'a>>,
    // `{` consumed and not yet closed since the current top-level statement
    // began.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: crate::lexer::Tokenizer<'a>) -> Self {
        let iter = tokenizer.peekable();
        Self { iter, depth: 0 }
    }

    pub(crate) fn next_token(&mut self) -> Option<Token> {
        let token = self.iter.next()?;
        match token.kind {
            TokenKind::LBrace => self.depth += 1,
            TokenKind::RBrace => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        Some(token)
    }

    pub(crate) fn parse_ident(&mut self) -> Result<std::rc::Rc<str>, ParseError> {
        let token = self.next_token();
        match token {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(name),
            _ => Err(ParseError::unexpected_other(
                error::Expected::Identifier,
                token,
            )),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<(), ParseError> {
        let token = self.next_token();
        match token {
            Some(Token { kind, .. }) if kind == token_kind => Ok(()),
            _ => Err(ParseError::unexpected_token(token_kind, token)),
        }
    }

    /// Consumes a statement-terminating `;` if there is one.
    pub(crate) fn skip_semicolon(&mut self) {
        self.iter.next_if(|token| token.kind == TokenKind::SemiColon);
    }

    // Drop tokens until the failed statement is over: the next `;` outside
    // any block it opened, or the `}` closing its outermost block.
    fn synchronize(&mut self, error: &ParseError) {
        match error.token().map(|token| &token.kind) {
            Some(TokenKind::SemiColon) if self.depth == 0 => return,
            Some(TokenKind::RBrace) if self.depth == 0 => {
                self.skip_semicolon();
                return;
            }
            _ => {}
        }
        while let Some(token) = self.next_token() {
            match token.kind {
                TokenKind::SemiColon if self.depth == 0 => break,
                TokenKind::RBrace if self.depth == 0 => {
                    self.skip_semicolon();
                    break;
                }
                _ => {}
            }
        }
    }

    /// Parses every statement in the input, collecting errors instead of
    /// stopping at the first one. The returned program holds the statements
    /// that parsed cleanly and is only trustworthy when the error list is
    /// empty.
    pub fn parse_program_with_errors(&mut self) -> (Program, Vec<ParseError>) {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while self.iter.peek().is_some() {
            self.depth = 0;
            match parse_statement(self) {
                Ok(statement) => {
                    statements.push(statement);
                    self.skip_semicolon();
                }
                Err(err) => {
                    tracing::debug!(error = %err, "parse error");
                    self.synchronize(&err);
                    errors.push(err);
                }
            }
        }

        (Program { statements }, errors)
    }

    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let (program, errors) = self.parse_program_with_errors();
        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::error::Expected;
    use super::ParseError;
    use crate::lexer::TokenKind;

    fn test_parsing(tests: Vec<(&str, &str)>) {
        for (input, expected) in tests {
            let tokenizer = crate::lexer::Tokenizer::new(input);
            let mut parser = crate::parser::Parser::new(tokenizer);

            let program = parser.parse_program().unwrap();

            assert_eq!(program.to_string(), expected, "input: {}", input)
        }
    }

    fn parse_errors(input: &str) -> Vec<ParseError> {
        let tokenizer = crate::lexer::Tokenizer::new(input);
        crate::parser::Parser::new(tokenizer)
            .parse_program_with_errors()
            .1
    }

    #[test]
    fn test_operator_precedence() {
        let tests = vec![
            ("-a * b", "((-a) * b);\n"),
            ("!-a", "(!(-a));\n"),
            ("a + b + c", "((a + b) + c);\n"),
            ("a + b - c", "((a + b) - c);\n"),
            ("a * b * c", "((a * b) * c);\n"),
            ("a * b / c", "((a * b) / c);\n"),
            ("a + b / c", "(a + (b / c));\n"),
            (
                "a + b * c + d / e - f",
                "(((a + (b * c)) + (d / e)) - f);\n",
            ),
            ("3 + 4; -5 * 5", "(3 + 4);\n((-5) * 5);\n"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));\n"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));\n"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));\n",
            ),
            ("true == !false", "(true == (!false));\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_grouped_expressions() {
        let tests = vec![
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4);\n"),
            ("(5 + 5) * 2", "((5 + 5) * 2);\n"),
            ("2 / (5 + 5)", "(2 / (5 + 5));\n"),
            ("-(5 + 5)", "(-(5 + 5));\n"),
            ("!(true == true)", "(!(true == true));\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_call_and_index_expressions() {
        let tests = vec![
            ("a + add(b * c) + d", "((a + add((b * c))) + d);\n"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));\n",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g));\n",
            ),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d);\n",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])));\n",
            ),
            ("fn(x) { x; }(5)", "fn(x) {x;}(5);\n"),
            ("f()()", "f()();\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_statements() {
        let tests = vec![
            ("let x = 5;", "let x = 5;\n"),
            ("let y = true", "let y = true;\n"),
            ("let foobar = y;", "let foobar = y;\n"),
            ("return 5;", "return 5;\n"),
            ("return x + y", "return (x + y);\n"),
            ("let a = 1; let b = 2", "let a = 1;\nlet b = 2;\n"),
            ("", ""),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_conditional() {
        let tests = vec![
            ("if (x < y) { x }", "if ((x < y)) {x;};\n"),
            (
                "if (x < y) { x } else { y }",
                "if ((x < y)) {x;} else {y;};\n",
            ),
            (
                "if (a) { if (b) { return 1; } return 2; }",
                "if (a) {if (b) {return 1;}; return 2;};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_function() {
        let tests = vec![
            ("fn() {}", "fn() {};\n"),
            ("fn(x, y) { x + y; }", "fn(x, y) {(x + y);};\n"),
            (
                "let getName = fn(person) { person[\"name\"]; };",
                "let getName = fn(person) {(person[\"name\"]);};\n",
            ),
            (
                "let getName = fn(person) { person[\"name\"] };",
                "let getName = fn(person) {(person[\"name\"]);};\n",
            ),
        ];

        test_parsing(tests)
    }

    #[test]
    fn test_literals() {
        let tests = vec![
            ("[]", "[];\n"),
            ("[1, 2 * 2, 3 + 3]", "[1, (2 * 2), (3 + 3)];\n"),
            ("{}", "{};\n"),
            (
                "{\"one\": 1, \"two\": 2}",
                "{\"one\": 1, \"two\": 2};\n",
            ),
            (
                "{\"one\": 0 + 1, true: 10 - 8}",
                "{\"one\": (0 + 1), true: (10 - 8)};\n",
            ),
            ("\"hello world\"", "\"hello world\";\n"),
        ];

        test_parsing(tests)
    }

    #[test]
    fn errors_are_collected_across_statements() {
        let errors = parse_errors("let = 5; let x 10; let 838383;");
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            &errors[0],
            ParseError::UnexpectedToken {
                expected: Expected::Identifier,
                got,
            } if got.kind == TokenKind::Assign
        ));
        assert!(matches!(
            &errors[1],
            ParseError::UnexpectedToken {
                expected: Expected::Token(TokenKind::Assign),
                got,
            } if got.kind == TokenKind::Int("10".into())
        ));
    }

    #[test]
    fn parsing_resumes_after_an_error() {
        let tokenizer = crate::lexer::Tokenizer::new("let x = ; let y = 2; )");
        let (program, errors) = crate::parser::Parser::new(tokenizer).parse_program_with_errors();

        assert_eq!(program.to_string(), "let y = 2;\n");
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ParseError::NoPrefixFunction(token) if token.kind == TokenKind::SemiColon
        ));
        assert!(matches!(
            &errors[1],
            ParseError::NoPrefixFunction(token) if token.kind == TokenKind::RParen
        ));
    }

    #[test]
    fn errors_inside_blocks_skip_the_rest_of_the_block() {
        let (program, errors) = crate::parse("let a = fn() { let = 1; 2 }; let b = 3;");
        assert_eq!(program.to_string(), "let b = 3;\n");
        assert_eq!(errors.len(), 1);

        let (program, errors) = crate::parse("if (x) { let = 1; { 2 } } 5; let c = { 1: 2 };");
        assert_eq!(program.to_string(), "5;\nlet c = {1: 2};\n");
        assert_eq!(errors.len(), 1);

        let (program, errors) = crate::parse("fn() { 1 + } let d = 4;");
        assert_eq!(program.to_string(), "let d = 4;\n");
        assert!(matches!(
            errors.as_slice(),
            [ParseError::NoPrefixFunction(token)] if token.kind == TokenKind::RBrace
        ));
    }

    #[test]
    fn missing_closing_tokens() {
        assert!(matches!(
            parse_errors("fn(x) { x").as_slice(),
            [ParseError::PrematureEndOfInput {
                expected: Expected::Token(TokenKind::RBrace)
            }]
        ));
        assert!(matches!(
            parse_errors("if x { 1 }").as_slice(),
            [ParseError::UnexpectedToken {
                expected: Expected::Token(TokenKind::LParen),
                ..
            }]
        ));
        assert!(matches!(
            parse_errors("[1, 2").as_slice(),
            [ParseError::PrematureEndOfInput { .. }]
        ));
    }

    #[test]
    fn malformed_integer_literal() {
        assert!(matches!(
            parse_errors("99999999999999999999;").as_slice(),
            [ParseError::InvalidInteger { literal, .. }]
                if literal.as_ref() == "99999999999999999999"
        ));
    }

    #[test]
    fn illegal_tokens_are_reported() {
        assert!(matches!(
            parse_errors("5 @ 5;").as_slice(),
            [ParseError::NoPrefixFunction(token)] if token.kind == TokenKind::Illegal("@".into())
        ));
    }
}
