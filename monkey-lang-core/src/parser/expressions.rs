use std::rc::Rc;

use super::error;
use super::error::ParseError;
use super::statements::parse_statement;
use crate::ast::{
    BlockStatement, Expression, FunctionLiteral, Identifier, InfixOperationKind,
    PrefixOperationKind,
};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;

/// Binding strength of an operator, weakest first.
#[derive(PartialOrd, PartialEq, Debug, Clone, Copy)]
pub enum Precedence {
    Lowest = 0,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

pub fn precedence_of(token: &TokenKind) -> Precedence {
    match token {
        TokenKind::Equal => Precedence::Equals,
        TokenKind::NotEqual => Precedence::Equals,
        TokenKind::LessThan => Precedence::LessGreater,
        TokenKind::GreaterThan => Precedence::LessGreater,
        TokenKind::Plus => Precedence::Sum,
        TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk => Precedence::Product,
        TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// Pratt loop: parse a prefix expression, then keep folding it into infix
/// expressions while the upcoming operator binds tighter than `precedence`.
pub fn parse_expression(
    parser: &mut Parser,
    precedence: Precedence,
) -> Result<Expression, ParseError> {
    let Some(token) = parser.next_token() else {
        return Err(ParseError::premature_end_expected_expression());
    };
    let mut left_expression = prefix_parsing(token, parser)?;

    loop {
        let Some(next_token) = parser.iter.peek() else {
            break;
        };
        if precedence >= precedence_of(&next_token.kind) {
            break;
        }

        let Some(next_token) = parser.next_token() else {
            break;
        };
        let Some(infix_parse_function) = infix_parsing_function(next_token.kind) else {
            break;
        };
        left_expression = infix_parse_function(left_expression, parser)?;
    }

    Ok(left_expression)
}

fn prefix_operation(
    kind: PrefixOperationKind,
) -> impl FnOnce(&mut Parser) -> Result<Expression, ParseError> {
    move |parser| {
        Ok(Expression::PrefixOperation(
            kind,
            Box::new(parse_expression(parser, Precedence::Prefix)?),
        ))
    }
}

fn parse_grouped_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expression = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RParen)?;

    Ok(expression)
}

fn parse_integer_literal(literal: Rc<str>) -> Result<Expression, ParseError> {
    match literal.parse() {
        Ok(value) => Ok(Expression::IntegerLiteral(value)),
        Err(source) => Err(ParseError::InvalidInteger { literal, source }),
    }
}

/// Parses `element (separator element)* separator? terminator`, with the
/// opening delimiter already consumed.
fn parse_sequence<T>(
    parser: &mut Parser,
    parse_element: impl Fn(&mut Parser) -> Result<T, ParseError>,
    separator: TokenKind,
    terminator: TokenKind,
) -> Result<Vec<T>, ParseError> {
    let mut elements = Vec::new();

    loop {
        match parser.iter.peek() {
            Some(next) if next.kind == terminator => {
                parser.next_token();
                return Ok(elements);
            }
            None => {
                return Err(ParseError::PrematureEndOfInput {
                    expected: error::Expected::Token(terminator),
                })
            }
            _ => {
                elements.push(parse_element(parser)?);
            }
        }

        match parser.next_token() {
            Some(next) if next.kind == separator => continue,
            Some(next) if next.kind == terminator => return Ok(elements),
            next => return Err(ParseError::unexpected_token(terminator, next)),
        }
    }
}

fn parse_array_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let expressions = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RBracket,
    )?;
    Ok(Expression::ArrayLiteral(expressions))
}

fn parse_hash_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let pairs = parse_sequence(
        parser,
        |parser| {
            let key = parse_expression(parser, Precedence::Lowest)?;
            parser.expect_token(TokenKind::Colon)?;
            let value = parse_expression(parser, Precedence::Lowest)?;
            Ok((key, value))
        },
        TokenKind::Comma,
        TokenKind::RBrace,
    )?;
    Ok(Expression::HashLiteral(pairs))
}

fn parse_if_expression(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let condition = Box::new(parse_expression(parser, Precedence::Lowest)?);
    parser.expect_token(TokenKind::RParen)?;

    parser.expect_token(TokenKind::LBrace)?;
    let consequence = parse_block_statement(parser)?;

    let alternative = if parser
        .iter
        .next_if(|token| token.kind == TokenKind::Else)
        .is_some()
    {
        parser.expect_token(TokenKind::LBrace)?;
        Some(parse_block_statement(parser)?)
    } else {
        None
    };

    Ok(Expression::IfExpression {
        condition,
        consequence,
        alternative,
    })
}

// Statements inside a block may omit their `;`, so this cannot go through
// `parse_sequence`.
fn parse_block_statement(parser: &mut Parser) -> Result<BlockStatement, ParseError> {
    let mut statements = Vec::new();

    loop {
        match parser.iter.peek() {
            Some(Token {
                kind: TokenKind::RBrace,
                ..
            }) => {
                parser.next_token();
                return Ok(BlockStatement { statements });
            }
            None => {
                return Err(ParseError::PrematureEndOfInput {
                    expected: error::Expected::Token(TokenKind::RBrace),
                })
            }
            Some(_) => {
                statements.push(parse_statement(parser)?);
                parser.skip_semicolon();
            }
        }
    }
}

fn parse_function_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters = parse_parameters(parser)?;

    parser.expect_token(TokenKind::LBrace)?;
    let body = parse_block_statement(parser)?;

    Ok(Expression::FunctionLiteral(Rc::new(FunctionLiteral {
        parameters,
        body,
    })))
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    parse_sequence(
        parser,
        |parser| parser.parse_ident().map(|name| Identifier { name }),
        TokenKind::Comma,
        TokenKind::RParen,
    )
}

pub fn prefix_parsing(token: Token, parser: &mut Parser) -> Result<Expression, ParseError> {
    match token.kind {
        TokenKind::Ident(name) => Ok(Expression::Identifier(Identifier { name })),
        TokenKind::Int(val) => parse_integer_literal(val),
        TokenKind::String(val) => Ok(Expression::StringLiteral(val.to_string())),
        TokenKind::True => Ok(Expression::BooleanLiteral(true)),
        TokenKind::False => Ok(Expression::BooleanLiteral(false)),
        TokenKind::Bang => prefix_operation(PrefixOperationKind::Bang)(parser),
        TokenKind::Minus => prefix_operation(PrefixOperationKind::Minus)(parser),
        TokenKind::LParen => parse_grouped_expression(parser),
        TokenKind::LBracket => parse_array_literal(parser),
        TokenKind::LBrace => parse_hash_literal(parser),
        TokenKind::If => parse_if_expression(parser),
        TokenKind::Function => parse_function_literal(parser),
        _ => Err(ParseError::NoPrefixFunction(token)),
    }
}

type InfixFunction = Box<dyn FnOnce(Expression, &mut Parser) -> Result<Expression, ParseError>>;

// Operands on the right recurse at the operator's own precedence, which makes
// every binary operator left-associative.
fn infix_operation(token: TokenKind, kind: InfixOperationKind) -> InfixFunction {
    Box::new(
        move |left: Expression, parser: &mut Parser| -> Result<Expression, ParseError> {
            let new_precedence = precedence_of(&token);

            Ok(Expression::InfixOperation(
                kind,
                Box::new(left),
                Box::new(parse_expression(parser, new_precedence)?),
            ))
        },
    )
}

fn parse_call_function(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let arguments = parse_sequence(
        parser,
        |parser| parse_expression(parser, Precedence::Lowest),
        TokenKind::Comma,
        TokenKind::RParen,
    )?;

    Ok(Expression::CallExpression {
        function: Box::new(left),
        arguments,
    })
}

fn parse_index_expression(left: Expression, parser: &mut Parser) -> Result<Expression, ParseError> {
    let index = parse_expression(parser, Precedence::Lowest)?;
    parser.expect_token(TokenKind::RBracket)?;

    Ok(Expression::IndexExpression {
        left: Box::new(left),
        index: Box::new(index),
    })
}

pub fn infix_parsing_function(token: TokenKind) -> Option<InfixFunction> {
    use InfixOperationKind as InfixKind;

    match token {
        TokenKind::Plus => Some(infix_operation(TokenKind::Plus, InfixKind::Plus)),
        TokenKind::Minus => Some(infix_operation(TokenKind::Minus, InfixKind::Minus)),
        TokenKind::LessThan => Some(infix_operation(TokenKind::LessThan, InfixKind::LessThan)),
        TokenKind::GreaterThan => Some(infix_operation(
            TokenKind::GreaterThan,
            InfixKind::GreaterThan,
        )),
        TokenKind::Equal => Some(infix_operation(TokenKind::Equal, InfixKind::Equal)),
        TokenKind::NotEqual => Some(infix_operation(TokenKind::NotEqual, InfixKind::NotEqual)),
        TokenKind::Asterisk => Some(infix_operation(TokenKind::Asterisk, InfixKind::Multiply)),
        TokenKind::Slash => Some(infix_operation(TokenKind::Slash, InfixKind::Divide)),
        TokenKind::LParen => Some(Box::new(parse_call_function)),
        TokenKind::LBracket => Some(Box::new(parse_index_expression)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{precedence_of, Precedence};
    use crate::ast::{Expression, InfixOperationKind, PrefixOperationKind, Statement};
    use crate::lexer::{TokenKind, Tokenizer};
    use crate::parser::Parser;

    fn parse_single_expression(input: &str) -> Expression {
        let mut parser = Parser::new(Tokenizer::new(input));
        let mut program = parser.parse_program().unwrap();
        assert_eq!(program.statements.len(), 1);
        match program.statements.remove(0) {
            Statement::Expression(expression) => expression,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    #[test]
    fn precedence_ordering() {
        assert!(Precedence::Lowest < Precedence::Equals);
        assert!(precedence_of(&TokenKind::Equal) < precedence_of(&TokenKind::LessThan));
        assert!(precedence_of(&TokenKind::LessThan) < precedence_of(&TokenKind::Plus));
        assert!(precedence_of(&TokenKind::Plus) < precedence_of(&TokenKind::Slash));
        assert!(precedence_of(&TokenKind::Slash) < Precedence::Prefix);
        assert!(Precedence::Prefix < precedence_of(&TokenKind::LParen));
        assert_eq!(
            precedence_of(&TokenKind::LParen),
            precedence_of(&TokenKind::LBracket)
        );
        assert_eq!(precedence_of(&TokenKind::SemiColon), Precedence::Lowest);
    }

    #[test]
    fn prefix_expression_tree() {
        assert_eq!(
            parse_single_expression("-15"),
            Expression::PrefixOperation(
                PrefixOperationKind::Minus,
                Box::new(Expression::IntegerLiteral(15))
            )
        );
        assert_eq!(
            parse_single_expression("!true"),
            Expression::PrefixOperation(
                PrefixOperationKind::Bang,
                Box::new(Expression::BooleanLiteral(true))
            )
        );
    }

    #[test]
    fn infix_expression_tree() {
        assert_eq!(
            parse_single_expression("5 != x"),
            Expression::InfixOperation(
                InfixOperationKind::NotEqual,
                Box::new(Expression::IntegerLiteral(5)),
                Box::new(Expression::Identifier(crate::ast::Identifier {
                    name: "x".into()
                }))
            )
        );
    }

    #[test]
    fn function_literal_tree() {
        let Expression::FunctionLiteral(literal) = parse_single_expression("fn(x, y) { x + y; }")
        else {
            panic!("expected a function literal");
        };
        let names: Vec<&str> = literal.parameters.iter().map(|p| p.name.as_ref()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(literal.body.statements.len(), 1);
    }

    #[test]
    fn if_without_else() {
        let Expression::IfExpression { alternative, .. } =
            parse_single_expression("if (x) { x }")
        else {
            panic!("expected an if expression");
        };
        assert_eq!(alternative, None);
    }

    #[test]
    fn trailing_commas_are_accepted() {
        assert_eq!(
            parse_single_expression("[1, 2,]"),
            Expression::ArrayLiteral(vec![
                Expression::IntegerLiteral(1),
                Expression::IntegerLiteral(2)
            ])
        );
    }

    #[test]
    fn string_literal_keeps_backslashes() {
        assert_eq!(
            parse_single_expression(r#""a\tb""#),
            Expression::StringLiteral(r"a\tb".to_owned())
        );
    }
}
