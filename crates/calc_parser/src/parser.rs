//! Textual expression parser.
//!
//! Parses into an intermediate [`ParseNode`] tree, then lowers into the
//! shared AST. Decimal and scientific literals are converted to exact
//! rationals so no precision is lost before evaluation.

use calc_ast::{add, div, func, mul, neg, pow, sub, Constant, Expr};
use nom::{
    branch::alt,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::{fold_many0, many0, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Pow;
use std::rc::Rc;

use crate::error::ParseError;

#[derive(Debug, Clone)]
enum ParseNode {
    Number(BigRational),
    Str(String),
    Ident(String),
    Add(Box<ParseNode>, Box<ParseNode>),
    Sub(Box<ParseNode>, Box<ParseNode>),
    Mul(Box<ParseNode>, Box<ParseNode>),
    Div(Box<ParseNode>, Box<ParseNode>),
    Mod(Box<ParseNode>, Box<ParseNode>),
    Pow(Box<ParseNode>, Box<ParseNode>),
    Neg(Box<ParseNode>),
    Factorial(Box<ParseNode>),
    Call(String, Vec<ParseNode>),
    List(Vec<ParseNode>),
}

impl ParseNode {
    fn lower(self) -> Result<Rc<Expr>, ParseError> {
        Ok(match self {
            ParseNode::Number(n) => Rc::new(Expr::Number(n)),
            ParseNode::Str(s) => Rc::new(Expr::Str(s)),
            ParseNode::Ident(name) => match Constant::from_name(&name) {
                Some(c) => Rc::new(Expr::Constant(c)),
                None => Rc::new(Expr::Variable(name)),
            },
            ParseNode::Add(l, r) => add(l.lower()?, r.lower()?),
            ParseNode::Sub(l, r) => sub(l.lower()?, r.lower()?),
            ParseNode::Mul(l, r) => mul(l.lower()?, r.lower()?),
            ParseNode::Div(l, r) => div(l.lower()?, r.lower()?),
            ParseNode::Mod(l, r) => func("mod", vec![l.lower()?, r.lower()?]),
            ParseNode::Pow(b, e) => pow(b.lower()?, e.lower()?),
            ParseNode::Neg(e) => neg(e.lower()?),
            ParseNode::Factorial(e) => Rc::new(Expr::Factorial(e.lower()?)),
            ParseNode::Call(name, args) => {
                let lowered: Result<Vec<_>, _> = args.into_iter().map(|a| a.lower()).collect();
                Rc::new(Expr::Function(name, lowered?))
            }
            ParseNode::List(elems) => return lower_list(elems),
        })
    }
}

/// A list literal is a matrix when every element is itself a list
/// (rows must agree in length), otherwise a single row.
fn lower_list(elems: Vec<ParseNode>) -> Result<Rc<Expr>, ParseError> {
    let nested = elems.iter().any(|e| matches!(e, ParseNode::List(_)));
    if !nested {
        let row: Result<Vec<_>, _> = elems.into_iter().map(|e| e.lower()).collect();
        return Ok(Rc::new(Expr::Matrix(vec![row?])));
    }
    let mut rows = Vec::with_capacity(elems.len());
    let mut width = None;
    for elem in elems {
        let ParseNode::List(cells) = elem else {
            return Err(ParseError::RaggedMatrix);
        };
        match width {
            None => width = Some(cells.len()),
            Some(w) if w != cells.len() => return Err(ParseError::RaggedMatrix),
            _ => {}
        }
        let row: Result<Vec<_>, _> = cells.into_iter().map(|c| c.lower()).collect();
        rows.push(row?);
    }
    Ok(Rc::new(Expr::Matrix(rows)))
}

fn ws_char<'a>(c: char) -> impl FnMut(&'a str) -> IResult<&'a str, char> {
    move |input| preceded(multispace0, char(c))(input)
}

fn rational_from_literal(text: &str) -> Result<BigRational, ()> {
    let (mantissa, exp) = match text.find(['e', 'E']) {
        Some(i) => (&text[..i], text[i + 1..].parse::<i32>().map_err(|_| ())?),
        None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(i) => (&mantissa[..i], &mantissa[i + 1..]),
        None => (mantissa, ""),
    };
    let digits: BigInt = format!("{}{}", int_part, frac_part).parse().map_err(|_| ())?;
    let ten = BigInt::from(10);
    let mut value = BigRational::new(digits, Pow::pow(&ten, frac_part.len()));
    if exp >= 0 {
        value *= BigRational::from_integer(Pow::pow(&ten, exp as usize));
    } else {
        value /= BigRational::from_integer(Pow::pow(&ten, (-exp) as usize));
    }
    Ok(value)
}

fn number(input: &str) -> IResult<&str, ParseNode> {
    map_res(
        recognize(tuple((
            digit1,
            opt(pair(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |text: &str| rational_from_literal(text).map(ParseNode::Number),
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Alpha,
            )))
        }
    }
    let end = chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$'))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    Ok((&input[end..], &input[..end]))
}

fn string_lit(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(
            char('"'),
            nom::bytes::complete::take_while(|c| c != '"'),
            char('"'),
        ),
        |s: &str| ParseNode::Str(s.to_string()),
    )(input)
}

fn call_or_var(input: &str) -> IResult<&str, ParseNode> {
    let (rest, name) = identifier(input)?;
    let args = delimited(
        ws_char('('),
        separated_list0(ws_char(','), alt((list, expr_node))),
        ws_char(')'),
    )(rest);
    match args {
        Ok((rest2, args)) => Ok((rest2, ParseNode::Call(name.to_string(), args))),
        Err(_) => Ok((rest, ParseNode::Ident(name.to_string()))),
    }
}

fn paren_group(input: &str) -> IResult<&str, ParseNode> {
    delimited(char('('), expr_node, ws_char(')'))(input)
}

fn list(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(
            ws_char('['),
            separated_list0(ws_char(','), alt((list, expr_node))),
            ws_char(']'),
        ),
        ParseNode::List,
    )(input)
}

/// Operand glued directly after a number literal: `2x`, `3(x+1)`,
/// `2sin(x)`. Factorial and power still bind tighter than the
/// implicit multiplication.
fn juxta_operand(input: &str) -> IResult<&str, ParseNode> {
    let (rest, base) = alt((call_or_var, paren_group))(input)?;
    let (rest, base) = fold_many0(
        ws_char('!'),
        move || base.clone(),
        |acc, _| ParseNode::Factorial(Box::new(acc)),
    )(rest)?;
    let (rest, exp) = opt(preceded(ws_char('^'), unary))(rest)?;
    Ok((
        rest,
        match exp {
            Some(e) => ParseNode::Pow(Box::new(base), Box::new(e)),
            None => base,
        },
    ))
}

fn number_with_juxtaposition(input: &str) -> IResult<&str, ParseNode> {
    let (rest, num) = number(input)?;
    match juxta_operand(rest) {
        Ok((rest2, rhs)) => Ok((rest2, ParseNode::Mul(Box::new(num), Box::new(rhs)))),
        Err(_) => Ok((rest, num)),
    }
}

fn primary(input: &str) -> IResult<&str, ParseNode> {
    preceded(
        multispace0,
        alt((
            number_with_juxtaposition,
            string_lit,
            list,
            call_or_var,
            paren_group,
        )),
    )(input)
}

fn postfix(input: &str) -> IResult<&str, ParseNode> {
    let (rest, base) = primary(input)?;
    fold_many0(
        ws_char('!'),
        move || base.clone(),
        |acc, _| ParseNode::Factorial(Box::new(acc)),
    )(rest)
}

fn power(input: &str) -> IResult<&str, ParseNode> {
    let (rest, base) = postfix(input)?;
    let (rest, exp) = opt(preceded(ws_char('^'), unary))(rest)?;
    Ok((
        rest,
        match exp {
            Some(e) => ParseNode::Pow(Box::new(base), Box::new(e)),
            None => base,
        },
    ))
}

fn unary(input: &str) -> IResult<&str, ParseNode> {
    alt((
        map(preceded(ws_char('-'), unary), |e| {
            ParseNode::Neg(Box::new(e))
        }),
        power,
    ))(input)
}

fn term(input: &str) -> IResult<&str, ParseNode> {
    let (rest, init) = unary(input)?;
    fold_many0(
        pair(preceded(multispace0, one_of("*/%")), unary),
        move || init.clone(),
        |acc, (op, rhs)| {
            let (l, r) = (Box::new(acc), Box::new(rhs));
            match op {
                '*' => ParseNode::Mul(l, r),
                '/' => ParseNode::Div(l, r),
                _ => ParseNode::Mod(l, r),
            }
        },
    )(rest)
}

fn expr_node(input: &str) -> IResult<&str, ParseNode> {
    let (rest, init) = term(input)?;
    fold_many0(
        pair(preceded(multispace0, one_of("+-")), term),
        move || init.clone(),
        |acc, (op, rhs)| {
            let (l, r) = (Box::new(acc), Box::new(rhs));
            match op {
                '+' => ParseNode::Add(l, r),
                _ => ParseNode::Sub(l, r),
            }
        },
    )(rest)
}

/// Parse a complete expression. The whole input must be consumed.
pub fn parse(input: &str) -> Result<Rc<Expr>, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    match expr_node(trimmed) {
        Ok((rest, node)) => {
            let rest = rest.trim_start();
            if !rest.is_empty() {
                return Err(ParseError::UnconsumedInput(rest.to_string()));
            }
            node.lower()
        }
        Err(e) => Err(ParseError::Syntax(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn parses_precedence() {
        assert_eq!(roundtrip("1 + 2 * 3"), "1 + 2 * 3");
        assert_eq!(roundtrip("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(roundtrip("2 ^ 3 ^ 2"), "2^3^2");
        assert_eq!(roundtrip("-x^2"), "-x^2");
    }

    #[test]
    fn parses_implicit_multiplication() {
        assert_eq!(roundtrip("2x"), "2 * x");
        assert_eq!(roundtrip("x^5 + 2x"), "x^5 + 2 * x");
        assert_eq!(roundtrip("3(x + 1)"), "3 * (x + 1)");
        assert_eq!(roundtrip("2sin(x)"), "2 * sin(x)");
        // power binds tighter than the implicit product
        assert_eq!(roundtrip("2x^2"), "2 * x^2");
    }

    #[test]
    fn parses_exact_decimals() {
        let e = parse("0.1").unwrap();
        assert_eq!(e.to_string(), "1/10");
        let e = parse("1.5e3").unwrap();
        assert_eq!(e.to_string(), "1500");
        let e = parse("25e-2").unwrap();
        assert_eq!(e.to_string(), "1/4");
    }

    #[test]
    fn parses_functions_and_constants() {
        assert_eq!(roundtrip("sin(pi / 2)"), "sin(pi / 2)");
        assert_eq!(roundtrip("max(1, 2, 3)"), "max(1, 2, 3)");
        assert_eq!(roundtrip("f()"), "f()");
    }

    #[test]
    fn parses_factorial_and_mod() {
        assert_eq!(roundtrip("5!"), "5!");
        assert_eq!(roundtrip("x! + 1"), "x! + 1");
        assert_eq!(roundtrip("7 % 3"), "mod(7, 3)");
    }

    #[test]
    fn parses_strings() {
        assert_eq!(roundtrip("\"x^2\""), "\"x^2\"");
    }

    #[test]
    fn parses_matrices() {
        assert_eq!(roundtrip("[1, 2, 3]"), "[1, 2, 3]");
        assert_eq!(roundtrip("[[1, 2], [3, 4]]"), "[[1, 2], [3, 4]]");
        assert!(matches!(
            parse("[[1, 2], [3]]"),
            Err(ParseError::RaggedMatrix)
        ));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(matches!(
            parse("1 + 2 @"),
            Err(ParseError::UnconsumedInput(_))
        ));
        assert!(matches!(parse(""), Err(ParseError::Empty)));
        assert!(matches!(parse("   "), Err(ParseError::Empty)));
    }
}
