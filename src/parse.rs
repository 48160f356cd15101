//! Parser generators for dice expressions, built with [chumsky].
//!
//! The grammar, informally:
//!
//! ```text
//! expr    := chain meta? repeat?
//! chain   := operand (op operand)*
//! operand := term | '(' chain ')'
//! term    := INT 'd' INT | INT
//! meta    := ('+' | '-') ('min' | 'max')
//! repeat  := '{' INT '}'
//! op      := '+' | '-' | '*' | '/'
//! ```
//!
//! Whitespace is allowed around any token, including the `d` of a dice term. Integers may have leading zeros.
//! Groups can be nested at most [`MAX_NESTING`] levels deep.

#![cfg(feature = "parse")]

use alloc::{
	boxed::Box,
	format,
	string::{String, ToString},
	vec::Vec,
};
use core::{fmt, num::NonZeroU32, ops::Range};

use chumsky::prelude::*;

use crate::{
	dice::Dice,
	expr::{Chain, Expression, Meta, MetaKind, Operand, Operator, Term},
};

/// Extra parser state (rich errors) used by every parser in this module
type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Deepest nesting of parenthesized groups the parser accepts
pub const MAX_NESTING: usize = 256;

/// Generates a parser for a run of decimal digits, leading zeros included.
fn digits<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
	any()
		.filter(char::is_ascii_digit)
		.repeated()
		.at_least(1)
		.to_slice()
		.labelled("integer")
}

/// Generates a parser that looks ahead over the rest of the input and fails on the first `(` that opens a group
/// more than [`MAX_NESTING`] levels deep. Consumes nothing.
fn nesting_limit<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
	any()
		.repeated()
		.to_slice()
		.try_map(|rest: &str, span: SimpleSpan| {
			let mut depth = 0_usize;
			for (offset, ch) in rest.char_indices() {
				match ch {
					'(' => {
						depth = depth.saturating_add(1);
						if depth > MAX_NESTING {
							let start = span.start.saturating_add(offset);
							return Err(Rich::custom(
								SimpleSpan::from(start..start.saturating_add(1)),
								format!("Groups can't be nested more than {MAX_NESTING} levels deep"),
							));
						}
					}
					')' => depth = depth.saturating_sub(1),
					_ => {}
				}
			}
			Ok(())
		})
		.rewind()
}

/// Generates a parser that specifically handles dice terms like "1d20", "2d6", "10d8", etc.
pub fn dice_part<'src>() -> impl Parser<'src, &'src str, Dice, Extra<'src>> + Clone {
	digits()
		.then_ignore(just('d').padded())
		.then(digits())
		.try_map(|(count, sides): (&str, &str), span| {
			let count = count
				.parse()
				.map_err(|err| Rich::custom(span, format!("Dice count: {err}")))?;
			let sides = sides
				.parse()
				.map_err(|err| Rich::custom(span, format!("Dice sides: {err}")))?;
			Ok(Dice::new(count, sides))
		})
		.labelled("dice")
}

/// Generates a parser that specifically handles dice terms like "1d20", "2d6", "10d8", etc.
/// and expects end of input
pub fn dice<'src>() -> impl Parser<'src, &'src str, Dice, Extra<'src>> + Clone {
	dice_part().then_ignore(end())
}

/// Generates a parser that handles a single leaf term: either dice or a plain number.
pub fn term_part<'src>() -> impl Parser<'src, &'src str, Term, Extra<'src>> + Clone {
	let num = digits()
		.try_map(|num: &str, span| {
			num.parse()
				.map(Term::Num)
				.map_err(|err| Rich::custom(span, format!("Number: {err}")))
		})
		.labelled("number");

	dice_part().map(Term::Dice).or(num)
}

/// Generates a parser that handles a single leaf term and expects end of input
pub fn term<'src>() -> impl Parser<'src, &'src str, Term, Extra<'src>> + Clone {
	term_part().padded().then_ignore(end())
}

/// Generates a parser for the four binary operators.
fn operator<'src>() -> impl Parser<'src, &'src str, Operator, Extra<'src>> + Clone {
	choice((
		just('+').to(Operator::Add),
		just('-').to(Operator::Sub),
		just('*').to(Operator::Mul),
		just('/').to(Operator::Div),
	))
	.padded()
	.labelled("operator")
}

/// Generates a parser that handles chains of terms and parenthesized groups joined by operators. Input with groups
/// nested more than [`MAX_NESTING`] levels deep is rejected up front.
pub fn chain<'src>() -> impl Parser<'src, &'src str, Chain, Extra<'src>> + Clone {
	nesting_limit().ignore_then(recursive(|chain| {
		// Parser for chains enclosed in parentheses
		let group = chain
			.delimited_by(just('('), just(')'))
			.map(|chain| Operand::Group(Box::new(chain)));

		let operand = term_part().map(Operand::Term).or(group).padded();

		operand
			.clone()
			.then(operator().then(operand).repeated().collect::<Vec<_>>())
			.map(|(head, tail)| Chain { head, tail })
	}))
}

/// Generates a parser for the trailing meta modifier, e.g. "- min" or "+max".
fn meta<'src>() -> impl Parser<'src, &'src str, Meta, Extra<'src>> + Clone {
	choice((just('+').to(Operator::Add), just('-').to(Operator::Sub)))
		.padded()
		.then(choice((
			just("min").to(MetaKind::Min),
			just("max").to(MetaKind::Max),
		)))
		.map(|(op, kind)| Meta { op, kind })
		.padded()
		.labelled("meta modifier")
}

/// Generates a parser for the trailing repeat count, e.g. "{3}".
fn repeat<'src>() -> impl Parser<'src, &'src str, NonZeroU32, Extra<'src>> + Clone {
	digits()
		.padded()
		.delimited_by(just('{'), just('}'))
		.try_map(|count: &str, span| {
			let count: u32 = count
				.parse()
				.map_err(|err| Rich::custom(span, format!("Repeat count: {err}")))?;
			NonZeroU32::new(count).ok_or_else(|| Rich::custom(span, "Repeat count: must be at least 1"))
		})
		.padded()
		.labelled("repeat count")
}

/// Generates a parser that handles full expressions: a chain, then an optional meta modifier, then an optional
/// repeat count
pub fn expr_part<'src>() -> impl Parser<'src, &'src str, Expression, Extra<'src>> + Clone {
	chain()
		.then(meta().or_not())
		.then(repeat().or_not())
		.map(|((chain, meta), repeat)| Expression { chain, meta, repeat })
}

/// Generates a parser that handles full expressions and expects end of input
///
/// # Examples
/// ```
/// use chumsky::Parser;
///
/// let expr = dicey::parser().parse("(1 + 2d4) * 3 - min {2}").into_result().unwrap();
/// assert_eq!(expr.repeat_count(), 2);
/// assert!(dicey::parser().parse("(1 + 2d4").has_errors());
/// ```
pub fn expr<'src>() -> impl Parser<'src, &'src str, Expression, Extra<'src>> + Clone {
	expr_part().then_ignore(end())
}

/// Single problem found in the input
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Problem {
	/// Byte range of the input the problem was found at
	pub span: Range<usize>,

	/// Description of the problem
	pub message: String,
}

impl fmt::Display for Problem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
	}
}

/// Error for input that isn't a valid dice expression. Spans refer to the input as given, before lowercasing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Error {
	/// Every problem the parser reported (always at least one)
	pub problems: Vec<Problem>,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"syntax error: {}",
			self.problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
		)
	}
}

impl<'src> From<Vec<Rich<'src, char>>> for Error {
	fn from(errs: Vec<Rich<'src, char>>) -> Self {
		Self {
			problems: errs
				.iter()
				.map(|err| Problem {
					span: err.span().start..err.span().end,
					message: err.to_string(),
				})
				.collect(),
		}
	}
}

/// Lowercased copy of some input that remembers which byte of the original each of its bytes came from
#[derive(Debug)]
struct Lowercased {
	/// Lowercased text
	text: String,

	/// Original offset for every byte offset of `text`, plus one for its end
	origins: Vec<usize>,
}

impl Lowercased {
	/// Lowercases the input one character at a time.
	fn new(input: &str) -> Self {
		let mut text = String::with_capacity(input.len());
		let mut origins = Vec::with_capacity(input.len().saturating_add(1));

		for (start, ch) in input.char_indices() {
			text.extend(ch.to_lowercase());

			// The first byte of a lowered character maps to its start and the rest to its end, so spans never
			// split an original character
			origins.push(start);
			origins.resize(text.len(), start.saturating_add(ch.len_utf8()));
		}
		origins.push(input.len());

		Self { text, origins }
	}

	/// Runs a parser over the lowercased text, translating the spans of any problems back to the original input.
	fn parse<'src, T>(&'src self, parser: impl Parser<'src, &'src str, T, Extra<'src>>) -> Result<T, Error> {
		parser.parse(self.text.as_str()).into_result().map_err(|errs| {
			let mut err = Error::from(errs);
			for problem in &mut err.problems {
				problem.span = self.origin(problem.span.start)..self.origin(problem.span.end);
			}
			err
		})
	}

	/// Maps an offset in the lowercased text to one in the original input.
	fn origin(&self, offset: usize) -> usize {
		self.origins
			.get(offset)
			.or(self.origins.last())
			.copied()
			.unwrap_or(offset)
	}
}

impl core::str::FromStr for Dice {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Lowercased::new(s).parse(dice())
	}
}

impl core::str::FromStr for Term {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Lowercased::new(s).parse(term())
	}
}

impl core::str::FromStr for Expression {
	type Err = Error;

	/// Parses a full expression. Input is lowercased first, so "2D6 + MAX" is fine.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Lowercased::new(s).parse(expr())
	}
}
