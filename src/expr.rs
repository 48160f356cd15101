//! Data structures for full mathematical dice expressions, as produced by the parser.
//!
//! An [`Expression`] is a flat [`Chain`] of operands joined by operators, where any operand may itself be a
//! parenthesized chain. Nothing here knows how to evaluate anything; see [`crate::eval`] for that.

use alloc::{boxed::Box, vec::Vec};
use core::{fmt, iter, mem, num::NonZeroU32, slice};

use crate::dice::Dice;

/// Leaf value of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Term {
	/// Standalone integer
	Num(i64),

	/// Dice literal
	Dice(Dice),
}

impl Term {
	/// Checks whether the term always yields the same value.
	#[must_use]
	pub const fn is_deterministic(&self) -> bool {
		match self {
			Self::Num(..) => true,
			Self::Dice(dice) => dice.is_deterministic(),
		}
	}
}

impl From<i64> for Term {
	#[inline]
	fn from(value: i64) -> Self {
		Self::Num(value)
	}
}

impl From<Dice> for Term {
	#[inline]
	fn from(dice: Dice) -> Self {
		Self::Dice(dice)
	}
}

impl fmt::Display for Term {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Num(x) => write!(f, "{x}"),
			Self::Dice(dice) => write!(f, "{dice}"),
		}
	}
}

/// Binary arithmetic operator. All operators are left-associative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum Operator {
	/// Addition (`+`)
	Add,

	/// Subtraction (`-`)
	Sub,

	/// Multiplication (`*`)
	Mul,

	/// Integer division (`/`), truncating toward zero
	Div,
}

impl Operator {
	/// Binding strength of the operator: 1 for additive, 2 for multiplicative.
	#[must_use]
	pub const fn precedence(self) -> u8 {
		match self {
			Self::Add | Self::Sub => 1,
			Self::Mul | Self::Div => 2,
		}
	}

	/// Source symbol of the operator.
	#[must_use]
	pub const fn symbol(self) -> char {
		match self {
			Self::Add => '+',
			Self::Sub => '-',
			Self::Mul => '*',
			Self::Div => '/',
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// Anything that can sit between operators in a [`Chain`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Operand {
	/// Number or dice
	Term(Term),

	/// Parenthesized sub-chain
	Group(Box<Chain>),
}

impl From<Term> for Operand {
	#[inline]
	fn from(term: Term) -> Self {
		Self::Term(term)
	}
}

impl From<i64> for Operand {
	#[inline]
	fn from(value: i64) -> Self {
		Self::Term(Term::Num(value))
	}
}

impl From<Dice> for Operand {
	#[inline]
	fn from(dice: Dice) -> Self {
		Self::Term(Term::Dice(dice))
	}
}

impl From<Chain> for Operand {
	/// Wraps the chain in parentheses.
	#[inline]
	fn from(chain: Chain) -> Self {
		Self::Group(Box::new(chain))
	}
}

/// Operands alternating with operators, in source order. A chain can't start or end with an operator, and every
/// group it contains is balanced, simply because there's no way to represent anything else.
///
/// # Examples
/// ```
/// use dicey::{expr::{Chain, Operator}, Dice};
///
/// // (1 + 2d6) * 3
/// let chain = Chain::new(Chain::new(1_i64).then(Operator::Add, Dice::new(2, 6))).then(Operator::Mul, 3_i64);
/// assert_eq!(chain.to_string(), "(1 + 2d6) * 3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Chain {
	/// First operand
	pub head: Operand,

	/// Every following operator and the operand to its right
	pub tail: Vec<(Operator, Operand)>,
}

impl Chain {
	/// Creates a chain consisting of a single operand.
	#[must_use]
	pub fn new(head: impl Into<Operand>) -> Self {
		Self {
			head: head.into(),
			tail: Vec::new(),
		}
	}

	/// Appends an operator and its right-hand operand to the chain.
	#[must_use]
	pub fn then(mut self, op: Operator, operand: impl Into<Operand>) -> Self {
		self.tail.push((op, operand.into()));
		self
	}

	/// Iterates over the chain as a flat stream of [`Item`]s, descending into groups. The walk uses its own stack
	/// rather than recursion, so arbitrarily deep nesting is fine.
	#[must_use]
	pub fn items(&self) -> Items<'_> {
		Items {
			frames: alloc::vec![Frame {
				tail: self.tail.iter(),
				nested: false,
			}],
			pending: Some(&self.head),
		}
	}

	/// Moves every group directly inside the chain out into `groups`, leaving placeholder terms behind.
	fn detach_groups(&mut self, groups: &mut Vec<Box<Self>>) {
		let operands = iter::once(&mut self.head).chain(self.tail.iter_mut().map(|(_, operand)| operand));
		for operand in operands {
			if matches!(operand, Operand::Group(..)) {
				if let Operand::Group(group) = mem::replace(operand, Operand::Term(Term::Num(0))) {
					groups.push(group);
				}
			}
		}
	}
}

impl Drop for Chain {
	/// Tears nested groups down one at a time instead of recursing through every level.
	fn drop(&mut self) {
		let mut groups = Vec::new();
		self.detach_groups(&mut groups);
		while let Some(mut group) = groups.pop() {
			group.detach_groups(&mut groups);
		}
	}
}

impl fmt::Display for Chain {
	/// Formats the chain with a single space around each operator and parentheses kept as written.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for item in self.items() {
			match item {
				Item::Open => f.write_str("(")?,
				Item::Close => f.write_str(")")?,
				Item::Term(term) => write!(f, "{term}")?,
				Item::Op(op) => write!(f, " {op} ")?,
			}
		}
		Ok(())
	}
}

/// Single element of the flattened stream produced by [`Chain::items()`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_enums)]
pub enum Item<'a> {
	/// Opening parenthesis
	Open,

	/// Closing parenthesis
	Close,

	/// Leaf term
	Term(&'a Term),

	/// Binary operator
	Op(Operator),
}

/// Iterator returned by [`Chain::items()`]
#[derive(Debug, Clone)]
pub struct Items<'a> {
	/// One frame per chain currently being walked, innermost last
	frames: Vec<Frame<'a>>,

	/// Operand to emit next, set after emitting an operator or an opening parenthesis
	pending: Option<&'a Operand>,
}

/// Progress through one chain
#[derive(Debug, Clone)]
struct Frame<'a> {
	/// Remaining operator/operand pairs
	tail: slice::Iter<'a, (Operator, Operand)>,

	/// Whether the chain is a group (and so needs a closing parenthesis when done)
	nested: bool,
}

impl<'a> Items<'a> {
	/// Emits an operand, descending into it if it's a group.
	fn enter(&mut self, operand: &'a Operand) -> Item<'a> {
		match operand {
			Operand::Term(term) => Item::Term(term),
			Operand::Group(chain) => {
				self.frames.push(Frame {
					tail: chain.tail.iter(),
					nested: true,
				});
				self.pending = Some(&chain.head);
				Item::Open
			}
		}
	}
}

impl<'a> Iterator for Items<'a> {
	type Item = Item<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(operand) = self.pending.take() {
			return Some(self.enter(operand));
		}

		let frame = self.frames.last_mut()?;
		if let Some((op, operand)) = frame.tail.next() {
			self.pending = Some(operand);
			return Some(Item::Op(*op));
		}

		let frame = self.frames.pop()?;
		frame.nested.then_some(Item::Close)
	}
}

/// Which extreme single die face a [`Meta`] modifier refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_enums)]
pub enum MetaKind {
	/// Lowest face rolled (`min`)
	Min,

	/// Highest face rolled (`max`)
	Max,
}

impl fmt::Display for MetaKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Min => "min",
			Self::Max => "max",
		})
	}
}

/// Trailing modifier that applies the lowest or highest single die face rolled during the pass, e.g. `- min`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Meta {
	/// Operator joining the modifier to the rest of the expression (only `+` and `-` are parseable)
	pub op: Operator,

	/// Extreme to apply
	pub kind: MetaKind,
}

impl fmt::Display for Meta {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.op, self.kind)
	}
}

/// A complete parsed dice expression: a chain with an optional meta modifier and repeat count.
///
/// Expressions are immutable once built and can be evaluated any number of times (see [`Expression::eval()`]).
///
/// # Examples
/// ```
/// use dicey::{expr::{Chain, Expression, Meta, MetaKind, Operator}, Dice};
///
/// let expr = Expression::new(Chain::new(Dice::new(4, 6)))
/// 	.with_meta(Meta { op: Operator::Sub, kind: MetaKind::Min })
/// 	.repeated(6);
/// assert_eq!(expr.to_string(), "4d6 - min {6}");
/// assert_eq!(expr.repeat_count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Expression {
	/// Main body of the expression
	pub chain: Chain,

	/// Trailing meta modifier
	pub meta: Option<Meta>,

	/// Number of independent passes to evaluate
	pub repeat: Option<NonZeroU32>,
}

impl Expression {
	/// Creates an expression from a chain, without any meta modifier or repeat count.
	#[must_use]
	pub const fn new(chain: Chain) -> Self {
		Self {
			chain,
			meta: None,
			repeat: None,
		}
	}

	/// Sets the meta modifier.
	#[must_use]
	pub const fn with_meta(mut self, meta: Meta) -> Self {
		self.meta = Some(meta);
		self
	}

	/// Sets the repeat count. A count of zero removes it.
	#[must_use]
	pub const fn repeated(mut self, count: u32) -> Self {
		self.repeat = NonZeroU32::new(count);
		self
	}

	/// Number of passes [`Self::eval_all()`] will run (1 unless a repeat count is present).
	#[must_use]
	#[inline]
	pub const fn repeat_count(&self) -> u32 {
		match self.repeat {
			Some(count) => count.get(),
			None => 1,
		}
	}

	/// Checks whether the expression is deterministic (will always yield the same value with every evaluation).
	/// Only dice with more than one side and at least one die make an expression non-deterministic.
	///
	/// A deterministic expression containing a meta modifier may still fail to evaluate if it never rolls any dice.
	#[must_use]
	pub fn is_deterministic(&self) -> bool {
		self.chain.items().all(|item| match item {
			Item::Term(term) => term.is_deterministic(),
			Item::Open | Item::Close | Item::Op(..) => true,
		})
	}

	/// Iterates over every dice term in the expression, in source order.
	pub fn dice(&self) -> impl Iterator<Item = &Dice> + '_ {
		self.chain.items().filter_map(|item| match item {
			Item::Term(Term::Dice(dice)) => Some(dice),
			_ => None,
		})
	}
}

impl fmt::Display for Expression {
	/// Formats the normalized source of the expression, which parses back into an identical expression.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.chain)?;
		if let Some(meta) = &self.meta {
			write!(f, " {meta}")?;
		}
		if let Some(count) = self.repeat {
			write!(f, " {{{count}}}")?;
		}
		Ok(())
	}
}
