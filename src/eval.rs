//! Evaluation of parsed [`Expression`]s using a two-stack operator-precedence engine.
//!
//! Each pass walks the expression left to right exactly once: values go on one stack, operators (and the `(`
//! sentinel) go on another, and an incoming operator first reduces everything on the operator stack that binds at
//! least as tightly. Dice are rolled as they're reached, with the lowest and highest single face of the pass
//! recorded for any trailing [`Meta`] modifier.

use alloc::{string::String, vec::Vec};
use core::fmt::{self, Write as _};

use crate::{
	dice::{Dice, Error as DiceError, Roller},
	expr::{Expression, Item, Meta, MetaKind, Operator, Term},
};

/// Lowest and highest single die faces rolled during a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Extremes {
	/// Lowest face
	pub min: u32,

	/// Highest face
	pub max: u32,
}

impl Extremes {
	/// Widens the extremes to include a face, or starts them off if there were none.
	#[must_use]
	pub fn include(extremes: Option<Self>, face: u32) -> Self {
		match extremes {
			Some(Self { min, max }) => Self {
				min: min.min(face),
				max: max.max(face),
			},
			None => Self { min: face, max: face },
		}
	}

	/// Gets the extreme a meta modifier refers to.
	#[must_use]
	pub const fn get(&self, kind: MetaKind) -> u32 {
		match kind {
			MetaKind::Min => self.min,
			MetaKind::Max => self.max,
		}
	}
}

/// Outcome of a single evaluation pass
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Evaluated {
	/// Expression as evaluated, with dice replaced by their totals and the meta modifier by its value in brackets,
	/// e.g. `(1 + 7) * 3 - [2]`
	pub trace: String,

	/// Final value
	pub value: i64,

	/// Lowest and highest faces rolled, if any dice were rolled at all
	pub extremes: Option<Extremes>,
}

impl fmt::Display for Evaluated {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} = {}", self.trace, self.value)
	}
}

/// Entry on the operator stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
	/// `(` sentinel; never reduced, only removed by the matching `)`
	Open,

	/// Operator waiting for its right operand to be complete
	Op(Operator),
}

/// Transient state of one pass. A fresh one is built for every pass, so nothing leaks between them.
#[derive(Debug, Default)]
struct EvalState {
	/// Operands and intermediate results
	values: Vec<i64>,

	/// Operators and sentinels
	ops: Vec<Pending>,

	/// Extremes of every face rolled so far
	extremes: Option<Extremes>,

	/// Evaluated rendition of the expression built up so far
	trace: String,
}

impl EvalState {
	/// Pushes a value onto the value stack and records it in the trace.
	fn push_value(&mut self, value: i64) {
		self.values.push(value);
		let _ = write!(self.trace, "{value}");
	}

	/// Rolls dice one at a time, folding each face into the running total and the extremes, then pushes the total.
	/// One-sided dice can only ever land on 1, so they skip the roller entirely.
	fn push_dice(&mut self, dice: &Dice, roller: &mut impl Roller) -> Result<(), EvalError> {
		if dice.sides == 0 {
			return Err(EvalError::InvalidDie(*dice));
		}
		if dice.count == 0 {
			self.push_value(0);
			return Ok(());
		}

		if dice.sides == 1 {
			self.extremes = Some(Extremes::include(self.extremes, 1));
			self.push_value(i64::from(dice.count));
			return Ok(());
		}

		let mut total = 0_i64;
		for _ in 0..dice.count {
			let face = roller.roll_die(dice.sides);
			self.extremes = Some(Extremes::include(self.extremes, face));
			total = total
				.checked_add(i64::from(face))
				.ok_or(EvalError::DiceOverflow(*dice))?;
		}

		tracing::trace!(%dice, total, "rolled dice");
		self.push_value(total);
		Ok(())
	}

	/// Reduces every pending operator that binds at least as tightly as `op` (they're all left-associative), then
	/// pushes `op`.
	fn push_operator(&mut self, op: Operator) -> Result<(), EvalError> {
		while let Some(&Pending::Op(top)) = self.ops.last() {
			if top.precedence() < op.precedence() {
				break;
			}
			self.ops.pop();
			self.reduce(top)?;
		}

		self.ops.push(Pending::Op(op));
		let _ = write!(self.trace, " {op} ");
		Ok(())
	}

	/// Pushes the `(` sentinel.
	fn open_group(&mut self) {
		self.ops.push(Pending::Open);
		self.trace.push('(');
	}

	/// Reduces operators until the innermost `(` sentinel has been removed.
	fn close_group(&mut self) -> Result<(), EvalError> {
		while let Some(Pending::Op(op)) = self.ops.pop() {
			self.reduce(op)?;
		}
		self.trace.push(')');
		Ok(())
	}

	/// Applies the meta modifier as a trailing operator followed by the extreme it refers to.
	fn push_meta(&mut self, meta: Meta) -> Result<(), EvalError> {
		self.push_operator(meta.op)?;
		let value = self.extremes.ok_or(EvalError::UndefinedMeta(meta))?.get(meta.kind);
		self.values.push(i64::from(value));
		let _ = write!(self.trace, "[{value}]");
		Ok(())
	}

	/// Pops the right then the left operand, applies the operator, and pushes the result.
	fn reduce(&mut self, op: Operator) -> Result<(), EvalError> {
		let rhs = self.pop_value();
		let lhs = self.pop_value();
		let result = apply(lhs, op, rhs)?;
		tracing::trace!(lhs, %op, rhs, result, "reduced");
		self.values.push(result);
		Ok(())
	}

	/// Pops a value that the structure of the expression guarantees is there.
	#[expect(
		clippy::expect_used,
		reason = "Chains always alternate operands and operators, so every reduction has two operands"
	)]
	fn pop_value(&mut self) -> i64 {
		self.values.pop().expect("value stack underflow")
	}

	/// Drains the operator stack and produces the result of the pass.
	fn finish(mut self) -> Result<Evaluated, EvalError> {
		while let Some(pending) = self.ops.pop() {
			debug_assert_ne!(pending, Pending::Open, "unbalanced group sentinel");
			if let Pending::Op(op) = pending {
				self.reduce(op)?;
			}
		}

		let value = self.pop_value();
		debug_assert!(self.values.is_empty(), "leftover values after evaluation");
		Ok(Evaluated {
			trace: self.trace,
			value,
			extremes: self.extremes,
		})
	}
}

/// Calculates `lhs op rhs` with overflow and division checks.
fn apply(lhs: i64, op: Operator, rhs: i64) -> Result<i64, EvalError> {
	let overflow = || EvalError::Overflow { lhs, op, rhs };
	match op {
		Operator::Add => lhs.checked_add(rhs).ok_or_else(overflow),
		Operator::Sub => lhs.checked_sub(rhs).ok_or_else(overflow),
		Operator::Mul => lhs.checked_mul(rhs).ok_or_else(overflow),
		Operator::Div if rhs == 0 => Err(EvalError::DivisionByZero { dividend: lhs }),
		Operator::Div => lhs.checked_div(rhs).ok_or_else(overflow),
	}
}

impl Expression {
	/// Evaluates a single pass of the expression, ignoring any repeat count. Dice are rolled using the given roller.
	///
	/// # Errors
	/// If a die has no sides, a division by zero or integer overflow occurs, or the meta modifier is reached without
	/// any dice having been rolled, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dicey::dice::roller::Iter as IterRoller;
	///
	/// let expr: dicey::Expression = "1d6 + 1d6 - min".parse()?;
	/// let evaled = expr.eval(&mut IterRoller::new([3, 5]))?;
	/// assert_eq!(evaled.value, 5);
	/// assert_eq!(evaled.trace, "3 + 5 - [3]");
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	pub fn eval(&self, roller: &mut impl Roller) -> Result<Evaluated, EvalError> {
		let mut state = EvalState::default();

		for item in self.chain.items() {
			match item {
				Item::Open => state.open_group(),
				Item::Close => state.close_group()?,
				Item::Term(Term::Num(value)) => state.push_value(*value),
				Item::Term(Term::Dice(dice)) => state.push_dice(dice, roller)?,
				Item::Op(op) => state.push_operator(op)?,
			}
		}

		if let Some(meta) = self.meta {
			state.push_meta(meta)?;
		}

		state.finish()
	}

	/// Creates an iterator that evaluates one fresh pass per item, [`Self::repeat_count()`] times in total.
	/// Iteration stops after the first failed pass, so anything yielded before the error is a complete result.
	///
	/// # Examples
	/// ```
	/// use dicey::dice::roller::Iter as IterRoller;
	///
	/// let expr: dicey::Expression = "1d4 + max {3}".parse()?;
	/// let mut roller = IterRoller::new([1, 4, 2]);
	/// let values = expr.passes(&mut roller).map(|pass| pass.map(|evaled| evaled.value)).collect::<Result<Vec<_>, _>>()?;
	/// assert_eq!(values, vec![2, 8, 4]);
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	pub const fn passes<R: Roller>(&self, roller: R) -> Passes<'_, R> {
		Passes {
			expr: self,
			roller,
			completed: 0,
			failed: false,
		}
	}

	/// Evaluates every pass of the expression ([`Self::repeat_count()`] of them), each with freshly rolled dice.
	///
	/// # Errors
	/// The first pass to fail aborts the rest, and its error is returned in place of all results. Use
	/// [`Self::passes()`] to keep the passes that completed before a failure.
	pub fn eval_all(&self, roller: &mut impl Roller) -> Result<Vec<Evaluated>, EvalError> {
		self.passes(roller).collect()
	}
}

/// Iterator over the passes of an expression, returned by [`Expression::passes()`]
#[derive(Debug, Clone)]
pub struct Passes<'e, R> {
	/// Expression being evaluated
	expr: &'e Expression,

	/// Source of die rolls shared by all passes
	roller: R,

	/// Number of passes run so far
	completed: u32,

	/// Whether a pass has failed
	failed: bool,
}

impl<R: Roller> Iterator for Passes<'_, R> {
	type Item = Result<Evaluated, EvalError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed || self.completed >= self.expr.repeat_count() {
			return None;
		}

		self.completed = self.completed.saturating_add(1);
		tracing::debug!(pass = self.completed, of = self.expr.repeat_count(), "evaluating pass");

		let result = self.expr.eval(&mut self.roller);
		if let Err(err) = &result {
			tracing::debug!(pass = self.completed, %err, "pass failed");
			self.failed = true;
		}
		Some(result)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		if self.failed {
			return (0, Some(0));
		}
		let remaining = usize::try_from(self.expr.repeat_count().saturating_sub(self.completed)).ok();
		(0, remaining)
	}
}

impl<R: Roller> core::iter::FusedIterator for Passes<'_, R> {}

/// Error that can occur during [`Expression::eval()`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
	/// Dice with fewer than one side were asked to roll
	#[error("{0} can't be rolled since dice need at least one side")]
	InvalidDie(Dice),

	/// Division by zero
	#[error("division by zero while calculating {dividend} / 0")]
	DivisionByZero {
		/// Left-hand side of the division
		dividend: i64,
	},

	/// Meta modifier reached before any die was rolled in the pass
	#[error("\"{0}\" refers to a die roll, but no dice were rolled")]
	UndefinedMeta(Meta),

	/// Integer overflow while applying an operator
	#[error("integer overflow while calculating {lhs} {op} {rhs}")]
	Overflow {
		/// Left-hand operand
		lhs: i64,

		/// Operator being applied
		op: Operator,

		/// Right-hand operand
		rhs: i64,
	},

	/// Integer overflow while totalling a set of dice
	#[error("integer overflow while totalling {0}")]
	DiceOverflow(Dice),
}

impl From<DiceError> for EvalError {
	fn from(err: DiceError) -> Self {
		match err {
			DiceError::NoSides(dice) => Self::InvalidDie(dice),
			DiceError::Overflow(dice) => Self::DiceOverflow(dice),
		}
	}
}
