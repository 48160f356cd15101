//! All functionality for directly creating dice, rolling them, and working with their resulting rolls.
//!
//! This is the home of the dice "primitives". For using them as part of a larger expression, see [`Term::Dice`].
//!
//! [`Term::Dice`]: crate::expr::Term::Dice

pub mod roller;

use alloc::{string::ToString, vec::Vec};
use core::fmt;

pub use self::roller::Roller;

/// A set of one or more rollable dice with a specific number of sides.
///
/// Dice with zero sides can be represented, but any attempt to roll them will fail with [`Error::NoSides`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::exhaustive_structs)]
pub struct Dice {
	/// Number of dice to roll
	pub count: u32,

	/// Number of sides for each die
	pub sides: u32,
}

impl Dice {
	/// Creates a new set of dice with a given count and number of sides.
	#[must_use]
	pub const fn new(count: u32, sides: u32) -> Self {
		Self { count, sides }
	}

	/// Lowest total that rolling the dice could produce.
	#[must_use]
	pub fn min_total(&self) -> i64 {
		i64::from(self.count)
	}

	/// Highest total that rolling the dice could produce (`None` if it would overflow an `i64`).
	#[must_use]
	pub fn max_total(&self) -> Option<i64> {
		i64::from(self.count).checked_mul(i64::from(self.sides))
	}

	/// Checks whether rolling the dice will always give the same total.
	#[must_use]
	#[inline]
	pub const fn is_deterministic(&self) -> bool {
		self.count == 0 || self.sides == 1
	}
}

impl Default for Dice {
	/// Creates the default dice (1d20).
	#[inline]
	fn default() -> Self {
		Self::new(1, 20)
	}
}

impl fmt::Display for Dice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}d{}", self.count, self.sides)
	}
}

/// Representation of the result from rolling [`Dice`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)]
pub struct Rolled {
	/// Value of each individual die face that was rolled, in rolling order
	pub rolls: Vec<u32>,

	/// Dice that were rolled to produce this
	pub dice: Dice,
}

impl Rolled {
	/// Calculates the total of all roll values.
	///
	/// # Errors
	/// If the sum doesn't fit in an `i64`, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use dicey::dice::{roller::{Iter as IterRoller, Roller}, Dice};
	///
	/// let rolled = IterRoller::new([2, 6, 3]).roll(&Dice::new(3, 6))?;
	/// assert_eq!(rolled.total()?, 11);
	/// # Ok::<(), dicey::dice::Error>(())
	/// ```
	pub fn total(&self) -> Result<i64, Error> {
		let mut sum: i64 = 0;
		for roll in &self.rolls {
			sum = sum
				.checked_add(i64::from(*roll))
				.ok_or(Error::Overflow(self.dice))?;
		}
		Ok(sum)
	}

	/// Lowest single face in the set, if anything was rolled at all.
	#[must_use]
	pub fn lowest(&self) -> Option<u32> {
		self.rolls.iter().copied().min()
	}

	/// Highest single face in the set, if anything was rolled at all.
	#[must_use]
	pub fn highest(&self) -> Option<u32> {
		self.rolls.iter().copied().max()
	}

	/// Creates a new rolled set of dice from a given set of dice and an iterator of values.
	#[must_use]
	pub fn from_dice_and_rolls(dice: Dice, rolls: impl IntoIterator<Item = u32>) -> Self {
		Self {
			rolls: rolls.into_iter().collect(),
			dice,
		}
	}
}

impl fmt::Display for Rolled {
	/// Formats the dice followed by a list of every face rolled, e.g. `3d6[2, 6, 3]`.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}[{}]",
			self.dice,
			self.rolls.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
		)
	}
}

/// An error resulting from a dice operation
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// The dice have no sides, so there's nothing to roll.
	///
	/// # Examples
	/// ```
	/// use dicey::dice::{roller::{Max as MaxRoller, Roller}, Dice, Error};
	///
	/// let dice = Dice::new(2, 0);
	/// assert!(matches!(MaxRoller.roll(&dice), Err(Error::NoSides(..))));
	/// ```
	#[error("{0} can't be rolled since dice need at least one side")]
	NoSides(Dice),

	/// There was an integer overflow when totalling the roll values.
	#[error("integer overflow while totalling {0}")]
	Overflow(Dice),
}
