//! Abstractions for rolling [`Dice`] using various means.

use alloc::vec::Vec;
use core::iter::Peekable;

#[cfg(feature = "fastrand")]
use fastrand::Rng;

use super::{Dice, Error, Rolled};

/// Source of die faces - the only place randomness enters an evaluation.
pub trait Roller {
	/// Generates an integer in the inclusive range `low..=high`. Implementations backed by an RNG should produce a
	/// uniform distribution with every call independent of the last.
	#[must_use]
	fn next_in_range(&mut self, low: u32, high: u32) -> u32;

	/// Rolls a single die with the given number of sides.
	#[must_use]
	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		self.next_in_range(1, sides)
	}

	/// Rolls a set of dice, keeping every individual face.
	///
	/// # Errors
	/// If the dice have no sides, [`Error::NoSides`] is returned without consuming any rolls.
	fn roll(&mut self, dice: &Dice) -> Result<Rolled, Error>
	where
		Self: Sized,
	{
		if dice.sides == 0 {
			return Err(Error::NoSides(*dice));
		}

		// Roll the dice!
		let rolls = (0..dice.count).map(|_| self.roll_die(dice.sides)).collect::<Vec<_>>();
		tracing::trace!(%dice, ?rolls, "rolled dice");

		Ok(Rolled { rolls, dice: *dice })
	}
}

impl<R: Roller + ?Sized> Roller for &mut R {
	#[inline]
	fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
		(**self).next_in_range(low, high)
	}

	#[inline]
	fn roll_die(&mut self, sides: u32) -> u32 {
		(**self).roll_die(sides)
	}
}

/// Generates rolls with random values using [fastrand]. Requires the `fastrand` feature (enabled by default).
///
/// # Examples
///
/// ## Default fastrand roller
/// ```
/// use dicey::dice::{roller::{FastRand as FastRandRoller, Roller}, Dice};
///
/// let mut roller = FastRandRoller::default();
///
/// let dice = Dice::new(4, 6);
/// let _ = roller.roll(&dice)?;
/// let _ = roller.roll(&dice)?;
/// # Ok::<(), dicey::dice::Error>(())
/// ```
///
/// ## Manually seeded fastrand roller
/// ```
/// use dicey::dice::{roller::{FastRand as FastRandRoller, Roller}, Dice};
///
/// let dice = Dice::new(4, 6);
/// let first = FastRandRoller::with_seed(0x750c38d574400).roll(&dice)?;
/// let second = FastRandRoller::with_seed(0x750c38d574400).roll(&dice)?;
/// assert_eq!(first, second);
/// # Ok::<(), dicey::dice::Error>(())
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "std", derive(Default))]
pub struct FastRand(Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	/// Generates a value using the [`fastrand::Rng`] the roller was created with.
	///
	/// # Panics
	/// Panics if `low > high`. [`Roller::roll()`] never asks for such a range.
	#[inline]
	fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
		self.0.u32(low..=high)
	}
}

/// Generates rolls that always have a specific value, regardless of the range asked for.
///
/// # Examples
/// ```
/// use dicey::dice::{roller::{Roller, Val as ValRoller}, Dice};
///
/// let mut roller = ValRoller(42);
///
/// let rolled = roller.roll(&Dice::new(4, 6))?;
/// assert!(rolled.rolls.iter().all(|roll| *roll == 42));
/// # Ok::<(), dicey::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Val(pub u32);

impl Roller for Val {
	#[inline]
	fn next_in_range(&mut self, _low: u32, _high: u32) -> u32 {
		self.0
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use dicey::dice::{roller::{Max as MaxRoller, Roller}, Dice};
///
/// let rolled = MaxRoller.roll(&Dice::new(4, 6))?;
/// assert!(rolled.rolls.iter().all(|roll| *roll == 6));
/// # Ok::<(), dicey::dice::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	#[inline]
	fn next_in_range(&mut self, _low: u32, high: u32) -> u32 {
		high
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// # Examples
/// ```
/// use dicey::dice::{roller::{Iter as IterRoller, Roller}, Dice};
///
/// let mut roller = IterRoller::new(vec![1, 2, 3, 4, 10]);
/// assert_eq!(roller.roll(&Dice::new(5, 6))?.rolls, vec![1, 2, 3, 4, 10]);
/// assert!(!roller.can_roll());
/// # Ok::<(), dicey::dice::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = u32>>(Peekable<I>);

impl<I: Iterator<Item = u32>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = u32>> Roller for Iter<I> {
	/// Provides the value from the next iteration, ignoring the range.
	///
	/// # Panics
	/// If the iterator has finished, this will panic.
	#[inline]
	#[expect(
		clippy::expect_used,
		reason = "Mostly for testing, otherwise manual checking of can_roll() is expected"
	)]
	fn next_in_range(&mut self, _low: u32, _high: u32) -> u32 {
		self.0.next().expect("iterator is finished")
	}
}
