#![doc = pretty_readme::docify!("README.md", "https://docs.rs/dicey/latest/dicey/", "./")]
#![cfg_attr(not(any(doc, test)), no_std)]
#![expect(
	clippy::tabs_in_doc_comments,
	reason = "Consistency with source, user-configurability & accessibility"
)]
#![deny(macro_use_extern_crate, meta_variable_misuse, unit_bindings)]
#![warn(
	explicit_outlives_requirements,
	missing_docs,
	missing_debug_implementations,
	unreachable_pub,
	unused_crate_dependencies,
	unused_qualifications,
	clippy::pedantic,
	clippy::absolute_paths,
	clippy::alloc_instead_of_core,
	clippy::allow_attributes_without_reason,
	clippy::clone_on_ref_ptr,
	clippy::cognitive_complexity,
	clippy::dbg_macro,
	clippy::empty_enum_variants_with_brackets,
	clippy::empty_structs_with_brackets,
	clippy::exhaustive_enums,
	clippy::exhaustive_structs,
	clippy::exit,
	clippy::expect_used,
	clippy::get_unwrap,
	clippy::if_then_some_else_none,
	clippy::infinite_loop,
	clippy::map_err_ignore,
	clippy::missing_const_for_fn,
	clippy::missing_docs_in_private_items,
	clippy::multiple_inherent_impl,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::print_stderr,
	clippy::print_stdout,
	clippy::redundant_type_annotations,
	clippy::ref_patterns,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::same_name_method,
	clippy::self_named_module_files,
	clippy::semicolon_inside_block,
	clippy::std_instead_of_alloc,
	clippy::std_instead_of_core,
	clippy::str_to_string,
	clippy::tests_outside_test_module,
	clippy::try_err,
	clippy::unneeded_field_pattern,
	clippy::unused_result_ok,
	clippy::unwrap_in_result,
	clippy::unwrap_used,
	clippy::verbose_file_reads
)]

extern crate alloc;
extern crate core;

#[cfg(all(feature = "parse", feature = "fastrand", feature = "std"))]
use alloc::vec::Vec;

pub mod dice;
pub mod eval;
pub mod expr;
#[cfg(feature = "parse")]
pub mod parse;

pub use dice::Dice;
pub use eval::{EvalError, Evaluated};
pub use expr::Expression;
#[cfg(feature = "parse")]
pub use parse::expr as parser;

#[cfg(test)]
mod tests;

#[cfg(feature = "build-binary")]
use ariadne as _;
#[cfg(feature = "build-binary")]
use tracing_subscriber as _;

/// Parses a dice expression without evaluating it. No dice are rolled.
///
/// # Errors
/// If the text isn't a valid expression, an error listing every problem found is returned.
///
/// # Examples
/// ```
/// let expr = dicey::parse("2d6 + 3 {4}")?;
/// assert_eq!(expr.repeat_count(), 4);
/// assert!(dicey::parse("2d6 +").is_err());
/// # Ok::<(), dicey::parse::Error>(())
/// ```
#[cfg(feature = "parse")]
pub fn parse(text: &str) -> Result<Expression, parse::Error> {
	text.parse()
}

/// Parses a dice expression and evaluates every pass of it with a fresh [fastrand]-backed roller.
///
/// # Errors
/// If parsing fails or any pass fails to evaluate, the corresponding error variant is returned and no results are.
///
/// # Examples
/// ```
/// let results = dicey::roll("3d6 + 1 {2}")?;
/// assert_eq!(results.len(), 2);
/// assert!(results.iter().all(|pass| (4..=19).contains(&pass.value)));
/// # Ok::<(), dicey::Error>(())
/// ```
#[cfg(all(feature = "parse", feature = "fastrand", feature = "std"))]
pub fn roll(text: &str) -> Result<Vec<Evaluated>, Error> {
	let expr = parse(text)?;
	Ok(expr.eval_all(&mut dice::roller::FastRand::default())?)
}

/// Error from parsing and evaluating in one go
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
	/// Input wasn't a valid expression
	#[cfg(feature = "parse")]
	#[error(transparent)]
	Parse(#[from] parse::Error),

	/// A pass failed to evaluate
	#[error(transparent)]
	Eval(#[from] EvalError),
}
