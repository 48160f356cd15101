use chumsky::Parser;

use crate::{
	dice::{roller::Max as MaxRoller, Dice},
	expr::{Chain, Expression, Meta, MetaKind, Operand, Operator, Term},
	parse::MAX_NESTING,
	parser,
};

#[test]
fn single_number() {
	let expr = parser().parse("42").into_result().unwrap();
	assert_eq!(expr, Expression::new(Chain::new(42_i64)));
	assert_eq!(expr.repeat_count(), 1);
}

#[test]
fn single_dice() {
	let expr: Expression = "3d6".parse().unwrap();
	assert_eq!(expr, Expression::new(Chain::new(Dice::new(3, 6))));
}

#[test]
fn chain_in_source_order() {
	let expr: Expression = "1 + 2 * 3d4 - 5 / 6".parse().unwrap();
	let expected = Chain::new(1_i64)
		.then(Operator::Add, 2_i64)
		.then(Operator::Mul, Dice::new(3, 4))
		.then(Operator::Sub, 5_i64)
		.then(Operator::Div, 6_i64);
	assert_eq!(expr.chain, expected);
	assert_eq!(expr.meta, None);
	assert_eq!(expr.repeat, None);
}

#[test]
fn whitespace_is_ignored() {
	let spaced: Expression = "  ( 1 +2d6 )*  3 -  min   { 2 } ".parse().unwrap();
	let tight: Expression = "(1+2d6)*3-min{2}".parse().unwrap();
	assert_eq!(spaced, tight);
	assert_eq!(tight.to_string(), "(1 + 2d6) * 3 - min {2}");
}

#[test]
fn uppercase_is_fine() {
	let expr: Expression = "2D6 + MAX".parse().unwrap();
	assert_eq!(expr.to_string(), "2d6 + max");
}

#[test]
fn nested_groups() {
	let expr: Expression = "((((1))))".parse().unwrap();
	let expected = Chain::new(Chain::new(Chain::new(Chain::new(Chain::new(1_i64)))));
	assert_eq!(expr.chain, expected);
}

#[test]
fn group_after_operator() {
	let expr: Expression = "2 * (3 + (4d6 - 1))".parse().unwrap();
	let inner = Chain::new(Dice::new(4, 6)).then(Operator::Sub, 1_i64);
	let middle = Chain::new(3_i64).then(Operator::Add, inner);
	assert_eq!(expr.chain, Chain::new(2_i64).then(Operator::Mul, middle));
}

#[test]
fn deeply_nested_groups() {
	let text = format!("{}7{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
	let expr: Expression = text.parse().unwrap();

	let mut operand = &expr.chain.head;
	let mut levels = 0;
	while let Operand::Group(chain) = operand {
		levels += 1;
		operand = &chain.head;
	}
	assert_eq!(levels, MAX_NESTING);
	assert_eq!(operand, &Operand::Term(Term::Num(7)));
	assert_eq!(expr.to_string(), text);

	let evaled = expr.eval(&mut MaxRoller).unwrap();
	assert_eq!(evaled.value, 7);
	assert_eq!(evaled.trace, text);
	drop(expr);
}

#[test]
fn nesting_limit() {
	let depth = MAX_NESTING + 1;
	let text = format!("1 + {}7{}", "(".repeat(depth), ")".repeat(depth));
	let err = text.parse::<Expression>().unwrap_err();
	let offset = 4 + MAX_NESTING;
	assert!(err.problems.iter().any(|problem| problem.span == (offset..offset + 1)), "{err}");

	// Siblings don't add up, only depth does
	let sibling = format!("{}7{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
	let text = format!("{sibling} + {sibling}");
	assert!(text.parse::<Expression>().is_ok());

	let text = format!("{}1d4{}", "(".repeat(depth * 40), ")".repeat(depth * 40));
	assert!(text.parse::<Expression>().is_err());
}

#[test]
fn whitespace_inside_dice() {
	for text in ["2 d6", "2d 6", "2 d 6", "2\td\t6", "2 D 6"] {
		let dice: Dice = text.parse().unwrap();
		assert_eq!(dice, Dice::new(2, 6), "{text:?}");
	}

	let expr: Expression = "1 + 2 d 6 * 3 - max".parse().unwrap();
	assert_eq!(expr.to_string(), "1 + 2d6 * 3 - max");
}

#[test]
fn leading_zeros() {
	let expr: Expression = "05 + 1".parse().unwrap();
	assert_eq!(expr.chain, Chain::new(5_i64).then(Operator::Add, 1_i64));

	let expr: Expression = "1 {02}".parse().unwrap();
	assert_eq!(expr.repeat_count(), 2);

	assert_eq!("01d06".parse::<Dice>().unwrap(), Dice::new(1, 6));
	assert_eq!("007".parse::<Term>().unwrap(), Term::Num(7));
	assert_eq!("0000".parse::<Term>().unwrap(), Term::Num(0));
	assert!("1 {00}".parse::<Expression>().is_err());
}

#[test]
fn meta_modifiers() {
	for (text, op, kind) in [
		("4d6 - min", Operator::Sub, MetaKind::Min),
		("4d6 + min", Operator::Add, MetaKind::Min),
		("4d6 - max", Operator::Sub, MetaKind::Max),
		("4d6+max", Operator::Add, MetaKind::Max),
	] {
		let expr: Expression = text.parse().unwrap();
		assert_eq!(expr.meta, Some(Meta { op, kind }), "{text}");
	}
}

#[test]
fn meta_without_dice_still_parses() {
	let expr: Expression = "1 + min".parse().unwrap();
	assert_eq!(expr.chain, Chain::new(1_i64));
	assert_eq!(
		expr.meta,
		Some(Meta {
			op: Operator::Add,
			kind: MetaKind::Min
		})
	);
}

#[test]
fn repeat_count() {
	let expr: Expression = "1d20 {3}".parse().unwrap();
	assert_eq!(expr.repeat_count(), 3);

	let expr: Expression = "1d20 + 2 - max {12}".parse().unwrap();
	assert_eq!(expr.repeat_count(), 12);
	assert!(expr.meta.is_some());
}

#[test]
fn zero_sided_dice_parse() {
	let expr: Expression = "2d0".parse().unwrap();
	assert_eq!(expr.chain, Chain::new(Dice::new(2, 0)));
}

#[test]
fn standalone_dice_and_terms() {
	assert_eq!("8d12".parse::<Dice>().unwrap(), Dice::new(8, 12));
	assert!("d12".parse::<Dice>().is_err());
	assert!("8d12 + 1".parse::<Dice>().is_err());
	assert_eq!(" 17 ".parse::<Term>().unwrap(), Term::Num(17));
	assert_eq!("1d4".parse::<Term>().unwrap(), Term::Dice(Dice::new(1, 4)));
}

#[test]
fn display_round_trips() {
	for text in [
		"1",
		"2d6 + 3",
		"(1 + (2d4 + (1 + (3d6 + (12d8))))) + (2d4 + 1d6) + (1d8) - 2d4 - min {2}",
		"10 / 2 * (3 - 1) + max",
		"0d6 {1}",
	] {
		let expr: Expression = text.parse().unwrap();
		assert_eq!(expr.to_string(), text);
		assert_eq!(expr.to_string().parse::<Expression>().unwrap(), expr);
	}
}

#[test]
fn rejects_malformed_input() {
	for text in [
		"",
		"   ",
		"(1 + 2",
		"1 + 2)",
		"((1)",
		"()",
		"1 +",
		"+ 1",
		"* 2",
		"1 + + 2",
		"1 2",
		"1 * min",
		"1 / max",
		"1 - mid",
		"1 - minimum",
		"1 - min - max",
		"min",
		"1 {0}",
		"1 {-1}",
		"1 {}",
		"1 {2} {3}",
		"{2}",
		"1.5 + 2",
		"1 % 2",
		"1 ^ 2",
		"2d",
		"d6",
		"2 d",
		"2dd6",
		"2d6.5",
		"-3",
		"x",
		"99999999999999999999",
		"99999999999d6",
	] {
		let result = text.parse::<Expression>();
		assert!(result.is_err(), "{text:?} should be rejected but parsed as {result:?}");
	}
}

#[test]
fn errors_point_at_the_problem() {
	let err = "1 + 2 +".parse::<Expression>().unwrap_err();
	assert!(!err.problems.is_empty());
	assert!(err.problems.iter().all(|problem| problem.span.start <= 7 && problem.span.end <= 7));
	assert!(err.to_string().starts_with("syntax error: "));
}

#[test]
fn error_spans_match_the_original_input() {
	// U+0130 is two bytes, but lowercases to three
	let text = "1 + \u{130}";
	let err = text.parse::<Expression>().unwrap_err();
	for problem in &err.problems {
		assert!(text.get(problem.span.clone()).is_some(), "{problem} splits a character of {text:?}");
	}
	assert!(err.problems.iter().any(|problem| problem.span.start == 4), "{err}");

	let text = "\u{130}\u{130} + (1 + 2";
	let err = text.parse::<Expression>().unwrap_err();
	assert!(err.problems.iter().all(|problem| problem.span.end <= text.len()), "{err}");
}
