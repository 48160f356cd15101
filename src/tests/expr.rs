use core::mem;

use crate::{
	dice::Dice,
	expr::{Chain, Expression, Item, Meta, MetaKind, Operator, Term},
};

#[test]
fn operator_precedence() {
	assert_eq!(Operator::Add.precedence(), 1);
	assert_eq!(Operator::Sub.precedence(), 1);
	assert_eq!(Operator::Mul.precedence(), 2);
	assert_eq!(Operator::Div.precedence(), 2);
	assert_eq!(Operator::Div.to_string(), "/");
}

#[test]
fn items_flatten_groups() {
	// 1 * (2d4 + (3))
	let chain = Chain::new(1_i64).then(
		Operator::Mul,
		Chain::new(Dice::new(2, 4)).then(Operator::Add, Chain::new(3_i64)),
	);
	let items = chain.items().collect::<Vec<_>>();
	assert_eq!(
		items,
		vec![
			Item::Term(&Term::Num(1)),
			Item::Op(Operator::Mul),
			Item::Open,
			Item::Term(&Term::Dice(Dice::new(2, 4))),
			Item::Op(Operator::Add),
			Item::Open,
			Item::Term(&Term::Num(3)),
			Item::Close,
			Item::Close,
		]
	);
}

#[test]
fn items_of_leading_group() {
	// (1 + 2) - 3
	let chain = Chain::new(Chain::new(1_i64).then(Operator::Add, 2_i64)).then(Operator::Sub, 3_i64);
	let items = chain.items().collect::<Vec<_>>();
	assert_eq!(
		items,
		vec![
			Item::Open,
			Item::Term(&Term::Num(1)),
			Item::Op(Operator::Add),
			Item::Term(&Term::Num(2)),
			Item::Close,
			Item::Op(Operator::Sub),
			Item::Term(&Term::Num(3)),
		]
	);
	assert_eq!(chain.to_string(), "(1 + 2) - 3");
}

#[test]
fn items_survive_deep_nesting() {
	let depth = 10_000;
	let mut chain = Chain::new(5_i64);
	for _ in 0..depth {
		chain = Chain::new(chain);
	}

	let items = chain.items().collect::<Vec<_>>();
	assert_eq!(items.len(), depth * 2 + 1);
	assert_eq!(items[depth], Item::Term(&Term::Num(5)));
	assert!(items[..depth].iter().all(|item| *item == Item::Open));
	assert!(items[depth + 1..].iter().all(|item| *item == Item::Close));
}

#[test]
fn deep_chains_drop_without_recursing() {
	let depth: i64 = 200_000;
	let mut chain = Chain::new(1_i64);
	for n in 0..depth {
		chain = Chain::new(chain).then(Operator::Add, Chain::new(n).then(Operator::Mul, 2_i64));
	}
	drop(chain);

	let mut expr = Expression::new(Chain::new(Dice::new(1, 6)));
	for _ in 0..depth {
		expr.chain = Chain::new(Chain::new(1_i64).then(Operator::Sub, mem::replace(&mut expr.chain, Chain::new(0_i64))));
	}
	assert!(!expr.is_deterministic());
	drop(expr);
}

#[test]
fn deterministic_expressions() {
	let constant = Expression::new(Chain::new(4_i64).then(Operator::Mul, 2_i64));
	assert!(constant.is_deterministic());

	let one_sided = Expression::new(Chain::new(Dice::new(6, 1)).then(Operator::Add, Dice::new(0, 20)));
	assert!(one_sided.is_deterministic());

	let random = Expression::new(Chain::new(2_i64).then(Operator::Add, Chain::new(Dice::new(1, 6))));
	assert!(!random.is_deterministic());
}

#[test]
fn dice_in_source_order() {
	let expr = Expression::new(
		Chain::new(Dice::new(1, 4))
			.then(Operator::Add, Chain::new(2_i64).then(Operator::Mul, Dice::new(3, 6)))
			.then(Operator::Sub, Dice::new(1, 8)),
	);
	let dice = expr.dice().copied().collect::<Vec<_>>();
	assert_eq!(dice, vec![Dice::new(1, 4), Dice::new(3, 6), Dice::new(1, 8)]);
}

#[test]
fn expression_display() {
	let expr = Expression::new(Chain::new(Dice::new(2, 20)).then(Operator::Add, 5_i64))
		.with_meta(Meta {
			op: Operator::Sub,
			kind: MetaKind::Max,
		})
		.repeated(3);
	assert_eq!(expr.to_string(), "2d20 + 5 - max {3}");
	assert_eq!(expr.repeated(0).to_string(), "2d20 + 5 - max");
}

#[test]
fn expressions_are_shareable() {
	fn assert_send_sync<T: Send + Sync>() {}
	assert_send_sync::<Expression>();
}
