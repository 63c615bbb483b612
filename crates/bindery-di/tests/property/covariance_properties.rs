//! Property-based tests for mutability covariance
//!
//! Uses proptest to verify:
//! 1. Requirement merging is order-independent for any number of sides
//! 2. Build verdicts do not depend on the order siblings are installed in
//! 3. Declared read-only promises hold across three or more nesting levels

use bindery_di::{
	BindingGraph, Component, DiError, Mutability, MutabilityMap, TypeKey, check_requirements,
};
use proptest::prelude::*;
use std::sync::Arc;

struct Alpha;
struct Beta;
struct Gamma;

fn key_for(index: u8, mutable: bool) -> TypeKey {
	let key = match index % 3 {
		0 => TypeKey::of::<Alpha>(),
		1 => TypeKey::of::<Beta>(),
		_ => TypeKey::of::<Gamma>(),
	};
	if mutable { key } else { key.as_read_only() }
}

fn mutability(mutable: bool) -> Mutability {
	if mutable {
		Mutability::Mutable
	} else {
		Mutability::ReadOnly
	}
}

fn requirement_list() -> impl Strategy<Value = Vec<(u8, bool)>> {
	prop::collection::vec((0u8..3, any::<bool>()), 0..8)
}

// Property 1: merging any number of requirement maps in any order yields
// the same map
proptest! {
	#[test]
	fn prop_merge_is_order_independent(
		sides in prop::collection::vec(requirement_list(), 3..6),
		seed in any::<u64>(),
	) {
		let maps: Vec<MutabilityMap> = sides
			.iter()
			.map(|side| side.iter().map(|&(i, m)| key_for(i, m)).collect())
			.collect();

		let mut forward = MutabilityMap::new();
		for map in &maps {
			forward.merge(map);
		}

		let mut shuffled = maps.clone();
		let len = shuffled.len();
		shuffled.rotate_left((seed as usize) % len);
		shuffled.reverse();
		let mut backward = MutabilityMap::new();
		for map in &shuffled {
			backward.merge(map);
		}

		// Grouping: merge pairs first, then fold
		let mut grouped = MutabilityMap::new();
		for pair in maps.chunks(2) {
			let mut partial = MutabilityMap::new();
			for map in pair {
				partial.merge(map);
			}
			grouped.merge(&partial);
		}

		prop_assert_eq!(forward.keys(), backward.keys());
		prop_assert_eq!(forward.keys(), grouped.keys());
	}

	#[test]
	fn prop_joined_requirement_is_the_strictest(sides in prop::collection::vec(any::<bool>(), 1..10)) {
		let merged: MutabilityMap = sides.iter().map(|&m| key_for(0, m)).collect();
		let expected = mutability(sides.iter().any(|&m| m));
		prop_assert_eq!(merged.get(&TypeKey::of::<Alpha>().base()), Some(expected));
	}

	#[test]
	fn prop_check_verdict_matches_covariance(
		provided in any::<bool>(),
		required in prop::collection::vec(any::<bool>(), 1..6),
	) {
		let provisions: MutabilityMap = [key_for(0, provided)].into_iter().collect();
		let requirements: MutabilityMap = required.iter().map(|&m| key_for(0, m)).collect();

		let violations = check_requirements(&provisions, &requirements, None);

		let needs_mutable = required.iter().any(|&m| m);
		prop_assert_eq!(violations.is_empty(), provided || !needs_mutable);
	}
}

// Component fixtures driven by installation arguments

/// A leaf requiring Alpha. The index keeps siblings distinct installations.
fn requiring_leaf(args: (usize, bool)) -> Component {
	let (_, mutable) = args;
	Component::builder()
		.requires(key_for(0, mutable))
		.build()
}

/// Declares Alpha as required with `declared` and installs one leaf per
/// entry of `children`, in order.
fn promising_parent(args: (bool, Vec<bool>)) -> Component {
	let (declared, children) = args;
	let mut builder = Component::builder().requires(key_for(0, declared));
	for (index, mutable) in children.into_iter().enumerate() {
		builder = builder.install_with(requiring_leaf, (index, mutable));
	}
	builder.build()
}

fn siblings_root(args: (bool, Vec<bool>)) -> Component {
	Component::builder()
		.bind_instance(TypeKey::of::<Alpha>(), Arc::new(Alpha))
		.install_with(promising_parent, args)
		.build()
}

/// One nesting level per entry: each declares Alpha with its own
/// mutability and installs the next level.
fn chain_level(chain: Vec<bool>) -> Component {
	let mut builder = Component::builder();
	if let Some((&declared, rest)) = chain.split_first() {
		builder = builder.requires(key_for(0, declared));
		if !rest.is_empty() {
			builder = builder.install_with(chain_level, rest.to_vec());
		}
	}
	builder.build()
}

fn chain_root(chain: Vec<bool>) -> Component {
	Component::builder()
		.bind_instance(TypeKey::of::<Alpha>(), Arc::new(Alpha))
		.install_with(chain_level, chain)
		.build()
}

fn verdict(result: Result<BindingGraph, DiError>) -> Result<(), String> {
	result.map(|_| ()).map_err(|error| error.to_string())
}

proptest! {
	// Property 2: permuting siblings never changes the verdict
	#[test]
	fn prop_sibling_order_does_not_change_verdict(
		declared in any::<bool>(),
		children in prop::collection::vec(any::<bool>(), 3..7),
	) {
		let mut reversed = children.clone();
		reversed.reverse();

		let forward = verdict(BindingGraph::build_with(siblings_root, (declared, children.clone())));
		let backward = verdict(BindingGraph::build_with(siblings_root, (declared, reversed)));

		let expected_ok = declared || children.iter().all(|&m| !m);
		prop_assert_eq!(forward.is_ok(), expected_ok);
		prop_assert_eq!(&forward, &backward);
		if !expected_ok {
			prop_assert!(forward.unwrap_err().contains("declared as a read-only requirement"));
		}
	}

	// Property 3: across nesting levels, the outermost level that promises
	// read-only while the level below needs mutable is the one reported
	#[test]
	fn prop_nested_promises_fail_at_outermost_contradiction(
		chain in prop::collection::vec(any::<bool>(), 3..7),
	) {
		let result = BindingGraph::build_with(chain_root, chain.clone());

		let contradiction = chain.windows(2).position(|pair| !pair[0] && pair[1]);
		match contradiction {
			None => prop_assert!(result.is_ok()),
			Some(_) => prop_assert!(matches!(
				result,
				Err(DiError::ReadOnlyDeclaredButMutableRequired(key)) if key == TypeKey::of::<Alpha>()
			)),
		}
	}
}
