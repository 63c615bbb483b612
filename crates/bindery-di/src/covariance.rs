//! Mutability-covariance merging
//!
//! Requirements and provisions are summarized per [`BaseKey`]: each base key
//! carries the join of every mutability seen for it. Joining takes the
//! stricter qualifier, so folding a set of contributions gives the same map
//! whatever order they arrive in.
//!
//! ```
//! use bindery_di::{Mutability, MutabilityMap, TypeKey};
//!
//! struct Db;
//!
//! let mut left = MutabilityMap::new();
//! left.insert(TypeKey::read_only::<Db>());
//! let mut right = MutabilityMap::new();
//! right.insert(TypeKey::of::<Db>());
//!
//! left.merge(&right);
//! assert_eq!(left.get(&TypeKey::of::<Db>().base()), Some(Mutability::Mutable));
//! ```

use crate::key::{BaseKey, Mutability, TypeKey};
use crate::DiError;
use indexmap::IndexMap;

/// Joined mutability per base key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutabilityMap {
	entries: IndexMap<BaseKey, Mutability>,
}

impl MutabilityMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `key`, joining with any mutability already recorded for its base.
	pub fn insert(&mut self, key: TypeKey) {
		self.entries
			.entry(key.base())
			.and_modify(|current| *current = current.join(key.mutability()))
			.or_insert(key.mutability());
	}

	pub fn merge(&mut self, other: &MutabilityMap) {
		for (base, mutability) in &other.entries {
			self.insert(base.with_mutability(*mutability));
		}
	}

	pub fn get(&self, base: &BaseKey) -> Option<Mutability> {
		self.entries.get(base).copied()
	}

	pub fn contains(&self, base: &BaseKey) -> bool {
		self.entries.contains_key(base)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Every entry as a key, sorted by base key.
	pub fn keys(&self) -> Vec<TypeKey> {
		let mut keys: Vec<_> = self
			.entries
			.iter()
			.map(|(base, mutability)| base.with_mutability(*mutability))
			.collect();
		keys.sort();
		keys
	}
}

impl FromIterator<TypeKey> for MutabilityMap {
	fn from_iter<I: IntoIterator<Item = TypeKey>>(iter: I) -> Self {
		let mut map = MutabilityMap::new();
		for key in iter {
			map.insert(key);
		}
		map
	}
}

impl<'a> FromIterator<&'a TypeKey> for MutabilityMap {
	fn from_iter<I: IntoIterator<Item = &'a TypeKey>>(iter: I) -> Self {
		iter.into_iter().copied().collect()
	}
}

/// One unsatisfied requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
	MutableRequiredButReadOnlyProvided(TypeKey),
	ReadOnlyDeclaredButMutableRequired(TypeKey),
	NoBindingFound(TypeKey),
}

impl Violation {
	pub fn key(&self) -> TypeKey {
		match self {
			Violation::MutableRequiredButReadOnlyProvided(key)
			| Violation::ReadOnlyDeclaredButMutableRequired(key)
			| Violation::NoBindingFound(key) => *key,
		}
	}

	/// True for the two mutability violations, which outrank missing bindings.
	pub fn is_mutability(&self) -> bool {
		!matches!(self, Violation::NoBindingFound(_))
	}
}

impl From<Violation> for DiError {
	fn from(violation: Violation) -> Self {
		match violation {
			Violation::MutableRequiredButReadOnlyProvided(key) => {
				DiError::MutableRequiredButReadOnlyProvided(key)
			}
			Violation::ReadOnlyDeclaredButMutableRequired(key) => {
				DiError::ReadOnlyDeclaredButMutableRequired(key)
			}
			Violation::NoBindingFound(key) => DiError::NoBindingFound(key),
		}
	}
}

/// Discharges `required` against what a component provides internally.
///
/// Anything not provided internally has to be covered by `declared`, the
/// component's own declared requirements. `declared` is `None` for the root,
/// which has nobody to pass requirements on to. Violations come back sorted
/// by key.
pub fn check_requirements(
	provided: &MutabilityMap,
	required: &MutabilityMap,
	declared: Option<&MutabilityMap>,
) -> Vec<Violation> {
	let mut violations = Vec::new();
	for key in required.keys() {
		let base = key.base();
		let needed = key.mutability();

		if let Some(available) = provided.get(&base) {
			if !available.satisfies(needed) {
				violations.push(Violation::MutableRequiredButReadOnlyProvided(key));
			}
			continue;
		}

		match declared.and_then(|declared| declared.get(&base)) {
			Some(promised) if !promised.satisfies(needed) => {
				violations.push(Violation::ReadOnlyDeclaredButMutableRequired(key));
			}
			Some(_) => {}
			None => violations.push(Violation::NoBindingFound(key)),
		}
	}
	violations
}
