//! Binding registry
//!
//! Folds the bindings of every expanded component into one table per build.
//! Single bindings are keyed by base key; a second contribution that is not
//! the same binding is a duplicate. Multibinding contributions are appended
//! in the order they are folded and never deduplicated.

use crate::binding::Binding;
use crate::key::{BaseKey, TypeKey};
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub(crate) struct BindingRegistry {
	bindings: IndexMap<BaseKey, Binding>,
	multibindings: IndexMap<BaseKey, Vec<Binding>>,
	duplicates: Vec<TypeKey>,
}

impl BindingRegistry {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn add_binding(&mut self, binding: Binding) {
		match self.bindings.get(&binding.base()) {
			Some(existing) if existing.is_same_as(&binding) => {}
			Some(existing) => {
				tracing::debug!(
					key = %binding.key(),
					existing = %existing.origin(),
					new = %binding.origin(),
					"conflicting binding"
				);
				self.duplicates.push(existing.key());
			}
			None => {
				self.bindings.insert(binding.base(), binding);
			}
		}
	}

	pub(crate) fn add_multibinding(&mut self, binding: Binding) {
		self.multibindings
			.entry(binding.base())
			.or_default()
			.push(binding);
	}

	/// Keys that received conflicting contributions, in discovery order.
	pub(crate) fn duplicates(&self) -> &[TypeKey] {
		&self.duplicates
	}

	pub(crate) fn into_parts(
		self,
	) -> (IndexMap<BaseKey, Binding>, IndexMap<BaseKey, Vec<Binding>>) {
		(self.bindings, self.multibindings)
	}

	/// First loop found among single-binding dependencies, as the path from
	/// the first key of the loop back to itself.
	pub(crate) fn find_dependency_cycle(&self) -> Option<Vec<TypeKey>> {
		let mut visited = HashSet::new();
		let mut in_progress = HashSet::new();
		let mut path = Vec::new();

		for base in self.bindings.keys() {
			if !visited.contains(base) {
				if let Some(cycle) =
					self.dfs_detect_cycle(*base, &mut visited, &mut in_progress, &mut path)
				{
					return Some(cycle);
				}
			}
		}
		None
	}

	fn dfs_detect_cycle(
		&self,
		base: BaseKey,
		visited: &mut HashSet<BaseKey>,
		in_progress: &mut HashSet<BaseKey>,
		path: &mut Vec<TypeKey>,
	) -> Option<Vec<TypeKey>> {
		let binding = self.bindings.get(&base)?;
		visited.insert(base);
		in_progress.insert(base);
		path.push(binding.key());

		for dependency in binding.dependencies() {
			let next = dependency.base();
			if !self.bindings.contains_key(&next) {
				continue;
			}
			if in_progress.contains(&next) {
				if let Some(start) = path.iter().position(|key| key.base() == next) {
					let mut cycle = path[start..].to_vec();
					cycle.push(path[start]);
					return Some(cycle);
				}
			} else if !visited.contains(&next) {
				if let Some(cycle) = self.dfs_detect_cycle(next, visited, in_progress, path) {
					return Some(cycle);
				}
			}
		}

		path.pop();
		in_progress.remove(&base);
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scope::Scope;
	use crate::DiResult;
	use rstest::rstest;
	use std::sync::Arc;

	struct A;
	struct B;
	struct C;

	fn provider(key: TypeKey, deps: Vec<TypeKey>) -> Binding {
		Binding::from_provider(key, deps, Scope::Singleton, |_| -> DiResult<u8> { Ok(0) })
	}

	#[rstest]
	fn test_same_binding_twice_is_not_a_duplicate() {
		// Arrange
		let mut registry = BindingRegistry::new();
		let shared = Arc::new(1u32);

		// Act
		registry.add_binding(Binding::instance(TypeKey::of::<u32>(), shared.clone()));
		registry.add_binding(Binding::instance(TypeKey::of::<u32>(), shared));

		// Assert
		assert!(registry.duplicates().is_empty());
	}

	#[rstest]
	fn test_different_bindings_are_duplicates() {
		// Arrange
		let mut registry = BindingRegistry::new();

		// Act
		registry.add_binding(Binding::instance(TypeKey::of::<u32>(), Arc::new(1u32)));
		registry.add_binding(Binding::instance(TypeKey::of::<u32>(), Arc::new(1u32)));

		// Assert
		assert_eq!(registry.duplicates(), &[TypeKey::of::<u32>()]);
	}

	#[rstest]
	fn test_multibindings_keep_every_contribution_in_order() {
		// Arrange
		let mut registry = BindingRegistry::new();

		// Act
		registry.add_multibinding(Binding::instance(TypeKey::of::<u32>(), Arc::new(1u32)));
		registry.add_multibinding(Binding::instance(TypeKey::of::<u32>(), Arc::new(2u32)));

		// Assert
		let (_, multibindings) = registry.into_parts();
		let values: Vec<u32> = multibindings[&BaseKey::of::<u32>()]
			.iter()
			.map(|binding| match binding.provider() {
				crate::Provider::Instance(instance) => *instance.downcast::<u32>().unwrap(),
				crate::Provider::Factory(_) => unreachable!(),
			})
			.collect();
		assert_eq!(values, vec![1, 2]);
	}

	#[rstest]
	fn test_dependency_loop_reported_as_path() {
		// Arrange
		let mut registry = BindingRegistry::new();
		registry.add_binding(provider(TypeKey::of::<A>(), vec![TypeKey::of::<B>()]));
		registry.add_binding(provider(TypeKey::of::<B>(), vec![TypeKey::read_only::<C>()]));
		registry.add_binding(provider(TypeKey::of::<C>(), vec![TypeKey::of::<B>()]));

		// Act
		let cycle = registry.find_dependency_cycle().unwrap();

		// Assert
		assert_eq!(
			cycle,
			vec![TypeKey::of::<B>(), TypeKey::of::<C>(), TypeKey::of::<B>()]
		);
	}

	#[rstest]
	fn test_acyclic_dependencies() {
		let mut registry = BindingRegistry::new();
		registry.add_binding(provider(TypeKey::of::<A>(), vec![TypeKey::of::<B>()]));
		registry.add_binding(provider(TypeKey::of::<B>(), vec![]));
		assert!(registry.find_dependency_cycle().is_none());
	}
}
