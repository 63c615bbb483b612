//! Binding scopes and the injector's lazy instance slots

use crate::binding::Instance;
use crate::key::BaseKey;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Lifetime of the values a binding produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
	/// Constructed at most once per injector and shared.
	#[default]
	Singleton,
	/// Constructed anew on every resolution.
	Transient,
}

impl Scope {
	pub fn as_str(&self) -> &'static str {
		match self {
			Scope::Singleton => "singleton",
			Scope::Transient => "transient",
		}
	}
}

/// Per-key slots for singleton instances.
///
/// The slot map is fixed when the injector is created; each slot is a
/// `OnceCell`, so concurrent first accesses to the same key construct exactly
/// once and every other caller waits for that construction.
pub struct SingletonScope {
	slots: HashMap<BaseKey, OnceCell<Instance>>,
}

impl SingletonScope {
	/// Creates one empty slot per key.
	///
	/// # Examples
	///
	/// ```
	/// use bindery_di::{BaseKey, SingletonScope};
	///
	/// let scope = SingletonScope::new([BaseKey::of::<u32>()]);
	/// assert!(scope.get(&BaseKey::of::<u32>()).is_none());
	/// assert_eq!(scope.initialized(), 0);
	/// ```
	pub fn new(keys: impl IntoIterator<Item = BaseKey>) -> Self {
		Self {
			slots: keys.into_iter().map(|key| (key, OnceCell::new())).collect(),
		}
	}

	pub(crate) fn slot(&self, key: &BaseKey) -> Option<&OnceCell<Instance>> {
		self.slots.get(key)
	}

	/// The cached instance for `key`, if it was constructed already.
	pub fn get(&self, key: &BaseKey) -> Option<Instance> {
		self.slots.get(key).and_then(|slot| slot.get().cloned())
	}

	/// Number of constructed singletons.
	pub fn initialized(&self) -> usize {
		self.slots.values().filter(|slot| slot.get().is_some()).count()
	}
}

/// Per-contribution slots for multibinding sets.
///
/// Each contribution owns its own slot, so two contributions never share an
/// instance even when they come from the same provider.
pub struct MultibindingScope {
	slots: HashMap<BaseKey, Vec<OnceCell<Instance>>>,
}

impl MultibindingScope {
	pub fn new(sizes: impl IntoIterator<Item = (BaseKey, usize)>) -> Self {
		Self {
			slots: sizes
				.into_iter()
				.map(|(key, len)| (key, (0..len).map(|_| OnceCell::new()).collect()))
				.collect(),
		}
	}

	pub(crate) fn slot(&self, key: &BaseKey, index: usize) -> Option<&OnceCell<Instance>> {
		self.slots.get(key).and_then(|slots| slots.get(index))
	}

	pub fn initialized(&self) -> usize {
		self.slots
			.values()
			.flatten()
			.filter(|slot| slot.get().is_some())
			.count()
	}
}
