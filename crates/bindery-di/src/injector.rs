//! Runtime resolution over a finished binding graph
//!
//! ```
//! use bindery_di::{Component, Injector, TypeKey};
//! use std::sync::Arc;
//!
//! fn root() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::read_only::<String>())
//!         .register_provider(TypeKey::of::<String>(), vec![], |_| Ok("db://local".to_string()))
//!         .build()
//! }
//!
//! let injector = Injector::from_component(root).unwrap();
//! let url = injector.get::<String>(&TypeKey::read_only::<String>()).unwrap();
//! assert_eq!(url.as_str(), "db://local");
//! ```

use crate::binding::{Binding, Dependencies, Instance, Provider};
use crate::component::Component;
use crate::graph::BindingGraph;
use crate::key::{BaseKey, Mutability, TypeKey};
use crate::scope::{MultibindingScope, Scope, SingletonScope};
use crate::{DiError, DiResult};
use std::fmt;
use std::sync::Arc;

/// Lazily constructs and caches instances described by a [`BindingGraph`].
///
/// `Injector` is `Send + Sync`; concurrent first requests for the same
/// singleton construct it exactly once.
pub struct Injector {
	graph: Arc<BindingGraph>,
	singletons: SingletonScope,
	multibindings: MultibindingScope,
}

impl Injector {
	pub fn new(graph: Arc<BindingGraph>) -> Self {
		let singletons = SingletonScope::new(
			graph
				.bindings()
				.filter(|binding| binding.scope() == Scope::Singleton)
				.map(Binding::base),
		);
		let multibindings = MultibindingScope::new(
			graph
				.multibinding_sets()
				.map(|(base, contributions)| (*base, contributions.len())),
		);
		Self {
			graph,
			singletons,
			multibindings,
		}
	}

	/// Builds the graph of `function` and wraps it in a fresh injector.
	pub fn from_component<F>(function: F) -> DiResult<Self>
	where
		F: Fn() -> Component + Send + Sync + 'static,
	{
		Ok(Self::new(Arc::new(BindingGraph::build(function)?)))
	}

	pub fn graph(&self) -> &Arc<BindingGraph> {
		&self.graph
	}

	/// Resolves an exposed key to a value of type `T`.
	pub fn get<T>(&self, key: &TypeKey) -> DiResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.get_instance(key)?
			.downcast::<T>()
			.ok_or(DiError::TypeMismatch {
				key: *key,
				requested: std::any::type_name::<T>(),
			})
	}

	/// Resolves an exposed key without naming its Rust type.
	///
	/// Fails with [`DiError::KeyNotExposed`] for keys outside the root's
	/// declared provided set, including a mutable request for a key the root
	/// only exposes as read-only.
	pub fn get_instance(&self, key: &TypeKey) -> DiResult<Instance> {
		if !self.graph.is_exposed(key) {
			return Err(DiError::KeyNotExposed(*key));
		}
		self.resolve(&key.base())
	}

	/// Every contribution to the multibinding set of `key`, in installation
	/// order. A key without contributions yields an empty vector.
	pub fn get_multibindings<T>(&self, key: &TypeKey) -> DiResult<Vec<Arc<T>>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let base = key.base();
		(0..self.graph.multibindings(&base).len())
			.map(|index| {
				self.resolve_contribution(&base, index)?
					.downcast::<T>()
					.ok_or(DiError::TypeMismatch {
						key: *key,
						requested: std::any::type_name::<T>(),
					})
			})
			.collect()
	}

	/// Constructs every singleton binding and every multibinding contribution.
	pub fn eagerly_inject_all(&self) -> DiResult<()> {
		for binding in self.graph.bindings() {
			if binding.scope() == Scope::Singleton {
				self.resolve(&binding.base())?;
			}
		}
		for (base, contributions) in self.graph.multibinding_sets() {
			for index in 0..contributions.len() {
				self.resolve_contribution(base, index)?;
			}
		}
		tracing::debug!(
			singletons = self.singletons.initialized(),
			multibindings = self.multibindings.initialized(),
			"eager injection complete"
		);
		Ok(())
	}

	/// Number of singleton and multibinding instances constructed so far.
	pub fn constructed_count(&self) -> usize {
		self.singletons.initialized() + self.multibindings.initialized()
	}

	fn resolve(&self, base: &BaseKey) -> DiResult<Instance> {
		let binding = self
			.graph
			.binding(base)
			.ok_or(DiError::NoBindingFound(base.with_mutability(Mutability::Mutable)))?;

		match (binding.scope(), self.singletons.slot(base)) {
			(Scope::Singleton, Some(slot)) => {
				slot.get_or_try_init(|| self.construct(binding)).cloned()
			}
			_ => self.construct(binding),
		}
	}

	fn resolve_contribution(&self, base: &BaseKey, index: usize) -> DiResult<Instance> {
		let contributions = self.graph.multibindings(base);
		let binding = contributions
			.get(index)
			.ok_or(DiError::NoBindingFound(base.with_mutability(Mutability::Mutable)))?;

		match self.multibindings.slot(base, index) {
			Some(slot) => slot.get_or_try_init(|| self.construct(binding)).cloned(),
			None => self.construct(binding),
		}
	}

	fn construct(&self, binding: &Binding) -> DiResult<Instance> {
		match binding.provider() {
			Provider::Instance(instance) => Ok(instance.clone()),
			Provider::Factory(factory) => {
				let entries = binding
					.dependencies()
					.iter()
					.map(|dependency| Ok((*dependency, self.resolve(&dependency.base())?)))
					.collect::<DiResult<Vec<_>>>()?;
				tracing::trace!(
					key = %binding.key(),
					scope = binding.scope().as_str(),
					"constructing instance"
				);
				factory(&Dependencies::new(&entries))
			}
		}
	}
}

impl fmt::Debug for Injector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Injector")
			.field("root", self.graph.root())
			.field("singletons", &self.singletons.initialized())
			.field("multibindings", &self.multibindings.initialized())
			.finish()
	}
}
