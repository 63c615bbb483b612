//! Binding graph composition
//!
//! [`GraphBuilder::build`] expands a root installation, checks every expanded
//! component against the declared signatures of the components it installs,
//! and folds all bindings into one [`BindingGraph`].
//!
//! A build reports exactly one root cause. Expansion failures (installation
//! loops, rejected arguments, replacement conflicts) stop the build as soon
//! as they are found. Everything else is collected and ranked: mutability
//! violations, then missing bindings, then duplicate bindings, then
//! dependency loops. Within a rank the outermost component wins.

use crate::binding::Binding;
use crate::component::Component;
use crate::config::BuildConfig;
use crate::covariance::{check_requirements, MutabilityMap, Violation};
use crate::expansion::{Expander, Expansion};
use crate::install::{CallKey, InstallArgs, InstallationCall};
use crate::key::{BaseKey, TypeKey};
use crate::registry::BindingRegistry;
use crate::{DiError, DiResult};
use indexmap::{IndexMap, IndexSet};

/// Composes binding graphs under one configuration.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
	config: BuildConfig,
}

impl GraphBuilder {
	pub fn new(config: BuildConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &BuildConfig {
		&self.config
	}

	/// Expands `root` and validates the result.
	///
	/// State used while composing (open installations, completed calls,
	/// registered replacements) lives only for the duration of this call.
	pub fn build(&self, root: InstallationCall) -> DiResult<BindingGraph> {
		self.config.validate()?;
		let root_key = root.key().clone();
		let expansion = Expander::new(&self.config).expand(root)?;

		let mut registry = BindingRegistry::new();
		let mut violations = Vec::new();
		for (index, node) in expansion.nodes.iter().enumerate() {
			violations.extend(validate_component(&expansion, index));
			for binding in node.component.bindings() {
				registry.add_binding(binding.clone());
			}
			for binding in node.component.multibindings() {
				registry.add_multibinding(binding.clone());
			}
		}

		if let Some(violation) = violations
			.iter()
			.find(|violation| violation.is_mutability())
			.or_else(|| violations.first())
		{
			return Err((*violation).into());
		}
		if let Some(key) = registry.duplicates().first() {
			return Err(DiError::DuplicateBinding(*key));
		}
		if self.config.check_dependency_cycles {
			if let Some(path) = registry.find_dependency_cycle() {
				return Err(DiError::DependencyCycle(path));
			}
		}

		let exposed = expansion
			.nodes
			.first()
			.map(|node| node.component.provided().clone())
			.unwrap_or_default();
		let component_count = expansion.nodes.len();
		let (bindings, multibindings) = registry.into_parts();
		let graph = BindingGraph {
			root: root_key,
			exposed,
			bindings,
			multibindings,
			component_count,
		};

		tracing::debug!(
			root = %graph.root,
			components = graph.component_count,
			bindings = graph.binding_count(),
			multibindings = graph.multibinding_count(),
			"binding graph finalized"
		);
		Ok(graph)
	}
}

/// Checks one expanded component.
///
/// The component provides its own bindings plus whatever its direct children
/// declare as provided. It needs the dependencies of its own bindings, the
/// declared requirements of its children, and everything it declares as
/// provided. What it cannot provide itself has to be in its declared
/// requirements. The root has nobody to pass its declared requirements on
/// to, so those must be provided internally as well.
fn validate_component(expansion: &Expansion, index: usize) -> Vec<Violation> {
	let node = &expansion.nodes[index];
	let component = &node.component;

	let mut provided: MutabilityMap = component.bindings().iter().map(Binding::key).collect();
	let mut required: MutabilityMap = component
		.bindings()
		.iter()
		.chain(component.multibindings())
		.flat_map(|binding| binding.dependencies().iter())
		.collect();

	for child in node.children.iter().filter_map(|&child| expansion.nodes.get(child)) {
		provided.merge(&child.component.provided().iter().collect::<MutabilityMap>());
		required.merge(&child.component.required().iter().collect::<MutabilityMap>());
	}
	required.merge(&component.provided().iter().collect::<MutabilityMap>());

	let declared: MutabilityMap = component.required().iter().collect();
	let mut violations = check_requirements(&provided, &required, Some(&declared));
	if index == 0 {
		violations.extend(check_requirements(&provided, &declared, None));
		violations.sort_by_key(Violation::key);
	}
	violations
}

/// A validated, immutable binding graph.
///
/// One graph can back any number of [`Injector`](crate::Injector)s.
#[derive(Debug)]
pub struct BindingGraph {
	root: CallKey,
	exposed: IndexSet<TypeKey>,
	bindings: IndexMap<BaseKey, Binding>,
	multibindings: IndexMap<BaseKey, Vec<Binding>>,
	component_count: usize,
}

impl BindingGraph {
	/// Builds the graph of a root component function with the default
	/// configuration.
	///
	/// ```
	/// use bindery_di::{BindingGraph, Component, TypeKey};
	/// use std::sync::Arc;
	///
	/// fn root() -> Component {
	///     Component::builder()
	///         .provides(TypeKey::of::<u16>())
	///         .bind_instance(TypeKey::of::<u16>(), Arc::new(8080u16))
	///         .build()
	/// }
	///
	/// let graph = BindingGraph::build(root).unwrap();
	/// assert_eq!(graph.binding_count(), 1);
	/// ```
	pub fn build<F>(function: F) -> DiResult<Self>
	where
		F: Fn() -> Component + Send + Sync + 'static,
	{
		GraphBuilder::default().build(InstallationCall::new(function)?)
	}

	pub fn build_with<F, A>(function: F, args: A) -> DiResult<Self>
	where
		F: Fn(A) -> Component + Send + Sync + 'static,
		A: InstallArgs,
	{
		GraphBuilder::default().build(InstallationCall::with_args(function, args)?)
	}

	pub fn root(&self) -> &CallKey {
		&self.root
	}

	/// Keys the root component declares as provided.
	pub fn exposed_keys(&self) -> &IndexSet<TypeKey> {
		&self.exposed
	}

	/// True if the root exposes `key` with at least the requested mutability.
	pub fn is_exposed(&self, key: &TypeKey) -> bool {
		self.exposed.iter().any(|exposed| {
			exposed.base() == key.base() && exposed.mutability().satisfies(key.mutability())
		})
	}

	pub fn binding(&self, base: &BaseKey) -> Option<&Binding> {
		self.bindings.get(base)
	}

	pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
		self.bindings.values()
	}

	/// Contributions to the multibinding set of `base`, in installation order.
	pub fn multibindings(&self, base: &BaseKey) -> &[Binding] {
		self.multibindings
			.get(base)
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	pub(crate) fn multibinding_sets(&self) -> impl Iterator<Item = (&BaseKey, &Vec<Binding>)> {
		self.multibindings.iter()
	}

	pub fn binding_count(&self) -> usize {
		self.bindings.len()
	}

	/// Total number of multibinding contributions across all sets.
	pub fn multibinding_count(&self) -> usize {
		self.multibindings.values().map(Vec::len).sum()
	}

	/// Number of distinct installations expanded, root included.
	pub fn component_count(&self) -> usize {
		self.component_count
	}
}
