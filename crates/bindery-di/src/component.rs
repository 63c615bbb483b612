//! Component descriptors
//!
//! A [`Component`] is what one component-producing function returns: a
//! declared signature (provided and required keys), the bindings it
//! contributes directly, and the nested installations it asks for. It is
//! built once, never mutated afterwards, and merged by the graph builder.
//!
//! ```
//! use bindery_di::{Component, TypeKey};
//! use std::sync::Arc;
//!
//! struct Port(u16);
//!
//! fn port_component() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::of::<Port>())
//!         .bind_instance(TypeKey::of::<Port>(), Arc::new(Port(8080)))
//!         .build()
//! }
//!
//! fn root_component() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::read_only::<Port>())
//!         .install(port_component)
//!         .build()
//! }
//! # let _ = root_component();
//! ```

use crate::binding::{Binding, Dependencies, Inject};
use crate::install::{InstallArgs, InstallationCall, Rejection};
use crate::key::TypeKey;
use crate::scope::Scope;
use crate::DiResult;
use indexmap::IndexSet;
use std::sync::Arc;

/// Declared contract of a component function.
#[derive(Debug, Clone, Default)]
pub struct Signature {
	provided: IndexSet<TypeKey>,
	required: IndexSet<TypeKey>,
}

impl Signature {
	pub fn provided(&self) -> &IndexSet<TypeKey> {
		&self.provided
	}

	pub fn required(&self) -> &IndexSet<TypeKey> {
		&self.required
	}
}

/// A nested installation as declared, possibly already rejected at the
/// boundary.
#[derive(Debug, Clone)]
pub(crate) enum Installation {
	Call(InstallationCall),
	Rejected(Rejection),
}

impl From<Result<InstallationCall, Rejection>> for Installation {
	fn from(result: Result<InstallationCall, Rejection>) -> Self {
		match result {
			Ok(call) => Installation::Call(call),
			Err(rejection) => Installation::Rejected(rejection),
		}
	}
}

/// "Whenever `target` is installed, expand `replacement` instead."
#[derive(Debug, Clone)]
pub(crate) struct Replacement {
	pub(crate) target: Installation,
	pub(crate) replacement: Installation,
}

/// Output of one component-producing function.
#[derive(Debug, Clone, Default)]
pub struct Component {
	signature: Signature,
	bindings: Vec<Binding>,
	multibindings: Vec<Binding>,
	installations: Vec<Installation>,
	replacements: Vec<Replacement>,
}

impl Component {
	pub fn builder() -> ComponentBuilder {
		ComponentBuilder::default()
	}

	pub fn signature(&self) -> &Signature {
		&self.signature
	}

	pub fn provided(&self) -> &IndexSet<TypeKey> {
		&self.signature.provided
	}

	pub fn required(&self) -> &IndexSet<TypeKey> {
		&self.signature.required
	}

	pub fn bindings(&self) -> &[Binding] {
		&self.bindings
	}

	pub fn multibindings(&self) -> &[Binding] {
		&self.multibindings
	}

	pub fn installation_count(&self) -> usize {
		self.installations.len()
	}

	pub(crate) fn installations(&self) -> &[Installation] {
		&self.installations
	}

	pub(crate) fn replacements(&self) -> &[Replacement] {
		&self.replacements
	}
}

/// Fluent construction of a [`Component`].
#[derive(Default)]
pub struct ComponentBuilder {
	component: Component,
}

impl ComponentBuilder {
	/// Declares `key` as provided by this component.
	pub fn provides(mut self, key: TypeKey) -> Self {
		self.component.signature.provided.insert(key);
		self
	}

	/// Declares `key` as required from whoever installs this component.
	pub fn requires(mut self, key: TypeKey) -> Self {
		self.component.signature.required.insert(key);
		self
	}

	/// Binds `T` (mutable, unannotated) to its [`Inject`] constructor.
	pub fn register_constructor<T: Inject>(self) -> Self {
		self.register_constructor_as::<T>(TypeKey::of::<T>())
	}

	/// Binds `key` to the [`Inject`] constructor of `T`.
	pub fn register_constructor_as<T: Inject>(self, key: TypeKey) -> Self {
		self.bind(Binding::constructor::<T>(key))
	}

	/// Binds `key` to a singleton provider.
	pub fn register_provider<T, F>(self, key: TypeKey, dependencies: Vec<TypeKey>, f: F) -> Self
	where
		T: Send + Sync + 'static,
		F: Fn(&Dependencies<'_>) -> DiResult<T> + Send + Sync + 'static,
	{
		self.bind(Binding::from_provider(key, dependencies, Scope::Singleton, f))
	}

	/// Binds `key` to a provider invoked on every resolution.
	pub fn register_transient_provider<T, F>(
		self,
		key: TypeKey,
		dependencies: Vec<TypeKey>,
		f: F,
	) -> Self
	where
		T: Send + Sync + 'static,
		F: Fn(&Dependencies<'_>) -> DiResult<T> + Send + Sync + 'static,
	{
		self.bind(Binding::from_provider(key, dependencies, Scope::Transient, f))
	}

	/// Binds `key` to an existing value.
	pub fn bind_instance<T>(self, key: TypeKey, value: Arc<T>) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.bind(Binding::instance(key, value))
	}

	/// Binds the interface `I` to the implementation `C`.
	///
	/// ```
	/// use bindery_di::{Component, TypeKey};
	/// use std::sync::Arc;
	///
	/// trait Clock: Send + Sync {}
	/// struct SystemClock;
	/// impl Clock for SystemClock {}
	///
	/// let component = Component::builder()
	///     .bind_instance(TypeKey::of::<SystemClock>(), Arc::new(SystemClock))
	///     .bind_interface::<dyn Clock, SystemClock>(|clock| clock)
	///     .build();
	/// assert_eq!(component.bindings().len(), 2);
	/// ```
	pub fn bind_interface<I, C>(self, upcast: fn(Arc<C>) -> Arc<I>) -> Self
	where
		I: ?Sized + Send + Sync + 'static,
		C: ?Sized + Send + Sync + 'static,
	{
		self.bind_keys(TypeKey::of::<I>(), TypeKey::of::<C>(), upcast)
	}

	/// Binds `interface` to `implementation` for annotated or read-only keys.
	pub fn bind_keys<I, C>(
		self,
		interface: TypeKey,
		implementation: TypeKey,
		upcast: fn(Arc<C>) -> Arc<I>,
	) -> Self
	where
		I: ?Sized + Send + Sync + 'static,
		C: ?Sized + Send + Sync + 'static,
	{
		self.bind(Binding::alias(interface, implementation, upcast))
	}

	/// Adds a prepared binding.
	pub fn bind(mut self, binding: Binding) -> Self {
		self.component.bindings.push(binding);
		self
	}

	/// Appends one existing value to the multibinding set of `key`.
	pub fn add_multibinding_instance<T>(mut self, key: TypeKey, value: Arc<T>) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.component
			.multibindings
			.push(Binding::instance(key, value));
		self
	}

	/// Appends every value, in order, to the multibinding set of `key`.
	pub fn add_multibinding_instances<T, I>(mut self, key: TypeKey, values: I) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
		I: IntoIterator<Item = Arc<T>>,
	{
		self.component
			.multibindings
			.extend(values.into_iter().map(|value| Binding::instance(key, value)));
		self
	}

	/// Appends a provider-built contribution to the multibinding set of `key`.
	pub fn add_multibinding_provider<T, F>(
		mut self,
		key: TypeKey,
		dependencies: Vec<TypeKey>,
		f: F,
	) -> Self
	where
		T: Send + Sync + 'static,
		F: Fn(&Dependencies<'_>) -> DiResult<T> + Send + Sync + 'static,
	{
		self.component.multibindings.push(Binding::from_provider(
			key,
			dependencies,
			Scope::Singleton,
			f,
		));
		self
	}

	/// Installs a component function that takes no arguments.
	pub fn install<F>(mut self, function: F) -> Self
	where
		F: Fn() -> Component + Send + Sync + 'static,
	{
		self.component
			.installations
			.push(InstallationCall::try_new(function).into());
		self
	}

	/// Installs a component function with an argument tuple.
	pub fn install_with<F, A>(mut self, function: F, args: A) -> Self
	where
		F: Fn(A) -> Component + Send + Sync + 'static,
		A: InstallArgs,
	{
		self.component
			.installations
			.push(InstallationCall::try_with_args(function, args).into());
		self
	}

	/// Starts replacing every installation of `function`.
	pub fn replace<F>(self, function: F) -> ReplacementBuilder
	where
		F: Fn() -> Component + Send + Sync + 'static,
	{
		ReplacementBuilder {
			builder: self,
			target: InstallationCall::try_new(function).into(),
		}
	}

	/// Starts replacing every installation of `function` with `args`.
	pub fn replace_with_args<F, A>(self, function: F, args: A) -> ReplacementBuilder
	where
		F: Fn(A) -> Component + Send + Sync + 'static,
		A: InstallArgs,
	{
		ReplacementBuilder {
			builder: self,
			target: InstallationCall::try_with_args(function, args).into(),
		}
	}

	pub fn build(self) -> Component {
		self.component
	}
}

impl From<ComponentBuilder> for Component {
	fn from(builder: ComponentBuilder) -> Self {
		builder.build()
	}
}

/// Second half of `replace(..).with(..)`.
#[must_use = "a replacement takes effect only once `with` or `with_args` is called"]
pub struct ReplacementBuilder {
	builder: ComponentBuilder,
	target: Installation,
}

impl ReplacementBuilder {
	pub fn with<G>(self, function: G) -> ComponentBuilder
	where
		G: Fn() -> Component + Send + Sync + 'static,
	{
		self.finish(InstallationCall::try_new(function).into())
	}

	pub fn with_args<G, A>(self, function: G, args: A) -> ComponentBuilder
	where
		G: Fn(A) -> Component + Send + Sync + 'static,
		A: InstallArgs,
	{
		self.finish(InstallationCall::try_with_args(function, args).into())
	}

	fn finish(self, replacement: Installation) -> ComponentBuilder {
		let mut builder = self.builder;
		builder.component.replacements.push(Replacement {
			target: self.target,
			replacement,
		});
		builder
	}
}
