//! Bindings and the values they produce
//!
//! A [`Binding`] maps one [`TypeKey`] to a pre-existing instance, a
//! constructor, a provider closure or an alias of another key. Every provider
//! declares the keys it depends on up front; the injector resolves them and
//! hands them over as a [`Dependencies`] view.

use crate::key::{BaseKey, TypeKey};
use crate::scope::Scope;
use crate::{DiError, DiResult};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A constructed value, type-erased.
///
/// Internally this is an `Arc<T>` behind `dyn Any`, so unsized targets such as
/// trait objects can be stored alongside plain structs.
#[derive(Clone)]
pub struct Instance {
	value: Arc<dyn Any + Send + Sync>,
	address: usize,
	type_name: &'static str,
}

impl Instance {
	pub fn new<T>(value: Arc<T>) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		Self {
			address: Arc::as_ptr(&value) as *const () as usize,
			type_name: std::any::type_name::<T>(),
			value: Arc::new(value),
		}
	}

	pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
		Self::new(Arc::new(value))
	}

	/// Returns the shared value if it holds a `T`.
	pub fn downcast<T>(&self) -> Option<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.value.downcast_ref::<Arc<T>>().cloned()
	}

	/// True if both instances point at the same allocation.
	pub fn ptr_eq(&self, other: &Instance) -> bool {
		self.address == other.address
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub(crate) fn address(&self) -> usize {
		self.address
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance")
			.field("type", &self.type_name)
			.field("address", &format_args!("{:#x}", self.address))
			.finish()
	}
}

/// Resolved dependencies of one provider invocation, in declaration order.
pub struct Dependencies<'a> {
	entries: &'a [(TypeKey, Instance)],
}

impl<'a> Dependencies<'a> {
	pub(crate) fn new(entries: &'a [(TypeKey, Instance)]) -> Self {
		Self { entries }
	}

	/// The first declared, unannotated dependency on `T`.
	pub fn get<T>(&self) -> DiResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.get_key(&TypeKey::of::<T>())
	}

	/// The declared dependency on `T` annotated with `A`.
	pub fn get_annotated<T, A>(&self) -> DiResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
		A: ?Sized + 'static,
	{
		self.get_key(&TypeKey::of::<T>().annotated::<A>())
	}

	/// Looks a dependency up by key. Mutability is ignored: a provider declaring
	/// `const T` reads the same value as one declaring `T`.
	pub fn get_key<T>(&self, key: &TypeKey) -> DiResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let (declared, instance) = self
			.entries
			.iter()
			.find(|(declared, _)| declared.base() == key.base())
			.ok_or(DiError::UndeclaredDependency(*key))?;
		instance.downcast::<T>().ok_or(DiError::TypeMismatch {
			key: *declared,
			requested: std::any::type_name::<T>(),
		})
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Types the injector can construct from their declared dependencies.
///
/// ```
/// use bindery_di::{Dependencies, DiResult, Inject, TypeKey};
/// use std::sync::Arc;
///
/// struct Config {
///     url: String,
/// }
///
/// struct Client {
///     config: Arc<Config>,
/// }
///
/// impl Inject for Client {
///     fn dependencies() -> Vec<TypeKey> {
///         vec![TypeKey::read_only::<Config>()]
///     }
///
///     fn construct(deps: &Dependencies<'_>) -> DiResult<Self> {
///         Ok(Client {
///             config: deps.get::<Config>()?,
///         })
///     }
/// }
/// ```
pub trait Inject: Sized + Send + Sync + 'static {
	/// Keys this type needs, in the order `construct` reads them.
	fn dependencies() -> Vec<TypeKey> {
		Vec::new()
	}

	fn construct(deps: &Dependencies<'_>) -> DiResult<Self>;
}

pub(crate) type Factory = Arc<dyn Fn(&Dependencies<'_>) -> DiResult<Instance> + Send + Sync>;

/// How a binding produces its value.
#[derive(Clone)]
pub enum Provider {
	Instance(Instance),
	Factory(Factory),
}

impl fmt::Debug for Provider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Provider::Instance(instance) => f.debug_tuple("Instance").field(instance).finish(),
			Provider::Factory(_) => f.write_str("Factory"),
		}
	}
}

/// Where a binding came from.
///
/// Two contributions with equal origins (and equal keys) are the same
/// binding, so installing a component twice with different arguments does not
/// turn its shared constructor registrations into duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
	Constructor(TypeId),
	Provider(TypeId),
	/// A provider closure carrying captured state. Its type says nothing
	/// about what it captured, so only the same allocation is the same binding.
	StatefulProvider(usize),
	Instance(usize),
	Alias(TypeKey),
}

impl fmt::Display for BindingOrigin {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BindingOrigin::Constructor(_) => f.write_str("constructor"),
			BindingOrigin::Provider(_) | BindingOrigin::StatefulProvider(_) => {
				f.write_str("provider")
			}
			BindingOrigin::Instance(_) => f.write_str("instance"),
			BindingOrigin::Alias(target) => write!(f, "alias of {}", target),
		}
	}
}

/// A single contribution to the graph.
#[derive(Clone, Debug)]
pub struct Binding {
	key: TypeKey,
	dependencies: Vec<TypeKey>,
	provider: Provider,
	scope: Scope,
	origin: BindingOrigin,
}

impl Binding {
	pub fn instance<T>(key: TypeKey, value: Arc<T>) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let instance = Instance::new(value);
		Self {
			key,
			dependencies: Vec::new(),
			origin: BindingOrigin::Instance(instance.address()),
			provider: Provider::Instance(instance),
			scope: Scope::Singleton,
		}
	}

	pub fn constructor<T: Inject>(key: TypeKey) -> Self {
		let factory: Factory = Arc::new(|deps: &Dependencies<'_>| {
			T::construct(deps).map(Instance::from_value)
		});
		Self {
			key,
			dependencies: T::dependencies(),
			provider: Provider::Factory(factory),
			scope: Scope::Singleton,
			origin: BindingOrigin::Constructor(TypeId::of::<T>()),
		}
	}

	pub fn from_provider<T, F>(
		key: TypeKey,
		dependencies: Vec<TypeKey>,
		scope: Scope,
		f: F,
	) -> Self
	where
		T: Send + Sync + 'static,
		F: Fn(&Dependencies<'_>) -> DiResult<T> + Send + Sync + 'static,
	{
		let stateless = std::mem::size_of::<F>() == 0;
		let factory: Factory =
			Arc::new(move |deps: &Dependencies<'_>| f(deps).map(Instance::from_value));
		let origin = if stateless {
			BindingOrigin::Provider(TypeId::of::<F>())
		} else {
			BindingOrigin::StatefulProvider(Arc::as_ptr(&factory) as *const () as usize)
		};
		Self {
			key,
			dependencies,
			provider: Provider::Factory(factory),
			scope,
			origin,
		}
	}

	/// Binds `interface` to whatever `implementation` resolves to, converted
	/// through `upcast`.
	pub fn alias<I, C>(
		interface: TypeKey,
		implementation: TypeKey,
		upcast: fn(Arc<C>) -> Arc<I>,
	) -> Self
	where
		I: ?Sized + Send + Sync + 'static,
		C: ?Sized + Send + Sync + 'static,
	{
		let factory: Factory = Arc::new(move |deps: &Dependencies<'_>| {
			let concrete = deps.get_key::<C>(&implementation)?;
			Ok(Instance::new(upcast(concrete)))
		});
		Self {
			key: interface,
			dependencies: vec![implementation],
			provider: Provider::Factory(factory),
			scope: Scope::Singleton,
			origin: BindingOrigin::Alias(implementation),
		}
	}

	pub fn key(&self) -> TypeKey {
		self.key
	}

	pub fn base(&self) -> BaseKey {
		self.key.base()
	}

	pub fn dependencies(&self) -> &[TypeKey] {
		&self.dependencies
	}

	pub fn provider(&self) -> &Provider {
		&self.provider
	}

	pub fn scope(&self) -> Scope {
		self.scope
	}

	pub fn origin(&self) -> BindingOrigin {
		self.origin
	}

	/// True if `other` is the same contribution seen through another
	/// installation.
	pub fn is_same_as(&self, other: &Binding) -> bool {
		self.key == other.key && self.origin == other.origin && self.scope == other.scope
	}
}
