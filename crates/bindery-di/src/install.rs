//! Installation calls
//!
//! An installation is identified by the component-producing function and the
//! argument tuple it is invoked with. Two calls are the same logical
//! installation iff both match by value; that identity drives deduplication
//! and cycle detection during expansion.
//!
//! Function identity is the Rust type of the function. Function items and
//! non-capturing closures each have their own zero-sized type, so the type
//! alone names them. Anything carrying state (capturing closures, `fn`
//! pointers) cannot be told apart by type and is rejected at this boundary.

use crate::component::Component;
use crate::error::TraceEntry;
use crate::{DiError, DiResult};
use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a component-producing function.
#[derive(Clone, Copy)]
pub struct FunctionId {
	type_id: TypeId,
	name: &'static str,
}

impl FunctionId {
	pub fn of<F: 'static>() -> Self {
		Self {
			type_id: TypeId::of::<F>(),
			name: std::any::type_name::<F>(),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for FunctionId {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for FunctionId {}

impl Hash for FunctionId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
	}
}

impl fmt::Debug for FunctionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Capabilities an installation argument tuple needs: duplication, value
/// equality and a stable hash.
pub trait InstallArgs: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> InstallArgs for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Object-safe view of an argument tuple.
trait ArgumentValue: Send + Sync {
	fn as_any(&self) -> &dyn Any;
	fn equals(&self, other: &dyn ArgumentValue) -> bool;
	fn describe(&self) -> String;
}

impl<A: InstallArgs> ArgumentValue for A {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn equals(&self, other: &dyn ArgumentValue) -> bool {
		other
			.as_any()
			.downcast_ref::<A>()
			.is_some_and(|other| self == other)
	}

	fn describe(&self) -> String {
		if TypeId::of::<A>() == TypeId::of::<()>() {
			String::new()
		} else {
			format!("{:?}", self)
		}
	}
}

/// Memoization key of an installation: function plus arguments.
#[derive(Clone)]
pub struct CallKey {
	function: FunctionId,
	args: Arc<dyn ArgumentValue>,
	hash: u64,
}

impl CallKey {
	pub fn function(&self) -> FunctionId {
		self.function
	}

	pub fn trace_entry(&self) -> TraceEntry {
		TraceEntry {
			function: self.function.name,
			arguments: self.args.describe(),
		}
	}
}

impl PartialEq for CallKey {
	fn eq(&self, other: &Self) -> bool {
		self.function == other.function
			&& self.hash == other.hash
			&& self.args.equals(other.args.as_ref())
	}
}

impl Eq for CallKey {}

impl Hash for CallKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.function.hash(state);
		self.hash.hash(state);
	}
}

impl fmt::Display for CallKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.trace_entry().display_signature())
	}
}

impl fmt::Debug for CallKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

/// A boundary violation, kept until expansion reaches the installation.
#[derive(Debug, Clone)]
pub(crate) struct Rejection {
	pub(crate) function: FunctionId,
	pub(crate) reason: String,
}

impl From<Rejection> for DiError {
	fn from(rejection: Rejection) -> Self {
		DiError::InvalidInstallationArguments {
			function: rejection.function.name.to_string(),
			reason: rejection.reason,
		}
	}
}

type Invoke = Arc<dyn Fn() -> Component + Send + Sync>;

/// A component function paired with the arguments to invoke it with.
#[derive(Clone)]
pub struct InstallationCall {
	key: CallKey,
	invoke: Invoke,
}

impl InstallationCall {
	/// A call to a component function without arguments.
	pub fn new<F>(function: F) -> DiResult<Self>
	where
		F: Fn() -> Component + Send + Sync + 'static,
	{
		Self::try_new(function).map_err(DiError::from)
	}

	/// A call to a component function with an argument tuple.
	///
	/// # Examples
	///
	/// ```
	/// use bindery_di::{Component, InstallationCall};
	///
	/// fn numbered(_n: u32) -> Component {
	///     Component::builder().build()
	/// }
	///
	/// let a = InstallationCall::with_args(numbered, 1).unwrap();
	/// let b = InstallationCall::with_args(numbered, 1).unwrap();
	/// let c = InstallationCall::with_args(numbered, 2).unwrap();
	/// assert_eq!(a.key(), b.key());
	/// assert_ne!(a.key(), c.key());
	/// ```
	pub fn with_args<F, A>(function: F, args: A) -> DiResult<Self>
	where
		F: Fn(A) -> Component + Send + Sync + 'static,
		A: InstallArgs,
	{
		Self::try_with_args(function, args).map_err(DiError::from)
	}

	pub(crate) fn try_new<F>(function: F) -> Result<Self, Rejection>
	where
		F: Fn() -> Component + Send + Sync + 'static,
	{
		let id = FunctionId::of::<F>();
		check_function::<F>(id)?;
		let hash = hash_of(&());
		Ok(Self {
			key: CallKey {
				function: id,
				args: Arc::new(()),
				hash,
			},
			invoke: Arc::new(move || function()),
		})
	}

	pub(crate) fn try_with_args<F, A>(function: F, args: A) -> Result<Self, Rejection>
	where
		F: Fn(A) -> Component + Send + Sync + 'static,
		A: InstallArgs,
	{
		let id = FunctionId::of::<F>();
		check_function::<F>(id)?;
		let hash = check_arguments(id, &args)?;
		let captured = args.clone();
		Ok(Self {
			key: CallKey {
				function: id,
				args: Arc::new(args),
				hash,
			},
			invoke: Arc::new(move || function(captured.clone())),
		})
	}

	pub fn key(&self) -> &CallKey {
		&self.key
	}

	pub fn function(&self) -> FunctionId {
		self.key.function
	}

	pub(crate) fn invoke(&self) -> Component {
		(self.invoke)()
	}
}

impl fmt::Debug for InstallationCall {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("InstallationCall").field(&self.key).finish()
	}
}

fn check_function<F>(id: FunctionId) -> Result<(), Rejection> {
	if std::mem::size_of::<F>() != 0 {
		return Err(Rejection {
			function: id,
			reason: "component functions must be function items or non-capturing closures; \
			         state has to be passed as installation arguments"
				.to_string(),
		});
	}
	Ok(())
}

fn check_arguments<A: InstallArgs>(id: FunctionId, args: &A) -> Result<u64, Rejection> {
	let duplicate = args.clone();
	if duplicate != *args {
		return Err(Rejection {
			function: id,
			reason: format!(
				"a copy of the arguments {:?} does not compare equal to the original",
				args
			),
		});
	}
	let hash = hash_of(args);
	if hash_of(&duplicate) != hash {
		return Err(Rejection {
			function: id,
			reason: format!("equal arguments {:?} produced different hashes", args),
		});
	}
	Ok(hash)
}

fn hash_of<A: Hash + ?Sized>(value: &A) -> u64 {
	let mut hasher = DefaultHasher::new();
	value.hash(&mut hasher);
	hasher.finish()
}
