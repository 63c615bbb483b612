//! Type keys
//!
//! A [`TypeKey`] identifies a bindable entity: a Rust type, an optional
//! annotation and a mutability qualifier. Registry and memoizer lookups key on
//! this value rather than on host type identity, so the same type can be bound
//! several times under different annotations.
//!
//! ```
//! use bindery_di::{Mutability, TypeKey};
//!
//! struct Hostname;
//!
//! let plain = TypeKey::of::<String>();
//! let tagged = TypeKey::of::<String>().annotated::<Hostname>();
//! assert_ne!(plain, tagged);
//!
//! let read_only = TypeKey::read_only::<String>();
//! assert_eq!(read_only.mutability(), Mutability::ReadOnly);
//! assert_eq!(read_only.base(), plain.base());
//! ```

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Access qualifier carried by a [`TypeKey`].
///
/// `Mutable` is the stricter qualifier: a mutable provision satisfies a
/// read-only requirement, never the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Mutability {
	ReadOnly,
	#[default]
	Mutable,
}

impl Mutability {
	/// Joins two requirements on the same base key. The stricter one wins.
	pub fn join(self, other: Mutability) -> Mutability {
		self.max(other)
	}

	/// Whether a provision with this qualifier can discharge `required`.
	pub fn satisfies(self, required: Mutability) -> bool {
		self >= required
	}

	pub fn is_mutable(self) -> bool {
		matches!(self, Mutability::Mutable)
	}
}

impl fmt::Display for Mutability {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Mutability::ReadOnly => f.write_str("read-only"),
			Mutability::Mutable => f.write_str("mutable"),
		}
	}
}

/// Annotation tag distinguishing otherwise identical types.
///
/// Annotations are marker types; only their identity matters.
#[derive(Clone, Copy)]
pub struct Annotation {
	id: TypeId,
	name: &'static str,
}

impl Annotation {
	pub fn of<A: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<A>(),
			name: std::any::type_name::<A>(),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for Annotation {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for Annotation {}

impl Hash for Annotation {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for Annotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// A type key without its mutability qualifier.
///
/// Two keys that differ only in mutability share a base key; the covariance
/// merger and the registry reconcile them on this value.
#[derive(Clone, Copy)]
pub struct BaseKey {
	type_id: TypeId,
	type_name: &'static str,
	annotation: Option<Annotation>,
}

impl BaseKey {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
			annotation: None,
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn annotation(&self) -> Option<Annotation> {
		self.annotation
	}

	/// Re-attaches a mutability qualifier.
	pub fn with_mutability(self, mutability: Mutability) -> TypeKey {
		TypeKey {
			base: self,
			mutability,
		}
	}

	/// Ordering key that is stable across runs, used wherever diagnostics
	/// must be deterministic.
	fn sort_key(&self) -> (&'static str, Option<&'static str>) {
		(self.type_name, self.annotation.map(|a| a.name))
	}
}

impl PartialEq for BaseKey {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id && self.annotation == other.annotation
	}
}

impl Eq for BaseKey {}

impl Hash for BaseKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
		self.annotation.hash(state);
	}
}

impl PartialOrd for BaseKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for BaseKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.sort_key()
			.cmp(&other.sort_key())
			.then_with(|| self.type_id.cmp(&other.type_id))
			.then_with(|| {
				self.annotation
					.map(|a| a.id)
					.cmp(&other.annotation.map(|a| a.id))
			})
	}
}

impl fmt::Display for BaseKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.annotation {
			Some(annotation) => write!(f, "{} @{}", self.type_name, annotation.name),
			None => f.write_str(self.type_name),
		}
	}
}

impl fmt::Debug for BaseKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

/// Identity of a bindable entity.
///
/// Equal iff type, annotation and mutability all match.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
	base: BaseKey,
	mutability: Mutability,
}

impl TypeKey {
	/// Mutable, unannotated key for `T`.
	pub fn of<T: ?Sized + 'static>() -> Self {
		BaseKey::of::<T>().with_mutability(Mutability::Mutable)
	}

	/// Read-only, unannotated key for `T`.
	pub fn read_only<T: ?Sized + 'static>() -> Self {
		BaseKey::of::<T>().with_mutability(Mutability::ReadOnly)
	}

	/// Tags this key with the annotation type `A`.
	pub fn annotated<A: ?Sized + 'static>(mut self) -> Self {
		self.base.annotation = Some(Annotation::of::<A>());
		self
	}

	pub fn with_mutability(mut self, mutability: Mutability) -> Self {
		self.mutability = mutability;
		self
	}

	pub fn as_read_only(self) -> Self {
		self.with_mutability(Mutability::ReadOnly)
	}

	pub fn as_mutable(self) -> Self {
		self.with_mutability(Mutability::Mutable)
	}

	pub fn base(&self) -> BaseKey {
		self.base
	}

	pub fn mutability(&self) -> Mutability {
		self.mutability
	}

	pub fn type_id(&self) -> TypeId {
		self.base.type_id
	}

	pub fn type_name(&self) -> &'static str {
		self.base.type_name
	}

	pub fn annotation(&self) -> Option<Annotation> {
		self.base.annotation
	}

	/// True if `T` is the Rust type behind this key.
	pub fn is<T: ?Sized + 'static>(&self) -> bool {
		self.base.type_id == TypeId::of::<T>()
	}
}

impl PartialOrd for TypeKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TypeKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.base
			.cmp(&other.base)
			.then(self.mutability.cmp(&other.mutability))
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.mutability {
			Mutability::ReadOnly => write!(f, "const {}", self.base),
			Mutability::Mutable => fmt::Display::fmt(&self.base, f),
		}
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}
