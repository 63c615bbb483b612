//! Error types for graph composition and injection

use crate::key::TypeKey;
use std::fmt;

/// Result type used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;

/// Composition and injection errors.
///
/// Build-time variants abort [`GraphBuilder::build`](crate::GraphBuilder::build)
/// and no partial graph is returned. The remaining variants are raised by the
/// [`Injector`](crate::Injector) at runtime.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DiError {
	/// A required key has no contributing binding reachable from the root.
	#[error("no binding found for {0}")]
	NoBindingFound(TypeKey),

	/// Only a read-only provision exists for a mutable requirement.
	#[error(
		"{0} is required as mutable, but it is only provided as read-only by the installed components"
	)]
	MutableRequiredButReadOnlyProvided(TypeKey),

	/// A component declared a read-only requirement that a merged child
	/// contradicts by requiring it mutably.
	#[error(
		"{0} is declared as a read-only requirement, but one of the installed components requires it as mutable"
	)]
	ReadOnlyDeclaredButMutableRequired(TypeKey),

	/// An installation call reappeared on the open call stack.
	#[error("component installation loop detected\n{0}")]
	CycleDetected(InstallationTrace),

	/// Installation arguments or the component function cannot be used for
	/// memoization.
	#[error("invalid installation of {function}: {reason}")]
	InvalidInstallationArguments {
		function: String,
		reason: String,
	},

	/// Two different non-multibinding contributions target the same key.
	#[error("multiple bindings found for {0}")]
	DuplicateBinding(TypeKey),

	/// Binding dependencies form a loop.
	#[error("dependency loop detected: {}", format_path(.0))]
	DependencyCycle(Vec<TypeKey>),

	/// Installations nested deeper than the configured limit.
	#[error("maximum component installation depth exceeded: {0}")]
	MaxDepthExceeded(usize),

	/// A replacement was registered after its target had already been expanded.
	#[error(
		"cannot replace {replaced} with {replacement}: the replaced component was already installed"
	)]
	ReplacementAfterInstallation {
		replaced: String,
		replacement: String,
	},

	/// The same component was replaced with two different replacements.
	#[error("{replaced} is replaced with both {first} and {second}")]
	IncompatibleReplacements {
		replaced: String,
		first: String,
		second: String,
	},

	/// Following replacements leads back to a component already in the chain.
	#[error("component replacements form a loop: {}", .0.join(" -> "))]
	ReplacementLoop(Vec<String>),

	/// Invalid build configuration.
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Misuse: the key is outside the root's declared provided set.
	#[error("{0} is not exposed by the injector's root component")]
	KeyNotExposed(TypeKey),

	/// A provider asked for a key it did not declare as a dependency.
	#[error("{0} was not declared as a dependency of this provider")]
	UndeclaredDependency(TypeKey),

	/// Typed access with a Rust type that does not match the key.
	#[error("{key} does not hold a value of type {requested}")]
	TypeMismatch {
		key: TypeKey,
		requested: &'static str,
	},
}

impl DiError {
	/// True for the variants raised while composing a graph.
	pub fn is_build_error(&self) -> bool {
		!matches!(
			self,
			DiError::KeyNotExposed(_)
				| DiError::UndeclaredDependency(_)
				| DiError::TypeMismatch { .. }
		)
	}
}

fn format_path(path: &[TypeKey]) -> String {
	path.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(" -> ")
}

/// One installation call in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
	/// Name of the component-producing function.
	pub function: &'static str,
	/// Rendered argument tuple, empty for functions without arguments.
	pub arguments: String,
}

impl TraceEntry {
	/// `function(arguments)`.
	pub fn display_signature(&self) -> String {
		format!("{}({})", self.function, self.arguments)
	}
}

/// Ordered list of installation calls ending in a loop.
///
/// `entries` runs from the root to the rediscovered call; `loop_start` is the
/// index of the first occurrence of the repeated call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationTrace {
	pub entries: Vec<TraceEntry>,
	pub loop_start: usize,
}

impl InstallationTrace {
	/// The calls that form the loop, first occurrence through repetition.
	pub fn loop_entries(&self) -> &[TraceEntry] {
		&self.entries[self.loop_start.min(self.entries.len())..]
	}
}

impl fmt::Display for InstallationTrace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(
			f,
			"Component installation trace (from top-level to the most deeply-nested):"
		)?;
		for (index, entry) in self.entries.iter().enumerate() {
			if index == self.loop_start {
				writeln!(f, "<-- The loop starts here")?;
			}
			writeln!(f, "{}", entry.display_signature())?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn entry(function: &'static str) -> TraceEntry {
		TraceEntry {
			function,
			arguments: String::new(),
		}
	}

	#[rstest]
	fn test_trace_marks_loop_start() {
		// Arrange
		let trace = InstallationTrace {
			entries: vec![entry("x"), entry("y"), entry("z"), entry("y")],
			loop_start: 1,
		};

		// Act
		let rendered = trace.to_string();

		// Assert
		assert_eq!(
			rendered,
			"Component installation trace (from top-level to the most deeply-nested):\n\
			 x()\n\
			 <-- The loop starts here\n\
			 y()\n\
			 z()\n\
			 y()\n"
		);
		assert_eq!(trace.loop_entries().len(), 3);
	}

	#[rstest]
	fn test_runtime_errors_are_not_build_errors() {
		let key = TypeKey::of::<u8>();
		assert!(DiError::NoBindingFound(key).is_build_error());
		assert!(!DiError::KeyNotExposed(key).is_build_error());
	}
}
