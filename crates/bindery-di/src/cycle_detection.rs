//! Installation loop detection
//!
//! Tracks the installation calls currently being expanded, from the root down
//! to the most deeply nested one. Expansion runs on an explicit work stack, so
//! this state is an ordinary value owned by one build rather than anything
//! thread- or task-local.
//!
//! ## Features
//!
//! - **O(1) loop check**: open calls are indexed by value
//! - **Any position**: a call repeated anywhere on the stack is a loop, not
//!   just one repeated at the top
//! - **Full trace**: the error lists every open call plus the rediscovered
//!   one, with the first occurrence marked

use crate::error::InstallationTrace;
use crate::install::CallKey;
use crate::DiError;
use std::collections::HashMap;

/// Open installation calls of one build.
#[derive(Debug, Default)]
pub struct InstallationStack {
	/// Position of each open call in `path`
	open: HashMap<CallKey, usize>,
	/// Open calls, root first
	path: Vec<CallKey>,
}

impl InstallationStack {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fails with [`DiError::CycleDetected`] if `call` is already open.
	pub fn check(&self, call: &CallKey) -> Result<(), DiError> {
		match self.open.get(call) {
			Some(&position) => Err(DiError::CycleDetected(self.trace(call, position))),
			None => Ok(()),
		}
	}

	/// Marks `call` as being expanded.
	pub fn push(&mut self, call: CallKey) {
		self.open.insert(call.clone(), self.path.len());
		self.path.push(call);
	}

	/// Closes the most deeply nested open call.
	pub fn pop(&mut self) -> Option<CallKey> {
		let call = self.path.pop()?;
		self.open.remove(&call);
		Some(call)
	}

	pub fn depth(&self) -> usize {
		self.path.len()
	}

	pub fn contains(&self, call: &CallKey) -> bool {
		self.open.contains_key(call)
	}

	fn trace(&self, repeated: &CallKey, loop_start: usize) -> InstallationTrace {
		let mut entries: Vec<_> = self.path.iter().map(CallKey::trace_entry).collect();
		entries.push(repeated.trace_entry());
		InstallationTrace {
			entries,
			loop_start,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Component, InstallationCall};
	use rstest::rstest;

	fn component_a() -> Component {
		Component::builder().build()
	}

	fn component_b() -> Component {
		Component::builder().build()
	}

	fn component_c() -> Component {
		Component::builder().build()
	}

	fn numbered(_n: usize) -> Component {
		Component::builder().build()
	}

	fn key_of(call: crate::DiResult<InstallationCall>) -> CallKey {
		call.unwrap().key().clone()
	}

	#[rstest]
	fn test_simple_cycle_detection() {
		// Arrange
		let mut stack = InstallationStack::new();
		let a = key_of(InstallationCall::new(component_a));

		// Act
		stack.check(&a).unwrap();
		stack.push(a.clone());

		// Assert: expanding A again while it is open is a loop
		assert!(matches!(stack.check(&a), Err(DiError::CycleDetected(_))));

		// Act: close A
		stack.pop();

		// Assert: once closed, A can be expanded again
		assert!(stack.check(&a).is_ok());
	}

	#[rstest]
	fn test_depth_tracking() {
		// Arrange
		let mut stack = InstallationStack::new();

		// Act & Assert
		for n in 0..3 {
			stack.push(key_of(InstallationCall::with_args(numbered, n)));
			assert_eq!(stack.depth(), n + 1);
		}
		for n in (0..3).rev() {
			stack.pop();
			assert_eq!(stack.depth(), n);
		}
		assert!(stack.pop().is_none());
	}

	#[rstest]
	fn test_detection_at_deep_depth() {
		// Arrange
		let mut stack = InstallationStack::new();
		for n in 0..60 {
			stack.push(key_of(InstallationCall::with_args(numbered, n)));
		}

		// Act
		let repeated = key_of(InstallationCall::with_args(numbered, 55));
		let result = stack.check(&repeated);

		// Assert
		match result {
			Err(DiError::CycleDetected(trace)) => {
				assert_eq!(trace.loop_start, 55);
				assert_eq!(trace.entries.len(), 61);
				assert_eq!(trace.loop_entries().len(), 6);
			}
			other => panic!("Expected CycleDetected, got {:?}", other),
		}
	}

	#[rstest]
	fn test_cycle_trace_lists_intermediate_calls() {
		// Arrange
		let mut stack = InstallationStack::new();
		let a = key_of(InstallationCall::new(component_a));
		let b = key_of(InstallationCall::new(component_b));
		let c = key_of(InstallationCall::new(component_c));

		// Act: A -> B -> C -> B
		stack.push(a);
		stack.push(b.clone());
		stack.push(c);
		let result = stack.check(&b);

		// Assert
		match result {
			Err(DiError::CycleDetected(trace)) => {
				let names: Vec<_> = trace
					.entries
					.iter()
					.map(|entry| entry.function.rsplit("::").next().unwrap_or_default())
					.collect();
				assert_eq!(
					names,
					vec!["component_a", "component_b", "component_c", "component_b"]
				);
				assert_eq!(trace.loop_start, 1);
			}
			other => panic!("Expected CycleDetected, got {:?}", other),
		}
	}

	#[rstest]
	fn test_different_arguments_are_not_a_loop() {
		// Arrange
		let mut stack = InstallationStack::new();
		stack.push(key_of(InstallationCall::with_args(numbered, 1)));

		// Act
		let result = stack.check(&key_of(InstallationCall::with_args(numbered, 2)));

		// Assert
		assert!(result.is_ok());
	}
}
