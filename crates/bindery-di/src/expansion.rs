//! Installation memoizer
//!
//! Expands a root installation call into the tree of components it installs,
//! depth-first in declaration order. The walk uses an explicit work stack
//! with end markers instead of native recursion, so the loop check runs
//! before every component function is invoked and stack depth does not
//! depend on how deeply components nest.
//!
//! A call that already completed is not invoked again; the parent is linked
//! to the existing node instead. A call that is still open is a loop.

use crate::component::{Component, Installation, Replacement};
use crate::config::BuildConfig;
use crate::cycle_detection::InstallationStack;
use crate::install::{CallKey, InstallationCall, Rejection};
use crate::{DiError, DiResult};
use std::collections::{HashMap, HashSet};

/// One expanded installation.
#[derive(Debug)]
pub(crate) struct ExpandedComponent {
	pub(crate) call: CallKey,
	pub(crate) component: Component,
	/// Indexes into [`Expansion::nodes`], in declaration order. Deduplicated
	/// installations point at the node that was expanded first.
	pub(crate) children: Vec<usize>,
}

/// Every distinct installation reachable from the root, in first-expansion
/// order. `nodes[0]` is the root.
#[derive(Debug)]
pub(crate) struct Expansion {
	pub(crate) nodes: Vec<ExpandedComponent>,
}

enum Work {
	Expand {
		call: InstallationCall,
		parent: Option<usize>,
	},
	Reject(Rejection),
	Finish,
}

pub(crate) struct Expander<'a> {
	config: &'a BuildConfig,
	stack: InstallationStack,
	open_nodes: Vec<usize>,
	completed: HashMap<CallKey, usize>,
	replacements: HashMap<CallKey, InstallationCall>,
	nodes: Vec<ExpandedComponent>,
}

impl<'a> Expander<'a> {
	pub(crate) fn new(config: &'a BuildConfig) -> Self {
		Self {
			config,
			stack: InstallationStack::new(),
			open_nodes: Vec::new(),
			completed: HashMap::new(),
			replacements: HashMap::new(),
			nodes: Vec::new(),
		}
	}

	pub(crate) fn expand(mut self, root: InstallationCall) -> DiResult<Expansion> {
		let mut work = vec![Work::Expand {
			call: root,
			parent: None,
		}];

		while let Some(item) = work.pop() {
			match item {
				Work::Finish => {
					if let (Some(call), Some(index)) = (self.stack.pop(), self.open_nodes.pop()) {
						self.completed.insert(call, index);
					}
				}
				Work::Reject(rejection) => return Err(rejection.into()),
				Work::Expand { call, parent } => {
					let call = self.resolve_replacements(call)?;
					let key = call.key().clone();

					if let Some(&index) = self.completed.get(&key) {
						tracing::debug!(component = %key, "installation already expanded, reusing it");
						self.link(parent, index);
						continue;
					}

					self.stack.check(&key)?;
					let depth = self.stack.depth() + 1;
					if depth > self.config.max_installation_depth {
						return Err(DiError::MaxDepthExceeded(depth));
					}

					tracing::debug!(component = %key, depth, "expanding component");
					let component = call.invoke();
					let index = self.nodes.len();
					self.link(parent, index);

					for replacement in component.replacements() {
						self.register_replacement(replacement)?;
					}

					work.push(Work::Finish);
					for installation in component.installations().iter().rev() {
						match installation {
							Installation::Call(child) => work.push(Work::Expand {
								call: child.clone(),
								parent: Some(index),
							}),
							Installation::Rejected(rejection) => {
								work.push(Work::Reject(rejection.clone()))
							}
						}
					}

					self.nodes.push(ExpandedComponent {
						call: key.clone(),
						component,
						children: Vec::new(),
					});
					self.stack.push(key);
					self.open_nodes.push(index);
				}
			}
		}

		Ok(Expansion { nodes: self.nodes })
	}

	fn link(&mut self, parent: Option<usize>, child: usize) {
		if let Some(node) = parent.and_then(|parent| self.nodes.get_mut(parent)) {
			node.children.push(child);
		}
	}

	fn is_expanded(&self, key: &CallKey) -> bool {
		self.completed.contains_key(key) || self.stack.contains(key)
	}

	fn register_replacement(&mut self, replacement: &Replacement) -> DiResult<()> {
		let target = as_call(&replacement.target)?;
		let with = as_call(&replacement.replacement)?;

		if self.is_expanded(target.key()) {
			return Err(DiError::ReplacementAfterInstallation {
				replaced: target.key().to_string(),
				replacement: with.key().to_string(),
			});
		}

		match self.replacements.get(target.key()) {
			Some(existing) if existing.key() != with.key() => {
				Err(DiError::IncompatibleReplacements {
					replaced: target.key().to_string(),
					first: existing.key().to_string(),
					second: with.key().to_string(),
				})
			}
			Some(_) => Ok(()),
			None => {
				self.replacements.insert(target.key().clone(), with.clone());
				Ok(())
			}
		}
	}

	/// Follows replacement chains until a call that is not replaced.
	fn resolve_replacements(&self, call: InstallationCall) -> DiResult<InstallationCall> {
		let mut current = call;
		let mut seen = HashSet::new();
		let mut chain = vec![current.key().to_string()];
		seen.insert(current.key().clone());

		while let Some(next) = self.replacements.get(current.key()) {
			tracing::debug!(
				replaced = %current.key(),
				replacement = %next.key(),
				"applying component replacement"
			);
			chain.push(next.key().to_string());
			if !seen.insert(next.key().clone()) {
				return Err(DiError::ReplacementLoop(chain));
			}
			current = next.clone();
		}
		Ok(current)
	}
}

fn as_call(installation: &Installation) -> DiResult<&InstallationCall> {
	match installation {
		Installation::Call(call) => Ok(call),
		Installation::Rejected(rejection) => Err(rejection.clone().into()),
	}
}
