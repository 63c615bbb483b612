//! Binding graph visualization for development and debugging
//!
//! Renders a finished [`BindingGraph`] in DOT format, which can be fed to
//! Graphviz.
//!
//! ## Example
//!
//! ```rust
//! use bindery_di::visualization::DependencyGraph;
//! use bindery_di::{BindingGraph, Component, TypeKey};
//! use std::sync::Arc;
//!
//! fn root() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::of::<u16>())
//!         .bind_instance(TypeKey::of::<u16>(), Arc::new(8080u16))
//!         .build()
//! }
//!
//! let graph = DependencyGraph::from_binding_graph(&BindingGraph::build(root).unwrap());
//! assert!(graph.to_dot().contains("u16"));
//! ```

use crate::graph::BindingGraph;
use indexmap::IndexMap;

/// Kind of a node, used for coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Singleton,
	Transient,
	Multibinding,
}

impl NodeKind {
	fn color(self) -> &'static str {
		match self {
			NodeKind::Singleton => "lightblue",
			NodeKind::Transient => "lightyellow",
			NodeKind::Multibinding => "lightgreen",
		}
	}
}

/// A node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
	/// Rendered key
	pub name: String,
	pub kind: NodeKind,
	/// Whether the root component exposes this key
	pub exposed: bool,
}

/// Dependency graph for visualization
#[derive(Debug, Default)]
pub struct DependencyGraph {
	nodes: IndexMap<String, GraphNode>,
	edges: Vec<(String, String)>,
}

impl DependencyGraph {
	/// Collects one node per binding and per multibinding set, with an edge
	/// for every declared dependency.
	pub fn from_binding_graph(graph: &BindingGraph) -> Self {
		let mut output = Self::default();

		for binding in graph.bindings() {
			let name = binding.base().to_string();
			let kind = match binding.scope() {
				crate::Scope::Singleton => NodeKind::Singleton,
				crate::Scope::Transient => NodeKind::Transient,
			};
			output.add_node(name.clone(), kind, graph.is_exposed(&binding.key().as_read_only()));
			for dependency in binding.dependencies() {
				output
					.edges
					.push((name.clone(), dependency.base().to_string()));
			}
		}

		for (base, contributions) in graph.multibinding_sets() {
			let name = format!("[{}]", base);
			output.add_node(name.clone(), NodeKind::Multibinding, false);
			for dependency in contributions.iter().flat_map(|c| c.dependencies()) {
				output
					.edges
					.push((name.clone(), dependency.base().to_string()));
			}
		}

		output
	}

	fn add_node(&mut self, name: String, kind: NodeKind, exposed: bool) {
		self.nodes.insert(
			name.clone(),
			GraphNode {
				name,
				kind,
				exposed,
			},
		);
	}

	pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
		self.nodes.values()
	}

	pub fn edges(&self) -> &[(String, String)] {
		&self.edges
	}

	/// Generate DOT format output for Graphviz
	pub fn to_dot(&self) -> String {
		let mut output = String::from("digraph BindingGraph {\n");
		output.push_str("  rankdir=LR;\n");
		output.push_str("  node [shape=box, style=rounded];\n\n");

		for node in self.nodes.values() {
			let peripheries = if node.exposed { 2 } else { 1 };
			output.push_str(&format!(
				"  \"{}\" [label=\"{}\", fillcolor={}, style=filled, peripheries={}];\n",
				escape(&node.name),
				escape(&node.name),
				node.kind.color(),
				peripheries
			));
		}

		output.push('\n');

		for (from, to) in &self.edges {
			output.push_str(&format!("  \"{}\" -> \"{}\";\n", escape(from), escape(to)));
		}

		output.push_str("}\n");
		output
	}

	/// Get statistics about the dependency graph
	pub fn statistics(&self) -> GraphStatistics {
		let count = |kind: NodeKind| self.nodes.values().filter(|n| n.kind == kind).count();
		GraphStatistics {
			node_count: self.nodes.len(),
			edge_count: self.edges.len(),
			singleton_count: count(NodeKind::Singleton),
			transient_count: count(NodeKind::Transient),
			multibinding_count: count(NodeKind::Multibinding),
		}
	}
}

fn escape(name: &str) -> String {
	name.replace('"', "\\\"")
}

/// Statistics about a dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStatistics {
	/// Total number of nodes
	pub node_count: usize,
	/// Total number of edges
	pub edge_count: usize,
	/// Number of singleton bindings
	pub singleton_count: usize,
	/// Number of transient bindings
	pub transient_count: usize,
	/// Number of multibinding sets
	pub multibinding_count: usize,
}
