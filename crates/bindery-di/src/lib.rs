//! # Bindery Dependency Injection
//!
//! Composes component descriptions into a validated binding graph and
//! resolves instances from it.
//!
//! ## Features
//!
//! - **Keyed**: bindings are identified by type, optional annotation and
//!   mutability
//! - **Composable**: components install other components, with arguments
//! - **Deduplicated**: the same installation reached twice is expanded once
//! - **Checked**: installation loops, missing bindings, duplicate bindings and
//!   mutability violations are reported before any instance exists
//! - **Lazy**: singletons are constructed on first use, at most once
//!
//! ## Development Tools (dev-tools feature)
//!
//! - **Visualization**: render a finished graph in DOT format for Graphviz
//!
//! ## Example
//!
//! ```rust
//! use bindery_di::{Component, Dependencies, DiResult, Inject, Injector, TypeKey};
//! use std::sync::Arc;
//!
//! struct Settings {
//!     name: &'static str,
//! }
//!
//! struct Greeter {
//!     settings: Arc<Settings>,
//! }
//!
//! impl Inject for Greeter {
//!     fn dependencies() -> Vec<TypeKey> {
//!         vec![TypeKey::read_only::<Settings>()]
//!     }
//!
//!     fn construct(deps: &Dependencies<'_>) -> DiResult<Self> {
//!         Ok(Greeter {
//!             settings: deps.get::<Settings>()?,
//!         })
//!     }
//! }
//!
//! fn greeter_component() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::of::<Greeter>())
//!         .requires(TypeKey::read_only::<Settings>())
//!         .register_constructor::<Greeter>()
//!         .build()
//! }
//!
//! fn root_component() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::of::<Greeter>())
//!         .bind_instance(TypeKey::of::<Settings>(), Arc::new(Settings { name: "world" }))
//!         .install(greeter_component)
//!         .build()
//! }
//!
//! let injector = Injector::from_component(root_component).unwrap();
//! let greeter = injector.get::<Greeter>(&TypeKey::of::<Greeter>()).unwrap();
//! assert_eq!(greeter.settings.name, "world");
//! ```

pub mod binding;
pub mod component;
pub mod config;
pub mod covariance;
pub mod cycle_detection;
pub mod error;
mod expansion;
pub mod graph;
pub mod injector;
pub mod install;
pub mod key;
mod registry;
pub mod scope;

// Development tools
#[cfg(feature = "dev-tools")]
pub mod visualization;

pub use binding::{Binding, BindingOrigin, Dependencies, Inject, Instance, Provider};
pub use component::{Component, ComponentBuilder, ReplacementBuilder, Signature};
pub use config::{BuildConfig, DEFAULT_MAX_INSTALLATION_DEPTH};
pub use covariance::{check_requirements, MutabilityMap, Violation};
pub use cycle_detection::InstallationStack;
pub use error::{DiError, DiResult, InstallationTrace, TraceEntry};
pub use graph::{BindingGraph, GraphBuilder};
pub use injector::Injector;
pub use install::{CallKey, FunctionId, InstallArgs, InstallationCall};
pub use key::{Annotation, BaseKey, Mutability, TypeKey};
pub use scope::{MultibindingScope, Scope, SingletonScope};
