//! # Bindery
//!
//! Component-based dependency injection. Components declare what they
//! provide and what they require, install each other, and are composed into
//! a validated binding graph before any instance is constructed.
//!
//! This crate re-exports [`bindery_di`].
//!
//! ## Feature Flags
//!
//! - `dev-tools` - DOT rendering of finished binding graphs
//!
//! ## Quick Example
//!
//! ```rust
//! use bindery::{Component, Injector, TypeKey};
//! use std::sync::Arc;
//!
//! fn root() -> Component {
//!     Component::builder()
//!         .provides(TypeKey::read_only::<u16>())
//!         .bind_instance(TypeKey::of::<u16>(), Arc::new(8080u16))
//!         .build()
//! }
//!
//! let injector = Injector::from_component(root).unwrap();
//! assert_eq!(*injector.get::<u16>(&TypeKey::read_only::<u16>()).unwrap(), 8080);
//! ```

pub use bindery_di::*;
