//! Binding registry tests: duplicates, identical bindings, dependency loops,
//! build configuration

use bindery_di::{
	BindingGraph, BuildConfig, Component, Dependencies, DiError, DiResult, GraphBuilder, Inject,
	InstallationCall, TypeKey,
};
use rstest::rstest;
use std::sync::Arc;

struct Engine;

impl Inject for Engine {
	fn construct(_deps: &Dependencies<'_>) -> DiResult<Self> {
		Ok(Engine)
	}
}

fn first_port() -> Component {
	Component::builder()
		.provides(TypeKey::of::<u16>())
		.bind_instance(TypeKey::of::<u16>(), Arc::new(80u16))
		.build()
}

fn second_port() -> Component {
	Component::builder()
		.provides(TypeKey::of::<u16>())
		.bind_instance(TypeKey::of::<u16>(), Arc::new(443u16))
		.build()
}

#[rstest]
fn test_two_different_bindings_for_one_key() {
	fn root() -> Component {
		Component::builder()
			.provides(TypeKey::of::<u16>())
			.install(first_port)
			.install(second_port)
			.build()
	}

	assert!(matches!(
		BindingGraph::build(root),
		Err(DiError::DuplicateBinding(key)) if key == TypeKey::of::<u16>()
	));
}

// The same component function with different arguments registers the same
// constructor; those registrations are one binding.
fn engine_variant(_variant: u8) -> Component {
	Component::builder()
		.provides(TypeKey::of::<Engine>())
		.register_constructor::<Engine>()
		.add_multibinding_provider(TypeKey::of::<&'static str>(), vec![], |_| Ok("variant"))
		.build()
}

#[rstest]
fn test_identical_bindings_from_distinct_installations() {
	fn root() -> Component {
		Component::builder()
			.provides(TypeKey::of::<Engine>())
			.install_with(engine_variant, 1)
			.install_with(engine_variant, 2)
			.build()
	}

	// Act
	let graph = BindingGraph::build(root).unwrap();

	// Assert: one engine binding, but each installation keeps its
	// multibinding contribution
	assert_eq!(graph.binding_count(), 1);
	assert_eq!(graph.multibinding_count(), 2);
}

struct Version(u32);

// Each installation registers a provider closure holding its own argument
fn versioned(version: u32) -> Component {
	Component::builder()
		.provides(TypeKey::of::<Version>())
		.register_provider(TypeKey::of::<Version>(), vec![], move |_| Ok(Version(version)))
		.build()
}

#[rstest]
fn test_capturing_providers_from_distinct_installations_conflict() {
	fn root() -> Component {
		Component::builder()
			.provides(TypeKey::of::<Version>())
			.install_with(versioned, 1)
			.install_with(versioned, 2)
			.build()
	}

	// Act
	let result = BindingGraph::build(root);

	// Assert
	assert!(matches!(
		result,
		Err(DiError::DuplicateBinding(key)) if key == TypeKey::of::<Version>()
	));
}

#[rstest]
fn test_capturing_provider_installed_once_resolves() {
	// Arrange
	let injector = bindery_di::Injector::from_component(|| {
		Component::builder()
			.provides(TypeKey::of::<Version>())
			.install_with(versioned, 3)
			.build()
	})
	.unwrap();

	// Act
	let version = injector.get::<Version>(&TypeKey::of::<Version>()).unwrap();

	// Assert
	assert_eq!(version.0, 3);
}

#[rstest]
fn test_same_instance_bound_twice_is_one_binding() {
	fn shared_component(port: u16) -> Component {
		static SHARED: std::sync::OnceLock<Arc<u16>> = std::sync::OnceLock::new();
		let value = SHARED.get_or_init(|| Arc::new(port)).clone();
		Component::builder()
			.provides(TypeKey::of::<u16>())
			.bind_instance(TypeKey::of::<u16>(), value)
			.build()
	}

	fn root() -> Component {
		Component::builder()
			.provides(TypeKey::of::<u16>())
			.install_with(shared_component, 1)
			.install_with(shared_component, 2)
			.build()
	}

	assert!(BindingGraph::build(root).is_ok());
}

struct Chicken;
struct Egg;

fn chicken_and_egg() -> Component {
	Component::builder()
		.provides(TypeKey::of::<u8>())
		.bind_instance(TypeKey::of::<u8>(), Arc::new(0u8))
		.register_provider(TypeKey::of::<Chicken>(), vec![TypeKey::of::<Egg>()], |_| {
			Ok(Chicken)
		})
		.register_provider(
			TypeKey::of::<Egg>(),
			vec![TypeKey::read_only::<Chicken>()],
			|_| Ok(Egg),
		)
		.build()
}

#[rstest]
fn test_dependency_loop_is_rejected() {
	// Act
	let result = BindingGraph::build(chicken_and_egg);

	// Assert
	match result {
		Err(DiError::DependencyCycle(path)) => {
			assert_eq!(path.len(), 3);
			assert_eq!(path.first().map(TypeKey::base), path.last().map(TypeKey::base));
		}
		other => panic!(
			"Expected DependencyCycle, got {:?}",
			other.map(|g| g.binding_count())
		),
	}
}

#[rstest]
fn test_dependency_loop_check_can_be_disabled() {
	// Arrange
	let config = BuildConfig::from_toml_str("check_dependency_cycles = false").unwrap();
	let builder = GraphBuilder::new(config);

	// Act
	let graph = builder.build(InstallationCall::new(chicken_and_egg).unwrap());

	// Assert
	assert_eq!(graph.unwrap().binding_count(), 3);
}

fn nested(depth: usize) -> Component {
	if depth == 0 {
		Component::builder().build()
	} else {
		Component::builder().install_with(nested, depth - 1).build()
	}
}

#[rstest]
#[case(9, true)]
#[case(10, false)]
fn test_installation_depth_limit_from_config(#[case] depth: usize, #[case] ok: bool) {
	// Arrange
	let config = BuildConfig::from_toml_str("max_installation_depth = 10").unwrap();
	let builder = GraphBuilder::new(config);

	// Act
	let result = builder.build(InstallationCall::with_args(nested, depth).unwrap());

	// Assert
	if ok {
		assert!(result.is_ok());
	} else {
		assert!(matches!(result, Err(DiError::MaxDepthExceeded(11))));
	}
}

#[rstest]
fn test_default_depth_limit_allows_deep_nesting() {
	assert!(BindingGraph::build_with(nested, 99usize).is_ok());
	assert!(matches!(
		BindingGraph::build_with(nested, 100usize),
		Err(DiError::MaxDepthExceeded(101))
	));
}

#[rstest]
fn test_outermost_missing_binding_is_reported() {
	struct Unbound;
	struct Internal;

	fn careless() -> Component {
		Component::builder()
			.register_provider(TypeKey::of::<u32>(), vec![TypeKey::of::<Internal>()], |_| {
				Ok(1u32)
			})
			.build()
	}

	fn root() -> Component {
		Component::builder()
			.provides(TypeKey::of::<Unbound>())
			.install(careless)
			.build()
	}

	assert!(matches!(
		BindingGraph::build(root),
		Err(DiError::NoBindingFound(key)) if key == TypeKey::of::<Unbound>()
	));
}

#[rstest]
fn test_exposed_keys_follow_root_signature() {
	fn root() -> Component {
		Component::builder()
			.provides(TypeKey::read_only::<Engine>())
			.register_constructor::<Engine>()
			.build()
	}

	let graph = BindingGraph::build(root).unwrap();
	assert_eq!(
		graph.exposed_keys().iter().copied().collect::<Vec<_>>(),
		vec![TypeKey::read_only::<Engine>()]
	);
}
