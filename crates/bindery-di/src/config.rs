//! Build configuration
//!
//! ```
//! use bindery_di::BuildConfig;
//!
//! let config = BuildConfig::from_toml_str("max_installation_depth = 16").unwrap();
//! assert_eq!(config.max_installation_depth, 16);
//! assert!(config.check_dependency_cycles);
//! ```

use crate::{DiError, DiResult};
use serde::Deserialize;

/// Default nesting limit for component installations.
pub const DEFAULT_MAX_INSTALLATION_DEPTH: usize = 100;

/// Knobs for one graph build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
	/// Installations nested deeper than this fail with
	/// [`DiError::MaxDepthExceeded`].
	pub max_installation_depth: usize,
	/// Reject graphs whose binding dependencies form a loop.
	pub check_dependency_cycles: bool,
}

impl Default for BuildConfig {
	fn default() -> Self {
		Self {
			max_installation_depth: DEFAULT_MAX_INSTALLATION_DEPTH,
			check_dependency_cycles: true,
		}
	}
}

impl BuildConfig {
	pub fn with_max_installation_depth(mut self, depth: usize) -> Self {
		self.max_installation_depth = depth;
		self
	}

	pub fn with_dependency_cycle_check(mut self, enabled: bool) -> Self {
		self.check_dependency_cycles = enabled;
		self
	}

	/// Parses a configuration from TOML. Missing fields keep their defaults.
	pub fn from_toml_str(source: &str) -> DiResult<Self> {
		let config: BuildConfig =
			toml::from_str(source).map_err(|e| DiError::Config(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> DiResult<()> {
		if self.max_installation_depth == 0 {
			return Err(DiError::Config(
				"max_installation_depth must be at least 1".to_string(),
			));
		}
		Ok(())
	}
}
