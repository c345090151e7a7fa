//! Shannon's Demon - Main Library
//!
//! Inventory-rebalancing market maker for Binance spot pairs.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runner)
//! - **demon**: Core logic (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```no_run
//! use shannons_demon::bin_common::config_path_from_process;
//! use shannons_demon::demon::DemonConfig;
//!
//! let (path, _) = config_path_from_process();
//! let config = DemonConfig::load(path);
//! ```

// Re-export workspace libraries for convenience
pub use demon;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{
        config_path_from_process, resolve_config_path, ConfigSource, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
    };
    pub use runner::{print_banner, print_shutdown, run_strategy};
}
