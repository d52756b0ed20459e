//! ---
//! gd_section: "01-core-functionality"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Shared primitives and utilities for the geo-data runtime."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
//! Shared primitives for the geo-data workspace: configuration loading and
//! tracing initialisation consumed by the engine and the control CLI.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, EngineConfig, LoadedAppConfig, LoggingConfig, MissingCountryPolicy, StoreConfig,
    SweepVisibility,
};
pub use logging::{init_stderr, init_tracing, LogFormat};
