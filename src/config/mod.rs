//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → SenderConfig (validated, immutable)
//!     → handed to transports, parser and dispatcher as plain values
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a batch starts
//! - All fields have defaults so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClientConfig, DispatchConfig, LogFormat, LoggingConfig, ObservabilityConfig, RequestConfig,
    SenderConfig, SocketConfig, TimeoutConfig, TransportKind,
};
pub use validation::{validate_config, ValidationError};
