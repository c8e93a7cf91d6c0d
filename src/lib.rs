pub mod config;
pub mod core;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod utils;

// Re-export types
pub use crate::config::{Config, Value};
pub use crate::core::{build_activation_layer, Activation, ActivationCfg};
pub use crate::error::{BuildError, Result};
pub use crate::registry::Registry;
pub use crate::utils::set_random_seed;
