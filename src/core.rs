// src/core.rs
pub mod activations;

// Re-export commonly used items
pub use activations::{build_activation_layer, Activation, ActivationCfg};
