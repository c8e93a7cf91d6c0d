pub use serde::{Deserialize, Serialize};
pub use std::fs::File;
pub use std::io::{Read, Write};

pub use ndarray::*;
pub use ndarray_rand::rand_distr::Uniform;
pub use ndarray_rand::RandomExt;

pub use crate::config::{Config, Value, TYPE_KEY};
pub use crate::error::*;
pub use crate::registry::Registry;

// Internal re-exports
pub use crate::core::{build_activation_layer, Activation, ActivationCfg};
pub use crate::utils::{random_uniform, set_random_seed};
