use crate::prelude::*;
use crate::utils::with_rng;
use rand::Rng;
use std::sync::OnceLock;

/// A built activation component. Opaque to the factory: the registry only
/// promises "constructible from a config", callers decide what to do with it.
/// `Debug` is part of the contract so built boxes show up in diagnostics.
pub trait Activation: std::fmt::Debug {
    fn forward(&self, z: Array2<f64>) -> Result<Array2<f64>>;
    fn name(&self) -> &'static str;
}

/// Typed form of an activation config. The mapping-based `Config` is only
/// used at the parsing boundary; builders convert to one of these variants
/// before constructing anything. Defaults match the PyTorch layers these
/// mirror.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ActivationCfg {
    Relu,
    LeakyRelu { negative_slope: f64 },
    PRelu { num_parameters: usize, init: f64 },
    RRelu { lower: f64, upper: f64 },
    Relu6,
}

impl ActivationCfg {
    pub fn build(&self) -> Result<Box<dyn Activation>> {
        Ok(match self {
            ActivationCfg::Relu => Box::new(Relu),
            ActivationCfg::LeakyRelu { negative_slope } => {
                Box::new(LeakyRelu::new(*negative_slope))
            }
            ActivationCfg::PRelu {
                num_parameters,
                init,
            } => Box::new(PRelu::new(*num_parameters, *init)?),
            ActivationCfg::RRelu { lower, upper } => Box::new(RRelu::new(*lower, *upper)?),
            ActivationCfg::Relu6 => Box::new(Relu6),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Relu;

impl Activation for Relu {
    fn forward(&self, z: Array2<f64>) -> Result<Array2<f64>> {
        Ok(z.mapv(|z| if z >= 0.0 { z } else { 0.0 }))
    }

    fn name(&self) -> &'static str {
        "ReLU"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct LeakyRelu {
    pub negative_slope: f64,
}

impl LeakyRelu {
    pub fn new(negative_slope: f64) -> Self {
        Self { negative_slope }
    }
}

impl Activation for LeakyRelu {
    fn forward(&self, z: Array2<f64>) -> Result<Array2<f64>> {
        let slope = self.negative_slope;
        Ok(z.mapv(|z| if z >= 0.0 { z } else { slope * z }))
    }

    fn name(&self) -> &'static str {
        "LeakyReLU"
    }
}

/// ReLU with a learnable slope on the negative side, one slope shared across
/// the input or one per channel (column).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PRelu {
    pub weight: Array1<f64>,
}

impl PRelu {
    pub fn new(num_parameters: usize, init: f64) -> Result<Self> {
        if num_parameters == 0 {
            return Err(BuildError::InvalidParameter(
                "num_parameters must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            weight: Array1::from_elem(num_parameters, init),
        })
    }
}

impl Activation for PRelu {
    fn forward(&self, z: Array2<f64>) -> Result<Array2<f64>> {
        if self.weight.len() == 1 {
            let slope = self.weight[0];
            return Ok(z.mapv(|z| if z >= 0.0 { z } else { slope * z }));
        }
        if self.weight.len() != z.ncols() {
            return Err(BuildError::ShapeMismatch(format!(
                "PReLU has {} parameters but the input has {} channels",
                self.weight.len(),
                z.ncols()
            )));
        }
        let mut out = z;
        for (mut col, &slope) in out.columns_mut().into_iter().zip(self.weight.iter()) {
            col.mapv_inplace(|v| if v >= 0.0 { v } else { slope * v });
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "PReLU"
    }
}

/// Randomized leaky ReLU. In training mode the negative-side slope is drawn
/// per element from U(lower, upper) using the process RNG; in eval mode the
/// mean slope is used, so eval forward passes are deterministic.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct RRelu {
    pub lower: f64,
    pub upper: f64,
    training: bool,
}

impl RRelu {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !(lower <= upper) {
            return Err(BuildError::InvalidParameter(format!(
                "lower bound {} must not exceed upper bound {}",
                lower, upper
            )));
        }
        Ok(Self {
            lower,
            upper,
            training: false,
        })
    }

    pub fn train(&mut self, mode: bool) {
        self.training = mode;
    }
}

impl Activation for RRelu {
    fn forward(&self, z: Array2<f64>) -> Result<Array2<f64>> {
        if self.training {
            let (lower, upper) = (self.lower, self.upper);
            Ok(with_rng(|rng| {
                z.mapv(|v| {
                    if v >= 0.0 {
                        v
                    } else {
                        v * rng.gen_range(lower..=upper)
                    }
                })
            }))
        } else {
            let slope = (self.lower + self.upper) / 2.0;
            Ok(z.mapv(|v| if v >= 0.0 { v } else { slope * v }))
        }
    }

    fn name(&self) -> &'static str {
        "RReLU"
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Relu6;

impl Activation for Relu6 {
    fn forward(&self, z: Array2<f64>) -> Result<Array2<f64>> {
        Ok(z.mapv(|z| z.clamp(0.0, 6.0)))
    }

    fn name(&self) -> &'static str {
        "ReLU6"
    }
}

fn build_relu(params: &mut Config) -> Result<Box<dyn Activation>> {
    params.expect_empty("ReLU")?;
    ActivationCfg::Relu.build()
}

fn build_leaky_relu(params: &mut Config) -> Result<Box<dyn Activation>> {
    let negative_slope = params.take_f64("negative_slope")?.unwrap_or(0.01);
    params.expect_empty("LeakyReLU")?;
    ActivationCfg::LeakyRelu { negative_slope }.build()
}

fn build_prelu(params: &mut Config) -> Result<Box<dyn Activation>> {
    let num_parameters = params.take_usize("num_parameters")?.unwrap_or(1);
    let init = params.take_f64("init")?.unwrap_or(0.25);
    params.expect_empty("PReLU")?;
    ActivationCfg::PRelu {
        num_parameters,
        init,
    }
    .build()
}

fn build_rrelu(params: &mut Config) -> Result<Box<dyn Activation>> {
    let lower = params.take_f64("lower")?.unwrap_or(1.0 / 8.0);
    let upper = params.take_f64("upper")?.unwrap_or(1.0 / 3.0);
    params.expect_empty("RReLU")?;
    ActivationCfg::RRelu { lower, upper }.build()
}

fn build_relu6(params: &mut Config) -> Result<Box<dyn Activation>> {
    params.expect_empty("ReLU6")?;
    ActivationCfg::Relu6.build()
}

/// The curated activation table.
pub fn registry() -> Result<Registry<Box<dyn Activation>>> {
    let mut registry = Registry::new();
    registry.register("ReLU", build_relu)?;
    registry.register("LeakyReLU", build_leaky_relu)?;
    registry.register("PReLU", build_prelu)?;
    registry.register("RReLU", build_rrelu)?;
    registry.register("ReLU6", build_relu6)?;
    // TODO: add support for SELU and CELU
    registry.reserve("SELU")?;
    registry.reserve("CELU")?;
    Ok(registry)
}

/// Build an activation layer from a config record, using a process-wide
/// table that is populated on first use and read-only afterwards.
pub fn build_activation_layer(cfg: &Config) -> Result<Box<dyn Activation>> {
    static TABLE: OnceLock<Registry<Box<dyn Activation>>> = OnceLock::new();
    if let Some(table) = TABLE.get() {
        return table.build(cfg);
    }
    let table = registry()?;
    TABLE.get_or_init(|| table).build(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_zeroes_the_negative_side() {
        let layer = build_activation_layer(&Config::of_type("ReLU")).unwrap();
        let out = layer.forward(array![[-1.0, 0.0, 2.0]]).unwrap();
        assert_eq!(out, array![[0.0, 0.0, 2.0]]);
        assert_eq!(layer.name(), "ReLU");
    }

    #[test]
    fn leaky_relu_uses_the_configured_slope() {
        let cfg = Config::of_type("LeakyReLU").set("negative_slope", 0.2);
        let layer = build_activation_layer(&cfg).unwrap();
        let out = layer.forward(array![[-1.0, 3.0]]).unwrap();
        assert_eq!(out, array![[0.2 * -1.0, 3.0]]);
    }

    #[test]
    fn leaky_relu_defaults_to_slope_0_01() {
        let layer = build_activation_layer(&Config::of_type("LeakyReLU")).unwrap();
        let out = layer.forward(array![[-1.0]]).unwrap();
        assert_eq!(out, array![[-0.01]]);
    }

    #[test]
    fn relu6_clamps_at_six() {
        let layer = build_activation_layer(&Config::of_type("ReLU6")).unwrap();
        let out = layer.forward(array![[-2.0, 4.0, 7.5]]).unwrap();
        assert_eq!(out, array![[0.0, 4.0, 6.0]]);
    }

    #[test]
    fn prelu_broadcasts_a_single_parameter() {
        let layer = PRelu::new(1, 0.25).unwrap();
        let out = layer.forward(array![[-4.0, 8.0], [-2.0, -1.0]]).unwrap();
        assert_eq!(out, array![[-1.0, 8.0], [-0.5, -0.25]]);
    }

    #[test]
    fn prelu_applies_per_channel_slopes() {
        let cfg = Config::of_type("PReLU")
            .set("num_parameters", 2usize)
            .set("init", 0.5);
        let layer = build_activation_layer(&cfg).unwrap();
        let out = layer.forward(array![[-2.0, -4.0]]).unwrap();
        assert_eq!(out, array![[-1.0, -2.0]]);
    }

    #[test]
    fn prelu_rejects_a_channel_mismatch() {
        let layer = PRelu::new(3, 0.25).unwrap();
        let err = layer.forward(array![[-1.0, 1.0]]).unwrap_err();
        assert!(matches!(err, BuildError::ShapeMismatch(_)));
    }

    #[test]
    fn prelu_requires_at_least_one_parameter() {
        let cfg = Config::of_type("PReLU").set("num_parameters", 0usize);
        let err = build_activation_layer(&cfg).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn rrelu_eval_mode_uses_the_mean_slope() {
        let layer = RRelu::new(0.125, 0.375).unwrap();
        let out = layer.forward(array![[-1.0, 2.0]]).unwrap();
        assert_eq!(out, array![[-0.25, 2.0]]);
    }

    #[test]
    fn rrelu_training_mode_samples_within_the_bounds() {
        let _guard = crate::utils::rng_test_lock();
        let mut layer = RRelu::new(0.25, 0.5).unwrap();
        layer.train(true);
        let out = layer.forward(array![[-4.0, -4.0, -4.0, 3.0]]).unwrap();
        assert_eq!(out[[0, 3]], 3.0);
        for j in 0..3 {
            let v = out[[0, j]];
            assert!((-2.0..=-1.0).contains(&v), "sampled output {} out of range", v);
        }
    }

    #[test]
    fn rrelu_rejects_inverted_bounds() {
        let cfg = Config::of_type("RReLU").set("lower", 0.5).set("upper", 0.1);
        let err = build_activation_layer(&cfg).unwrap_err();
        assert!(matches!(err, BuildError::InvalidParameter(_)));
    }

    #[test]
    fn reserved_variants_are_unsupported_not_unknown() {
        for name in ["SELU", "CELU"] {
            let err = build_activation_layer(&Config::of_type(name)).unwrap_err();
            assert!(matches!(err, BuildError::Unsupported(_)), "{}", name);
        }
    }

    #[test]
    fn unknown_activation_names_the_offender() {
        let err = build_activation_layer(&Config::of_type("Sigmoid")).unwrap_err();
        assert!(err.to_string().contains("Sigmoid"));
    }

    #[test]
    fn unknown_parameters_are_rejected() {
        let cfg = Config::of_type("ReLU").set("inplace", true);
        let err = build_activation_layer(&cfg).unwrap_err();
        assert!(err.to_string().contains("inplace"));
    }

    #[test]
    fn built_layers_format_for_debugging() {
        let layer = build_activation_layer(&Config::of_type("ReLU")).unwrap();
        assert!(format!("{:?}", layer).contains("Relu"));
    }

    #[test]
    fn typed_cfg_builds_directly() {
        let layer = ActivationCfg::LeakyRelu {
            negative_slope: 0.1,
        }
        .build()
        .unwrap();
        assert_eq!(layer.name(), "LeakyReLU");
    }

    #[test]
    fn registry_lists_the_curated_names() {
        let registry = registry().unwrap();
        assert_eq!(
            registry.names(),
            vec!["CELU", "LeakyReLU", "PReLU", "RReLU", "ReLU", "ReLU6", "SELU"]
        );
    }
}
