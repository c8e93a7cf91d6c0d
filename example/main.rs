use nnbuild::prelude::*;
use nnbuild::rand_array;

fn main() -> Result<()> {
    set_random_seed(0, false);

    let cfg = Config::from_json_str(r#"{"type": "LeakyReLU", "negative_slope": 0.2}"#)?;
    let layer = build_activation_layer(&cfg)?;
    let batch = rand_array!(2, 4)?;
    println!("input:\n{}", batch);
    println!("{} output:\n{}", layer.name(), layer.forward(batch)?);

    for name in ["ReLU", "PReLU", "RReLU", "ReLU6"] {
        let layer = build_activation_layer(&Config::of_type(name))?;
        println!("built {}", layer.name());
    }

    if let Err(err) = build_activation_layer(&Config::of_type("SELU")) {
        println!("SELU: {}", err);
    }

    Ok(())
}
