use mcsweep::sweep;
use mcsweep::{SimpleCallback, SweepConfig, UniformDraw};

use tracing_subscriber::EnvFilter;

fn main() -> mcsweep::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // a smaller sweep than the default one, which draws 40 million samples
    let config = SweepConfig::new(20, 1_000, 10_000);
    let outcome = sweep::run(&config, &UniformDraw, &SimpleCallback {})?;

    println!(
        "Took {:?} to run {} trials, each with {} samples.",
        outcome.elapsed(),
        outcome.table().len(),
        config.trials_per_point
    );
    println!("{}", outcome.table().to_json()?);

    Ok(())
}
