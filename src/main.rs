use clap::Parser;
use log::info;

use imgaug::{AugmentationRun, Cli, RunConfig, expand_inputs};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Configuration errors abort before any image is touched
    let config = RunConfig::try_from(&args)?;

    let inputs = expand_inputs(&args.inputs);
    if inputs.is_empty() {
        anyhow::bail!("No source images found in the given inputs");
    }

    info!(
        "Augmenting {} images x {} rounds into {:?}",
        inputs.len(),
        config.rounds,
        config.output_dir
    );

    let summary = AugmentationRun::new(config).run(&inputs)?;
    summary.log_summary();

    println!("Augmented images have been saved in individual archives.");
    println!(
        "Total number of augmented images generated: {}",
        summary.total()
    );

    Ok(())
}
