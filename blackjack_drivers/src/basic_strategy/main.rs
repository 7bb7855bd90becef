use std::time::Instant;

use blackjack_drivers::{
    load_policy, parse_config_from_file, render_chart, resolve_config_path, write_chart,
    DriverError,
};
use blackjack_ev::{build_chart, Rules};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_ev.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Worker threads for chart cells, 0 for one per core
    #[arg(short, long, default_value_t = 0)]
    threads: usize,
}

fn run(args: CommandLineArgs) -> Result<(), DriverError> {
    let config_path = resolve_config_path(&args.config, DEFAULT_CONFIG_PATH, ".blackjack_ev.yml")?;
    let config = parse_config_from_file(&config_path)?;
    info!("Loaded config from {}", config_path.display());

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .map_err(|e| DriverError::Config(e.to_string()))?;
    }

    let rules: Rules = config.rule.clone().try_into()?;
    let shoe = config.chart.shoe()?;
    let policy = load_policy(&config.chart)?;

    let start = Instant::now();
    let chart = build_chart(&shoe, &rules, &policy)?;
    info!("Elapsed time: {:.3}s", start.elapsed().as_secs_f64());

    println!("{}", render_chart(&chart));
    write_chart(&config.chart, &chart)?;
    info!(
        "Wrote {} and {}",
        config.chart.output_path("actions").display(),
        config.chart.output_path("expectations").display()
    );

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
