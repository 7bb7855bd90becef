use blackjack_drivers::{
    parse_config_from_file, read_chart, render_values, resolve_config_path, write_values,
    DriverError,
};
use blackjack_ev::{deal_probabilities, weighted_expectations};
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack_ev.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,
}

fn run(args: CommandLineArgs) -> Result<(), DriverError> {
    let config_path = resolve_config_path(&args.config, DEFAULT_CONFIG_PATH, ".blackjack_ev.yml")?;
    let config = parse_config_from_file(&config_path)?;
    let shoe = config.chart.shoe()?;

    let probabilities = deal_probabilities(&shoe)?;
    let total: f64 = probabilities.iter().sum();
    info!("Total error in deal probabilities: {:.5e}", (1.0 - total).abs());
    println!("Deal probabilities, {}", shoe);
    println!("{}", render_values(&probabilities));
    write_values(&config.chart.output_path("deal_probabilities"), &probabilities)?;

    // The weighted chart needs a chart written by basic_strategy.
    let chart = match read_chart(&config.chart) {
        Ok(chart) => chart,
        Err(e) => {
            warn!("No chart to weight: {}", e);
            return Ok(());
        }
    };
    let weighted = weighted_expectations(&chart, &probabilities)?;
    let expectation: f64 = weighted.iter().sum();
    println!(
        "Expectations weighted by deal probability (total = {:+.5e})",
        expectation
    );
    println!("{}", render_values(&weighted));
    write_values(&config.chart.output_path("weighted_expectations"), &weighted)?;

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
