use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use blackjack_ev::card::card_label;
use blackjack_ev::chart::{row_band, row_label, HandBand, DEALER_UP_CARDS};
use blackjack_ev::{
    Action, ActionChart, ActionMask, ChartIndex, PlayPolicy, Rules, Shoe, StrategyChart,
    CHART_ROWS, DEALER_COLUMNS,
};
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value: {0}")]
    Value(#[from] serde::de::value::Error),
    #[error(transparent)]
    Solver(#[from] blackjack_ev::Error),
    #[error("{0}")]
    Config(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rule: ConfigRule,
    pub chart: ConfigChart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRule {
    pub allowed_actions: Vec<String>,
    pub max_split_depth: i32,
    pub double_after_split: bool,
    pub dealer_hits_soft17: bool,
    pub can_hit_split_aces: bool,
    pub error_tolerance: f64,
}

impl TryInto<Rules> for ConfigRule {
    type Error = DriverError;

    fn try_into(self) -> Result<Rules, Self::Error> {
        let allowed = self
            .allowed_actions
            .iter()
            .map(|name| name.parse::<Action>())
            .collect::<Result<ActionMask, _>>()?;

        let rules = Rules::new(
            allowed,
            self.max_split_depth,
            self.double_after_split,
            self.dealer_hits_soft17,
            self.can_hit_split_aces,
            self.error_tolerance,
        )?;

        Ok(rules)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_enum_str, Deserialize_enum_str)]
pub enum PolicyKind {
    Optimal,
    Textbook,
    Chart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigChart {
    /// Negative for an infinite shoe.
    pub number_of_decks: i32,
    pub policy: String,
    /// Action array written by an earlier run, read when the policy is `Chart`.
    pub policy_chart: Option<String>,
    pub output_dir: String,
    pub label: String,
}

impl ConfigChart {
    pub fn shoe(&self) -> Result<Shoe, DriverError> {
        Ok(Shoe::new(self.number_of_decks)?)
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        Path::new(&self.output_dir).join(format!("{}_{}.bin", self.label, name))
    }
}

pub fn load_policy(chart: &ConfigChart) -> Result<PlayPolicy, DriverError> {
    let policy = match chart.policy.parse::<PolicyKind>()? {
        PolicyKind::Optimal => PlayPolicy::Optimal,
        PolicyKind::Textbook => PlayPolicy::Chart(ActionChart::textbook()),
        PolicyKind::Chart => {
            let path = chart.policy_chart.as_ref().ok_or_else(|| {
                DriverError::Config(String::from("policy Chart needs a policy_chart file"))
            })?;
            let mut reader = BufReader::new(File::open(path)?);
            let codes = StrategyChart::read_actions(&mut reader)?;
            PlayPolicy::Chart(ActionChart::from_codes(&codes)?)
        }
    };

    Ok(policy)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &Path) -> Result<Config, DriverError> {
    let file_content = fs::read_to_string(filename)?;
    Ok(serde_yaml::from_str(&file_content)?)
}

/// Maps the default config path onto the home directory and checks that the
/// config file is there.
pub fn resolve_config_path(
    config: &str,
    default_path: &str,
    file_name: &str,
) -> Result<PathBuf, DriverError> {
    let path = if config == default_path {
        let home_dir = home::home_dir()
            .ok_or_else(|| DriverError::Config(String::from("Cannot find home directory")))?;
        home_dir.join(file_name)
    } else {
        PathBuf::from(config)
    };

    if !path.exists() {
        return Err(DriverError::Config(format!(
            "Config file {} does not exist",
            path.display()
        )));
    }
    if path.is_dir() {
        return Err(DriverError::Config(format!(
            "{} should be a file rather than a directory",
            path.display()
        )));
    }
    Ok(path)
}

pub fn write_chart(config: &ConfigChart, chart: &StrategyChart) -> Result<(), DriverError> {
    fs::create_dir_all(&config.output_dir)?;
    let mut writer = BufWriter::new(File::create(config.output_path("actions"))?);
    chart.write_actions(&mut writer)?;
    writer.flush()?;
    let mut writer = BufWriter::new(File::create(config.output_path("expectations"))?);
    chart.write_expectations(&mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_chart(config: &ConfigChart) -> Result<StrategyChart, DriverError> {
    let mut reader = BufReader::new(File::open(config.output_path("actions"))?);
    let actions = StrategyChart::read_actions(&mut reader)?;
    let mut reader = BufReader::new(File::open(config.output_path("expectations"))?);
    let expectations = StrategyChart::read_expectations(&mut reader)?;
    Ok(StrategyChart::from_parts(actions, expectations)?)
}

pub fn write_values(path: &Path, values: &[f64]) -> Result<(), DriverError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

fn band_title(band: HandBand) -> &'static str {
    match band {
        HandBand::Hard => "Hard hands",
        HandBand::Soft => "Soft hands",
        HandBand::Pair => "Pairs",
    }
}

fn render_bands<F>(cell: F) -> String
where
    F: Fn(ChartIndex) -> String,
{
    let mut out = String::new();
    let mut current: Option<HandBand> = None;
    for row in 0..CHART_ROWS {
        let band = row_band(row);
        if band != current {
            if let Some(band) = band {
                let _ = write!(out, "\n-- {} --\nDealer:", band_title(band));
                for up in DEALER_UP_CARDS {
                    let _ = write!(out, "\t{:>10}", card_label(up));
                }
                out.push('\n');
            }
            current = band;
        }

        let _ = write!(out, "{:<6}", row_label(row));
        for dealer in 0..DEALER_COLUMNS {
            let _ = write!(out, "\t{:>10}", cell(ChartIndex { dealer, row }));
        }
        out.push('\n');
    }
    out
}

/// Plain-text chart: one block per hand band, each cell showing the letter of
/// the chosen action and its expectation.
pub fn render_chart(chart: &StrategyChart) -> String {
    let best = chart.best_expectations();
    render_bands(|index| {
        let letter = chart.action(index).map_or('?', |action| action.letter());
        format!("{} {:+.4}", letter, best[index.flat()])
    })
}

/// Plain-text chart of one value per cell.
pub fn render_values(values: &[f64]) -> String {
    render_bands(|index| match values.get(index.flat()) {
        Some(value) => format!("{:.1e}", value),
        None => String::from("-"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_ev::{evaluate, Hand};

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            allowed_actions: vec![
                String::from("Stand"),
                String::from("Hit"),
                String::from("Double"),
                String::from("Split"),
                String::from("Surrender"),
            ],
            max_split_depth: 2,
            double_after_split: true,
            dealer_hits_soft17: false,
            can_hit_split_aces: false,
            error_tolerance: 1e-10,
        }
    }

    fn get_typical_config_chart() -> ConfigChart {
        ConfigChart {
            number_of_decks: -1,
            policy: String::from("Optimal"),
            policy_chart: None,
            output_dir: String::from("tables"),
            label: String::from("infinite"),
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: Rules = config_rule.try_into().unwrap();
        assert_eq!(converted_rule, Rules::standard(1e-10).unwrap());
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.allowed_actions.push(String::from("Not an action"));
        let convert_result: Result<Rules, DriverError> = config_rule.try_into();
        assert!(matches!(convert_result, Err(DriverError::Value(_))));

        let mut config_rule = get_typical_config_rule();
        config_rule.max_split_depth = -1;
        let convert_result: Result<Rules, DriverError> = config_rule.try_into();
        assert!(matches!(convert_result, Err(DriverError::Solver(_))));
    }

    #[test]
    fn can_parse_yaml() {
        let yaml = "
rule:
  allowed_actions: [Stand, Hit, Double, Split, Surrender, Insurance]
  max_split_depth: 3
  double_after_split: false
  dealer_hits_soft17: true
  can_hit_split_aces: false
  error_tolerance: 1.0e-8
chart:
  number_of_decks: 6
  policy: Textbook
  output_dir: out
  label: six_decks
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rule.allowed_actions.len(), 6);
        assert!(config.chart.policy_chart.is_none());
        assert_eq!(config.chart.shoe().unwrap().total(), 312);
        assert_eq!(
            config.chart.output_path("actions"),
            Path::new("out").join("six_decks_actions.bin")
        );

        let rules: Rules = config.rule.try_into().unwrap();
        assert!(rules.allowed()[Action::Insurance]);
        assert!(rules.dealer_hits_soft17());
        assert_eq!(rules.max_split_depth(), 3);
    }

    #[test]
    fn policies() {
        let mut config_chart = get_typical_config_chart();
        assert_eq!(load_policy(&config_chart).unwrap(), PlayPolicy::Optimal);

        config_chart.policy = String::from("Textbook");
        assert_eq!(
            load_policy(&config_chart).unwrap(),
            PlayPolicy::Chart(ActionChart::textbook())
        );

        config_chart.policy = String::from("Chart");
        assert!(matches!(load_policy(&config_chart), Err(DriverError::Config(_))));

        config_chart.policy = String::from("Greedy");
        assert!(matches!(load_policy(&config_chart), Err(DriverError::Value(_))));
    }

    #[test]
    fn zero_decks_is_rejected() {
        let mut config_chart = get_typical_config_chart();
        config_chart.number_of_decks = 0;
        assert!(matches!(config_chart.shoe(), Err(DriverError::Solver(_))));
    }

    #[test]
    fn renders_every_band() {
        let rules = Rules::standard(1e-10).unwrap();
        let hand = Hand::from_cards(&[blackjack_ev::TEN, 9]).unwrap();
        let evaluation =
            evaluate(&hand, 6, &Shoe::infinite(), &rules, &ActionMask::all()).unwrap();
        let mut chart = StrategyChart::new();
        chart.set(ChartIndex { dealer: 4, row: 1 }, &evaluation);

        let text = render_chart(&chart);
        assert!(text.contains("-- Hard hands --"));
        assert!(text.contains("-- Soft hands --"));
        assert!(text.contains("-- Pairs --"));
        assert!(text.contains("A,A"));
        assert!(text.contains(&format!("S {:+.4}", evaluation.best_expectation())));
        // Three headers plus one line per row.
        assert_eq!(text.lines().filter(|line| !line.is_empty()).count(), 3 * 2 + CHART_ROWS);

        let values = vec![0.5; DEALER_COLUMNS * CHART_ROWS];
        assert!(render_values(&values).contains("5.0e-1"));
    }
}
