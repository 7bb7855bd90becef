//! Exact expected-value solver for blackjack.
//!
//! Every legal player action is valued by enumerating all future card
//! sequences out of a [`Shoe`], and the best action is reported together with
//! the expectations of all six actions. The chart helpers place those results
//! into the dense arrays used for basic-strategy charts.

pub mod card;
pub mod chart;
pub mod dealer;
mod error;
pub mod hand;
pub mod rules;
pub mod shoe;
pub mod solver;
mod statearray;
pub mod strategy;
pub mod tables;

pub use card::{ACE, CARD_VALUES, TEN};
pub use chart::{chart_index, ChartIndex, CHART_ROWS, DEALER_COLUMNS};
pub use dealer::{DealerOutcome, DealerOutcomes, DealerPlay};
pub use error::{Error, Result};
pub use hand::Hand;
pub use rules::{Action, ActionMask, Rules, NUMBER_OF_ACTIONS};
pub use shoe::{Shoe, ShoeMode};
pub use solver::{evaluate, legal_actions, Evaluation, Solver, ILLEGAL_EXPECTATION};
pub use strategy::{ActionChart, PlayPolicy};
pub use tables::{build_chart, deal_probabilities, weighted_expectations, StrategyChart};
