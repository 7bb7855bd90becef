use std::io::{Read, Write};

use log::{debug, info};
use rayon::prelude::*;

use crate::chart::{chart_index, row_hand, ChartIndex, DEALER_UP_CARDS};
use crate::{
    Action, ActionChart, ActionMask, Error, Evaluation, Hand, PlayPolicy, Result, Rules, Shoe,
    Solver, CARD_VALUES, CHART_ROWS, DEALER_COLUMNS, ILLEGAL_EXPECTATION, NUMBER_OF_ACTIONS,
};

const CELLS: usize = DEALER_COLUMNS * CHART_ROWS;

/// Best actions and expectations of every chart cell.
///
/// Both grids are dealer-major: the action grid has shape
/// `[DEALER_COLUMNS][CHART_ROWS]` and the expectation grid
/// `[DEALER_COLUMNS][CHART_ROWS][NUMBER_OF_ACTIONS]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyChart {
    actions: Vec<i32>,
    expectations: Vec<f64>,
}

impl Default for StrategyChart {
    fn default() -> Self {
        Self {
            actions: vec![Action::Stand.index() as i32; CELLS],
            expectations: vec![ILLEGAL_EXPECTATION; CELLS * NUMBER_OF_ACTIONS],
        }
    }
}

impl StrategyChart {
    pub fn new() -> StrategyChart {
        Default::default()
    }

    pub fn from_parts(actions: Vec<i32>, expectations: Vec<f64>) -> Result<StrategyChart> {
        if actions.len() != CELLS {
            return Err(Error::ShapeMismatch {
                expected: CELLS,
                actual: actions.len(),
            });
        }
        if expectations.len() != CELLS * NUMBER_OF_ACTIONS {
            return Err(Error::ShapeMismatch {
                expected: CELLS * NUMBER_OF_ACTIONS,
                actual: expectations.len(),
            });
        }
        // Validates the action codes.
        ActionChart::from_codes(&actions)?;

        Ok(StrategyChart {
            actions,
            expectations,
        })
    }

    pub fn set(&mut self, index: ChartIndex, evaluation: &Evaluation) {
        let cell = index.flat();
        self.actions[cell] = evaluation.best_action().index() as i32;
        self.expectations[cell * NUMBER_OF_ACTIONS..(cell + 1) * NUMBER_OF_ACTIONS]
            .copy_from_slice(evaluation.expectations());
    }

    pub fn action(&self, index: ChartIndex) -> Option<Action> {
        usize::try_from(self.actions[index.flat()])
            .ok()
            .and_then(Action::from_index)
    }

    pub fn expectations(&self, index: ChartIndex) -> &[f64] {
        let cell = index.flat();
        &self.expectations[cell * NUMBER_OF_ACTIONS..(cell + 1) * NUMBER_OF_ACTIONS]
    }

    pub fn actions(&self) -> &[i32] {
        &self.actions
    }

    pub fn expectation_grid(&self) -> &[f64] {
        &self.expectations
    }

    /// Expectation of the chosen action in every cell.
    pub fn best_expectations(&self) -> Vec<f64> {
        self.actions
            .iter()
            .enumerate()
            .map(|(cell, &code)| {
                let action = code.clamp(0, NUMBER_OF_ACTIONS as i32 - 1) as usize;
                self.expectations[cell * NUMBER_OF_ACTIONS + action]
            })
            .collect()
    }

    pub fn to_action_chart(&self) -> Result<ActionChart> {
        ActionChart::from_codes(&self.actions)
    }

    pub fn write_actions<W: Write>(&self, writer: &mut W) -> Result<()> {
        for code in &self.actions {
            writer.write_all(&code.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn write_expectations<W: Write>(&self, writer: &mut W) -> Result<()> {
        for ex in &self.expectations {
            writer.write_all(&ex.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn read_actions<R: Read>(reader: &mut R) -> Result<Vec<i32>> {
        let bytes = read_exact_values(reader, CELLS, 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    pub fn read_expectations<R: Read>(reader: &mut R) -> Result<Vec<f64>> {
        let bytes = read_exact_values(reader, CELLS * NUMBER_OF_ACTIONS, 8)?;
        Ok(bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                f64::from_le_bytes(raw)
            })
            .collect())
    }
}

fn read_exact_values<R: Read>(reader: &mut R, expected: usize, width: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(expected * width);
    reader.read_to_end(&mut bytes)?;
    if bytes.len() != expected * width {
        return Err(Error::ShapeMismatch {
            expected,
            actual: bytes.len() / width,
        });
    }
    Ok(bytes)
}

/// Evaluates the canonical starting hand of every chart cell.
///
/// Cells are independent, so they are spread over the rayon thread pool with
/// one solver each. The shoe is used as given for every cell.
pub fn build_chart(shoe: &Shoe, rules: &Rules, policy: &PlayPolicy) -> Result<StrategyChart> {
    let cells: Vec<ChartIndex> = (0..DEALER_COLUMNS)
        .flat_map(|dealer| (0..CHART_ROWS).map(move |row| ChartIndex { dealer, row }))
        .collect();
    info!("Evaluating {} chart cells from {}", cells.len(), shoe);

    let evaluations = cells
        .par_iter()
        .map(|&index| -> Result<(ChartIndex, Evaluation)> {
            let hand = row_hand(index.row)?;
            let dealer_up_card = DEALER_UP_CARDS[index.dealer];
            let mut solver = Solver::new(rules, policy);
            let evaluation = solver.evaluate(&hand, dealer_up_card, shoe, &ActionMask::all())?;
            debug!(
                "{} against {}: {:?} with {:.6}",
                hand,
                dealer_up_card,
                evaluation.best_action(),
                evaluation.best_expectation()
            );
            Ok((index, evaluation))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut chart = StrategyChart::new();
    let mut truncated = 0;
    for (index, evaluation) in &evaluations {
        chart.set(*index, evaluation);
        truncated += evaluation.truncated() as usize;
    }
    info!(
        "Finished {} chart cells, {} of them with truncated branches",
        evaluations.len(),
        truncated
    );

    Ok(chart)
}

/// Probability of every chart cell being dealt: the dealer up card first,
/// then the two player cards, all out of `shoe`.
pub fn deal_probabilities(shoe: &Shoe) -> Result<Vec<f64>> {
    let mut shoe = shoe.clone();
    let mut probabilities = vec![0.0; CELLS];

    for up in CARD_VALUES {
        let p_up = shoe.draw_deterministic(up)?;
        if p_up == 0.0 {
            continue;
        }
        for first in CARD_VALUES {
            let p_first = shoe.draw_deterministic(first)?;
            if p_first == 0.0 {
                continue;
            }
            for second in CARD_VALUES {
                let p_second = shoe.draw_deterministic(second)?;
                if p_second == 0.0 {
                    continue;
                }
                let hand = Hand::from_cards(&[first, second])?;
                let index = chart_index(&hand, up)?;
                probabilities[index.flat()] += p_up * p_first * p_second;
                shoe.restore(second)?;
            }
            shoe.restore(first)?;
        }
        shoe.restore(up)?;
    }

    Ok(probabilities)
}

/// Best expectation of every cell weighted by the probability of dealing it.
/// The sum is the expectation of a round played from the chart.
pub fn weighted_expectations(chart: &StrategyChart, probabilities: &[f64]) -> Result<Vec<f64>> {
    if probabilities.len() != CELLS {
        return Err(Error::ShapeMismatch {
            expected: CELLS,
            actual: probabilities.len(),
        });
    }
    Ok(chart
        .best_expectations()
        .iter()
        .zip(probabilities)
        .map(|(ex, p)| ex * p)
        .collect())
}
