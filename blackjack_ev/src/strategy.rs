use crate::chart::{chart_index, ChartIndex, CHART_ROWS, DEALER_COLUMNS};
use crate::{Action, ActionMask, Error, Hand, Result, NUMBER_OF_ACTIONS};

/// How the player picks an action at every decision point.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PlayPolicy {
    /// Take the action with the highest expectation.
    #[default]
    Optimal,
    /// Follow a fixed chart, whatever the expectations say.
    Chart(ActionChart),
}

impl PlayPolicy {
    /// Picks one of the legal actions, or `None` if there is none.
    ///
    /// Under [`PlayPolicy::Optimal`] ties go to the action that comes first
    /// in action order.
    pub fn choose(
        &self,
        hand: &Hand,
        dealer_up_card: u8,
        legal: &ActionMask,
        expectations: &[f64; NUMBER_OF_ACTIONS],
    ) -> Option<Action> {
        match self {
            PlayPolicy::Optimal => {
                let mut best: Option<Action> = None;
                for action in legal.iter() {
                    match best {
                        Some(b) if expectations[action.index()] <= expectations[b.index()] => {}
                        _ => best = Some(action),
                    }
                }
                best
            }
            PlayPolicy::Chart(chart) => chart.choose(hand, dealer_up_card, legal),
        }
    }
}

/// One action per chart cell, stored as action codes in chart order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionChart {
    codes: Vec<i32>,
}

impl ActionChart {
    pub fn from_codes(codes: &[i32]) -> Result<ActionChart> {
        let expected = DEALER_COLUMNS * CHART_ROWS;
        if codes.len() != expected {
            return Err(Error::ShapeMismatch {
                expected,
                actual: codes.len(),
            });
        }
        if let Some(&code) = codes.iter().find(|&&code| decode(code).is_none()) {
            return Err(Error::InvalidActionCode(code));
        }

        Ok(ActionChart {
            codes: codes.to_vec(),
        })
    }

    /// The usual infinite-deck basic strategy for dealer stands on soft 17
    /// with double after split and late surrender.
    pub fn textbook() -> ActionChart {
        let mut codes = vec![0; DEALER_COLUMNS * CHART_ROWS];
        for (row, actions) in TEXTBOOK.iter().enumerate() {
            for (dealer, action) in actions.iter().enumerate() {
                codes[ChartIndex { dealer, row }.flat()] = action.index() as i32;
            }
        }
        ActionChart { codes }
    }

    pub fn codes(&self) -> &[i32] {
        &self.codes
    }

    pub fn action_at(&self, index: ChartIndex) -> Action {
        decode(self.codes[index.flat()]).unwrap_or(Action::Stand)
    }

    pub fn choose(&self, hand: &Hand, dealer_up_card: u8, legal: &ActionMask) -> Option<Action> {
        if legal.is_empty() {
            return None;
        }

        let points = hand.points();
        let mut action = if !hand.is_soft() && points > 19 {
            Action::Stand
        } else {
            match chart_index(hand, dealer_up_card) {
                Ok(index) => self.action_at(index),
                Err(_) if points >= 17 => Action::Stand,
                Err(_) => Action::Hit,
            }
        };

        while !legal.allows(action) {
            action = match action {
                Action::Surrender if points >= 17 => Action::Stand,
                Action::Surrender => Action::Hit,
                Action::Double | Action::Split | Action::Insurance => Action::Hit,
                Action::Hit => Action::Stand,
                Action::Stand => return legal.iter().next(),
            };
        }
        Some(action)
    }
}

fn decode(code: i32) -> Option<Action> {
    usize::try_from(code).ok().and_then(Action::from_index)
}

const H: Action = Action::Hit;
const S: Action = Action::Stand;
const D: Action = Action::Double;
const P: Action = Action::Split;
const R: Action = Action::Surrender;

// Columns are dealer up cards 2 to 10, then ace.
#[rustfmt::skip]
const TEXTBOOK: [[Action; DEALER_COLUMNS]; CHART_ROWS] = [
    [S, S, S, S, S, S, S, S, S, S], // Hard 20
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, S, S, S, S, S, R], // Hard 17
    [S, S, S, S, S, H, H, R, R, R],
    [S, S, S, S, S, H, H, H, R, R],
    [S, S, S, S, S, H, H, H, H, H],
    [S, S, S, S, S, H, H, H, H, H],
    [H, H, S, S, S, H, H, H, H, H], // Hard 12
    [D, D, D, D, D, D, D, D, D, D],
    [D, D, D, D, D, D, D, D, H, H],
    [H, D, D, D, D, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H],
    [H, H, H, H, H, H, H, H, H, H], // Hard 5
    [S, S, S, S, S, S, S, S, S, S], // Ace + 10
    [S, S, S, S, S, S, S, S, S, S],
    [S, S, S, S, D, S, S, S, S, S],
    [D, D, D, D, D, S, S, H, H, H], // Ace + 7
    [H, D, D, D, D, H, H, H, H, H],
    [H, H, D, D, D, H, H, H, H, H],
    [H, H, D, D, D, H, H, H, H, H],
    [H, H, H, D, D, H, H, H, H, H],
    [H, H, H, D, D, H, H, H, H, H], // Ace + 2
    [P, P, P, P, P, P, P, P, P, P], // Double ace
    [S, S, S, S, S, S, S, S, S, S], // Double 10
    [P, P, P, P, P, S, P, P, S, S],
    [P, P, P, P, P, P, P, P, P, R],
    [P, P, P, P, P, P, H, H, H, H],
    [P, P, P, P, P, H, H, H, H, H],
    [D, D, D, D, D, D, D, D, H, H],
    [H, H, H, P, P, H, H, H, H, H],
    [P, P, P, P, P, P, H, H, H, H],
    [P, P, P, P, P, P, H, H, H, H], // Double 2
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACE, TEN};

    fn all_legal() -> ActionMask {
        ActionMask::all()
    }

    #[test]
    fn textbook_cells() {
        let chart = ActionChart::textbook();
        let choose = |cards: &[u8], up: u8| {
            let hand = Hand::from_cards(cards).unwrap();
            chart.choose(&hand, up, &all_legal()).unwrap()
        };
        assert_eq!(choose(&[TEN, 6], TEN), Action::Surrender);
        assert_eq!(choose(&[TEN, 6], 6), Action::Stand);
        assert_eq!(choose(&[6, 5], 6), Action::Double);
        assert_eq!(choose(&[ACE, ACE], 6), Action::Split);
        assert_eq!(choose(&[8, 8], ACE), Action::Surrender);
        assert_eq!(choose(&[9, 9], 7), Action::Stand);
        assert_eq!(choose(&[ACE, 7], 9), Action::Hit);
        assert_eq!(choose(&[ACE, 7], 7), Action::Stand);
        assert_eq!(choose(&[TEN, 2], 4), Action::Stand);
        assert_eq!(choose(&[5, 4], 3), Action::Double);
    }

    #[test]
    fn illegal_chart_actions_fall_back() {
        let chart = ActionChart::textbook();
        let no_extras =
            ActionMask::all().without(&[Action::Double, Action::Split, Action::Surrender]);

        let hand = Hand::from_cards(&[TEN, 6]).unwrap();
        assert_eq!(chart.choose(&hand, TEN, &no_extras), Some(Action::Hit));
        let hand = Hand::from_cards(&[TEN, 7]).unwrap();
        assert_eq!(chart.choose(&hand, ACE, &no_extras), Some(Action::Stand));
        let hand = Hand::from_cards(&[6, 5]).unwrap();
        assert_eq!(chart.choose(&hand, 6, &no_extras), Some(Action::Hit));
        let hand = Hand::from_cards(&[8, 8]).unwrap();
        assert_eq!(chart.choose(&hand, 6, &no_extras), Some(Action::Hit));

        let stand_only: ActionMask = [Action::Stand].into_iter().collect();
        assert_eq!(chart.choose(&hand, 6, &stand_only), Some(Action::Stand));
        let hit_only: ActionMask = [Action::Hit].into_iter().collect();
        let hand = Hand::from_total(18, false, 3).unwrap();
        assert_eq!(chart.choose(&hand, 6, &hit_only), Some(Action::Hit));
        assert_eq!(chart.choose(&hand, 6, &ActionMask::none()), None);
    }

    #[test]
    fn hands_off_the_chart() {
        let chart = ActionChart::textbook();
        let hard21 = Hand::from_cards(&[7, 7, 7]).unwrap();
        assert_eq!(chart.choose(&hard21, 6, &all_legal()), Some(Action::Stand));
        let soft12 = Hand::from_total(12, true, 3).unwrap();
        assert_eq!(chart.choose(&soft12, 6, &all_legal()), Some(Action::Hit));
    }

    #[test]
    fn optimal_breaks_ties_by_action_order() {
        let hand = Hand::from_cards(&[TEN, 6]).unwrap();
        let mut expectations = [-0.5; NUMBER_OF_ACTIONS];
        expectations[Action::Insurance.index()] = -1000.0;
        let policy = PlayPolicy::Optimal;
        assert_eq!(
            policy.choose(&hand, TEN, &all_legal(), &expectations),
            Some(Action::Stand)
        );

        expectations[Action::Stand.index()] = -0.6;
        let legal = ActionMask::all().without(&[Action::Hit]);
        assert_eq!(
            policy.choose(&hand, TEN, &legal, &expectations),
            Some(Action::Double)
        );
        assert_eq!(policy.choose(&hand, TEN, &ActionMask::none(), &expectations), None);
    }

    #[test]
    fn codes_are_validated() {
        assert!(matches!(
            ActionChart::from_codes(&[0; 10]),
            Err(Error::ShapeMismatch { expected: 350, actual: 10 })
        ));
        let mut codes = ActionChart::textbook().codes().to_vec();
        assert_eq!(ActionChart::from_codes(&codes).unwrap(), ActionChart::textbook());
        codes[17] = 6;
        assert!(matches!(ActionChart::from_codes(&codes), Err(Error::InvalidActionCode(6))));
        codes[17] = -1;
        assert!(matches!(ActionChart::from_codes(&codes), Err(Error::InvalidActionCode(-1))));
    }
}
