use std::cmp::Ordering;

use log::trace;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::card::{check_card, CARD_VALUES};
use crate::statearray::{StateArray, StateKey};
use crate::{Hand, Result, Rules, Shoe};

/// Where the dealer's hand ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum DealerOutcome {
    Seventeen,
    Eighteen,
    Nineteen,
    Twenty,
    TwentyOne,
    Blackjack,
    Bust,
}

impl DealerOutcome {
    /// Note that the callers must pass a standing total in [17, 21].
    fn standing_on(points: u8) -> DealerOutcome {
        match points {
            17 => DealerOutcome::Seventeen,
            18 => DealerOutcome::Eighteen,
            19 => DealerOutcome::Nineteen,
            20 => DealerOutcome::Twenty,
            _ => DealerOutcome::TwentyOne,
        }
    }
}

/// Net payoff of a player hand that stands against a final dealer hand, in
/// units of the hand's wager.
pub fn payoff(player: &Hand, outcome: DealerOutcome) -> f64 {
    if player.is_bust() {
        return -1.0;
    }
    if player.is_blackjack() {
        return match outcome {
            DealerOutcome::Blackjack => 0.0,
            _ => 1.5,
        };
    }
    // Beats any dealer 21 but a natural, which it pushes.
    if player.is_split_twenty_one() {
        return match outcome {
            DealerOutcome::Blackjack => 0.0,
            _ => 1.0,
        };
    }

    let dealer_points = match outcome {
        DealerOutcome::Seventeen => 17,
        DealerOutcome::Eighteen => 18,
        DealerOutcome::Nineteen => 19,
        DealerOutcome::Twenty => 20,
        DealerOutcome::TwentyOne => 21,
        DealerOutcome::Blackjack => return -1.0,
        DealerOutcome::Bust => return 1.0,
    };
    match player.points().cmp(&dealer_points) {
        Ordering::Less => -1.0,
        Ordering::Equal => 0.0,
        Ordering::Greater => 1.0,
    }
}

/// Probability distribution over the dealer's final hands.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DealerOutcomes {
    probabilities: [f64; 7],
}

impl DealerOutcomes {
    pub fn probability(&self, outcome: DealerOutcome) -> f64 {
        self.probabilities[outcome as usize]
    }

    pub fn total_probability(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    /// Expectation of standing on `player` against this distribution.
    pub fn stand_expectation(&self, player: &Hand) -> f64 {
        DealerOutcome::iter()
            .map(|outcome| self.probability(outcome) * payoff(player, outcome))
            .sum()
    }

    fn end_with(&mut self, outcome: DealerOutcome) {
        self.probabilities[outcome as usize] = 1.0;
    }

    fn add_assign_with_p(&mut self, rhs: &Self, p: f64) {
        for i in 0..self.probabilities.len() {
            self.probabilities[i] += rhs.probabilities[i] * p;
        }
    }
}

/// Resolves dealer hands, memoizing every hitting state by hand and shoe.
///
/// The dealer does not peek: a natural is one of the terminal outcomes and is
/// reached with the probability the shoe gives it.
pub struct DealerPlay<'a> {
    rule: &'a Rules,
    odds: StateArray<DealerOutcomes>,
}

impl<'a> DealerPlay<'a> {
    pub fn new(rule: &'a Rules) -> Self {
        Self {
            rule,
            odds: StateArray::new(),
        }
    }

    /// Distribution of the dealer's final hand given the up card and the
    /// cards left in the shoe.
    pub fn dealer_outcomes(&mut self, dealer_up_card: u8, shoe: &Shoe) -> Result<DealerOutcomes> {
        let mut dealer = Hand::new();
        dealer.add_card(check_card(dealer_up_card)?)?;
        let mut shoe = shoe.clone();
        Ok(self.resolve(&dealer, &mut shoe))
    }

    pub fn number_of_states(&self) -> usize {
        self.odds.len()
    }

    pub fn clear(&mut self) {
        trace!("dropping {} memoized dealer states", self.odds.len());
        self.odds.clear();
    }

    /// Every card drawn here is put back before returning, so the shoe is
    /// left as it was found.
    pub(crate) fn resolve(&mut self, dealer: &Hand, shoe: &mut Shoe) -> DealerOutcomes {
        let mut outcomes = DealerOutcomes::default();

        // Case 1: Dealer must stand.
        if dealer.is_bust() {
            outcomes.end_with(DealerOutcome::Bust);
            return outcomes;
        }
        if dealer.is_blackjack() {
            outcomes.end_with(DealerOutcome::Blackjack);
            return outcomes;
        }
        if !self.must_hit(dealer) {
            outcomes.end_with(DealerOutcome::standing_on(dealer.points()));
            return outcomes;
        }

        // Case 2: Dealer must hit.
        let key = StateKey::new(dealer, shoe);
        if let Some(odds) = self.odds.get(&key) {
            return *odds;
        }

        for card in CARD_VALUES {
            let p = shoe.take(card);
            if p == 0.0 {
                continue;
            }
            let next_state_odds = self.resolve(&dealer.with_card(card), shoe);
            shoe.put_back(card);

            outcomes.add_assign_with_p(&next_state_odds, p);
        }

        self.odds.insert(key, outcomes);
        outcomes
    }

    fn must_hit(&self, dealer: &Hand) -> bool {
        let points = dealer.points();
        points < 17 || (points == 17 && dealer.is_soft() && self.rule.dealer_hits_soft17())
    }
}
