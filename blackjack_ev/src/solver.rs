use log::trace;

use crate::card::{check_card, CARD_VALUES};
use crate::dealer::DealerPlay;
use crate::{
    Action, ActionMask, Error, Hand, PlayPolicy, Result, Rules, Shoe, ACE, NUMBER_OF_ACTIONS, TEN,
};

/// Expectation reported for every action that may not be taken.
pub const ILLEGAL_EXPECTATION: f64 = -1000.0;

const SURRENDER_EXPECTATION: f64 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    best_action: Action,
    expectations: [f64; NUMBER_OF_ACTIONS],
    truncated: bool,
}

impl Evaluation {
    pub fn best_action(&self) -> Action {
        self.best_action
    }

    pub fn best_expectation(&self) -> f64 {
        self.expectations[self.best_action.index()]
    }

    pub fn expectation(&self, action: Action) -> f64 {
        self.expectations[action.index()]
    }

    /// Expectations of all six actions, in action order.
    pub fn expectations(&self) -> &[f64; NUMBER_OF_ACTIONS] {
        &self.expectations
    }

    /// Whether some branch was dropped for falling under the error tolerance.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Actions the hand may take right now, given the rules and the caller's own
/// restrictions.
pub fn legal_actions(
    hand: &Hand,
    dealer_up_card: u8,
    rules: &Rules,
    allowed: &ActionMask,
) -> ActionMask {
    let mut legal = rules.allowed().intersect(allowed);
    if hand.number_of_cards() == 0 || hand.is_bust() {
        return ActionMask::none();
    }

    let initial = hand.number_of_cards() == 2 && hand.split_depth() == 0;
    if hand.number_of_cards() != 2 || (hand.split_depth() > 0 && !rules.double_after_split()) {
        legal.set(Action::Double, false);
    }
    if !hand.is_pair() || hand.split_depth() >= rules.max_split_depth() {
        legal.set(Action::Split, false);
    }
    if !initial {
        legal.set(Action::Surrender, false);
    }
    if !initial || dealer_up_card != ACE {
        legal.set(Action::Insurance, false);
    }
    legal
}

/// Evaluates one hand with the EV-maximizing policy.
pub fn evaluate(
    hand: &Hand,
    dealer_up_card: u8,
    shoe: &Shoe,
    rules: &Rules,
    allowed: &ActionMask,
) -> Result<Evaluation> {
    let policy = PlayPolicy::Optimal;
    let mut solver = Solver::new(rules, &policy);
    solver.evaluate(hand, dealer_up_card, shoe, allowed)
}

/// Exact expected-value enumeration of every player action.
///
/// A solver keeps the dealer distributions it has resolved so far, so
/// evaluating many hands with the same rules through one solver is cheaper
/// than building a solver per hand.
pub struct Solver<'a> {
    rules: &'a Rules,
    policy: &'a PlayPolicy,
    dealer_play: DealerPlay<'a>,
    truncated: bool,
}

impl<'a> Solver<'a> {
    pub fn new(rules: &'a Rules, policy: &'a PlayPolicy) -> Self {
        Self {
            rules,
            policy,
            dealer_play: DealerPlay::new(rules),
            truncated: false,
        }
    }

    /// Values every action of `hand` against the dealer up card. The shoe is
    /// used as given: cards already on the table are only out of it if the
    /// caller took them out. The shoe itself is not modified.
    ///
    /// Actions that are illegal here carry [`ILLEGAL_EXPECTATION`]. The best
    /// action is the one the policy picks.
    pub fn evaluate(
        &mut self,
        hand: &Hand,
        dealer_up_card: u8,
        shoe: &Shoe,
        allowed: &ActionMask,
    ) -> Result<Evaluation> {
        check_card(dealer_up_card)?;
        if hand.number_of_cards() == 0 {
            return Err(Error::InvalidHand(String::from("a hand needs at least one card")));
        }
        if hand.is_bust() {
            return Err(Error::InvalidHand(format!("{} has nothing left to play", hand)));
        }

        let dealer = Hand::from_cards(&[dealer_up_card])?;
        let mut shoe = shoe.clone();
        self.truncated = false;

        let (expectations, legal) = self.expected_values(hand, &dealer, &mut shoe, allowed, 1.0);
        let best_action = self
            .policy
            .choose(hand, dealer_up_card, &legal, &expectations)
            .ok_or(Error::NoLegalAction)?;
        trace!(
            "{} against {}: {} dealer states memoized",
            hand,
            dealer_up_card,
            self.dealer_play.number_of_states()
        );

        Ok(Evaluation {
            best_action,
            expectations,
            truncated: self.truncated,
        })
    }

    /// Expectation of standing on `hand` with the dealer showing the up card.
    pub fn stand_expectation(
        &mut self,
        hand: &Hand,
        dealer_up_card: u8,
        shoe: &Shoe,
    ) -> Result<f64> {
        let dealer = Hand::from_cards(&[dealer_up_card])?;
        let mut shoe = shoe.clone();
        Ok(self.stand_value(hand, &dealer, &mut shoe))
    }

    fn stand_value(&mut self, hand: &Hand, dealer: &Hand, shoe: &mut Shoe) -> f64 {
        if hand.is_bust() {
            return -1.0;
        }
        self.dealer_play.resolve(dealer, shoe).stand_expectation(hand)
    }

    /// Value of reaching `hand` at a decision point, when the player goes on
    /// with the action the policy picks. No legal action means standing.
    fn decision_value(
        &mut self,
        hand: &Hand,
        dealer: &Hand,
        shoe: &mut Shoe,
        allowed: &ActionMask,
        reach: f64,
    ) -> f64 {
        if hand.is_bust() {
            return -1.0;
        }
        let (expectations, legal) = self.expected_values(hand, dealer, shoe, allowed, reach);
        match self.policy.choose(hand, dealer.points(), &legal, &expectations) {
            Some(action) => expectations[action.index()],
            None => self.stand_value(hand, dealer, shoe),
        }
    }

    fn expected_values(
        &mut self,
        hand: &Hand,
        dealer: &Hand,
        shoe: &mut Shoe,
        allowed: &ActionMask,
        reach: f64,
    ) -> ([f64; NUMBER_OF_ACTIONS], ActionMask) {
        let legal = legal_actions(hand, dealer.points(), self.rules, allowed);
        let mut ex = [ILLEGAL_EXPECTATION; NUMBER_OF_ACTIONS];

        if legal.allows(Action::Stand) {
            ex[Action::Stand.index()] = self.stand_value(hand, dealer, shoe);
        }
        if legal.allows(Action::Hit) {
            let after_hit: ActionMask = [Action::Stand, Action::Hit].into_iter().collect();
            let after_hit = allowed.intersect(&after_hit);
            ex[Action::Hit.index()] = self.draw_and_decide(hand, dealer, shoe, &after_hit, reach);
        }
        if legal.allows(Action::Double) {
            ex[Action::Double.index()] = 2.0 * self.draw_and_stand(hand, dealer, shoe);
        }
        if legal.allows(Action::Split) {
            ex[Action::Split.index()] = self.split_value(hand, dealer, shoe, allowed, reach);
        }
        if legal.allows(Action::Surrender) {
            ex[Action::Surrender.index()] = SURRENDER_EXPECTATION;
        }
        if legal.allows(Action::Insurance) {
            // Half a wager on the hole card being a ten, paid 2 to 1, on top
            // of the best way to play the hand itself.
            let p = shoe.proportion(TEN);
            let side_bet = 0.5 * (3.0 * p - 1.0);
            let play = legal
                .iter()
                .filter(|&action| action != Action::Insurance)
                .map(|action| ex[action.index()])
                .fold(None, |best: Option<f64>, x| Some(best.map_or(x, |b| b.max(x))));
            let play = match play {
                Some(play) => play,
                None => self.stand_value(hand, dealer, shoe),
            };
            ex[Action::Insurance.index()] = side_bet + play;
        }

        (ex, legal)
    }

    fn draw_and_decide(
        &mut self,
        hand: &Hand,
        dealer: &Hand,
        shoe: &mut Shoe,
        allowed: &ActionMask,
        reach: f64,
    ) -> f64 {
        let mut ex = 0.0;
        for card in CARD_VALUES {
            let p = shoe.take(card);
            if p == 0.0 {
                continue;
            }

            let next = hand.with_card(card);
            let value = if next.is_bust() {
                -1.0
            } else if reach * p < self.rules.error_tolerance() {
                self.truncated = true;
                0.0
            } else {
                self.decision_value(&next, dealer, shoe, allowed, reach * p)
            };
            shoe.put_back(card);

            ex += p * value;
        }
        ex
    }

    fn draw_and_stand(&mut self, hand: &Hand, dealer: &Hand, shoe: &mut Shoe) -> f64 {
        let mut ex = 0.0;
        for card in CARD_VALUES {
            let p = shoe.take(card);
            if p == 0.0 {
                continue;
            }
            let value = self.stand_value(&hand.with_card(card), dealer, shoe);
            shoe.put_back(card);

            ex += p * value;
        }
        ex
    }

    /// Both hands of a split are valued as independent copies of one
    /// sub-hand drawn from the same shoe, so the split is worth twice that.
    fn split_value(
        &mut self,
        hand: &Hand,
        dealer: &Hand,
        shoe: &mut Shoe,
        allowed: &ActionMask,
        reach: f64,
    ) -> f64 {
        let half = hand.split_half();
        let mut after_split = allowed.without(&[Action::Surrender, Action::Insurance]);
        if hand.pair_rank() == Some(ACE) && !self.rules.can_hit_split_aces() {
            after_split = after_split.without(&[Action::Hit, Action::Double]);
        } else if !self.rules.double_after_split() {
            after_split = after_split.without(&[Action::Double]);
        }

        2.0 * self.draw_and_decide(&half, dealer, shoe, &after_split, reach)
    }
}
