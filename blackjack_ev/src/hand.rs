use std::fmt;

use rand::Rng;

use crate::card::{card_label, check_card};
use crate::{Error, Result, Shoe, ACE};

/// Running state of a single hand, without its exact composition.
///
/// Aces count 11 when added and are demoted to 1, one at a time, while the
/// hand would otherwise bust. `soft_aces` counts the aces still valued 11.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hand {
    points: u8,
    soft_aces: u8,
    number_of_cards: u8,
    is_pair: bool,
    split_depth: u8,
}

impl Hand {
    pub fn new() -> Hand {
        Default::default()
    }

    pub fn from_cards(cards: &[u8]) -> Result<Hand> {
        let mut hand = Hand::new();
        for &card in cards {
            hand.add_card(card)?;
        }
        Ok(hand)
    }

    /// Creates a hand from its total alone, for chart rows that many
    /// compositions lead to. The hand is never a pair.
    pub fn from_total(points: u8, soft: bool, number_of_cards: u8) -> Result<Hand> {
        if !(2..=11).contains(&number_of_cards) {
            return Err(Error::InvalidHand(format!(
                "{} cards cannot form a total",
                number_of_cards
            )));
        }
        let valid_points = if soft { 12..=21 } else { 4..=21 };
        if !valid_points.contains(&points) {
            let kind = if soft { "soft" } else { "hard" };
            return Err(Error::InvalidHand(format!("{} {} is not a total", kind, points)));
        }

        Ok(Hand {
            points,
            soft_aces: soft as u8,
            number_of_cards,
            is_pair: false,
            split_depth: 0,
        })
    }

    pub fn add_card(&mut self, card: u8) -> Result<()> {
        check_card(card)?;
        self.check_not_bust()?;
        self.push_card(card);
        Ok(())
    }

    /// Deals the given card out of the shoe into this hand and returns the
    /// probability of that draw. The hand only changes if the card was there.
    pub fn deal_choose(&mut self, shoe: &mut Shoe, card: u8) -> Result<f64> {
        self.check_not_bust()?;
        let p = shoe.draw_deterministic(card)?;
        if p > 0.0 {
            self.push_card(card);
        }
        Ok(p)
    }

    /// Deals a random card out of the shoe into this hand. A bust hand takes
    /// no more cards.
    pub fn deal_random<R: Rng + ?Sized>(&mut self, shoe: &mut Shoe, rng: &mut R) -> Option<u8> {
        if self.is_bust() {
            return None;
        }
        let card = shoe.draw_random(rng)?;
        self.push_card(card);
        Some(card)
    }

    /// Splits a pair, returning one of the two resulting one-card hands.
    pub fn split(&self) -> Result<Hand> {
        if !self.is_pair {
            return Err(Error::InvalidHand(format!("{} cannot be split", self)));
        }
        Ok(self.split_half())
    }

    pub fn points(&self) -> u8 {
        self.points
    }

    pub fn soft_aces(&self) -> u8 {
        self.soft_aces
    }

    pub fn is_soft(&self) -> bool {
        self.soft_aces > 0
    }

    pub fn number_of_cards(&self) -> u8 {
        self.number_of_cards
    }

    /// Exactly two cards of the same value, before any action.
    pub fn is_pair(&self) -> bool {
        self.is_pair
    }

    /// Number of splits this hand descends from.
    pub fn split_depth(&self) -> u8 {
        self.split_depth
    }

    pub fn pair_rank(&self) -> Option<u8> {
        if !self.is_pair {
            return None;
        }
        if self.is_soft() {
            Some(ACE)
        } else {
            Some(self.points / 2)
        }
    }

    pub fn is_bust(&self) -> bool {
        self.points > 21
    }

    /// Natural blackjack: 21 with the two initial cards of an unsplit hand.
    pub fn is_blackjack(&self) -> bool {
        self.number_of_cards == 2 && self.points == 21 && self.split_depth == 0
    }

    /// 21 with the first two cards of a hand that came out of a split.
    pub fn is_split_twenty_one(&self) -> bool {
        self.number_of_cards == 2 && self.points == 21 && self.split_depth > 0
    }

    /// Note that this method won't check if the card value is valid.
    pub(crate) fn with_card(&self, card: u8) -> Hand {
        let mut hand = *self;
        hand.push_card(card);
        hand
    }

    pub(crate) fn split_half(&self) -> Hand {
        let rank = self.pair_rank().unwrap_or(self.points / 2);
        Hand {
            points: rank,
            soft_aces: (rank == ACE) as u8,
            number_of_cards: 1,
            is_pair: false,
            split_depth: self.split_depth + 1,
        }
    }

    fn check_not_bust(&self) -> Result<()> {
        if self.is_bust() {
            return Err(Error::InvalidHand(format!(
                "bust on {} points, no more cards",
                self.points
            )));
        }
        Ok(())
    }

    fn push_card(&mut self, card: u8) {
        self.is_pair = self.number_of_cards == 1 && card == self.points;
        self.points += card;
        if card == ACE {
            self.soft_aces += 1;
        }
        self.number_of_cards += 1;

        while self.points > 21 && self.soft_aces > 0 {
            self.points -= 10;
            self.soft_aces -= 1;
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rank) = self.pair_rank() {
            write!(f, "Pair of {}s", card_label(rank))
        } else if self.is_blackjack() {
            write!(f, "Blackjack")
        } else if self.is_bust() {
            write!(f, "Bust")
        } else if self.is_soft() {
            write!(f, "Soft {}", self.points)
        } else {
            write!(f, "Hard {}", self.points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CARD_VALUES, TEN};

    #[test]
    fn aces_are_demoted_one_at_a_time() {
        let hand = Hand::from_cards(&[ACE, 6]).unwrap();
        assert_eq!((hand.points(), hand.soft_aces()), (17, 1));

        let hand = Hand::from_cards(&[ACE, 6, TEN]).unwrap();
        assert_eq!((hand.points(), hand.soft_aces()), (17, 0));

        let hand = Hand::from_cards(&[ACE, ACE]).unwrap();
        assert_eq!((hand.points(), hand.soft_aces()), (12, 1));

        let hand = Hand::from_cards(&[ACE, ACE, ACE, 8]).unwrap();
        assert_eq!((hand.points(), hand.soft_aces()), (21, 1));

        let hand = Hand::from_cards(&[ACE, ACE, ACE, 8, 5]).unwrap();
        assert_eq!((hand.points(), hand.soft_aces()), (16, 0));
    }

    #[test]
    fn pairs() {
        let hand = Hand::from_cards(&[8, 8]).unwrap();
        assert!(hand.is_pair());
        assert_eq!(hand.pair_rank(), Some(8));

        let hand = Hand::from_cards(&[ACE, ACE]).unwrap();
        assert_eq!(hand.pair_rank(), Some(ACE));

        let hand = Hand::from_cards(&[8, 8, 2]).unwrap();
        assert!(!hand.is_pair());

        let hand = Hand::from_cards(&[7, 9]).unwrap();
        assert!(!hand.is_pair());
        assert!(hand.split().is_err());
    }

    #[test]
    fn blackjack_and_bust() {
        assert!(Hand::from_cards(&[ACE, TEN]).unwrap().is_blackjack());
        assert!(!Hand::from_cards(&[7, 7, 7]).unwrap().is_blackjack());
        assert!(Hand::from_cards(&[TEN, 6, 9]).unwrap().is_bust());

        // 21 in two cards after a split is not a natural.
        let mut hand = Hand::from_cards(&[TEN, TEN]).unwrap().split().unwrap();
        hand.add_card(ACE).unwrap();
        assert_eq!(hand.points(), 21);
        assert!(!hand.is_blackjack());
    }

    #[test]
    fn split_keeps_rank_and_counts_depth() {
        let half = Hand::from_cards(&[ACE, ACE]).unwrap().split().unwrap();
        assert_eq!((half.points(), half.soft_aces(), half.number_of_cards()), (11, 1, 1));
        assert_eq!(half.split_depth(), 1);

        let mut again = half;
        again.add_card(ACE).unwrap();
        assert!(again.is_pair());
        let half = again.split().unwrap();
        assert_eq!(half.split_depth(), 2);

        let half = Hand::from_cards(&[6, 6]).unwrap().split().unwrap();
        assert_eq!((half.points(), half.soft_aces()), (6, 0));
    }

    #[test]
    fn invalid_cards_leave_the_hand_alone() {
        let mut hand = Hand::from_cards(&[9]).unwrap();
        assert!(matches!(hand.add_card(1), Err(Error::InvalidCard(1))));
        assert_eq!(hand, Hand::from_cards(&[9]).unwrap());
    }

    #[test]
    fn bust_hands_take_no_more_cards() {
        let mut hand = Hand::from_cards(&[TEN, TEN, 5]).unwrap();
        for _ in 0..30 {
            assert!(matches!(hand.add_card(TEN), Err(Error::InvalidHand(_))));
        }
        assert_eq!((hand.points(), hand.number_of_cards()), (25, 3));

        let mut shoe = Shoe::new(1).unwrap();
        assert!(matches!(hand.deal_choose(&mut shoe, TEN), Err(Error::InvalidHand(_))));
        assert_eq!(shoe.total(), 52);
    }

    #[test]
    fn from_total() {
        let hand = Hand::from_total(16, false, 2).unwrap();
        assert_eq!((hand.points(), hand.is_soft(), hand.is_pair()), (16, false, false));
        assert!(Hand::from_total(11, true, 2).is_err());
        assert!(Hand::from_total(22, false, 3).is_err());
        assert!(Hand::from_total(12, false, 1).is_err());
    }

    #[test]
    fn deal_choose_from_shoe() {
        let mut shoe = Shoe::from_counts([0, 0, 0, 0, 0, 0, 0, 0, 1, 1]).unwrap();
        let mut hand = Hand::new();
        assert_eq!(hand.deal_choose(&mut shoe, 5).unwrap(), 0.0);
        assert_eq!(hand.number_of_cards(), 0);
        assert_eq!(hand.deal_choose(&mut shoe, ACE).unwrap(), 0.5);
        assert_eq!(hand.deal_choose(&mut shoe, TEN).unwrap(), 1.0);
        assert!(hand.is_blackjack());
        assert_eq!(shoe.total(), 0);
    }

    #[test]
    fn deal_random_until_bust() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(5);
        let mut shoe = Shoe::new(1).unwrap();
        let mut hand = Hand::new();
        while !hand.is_bust() {
            let card = hand.deal_random(&mut shoe, &mut rng).unwrap();
            assert!(CARD_VALUES.contains(&card));
        }
        assert_eq!(shoe.total() as u8, 52 - hand.number_of_cards());
        assert_eq!(hand.deal_random(&mut shoe, &mut rng), None);
        assert_eq!(shoe.total() as u8, 52 - hand.number_of_cards());

        let mut empty = Shoe::from_counts([0, 0, 0, 0, 0, 0, 0, 0, 1, 0]).unwrap();
        let mut hand = Hand::new();
        assert_eq!(hand.deal_random(&mut empty, &mut rng), Some(TEN));
        assert_eq!(hand.deal_random(&mut empty, &mut rng), None);
        assert_eq!(hand.number_of_cards(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(Hand::from_cards(&[8, 8]).unwrap().to_string(), "Pair of 8s");
        assert_eq!(Hand::from_cards(&[ACE, ACE]).unwrap().to_string(), "Pair of As");
        assert_eq!(Hand::from_cards(&[ACE, TEN]).unwrap().to_string(), "Blackjack");
        assert_eq!(Hand::from_cards(&[ACE, 6]).unwrap().to_string(), "Soft 17");
        assert_eq!(Hand::from_cards(&[TEN, 2]).unwrap().to_string(), "Hard 12");
        assert_eq!(Hand::from_cards(&[TEN, 9, 5]).unwrap().to_string(), "Bust");
    }
}
