use std::fmt;

use rand::Rng;

use crate::card::{card_index, check_card, CARD_VALUES};
use crate::{Error, Result, TEN};

const MOD: u128 = 3817949514078926267; // A prime number with 62 bits.
const BASE: u128 = 211;
const POW_BASE: [u128; 10] = get_powers_of_base();
const INFINITE_BIT: u128 = 1 << 127;

// Every finite composition must keep its card total inside a u16.
const MAX_NUMBER_OF_DECKS: i32 = 1260;

const fn get_powers_of_base() -> [u128; 10] {
    let mut ret: [u128; 10] = [0; 10];
    ret[0] = 1;

    let mut i = 1;
    while i < ret.len() {
        ret[i] = ret[i - 1] * BASE % MOD;
        i += 1;
    }

    ret
}

const fn single_deck_counts() -> [u16; 10] {
    let mut counts = [4; 10];
    counts[(TEN - 2) as usize] = 16;
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShoeMode {
    /// Cards are drawn with fixed single-deck proportions and never run out.
    Infinite,
    /// A finite shoe made of whole decks.
    Decks(u16),
    /// A finite shoe with an arbitrary composition.
    Custom,
}

/// The remaining card reservoir, counted per card value.
///
/// Finite shoes lose a card on every draw; infinite shoes keep their
/// proportions forever. The signature is kept in sync with the counts so that
/// two shoes with the same mode and composition share memoized results.
#[derive(Debug, Clone)]
pub struct Shoe {
    mode: ShoeMode,
    initial_counts: [u16; 10],
    counts: [u16; 10],
    total: u16,
    signature: u128,
}

impl Shoe {
    /// Creates a full shoe. A negative number of decks selects the infinite
    /// shoe; zero decks is rejected.
    pub fn new(number_of_decks: i32) -> Result<Shoe> {
        if number_of_decks < 0 {
            return Ok(Self::infinite());
        }
        if number_of_decks == 0 || number_of_decks > MAX_NUMBER_OF_DECKS {
            return Err(Error::InvalidDeckCount(number_of_decks));
        }

        let mut counts = single_deck_counts();
        for count in counts.iter_mut() {
            *count *= number_of_decks as u16;
        }
        Ok(Self::with_mode(ShoeMode::Decks(number_of_decks as u16), counts))
    }

    pub fn infinite() -> Shoe {
        Self::with_mode(ShoeMode::Infinite, single_deck_counts())
    }

    /// Creates a finite shoe from per-card counts, indexed from 2 to ace.
    pub fn from_counts(counts: [u16; 10]) -> Result<Shoe> {
        let total: u32 = counts.iter().map(|&c| c as u32).sum();
        if total == 0 {
            return Err(Error::InvalidShoe(String::from("a shoe needs at least one card")));
        }
        if total > u16::MAX as u32 {
            return Err(Error::InvalidShoe(format!("{} cards do not fit in a shoe", total)));
        }
        Ok(Self::with_mode(ShoeMode::Custom, counts))
    }

    fn with_mode(mode: ShoeMode, counts: [u16; 10]) -> Shoe {
        let mut shoe = Shoe {
            mode,
            initial_counts: counts,
            counts,
            total: 0,
            signature: 0,
        };
        shoe.propagate_counts();
        shoe
    }

    /// Replaces this shoe by a full shoe of the given number of decks.
    pub fn reset(&mut self, number_of_decks: i32) -> Result<()> {
        *self = Self::new(number_of_decks)?;
        Ok(())
    }

    /// Puts every drawn card back, restoring the composition the shoe was
    /// created with.
    pub fn shuffle(&mut self) {
        self.counts = self.initial_counts;
        self.propagate_counts();
    }

    pub fn mode(&self) -> ShoeMode {
        self.mode
    }

    pub fn is_infinite(&self) -> bool {
        self.mode == ShoeMode::Infinite
    }

    pub fn total(&self) -> u16 {
        self.total
    }

    pub fn counts(&self) -> &[u16; 10] {
        &self.counts
    }

    pub fn count(&self, card: u8) -> Result<u16> {
        Ok(self.counts[card_index(check_card(card)?)])
    }

    /// Probability that the next card is `card`, without drawing it.
    pub fn probability(&self, card: u8) -> Result<f64> {
        check_card(card)?;
        Ok(self.proportion(card))
    }

    /// Draws the given card and returns the probability of that exact draw,
    /// evaluated before the card leaves the shoe.
    ///
    /// An exhausted card yields 0 and leaves the shoe untouched. Infinite
    /// shoes are never modified.
    pub fn draw_deterministic(&mut self, card: u8) -> Result<f64> {
        check_card(card)?;
        Ok(self.take(card))
    }

    /// Returns a card taken by [`Shoe::draw_deterministic`] to the shoe.
    ///
    /// Sibling branches of an enumeration are alternative futures, so each
    /// successful draw has to be undone before the next sibling is tried.
    pub fn restore(&mut self, card: u8) -> Result<()> {
        let index = card_index(check_card(card)?);
        if !self.is_infinite() && self.counts[index] >= self.initial_counts[index] {
            return Err(Error::InvalidShoe(format!(
                "no card {} has been drawn from this shoe",
                card
            )));
        }
        self.put_back(card);
        Ok(())
    }

    /// Draws a card at random, weighted by the remaining counts. Returns
    /// `None` if the shoe is empty.
    pub fn draw_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<u8> {
        if self.total == 0 {
            return None;
        }

        let mut position = rng.gen_range(0..self.total);
        for card in CARD_VALUES {
            let count = self.counts[card_index(card)];
            if position < count {
                self.take(card);
                return Some(card);
            }
            position -= count;
        }

        None
    }

    /// Identifies the mode and the current composition.
    pub fn signature(&self) -> u128 {
        self.signature
    }

    pub(crate) fn proportion(&self, card: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.counts[card_index(card)] as f64 / self.total as f64
    }

    /// Note that this method won't check if the card value is valid.
    pub(crate) fn take(&mut self, card: u8) -> f64 {
        let index = card_index(card);
        if self.counts[index] == 0 {
            return 0.0;
        }

        let p = self.proportion(card);
        if !self.is_infinite() {
            self.counts[index] -= 1;
            self.total -= 1;
            self.signature = (self.signature + MOD - POW_BASE[index]) % MOD;
        }
        p
    }

    /// Note that this method won't check if the card value is valid, nor
    /// whether the card was ever drawn.
    pub(crate) fn put_back(&mut self, card: u8) {
        if self.is_infinite() {
            return;
        }
        let index = card_index(card);
        self.counts[index] += 1;
        self.total += 1;
        self.signature = (self.signature + POW_BASE[index]) % MOD;
    }

    fn propagate_counts(&mut self) {
        self.total = 0;
        self.signature = 0;
        for (i, &count) in self.counts.iter().enumerate() {
            self.total += count;
            self.signature += (count as u128) * POW_BASE[i];
        }
        self.signature %= MOD;
        if self.is_infinite() {
            self.signature |= INFINITE_BIT;
        }
    }
}

impl fmt::Display for Shoe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            ShoeMode::Infinite => write!(f, "Infinite shoe")?,
            ShoeMode::Decks(n) => write!(f, "{}-deck shoe", n)?,
            ShoeMode::Custom => write!(f, "Custom shoe")?,
        }
        write!(f, " with current distribution {:?}", self.counts)
    }
}
