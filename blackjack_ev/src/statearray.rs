use std::collections::HashMap;

use crate::{Hand, Shoe};

/// A hand state combined with the composition of the shoe it draws from.
///
/// Only the parts of a hand that decide its future are kept: the total,
/// whether an ace still counts 11, and whether it holds a single card (the
/// next card may then make a natural).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    hand: u16,
    shoe: u128,
}

impl StateKey {
    pub fn new(hand: &Hand, shoe: &Shoe) -> Self {
        let hand = hand.points() as u16
            | (hand.is_soft() as u16) << 8
            | ((hand.number_of_cards() == 1) as u16) << 9;
        Self {
            hand,
            shoe: shoe.signature(),
        }
    }
}

/// This struct provides a convenient way to memoize values by hand and shoe.
#[derive(Debug, Clone)]
pub struct StateArray<T> {
    data: HashMap<StateKey, T>,
}

impl<T> Default for StateArray<T> {
    fn default() -> Self {
        Self {
            data: HashMap::new(),
        }
    }
}

impl<T> StateArray<T> {
    pub fn new() -> StateArray<T> {
        Default::default()
    }

    pub fn get(&self, key: &StateKey) -> Option<&T> {
        self.data.get(key)
    }

    pub fn insert(&mut self, key: StateKey, value: T) {
        self.data.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}
