use std::ops::RangeInclusive;

use crate::{Error, Result};

/// An ace. It counts 11 until the hand would bust, then 1.
pub const ACE: u8 = 11;
/// The collapsed ten-valued rank group (10, J, Q, K).
pub const TEN: u8 = 10;
/// Every card value a shoe can hold, in enumeration order.
pub const CARD_VALUES: RangeInclusive<u8> = 2..=11;

static CARD_LABELS: [&str; 10] = ["2", "3", "4", "5", "6", "7", "8", "9", "10", "A"];

/// Returns the card unchanged if it is a valid card value.
pub fn check_card(card: u8) -> Result<u8> {
    if CARD_VALUES.contains(&card) {
        Ok(card)
    } else {
        Err(Error::InvalidCard(card))
    }
}

/// Position of a valid card value inside per-rank arrays.
pub(crate) fn card_index(card: u8) -> usize {
    (card - 2) as usize
}

pub fn card_label(card: u8) -> &'static str {
    match check_card(card) {
        Ok(card) => CARD_LABELS[card_index(card)],
        Err(_) => "?",
    }
}
