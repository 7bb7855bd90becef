//! Fixed coordinates of a basic-strategy chart.
//!
//! Columns are the dealer up cards 2 to 10 then ace. Rows come in three
//! bands, each from high to low: hard totals 20 to 5, soft totals 21 to 13,
//! and pairs of aces down to pairs of twos.

use crate::card::{card_index, card_label, check_card};
use crate::{Error, Hand, Result, ACE};

pub const DEALER_COLUMNS: usize = 10;
pub const CHART_ROWS: usize = 35;
pub const DEALER_UP_CARDS: [u8; DEALER_COLUMNS] = [2, 3, 4, 5, 6, 7, 8, 9, 10, ACE];

const SOFT_START: usize = 16;
const PAIR_START: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandBand {
    Hard,
    Soft,
    Pair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartIndex {
    pub dealer: usize,
    pub row: usize,
}

impl ChartIndex {
    /// Offset of this cell in a dealer-major array of `CHART_ROWS` per column.
    pub fn flat(&self) -> usize {
        self.dealer * CHART_ROWS + self.row
    }
}

pub fn chart_index(hand: &Hand, dealer_up_card: u8) -> Result<ChartIndex> {
    let dealer = card_index(check_card(dealer_up_card)?);
    let points = hand.points() as usize;
    let off_chart = || Error::OffChart {
        hand: hand.to_string(),
        dealer_up_card,
    };

    let row = if hand.number_of_cards() < 2 {
        return Err(off_chart());
    } else if let Some(rank) = hand.pair_rank() {
        36 - rank as usize
    } else if hand.is_soft() {
        if !(13..=21).contains(&points) {
            return Err(off_chart());
        }
        37 - points
    } else {
        if !(5..=20).contains(&points) {
            return Err(off_chart());
        }
        20 - points
    };

    Ok(ChartIndex { dealer, row })
}

pub fn row_band(row: usize) -> Option<HandBand> {
    match row {
        0..=15 => Some(HandBand::Hard),
        SOFT_START..=24 => Some(HandBand::Soft),
        PAIR_START..=34 => Some(HandBand::Pair),
        _ => None,
    }
}

/// A starting hand that lands on the given row.
///
/// Hard rows get a composition-free two-card total, soft rows an ace with one
/// other card, pair rows the pair itself.
pub fn row_hand(row: usize) -> Result<Hand> {
    match row_band(row) {
        Some(HandBand::Hard) => Hand::from_total((20 - row) as u8, false, 2),
        Some(HandBand::Soft) => Hand::from_cards(&[ACE, (26 - row) as u8]),
        Some(HandBand::Pair) => {
            let rank = (36 - row) as u8;
            Hand::from_cards(&[rank, rank])
        }
        None => Err(Error::InvalidHand(format!("chart has no row {}", row))),
    }
}

pub fn row_label(row: usize) -> String {
    match row_band(row) {
        Some(HandBand::Hard) => format!("{}", 20 - row),
        Some(HandBand::Soft) => format!("A,{}", card_label((26 - row) as u8)),
        Some(HandBand::Pair) => {
            let rank = card_label((36 - row) as u8);
            format!("{},{}", rank, rank)
        }
        None => String::from("?"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TEN;

    #[test]
    fn bands_and_columns() {
        let at = |cards: &[u8], up: u8| {
            let hand = Hand::from_cards(cards).unwrap();
            chart_index(&hand, up).unwrap()
        };

        assert_eq!(at(&[TEN, TEN], 2), ChartIndex { dealer: 0, row: 26 });
        assert_eq!(at(&[TEN, 9], ACE), ChartIndex { dealer: 9, row: 1 });
        assert_eq!(at(&[3, 2], TEN), ChartIndex { dealer: 8, row: 15 });
        assert_eq!(at(&[ACE, TEN], 6), ChartIndex { dealer: 4, row: 16 });
        assert_eq!(at(&[ACE, 2], 6), ChartIndex { dealer: 4, row: 24 });
        assert_eq!(at(&[ACE, ACE], 6), ChartIndex { dealer: 4, row: 25 });
        assert_eq!(at(&[2, 2], 6), ChartIndex { dealer: 4, row: 34 });
        assert_eq!(at(&[8, 8], TEN).flat(), 8 * CHART_ROWS + 28);

        // Three-card hands use the same total rows.
        assert_eq!(at(&[5, 4, 3], 7).row, 8);
        assert_eq!(at(&[ACE, 2, 4], 7).row, 20);
        assert_eq!(at(&[ACE, 5, 6, 2], 7).row, 6);
    }

    #[test]
    fn hands_without_a_row() {
        let off = |cards: &[u8]| chart_index(&Hand::from_cards(cards).unwrap(), 6);
        assert!(matches!(off(&[TEN, 5, 6]), Err(Error::OffChart { .. })));
        assert!(matches!(off(&[TEN, 6, 8]), Err(Error::OffChart { .. })));
        assert!(matches!(off(&[9]), Err(Error::OffChart { .. })));
        let soft12 = Hand::from_total(12, true, 3).unwrap();
        assert!(matches!(chart_index(&soft12, 6), Err(Error::OffChart { .. })));
        let hand = Hand::from_cards(&[TEN, 6]).unwrap();
        assert!(matches!(chart_index(&hand, 1), Err(Error::InvalidCard(1))));
    }

    #[test]
    fn every_row_has_a_hand_that_maps_back() {
        for row in 0..CHART_ROWS {
            let hand = row_hand(row).unwrap();
            assert_eq!(hand.number_of_cards(), 2);
            for (dealer, &up) in DEALER_UP_CARDS.iter().enumerate() {
                assert_eq!(chart_index(&hand, up).unwrap(), ChartIndex { dealer, row });
            }
        }
        assert!(row_hand(CHART_ROWS).is_err());
    }

    #[test]
    fn labels() {
        assert_eq!(row_label(0), "20");
        assert_eq!(row_label(15), "5");
        assert_eq!(row_label(16), "A,10");
        assert_eq!(row_label(24), "A,2");
        assert_eq!(row_label(25), "A,A");
        assert_eq!(row_label(34), "2,2");
        assert_eq!(row_band(26), Some(HandBand::Pair));
        assert_eq!(row_band(35), None);
    }
}
