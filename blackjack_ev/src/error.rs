use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid card value {0}: card values are 2 to 11")]
    InvalidCard(u8),
    #[error("invalid number of decks {0}")]
    InvalidDeckCount(i32),
    #[error("invalid shoe: {0}")]
    InvalidShoe(String),
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error("invalid hand: {0}")]
    InvalidHand(String),
    #[error("{hand} against dealer {dealer_up_card} has no chart coordinate")]
    OffChart { hand: String, dealer_up_card: u8 },
    #[error("no action is legal for this hand")]
    NoLegalAction,
    #[error("array holds {actual} values, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("invalid action code {0}")]
    InvalidActionCode(i32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
