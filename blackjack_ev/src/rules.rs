use std::ops::Index;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::{Error, Result};

pub const NUMBER_OF_ACTIONS: usize = 6;

// Each split level multiplies the enumeration by the number of card values.
const MAX_SPLIT_DEPTH: i32 = 8;

/// Player actions, in the fixed order used by every EV vector. When several
/// actions share the best EV, the one listed first wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize_enum_str, Deserialize_enum_str,
)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
    Surrender,
    Insurance,
}

impl Action {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Action::iter().nth(index)
    }

    pub fn letter(self) -> char {
        match self {
            Action::Stand => 'S',
            Action::Hit => 'H',
            Action::Double => 'D',
            Action::Split => 'P',
            Action::Surrender => 'R',
            Action::Insurance => 'I',
        }
    }
}

/// Which of the six actions may be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionMask([bool; NUMBER_OF_ACTIONS]);

impl ActionMask {
    pub fn all() -> ActionMask {
        ActionMask([true; NUMBER_OF_ACTIONS])
    }

    pub fn none() -> ActionMask {
        ActionMask([false; NUMBER_OF_ACTIONS])
    }

    pub fn allows(&self, action: Action) -> bool {
        self.0[action.index()]
    }

    pub fn set(&mut self, action: Action, allowed: bool) {
        self.0[action.index()] = allowed;
    }

    pub fn without(mut self, actions: &[Action]) -> ActionMask {
        for &action in actions {
            self.set(action, false);
        }
        self
    }

    pub fn intersect(&self, other: &ActionMask) -> ActionMask {
        let mut mask = *self;
        for action in Action::iter() {
            mask.set(action, self.allows(action) && other.allows(action));
        }
        mask
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&allowed| allowed)
    }

    /// The allowed actions, in action order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::iter().filter(|&action| self.allows(action))
    }
}

impl From<[bool; NUMBER_OF_ACTIONS]> for ActionMask {
    fn from(flags: [bool; NUMBER_OF_ACTIONS]) -> Self {
        ActionMask(flags)
    }
}

impl FromIterator<Action> for ActionMask {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut mask = ActionMask::none();
        for action in iter {
            mask.set(action, true);
        }
        mask
    }
}

impl Index<Action> for ActionMask {
    type Output = bool;
    fn index(&self, action: Action) -> &Self::Output {
        &self.0[action.index()]
    }
}

/// Table rules shared read-only by every evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    allowed: ActionMask,
    max_split_depth: u8,
    double_after_split: bool,
    dealer_hits_soft17: bool,
    can_hit_split_aces: bool,
    error_tolerance: f64,
}

impl Rules {
    /// `error_tolerance` is the reach probability below which a player
    /// branch is dropped from the enumeration; 0 enumerates everything.
    pub fn new(
        allowed: ActionMask,
        max_split_depth: i32,
        double_after_split: bool,
        dealer_hits_soft17: bool,
        can_hit_split_aces: bool,
        error_tolerance: f64,
    ) -> Result<Rules> {
        if !(0..=MAX_SPLIT_DEPTH).contains(&max_split_depth) {
            return Err(Error::InvalidRules(format!(
                "max split depth {} is outside 0 to {}",
                max_split_depth, MAX_SPLIT_DEPTH
            )));
        }
        if !error_tolerance.is_finite() || !(0.0..1.0).contains(&error_tolerance) {
            return Err(Error::InvalidRules(format!(
                "error tolerance {} is outside [0, 1)",
                error_tolerance
            )));
        }
        if !allowed.allows(Action::Stand) && !allowed.allows(Action::Hit) {
            return Err(Error::InvalidRules(String::from(
                "either stand or hit must be allowed",
            )));
        }

        Ok(Rules {
            allowed,
            max_split_depth: max_split_depth as u8,
            double_after_split,
            dealer_hits_soft17,
            can_hit_split_aces,
            error_tolerance,
        })
    }

    /// Every action but insurance, up to two splits, double after split,
    /// dealer stands on soft 17, one card to split aces.
    pub fn standard(error_tolerance: f64) -> Result<Rules> {
        let allowed = ActionMask::all().without(&[Action::Insurance]);
        Self::new(allowed, 2, true, false, false, error_tolerance)
    }

    pub fn allowed(&self) -> &ActionMask {
        &self.allowed
    }

    pub fn max_split_depth(&self) -> u8 {
        self.max_split_depth
    }

    pub fn double_after_split(&self) -> bool {
        self.double_after_split
    }

    pub fn dealer_hits_soft17(&self) -> bool {
        self.dealer_hits_soft17
    }

    pub fn can_hit_split_aces(&self) -> bool {
        self.can_hit_split_aces
    }

    pub fn error_tolerance(&self) -> f64 {
        self.error_tolerance
    }
}
