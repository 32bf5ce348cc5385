//! Trade actions and position directions.

use serde::{Deserialize, Serialize};

/// The three legal outputs of a classification head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Hold,
    Buy,
    Sell,
}

impl Action {
    /// Number of action classes
    pub const COUNT: usize = 3;

    /// Class index encoding: Hold = 0, Buy = 1, Sell = 2
    pub fn to_index(self) -> usize {
        match self {
            Action::Hold => 0,
            Action::Buy => 1,
            Action::Sell => 2,
        }
    }

    /// Inverse of [`Action::to_index`]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Action::Hold),
            1 => Some(Action::Buy),
            2 => Some(Action::Sell),
            _ => None,
        }
    }

    /// Direction a position opened by this action takes; `None` for Hold
    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::Buy => Some(Direction::Long),
            Action::Sell => Some(Direction::Short),
            Action::Hold => None,
        }
    }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for action in [Action::Hold, Action::Buy, Action::Sell] {
            assert_eq!(Action::from_index(action.to_index()), Some(action));
        }
        assert_eq!(Action::from_index(3), None);
    }

    #[test]
    fn test_implied_direction() {
        assert_eq!(Action::Buy.direction(), Some(Direction::Long));
        assert_eq!(Action::Sell.direction(), Some(Direction::Short));
        assert_eq!(Action::Hold.direction(), None);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Direction::Long.opposite(), Direction::Short);
        assert_eq!(Direction::Short.opposite(), Direction::Long);
    }
}
