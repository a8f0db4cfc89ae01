// src/models/vote.rs

use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

/// A single vote. Stored as its delta, -1 or +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDelta {
    Up,
    Down,
}

impl VoteDelta {
    pub fn delta(self) -> i32 {
        match self {
            VoteDelta::Up => 1,
            VoteDelta::Down => -1,
        }
    }
}

impl TryFrom<i32> for VoteDelta {
    type Error = AppError;

    fn try_from(delta: i32) -> Result<Self, Self::Error> {
        match delta {
            1 => Ok(VoteDelta::Up),
            -1 => Ok(VoteDelta::Down),
            _ => Err(AppError::invalid("Vote delta must be -1 or 1")),
        }
    }
}

/// DTO for voting on a post or comment.
#[derive(Debug, Deserialize, Validate)]
pub struct VoteRequest {
    #[validate(range(min = -1, max = 1, message = "Vote delta must be -1 or 1"))]
    pub delta: i32,
}

impl VoteRequest {
    pub fn vote(&self) -> Result<VoteDelta, AppError> {
        VoteDelta::try_from(self.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn only_unit_deltas_are_votes() {
        assert_eq!(VoteDelta::try_from(1).unwrap(), VoteDelta::Up);
        assert_eq!(VoteDelta::try_from(-1).unwrap(), VoteDelta::Down);
        assert!(VoteDelta::try_from(0).unwrap_err().is(ErrorKind::Invalid));
        assert!(VoteDelta::try_from(2).unwrap_err().is(ErrorKind::Invalid));
    }

    #[test]
    fn range_validation_rejects_large_deltas() {
        assert!(VoteRequest { delta: 5 }.validate().is_err());
        assert!(VoteRequest { delta: -1 }.validate().is_ok());
    }
}
