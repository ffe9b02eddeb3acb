//! Difficulty scaling
//!
//! Maps a level and category to the operand range used by the generator.
//! Multiplication and division widen with level faster than the word-problem
//! categories, but from a smaller base than addition and subtraction.

use super::Category;
use crate::consts::{MAX_LEVEL, MIN_LEVEL};

/// Inclusive operand bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    pub min: i64,
    pub max: i64,
}

impl LevelParams {
    /// Number of distinct operands in the range
    pub fn span(&self) -> i64 {
        self.max - self.min + 1
    }
}

/// Operand range for `level` (clamped to the valid level range)
pub fn level_params(level: u32, category: Category) -> LevelParams {
    let level = level.clamp(MIN_LEVEL, MAX_LEVEL) as i64;
    match category {
        Category::Multiplication | Category::Division => LevelParams {
            min: 1 + level / 2,
            max: 10 + level * 2,
        },
        Category::Addition | Category::Subtraction => LevelParams {
            min: 1 + level / 2,
            max: 20 + level * 3,
        },
        _ => LevelParams {
            min: 1 + level / 3,
            max: 10 + level,
        },
    }
}
