//! Level and scoring parameters.
//!
//! Both structs deserialize from TOML with every field optional; missing
//! fields fall back to the defaults below.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    DEFAULT_COLS, DEFAULT_COMBO_TIMEOUT_SECS, DEFAULT_MAX_MOVES, DEFAULT_PALETTE_SIZE,
    DEFAULT_ROWS, DEFAULT_SIZE_BONUS, LEGACY_SIZE_BONUS, MAX_PALETTE_SIZE, MIN_PALETTE_SIZE,
};

/// Largest board side accepted by [`LevelConfig::validate`]
pub const MAX_BOARD_SIDE: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("board must be between 1 and {max} cells on each side, got {cols}x{rows}")]
    BoardSize { cols: usize, rows: usize, max: usize },

    #[error("board must hold at least two cells, got {cols}x{rows}")]
    BoardTooSmall { cols: usize, rows: usize },

    #[error("palette size must be between {min} and {max}, got {got}")]
    PaletteSize { got: u8, min: u8, max: u8 },

    #[error("max_moves must be at least 1")]
    NoMoves,

    #[error("combo timeout must be a positive number of seconds, got {0}")]
    ComboTimeout(f64),

    #[error("size bonus breakpoints must be ascending with bonuses of at least 1.0")]
    SizeBonus,

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Immutable parameters of one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of colors in play (K)
    pub palette_size: u8,
    pub max_moves: u32,
}

impl LevelConfig {
    pub fn new(cols: usize, rows: usize, palette_size: u8, max_moves: u32) -> Self {
        Self {
            rows,
            cols,
            palette_size,
            max_moves,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0
            || self.rows == 0
            || self.cols > MAX_BOARD_SIDE
            || self.rows > MAX_BOARD_SIDE
        {
            return Err(ConfigError::BoardSize {
                cols: self.cols,
                rows: self.rows,
                max: MAX_BOARD_SIDE,
            });
        }
        if self.cols * self.rows < 2 {
            return Err(ConfigError::BoardTooSmall {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(MIN_PALETTE_SIZE..=MAX_PALETTE_SIZE).contains(&self.palette_size) {
            return Err(ConfigError::PaletteSize {
                got: self.palette_size,
                min: MIN_PALETTE_SIZE,
                max: MAX_PALETTE_SIZE,
            });
        }
        if self.max_moves == 0 {
            return Err(ConfigError::NoMoves);
        }
        Ok(())
    }

    /// Parse and validate a level from a flat TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            palette_size: DEFAULT_PALETTE_SIZE,
            max_moves: DEFAULT_MAX_MOVES,
        }
    }
}

/// Combo timing and size-bonus table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    pub combo_timeout_secs: f64,
    /// `(min_count, bonus_tenths)` breakpoints, ascending
    pub size_bonus: Vec<(usize, u32)>,
}

impl ScoreRules {
    /// Breakpoints 5/8/10 used by earlier level assets
    pub fn legacy() -> Self {
        Self {
            size_bonus: LEGACY_SIZE_BONUS.to_vec(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.combo_timeout_secs.is_finite() && self.combo_timeout_secs > 0.0) {
            return Err(ConfigError::ComboTimeout(self.combo_timeout_secs));
        }
        let ascending = self
            .size_bonus
            .windows(2)
            .all(|w| w[0].0 < w[1].0 && w[0].1 <= w[1].1);
        let at_least_one = self.size_bonus.iter().all(|&(_, tenths)| tenths >= 10);
        if !ascending || !at_least_one {
            return Err(ConfigError::SizeBonus);
        }
        Ok(())
    }

    /// Size bonus in tenths for a group of `count` cells
    pub fn size_bonus_tenths(&self, count: usize) -> u32 {
        self.size_bonus
            .iter()
            .rev()
            .find(|&&(min, _)| count >= min)
            .map_or(10, |&(_, tenths)| tenths)
    }
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            combo_timeout_secs: DEFAULT_COMBO_TIMEOUT_SECS,
            size_bonus: DEFAULT_SIZE_BONUS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_valid() {
        let config = LevelConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.cell_count(), 64);
    }

    #[test]
    fn test_single_column_boards_are_allowed() {
        assert_eq!(LevelConfig::new(1, 3, 2, 5).validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_levels() {
        assert!(matches!(
            LevelConfig::new(0, 4, 3, 5).validate(),
            Err(ConfigError::BoardSize { .. })
        ));
        assert!(matches!(
            LevelConfig::new(1, 1, 3, 5).validate(),
            Err(ConfigError::BoardTooSmall { .. })
        ));
        assert!(matches!(
            LevelConfig::new(4, 4, 1, 5).validate(),
            Err(ConfigError::PaletteSize { got: 1, .. })
        ));
        assert!(matches!(
            LevelConfig::new(4, 4, 8, 5).validate(),
            Err(ConfigError::PaletteSize { got: 8, .. })
        ));
        assert_eq!(
            LevelConfig::new(4, 4, 3, 0).validate(),
            Err(ConfigError::NoMoves)
        );
    }

    #[test]
    fn test_level_from_toml_fills_defaults() {
        let config = LevelConfig::from_toml_str("rows = 5\npalette_size = 3\n").unwrap();
        assert_eq!(config.rows, 5);
        assert_eq!(config.cols, DEFAULT_COLS);
        assert_eq!(config.palette_size, 3);
        assert_eq!(config.max_moves, DEFAULT_MAX_MOVES);
    }

    #[test]
    fn test_level_from_toml_validates() {
        assert!(matches!(
            LevelConfig::from_toml_str("palette_size = 9"),
            Err(ConfigError::PaletteSize { .. })
        ));
        assert!(matches!(
            LevelConfig::from_toml_str("rows = \"tall\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_default_size_bonus_breakpoints() {
        let rules = ScoreRules::default();
        assert_eq!(rules.size_bonus_tenths(2), 10);
        assert_eq!(rules.size_bonus_tenths(3), 10);
        assert_eq!(rules.size_bonus_tenths(4), 15);
        assert_eq!(rules.size_bonus_tenths(5), 15);
        assert_eq!(rules.size_bonus_tenths(6), 20);
        assert_eq!(rules.size_bonus_tenths(7), 20);
        assert_eq!(rules.size_bonus_tenths(8), 30);
        assert_eq!(rules.size_bonus_tenths(40), 30);
    }

    #[test]
    fn test_legacy_size_bonus_breakpoints() {
        let rules = ScoreRules::legacy();
        assert_eq!(rules.size_bonus_tenths(4), 10);
        assert_eq!(rules.size_bonus_tenths(5), 15);
        assert_eq!(rules.size_bonus_tenths(8), 20);
        assert_eq!(rules.size_bonus_tenths(10), 30);
        assert_eq!(rules.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_score_rules() {
        let mut rules = ScoreRules::default();
        rules.combo_timeout_secs = 0.0;
        assert!(matches!(rules.validate(), Err(ConfigError::ComboTimeout(_))));

        let rules = ScoreRules {
            size_bonus: vec![(6, 20), (4, 15)],
            ..ScoreRules::default()
        };
        assert_eq!(rules.validate(), Err(ConfigError::SizeBonus));

        let rules = ScoreRules {
            size_bonus: vec![(4, 5)],
            ..ScoreRules::default()
        };
        assert_eq!(rules.validate(), Err(ConfigError::SizeBonus));
    }
}
