//! Game configuration — immutable for a session

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::SymbolId;
use crate::paylines::{Payline, standard_9_paylines};
use crate::symbols::SymbolSet;

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self { reels: 5, rows: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must have at least 3 reels and 1 row, got {reels}x{rows}")]
    BadGrid { reels: u8, rows: u8 },
    #[error("config defines no paylines")]
    NoPaylines,
    #[error("payline {index} spans {got} reels, expected {expected}")]
    BadPaylineLength { index: u8, expected: u8, got: u8 },
    #[error("payline {index} references row {row} outside 0..{rows}")]
    RowOutOfRange { index: u8, row: u8, rows: u8 },
    #[error("symbol set is missing a {0} symbol")]
    MissingSpecial(&'static str),
    #[error("symbol set defines no regular symbols")]
    NoRegularSymbols,
    #[error("invalid config: {0}")]
    Parse(String),
}

/// Complete game configuration: grid shape, paylines, symbols, and the
/// special-symbol trigger/award tables. Constructed once at load time and
/// treated as read-only by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid shape
    pub grid: GridSpec,
    /// Payline coordinate sets
    pub paylines: Vec<Payline>,
    /// Symbol definitions
    pub symbols: SymbolSet,
    /// Scatter count that triggers free spins
    pub scatter_trigger_count: u8,
    /// From-start bonus run length that triggers the pick bonus
    pub bonus_trigger_count: u8,
    /// Free spins awarded per triggering scatter count
    pub free_spins_by_scatter: BTreeMap<u8, u32>,
}

impl GameConfig {
    /// Standard 5×3 game with 9 paylines and the standard symbol set.
    pub fn standard_5x3() -> Self {
        Self {
            grid: GridSpec::standard_5x3(),
            paylines: standard_9_paylines(),
            symbols: SymbolSet::standard(),
            scatter_trigger_count: 3,
            bonus_trigger_count: 3,
            free_spins_by_scatter: BTreeMap::from([(3, 10), (4, 15), (5, 20)]),
        }
    }

    /// Number of paylines.
    pub fn payline_count(&self) -> usize {
        self.paylines.len()
    }

    /// Wild symbol id. Validation guarantees presence.
    pub fn wild_id(&self) -> SymbolId {
        self.symbols.wild_id().unwrap_or(crate::grid::EMPTY)
    }

    /// Scatter symbol id. Validation guarantees presence.
    pub fn scatter_id(&self) -> SymbolId {
        self.symbols.scatter_id().unwrap_or(crate::grid::EMPTY)
    }

    /// Bonus symbol id. Validation guarantees presence.
    pub fn bonus_id(&self) -> SymbolId {
        self.symbols.bonus_id().unwrap_or(crate::grid::EMPTY)
    }

    /// Free spins awarded for a scatter count (0 when the table has no entry).
    pub fn free_spins_for(&self, scatters: u8) -> u32 {
        self.free_spins_by_scatter
            .get(&scatters)
            .copied()
            .unwrap_or(0)
    }

    /// Validate structural invariants: grid shape, payline geometry, and
    /// the presence of the special symbols the engine depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.reels < 3 || self.grid.rows < 1 {
            return Err(ConfigError::BadGrid {
                reels: self.grid.reels,
                rows: self.grid.rows,
            });
        }
        if self.paylines.is_empty() {
            return Err(ConfigError::NoPaylines);
        }
        for line in &self.paylines {
            if line.len() != self.grid.reels as usize {
                return Err(ConfigError::BadPaylineLength {
                    index: line.index,
                    expected: self.grid.reels,
                    got: line.len() as u8,
                });
            }
            for &row in &line.rows {
                if row >= self.grid.rows {
                    return Err(ConfigError::RowOutOfRange {
                        index: line.index,
                        row,
                        rows: self.grid.rows,
                    });
                }
            }
        }
        if self.symbols.regular_ids().is_empty() {
            return Err(ConfigError::NoRegularSymbols);
        }
        if self.symbols.wild_id().is_none() {
            return Err(ConfigError::MissingSpecial("wild"));
        }
        if self.symbols.scatter_id().is_none() {
            return Err(ConfigError::MissingSpecial("scatter"));
        }
        if self.symbols.bonus_id().is_none() {
            return Err(ConfigError::MissingSpecial("bonus"));
        }
        Ok(())
    }

    /// Export as pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Import from JSON, then validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Export as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Import from YAML, then validate.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_config_validates() {
        let config = GameConfig::standard_5x3();
        assert!(config.validate().is_ok());
        assert_eq!(config.payline_count(), 9);
    }

    #[test]
    fn test_payline_length_checked() {
        let mut config = GameConfig::standard_5x3();
        config.paylines[0].rows.pop();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadPaylineLength { index: 0, .. })
        ));
    }

    #[test]
    fn test_row_bounds_checked() {
        let mut config = GameConfig::standard_5x3();
        config.paylines[2].rows[4] = 7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RowOutOfRange { row: 7, .. })
        ));
    }

    #[test]
    fn test_missing_special_rejected() {
        let mut config = GameConfig::standard_5x3();
        config
            .symbols
            .symbols
            .retain(|s| s.kind != crate::symbols::SymbolKind::Scatter);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSpecial("scatter"))
        ));
    }

    #[test]
    fn test_specials_only_symbol_set_rejected() {
        // The board generator fills from the regular pool; a set with only
        // wild/scatter/bonus must fail validation, not panic downstream.
        let mut config = GameConfig::standard_5x3();
        config
            .symbols
            .symbols
            .retain(|s| s.kind != crate::symbols::SymbolKind::Regular);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoRegularSymbols)
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::standard_5x3();
        let json = config.to_json().unwrap();
        let parsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(parsed.grid, config.grid);
        assert_eq!(parsed.payline_count(), config.payline_count());
        assert_eq!(parsed.free_spins_for(4), 15);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = GameConfig::standard_5x3();
        let yaml = config.to_yaml().unwrap();
        let parsed = GameConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.grid, config.grid);
        assert_eq!(parsed.payline_count(), config.payline_count());
        assert_eq!(parsed.bonus_trigger_count, config.bonus_trigger_count);
    }

    #[test]
    fn test_free_spin_award_table() {
        let config = GameConfig::standard_5x3();
        assert_eq!(config.free_spins_for(3), 10);
        assert_eq!(config.free_spins_for(5), 20);
        assert_eq!(config.free_spins_for(2), 0);
    }
}
