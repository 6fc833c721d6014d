//! Symbol definitions and pay tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grid::SymbolId;

/// Symbol role classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Regular paying symbol
    Regular,
    /// Wild — substitutes for any regular symbol
    Wild,
    /// Scatter — pays on total board count, drives free spins
    Scatter,
    /// Bonus — from-start run length drives the pick bonus
    Bonus,
}

/// Value tier used by the board generator's placement pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolTier {
    Low,
    Medium,
    High,
}

/// A symbol definition with its pay-by-match-count table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol id (never 0 — that is the empty cell)
    pub id: SymbolId,
    /// Symbol name (e.g., "HP1", "LP3", "WILD")
    pub name: String,
    /// Role
    pub kind: SymbolKind,
    /// Value tier (placement pool for regular symbols)
    pub tier: SymbolTier,
    /// Payout multiplier per match count. Counts without an entry pay 0.
    #[serde(default)]
    pub pays: BTreeMap<u8, f64>,
}

impl Symbol {
    /// Create a regular symbol with pays keyed from 3-of-a-kind upward.
    pub fn regular(id: SymbolId, name: impl Into<String>, tier: SymbolTier, pays: &[f64]) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Regular,
            tier,
            pays: pays
                .iter()
                .enumerate()
                .map(|(i, &p)| (i as u8 + 3, p))
                .collect(),
        }
    }

    /// Create a wild symbol. Wilds carry their own pay table so that an
    /// all-wild line can pay directly.
    pub fn wild(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Wild,
            tier: SymbolTier::High,
            pays: BTreeMap::from([(3, 50.0), (4, 200.0), (5, 1000.0)]),
        }
    }

    /// Create a scatter symbol. Scatter pays are total-bet multipliers and
    /// start at 2 occurrences.
    pub fn scatter(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Scatter,
            tier: SymbolTier::High,
            pays: BTreeMap::from([(2, 2.0), (3, 5.0), (4, 20.0), (5, 100.0)]),
        }
    }

    /// Create a bonus symbol (no pay table — it only triggers picks).
    pub fn bonus(id: SymbolId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: SymbolKind::Bonus,
            tier: SymbolTier::High,
            pays: BTreeMap::new(),
        }
    }

    /// Payout multiplier for a match count (0.0 when undefined).
    pub fn pay(&self, match_count: u8) -> f64 {
        self.pays.get(&match_count).copied().unwrap_or(0.0)
    }
}

/// The ordered symbol list for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSet {
    pub symbols: Vec<Symbol>,
}

impl SymbolSet {
    /// Standard 5-reel set: HP = high paying, MP = medium, LP = low.
    pub fn standard() -> Self {
        let symbols = vec![
            Symbol::regular(1, "HP1", SymbolTier::High, &[20.0, 100.0, 500.0]),
            Symbol::regular(2, "HP2", SymbolTier::High, &[15.0, 75.0, 300.0]),
            Symbol::regular(3, "MP1", SymbolTier::Medium, &[10.0, 50.0, 200.0]),
            Symbol::regular(4, "MP2", SymbolTier::Medium, &[8.0, 40.0, 150.0]),
            Symbol::regular(5, "MP3", SymbolTier::Medium, &[5.0, 25.0, 100.0]),
            Symbol::regular(6, "LP1", SymbolTier::Low, &[4.0, 20.0, 80.0]),
            Symbol::regular(7, "LP2", SymbolTier::Low, &[3.0, 15.0, 60.0]),
            Symbol::regular(8, "LP3", SymbolTier::Low, &[2.0, 10.0, 40.0]),
            Symbol::regular(9, "LP4", SymbolTier::Low, &[1.0, 5.0, 20.0]),
            Symbol::wild(10, "WILD"),
            Symbol::scatter(11, "SCATTER"),
            Symbol::bonus(12, "BONUS"),
        ];
        Self { symbols }
    }

    /// Get symbol by id.
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Get symbol by name.
    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// All regular symbol ids, in declaration order.
    pub fn regular_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular)
            .map(|s| s.id)
            .collect()
    }

    /// Regular symbol ids in a given tier.
    pub fn tier_ids(&self, tier: SymbolTier) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Regular && s.tier == tier)
            .map(|s| s.id)
            .collect()
    }

    fn id_of(&self, kind: SymbolKind) -> Option<SymbolId> {
        self.symbols.iter().find(|s| s.kind == kind).map(|s| s.id)
    }

    /// Wild symbol id, if the set defines one.
    pub fn wild_id(&self) -> Option<SymbolId> {
        self.id_of(SymbolKind::Wild)
    }

    /// Scatter symbol id, if the set defines one.
    pub fn scatter_id(&self) -> Option<SymbolId> {
        self.id_of(SymbolKind::Scatter)
    }

    /// Bonus symbol id, if the set defines one.
    pub fn bonus_id(&self) -> Option<SymbolId> {
        self.id_of(SymbolKind::Bonus)
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_pay_lookup() {
        let symbol = Symbol::regular(1, "HP1", SymbolTier::High, &[20.0, 100.0, 500.0]);
        assert_eq!(symbol.pay(2), 0.0);
        assert_eq!(symbol.pay(3), 20.0);
        assert_eq!(symbol.pay(4), 100.0);
        assert_eq!(symbol.pay(5), 500.0);
        assert_eq!(symbol.pay(6), 0.0);
    }

    #[test]
    fn test_scatter_pays_from_two() {
        let scatter = Symbol::scatter(11, "SCATTER");
        assert_eq!(scatter.pay(1), 0.0);
        assert_eq!(scatter.pay(2), 2.0);
    }

    #[test]
    fn test_standard_set_roles() {
        let set = SymbolSet::standard();
        assert!(set.wild_id().is_some());
        assert!(set.scatter_id().is_some());
        assert!(set.bonus_id().is_some());
        assert_eq!(set.regular_ids().len(), 9);
        assert!(!set.tier_ids(SymbolTier::High).is_empty());
        assert!(!set.tier_ids(SymbolTier::Medium).is_empty());
        assert!(!set.tier_ids(SymbolTier::Low).is_empty());
    }

    #[test]
    fn test_bonus_never_pays() {
        let set = SymbolSet::standard();
        let bonus = set.get(set.bonus_id().unwrap()).unwrap();
        for count in 0..=5 {
            assert_eq!(bonus.pay(count), 0.0);
        }
    }
}
