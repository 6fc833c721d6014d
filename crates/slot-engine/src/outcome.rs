//! Outcome categories and weighted selection

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Closed set of outcome categories. Each kind maps to exactly one board
/// generation strategy (or none, for pick prizes), so dispatch is exhaustive
/// and checked by the compiler rather than by string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Dead spin — evaluates to exactly zero
    NoWin,
    /// Two scatters with the completing reel forced cold
    NearMissScatter,
    /// Two bonus symbols with the completing coordinate forced cold
    NearMissBonus,
    /// 3-of-a-kind from the low tier pool
    SmallWin,
    /// 4-of-a-kind from the medium tier pool
    MediumWin,
    /// 5-of-a-kind from the high tier pool
    LargeWin,
    /// Single-line win with a mandatory wild substitution
    WildWin,
    /// Several simultaneous line wins
    MultiLineWin,
    /// Scatter count paid on total board position, no feature trigger
    ScatterPay,
    /// Scatter board that triggers free spins
    FreeSpins,
    /// Bonus run board that triggers the pick bonus
    PickBonus,
    /// Free-spins feature spin with expanding wild reels
    WildExpansion,
    /// Pick bonus prize reveal (no board)
    PickPrize,
    /// Pick bonus round-ending bust (no board)
    PickBust,
}

/// A weighted outcome category: a target payout band or trigger condition
/// for one spin or pick. Belongs to exactly one table and is never mutated
/// after construction — the pick-prize bust weight is recomputed into a
/// call-local copy of its table, never in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    /// Selection weight within the owning table
    pub weight: u32,
    /// Long-run RTP contribution this entry is tuned for
    pub rtp: f64,
    /// Lower bound of the accepted win/bet ratio (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_win: Option<f64>,
    /// Upper bound of the accepted win/bet ratio (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_win: Option<f64>,
    /// Exact scatter count to place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scatters: Option<u8>,
    /// Exact bonus symbol count to place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_symbols: Option<u8>,
    /// Picks awarded (pick-bonus entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picks: Option<u8>,
    /// Win multiplier applied during the feature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

impl Outcome {
    fn new(kind: OutcomeKind, weight: u32, rtp: f64) -> Self {
        Self {
            kind,
            weight,
            rtp,
            min_win: None,
            max_win: None,
            scatters: None,
            bonus_symbols: None,
            picks: None,
            multiplier: None,
        }
    }

    fn band(mut self, min_win: f64, max_win: f64) -> Self {
        self.min_win = Some(min_win);
        self.max_win = Some(max_win);
        self
    }

    fn scatters(mut self, n: u8) -> Self {
        self.scatters = Some(n);
        self
    }

    fn bonus_symbols(mut self, n: u8) -> Self {
        self.bonus_symbols = Some(n);
        self
    }

    fn multiplier(mut self, m: f64) -> Self {
        self.multiplier = Some(m);
        self
    }

    /// Prize amount for pick outcomes, expressed as a bet multiplier.
    /// Pick prizes declare `min_win == max_win`.
    pub fn prize(&self) -> f64 {
        self.min_win.unwrap_or(0.0)
    }
}

/// Alias-free weighted pick: O(n) cumulative scan over a uniform draw in
/// `[0, total_weight)`. Ties resolve in table order. A degenerate table with
/// total weight 0 falls back to the first entry — unreachable with
/// well-formed config, so it is logged loudly. Empty tables yield `None`.
pub fn select_outcome<'a, R: Rng + ?Sized>(
    table: &'a [Outcome],
    rng: &mut R,
) -> Option<&'a Outcome> {
    let first = table.first()?;
    let total: u64 = table.iter().map(|o| o.weight as u64).sum();
    if total == 0 {
        log::warn!("outcome table has total weight 0, falling back to first entry");
        return Some(first);
    }

    let draw = rng.random_range(0..total);
    let mut cumulative = 0u64;
    for outcome in table {
        cumulative += outcome.weight as u64;
        if draw < cumulative {
            return Some(outcome);
        }
    }
    // Unreachable when total > 0
    Some(first)
}

/// Bust weight for a pick-bonus draw: a quadratic ramp from 0 on the first
/// pick toward the base weight as picks run out. Monotone non-decreasing in
/// `pick_number` for a fixed total.
pub fn bust_weight(base: u32, pick_number: u8, total_picks: u8) -> u32 {
    if total_picks == 0 {
        return base;
    }
    let ratio = pick_number as f64 / total_picks as f64;
    (base as f64 * ratio * ratio).floor() as u32
}

/// The three immutable outcome tables: base game, free spins, and the
/// pick-bonus prize pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeTables {
    pub base: Vec<Outcome>,
    pub free_spins: Vec<Outcome>,
    pub pick_prizes: Vec<Outcome>,
}

impl OutcomeTables {
    /// Standard tables tuned for roughly 95% overall RTP.
    pub fn standard() -> Self {
        use OutcomeKind::*;
        Self {
            base: vec![
                Outcome::new(NoWin, 780, 0.0),
                // Two scatters always pay the 2-scatter award, so the near
                // miss carries a real RTP contribution.
                Outcome::new(NearMissScatter, 30, 0.05),
                Outcome::new(NearMissBonus, 25, 0.0),
                Outcome::new(SmallWin, 200, 0.06).band(0.1, 2.0),
                Outcome::new(MediumWin, 60, 0.23).band(2.0, 10.0),
                Outcome::new(LargeWin, 5, 0.19).band(10.0, 60.0),
                Outcome::new(WildWin, 12, 0.10).band(2.0, 25.0),
                Outcome::new(MultiLineWin, 25, 0.17).band(3.0, 30.0),
                Outcome::new(ScatterPay, 12, 0.02).band(1.0, 8.0).scatters(2),
                Outcome::new(FreeSpins, 6, 0.12).scatters(3),
                Outcome::new(PickBonus, 5, 0.01).bonus_symbols(3),
            ],
            free_spins: vec![
                Outcome::new(NoWin, 400, 0.0),
                Outcome::new(SmallWin, 250, 0.0).band(0.1, 2.0),
                Outcome::new(MediumWin, 80, 0.0).band(2.0, 10.0),
                Outcome::new(LargeWin, 8, 0.0).band(10.0, 60.0),
                Outcome::new(MultiLineWin, 40, 0.0).band(3.0, 30.0),
                Outcome::new(WildExpansion, 12, 0.0).band(5.0, 60.0).multiplier(2.0),
                Outcome::new(FreeSpins, 6, 0.0).scatters(3),
            ],
            pick_prizes: vec![
                Outcome::new(PickPrize, 300, 0.0).band(1.0, 1.0),
                Outcome::new(PickPrize, 250, 0.0).band(2.0, 2.0),
                Outcome::new(PickPrize, 180, 0.0).band(5.0, 5.0),
                Outcome::new(PickPrize, 90, 0.0).band(10.0, 10.0),
                Outcome::new(PickPrize, 30, 0.0).band(25.0, 25.0),
                Outcome::new(PickBust, 150, 0.0),
            ],
        }
    }

    /// Draw one base-game outcome.
    pub fn base_outcome<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Outcome, EngineError> {
        select_outcome(&self.base, rng).ok_or(EngineError::EmptyTable("base"))
    }

    /// Draw one free-spins outcome.
    pub fn free_spin_outcome<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Outcome, EngineError> {
        select_outcome(&self.free_spins, rng).ok_or(EngineError::EmptyTable("free_spins"))
    }

    /// Draw one pick-bonus outcome. Works on a call-local clone of the prize
    /// table with the bust entry's weight ramped quadratically by pick
    /// progress; the shared table is never touched.
    pub fn pick_outcome<R: Rng + ?Sized>(
        &self,
        pick_number: u8,
        total_picks: u8,
        rng: &mut R,
    ) -> Result<Outcome, EngineError> {
        let mut table = self.pick_prizes.clone();
        for entry in &mut table {
            if entry.kind == OutcomeKind::PickBust {
                entry.weight = bust_weight(entry.weight, pick_number, total_picks);
            }
        }
        select_outcome(&table, rng)
            .cloned()
            .ok_or(EngineError::EmptyTable("pick_prizes"))
    }
}

impl Default for OutcomeTables {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;

    #[test]
    fn test_selection_frequencies_track_weights() {
        let tables = OutcomeTables::standard();
        let mut rng = StdRng::seed_from_u64(7);
        let total: u64 = tables.base.iter().map(|o| o.weight as u64).sum();

        let draws = 100_000usize;
        let mut counts: HashMap<OutcomeKind, usize> = HashMap::new();
        for _ in 0..draws {
            let outcome = tables.base_outcome(&mut rng).unwrap();
            *counts.entry(outcome.kind).or_default() += 1;
        }

        for outcome in &tables.base {
            let expected = outcome.weight as f64 / total as f64;
            let observed = counts.get(&outcome.kind).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.015,
                "{:?}: expected {:.4}, observed {:.4}",
                outcome.kind,
                expected,
                observed
            );
        }
    }

    #[test]
    fn test_zero_weight_table_falls_back_to_first() {
        let table = vec![
            Outcome::new(OutcomeKind::NoWin, 0, 0.0),
            Outcome::new(OutcomeKind::SmallWin, 0, 0.0),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select_outcome(&table, &mut rng).unwrap();
        assert_eq!(picked.kind, OutcomeKind::NoWin);
    }

    #[test]
    fn test_empty_table_yields_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(select_outcome(&[], &mut rng).is_none());
    }

    #[test]
    fn test_bust_weight_ramp() {
        let base = 150;
        let total = 10;
        assert_eq!(bust_weight(base, 0, total), 0);

        let mut previous = 0;
        for pick in 0..=total {
            let w = bust_weight(base, pick, total);
            assert!(w >= previous, "bust weight decreased at pick {pick}");
            previous = w;
        }
        assert_eq!(bust_weight(base, total, total), base);
    }

    #[test]
    fn test_pick_table_never_mutated() {
        let tables = OutcomeTables::standard();
        let original = tables.pick_prizes.clone();
        let mut rng = StdRng::seed_from_u64(9);

        for pick in 0..8 {
            tables.pick_outcome(pick, 8, &mut rng).unwrap();
        }
        assert_eq!(tables.pick_prizes, original);
    }

    #[test]
    fn test_first_pick_cannot_bust() {
        let tables = OutcomeTables::standard();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let outcome = tables.pick_outcome(0, 5, &mut rng).unwrap();
            assert_ne!(outcome.kind, OutcomeKind::PickBust);
        }
    }

    #[test]
    fn test_table_serde_round_trip() {
        let tables = OutcomeTables::standard();
        let json = serde_json::to_string(&tables).unwrap();
        let parsed: OutcomeTables = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.base, tables.base);
        assert_eq!(parsed.pick_prizes, tables.pick_prizes);
    }
}
