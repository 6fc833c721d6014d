//! Constrained board generation
//!
//! Synthesizes a symbol grid matching a selected outcome's intent: a win in
//! a numeric band, an exact special-symbol count, a near miss. Construction
//! is generate-and-validate: build a candidate from the outcome's strategy,
//! score it with the evaluator, and retry on a band miss. The retry loop is
//! bounded; on exhaustion the closest-scoring candidate is returned and a
//! configuration-quality warning is logged, so a mis-tuned paytable degrades
//! to best effort instead of unbounded recursion.

use rand::Rng;
use rand::seq::SliceRandom;

use slot_core::{GameConfig, Grid, Payline, SymbolId, SymbolTier};

use crate::error::EngineError;
use crate::evaluator::{evaluate_wins, longest_bonus_run};
use crate::outcome::{Outcome, OutcomeKind};

/// Attempt cap for the generate-and-validate loop.
pub const MAX_GENERATION_ATTEMPTS: u32 = 200;

/// Chance of an isolated wild on a dead board.
const ISOLATED_WILD_CHANCE: f64 = 0.10;
/// Teaser scatter injection chance.
const TEASER_SCATTER_CHANCE: f64 = 0.08;
/// Teaser bonus injection chance.
const TEASER_BONUS_CHANCE: f64 = 0.06;
/// Share of multi-line runs that are 4 long instead of 3.
const LONG_RUN_CHANCE: f64 = 0.30;
/// Per-reel placement probability for wild-expansion seed runs.
const EXPANSION_SEED_CHANCE: f64 = 0.70;

/// Board generator over one immutable game configuration.
pub struct BoardGenerator<'a> {
    config: &'a GameConfig,
}

impl<'a> BoardGenerator<'a> {
    /// Create a generator. Validates the configuration up front so the
    /// strategies can index paylines and special symbols without checks.
    pub fn new(config: &'a GameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Synthesize a grid for `outcome` at `bet`. Pick outcomes carry no
    /// board and are rejected as configuration errors.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        bet: f64,
        rng: &mut R,
    ) -> Result<Grid, EngineError> {
        match outcome.kind {
            OutcomeKind::NoWin => Ok(self.no_win_board(bet, rng)),
            OutcomeKind::NearMissScatter => Ok(self.near_miss_scatter_board(rng)),
            OutcomeKind::NearMissBonus => Ok(self.near_miss_bonus_board(rng)),
            OutcomeKind::SmallWin => {
                Ok(self.line_win_board(outcome, bet, 3, SymbolTier::Low, false, rng))
            }
            OutcomeKind::MediumWin => {
                Ok(self.line_win_board(outcome, bet, 4, SymbolTier::Medium, false, rng))
            }
            OutcomeKind::LargeWin => {
                Ok(self.line_win_board(outcome, bet, 5, SymbolTier::High, false, rng))
            }
            OutcomeKind::WildWin => {
                Ok(self.line_win_board(outcome, bet, 4, SymbolTier::High, true, rng))
            }
            OutcomeKind::MultiLineWin => Ok(self.multi_line_board(outcome, bet, rng)),
            OutcomeKind::ScatterPay | OutcomeKind::FreeSpins => {
                Ok(self.scatter_board(outcome, bet, rng))
            }
            OutcomeKind::PickBonus => Ok(self.bonus_trigger_board(outcome, bet, rng)),
            OutcomeKind::WildExpansion => {
                let reels = self.pick_expansion_reels(rng);
                Ok(self.generate_wild_expansion(outcome, bet, &reels, rng))
            }
            OutcomeKind::PickPrize | OutcomeKind::PickBust => {
                Err(EngineError::NoStrategy(outcome.kind))
            }
        }
    }

    /// Choose the reels that will expand to full wilds. Decided before the
    /// board is built so the presentation layer knows which reels expand.
    /// The first reel never expands.
    pub fn pick_expansion_reels<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u8> {
        let mut order: Vec<u8> = (1..self.config.grid.reels).collect();
        order.shuffle(rng);
        let max = order.len().min(3);
        let n = if max <= 1 { max } else { rng.random_range(1..=max) };
        order.truncate(n);
        order.sort_unstable();
        order
    }

    /// Wild-expansion board for a pre-chosen reel subset. The candidate is
    /// validated against a simulated fully-expanded grid (every cell of each
    /// expanding reel set to wild) at the feature multiplier, because that is
    /// the grid the evaluator will ultimately score.
    pub fn generate_wild_expansion<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        bet: f64,
        expansion_reels: &[u8],
        rng: &mut R,
    ) -> Grid {
        let wild = self.config.wild_id();
        let rows = self.config.grid.rows;
        let multiplier = outcome.multiplier.unwrap_or(1.0);
        let remaining: Vec<u8> = (0..self.config.grid.reels)
            .filter(|r| !expansion_reels.contains(r))
            .collect();

        self.converge(
            outcome.kind,
            (outcome.min_win, outcome.max_win),
            rng,
            |g, rng| {
                let mut grid = g.fill_plain(&[], rng);
                for &reel in expansion_reels {
                    grid.set(reel, rng.random_range(0..rows), wild);
                }

                // Seed 2-3 high-tier runs on the non-expanding reels, each on
                // its own row, 70% placement chance per reel.
                let mut row_order: Vec<u8> = (0..rows).collect();
                row_order.shuffle(rng);
                let runs = rng.random_range(2..=3usize).min(row_order.len());
                for &row in row_order.iter().take(runs) {
                    let symbol = g.pick_from_tier(SymbolTier::High, rng);
                    for &reel in &remaining {
                        if rng.random::<f64>() < EXPANSION_SEED_CHANCE {
                            grid.set(reel, row, symbol);
                        }
                    }
                }
                grid
            },
            |g, grid| {
                let mut simulated = grid.clone();
                for &reel in expansion_reels {
                    for row in 0..rows {
                        simulated.set(reel, row, wild);
                    }
                }
                evaluate_wins(g.config, &simulated, bet, multiplier).win_ratio
            },
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STRATEGIES
    // ═══════════════════════════════════════════════════════════════════════

    fn no_win_board<R: Rng + ?Sized>(&self, bet: f64, rng: &mut R) -> Grid {
        let wild = self.config.wild_id();
        let reels = self.config.grid.reels;
        let rows = self.config.grid.rows;

        self.converge(
            OutcomeKind::NoWin,
            (Some(0.0), Some(0.0)),
            rng,
            |g, rng| {
                let mut grid = g.fill_plain(&[], rng);
                // An occasional lone wild off the first reel keeps dead
                // boards from looking sterile; the zero-win validation still
                // holds because the loop rejects any accidental pay.
                if reels > 1 && rng.random::<f64>() < ISOLATED_WILD_CHANCE {
                    let reel = rng.random_range(1..reels);
                    grid.set(reel, rng.random_range(0..rows), wild);
                }
                g.inject_teasers(&mut grid, &[], rng);
                grid
            },
            |g, grid| evaluate_wins(g.config, grid, bet, 1.0).win_ratio,
        )
    }

    fn near_miss_scatter_board<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let scatter = self.config.scatter_id();
        let rows = self.config.grid.rows;
        let mut grid = self.fill_plain(&[], rng);

        let mut reel_order: Vec<u8> = (0..self.config.grid.reels).collect();
        reel_order.shuffle(rng);

        for &reel in reel_order.iter().take(2) {
            grid.set(reel, rng.random_range(0..rows), scatter);
        }
        // Force the reel that would complete the trigger to a cold symbol.
        if let Some(&reel) = reel_order.get(2) {
            let symbol = self.pick_plain(&[], rng);
            grid.set(reel, rng.random_range(0..rows), symbol);
        }
        grid
    }

    fn near_miss_bonus_board<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let bonus = self.config.bonus_id();
        let mut grid = self.fill_plain(&[], rng);
        let line = self.random_payline(rng).clone();

        for (reel, row) in line.coords().take(2) {
            grid.set(reel, row, bonus);
        }
        // The completing coordinate is explicitly forced cold.
        if let Some((reel, row)) = line.coord(2) {
            let symbol = self.pick_plain(&[], rng);
            grid.set(reel, row, symbol);
        }
        grid
    }

    fn line_win_board<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        bet: f64,
        match_count: u8,
        tier: SymbolTier,
        wild_substitution: bool,
        rng: &mut R,
    ) -> Grid {
        let wild = self.config.wild_id();

        self.converge(
            outcome.kind,
            (outcome.min_win, outcome.max_win),
            rng,
            |g, rng| {
                let symbol = g.pick_from_tier(tier, rng);
                // Excluding the target from the filler prevents accidental
                // extra runs of the same symbol on other lines.
                let mut grid = g.fill_plain(&[symbol], rng);
                let line = g.random_payline(rng).clone();

                g.place_run(&mut grid, &line, symbol, match_count);
                if wild_substitution {
                    let slot = rng.random_range(0..match_count);
                    if let Some((reel, row)) = line.coord(slot as usize) {
                        grid.set(reel, row, wild);
                    }
                }
                g.guard_over_extension(&mut grid, &line, symbol, match_count, rng);

                let protected: Vec<(u8, u8)> =
                    line.coords().take(match_count as usize + 1).collect();
                g.inject_teasers(&mut grid, &protected, rng);
                grid
            },
            |g, grid| evaluate_wins(g.config, grid, bet, 1.0).win_ratio,
        )
    }

    fn multi_line_board<R: Rng + ?Sized>(&self, outcome: &Outcome, bet: f64, rng: &mut R) -> Grid {
        self.converge(
            outcome.kind,
            (outcome.min_win, outcome.max_win),
            rng,
            |g, rng| {
                let mut grid = g.fill_plain(&[], rng);

                let mut indices: Vec<usize> = (0..g.config.payline_count()).collect();
                indices.shuffle(rng);
                let max_k = indices.len().min(3);
                let k = if max_k <= 2 { max_k } else { rng.random_range(2..=max_k) };

                let mut protected = Vec::new();
                for (slot, &line_idx) in indices.iter().take(k).enumerate() {
                    // Tier by draw order: the first line drawn gets the
                    // highest-value pool.
                    let tier = match slot {
                        0 => SymbolTier::High,
                        1 => SymbolTier::Medium,
                        _ => SymbolTier::Low,
                    };
                    let symbol = g.pick_from_tier(tier, rng);
                    let count = if rng.random::<f64>() < LONG_RUN_CHANCE { 4 } else { 3 };
                    let line = g.config.paylines[line_idx].clone();

                    g.place_run(&mut grid, &line, symbol, count);
                    g.guard_over_extension(&mut grid, &line, symbol, count, rng);
                    protected.extend(line.coords().take(count as usize + 1));
                }

                g.inject_teasers(&mut grid, &protected, rng);
                grid
            },
            |g, grid| evaluate_wins(g.config, grid, bet, 1.0).win_ratio,
        )
    }

    fn scatter_board<R: Rng + ?Sized>(&self, outcome: &Outcome, bet: f64, rng: &mut R) -> Grid {
        let scatter = self.config.scatter_id();
        let rows = self.config.grid.rows;
        let n = outcome
            .scatters
            .unwrap_or(self.config.scatter_trigger_count)
            .min(self.config.grid.reels);

        self.converge(
            outcome.kind,
            (outcome.min_win, outcome.max_win),
            rng,
            |g, rng| {
                // Start unconstrained, then strip strays so the board ends
                // with exactly n scatters on n distinct reels.
                let mut grid = g.random_board(rng);
                g.strip_specials(&mut grid, rng);

                let mut reel_order: Vec<u8> = (0..g.config.grid.reels).collect();
                reel_order.shuffle(rng);
                for &reel in reel_order.iter().take(n as usize) {
                    grid.set(reel, rng.random_range(0..rows), scatter);
                }
                grid
            },
            |g, grid| evaluate_wins(g.config, grid, bet, 1.0).win_ratio,
        )
    }

    fn bonus_trigger_board<R: Rng + ?Sized>(
        &self,
        outcome: &Outcome,
        bet: f64,
        rng: &mut R,
    ) -> Grid {
        let bonus = self.config.bonus_id();
        let n = outcome
            .bonus_symbols
            .unwrap_or(self.config.bonus_trigger_count)
            .min(self.config.grid.reels);

        self.converge(
            outcome.kind,
            (outcome.min_win, outcome.max_win),
            rng,
            |g, rng| {
                let mut grid = g.random_board(rng);
                g.strip_specials(&mut grid, rng);

                let line = g.random_payline(rng).clone();
                for (reel, row) in line.coords().take(n as usize) {
                    grid.set(reel, row, bonus);
                }
                grid
            },
            |g, grid| evaluate_wins(g.config, grid, bet, 1.0).win_ratio,
        )
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SHARED SUB-ALGORITHMS
    // ═══════════════════════════════════════════════════════════════════════

    /// Bounded generate-and-validate loop. Returns the first candidate whose
    /// score lands in `band`; after [`MAX_GENERATION_ATTEMPTS`] misses, the
    /// closest candidate wins and a warning is logged.
    fn converge<R, B, S>(
        &self,
        kind: OutcomeKind,
        band: (Option<f64>, Option<f64>),
        rng: &mut R,
        mut build: B,
        score: S,
    ) -> Grid
    where
        R: Rng + ?Sized,
        B: FnMut(&Self, &mut R) -> Grid,
        S: Fn(&Self, &Grid) -> f64,
    {
        let mut best: Option<(f64, Grid)> = None;

        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let grid = build(self, rng);
            let ratio = score(self, &grid);
            let distance = band_distance(ratio, band);
            if distance == 0.0 {
                return grid;
            }
            if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                best = Some((distance, grid));
            }
        }

        log::warn!(
            "board generation for {kind:?} missed band {band:?} after {MAX_GENERATION_ATTEMPTS} \
             attempts; returning closest candidate (paytable likely mis-tuned)"
        );
        match best {
            Some((_, grid)) => grid,
            // Only reachable with a zero attempt cap.
            None => Grid::empty(self.config.grid.reels, self.config.grid.rows),
        }
    }

    /// Plain symbol pool: regular symbols minus `exclude`.
    fn plain_pool(&self, exclude: &[SymbolId]) -> Vec<SymbolId> {
        let pool: Vec<SymbolId> = self
            .config
            .symbols
            .regular_ids()
            .into_iter()
            .filter(|id| !exclude.contains(id))
            .collect();
        if pool.is_empty() {
            self.config.symbols.regular_ids()
        } else {
            pool
        }
    }

    fn pick_plain<R: Rng + ?Sized>(&self, exclude: &[SymbolId], rng: &mut R) -> SymbolId {
        let pool = self.plain_pool(exclude);
        pool[rng.random_range(0..pool.len())]
    }

    /// Random symbol from a tier pool, falling back to the full regular pool
    /// for symbol sets that leave a tier empty.
    fn pick_from_tier<R: Rng + ?Sized>(&self, tier: SymbolTier, rng: &mut R) -> SymbolId {
        let pool = self.config.symbols.tier_ids(tier);
        if pool.is_empty() {
            self.pick_plain(&[], rng)
        } else {
            pool[rng.random_range(0..pool.len())]
        }
    }

    /// Fill every cell with a uniformly random plain symbol.
    fn fill_plain<R: Rng + ?Sized>(&self, exclude: &[SymbolId], rng: &mut R) -> Grid {
        let pool = self.plain_pool(exclude);
        let mut grid = Grid::empty(self.config.grid.reels, self.config.grid.rows);
        for reel in 0..self.config.grid.reels {
            for row in 0..self.config.grid.rows {
                grid.set(reel, row, pool[rng.random_range(0..pool.len())]);
            }
        }
        grid
    }

    /// Fill every cell uniformly over the full symbol list, specials
    /// included.
    fn random_board<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let ids: Vec<SymbolId> = self.config.symbols.symbols.iter().map(|s| s.id).collect();
        let mut grid = Grid::empty(self.config.grid.reels, self.config.grid.rows);
        for reel in 0..self.config.grid.reels {
            for row in 0..self.config.grid.rows {
                grid.set(reel, row, ids[rng.random_range(0..ids.len())]);
            }
        }
        grid
    }

    /// Replace any wild/scatter/bonus cell with a plain symbol.
    fn strip_specials<R: Rng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) {
        let wild = self.config.wild_id();
        let scatter = self.config.scatter_id();
        let bonus = self.config.bonus_id();

        let special_cells: Vec<(u8, u8)> = grid
            .cells()
            .filter(|&(_, _, s)| s == wild || s == scatter || s == bonus)
            .map(|(reel, row, _)| (reel, row))
            .collect();
        for (reel, row) in special_cells {
            let symbol = self.pick_plain(&[], rng);
            grid.set(reel, row, symbol);
        }
    }

    fn random_payline<R: Rng + ?Sized>(&self, rng: &mut R) -> &Payline {
        &self.config.paylines[rng.random_range(0..self.config.payline_count())]
    }

    /// Write `count` copies of `symbol` along a line's first coordinates.
    fn place_run(&self, grid: &mut Grid, line: &Payline, symbol: SymbolId, count: u8) {
        for (reel, row) in line.coords().take(count as usize) {
            grid.set(reel, row, symbol);
        }
    }

    /// Force the coordinate after a placed run to a symbol that is neither
    /// the run's symbol nor wild, so the evaluator cannot score a longer run
    /// than intended.
    fn guard_over_extension<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        line: &Payline,
        target: SymbolId,
        count: u8,
        rng: &mut R,
    ) {
        if let Some((reel, row)) = line.coord(count as usize) {
            let symbol = self.pick_plain(&[target], rng);
            grid.set(reel, row, symbol);
        }
    }

    /// Cosmetic teaser symbols: at most one scatter and one-or-two bonus
    /// symbols, each only when none already exist, at cells verified not to
    /// create a from-start bonus run at the trigger count or a payable
    /// scatter count. Placement never lands on `protected` coordinates.
    fn inject_teasers<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        protected: &[(u8, u8)],
        rng: &mut R,
    ) {
        let scatter = self.config.scatter_id();
        let bonus = self.config.bonus_id();

        if grid.count(scatter) == 0 && rng.random::<f64>() < TEASER_SCATTER_CHANCE {
            // A single scatter can never pay (pays start at 2).
            if let Some((reel, row)) = self.teaser_cell(grid, protected, rng) {
                grid.set(reel, row, scatter);
            }
        }

        if grid.count(bonus) == 0 && rng.random::<f64>() < TEASER_BONUS_CHANCE {
            let count = rng.random_range(1..=2);
            for _ in 0..count {
                if let Some((reel, row)) = self.teaser_cell(grid, protected, rng) {
                    let previous = grid.get(reel, row).unwrap_or(slot_core::EMPTY);
                    grid.set(reel, row, bonus);
                    // Verify against every payline; revert a placement that
                    // would complete a trigger run.
                    if longest_bonus_run(self.config, grid) >= self.config.bonus_trigger_count {
                        grid.set(reel, row, previous);
                    }
                }
            }
        }
    }

    /// A random cell outside the protected set that holds a plain symbol.
    fn teaser_cell<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        protected: &[(u8, u8)],
        rng: &mut R,
    ) -> Option<(u8, u8)> {
        let wild = self.config.wild_id();
        let scatter = self.config.scatter_id();
        let bonus = self.config.bonus_id();

        for _ in 0..10 {
            let reel = rng.random_range(0..self.config.grid.reels);
            let row = rng.random_range(0..self.config.grid.rows);
            if protected.contains(&(reel, row)) {
                continue;
            }
            match grid.get(reel, row) {
                Some(s) if s != wild && s != scatter && s != bonus => return Some((reel, row)),
                _ => continue,
            }
        }
        None
    }
}

/// 0.0 inside the (inclusive) band, otherwise the distance to the nearest
/// bound. Open bounds always pass.
fn band_distance(ratio: f64, band: (Option<f64>, Option<f64>)) -> f64 {
    const EPS: f64 = 1e-9;
    if let Some(lo) = band.0 {
        if ratio < lo - EPS {
            return lo - ratio;
        }
    }
    if let Some(hi) = band.1 {
        if ratio > hi + EPS {
            return ratio - hi;
        }
    }
    0.0
}
