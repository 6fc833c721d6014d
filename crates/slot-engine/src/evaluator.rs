//! Deterministic win evaluation
//!
//! Pure functions from (grid, bet, multiplier) to payouts. Nothing here
//! consumes RNG or holds state, so any grid can be scored independently of
//! how it was produced — the board generator leans on this for rejection
//! sampling, and tests use it as ground truth.

use serde::{Deserialize, Serialize};

use slot_core::{EMPTY, GameConfig, Grid, Payline, SymbolId};

use crate::outcome::{Outcome, OutcomeKind};

/// Line index used for scatter entries in a [`WinResult`].
pub const SCATTER_LINE: i32 = -1;

/// A win on one payline (or the scatter entry at index −1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Payline index; [`SCATTER_LINE`] for the scatter entry
    pub line_index: i32,
    /// Effective winning symbol
    pub symbol_id: SymbolId,
    /// Symbol name for presentation
    pub symbol_name: String,
    /// Matched symbol count
    pub match_count: u8,
    /// Win amount in bet currency
    pub win_amount: f64,
    /// Winning coordinates: the matched line prefix, or every scatter cell
    pub positions: Vec<(u8, u8)>,
}

/// Result of evaluating one grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinResult {
    pub line_wins: Vec<LineWin>,
    pub total_win: f64,
    /// `total_win / bet` (0 when bet is 0)
    pub win_ratio: f64,
}

impl WinResult {
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }
}

/// Bonus-trigger flags derived from a grid and its intended outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTriggers {
    pub free_spins: bool,
    pub free_spins_count: u32,
    pub bonus_trigger: bool,
    pub bonus_picks: u8,
}

/// Score a grid: every payline plus the position-independent scatter count.
///
/// Line pays are `pay × (bet / payline_count) × multiplier`; scatter pays are
/// `pay × bet × multiplier`. The multiplier is 1 in the base game and the
/// feature multiplier during free spins.
pub fn evaluate_wins(config: &GameConfig, grid: &Grid, bet: f64, multiplier: f64) -> WinResult {
    let mut line_wins = Vec::new();
    let bet_per_line = bet / config.payline_count().max(1) as f64;

    for payline in &config.paylines {
        if let Some(win) = evaluate_line(config, grid, payline, bet_per_line, multiplier) {
            line_wins.push(win);
        }
    }

    if let Some(win) = evaluate_scatter(config, grid, bet, multiplier) {
        line_wins.push(win);
    }

    let total_win: f64 = line_wins.iter().map(|w| w.win_amount).sum();
    WinResult {
        line_wins,
        total_win,
        win_ratio: if bet > 0.0 { total_win / bet } else { 0.0 },
    }
}

fn evaluate_line(
    config: &GameConfig,
    grid: &Grid,
    payline: &Payline,
    bet_per_line: f64,
    multiplier: f64,
) -> Option<LineWin> {
    let wild = config.wild_id();
    let scatter = config.scatter_id();
    let bonus = config.bonus_id();

    // Out-of-bounds coordinates read as EMPTY and never match anything.
    let symbols: Vec<SymbolId> = payline
        .coords()
        .map(|(reel, row)| grid.get(reel, row).unwrap_or(EMPTY))
        .collect();

    let first = *symbols.first()?;
    if first == EMPTY || first == scatter || first == bonus {
        return None;
    }

    // A leading wild adopts the first substitutable symbol down the line.
    // An all-wild prefix stays wild and pays from the wild's own table.
    let effective = if first == wild {
        symbols
            .iter()
            .copied()
            .find(|&s| s != wild && s != scatter && s != bonus && s != EMPTY)
            .unwrap_or(wild)
    } else {
        first
    };

    // Position 0 always counts; the run extends while symbols match the
    // effective symbol or are wild, and stops at the first mismatch.
    let mut match_count = 1u8;
    for &symbol in &symbols[1..] {
        if symbol == effective || symbol == wild {
            match_count += 1;
        } else {
            break;
        }
    }

    let symbol = config.symbols.get(effective)?;
    let pay = symbol.pay(match_count);
    if pay <= 0.0 {
        return None;
    }

    let positions: Vec<(u8, u8)> = payline.coords().take(match_count as usize).collect();
    Some(LineWin {
        line_index: payline.index as i32,
        symbol_id: effective,
        symbol_name: symbol.name.clone(),
        match_count,
        win_amount: pay * bet_per_line * multiplier,
        positions,
    })
}

fn evaluate_scatter(
    config: &GameConfig,
    grid: &Grid,
    bet: f64,
    multiplier: f64,
) -> Option<LineWin> {
    let scatter_id = config.scatter_id();
    let positions = grid.positions(scatter_id);
    let count = positions.len() as u8;
    if count < 2 {
        return None;
    }

    let scatter = config.symbols.get(scatter_id)?;
    let pay = scatter.pay(count);
    if pay <= 0.0 {
        return None;
    }

    Some(LineWin {
        line_index: SCATTER_LINE,
        symbol_id: scatter_id,
        symbol_name: scatter.name.clone(),
        match_count: count,
        win_amount: pay * bet * multiplier,
        positions,
    })
}

/// Longest from-start bonus-symbol run across all paylines.
pub fn longest_bonus_run(config: &GameConfig, grid: &Grid) -> u8 {
    let bonus = config.bonus_id();
    let mut longest = 0u8;
    for payline in &config.paylines {
        let mut run = 0u8;
        for (reel, row) in payline.coords() {
            if grid.get(reel, row) == Some(bonus) {
                run += 1;
            } else {
                break;
            }
        }
        longest = longest.max(run);
    }
    longest
}

/// Derive feature triggers for a grid produced for `outcome`.
///
/// Free spins are decided by the outcome tag, not by recounting scatters:
/// scatter-pay outcomes place 2+ scatters that must NOT start the feature.
/// Callers are responsible for keeping the outcome and its grid in sync.
/// The pick bonus, by contrast, is read straight off the grid: the longest
/// from-start bonus run at or above the trigger count becomes the pick count.
pub fn check_bonus_triggers(config: &GameConfig, grid: &Grid, outcome: &Outcome) -> BonusTriggers {
    let free_spins = outcome.kind == OutcomeKind::FreeSpins;
    let free_spins_count = if free_spins {
        let scatters = outcome.scatters.unwrap_or(config.scatter_trigger_count);
        config.free_spins_for(scatters)
    } else {
        0
    };

    let run = longest_bonus_run(config, grid);
    let bonus_trigger = run >= config.bonus_trigger_count;

    BonusTriggers {
        free_spins,
        free_spins_count,
        bonus_trigger,
        bonus_picks: if bonus_trigger { run } else { 0 },
    }
}
