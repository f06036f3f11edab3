//! Attention vigilance grid: one cell lights per tick, targets are worth
//! pressing and distractors cost points.
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Verdict;

pub const GRID_CELLS: usize = 9;
pub const TARGET_PROBABILITY: f64 = 0.7;
pub const TARGET_POINTS: f64 = 10.0;
pub const DISTRACTOR_PENALTY: f64 = -5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Target,
    Distractor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCell {
    pub kind: CellKind,
    pub active: bool,
}

impl Default for SignalCell {
    fn default() -> Self {
        Self {
            kind: CellKind::Distractor,
            active: false,
        }
    }
}

/// Which cell lights up next and whether it is a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub cell: usize,
    pub kind: CellKind,
}

/// Uniform cell, target with probability [`TARGET_PROBABILITY`].
pub fn next_signal<R: Rng + ?Sized>(rng: &mut R) -> Signal {
    let cell = rng.gen_range(0..GRID_CELLS);
    let kind = if rng.gen_bool(TARGET_PROBABILITY) {
        CellKind::Target
    } else {
        CellKind::Distractor
    };
    Signal { cell, kind }
}

/// Score a press on `cell`. Inactive cells produce no verdict.
#[must_use]
pub fn evaluate_signal(cell: &SignalCell) -> Option<Verdict> {
    if !cell.active {
        return None;
    }
    Some(match cell.kind {
        CellKind::Target => Verdict::hit(TARGET_POINTS),
        CellKind::Distractor => Verdict::miss(DISTRACTOR_PENALTY),
    })
}

/// Nine-cell board with at most one active cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalGrid {
    cells: [SignalCell; GRID_CELLS],
    shown: u32,
}

impl SignalGrid {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Light a single cell, darkening any other.
    pub fn show(&mut self, signal: Signal) {
        self.clear();
        if let Some(cell) = self.cells.get_mut(signal.cell) {
            *cell = SignalCell {
                kind: signal.kind,
                active: true,
            };
        }
        self.shown = self.shown.saturating_add(1);
    }

    /// Darken `generation`'s signal, unless a newer one replaced it.
    pub fn hide(&mut self, generation: u32) {
        if generation == self.shown {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.active = false;
        }
    }

    /// Number of signals shown so far; doubles as the generation stamp for [`Self::hide`].
    #[must_use]
    pub const fn shown(&self) -> u32 {
        self.shown
    }

    #[must_use]
    pub const fn cells(&self) -> &[SignalCell; GRID_CELLS] {
        &self.cells
    }

    #[must_use]
    pub fn active(&self) -> Option<(usize, CellKind)> {
        self.cells
            .iter()
            .position(|cell| cell.active)
            .map(|index| (index, self.cells[index].kind))
    }

    /// Evaluate a press and darken the cell so it scores at most once.
    pub fn press(&mut self, index: usize) -> Option<Verdict> {
        let cell = self.cells.get_mut(index)?;
        let verdict = evaluate_signal(cell)?;
        cell.active = false;
        Some(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn press_scores_once_and_deactivates() {
        let mut grid = SignalGrid::new();
        grid.show(Signal {
            cell: 4,
            kind: CellKind::Target,
        });
        assert_eq!(grid.active(), Some((4, CellKind::Target)));
        assert_eq!(grid.press(3), None);
        assert_eq!(grid.press(4), Some(Verdict::hit(TARGET_POINTS)));
        assert_eq!(grid.press(4), None);
        assert_eq!(grid.press(42), None);
    }

    #[test]
    fn distractor_costs_points() {
        let mut grid = SignalGrid::new();
        grid.show(Signal {
            cell: 0,
            kind: CellKind::Distractor,
        });
        assert_eq!(grid.press(0), Some(Verdict::miss(DISTRACTOR_PENALTY)));
    }

    #[test]
    fn stale_hide_keeps_newer_signal() {
        let mut grid = SignalGrid::new();
        grid.show(Signal {
            cell: 1,
            kind: CellKind::Target,
        });
        let first = grid.shown();
        grid.show(Signal {
            cell: 2,
            kind: CellKind::Target,
        });
        grid.hide(first);
        assert_eq!(grid.active(), Some((2, CellKind::Target)));
        grid.hide(grid.shown());
        assert_eq!(grid.active(), None);
    }

    #[test]
    fn generator_stays_on_grid_and_mostly_targets() {
        let mut rng = SmallRng::seed_from_u64(11);
        let signals: Vec<Signal> = (0..2_000).map(|_| next_signal(&mut rng)).collect();
        assert!(signals.iter().all(|signal| signal.cell < GRID_CELLS));
        let targets = signals
            .iter()
            .filter(|signal| signal.kind == CellKind::Target)
            .count();
        assert!((1_250..1_550).contains(&targets), "targets: {targets}");
    }
}
