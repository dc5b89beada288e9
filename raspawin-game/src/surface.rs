//! Removable cover of a scratch card.
//!
//! The cover is a grid of unit cells. A stroke uncovers every cell whose
//! centre lies within the brush radius. Only the stroke's bounding box is
//! visited, and an uncovered-cell counter is kept alongside the grid so the
//! coverage fraction never needs a full rescan.

use serde::{Deserialize, Serialize};

/// Result of a single stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScratchOutcome {
    pub newly_uncovered: u64,
    pub coverage: f64,
    /// True only for the stroke that first crossed the reveal threshold.
    pub revealed: bool,
}

#[derive(Debug, Clone)]
pub struct SurfaceTracker {
    width: u32,
    height: u32,
    uncovered: Vec<bool>,
    uncovered_count: u64,
    threshold: f64,
    reveal_signalled: bool,
}

impl SurfaceTracker {
    pub fn new(width: u32, height: u32, threshold: f64) -> Self {
        let mut tracker = Self {
            width: 0,
            height: 0,
            uncovered: Vec::new(),
            uncovered_count: 0,
            threshold,
            reveal_signalled: false,
        };
        tracker.reset(width, height);
        tracker
    }

    /// Cover every cell again and forget any reveal.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.uncovered = vec![false; width as usize * height as usize];
        self.uncovered_count = 0;
        self.reveal_signalled = false;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn total_cells(&self) -> u64 {
        self.uncovered.len() as u64
    }

    pub fn uncovered_cells(&self) -> u64 {
        self.uncovered_count
    }

    pub fn has_revealed(&self) -> bool {
        self.reveal_signalled
    }

    pub fn is_uncovered(&self, cell_x: u32, cell_y: u32) -> bool {
        if cell_x >= self.width || cell_y >= self.height {
            return false;
        }
        self.uncovered[self.index(cell_x as usize, cell_y as usize)]
    }

    pub fn coverage_fraction(&self) -> f64 {
        if self.uncovered.is_empty() {
            return 0.0;
        }
        self.uncovered_count as f64 / self.uncovered.len() as f64
    }

    /// Uncover the disc of `radius` around `(x, y)`.
    ///
    /// Only the part of the disc that lies on the surface is uncovered, so a
    /// stroke centred off the card may touch nothing. Strokes with a
    /// non-finite centre or a radius that is not positive change nothing.
    pub fn scratch(&mut self, x: f64, y: f64, radius: f64) -> ScratchOutcome {
        if !x.is_finite()
            || !y.is_finite()
            || radius.is_nan()
            || radius <= 0.0
            || self.uncovered.is_empty()
        {
            return self.outcome(0);
        }

        let width = self.width as f64;
        let height = self.height as f64;

        let x_start = (x - radius).floor().clamp(0.0, width) as usize;
        let x_end = (x + radius).ceil().clamp(0.0, width) as usize;
        let y_start = (y - radius).floor().clamp(0.0, height) as usize;
        let y_end = (y + radius).ceil().clamp(0.0, height) as usize;
        let radius_sq = radius * radius;

        let mut newly_uncovered = 0;
        for cell_y in y_start..y_end {
            let dy = cell_y as f64 + 0.5 - y;
            for cell_x in x_start..x_end {
                let dx = cell_x as f64 + 0.5 - x;
                if dx * dx + dy * dy > radius_sq {
                    continue;
                }

                let index = self.index(cell_x, cell_y);
                if !self.uncovered[index] {
                    self.uncovered[index] = true;
                    newly_uncovered += 1;
                }
            }
        }

        self.uncovered_count += newly_uncovered;
        tracing::debug!(
            "Scratch at ({:.1}, {:.1}) r={:.1}: {} new cells, coverage {:.3}",
            x,
            y,
            radius,
            newly_uncovered,
            self.coverage_fraction()
        );

        self.outcome(newly_uncovered)
    }

    /// Uncover everything. Returns true if this produced the reveal signal.
    pub fn force_reveal(&mut self) -> bool {
        self.uncovered.iter_mut().for_each(|cell| *cell = true);
        self.uncovered_count = self.uncovered.len() as u64;
        self.signal_reveal()
    }

    fn outcome(&mut self, newly_uncovered: u64) -> ScratchOutcome {
        let coverage = self.coverage_fraction();
        let revealed = coverage >= self.threshold && self.signal_reveal();
        ScratchOutcome {
            newly_uncovered,
            coverage,
            revealed,
        }
    }

    fn signal_reveal(&mut self) -> bool {
        if self.reveal_signalled {
            return false;
        }
        self.reveal_signalled = true;
        true
    }

    fn index(&self, cell_x: usize, cell_y: usize) -> usize {
        cell_y * self.width as usize + cell_x
    }
}
