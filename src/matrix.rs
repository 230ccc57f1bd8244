use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const GLYPHS: [char; 2] = ['0', '1'];
pub const BLANK: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSettings {
    pub rows: usize,
    pub cols: usize,
    pub spawn_one_in: u32,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self {
            rows: 25,
            cols: 80,
            spawn_one_in: 5,
        }
    }
}

pub struct MatrixAnimator<R = StdRng> {
    rows: VecDeque<Vec<char>>,
    settings: MatrixSettings,
    rng: R,
}

impl MatrixAnimator<StdRng> {
    pub fn new(settings: MatrixSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }
}

impl<R: Rng> MatrixAnimator<R> {
    pub fn with_rng(settings: MatrixSettings, rng: R) -> Self {
        let rows = (0..settings.rows)
            .map(|_| vec![BLANK; settings.cols])
            .collect();
        let mut animator = Self {
            rows,
            settings,
            rng,
        };
        animator.tick();
        animator
    }

    pub fn tick(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let mut bottom = self.rows.pop_front().unwrap_or_default();
        bottom.clear();
        for _ in 0..self.settings.cols {
            let cell = if self.rng.gen_ratio(1, self.settings.spawn_one_in) {
                GLYPHS[self.rng.gen_range(0..GLYPHS.len())]
            } else {
                BLANK
            };
            bottom.push(cell);
        }
        self.rows.push_back(bottom);
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.iter().collect()).collect()
    }
}
