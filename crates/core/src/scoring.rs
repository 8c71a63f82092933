//! Scoring module - move budget, combo multiplier and points
//!
//! Rules:
//! - Each legal tap consumes one move. A tap within `combo_timeout` of the
//!   previous one climbs one step up the multiplier table; a slower tap
//!   resets it to 1.0.
//! - While idle, the multiplier decays one step per elapsed `combo_timeout`.
//! - Points are `count * 10 * size_bonus * multiplier`, floored.
//!
//! Multipliers and bonuses are kept in tenths so the floor is computed in
//! exact integer arithmetic (`1.1` has no exact binary representation).
//!
//! The engine does not call out to anyone; it queues [`UiEvent`]s which the
//! caller drains with [`ScoreEngine::take_events`].

use tracing::info;

use crate::config::ScoreRules;
use crate::error::SaveError;
use crate::types::{
    UiEvent, HIGH_SCORE_KEY, LOW_MOVES_THRESHOLD, MULTIPLIER_TENTHS, POINTS_PER_BLOCK,
};

/// Integer key/value persistence for the high score
pub trait HighScoreStore {
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64);
    /// Flush to durable storage. Failures are reported, never fatal.
    fn save(&mut self) -> Result<(), SaveError>;
}

/// Points for a blast of `count` cells under the given bonus and multiplier
pub fn calculate_points(count: usize, bonus_tenths: u32, multiplier_tenths: u32) -> u32 {
    let base = (count as u64) * u64::from(POINTS_PER_BLOCK);
    let scaled = base * u64::from(bonus_tenths) * u64::from(multiplier_tenths) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct ScoreEngine {
    rules: ScoreRules,
    max_moves: u32,
    score: u32,
    moves_left: u32,
    multiplier_index: usize,
    last_move_time: f64,
    game_over: bool,
    events: Vec<UiEvent>,
}

impl ScoreEngine {
    pub fn new(max_moves: u32, rules: ScoreRules) -> Self {
        Self {
            rules,
            max_moves,
            score: 0,
            moves_left: max_moves,
            multiplier_index: 0,
            last_move_time: 0.0,
            game_over: false,
            events: Vec::new(),
        }
    }

    /// Reset for a new game at time `now`
    pub fn start_game(&mut self, now: f64) {
        self.score = 0;
        self.moves_left = self.max_moves;
        self.multiplier_index = 0;
        self.last_move_time = now;
        self.game_over = false;

        self.events.push(UiEvent::ScoreChanged(self.score));
        self.events.push(UiEvent::MovesChanged(self.moves_left));
        self.events
            .push(UiEvent::MultiplierChanged(self.current_multiplier()));
    }

    /// Spend a move. Returns false when none are left.
    pub fn try_use_move(&mut self, now: f64) -> bool {
        if self.moves_left == 0 || self.game_over {
            return false;
        }

        self.moves_left -= 1;
        self.events.push(UiEvent::MovesChanged(self.moves_left));

        if now - self.last_move_time <= self.rules.combo_timeout_secs {
            self.multiplier_index = (self.multiplier_index + 1).min(MULTIPLIER_TENTHS.len() - 1);
        } else {
            self.multiplier_index = 0;
        }
        self.last_move_time = now;

        self.events
            .push(UiEvent::MultiplierChanged(self.current_multiplier()));
        true
    }

    /// Step the multiplier down once if the combo window has lapsed
    pub fn tick_decay(&mut self, now: f64) {
        if self.multiplier_index == 0 || self.game_over {
            return;
        }
        if now - self.last_move_time > self.rules.combo_timeout_secs {
            self.multiplier_index -= 1;
            self.last_move_time = now;
            self.events
                .push(UiEvent::MultiplierChanged(self.current_multiplier()));
        }
    }

    /// Award points for a blast of `block_count` cells; returns the delta
    pub fn add_score(&mut self, block_count: usize) -> u32 {
        let delta = calculate_points(
            block_count,
            self.rules.size_bonus_tenths(block_count),
            self.multiplier_tenths(),
        );
        self.score = self.score.saturating_add(delta);
        self.events.push(UiEvent::ScoreChanged(self.score));
        delta
    }

    /// End the game once the move budget is spent.
    ///
    /// Returns `Some(new_record)` when the game ended, `None` while moves remain.
    pub fn check_game_end(&mut self, store: &mut dyn HighScoreStore) -> Option<bool> {
        if self.moves_left > 0 {
            return None;
        }
        if self.game_over {
            return Some(false);
        }
        self.game_over = true;

        let high_score = store.get_int(HIGH_SCORE_KEY, 0);
        let new_record = i64::from(self.score) > high_score;
        if new_record {
            store.set_int(HIGH_SCORE_KEY, i64::from(self.score));
            if let Err(err) = store.save() {
                tracing::warn!(error = %err, "failed to persist high score");
            }
        }

        info!(score = self.score, high_score, new_record, "game over");
        self.events.push(UiEvent::GameOver { new_record });
        Some(new_record)
    }

    /// End the game without touching the high score
    pub fn abort_game(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.events.push(UiEvent::GameOver { new_record: false });
    }

    /// Drain queued UI events in emission order
    pub fn take_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn max_moves(&self) -> u32 {
        self.max_moves
    }

    pub fn multiplier_index(&self) -> usize {
        self.multiplier_index
    }

    pub fn multiplier_tenths(&self) -> u32 {
        MULTIPLIER_TENTHS[self.multiplier_index]
    }

    pub fn current_multiplier(&self) -> f32 {
        self.multiplier_tenths() as f32 / 10.0
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Whether the HUD should warn about the remaining budget
    pub fn is_low_on_moves(&self) -> bool {
        self.moves_left <= LOW_MOVES_THRESHOLD
    }

    pub fn rules(&self) -> &ScoreRules {
        &self.rules
    }
}
