use rand::Rng;

use crate::audio::Cue;
use crate::config::Config;
use crate::evaluate::{evaluate, Occupancy};
use crate::layout::{self, Circle, CircleRole};
use crate::scores::ScoreDb;
use crate::sensor::TrackedPoint;

/// Which screen owns the layout and the tick behavior right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MainMenu,
    GameLoop,
    EndScreen,
}

/// How the last round ended; drives the feedback flash during the
/// inter-round pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Per-round bookkeeping, reset whenever a round starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRecord {
    /// 1-based round index.
    pub index: u32,
    pub seconds_remaining: f64,
    pub occupancy: Occupancy,
}

/// Single owned aggregate for all game progression state. The tick loop is
/// the only writer; every transition replaces the layout wholesale.
#[derive(Debug)]
pub struct Session {
    pub phase: Phase,
    pub circles: Vec<Circle>,
    /// Player count the next session will be sized for.
    pub players: u32,
    pub score: u32,
    pub round: RoundRecord,
    /// Consecutive-presence counters, parallel to `circles`. Monotonic: a
    /// missed tick pauses a counter but never rewinds it, so intermittent
    /// detection gaps do not cancel a confirmation gesture. Reset on every
    /// phase transition.
    pub dwell: Vec<u32>,
    /// Ticks left of the deferred round transition; rendering stays live
    /// while this counts down.
    pub pause_ticks_left: u32,
    pub last_outcome: Option<Outcome>,
    /// Read once per end-screen entry.
    pub highscore: u32,
    pub new_highscore: bool,
    pub config: Config,
    pub scores: Option<ScoreDb>,
    tick_secs: f64,
}

impl Session {
    pub fn new(config: Config, scores: Option<ScoreDb>, tick_secs: f64) -> Self {
        let circles = layout::main_menu_layout(
            config.display_width,
            config.display_height,
            &config.selector_counts,
        );
        let dwell = vec![0; circles.len()];
        Self {
            phase: Phase::MainMenu,
            players: config.players,
            score: 0,
            round: RoundRecord::default(),
            dwell,
            pause_ticks_left: 0,
            last_outcome: None,
            highscore: 0,
            new_highscore: false,
            circles,
            config,
            scores,
            tick_secs,
        }
    }

    /// Advance the machine by one frame of tracked points. Returns the cues
    /// the presentation layer should fire this tick.
    pub fn tick(&mut self, points: &[TrackedPoint], rng: &mut impl Rng) -> Vec<Cue> {
        let mut cues = Vec::new();
        match self.phase {
            Phase::MainMenu => self.tick_menu(points, rng, &mut cues),
            Phase::GameLoop => self.tick_round(points, rng, &mut cues),
            Phase::EndScreen => self.tick_end(points, &mut cues),
        }
        cues
    }

    /// True while the inter-round feedback flash is on screen.
    pub fn in_outcome_pause(&self) -> bool {
        self.phase == Phase::GameLoop && self.pause_ticks_left > 0
    }

    fn tick_menu(&mut self, points: &[TrackedPoint], rng: &mut impl Rng, cues: &mut Vec<Cue>) {
        evaluate(&mut self.circles, points);
        self.advance_dwell();
        // Confirmation always takes at least one detected tick, even when
        // `wait_frames` is configured down to zero.
        for (i, circle) in self.circles.iter().enumerate() {
            if let CircleRole::MenuSelector { players } = circle.role {
                if self.dwell[i] == self.config.wait_frames.max(1) {
                    tracing::debug!(players, "player count selected");
                    self.players = players;
                }
            }
        }
        let hub_confirmed = self
            .circles
            .iter()
            .zip(&self.dwell)
            .any(|(c, &d)| c.role == CircleRole::MenuHub && d >= self.config.wait_frames.max(1));
        if hub_confirmed {
            self.start_game(rng, cues);
        }
    }

    fn tick_round(&mut self, points: &[TrackedPoint], rng: &mut impl Rng, cues: &mut Vec<Cue>) {
        if self.pause_ticks_left > 0 {
            // Deferred transition: keep the outcome flash up, score nothing.
            self.pause_ticks_left -= 1;
            if self.pause_ticks_left == 0 {
                self.advance_past_pause(rng, cues);
            }
            return;
        }

        self.round.seconds_remaining -= self.tick_secs;
        self.round.occupancy = evaluate(&mut self.circles, points);

        if self.round.occupancy.all_satisfied() {
            let bonus = (self.config.points_per_second as f64
                * self.round.seconds_remaining.max(0.0))
            .round() as u32;
            self.score += bonus;
            tracing::debug!(round = self.round.index, bonus, "round satisfied");
            self.finish_round(Outcome::Success, rng, cues);
        } else if self.round.seconds_remaining <= 0.0 {
            tracing::debug!(round = self.round.index, "round timed out");
            self.finish_round(Outcome::Failure, rng, cues);
        }
    }

    fn tick_end(&mut self, points: &[TrackedPoint], cues: &mut Vec<Cue>) {
        evaluate(&mut self.circles, points);
        self.advance_dwell();
        let replay_confirmed = self
            .circles
            .iter()
            .zip(&self.dwell)
            .any(|(c, &d)| c.role == CircleRole::ReplayHub && d >= self.config.wait_frames.max(1));
        if replay_confirmed {
            self.reset_to_menu();
            cues.push(Cue::AmbientQuiet);
        }
    }

    /// One step per counter: a circle that held at least one point this tick
    /// advances, the rest hold their value.
    fn advance_dwell(&mut self) {
        for (circle, dwell) in self.circles.iter().zip(self.dwell.iter_mut()) {
            if circle.current > 0 {
                *dwell += 1;
            }
        }
    }

    fn start_game(&mut self, rng: &mut impl Rng, cues: &mut Vec<Cue>) {
        tracing::debug!(players = self.players, "session starting");
        self.score = 0;
        self.pause_ticks_left = 0;
        self.last_outcome = None;
        self.new_highscore = false;
        self.round = RoundRecord {
            index: 1,
            seconds_remaining: self.config.round_secs,
            occupancy: Occupancy::default(),
        };
        let circles = layout::generate_round_layout(
            rng,
            self.players,
            self.config.display_width,
            self.config.display_height,
        );
        self.enter_phase(Phase::GameLoop, circles);
        cues.push(Cue::AmbientLoud);
    }

    fn finish_round(&mut self, outcome: Outcome, rng: &mut impl Rng, cues: &mut Vec<Cue>) {
        cues.push(match outcome {
            Outcome::Success => Cue::Success,
            Outcome::Failure => Cue::Failure,
        });
        cues.push(Cue::AmbientStop);
        self.last_outcome = Some(outcome);
        self.round.index += 1;
        self.pause_ticks_left = self.config.pause_ticks;
        // The field goes dark during the pause; the next layout only
        // appears when the pause expires.
        self.circles.clear();
        self.dwell.clear();
        if self.pause_ticks_left == 0 {
            // No feedback pause configured: move on within the same tick,
            // otherwise the expiry branch would never run.
            self.advance_past_pause(rng, cues);
        }
    }

    fn advance_past_pause(&mut self, rng: &mut impl Rng, cues: &mut Vec<Cue>) {
        if self.round.index > self.config.rounds {
            self.enter_end_screen(cues);
        } else {
            self.begin_round(rng);
            cues.push(Cue::AmbientLoud);
        }
    }

    fn begin_round(&mut self, rng: &mut impl Rng) {
        self.last_outcome = None;
        self.round.seconds_remaining = self.config.round_secs;
        self.round.occupancy = Occupancy::default();
        let circles = layout::generate_round_layout(
            rng,
            self.players,
            self.config.display_width,
            self.config.display_height,
        );
        self.dwell = vec![0; circles.len()];
        self.circles = circles;
    }

    fn enter_end_screen(&mut self, cues: &mut Vec<Cue>) {
        cues.push(Cue::Outro);
        self.highscore = self
            .scores
            .as_ref()
            .map(|db| db.max_score(self.players, self.config.rounds))
            .unwrap_or(0);
        self.new_highscore = self.score > self.highscore;
        if let Some(db) = &self.scores {
            if let Err(e) = db.append(self.players, self.config.rounds, self.score) {
                tracing::warn!(error = %e, "failed to append score record");
            }
        }
        tracing::debug!(
            score = self.score,
            highscore = self.highscore,
            "end screen entered"
        );
        let circles =
            layout::end_screen_layout(self.config.display_width, self.config.display_height);
        self.enter_phase(Phase::EndScreen, circles);
    }

    fn reset_to_menu(&mut self) {
        self.score = 0;
        self.last_outcome = None;
        self.pause_ticks_left = 0;
        self.new_highscore = false;
        self.round = RoundRecord::default();
        let circles = layout::main_menu_layout(
            self.config.display_width,
            self.config.display_height,
            &self.config.selector_counts,
        );
        self.enter_phase(Phase::MainMenu, circles);
    }

    fn enter_phase(&mut self, phase: Phase, circles: Vec<Circle>) {
        tracing::debug!(?phase, "phase transition");
        self.phase = phase;
        self.dwell = vec![0; circles.len()];
        self.circles = circles;
    }
}
