//! Round state machine: consumes the stabilized gesture signal one tick per
//! frame and owns round/match progress, countdown timing, scoring, and
//! persistence at match end.
//!
//! The machine is single-threaded by design; hosts serving several viewers
//! of one match wrap it in a lock and hand out `snapshot()` copies for
//! display.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::classifier;
use crate::config::EngineConfig;
use crate::recorder::MatchRecorder;
use crate::source::FrameInput;
use crate::stabilizer::Stabilizer;
use crate::types::{
    GamePhase, Gesture, HandObservation, Handedness, MatchRecord, MatchSnapshot, Round,
    RoundOutcome, StabilizedSignal, Winner,
};

// =========================================================================
// Settings and events
// =========================================================================

/// Tunables for one machine instance.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub points_to_win: u32,
    pub countdown: Duration,
    pub cooldown: Duration,
    pub miss_tolerance: u32,
    pub player_side: Option<Handedness>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            points_to_win: 5,
            countdown: Duration::from_secs(3),
            cooldown: Duration::from_secs(2),
            miss_tolerance: 30,
            player_side: None,
        }
    }
}

impl GameSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        // Non-finite or negative durations from a hand-edited config file
        // collapse to zero rather than panicking.
        let secs = |value: f32| {
            if value.is_finite() && value > 0.0 {
                Duration::from_secs_f32(value)
            } else {
                Duration::ZERO
            }
        };
        Self {
            points_to_win: config.game.points_to_win,
            countdown: secs(config.game.countdown_secs),
            cooldown: secs(config.game.cooldown_secs),
            miss_tolerance: config.detection.miss_tolerance_frames,
            player_side: config.player_side(),
        }
    }
}

/// Observable state changes, in the order they happened within a tick.
/// The complete set a display or transport layer needs to subscribe to.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A confident gesture appeared in Waiting; the countdown started.
    RoundStarted,
    /// The hand vanished before the countdown expired; back to Waiting.
    CountdownAborted,
    RoundResolved {
        player: Gesture,
        opponent: Gesture,
        outcome: RoundOutcome,
    },
    MatchOver {
        winner: Winner,
    },
    SourceUnavailable,
    SourceRestored,
    Reset,
}

impl GameEvent {
    /// Wire name for transport layers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoundStarted => "round_started",
            Self::CountdownAborted => "countdown_aborted",
            Self::RoundResolved { .. } => "round_resolved",
            Self::MatchOver { .. } => "match_over",
            Self::SourceUnavailable => "source_unavailable",
            Self::SourceRestored => "source_restored",
            Self::Reset => "reset",
        }
    }
}

/// What a direct (non-vision) play resolved to.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: Round,
    pub player_score: u32,
    pub opponent_score: u32,
    pub match_over: bool,
    pub events: Vec<GameEvent>,
}

// =========================================================================
// Machine
// =========================================================================

pub struct GameMachine {
    settings: GameSettings,
    stabilizer: Stabilizer,
    rng: ChaCha8Rng,
    recorder: Box<dyn MatchRecorder>,

    phase: GamePhase,
    /// When the current Countdown or Cooldown was entered.
    phase_entered: Option<Instant>,
    player_score: u32,
    opponent_score: u32,
    rounds: Vec<Round>,
    last_outcome: Option<RoundOutcome>,
    winner: Option<Winner>,
    source_available: bool,
    pending_reset: bool,
}

impl GameMachine {
    /// `seed` pins the opponent's gesture sequence; pass `None` to seed from
    /// entropy.
    pub fn new(settings: GameSettings, recorder: Box<dyn MatchRecorder>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let stabilizer = Stabilizer::new(settings.miss_tolerance);
        Self {
            settings,
            stabilizer,
            rng,
            recorder,
            phase: GamePhase::Waiting,
            phase_entered: None,
            player_score: 0,
            opponent_score: 0,
            rounds: Vec::new(),
            last_outcome: None,
            winner: None,
            source_available: true,
            pending_reset: false,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn signal(&self) -> StabilizedSignal {
        self.stabilizer.signal_now()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            phase: self.phase,
            player_score: self.player_score,
            opponent_score: self.opponent_score,
            rounds_played: self.rounds.len() as u32,
            points_to_win: self.settings.points_to_win,
            current_gesture: self.stabilizer.signal_now().gesture,
            source_available: self.source_available,
            last_outcome: self.last_outcome,
            winner: self.winner,
        }
    }

    /// Advance the machine by one captured frame. `now` is read once per
    /// tick by the caller and compared against stored phase-entry times;
    /// frame duration is never assumed.
    pub fn tick(&mut self, now: Instant, input: FrameInput) -> Vec<GameEvent> {
        let mut events = Vec::new();

        self.track_availability(&input, &mut events);

        let observed = match &input {
            FrameInput::Hands(hands) => self.select_hand(hands).map(classifier::classify),
            _ => None,
        };
        let signal = self.stabilizer.update(observed);

        match self.phase {
            GamePhase::Waiting => {
                if signal.gesture != Gesture::None {
                    self.phase = GamePhase::Countdown;
                    self.phase_entered = Some(now);
                    debug!("countdown started on {}", signal.gesture.as_str());
                    events.push(GameEvent::RoundStarted);
                }
            }
            GamePhase::Countdown => {
                if self.elapsed(now) >= self.settings.countdown {
                    if signal.gesture != Gesture::None {
                        self.resolve_round(now, signal.gesture, &mut events);
                    } else {
                        self.phase = GamePhase::Waiting;
                        self.phase_entered = None;
                        debug!("countdown aborted, signal lost");
                        events.push(GameEvent::CountdownAborted);
                    }
                }
            }
            GamePhase::Cooldown => {
                if self.elapsed(now) >= self.settings.cooldown {
                    self.phase = GamePhase::Waiting;
                    self.phase_entered = None;
                }
            }
            GamePhase::MatchOver => {
                // Terminal for the match; only a reset moves us on.
            }
            GamePhase::Resolving => {
                // Resolving is entered and exited inside resolve_round and
                // is never the current phase at tick entry.
            }
        }

        // A queued reset lands at the tick boundary, never mid-round.
        if self.pending_reset && self.phase != GamePhase::Countdown {
            self.apply_reset(&mut events);
        }

        events
    }

    /// Request a reset. Honored immediately in Waiting and MatchOver;
    /// otherwise queued and applied at the next stable tick boundary, so a
    /// countdown in flight still resolves (or aborts) first.
    pub fn request_reset(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase {
            GamePhase::Waiting | GamePhase::MatchOver => self.apply_reset(&mut events),
            _ => {
                debug!("reset queued during {}", self.phase.as_str());
                self.pending_reset = true;
            }
        }
        events
    }

    /// Resolve a round directly from a gesture label, bypassing the vision
    /// path. Rejected when the label is not a playable gesture or when the
    /// machine is not in Waiting; rejected requests never mutate state.
    pub fn play(&mut self, label: &str, now: Instant) -> Result<RoundReport> {
        let Some(gesture) = Gesture::parse(label) else {
            bail!("invalid gesture label: {:?}", label);
        };
        if self.phase != GamePhase::Waiting {
            bail!("play not accepted in current phase ({})", self.phase.as_str());
        }

        let mut events = Vec::new();
        let round = self.resolve_round(now, gesture, &mut events);
        Ok(RoundReport {
            round,
            player_score: self.player_score,
            opponent_score: self.opponent_score,
            match_over: self.phase == GamePhase::MatchOver,
            events,
        })
    }

    // ---------------------------------------------------------------------

    fn elapsed(&self, now: Instant) -> Duration {
        match self.phase_entered {
            Some(entered) => now.saturating_duration_since(entered),
            None => Duration::ZERO,
        }
    }

    fn track_availability(&mut self, input: &FrameInput, events: &mut Vec<GameEvent>) {
        match input {
            FrameInput::Unavailable => {
                if self.source_available {
                    self.source_available = false;
                    warn!("landmark source unavailable");
                    events.push(GameEvent::SourceUnavailable);
                }
            }
            _ => {
                if !self.source_available {
                    self.source_available = true;
                    info!("landmark source restored");
                    events.push(GameEvent::SourceRestored);
                }
            }
        }
    }

    /// First observation matching the configured side, or the first
    /// observation when no side filter is set.
    fn select_hand<'a>(&self, hands: &'a [HandObservation]) -> Option<&'a HandObservation> {
        match self.settings.player_side {
            Some(side) => hands.iter().find(|h| h.handedness == side),
            None => hands.first(),
        }
    }

    /// Drawn at the instant the round resolves, never before.
    fn draw_opponent(&mut self) -> Gesture {
        *[Gesture::Rock, Gesture::Paper, Gesture::Scissors]
            .choose(&mut self.rng)
            .expect("choices are non-empty")
    }

    fn resolve_round(
        &mut self,
        now: Instant,
        player: Gesture,
        events: &mut Vec<GameEvent>,
    ) -> Round {
        self.phase = GamePhase::Resolving;

        let opponent = self.draw_opponent();
        let outcome = round_outcome(player, opponent);
        let round = Round {
            number: self.rounds.len() as u32 + 1,
            player,
            opponent,
            outcome,
            timestamp_ms: unix_millis(),
        };

        match outcome {
            RoundOutcome::PlayerWin => self.player_score += 1,
            RoundOutcome::OpponentWin => self.opponent_score += 1,
            RoundOutcome::Draw => {}
        }
        self.rounds.push(round.clone());
        self.last_outcome = Some(outcome);
        info!(
            "round {}: {} vs {} -> {} ({}-{})",
            round.number,
            player.as_str(),
            opponent.as_str(),
            outcome.as_str(),
            self.player_score,
            self.opponent_score,
        );
        events.push(GameEvent::RoundResolved {
            player,
            opponent,
            outcome,
        });

        // Win condition is evaluated only right after a score increment.
        if outcome != RoundOutcome::Draw && self.score_reached() {
            let winner = if self.player_score >= self.settings.points_to_win {
                Winner::Player
            } else {
                Winner::Opponent
            };
            self.winner = Some(winner);
            self.phase = GamePhase::MatchOver;
            self.phase_entered = None;
            info!("match over: {} wins", winner.as_str());
            events.push(GameEvent::MatchOver { winner });
            self.persist_match(winner);
        } else {
            self.phase = GamePhase::Cooldown;
            self.phase_entered = Some(now);
        }

        round
    }

    fn score_reached(&self) -> bool {
        self.player_score >= self.settings.points_to_win
            || self.opponent_score >= self.settings.points_to_win
    }

    fn persist_match(&mut self, winner: Winner) {
        let record = MatchRecord {
            completed_at_ms: unix_millis(),
            winner,
            player_score: self.player_score,
            opponent_score: self.opponent_score,
            rounds: self.rounds.clone(),
        };
        // A failed write is the recorder's problem; the in-memory result
        // stands either way.
        if let Err(e) = self.recorder.record(&record) {
            warn!("failed to persist match result: {:#}", e);
        }
    }

    fn apply_reset(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::Waiting;
        self.phase_entered = None;
        self.player_score = 0;
        self.opponent_score = 0;
        self.rounds.clear();
        self.last_outcome = None;
        self.winner = None;
        self.pending_reset = false;
        self.stabilizer.reset();
        info!("match reset");
        events.push(GameEvent::Reset);
    }
}

/// Fixed cyclic dominance: rock beats scissors, scissors beats paper,
/// paper beats rock. Equal gestures draw.
pub fn round_outcome(player: Gesture, opponent: Gesture) -> RoundOutcome {
    if player == opponent {
        return RoundOutcome::Draw;
    }
    match (player, opponent) {
        (Gesture::Rock, Gesture::Scissors)
        | (Gesture::Scissors, Gesture::Paper)
        | (Gesture::Paper, Gesture::Rock) => RoundOutcome::PlayerWin,
        _ => RoundOutcome::OpponentWin,
    }
}

/// What beats the given gesture.
pub fn counter_of(gesture: Gesture) -> Gesture {
    match gesture {
        Gesture::Rock => Gesture::Paper,
        Gesture::Paper => Gesture::Scissors,
        Gesture::Scissors => Gesture::Rock,
        Gesture::None => Gesture::None,
    }
}

fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
