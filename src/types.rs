use serde::{Deserialize, Serialize};

/// A single tracked point on the hand, in normalized frame coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// Number of landmarks the tracking collaborator reports per hand.
pub const LANDMARK_COUNT: usize = 21;

/// The 21 hand landmarks, indexed by anatomical position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// One finger of the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// The four non-thumb fingers, in extension-vector order.
    pub fn chained() -> [Finger; 4] {
        [Self::Index, Self::Middle, Self::Ring, Self::Pinky]
    }

    /// The (tip, middle joint, base joint) triple used by the extension
    /// chain test. Not defined for the thumb, which is judged laterally.
    pub fn curl_chain(&self) -> Option<(HandLandmark, HandLandmark, HandLandmark)> {
        use HandLandmark::*;
        match self {
            Self::Thumb => None,
            Self::Index => Some((IndexTip, IndexDip, IndexPip)),
            Self::Middle => Some((MiddleTip, MiddleDip, MiddlePip)),
            Self::Ring => Some((RingTip, RingDip, RingPip)),
            Self::Pinky => Some((PinkyTip, PinkyDip, PinkyPip)),
        }
    }
}

/// Left/right label attached to a detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse a side label from config ("left"/"right", case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One detected hand for one frame: 21 ordered landmarks plus handedness.
#[derive(Debug, Clone)]
pub struct HandObservation {
    pub landmarks: Vec<Landmark>,
    pub handedness: Handedness,
}

/// A classified hand shape. `None` means no confident reading this frame,
/// which is distinct from no hand being visible at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
    None,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
            Self::None => "none",
        }
    }

    /// Parse a playable gesture label. `None` is not playable and does not
    /// parse here.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rock" => Some(Self::Rock),
            "paper" => Some(Self::Paper),
            "scissors" => Some(Self::Scissors),
            _ => None,
        }
    }
}

/// Output of the detection stabilizer: the current best-guess gesture and
/// how many consecutive frames have gone by without a confident reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizedSignal {
    pub gesture: Gesture,
    pub misses: u32,
}

/// Who won a single round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    PlayerWin,
    OpponentWin,
    Draw,
}

impl RoundOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerWin => "player_win",
            Self::OpponentWin => "opponent_win",
            Self::Draw => "draw",
        }
    }
}

/// Who won a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Opponent,
}

impl Winner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Opponent => "opponent",
        }
    }
}

/// One resolved round. Immutable once appended to the match history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// 1-based, strictly increasing within a match. Draws consume a slot.
    pub number: u32,
    pub player: Gesture,
    pub opponent: Gesture,
    pub outcome: RoundOutcome,
    /// Unix milliseconds at resolution time.
    pub timestamp_ms: u64,
}

/// The immutable record handed to the match recorder when a match ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub completed_at_ms: u64,
    pub winner: Winner,
    pub player_score: u32,
    pub opponent_score: u32,
    pub rounds: Vec<Round>,
}

/// State-machine discriminant. `Resolving` never survives a tick; it is
/// entered and exited within the same update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Waiting,
    Countdown,
    Resolving,
    Cooldown,
    MatchOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Countdown => "countdown",
            Self::Resolving => "resolving",
            Self::Cooldown => "cooldown",
            Self::MatchOver => "match_over",
        }
    }
}

/// A cheap copy of the live match state for display layers.
#[derive(Debug, Clone)]
pub struct MatchSnapshot {
    pub phase: GamePhase,
    pub player_score: u32,
    pub opponent_score: u32,
    pub rounds_played: u32,
    pub points_to_win: u32,
    /// Current stabilized gesture, for the "detected hand" readout.
    pub current_gesture: Gesture,
    pub source_available: bool,
    pub last_outcome: Option<RoundOutcome>,
    pub winner: Option<Winner>,
}
