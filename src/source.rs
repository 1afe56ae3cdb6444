//! Landmark-source input contract and a scripted source for tests and the
//! demo binary. The real hand tracker is an external collaborator; the
//! engine only ever sees one `FrameInput` per tick.

use std::collections::VecDeque;

use crate::types::{Finger, Gesture, HandLandmark, HandObservation, Handedness, Landmark, LANDMARK_COUNT};

/// What the landmark source produced for one tick.
#[derive(Debug, Clone)]
pub enum FrameInput {
    /// The capture device is gone (disconnect, read failure). Distinct from
    /// a healthy frame with no hand in it.
    Unavailable,
    /// A frame arrived but no hand was detected.
    NoHand,
    /// One or more detected hands, in detector order.
    Hands(Vec<HandObservation>),
}

/// Per-tick provider of hand observations.
pub trait LandmarkSource {
    fn next_frame(&mut self) -> FrameInput;
}

// =========================================================================
// Scripted source
// =========================================================================
// Stands in for the camera + tracker when none is attached, the same way a
// simulated pipeline stands in for a missing inference backend.

/// Replays a prepared sequence of frames, then reports `NoHand` forever.
pub struct ScriptedSource {
    frames: VecDeque<FrameInput>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<FrameInput>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Build a script that holds each gesture for `hold_frames` frames.
    /// `Gesture::None` entries become empty frames.
    pub fn holding(gestures: &[Gesture], hold_frames: u32, handedness: Handedness) -> Self {
        let mut frames = Vec::new();
        for &gesture in gestures {
            let frame = match gesture_observation(gesture, handedness) {
                Some(obs) => FrameInput::Hands(vec![obs]),
                None => FrameInput::NoHand,
            };
            for _ in 0..hold_frames {
                frames.push(frame.clone());
            }
        }
        Self::new(frames)
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkSource for ScriptedSource {
    fn next_frame(&mut self) -> FrameInput {
        self.frames.pop_front().unwrap_or(FrameInput::NoHand)
    }
}

// =========================================================================
// Synthetic hands
// =========================================================================

/// Build a plausible 21-landmark observation from per-finger extension
/// flags [thumb, index, middle, ring, pinky].
///
/// Extended chained fingers get a monotonic upward tip < dip < pip chain;
/// curled ones get the chain inverted. The thumb tip is placed on the
/// correct horizontal side for the given handedness.
pub fn synthetic_observation(fingers: [bool; 5], handedness: Handedness) -> HandObservation {
    let mut landmarks = vec![Landmark::new(0.5, 0.55); LANDMARK_COUNT];
    landmarks[HandLandmark::Wrist.index()] = Landmark::new(0.5, 0.9);

    // Finger columns, mirrored for a left hand so the palm reads naturally.
    let column = |right_x: f32| -> f32 {
        match handedness {
            Handedness::Right => right_x,
            Handedness::Left => 1.0 - right_x,
        }
    };

    let columns = [
        column(0.45), // index
        column(0.50), // middle
        column(0.55), // ring
        column(0.60), // pinky
    ];

    for (i, finger) in Finger::chained().iter().enumerate() {
        let (tip, dip, pip) = finger
            .curl_chain()
            .expect("chained fingers always have a curl chain");
        let x = columns[i];
        if fingers[i + 1] {
            landmarks[pip.index()] = Landmark::new(x, 0.45);
            landmarks[dip.index()] = Landmark::new(x, 0.35);
            landmarks[tip.index()] = Landmark::new(x, 0.25);
        } else {
            landmarks[pip.index()] = Landmark::new(x, 0.55);
            landmarks[dip.index()] = Landmark::new(x, 0.62);
            landmarks[tip.index()] = Landmark::new(x, 0.70);
        }
    }

    let ip_x = column(0.35);
    let tip_x = if fingers[0] { column(0.25) } else { column(0.45) };
    landmarks[HandLandmark::ThumbIp.index()] = Landmark::new(ip_x, 0.5);
    landmarks[HandLandmark::ThumbTip.index()] = Landmark::new(tip_x, 0.45);

    HandObservation {
        landmarks,
        handedness,
    }
}

/// A synthetic hand shaped as the given gesture, or `None` for
/// `Gesture::None` (no canonical shape exists for "no confident reading").
pub fn gesture_observation(gesture: Gesture, handedness: Handedness) -> Option<HandObservation> {
    let fingers = match gesture {
        Gesture::Rock => [false; 5],
        Gesture::Paper => [true; 5],
        Gesture::Scissors => [false, true, true, false, false],
        Gesture::None => return None,
    };
    Some(synthetic_observation(fingers, handedness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    #[test]
    fn synthetic_shapes_classify_as_intended() {
        for handedness in [Handedness::Left, Handedness::Right] {
            for gesture in [Gesture::Rock, Gesture::Paper, Gesture::Scissors] {
                let obs = gesture_observation(gesture, handedness).unwrap();
                assert_eq!(obs.landmarks.len(), LANDMARK_COUNT);
                assert_eq!(classify(&obs), gesture, "{:?} {:?}", handedness, gesture);
            }
        }
    }

    #[test]
    fn scripted_source_replays_then_reports_no_hand() {
        let mut source = ScriptedSource::holding(&[Gesture::Rock], 2, Handedness::Right);
        assert!(matches!(source.next_frame(), FrameInput::Hands(_)));
        assert!(matches!(source.next_frame(), FrameInput::Hands(_)));
        assert!(source.is_exhausted());
        assert!(matches!(source.next_frame(), FrameInput::NoHand));
    }

    #[test]
    fn none_entries_become_empty_frames() {
        let mut source = ScriptedSource::holding(&[Gesture::None], 1, Handedness::Right);
        assert!(matches!(source.next_frame(), FrameInput::NoHand));
    }
}
