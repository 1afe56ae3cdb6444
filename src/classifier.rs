//! Geometric gesture classifier. Pure functions over one hand observation;
//! no memory across frames, no thresholds learned from data.

use crate::types::{Finger, Gesture, HandLandmark, HandObservation, Handedness, LANDMARK_COUNT};

/// Whether a chained finger is extended: the tip must sit strictly above the
/// middle joint, which must sit strictly above the base joint in image space
/// (smaller y = higher on screen). The three-point chain is stricter than a
/// tip-vs-base comparison and rejects partial curls.
pub fn finger_extended(obs: &HandObservation, finger: Finger) -> bool {
    let Some((tip, mid, base)) = finger.curl_chain() else {
        return thumb_extended(obs);
    };
    let lm = &obs.landmarks;
    lm[tip.index()].y < lm[mid.index()].y && lm[mid.index()].y < lm[base.index()].y
}

/// The thumb moves laterally, not vertically, so it is judged on the
/// horizontal axis with the comparison mirrored by handedness.
pub fn thumb_extended(obs: &HandObservation) -> bool {
    let tip = obs.landmarks[HandLandmark::ThumbTip.index()];
    let ip = obs.landmarks[HandLandmark::ThumbIp.index()];
    match obs.handedness {
        Handedness::Right => tip.x < ip.x,
        Handedness::Left => tip.x > ip.x,
    }
}

/// Extension flags over [thumb, index, middle, ring, pinky].
pub fn extension_vector(obs: &HandObservation) -> [bool; 5] {
    let mut fingers = [false; 5];
    fingers[0] = thumb_extended(obs);
    for (i, finger) in Finger::chained().iter().enumerate() {
        fingers[i + 1] = finger_extended(obs, *finger);
    }
    fingers
}

/// Classify one hand observation into a gesture.
///
/// Scissors is checked first and wins precedence: index and middle extended
/// with ring or pinky curled reads as scissors even when the total extended
/// count would otherwise say paper. After that, total count decides:
/// at most one extended is rock, four or more is paper, anything else is
/// ambiguous. Observations without exactly 21 landmarks classify as
/// `Gesture::None`.
pub fn classify(obs: &HandObservation) -> Gesture {
    if obs.landmarks.len() != LANDMARK_COUNT {
        return Gesture::None;
    }

    let fingers = extension_vector(obs);

    if fingers[1] && fingers[2] && (!fingers[3] || !fingers[4]) {
        return Gesture::Scissors;
    }

    let raised = fingers.iter().filter(|up| **up).count();
    if raised <= 1 {
        Gesture::Rock
    } else if raised >= 4 {
        Gesture::Paper
    } else {
        Gesture::None
    }
}
