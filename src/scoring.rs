// src/scoring.rs
// Weighted combination of the audio and video analyzer scores

/// Weight of the audio (answer quality) score
pub const AUDIO_WEIGHT: f64 = 0.7;

/// Weight of the video (body language) score
pub const VIDEO_WEIGHT: f64 = 0.3;

/// Constant added to every weighted score
pub const SCORE_OFFSET: f64 = 3.0;

/// Upper bound of the final score
pub const MAX_SCORE: f64 = 10.0;

/// Combine analyzer scores into the final score.
///
/// `min(0.7 * audio + 0.3 * video + 3, 10)`, rounded to two decimal places.
pub fn final_score(audio_score: f64, video_score: f64) -> f64 {
    let total = AUDIO_WEIGHT * audio_score + VIDEO_WEIGHT * video_score + SCORE_OFFSET;
    round2(total.min(MAX_SCORE))
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
