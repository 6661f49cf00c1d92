//! Replay of recorded pose streams through a rep counter.
//!
//! A pose stream file holds one frame per line: a JSON array of landmark
//! objects, or `null` for a frame without detection.

use crate::counter::RepCounter;
use crate::geometry::is_unstable;
use crate::{Pose, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Outcome of feeding a whole stream to a counter
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub count: u32,
    pub frames_processed: u32,
    pub frames_skipped: u32,
    pub calories: f64,
    pub feedback: Vec<String>,
}

/// Load every frame of a pose stream
///
/// Lines that fail to parse become no-detection frames so frame numbering
/// stays aligned with the source video.
pub fn read_pose_stream(path: &Path) -> Result<Vec<Pose>> {
    let reader = BufReader::new(File::open(path)?);
    let mut frames = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Option<Pose>>(&line) {
            Ok(pose) => frames.push(pose.unwrap_or_default()),
            Err(e) => {
                tracing::warn!("Unreadable frame at line {}: {}", line_num + 1, e);
                frames.push(Pose::empty());
            }
        }
    }

    tracing::debug!("Read {} frames from {:?}", frames.len(), path);
    Ok(frames)
}

/// Feed frames to `counter` in order
///
/// With `skip_unstable`, frames where any landmark jumped further than
/// `threshold` since the previous frame are dropped before counting.
pub fn replay<I>(
    counter: &mut RepCounter,
    frames: I,
    skip_unstable: bool,
    threshold: f64,
) -> ReplaySummary
where
    I: IntoIterator<Item = Pose>,
{
    let mut summary = ReplaySummary::default();
    let mut previous: Option<Pose> = None;

    for frame in frames {
        let jittery =
            skip_unstable && frame.is_detected() && is_unstable(previous.as_ref(), Some(&frame), threshold);

        if jittery {
            summary.frames_skipped += 1;
            previous = Some(frame);
            continue;
        }

        let result = counter.process_frame(Some(&frame));
        summary.frames_processed += 1;

        if result.is_completion() {
            summary.calories += result.calorie.unwrap_or(0.0);
            if let Some(feedback) = result.feedback {
                summary.feedback.push(feedback);
            }
        }

        if frame.is_detected() {
            previous = Some(frame);
        }
    }

    summary.count = counter.count();
    tracing::info!(
        "Replayed {} frames ({} skipped): {} {} reps",
        summary.frames_processed,
        summary.frames_skipped,
        summary.count,
        counter.exercise()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::tests::arm_pose;
    use crate::geometry::DEFAULT_STABILITY_THRESHOLD;
    use crate::ExerciseKind;

    /// Curl frames sweeping from `from` to `to` in 5° steps
    fn sweep(from: f64, to: f64) -> Vec<Pose> {
        let steps = ((to - from).abs() / 5.0) as usize;
        let dir = if to > from { 5.0 } else { -5.0 };
        (0..=steps).map(|i| arm_pose(from + dir * i as f64)).collect()
    }

    #[test]
    fn test_replay_counts_smooth_reps() {
        let mut frames = Vec::new();
        for _ in 0..2 {
            frames.extend(sweep(170.0, 20.0));
            frames.extend(sweep(20.0, 170.0));
        }
        let total = frames.len() as u32;

        let mut counter = RepCounter::new(ExerciseKind::BicepCurl).with_calories_per_rep(0.5);
        let summary = replay(&mut counter, frames, true, DEFAULT_STABILITY_THRESHOLD);

        assert_eq!(summary.count, 2);
        assert_eq!(summary.frames_processed, total);
        assert_eq!(summary.frames_skipped, 0);
        assert!((summary.calories - 1.0).abs() < 1e-9);
        assert_eq!(summary.feedback.len(), 2);
    }

    #[test]
    fn test_replay_skips_jumps_when_enabled() {
        // Jumping straight from curled to extended moves the wrist ~0.37
        let frames = vec![arm_pose(20.0), arm_pose(170.0)];

        let mut strict = RepCounter::new(ExerciseKind::BicepCurl);
        let skipped = replay(&mut strict, frames.clone(), true, DEFAULT_STABILITY_THRESHOLD);
        assert_eq!(skipped.count, 0);
        assert_eq!(skipped.frames_skipped, 1);

        let mut lenient = RepCounter::new(ExerciseKind::BicepCurl);
        let counted = replay(&mut lenient, frames, false, DEFAULT_STABILITY_THRESHOLD);
        assert_eq!(counted.count, 1);
    }

    #[test]
    fn test_read_pose_stream_tolerates_bad_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("poses.jsonl");

        let pose_line = serde_json::to_string(&arm_pose(90.0)).unwrap();
        let contents = format!("{}\nnull\n\nnot json\n[{{\"x\":0.1,\"y\":0.2}}]\n", pose_line);
        std::fs::write(&path, contents).unwrap();

        let frames = read_pose_stream(&path).unwrap();

        assert_eq!(frames.len(), 4);
        assert!(frames[0].is_detected());
        assert!(frames[1].is_empty());
        assert!(frames[2].is_empty());
        assert_eq!(frames[3].len(), 1);
    }

    #[test]
    fn test_read_missing_stream_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(read_pose_stream(&temp_dir.path().join("missing.jsonl")).is_err());
    }
}
