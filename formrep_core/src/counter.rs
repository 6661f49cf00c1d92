//! Repetition counting from pose streams.
//!
//! Every exercise runs the same two-flag state machine:
//! - reaching the TOP of the motion arms the counter (`up`)
//! - reaching the COMPLETION position while armed counts one rep (`down`)
//! - the next TOP re-arms it for the following rep
//!
//! Exercises differ only in the landmark triples and angle thresholds,
//! captured by [`CounterConfig`].

use crate::geometry::angle_of;
use crate::types::landmark::*;
use crate::{CounterResult, CounterState, ExerciseKind, Pose};

/// Which side of a threshold satisfies a condition
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Threshold {
    Below(f64),
    Above(f64),
}

impl Threshold {
    pub fn is_met(&self, angle: f64) -> bool {
        match *self {
            Threshold::Below(limit) => angle < limit,
            Threshold::Above(limit) => angle > limit,
        }
    }
}

/// Landmark triples and thresholds for one exercise
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterConfig {
    pub exercise: ExerciseKind,
    /// Triple whose vertex angle defines the top of the motion
    pub top_joint: (usize, usize, usize),
    pub top: Threshold,
    /// Triple whose vertex angle defines a completed repetition
    pub completion_joint: (usize, usize, usize),
    pub completion: Threshold,
    pub feedback: &'static str,
}

impl CounterConfig {
    /// Built-in configuration for an exercise
    pub const fn for_exercise(exercise: ExerciseKind) -> Self {
        const RIGHT_ARM: (usize, usize, usize) = (RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST);

        match exercise {
            ExerciseKind::BicepCurl => CounterConfig {
                exercise,
                top_joint: RIGHT_ARM,
                top: Threshold::Below(30.0),
                completion_joint: RIGHT_ARM,
                completion: Threshold::Above(160.0),
                feedback: "Good curl! Full extension.",
            },
            ExerciseKind::PushUp => CounterConfig {
                exercise,
                top_joint: RIGHT_ARM,
                top: Threshold::Above(160.0),
                completion_joint: RIGHT_ARM,
                completion: Threshold::Below(70.0),
                feedback: "Nice push-up! Good depth.",
            },
            ExerciseKind::Squat => CounterConfig {
                exercise,
                top_joint: (LEFT_SHOULDER, LEFT_HIP, LEFT_KNEE),
                top: Threshold::Above(170.0),
                completion_joint: (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
                completion: Threshold::Below(100.0),
                feedback: "Great squat! Hit depth.",
            },
        }
    }

    fn joint_indices(&self) -> impl Iterator<Item = usize> {
        let (a, b, c) = self.top_joint;
        let (d, e, f) = self.completion_joint;
        let mut indices = vec![a, b, c, d, e, f];
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter()
    }
}

/// Rep counter owning the state of one workout session
///
/// Frames must be fed in arrival order; the counter is dropped when the
/// session ends.
#[derive(Clone, Debug)]
pub struct RepCounter {
    config: CounterConfig,
    state: CounterState,
    calories_per_rep: Option<f64>,
}

impl RepCounter {
    pub fn new(exercise: ExerciseKind) -> Self {
        Self::with_config(CounterConfig::for_exercise(exercise))
    }

    pub fn with_config(config: CounterConfig) -> Self {
        Self {
            config,
            state: CounterState::default(),
            calories_per_rep: None,
        }
    }

    /// Attach an energy estimate reported on every completed rep
    pub fn with_calories_per_rep(mut self, kcal: f64) -> Self {
        self.calories_per_rep = Some(kcal);
        self
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.config.exercise
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn state(&self) -> &CounterState {
        &self.state
    }

    pub fn count(&self) -> u32 {
        self.state.success_count
    }

    /// Start a fresh session with the same configuration
    pub fn reset(&mut self) {
        self.state = CounterState::default();
    }

    /// Advance the state machine by one frame
    ///
    /// A missing or partial pose leaves the state untouched and reports the
    /// current count.
    pub fn process_frame(&mut self, pose: Option<&Pose>) -> CounterResult {
        let pose = match pose {
            Some(p) if p.is_detected() => p,
            _ => return CounterResult::count_only(self.state.success_count),
        };

        let (Some(top_angle), Some(completion_angle)) = (
            angle_of(pose, self.config.top_joint),
            angle_of(pose, self.config.completion_joint),
        ) else {
            return CounterResult::count_only(self.state.success_count);
        };

        self.state.last_pose = Some(pose.clone());

        if self.config.top.is_met(top_angle) && !self.state.up {
            self.state.up = true;
            self.state.down = false;
            tracing::debug!(
                "{}: top reached at {:.1}°",
                self.config.exercise,
                top_angle
            );
            return CounterResult::count_only(self.state.success_count);
        }

        if self.config.completion.is_met(completion_angle) && self.state.up && !self.state.down {
            self.state.down = true;
            self.state.up = false;
            self.state.success_count += 1;
            tracing::debug!(
                "{}: rep {} completed at {:.1}°",
                self.config.exercise,
                self.state.success_count,
                completion_angle
            );

            return CounterResult {
                count: self.state.success_count,
                feedback: Some(self.config.feedback.to_string()),
                score: Some(1),
                calorie: self.calories_per_rep,
                confidence: self.visibility_confidence(pose),
            };
        }

        CounterResult::count_only(self.state.success_count)
    }

    /// Mean visibility of the landmarks driving this exercise
    fn visibility_confidence(&self, pose: &Pose) -> Option<f64> {
        let visibilities: Vec<f64> = self
            .config
            .joint_indices()
            .filter_map(|i| pose.landmarks().get(i).and_then(|l| l.visibility))
            .collect();

        if visibilities.is_empty() {
            None
        } else {
            Some(visibilities.iter().sum::<f64>() / visibilities.len() as f64)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Landmark;

    fn offset(from: Landmark, dx: f64, dy: f64) -> Landmark {
        Landmark::new(from.x + dx, from.y + dy)
    }

    /// Pose whose right elbow angle is `elbow_deg`
    pub(crate) fn arm_pose(elbow_deg: f64) -> Pose {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); 33];
        let elbow = Landmark::new(0.5, 0.5);
        let theta = elbow_deg.to_radians();

        landmarks[RIGHT_ELBOW] = elbow;
        landmarks[RIGHT_SHOULDER] = offset(elbow, 0.0, -0.2);
        landmarks[RIGHT_WRIST] = offset(elbow, 0.2 * theta.sin(), -0.2 * theta.cos());
        Pose::new(landmarks)
    }

    /// Pose with the given left shoulder-hip-knee and hip-knee-ankle angles
    pub(crate) fn squat_pose(hip_deg: f64, knee_deg: f64) -> Pose {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); 33];
        let hip = Landmark::new(0.5, 0.4);
        let h = hip_deg.to_radians();
        let k = knee_deg.to_radians();

        let knee = offset(hip, 0.2 * h.sin(), -0.2 * h.cos());
        // direction knee -> hip, rotated by the knee angle
        let (dx, dy) = (-h.sin(), h.cos());
        let ankle = offset(
            knee,
            0.2 * (dx * k.cos() - dy * k.sin()),
            0.2 * (dx * k.sin() + dy * k.cos()),
        );

        landmarks[LEFT_HIP] = hip;
        landmarks[LEFT_SHOULDER] = offset(hip, 0.0, -0.3);
        landmarks[LEFT_KNEE] = knee;
        landmarks[LEFT_ANKLE] = ankle;
        Pose::new(landmarks)
    }

    fn feed(counter: &mut RepCounter, poses: &[Pose]) -> Vec<CounterResult> {
        poses
            .iter()
            .map(|p| counter.process_frame(Some(p)))
            .collect()
    }

    #[test]
    fn test_helpers_produce_requested_angles() {
        let config = CounterConfig::for_exercise(ExerciseKind::Squat);
        let pose = squat_pose(175.0, 90.0);
        let hip = angle_of(&pose, config.top_joint).unwrap();
        let knee = angle_of(&pose, config.completion_joint).unwrap();
        assert!((hip - 175.0).abs() < 1e-6, "hip {}", hip);
        assert!((knee - 90.0).abs() < 1e-6, "knee {}", knee);

        let arm = CounterConfig::for_exercise(ExerciseKind::BicepCurl);
        let elbow = angle_of(&arm_pose(45.0), arm.top_joint).unwrap();
        assert!((elbow - 45.0).abs() < 1e-6, "elbow {}", elbow);
    }

    #[test]
    fn test_bicep_curl_counts_on_extension() {
        crate::logging::init_test();
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);

        let results = feed(
            &mut counter,
            &[arm_pose(170.0), arm_pose(20.0), arm_pose(170.0)],
        );

        assert_eq!(results[0].count, 0);
        // Curling up only arms the counter
        assert_eq!(results[1].count, 0);
        assert!(results[1].feedback.is_none());
        assert_eq!(results[2].count, 1);
        assert_eq!(results[2].score, Some(1));
        assert!(results[2].feedback.is_some());
    }

    #[test]
    fn test_repeated_frames_do_not_double_count() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);

        let results = feed(
            &mut counter,
            &[
                arm_pose(20.0),
                arm_pose(20.0),
                arm_pose(170.0),
                arm_pose(170.0),
                arm_pose(170.0),
            ],
        );

        let counts: Vec<u32> = results.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![0, 0, 1, 1, 1]);
        assert_eq!(results.iter().filter(|r| r.is_completion()).count(), 1);
    }

    #[test]
    fn test_multiple_curl_reps() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);

        for _ in 0..3 {
            feed(
                &mut counter,
                &[arm_pose(170.0), arm_pose(90.0), arm_pose(25.0), arm_pose(90.0), arm_pose(165.0)],
            );
        }

        assert_eq!(counter.count(), 3);
    }

    #[test]
    fn test_pushup_cycle() {
        let mut counter = RepCounter::new(ExerciseKind::PushUp);

        // Start at the bottom: nothing to count yet
        feed(&mut counter, &[arm_pose(60.0)]);
        assert_eq!(counter.count(), 0);

        feed(&mut counter, &[arm_pose(170.0), arm_pose(100.0), arm_pose(65.0)]);
        assert_eq!(counter.count(), 1);
        assert!(counter.state().down);
        assert!(!counter.state().up);

        feed(&mut counter, &[arm_pose(170.0)]);
        assert!(counter.state().up);
        assert!(!counter.state().down);

        feed(&mut counter, &[arm_pose(60.0)]);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_squat_uses_two_joints() {
        let mut counter = RepCounter::new(ExerciseKind::Squat);

        // Knee bent below 100° without first standing tall does nothing
        feed(&mut counter, &[squat_pose(120.0, 90.0)]);
        assert_eq!(counter.count(), 0);

        feed(
            &mut counter,
            &[squat_pose(175.0, 178.0), squat_pose(130.0, 120.0), squat_pose(90.0, 85.0)],
        );
        assert_eq!(counter.count(), 1);

        feed(
            &mut counter,
            &[squat_pose(175.0, 178.0), squat_pose(90.0, 85.0)],
        );
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn test_missing_pose_is_noop() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);
        counter.process_frame(Some(&arm_pose(20.0)));
        let before = counter.state().clone();

        let partial = Pose::new(vec![Landmark::new(0.5, 0.5); 32]);
        let r1 = counter.process_frame(None);
        let r2 = counter.process_frame(Some(&partial));
        let r3 = counter.process_frame(Some(&Pose::empty()));

        for r in [r1, r2, r3] {
            assert_eq!(r, CounterResult::count_only(0));
        }
        assert_eq!(counter.state(), &before);
    }

    #[test]
    fn test_missing_pose_never_changes_flags_mid_rep() {
        let mut counter = RepCounter::new(ExerciseKind::PushUp);
        counter.process_frame(Some(&arm_pose(170.0)));
        counter.process_frame(Some(&arm_pose(60.0)));
        let (up, down, count) = (counter.state().up, counter.state().down, counter.count());

        for _ in 0..5 {
            counter.process_frame(None);
        }

        assert_eq!(counter.state().up, up);
        assert_eq!(counter.state().down, down);
        assert_eq!(counter.count(), count);
    }

    #[test]
    fn test_completion_carries_calories_and_confidence() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl).with_calories_per_rep(0.4);

        let mut extended = arm_pose(170.0);
        for i in [RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST] {
            extended.0[i].visibility = Some(0.9);
        }

        counter.process_frame(Some(&arm_pose(20.0)));
        let result = counter.process_frame(Some(&extended));

        assert_eq!(result.calorie, Some(0.4));
        let confidence = result.confidence.unwrap();
        assert!((confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_absent_without_visibility() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);
        counter.process_frame(Some(&arm_pose(20.0)));
        let result = counter.process_frame(Some(&arm_pose(170.0)));

        assert!(result.is_completion());
        assert_eq!(result.confidence, None);
        assert_eq!(result.calorie, None);
    }

    #[test]
    fn test_reset_clears_session() {
        let mut counter = RepCounter::new(ExerciseKind::BicepCurl);
        feed(&mut counter, &[arm_pose(20.0), arm_pose(170.0)]);
        assert_eq!(counter.count(), 1);
        assert!(counter.state().last_pose.is_some());

        counter.reset();
        assert_eq!(counter.state(), &CounterState::default());
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!Threshold::Below(30.0).is_met(30.0));
        assert!(Threshold::Below(30.0).is_met(29.9));
        assert!(!Threshold::Above(160.0).is_met(160.0));
        assert!(Threshold::Above(160.0).is_met(160.1));
    }
}
