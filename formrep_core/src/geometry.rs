//! Landmark geometry shared by the rep counters.

use crate::{Landmark, Pose};

/// Movement above which a landmark is considered jittery between frames
pub const DEFAULT_STABILITY_THRESHOLD: f64 = 0.06;

/// Unsigned angle in degrees (0–180) at vertex `b` formed by `b→a` and `b→c`
///
/// Coincident points produce a finite but meaningless angle.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Angle at the middle landmark of an index triple
///
/// Returns `None` when any index is out of range for the pose.
pub fn angle_of(pose: &Pose, (a, b, c): (usize, usize, usize)) -> Option<f64> {
    let lm = pose.landmarks();
    Some(angle_at(lm.get(a)?, lm.get(b)?, lm.get(c)?))
}

/// True if any landmark moved further than `threshold` between two poses
///
/// Missing poses or poses of differing length are never unstable.
pub fn is_unstable(prev: Option<&Pose>, current: Option<&Pose>, threshold: f64) -> bool {
    let (Some(prev), Some(current)) = (prev, current) else {
        return false;
    };

    if prev.len() != current.len() {
        return false;
    }

    prev.landmarks()
        .iter()
        .zip(current.landmarks())
        .any(|(p, c)| (c.x - p.x).hypot(c.y - p.y) > threshold)
}
