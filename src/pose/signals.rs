use serde::Serialize;

use super::keypoint::{Keypoint, KeypointIndex, Pose};

/// 1フレームから抽出した運動指標
///
/// - eye_distance / shoulder_distance: カメラとの距離の代理指標（下がると大きく見える）
/// - left_angle / right_angle: 肩-肘-手首で作る肘の角度（度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BodySignals {
    pub eye_distance: Option<f32>,
    pub shoulder_distance: Option<f32>,
    pub left_angle: Option<f32>,
    pub right_angle: Option<f32>,
}

impl BodySignals {
    /// Poseから指標を抽出する。必要な関節がすべて閾値を超えたときだけ値を持つ
    pub fn extract(pose: &Pose, confidence_threshold: f32) -> Self {
        use KeypointIndex::*;

        let pair = |a: KeypointIndex, b: KeypointIndex| -> Option<f32> {
            let a = pose.usable(a, confidence_threshold)?;
            let b = pose.usable(b, confidence_threshold)?;
            Some(a.distance_to(b))
        };
        let arm = |s: KeypointIndex, e: KeypointIndex, w: KeypointIndex| -> Option<f32> {
            let s = pose.usable(s, confidence_threshold)?;
            let e = pose.usable(e, confidence_threshold)?;
            let w = pose.usable(w, confidence_threshold)?;
            Some(find_angle(s, e, w))
        };

        Self {
            eye_distance: pair(LeftEye, RightEye),
            shoulder_distance: pair(LeftShoulder, RightShoulder),
            left_angle: arm(LeftShoulder, LeftElbow, LeftWrist),
            right_angle: arm(RightShoulder, RightElbow, RightWrist),
        }
    }

    pub fn has_eyes(&self) -> bool {
        self.eye_distance.is_some()
    }

    pub fn has_shoulders(&self) -> bool {
        self.shoulder_distance.is_some()
    }

    /// 目か肩のどちらかが見えていれば体あり
    pub fn has_body(&self) -> bool {
        self.has_eyes() || self.has_shoulders()
    }

    /// 左右の肘角度の平均。片側だけならその値
    pub fn avg_angle(&self) -> Option<f32> {
        match (self.left_angle, self.right_angle) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (l, r) => l.or(r),
        }
    }
}

/// 頂点 b における a-b-c の角度（度, 0〜180）
pub fn find_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> f32 {
    let radians = f32::atan2(c.y - b.y, c.x - b.x) - f32::atan2(a.y - b.y, a.x - b.x);
    let angle = radians.to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint::new(x, y, 0.9)
    }

    fn make_pose(points: &[(KeypointIndex, (f32, f32), f32)]) -> Pose {
        Pose::from_named(
            points
                .iter()
                .map(|&(idx, (x, y), c)| (idx, Keypoint::new(x, y, c))),
        )
    }

    #[test]
    fn test_find_angle_straight() {
        let angle = find_angle(&kp(0.0, 0.0), &kp(0.5, 0.0), &kp(1.0, 0.0));
        assert!((angle - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_find_angle_right() {
        let angle = find_angle(&kp(0.0, 0.0), &kp(0.5, 0.0), &kp(0.5, 0.5));
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_find_angle_reflex_is_reflected() {
        // 170° と -170° の方向: 生の差は 340° だが 20° として返る
        let a = kp(-0.985, 0.174);
        let c = kp(-0.985, -0.174);
        let angle = find_angle(&a, &kp(0.0, 0.0), &c);
        assert!((angle - 20.0).abs() < 0.1);
        assert!((find_angle(&c, &kp(0.0, 0.0), &a) - angle).abs() < 0.01);
    }

    #[test]
    fn test_extract_distances() {
        use KeypointIndex::*;
        let pose = make_pose(&[
            (LeftEye, (10.0, 10.0), 0.9),
            (RightEye, (20.0, 10.0), 0.9),
            (LeftShoulder, (0.0, 40.0), 0.9),
            (RightShoulder, (30.0, 80.0), 0.9),
        ]);
        let s = BodySignals::extract(&pose, 0.3);
        assert_eq!(s.eye_distance, Some(10.0));
        assert_eq!(s.shoulder_distance, Some(50.0));
        assert!(s.has_body());
        assert_eq!(s.avg_angle(), None);
    }

    #[test]
    fn test_low_confidence_pair_is_unusable() {
        use KeypointIndex::*;
        let pose = make_pose(&[
            (LeftEye, (10.0, 10.0), 0.9),
            (RightEye, (20.0, 10.0), 0.3),
        ]);
        let s = BodySignals::extract(&pose, 0.3);
        assert_eq!(s.eye_distance, None);
        assert!(!s.has_body());
    }

    #[test]
    fn test_avg_angle_one_side() {
        use KeypointIndex::*;
        let pose = make_pose(&[
            (LeftShoulder, (0.0, 0.0), 0.9),
            (LeftElbow, (0.0, 10.0), 0.9),
            (LeftWrist, (10.0, 10.0), 0.9),
            // 右腕は手首が欠けている
            (RightShoulder, (40.0, 0.0), 0.9),
            (RightElbow, (40.0, 10.0), 0.9),
        ]);
        let s = BodySignals::extract(&pose, 0.3);
        assert!(s.right_angle.is_none());
        assert!((s.avg_angle().unwrap() - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_avg_angle_both_sides() {
        let s = BodySignals {
            left_angle: Some(100.0),
            right_angle: Some(160.0),
            ..Default::default()
        };
        assert_eq!(s.avg_angle(), Some(130.0));
    }
}
