use crate::pose::BodySignals;

use super::calibrate::Baseline;

fn ratio(current: Option<f32>, base: Option<f32>) -> Option<f32> {
    let base = base.filter(|b| *b > f32::EPSILON)?;
    Some(current? / base)
}

/// 目の比率と肩の比率を重み付きで1つにまとめる
///
/// 両方あれば eye_weight : (1 - eye_weight)、片方だけならその値、どちらもなければ None
pub fn fuse_ratio(signals: &BodySignals, baseline: &Baseline, eye_weight: f32) -> Option<f32> {
    let eye = ratio(signals.eye_distance, baseline.eye_distance);
    let shoulder = ratio(signals.shoulder_distance, baseline.shoulder_distance);
    match (eye, shoulder) {
        (Some(e), Some(s)) => Some(e * eye_weight + s * (1.0 - eye_weight)),
        (e, s) => e.or(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(eye: Option<f32>, shoulder: Option<f32>) -> BodySignals {
        BodySignals {
            eye_distance: eye,
            shoulder_distance: shoulder,
            ..Default::default()
        }
    }

    fn baseline(eye: Option<f32>, shoulder: Option<f32>) -> Baseline {
        Baseline {
            eye_distance: eye,
            shoulder_distance: shoulder,
        }
    }

    #[test]
    fn test_weighted_when_both() {
        let r = fuse_ratio(
            &signals(Some(11.0), Some(24.0)),
            &baseline(Some(10.0), Some(20.0)),
            0.7,
        )
        .unwrap();
        // 1.1 * 0.7 + 1.2 * 0.3
        assert!((r - 1.13).abs() < 1e-5);
    }

    #[test]
    fn test_single_source() {
        let b = baseline(Some(10.0), Some(20.0));
        assert_eq!(fuse_ratio(&signals(None, Some(30.0)), &b, 0.7), Some(1.5));
        assert_eq!(fuse_ratio(&signals(Some(5.0), None), &b, 0.7), Some(0.5));
    }

    #[test]
    fn test_baseline_missing_field() {
        // 基準に肩がなければ肩が見えていても使えない
        let b = baseline(Some(10.0), None);
        assert_eq!(fuse_ratio(&signals(None, Some(30.0)), &b, 0.7), None);
        assert_eq!(fuse_ratio(&signals(Some(10.0), Some(30.0)), &b, 0.7), Some(1.0));
    }

    #[test]
    fn test_zero_baseline_is_ignored() {
        let b = baseline(Some(0.0), Some(20.0));
        assert_eq!(fuse_ratio(&signals(Some(10.0), Some(20.0)), &b, 0.7), Some(1.0));
    }
}
