use serde::Serialize;

use crate::config::CalibrationConfig;
use crate::pose::BodySignals;

/// 基準姿勢（腕を伸ばした状態）での目・肩の幅
///
/// キャリブレーション完了時は少なくとも片方が入っている
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Baseline {
    pub eye_distance: Option<f32>,
    pub shoulder_distance: Option<f32>,
}

/// observe() の結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// 体が見えない。取り込み中だった場合は interrupted
    Idle { interrupted: bool },
    /// 取り込み窓を開いた
    Started { seconds_left: u64 },
    Capturing { percent: f32, seconds_left: u64 },
    Completed(Baseline),
}

/// 最初に体が見えた時点から一定時間待ち、その時点のフレームを基準にする
pub struct Calibrator {
    window_ms: u64,
    started_at_ms: Option<u64>,
    progress: f32,
    baseline: Option<Baseline>,
}

impl Calibrator {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            started_at_ms: None,
            progress: 0.0,
            baseline: None,
        }
    }

    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self::new(config.window_ms)
    }

    /// 未キャリブレーション時に毎フレーム呼ぶ
    pub fn observe(&mut self, signals: &BodySignals, now_ms: u64) -> CalibrationStep {
        if let Some(baseline) = self.baseline {
            return CalibrationStep::Completed(baseline);
        }

        if !signals.has_body() {
            // 途中で見失ったら最初からやり直し。部分的な基準は残さない
            let interrupted = self.started_at_ms.take().is_some();
            self.progress = 0.0;
            return CalibrationStep::Idle { interrupted };
        }

        let started_at = match self.started_at_ms {
            Some(t) => t,
            None => {
                self.started_at_ms = Some(now_ms);
                self.progress = 0.0;
                return CalibrationStep::Started {
                    seconds_left: self.seconds_left(0),
                };
            }
        };

        let elapsed = now_ms.saturating_sub(started_at);
        self.progress = if self.window_ms == 0 {
            100.0
        } else {
            (elapsed as f32 / self.window_ms as f32 * 100.0).clamp(0.0, 100.0)
        };

        if elapsed >= self.window_ms {
            let baseline = Baseline {
                eye_distance: signals.eye_distance,
                shoulder_distance: signals.shoulder_distance,
            };
            self.baseline = Some(baseline);
            self.started_at_ms = None;
            return CalibrationStep::Completed(baseline);
        }

        CalibrationStep::Capturing {
            percent: self.progress,
            seconds_left: self.seconds_left(elapsed),
        }
    }

    fn seconds_left(&self, elapsed_ms: u64) -> u64 {
        self.window_ms.saturating_sub(elapsed_ms).div_ceil(1000)
    }

    /// 基準を破棄して未キャリブレーションに戻す
    pub fn reset(&mut self) {
        self.baseline = None;
        self.started_at_ms = None;
        self.progress = 0.0;
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    /// 一時停止していた分だけ取り込み窓の開始時刻を後ろにずらす
    pub fn shift_clock(&mut self, ms: u64) {
        if let Some(t) = self.started_at_ms.as_mut() {
            *t += ms;
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 取り込み窓を開き直したときの残り秒数
    pub fn full_window_seconds(&self) -> u64 {
        self.seconds_left(0)
    }
}
