use serde::Serialize;

use crate::config::Config;
use crate::pose::{BodySignals, FrameSample};
use crate::session::SessionCounters;

use super::calibrate::{Baseline, CalibrationStep, Calibrator};
use super::feedback::{CounterEvent, Feedback};
use super::fuse::fuse_ratio;
use super::smooth::RatioSmoother;
use super::voter::{RepPhase, Step, Vote, Voter};

/// デバッグ表示用のスナップショット（読み取り専用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub phase: RepPhase,
    pub smoothed_ratio: f32,
    pub avg_ratio: Option<f32>,
    pub avg_angle: Option<f32>,
    pub eyes_visible: bool,
    pub shoulders_visible: bool,
    pub baseline: Option<Baseline>,
    pub calibration_progress: f32,
    pub tracking_lost: bool,
}

/// レップ検出エンジン
///
/// フレームごとに process() を呼ぶ。
/// 抽出 → キャリブレーション → 融合・平滑化 → 投票 → カウント
pub struct RepCounter {
    confidence_threshold: f32,
    eye_weight: f32,
    tracking_loss_ms: u64,
    haptic_pattern_ms: [u32; 2],
    calibrator: Calibrator,
    smoother: RatioSmoother,
    voter: Voter,
    counters: SessionCounters,
    last_body_seen_ms: Option<u64>,
    tracking_lost: bool,
    last_signals: BodySignals,
    last_avg_ratio: Option<f32>,
    last_avg_angle: Option<f32>,
}

impl RepCounter {
    pub fn new(config: &Config) -> Self {
        Self {
            confidence_threshold: config.signal.confidence_threshold,
            eye_weight: config.signal.eye_weight,
            tracking_loss_ms: config.counter.tracking_loss_ms,
            haptic_pattern_ms: config.counter.haptic_pattern_ms,
            calibrator: Calibrator::from_config(&config.calibration),
            smoother: RatioSmoother::from_config(&config.counter),
            voter: Voter::from_config(&config.counter),
            counters: SessionCounters::new(),
            last_body_seen_ms: None,
            tracking_lost: false,
            last_signals: BodySignals::default(),
            last_avg_ratio: None,
            last_avg_angle: None,
        }
    }

    /// 1フレーム処理してホスト向けイベントを返す。どんな入力でも失敗しない
    pub fn process(&mut self, frame: &FrameSample) -> Vec<CounterEvent> {
        let now = frame.timestamp_ms;
        let signals = BodySignals::extract(&frame.pose, self.confidence_threshold);
        let mut events = Vec::new();

        // 見失い判定の起点は最初に受け取ったフレーム
        self.last_body_seen_ms.get_or_insert(now);
        if signals.has_body() {
            self.last_body_seen_ms = Some(now);
            self.tracking_lost = false;
        }
        self.last_signals = signals;

        if let Some(step) = self.voter.check_stuck(now) {
            tracing::warn!(from = step.from.name(), "stuck in transitional phase, reset to UP");
            events.push(phase_changed(&step));
        }

        if !self.calibrator.is_calibrated() {
            self.calibrate(&signals, now, &mut events);
            return events;
        }

        let ratio = self
            .calibrator
            .baseline()
            .and_then(|b| fuse_ratio(&signals, b, self.eye_weight));
        let avg_angle = signals.avg_angle();

        // 目も肩も見えなければ、腕だけ写っていても見失い扱い
        if !signals.has_body() {
            self.check_tracking_loss(now, &mut events);
        }
        if ratio.is_none() && avg_angle.is_none() {
            return events;
        }

        // 比率が取れないフレームは平滑化を進めず、角度の票だけで判断
        let avg_ratio = ratio.map(|r| self.smoother.push(r));
        self.last_avg_ratio = avg_ratio;
        self.last_avg_angle = avg_angle;

        let vote = Vote::cast(avg_ratio, avg_angle, self.voter.thresholds());
        if let Some(step) = self.voter.step(vote, now) {
            tracing::debug!(
                from = step.from.name(),
                to = step.to.name(),
                ratio = ?avg_ratio,
                angle = ?avg_angle,
                "phase transition"
            );
            events.push(phase_changed(&step));

            if step.rep_counted {
                let total = self.counters.record_rep();
                let set_reps = self.counters.reps_in_current_set();
                tracing::info!(total, set_reps, "rep counted");
                events.push(CounterEvent::RepCounted { total, set_reps });
                events.push(CounterEvent::Haptic {
                    pattern_ms: self.haptic_pattern_ms,
                });
            }
        }

        events
    }

    fn calibrate(&mut self, signals: &BodySignals, now: u64, events: &mut Vec<CounterEvent>) {
        match self.calibrator.observe(signals, now) {
            CalibrationStep::Idle { interrupted } => {
                if interrupted {
                    self.voter.set_calibrating(false);
                    events.push(CounterEvent::PhaseChanged {
                        phase: RepPhase::Uncalibrated,
                        feedback: Feedback::Calibrating {
                            seconds_left: self.calibrator.full_window_seconds(),
                        },
                    });
                    events.push(CounterEvent::CalibrationProgress { percent: 0.0 });
                }
                self.check_tracking_loss(now, events);
            }
            CalibrationStep::Started { seconds_left } => {
                self.voter.set_calibrating(true);
                events.push(CounterEvent::PhaseChanged {
                    phase: RepPhase::Calibrating,
                    feedback: Feedback::Calibrating { seconds_left },
                });
                events.push(CounterEvent::CalibrationProgress { percent: 0.0 });
            }
            CalibrationStep::Capturing {
                percent,
                seconds_left,
            } => {
                events.push(CounterEvent::CalibrationProgress { percent });
                events.push(CounterEvent::Feedback {
                    feedback: Feedback::Calibrating { seconds_left },
                });
            }
            CalibrationStep::Completed(baseline) => {
                tracing::info!(
                    eye = ?baseline.eye_distance,
                    shoulder = ?baseline.shoulder_distance,
                    "calibrated"
                );
                self.voter.arm(now);
                events.push(CounterEvent::CalibrationProgress { percent: 100.0 });
                events.push(CounterEvent::PhaseChanged {
                    phase: RepPhase::Up,
                    feedback: Feedback::GoDown,
                });
            }
        }
    }

    fn check_tracking_loss(&mut self, now: u64, events: &mut Vec<CounterEvent>) {
        let last_seen = self.last_body_seen_ms.unwrap_or(now);
        if now.saturating_sub(last_seen) <= self.tracking_loss_ms {
            return;
        }
        if !self.tracking_lost {
            tracing::warn!(since_ms = now - last_seen, "tracking lost");
            self.tracking_lost = true;
        }
        events.push(CounterEvent::Feedback {
            feedback: Feedback::TrackingOff,
        });
    }

    /// 一時停止していた時間を時計から除く。再開時に呼ぶ
    pub fn shift_clocks(&mut self, paused_ms: u64) {
        self.calibrator.shift_clock(paused_ms);
        self.voter.shift_clock(paused_ms);
        if let Some(t) = self.last_body_seen_ms.as_mut() {
            *t += paused_ms;
        }
    }

    /// 基準・平滑化・局面をクリアする。カウントは保持
    pub fn recalibrate(&mut self) {
        self.calibrator.reset();
        self.smoother.reset();
        self.voter.reset();
        self.last_avg_ratio = None;
        self.last_avg_angle = None;
    }

    pub fn phase(&self) -> RepPhase {
        self.voter.phase()
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.calibrator.baseline()
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut SessionCounters {
        &mut self.counters
    }

    pub fn smoothed_ratio(&self) -> f32 {
        self.smoother.smoothed()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            phase: self.voter.phase(),
            smoothed_ratio: self.smoother.smoothed(),
            avg_ratio: self.last_avg_ratio,
            avg_angle: self.last_avg_angle,
            eyes_visible: self.last_signals.has_eyes(),
            shoulders_visible: self.last_signals.has_shoulders(),
            baseline: self.calibrator.baseline().copied(),
            calibration_progress: self.calibrator.progress(),
            tracking_lost: self.tracking_lost,
        }
    }
}

fn phase_changed(step: &Step) -> CounterEvent {
    CounterEvent::PhaseChanged {
        phase: step.to,
        feedback: step.feedback,
    }
}
