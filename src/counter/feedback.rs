use serde::Serialize;
use std::fmt;

use super::voter::RepPhase;

/// ユーザーに表示する短い指示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    GoDown,
    GoUp,
    GoodRep,
    /// キャリブレーション残り秒数
    Calibrating { seconds_left: u64 },
    TrackingOff,
    ResettingBaseline,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::GoDown => write!(f, "Go Down"),
            Feedback::GoUp => write!(f, "Go Up"),
            Feedback::GoodRep => write!(f, "Good Rep"),
            Feedback::Calibrating { seconds_left } => write!(f, "Calibrating... {}s", seconds_left),
            Feedback::TrackingOff => write!(f, "Tracking Off"),
            Feedback::ResettingBaseline => write!(f, "Resetting baseline..."),
        }
    }
}

/// 1フレームの処理結果としてホストへ通知するイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CounterEvent {
    /// 状態遷移ごとに1回
    PhaseChanged { phase: RepPhase, feedback: Feedback },
    /// 状態遷移を伴わない通知（カウントダウン、Tracking Off）
    Feedback { feedback: Feedback },
    /// キャリブレーション進捗 (0〜100)
    CalibrationProgress { percent: f32 },
    /// レップ確定。total はセッション合計
    RepCounted { total: u32, set_reps: u32 },
    /// 振動できるホスト向け
    Haptic { pattern_ms: [u32; 2] },
}
