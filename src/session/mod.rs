pub mod counters;
pub mod timer;

pub use counters::SessionCounters;
pub use timer::{format_elapsed, WorkoutTimer};

use serde::Serialize;

use crate::config::Config;
use crate::counter::{CounterEvent, CounterSnapshot, Feedback, RepCounter, RepPhase};
use crate::pose::FrameSample;

/// ホストから見た1回のワークアウト
///
/// RepCounter にフレームを渡しつつ、一時停止・再キャリブレーション・終了を受け付ける。
/// 次のワークアウトでは新しい Session を作る
pub struct Session {
    counter: RepCounter,
    timer: WorkoutTimer,
    /// 一時停止した時刻。None なら計測中
    paused_at_ms: Option<u64>,
    last_feedback: Option<Feedback>,
}

/// UI 表示用（読み取り専用）
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub counter: CounterSnapshot,
    pub feedback: Option<String>,
    pub set_number: usize,
    pub reps_in_current_set: u32,
    pub completed_sets: Vec<u32>,
    pub total_session_reps: u32,
    pub paused: bool,
    pub elapsed_ms: u64,
    pub elapsed: String,
}

/// end_session() の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub total_reps: u32,
    /// 0レップのセットは含まない
    pub sets: Vec<u32>,
    pub active_ms: u64,
}

impl Session {
    pub fn new(config: &Config) -> Self {
        Self {
            counter: RepCounter::new(config),
            timer: WorkoutTimer::new(),
            paused_at_ms: None,
            last_feedback: None,
        }
    }

    /// 一時停止中のフレームは捨てる
    pub fn process_frame(&mut self, frame: &FrameSample) -> Vec<CounterEvent> {
        if self.is_paused() {
            return Vec::new();
        }
        self.timer.start(frame.timestamp_ms);

        let events = self.counter.process(frame);
        self.remember_feedback(&events);
        events
    }

    /// 現在のセットを閉じて計測を止める。閉じたセットのレップ数を返す
    pub fn pause(&mut self, now_ms: u64) -> Option<u32> {
        if self.is_paused() {
            return None;
        }
        self.paused_at_ms = Some(now_ms);
        self.timer.pause(now_ms);

        let closed = self.counter.counters_mut().pause_current_set();
        if let Some(reps) = closed {
            tracing::info!(reps, sets = self.counter.counters().completed_sets().len(), "set closed");
        }
        closed
    }

    /// 再開。止まっていた時間はキャリブレーション窓やスタック判定に数えない
    pub fn resume(&mut self, now_ms: u64) {
        let Some(paused_at) = self.paused_at_ms.take() else {
            return;
        };
        self.counter.shift_clocks(now_ms.saturating_sub(paused_at));
        self.timer.start(now_ms);
    }

    /// 基準を取り直す。カウントはそのまま
    pub fn recalibrate(&mut self) -> Vec<CounterEvent> {
        tracing::info!("recalibrate requested");
        self.counter.recalibrate();
        let events = vec![CounterEvent::PhaseChanged {
            phase: RepPhase::Uncalibrated,
            feedback: Feedback::ResettingBaseline,
        }];
        self.remember_feedback(&events);
        events
    }

    /// セッションを終える。開いているセットも結果に含める
    pub fn end_session(mut self, now_ms: u64) -> SessionSummary {
        self.timer.pause(now_ms);
        let counters = self.counter.counters_mut();
        counters.pause_current_set();

        let summary = SessionSummary {
            total_reps: counters.total_session_reps(),
            sets: counters.completed_sets().to_vec(),
            active_ms: self.timer.elapsed_ms(now_ms),
        };
        tracing::info!(
            total = summary.total_reps,
            sets = summary.sets.len(),
            active_ms = summary.active_ms,
            "session ended"
        );
        summary
    }

    fn remember_feedback(&mut self, events: &[CounterEvent]) {
        for event in events {
            match event {
                CounterEvent::PhaseChanged { feedback, .. } | CounterEvent::Feedback { feedback } => {
                    self.last_feedback = Some(*feedback);
                }
                _ => {}
            }
        }
    }

    pub fn phase(&self) -> RepPhase {
        self.counter.phase()
    }

    pub fn counters(&self) -> &SessionCounters {
        self.counter.counters()
    }

    pub fn last_feedback(&self) -> Option<Feedback> {
        self.last_feedback
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_ms.is_some()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.timer.elapsed_ms(now_ms)
    }

    pub fn snapshot(&self, now_ms: u64) -> SessionSnapshot {
        let counters = self.counter.counters();
        let elapsed_ms = self.timer.elapsed_ms(now_ms);
        SessionSnapshot {
            counter: self.counter.snapshot(),
            feedback: self.last_feedback.map(|f| f.to_string()),
            set_number: counters.set_number(),
            reps_in_current_set: counters.reps_in_current_set(),
            completed_sets: counters.completed_sets().to_vec(),
            total_session_reps: counters.total_session_reps(),
            paused: self.is_paused(),
            elapsed_ms,
            elapsed: format_elapsed(elapsed_ms),
        }
    }
}
