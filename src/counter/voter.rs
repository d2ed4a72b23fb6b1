use serde::Serialize;

use crate::config::CounterConfig;

use super::feedback::Feedback;

/// レップの局面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepPhase {
    Uncalibrated,
    Calibrating,
    Up,
    GoingDown,
    Down,
    GoingUp,
}

impl RepPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RepPhase::Uncalibrated => "UNCALIBRATED",
            RepPhase::Calibrating => "CALIBRATING",
            RepPhase::Up => "UP",
            RepPhase::GoingDown => "GOING_DOWN",
            RepPhase::Down => "DOWN",
            RepPhase::GoingUp => "GOING_UP",
        }
    }

    /// スタック検出の対象になる途中局面か
    pub fn is_transitional(&self) -> bool {
        matches!(self, RepPhase::GoingDown | RepPhase::GoingUp)
    }
}

/// 投票の閾値
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteThresholds {
    pub ratio_down: f32,
    pub ratio_up: f32,
    pub angle_down_deg: f32,
    pub angle_up_deg: f32,
}

impl VoteThresholds {
    pub fn from_config(config: &CounterConfig) -> Self {
        Self {
            ratio_down: config.ratio_down,
            ratio_up: config.ratio_up,
            angle_down_deg: config.angle_down_deg,
            angle_up_deg: config.angle_up_deg,
        }
    }
}

impl Default for VoteThresholds {
    fn default() -> Self {
        Self::from_config(&CounterConfig::default())
    }
}

/// サイズ比と肘角度の2票。どちらか一方で成立する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vote {
    pub descending: bool,
    pub ascending: bool,
}

impl Vote {
    pub fn cast(avg_ratio: Option<f32>, avg_angle: Option<f32>, t: &VoteThresholds) -> Self {
        let ratio_down = avg_ratio.is_some_and(|r| r > t.ratio_down);
        let ratio_up = avg_ratio.is_some_and(|r| r < t.ratio_up);
        let angle_down = avg_angle.is_some_and(|a| a < t.angle_down_deg);
        let angle_up = avg_angle.is_some_and(|a| a > t.angle_up_deg);
        Self {
            descending: ratio_down || angle_down,
            ascending: ratio_up || angle_up,
        }
    }
}

/// 1回の状態遷移
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub from: RepPhase,
    pub to: RepPhase,
    pub feedback: Feedback,
    /// GOING_UP → UP でレップ確定
    pub rep_counted: bool,
}

/// 投票ステートマシン
///
/// UP → GOING_DOWN → DOWN → GOING_UP → UP(+1)。
/// DOWN → GOING_UP は前回カウントから min_rep_interval_ms 経過後のみ。
/// GOING_* に stuck_timeout_ms を超えて留まると UP に戻す
pub struct Voter {
    phase: RepPhase,
    stage_started_ms: u64,
    last_count_ms: Option<u64>,
    thresholds: VoteThresholds,
    min_rep_interval_ms: u64,
    stuck_timeout_ms: u64,
}

impl Voter {
    pub fn new(thresholds: VoteThresholds, min_rep_interval_ms: u64, stuck_timeout_ms: u64) -> Self {
        Self {
            phase: RepPhase::Uncalibrated,
            stage_started_ms: 0,
            last_count_ms: None,
            thresholds,
            min_rep_interval_ms,
            stuck_timeout_ms,
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(
            VoteThresholds::from_config(config),
            config.min_rep_interval_ms,
            config.stuck_timeout_ms,
        )
    }

    pub fn phase(&self) -> RepPhase {
        self.phase
    }

    pub fn thresholds(&self) -> &VoteThresholds {
        &self.thresholds
    }

    pub fn last_count_ms(&self) -> Option<u64> {
        self.last_count_ms
    }

    /// キャリブレーション前の局面を設定（UNCALIBRATED / CALIBRATING）
    pub fn set_calibrating(&mut self, capturing: bool) {
        self.phase = if capturing {
            RepPhase::Calibrating
        } else {
            RepPhase::Uncalibrated
        };
    }

    /// キャリブレーション完了。UP から開始
    pub fn arm(&mut self, now_ms: u64) {
        self.phase = RepPhase::Up;
        self.stage_started_ms = now_ms;
    }

    /// 再キャリブレーション。前回カウント時刻は残す
    pub fn reset(&mut self) {
        self.phase = RepPhase::Uncalibrated;
    }

    /// 一時停止していた分だけ局面開始・前回カウントの時刻をずらす
    pub fn shift_clock(&mut self, ms: u64) {
        self.stage_started_ms += ms;
        if let Some(t) = self.last_count_ms.as_mut() {
            *t += ms;
        }
    }

    /// 途中局面に長く留まっていたら UP に戻す
    pub fn check_stuck(&mut self, now_ms: u64) -> Option<Step> {
        if !self.phase.is_transitional() {
            return None;
        }
        if now_ms.saturating_sub(self.stage_started_ms) <= self.stuck_timeout_ms {
            return None;
        }
        Some(self.enter(RepPhase::Up, Feedback::GoDown, now_ms, false))
    }

    /// 投票結果で1ステップ進める。該当する遷移がなければ None
    pub fn step(&mut self, vote: Vote, now_ms: u64) -> Option<Step> {
        use RepPhase::*;

        let phase = self.phase;
        if vote.descending {
            return match phase {
                Up | GoingUp => Some(self.enter(GoingDown, Feedback::GoUp, now_ms, false)),
                // 同じ閾値をもう一度満たしたので底に到達
                GoingDown => Some(self.enter(Down, Feedback::GoUp, now_ms, false)),
                _ => None,
            };
        }

        if vote.ascending {
            return match phase {
                Down if self.debounce_elapsed(now_ms) => {
                    Some(self.enter(GoingUp, Feedback::GoUp, now_ms, false))
                }
                GoingUp => {
                    self.last_count_ms = Some(now_ms);
                    Some(self.enter(Up, Feedback::GoodRep, now_ms, true))
                }
                // 底に届く前に戻った
                GoingDown => Some(self.enter(Up, Feedback::GoDown, now_ms, false)),
                _ => None,
            };
        }

        None
    }

    fn debounce_elapsed(&self, now_ms: u64) -> bool {
        match self.last_count_ms {
            Some(t) => now_ms.saturating_sub(t) >= self.min_rep_interval_ms,
            None => true,
        }
    }

    fn enter(&mut self, to: RepPhase, feedback: Feedback, now_ms: u64, rep_counted: bool) -> Step {
        let from = self.phase;
        self.phase = to;
        self.stage_started_ms = now_ms;
        Step {
            from,
            to,
            feedback,
            rep_counted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed_voter() -> Voter {
        let mut v = Voter::from_config(&CounterConfig::default());
        v.arm(0);
        v
    }

    fn ratio_vote(ratio: f32) -> Vote {
        Vote::cast(Some(ratio), None, &VoteThresholds::default())
    }

    #[test]
    fn test_vote_either_signal_suffices() {
        let t = VoteThresholds::default();
        assert!(Vote::cast(Some(1.09), None, &t).descending);
        assert!(Vote::cast(None, Some(120.0), &t).descending);
        assert!(Vote::cast(Some(1.0), Some(120.0), &t).descending);
        assert!(Vote::cast(Some(1.0), None, &t).ascending);
        assert!(Vote::cast(None, Some(170.0), &t).ascending);
        // 中間値はどちらでもない
        let v = Vote::cast(Some(1.06), Some(150.0), &t);
        assert!(!v.descending && !v.ascending);
        assert_eq!(Vote::cast(None, None, &t), Vote::default());
    }

    #[test]
    fn test_full_cycle_counts_once() {
        // 基準 eyeDistance=10 で比率 [1.0, 1.15, 1.15, 1.00, 0.98]
        let mut v = armed_voter();
        assert_eq!(v.step(ratio_vote(1.0), 1000), None);
        assert_eq!(v.step(ratio_vote(1.15), 1050).unwrap().to, RepPhase::GoingDown);
        assert_eq!(v.step(ratio_vote(1.15), 1100).unwrap().to, RepPhase::Down);
        let s = v.step(ratio_vote(1.0), 1500).unwrap();
        assert_eq!(s.to, RepPhase::GoingUp);
        assert!(!s.rep_counted);
        let s = v.step(ratio_vote(0.98), 1550).unwrap();
        assert_eq!(s.to, RepPhase::Up);
        assert_eq!(s.feedback, Feedback::GoodRep);
        assert!(s.rep_counted);
        assert_eq!(v.phase(), RepPhase::Up);
        assert_eq!(v.last_count_ms(), Some(1550));
    }

    #[test]
    fn test_debounce_only_gates_down_to_going_up() {
        let mut v = armed_voter();
        // 1回目のレップ
        v.step(ratio_vote(1.15), 100);
        v.step(ratio_vote(1.15), 150);
        v.step(ratio_vote(1.0), 200);
        assert!(v.step(ratio_vote(0.98), 250).unwrap().rep_counted);

        // 2回目: 底からの戻りが前回カウントから 350ms 未満なら止める
        v.step(ratio_vote(1.15), 300);
        v.step(ratio_vote(1.15), 350);
        assert_eq!(v.step(ratio_vote(1.0), 500), None);
        assert_eq!(v.phase(), RepPhase::Down);

        // 350ms 経過後に GOING_UP、その 100ms 後でもカウントされる
        assert_eq!(v.step(ratio_vote(1.0), 600).unwrap().to, RepPhase::GoingUp);
        let s = v.step(ratio_vote(0.98), 700).unwrap();
        assert!(s.rep_counted);
    }

    #[test]
    fn test_aborted_descent() {
        let mut v = armed_voter();
        v.step(ratio_vote(1.15), 100);
        let s = v.step(ratio_vote(1.0), 150).unwrap();
        assert_eq!(s.from, RepPhase::GoingDown);
        assert_eq!(s.to, RepPhase::Up);
        assert_eq!(s.feedback, Feedback::GoDown);
        assert!(!s.rep_counted);
    }

    #[test]
    fn test_going_up_reversal_goes_back_down() {
        let mut v = armed_voter();
        v.step(ratio_vote(1.15), 100);
        v.step(ratio_vote(1.15), 150);
        v.step(ratio_vote(1.0), 600);
        assert_eq!(v.phase(), RepPhase::GoingUp);
        assert_eq!(v.step(ratio_vote(1.2), 650).unwrap().to, RepPhase::GoingDown);
    }

    #[test]
    fn test_descending_wins_when_both() {
        let mut v = armed_voter();
        v.step(ratio_vote(1.15), 100);
        let both = Vote {
            descending: true,
            ascending: true,
        };
        assert_eq!(v.step(both, 150).unwrap().to, RepPhase::Down);
        // DOWN では下降票は何もしない
        assert_eq!(v.step(both, 200), None);
    }

    #[test]
    fn test_stuck_recovery() {
        let mut v = armed_voter();
        v.step(ratio_vote(1.15), 1000);
        assert_eq!(v.check_stuck(4000), None);
        let s = v.check_stuck(4001).unwrap();
        assert_eq!(s.from, RepPhase::GoingDown);
        assert_eq!(s.to, RepPhase::Up);
        assert!(!s.rep_counted);
        // DOWN はスタック対象外
        v.step(ratio_vote(1.15), 5000);
        v.step(ratio_vote(1.15), 5050);
        assert_eq!(v.phase(), RepPhase::Down);
        assert_eq!(v.check_stuck(60_000), None);
    }

    #[test]
    fn test_uncalibrated_ignores_votes() {
        let mut v = Voter::from_config(&CounterConfig::default());
        assert_eq!(v.step(ratio_vote(1.5), 0), None);
        v.set_calibrating(true);
        assert_eq!(v.step(ratio_vote(1.5), 10), None);
        assert_eq!(v.phase(), RepPhase::Calibrating);
    }

    #[test]
    fn test_shift_clock_delays_stuck_and_debounce() {
        let mut v = armed_voter();
        v.step(ratio_vote(1.15), 100);
        v.step(ratio_vote(1.15), 150);
        v.step(ratio_vote(1.0), 600);
        v.step(ratio_vote(0.98), 650);
        v.step(ratio_vote(1.15), 700);
        assert_eq!(v.phase(), RepPhase::GoingDown);

        v.shift_clock(10_000);
        assert_eq!(v.check_stuck(10_700), None);
        assert_eq!(v.last_count_ms(), Some(10_650));
        assert_eq!(v.step(ratio_vote(1.15), 10_750).unwrap().to, RepPhase::Down);
        // 前回カウントから 350ms 経っていない
        assert_eq!(v.step(ratio_vote(1.0), 10_900), None);
    }
}
