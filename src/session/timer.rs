/// 一時停止を除いたワークアウトの経過時間
#[derive(Debug, Clone, Default)]
pub struct WorkoutTimer {
    /// 停止中に積算済みの時間
    accumulated_ms: u64,
    /// 計測中なら開始時刻
    running_since_ms: Option<u64>,
}

impl WorkoutTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 計測開始（再開）。計測中なら何もしない
    pub fn start(&mut self, now_ms: u64) {
        if self.running_since_ms.is_none() {
            self.running_since_ms = Some(now_ms);
        }
    }

    pub fn pause(&mut self, now_ms: u64) {
        if let Some(since) = self.running_since_ms.take() {
            self.accumulated_ms += now_ms.saturating_sub(since);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_since_ms.is_some()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let running = self
            .running_since_ms
            .map(|since| now_ms.saturating_sub(since))
            .unwrap_or(0);
        self.accumulated_ms + running
    }
}

/// MM:SS.cc 形式
pub fn format_elapsed(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centiseconds = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centiseconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_excludes_time() {
        let mut t = WorkoutTimer::new();
        t.start(1000);
        t.pause(3000);
        assert_eq!(t.elapsed_ms(10_000), 2000);
        t.start(10_000);
        assert_eq!(t.elapsed_ms(10_500), 2500);
    }

    #[test]
    fn test_double_start_keeps_origin() {
        let mut t = WorkoutTimer::new();
        t.start(0);
        t.start(500);
        assert_eq!(t.elapsed_ms(1000), 1000);
        t.pause(1000);
        t.pause(2000);
        assert_eq!(t.elapsed_ms(5000), 1000);
        assert!(!t.is_running());
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00.00");
        assert_eq!(format_elapsed(61_230), "01:01.23");
        assert_eq!(format_elapsed(9_999), "00:09.99");
    }
}
