use serde::Serialize;

/// セット・セッション単位のレップ数
///
/// total_session_reps は record_rep() でしか増えず、減ることはない
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    reps_in_current_set: u32,
    completed_sets: Vec<u32>,
    total_session_reps: u32,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// 1レップ加算して新しいセッション合計を返す
    pub fn record_rep(&mut self) -> u32 {
        self.reps_in_current_set += 1;
        self.total_session_reps += 1;
        self.total_session_reps
    }

    /// 現在のセットを閉じる。0レップなら何もしない
    pub fn pause_current_set(&mut self) -> Option<u32> {
        if self.reps_in_current_set == 0 {
            return None;
        }
        let reps = std::mem::take(&mut self.reps_in_current_set);
        self.completed_sets.push(reps);
        Some(reps)
    }

    pub fn reps_in_current_set(&self) -> u32 {
        self.reps_in_current_set
    }

    pub fn completed_sets(&self) -> &[u32] {
        &self.completed_sets
    }

    pub fn total_session_reps(&self) -> u32 {
        self.total_session_reps
    }

    /// 表示用のセット番号（1始まり）
    pub fn set_number(&self) -> usize {
        self.completed_sets.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_rep() {
        let mut c = SessionCounters::new();
        assert_eq!(c.record_rep(), 1);
        assert_eq!(c.record_rep(), 2);
        assert_eq!(c.reps_in_current_set(), 2);
        assert_eq!(c.set_number(), 1);
    }

    #[test]
    fn test_pause_moves_set_without_touching_total() {
        let mut c = SessionCounters::new();
        c.record_rep();
        c.record_rep();
        c.record_rep();
        assert_eq!(c.pause_current_set(), Some(3));
        assert_eq!(c.reps_in_current_set(), 0);
        assert_eq!(c.completed_sets(), &[3]);
        assert_eq!(c.total_session_reps(), 3);
        assert_eq!(c.set_number(), 2);
    }

    #[test]
    fn test_pause_is_idempotent_when_empty() {
        let mut c = SessionCounters::new();
        c.record_rep();
        c.pause_current_set();
        let before = c.clone();
        assert_eq!(c.pause_current_set(), None);
        assert_eq!(c, before);
    }
}
