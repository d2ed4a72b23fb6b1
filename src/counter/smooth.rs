use std::collections::VecDeque;

use crate::config::CounterConfig;

/// 比率の2段ローパス
///
/// 1段目: EMA (初期値 1.0)
/// 2段目: 直近 capacity 個の EMA 値の単純平均
pub struct RatioSmoother {
    alpha: f32,
    capacity: usize,
    smoothed: f32,
    window: VecDeque<f32>,
}

impl RatioSmoother {
    pub const NEUTRAL: f32 = 1.0;

    pub fn new(alpha: f32, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alpha,
            capacity,
            smoothed: Self::NEUTRAL,
            window: VecDeque::with_capacity(capacity),
        }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.smoothing_alpha, config.window_size)
    }

    /// 新しい比率を入れて、投票に使う平均値を返す
    pub fn push(&mut self, ratio: f32) -> f32 {
        let a = self.alpha;
        self.smoothed = self.smoothed * (1.0 - a) + ratio * a;

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(self.smoothed);

        self.window.iter().sum::<f32>() / self.window.len() as f32
    }

    pub fn smoothed(&self) -> f32 {
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.smoothed = Self::NEUTRAL;
        self.window.clear();
    }
}
