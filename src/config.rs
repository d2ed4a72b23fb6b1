use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// キーポイントから指標を作るときの設定
#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    /// この値を超える信頼度のキーポイントだけ使う
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// 目の比率の重み（肩は 1 - eye_weight）
    #[serde(default = "default_eye_weight")]
    pub eye_weight: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    /// 基準姿勢の取り込み時間（ミリ秒）
    #[serde(default = "default_calibration_window_ms")]
    pub window_ms: u64,
}

/// 投票ステートマシンの閾値とタイムアウト
#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    /// 指数平滑化の係数
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f32,
    /// 移動平均の窓サイズ
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// この比率を超えたら下降とみなす
    #[serde(default = "default_ratio_down")]
    pub ratio_down: f32,
    /// この比率を下回ったら上昇とみなす
    #[serde(default = "default_ratio_up")]
    pub ratio_up: f32,
    #[serde(default = "default_angle_down_deg")]
    pub angle_down_deg: f32,
    #[serde(default = "default_angle_up_deg")]
    pub angle_up_deg: f32,
    /// 前回カウントから DOWN→GOING_UP を許すまでの最小間隔
    #[serde(default = "default_min_rep_interval_ms")]
    pub min_rep_interval_ms: u64,
    /// GOING_DOWN / GOING_UP に留まれる最大時間
    #[serde(default = "default_stuck_timeout_ms")]
    pub stuck_timeout_ms: u64,
    /// 体が見えなくなってから "Tracking Off" を出すまでの時間
    #[serde(default = "default_tracking_loss_ms")]
    pub tracking_loss_ms: u64,
    /// レップ確定時のバイブパターン（ミリ秒）
    #[serde(default = "default_haptic_pattern_ms")]
    pub haptic_pattern_ms: [u32; 2],
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayConfig {
    /// フレームごとにデバッグスナップショットを表示
    #[serde(default)]
    pub print_debug: bool,
}

fn default_confidence_threshold() -> f32 { 0.3 }
fn default_eye_weight() -> f32 { 0.7 }
fn default_calibration_window_ms() -> u64 { 3000 }
fn default_smoothing_alpha() -> f32 { 0.5 }
fn default_window_size() -> usize { 3 }
fn default_ratio_down() -> f32 { 1.08 }
fn default_ratio_up() -> f32 { 1.05 }
fn default_angle_down_deg() -> f32 { 135.0 }
fn default_angle_up_deg() -> f32 { 160.0 }
fn default_min_rep_interval_ms() -> u64 { 350 }
fn default_stuck_timeout_ms() -> u64 { 3000 }
fn default_tracking_loss_ms() -> u64 { 10_000 }
fn default_haptic_pattern_ms() -> [u32; 2] { [50, 30] }

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            eye_weight: default_eye_weight(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            window_ms: default_calibration_window_ms(),
        }
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: default_smoothing_alpha(),
            window_size: default_window_size(),
            ratio_down: default_ratio_down(),
            ratio_up: default_ratio_up(),
            angle_down_deg: default_angle_down_deg(),
            angle_up_deg: default_angle_up_deg(),
            min_rep_interval_ms: default_min_rep_interval_ms(),
            stuck_timeout_ms: default_stuck_timeout_ms(),
            tracking_loss_ms: default_tracking_loss_ms(),
            haptic_pattern_ms: default_haptic_pattern_ms(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Invalid config TOML")?;
        Ok(config)
    }

    /// 読めなければデフォルト設定で続行
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{:#} - using default config", e);
                Self::default()
            }
        }
    }
}
