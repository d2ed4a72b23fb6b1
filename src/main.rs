use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

use pushup_tracker::config::Config;
use pushup_tracker::counter::CounterEvent;
use pushup_tracker::replay::{self, Record};
use pushup_tracker::session::{format_elapsed, Session};

const CONFIG_PATH: &str = "config.toml";

fn describe(event: &CounterEvent) -> String {
    match event {
        CounterEvent::PhaseChanged { phase, feedback } => format!("{:<12} {}", phase.name(), feedback),
        CounterEvent::Feedback { feedback } => format!("{:<12} {}", "", feedback),
        CounterEvent::CalibrationProgress { percent } => format!("キャリブレーション {:>5.1}%", percent),
        CounterEvent::RepCounted { total, set_reps } => {
            format!("レップ! 合計 {} (このセット {})", total, set_reps)
        }
        CounterEvent::Haptic { pattern_ms } => format!("バイブ {:?}ms", pattern_ms),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Usage: pushup-tracker <log.jsonl> [config.toml]
    let args: Vec<String> = std::env::args().collect();
    let Some(log_path) = args.get(1) else {
        let program = args.first().map_or("pushup-tracker", String::as_str);
        bail!("usage: {} <log.jsonl> [config.toml]", program);
    };
    let config = match args.get(2) {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(CONFIG_PATH),
    };

    println!("=== Pushup Tracker {} ===", env!("GIT_VERSION"));
    println!("ログ: {}", log_path);
    println!();

    let records = replay::load(log_path)?;
    let Some(last) = records.last().map(Record::timestamp_ms) else {
        println!("レコードがありません");
        return Ok(());
    };

    let mut session = Session::new(&config);
    for record in &records {
        let t = record.timestamp_ms();
        if let Record::Control { control, .. } = record {
            println!("[{:>8}ms] 操作: {:?}", t, control);
        }
        for event in replay::apply(&mut session, record) {
            println!("[{:>8}ms] {}", t, describe(&event));
        }
        if config.replay.print_debug && matches!(record, Record::Frame { .. }) {
            println!("{}", serde_json::to_string(&session.snapshot(t))?);
        }
    }

    let summary = session.end_session(last);
    println!();
    println!("=== 結果 ===");
    println!("合計レップ: {}", summary.total_reps);
    for (i, reps) in summary.sets.iter().enumerate() {
        println!("  セット{}: {}", i + 1, reps);
    }
    println!("運動時間: {}", format_elapsed(summary.active_ms));
    Ok(())
}
