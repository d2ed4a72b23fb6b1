use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};

use pushup_tracker::replay::{self, Control, Record};
use pushup_tracker::synth::{self, SynthParams};

/// Usage: synth_frames [reps] [output.jsonl]
/// 出力先を省略すると標準出力
fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let reps = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("invalid rep count: {}", s))?,
        None => SynthParams::default().reps,
    };
    let params = SynthParams {
        reps,
        ..Default::default()
    };

    let mut records: Vec<Record> = synth::pushup_frames(&params)
        .iter()
        .map(Record::from_frame)
        .collect();
    // 最後にセットを閉じる
    if let Some(end) = records.last().map(Record::timestamp_ms) {
        records.push(Record::Control {
            t: end + params.frame_ms,
            control: Control::Pause,
        });
    }

    match args.get(2) {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
            replay::write_records(BufWriter::new(file), &records)?;
            eprintln!("{} レコード ({} レップ) を書き出しました: {}", records.len(), reps, path);
        }
        None => replay::write_records(io::stdout().lock(), &records)?,
    }
    Ok(())
}
