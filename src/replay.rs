//! JSON Lines 形式のフレームログ
//!
//! 1行1レコード。フレームか操作のどちらか:
//!
//! ```text
//! {"t": 1200, "keypoints": [{"name": "left_eye", "x": 305.0, "y": 160.0, "score": 0.9}, ...]}
//! {"t": 5000, "control": "pause"}
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::counter::CounterEvent;
use crate::pose::{FrameSample, Keypoint, KeypointIndex, Pose};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedKeypoint {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Pause,
    Resume,
    Recalibrate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Control { t: u64, control: Control },
    Frame { t: u64, keypoints: Vec<NamedKeypoint> },
}

impl Record {
    pub fn from_frame(frame: &FrameSample) -> Self {
        let keypoints = KeypointIndex::ALL
            .iter()
            .filter_map(|&idx| {
                frame.pose.get(idx).map(|kp| NamedKeypoint {
                    name: idx.name().to_string(),
                    x: kp.x,
                    y: kp.y,
                    score: kp.confidence,
                })
            })
            .collect();
        Record::Frame {
            t: frame.timestamp_ms,
            keypoints,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Record::Control { t, .. } | Record::Frame { t, .. } => *t,
        }
    }

    /// フレームなら FrameSample に変換。知らない関節名は読み飛ばす
    pub fn to_frame(&self) -> Option<FrameSample> {
        let Record::Frame { t, keypoints } = self else {
            return None;
        };
        let named = keypoints.iter().filter_map(|kp| match KeypointIndex::from_name(&kp.name) {
            Some(idx) => Some((idx, Keypoint::new(kp.x, kp.y, kp.score))),
            None => {
                tracing::debug!(name = %kp.name, "unknown keypoint name skipped");
                None
            }
        });
        Some(FrameSample::new(Pose::from_named(named), *t))
    }
}

/// 1行をパース。空行と # で始まる行は None
pub fn parse_line(line: &str) -> Result<Option<Record>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let record = serde_json::from_str(line)?;
    Ok(Some(record))
}

pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("line {}: read failed", i + 1))?;
        if let Some(record) = parse_line(&line).with_context(|| format!("line {}: invalid record", i + 1))? {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open replay log: {}", path.display()))?;
    read_records(BufReader::new(file)).with_context(|| format!("Failed to parse replay log: {}", path.display()))
}

pub fn write_records<W: Write>(mut writer: W, records: &[Record]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// 1レコードをセッションに適用して、発生したイベントを返す
pub fn apply(session: &mut Session, record: &Record) -> Vec<CounterEvent> {
    match record {
        Record::Control { t, control } => match control {
            Control::Pause => {
                session.pause(*t);
                Vec::new()
            }
            Control::Resume => {
                session.resume(*t);
                Vec::new()
            }
            Control::Recalibrate => session.recalibrate(),
        },
        Record::Frame { .. } => match record.to_frame() {
            Some(frame) => session.process_frame(&frame),
            None => Vec::new(),
        },
    }
}
