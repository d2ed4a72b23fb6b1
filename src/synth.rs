//! 腕立て伏せの合成フレーム
//!
//! 正面カメラで見た上半身を、カメラに近づく度合い (scale) と肘角度だけで動かす。
//! 目・肩の幅は scale に比例するので、基準との比率はそのまま scale になる。

use crate::pose::{FrameSample, Keypoint, KeypointIndex, Pose};

const CENTER_X: f32 = 320.0;
const CENTER_Y: f32 = 240.0;
const CONFIDENCE: f32 = 0.9;

#[derive(Debug, Clone)]
pub struct SynthParams {
    /// フレーム間隔（20fps なら 50）
    pub frame_ms: u64,
    /// 最初に静止する時間。キャリブレーション窓と同じにする
    pub calibration_ms: u64,
    /// 上下それぞれの姿勢を保持するフレーム数
    pub hold_frames: usize,
    pub reps: usize,
    pub start_ms: u64,
    /// 基準時の目の間隔 (px)
    pub eye_span: f32,
    /// 基準時の肩幅 (px)
    pub shoulder_span: f32,
    /// 上腕・前腕の長さ (px)
    pub arm_length: f32,
    /// 下がりきったときの見かけの大きさ
    pub down_scale: f32,
    pub down_angle_deg: f32,
    pub up_angle_deg: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            frame_ms: 50,
            calibration_ms: 3000,
            hold_frames: 6,
            reps: 5,
            start_ms: 0,
            eye_span: 30.0,
            shoulder_span: 120.0,
            arm_length: 60.0,
            down_scale: 1.15,
            down_angle_deg: 90.0,
            up_angle_deg: 170.0,
        }
    }
}

/// 見かけの大きさ scale・肘角度 elbow_deg の姿勢
pub fn pose_at(params: &SynthParams, scale: f32, elbow_deg: f32) -> Pose {
    use KeypointIndex::*;

    let at = |dx: f32, dy: f32| Keypoint::new(CENTER_X + dx * scale, CENTER_Y + dy * scale, CONFIDENCE);
    let eye = params.eye_span / 2.0;
    let shoulder = params.shoulder_span / 2.0;
    let arm = params.arm_length;
    let theta = elbow_deg.to_radians();

    let mut pose = Pose::from_named([
        (Nose, at(0.0, -70.0)),
        (LeftEye, at(-eye, -80.0)),
        (RightEye, at(eye, -80.0)),
        (LeftShoulder, at(-shoulder, 0.0)),
        (RightShoulder, at(shoulder, 0.0)),
    ]);

    // 上腕は真下、前腕は肘角度だけ外側に開く
    for (elbow, wrist, side) in [(LeftElbow, LeftWrist, -1.0), (RightElbow, RightWrist, 1.0)] {
        pose.set(elbow, at(side * shoulder, arm));
        pose.set(
            wrist,
            at(side * (shoulder + arm * theta.sin()), arm - arm * theta.cos()),
        );
    }
    pose
}

/// 基準姿勢で calibration_ms 静止した後、reps 回の腕立て
pub fn pushup_frames(params: &SynthParams) -> Vec<FrameSample> {
    let still = pose_at(params, 1.0, params.up_angle_deg);
    let mut frames: Vec<FrameSample> = (params.start_ms..=params.start_ms + params.calibration_ms)
        .step_by(params.frame_ms.max(1) as usize)
        .map(|t| FrameSample::new(still.clone(), t))
        .collect();

    let next = frames
        .last()
        .map(|f| f.timestamp_ms + params.frame_ms)
        .unwrap_or(params.start_ms);
    frames.extend(rep_frames(params, next, params.reps));
    frames
}

/// start_ms から reps 回分の下降・上昇フレーム
pub fn rep_frames(params: &SynthParams, start_ms: u64, reps: usize) -> Vec<FrameSample> {
    let down = pose_at(params, params.down_scale, params.down_angle_deg);
    let up = pose_at(params, 1.0, params.up_angle_deg);

    std::iter::repeat([down, up])
        .take(reps)
        .flat_map(|[down, up]| {
            std::iter::repeat(down)
                .take(params.hold_frames)
                .chain(std::iter::repeat(up).take(params.hold_frames))
        })
        .enumerate()
        .map(|(i, pose)| FrameSample::new(pose, start_ms + i as u64 * params.frame_ms))
        .collect()
}
