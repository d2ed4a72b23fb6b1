use serde::{Deserialize, Serialize};

/// MoveNet の 17 キーポイントインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;

    pub const ALL: [KeypointIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// MoveNet のキーポイント名（"left_eye" など）から変換
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|idx| idx.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// 単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    /// X座標（推定器の座標系そのまま、ピクセルでも正規化でもよい）
    pub x: f32,
    /// Y座標
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    #[serde(rename = "score")]
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値を超えているか（閾値ちょうどは不採用）
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }

    pub fn distance_to(&self, other: &Keypoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 1フレーム分の姿勢。推定器が出さなかった関節は None
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub keypoints: [Option<Keypoint>; KeypointIndex::COUNT],
}

impl Pose {
    /// 名前付きキーポイント列から組み立てる。同じ関節が複数あれば後勝ち
    pub fn from_named<I>(named: I) -> Self
    where
        I: IntoIterator<Item = (KeypointIndex, Keypoint)>,
    {
        let mut pose = Self::default();
        for (index, kp) in named {
            pose.set(index, kp);
        }
        pose
    }

    pub fn set(&mut self, index: KeypointIndex, kp: Keypoint) {
        self.keypoints[index as usize] = Some(kp);
    }

    /// インデックスでキーポイントを取得
    pub fn get(&self, index: KeypointIndex) -> Option<&Keypoint> {
        self.keypoints[index as usize].as_ref()
    }

    /// 閾値を超える信頼度のときだけ返す
    pub fn usable(&self, index: KeypointIndex, threshold: f32) -> Option<&Keypoint> {
        self.get(index).filter(|kp| kp.is_valid(threshold))
    }
}

/// 推定1サイクル分の入力。timestamp_ms はホスト側の単調時計（ミリ秒）
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSample {
    pub pose: Pose,
    pub timestamp_ms: u64,
}

impl FrameSample {
    pub fn new(pose: Pose, timestamp_ms: u64) -> Self {
        Self { pose, timestamp_ms }
    }
}
