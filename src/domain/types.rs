/// コア型定義
///
/// Domain層の中心となるデータ構造。
/// 入力イベント・軸コマンド・デバイス状態など、全層で共有される型。
use std::time::Instant;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ステージの制御軸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
        }
    }
}

/// マウスボタン
///
/// `None`はボタンを伴わないイベント（ホイール回転・ポインタ移動）用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Right,
    Middle,
    XButton1,
    XButton2,
}

/// マウスイベント種別
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MouseEventKind {
    #[default]
    None,
    Click,
    DoubleClick,
    WheelDown,
    WheelUp,
    Down,
    Up,
}

/// 入力イベントから解決される論理アクション
///
/// `None`は「バインドなし・無視」を意味する正当な値であり、エラーではない。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogicalAction {
    #[default]
    None,
    EnterTracking,
    ExitTracking,
    SelectXAxis,
    SelectYAxis,
    IncreaseSensibility,
    DecreaseSensibility,
    MemorizePosition,
}

/// GUI層から通知される入力イベント
///
/// ポインタ移動は `button = None, kind = None, delta = Some(..)` として届く。
/// ホイール等のボタンイベントにdeltaが付くこともあるが、
/// アクション解決が優先され、未バインドの場合のみdeltaが変位計算に流れる。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub button: MouseButton,
    pub kind: MouseEventKind,
    pub delta: Option<f64>,
}

impl InputEvent {
    /// ボタンイベントを作成（delta なし）
    pub fn button(button: MouseButton, kind: MouseEventKind) -> Self {
        Self {
            button,
            kind,
            delta: None,
        }
    }

    /// ポインタ移動イベントを作成
    pub fn pointer_delta(delta: f64) -> Self {
        Self {
            button: MouseButton::None,
            kind: MouseEventKind::None,
            delta: Some(delta),
        }
    }
}

/// 計測器へ送る計算済み軸コマンド
///
/// 変位はクランプ済み。イベントごとに生成され、保持されない。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisCommand {
    pub axis: Axis,
    pub displacement: f64,
}

/// MemorizePositionアクション時のスナップショット
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
}

impl PositionRecord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// ポーリングループが公開する最新のデバイス状態
///
/// 単一ライター（ポーリングスレッド）・複数リーダー。
/// 値全体を差し替えて公開するため、部分更新が観測されることはない。
#[derive(Debug, Clone, Copy)]
pub struct DeviceStatus {
    pub x: f64,
    pub y: f64,
    pub is_moving: bool,
    pub polled_at: Instant,
}

impl DeviceStatus {
    /// 起動直後の初期状態（まだ一度もポーリングしていない）
    pub fn initial() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            is_moving: false,
            polled_at: Instant::now(),
        }
    }

    pub fn position(&self) -> PositionRecord {
        PositionRecord::new(self.x, self.y)
    }
}

/// 計測器のステータス応答
#[derive(Debug, Clone, Default)]
pub struct InstrumentStatus {
    pub is_moving: bool,
    /// 計測器が報告した内部エラー（あれば）
    pub error: Option<String>,
}
