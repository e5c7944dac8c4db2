//! 設定管理
//!
//! TOML設定ファイルの読み込みとDomain型への変換。
//! 読み込み後は不変。再設定時は全体を置き換える（部分適用は行わない）。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::types::{Axis, LogicalAction, MouseButton, MouseEventKind};
use crate::domain::{DomainError, DomainResult};

/// 軸の進行方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// ポインタの移動方向と同方向
    #[default]
    Normal,
    /// 符号を反転する
    Inverse,
}

impl Direction {
    /// 符号係数を取得（Normal = +1, Inverse = -1）
    pub fn factor(&self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Inverse => -1.0,
        }
    }
}

/// 軸に割り当てる計測器の識別子
///
/// `none`は未割り当て（その軸は駆動しない）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentId {
    Instrument1,
    Instrument2,
    #[default]
    None,
}

/// ポーリング設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PollingConfig {
    /// 位置・ステータス取得の周期（ミリ秒）
    ///
    /// デフォルト: 100ms
    pub interval_ms: u64,

    /// 診断チェックの周期（ミリ秒）
    ///
    /// ポーリングとは独立したタイマーで実行される。
    /// デフォルト: 1000ms
    pub diagnostics_delay_ms: u64,

    /// 連続失敗の許容回数
    ///
    /// この回数を超えたら切断ステータスへエスカレーションする。
    /// デフォルト: 5回
    pub max_consecutive_failures: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            diagnostics_delay_ms: 1000,
            max_consecutive_failures: 5,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn diagnostics_delay(&self) -> Duration {
        Duration::from_millis(self.diagnostics_delay_ms)
    }
}

/// ジョグ（マウス追従）設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JogConfig {
    /// ポインタ移動1単位あたりの基本変位量
    ///
    /// デフォルト: 0.05
    pub incremental_step: f64,

    /// 起動時の感度（整数スケール係数）
    ///
    /// 1以上。デフォルト: 1
    pub started_sensibility: u32,
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            incremental_step: 0.05,
            started_sensibility: 1,
        }
    }
}

/// 軸ごとの設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AxisConfig {
    /// 進行方向（normal / inverse）
    #[serde(default)]
    pub direction: Direction,

    /// 変位コマンドの最小振幅
    ///
    /// これ未満の変位は切り上げられる（機械分解能未満の微小移動を防ぐ）。
    /// デフォルト: 0.001
    pub min_amplitude: f64,

    /// 変位コマンドの最大振幅
    ///
    /// これを超える変位は切り詰められる。デフォルト: 20.0
    pub max_amplitude: f64,

    /// この軸を駆動する計測器
    ///
    /// 選択肢: "instrument1", "instrument2", "none"
    #[serde(default)]
    pub instrument: InstrumentId,
}

impl AxisConfig {
    fn default_x() -> Self {
        Self {
            direction: Direction::Normal,
            min_amplitude: 0.001,
            max_amplitude: 20.0,
            instrument: InstrumentId::Instrument1,
        }
    }

    fn default_y() -> Self {
        Self {
            direction: Direction::Normal,
            min_amplitude: 0.001,
            max_amplitude: 20.0,
            instrument: InstrumentId::Instrument2,
        }
    }
}

/// 両軸の設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AxesConfig {
    /// X軸設定
    #[serde(default = "AxisConfig::default_x")]
    pub x: AxisConfig,
    /// Y軸設定
    #[serde(default = "AxisConfig::default_y")]
    pub y: AxisConfig,
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            x: AxisConfig::default_x(),
            y: AxisConfig::default_y(),
        }
    }
}

impl AxesConfig {
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// 記憶位置バッファ設定
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemoryConfig {
    /// 記憶位置バッファの深さ（FIFO容量）
    ///
    /// 1以上。デフォルト: 10
    pub buffer_depth: usize,

    /// 記憶位置の永続化先ファイル
    ///
    /// デフォルト: "positions.txt"
    pub history_file: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            buffer_depth: 10,
            history_file: "positions.txt".to_string(),
        }
    }
}

/// 入力バインディングの1エントリ
///
/// (button, event) の組が論理アクションへ対応付けられる。
/// 同じ組を2回定義するとバリデーションエラーになる（上書きはしない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BindingEntry {
    /// 対象ボタン
    pub button: MouseButton,
    /// 対象イベント種別
    pub event: MouseEventKind,
    /// 解決される論理アクション
    pub action: LogicalAction,
}

/// デフォルトのバインディングテーブル
fn default_bindings() -> Vec<BindingEntry> {
    use LogicalAction::*;
    use MouseButton as B;
    use MouseEventKind as E;
    vec![
        BindingEntry {
            button: B::Left,
            event: E::Click,
            action: EnterTracking,
        },
        BindingEntry {
            button: B::Right,
            event: E::Click,
            action: ExitTracking,
        },
        BindingEntry {
            button: B::XButton1,
            event: E::Click,
            action: SelectXAxis,
        },
        BindingEntry {
            button: B::XButton2,
            event: E::Click,
            action: SelectYAxis,
        },
        BindingEntry {
            button: B::None,
            event: E::WheelUp,
            action: IncreaseSensibility,
        },
        BindingEntry {
            button: B::None,
            event: E::WheelDown,
            action: DecreaseSensibility,
        },
        BindingEntry {
            button: B::Middle,
            event: E::Click,
            action: MemorizePosition,
        },
    ]
}

/// アプリケーション設定のルート構造
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// ポーリング設定
    #[serde(default)]
    pub polling: PollingConfig,
    /// ジョグ設定
    #[serde(default)]
    pub jog: JogConfig,
    /// 軸設定
    #[serde(default)]
    pub axes: AxesConfig,
    /// 記憶位置バッファ設定
    #[serde(default)]
    pub memory: MemoryConfig,
    /// 入力バインディング
    #[serde(default = "default_bindings")]
    pub bindings: Vec<BindingEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            polling: PollingConfig::default(),
            jog: JogConfig::default(),
            axes: AxesConfig::default(),
            memory: MemoryConfig::default(),
            bindings: default_bindings(),
        }
    }
}

impl AppConfig {
    /// TOMLファイルから設定を読み込む
    pub fn from_file<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse config file: {}", e)))
    }

    /// デフォルト設定をTOMLファイルに書き出す
    #[allow(dead_code)]
    pub fn write_default<P: AsRef<Path>>(path: P) -> DomainResult<()> {
        let config = Self::default();
        let content = toml::to_string_pretty(&config).map_err(|e| {
            DomainError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)
            .map_err(|e| DomainError::Configuration(format!("Failed to write config file: {}", e)))
    }

    /// 設定の妥当性を検証
    ///
    /// 違反があった場合、問題のフィールド名を含むエラーを返す。
    /// 部分適用は行わない（検証に通らない設定は全体が拒否される）。
    pub fn validate(&self) -> DomainResult<()> {
        if self.polling.interval_ms == 0 {
            return Err(DomainError::Configuration(
                "polling.interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.polling.diagnostics_delay_ms == 0 {
            return Err(DomainError::Configuration(
                "polling.diagnostics_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.polling.max_consecutive_failures == 0 {
            return Err(DomainError::Configuration(
                "polling.max_consecutive_failures must be greater than 0".to_string(),
            ));
        }

        if self.jog.incremental_step <= 0.0 {
            return Err(DomainError::Configuration(
                "jog.incremental_step must be positive".to_string(),
            ));
        }
        if self.jog.started_sensibility == 0 {
            return Err(DomainError::Configuration(
                "jog.started_sensibility must be at least 1".to_string(),
            ));
        }

        for (name, axis) in [("axes.x", &self.axes.x), ("axes.y", &self.axes.y)] {
            if axis.min_amplitude < 0.0 {
                return Err(DomainError::Configuration(format!(
                    "{}.min_amplitude must be non-negative",
                    name
                )));
            }
            if axis.min_amplitude >= axis.max_amplitude {
                return Err(DomainError::Configuration(format!(
                    "{}.min_amplitude must be less than max_amplitude",
                    name
                )));
            }
        }

        // 軸→計測器の割り当ては非None値について単射でなければならない
        if self.axes.x.instrument != InstrumentId::None
            && self.axes.x.instrument == self.axes.y.instrument
        {
            return Err(DomainError::Configuration(
                "axes.x.instrument and axes.y.instrument must not share the same instrument"
                    .to_string(),
            ));
        }

        if self.memory.buffer_depth == 0 {
            return Err(DomainError::Configuration(
                "memory.buffer_depth must be at least 1".to_string(),
            ));
        }

        // バインディングはテーブル構築の検証（重複・予約キー）を通ること
        crate::domain::bindings::BindingTable::build(&self.bindings)?;

        Ok(())
    }
}
