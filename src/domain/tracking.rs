//! トラッキング状態機械
//!
//! Idle / Tracking の2状態と、軸選択・感度を管理する。
//! 所有者は入力イベントハンドラのみ（単一ライター）。
//! 変位計算は読み取るだけで、状態を変更しない。

use crate::domain::types::{Axis, DeviceStatus, LogicalAction, PositionRecord};

/// トラッキング状態
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackState {
    /// 待機中（ポインタ移動は無視される）
    Idle,
    /// 追従中。anchorはEnterTracking時点のデバイス位置
    Tracking { anchor: PositionRecord },
}

/// アクション適用の副作用
///
/// 状態機械自身はバッファを所有しないため、
/// 記憶要求は呼び出し側への副作用として返す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEffect {
    None,
    /// このスナップショットを記憶位置バッファへ追加する
    Memorize(PositionRecord),
}

/// トラッキングセッション
#[derive(Debug, Clone)]
pub struct TrackingSession {
    state: TrackState,
    selected_axis: Axis,
    sensitivity: u32,
}

impl TrackingSession {
    /// 初期状態のセッションを作成（Idle、X軸選択）
    ///
    /// `started_sensibility`は1以上であること（設定検証済みの値を渡す）。
    pub fn new(started_sensibility: u32) -> Self {
        Self {
            state: TrackState::Idle,
            selected_axis: Axis::X,
            sensitivity: started_sensibility.max(1),
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, TrackState::Tracking { .. })
    }

    #[allow(dead_code)]
    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn selected_axis(&self) -> Axis {
        self.selected_axis
    }

    pub fn sensitivity(&self) -> u32 {
        self.sensitivity
    }

    /// 論理アクションを適用し、状態遷移と副作用を返す
    ///
    /// `status`はアンカー捕捉・位置記憶に使う現在のデバイス状態スナップショット。
    pub fn apply(&mut self, action: LogicalAction, status: &DeviceStatus) -> SessionEffect {
        match action {
            LogicalAction::None => SessionEffect::None,
            LogicalAction::EnterTracking => {
                // 既にTracking中なら何もしない（アンカーを取り直さない）
                if !self.is_tracking() {
                    self.state = TrackState::Tracking {
                        anchor: status.position(),
                    };
                }
                SessionEffect::None
            }
            LogicalAction::ExitTracking => {
                // アンカーを破棄。以降のポインタ移動はEnterTrackingまで無視される
                self.state = TrackState::Idle;
                SessionEffect::None
            }
            LogicalAction::SelectXAxis => {
                self.selected_axis = Axis::X;
                SessionEffect::None
            }
            LogicalAction::SelectYAxis => {
                self.selected_axis = Axis::Y;
                SessionEffect::None
            }
            LogicalAction::IncreaseSensibility => {
                // 上限なし。振幅の制限は変位計算側で行う
                self.sensitivity = self.sensitivity.saturating_add(1);
                SessionEffect::None
            }
            LogicalAction::DecreaseSensibility => {
                // 下限1。0になるとゼロ除算・符号反転の危険がある
                self.sensitivity = self.sensitivity.saturating_sub(1).max(1);
                SessionEffect::None
            }
            LogicalAction::MemorizePosition => SessionEffect::Memorize(status.position()),
        }
    }

    /// セッションを強制的にIdleへ戻す（シャットダウン用）
    pub fn reset_to_idle(&mut self) {
        self.state = TrackState::Idle;
    }
}
