//! ジョグエンジン（Application層）
//!
//! 入力イベント1件を、バインディング解決 → セッション更新 →
//! 変位計算の順で処理する同期コア。スレッド配線はrunner側が行い、
//! このモジュール自体はチャネルを知らない。

use std::sync::{Arc, Mutex};

use crate::application::shared_status::SharedDeviceStatus;
use crate::domain::{
    displacement, AxesConfig, AxisCommand, BindingTable, InputEvent, InstrumentId, JogConfig,
    LogicalAction, PositionHistory, SessionEffect, TrackingSession,
};

/// 入力イベントを軸コマンドへ変換する同期エンジン
///
/// 所有者は入力イベントハンドラスレッドのみ。
/// `TrackingSession`への書き込みはここからしか起きない（単一ライター）。
pub struct JogEngine {
    bindings: BindingTable,
    session: TrackingSession,
    jog: JogConfig,
    axes: AxesConfig,
    status: SharedDeviceStatus,
    history: Arc<Mutex<PositionHistory>>,
}

impl JogEngine {
    pub fn new(
        bindings: BindingTable,
        jog: JogConfig,
        axes: AxesConfig,
        status: SharedDeviceStatus,
        history: Arc<Mutex<PositionHistory>>,
    ) -> Self {
        let session = TrackingSession::new(jog.started_sensibility);
        Self {
            bindings,
            session,
            jog,
            axes,
            status,
            history,
        }
    }

    /// 入力イベントを1件処理する
    ///
    /// # Returns
    /// 計測器へ送るべき軸コマンド。アクションイベント・Idle中の移動・
    /// delta==0 の場合は `None`。
    pub fn handle_event(&mut self, event: InputEvent) -> Option<AxisCommand> {
        let action = self.bindings.resolve(event.button, event.kind);

        if action != LogicalAction::None {
            self.apply_action(action);
            return None;
        }

        // 未バインドイベント: Tracking中のポインタ移動のみが変位になる
        let delta = event.delta?;
        if !self.session.is_tracking() {
            return None;
        }

        let axis = self.session.selected_axis();
        let axis_config = self.axes.axis(axis);
        if axis_config.instrument == InstrumentId::None {
            // 計測器未割り当ての軸は駆動しない
            #[cfg(debug_assertions)]
            tracing::debug!("Axis {} has no instrument assigned, dropping delta", axis.as_str());
            return None;
        }

        displacement::compute(delta, axis, &self.session, axis_config, self.jog.incremental_step)
    }

    fn apply_action(&mut self, action: LogicalAction) {
        let snapshot = self.status.snapshot();
        let effect = self.session.apply(action, &snapshot);

        #[cfg(debug_assertions)]
        tracing::debug!(
            "Action {:?} applied: tracking={}, axis={}, sensitivity={}",
            action,
            self.session.is_tracking(),
            self.session.selected_axis().as_str(),
            self.session.sensitivity()
        );

        if let SessionEffect::Memorize(record) = effect {
            let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
            history.push(record);
            tracing::info!(
                "Memorized position ({}, {}) - history {}/{}",
                record.x,
                record.y,
                history.len(),
                history.capacity()
            );
        }
    }

    /// セッションをIdleへ戻す（シャットダウン用）
    pub fn reset_to_idle(&mut self) {
        self.session.reset_to_idle();
    }

    #[allow(dead_code)]
    pub fn session(&self) -> &TrackingSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppConfig, DeviceStatus, MouseButton, MouseEventKind, PositionRecord};
    use std::time::Instant;

    fn engine_with_status(status: SharedDeviceStatus) -> JogEngine {
        let config = AppConfig::default();
        let bindings = BindingTable::build(&config.bindings).unwrap();
        let history = Arc::new(Mutex::new(PositionHistory::new(config.memory.buffer_depth)));
        JogEngine::new(bindings, config.jog, config.axes, status, history)
    }

    fn enter_tracking() -> InputEvent {
        InputEvent::button(MouseButton::Left, MouseEventKind::Click)
    }

    fn exit_tracking() -> InputEvent {
        InputEvent::button(MouseButton::Right, MouseEventKind::Click)
    }

    #[test]
    fn test_idle_deltas_are_dropped() {
        let mut engine = engine_with_status(SharedDeviceStatus::new());
        assert_eq!(engine.handle_event(InputEvent::pointer_delta(1.0)), None);
    }

    #[test]
    fn test_tracking_delta_produces_clamped_command() {
        let mut engine = engine_with_status(SharedDeviceStatus::new());
        assert_eq!(engine.handle_event(enter_tracking()), None);

        // 0.002 * 1 * 0.05 = 0.0001 → 下限0.001へ切り上げ
        let cmd = engine
            .handle_event(InputEvent::pointer_delta(0.002))
            .unwrap();
        assert_eq!(cmd.displacement, 0.001);
    }

    #[test]
    fn test_exit_tracking_stops_commands_until_reenter() {
        let mut engine = engine_with_status(SharedDeviceStatus::new());
        engine.handle_event(enter_tracking());
        assert!(engine.handle_event(InputEvent::pointer_delta(1.0)).is_some());

        engine.handle_event(exit_tracking());
        assert_eq!(engine.handle_event(InputEvent::pointer_delta(1.0)), None);
        assert_eq!(engine.handle_event(InputEvent::pointer_delta(-3.0)), None);

        engine.handle_event(enter_tracking());
        assert!(engine.handle_event(InputEvent::pointer_delta(1.0)).is_some());
    }

    #[test]
    fn test_wheel_changes_sensitivity_without_command() {
        let mut engine = engine_with_status(SharedDeviceStatus::new());
        engine.handle_event(enter_tracking());

        let up = InputEvent::button(MouseButton::None, MouseEventKind::WheelUp);
        assert_eq!(engine.handle_event(up), None);
        assert_eq!(engine.session().sensitivity(), 2);

        let cmd = engine.handle_event(InputEvent::pointer_delta(1.0)).unwrap();
        // 1.0 * 2 * 0.05 = 0.1
        assert!((cmd.displacement - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_memorize_pushes_polled_snapshot() {
        let status = SharedDeviceStatus::new();
        status.publish(DeviceStatus {
            x: 12.5,
            y: -3.0,
            is_moving: false,
            polled_at: Instant::now(),
        });
        let mut engine = engine_with_status(status);

        let memorize = InputEvent::button(MouseButton::Middle, MouseEventKind::Click);
        assert_eq!(engine.handle_event(memorize), None);

        let history = engine.history.lock().unwrap();
        let records: Vec<_> = history.records().copied().collect();
        assert_eq!(records, vec![PositionRecord::new(12.5, -3.0)]);
    }

    #[test]
    fn test_axis_selection_routes_commands() {
        let mut engine = engine_with_status(SharedDeviceStatus::new());
        engine.handle_event(enter_tracking());

        let select_y = InputEvent::button(MouseButton::XButton2, MouseEventKind::Click);
        engine.handle_event(select_y);

        let cmd = engine.handle_event(InputEvent::pointer_delta(1.0)).unwrap();
        assert_eq!(cmd.axis, crate::domain::Axis::Y);
    }

    #[test]
    fn test_unassigned_axis_produces_no_command() {
        let mut config = AppConfig::default();
        config.axes.y.instrument = InstrumentId::None;
        let bindings = BindingTable::build(&config.bindings).unwrap();
        let history = Arc::new(Mutex::new(PositionHistory::new(config.memory.buffer_depth)));
        let mut engine = JogEngine::new(
            bindings,
            config.jog,
            config.axes,
            SharedDeviceStatus::new(),
            history,
        );

        engine.handle_event(enter_tracking());
        engine.handle_event(InputEvent::button(
            MouseButton::XButton2,
            MouseEventKind::Click,
        ));
        assert_eq!(engine.handle_event(InputEvent::pointer_delta(1.0)), None);
    }
}
