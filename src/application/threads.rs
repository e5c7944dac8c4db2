//! スレッド実装の詳細
//!
//! 入力イベントハンドラスレッドと軸コマンド送信スレッドの実装。
//! runner.rsから分離され、低レイテンシのスレッド間通信を実現します。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::application::engine::JogEngine;
use crate::application::health::LinkHealth;
use crate::application::poller::SharedInstrument;
use crate::application::shared_status::SharedDeviceStatus;
use crate::domain::{Axis, AxisCommand, InputEvent};

/// 入力イベントハンドラスレッドのメインループ
///
/// イベントをエンジンで処理し、生成された軸コマンドを対応する
/// 軸チャネルへ「最新のみ」ポリシーで流す。
/// チャネルが閉じたら、セッションをIdleへ戻してから終了する
/// （アンカーを持ったままシャットダウンしない）。
pub(crate) fn input_thread(
    mut engine: JogEngine,
    rx: Receiver<InputEvent>,
    cmd_x: (Sender<AxisCommand>, Receiver<AxisCommand>),
    cmd_y: (Sender<AxisCommand>, Receiver<AxisCommand>),
    shutdown: Arc<AtomicBool>,
) {
    tracing::info!("Input thread started");

    while let Ok(event) = rx.recv() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        if let Some(command) = engine.handle_event(event) {
            match command.axis {
                Axis::X => send_latest_only(&cmd_x.0, &cmd_x.1, command),
                Axis::Y => send_latest_only(&cmd_y.0, &cmd_y.1, command),
            }
        }
    }

    // コマンド送信停止後にIdleへ戻す。以降deltaが届いても捨てられる
    engine.reset_to_idle();
    tracing::info!("Input thread stopped, session returned to Idle");
}

/// 軸コマンド送信スレッドのメインループ
///
/// # 送信戦略
/// ジョグは本質的にlatest-value-winsであるため、受信時に溜まった
/// コマンドを排出して最新の1件だけを送る。処理中に届いた新しい
/// コマンドは、実行中のものの後ろに並ばず次の受信で置き換わる。
///
/// # エラー処理
/// 移動コマンドの失敗はセッション状態を変えない（操作者はポインタを
/// 動かし続ければ再試行できる）。連続失敗が閾値を超えたら切断
/// ステータスを上位へ通知する。
pub(crate) fn command_thread(
    axis: Axis,
    instrument: SharedInstrument,
    rx: Receiver<AxisCommand>,
    status: SharedDeviceStatus,
    mut health: LinkHealth,
) {
    tracing::info!("Command thread started for axis {}", axis.as_str());

    while let Ok(first) = rx.recv() {
        // 滞留分を捨てて最新のコマンドのみ実行する
        let command = rx.try_iter().last().unwrap_or(first);

        let result = {
            let mut guard = instrument.lock().unwrap_or_else(|e| e.into_inner());
            guard.move_relative(command.displacement)
        };

        match result {
            Ok(()) => {
                health.record_success();
                #[cfg(debug_assertions)]
                tracing::debug!(
                    "Axis {} moved by {}",
                    command.axis.as_str(),
                    command.displacement
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Move command failed on axis {} (displacement {}): {}",
                    command.axis.as_str(),
                    command.displacement,
                    e
                );
                if health.record_failure() {
                    tracing::error!(
                        "Axis {}: instrument link lost after repeated move failures",
                        axis.as_str()
                    );
                    status.mark_disconnected();
                }
            }
        }
    }

    tracing::info!("Command thread stopped for axis {}", axis.as_str());
}

/// 最新のみ上書きポリシーで送信
///
/// bounded(1)スロットが満杯なら、滞留している古い値を送信側で破棄してから
/// 最新値を入れ直す（crossbeamチャネルはMPMCなので送信側もReceiverを
/// 持てる）。新しいコマンドは古いものの後ろに並ばず、常に置き換える。
pub(crate) fn send_latest_only<T>(tx: &Sender<T>, slot_rx: &Receiver<T>, value: T) {
    match tx.try_send(value) {
        Ok(_) => {}
        Err(TrySendError::Full(value)) => {
            // 滞留分を破棄してから最新値を入れる。破棄と再送の間に受信側が
            // スロットを取り出していても、空いたスロットへ入るだけで無害
            let _ = slot_rx.try_recv();
            let _ = tx.try_send(value);
        }
        Err(TrySendError::Disconnected(_)) => {
            // Channel closed
        }
    }
}
