//! ジョグセッション実行コンテキスト（Application層）
//!
//! 入力 / 軸コマンド×2 / ポーリング / 診断 の各スレッドを配線し、
//! セッション全体のライフサイクル（起動〜順序付きシャットダウン）を管理する。
//!
//! ## シャットダウン順序
//! 1. 入力チャネルが閉じる → 入力スレッドがセッションをIdleへ戻して終了
//! 2. コマンド送信側が落ち、軸コマンドスレッドが終了
//! 3. shutdownフラグで両タイマー（ポーリング・診断）を停止
//! 4. 全スレッドjoin後に計測器ハンドルを解放

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver};

use crate::application::engine::JogEngine;
use crate::application::health::{HealthPolicy, LinkHealth};
use crate::application::poller::{self, PolledAxis, SharedInstrument};
use crate::application::shared_status::SharedDeviceStatus;
use crate::application::threads;
use crate::domain::{
    AppConfig, Axis, AxisCommand, BindingTable, DomainError, DomainResult, InputEvent,
    InstrumentId, PositionHistory,
};

/// ジョグセッション実行コンテキスト
pub struct JogRunner {
    config: AppConfig,
    axis_x: Option<SharedInstrument>,
    axis_y: Option<SharedInstrument>,
    event_rx: Receiver<InputEvent>,
    status: SharedDeviceStatus,
    history: Arc<Mutex<PositionHistory>>,
    bindings: BindingTable,
}

impl JogRunner {
    /// 新しいJogRunnerを作成
    ///
    /// `instrument1` / `instrument2` は物理計測器のハンドル。
    /// どの軸がどちらを使うかは設定の axes.*.instrument が決める。
    pub fn new(
        config: AppConfig,
        instrument1: Option<SharedInstrument>,
        instrument2: Option<SharedInstrument>,
        event_rx: Receiver<InputEvent>,
        history: PositionHistory,
    ) -> DomainResult<Self> {
        let bindings = BindingTable::build(&config.bindings)?;

        let axis_x = Self::assign(config.axes.x.instrument, &instrument1, &instrument2, "x")?;
        let axis_y = Self::assign(config.axes.y.instrument, &instrument1, &instrument2, "y")?;

        Ok(Self {
            config,
            axis_x,
            axis_y,
            event_rx,
            status: SharedDeviceStatus::new(),
            history: Arc::new(Mutex::new(history)),
            bindings,
        })
    }

    fn assign(
        id: InstrumentId,
        instrument1: &Option<SharedInstrument>,
        instrument2: &Option<SharedInstrument>,
        axis_name: &str,
    ) -> DomainResult<Option<SharedInstrument>> {
        let selected = match id {
            InstrumentId::None => return Ok(None),
            InstrumentId::Instrument1 => instrument1,
            InstrumentId::Instrument2 => instrument2,
        };
        match selected {
            Some(handle) => Ok(Some(Arc::clone(handle))),
            None => Err(DomainError::Configuration(format!(
                "axes.{}.instrument refers to an instrument that is not connected",
                axis_name
            ))),
        }
    }

    /// 最新デバイス状態のハンドルを取得（表示層向け）
    pub fn status(&self) -> SharedDeviceStatus {
        self.status.clone()
    }

    /// 記憶位置バッファのハンドルを取得（表示・永続化向け）
    pub fn history(&self) -> Arc<Mutex<PositionHistory>> {
        Arc::clone(&self.history)
    }

    fn polled_axes(&self) -> Vec<PolledAxis> {
        let mut targets = Vec::new();
        if let Some(instrument) = &self.axis_x {
            targets.push(PolledAxis {
                axis: Axis::X,
                instrument: Arc::clone(instrument),
            });
        }
        if let Some(instrument) = &self.axis_y {
            targets.push(PolledAxis {
                axis: Axis::Y,
                instrument: Arc::clone(instrument),
            });
        }
        targets
    }

    fn health(&self) -> LinkHealth {
        LinkHealth::new(HealthPolicy {
            max_consecutive_failures: self.config.polling.max_consecutive_failures,
        })
    }

    /// セッションを起動する（ブロッキング）
    ///
    /// 入力イベントチャネルの送信側が全て閉じられるとシャットダウンに
    /// 入り、順序付きで全スレッドを停止してから戻る。
    pub fn run(self) -> DomainResult<()> {
        let shutdown = Arc::new(AtomicBool::new(false));

        let (cmd_tx_x, cmd_rx_x) = bounded::<AxisCommand>(1);
        let (cmd_tx_y, cmd_rx_y) = bounded::<AxisCommand>(1);

        // 軸コマンドスレッド（割り当て済みの軸のみ）
        let mut command_handles = Vec::new();
        for (axis, instrument, rx) in [
            (Axis::X, self.axis_x.clone(), cmd_rx_x.clone()),
            (Axis::Y, self.axis_y.clone(), cmd_rx_y.clone()),
        ] {
            if let Some(instrument) = instrument {
                let status = self.status.clone();
                let health = self.health();
                command_handles.push(std::thread::spawn(move || {
                    threads::command_thread(axis, instrument, rx, status, health);
                }));
            }
        }

        // ポーリングスレッド
        let poll_handle = {
            let targets = self.polled_axes();
            let status = self.status.clone();
            let interval = self.config.polling.interval();
            let health = self.health();
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                poller::poll_thread(targets, status, interval, health, shutdown);
            })
        };

        // 診断スレッド（ポーリングとは独立したタイマー）
        let diagnostics_handle = {
            let targets = self.polled_axes();
            let status = self.status.clone();
            let delay = self.config.polling.diagnostics_delay();
            let health = self.health();
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                poller::diagnostics_thread(targets, status, delay, health, shutdown);
            })
        };

        // 入力イベントハンドラ（このスレッドで実行）
        let engine = JogEngine::new(
            self.bindings,
            self.config.jog.clone(),
            self.config.axes.clone(),
            self.status.clone(),
            Arc::clone(&self.history),
        );
        // 送信側もスロットのReceiverを持ち、滞留コマンドを最新値で置き換える
        threads::input_thread(
            engine,
            self.event_rx,
            (cmd_tx_x, cmd_rx_x),
            (cmd_tx_y, cmd_rx_y),
            Arc::clone(&shutdown),
        );

        // 入力が尽きた: タイマーを止め、残りのスレッドを回収する
        tracing::info!("Shutting down jog session...");
        shutdown.store(true, Ordering::Relaxed);

        for handle in command_handles {
            let _ = handle.join();
        }
        let _ = poll_handle.join();
        let _ = diagnostics_handle.join();

        tracing::info!("Jog session terminated");
        Ok(())
    }
}
