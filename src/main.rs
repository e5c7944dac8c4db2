mod application;
mod domain;
mod infrastructure;
mod logging;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;

use crate::application::runner::JogRunner;
use crate::domain::config::AppConfig;
use crate::domain::{DomainError, InputEvent, MouseButton, MouseEventKind, PositionHistory};
use crate::infrastructure::history_store;
use crate::infrastructure::scripted_input::ScriptedInputSource;
use crate::infrastructure::sim_instrument::SimInstrumentAdapter;
use crate::logging::init_logging;

fn main() {
    // ログシステムの初期化（非同期ファイル出力）
    let log_dir = PathBuf::from("logs");
    let _guard = init_logging("info", false, Some(log_dir));
    // 注意: _guardはmain終了まで保持する必要がある（Dropでログスレッドが終了）

    tracing::info!("stagejog starting...");

    match run() {
        Ok(_) => {
            tracing::info!("stagejog terminated gracefully.");
        }
        Err(e) => {
            tracing::error!("Fatal error: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// アプリケーションのメイン処理
fn run() -> anyhow::Result<()> {
    // 設定ファイルの読み込み（存在しない場合はデフォルト設定を使用）
    let config = match AppConfig::from_file("config.toml") {
        Ok(config) => {
            tracing::info!("Loaded configuration from config.toml");
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config.toml: {:?}, using defaults", e);
            AppConfig::default()
        }
    };

    // 設定の検証（違反は致命的。部分適用はしない）
    config.validate().context("invalid configuration")?;

    tracing::info!("Configuration validated successfully");
    tracing::info!(
        "Polling: interval={}ms, diagnostics_delay={}ms",
        config.polling.interval_ms,
        config.polling.diagnostics_delay_ms
    );
    tracing::info!(
        "Jog: step={}, started_sensibility={}, buffer_depth={}",
        config.jog.incremental_step,
        config.jog.started_sensibility,
        config.memory.buffer_depth
    );

    // 記憶位置履歴の読み込み（壊れていたら破棄して空から開始）
    let history = match history_store::load(&config.memory.history_file, config.memory.buffer_depth)
    {
        Ok(history) => {
            tracing::info!(
                "Loaded {} memorized positions from {}",
                history.len(),
                config.memory.history_file
            );
            history
        }
        Err(DomainError::Parse(e)) => {
            tracing::warn!("History file corrupted ({}), starting with empty history", e);
            PositionHistory::new(config.memory.buffer_depth)
        }
        Err(e) => return Err(e.into()),
    };

    // シミュレーション計測器の初期化（実機のコマンドインターフェース結線は
    // 上位アプリケーションが行う）
    tracing::info!("Initializing simulated instruments...");
    let instrument1 = Arc::new(Mutex::new(SimInstrumentAdapter::new("instrument1")));
    let instrument2 = Arc::new(Mutex::new(SimInstrumentAdapter::new("instrument2")));

    // 入力イベントチャネル
    let (event_tx, event_rx) = crossbeam_channel::unbounded::<InputEvent>();

    // デモ用スクリプト入力: トラッキング開始 → ジョグ → 感度変更 →
    // 位置記憶 → トラッキング終了
    let script = vec![
        InputEvent::button(MouseButton::Left, MouseEventKind::Click),
        InputEvent::pointer_delta(1.0),
        InputEvent::pointer_delta(2.5),
        InputEvent::button(MouseButton::None, MouseEventKind::WheelUp),
        InputEvent::pointer_delta(-1.5),
        InputEvent::button(MouseButton::Middle, MouseEventKind::Click),
        InputEvent::button(MouseButton::Right, MouseEventKind::Click),
        InputEvent::pointer_delta(5.0), // Idle中: 無視される
    ];
    let feeder = ScriptedInputSource::new(script, Duration::from_millis(20)).spawn(event_tx);

    let history_file = config.memory.history_file.clone();
    let runner = JogRunner::new(
        config,
        Some(instrument1),
        Some(instrument2),
        event_rx,
        history,
    )?;
    let status = runner.status();
    let history_handle = runner.history();

    tracing::info!("Starting jog session...");
    runner.run()?;
    let _ = feeder.join();

    if status.is_disconnected() {
        tracing::error!("Session ended with instruments disconnected");
    }

    // 記憶位置の永続化（シャットダウン時に一括書き出し）
    {
        let history = history_handle.lock().unwrap_or_else(|e| e.into_inner());
        history_store::save(&history_file, &history)?;
        tracing::info!(
            "Saved {} memorized positions to {}",
            history.len(),
            history_file
        );
    }

    Ok(())
}
