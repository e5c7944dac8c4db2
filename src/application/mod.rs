//! Application Layer
//!
//! ジョグセッションの制御・スレッド配線・ヘルス管理などのユースケースを実装します。
//!
//! ## モジュール構成
//! - `engine`: 入力イベント→軸コマンドの同期変換コア
//! - `runner`: 入力/コマンド/ポーリング/診断スレッドの配線とライフサイクル
//! - `threads`: 各スレッドのメインループ実装
//! - `poller`: ポーリング・診断の周期タスク
//! - `shared_status`: 最新デバイス状態のスナップショット共有
//! - `health`: 連続失敗カウントと切断エスカレーション

pub mod engine;
pub mod health;
pub mod poller;
pub mod runner;
pub mod shared_status;
pub(crate) mod threads;
