/// エラー型定義
///
/// Domain層の統一エラー型。thiserrorを使用して型安全なエラー処理を提供します。
///
/// # 設計方針
/// - unwrap()の使用を禁止し、明示的なエラーハンドリングを強制
/// - Result型でエラー伝播を明示化
/// - 回復可能性をエラー型で表現（Instrument vs Disconnected）
use thiserror::Error;

/// Domain層の統一エラー型
#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum DomainError {
    /// 設定関連のエラー（読み込み失敗・値域違反・キー重複）
    ///
    /// 起動時に致命的。部分適用は行わず、設定全体を拒否する。
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 永続化された記憶位置のパース失敗
    ///
    /// 回復可能。読み込み側は破棄して空の履歴から開始する。
    #[error("Parse error: {0}")]
    Parse(String),

    /// 計測器との通信・ハードウェア異常
    ///
    /// 一過性のエラー。次のポーリングティックで再試行される。
    #[error("Instrument error: {0}")]
    Instrument(String),

    /// 連続失敗が閾値を超えた（Non-recoverable）
    ///
    /// coreは再接続を行わない。上位層へ通知して終了を待つ。
    #[error("Instrument disconnected after repeated failures")]
    Disconnected,

    /// その他のエラー（永続化の書き込み失敗など）
    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Domain層の統一Result型
pub type DomainResult<T> = Result<T, DomainError>;
