/// 記憶位置の永続化
///
/// PositionHistoryの区切り文字列形式を設定ファイルと同じ場所に読み書きする。
/// 読み込み時のParseエラーは呼び出し側で「破棄して空から開始」に回復する。
use std::path::Path;

use crate::domain::{DomainError, DomainResult, PositionHistory};

/// 記憶位置ファイルを読み込む
///
/// ファイルが存在しない場合は空の履歴を返す（初回起動）。
/// 内容が壊れている場合はParseエラーを返し、部分的には読み込まない。
/// 読み取り自体のI/O失敗はParseではなくOther。呼び出し側が「破棄して
/// 空から開始」で回復してよいのは内容破損のみで、読めないだけの正常な
/// ファイルをシャットダウン時に上書きしてはならない。
pub fn load<P: AsRef<Path>>(path: P, capacity: usize) -> DomainResult<PositionHistory> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(PositionHistory::new(capacity));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| DomainError::Other(format!("Failed to read history file: {}", e)))?;

    PositionHistory::deserialize(content.trim_end(), capacity)
}

/// 記憶位置ファイルを書き出す
pub fn save<P: AsRef<Path>>(path: P, history: &PositionHistory) -> DomainResult<()> {
    std::fs::write(path, history.serialize())
        .map_err(|e| DomainError::Other(format!("Failed to write history file: {}", e)))
}
