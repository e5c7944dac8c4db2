//! 入力バインディングテーブル
//!
//! (button, event) の組から論理アクションへの変換。
//! 設定から一度だけ構築され、以降は不変。ロックなしで並行参照できる。

use std::collections::HashMap;

use crate::domain::config::BindingEntry;
use crate::domain::types::{LogicalAction, MouseButton, MouseEventKind};
use crate::domain::{DomainError, DomainResult};

/// 不変のバインディングテーブル
///
/// キー重複は構築時に拒否される（後勝ちの黙認はしない）。
#[derive(Debug, Clone)]
pub struct BindingTable {
    map: HashMap<(MouseButton, MouseEventKind), LogicalAction>,
}

impl BindingTable {
    /// エントリ列からテーブルを構築する
    ///
    /// 同じ (button, event) キーが2回現れた場合はConfigurationエラー。
    /// (none, none) はポインタ移動イベントのキーであり、バインドすると
    /// 全ポインタdeltaがアクションに化けてジョグ不能になるため拒否する。
    pub fn build(entries: &[BindingEntry]) -> DomainResult<Self> {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = (entry.button, entry.event);
            if key == (MouseButton::None, MouseEventKind::None) {
                return Err(DomainError::Configuration(
                    "bindings: (none, none) is reserved for pointer movement and cannot be bound"
                        .to_string(),
                ));
            }
            if map.insert(key, entry.action).is_some() {
                return Err(DomainError::Configuration(format!(
                    "bindings: duplicate entry for ({:?}, {:?})",
                    entry.button, entry.event
                )));
            }
        }
        Ok(Self { map })
    }

    /// 入力イベントを論理アクションに解決する
    ///
    /// 未バインドのキーは `LogicalAction::None`（無視）を返す。
    pub fn resolve(&self, button: MouseButton, kind: MouseEventKind) -> LogicalAction {
        self.map
            .get(&(button, kind))
            .copied()
            .unwrap_or(LogicalAction::None)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
