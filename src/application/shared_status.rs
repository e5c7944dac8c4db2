//! デバイス状態の共有スナップショット（Application層）
//!
//! ポーリングスレッドだけが書き込み、他スレッドは読み取りのみの
//! 単一ライター・複数リーダー構成。値全体を差し替えるため、
//! リーダーが途中状態を観測することはない。

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::domain::DeviceStatus;

/// スレッド間で共有する最新デバイス状態
///
/// 位置スナップショットはMutex下で丸ごと差し替える。
/// 切断フラグは`Arc<AtomicBool>`のロックフリー読み取り
/// （少し古い値が見えても無害なためRelaxedで足りる）。
#[derive(Clone)]
pub struct SharedDeviceStatus {
    snapshot: Arc<Mutex<DeviceStatus>>,
    disconnected: Arc<AtomicBool>,
}

impl SharedDeviceStatus {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(DeviceStatus::initial())),
            disconnected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 新しいスナップショットを公開する（ポーリングスレッド専用）
    pub fn publish(&self, status: DeviceStatus) {
        let mut guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        *guard = status;
    }

    /// 最新スナップショットのコピーを取得する
    pub fn snapshot(&self) -> DeviceStatus {
        let guard = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        *guard
    }

    /// 切断ステータスを立てる（以降クリアしない。coreは再接続しない）
    pub fn mark_disconnected(&self) {
        self.disconnected.store(true, Ordering::Relaxed);
    }

    /// 切断ステータスの確認（ロックフリー）
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Relaxed)
    }
}

impl Default for SharedDeviceStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_publish_replaces_whole_snapshot() {
        let shared = SharedDeviceStatus::new();
        shared.publish(DeviceStatus {
            x: 1.0,
            y: 2.0,
            is_moving: true,
            polled_at: Instant::now(),
        });

        let snap = shared.snapshot();
        assert_eq!(snap.x, 1.0);
        assert_eq!(snap.y, 2.0);
        assert!(snap.is_moving);
    }

    #[test]
    fn test_disconnected_flag() {
        let shared = SharedDeviceStatus::new();
        assert!(!shared.is_disconnected());

        let reader = shared.clone();
        shared.mark_disconnected();
        assert!(reader.is_disconnected());
    }
}
