/// スクリプト入力ソース
///
/// あらかじめ用意したイベント列を一定間隔で入力チャネルへ流す。
/// GUIのない環境（デモ実行・統合テスト）でマウス入力の代役を務める。
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::domain::InputEvent;

/// スクリプト入力ソース
pub struct ScriptedInputSource {
    events: Vec<InputEvent>,
    pace: Duration,
}

impl ScriptedInputSource {
    /// イベント列と送出間隔を指定して作成
    pub fn new(events: Vec<InputEvent>, pace: Duration) -> Self {
        Self { events, pace }
    }

    /// 専用スレッドでイベントを送出する
    ///
    /// 全イベント送出後にSenderをdropし、受信側のシャットダウンを誘発する。
    pub fn spawn(self, tx: Sender<InputEvent>) -> JoinHandle<()> {
        std::thread::spawn(move || {
            tracing::info!("Scripted input: feeding {} events", self.events.len());
            for event in self.events {
                if tx.send(event).is_err() {
                    // 受信側が先に終了した
                    break;
                }
                std::thread::sleep(self.pace);
            }
            tracing::info!("Scripted input: done");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MouseButton, MouseEventKind};
    use crossbeam_channel::unbounded;

    #[test]
    fn test_all_events_delivered_then_channel_closes() {
        let events = vec![
            InputEvent::button(MouseButton::Left, MouseEventKind::Click),
            InputEvent::pointer_delta(1.0),
        ];
        let (tx, rx) = unbounded();
        let handle = ScriptedInputSource::new(events.clone(), Duration::ZERO).spawn(tx);

        let received: Vec<_> = rx.iter().collect();
        handle.join().unwrap();
        assert_eq!(received, events);
    }
}
