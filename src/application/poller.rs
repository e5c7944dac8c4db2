//! ポーリング・診断ループ（Application層）
//!
//! 計測器に対する2つの独立した周期タスク:
//! - ポーリング: 位置・移動中フラグを取得してDeviceStatusを公開
//! - 診断: ステータス照会でリンクの健全性を確認
//!
//! タイミングはループ駆動であり、応答の遅延や失敗が後続ティックを
//! 停滞させることはない。失敗時の再試行は次のティックに委ねる
//! （interval_msをレート上限として尊重するため、即時リトライはしない）。
//!
//! DeviceStatusへの書き込みはポーリングスレッドのみ（単一ライター）。
//! 診断スレッドは切断フラグとログにしか触れない。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::application::health::LinkHealth;
use crate::application::shared_status::SharedDeviceStatus;
use crate::domain::{Axis, DeviceStatus, InstrumentPort};

/// 軸に割り当てられた計測器のハンドル
pub type SharedInstrument = Arc<Mutex<dyn InstrumentPort>>;

/// ループ駆動の次ティック時刻を計算する
///
/// 遅延が1周期を超えて蓄積した場合は現在時刻へ再同期する
/// （溜まったティックを連射しない）。
fn advance_tick(next_tick: Instant, interval: Duration) -> Instant {
    let advanced = next_tick + interval;
    let now = Instant::now();
    if advanced + interval < now {
        now + interval
    } else {
        advanced
    }
}

/// shutdownが立つまで、次のティックまでスリープを刻む
///
/// # Returns
/// shutdown要求で中断した場合は false
fn sleep_until(next_tick: Instant, shutdown: &AtomicBool) -> bool {
    while Instant::now() < next_tick {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let remaining = next_tick.saturating_duration_since(Instant::now());
        std::thread::sleep(remaining.min(Duration::from_millis(20)));
    }
    !shutdown.load(Ordering::Relaxed)
}

/// 1軸分のポーリング対象
pub(crate) struct PolledAxis {
    pub axis: Axis,
    pub instrument: SharedInstrument,
}

/// ポーリングスレッドのメインループ
///
/// 各ティックで割り当て済み計測器の位置とステータスを読み、
/// 成功時のみDeviceStatusを丸ごと差し替えて公開する。
pub(crate) fn poll_thread(
    targets: Vec<PolledAxis>,
    status: SharedDeviceStatus,
    interval: Duration,
    mut health: LinkHealth,
    shutdown: Arc<AtomicBool>,
) {
    tracing::info!(
        "Poll thread started: interval={:?}, axes={}",
        interval,
        targets.len()
    );

    let mut last = DeviceStatus::initial();
    let mut next_tick = Instant::now();

    while sleep_until(next_tick, &shutdown) {
        next_tick = advance_tick(next_tick, interval);

        match poll_once(&targets, &last) {
            Ok(fresh) => {
                health.record_success();
                last = fresh;
                status.publish(fresh);
            }
            Err(e) => {
                // 即時リトライはしない。次のティックで再試行する
                tracing::warn!("Poll tick failed: {}", e);
                if health.record_failure() {
                    tracing::error!(
                        "Instrument link lost after {} consecutive poll failures",
                        health.consecutive_failures()
                    );
                    status.mark_disconnected();
                }
            }
        }
    }

    tracing::info!("Poll thread stopped");
}

/// 1ティック分のポーリング
///
/// 計測器呼び出し中はロックを個別に取り、スナップショット公開まで
/// ロックをまたいで保持しない。
fn poll_once(
    targets: &[PolledAxis],
    last: &DeviceStatus,
) -> Result<DeviceStatus, crate::domain::DomainError> {
    let mut fresh = DeviceStatus {
        polled_at: Instant::now(),
        is_moving: false,
        ..*last
    };

    for target in targets {
        let (position, moving) = {
            let mut guard = target.instrument.lock().unwrap_or_else(|e| e.into_inner());
            let position = guard.get_position()?;
            let moving = guard.get_status()?.is_moving;
            (position, moving)
        };
        match target.axis {
            Axis::X => fresh.x = position,
            Axis::Y => fresh.y = position,
        }
        fresh.is_moving |= moving;
    }

    Ok(fresh)
}

/// 診断スレッドのメインループ
///
/// ポーリングとは独立したタイマーで動き、計測器が報告する内部エラーを
/// 監視する。DeviceStatusには書き込まない。
pub(crate) fn diagnostics_thread(
    targets: Vec<PolledAxis>,
    status: SharedDeviceStatus,
    delay: Duration,
    mut health: LinkHealth,
    shutdown: Arc<AtomicBool>,
) {
    tracing::info!("Diagnostics thread started: delay={:?}", delay);

    let mut next_tick = Instant::now() + delay;

    while sleep_until(next_tick, &shutdown) {
        next_tick = advance_tick(next_tick, delay);

        let mut tick_ok = true;
        for target in &targets {
            let result = {
                let mut guard = target.instrument.lock().unwrap_or_else(|e| e.into_inner());
                guard.get_status()
            };
            match result {
                Ok(s) => {
                    if let Some(error) = s.error {
                        tracing::warn!(
                            "Instrument on axis {} reports error: {}",
                            target.axis.as_str(),
                            error
                        );
                    }
                }
                Err(e) => {
                    tick_ok = false;
                    #[cfg(debug_assertions)]
                    tracing::debug!(
                        "Diagnostics query failed on axis {}: {}",
                        target.axis.as_str(),
                        e
                    );
                    #[cfg(not(debug_assertions))]
                    let _ = e;
                }
            }
        }

        if tick_ok {
            health.record_success();
        } else if health.record_failure() {
            tracing::error!("Diagnostics: instrument link considered lost");
            status.mark_disconnected();
        }
    }

    tracing::info!("Diagnostics thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::health::HealthPolicy;
    use crate::domain::{DomainError, DomainResult, InstrumentStatus};

    struct FixedInstrument {
        position: f64,
        fail: bool,
    }

    impl InstrumentPort for FixedInstrument {
        fn get_position(&mut self) -> DomainResult<f64> {
            if self.fail {
                Err(DomainError::Instrument("link down".to_string()))
            } else {
                Ok(self.position)
            }
        }

        fn get_status(&mut self) -> DomainResult<InstrumentStatus> {
            if self.fail {
                Err(DomainError::Instrument("link down".to_string()))
            } else {
                Ok(InstrumentStatus {
                    is_moving: false,
                    error: None,
                })
            }
        }

        fn move_relative(&mut self, _displacement: f64) -> DomainResult<()> {
            Ok(())
        }
    }

    fn target(axis: Axis, position: f64, fail: bool) -> PolledAxis {
        PolledAxis {
            axis,
            instrument: Arc::new(Mutex::new(FixedInstrument { position, fail })),
        }
    }

    #[test]
    fn test_poll_once_reads_both_axes() {
        let targets = vec![target(Axis::X, 1.5, false), target(Axis::Y, -2.5, false)];
        let fresh = poll_once(&targets, &DeviceStatus::initial()).unwrap();
        assert_eq!(fresh.x, 1.5);
        assert_eq!(fresh.y, -2.5);
    }

    #[test]
    fn test_poll_once_propagates_instrument_error() {
        let targets = vec![target(Axis::X, 0.0, true)];
        assert!(poll_once(&targets, &DeviceStatus::initial()).is_err());
    }

    #[test]
    fn test_poll_thread_escalates_to_disconnected() {
        let targets = vec![target(Axis::X, 0.0, true)];
        let status = SharedDeviceStatus::new();
        let shutdown = Arc::new(AtomicBool::new(false));
        let health = LinkHealth::new(HealthPolicy {
            max_consecutive_failures: 2,
        });

        let handle = {
            let status = status.clone();
            let shutdown = Arc::clone(&shutdown);
            std::thread::spawn(move || {
                poll_thread(targets, status, Duration::from_millis(1), health, shutdown)
            })
        };

        // 3失敗（閾値2超過）に十分な時間を与える
        let deadline = Instant::now() + Duration::from_secs(2);
        while !status.is_disconnected() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        shutdown.store(true, Ordering::Relaxed);
        handle.join().unwrap();

        assert!(status.is_disconnected());
    }

    #[test]
    fn test_advance_tick_resyncs_after_long_stall() {
        let interval = Duration::from_millis(10);
        let stale = Instant::now() - Duration::from_secs(1);
        let next = advance_tick(stale, interval);
        assert!(next > Instant::now());
    }
}
