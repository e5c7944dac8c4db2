//! 通信ヘルス管理モジュール
//!
//! 計測器通信の連続失敗を数え、閾値超過で切断ステータスへ
//! エスカレーションさせる。即時リトライは行わず、リトライは常に
//! 次のスケジュール済みティックに委ねる。

/// ヘルス判定の閾値設定
#[derive(Debug, Clone, Copy)]
pub struct HealthPolicy {
    /// 連続失敗の許容回数（これを超えたら切断扱い）
    pub max_consecutive_failures: u32,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 5,
        }
    }
}

/// 計測器リンクの状態追跡
#[derive(Debug)]
pub struct LinkHealth {
    policy: HealthPolicy,
    consecutive_failures: u32,
    total_failures: u64,
    escalated: bool,
}

impl LinkHealth {
    pub fn new(policy: HealthPolicy) -> Self {
        Self {
            policy,
            consecutive_failures: 0,
            total_failures: 0,
            escalated: false,
        }
    }

    /// 成功を記録（連続失敗カウンターをリセット）
    ///
    /// 一度エスカレーションした後は回復扱いにしない
    /// （再接続は上位層の責務のため）。
    pub fn record_success(&mut self) {
        if !self.escalated {
            self.consecutive_failures = 0;
        }
    }

    /// 失敗を記録する
    ///
    /// # Returns
    /// この失敗で閾値を超え、切断へエスカレーションすべき場合に true。
    /// 2回目以降の失敗では false を返す（エスカレーションは一度だけ）。
    pub fn record_failure(&mut self) -> bool {
        self.total_failures += 1;
        if self.escalated {
            return false;
        }
        self.consecutive_failures += 1;
        if self.consecutive_failures > self.policy.max_consecutive_failures {
            self.escalated = true;
            return true;
        }
        false
    }

    #[allow(dead_code)]
    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    #[allow(dead_code)]
    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalates_after_threshold_exceeded() {
        let mut health = LinkHealth::new(HealthPolicy {
            max_consecutive_failures: 3,
        });

        assert!(!health.record_failure()); // 1
        assert!(!health.record_failure()); // 2
        assert!(!health.record_failure()); // 3 (まだ許容内)
        assert!(health.record_failure()); // 4 → エスカレーション
        assert!(health.is_escalated());
    }

    #[test]
    fn test_escalation_happens_only_once() {
        let mut health = LinkHealth::new(HealthPolicy {
            max_consecutive_failures: 1,
        });
        assert!(!health.record_failure());
        assert!(health.record_failure());
        assert!(!health.record_failure());
        assert_eq!(health.total_failures(), 3);
    }

    #[test]
    fn test_success_resets_consecutive_count() {
        let mut health = LinkHealth::new(HealthPolicy {
            max_consecutive_failures: 2,
        });
        health.record_failure();
        health.record_failure();
        health.record_success();
        assert_eq!(health.consecutive_failures(), 0);

        // リセット後はまた閾値まで許容される
        assert!(!health.record_failure());
        assert!(!health.record_failure());
        assert!(health.record_failure());
    }

    #[test]
    fn test_success_after_escalation_does_not_recover() {
        let mut health = LinkHealth::new(HealthPolicy {
            max_consecutive_failures: 1,
        });
        health.record_failure();
        health.record_failure();
        assert!(health.is_escalated());
        health.record_success();
        assert!(health.is_escalated());
    }
}
