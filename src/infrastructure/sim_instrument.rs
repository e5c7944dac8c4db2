/// シミュレーション計測器アダプタ
///
/// テスト・開発用のInstrumentPort実装。
/// 相対移動を内部位置に積算するだけで、実際のハードウェア通信は行わない。
use crate::domain::{DomainError, DomainResult, InstrumentPort, InstrumentStatus};

/// シミュレーション計測器アダプタ
pub struct SimInstrumentAdapter {
    name: String,
    position: f64,
    /// 受信した移動コマンドの履歴（検証用）
    moves: Vec<f64>,
    /// 残り失敗回数（テストでの故障注入用）
    failures_remaining: u32,
}

impl SimInstrumentAdapter {
    /// 原点位置のシミュレーション計測器を作成
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_position(name, 0.0)
    }

    /// 初期位置を指定して作成
    pub fn with_position(name: impl Into<String>, position: f64) -> Self {
        Self {
            name: name.into(),
            position,
            moves: Vec::new(),
            failures_remaining: 0,
        }
    }

    /// 以降n回の呼び出しを通信エラーにする（故障注入）
    #[allow(dead_code)]
    pub fn inject_failures(&mut self, n: u32) {
        self.failures_remaining = n;
    }

    /// 受信した移動コマンドの履歴を取得
    #[allow(dead_code)]
    pub fn moves(&self) -> &[f64] {
        &self.moves
    }

    fn check_link(&mut self) -> DomainResult<()> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(DomainError::Instrument(format!(
                "{}: simulated communication failure",
                self.name
            )));
        }
        Ok(())
    }
}

impl InstrumentPort for SimInstrumentAdapter {
    fn get_position(&mut self) -> DomainResult<f64> {
        self.check_link()?;
        Ok(self.position)
    }

    fn get_status(&mut self) -> DomainResult<InstrumentStatus> {
        self.check_link()?;
        Ok(InstrumentStatus {
            is_moving: false,
            error: None,
        })
    }

    fn move_relative(&mut self, displacement: f64) -> DomainResult<()> {
        self.check_link()?;
        self.position += displacement;
        self.moves.push(displacement);

        #[cfg(debug_assertions)]
        tracing::debug!(
            "SimInstrument {}: moved by {} to {}",
            self.name,
            displacement,
            self.position
        );

        Ok(())
    }
}
