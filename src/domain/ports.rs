/// Port定義（Clean Architectureのインターフェース）
///
/// Domain層が外部実装に依存するための抽象trait。
/// Infrastructure層がこれらを実装し、Application層がDIで注入する。
use crate::domain::{DomainResult, InstrumentStatus};

/// 計測器ポート: 1軸分のモーションコントローラを抽象化
///
/// coreはトランスポート（VISA/シリアル/ベンダDLL等）を仮定しない。
/// 探索・列挙・再接続は上位層の責務であり、このtraitには含めない。
pub trait InstrumentPort: Send {
    /// 現在位置を取得する
    fn get_position(&mut self) -> DomainResult<f64>;

    /// ステータス（移動中フラグ・内部エラー）を取得する
    fn get_status(&mut self) -> DomainResult<InstrumentStatus>;

    /// 相対移動コマンドを送る
    ///
    /// 変位はクランプ済みの値が渡される。
    fn move_relative(&mut self, displacement: f64) -> DomainResult<()>;
}
