//! Infrastructure層: 外部技術の統合
//!
//! Domain層のtraitを実装し、外部リソース（計測器・入力・ファイル）と接続する。
//! ベンダ固有のコマンドインターフェースへの結線は上位アプリケーションの
//! 責務であり、ここにはシミュレーション実装と永続化のみを置く。

pub mod history_store;
pub mod scripted_input;
pub mod sim_instrument;
