//! Domain層: ビジネスロジックの中心
//!
//! 外部依存を持たない純粋なRust型とtrait定義。
//! Applicationから注入され、Infrastructureで実装される。

pub mod bindings;
pub mod config;
pub mod displacement;
pub mod error;
pub mod history;
pub mod ports;
pub mod tracking;
pub mod types;

pub use bindings::*;
pub use config::*;
pub use error::*;
pub use history::*;
pub use ports::*;
pub use tracking::*;
pub use types::*;
