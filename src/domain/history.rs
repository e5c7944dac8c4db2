//! 記憶位置バッファ
//!
//! 容量固定のFIFO履歴。容量超過時は最古のレコードを追い出す。
//! 永続化用の決定的な文字列形式（レコード間 ';'、フィールド間 ','）を持つ。

use std::collections::VecDeque;

use crate::domain::types::PositionRecord;
use crate::domain::{DomainError, DomainResult};

/// レコード区切り
const RECORD_SEPARATOR: char = ';';
/// フィールド区切り
const FIELD_SEPARATOR: char = ',';

/// 記憶位置のFIFOバッファ
#[derive(Debug, Clone, PartialEq)]
pub struct PositionHistory {
    records: VecDeque<PositionRecord>,
    capacity: usize,
}

impl PositionHistory {
    /// 指定容量の空バッファを作成
    ///
    /// `capacity`は1以上であること（設定検証済みの値を渡す）。
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// レコードを追加する
    ///
    /// 満杯の場合は最古のレコードを追い出す（strict FIFO）。
    pub fn push(&mut self, record: PositionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// バッファを空にする（容量は変わらない）
    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 最古→最新の順でレコードを返す
    #[allow(dead_code)]
    pub fn records(&self) -> impl Iterator<Item = &PositionRecord> {
        self.records.iter()
    }

    /// 決定的な区切り文字列へ変換する
    ///
    /// 例: `"1.5,2;-0.25,3.75"`。空バッファは空文字列。
    /// f64のDisplayは最短の往復可能表現を出すため、
    /// `deserialize(serialize(h)) == h` が成り立つ。
    pub fn serialize(&self) -> String {
        self.records
            .iter()
            .map(|r| format!("{}{}{}", r.x, FIELD_SEPARATOR, r.y))
            .collect::<Vec<_>>()
            .join(&RECORD_SEPARATOR.to_string())
    }

    /// serialize()の逆変換
    ///
    /// 不正な入力はParseエラーで全体を拒否する（部分的には読み込まない）。
    pub fn deserialize(input: &str, capacity: usize) -> DomainResult<Self> {
        let mut history = Self::new(capacity);
        if input.is_empty() {
            return Ok(history);
        }

        // 先に全レコードを検証してからバッファへ入れる
        let mut parsed = Vec::new();
        for (index, record) in input.split(RECORD_SEPARATOR).enumerate() {
            let mut fields = record.split(FIELD_SEPARATOR);
            let (x, y) = match (fields.next(), fields.next(), fields.next()) {
                (Some(x), Some(y), None) => (x, y),
                _ => {
                    return Err(DomainError::Parse(format!(
                        "position record {} must have exactly 2 fields",
                        index
                    )))
                }
            };
            let x: f64 = x.trim().parse().map_err(|e| {
                DomainError::Parse(format!("position record {}: invalid x: {}", index, e))
            })?;
            let y: f64 = y.trim().parse().map_err(|e| {
                DomainError::Parse(format!("position record {}: invalid y: {}", index, e))
            })?;
            parsed.push(PositionRecord::new(x, y));
        }

        for record in parsed {
            history.push(record);
        }
        Ok(history)
    }
}
