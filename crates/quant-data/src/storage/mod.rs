//! 캔들 저장소.

mod memory;
mod postgres;

pub use memory::MemoryCandleStore;
pub use postgres::PostgresCandleStore;

use crate::error::Result;
use crate::gap::Period;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quant_core::{Candle, Interval, Pair};

/// 캔들 저장소 인터페이스.
///
/// 캔들은 (거래소, 거래쌍, 간격, open_time) 조합으로 유일하며,
/// 저장 이후 변경되거나 삭제되지 않습니다.
#[async_trait]
pub trait CandleStore: Send + Sync {
    /// 캔들 하나를 저장합니다.
    ///
    /// 이미 같은 키의 캔들이 있으면 저장 시도는 조용히 무시됩니다.
    /// 겹치는 요청에서 발생하는 중복 저장은 오류가 아닙니다.
    async fn add_candle(&self, exchange: &str, candle: &Candle) -> Result<()>;

    /// 여러 캔들을 저장하고 새로 저장된 개수를 반환합니다.
    async fn add_candles(&self, exchange: &str, candles: &[Candle]) -> Result<usize>;

    /// 구간에 완전히 포함된 캔들을 open_time 오름차순으로 반환합니다.
    ///
    /// `open_time >= period_start && close_time <= period_end`인 캔들이
    /// 대상입니다.
    async fn find_candles(
        &self,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Candle>>;

    /// 구간 내에서 캔들이 저장되지 않은 누락 구간을 반환합니다.
    ///
    /// 경계 정규화와 병합 규칙은 [`crate::gap::missing_periods`]를
    /// 따릅니다.
    async fn find_missing_periods(
        &self,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Period>>;
}
