//! 메모리 캔들 저장소.
//!
//! 테스트와 시뮬레이션에서 사용하는 경량 저장소입니다.

use crate::error::Result;
use crate::gap::{missing_periods, Period};
use crate::storage::CandleStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quant_core::{Candle, Interval, Pair};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

type SeriesKey = (String, Pair, Interval);
type Series = BTreeMap<DateTime<Utc>, Candle>;

/// 메모리 기반 캔들 저장소.
#[derive(Default)]
pub struct MemoryCandleStore {
    series: RwLock<HashMap<SeriesKey, Series>>,
}

impl MemoryCandleStore {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(exchange: &str, pair: &Pair, interval: Interval) -> SeriesKey {
        (exchange.to_string(), pair.clone(), interval)
    }

    /// 저장된 전체 캔들 수를 반환합니다.
    pub async fn len(&self) -> usize {
        self.series.read().await.values().map(|s| s.len()).sum()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CandleStore for MemoryCandleStore {
    async fn add_candle(&self, exchange: &str, candle: &Candle) -> Result<()> {
        self.add_candles(exchange, std::slice::from_ref(candle))
            .await?;
        Ok(())
    }

    async fn add_candles(&self, exchange: &str, candles: &[Candle]) -> Result<usize> {
        let mut series = self.series.write().await;
        let mut inserted = 0;

        for candle in candles {
            let key = Self::key(exchange, &candle.pair, candle.interval);
            let slots = series.entry(key).or_default();
            if slots.contains_key(&candle.open_time) {
                debug!(exchange, pair = %candle.pair, open_time = %candle.open_time, "중복 캔들 무시");
            } else {
                slots.insert(candle.open_time, candle.clone());
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    async fn find_candles(
        &self,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        if period_start > period_end {
            return Ok(Vec::new());
        }

        let series = self.series.read().await;
        let Some(slots) = series.get(&Self::key(exchange, pair, interval)) else {
            return Ok(Vec::new());
        };

        Ok(slots
            .range(period_start..=period_end)
            .filter(|(_, candle)| candle.close_time <= period_end)
            .map(|(_, candle)| candle.clone())
            .collect())
    }

    async fn find_missing_periods(
        &self,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Period>> {
        let series = self.series.read().await;
        let opens: Vec<DateTime<Utc>> = series
            .get(&Self::key(exchange, pair, interval))
            .map(|slots| slots.keys().copied().collect())
            .unwrap_or_default();

        Ok(missing_periods(&opens, interval, period_start, period_end))
    }
}
