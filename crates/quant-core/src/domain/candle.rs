//! 캔들 데이터 모델.

use crate::types::{Interval, Pair};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 한 간격 동안의 OHLCV 요약.
///
/// (거래소, 거래쌍, 간격, open_time) 조합이 저장소 내에서 유일합니다.
/// 저장 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 거래쌍
    pub pair: Pair,
    /// 캔들 간격
    pub interval: Interval,
    /// 시작 시각 (UTC)
    pub open_time: DateTime<Utc>,
    /// 마감 시각 (UTC)
    pub close_time: DateTime<Utc>,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 기준 자산 거래량
    pub volume: Decimal,
    /// 호가 통화 거래량
    pub quote_volume: Decimal,
    /// 체결 건수
    pub trade_count: i64,
    /// 테이커 매수 기준 자산 거래량
    pub taker_buy_base_volume: Decimal,
    /// 테이커 매수 호가 통화 거래량
    pub taker_buy_quote_volume: Decimal,
}

impl fmt::Display for Candle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {} -> {}",
            self.pair, self.interval, self.open_time, self.open, self.close
        )
    }
}
