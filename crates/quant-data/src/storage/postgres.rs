//! PostgreSQL 캔들 저장소.
//!
//! 스키마가 없으면 생성하고, UNNEST 패턴으로 일괄 삽입합니다.
//! 중복 키는 `ON CONFLICT DO NOTHING`으로 무시되어 기존 행이 유지됩니다.

use crate::error::{DataError, Result};
use crate::gap::{missing_periods, Period};
use crate::storage::CandleStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quant_core::{Candle, Interval, Pair};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, instrument};

/// 캔들 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
struct CandleRow {
    asset: String,
    currency: String,
    interval: String,
    open_time: DateTime<Utc>,
    close_time: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
    quote_volume: Decimal,
    trade_count: i64,
    taker_buy_base_volume: Decimal,
    taker_buy_quote_volume: Decimal,
}

impl CandleRow {
    fn into_candle(self) -> Result<Candle> {
        let interval = Interval::from_code(&self.interval)
            .ok_or_else(|| DataError::InvalidData(format!("Unknown interval: {}", self.interval)))?;

        Ok(Candle {
            pair: Pair::new(self.asset, self.currency),
            interval,
            open_time: self.open_time,
            close_time: self.close_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            quote_volume: self.quote_volume,
            trade_count: self.trade_count,
            taker_buy_base_volume: self.taker_buy_base_volume,
            taker_buy_quote_volume: self.taker_buy_quote_volume,
        })
    }
}

/// PostgreSQL 기반 캔들 저장소.
#[derive(Clone)]
pub struct PostgresCandleStore {
    pool: PgPool,
}

impl PostgresCandleStore {
    /// 기존 연결 풀로 저장소를 생성합니다.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// URL로 연결 풀을 만들어 저장소를 생성합니다.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// 캔들 테이블이 없으면 생성합니다.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candle (
                exchange                TEXT        NOT NULL,
                asset                   TEXT        NOT NULL,
                currency                TEXT        NOT NULL,
                interval                TEXT        NOT NULL,
                open_time               TIMESTAMPTZ NOT NULL,
                close_time              TIMESTAMPTZ NOT NULL,
                open                    NUMERIC     NOT NULL,
                high                    NUMERIC     NOT NULL,
                low                     NUMERIC     NOT NULL,
                close                   NUMERIC     NOT NULL,
                volume                  NUMERIC     NOT NULL,
                quote_volume            NUMERIC     NOT NULL,
                trade_count             BIGINT      NOT NULL,
                taker_buy_base_volume   NUMERIC     NOT NULL,
                taker_buy_quote_volume  NUMERIC     NOT NULL,
                PRIMARY KEY (exchange, asset, currency, interval, open_time)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        info!("캔들 스키마 준비 완료");
        Ok(())
    }
}

#[async_trait]
impl CandleStore for PostgresCandleStore {
    async fn add_candle(&self, exchange: &str, candle: &Candle) -> Result<()> {
        self.add_candles(exchange, std::slice::from_ref(candle))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, candles), fields(count = candles.len()))]
    async fn add_candles(&self, exchange: &str, candles: &[Candle]) -> Result<usize> {
        if candles.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0;

        // UNNEST 패턴으로 일괄 삽입
        for chunk in candles.chunks(500) {
            let exchanges: Vec<&str> = chunk.iter().map(|_| exchange).collect();
            let assets: Vec<&str> = chunk.iter().map(|c| c.pair.asset.as_str()).collect();
            let currencies: Vec<&str> = chunk.iter().map(|c| c.pair.currency.as_str()).collect();
            let intervals: Vec<&str> = chunk.iter().map(|c| c.interval.code()).collect();
            let open_times: Vec<DateTime<Utc>> = chunk.iter().map(|c| c.open_time).collect();
            let close_times: Vec<DateTime<Utc>> = chunk.iter().map(|c| c.close_time).collect();
            let opens: Vec<Decimal> = chunk.iter().map(|c| c.open).collect();
            let highs: Vec<Decimal> = chunk.iter().map(|c| c.high).collect();
            let lows: Vec<Decimal> = chunk.iter().map(|c| c.low).collect();
            let closes: Vec<Decimal> = chunk.iter().map(|c| c.close).collect();
            let volumes: Vec<Decimal> = chunk.iter().map(|c| c.volume).collect();
            let quote_volumes: Vec<Decimal> = chunk.iter().map(|c| c.quote_volume).collect();
            let trade_counts: Vec<i64> = chunk.iter().map(|c| c.trade_count).collect();
            let taker_base: Vec<Decimal> = chunk.iter().map(|c| c.taker_buy_base_volume).collect();
            let taker_quote: Vec<Decimal> =
                chunk.iter().map(|c| c.taker_buy_quote_volume).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO candle
                    (exchange, asset, currency, interval, open_time, close_time,
                     open, high, low, close, volume, quote_volume, trade_count,
                     taker_buy_base_volume, taker_buy_quote_volume)
                SELECT * FROM UNNEST(
                    $1::text[], $2::text[], $3::text[], $4::text[],
                    $5::timestamptz[], $6::timestamptz[],
                    $7::numeric[], $8::numeric[], $9::numeric[], $10::numeric[],
                    $11::numeric[], $12::numeric[], $13::bigint[],
                    $14::numeric[], $15::numeric[]
                )
                ON CONFLICT (exchange, asset, currency, interval, open_time) DO NOTHING
                "#,
            )
            .bind(&exchanges)
            .bind(&assets)
            .bind(&currencies)
            .bind(&intervals)
            .bind(&open_times)
            .bind(&close_times)
            .bind(&opens)
            .bind(&highs)
            .bind(&lows)
            .bind(&closes)
            .bind(&volumes)
            .bind(&quote_volumes)
            .bind(&trade_counts)
            .bind(&taker_base)
            .bind(&taker_quote)
            .execute(&self.pool)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            inserted += result.rows_affected() as usize;
        }

        debug!(exchange, inserted, total = candles.len(), "캔들 저장");
        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn find_candles(
        &self,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        let rows: Vec<CandleRow> = sqlx::query_as(
            r#"
            SELECT asset, currency, interval, open_time, close_time,
                   open, high, low, close, volume, quote_volume, trade_count,
                   taker_buy_base_volume, taker_buy_quote_volume
            FROM candle
            WHERE exchange = $1 AND asset = $2 AND currency = $3 AND interval = $4
              AND open_time >= $5 AND close_time <= $6
            ORDER BY open_time ASC
            "#,
        )
        .bind(exchange)
        .bind(&pair.asset)
        .bind(&pair.currency)
        .bind(interval.code())
        .bind(period_start)
        .bind(period_end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        rows.into_iter().map(CandleRow::into_candle).collect()
    }

    #[instrument(skip(self))]
    async fn find_missing_periods(
        &self,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Vec<Period>> {
        let opens: Vec<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT open_time
            FROM candle
            WHERE exchange = $1 AND asset = $2 AND currency = $3 AND interval = $4
              AND open_time >= $5 AND open_time <= $6
            ORDER BY open_time ASC
            "#,
        )
        .bind(exchange)
        .bind(&pair.asset)
        .bind(&pair.currency)
        .bind(interval.code())
        .bind(period_start)
        .bind(period_end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        let opens: Vec<DateTime<Utc>> = opens.into_iter().map(|(t,)| t).collect();
        Ok(missing_periods(&opens, interval, period_start, period_end))
    }
}
