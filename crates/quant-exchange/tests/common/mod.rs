//! Shared test support for backtest integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quant_core::types::floor_time;
use quant_core::{
    Candle, CandleCloseHandler, CoreResult, Interval, Order, OrderId, OrderInfo, OrderStatus,
    Pair, Portfolio,
};
use quant_data::{CandleStore, MemoryCandleStore};
use quant_exchange::{ExchangeError, ExchangeGateway, ExchangeResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const EXCHANGE: &str = "binance";

pub fn btc_usdt() -> Pair {
    Pair::new("BTC", "USDT")
}

/// Seed `count` one-minute candles starting at `start`.
///
/// The i-th candle closes at `base_price + i` so fills are traceable to
/// the minute that produced them.
pub async fn seed_minute_candles(
    store: &MemoryCandleStore,
    pair: &Pair,
    start: DateTime<Utc>,
    count: i64,
    base_price: Decimal,
) {
    let step = Interval::M1.duration();
    for i in 0..count {
        let open_time = start + step * (i as i32);
        let close = base_price + Decimal::from(i);
        let candle = Candle {
            pair: pair.clone(),
            interval: Interval::M1,
            open_time,
            close_time: open_time + step,
            open: close,
            high: close + dec!(1),
            low: close - dec!(1),
            close,
            volume: dec!(10),
            quote_volume: close * dec!(10),
            trade_count: 5,
            taker_buy_base_volume: dec!(5),
            taker_buy_quote_volume: close * dec!(5),
        };
        store.add_candle(EXCHANGE, &candle).await.unwrap();
    }
}

/// Gateway that answers data queries from a local candle store only.
///
/// Order operations are not available; the simulator under test owns them.
pub struct StoreGateway {
    pub store: Arc<MemoryCandleStore>,
}

impl StoreGateway {
    pub fn new(store: Arc<MemoryCandleStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ExchangeGateway for StoreGateway {
    fn name(&self) -> &str {
        EXCHANGE
    }

    async fn get_historical_klines(
        &self,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Candle>> {
        Ok(self
            .store
            .find_candles(EXCHANGE, pair, interval, period_start, period_end)
            .await?)
    }

    async fn get_last_complete_candle_before(
        &self,
        pair: &Pair,
        interval: Interval,
        at: DateTime<Utc>,
    ) -> ExchangeResult<Candle> {
        let step = interval.duration();
        let begin = floor_time(at, step) - step;

        self.store
            .find_candles(EXCHANGE, pair, interval, begin, at)
            .await?
            .into_iter()
            .find(|candle| candle.open_time == begin)
            .ok_or_else(|| {
                ExchangeError::CandleNotFound(format!("{} {} before {}", pair, interval, at))
            })
    }

    async fn get_time(&self) -> ExchangeResult<DateTime<Utc>> {
        Err(ExchangeError::NotSupported("store gateway has no clock".into()))
    }

    async fn get_portfolio(&self) -> ExchangeResult<Portfolio> {
        Ok(Portfolio::new())
    }

    async fn get_asset_balance(&self, _asset: &str) -> ExchangeResult<Decimal> {
        Ok(Decimal::ZERO)
    }

    async fn place_order(&self, _order: &Order) -> ExchangeResult<OrderId> {
        Err(ExchangeError::NotSupported("store gateway cannot trade".into()))
    }

    async fn check_order(&self, order_id: &OrderId) -> ExchangeResult<OrderStatus> {
        Err(ExchangeError::OrderNotFound(order_id.to_string()))
    }

    async fn cancel_order(&self, _order_id: &OrderId) -> ExchangeResult<()> {
        Ok(())
    }

    async fn get_all_orders(&self, _pair: &Pair) -> ExchangeResult<Vec<OrderInfo>> {
        Ok(Vec::new())
    }

    async fn get_all_open_orders(&self, _pair: &Pair) -> ExchangeResult<Vec<OrderInfo>> {
        Ok(Vec::new())
    }
}

/// Handler that counts how many times its channel fired.
pub struct CountingHandler {
    hits: AtomicUsize,
}

impl CountingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            hits: AtomicUsize::new(0),
        })
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CandleCloseHandler for CountingHandler {
    async fn on_candle_close(
        &self,
        _interval: Interval,
        _close_time: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
