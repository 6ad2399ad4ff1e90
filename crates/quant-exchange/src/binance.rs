//! Binance 게이트웨이.
//!
//! REST 커넥터와 캐시 우선 조회를 묶어 [`ExchangeGateway`] 계약을
//! 구현합니다. 과거 데이터는 항상 저장소를 거치며, 누락 구간만 원격에서
//! 보충됩니다.

use crate::connector::BinanceClient;
use crate::error::{ExchangeError, ExchangeResult};
use crate::historical::CandleRetriever;
use crate::traits::{ExchangeGateway, KlineFetcher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quant_core::types::floor_time;
use quant_core::{Candle, Interval, Order, OrderId, OrderInfo, OrderStatus, Pair, Portfolio};
use quant_data::CandleStore;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Binance 거래소 게이트웨이.
pub struct BinanceGateway {
    name: &'static str,
    client: Arc<BinanceClient>,
    retriever: CandleRetriever,
}

impl BinanceGateway {
    /// 커넥터와 저장소로 게이트웨이를 생성합니다.
    pub fn new(client: BinanceClient, store: Arc<dyn CandleStore>) -> Self {
        let name = if client.config().testnet {
            "binance-testnet"
        } else {
            "binance"
        };

        Self {
            name,
            client: Arc::new(client),
            retriever: CandleRetriever::new(store),
        }
    }
}

#[async_trait]
impl ExchangeGateway for BinanceGateway {
    fn name(&self) -> &str {
        self.name
    }

    async fn get_historical_klines(
        &self,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Candle>> {
        self.retriever
            .get_historical_klines(
                self.client.as_ref(),
                self.name,
                pair,
                interval,
                period_start,
                period_end,
            )
            .await
    }

    async fn get_last_complete_candle_before(
        &self,
        pair: &Pair,
        interval: Interval,
        at: DateTime<Utc>,
    ) -> ExchangeResult<Candle> {
        let step = interval.duration();
        let begin = floor_time(at, step) - step;

        let candles = self
            .get_historical_klines(pair, interval, begin, at)
            .await?;

        candles
            .into_iter()
            .find(|candle| candle.open_time == begin)
            .ok_or_else(|| {
                ExchangeError::CandleNotFound(format!("{} {} before {}", pair, interval, at))
            })
    }

    async fn get_time(&self) -> ExchangeResult<DateTime<Utc>> {
        self.client.server_time().await
    }

    async fn get_portfolio(&self) -> ExchangeResult<Portfolio> {
        self.client.get_portfolio().await
    }

    async fn get_asset_balance(&self, asset: &str) -> ExchangeResult<Decimal> {
        self.client.get_asset_balance(asset).await
    }

    async fn place_order(&self, order: &Order) -> ExchangeResult<OrderId> {
        self.client.place_order(order).await
    }

    async fn check_order(&self, order_id: &OrderId) -> ExchangeResult<OrderStatus> {
        self.client.check_order(order_id).await
    }

    async fn cancel_order(&self, order_id: &OrderId) -> ExchangeResult<()> {
        self.client.cancel_order(order_id).await
    }

    async fn get_all_orders(&self, pair: &Pair) -> ExchangeResult<Vec<OrderInfo>> {
        self.client.get_all_orders(pair).await
    }

    async fn get_all_open_orders(&self, pair: &Pair) -> ExchangeResult<Vec<OrderInfo>> {
        self.client.get_open_orders(pair).await
    }
}
