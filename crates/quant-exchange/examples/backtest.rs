//! 메모리 저장소에 심은 분봉으로 DCA 전략을 백테스트하는 예제.
//!
//! ```bash
//! cargo run -p quant-exchange --example backtest
//! ```

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use quant_core::types::floor_time;
use quant_core::{
    Candle, CandleCloseHandler, CoreError, CoreResult, Interval, LogConfig, Order, OrderId,
    OrderInfo, OrderStatus, Pair, Portfolio,
};
use quant_data::{CandleStore, MemoryCandleStore};
use quant_exchange::{ExchangeError, ExchangeGateway, ExchangeResult, SimulatedExchange};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const EXCHANGE: &str = "binance";

/// 로컬 저장소만으로 데이터 조회에 답하는 게이트웨이.
struct StoreGateway {
    store: Arc<MemoryCandleStore>,
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
        Err(ExchangeError::NotSupported("no clock".into()))
    }

    async fn get_portfolio(&self) -> ExchangeResult<Portfolio> {
        Ok(Portfolio::new())
    }

    async fn get_asset_balance(&self, _asset: &str) -> ExchangeResult<Decimal> {
        Ok(Decimal::ZERO)
    }

    async fn place_order(&self, _order: &Order) -> ExchangeResult<OrderId> {
        Err(ExchangeError::NotSupported("data only".into()))
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

/// 매시간 일정 금액을 사는 전략.
struct HourlyDca {
    exchange: Arc<SimulatedExchange>,
    pair: Pair,
    quote_amount: Decimal,
}

#[async_trait]
impl CandleCloseHandler for HourlyDca {
    async fn on_candle_close(&self, _interval: Interval, close_time: DateTime<Utc>) -> CoreResult<()> {
        use quant_core::{MarketOrder, Side, VolumeType};

        let order = Order::Market(
            MarketOrder::new(self.pair.clone(), Side::Buy, self.quote_amount)
                .with_volume_type(VolumeType::Currency),
        );
        let order_id = self
            .exchange
            .place_order(&order)
            .await
            .map_err(|e| CoreError::Handler(e.to_string()))?;

        tracing::info!(%order_id, %close_time, "시간당 매수 실행");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quant_core::init_logging(LogConfig::new("info"))?;

    let pair = Pair::new("BTC", "USDT");
    let start = Utc.with_ymd_and_hms(2021, 5, 10, 0, 0, 0).unwrap();
    let end = start + Interval::D1.duration();

    // 하루치 분봉을 합성해 저장소에 심는다 (완만한 사인파 가격)
    let store = Arc::new(MemoryCandleStore::new());
    let step = Interval::M1.duration();
    for i in 0..(24 * 60) {
        let open_time = start + step * i;
        let phase = (i as f64) / 180.0;
        let price = Decimal::try_from(40_000.0 + 500.0 * phase.sin())?;
        let candle = Candle {
            pair: pair.clone(),
            interval: Interval::M1,
            open_time,
            close_time: open_time + step,
            open: price,
            high: price + dec!(10),
            low: price - dec!(10),
            close: price,
            volume: dec!(5),
            quote_volume: price * dec!(5),
            trade_count: 100,
            taker_buy_base_volume: dec!(2),
            taker_buy_quote_volume: price * dec!(2),
        };
        store.add_candle(EXCHANGE, &candle).await?;
    }

    let gateway = Arc::new(StoreGateway { store });
    let simulator = Arc::new(SimulatedExchange::new(
        gateway,
        Portfolio::new().with_balance("USDT", dec!(10_000)),
        start,
    ));

    let strategy = Arc::new(HourlyDca {
        exchange: simulator.clone(),
        pair: pair.clone(),
        quote_amount: dec!(100),
    });
    simulator.subscribe(Interval::H1, strategy).await;

    simulator.backtest(start, end, Interval::M1.duration()).await?;

    let portfolio = simulator.get_portfolio().await?;
    println!("최종 포트폴리오:");
    for (asset, balance) in portfolio.assets() {
        println!("  {asset}: {balance}");
    }

    let orders = simulator.get_all_orders(&pair).await?;
    println!("체결 내역 {}건", orders.len());

    Ok(())
}
