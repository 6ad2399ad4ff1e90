//! Integration tests for the simulated exchange tick loop.

mod common;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use common::{btc_usdt, seed_minute_candles, CountingHandler, StoreGateway, EXCHANGE};
use quant_core::{
    CandleCloseHandler, CoreError, CoreResult, Interval, Order, OrderInfo, Pair, Portfolio,
};
use quant_data::{CandleStore, MemoryCandleStore};
use quant_exchange::{ExchangeError, ExchangeGateway, SimulatedExchange};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn quarter_hour_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 5, 10, 12, 0, 0).unwrap()
}

/// 15분 구간을 넉넉히 덮도록 분봉을 심은 시뮬레이터를 만든다.
async fn seeded_simulator(portfolio: Portfolio) -> Arc<SimulatedExchange> {
    let store = Arc::new(MemoryCandleStore::new());
    seed_minute_candles(&store, &btc_usdt(), quarter_hour_start(), 20, dec!(100)).await;

    let gateway = Arc::new(StoreGateway::new(store));
    Arc::new(SimulatedExchange::new(
        gateway,
        portfolio,
        quarter_hour_start(),
    ))
}

#[tokio::test]
async fn ten_minute_backtest_fires_ten_one_minute_events() {
    let simulator = seeded_simulator(Portfolio::new()).await;
    let handler = CountingHandler::new();
    simulator.subscribe(Interval::M1, handler.clone()).await;

    let start = quarter_hour_start();
    let end = start + Interval::M1.duration() * 10;
    simulator
        .backtest(start, end, Interval::M1.duration())
        .await
        .unwrap();

    assert_eq!(handler.hits(), 10);
    assert_eq!(simulator.get_time().await.unwrap(), end);
}

#[tokio::test]
async fn interval_channels_fire_on_their_boundaries() {
    let simulator = seeded_simulator(Portfolio::new()).await;
    let minute = CountingHandler::new();
    let five = CountingHandler::new();
    let quarter = CountingHandler::new();
    simulator.subscribe(Interval::M1, minute.clone()).await;
    simulator.subscribe(Interval::M5, five.clone()).await;
    simulator.subscribe(Interval::M15, quarter.clone()).await;

    let start = quarter_hour_start();
    let end = start + Interval::M15.duration();
    simulator
        .backtest(start, end, Interval::M1.duration())
        .await
        .unwrap();

    // 12:01..12:15 틱에서 1분 채널 15번, 5분 채널은 12:05/12:10/12:15,
    // 15분 채널은 12:15에만 발화한다
    assert_eq!(minute.hits(), 15);
    assert_eq!(five.hits(), 3);
    assert_eq!(quarter.hits(), 1);
}

#[tokio::test]
async fn coarse_tick_skips_finer_boundaries() {
    let simulator = seeded_simulator(Portfolio::new()).await;
    let minute = CountingHandler::new();
    let five = CountingHandler::new();
    simulator.subscribe(Interval::M1, minute.clone()).await;
    simulator.subscribe(Interval::M5, five.clone()).await;

    let start = quarter_hour_start();
    let end = start + Interval::M1.duration() * 10;
    // 5분 틱에서는 1분 채널도 5분 경계에서만 발화한다
    simulator
        .backtest(start, end, Interval::M5.duration())
        .await
        .unwrap();

    assert_eq!(five.hits(), 2);
    assert_eq!(minute.hits(), 2);
}

/// 매분 일정 금액을 사는 전략.
struct DcaStrategy {
    exchange: Arc<SimulatedExchange>,
    pair: Pair,
}

#[async_trait]
impl CandleCloseHandler for DcaStrategy {
    async fn on_candle_close(
        &self,
        _interval: Interval,
        _close_time: DateTime<Utc>,
    ) -> CoreResult<()> {
        let order = Order::market_buy(self.pair.clone(), dec!(0.1));
        self.exchange
            .place_order(&order)
            .await
            .map_err(|e| CoreError::Handler(e.to_string()))?;
        Ok(())
    }
}

#[tokio::test]
async fn strategy_orders_fill_during_backtest() {
    let simulator = seeded_simulator(Portfolio::new().with_balance("USDT", dec!(1000))).await;
    let strategy = Arc::new(DcaStrategy {
        exchange: simulator.clone(),
        pair: btc_usdt(),
    });
    simulator.subscribe(Interval::M1, strategy).await;

    let start = quarter_hour_start();
    let end = start + Interval::M1.duration() * 10;
    simulator
        .backtest(start, end, Interval::M1.duration())
        .await
        .unwrap();

    // 매분 0.1 BTC씩 열 번 매수
    assert_eq!(simulator.get_asset_balance("BTC").await.unwrap(), dec!(1));

    // 12:0j 틱의 가격은 12:0(j-1) 분봉 종가 = 100 + (j-1)
    let spent: rust_decimal::Decimal =
        (0..10).map(|i| dec!(0.1) * (dec!(100) + rust_decimal::Decimal::from(i))).sum();
    assert_eq!(
        simulator.get_asset_balance("USDT").await.unwrap(),
        dec!(1000) - spent
    );

    let orders = simulator.get_all_orders(&btc_usdt()).await.unwrap();
    assert_eq!(orders.len(), 10);
    assert!(orders.iter().all(|o| o.status.is_final()));
}

#[tokio::test]
async fn identical_backtests_are_deterministic() {
    async fn run() -> (Portfolio, Vec<OrderInfo>) {
        let simulator =
            seeded_simulator(Portfolio::new().with_balance("USDT", dec!(1000))).await;
        let strategy = Arc::new(DcaStrategy {
            exchange: simulator.clone(),
            pair: btc_usdt(),
        });
        simulator.subscribe(Interval::M1, strategy).await;

        let start = quarter_hour_start();
        let end = start + Interval::M1.duration() * 10;
        simulator
            .backtest(start, end, Interval::M1.duration())
            .await
            .unwrap();

        (
            simulator.get_portfolio().await.unwrap(),
            simulator.get_all_orders(&btc_usdt()).await.unwrap(),
        )
    }

    let (first_portfolio, first_orders) = run().await;
    let (second_portfolio, second_orders) = run().await;

    assert_eq!(first_portfolio, second_portfolio);
    assert_eq!(first_orders, second_orders);
}

struct FailingHandler;

#[async_trait]
impl CandleCloseHandler for FailingHandler {
    async fn on_candle_close(
        &self,
        _interval: Interval,
        _close_time: DateTime<Utc>,
    ) -> CoreResult<()> {
        Err(CoreError::Handler("strategy blew up".to_string()))
    }
}

#[tokio::test]
async fn handler_error_stops_the_loop() {
    let simulator = seeded_simulator(Portfolio::new()).await;
    simulator.subscribe(Interval::M1, Arc::new(FailingHandler)).await;

    let start = quarter_hour_start();
    let end = start + Interval::M1.duration() * 10;
    let result = simulator.backtest(start, end, Interval::M1.duration()).await;

    assert!(matches!(result, Err(ExchangeError::Event(_))));
    // 첫 틱에서 중단되어 가상 시계는 1분만 전진한 상태다
    assert_eq!(
        simulator.get_time().await.unwrap(),
        start + Interval::M1.duration()
    );
}

#[tokio::test]
async fn historical_queries_delegate_to_wrapped_gateway() {
    let store = Arc::new(MemoryCandleStore::new());
    seed_minute_candles(&store, &btc_usdt(), quarter_hour_start(), 5, dec!(100)).await;

    let gateway = Arc::new(StoreGateway::new(store.clone()));
    let simulator =
        SimulatedExchange::new(gateway, Portfolio::new(), quarter_hour_start());

    let start = quarter_hour_start();
    let end = start + Interval::M1.duration() * 5;

    let from_simulator = simulator
        .get_historical_klines(&btc_usdt(), Interval::M1, start, end)
        .await
        .unwrap();
    let from_store = store
        .find_candles(EXCHANGE, &btc_usdt(), Interval::M1, start, end)
        .await
        .unwrap();

    assert_eq!(from_simulator, from_store);
    assert_eq!(from_simulator.len(), 5);
}
