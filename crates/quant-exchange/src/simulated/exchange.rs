//! 시뮬레이션 거래소 구현.
//!
//! 가상 시계의 틱마다 경계가 일치하는 간격 채널을 발화시키고,
//! 시장가 주문을 직전 1분봉 종가로 체결합니다. 벽시계나 난수를 전혀
//! 사용하지 않으므로 같은 입력에 대해 항상 같은 체결 순서와 잔고가
//! 재현됩니다.

use crate::error::{ExchangeError, ExchangeResult};
use crate::traits::ExchangeGateway;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use quant_core::types::floor_time;
use quant_core::{
    Candle, CandleCloseHandler, CandleEventBus, Interval, MarketOrder, Order, OrderId, OrderInfo,
    OrderStatus, Pair, Portfolio, Side, VolumeType,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// 시뮬레이션이 보관하는 주문 사본.
///
/// 호출자가 건넨 주문 값은 변경되지 않고, 체결 결과는 이 사본에만
/// 기록됩니다.
#[derive(Debug, Clone)]
struct SimOrder {
    order: Order,
    placed_at: DateTime<Utc>,
    filled_asset_volume: Decimal,
    filled_currency_volume: Decimal,
}

impl SimOrder {
    fn to_order_info(&self, order_id: i64) -> OrderInfo {
        OrderInfo {
            pair: self.order.pair().clone(),
            order_id,
            time: self.placed_at,
            ordered_volume: self.order.volume(),
            filled_volume: self.filled_asset_volume,
            filled_currency_volume: self.filled_currency_volume,
            status: self.order.status(),
            kind: self.order.kind().to_string(),
            side: self.order.side(),
        }
    }
}

/// 내부 시뮬레이션 상태.
struct SimState {
    now: DateTime<Utc>,
    portfolio: Portfolio,
    orders: BTreeMap<i64, SimOrder>,
    next_order_id: i64,
}

/// 백테스팅용 시뮬레이션 거래소.
///
/// 과거 데이터 조회는 감싼 게이트웨이에 위임하고, 시뮬레이션은 캔들
/// 데이터를 스스로 만들어내지 않습니다.
pub struct SimulatedExchange {
    name: String,
    gateway: Arc<dyn ExchangeGateway>,
    state: RwLock<SimState>,
    events: CandleEventBus,
}

impl SimulatedExchange {
    /// 게이트웨이를 감싸는 시뮬레이션 거래소를 생성합니다.
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        portfolio: Portfolio,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: format!("{}-emulator", gateway.name()),
            gateway,
            state: RwLock::new(SimState {
                now,
                portfolio,
                orders: BTreeMap::new(),
                next_order_id: 1,
            }),
            events: CandleEventBus::new(),
        }
    }

    /// 캔들 마감 이벤트 버스.
    pub fn events(&self) -> &CandleEventBus {
        &self.events
    }

    /// 간격 채널에 핸들러를 등록합니다.
    pub async fn subscribe(&self, interval: Interval, handler: Arc<dyn CandleCloseHandler>) {
        self.events.subscribe(interval, handler).await;
    }

    /// 현재 시장 가격.
    ///
    /// 가상 시각 직전에 마감된 1분봉의 종가로 정의됩니다.
    pub async fn current_price(&self, pair: &Pair) -> ExchangeResult<Decimal> {
        let now = self.state.read().await.now;
        let candle = self
            .gateway
            .get_last_complete_candle_before(pair, Interval::M1, now)
            .await?;
        Ok(candle.close)
    }

    /// 시장가 주문을 현재 가격으로 체결하거나 거부합니다.
    fn process_market_order(
        portfolio: &mut Portfolio,
        order: &mut MarketOrder,
        price: Decimal,
    ) -> (Decimal, Decimal) {
        let (asset_volume, currency_volume) = match order.volume_type {
            VolumeType::Asset => (order.volume, order.volume * price),
            VolumeType::Currency => (order.volume / price, order.volume),
        };

        let pair = &order.pair;
        match order.side {
            Side::Sell => {
                let balance = portfolio.balance(&pair.asset);
                if asset_volume > balance {
                    warn!(
                        pair = %pair,
                        need = %asset_volume,
                        available = %balance,
                        "잔고 부족으로 매도 주문 거부"
                    );
                    order.status = OrderStatus::Rejected;
                    return (Decimal::ZERO, Decimal::ZERO);
                }
                portfolio.debit(&pair.asset, asset_volume);
                portfolio.credit(&pair.currency, currency_volume);
            }
            Side::Buy => {
                let balance = portfolio.balance(&pair.currency);
                if currency_volume > balance {
                    warn!(
                        pair = %pair,
                        need = %currency_volume,
                        available = %balance,
                        "잔고 부족으로 매수 주문 거부"
                    );
                    order.status = OrderStatus::Rejected;
                    return (Decimal::ZERO, Decimal::ZERO);
                }
                portfolio.credit(&pair.asset, asset_volume);
                portfolio.debit(&pair.currency, currency_volume);
            }
        }

        order.status = OrderStatus::Filled;
        (asset_volume, currency_volume)
    }

    /// 새 가상 시각에서 경계가 일치하는 간격 채널을 모두 발화합니다.
    async fn fire_interval_events(&self, now: DateTime<Utc>) -> ExchangeResult<()> {
        for interval in Interval::ALL {
            if floor_time(now, interval.duration()) == now {
                self.events.fire(interval, now).await?;
            }
        }
        Ok(())
    }

    /// 틱 루프.
    ///
    /// 종료 조건을 확인한 뒤 가상 시각을 다음 틱 경계로 전진시키고,
    /// 경계가 일치하는 간격 채널을 발화합니다. 핸들러가 같은 틱 안에서
    /// 제출한 주문은 다음 틱 전에 모두 처리됩니다.
    pub async fn event_loop<F>(&self, tickwidth: Duration, terminate: F) -> ExchangeResult<()>
    where
        F: Fn(DateTime<Utc>) -> bool,
    {
        loop {
            let now = self.state.read().await.now;
            if terminate(now) {
                return Ok(());
            }

            let next = floor_time(now, tickwidth) + tickwidth;
            self.state.write().await.now = next;

            self.fire_interval_events(next).await?;
        }
    }

    /// 구간 백테스트.
    ///
    /// 가상 시각을 `period_start`로 맞춘 뒤, 가상 시각이 `period_end`에
    /// 도달할 때까지 틱 루프를 실행합니다.
    pub async fn backtest(
        &self,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        tickwidth: Duration,
    ) -> ExchangeResult<()> {
        debug!(
            name = %self.name,
            start = %period_start,
            end = %period_end,
            "백테스트 시작"
        );

        self.state.write().await.now = period_start;
        self.event_loop(tickwidth, |now| now >= period_end).await
    }
}

#[async_trait]
impl ExchangeGateway for SimulatedExchange {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_historical_klines(
        &self,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Candle>> {
        self.gateway
            .get_historical_klines(pair, interval, period_start, period_end)
            .await
    }

    async fn get_last_complete_candle_before(
        &self,
        pair: &Pair,
        interval: Interval,
        at: DateTime<Utc>,
    ) -> ExchangeResult<Candle> {
        self.gateway
            .get_last_complete_candle_before(pair, interval, at)
            .await
    }

    async fn get_time(&self) -> ExchangeResult<DateTime<Utc>> {
        Ok(self.state.read().await.now)
    }

    async fn get_portfolio(&self) -> ExchangeResult<Portfolio> {
        // 내부 상태 보호를 위해 사본 반환
        Ok(self.state.read().await.portfolio.clone())
    }

    async fn get_asset_balance(&self, asset: &str) -> ExchangeResult<Decimal> {
        let mut state = self.state.write().await;
        state.portfolio.ensure_asset(asset);
        Ok(state.portfolio.balance(asset))
    }

    async fn place_order(&self, order: &Order) -> ExchangeResult<OrderId> {
        let market = match order {
            Order::Market(market) => market,
            Order::Limit(_) => {
                return Err(ExchangeError::NotSupported(
                    "시뮬레이션 거래소는 지정가 주문을 지원하지 않습니다".to_string(),
                ))
            }
        };

        let price = self.current_price(&market.pair).await?;
        if price <= Decimal::ZERO {
            return Err(ExchangeError::OrderRejected(format!(
                "현재 가격을 사용할 수 없음: {} @ {}",
                market.pair, price
            )));
        }

        let mut state = self.state.write().await;
        state.portfolio.ensure_asset(&market.pair.asset);
        state.portfolio.ensure_asset(&market.pair.currency);

        // 호출자의 주문 값은 변경하지 않고 사본에만 체결 결과를 기록한다
        let mut placed = market.clone();
        let (asset_volume, currency_volume) =
            Self::process_market_order(&mut state.portfolio, &mut placed, price);

        let id = state.next_order_id;
        state.next_order_id += 1;
        let placed_at = state.now;

        debug!(
            order_id = id,
            pair = %placed.pair,
            side = %placed.side,
            status = %placed.status,
            price = %price,
            "시장가 주문 처리"
        );

        state.orders.insert(
            id,
            SimOrder {
                order: Order::Market(placed),
                placed_at,
                filled_asset_volume: asset_volume,
                filled_currency_volume: currency_volume,
            },
        );

        Ok(OrderId {
            pair: market.pair.clone(),
            id,
        })
    }

    async fn check_order(&self, order_id: &OrderId) -> ExchangeResult<OrderStatus> {
        let state = self.state.read().await;
        state
            .orders
            .get(&order_id.id)
            .map(|sim_order| sim_order.order.status())
            .ok_or_else(|| ExchangeError::OrderNotFound(order_id.to_string()))
    }

    async fn cancel_order(&self, order_id: &OrderId) -> ExchangeResult<()> {
        // 시장가 주문은 즉시 최종 상태에 도달하므로 취소할 것이 없다
        warn!(order_id = %order_id, "시뮬레이션 거래소의 주문 취소는 no-op");
        Ok(())
    }

    async fn get_all_orders(&self, pair: &Pair) -> ExchangeResult<Vec<OrderInfo>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|(_, sim_order)| sim_order.order.pair() == pair)
            .map(|(id, sim_order)| sim_order.to_order_info(*id))
            .collect())
    }

    async fn get_all_open_orders(&self, pair: &Pair) -> ExchangeResult<Vec<OrderInfo>> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|(_, sim_order)| {
                sim_order.order.pair() == pair && sim_order.order.status().is_open()
            })
            .map(|(id, sim_order)| sim_order.to_order_info(*id))
            .collect())
    }
}
