//! 거래소 trait 정의.

use crate::error::ExchangeResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quant_core::{Candle, Interval, Order, OrderId, OrderInfo, OrderStatus, Pair, Portfolio};
use rust_decimal::Decimal;

/// 통합 거래소 인터페이스.
///
/// 실거래소 어댑터와 시뮬레이션 거래소가 같은 계약을 구현하므로
/// 전략 코드는 둘을 구분하지 않습니다. 지원할 수 없는 작업은 조용히
/// 상태를 어긋나게 하는 대신 no-op을 로그로 남기거나 에러를 반환해야
/// 합니다.
#[async_trait]
pub trait ExchangeGateway: Send + Sync {
    /// 거래소 이름 반환.
    fn name(&self) -> &str;

    // === 시장 데이터 ===

    /// 구간의 과거 캔들 조회.
    ///
    /// 캐시에 없는 구간은 원격에서 보충된 뒤 반환됩니다.
    async fn get_historical_klines(
        &self,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Candle>>;

    /// `at` 직전에 완전히 마감된 캔들 조회.
    ///
    /// open_time이 `floor(at, interval) - interval`인 캔들입니다.
    async fn get_last_complete_candle_before(
        &self,
        pair: &Pair,
        interval: Interval,
        at: DateTime<Utc>,
    ) -> ExchangeResult<Candle>;

    /// 거래소 현재 시각 조회 (시뮬레이션은 가상 시각).
    async fn get_time(&self) -> ExchangeResult<DateTime<Utc>>;

    // === 계좌 ===

    /// 포트폴리오 스냅샷 조회. 항상 사본이 반환됩니다.
    async fn get_portfolio(&self) -> ExchangeResult<Portfolio>;

    /// 특정 자산의 사용 가능 잔고 조회.
    async fn get_asset_balance(&self, asset: &str) -> ExchangeResult<Decimal>;

    // === 주문 ===

    /// 새 주문 제출.
    async fn place_order(&self, order: &Order) -> ExchangeResult<OrderId>;

    /// 주문 상태 조회.
    async fn check_order(&self, order_id: &OrderId) -> ExchangeResult<OrderStatus>;

    /// 주문 취소.
    async fn cancel_order(&self, order_id: &OrderId) -> ExchangeResult<()>;

    /// 거래쌍의 전체 주문 조회.
    async fn get_all_orders(&self, pair: &Pair) -> ExchangeResult<Vec<OrderInfo>>;

    /// 거래쌍의 미체결 주문 조회.
    async fn get_all_open_orders(&self, pair: &Pair) -> ExchangeResult<Vec<OrderInfo>>;
}

/// 원격 거래소 데이터 조회 계약.
///
/// 과거 데이터 보충에 필요한 최소 표면만 노출합니다. 와이어 프로토콜,
/// 인증, 요청 한도 처리는 구현체의 몫입니다.
#[async_trait]
pub trait KlineFetcher: Send + Sync {
    /// 구간의 캔들을 원격 거래소에서 가져옵니다.
    async fn fetch_klines(
        &self,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Candle>>;

    /// 거래소 서버 시각을 조회합니다.
    async fn server_time(&self) -> ExchangeResult<DateTime<Utc>>;
}
