//! 주문 타입.
//!
//! 이 모듈은 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `VolumeType` - 주문 수량의 표시 단위 (자산/통화)
//! - `OrderStatus` - 거래소가 보고하는 주문 상태
//! - `MarketOrder` / `LimitOrder` / `Order` - 주문 변형
//! - `OrderId` - 거래소가 부여한 주문 식별자
//! - `OrderInfo` - 주문 조회 결과 요약

use crate::types::Pair;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 주문 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 주문 수량의 표시 단위.
///
/// 시장가 주문의 수량은 기준 자산 단위 또는 호가 통화 단위로
/// 지정할 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeType {
    /// 기준 자산 단위 (예: BTC 수량)
    Asset,
    /// 호가 통화 단위 (예: USDT 금액)
    Currency,
}

/// 거래소가 보고하는 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 새로 접수됨
    New,
    /// 부분 체결됨
    PartiallyFilled,
    /// 전량 체결됨
    Filled,
    /// 취소됨
    Canceled,
    /// 취소 대기 중
    PendingCancel,
    /// 거부됨
    Rejected,
    /// 유효 기간 만료
    Expired,
}

impl OrderStatus {
    /// 주문이 최종 상태인지 확인합니다.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Rejected | OrderStatus::Expired
        )
    }

    /// 주문이 아직 체결 가능한 상태인지 확인합니다.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::PartiallyFilled)
    }

    /// 거래소 상태 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::PendingCancel => "PENDING_CANCEL",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "PARTIALLY_FILLED" => Ok(OrderStatus::PartiallyFilled),
            "FILLED" => Ok(OrderStatus::Filled),
            "CANCELED" => Ok(OrderStatus::Canceled),
            "PENDING_CANCEL" => Ok(OrderStatus::PendingCancel),
            "REJECTED" => Ok(OrderStatus::Rejected),
            "EXPIRED" => Ok(OrderStatus::Expired),
            _ => Err(format!("Unknown order status: {}", s)),
        }
    }
}

/// 시장가 주문.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrder {
    /// 거래쌍
    pub pair: Pair,
    /// 주문 방향
    pub side: Side,
    /// 주문 수량 (`volume_type` 단위)
    pub volume: Decimal,
    /// 수량 표시 단위
    pub volume_type: VolumeType,
    /// 주문 상태
    pub status: OrderStatus,
}

impl MarketOrder {
    /// 새 시장가 주문을 생성합니다.
    pub fn new(pair: Pair, side: Side, volume: Decimal) -> Self {
        Self {
            pair,
            side,
            volume,
            volume_type: VolumeType::Asset,
            status: OrderStatus::New,
        }
    }

    /// 수량 표시 단위를 설정합니다.
    pub fn with_volume_type(mut self, volume_type: VolumeType) -> Self {
        self.volume_type = volume_type;
        self
    }
}

/// 지정가 주문.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrder {
    /// 거래쌍
    pub pair: Pair,
    /// 주문 방향
    pub side: Side,
    /// 주문 수량 (기준 자산 단위)
    pub volume: Decimal,
    /// 지정 가격
    pub price: Decimal,
    /// 주문 상태
    pub status: OrderStatus,
}

impl LimitOrder {
    /// 새 지정가 주문을 생성합니다.
    pub fn new(pair: Pair, side: Side, volume: Decimal, price: Decimal) -> Self {
        Self {
            pair,
            side,
            volume,
            price,
            status: OrderStatus::New,
        }
    }
}

/// 주문 변형.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Order {
    /// 시장가 주문
    Market(MarketOrder),
    /// 지정가 주문
    Limit(LimitOrder),
}

impl Order {
    /// 시장가 매수 주문을 생성합니다.
    pub fn market_buy(pair: Pair, volume: Decimal) -> Self {
        Order::Market(MarketOrder::new(pair, Side::Buy, volume))
    }

    /// 시장가 매도 주문을 생성합니다.
    pub fn market_sell(pair: Pair, volume: Decimal) -> Self {
        Order::Market(MarketOrder::new(pair, Side::Sell, volume))
    }

    /// 지정가 매수 주문을 생성합니다.
    pub fn limit_buy(pair: Pair, volume: Decimal, price: Decimal) -> Self {
        Order::Limit(LimitOrder::new(pair, Side::Buy, volume, price))
    }

    /// 지정가 매도 주문을 생성합니다.
    pub fn limit_sell(pair: Pair, volume: Decimal, price: Decimal) -> Self {
        Order::Limit(LimitOrder::new(pair, Side::Sell, volume, price))
    }

    /// 거래쌍을 반환합니다.
    pub fn pair(&self) -> &Pair {
        match self {
            Order::Market(order) => &order.pair,
            Order::Limit(order) => &order.pair,
        }
    }

    /// 주문 방향을 반환합니다.
    pub fn side(&self) -> Side {
        match self {
            Order::Market(order) => order.side,
            Order::Limit(order) => order.side,
        }
    }

    /// 주문 수량을 반환합니다.
    pub fn volume(&self) -> Decimal {
        match self {
            Order::Market(order) => order.volume,
            Order::Limit(order) => order.volume,
        }
    }

    /// 현재 상태를 반환합니다.
    pub fn status(&self) -> OrderStatus {
        match self {
            Order::Market(order) => order.status,
            Order::Limit(order) => order.status,
        }
    }

    /// 상태를 갱신합니다.
    pub fn set_status(&mut self, status: OrderStatus) {
        match self {
            Order::Market(order) => order.status = status,
            Order::Limit(order) => order.status = status,
        }
    }

    /// 주문 유형의 거래소 표기를 반환합니다.
    pub fn kind(&self) -> &'static str {
        match self {
            Order::Market(_) => "MARKET",
            Order::Limit(_) => "LIMIT",
        }
    }
}

/// 거래소가 부여한 주문 식별자.
///
/// `check_order`/`cancel_order` 조회 키로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId {
    /// 거래쌍
    pub pair: Pair,
    /// 거래소가 부여한 번호
    pub id: i64,
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.pair, self.id)
    }
}

/// 주문 조회 결과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// 거래쌍
    pub pair: Pair,
    /// 주문 번호
    pub order_id: i64,
    /// 주문 접수 시각
    pub time: DateTime<Utc>,
    /// 주문 수량
    pub ordered_volume: Decimal,
    /// 체결된 기준 자산 수량
    pub filled_volume: Decimal,
    /// 체결된 호가 통화 금액
    pub filled_currency_volume: Decimal,
    /// 주문 상태
    pub status: OrderStatus,
    /// 주문 유형 (거래소 표기)
    pub kind: String,
    /// 주문 방향
    pub side: Side,
}
