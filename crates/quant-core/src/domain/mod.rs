//! 도메인 모델.

pub mod candle;
pub mod order;
pub mod portfolio;

pub use candle::Candle;
pub use order::{LimitOrder, MarketOrder, Order, OrderId, OrderInfo, OrderStatus, Side, VolumeType};
pub use portfolio::Portfolio;
