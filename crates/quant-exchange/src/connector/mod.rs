//! 거래소별 REST 커넥터.

mod binance;

pub use binance::{BinanceClient, BinanceConfig};
