//! 거래쌍 정의.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 거래 가능한 (자산, 통화) 쌍.
///
/// 거래소별로 유일하며, 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pair {
    /// 기준 자산 (예: BTC)
    pub asset: String,
    /// 호가 통화 (예: USDT)
    pub currency: String,
}

impl Pair {
    /// 새 거래쌍을 생성합니다.
    pub fn new(asset: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            asset: asset.into().to_uppercase(),
            currency: currency.into().to_uppercase(),
        }
    }

    /// 거래소 심볼 형식을 반환합니다 (예: BTCUSDT).
    pub fn symbol(&self) -> String {
        format!("{}{}", self.asset, self.currency)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.asset, self.currency)
    }
}
