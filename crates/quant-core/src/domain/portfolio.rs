//! 포트폴리오 모델.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 자산별 사용 가능 잔고.
///
/// 거래소 구현이 소유하며, 외부에는 항상 사본으로 전달됩니다.
/// 잔고가 음수가 되지 않는 것은 호출자(체결 처리)가 보장합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    balances: HashMap<String, Decimal>,
}

impl Portfolio {
    /// 빈 포트폴리오를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 자산 잔고를 설정한 포트폴리오를 반환합니다.
    pub fn with_balance(mut self, asset: impl Into<String>, amount: Decimal) -> Self {
        self.balances.insert(asset.into(), amount);
        self
    }

    /// 자산의 잔고를 반환합니다. 없는 자산은 0입니다.
    pub fn balance(&self, asset: &str) -> Decimal {
        self.balances.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// 자산 항목이 없으면 0으로 초기화합니다.
    pub fn ensure_asset(&mut self, asset: &str) {
        self.balances.entry(asset.to_string()).or_insert(Decimal::ZERO);
    }

    /// 자산 잔고를 증가시킵니다.
    pub fn credit(&mut self, asset: &str, amount: Decimal) {
        *self.balances.entry(asset.to_string()).or_insert(Decimal::ZERO) += amount;
    }

    /// 자산 잔고를 감소시킵니다.
    pub fn debit(&mut self, asset: &str, amount: Decimal) {
        *self.balances.entry(asset.to_string()).or_insert(Decimal::ZERO) -= amount;
    }

    /// (자산, 잔고) 항목을 순회합니다.
    pub fn assets(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.balances.iter().map(|(asset, amount)| (asset.as_str(), *amount))
    }

    /// 보유 자산 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// 포트폴리오가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Decimal)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (S, Decimal)>>(iter: I) -> Self {
        Self {
            balances: iter
                .into_iter()
                .map(|(asset, amount)| (asset.into(), amount))
                .collect(),
        }
    }
}
