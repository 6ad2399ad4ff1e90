//! 캐시 우선 과거 데이터 조회.
//!
//! 저장소에서 누락 구간을 찾고, 누락된 구간만 원격에서 가져와 저장한 뒤
//! 다시 검사하는 제한 루프입니다. 원격 거래소가 요청보다 적은 캔들을
//! 돌려줘도 매 라운드 누락을 재검사하므로 부분 응답에 안전합니다.
//!
//! 같은 (거래소, 거래쌍, 간격) 요청은 Lock 맵으로 직렬화되어 동시 요청이
//! 같은 구간을 중복으로 가져오지 않습니다. 저장소의 중복 무시 삽입은
//! 그래도 남는 경합의 안전망입니다.

use crate::error::{ExchangeError, ExchangeResult};
use crate::traits::KlineFetcher;
use chrono::{DateTime, Utc};
use quant_core::{Candle, Interval, Pair};
use quant_data::CandleStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// 원격 보충 라운드의 최대 횟수.
///
/// 이 횟수를 넘겨도 누락이 남으면 원격 거래소가 불완전한 데이터를
/// 돌려주는 것으로 보고 해당 호출을 실패시킵니다.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

/// (거래소, 거래쌍, 간격)별 페칭 직렬화 Lock 맵.
type FetchLockMap = RwLock<HashMap<String, Arc<Mutex<()>>>>;

/// 캐시 우선 캔들 조회 서비스.
pub struct CandleRetriever {
    store: Arc<dyn CandleStore>,
    fetch_locks: FetchLockMap,
}

impl CandleRetriever {
    /// 저장소 위에 조회 서비스를 생성합니다.
    pub fn new(store: Arc<dyn CandleStore>) -> Self {
        Self {
            store,
            fetch_locks: RwLock::new(HashMap::new()),
        }
    }

    /// 이 서비스가 사용하는 저장소.
    pub fn store(&self) -> &Arc<dyn CandleStore> {
        &self.store
    }

    async fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.fetch_locks.read().await;
            if let Some(lock) = locks.get(key) {
                return lock.clone();
            }
        }

        let mut locks = self.fetch_locks.write().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 구간의 과거 캔들을 조회합니다.
    ///
    /// 누락 구간이 없으면 저장소에서 바로 반환되고(캐시 적중), 있으면
    /// 연속 누락 구간당 한 번씩 원격 조회 후 재검사합니다.
    /// [`MAX_FETCH_ATTEMPTS`] 라운드를 넘기면
    /// [`ExchangeError::RetryExhausted`]로 실패합니다.
    pub async fn get_historical_klines(
        &self,
        fetcher: &dyn KlineFetcher,
        exchange: &str,
        pair: &Pair,
        interval: Interval,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> ExchangeResult<Vec<Candle>> {
        let lock_key = format!("{}:{}:{}", exchange, pair, interval);
        let lock = self.lock_for(&lock_key).await;
        let _guard = lock.lock().await;

        let mut attempts = 0;
        loop {
            let missing = self
                .store
                .find_missing_periods(exchange, pair, interval, period_start, period_end)
                .await?;

            if missing.is_empty() {
                return Ok(self
                    .store
                    .find_candles(exchange, pair, interval, period_start, period_end)
                    .await?);
            }

            if attempts >= MAX_FETCH_ATTEMPTS {
                warn!(
                    exchange,
                    pair = %pair,
                    interval = %interval,
                    gaps = missing.len(),
                    "원격 보충이 수렴하지 않음"
                );
                return Err(ExchangeError::RetryExhausted {
                    pair: pair.to_string(),
                    interval,
                    attempts,
                });
            }
            attempts += 1;

            debug!(
                exchange,
                pair = %pair,
                interval = %interval,
                gaps = missing.len(),
                attempt = attempts,
                "누락 구간 보충 시작"
            );

            for (gap_start, gap_end) in missing {
                let candles = fetcher
                    .fetch_klines(pair, interval, gap_start, gap_end)
                    .await?;
                let inserted = self.store.add_candles(exchange, &candles).await?;
                debug!(
                    exchange,
                    pair = %pair,
                    gap_start = %gap_start,
                    gap_end = %gap_end,
                    fetched = candles.len(),
                    inserted,
                    "누락 구간 저장"
                );
            }
        }
    }
}
