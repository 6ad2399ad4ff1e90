//! 캔들 마감 이벤트 버스.
//!
//! 간격별로 고정된 채널을 가지는 멀티캐스트 콜백 레지스트리입니다.
//! 핸들러는 등록 순서대로 순차 호출되며, 핸들러의 에러는 삼켜지지 않고
//! 호출자에게 전파됩니다. 순차 호출은 백테스트 재현성의 전제 조건입니다.

use crate::error::{CoreError, CoreResult};
use crate::types::Interval;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 캔들 마감 알림을 수신하는 핸들러.
#[async_trait]
pub trait CandleCloseHandler: Send + Sync {
    /// `interval` 간격의 캔들이 `close_time`에 마감되었을 때 호출됩니다.
    async fn on_candle_close(&self, interval: Interval, close_time: DateTime<Utc>)
        -> CoreResult<()>;
}

type HandlerList = RwLock<Vec<Arc<dyn CandleCloseHandler>>>;

/// 간격별 캔들 마감 이벤트 버스.
///
/// 채널 집합은 생성 시점에 [`Interval::ALL`]로 고정됩니다.
/// 같은 핸들러를 두 번 등록하면 두 번 호출됩니다 (독립 리스너 의미).
pub struct CandleEventBus {
    channels: [HandlerList; Interval::ALL.len()],
}

impl CandleEventBus {
    /// 모든 간격 채널을 가진 버스를 생성합니다.
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| RwLock::new(Vec::new())),
        }
    }

    /// 채널 이름을 간격으로 해석합니다.
    ///
    /// 알 수 없는 이름은 [`CoreError::UnknownChannel`]로 실패합니다.
    pub fn resolve(name: &str) -> CoreResult<Interval> {
        Interval::ALL
            .iter()
            .copied()
            .find(|interval| interval.channel() == name)
            .ok_or_else(|| CoreError::UnknownChannel(name.to_string()))
    }

    fn slot(&self, interval: Interval) -> &HandlerList {
        &self.channels[interval as usize]
    }

    /// 핸들러를 채널에 등록합니다.
    pub async fn subscribe(&self, interval: Interval, handler: Arc<dyn CandleCloseHandler>) {
        self.slot(interval).write().await.push(handler);
    }

    /// 채널 이름으로 핸들러를 등록합니다.
    pub async fn subscribe_by_name(
        &self,
        name: &str,
        handler: Arc<dyn CandleCloseHandler>,
    ) -> CoreResult<()> {
        let interval = Self::resolve(name)?;
        self.subscribe(interval, handler).await;
        Ok(())
    }

    /// 해당 핸들러의 모든 등록을 제거합니다.
    pub async fn unsubscribe(&self, interval: Interval, handler: &Arc<dyn CandleCloseHandler>) {
        self.slot(interval)
            .write()
            .await
            .retain(|registered| !Arc::ptr_eq(registered, handler));
    }

    /// 채널의 등록 핸들러 수를 반환합니다.
    pub async fn subscriber_count(&self, interval: Interval) -> usize {
        self.slot(interval).read().await.len()
    }

    /// 채널의 핸들러를 등록 순서대로 호출합니다.
    ///
    /// 첫 번째 핸들러 에러에서 중단하고 그 에러를 반환합니다.
    pub async fn fire(&self, interval: Interval, close_time: DateTime<Utc>) -> CoreResult<()> {
        // 핸들러가 콜백 안에서 다시 버스를 조작할 수 있도록 잠금 밖에서 호출한다
        let handlers = self.slot(interval).read().await.clone();
        for handler in handlers {
            handler.on_candle_close(interval, close_time).await?;
        }
        Ok(())
    }

    /// 채널 이름으로 핸들러를 호출합니다.
    pub async fn fire_by_name(&self, name: &str, close_time: DateTime<Utc>) -> CoreResult<()> {
        let interval = Self::resolve(name)?;
        self.fire(interval, close_time).await
    }
}

impl Default for CandleEventBus {
    fn default() -> Self {
        Self::new()
    }
}
