//! 간격 경계 반올림.
//!
//! 모든 시각 비교는 UTC 기준으로 이루어집니다. 타임존이 붙은 입력은
//! 계산 전에 UTC로 정규화됩니다.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// 경계 계산의 고정 기준 시점 (2000-01-01T00:00:00Z).
///
/// 유닉스 epoch 기반 타임스탬프 연산은 2000년 전후에 불연속이 관측되어
/// 고정 기준점을 사용합니다.
pub fn reference_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}

/// 시각을 간격 경계로 내림합니다.
///
/// `floor(t) = t - ((t - epoch) mod step)`. 이미 경계에 있으면 그대로
/// 반환됩니다. 결과는 항상 UTC입니다.
pub fn floor_time<Tz: TimeZone>(time: DateTime<Tz>, step: Duration) -> DateTime<Utc> {
    let time = time.with_timezone(&Utc);
    let step_ms = step.num_milliseconds();
    debug_assert!(step_ms > 0, "step must be positive");

    let elapsed_ms = (time - reference_epoch()).num_milliseconds();
    time - Duration::milliseconds(elapsed_ms.rem_euclid(step_ms))
}

/// 시각을 간격 경계로 올림합니다.
///
/// 이미 경계에 있으면 그대로, 아니면 다음 경계를 반환합니다.
pub fn ceil_time<Tz: TimeZone>(time: DateTime<Tz>, step: Duration) -> DateTime<Utc> {
    let time = time.with_timezone(&Utc);
    let floored = floor_time(time, step);
    if floored == time {
        floored
    } else {
        floored + step
    }
}
