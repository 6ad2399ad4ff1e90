//! 누락 캔들 구간 계산.
//!
//! 요청 구간을 간격 경계로 정규화한 뒤(시작은 올림, 끝은 내림) 경계에
//! 정렬된 슬롯을 순서대로 훑으면서, 저장된 캔들이 없는 연속 슬롯을 하나의
//! 누락 구간 `[첫 누락 open, 마지막 누락 open + interval)`으로 병합합니다.
//!
//! 정렬된 open 시각 목록 위에 커서를 유지하므로 전체 비용은
//! O(슬롯 수 + 저장 캔들 수)입니다.

use chrono::{DateTime, Utc};
use quant_core::types::{ceil_time, floor_time, Interval};

/// 누락 구간 `[시작, 끝)`.
pub type Period = (DateTime<Utc>, DateTime<Utc>);

/// 저장된 open 시각 목록으로부터 누락 구간을 계산합니다.
///
/// `opens`는 오름차순이어야 하며, 요청 구간 밖의 시각이나 경계에 맞지 않는
/// 시각이 섞여 있어도 무시됩니다.
pub fn missing_periods(
    opens: &[DateTime<Utc>],
    interval: Interval,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Vec<Period> {
    let step = interval.duration();
    let range_start = ceil_time(period_start, step);
    let range_end = floor_time(period_end, step);

    let mut periods = Vec::new();
    let mut run_start: Option<DateTime<Utc>> = None;
    let mut cursor = 0;

    let mut slot = range_start;
    while slot < range_end {
        while cursor < opens.len() && opens[cursor] < slot {
            cursor += 1;
        }

        if cursor < opens.len() && opens[cursor] == slot {
            if let Some(begin) = run_start.take() {
                periods.push((begin, slot));
            }
        } else if run_start.is_none() {
            run_start = Some(slot);
        }

        slot += step;
    }

    if let Some(begin) = run_start {
        periods.push((begin, range_end));
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_periods_scenario() {
        // 2021-01-03과 2021-01-06 일봉만 저장된 상태에서
        // [01-01, 01-10) 요청 시 세 개의 누락 구간이 나와야 한다
        let opens = vec![day(3), day(6)];
        let missing = missing_periods(&opens, Interval::D1, day(1), day(10));

        assert_eq!(
            missing,
            vec![(day(1), day(3)), (day(4), day(6)), (day(7), day(10))]
        );
    }

    #[test]
    fn test_single_missing_slot() {
        let start = Utc.with_ymd_and_hms(2021, 2, 10, 10, 55, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 2, 10, 10, 56, 0).unwrap();

        let missing = missing_periods(&[], Interval::M1, start, end);
        assert_eq!(missing, vec![(start, end)]);
    }

    #[test]
    fn test_no_missing_after_fill() {
        let opens: Vec<_> = (1..10).map(day).collect();
        let missing = missing_periods(&opens, Interval::D1, day(1), day(10));
        assert!(missing.is_empty());
    }

    #[test]
    fn test_unaligned_bounds_are_normalized() {
        // 시작은 올림, 끝은 내림되어 경계 슬롯만 검사된다
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 13, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 1, 4, 7, 0, 0).unwrap();

        let missing = missing_periods(&[day(3)], Interval::D1, start, end);
        assert_eq!(missing, vec![(day(2), day(3))]);
    }

    #[test]
    fn test_empty_range_has_no_gaps() {
        // 정규화 후 구간이 비면 누락도 없다
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, 0).unwrap();
        assert!(missing_periods(&[], Interval::D1, start, end).is_empty());

        assert!(missing_periods(&[], Interval::D1, day(5), day(5)).is_empty());
    }

    #[test]
    fn test_opens_outside_range_ignored() {
        let opens = vec![day(1), day(2), day(8), day(9)];
        let missing = missing_periods(&opens, Interval::D1, day(3), day(6));
        assert_eq!(missing, vec![(day(3), day(6))]);
    }

    #[test]
    fn test_gap_at_range_edges() {
        let opens = vec![day(2), day(3)];
        let missing = missing_periods(&opens, Interval::D1, day(1), day(5));
        assert_eq!(missing, vec![(day(1), day(2)), (day(4), day(5))]);
    }

    proptest! {
        /// 누락 구간을 전부 채우면 누락이 사라져야 한다 (갭 완전성).
        #[test]
        fn prop_filling_gaps_leaves_none(present in proptest::collection::vec(0u32..32, 0..32)) {
            let base = day(1);
            let step = Interval::H1.duration();
            let mut opens: Vec<_> = present.iter().map(|&i| base + step * (i as i32)).collect();
            opens.sort();
            opens.dedup();

            let end = base + step * 32;
            let missing = missing_periods(&opens, Interval::H1, base, end);

            // 보고된 구간의 모든 슬롯을 채워 넣는다
            let mut filled = opens.clone();
            for (gap_start, gap_end) in &missing {
                prop_assert!(gap_start < gap_end);
                let mut slot = *gap_start;
                while slot < *gap_end {
                    filled.push(slot);
                    slot += step;
                }
            }
            filled.sort();
            filled.dedup();

            prop_assert!(missing_periods(&filled, Interval::H1, base, end).is_empty());
        }
    }
}
