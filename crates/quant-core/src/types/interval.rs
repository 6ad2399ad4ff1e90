//! 캔들 간격 정의.
//!
//! 지원되는 캔들 간격의 고정 집합과 각 간격의 정확한 시간 폭을 정의합니다.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    /// 1분봉
    #[serde(rename = "1m")]
    M1,
    /// 5분봉
    #[serde(rename = "5m")]
    M5,
    /// 15분봉
    #[serde(rename = "15m")]
    M15,
    /// 1시간봉
    #[serde(rename = "1h")]
    H1,
    /// 4시간봉
    #[serde(rename = "4h")]
    H4,
    /// 일봉
    #[serde(rename = "1d")]
    D1,
    /// 주봉
    #[serde(rename = "1w")]
    W1,
}

impl Interval {
    /// 지원되는 모든 간격 (짧은 것부터).
    pub const ALL: [Interval; 7] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::H1,
        Interval::H4,
        Interval::D1,
        Interval::W1,
    ];

    /// 이 간격의 시간 폭을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Interval::M1 => Duration::minutes(1),
            Interval::M5 => Duration::minutes(5),
            Interval::M15 => Duration::minutes(15),
            Interval::H1 => Duration::hours(1),
            Interval::H4 => Duration::hours(4),
            Interval::D1 => Duration::days(1),
            Interval::W1 => Duration::weeks(1),
        }
    }

    /// 이 간격의 초 단위 값을 반환합니다.
    pub fn as_secs(&self) -> i64 {
        self.duration().num_seconds()
    }

    /// 거래소 간격 코드로 변환합니다.
    pub fn code(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::D1 => "1d",
            Interval::W1 => "1w",
        }
    }

    /// 거래소 간격 코드에서 파싱합니다.
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Interval::M1),
            "5m" => Some(Interval::M5),
            "15m" => Some(Interval::M15),
            "1h" => Some(Interval::H1),
            "4h" => Some(Interval::H4),
            "1d" => Some(Interval::D1),
            "1w" => Some(Interval::W1),
            _ => None,
        }
    }

    /// 이 간격의 캔들 마감 이벤트 채널 이름.
    pub fn channel(&self) -> &'static str {
        match self {
            Interval::M1 => "candle:1m",
            Interval::M5 => "candle:5m",
            Interval::M15 => "candle:15m",
            Interval::H1 => "candle:1h",
            Interval::H4 => "candle:4h",
            Interval::D1 => "candle:1d",
            Interval::W1 => "candle:1w",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("Invalid interval: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_duration() {
        assert_eq!(Interval::M1.as_secs(), 60);
        assert_eq!(Interval::M15.as_secs(), 15 * 60);
        assert_eq!(Interval::H1.as_secs(), 3600);
        assert_eq!(Interval::H4.as_secs(), 4 * 3600);
        assert_eq!(Interval::D1.as_secs(), 86400);
        assert_eq!(Interval::W1.as_secs(), 7 * 86400);
    }

    #[test]
    fn test_interval_code_roundtrip() {
        for interval in Interval::ALL {
            assert_eq!(Interval::from_code(interval.code()), Some(interval));
        }
        assert_eq!(Interval::from_code("3m"), None);
    }

    #[test]
    fn test_interval_from_str() {
        assert_eq!("5m".parse::<Interval>().unwrap(), Interval::M5);
        assert!("2h".parse::<Interval>().is_err());
    }

    #[test]
    fn test_interval_all_sorted() {
        for window in Interval::ALL.windows(2) {
            assert!(window[0].duration() < window[1].duration());
        }
    }

    #[test]
    fn test_channel_names_unique() {
        for (i, a) in Interval::ALL.iter().enumerate() {
            for b in Interval::ALL.iter().skip(i + 1) {
                assert_ne!(a.channel(), b.channel());
            }
        }
    }
}
