//! 时间显示格式化

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// 列表中时间戳的显示格式
pub const DISPLAY_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// 由分钟偏移构造时区，超出范围时回退到 UTC
pub fn offset_from_minutes(offset_minutes: i32) -> FixedOffset {
    offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// 将 UTC 时间按固定偏移转换后格式化
pub fn format_at_offset(ts: DateTime<Utc>, offset_minutes: i32) -> String {
    ts.with_timezone(&offset_from_minutes(offset_minutes))
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// 解析 RFC 3339 字符串并格式化，无法解析时返回 None
pub fn format_rfc3339_at_offset(raw: &str, offset_minutes: i32) -> Option<String> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| format_at_offset(ts.with_timezone(&Utc), offset_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_positive_offset_crosses_midnight() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 31, 20, 15, 0).unwrap();
        assert_eq!(format_at_offset(ts, 330), "01 Apr 2024, 01:45 AM");
    }

    #[test]
    fn test_negative_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(format_at_offset(ts, -300), "31 Dec 2023, 10:00 PM");
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_at_offset(ts, 100_000), "01 Jun 2024, 12:00 PM");
    }

    #[test]
    fn test_rfc3339_input() {
        assert_eq!(
            format_rfc3339_at_offset("2024-06-01T12:00:00Z", 60).as_deref(),
            Some("01 Jun 2024, 01:00 PM")
        );
        assert_eq!(format_rfc3339_at_offset("not a timestamp", 0), None);
    }
}
