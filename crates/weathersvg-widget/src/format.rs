//! Weekday and date-time labels.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::preferences::TimeFormat;
use crate::translations::TranslationLanguage;

/// Format a local time as `(weekday, date and time)`.
pub fn format_date_time(
    datetime: NaiveDateTime,
    language: TranslationLanguage,
    time_format: TimeFormat,
) -> (String, String) {
    let weekday = language
        .weekday(datetime.weekday().num_days_from_monday() as usize)
        .to_string();

    let month = language.month_short(datetime.month0() as usize);
    let day = datetime.day();
    let hour = datetime.hour();
    let minute = datetime.minute();

    let date_time = match (language, time_format) {
        (TranslationLanguage::EnUs, TimeFormat::Native) => {
            format!(
                "{} {}, {}, {}",
                month,
                day,
                datetime.year(),
                en_clock_12h(hour, minute)
            )
        }
        (TranslationLanguage::EnUs, TimeFormat::H12) => {
            format!("{} {}, {}", month, day, en_clock_12h(hour, minute))
        }
        (TranslationLanguage::EnUs, TimeFormat::H24) => {
            format!("{} {}, {:02}:{:02}", month, day, hour, minute)
        }
        (TranslationLanguage::EnUs, TimeFormat::H24n) => {
            format!("{} {}, {}:{:02}", month, day, hour, minute)
        }
        (TranslationLanguage::JaJp, TimeFormat::Native) => {
            format!(
                "{}/{:02}/{:02} {}:{:02}",
                datetime.year(),
                datetime.month(),
                day,
                hour,
                minute
            )
        }
        (TranslationLanguage::JaJp, TimeFormat::H12) => {
            // Japanese 12-hour clocks run 0-11
            let period = if hour < 12 { "午前" } else { "午後" };
            format!("{}{}日 {}{}:{:02}", month, day, period, hour % 12, minute)
        }
        (TranslationLanguage::JaJp, TimeFormat::H24) => {
            format!("{}{}日 {:02}:{:02}", month, day, hour, minute)
        }
        (TranslationLanguage::JaJp, TimeFormat::H24n) => {
            format!("{}{}日 {}:{:02}", month, day, hour, minute)
        }
    };

    (weekday, date_time)
}

fn en_clock_12h(hour: u32, minute: u32) -> String {
    let period = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour, minute, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(hour, minute, 9)
            .unwrap()
    }

    fn en(time: NaiveDateTime, format: TimeFormat) -> (String, String) {
        format_date_time(time, TranslationLanguage::EnUs, format)
    }

    fn ja(time: NaiveDateTime, format: TimeFormat) -> (String, String) {
        format_date_time(time, TranslationLanguage::JaJp, format)
    }

    #[test]
    fn test_weekday() {
        assert_eq!(en(at(17, 7), TimeFormat::H12).0, "Wednesday");
        assert_eq!(ja(at(17, 7), TimeFormat::H12).0, "水曜日");
    }

    #[test]
    fn test_en_us_formats() {
        assert_eq!(en(at(17, 7), TimeFormat::Native).1, "Jan 3, 2024, 5:07 PM");
        assert_eq!(en(at(17, 7), TimeFormat::H12).1, "Jan 3, 5:07 PM");
        assert_eq!(en(at(0, 7), TimeFormat::H12).1, "Jan 3, 12:07 AM");
        assert_eq!(en(at(12, 30), TimeFormat::H12).1, "Jan 3, 12:30 PM");
        assert_eq!(en(at(5, 7), TimeFormat::H24).1, "Jan 3, 05:07");
        assert_eq!(en(at(5, 7), TimeFormat::H24n).1, "Jan 3, 5:07");
        assert_eq!(en(at(17, 7), TimeFormat::H24n).1, "Jan 3, 17:07");
    }

    #[test]
    fn test_ja_jp_formats() {
        assert_eq!(ja(at(17, 7), TimeFormat::Native).1, "2024/01/03 17:07");
        assert_eq!(ja(at(17, 7), TimeFormat::H12).1, "1月3日 午後5:07");
        assert_eq!(ja(at(0, 7), TimeFormat::H12).1, "1月3日 午前0:07");
        assert_eq!(ja(at(5, 7), TimeFormat::H24).1, "1月3日 05:07");
        assert_eq!(ja(at(5, 7), TimeFormat::H24n).1, "1月3日 5:07");
    }
}
