use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Twelve-hour display form, e.g. `2:05 PM` or `12:00 AM`.
pub fn format_display(time: NaiveTime) -> String {
    let hour = time.hour();
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, time.minute(), suffix)
}

/// Zero-padded 24-hour `HH:MM`, the format time fields are pre-filled with.
pub fn format_input_field(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

pub fn format_range(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "{} - {}",
        format_display(start.time()),
        format_display(end.time())
    )
}

/// One capsule of the horizontal date strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripDay {
    pub date: NaiveDate,
    pub day: String,
    pub weekday: String,
    pub active: bool,
}

/// Days from `today - before` through `today + after`, today marked active.
pub fn date_strip(today: NaiveDate, before: u32, after: u32) -> Vec<StripDay> {
    (-(before as i64)..=after as i64)
        .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
        .map(|date| StripDay {
            date,
            day: date.format("%d").to_string(),
            weekday: date.format("%a").to_string(),
            active: date == today,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn display_uses_twelve_hour_clock() {
        assert_eq!(format_display(hm(14, 5)), "2:05 PM");
        assert_eq!(format_display(hm(0, 0)), "12:00 AM");
        assert_eq!(format_display(hm(12, 30)), "12:30 PM");
        assert_eq!(format_display(hm(9, 0)), "9:00 AM");
        assert_eq!(format_display(hm(23, 59)), "11:59 PM");
    }

    #[test]
    fn input_field_is_zero_padded_24_hour() {
        assert_eq!(format_input_field(hm(9, 5)), "09:05");
        assert_eq!(format_input_field(hm(0, 0)), "00:00");
        assert_eq!(format_input_field(hm(21, 40)), "21:40");
    }

    #[test]
    fn range_joins_display_times() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let start = day.and_time(hm(10, 0));
        let end = day.succ_opt().unwrap().and_time(hm(1, 0));
        assert_eq!(format_range(start, end), "10:00 AM - 1:00 AM");
    }

    #[test]
    fn strip_spans_around_today() {
        // Monday 2024-05-06
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let strip = date_strip(today, 2, 4);
        assert_eq!(strip.len(), 7);
        assert_eq!(strip[0].date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
        assert_eq!(strip[0].weekday, "Sat");
        assert_eq!(strip[2].day, "06");
        assert_eq!(strip[2].weekday, "Mon");
        assert!(strip[2].active);
        assert_eq!(strip.iter().filter(|d| d.active).count(), 1);
        assert_eq!(strip[6].day, "10");
    }

    #[test]
    fn strip_crosses_month_boundaries() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let strip = date_strip(today, 2, 0);
        let days: Vec<&str> = strip.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["28", "29", "01"]);
    }
}
