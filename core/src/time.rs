use chrono::{DateTime, Local, TimeZone};

/// Wall-clock line for the header, 12-hour `hh:mm:ss`.
pub fn clock_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%I:%M:%S").to_string()
}

/// Date line for the header, e.g. `Mar 18`.
pub fn clock_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%b %d").to_string()
}

/// Header clock state, refreshed by the UI tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    pub time: String,
    pub date: String,
}

impl Clock {
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            time: clock_time(now),
            date: clock_date(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn formats_afternoon_as_twelve_hour() {
        let at = Utc.with_ymd_and_hms(2024, 3, 18, 15, 4, 5).unwrap();
        let clock = Clock::at(&at);
        assert_eq!(clock.time, "03:04:05");
        assert_eq!(clock.date, "Mar 18");
    }

    #[test]
    fn pads_single_digit_day() {
        let at = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 9).unwrap();
        assert_eq!(clock_time(&at), "12:00:09");
        assert_eq!(clock_date(&at), "Jan 07");
    }
}
