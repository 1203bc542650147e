//! Calendar conversions for container entry times and table header dates

use chrono::{DateTime, Datelike, Timelike, Utc};

/// A UTC instant with whole-second precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Seconds since the Unix epoch; values past chrono's range saturate
    pub fn from_unix(secs: u64) -> Self {
        let datetime = i64::try_from(secs)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(datetime)
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    pub fn as_unix(self) -> u64 {
        self.0.timestamp().max(0) as u64
    }

    pub fn datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Table header date: years since 1900, month, day
    pub fn table_date(self) -> (u8, u8, u8) {
        let years = (self.0.year() - 1900).clamp(0, 255) as u8;
        (years, self.0.month() as u8, self.0.day() as u8)
    }

    /// MS-DOS `(time, date)` pair. Years before 1980 clamp to 1980-01-01.
    pub fn to_dos(self) -> (u16, u16) {
        let t = self.0;
        if t.year() < 1980 {
            return (0, (1 << 5) | 1);
        }
        let year = (t.year() - 1980).min(127) as u16;
        let time = ((t.hour() as u16) << 11) | ((t.minute() as u16) << 5) | (t.second() as u16 / 2);
        let date = (year << 9) | ((t.month() as u16) << 5) | t.day() as u16;
        (time, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch() {
        let t = Timestamp::from_unix(0);
        assert_eq!(t.datetime(), Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(t.table_date(), (70, 1, 1));
        assert_eq!(t.as_unix(), 0);
    }

    #[test]
    fn test_known_dates() {
        let leap = Timestamp::from_unix(951_827_696);
        assert_eq!(
            leap.datetime(),
            Utc.with_ymd_and_hms(2000, 2, 29, 12, 34, 56).unwrap()
        );
        assert_eq!(leap.table_date(), (100, 2, 29));

        assert_eq!(Timestamp::from_unix(1_714_694_400).table_date(), (124, 5, 3));
    }

    #[test]
    fn test_dos_encoding() {
        let (time, date) = Timestamp::from_unix(1_714_694_400).to_dos();
        assert_eq!(time, 0);
        assert_eq!(date >> 9, 44);
        assert_eq!((date >> 5) & 0x0F, 5);
        assert_eq!(date & 0x1F, 3);

        let (time, _) = Timestamp::from_unix(951_827_696).to_dos();
        assert_eq!(time, (12 << 11) | (34 << 5) | 28);

        assert_eq!(Timestamp::from_unix(0).to_dos(), (0, 0x21));
    }

    #[test]
    fn test_out_of_range_saturates() {
        let t = Timestamp::from_unix(u64::MAX);
        assert_eq!(t.datetime(), DateTime::<Utc>::MAX_UTC);
        assert_eq!(t.table_date().0, 255);
    }

    #[test]
    fn test_now_drops_subseconds() {
        assert_eq!(Timestamp::now().datetime().nanosecond(), 0);
    }
}
