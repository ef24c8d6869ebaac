use std::time::SystemTime;

pub type LocalTime = chrono::DateTime<chrono::Local>;
pub type UtcTime = chrono::DateTime<chrono::Utc>;

pub static DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.3f";
pub static DEFAULT_HTTP_HEADER_TIME_LAYOUT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[inline]
pub fn now() -> LocalTime {
    chrono::Local::now()
}

#[inline]
pub fn utc() -> UtcTime {
    chrono::Utc::now()
}

/// Current time as an IMF-fixdate, the format of the `Date` header.
#[inline]
pub fn http_date() -> String {
    utc().format(DEFAULT_HTTP_HEADER_TIME_LAYOUT).to_string()
}

pub fn fmtlocal(st: SystemTime, layout: &str) -> String {
    let layout = if layout.is_empty() {
        DEFAULT_TIME_LAYOUT
    } else {
        layout
    };
    LocalTime::from(st).format(layout).to_string()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn http_date_layout() {
        let txt = super::http_date();
        assert!(txt.ends_with(" GMT"));
        assert_eq!(txt.len(), "Sun, 06 Nov 1994 08:49:37 GMT".len());
        let t = chrono::DateTime::<chrono::Utc>::from(UNIX_EPOCH + Duration::from_secs(784111777));
        assert_eq!(
            t.format(super::DEFAULT_HTTP_HEADER_TIME_LAYOUT).to_string(),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }
}
