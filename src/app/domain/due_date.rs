use time::{macros::format_description, Date};
use validator::ValidationError;

/// Calendar date in `YYYY-MM-DD` form, used for due dates and report dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate(Date);

impl DueDate {
    /// Parse a `YYYY-MM-DD` string. Surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let format = format_description!("[year]-[month]-[day]");
        Date::parse(value.trim(), &format).map(Self).map_err(|_| {
            let mut error = ValidationError::new("invalid_date");
            error.message = Some("Date must be formatted as YYYY-MM-DD".into());
            error
        })
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self(time::OffsetDateTime::now_utc().date())
    }

    /// Render for storage.
    pub fn as_string(&self) -> String {
        let format = format_description!("[year]-[month]-[day]");
        // Formatting a plain calendar date with this description cannot fail.
        self.0.format(&format).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = DueDate::parse("2026-03-09").unwrap();
        assert_eq!(date.as_string(), "2026-03-09");
    }

    #[test]
    fn trims_whitespace() {
        assert!(DueDate::parse(" 2026-12-31 ").is_ok());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(DueDate::parse("09/03/2026").is_err());
        assert!(DueDate::parse("2026-13-01").is_err());
        assert!(DueDate::parse("").is_err());
    }
}
