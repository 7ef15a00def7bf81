use lazy_static::lazy_static;
use regex::Regex;
use time::{format_description::FormatItem, macros::format_description, Date};

pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Strict 5-digit form, used by the job filter.
pub fn is_valid_zipcode(zip: &str) -> bool {
    lazy_static! {
        static ref ZIP_RE: Regex = Regex::new(r"^\d{5}$").unwrap();
    }
    ZIP_RE.is_match(zip)
}

pub fn parse_birthdate(s: &str) -> Option<Date> {
    Date::parse(s, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_plain_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@example.org"));
    }

    #[test]
    fn email_rejects_garbage() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@missing.local"));
    }

    #[test]
    fn zipcode_requires_exactly_five_digits() {
        assert!(is_valid_zipcode("90210"));
        assert!(!is_valid_zipcode("1234"));
        assert!(!is_valid_zipcode("123456"));
        assert!(!is_valid_zipcode("9021a"));
        assert!(!is_valid_zipcode(""));
    }

    #[test]
    fn birthdate_parses_iso_dates() {
        let d = parse_birthdate("1990-04-17").expect("valid date");
        assert_eq!(d.to_string(), "1990-04-17");
        assert!(parse_birthdate("17/04/1990").is_none());
        assert!(parse_birthdate("1990-13-01").is_none());
    }
}
