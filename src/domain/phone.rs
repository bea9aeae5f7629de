pub const PHONE_DIGITS: usize = 10;

/// Formats free-form phone input as `(XXX) XXX XX XX`.
///
/// Non-digits are dropped and anything past ten digits is cut off before
/// formatting. Partial input is formatted as far as it goes, so the result
/// can be written back into the field on every keystroke.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect();

    let mut value = digits;
    if value.len() >= 3 {
        value = format!("({}) {}", &value[..3], &value[3..]);
    }
    if value.len() >= 9 {
        value.insert(9, ' ');
    }
    if value.len() >= 12 {
        value.insert(12, ' ');
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_number() {
        assert_eq!(format_phone("5551234567"), "(555) 123 45 67");
    }

    #[test]
    fn test_strips_and_truncates() {
        assert_eq!(format_phone("555-123-4567"), "(555) 123 45 67");
        assert_eq!(format_phone("(555) 123 45 67"), "(555) 123 45 67");
        assert_eq!(format_phone("555123456789"), "(555) 123 45 67");
        assert_eq!(format_phone("tel: 555 abc 1234567 ext 9"), "(555) 123 45 67");
    }

    #[test]
    fn test_partial_input() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("55"), "55");
        assert_eq!(format_phone("555"), "(555) ");
        assert_eq!(format_phone("555123"), "(555) 123 ");
        assert_eq!(format_phone("55512345"), "(555) 123 45 ");
        assert_eq!(format_phone("555123456"), "(555) 123 45 6");
    }

    #[test]
    fn test_reformatting_is_stable() {
        let once = format_phone("5551234567");
        assert_eq!(format_phone(&once), once);
    }
}
