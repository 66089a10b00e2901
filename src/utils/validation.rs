use regex::Regex;

pub fn validate_email(email: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    re.is_match(email)
}

/// International format with country code, e.g. +250788123456.
pub fn validate_phone(phone: &str) -> bool {
    let re = Regex::new(r"^\+[1-9]\d{7,14}$").unwrap();
    re.is_match(phone)
}

/// At least 6 characters with one uppercase letter, one lowercase letter
/// and one digit.
pub fn validate_password(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(validate_email("test@example.com"));
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(!validate_email("invalid-email"));
        assert!(!validate_email("missing@tld"));
    }

    #[test]
    fn accepts_international_phone() {
        assert!(validate_phone("+250788123456"));
    }

    #[test]
    fn rejects_short_or_local_phone() {
        assert!(!validate_phone("123"));
        assert!(!validate_phone("0788123456"));
    }

    #[test]
    fn accepts_strong_password() {
        assert!(validate_password("Password123"));
    }

    #[test]
    fn rejects_weak_passwords() {
        assert!(!validate_password("password"));
        assert!(!validate_password("123"));
        assert!(!validate_password("short"));
    }
}
