use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;

pub const DELETION_TOKEN_LEN: usize = 24;

pub fn validate_email(email: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    re.is_match(email)
}

/// Fixed 6-digit range, never zero-padded.
pub fn generate_otp_code() -> String {
    let mut rng = rand::thread_rng();
    let code: u32 = rng.gen_range(100_000..=999_999);
    code.to_string()
}

/// Opaque single-use credential handed out after a correct code. Long enough
/// to be unguessable within the 30-minute validity window; uniqueness is not
/// separately enforced.
pub fn generate_deletion_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DELETION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_code_is_six_digits_without_leading_zero() {
        for _ in 0..200 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn deletion_token_is_long_alphanumeric() {
        let token = generate_deletion_token();
        assert_eq!(token.len(), DELETION_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_deletion_token());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@x.com"));
        assert!(validate_email("user.name+tag@sub.dominio.es"));
        assert!(!validate_email("sin-arroba"));
        assert!(!validate_email("a@x"));
        assert!(!validate_email(""));
    }
}
