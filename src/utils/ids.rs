//! Random identifiers and codes.

use chrono::NaiveDateTime;
use rand::Rng;

const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LOWER_ALNUM: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn random_hex(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..16), 16).unwrap_or('0'))
        .collect()
}

fn random_from(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// `u_` followed by 16 lowercase hex chars.
pub fn user_id() -> String {
    format!("u_{}", random_hex(16))
}

/// `tpl_` followed by 12 lowercase hex chars.
pub fn template_id() -> String {
    format!("tpl_{}", random_hex(12))
}

pub fn share_code() -> String {
    random_from(LOWER_ALNUM, 8)
}

/// 8 chars drawn from `A-Z0-9`.
pub fn invitation_code() -> String {
    random_from(UPPER_ALNUM, 8)
}

/// `T` + `yyyymmddHHMMSS` + 6 random digits.
pub fn trade_no(at: NaiveDateTime) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("T{}{:06}", at.format("%Y%m%d%H%M%S"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_user_id_shape() {
        let id = user_id();
        assert_eq!(id.len(), 18);
        assert!(id.starts_with("u_"));
        assert!(id[2..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_template_id_shape() {
        let id = template_id();
        assert_eq!(id.len(), 16);
        assert!(id.starts_with("tpl_"));
    }

    #[test]
    fn test_invitation_code_alphabet() {
        for _ in 0..50 {
            let code = invitation_code();
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| UPPER_ALNUM.contains(&b)));
        }
    }

    #[test]
    fn test_trade_no_shape() {
        let at = NaiveDate::from_ymd_opt(2025, 8, 9)
            .unwrap()
            .and_hms_opt(10, 11, 12)
            .unwrap();
        let no = trade_no(at);
        assert_eq!(no.len(), 21);
        assert!(no.starts_with("T20250809101112"));
        assert!(no[15..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_share_code_length() {
        assert_eq!(share_code().len(), 8);
    }
}
