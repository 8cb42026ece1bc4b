//! Check-digit validation for the numeric identifier families.
//!
//! Every function guards its own input shape: a string of the wrong length or
//! containing anything but ASCII digits is reported as invalid, never a panic.

const IMEI_LEN: usize = 15;
const UPC_A_LEN: usize = 12;
const EAN13_LEN: usize = 13;

/// Parse a fixed-length all-digit string into its digit values.
fn digits<const N: usize>(text: &str) -> Option<[u8; N]> {
    let bytes = text.as_bytes();
    if bytes.len() != N {
        return None;
    }
    let mut out = [0u8; N];
    for (slot, &b) in out.iter_mut().zip(bytes) {
        if !b.is_ascii_digit() {
            return None;
        }
        *slot = b - b'0';
    }
    Some(out)
}

fn check_digit(sum: u32) -> u8 {
    ((10 - (sum % 10)) % 10) as u8
}

/// Luhn check over a 15-digit IMEI.
///
/// Digits at odd positions (0-indexed) among the first 14 are doubled, with 9
/// subtracted from any product above 9. The last digit must equal the
/// resulting check digit.
pub fn imei_checksum_valid(imei: &str) -> bool {
    let Some(d) = digits::<IMEI_LEN>(imei) else {
        return false;
    };

    let sum: u32 = d[..IMEI_LEN - 1]
        .iter()
        .enumerate()
        .map(|(i, &digit)| {
            let mut v = digit as u32;
            if i % 2 == 1 {
                v *= 2;
                if v > 9 {
                    v -= 9;
                }
            }
            v
        })
        .sum();

    check_digit(sum) == d[IMEI_LEN - 1]
}

/// Weighted mod-10 over the first `data.len()` digits: even positions x1, odd x3.
fn gtin_sum(data: &[u8]) -> u32 {
    data.iter()
        .enumerate()
        .map(|(i, &digit)| if i % 2 == 0 { digit as u32 } else { digit as u32 * 3 })
        .sum()
}

/// EAN-13 check digit over positions 0..=11, compared against position 12.
pub fn ean13_checksum_valid(ean: &str) -> bool {
    let Some(d) = digits::<EAN13_LEN>(ean) else {
        return false;
    };
    check_digit(gtin_sum(&d[..EAN13_LEN - 1])) == d[EAN13_LEN - 1]
}

/// UPC-A check digit.
///
/// A UPC-A is an EAN-13 with an implied leading zero, so the weighting is the
/// EAN-13 one shifted by a position: the first UPC digit carries weight 3.
pub fn upc_a_checksum_valid(upc: &str) -> bool {
    let Some(d) = digits::<UPC_A_LEN>(upc) else {
        return false;
    };

    let mut padded = [0u8; EAN13_LEN];
    padded[1..].copy_from_slice(&d);
    check_digit(gtin_sum(&padded[..EAN13_LEN - 1])) == padded[EAN13_LEN - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imei_known_valid() {
        assert!(imei_checksum_valid("490154203237518"));
        assert!(imei_checksum_valid("356938035643809"));
        assert!(imei_checksum_valid("352099001761481"));
    }

    #[test]
    fn test_imei_known_invalid() {
        assert!(!imei_checksum_valid("490154203237519"));
        assert!(!imei_checksum_valid("356938035643800"));
        assert!(!imei_checksum_valid("011111111111111"));
    }

    #[test]
    fn test_imei_rejects_bad_shape() {
        assert!(!imei_checksum_valid(""));
        assert!(!imei_checksum_valid("49015420323751"));
        assert!(!imei_checksum_valid("4901542032375180"));
        assert!(!imei_checksum_valid("49015420323751a"));
    }

    #[test]
    fn test_upc_a_vectors() {
        assert!(upc_a_checksum_valid("036000291452"));
        assert!(upc_a_checksum_valid("012345678905"));
        assert!(!upc_a_checksum_valid("036000291453"));
        assert!(!upc_a_checksum_valid("03600029145"));
    }

    #[test]
    fn test_ean13_vectors() {
        assert!(ean13_checksum_valid("4006381333931"));
        assert!(ean13_checksum_valid("5901234123457"));
        assert!(!ean13_checksum_valid("4006381333932"));
        assert!(!ean13_checksum_valid("400638133393X"));
    }

    #[test]
    fn test_upc_a_matches_ean13_with_leading_zero() {
        for upc in ["036000291452", "012345678905", "036000291453"] {
            let ean = format!("0{}", upc);
            assert_eq!(upc_a_checksum_valid(upc), ean13_checksum_valid(&ean));
        }
    }
}
