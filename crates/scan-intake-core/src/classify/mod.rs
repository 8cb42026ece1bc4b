pub mod checksum;
pub mod vendor;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use checksum::{ean13_checksum_valid, imei_checksum_valid, upc_a_checksum_valid};
pub use vendor::{imei_vendor, PRODUCT_VENDOR, UNKNOWN_VENDOR};

lazy_static! {
    static ref IMEI_RE: Regex = Regex::new(r"^[0-9]{15}$").unwrap();
    static ref MEID_RE: Regex = Regex::new(r"^[0-9A-Fa-f]{14}$").unwrap();
    static ref UPC_A_RE: Regex = Regex::new(r"^[0-9]{12}$").unwrap();
    static ref UPC_E_RE: Regex = Regex::new(r"^[0-9]{8}$").unwrap();
    static ref EAN13_RE: Regex = Regex::new(r"^[0-9]{13}$").unwrap();
}

/// Identifier family recognised from the shape of decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarcodeType {
    #[serde(rename = "IMEI")]
    Imei,
    #[serde(rename = "MEID")]
    Meid,
    #[serde(rename = "UPC-A")]
    UpcA,
    #[serde(rename = "UPC-E")]
    UpcE,
    #[serde(rename = "EAN-13")]
    Ean13,
    Unknown,
}

impl BarcodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeType::Imei => "IMEI",
            BarcodeType::Meid => "MEID",
            BarcodeType::UpcA => "UPC-A",
            BarcodeType::UpcE => "UPC-E",
            BarcodeType::Ean13 => "EAN-13",
            BarcodeType::Unknown => "Unknown",
        }
    }

    /// Device identifiers (IMEI/MEID) as opposed to retail product codes.
    pub fn is_device_id(&self) -> bool {
        matches!(self, BarcodeType::Imei | BarcodeType::Meid)
    }

    pub fn is_product_code(&self) -> bool {
        matches!(
            self,
            BarcodeType::UpcA | BarcodeType::UpcE | BarcodeType::Ean13
        )
    }
}

impl fmt::Display for BarcodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BarcodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IMEI" => Ok(BarcodeType::Imei),
            "MEID" => Ok(BarcodeType::Meid),
            "UPC-A" => Ok(BarcodeType::UpcA),
            "UPC-E" => Ok(BarcodeType::UpcE),
            "EAN-13" => Ok(BarcodeType::Ean13),
            "Unknown" => Ok(BarcodeType::Unknown),
            other => Err(format!("unknown barcode type '{}'", other)),
        }
    }
}

/// Result of classifying one decoded string.
///
/// `is_valid` reflects the shape match only; the check digit outcome is
/// reported separately in `checksum_valid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub barcode_type: BarcodeType,
    pub is_valid: bool,
    pub vendor: &'static str,
    pub checksum_valid: bool,
}

impl Classification {
    fn matched(barcode_type: BarcodeType, vendor: &'static str, checksum_valid: bool) -> Self {
        Self {
            barcode_type,
            is_valid: true,
            vendor,
            checksum_valid,
        }
    }

    fn unknown() -> Self {
        Self {
            barcode_type: BarcodeType::Unknown,
            is_valid: false,
            vendor: UNKNOWN_VENDOR,
            checksum_valid: false,
        }
    }
}

/// Classify raw decoder output. Total over all inputs; never fails.
///
/// Surrounding whitespace is trimmed, then the shape rules are tried in
/// priority order: IMEI, MEID, UPC-A, UPC-E, EAN-13. MEID and UPC-E have no
/// check digit algorithm here and always report `checksum_valid = true`.
pub fn classify(raw: &str) -> Classification {
    let text = raw.trim();

    if IMEI_RE.is_match(text) {
        Classification::matched(
            BarcodeType::Imei,
            imei_vendor(text),
            imei_checksum_valid(text),
        )
    } else if MEID_RE.is_match(text) {
        Classification::matched(BarcodeType::Meid, UNKNOWN_VENDOR, true)
    } else if UPC_A_RE.is_match(text) {
        Classification::matched(BarcodeType::UpcA, PRODUCT_VENDOR, upc_a_checksum_valid(text))
    } else if UPC_E_RE.is_match(text) {
        Classification::matched(BarcodeType::UpcE, PRODUCT_VENDOR, true)
    } else if EAN13_RE.is_match(text) {
        Classification::matched(BarcodeType::Ean13, PRODUCT_VENDOR, ean13_checksum_valid(text))
    } else {
        Classification::unknown()
    }
}
