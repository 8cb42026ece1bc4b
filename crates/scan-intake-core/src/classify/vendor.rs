pub const UNKNOWN_VENDOR: &str = "Unknown";

/// Vendor reported for retail product codes (UPC/EAN).
pub const PRODUCT_VENDOR: &str = "Product";

const TAC_VENDORS: &[(&str, &str)] = &[
    ("01", "Apple"),
    ("35", "Samsung"),
    ("86", "Huawei"),
    ("99", "Xiaomi"),
];

/// Map the two leading characters of an IMEI to a manufacturer name.
pub fn imei_vendor(imei: &str) -> &'static str {
    let Some(prefix) = imei.get(..2) else {
        return UNKNOWN_VENDOR;
    };

    TAC_VENDORS
        .iter()
        .find(|(tac, _)| *tac == prefix)
        .map(|(_, vendor)| *vendor)
        .unwrap_or(UNKNOWN_VENDOR)
}
