//! Canonical synonym tables for currency and payment-method text.
//!
//! This is the single source of truth: the per-field answer normalizer and
//! the promoter's defensive re-normalization pass both call these functions.
//! Unrecognized text passes through so strict validation can reject it with
//! a field-level reason.

/// Uppercases, strips an enum-style `Currency.` prefix, then maps localized
/// synonyms to the canonical ISO code.
pub fn normalize_currency(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let code = upper.strip_prefix("CURRENCY.").unwrap_or(&upper);
    match code {
        "JPY" | "円" | "日本円" => "JPY".to_string(),
        "USD" | "ドル" => "USD".to_string(),
        "EUR" | "ユーロ" => "EUR".to_string(),
        _ => code.to_string(),
    }
}

/// Maps localized payment wording to the canonical code; canonical codes
/// themselves are accepted case-insensitively.
pub fn normalize_payment_method(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed {
        "銀行振込" | "振込" => return "BANK_TRANSFER".to_string(),
        "クレジットカード" | "カード" => return "CARD".to_string(),
        "現金" => return "CASH".to_string(),
        _ => {}
    }
    let upper = trimmed.to_uppercase();
    let code = upper.strip_prefix("PAYMENTMETHOD.").unwrap_or(&upper);
    match code {
        "CARD" | "BANK_TRANSFER" | "CASH" => code.to_string(),
        _ => trimmed.to_string(),
    }
}
