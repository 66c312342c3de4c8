use std::str::FromStr;

use rust_decimal::Decimal;

use crate::dialogue::field::{Field, ItemField};
use crate::domain::draft::OrderDraft;
use crate::normalize::{normalize_currency, normalize_payment_method};

/// Applies one raw user answer to exactly one field and returns the updated
/// draft. The input draft is never touched; missing intermediate structures
/// (seller, buyer, the targeted item) are default-constructed only when an
/// answer actually parses. A parse failure leaves the field unset, so it
/// simply reappears in the next missing-field computation. That is the
/// dialogue's retry mechanism; nothing here ever fails.
pub fn apply_single_answer(draft: &OrderDraft, field: Field, raw: &str) -> OrderDraft {
    let mut updated = draft.clone();
    let text = raw.trim();

    match field {
        Field::SellerName => {
            if !text.is_empty() {
                updated.seller_mut().name = Some(text.to_string());
            }
        }
        Field::BuyerName => {
            if !text.is_empty() {
                updated.buyer_mut().name = Some(text.to_string());
            }
        }
        Field::Currency => {
            if !text.is_empty() {
                updated.currency = Some(normalize_currency(text));
            }
        }
        Field::PaymentMethod => {
            if !text.is_empty() {
                updated.payment_method = Some(normalize_payment_method(text));
            }
        }
        Field::Item { index, attr: ItemField::Sku } => {
            if !text.is_empty() {
                updated.item_mut(index).sku = Some(text.to_string());
            }
        }
        Field::Item { index, attr: ItemField::Name } => {
            if !text.is_empty() {
                updated.item_mut(index).name = Some(text.to_string());
            }
        }
        Field::Item { index, attr: ItemField::Qty } => {
            if let Some(qty) = parse_quantity(text) {
                updated.item_mut(index).qty = Some(qty);
            }
        }
        Field::Item { index, attr: ItemField::UnitPrice } => {
            if let Some(amount) = parse_amount(text) {
                updated.item_mut(index).unit_price = Some(amount);
            }
        }
        Field::Item { index, attr: ItemField::Discount } => {
            if let Some(amount) = parse_amount(text) {
                updated.item_mut(index).discount = Some(amount);
            }
        }
    }

    updated
}

/// Strips everything but digits and the sign, so "3個" parses while "-3"
/// stays negative and is rejected by the positivity check.
fn parse_quantity(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '-').collect();
    let qty = cleaned.parse::<i64>().ok()?;
    (qty > 0).then_some(qty)
}

/// Strips everything but digits and the decimal point ("8,000円" parses as 8000).
/// A result with more than one point fails the decimal parse and is dropped.
fn parse_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
