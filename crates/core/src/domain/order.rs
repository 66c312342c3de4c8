use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::draft::{OrderDraft, OrderItemDraft, PartyDraft};
use crate::errors::DomainError;
use crate::normalize::{normalize_currency, normalize_payment_method};

pub const DEFAULT_TEMPLATE_ID: &str = "invoice_default_v1";
pub const DEFAULT_TAX_RATE_PCT: u32 = 10;

/// Money fields carry at most 12 total digits.
const MAX_MONEY_DIGITS: u32 = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "JPY")]
    Jpy,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpy => "JPY",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "JPY" => Ok(Self::Jpy),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            other => Err(DomainError::validation(
                "currency",
                format!("unsupported currency `{other}` (expected JPY|USD|EUR)"),
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "CARD")]
    Card,
    #[default]
    #[serde(rename = "BANK_TRANSFER")]
    BankTransfer,
    #[serde(rename = "CASH")]
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Cash => "CASH",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CARD" => Ok(Self::Card),
            "BANK_TRANSFER" => Ok(Self::BankTransfer),
            "CASH" => Ok(Self::Cash),
            other => Err(DomainError::validation(
                "payment_method",
                format!("unsupported payment method `{other}` (expected CARD|BANK_TRANSFER|CASH)"),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    pub qty: u32,
    pub unit_price: Decimal,
    pub discount: Decimal,
}

impl OrderItem {
    pub fn amount(&self) -> Decimal {
        self.unit_price * Decimal::from(self.qty) - self.discount
    }

    fn from_draft(index: usize, draft: &OrderItemDraft) -> Result<Self, DomainError> {
        let sku = required_text(&format!("items[{index}].sku"), draft.sku.as_deref())?;
        let name = required_text(&format!("items[{index}].name"), draft.name.as_deref())?;

        let qty_field = format!("items[{index}].qty");
        let qty = draft
            .qty
            .filter(|qty| *qty > 0)
            .ok_or_else(|| DomainError::validation(&*qty_field, "a positive integer is required"))?;
        let qty = u32::try_from(qty)
            .map_err(|_| DomainError::validation(&*qty_field, "exceeds the supported range"))?;

        let unit_price = draft
            .unit_price
            .ok_or_else(|| DomainError::validation(format!("items[{index}].unit_price"), "required"))?;
        let unit_price =
            money(&format!("items[{index}].unit_price"), unit_price, MoneyBound::Positive)?;

        let discount = match draft.discount {
            Some(discount) => {
                money(&format!("items[{index}].discount"), discount, MoneyBound::NonNegative)?
            }
            None => Decimal::ZERO,
        };

        Ok(Self { sku, name, qty, unit_price, discount })
    }
}

/// Fully validated, immutable order record. Constructed exactly once, at
/// promotion; the derived totals are computed on demand and never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub issue_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub seller: Party,
    pub buyer: Party,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub tax_rate_pct: Decimal,
    pub shipping_fee: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Order {
    /// Flattens a draft into a strict order: unset fields get their
    /// documented defaults, `issue_date` falls back to `today`, and the
    /// currency/payment synonym maps are re-applied defensively since a
    /// value may have entered the draft straight from extraction rather
    /// than through the answer normalizer.
    pub fn from_draft(draft: &OrderDraft, today: NaiveDate) -> Result<Self, DomainError> {
        let seller = require_party("seller", draft.seller.as_ref())?;
        let buyer = require_party("buyer", draft.buyer.as_ref())?;

        let currency = match draft.currency.as_deref() {
            Some(raw) => normalize_currency(raw).parse()?,
            None => Currency::default(),
        };
        let payment_method = match draft.payment_method.as_deref() {
            Some(raw) => normalize_payment_method(raw).parse()?,
            None => PaymentMethod::default(),
        };

        let item_drafts = draft.items.as_deref().unwrap_or_default();
        if item_drafts.is_empty() {
            return Err(DomainError::validation("items", "at least one item is required"));
        }
        let items = item_drafts
            .iter()
            .enumerate()
            .map(|(index, item)| OrderItem::from_draft(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        let tax_rate_pct = match draft.tax_rate_pct {
            Some(rate) => tax_rate(rate)?,
            None => Decimal::from(DEFAULT_TAX_RATE_PCT),
        };
        let shipping_fee = match draft.shipping_fee {
            Some(fee) => money("shipping_fee", fee, MoneyBound::NonNegative)?,
            None => Decimal::ZERO,
        };

        Ok(Self {
            template_id: draft
                .template_id
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string()),
            order_id: draft.order_id.clone(),
            issue_date: draft.issue_date.unwrap_or(today),
            due_date: draft.due_date,
            seller,
            buyer,
            currency,
            payment_method,
            items,
            tax_rate_pct,
            shipping_fee,
            notes: draft.notes.clone(),
        })
    }

    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::amount).sum()
    }

    pub fn tax_amount(&self) -> Decimal {
        self.items_total() * self.tax_rate_pct / Decimal::ONE_HUNDRED
    }

    pub fn grand_total(&self) -> Decimal {
        self.items_total() + self.tax_amount() + self.shipping_fee
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MoneyBound {
    Positive,
    NonNegative,
}

fn require_party(field: &str, party: Option<&PartyDraft>) -> Result<Party, DomainError> {
    let name_field = format!("{field}.name");
    let draft =
        party.ok_or_else(|| DomainError::validation(&*name_field, "required"))?;
    let name = draft
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DomainError::validation(&*name_field, "required"))?;

    Ok(Party {
        name: name.to_string(),
        email: draft.email.clone(),
        phone: draft.phone.clone(),
        address: draft.address.clone(),
        tax_id: draft.tax_id.clone(),
    })
}

fn required_text(field: &str, value: Option<&str>) -> Result<String, DomainError> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DomainError::validation(field, "required"))
}

/// Validates a money amount: bound check, at most 2 fractional digits, at
/// most 12 total digits. The result is rescaled to exactly 2 places.
fn money(field: &str, value: Decimal, bound: MoneyBound) -> Result<Decimal, DomainError> {
    match bound {
        MoneyBound::Positive if value <= Decimal::ZERO => {
            return Err(DomainError::validation(field, "must be greater than zero"));
        }
        MoneyBound::NonNegative if value < Decimal::ZERO => {
            return Err(DomainError::validation(field, "must not be negative"));
        }
        _ => {}
    }

    let normalized = value.normalize();
    if normalized.scale() > 2 {
        return Err(DomainError::validation(field, "at most 2 decimal places are allowed"));
    }
    let mut scaled = normalized;
    scaled.rescale(2);
    if scaled.mantissa().unsigned_abs() >= 10u128.pow(MAX_MONEY_DIGITS) {
        return Err(DomainError::validation(
            field,
            format!("exceeds {MAX_MONEY_DIGITS} total digits"),
        ));
    }
    Ok(scaled)
}

fn tax_rate(value: Decimal) -> Result<Decimal, DomainError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(DomainError::validation("tax_rate_pct", "must be between 0 and 100"));
    }
    if value.normalize().scale() > 2 {
        return Err(DomainError::validation("tax_rate_pct", "at most 2 decimal places are allowed"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::domain::draft::{OrderDraft, OrderItemDraft, PartyDraft};
    use crate::errors::DomainError;

    use super::{Currency, Order, PaymentMethod, DEFAULT_TEMPLATE_ID};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date")
    }

    fn named(name: &str) -> PartyDraft {
        PartyDraft { name: Some(name.to_string()), ..PartyDraft::default() }
    }

    fn complete_draft() -> OrderDraft {
        OrderDraft {
            seller: Some(named("テスト物産")),
            buyer: Some(named("ABC Corp")),
            currency: Some("JPY".to_string()),
            payment_method: Some("CARD".to_string()),
            items: Some(vec![OrderItemDraft {
                sku: Some("X1".to_string()),
                name: Some("Widget".to_string()),
                qty: Some(3),
                unit_price: Some(Decimal::new(10000, 2)),
                discount: None,
            }]),
            ..OrderDraft::default()
        }
    }

    #[test]
    fn computes_exact_totals_at_the_default_tax_rate() {
        let order = Order::from_draft(&complete_draft(), today()).expect("order");

        assert_eq!(order.items_total(), Decimal::new(30000, 2));
        assert_eq!(order.tax_amount(), Decimal::new(3000, 2));
        assert_eq!(order.grand_total(), Decimal::new(33000, 2));
    }

    #[test]
    fn applies_documented_defaults() {
        let mut draft = complete_draft();
        draft.currency = None;
        draft.payment_method = None;
        let order = Order::from_draft(&draft, today()).expect("order");

        assert_eq!(order.template_id, DEFAULT_TEMPLATE_ID);
        assert_eq!(order.currency, Currency::Jpy);
        assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(order.tax_rate_pct, Decimal::from(10));
        assert_eq!(order.shipping_fee, Decimal::ZERO);
        assert_eq!(order.issue_date, today());
    }

    #[test]
    fn rejects_a_missing_seller_name() {
        let mut draft = complete_draft();
        draft.seller = Some(named("   "));
        let error = Order::from_draft(&draft, today()).expect_err("blank seller");
        assert_eq!(error.field(), "seller.name");
    }

    #[test]
    fn rejects_a_nonpositive_quantity() {
        let mut draft = complete_draft();
        draft.items.as_mut().expect("items")[0].qty = Some(0);
        let error = Order::from_draft(&draft, today()).expect_err("zero qty");
        assert_eq!(error.field(), "items[0].qty");
    }

    #[test]
    fn rejects_prices_with_more_than_two_decimal_places() {
        let mut draft = complete_draft();
        draft.items.as_mut().expect("items")[0].unit_price = Some(Decimal::new(100125, 3));
        let error = Order::from_draft(&draft, today()).expect_err("3 decimal places");
        assert_eq!(error.field(), "items[0].unit_price");
    }

    #[test]
    fn rejects_prices_beyond_the_digit_limit() {
        let mut draft = complete_draft();
        // 13 total digits: 99_999_999_999.99
        draft.items.as_mut().expect("items")[0].unit_price = Some(Decimal::new(9_999_999_999_999, 2));
        let error = Order::from_draft(&draft, today()).expect_err("too many digits");
        assert_eq!(error.field(), "items[0].unit_price");
    }

    #[test]
    fn rejects_an_out_of_range_tax_rate() {
        let mut draft = complete_draft();
        draft.tax_rate_pct = Some(Decimal::from(120));
        let error = Order::from_draft(&draft, today()).expect_err("tax rate");
        assert_eq!(error.field(), "tax_rate_pct");
    }

    #[test]
    fn rejects_an_unmapped_currency_with_a_field_level_reason() {
        let mut draft = complete_draft();
        draft.currency = Some("GBP".to_string());
        let error = Order::from_draft(&draft, today()).expect_err("currency");
        assert!(matches!(error, DomainError::Validation { ref field, .. } if field == "currency"));
    }

    #[test]
    fn renormalizes_extraction_supplied_synonyms() {
        let mut draft = complete_draft();
        draft.currency = Some("円".to_string());
        draft.payment_method = Some("振込".to_string());
        let order = Order::from_draft(&draft, today()).expect("order");

        assert_eq!(order.currency, Currency::Jpy);
        assert_eq!(order.payment_method, PaymentMethod::BankTransfer);
    }

    #[test]
    fn rejects_an_empty_item_list() {
        let mut draft = complete_draft();
        draft.items = Some(Vec::new());
        let error = Order::from_draft(&draft, today()).expect_err("no items");
        assert_eq!(error.field(), "items");
    }

    #[test]
    fn discounts_reduce_the_items_total() {
        let mut draft = complete_draft();
        draft.items.as_mut().expect("items")[0].discount = Some(Decimal::new(5000, 2));
        let order = Order::from_draft(&draft, today()).expect("order");

        assert_eq!(order.items_total(), Decimal::new(25000, 2));
    }
}
