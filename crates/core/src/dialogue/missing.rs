use crate::dialogue::field::{Field, ItemField};
use crate::domain::draft::{OrderDraft, OrderItemDraft, PartyDraft};

/// Computes the ordered set of dialogue-required fields absent from a draft.
///
/// This is the dialogue-level requiredness check, deliberately weaker than
/// strict order validation: it only asks whether a value is present and
/// non-empty (a quantity must additionally be positive), never whether it
/// would survive the digit-limit or enum-membership rules. The order is
/// fixed so `missing[0]` is a well-defined next question: buyer, seller,
/// each item's sku/name/qty/unit_price, then currency and payment method.
pub fn calc_missing(draft: &OrderDraft) -> Vec<Field> {
    let mut missing = Vec::new();

    if !party_named(draft.buyer.as_ref()) {
        missing.push(Field::BuyerName);
    }
    if !party_named(draft.seller.as_ref()) {
        missing.push(Field::SellerName);
    }

    match draft.items.as_deref() {
        None | Some([]) => missing_item_fields(&mut missing, 0, &OrderItemDraft::default()),
        Some(items) => {
            for (index, item) in items.iter().enumerate() {
                missing_item_fields(&mut missing, index, item);
            }
        }
    }

    if !text_present(draft.currency.as_deref()) {
        missing.push(Field::Currency);
    }
    if !text_present(draft.payment_method.as_deref()) {
        missing.push(Field::PaymentMethod);
    }

    missing
}

fn missing_item_fields(missing: &mut Vec<Field>, index: usize, item: &OrderItemDraft) {
    if !text_present(item.sku.as_deref()) {
        missing.push(Field::Item { index, attr: ItemField::Sku });
    }
    if !text_present(item.name.as_deref()) {
        missing.push(Field::Item { index, attr: ItemField::Name });
    }
    if item.qty.map_or(true, |qty| qty <= 0) {
        missing.push(Field::Item { index, attr: ItemField::Qty });
    }
    if item.unit_price.is_none() {
        missing.push(Field::Item { index, attr: ItemField::UnitPrice });
    }
}

fn party_named(party: Option<&PartyDraft>) -> bool {
    party
        .and_then(|party| party.name.as_deref())
        .is_some_and(|name| !name.trim().is_empty())
}

fn text_present(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}
