use chrono::NaiveDate;

use crate::dialogue::field::Field;
use crate::dialogue::missing::calc_missing;
use crate::domain::draft::OrderDraft;
use crate::domain::order::Order;
use crate::errors::DomainError;

/// Outcome of attempting to promote a draft into a strict order.
///
/// `Invalid` separates "dialogue-complete but a stored value fails strict
/// validation" from plain missing fields, so an unsatisfiable draft is
/// diagnosable. The transport still collapses it into a re-ask toward the
/// end user; the reason goes to developer-side logs only.
#[derive(Clone, Debug, PartialEq)]
pub enum Promotion {
    /// Dialogue-required fields are still absent; never empty.
    Missing(Vec<Field>),
    /// Every dialogue-required field is present, but strict construction
    /// rejected a value.
    Invalid(DomainError),
    /// The draft promoted cleanly.
    Complete(Box<Order>),
}

/// Runs the missing-field analysis and, when nothing is missing, attempts
/// strict construction with `issue_date` defaulting to `today`.
pub fn promote_at(draft: &OrderDraft, today: NaiveDate) -> Promotion {
    let missing = calc_missing(draft);
    if !missing.is_empty() {
        return Promotion::Missing(missing);
    }
    match Order::from_draft(draft, today) {
        Ok(order) => Promotion::Complete(Box::new(order)),
        Err(error) => Promotion::Invalid(error),
    }
}

/// Binary view of [`promote_at`]: a strict-validation failure reads the same
/// as "not complete".
pub fn to_order_if_complete(draft: &OrderDraft, today: NaiveDate) -> (bool, Option<Order>) {
    match promote_at(draft, today) {
        Promotion::Complete(order) => (true, Some(*order)),
        Promotion::Missing(_) | Promotion::Invalid(_) => (false, None),
    }
}
