use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dialogue::answers::apply_single_answer;
use crate::dialogue::field::Field;
use crate::dialogue::promote::{promote_at, Promotion};
use crate::dialogue::questions::{next_question, RETRY_QUESTION};
use crate::domain::draft::OrderDraft;
use crate::domain::order::Order;
use crate::errors::DomainError;

/// One dialogue turn as the transport sees it: either the next question
/// together with the draft the caller must carry, or the finished order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Turn {
    Ask { question: String, field: Field, draft: OrderDraft },
    Done { order: Box<Order> },
}

/// First turn over a freshly extracted draft.
///
/// A draft that is dialogue-complete but strictly invalid gets a retry
/// prompt on the offending field when that field is addressable, otherwise
/// on the first canonical field; the validation error is handed back for
/// developer-side diagnostics and never shown to the end user.
pub fn begin(draft: OrderDraft, today: NaiveDate) -> (Turn, Option<DomainError>) {
    match promote_at(&draft, today) {
        Promotion::Complete(order) => (Turn::Done { order }, None),
        Promotion::Missing(missing) => {
            let field = missing.first().copied().unwrap_or(Field::BuyerName);
            (Turn::Ask { question: next_question(&field), field, draft }, None)
        }
        Promotion::Invalid(error) => {
            let field = error.field().parse().unwrap_or(Field::BuyerName);
            (Turn::Ask { question: RETRY_QUESTION.to_string(), field, draft }, Some(error))
        }
    }
}

/// Applies one answer to the declared field and computes the next turn.
///
/// When the updated draft is dialogue-complete but strictly invalid, the
/// same field is re-asked with a generic retry prompt: "still missing" and
/// "stored answer invalid" look identical to the end user by design.
pub fn advance(
    draft: &OrderDraft,
    field: Field,
    answer: &str,
    today: NaiveDate,
) -> (Turn, Option<DomainError>) {
    let updated = apply_single_answer(draft, field, answer);
    match promote_at(&updated, today) {
        Promotion::Complete(order) => (Turn::Done { order }, None),
        Promotion::Missing(missing) => {
            let next = missing.first().copied().unwrap_or(field);
            (Turn::Ask { question: next_question(&next), field: next, draft: updated }, None)
        }
        Promotion::Invalid(error) => (
            Turn::Ask { question: RETRY_QUESTION.to_string(), field, draft: updated },
            Some(error),
        ),
    }
}
