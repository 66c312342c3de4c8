//! Orderflow core: the draft/validation/dialogue engine.
//!
//! Raw order requests arrive as untrusted model output. `extract` pulls a
//! JSON object out of it, `domain::draft` holds the fully-optional working
//! copy, and the `dialogue` modules drive a one-question-per-turn loop until
//! the draft can be promoted into an immutable, strictly validated
//! [`Order`]. Everything here is pure and synchronous; the LLM call and the
//! HTTP transport live in the `orderflow-agent` and `orderflow-server`
//! crates.

pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod normalize;

pub use dialogue::answers::apply_single_answer;
pub use dialogue::engine::{advance, begin, Turn};
pub use dialogue::field::{Field, FieldParseError, ItemField};
pub use dialogue::missing::calc_missing;
pub use dialogue::promote::{promote_at, to_order_if_complete, Promotion};
pub use dialogue::questions::{next_question, RETRY_QUESTION};
pub use domain::draft::{OrderDraft, OrderItemDraft, PartyDraft};
pub use domain::order::{Currency, Order, OrderItem, Party, PaymentMethod};
pub use errors::{DomainError, ExtractError};
pub use extract::extract_json;
