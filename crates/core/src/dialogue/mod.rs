pub mod answers;
pub mod engine;
pub mod field;
pub mod missing;
pub mod promote;
pub mod questions;
