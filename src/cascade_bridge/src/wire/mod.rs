pub mod frame;
pub mod message;
pub mod varint;

pub use frame::{frame, unframe};
pub use message::{scan_fields, Field, FieldValue, MessageBuilder};
