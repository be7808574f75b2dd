pub mod record;

pub use record::{Field, FieldValue, Record};
