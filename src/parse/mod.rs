pub mod task_parser;
pub mod task_serializer;

pub use task_serializer::{completion_entry, serialize_lines, stamp_created};
