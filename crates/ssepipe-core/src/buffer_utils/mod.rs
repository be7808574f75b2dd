mod buffering;
mod splitter;

pub use buffering::CarryOverBuffer;
pub use splitter::RecordSplitter;
