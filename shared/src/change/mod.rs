mod change_path;
mod change_reader;
mod change_writer;
mod property_change;

pub use change_path::{ChangePath, PathEntry};
pub(crate) use change_reader::peek_simple_root_index;
pub use change_reader::{apply_compressed_path, apply_simple_path, DecodedChange, DecodedKind};
pub(crate) use change_writer::wire_index;
pub use property_change::{
    ChangeKind, PropertyChange, SingleChange, SliceChange, FLAG_IS_NESTED, FLAG_IS_SLICE,
};
