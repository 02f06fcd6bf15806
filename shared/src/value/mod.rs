mod array_instance;
mod data_type;
mod error;
mod fixed_dict_instance;
#[allow(clippy::module_inception)]
mod value;

pub use array_instance::{clamp_slice, ArrayInstance};
pub(crate) use data_type::check_packed_length;
pub use data_type::{ArrayType, DataType, FieldType, FixedDictType};
pub use error::ValueError;
pub use fixed_dict_instance::FixedDictInstance;
pub(crate) use value::rehome;
pub use value::Value;
