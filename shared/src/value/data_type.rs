use std::sync::Arc;

use propdelta_serde::{
    read_packed_count, write_packed_count, BitReader, BitWrite, Serde, MAX_PACKED_COUNT,
};

use crate::{
    property::PropertyComparator,
    value::{ArrayInstance, FixedDictInstance, Value, ValueError},
};

/// Describes the shape of a replicated value, and knows how to stream it.
///
/// Containers (`Array`, `FixedDict`) hold their description behind an `Arc`
/// so every instance of the same property shares one description.
#[derive(Clone, Debug, PartialEq)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    Array(Arc<ArrayType>),
    FixedDict(Arc<FixedDictType>),
}

/// A homogeneous sequence. A `size` of 0 means the sequence is variable length.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayType {
    element: DataType,
    size: usize,
}

impl ArrayType {
    pub fn element(&self) -> &DataType {
        &self.element
    }

    /// The declared length, if the array has one
    pub fn strict_size(&self) -> Option<usize> {
        (self.size != 0).then_some(self.size)
    }
}

/// A record with a fixed, ordered set of named fields
#[derive(Clone, Debug, PartialEq)]
pub struct FixedDictType {
    fields: Vec<FieldType>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldType {
    name: String,
    data_type: DataType,
}

impl FieldType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }
}

impl FixedDictType {
    pub fn fields(&self) -> &[FieldType] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldType> {
        self.fields.get(index)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

impl DataType {
    /// A variable-length array of `element`
    pub fn array_of(element: DataType) -> Self {
        Self::Array(Arc::new(ArrayType { element, size: 0 }))
    }

    /// An array of `element` that always holds exactly `size` values
    pub fn fixed_array_of(element: DataType, size: usize) -> Self {
        Self::Array(Arc::new(ArrayType { element, size }))
    }

    pub fn fixed_dict<N: Into<String>>(fields: Vec<(N, DataType)>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(name, data_type)| FieldType {
                name: name.into(),
                data_type,
            })
            .collect();
        Self::FixedDict(Arc::new(FixedDictType { fields }))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::Bool => "BOOL",
            DataType::Int8 => "INT8",
            DataType::Int16 => "INT16",
            DataType::Int32 => "INT32",
            DataType::Int64 => "INT64",
            DataType::UInt8 => "UINT8",
            DataType::UInt16 => "UINT16",
            DataType::UInt32 => "UINT32",
            DataType::UInt64 => "UINT64",
            DataType::Float32 => "FLOAT32",
            DataType::Float64 => "FLOAT64",
            DataType::String => "STRING",
            DataType::Array(_) => "ARRAY",
            DataType::FixedDict(_) => "FIXED_DICT",
        }
    }

    /// Whether the data type can hold this value without conversion
    pub fn is_same_type(&self, value: &Value) -> bool {
        match (self, value) {
            (DataType::Bool, Value::Bool(_)) => true,
            (DataType::Int8, Value::Int(v)) => i8::try_from(*v).is_ok(),
            (DataType::Int16, Value::Int(v)) => i16::try_from(*v).is_ok(),
            (DataType::Int32, Value::Int(v)) => i32::try_from(*v).is_ok(),
            (DataType::Int64, Value::Int(_)) => true,
            (DataType::UInt8, Value::UInt(v)) => u8::try_from(*v).is_ok(),
            (DataType::UInt16, Value::UInt(v)) => u16::try_from(*v).is_ok(),
            (DataType::UInt32, Value::UInt(v)) => u32::try_from(*v).is_ok(),
            (DataType::UInt64, Value::UInt(_)) => true,
            (DataType::Float32, Value::Float(_)) | (DataType::Float64, Value::Float(_)) => true,
            (DataType::String, Value::String(_)) => true,
            (DataType::Array(array_type), Value::Array(array)) => {
                **array_type == **array.data_type()
                    && array_type
                        .strict_size()
                        .map_or(true, |size| size == array.len())
            }
            (DataType::FixedDict(dict_type), Value::FixedDict(dict)) => {
                **dict_type == **dict.data_type()
            }
            _ => false,
        }
    }

    pub(crate) fn check(&self, value: &Value) -> Result<(), ValueError> {
        if !self.is_same_type(value) {
            return Err(ValueError::TypeMismatch {
                expected: self.type_name(),
                found: value.kind_name(),
            });
        }

        // strings and variable arrays carry a packed count
        let length = match value {
            Value::String(string) => string.len(),
            Value::Array(array) if array.data_type().strict_size().is_none() => array.len(),
            _ => return Ok(()),
        };
        check_packed_length(length)
    }

    /// The value as this data type stores it. `Float32` slots hold the
    /// single-precision value that goes on the wire.
    pub(crate) fn normalize(&self, value: Value) -> Value {
        match (self, value) {
            (DataType::Float32, Value::Float(v)) => Value::Float(f64::from(v as f32)),
            (_, value) => value,
        }
    }

    /// Whether every value of this type streams to zero bytes
    pub fn is_zero_width(&self) -> bool {
        match self {
            DataType::Array(array_type) => {
                array_type.strict_size().is_some() && array_type.element.is_zero_width()
            }
            DataType::FixedDict(dict_type) => dict_type
                .fields
                .iter()
                .all(|field| field.data_type.is_zero_width()),
            _ => false,
        }
    }

    pub fn default_value(&self) -> Value {
        match self {
            DataType::Bool => Value::Bool(false),
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => Value::Int(0),
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
                Value::UInt(0)
            }
            DataType::Float32 | DataType::Float64 => Value::Float(0.0),
            DataType::String => Value::String(String::new()),
            DataType::Array(array_type) => {
                Value::Array(ArrayInstance::with_default(array_type.clone()))
            }
            DataType::FixedDict(dict_type) => {
                Value::FixedDict(FixedDictInstance::with_default(dict_type.clone()))
            }
        }
    }

    /// Writes the value in the payload layout of this data type
    pub fn add_to_stream(&self, value: &Value, writer: &mut dyn BitWrite) -> Result<(), ValueError> {
        self.check(value)?;

        match (self, value) {
            (DataType::Bool, Value::Bool(v)) => v.ser(writer),
            (DataType::Int8, Value::Int(v)) => (*v as i8).ser(writer),
            (DataType::Int16, Value::Int(v)) => (*v as i16).ser(writer),
            (DataType::Int32, Value::Int(v)) => (*v as i32).ser(writer),
            (DataType::Int64, Value::Int(v)) => v.ser(writer),
            (DataType::UInt8, Value::UInt(v)) => (*v as u8).ser(writer),
            (DataType::UInt16, Value::UInt(v)) => (*v as u16).ser(writer),
            (DataType::UInt32, Value::UInt(v)) => (*v as u32).ser(writer),
            (DataType::UInt64, Value::UInt(v)) => v.ser(writer),
            (DataType::Float32, Value::Float(v)) => (*v as f32).ser(writer),
            (DataType::Float64, Value::Float(v)) => v.ser(writer),
            (DataType::String, Value::String(v)) => v.ser(writer),
            (DataType::Array(array_type), Value::Array(array)) => {
                if array_type.strict_size().is_none() {
                    write_packed_count(writer, array.len());
                }
                for element in array.values() {
                    array_type.element.add_to_stream(element, writer)?;
                }
            }
            (DataType::FixedDict(dict_type), Value::FixedDict(dict)) => {
                for (field, element) in dict_type.fields.iter().zip(dict.values()) {
                    field.data_type.add_to_stream(element, writer)?;
                }
            }
            _ => unreachable!("is_same_type accepted a mismatched value"),
        }

        Ok(())
    }

    /// Reads a value in the payload layout of this data type
    pub fn create_from_stream(&self, reader: &mut BitReader) -> Result<Value, ValueError> {
        let value = match self {
            DataType::Bool => Value::Bool(bool::de(reader)?),
            DataType::Int8 => Value::Int(i8::de(reader)?.into()),
            DataType::Int16 => Value::Int(i16::de(reader)?.into()),
            DataType::Int32 => Value::Int(i32::de(reader)?.into()),
            DataType::Int64 => Value::Int(i64::de(reader)?),
            DataType::UInt8 => Value::UInt(u8::de(reader)?.into()),
            DataType::UInt16 => Value::UInt(u16::de(reader)?.into()),
            DataType::UInt32 => Value::UInt(u32::de(reader)?.into()),
            DataType::UInt64 => Value::UInt(u64::de(reader)?),
            DataType::Float32 => Value::Float(f32::de(reader)?.into()),
            DataType::Float64 => Value::Float(f64::de(reader)?),
            DataType::String => Value::String(String::de(reader)?),
            DataType::Array(array_type) => {
                let count = match array_type.strict_size() {
                    Some(size) => size,
                    None => read_packed_count(reader)?,
                };
                // a corrupt count must not turn into a huge allocation
                let mut values = Vec::with_capacity(count.min(reader.bytes_remaining()));
                for _ in 0..count {
                    values.push(array_type.element.create_from_stream(reader)?);
                }
                Value::Array(ArrayInstance::from_values(array_type.clone(), values))
            }
            DataType::FixedDict(dict_type) => {
                let mut values = Vec::with_capacity(dict_type.fields.len());
                for field in &dict_type.fields {
                    values.push(field.data_type.create_from_stream(reader)?);
                }
                Value::FixedDict(FixedDictInstance::from_values(dict_type.clone(), values))
            }
        };

        Ok(value)
    }
}

pub(crate) fn check_packed_length(length: usize) -> Result<(), ValueError> {
    if length > MAX_PACKED_COUNT {
        return Err(ValueError::TooLong {
            length,
            max_length: MAX_PACKED_COUNT,
        });
    }
    Ok(())
}

impl PropertyComparator for DataType {
    fn has_changed(&self, old_value: &Value, new_value: &Value) -> bool {
        old_value != new_value
    }
}
