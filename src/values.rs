//! Owned, typed copies of variable data and attribute values
//!
//! Values are kept in their on-disk element type so that writing them back out
//! reproduces the source bit for bit. No scale/offset unpacking is applied.

use ndarray::ArrayD;
use netcdf::AttributeValue;

/// N-dimensional variable data in its original element type
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    I8(ArrayD<i8>),
    U8(ArrayD<u8>),
    I16(ArrayD<i16>),
    U16(ArrayD<u16>),
    I32(ArrayD<i32>),
    U32(ArrayD<u32>),
    I64(ArrayD<i64>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    Str(ArrayD<String>),
}

impl ArrayData {
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayData::I8(a) => a.shape(),
            ArrayData::U8(a) => a.shape(),
            ArrayData::I16(a) => a.shape(),
            ArrayData::U16(a) => a.shape(),
            ArrayData::I32(a) => a.shape(),
            ArrayData::U32(a) => a.shape(),
            ArrayData::I64(a) => a.shape(),
            ArrayData::U64(a) => a.shape(),
            ArrayData::F32(a) => a.shape(),
            ArrayData::F64(a) => a.shape(),
            ArrayData::Str(a) => a.shape(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short element type name (`f32`, `i16`, `string`, ...).
    pub fn dtype(&self) -> &'static str {
        match self {
            ArrayData::I8(_) => "i8",
            ArrayData::U8(_) => "u8",
            ArrayData::I16(_) => "i16",
            ArrayData::U16(_) => "u16",
            ArrayData::I32(_) => "i32",
            ArrayData::U32(_) => "u32",
            ArrayData::I64(_) => "i64",
            ArrayData::U64(_) => "u64",
            ArrayData::F32(_) => "f32",
            ArrayData::F64(_) => "f64",
            ArrayData::Str(_) => "string",
        }
    }

    /// Size in bytes of one element; strings count as pointer-sized.
    pub fn element_size(&self) -> usize {
        match self {
            ArrayData::I8(_) | ArrayData::U8(_) => 1,
            ArrayData::I16(_) | ArrayData::U16(_) => 2,
            ArrayData::I32(_) | ArrayData::U32(_) | ArrayData::F32(_) => 4,
            ArrayData::I64(_) | ArrayData::U64(_) | ArrayData::F64(_) => 8,
            ArrayData::Str(_) => std::mem::size_of::<usize>(),
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ArrayData::Str(_))
    }
}

/// Attribute value, mirroring the types a NetCDF attribute can hold
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Uchar(u8),
    Uchars(Vec<u8>),
    Schar(i8),
    Schars(Vec<i8>),
    Ushort(u16),
    Ushorts(Vec<u16>),
    Short(i16),
    Shorts(Vec<i16>),
    Uint(u32),
    Uints(Vec<u32>),
    Int(i32),
    Ints(Vec<i32>),
    Ulonglong(u64),
    Ulonglongs(Vec<u64>),
    Longlong(i64),
    Longlongs(Vec<i64>),
    Float(f32),
    Floats(Vec<f32>),
    Double(f64),
    Doubles(Vec<f64>),
    Str(String),
    Strs(Vec<String>),
}

/// Named attribute in file order
pub type Attribute = (String, AttrValue);

impl From<AttributeValue> for AttrValue {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Uchar(v) => AttrValue::Uchar(v),
            AttributeValue::Uchars(v) => AttrValue::Uchars(v),
            AttributeValue::Schar(v) => AttrValue::Schar(v),
            AttributeValue::Schars(v) => AttrValue::Schars(v),
            AttributeValue::Ushort(v) => AttrValue::Ushort(v),
            AttributeValue::Ushorts(v) => AttrValue::Ushorts(v),
            AttributeValue::Short(v) => AttrValue::Short(v),
            AttributeValue::Shorts(v) => AttrValue::Shorts(v),
            AttributeValue::Uint(v) => AttrValue::Uint(v),
            AttributeValue::Uints(v) => AttrValue::Uints(v),
            AttributeValue::Int(v) => AttrValue::Int(v),
            AttributeValue::Ints(v) => AttrValue::Ints(v),
            AttributeValue::Ulonglong(v) => AttrValue::Ulonglong(v),
            AttributeValue::Ulonglongs(v) => AttrValue::Ulonglongs(v),
            AttributeValue::Longlong(v) => AttrValue::Longlong(v),
            AttributeValue::Longlongs(v) => AttrValue::Longlongs(v),
            AttributeValue::Float(v) => AttrValue::Float(v),
            AttributeValue::Floats(v) => AttrValue::Floats(v),
            AttributeValue::Double(v) => AttrValue::Double(v),
            AttributeValue::Doubles(v) => AttrValue::Doubles(v),
            AttributeValue::Str(v) => AttrValue::Str(v),
            AttributeValue::Strs(v) => AttrValue::Strs(v),
        }
    }
}

impl From<AttrValue> for AttributeValue {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Uchar(v) => AttributeValue::Uchar(v),
            AttrValue::Uchars(v) => AttributeValue::Uchars(v),
            AttrValue::Schar(v) => AttributeValue::Schar(v),
            AttrValue::Schars(v) => AttributeValue::Schars(v),
            AttrValue::Ushort(v) => AttributeValue::Ushort(v),
            AttrValue::Ushorts(v) => AttributeValue::Ushorts(v),
            AttrValue::Short(v) => AttributeValue::Short(v),
            AttrValue::Shorts(v) => AttributeValue::Shorts(v),
            AttrValue::Uint(v) => AttributeValue::Uint(v),
            AttrValue::Uints(v) => AttributeValue::Uints(v),
            AttrValue::Int(v) => AttributeValue::Int(v),
            AttrValue::Ints(v) => AttributeValue::Ints(v),
            AttrValue::Ulonglong(v) => AttributeValue::Ulonglong(v),
            AttrValue::Ulonglongs(v) => AttributeValue::Ulonglongs(v),
            AttrValue::Longlong(v) => AttributeValue::Longlong(v),
            AttrValue::Longlongs(v) => AttributeValue::Longlongs(v),
            AttrValue::Float(v) => AttributeValue::Float(v),
            AttrValue::Floats(v) => AttributeValue::Floats(v),
            AttrValue::Double(v) => AttributeValue::Double(v),
            AttrValue::Doubles(v) => AttributeValue::Doubles(v),
            AttrValue::Str(v) => AttributeValue::Str(v),
            AttrValue::Strs(v) => AttributeValue::Strs(v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<f32> for AttrValue {
    fn from(value: f32) -> Self {
        AttrValue::Float(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Double(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value)
    }
}
