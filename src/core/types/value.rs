//! Typed values decoded from target memory
//!
//! The target is big-endian. Every multi-byte value crossing the host
//! boundary goes through [`ByteOrder::BigEndian`]; there is no runtime
//! override.

use super::RemoteAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte order of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    BigEndian,
}

/// Byte order used by every value crossing the boundary
pub const TARGET_BYTE_ORDER: ByteOrder = ByteOrder::BigEndian;

/// Value type descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// 32-bit pointer into the target address space
    Pointer32,
    Bytes,
    /// NUL-terminated UTF-8 text
    Utf8Text,
    /// NUL-terminated UTF-16BE text
    Utf16Text,
}

impl ValueType {
    /// Fixed size in bytes, `None` for variable-length types
    pub fn size(&self) -> Option<usize> {
        match self {
            ValueType::I8 | ValueType::U8 => Some(1),
            ValueType::I16 | ValueType::U16 => Some(2),
            ValueType::I32 | ValueType::U32 | ValueType::F32 | ValueType::Pointer32 => Some(4),
            ValueType::I64 | ValueType::U64 | ValueType::F64 => Some(8),
            ValueType::Bytes | ValueType::Utf8Text | ValueType::Utf16Text => None,
        }
    }
}

/// A value read from or destined for target memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemoryValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Pointer32(RemoteAddress),
    Bytes(Vec<u8>),
    Utf8Text(String),
    Utf16Text(String),
}

fn array<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

impl MemoryValue {
    /// Decodes a value from target bytes (big-endian)
    pub fn from_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        let value = match value_type {
            ValueType::I8 => MemoryValue::I8(i8::from_be_bytes(array(bytes)?)),
            ValueType::I16 => MemoryValue::I16(i16::from_be_bytes(array(bytes)?)),
            ValueType::I32 => MemoryValue::I32(i32::from_be_bytes(array(bytes)?)),
            ValueType::I64 => MemoryValue::I64(i64::from_be_bytes(array(bytes)?)),
            ValueType::U8 => MemoryValue::U8(u8::from_be_bytes(array(bytes)?)),
            ValueType::U16 => MemoryValue::U16(u16::from_be_bytes(array(bytes)?)),
            ValueType::U32 => MemoryValue::U32(u32::from_be_bytes(array(bytes)?)),
            ValueType::U64 => MemoryValue::U64(u64::from_be_bytes(array(bytes)?)),
            ValueType::F32 => MemoryValue::F32(f32::from_be_bytes(array(bytes)?)),
            ValueType::F64 => MemoryValue::F64(f64::from_be_bytes(array(bytes)?)),
            ValueType::Pointer32 => {
                MemoryValue::Pointer32(RemoteAddress::new(u32::from_be_bytes(array(bytes)?)))
            }
            ValueType::Bytes => MemoryValue::Bytes(bytes.to_vec()),
            ValueType::Utf8Text => {
                let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                MemoryValue::Utf8Text(String::from_utf8(bytes[..end].to_vec()).ok()?)
            }
            ValueType::Utf16Text => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .take_while(|&unit| unit != 0)
                    .collect();
                MemoryValue::Utf16Text(String::from_utf16(&units).ok()?)
            }
        };
        Some(value)
    }

    /// Encodes the value as target bytes (big-endian)
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MemoryValue::I8(v) => v.to_be_bytes().to_vec(),
            MemoryValue::I16(v) => v.to_be_bytes().to_vec(),
            MemoryValue::I32(v) => v.to_be_bytes().to_vec(),
            MemoryValue::I64(v) => v.to_be_bytes().to_vec(),
            MemoryValue::U8(v) => v.to_be_bytes().to_vec(),
            MemoryValue::U16(v) => v.to_be_bytes().to_vec(),
            MemoryValue::U32(v) => v.to_be_bytes().to_vec(),
            MemoryValue::U64(v) => v.to_be_bytes().to_vec(),
            MemoryValue::F32(v) => v.to_be_bytes().to_vec(),
            MemoryValue::F64(v) => v.to_be_bytes().to_vec(),
            MemoryValue::Pointer32(addr) => addr.as_u32().to_be_bytes().to_vec(),
            MemoryValue::Bytes(b) => b.clone(),
            MemoryValue::Utf8Text(s) => s.as_bytes().to_vec(),
            MemoryValue::Utf16Text(s) => s.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    /// Size in bytes of the encoded value
    pub fn size(&self) -> usize {
        match self.value_type().size() {
            Some(size) => size,
            None => self.to_bytes().len(),
        }
    }

    /// Gets the value type for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::I8(_) => ValueType::I8,
            MemoryValue::I16(_) => ValueType::I16,
            MemoryValue::I32(_) => ValueType::I32,
            MemoryValue::I64(_) => ValueType::I64,
            MemoryValue::U8(_) => ValueType::U8,
            MemoryValue::U16(_) => ValueType::U16,
            MemoryValue::U32(_) => ValueType::U32,
            MemoryValue::U64(_) => ValueType::U64,
            MemoryValue::F32(_) => ValueType::F32,
            MemoryValue::F64(_) => ValueType::F64,
            MemoryValue::Pointer32(_) => ValueType::Pointer32,
            MemoryValue::Bytes(_) => ValueType::Bytes,
            MemoryValue::Utf8Text(_) => ValueType::Utf8Text,
            MemoryValue::Utf16Text(_) => ValueType::Utf16Text,
        }
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::I8(v) => write!(f, "{}", v),
            MemoryValue::I16(v) => write!(f, "{}", v),
            MemoryValue::I32(v) => write!(f, "{}", v),
            MemoryValue::I64(v) => write!(f, "{}", v),
            MemoryValue::U8(v) => write!(f, "{}", v),
            MemoryValue::U16(v) => write!(f, "{}", v),
            MemoryValue::U32(v) => write!(f, "{}", v),
            MemoryValue::U64(v) => write!(f, "{}", v),
            MemoryValue::F32(v) => write!(f, "{}", v),
            MemoryValue::F64(v) => write!(f, "{}", v),
            MemoryValue::Pointer32(addr) => write!(f, "-> {}", addr),
            MemoryValue::Bytes(b) => write!(f, "{}", hex::encode_upper(b)),
            MemoryValue::Utf8Text(s) | MemoryValue::Utf16Text(s) => write!(f, "{:?}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_integers() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(
            MemoryValue::from_bytes(&bytes, ValueType::U16),
            Some(MemoryValue::U16(0x1234))
        );
        assert_eq!(
            MemoryValue::from_bytes(&bytes, ValueType::U32),
            Some(MemoryValue::U32(0x1234_5678))
        );
        assert_eq!(
            MemoryValue::from_bytes(&bytes, ValueType::U64),
            Some(MemoryValue::U64(0x1234_5678_9ABC_DEF0))
        );
        assert_eq!(
            MemoryValue::from_bytes(&[0xFF, 0xFE], ValueType::I16),
            Some(MemoryValue::I16(-2))
        );
    }

    #[test]
    fn test_short_input() {
        assert_eq!(MemoryValue::from_bytes(&[1, 2, 3], ValueType::U32), None);
        assert_eq!(MemoryValue::from_bytes(&[], ValueType::U8), None);
    }

    #[test]
    fn test_pointer32() {
        let value = MemoryValue::from_bytes(&[0x00, 0x01, 0x00, 0x00], ValueType::Pointer32);
        assert_eq!(value, Some(MemoryValue::Pointer32(RemoteAddress::new(0x10000))));
        assert_eq!(
            MemoryValue::Pointer32(RemoteAddress::new(0xDEADBEEF)).to_bytes(),
            vec![0xDE, 0xAD, 0xBE, 0xEF]
        );
    }

    #[test]
    fn test_float_encoding() {
        let value = MemoryValue::F32(1.0);
        assert_eq!(value.to_bytes(), vec![0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(
            MemoryValue::from_bytes(&[0x3F, 0x80, 0x00, 0x00], ValueType::F32),
            Some(MemoryValue::F32(1.0))
        );
    }

    #[test]
    fn test_text_values() {
        let utf8 = MemoryValue::from_bytes(b"sys_init\0garbage", ValueType::Utf8Text);
        assert_eq!(utf8, Some(MemoryValue::Utf8Text("sys_init".to_string())));

        let utf16 = MemoryValue::from_bytes(&[0x00, 0x48, 0x00, 0x69, 0x00, 0x00, 0x00, 0x41], ValueType::Utf16Text);
        assert_eq!(utf16, Some(MemoryValue::Utf16Text("Hi".to_string())));

        assert_eq!(
            MemoryValue::Utf16Text("Hi".to_string()).to_bytes(),
            vec![0x00, 0x48, 0x00, 0x69]
        );
    }

    #[test]
    fn test_sizes() {
        assert_eq!(MemoryValue::U32(0).size(), 4);
        assert_eq!(MemoryValue::Pointer32(RemoteAddress::null()).size(), 4);
        assert_eq!(MemoryValue::Utf16Text("abc".into()).size(), 6);
        assert_eq!(ValueType::Bytes.size(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MemoryValue::Bytes(vec![0xDE, 0xAD]).to_string(), "DEAD");
        assert_eq!(
            MemoryValue::Pointer32(RemoteAddress::new(0x10)).to_string(),
            "-> 0x00000010"
        );
        assert_eq!(TARGET_BYTE_ORDER, ByteOrder::BigEndian);
    }
}
