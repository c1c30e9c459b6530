//! TypedArray element buffers
//!
//! A typed array is a fixed-length view over an [`ArrayBuffer`], providing
//! typed little-endian access to its bytes. It is the concrete
//! [`ElementBuffer`] behind integer-indexed exotic objects.

use std::sync::Arc;

use crate::array_buffer::ArrayBuffer;
use crate::convert::{to_int32, to_uint32};
use crate::error::{ObjectError, ObjectResult};
use crate::integer_indexed::ElementBuffer;
use crate::value::Value;

/// The kind of TypedArray - determines element size and interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    /// Int8Array - 8-bit signed integers
    Int8,
    /// Uint8Array - 8-bit unsigned integers
    Uint8,
    /// Uint8ClampedArray - 8-bit unsigned integers (clamped)
    Uint8Clamped,
    /// Int16Array - 16-bit signed integers
    Int16,
    /// Uint16Array - 16-bit unsigned integers
    Uint16,
    /// Int32Array - 32-bit signed integers
    Int32,
    /// Uint32Array - 32-bit unsigned integers
    Uint32,
    /// Float32Array - 32-bit floating point
    Float32,
    /// Float64Array - 64-bit floating point
    Float64,
}

impl TypedArrayKind {
    /// Get the byte size of each element
    pub fn element_size(&self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 => 8,
        }
    }

    /// Get the name of this TypedArray type
    pub fn name(&self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
        }
    }

    /// Decode one element from its little-endian bytes
    fn decode(&self, bytes: &[u8; 8]) -> f64 {
        match self {
            TypedArrayKind::Int8 => bytes[0] as i8 as f64,
            TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => bytes[0] as f64,
            TypedArrayKind::Int16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            TypedArrayKind::Uint16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            TypedArrayKind::Int32 => {
                i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
            TypedArrayKind::Uint32 => {
                u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
            TypedArrayKind::Float32 => {
                f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
            }
            TypedArrayKind::Float64 => f64::from_le_bytes(*bytes),
        }
    }

    /// Encode a number with the kind's modular (or clamping) conversion
    fn encode(&self, value: f64) -> [u8; 8] {
        let mut out = [0u8; 8];
        match self {
            TypedArrayKind::Int8 => out[0] = to_int32(value) as i8 as u8,
            TypedArrayKind::Uint8 => out[0] = to_uint32(value) as u8,
            TypedArrayKind::Uint8Clamped => {
                out[0] = if value.is_nan() || value <= 0.0 {
                    0
                } else if value >= 255.0 {
                    255
                } else {
                    value.round_ties_even() as u8
                };
            }
            TypedArrayKind::Int16 => {
                out[..2].copy_from_slice(&(to_int32(value) as i16).to_le_bytes());
            }
            TypedArrayKind::Uint16 => {
                out[..2].copy_from_slice(&(to_uint32(value) as u16).to_le_bytes());
            }
            TypedArrayKind::Int32 => out[..4].copy_from_slice(&to_int32(value).to_le_bytes()),
            TypedArrayKind::Uint32 => out[..4].copy_from_slice(&to_uint32(value).to_le_bytes()),
            TypedArrayKind::Float32 => out[..4].copy_from_slice(&(value as f32).to_le_bytes()),
            TypedArrayKind::Float64 => out.copy_from_slice(&value.to_le_bytes()),
        }
        out
    }
}

/// A typed view over an [`ArrayBuffer`]
///
/// It does not copy data - it references the underlying buffer.
#[derive(Debug)]
pub struct TypedArray {
    /// The underlying ArrayBuffer
    buffer: Arc<ArrayBuffer>,
    /// Byte offset into the buffer
    byte_offset: usize,
    /// Number of elements (not bytes)
    length: usize,
    /// The kind of typed array
    kind: TypedArrayKind,
}

impl TypedArray {
    /// Create a new TypedArray view over an ArrayBuffer
    pub fn new(
        buffer: Arc<ArrayBuffer>,
        kind: TypedArrayKind,
        byte_offset: usize,
        length: usize,
    ) -> ObjectResult<Self> {
        let elem_size = kind.element_size();

        if byte_offset % elem_size != 0 {
            return Err(ObjectError::range_error(format!(
                "start offset of {} should be a multiple of {}",
                kind.name(),
                elem_size
            )));
        }

        let byte_length = length
            .checked_mul(elem_size)
            .ok_or_else(|| ObjectError::range_error("Invalid typed array length"))?;
        let end = byte_offset
            .checked_add(byte_length)
            .ok_or_else(|| ObjectError::range_error("Invalid typed array length"))?;
        if end > buffer.byte_length() {
            return Err(ObjectError::range_error(format!(
                "Invalid typed array length: {}",
                length
            )));
        }

        Ok(Self {
            buffer,
            byte_offset,
            length,
            kind,
        })
    }

    /// Create a new TypedArray with its own buffer
    pub fn with_length(kind: TypedArrayKind, length: usize) -> Self {
        Self {
            buffer: Arc::new(ArrayBuffer::new(length * kind.element_size())),
            byte_offset: 0,
            length,
            kind,
        }
    }

    /// Get the kind of this TypedArray
    pub fn kind(&self) -> TypedArrayKind {
        self.kind
    }

    /// Get the underlying ArrayBuffer
    pub fn buffer(&self) -> &Arc<ArrayBuffer> {
        &self.buffer
    }

    /// Get the byte offset into the buffer
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Get the number of elements (0 once detached)
    pub fn length(&self) -> usize {
        if self.buffer.is_detached() {
            0
        } else {
            self.length
        }
    }

    /// Get an element
    pub fn get(&self, index: usize) -> Option<f64> {
        if index >= self.length() {
            return None;
        }
        let size = self.kind.element_size();
        let mut bytes = [0u8; 8];
        let offset = self.byte_offset + index * size;
        if !self.buffer.read_bytes(offset, &mut bytes[..size]) {
            return None;
        }
        Some(self.kind.decode(&bytes))
    }

    /// Set an element; false when out of bounds or detached
    pub fn set(&self, index: usize, value: f64) -> bool {
        if index >= self.length() {
            return false;
        }
        let size = self.kind.element_size();
        let bytes = self.kind.encode(value);
        self.buffer
            .write_bytes(self.byte_offset + index * size, &bytes[..size])
    }
}

impl ElementBuffer for TypedArray {
    fn length(&self) -> usize {
        TypedArray::length(self)
    }

    fn read(&self, index: usize) -> Value {
        self.get(index).map_or(Value::Undefined, Value::number)
    }

    fn write(&self, index: usize, value: Value) -> bool {
        match value.as_number() {
            Some(n) => self.set(index, n),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_over_buffer() {
        let buffer = Arc::new(ArrayBuffer::new(16));
        let ta = TypedArray::new(buffer.clone(), TypedArrayKind::Int32, 4, 3).unwrap();
        assert_eq!(ta.length(), 3);
        assert!(ta.set(0, 42.0));
        let mut raw = [0u8; 4];
        assert!(buffer.read_bytes(4, &mut raw));
        assert_eq!(raw, 42i32.to_le_bytes());
    }

    #[test]
    fn test_view_bounds_rejected() {
        let buffer = Arc::new(ArrayBuffer::new(8));
        assert!(TypedArray::new(buffer.clone(), TypedArrayKind::Int32, 2, 1).is_err());
        assert!(TypedArray::new(buffer.clone(), TypedArrayKind::Int32, 4, 2).is_err());
        assert!(matches!(
            TypedArray::new(buffer.clone(), TypedArrayKind::Uint8, usize::MAX, 1),
            Err(ObjectError::RangeInvalid(_))
        ));
        assert!(TypedArray::new(buffer, TypedArrayKind::Float64, 0, usize::MAX).is_err());
    }

    #[test]
    fn test_modular_conversion() {
        let ta = TypedArray::with_length(TypedArrayKind::Int8, 2);
        ta.set(0, 200.0);
        assert_eq!(ta.get(0), Some(-56.0));
        ta.set(1, -1.5);
        assert_eq!(ta.get(1), Some(-1.0));

        let ta = TypedArray::with_length(TypedArrayKind::Uint16, 1);
        ta.set(0, -1.0);
        assert_eq!(ta.get(0), Some(65535.0));
        ta.set(0, f64::NAN);
        assert_eq!(ta.get(0), Some(0.0));
    }

    #[test]
    fn test_uint8_clamped() {
        let ta = TypedArray::with_length(TypedArrayKind::Uint8Clamped, 4);
        ta.set(0, 300.0);
        ta.set(1, -5.0);
        ta.set(2, 2.5);
        ta.set(3, 3.5);
        assert_eq!(ta.get(0), Some(255.0));
        assert_eq!(ta.get(1), Some(0.0));
        assert_eq!(ta.get(2), Some(2.0));
        assert_eq!(ta.get(3), Some(4.0));
    }

    #[test]
    fn test_floats() {
        let ta = TypedArray::with_length(TypedArrayKind::Float64, 1);
        ta.set(0, -0.0);
        assert!(ta.get(0).unwrap().is_sign_negative());
        let ta = TypedArray::with_length(TypedArrayKind::Float32, 1);
        ta.set(0, 0.1);
        assert_eq!(ta.get(0), Some(0.1f32 as f64));
    }

    #[test]
    fn test_detached_buffer() {
        let ta = TypedArray::with_length(TypedArrayKind::Uint8, 4);
        ta.buffer().detach();
        assert_eq!(ta.length(), 0);
        assert_eq!(ta.get(0), None);
        assert!(!ta.set(0, 1.0));
    }

    #[test]
    fn test_alignment_error() {
        let buffer = Arc::new(ArrayBuffer::new(16));
        assert!(TypedArray::new(buffer.clone(), TypedArrayKind::Int32, 1, 1).is_err());
        assert!(TypedArray::new(buffer, TypedArrayKind::Int32, 8, 3).is_err());
    }
}
