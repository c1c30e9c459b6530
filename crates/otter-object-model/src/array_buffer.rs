//! ArrayBuffer backing store
//!
//! Raw bytes shared by typed array views. A buffer can be detached
//! (transferred), after which every view over it reads as empty.

use parking_lot::Mutex;

/// A detachable byte buffer
#[derive(Debug)]
pub struct ArrayBuffer {
    /// The underlying byte data. None if detached.
    data: Mutex<Option<Vec<u8>>>,
}

impl ArrayBuffer {
    /// Create a zero-filled buffer with the specified byte length
    pub fn new(byte_length: usize) -> Self {
        Self {
            data: Mutex::new(Some(vec![0; byte_length])),
        }
    }

    /// Wrap existing bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: Mutex::new(Some(bytes)),
        }
    }

    /// Check if the buffer is detached
    pub fn is_detached(&self) -> bool {
        self.data.lock().is_none()
    }

    /// Detach the buffer
    pub fn detach(&self) {
        *self.data.lock() = None;
        tracing::debug!(target: "otter::object", "array buffer detached");
    }

    /// Get the byte length (0 if detached)
    pub fn byte_length(&self) -> usize {
        self.data.lock().as_ref().map_or(0, Vec::len)
    }

    /// Move the contents into a new buffer; this one becomes detached
    pub fn transfer(&self) -> Option<ArrayBuffer> {
        let data = self.data.lock().take()?;
        Some(Self::from_bytes(data))
    }

    /// Read bytes into a slice
    pub fn read_bytes(&self, offset: usize, dest: &mut [u8]) -> bool {
        let guard = self.data.lock();
        let Some(data) = guard.as_ref() else {
            return false;
        };
        match data.get(offset..offset + dest.len()) {
            Some(src) => {
                dest.copy_from_slice(src);
                true
            }
            None => false,
        }
    }

    /// Write bytes from a slice
    pub fn write_bytes(&self, offset: usize, src: &[u8]) -> bool {
        let mut guard = self.data.lock();
        let Some(data) = guard.as_mut() else {
            return false;
        };
        match data.get_mut(offset..offset + src.len()) {
            Some(dest) => {
                dest.copy_from_slice(src);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_array_buffer() {
        let ab = ArrayBuffer::new(16);
        assert_eq!(ab.byte_length(), 16);
        assert!(!ab.is_detached());
    }

    #[test]
    fn test_detach() {
        let ab = ArrayBuffer::new(8);
        ab.detach();
        assert!(ab.is_detached());
        assert_eq!(ab.byte_length(), 0);
        assert!(!ab.write_bytes(0, &[1]));
    }

    #[test]
    fn test_transfer() {
        let ab = ArrayBuffer::new(8);
        assert!(ab.write_bytes(0, &[42]));
        let moved = ab.transfer().unwrap();
        assert!(ab.is_detached());
        let mut byte = [0u8; 1];
        assert!(moved.read_bytes(0, &mut byte));
        assert_eq!(byte, [42]);
        assert!(ab.transfer().is_none());
    }

    #[test]
    fn test_read_write_bytes() {
        let ab = ArrayBuffer::new(8);
        assert!(ab.write_bytes(2, &[1, 2, 3, 4]));
        let mut dest = [0u8; 4];
        assert!(ab.read_bytes(2, &mut dest));
        assert_eq!(dest, [1, 2, 3, 4]);
        assert!(!ab.write_bytes(6, &[1, 2, 3]));
    }
}
