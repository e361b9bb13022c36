//! Shared pixel storage with zero-copy sub-views.

use std::fmt;
use std::sync::Arc;

/// A read-only window into reference-counted pixel storage.
///
/// Every view created with [`PixelBuffer::view`] holds its own strong
/// handle to the backing allocation, so a cropped view can never outlive
/// the bytes it points at. Creating a view never copies pixel data.
#[derive(Clone)]
pub struct PixelBuffer {
    storage: Arc<[u8]>,
    offset: usize,
    len: usize,
}

impl PixelBuffer {
    /// Wrap decoder output. The buffer spans the whole allocation.
    pub fn new(data: Vec<u8>) -> Self {
        Self::from(data)
    }

    /// Create a sub-view starting `offset` bytes into this view.
    ///
    /// Returns `None` if `offset + len` runs past the end of this view.
    pub fn view(&self, offset: usize, len: usize) -> Option<PixelBuffer> {
        let end = offset.checked_add(len)?;
        if end > self.len {
            return None;
        }
        Some(PixelBuffer {
            storage: Arc::clone(&self.storage),
            offset: self.offset + offset,
            len,
        })
    }

    /// The bytes visible through this view.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.len]
    }

    /// Byte offset of this view inside the backing allocation.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes visible through this view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if both buffers alias the same backing allocation.
    pub fn shares_storage_with(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl From<Vec<u8>> for PixelBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from(Arc::<[u8]>::from(data))
    }
}

impl From<Arc<[u8]>> for PixelBuffer {
    fn from(storage: Arc<[u8]>) -> Self {
        let len = storage.len();
        Self {
            storage,
            offset: 0,
            len,
        }
    }
}

impl AsRef<[u8]> for PixelBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("storage_len", &self.storage.len())
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_spans_whole_allocation() {
        let buf = PixelBuffer::new(vec![1, 2, 3, 4]);
        assert_eq!(buf.offset(), 0);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_view_aliases_storage() {
        let buf = PixelBuffer::new((0u8..16).collect());
        let view = buf.view(5, 4).unwrap();

        assert!(view.shares_storage_with(&buf));
        assert_eq!(view.offset(), 5);
        assert_eq!(view.as_slice(), &[5, 6, 7, 8]);
    }

    #[test]
    fn test_nested_view_offsets_accumulate() {
        let buf = PixelBuffer::new((0u8..16).collect());
        let outer = buf.view(4, 8).unwrap();
        let inner = outer.view(2, 3).unwrap();

        assert_eq!(inner.offset(), 6);
        assert_eq!(inner.as_slice(), &[6, 7, 8]);
    }

    #[test]
    fn test_view_out_of_range() {
        let buf = PixelBuffer::new(vec![0; 8]);
        assert!(buf.view(4, 5).is_none());
        assert!(buf.view(usize::MAX, 2).is_none());
        assert!(buf.view(8, 0).is_some());
    }

    #[test]
    fn test_view_keeps_storage_alive() {
        let view = {
            let buf = PixelBuffer::new(vec![9, 8, 7, 6]);
            buf.view(1, 2).unwrap()
        };
        // The original handle is gone; the view still owns a reference.
        assert_eq!(Arc::strong_count(&view.storage), 1);
        assert_eq!(view.as_slice(), &[8, 7]);
    }
}
