//! Stream storage abstractions
//!
//! Provides a handle-based file interface that board storage (RAM disk,
//! SD card, flash file system) implements for the playback core.
//!
//! Handles are owned tokens. They are not `Clone`, so whoever holds the
//! handle is the only party able to read, seek or write through it.
//! Closing consumes the handle.

/// Maximum stream name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No file with this name
    NotFound,
    /// Not enough space for the write
    Full,
    /// Handle refers to a file that was removed or replaced
    InvalidHandle,
    /// Write attempted through a read handle
    ReadOnly,
    /// File table has no free slot
    TooManyFiles,
    /// Name exceeds [`MAX_NAME_LEN`]
    NameTooLong,
    /// Underlying device reported an error
    Io,
}

/// Named byte-stream storage
///
/// Implementations must honor these rules:
/// - `create` truncates: an existing file of the same name is replaced by
///   an empty one
/// - `read` may return fewer bytes than requested (end of file or
///   truncation) and never blocks waiting for more data
/// - `seek` takes an absolute byte offset from the start of the file
pub trait Storage {
    /// Open file handle
    type Handle;

    /// Open an existing file for reading, positioned at offset 0
    fn open(&mut self, name: &str) -> Result<Self::Handle, StorageError>;

    /// Create (or truncate) a file and open it for writing
    fn create(&mut self, name: &str) -> Result<Self::Handle, StorageError>;

    /// Close a handle, flushing any buffered writes
    fn close(&mut self, handle: Self::Handle) -> Result<(), StorageError>;

    /// Delete a file
    ///
    /// Removing a file that does not exist is not an error.
    fn remove(&mut self, name: &str) -> Result<(), StorageError>;

    /// Move the handle's cursor to an absolute offset
    fn seek(&mut self, handle: &mut Self::Handle, offset: u32) -> Result<(), StorageError>;

    /// Read up to `buf.len()` bytes at the cursor
    ///
    /// # Returns
    /// The number of bytes read. Zero means end of file.
    fn read(&mut self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Append bytes at the cursor of a write handle
    fn write(&mut self, handle: &mut Self::Handle, data: &[u8]) -> Result<(), StorageError>;

    /// Check whether a file exists
    fn exists(&self, name: &str) -> bool;

    /// File size in bytes, or `None` if the file does not exist
    fn size(&self, name: &str) -> Option<u32>;
}

/// Storage borrowed from a `'static` cell
impl<S: Storage + ?Sized> Storage for &mut S {
    type Handle = S::Handle;

    fn open(&mut self, name: &str) -> Result<Self::Handle, StorageError> {
        (**self).open(name)
    }

    fn create(&mut self, name: &str) -> Result<Self::Handle, StorageError> {
        (**self).create(name)
    }

    fn close(&mut self, handle: Self::Handle) -> Result<(), StorageError> {
        (**self).close(handle)
    }

    fn remove(&mut self, name: &str) -> Result<(), StorageError> {
        (**self).remove(name)
    }

    fn seek(&mut self, handle: &mut Self::Handle, offset: u32) -> Result<(), StorageError> {
        (**self).seek(handle, offset)
    }

    fn read(&mut self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read(handle, buf)
    }

    fn write(&mut self, handle: &mut Self::Handle, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(handle, data)
    }

    fn exists(&self, name: &str) -> bool {
        (**self).exists(name)
    }

    fn size(&self, name: &str) -> Option<u32> {
        (**self).size(name)
    }
}
