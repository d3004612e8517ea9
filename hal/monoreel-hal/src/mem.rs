//! RAM-backed storage
//!
//! A fixed-capacity file table held entirely in memory. Used as the
//! upload target on boards without a file system, and as the storage
//! collaborator in host tests.

use heapless::{String, Vec};

use crate::storage::{Storage, StorageError, MAX_NAME_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Open handle into a [`MemStorage`]
///
/// Carries the generation of the file it was opened on; once that file
/// is removed or recreated the handle is rejected with
/// [`StorageError::InvalidHandle`].
#[derive(Debug)]
pub struct MemHandle {
    slot: usize,
    generation: u32,
    pos: u32,
    access: Access,
}

#[derive(Debug)]
struct Entry<const CAP: usize> {
    name: String<MAX_NAME_LEN>,
    data: Vec<u8, CAP>,
    generation: u32,
}

/// In-memory file table
///
/// - `FILES`: maximum number of files
/// - `CAP`: maximum size of each file in bytes
#[derive(Debug)]
pub struct MemStorage<const FILES: usize, const CAP: usize> {
    entries: Vec<Entry<CAP>, FILES>,
    next_generation: u32,
}

impl<const FILES: usize, const CAP: usize> Default for MemStorage<FILES, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FILES: usize, const CAP: usize> MemStorage<FILES, CAP> {
    /// Create an empty storage
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_generation: 1,
        }
    }

    /// Create or replace a file with the given contents in one step
    pub fn insert(&mut self, name: &str, contents: &[u8]) -> Result<(), StorageError> {
        let mut handle = self.create(name)?;
        self.write(&mut handle, contents)?;
        self.close(handle)
    }

    /// Borrow a file's contents
    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.find(name).map(|slot| self.entries[slot].data.as_slice())
    }

    /// Number of files currently stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no files are stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name.as_str() == name)
    }

    fn bump_generation(&mut self) -> u32 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        generation
    }

    fn entry_for(&mut self, handle: &MemHandle) -> Result<&mut Entry<CAP>, StorageError> {
        match self.entries.get_mut(handle.slot) {
            Some(entry) if entry.generation == handle.generation => Ok(entry),
            _ => Err(StorageError::InvalidHandle),
        }
    }
}

impl<const FILES: usize, const CAP: usize> Storage for MemStorage<FILES, CAP> {
    type Handle = MemHandle;

    fn open(&mut self, name: &str) -> Result<MemHandle, StorageError> {
        let slot = self.find(name).ok_or(StorageError::NotFound)?;
        Ok(MemHandle {
            slot,
            generation: self.entries[slot].generation,
            pos: 0,
            access: Access::Read,
        })
    }

    fn create(&mut self, name: &str) -> Result<MemHandle, StorageError> {
        if name.len() > MAX_NAME_LEN {
            return Err(StorageError::NameTooLong);
        }

        let generation = self.bump_generation();
        let slot = match self.find(name) {
            Some(slot) => {
                let entry = &mut self.entries[slot];
                entry.data.clear();
                entry.generation = generation;
                slot
            }
            None => {
                let mut entry_name = String::new();
                entry_name
                    .push_str(name)
                    .map_err(|_| StorageError::NameTooLong)?;
                self.entries
                    .push(Entry {
                        name: entry_name,
                        data: Vec::new(),
                        generation,
                    })
                    .map_err(|_| StorageError::TooManyFiles)?;
                self.entries.len() - 1
            }
        };

        Ok(MemHandle {
            slot,
            generation,
            pos: 0,
            access: Access::Write,
        })
    }

    fn close(&mut self, handle: MemHandle) -> Result<(), StorageError> {
        // Nothing is buffered; a stale handle is still reported
        self.entry_for(&handle).map(|_| ())
    }

    fn remove(&mut self, name: &str) -> Result<(), StorageError> {
        if let Some(slot) = self.find(name) {
            // swap_remove moves the last entry into `slot`; give it a new
            // generation so handles that point at its old slot go stale
            self.entries.swap_remove(slot);
            if slot < self.entries.len() {
                let generation = self.bump_generation();
                self.entries[slot].generation = generation;
            }
        }
        Ok(())
    }

    fn seek(&mut self, handle: &mut MemHandle, offset: u32) -> Result<(), StorageError> {
        self.entry_for(handle)?;
        handle.pos = offset;
        Ok(())
    }

    fn read(&mut self, handle: &mut MemHandle, buf: &mut [u8]) -> Result<usize, StorageError> {
        let entry = self.entry_for(handle)?;
        let start = (handle.pos as usize).min(entry.data.len());
        let n = buf.len().min(entry.data.len() - start);
        buf[..n].copy_from_slice(&entry.data[start..start + n]);
        handle.pos += n as u32;
        Ok(n)
    }

    fn write(&mut self, handle: &mut MemHandle, data: &[u8]) -> Result<(), StorageError> {
        if handle.access != Access::Write {
            return Err(StorageError::ReadOnly);
        }
        let entry = self.entry_for(handle)?;
        let pos = handle.pos as usize;
        if pos + data.len() > CAP {
            return Err(StorageError::Full);
        }
        if pos > entry.data.len() {
            entry
                .data
                .resize(pos, 0)
                .map_err(|_| StorageError::Full)?;
        }

        let overlap = (entry.data.len() - pos).min(data.len());
        entry.data[pos..pos + overlap].copy_from_slice(&data[..overlap]);
        entry
            .data
            .extend_from_slice(&data[overlap..])
            .map_err(|_| StorageError::Full)?;

        handle.pos += data.len() as u32;
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn size(&self, name: &str) -> Option<u32> {
        self.find(name).map(|slot| self.entries[slot].data.len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Ram = MemStorage<4, 256>;

    #[test]
    fn test_open_missing_file() {
        let mut storage = Ram::new();
        assert_eq!(storage.open("/movie.bin").err(), Some(StorageError::NotFound));
        assert!(!storage.exists("/movie.bin"));
        assert_eq!(storage.size("/movie.bin"), None);
    }

    #[test]
    fn test_write_then_read() {
        let mut storage = Ram::new();
        let mut w = storage.create("/movie.bin").unwrap();
        storage.write(&mut w, &[1, 2, 3]).unwrap();
        storage.write(&mut w, &[4, 5]).unwrap();
        storage.close(w).unwrap();

        assert_eq!(storage.size("/movie.bin"), Some(5));

        let mut r = storage.open("/movie.bin").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(storage.read(&mut r, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);
        // End of file
        assert_eq!(storage.read(&mut r, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_short_read_and_seek() {
        let mut storage = Ram::new();
        storage.insert("a", &[10, 11, 12, 13, 14]).unwrap();

        let mut r = storage.open("a").unwrap();
        storage.seek(&mut r, 3).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(storage.read(&mut r, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[13, 14]);

        storage.seek(&mut r, 0).unwrap();
        assert_eq!(storage.read(&mut r, &mut buf).unwrap(), 4);
        assert_eq!(buf, [10, 11, 12, 13]);

        // Seeking past the end reads nothing
        storage.seek(&mut r, 100).unwrap();
        assert_eq!(storage.read(&mut r, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_create_truncates() {
        let mut storage = Ram::new();
        storage.insert("a", &[1; 10]).unwrap();
        let w = storage.create("a").unwrap();
        assert_eq!(storage.size("a"), Some(0));
        storage.close(w).unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_stale_handle_after_recreate() {
        let mut storage = Ram::new();
        storage.insert("a", &[1, 2, 3]).unwrap();
        let mut r = storage.open("a").unwrap();

        storage.insert("a", &[9, 9, 9]).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(
            storage.read(&mut r, &mut buf),
            Err(StorageError::InvalidHandle)
        );
    }

    #[test]
    fn test_stale_handle_after_remove() {
        let mut storage = Ram::new();
        storage.insert("a", &[1]).unwrap();
        storage.insert("b", &[2]).unwrap();
        let mut rb = storage.open("b").unwrap();

        // Removing "a" moves "b" into slot 0; old handles must not alias
        storage.remove("a").unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(
            storage.read(&mut rb, &mut buf),
            Err(StorageError::InvalidHandle)
        );
        assert_eq!(storage.contents("b"), Some(&[2u8][..]));
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let mut storage = Ram::new();
        assert_eq!(storage.remove("nope"), Ok(()));
    }

    #[test]
    fn test_write_through_read_handle() {
        let mut storage = Ram::new();
        storage.insert("a", &[1]).unwrap();
        let mut r = storage.open("a").unwrap();
        assert_eq!(storage.write(&mut r, &[2]), Err(StorageError::ReadOnly));
    }

    #[test]
    fn test_capacity_limits() {
        let mut storage = MemStorage::<1, 4>::new();
        let mut w = storage.create("a").unwrap();
        assert_eq!(storage.write(&mut w, &[0; 5]), Err(StorageError::Full));
        storage.write(&mut w, &[0; 4]).unwrap();
        storage.close(w).unwrap();

        assert_eq!(storage.create("b").err(), Some(StorageError::TooManyFiles));
    }

    #[test]
    fn test_name_too_long() {
        let mut storage = Ram::new();
        let name = "/this/name/is/definitely/longer/than/32";
        assert_eq!(storage.create(name).err(), Some(StorageError::NameTooLong));
    }

    proptest! {
        #[test]
        fn chunked_writes_concatenate(chunks in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..40), 0..6)
        ) {
            let mut storage = Ram::new();
            let mut w = storage.create("s").unwrap();
            let mut expected = std::vec::Vec::new();
            for chunk in &chunks {
                storage.write(&mut w, chunk).unwrap();
                expected.extend_from_slice(chunk);
            }
            storage.close(w).unwrap();
            prop_assert_eq!(storage.contents("s").unwrap(), expected.as_slice());
        }
    }
}
