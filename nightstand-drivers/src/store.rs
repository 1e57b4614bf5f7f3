//! Settings storage over byte-addressable memory
//!
//! Any memory that can read and rewrite one small region (EEPROM, a
//! battery-backed RTC RAM, a reserved flash page) can hold the settings
//! block. Framing and CRC come from
//! [`SettingsBlock`](nightstand_core::config::SettingsBlock).

use nightstand_core::config::{SettingsBlock, SETTINGS_BUFFER_SIZE};
use nightstand_core::traits::{SettingsStore, StorageError};

/// Raw access to the settings region
pub trait ByteStorage {
    /// Read the region into `buf`, returning the number of bytes read
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Replace the region with `data`
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError>;
}

/// [`SettingsStore`] on top of a [`ByteStorage`]
pub struct ByteStore<S> {
    storage: S,
}

impl<S: ByteStorage> ByteStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: ByteStorage> SettingsStore for ByteStore<S> {
    fn load_settings(&mut self) -> Result<SettingsBlock, StorageError> {
        let mut buf = [0xFFu8; SETTINGS_BUFFER_SIZE];
        let len = self.storage.read(&mut buf)?;
        SettingsBlock::decode(&buf[..len.min(SETTINGS_BUFFER_SIZE)])
    }

    fn save_settings(&mut self, block: &SettingsBlock) -> Result<(), StorageError> {
        let mut buf = [0u8; SETTINGS_BUFFER_SIZE];
        let used = block.encode(&mut buf)?;
        self.storage.write(used)
    }
}

/// RAM-backed region, erased to `0xFF`
///
/// Useful on boards with battery-backed SRAM and for host-side testing.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    data: [u8; N],
    writes: u32,
}

impl<const N: usize> MemoryStorage<N> {
    pub const fn new() -> Self {
        Self {
            data: [0xFF; N],
            writes: 0,
        }
    }

    /// Erase the region
    pub fn erase(&mut self) {
        self.data = [0xFF; N];
    }

    /// Number of completed writes
    pub fn writes(&self) -> u32 {
        self.writes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStorage for MemoryStorage<N> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, StorageError> {
        let len = buf.len().min(N);
        buf[..len].copy_from_slice(&self.data[..len]);
        Ok(len)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > N {
            return Err(StorageError::Io);
        }
        self.data = [0xFF; N];
        self.data[..data.len()].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nightstand_core::alarm::AlarmState;
    use nightstand_core::config::UserSettings;

    use super::*;

    #[test]
    fn test_round_trip() {
        let mut store = ByteStore::new(MemoryStorage::<256>::new());
        let mut settings = UserSettings::default();
        settings.alarm.hour = 5;
        settings.alarm.minute = 45;
        settings.alarm.state = AlarmState::On;

        store.save_settings(&SettingsBlock::new(settings)).unwrap();
        let loaded = store.load_settings().unwrap();
        assert_eq!(loaded.settings, settings);
        assert_eq!(store.storage().writes(), 1);
    }

    #[test]
    fn test_erased_is_absent() {
        let mut store = ByteStore::new(MemoryStorage::<256>::new());
        assert_eq!(store.load_settings(), Err(StorageError::Absent));
    }

    #[test]
    fn test_corrupt_detected() {
        let mut store = ByteStore::new(MemoryStorage::<256>::new());
        store
            .save_settings(&SettingsBlock::new(UserSettings::default()))
            .unwrap();

        // Clobber the magic number
        store.storage_mut().as_bytes_mut()[0] ^= 0x5A;
        assert_eq!(store.load_settings(), Err(StorageError::Corrupt));
    }

    #[test]
    fn test_region_too_small() {
        let mut store = ByteStore::new(MemoryStorage::<8>::new());
        let result = store.save_settings(&SettingsBlock::new(UserSettings::default()));
        assert_eq!(result, Err(StorageError::Io));
    }
}
