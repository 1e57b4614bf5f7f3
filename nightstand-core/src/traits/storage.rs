//! Non-volatile settings storage trait

use crate::config::SettingsBlock;

/// Errors from settings storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Nothing has been saved yet
    Absent,
    /// Data present but the marker, version or CRC does not match
    Corrupt,
    /// The underlying memory reported an error
    Io,
}

/// Trait for persisting the user settings block
///
/// Byte-level stores can use [`SettingsBlock::encode`] and
/// [`SettingsBlock::decode`], which add the validity marker and CRC.
pub trait SettingsStore {
    /// Load the stored settings
    fn load_settings(&mut self) -> Result<SettingsBlock, StorageError>;

    /// Persist the settings
    fn save_settings(&mut self, block: &SettingsBlock) -> Result<(), StorageError>;
}

/// Placeholder for boards without persistent memory
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStorage;

impl SettingsStore for NoStorage {
    fn load_settings(&mut self) -> Result<SettingsBlock, StorageError> {
        Err(StorageError::Absent)
    }

    fn save_settings(&mut self, _block: &SettingsBlock) -> Result<(), StorageError> {
        Ok(())
    }
}
