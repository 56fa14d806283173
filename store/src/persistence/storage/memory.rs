use super::{Storage, StorageResult};

#[derive(Default)]
pub struct MemoryStorage {
    log: Vec<u8>,
}

impl Storage for MemoryStorage {
    fn init(&mut self) -> StorageResult<()> {
        Ok(())
    }

    fn transaction_write(&mut self, transaction: &[u8]) -> StorageResult<()> {
        self.log.extend_from_slice(transaction);

        Ok(())
    }

    fn transaction_sync(&self) -> StorageResult<()> {
        Ok(())
    }

    fn transaction_discard(&mut self, length: usize) -> StorageResult<()> {
        self.log.truncate(self.log.len().saturating_sub(length));

        Ok(())
    }

    fn transaction_load(&mut self) -> StorageResult<String> {
        Ok(String::from_utf8_lossy(&self.log).into_owned())
    }
}
