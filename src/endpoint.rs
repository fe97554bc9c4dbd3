use crate::errors::Result;
use crate::records::{FileHandle, FileRecord};

pub trait StorageEndpoint: Send + Sync {
    // The place file data would be sent to. The store owns the records and
    // the timing; an endpoint only decides whether each backend call succeeds.
    // There is no real storage service yet, so the only endpoint shipped is the
    // mock, which accepts everything.

    fn is_available(&self) -> Result<()>;
    fn upload_chunk(&self, handle: &FileHandle, step: u32, total_steps: u32) -> Result<()>;
    fn delete_file(&self, record: Option<&FileRecord>) -> Result<()>;
    fn create_folder(&self, path: &str) -> Result<()>;
    fn delete_folder(&self, path: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MockEndpoint;

impl StorageEndpoint for MockEndpoint {
    fn is_available(&self) -> Result<()> {
        Ok(())
    }

    fn upload_chunk(&self, _handle: &FileHandle, _step: u32, _total_steps: u32) -> Result<()> {
        Ok(())
    }

    fn delete_file(&self, _record: Option<&FileRecord>) -> Result<()> {
        Ok(())
    }

    fn create_folder(&self, _path: &str) -> Result<()> {
        Ok(())
    }

    fn delete_folder(&self, _path: &str) -> Result<()> {
        Ok(())
    }
}
