//! On-disk record store backing one product-tree level of the low-memory
//! engine. Each record is an 8-byte big-endian length prefix followed by
//! the big-endian bytes of one `Natural`, mirroring the wire-style framing
//! the reference implementation's temp-file spill uses.
//!
//! A level is written sequentially while its product-tree pass runs, then
//! seeked back to the start and read sequentially during the remainder
//! pass. `tempfile::NamedTempFile` unlinks the backing file once dropped,
//! so a level's disk usage never outlives the run that created it.

use crate::error::EngineError;
use batchgcd_bigint::Natural;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

pub struct SpillFile {
    file: tempfile::NamedTempFile,
    written: u64,
    read: u64,
}

impl SpillFile {
    pub fn new(dir: &Path) -> Result<Self, EngineError> {
        let file = tempfile::Builder::new().prefix("batchgcd-level-").tempfile_in(dir)?;
        Ok(SpillFile { file, written: 0, read: 0 })
    }

    pub fn write(&mut self, n: &Natural) -> Result<(), EngineError> {
        let bytes = n.to_bytes_be();
        let f = self.file.as_file_mut();
        f.write_all(&(bytes.len() as u64).to_be_bytes())?;
        f.write_all(&bytes)?;
        self.written += 1;
        Ok(())
    }

    /// Flips the file from write mode to read mode. Must only be called
    /// once the level's product-tree pass has fully finished writing.
    pub fn rewind_for_reading(&mut self) -> Result<(), EngineError> {
        self.file.as_file_mut().seek(SeekFrom::Start(0))?;
        Ok(())
    }

    /// Reads the next record, or `None` at end of file.
    pub fn read_next(&mut self) -> Result<Option<Natural>, EngineError> {
        let f = self.file.as_file_mut();
        let mut len_buf = [0u8; 8];
        match f.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        let len = u64::from_be_bytes(len_buf) as usize;
        let mut buf = vec![0u8; len];
        f.read_exact(&mut buf)?;
        self.read += 1;
        Ok(Some(Natural::from_bytes_be(&buf)))
    }

    /// Every record written must be read back exactly once; a mismatch
    /// means the level/remainder bookkeeping lost track of a node.
    pub fn assert_fully_consumed(&self) -> Result<(), EngineError> {
        if self.written != self.read {
            return Err(EngineError::SpillInvariant(format!(
                "spilled {} records but only read back {}",
                self.written, self.read
            )));
        }
        Ok(())
    }
}
