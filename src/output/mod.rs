//! Output persistence

use crate::error::Result;
use crate::metrics::OutputRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonlWriter;

impl JsonlWriter {
    /// Write one `{"prompt": ..., "added": ...}` line per record, in the
    /// order they completed.
    pub fn export(records: &[OutputRecord], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
