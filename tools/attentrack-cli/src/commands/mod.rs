pub mod config;
pub mod score;
pub mod track;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Open `path` for writing, or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Write one record as a JSON line.
pub fn write_record<T: serde::Serialize>(out: &mut dyn Write, record: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    Ok(())
}
