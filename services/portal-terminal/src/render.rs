use std::io::{self, Write};
use wp_api_types::WaveRecord;

/// One block per wave: address, mined time, message.
pub fn write_wave(out: &mut impl Write, record: &WaveRecord) -> io::Result<()> {
    writeln!(out, "Address: {}", record.address)?;
    writeln!(out, "Time: {}", record.display_time())?;
    writeln!(out, "Message: {}", record.message)?;
    writeln!(out)
}

pub fn write_waves(out: &mut impl Write, records: &[WaveRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No waves yet.");
    }
    for record in records {
        write_wave(out, record)?;
    }
    Ok(())
}
