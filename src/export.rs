use std::io::{self, BufWriter, Write};

use crate::channel::ChannelRegistry;
use crate::sample::Sample;

/// Serializes the full series as delimited text: a header row
/// `Timestamp (s),Time,<display name per channel>`, then one row per
/// sample with the relative timestamp fixed to 3 decimals. Channels a
/// sample did not carry are left empty.
pub fn write_csv<W: Write>(
    out: &mut W,
    samples: &[Sample],
    registry: &ChannelRegistry,
) -> io::Result<()> {
    write!(out, "Timestamp (s),Time")?;
    for name in registry.display_names() {
        write!(out, ",{name}")?;
    }
    writeln!(out)?;
    for sample in samples {
        write!(out, "{:.3},{}", sample.relative_s, sample.wall_clock)?;
        for index in 0..registry.len() {
            match sample.value_at(index) {
                Some(value) => write!(out, ",{value}")?,
                None => write!(out, ",")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// In-memory rendering of `write_csv`.
pub fn render_csv(samples: &[Sample], registry: &ChannelRegistry) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_csv(&mut buf, samples, registry);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Buffered export straight to a file or socket.
pub fn write_csv_buffered<W: Write>(
    out: W,
    samples: &[Sample],
    registry: &ChannelRegistry,
) -> io::Result<()> {
    let mut writer = BufWriter::new(out);
    write_csv(&mut writer, samples, registry)?;
    writer.flush()
}
