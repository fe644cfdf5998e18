use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use serialscope::{
    BaudRate, SerialTransport, SessionHandle, SessionState, SimulatedTransport, Transport,
};

const DEMO_RUNTIME: Duration = Duration::from_secs(10);

/// Terminal monitor: `serialscope [PORT [BAUD]]`. Without arguments it
/// streams from the built-in simulated instrument. Prints live samples for
/// a short run, then dumps the CSV export to stdout.
fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);

    let transport: Box<dyn Transport> = match args.next() {
        Some(port) => {
            let baud = match args.next() {
                Some(raw) => {
                    let bits: u32 = raw.parse().context("BAUD must be an integer")?;
                    match BaudRate::from_bits_per_second(bits) {
                        Some(baud) => baud,
                        None => bail!("unsupported baud rate {bits}"),
                    }
                }
                None => BaudRate::default(),
            };
            eprintln!("opening {port} at {} baud", baud.bits_per_second());
            Box::new(SerialTransport::open(&port, baud)?)
        }
        None => {
            eprintln!("no port given, streaming from the simulated instrument");
            Box::new(SimulatedTransport::new(3))
        }
    };

    let mut handle = SessionHandle::new();
    handle.connect(transport);

    let started = Instant::now();
    while started.elapsed() < DEMO_RUNTIME {
        thread::sleep(Duration::from_millis(500));
        match handle.state() {
            SessionState::Error => eprintln!("transport error, retry shortly"),
            SessionState::Idle => {
                eprintln!("stream ended");
                break;
            }
            _ => {}
        }
        if let Some(sample) = handle.window(1).pop() {
            let fields: Vec<String> =
                sample.values.iter().map(|v| format!("{v:.4}")).collect();
            eprintln!(
                "[{}] t={:8.3}s  {}",
                sample.wall_clock,
                sample.relative_s,
                fields.join("  ")
            );
        }
    }

    handle.disconnect();
    eprintln!(
        "captured {} samples across {} channels",
        handle.sample_count(),
        handle.channels().len()
    );
    std::io::stdout()
        .write_all(handle.export_csv().as_bytes())
        .context("failed to write CSV to stdout")?;
    Ok(())
}
