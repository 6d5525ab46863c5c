//! Write mock motor-imagery data for a batch of subjects.
//!
//! Usage: `mock-mi-batch [config.json]`. Without a configuration file 100
//! subjects, S0001 through S0100, are written with 80 to 120 samples each.
//! A subject that fails is reported and skipped; the exit status is an error
//! if any subject failed.

use mi_mockup::{init_logging, MockConfig, MockContext, MockParams, NativeTimestampPatcher};
use std::io::Write; // for flushing stdout

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Mock data parameters, from a file if one was given.
    let config = match std::env::args_os().nth(1) {
        Some(path) => MockConfig::from_json_file(path)?,
        None => MockConfig::batch().with_env(),
    };
    let params = MockParams::try_from(config)?;
    print!("{}", params);

    // Start the clock.
    let time = std::time::Instant::now();

    print!("Writing mock data...");
    std::io::stdout().flush()?;
    let mut ctx = MockContext::new(params);
    let report = ctx.run_batch(&NativeTimestampPatcher);
    println!(" done.\nTime elapsed: {:?}", time.elapsed());
    print!("{}", report);

    if report.all_written() {
        Ok(())
    } else {
        Err(format!("{} subjects failed", report.n_failed()).into())
    }
}
