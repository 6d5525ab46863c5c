//! Write mock motor-imagery data for a single subject and read it back.
//!
//! Usage: `mock-mi [config.json]`. Without a configuration file the subject
//! is S0001 with 100 samples, 22 channels and 1000 time points, recorded some
//! time in July 2025, written to `./data` (or `$MI_MOCK_OUTPUT_DIR`).

use mi_mockup::{
    archive_keys, init_logging, MiArchive, MockConfig, MockContext, MockParams,
    NativeTimestampPatcher, PatchStatus,
};
use std::io::Write; // for flushing stdout

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Mock data parameters, from a file if one was given.
    let config = match std::env::args_os().nth(1) {
        Some(path) => MockConfig::from_json_file(path)?,
        None => MockConfig::default().with_env(),
    };
    let params = MockParams::try_from(config)?;
    print!("{}", params);

    // Generate and write the first subject.
    print!("Writing mock data...");
    std::io::stdout().flush()?;
    let first = params.first_subject;
    let mut ctx = MockContext::new(params);
    let outcome = ctx.run_subject(first, &NativeTimestampPatcher)?;
    println!(" done.");
    println!("Random MI data saved to {}", outcome.path.display());
    match &outcome.patch {
        PatchStatus::Patched => println!("Creation time set to the recording date."),
        PatchStatus::Skipped => {}
        PatchStatus::Unsupported(e) | PatchStatus::Failed(e) => {
            println!("Creation time not set: {}", e)
        }
    }

    // Read the archive back to make sure it round trips.
    println!("Loaded keys: {:?}", archive_keys(&outcome.path)?);
    let archive = MiArchive::from_file(&outcome.path)?;
    print!("{}", archive);

    Ok(())
}
