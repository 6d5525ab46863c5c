//! Generate mock motor-imagery (MI) recordings.
//!
//! Each subject gets a samples x channels x time points tensor of standard
//! normal noise, one class label per sample and a small metadata record. The
//! three are saved together in one archive file per subject, see
//! [`archive`]. Optionally the archive's creation time is set to the
//! synthesized recording date.
//!
//! ```no_run
//! use mi_mockup::{MockContext, MockParams, NativeTimestampPatcher};
//!
//! let mut ctx = MockContext::new(MockParams::batch());
//! let report = ctx.run_batch(&NativeTimestampPatcher);
//! print!("{}", report);
//! ```

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod signal;
pub mod subject;
pub mod timestamp;

pub use archive::{archive_keys, archive_path, read_archive, write_archive, MiArchive};
pub use batch::{BatchReport, MockContext, PatchStatus, SubjectOutcome};
pub use config::{MockConfig, MockParams, SampleRange};
pub use error::{ErrorKind, MockError, Result};
pub use logging::init_logging;
pub use signal::{generate, MockSignal, SignalShape};
pub use subject::{channel_names, random_datetime_using, subject_id, DateRange, SubjectRecord};
pub use timestamp::{NativeTimestampPatcher, TimestampPatcher, UnsupportedTimestampPatcher};
