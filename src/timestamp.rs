//! Overwrite the creation time of written archives.
//!
//! Only some platforms let a process set a file's creation (birth) time.
//! Windows and macOS do, through [`std::fs::FileTimes`]. Everywhere else the
//! native patcher reports [`MockError::UnsupportedOperation`] and leaves the
//! file alone.

use crate::error::{MockError, Result};
use std::path::Path;
use std::time::SystemTime;

/// Something that can set the creation time of a file.
///
/// Implementations must never change the file's contents. A failure only
/// means the creation time was left as it was.
pub trait TimestampPatcher {
    /// Set the creation time of the file at `path` to `time`.
    fn patch_creation_time(&self, path: &Path, time: SystemTime) -> Result<()>;
}

/// Sets creation times with the platform's file APIs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeTimestampPatcher;

#[cfg(any(windows, target_os = "macos"))]
impl TimestampPatcher for NativeTimestampPatcher {
    fn patch_creation_time(&self, path: &Path, time: SystemTime) -> Result<()> {
        use std::fs::{FileTimes, OpenOptions};
        #[cfg(target_os = "macos")]
        use std::os::macos::fs::FileTimesExt;
        #[cfg(windows)]
        use std::os::windows::fs::FileTimesExt;

        // Write access is needed to change file times. Without truncate the
        // contents are untouched. The handle is closed when `file` drops,
        // including on the error path below.
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_times(FileTimes::new().set_created(time))?;
        Ok(())
    }
}

#[cfg(not(any(windows, target_os = "macos")))]
impl TimestampPatcher for NativeTimestampPatcher {
    fn patch_creation_time(&self, path: &Path, _time: SystemTime) -> Result<()> {
        Err(MockError::UnsupportedOperation(format!(
            "cannot set creation time of {} on {}",
            path.display(),
            std::env::consts::OS
        )))
    }
}

/// Never sets anything and always reports
/// [`MockError::UnsupportedOperation`]. Used when patching is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedTimestampPatcher;

impl TimestampPatcher for UnsupportedTimestampPatcher {
    fn patch_creation_time(&self, path: &Path, _time: SystemTime) -> Result<()> {
        Err(MockError::UnsupportedOperation(format!(
            "creation time patching is disabled for {}",
            path.display()
        )))
    }
}

/// Whether [`NativeTimestampPatcher`] can work on this platform.
pub const fn creation_time_supported() -> bool {
    cfg!(any(windows, target_os = "macos"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::time::{Duration, UNIX_EPOCH};

    fn scratch_file(dir: &tempfile::TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("S0001.npz");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn disabled_patcher_reports_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(&dir, b"payload");
        let err = UnsupportedTimestampPatcher
            .patch_creation_time(&path, UNIX_EPOCH)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
    }

    #[test]
    fn native_patch_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = scratch_file(&dir, b"0123456789");
        let time = UNIX_EPOCH + Duration::from_secs(1_753_263_005);
        let result = NativeTimestampPatcher.patch_creation_time(&path, time);
        if creation_time_supported() {
            result.unwrap();
            let created = std::fs::metadata(&path).unwrap().created().unwrap();
            assert_eq!(created, time);
        } else {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::UnsupportedOperation);
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");
    }

    #[test]
    fn native_patch_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.npz");
        let err = NativeTimestampPatcher.patch_creation_time(&path, UNIX_EPOCH).unwrap_err();
        if creation_time_supported() {
            assert_eq!(err.kind(), ErrorKind::Io);
        } else {
            assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
        }
    }
}
