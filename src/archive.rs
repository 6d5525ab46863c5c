//! Archive files holding one subject's signal, labels and metadata.
//!
//! An archive is a zip container in the same spirit as numpy's `.npz`:
//!
//! | entry             | content                                            |
//! |-------------------|----------------------------------------------------|
//! | `X.npy`           | f64 tensor of shape (samples, channels, timepoints) |
//! | `y.npy`           | i64 label vector of length samples                 |
//! | `subject.json`    | [`SubjectRecord`] as JSON                          |
//! | `__header__.json` | format name and version, generator                 |
//!
//! Keys are entry names without their extension. Keys starting with `__` are
//! reserved for the format and skipped by readers.

use crate::error::{MockError, Result};
use crate::signal::MockSignal;
use crate::subject::SubjectRecord;
use ndarray::{Array, Array1, Array3, Axis, Dim};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// File extension of archive files.
pub const ARCHIVE_EXTENSION: &str = "npz";

/// Name under which the format identifies itself in the header entry.
pub const FORMAT_NAME: &str = "mi-mockup archive";

/// Current version of the archive layout.
pub const FORMAT_VERSION: u32 = 1;

/// Prefix of keys reserved for format metadata.
pub const RESERVED_PREFIX: &str = "__";

const KEY_X: &str = "X";
const KEY_Y: &str = "y";
const KEY_SUBJECT: &str = "subject";
const KEY_HEADER: &str = "__header__";

/// Reserved header entry written first in every archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveHeader {
    pub format: String,
    pub version: u32,
    pub generator: String,
}
impl Default for ArchiveHeader {
    fn default() -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            version: FORMAT_VERSION,
            generator: concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Contents of one archive file.
#[derive(Clone, Debug)]
pub struct MiArchive {
    /// Samples x channels x time points signal
    pub x: Array<f64, Dim<[usize; 3]>>,
    /// Class label of each sample
    pub y: Array<i64, Dim<[usize; 1]>>,
    /// Subject metadata
    pub subject: SubjectRecord,
}
impl MiArchive {
    /// Bundle a generated signal with its subject record.
    pub fn new(signal: MockSignal<f64>, subject: SubjectRecord) -> Self {
        let MockSignal { x, y } = signal;
        Self { x, y, subject }
    }

    /// Write the archive to any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        write_entries(writer, &self.x, &self.y, &self.subject)
    }

    /// Write the archive to `path`, creating its parent directories as needed
    /// and replacing any existing file.
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_archive(path, &self.x, &self.y, &self.subject)
    }

    /// Read an archive from any seekable reader. `path` is only used to
    /// describe errors.
    pub fn read_from<R: Read + Seek>(reader: R, path: &Path) -> Result<Self> {
        let malformed = |reason: String| MockError::MalformedArchive {
            path: path.to_path_buf(),
            reason,
        };
        let mut zip = ZipArchive::new(reader)?;

        // Map keys to entry names, ignoring reserved entries.
        let entries = data_entries(&mut zip)?;
        let entry = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, name)| name.clone())
                .ok_or_else(|| malformed(format!("missing entry {}", key)))
        };
        let x_name = entry(KEY_X)?;
        let y_name = entry(KEY_Y)?;
        let subject_name = entry(KEY_SUBJECT)?;

        let x = Array3::<f64>::read_npy(zip.by_name(&x_name)?)?;
        let y = Array1::<i64>::read_npy(zip.by_name(&y_name)?)?;
        let subject: SubjectRecord = serde_json::from_reader(zip.by_name(&subject_name)?)?;

        if x.len_of(Axis(0)) != y.len() {
            return Err(malformed(format!(
                "X has {} samples but y has {} labels",
                x.len_of(Axis(0)),
                y.len()
            )));
        }
        Ok(Self { x, y, subject })
    }

    /// Read the archive at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), path)
    }
}
impl std::fmt::Display for MiArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "X: {:?}", self.x.shape())?;
        writeln!(f, "y: {:?}", self.y.shape())?;
        writeln!(f, "subject.id: {}", self.subject.id)?;
        writeln!(f, "subject.date: {}", self.subject.date)?;
        writeln!(f, "subject.ch_names: {}", self.subject.ch_names.join(", "))?;
        Ok(())
    }
}

/// Path of the archive for subject `id` inside `dir`.
pub fn archive_path<P: AsRef<Path>>(dir: P, id: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", id, ARCHIVE_EXTENSION))
}

/// Write `x`, `y` and `subject` to a new archive at `path`.
///
/// Missing parent directories are created. An existing file is overwritten.
pub fn write_archive<P: AsRef<Path>>(
    path: P,
    x: &Array<f64, Dim<[usize; 3]>>,
    y: &Array<i64, Dim<[usize; 1]>>,
    subject: &SubjectRecord,
) -> Result<()> {
    let path = path.as_ref();
    if x.len_of(Axis(0)) != y.len() {
        return Err(MockError::invalid(format!(
            "X has {} samples but y has {} labels",
            x.len_of(Axis(0)),
            y.len()
        )));
    }
    if let Some(parent) = path.parent() {
        // A no-op when the directory already exists.
        std::fs::create_dir_all(parent)?;
    }
    write_replacing(path, |file| write_entries(file, x, y, subject))
}

/// Run `write` against a sibling `.partial` file, then rename it over `path`.
/// On error the partial file is removed and `path` is left as it was.
fn write_replacing<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let result = File::create(&partial).map_err(MockError::from).and_then(|file| {
        let mut file = BufWriter::new(file);
        write(&mut file)?;
        file.flush()?;
        Ok(())
    });
    match result.and_then(|()| std::fs::rename(&partial, path).map_err(MockError::from)) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}

/// Read the archive at `path`.
pub fn read_archive<P: AsRef<Path>>(path: P) -> Result<MiArchive> {
    MiArchive::from_file(path)
}

/// Keys of the archive at `path`, excluding reserved keys, in file order.
pub fn archive_keys<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let file = File::open(path.as_ref())?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    Ok(data_entries(&mut zip)?.into_iter().map(|(key, _)| key).collect())
}

fn write_entries<W: Write + Seek>(
    writer: W,
    x: &Array<f64, Dim<[usize; 3]>>,
    y: &Array<i64, Dim<[usize; 1]>>,
    subject: &SubjectRecord,
) -> Result<()> {
    // Store entries uncompressed, like numpy.savez.
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new(writer);

    zip.start_file(format!("{}.json", KEY_HEADER), options)?;
    serde_json::to_writer(&mut zip, &ArchiveHeader::default())?;

    zip.start_file(format!("{}.npy", KEY_X), options)?;
    x.write_npy(&mut zip)?;

    zip.start_file(format!("{}.npy", KEY_Y), options)?;
    y.write_npy(&mut zip)?;

    zip.start_file(format!("{}.json", KEY_SUBJECT), options)?;
    serde_json::to_writer(&mut zip, subject)?;

    zip.finish()?;
    Ok(())
}

// (key, entry name) of every non-reserved entry, in file order.
fn data_entries<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let name = zip.by_index(i)?.name().to_string();
        let key = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
        if !key.starts_with(RESERVED_PREFIX) {
            entries.push((key.to_string(), name.clone()));
        }
    }
    Ok(entries)
}
