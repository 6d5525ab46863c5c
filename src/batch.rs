//! Generate, write and timestamp one archive per subject.

use crate::archive::{archive_path, MiArchive};
use crate::config::MockParams;
use crate::error::{ErrorKind, MockError, Result};
use crate::signal::{MockSignal, SignalShape};
use crate::subject::{channel_names, subject_id, SubjectRecord};
use crate::timestamp::TimestampPatcher;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::rc::Rc;

/// What happened to the creation time of a written archive.
#[derive(Debug)]
pub enum PatchStatus {
    /// The creation time now matches the recording date.
    Patched,
    /// Patching was switched off in the parameters.
    Skipped,
    /// The platform cannot set creation times.
    Unsupported(MockError),
    /// Setting the creation time failed for another reason.
    Failed(MockError),
}

/// A subject whose archive was written.
#[derive(Debug)]
pub struct SubjectOutcome {
    pub id: String,
    pub path: PathBuf,
    pub n_samples: usize,
    pub patch: PatchStatus,
}

/// Result of every subject in a batch, in order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub subjects: Vec<(String, Result<SubjectOutcome>)>,
}
impl BatchReport {
    /// Number of subjects whose archive was written.
    pub fn n_written(&self) -> usize {
        self.subjects.iter().filter(|(_, result)| result.is_ok()).count()
    }

    /// Number of subjects that failed.
    pub fn n_failed(&self) -> usize {
        self.subjects.len() - self.n_written()
    }

    /// True when every archive was written.
    pub fn all_written(&self) -> bool {
        self.n_failed() == 0
    }
}
impl std::fmt::Display for BatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (id, result) in &self.subjects {
            match result {
                Ok(outcome) => {
                    let patch = match &outcome.patch {
                        PatchStatus::Patched => "creation time set",
                        PatchStatus::Skipped => "creation time left alone",
                        PatchStatus::Unsupported(_) => "creation time unsupported",
                        PatchStatus::Failed(_) => "creation time failed",
                    };
                    writeln!(
                        f,
                        "{}: {} samples -> {} ({})",
                        id,
                        outcome.n_samples,
                        outcome.path.display(),
                        patch
                    )?;
                }
                Err(e) => writeln!(f, "{}: failed: {}", id, e)?,
            }
        }
        writeln!(f, "Wrote {} of {} subjects.", self.n_written(), self.subjects.len())
    }
}

/// Everything a run needs: parameters, the random source and the channel names
/// shared by all subjects.
pub struct MockContext<R = StdRng> {
    params: MockParams,
    rng: R,
    ch_names: Rc<[String]>,
}
impl MockContext<StdRng> {
    /// Seed from `params.seed`, or from entropy when there is none.
    pub fn new(params: MockParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(params, rng)
    }
}
impl<R: Rng> MockContext<R> {
    /// Use the given random number generator and ignore `params.seed`.
    pub fn with_rng(params: MockParams, rng: R) -> Self {
        let ch_names = channel_names(params.n_channels.get());
        Self {
            params,
            rng,
            ch_names,
        }
    }

    pub fn params(&self) -> &MockParams {
        &self.params
    }

    pub fn channel_names(&self) -> &Rc<[String]> {
        &self.ch_names
    }

    /// Draw the number of samples for the next subject.
    fn draw_n_samples(&mut self) -> usize {
        let samples = self.params.samples;
        self.rng
            .gen_range(samples.min_samples().get()..=samples.max_samples_inclusive().get())
    }

    /// Generate the signal and record of subject `index` without writing
    /// anything.
    pub fn generate_subject(&mut self, index: usize) -> Result<MiArchive> {
        let n_samples = self.draw_n_samples();
        let shape = SignalShape::new_from_usize(
            n_samples,
            self.params.n_channels.get(),
            self.params.n_timepoints.get(),
            self.params.n_classes.get(),
        )?;
        let signal = MockSignal::<f64>::generate_using(shape, &mut self.rng);
        let date = self.params.dates.sample(&mut self.rng)?;
        let record = SubjectRecord::build(subject_id(index), date, self.ch_names.clone());
        Ok(MiArchive::new(signal, record))
    }

    /// Generate subject `index`, write its archive to the output directory and
    /// set the archive's creation time to the recording date.
    ///
    /// A failed creation-time patch does not fail the subject. It is logged
    /// and reported in [`SubjectOutcome::patch`].
    pub fn run_subject(
        &mut self,
        index: usize,
        patcher: &dyn TimestampPatcher,
    ) -> Result<SubjectOutcome> {
        let archive = self.generate_subject(index)?;
        let path = archive_path(&self.params.output_dir, &archive.subject.id);
        archive.save_file(&path)?;
        tracing::info!(
            id = %archive.subject.id,
            path = %path.display(),
            samples = archive.y.len(),
            "wrote archive"
        );

        let patch = if self.params.patch_creation_time {
            match archive
                .subject
                .timestamp()
                .and_then(|time| patcher.patch_creation_time(&path, time))
            {
                Ok(()) => PatchStatus::Patched,
                Err(e) if e.kind() == ErrorKind::UnsupportedOperation => {
                    tracing::warn!(id = %archive.subject.id, "creation time not set: {}", e);
                    PatchStatus::Unsupported(e)
                }
                Err(e) => {
                    tracing::warn!(id = %archive.subject.id, "creation time not set: {}", e);
                    PatchStatus::Failed(e)
                }
            }
        } else {
            PatchStatus::Skipped
        };

        Ok(SubjectOutcome {
            id: archive.subject.id,
            path,
            n_samples: archive.y.len(),
            patch,
        })
    }

    /// Run every subject in turn. A subject that fails is logged and the
    /// batch moves on to the next one.
    pub fn run_batch(&mut self, patcher: &dyn TimestampPatcher) -> BatchReport {
        let first = self.params.first_subject;
        let last = first + self.params.n_subjects.get();
        let mut report = BatchReport::default();
        for index in first..last {
            let id = subject_id(index);
            let result = self.run_subject(index, patcher);
            if let Err(e) = &result {
                tracing::error!(id = %id, "subject failed: {}", e);
            }
            report.subjects.push((id, result));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockConfig;
    use crate::timestamp::UnsupportedTimestampPatcher;
    use std::path::Path;
    use std::time::SystemTime;

    // Patcher that records the calls it gets and always succeeds.
    #[derive(Default)]
    struct RecordingPatcher {
        calls: std::cell::RefCell<Vec<(PathBuf, SystemTime)>>,
    }
    impl TimestampPatcher for RecordingPatcher {
        fn patch_creation_time(&self, path: &Path, time: SystemTime) -> Result<()> {
            self.calls.borrow_mut().push((path.to_path_buf(), time));
            Ok(())
        }
    }

    fn small_params(dir: &Path) -> MockParams {
        MockParams::try_from(MockConfig {
            n_subjects: 3,
            min_samples: 4,
            max_samples: 9,
            n_channels: 3,
            n_timepoints: 5,
            n_classes: 3,
            output_dir: dir.to_path_buf(),
            seed: Some(99),
            ..MockConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn sample_counts_stay_in_range() {
        let params = small_params(Path::new("unused"));
        let mut ctx = MockContext::new(params);
        for index in 1..=50 {
            let archive = ctx.generate_subject(index).unwrap();
            let n = archive.y.len();
            assert!((4..=9).contains(&n), "{}", n);
            assert_eq!(archive.x.dim(), (n, 3, 5));
            assert!(Rc::ptr_eq(&archive.subject.ch_names, ctx.channel_names()));
        }
    }

    #[test]
    fn seeded_contexts_agree() {
        let params = small_params(Path::new("unused"));
        let a = MockContext::new(params.clone()).generate_subject(1).unwrap();
        let b = MockContext::new(params).generate_subject(1).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        assert_eq!(a.subject, b.subject);
    }

    #[test]
    fn batch_patches_with_recording_date() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let mut ctx = MockContext::new(small_params(&dir));
        let patcher = RecordingPatcher::default();
        let report = ctx.run_batch(&patcher);
        assert!(report.all_written(), "{}", report);

        let calls = patcher.calls.borrow();
        assert_eq!(calls.len(), 3);
        for ((id, result), (path, time)) in report.subjects.iter().zip(calls.iter()) {
            let outcome = result.as_ref().unwrap();
            assert!(matches!(outcome.patch, PatchStatus::Patched));
            assert_eq!(&outcome.path, path);
            let archive = MiArchive::from_file(path).unwrap();
            assert_eq!(&archive.subject.id, id);
            assert_eq!(archive.subject.timestamp().unwrap(), *time);
        }
    }

    #[test]
    fn unsupported_patch_keeps_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let mut ctx = MockContext::new(small_params(&dir));
        let report = ctx.run_batch(&UnsupportedTimestampPatcher);
        assert_eq!(report.n_written(), 3);
        for (id, result) in &report.subjects {
            let outcome = result.as_ref().unwrap();
            assert!(matches!(outcome.patch, PatchStatus::Unsupported(_)));
            let archive = MiArchive::from_file(&outcome.path).unwrap();
            assert_eq!(&archive.subject.id, id);
            assert_eq!(archive.y.len(), outcome.n_samples);
        }
    }

    #[test]
    fn disabled_patch_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let mut params = small_params(&dir);
        params.patch_creation_time = false;
        let patcher = RecordingPatcher::default();
        let report = MockContext::new(params).run_batch(&patcher);
        assert!(report.all_written());
        assert!(patcher.calls.borrow().is_empty());
        assert!(report
            .subjects
            .iter()
            .all(|(_, r)| matches!(r.as_ref().unwrap().patch, PatchStatus::Skipped)));
    }

    #[test]
    fn failed_subject_does_not_stop_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        // A directory where the second archive should go makes that write fail.
        std::fs::create_dir_all(dir.join("S0002.npz")).unwrap();
        let report = MockContext::new(small_params(dir)).run_batch(&UnsupportedTimestampPatcher);
        assert_eq!(report.n_written(), 2);
        assert_eq!(report.n_failed(), 1);
        let (id, result) = &report.subjects[1];
        assert_eq!(id, "S0002");
        assert_eq!(result.as_ref().unwrap_err().kind(), ErrorKind::Io);
        assert!(dir.join("S0003.npz").is_file());
        assert!(report.to_string().contains("S0002: failed"));
        assert!(!dir.join("S0002.npz.partial").exists());
    }
}
