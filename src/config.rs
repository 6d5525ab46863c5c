//! Run parameters: a serde-friendly [`MockConfig`] and its validated form,
//! [`MockParams`].

use crate::error::{MockError, Result};
use crate::subject::DateRange;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the output directory.
pub const OUTPUT_DIR_ENV: &str = "MI_MOCK_OUTPUT_DIR";

/// Range of samples per subject.
///
/// The number of samples can range from `min_samples` up to and including
/// `max_samples_inclusive`. When both are equal every subject gets the same
/// number of samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRange {
    // Minimum number of samples
    min_samples: NonZeroUsize,
    // Maximum number of samples
    max_samples_inclusive: NonZeroUsize,
}
impl SampleRange {
    /// Make a new `SampleRange` ranging from `min_samples` up to and including
    /// `max_samples_inclusive`. Returns None if either is zero or if the
    /// maximum is less than the minimum.
    pub fn new_from_usize((min_samples, max_samples_inclusive): (usize, usize)) -> Option<Self> {
        let min_samples = NonZeroUsize::new(min_samples)?;
        let max_samples_inclusive = NonZeroUsize::new(max_samples_inclusive)?;
        (max_samples_inclusive >= min_samples).then_some(Self {
            min_samples,
            max_samples_inclusive,
        })
    }

    /// Gets the enclosed minimum number of samples.
    pub fn min_samples(&self) -> NonZeroUsize {
        self.min_samples
    }

    /// Gets the enclosed maximum number of samples. The number of samples can
    /// be up to and _including_ this value.
    pub fn max_samples_inclusive(&self) -> NonZeroUsize {
        self.max_samples_inclusive
    }

    /// True when the range holds a single value.
    pub fn is_fixed(&self) -> bool {
        self.min_samples == self.max_samples_inclusive
    }
}
impl std::fmt::Display for SampleRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_fixed() {
            write!(f, "Samples per subject: {}", self.min_samples)
        } else {
            write!(
                f,
                "Samples per subject from {} up to and including {}",
                self.min_samples, self.max_samples_inclusive
            )
        }
    }
}

/// Run configuration as read from a JSON file. Every field has a default, so
/// `{}` is a valid configuration for a single subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MockConfig {
    pub n_subjects: usize,
    pub first_subject: usize,
    pub min_samples: usize,
    pub max_samples: usize,
    pub n_channels: usize,
    pub n_timepoints: usize,
    pub n_classes: usize,
    pub output_dir: PathBuf,
    pub years: (i32, i32),
    pub months: (u32, u32),
    pub day: Option<u32>,
    pub seed: Option<u64>,
    pub patch_creation_time: bool,
}
impl Default for MockConfig {
    fn default() -> Self {
        Self {
            n_subjects: 1,
            first_subject: 1,
            min_samples: 100,
            max_samples: 100,
            n_channels: 22,
            n_timepoints: 1000,
            n_classes: 2,
            output_dir: PathBuf::from("data"),
            years: (2025, 2025),
            months: (7, 7),
            day: None,
            seed: None,
            patch_creation_time: true,
        }
    }
}
impl MockConfig {
    /// Configuration of a 100 subject batch with 80 to 120 samples each.
    pub fn batch() -> Self {
        Self {
            n_subjects: 100,
            min_samples: 80,
            max_samples: 120,
            months: (1, 12),
            ..Self::default()
        }
    }

    /// Read a configuration from a JSON file, then apply the environment.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(config.with_env())
    }

    /// Replace the output directory with `$MI_MOCK_OUTPUT_DIR` when set.
    pub fn with_env(mut self) -> Self {
        if let Some(dir) = std::env::var_os(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }
}

/// Validated parameters for generating mock data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockParams {
    /// Number of subjects
    pub n_subjects: NonZeroUsize,
    /// Index of the first subject, i.e. 1 for `S0001`
    pub first_subject: usize,
    /// Range of possible samples per subject
    pub samples: SampleRange,
    /// Number of channels
    pub n_channels: NonZeroUsize,
    /// Number of time points per sample
    pub n_timepoints: NonZeroUsize,
    /// Number of classes
    pub n_classes: NonZeroUsize,
    /// Directory receiving the archives
    pub output_dir: PathBuf,
    /// Range of synthesized recording dates
    pub dates: DateRange,
    /// Seed of the random number generator, from entropy if None
    pub seed: Option<u64>,
    /// Whether to set each archive's creation time to its recording date
    pub patch_creation_time: bool,
}
impl MockParams {
    /// Parameters of a 100 subject batch, see [`MockConfig::batch()`].
    pub fn batch() -> Self {
        // The preset is known to be valid.
        Self::try_from(MockConfig::batch()).unwrap()
    }
}
impl Default for MockParams {
    fn default() -> Self {
        Self::try_from(MockConfig::default()).unwrap()
    }
}
impl TryFrom<MockConfig> for MockParams {
    type Error = MockError;

    fn try_from(config: MockConfig) -> Result<Self> {
        let nonzero = |value: usize, name: &str| {
            NonZeroUsize::new(value)
                .ok_or_else(|| MockError::invalid(format!("{} must be positive", name)))
        };
        let samples = SampleRange::new_from_usize((config.min_samples, config.max_samples))
            .ok_or_else(|| {
                MockError::invalid(format!(
                    "sample range {}..={} must be positive and non-empty",
                    config.min_samples, config.max_samples
                ))
            })?;
        let n_subjects = nonzero(config.n_subjects, "number of subjects")?;
        // Subject ids are four digits wide.
        let last_subject = config.first_subject.saturating_add(n_subjects.get() - 1);
        if last_subject > 9999 {
            return Err(MockError::invalid(format!(
                "subject index {} does not fit in a four digit id",
                last_subject
            )));
        }
        Ok(Self {
            n_subjects,
            first_subject: config.first_subject,
            samples,
            n_channels: nonzero(config.n_channels, "number of channels")?,
            n_timepoints: nonzero(config.n_timepoints, "number of time points")?,
            n_classes: nonzero(config.n_classes, "number of classes")?,
            output_dir: config.output_dir,
            dates: DateRange::new(config.years, config.months, config.day)?,
            seed: config.seed,
            patch_creation_time: config.patch_creation_time,
        })
    }
}
impl std::fmt::Display for MockParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "Mock data parameters:")?;
        writeln!(f, "Number of subjects: {}", self.n_subjects)?;
        writeln!(f, "First subject: {}", self.first_subject)?;
        writeln!(f, "{}", self.samples)?;
        writeln!(f, "Number of channels: {}", self.n_channels)?;
        writeln!(f, "Number of time points: {}", self.n_timepoints)?;
        writeln!(f, "Number of classes: {}", self.n_classes)?;
        writeln!(f, "Output directory: {}", self.output_dir.display())?;
        writeln!(f, "{}", self.dates)?;
        match self.seed {
            Some(seed) => writeln!(f, "Random seed: {}", seed)?,
            None => writeln!(f, "Random seed: from entropy")?,
        }
        writeln!(f, "Patch creation time: {}", self.patch_creation_time)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn sample_range_bounds() {
        assert!(SampleRange::new_from_usize((0, 10)).is_none());
        assert!(SampleRange::new_from_usize((10, 0)).is_none());
        assert!(SampleRange::new_from_usize((12, 10)).is_none());
        let range = SampleRange::new_from_usize((80, 120)).unwrap();
        assert_eq!(range.min_samples().get(), 80);
        assert_eq!(range.max_samples_inclusive().get(), 120);
        assert!(!range.is_fixed());
        assert!(SampleRange::new_from_usize((100, 100)).unwrap().is_fixed());
    }

    #[test]
    fn presets_are_valid() {
        let single = MockParams::default();
        assert_eq!(single.n_subjects.get(), 1);
        assert_eq!(single.samples, SampleRange::new_from_usize((100, 100)).unwrap());
        assert_eq!(single.n_channels.get(), 22);
        assert_eq!(single.n_timepoints.get(), 1000);
        assert_eq!(single.n_classes.get(), 2);
        assert_eq!(single.dates, DateRange::fixed(2025, 7).unwrap());

        let batch = MockParams::batch();
        assert_eq!(batch.n_subjects.get(), 100);
        assert_eq!(batch.samples, SampleRange::new_from_usize((80, 120)).unwrap());
    }

    #[test]
    fn invalid_configs_fail_fast() {
        let cases = [
            MockConfig { n_subjects: 0, ..MockConfig::default() },
            MockConfig { n_channels: 0, ..MockConfig::default() },
            MockConfig { n_timepoints: 0, ..MockConfig::default() },
            MockConfig { n_classes: 0, ..MockConfig::default() },
            MockConfig { min_samples: 0, ..MockConfig::default() },
            MockConfig { min_samples: 120, max_samples: 80, ..MockConfig::default() },
            MockConfig { months: (0, 3), ..MockConfig::default() },
            MockConfig { first_subject: 9990, n_subjects: 20, ..MockConfig::default() },
            MockConfig { months: (1, 12), day: Some(31), ..MockConfig::batch() },
            MockConfig { years: (2025, 2025), months: (2, 2), day: Some(29), ..MockConfig::default() },
            MockConfig { years: (10000, 10000), ..MockConfig::default() },
        ];
        for config in cases {
            let err = MockParams::try_from(config.clone()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{:?}", config);
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: MockConfig =
            serde_json::from_str(r#"{"n_subjects": 3, "min_samples": 5, "max_samples": 9, "seed": 42}"#)
                .unwrap();
        assert_eq!(config.n_subjects, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.n_channels, 22);
        assert_eq!(config.years, (2025, 2025));
        let params = MockParams::try_from(config).unwrap();
        assert_eq!(params.samples.max_samples_inclusive().get(), 9);
    }

    #[test]
    fn unknown_json_fields_are_rejected() {
        let err = serde_json::from_str::<MockConfig>(r#"{"n_subject": 3}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn display_lists_parameters() {
        let text = MockParams::default().to_string();
        assert!(text.starts_with("Mock data parameters:\n"));
        assert!(text.contains("Samples per subject: 100"));
        assert!(text.contains("Number of channels: 22"));
    }
}
