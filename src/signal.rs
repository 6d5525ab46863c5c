//! Random motor-imagery signals and class labels.

use crate::error::{MockError, Result};
use ndarray::{Array, Dim};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};
use std::num::NonZeroUsize;

/// Shape of one subject's signal tensor plus the number of label classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalShape {
    /// Number of trials/samples
    pub n_samples: NonZeroUsize,
    /// Number of recording channels
    pub n_channels: NonZeroUsize,
    /// Number of time points per trial
    pub n_timepoints: NonZeroUsize,
    /// Number of motor-imagery classes
    pub n_classes: NonZeroUsize,
}
impl SignalShape {
    /// Make a new `SignalShape` from plain integers. Fails with
    /// [`MockError::InvalidArgument`] if any of them is zero.
    pub fn new_from_usize(
        n_samples: usize,
        n_channels: usize,
        n_timepoints: usize,
        n_classes: usize,
    ) -> Result<Self> {
        let nonzero = |value: usize, name: &str| {
            NonZeroUsize::new(value)
                .ok_or_else(|| MockError::invalid(format!("{} must be positive", name)))
        };
        Ok(Self {
            n_samples: nonzero(n_samples, "number of samples")?,
            n_channels: nonzero(n_channels, "number of channels")?,
            n_timepoints: nonzero(n_timepoints, "number of time points")?,
            n_classes: nonzero(n_classes, "number of classes")?,
        })
    }

    /// Shape of the signal tensor as (samples, channels, time points).
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.n_samples.get(), self.n_channels.get(), self.n_timepoints.get())
    }
}
impl std::fmt::Display for SignalShape {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} samples x {} channels x {} time points, {} classes",
            self.n_samples, self.n_channels, self.n_timepoints, self.n_classes
        )
    }
}

/// Mock signal of numeric type S, e.g. f64.
#[derive(Clone, Debug)]
pub struct MockSignal<S> {
    /// Samples x channels x time points tensor drawn from the standard normal
    /// distribution.
    pub x: Array<S, Dim<[usize; 3]>>,
    /// 1-dimensional vector of class labels, one per sample. Each label is an
    /// integer ranging from 0 up to but excluding the number of classes.
    pub y: Array<i64, Dim<[usize; 1]>>,
}
impl<S> MockSignal<S>
where
    StandardNormal: Distribution<S>,
{
    /// Randomly generate a mock signal of the given shape using `rng`.
    pub fn generate_using<R: Rng + ?Sized>(shape: SignalShape, rng: &mut R) -> Self {
        // Simulate a samples x channels x time points tensor from the standard
        // normal distribution.
        let x = Array::<S, _>::random_using(shape.dims(), StandardNormal, rng);

        // Simulate one label per sample, uniformly from the classes.
        let classes = Uniform::new(0, shape.n_classes.get() as i64);
        let y = Array::random_using(shape.n_samples.get(), classes, rng);

        tracing::debug!(%shape, "generated mock signal");
        Self { x, y }
    }

    /// Number of samples, i.e. the length of the first axis of `x` and of `y`.
    pub fn n_samples(&self) -> usize {
        self.y.len()
    }
}

/// Generate a standard normal tensor of shape (`n_samples`, `n_channels`,
/// `n_timepoints`) and `n_samples` labels drawn from `0..n_classes`.
pub fn generate<R: Rng + ?Sized>(
    n_samples: usize,
    n_channels: usize,
    n_timepoints: usize,
    n_classes: usize,
    rng: &mut R,
) -> Result<MockSignal<f64>> {
    let shape = SignalShape::new_from_usize(n_samples, n_channels, n_timepoints, n_classes)?;
    Ok(MockSignal::generate_using(shape, rng))
}
