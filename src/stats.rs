use core::fmt;

use alloc::vec::Vec;

/// Summary statistics of a batch of insertion measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Sample standard deviation, 0 for a single sample.
    pub stdev: f64,
    pub median: f64,
}

impl Summary {
    /// Returns `None` for an empty batch.
    #[must_use]
    pub fn from_samples(samples: &[usize]) -> Option<Self> {
        let mut sorted: Vec<usize> = samples.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        let mean = sorted.iter().sum::<usize>() as f64 / count as f64;
        let stdev = if count > 1 {
            let squares: f64 = sorted.iter().map(|&sample| (sample as f64 - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) as f64 / 2.0
        } else {
            sorted[count / 2] as f64
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            stdev,
            median,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min {:>4}  max {:>4}  mean {:>8.3}  stdev {:>8.3}  median {:>6.1}",
            self.min, self.max, self.mean, self.stdev, self.median
        )
    }
}
