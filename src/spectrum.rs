use crate::fft::RealFftPlan;
use crate::window::{self, WindowType};
use ndarray::Array2;
use num_complex::Complex32;

/// Reusable periodogram engine for fixed-length segments.
///
/// Owns the forward FFT plan, the window weights, and the scratch buffers,
/// so that accumulating a periodogram performs no allocation. Power values
/// are accumulated raw (`|X[k]|^2`); [`Periodogram::scale_density`]
/// converts an accumulated sum into a one-sided power spectral density
/// with the standard window-power bias correction.
///
/// # Example
/// ```
/// use rumble::spectrum::Periodogram;
/// use rumble::window::WindowType;
///
/// let mut engine = Periodogram::new(256, WindowType::Welch);
/// let segment = vec![1.0f32; 256];
/// let mut acc = vec![0.0f32; engine.output_len()];
/// engine.accumulate(&segment, &mut acc).unwrap();
/// engine.scale_density(&mut acc, 1, 256);
/// ```
pub struct Periodogram {
    plan: RealFftPlan,
    weights: Vec<f32>,
    windowed: Vec<f32>,
    spectrum: Vec<Complex32>,
    window_power: f32,
}

impl Periodogram {
    /// Create an engine for segments of `num_points` samples.
    pub fn new(num_points: usize, window_type: WindowType) -> Self {
        Self::with_plan(RealFftPlan::new(num_points), window_type)
    }

    /// Create an engine around an existing forward plan.
    pub fn with_plan(plan: RealFftPlan, window_type: WindowType) -> Self {
        let num_points = plan.len();
        let weights = window::get_window(window_type, num_points);
        let window_power = window::power(&weights);
        let output_len = plan.output_len();
        Self {
            plan,
            weights,
            windowed: vec![0.0; num_points],
            spectrum: vec![Complex32::new(0.0, 0.0); output_len],
            window_power,
        }
    }

    /// Segment length the engine was created for.
    pub fn num_points(&self) -> usize {
        self.plan.len()
    }

    /// Length of the one-sided spectrum, `num_points/2 + 1`.
    pub fn output_len(&self) -> usize {
        self.plan.output_len()
    }

    /// Window and transform one segment, adding `|X[k]|^2` into `acc`.
    ///
    /// # Arguments
    /// * `segment` - time-domain samples, length `num_points()`
    /// * `acc` - power accumulator, length `output_len()`
    ///
    /// # Errors
    /// Returns `Error::ShapeMismatch` if either slice has the wrong length.
    pub fn accumulate(&mut self, segment: &[f32], acc: &mut [f32]) -> crate::Result<()> {
        if segment.len() != self.num_points() {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("segment of length {}", self.num_points()),
                got: segment.len().to_string(),
            });
        }
        if acc.len() != self.output_len() {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("accumulator of length {}", self.output_len()),
                got: acc.len().to_string(),
            });
        }

        for ((w, s), out) in self
            .weights
            .iter()
            .zip(segment.iter())
            .zip(self.windowed.iter_mut())
        {
            *out = w * s;
        }
        self.plan.process(&mut self.windowed, &mut self.spectrum)?;
        for (a, x) in acc.iter_mut().zip(self.spectrum.iter()) {
            *a += x.norm_sqr();
        }
        Ok(())
    }

    /// Convert an accumulated power sum into an averaged one-sided power
    /// spectral density.
    ///
    /// Divides by the number of accumulated segments, the sample rate, and
    /// the window power (Welch correction), and doubles every bin except
    /// DC and Nyquist so the one-sided density integrates to the total
    /// power.
    ///
    /// # Arguments
    /// * `acc` - accumulated `|X[k]|^2` values from [`accumulate`](Self::accumulate)
    /// * `count` - number of segments accumulated
    /// * `sample_rate` - sample rate of the time-domain data in Hz
    pub fn scale_density(&self, acc: &mut [f32], count: usize, sample_rate: u32) {
        let factor = 1.0 / (count as f32 * sample_rate as f32 * self.window_power);
        let last = acc.len().saturating_sub(1);
        let nyquist_present = self.num_points() % 2 == 0;
        for (k, v) in acc.iter_mut().enumerate() {
            let one_sided = if k == 0 || (k == last && nyquist_present) {
                factor
            } else {
                2.0 * factor
            };
            *v *= one_sided;
        }
    }
}

/// Welch-averaged one-sided power spectral density of a signal.
///
/// Splits `samples` into overlapping `num_points`-sample segments spaced
/// `hop` apart, windows and transforms each, and averages the scaled
/// periodograms.
///
/// # Arguments
/// * `samples` - time-domain signal
/// * `num_points` - segment length (FFT size)
/// * `hop` - samples between segment starts
/// * `window_type` - window applied to each segment
/// * `sample_rate` - sample rate in Hz
///
/// # Returns
/// One-sided PSD of length `num_points/2 + 1`
///
/// # Errors
/// Returns `Error::InvalidSize` for zero sizes or a signal shorter than
/// one segment.
pub fn welch_psd(
    samples: &[f32],
    num_points: usize,
    hop: usize,
    window_type: WindowType,
    sample_rate: u32,
) -> crate::Result<Vec<f32>> {
    check_segmenting(samples.len(), num_points, hop)?;
    let mut engine = Periodogram::new(num_points, window_type);
    let mut acc = vec![0.0f32; engine.output_len()];
    let n_segments = (samples.len() - num_points) / hop + 1;
    for i in 0..n_segments {
        let start = i * hop;
        engine.accumulate(&samples[start..start + num_points], &mut acc)?;
    }
    engine.scale_density(&mut acc, n_segments, sample_rate);
    Ok(acc)
}

/// Per-segment one-sided power spectral densities of a signal.
///
/// Like [`welch_psd`] but without averaging: column `j` holds the scaled
/// periodogram of the segment starting at `j * hop`.
///
/// # Returns
/// Array of shape `(num_points/2 + 1, n_segments)`
pub fn segment_spectra(
    samples: &[f32],
    num_points: usize,
    hop: usize,
    window_type: WindowType,
    sample_rate: u32,
) -> crate::Result<Array2<f32>> {
    check_segmenting(samples.len(), num_points, hop)?;
    let mut engine = Periodogram::new(num_points, window_type);
    let n_segments = (samples.len() - num_points) / hop + 1;
    let bins = engine.output_len();
    let mut out = Array2::<f32>::zeros((bins, n_segments));
    let mut acc = vec![0.0f32; bins];
    for j in 0..n_segments {
        acc.fill(0.0);
        let start = j * hop;
        engine.accumulate(&samples[start..start + num_points], &mut acc)?;
        engine.scale_density(&mut acc, 1, sample_rate);
        for (k, v) in acc.iter().enumerate() {
            out[(k, j)] = *v;
        }
    }
    Ok(out)
}

fn check_segmenting(len: usize, num_points: usize, hop: usize) -> crate::Result<()> {
    if num_points == 0 {
        return Err(crate::Error::InvalidSize {
            name: "num_points",
            value: 0,
            reason: "must be > 0",
        });
    }
    if hop == 0 {
        return Err(crate::Error::InvalidSize {
            name: "hop",
            value: 0,
            reason: "must be > 0",
        });
    }
    if len < num_points {
        return Err(crate::Error::InvalidSize {
            name: "samples",
            value: len,
            reason: "shorter than one segment",
        });
    }
    Ok(())
}
