use num_complex::Complex32;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Forward real-to-complex FFT plan.
///
/// The plan is created once for a fixed transform length and reused for
/// every segment, which is where FFT libraries recover their setup cost.
/// A plan is an owned, move-only resource: it is acquired at construction
/// and released when the owning value is dropped.
///
/// # Example
/// ```
/// use rumble::fft::RealFftPlan;
/// use num_complex::Complex32;
///
/// let plan = RealFftPlan::new(512);
/// let mut input = vec![0.0f32; 512];
/// let mut output = vec![Complex32::new(0.0, 0.0); plan.output_len()];
/// plan.process(&mut input, &mut output).unwrap();
/// ```
pub struct RealFftPlan {
    r2c: Arc<dyn RealToComplex<f32>>,
    len: usize,
}

impl RealFftPlan {
    /// Create a forward plan for a given transform length.
    ///
    /// # Arguments
    /// * `len` - Number of real input samples (power of 2 for best performance)
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let r2c = planner.plan_fft_forward(len);
        Self { r2c, len }
    }

    /// Transform length this plan was created for.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the plan length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the one-sided complex output, `len/2 + 1`.
    pub fn output_len(&self) -> usize {
        self.len / 2 + 1
    }

    /// Run the forward transform.
    ///
    /// The input buffer is used as scratch space and is overwritten.
    ///
    /// # Arguments
    /// * `input` - Real input samples, length `len()`
    /// * `output` - One-sided complex spectrum, length `output_len()`
    ///
    /// # Errors
    /// Returns `Error::ShapeMismatch` if either buffer has the wrong length.
    pub fn process(&self, input: &mut [f32], output: &mut [Complex32]) -> crate::Result<()> {
        check_len("fft input", self.len, input.len())?;
        check_len("fft output", self.output_len(), output.len())?;
        // Lengths are validated above; realfft only fails on length mismatch.
        let _ = self.r2c.process(input, output);
        Ok(())
    }
}

/// Inverse complex-to-real FFT plan.
///
/// The output is scaled by 1/len so that a forward/inverse pair is the
/// identity. Same ownership rules as [`RealFftPlan`].
pub struct InverseRealFftPlan {
    c2r: Arc<dyn ComplexToReal<f32>>,
    len: usize,
}

impl InverseRealFftPlan {
    /// Create an inverse plan for a given transform length.
    pub fn new(len: usize) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let c2r = planner.plan_fft_inverse(len);
        Self { c2r, len }
    }

    /// Transform length this plan was created for.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the plan length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Run the inverse transform.
    ///
    /// The spectrum buffer is used as scratch space and is overwritten.
    /// A real signal's DC and Nyquist bins carry no imaginary part, so
    /// those components are zeroed before transforming.
    ///
    /// # Arguments
    /// * `spectrum` - One-sided complex spectrum, length `len/2 + 1`
    /// * `output` - Real output samples, length `len()`
    ///
    /// # Errors
    /// Returns `Error::ShapeMismatch` if either buffer has the wrong length.
    pub fn process(&self, spectrum: &mut [Complex32], output: &mut [f32]) -> crate::Result<()> {
        check_len("inverse fft input", self.len / 2 + 1, spectrum.len())?;
        check_len("inverse fft output", self.len, output.len())?;
        if let Some(first) = spectrum.first_mut() {
            first.im = 0.0;
        }
        if self.len % 2 == 0 {
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }
        }
        let _ = self.c2r.process(spectrum, output);
        let scale = 1.0 / self.len as f32;
        for v in output.iter_mut() {
            *v *= scale;
        }
        Ok(())
    }
}

fn check_len(what: &str, expected: usize, got: usize) -> crate::Result<()> {
    if expected != got {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{what} of length {expected}"),
            got: got.to_string(),
        });
    }
    Ok(())
}

/// Compute the real-to-complex FFT (rfft) of a real-valued input.
///
/// Returns only the non-redundant half of the spectrum. For repeated
/// transforms of the same length, create a [`RealFftPlan`] instead.
///
/// # Arguments
/// * `input` - Real-valued input signal
///
/// # Returns
/// Complex FFT output of length input.len() / 2 + 1
///
/// # Example
/// ```
/// use rumble::fft::rfft;
///
/// let signal = vec![1.0f32; 1024];
/// let spectrum = rfft(&signal);
/// assert_eq!(spectrum.len(), 513); // 1024/2 + 1
/// ```
pub fn rfft(input: &[f32]) -> Vec<Complex32> {
    if input.is_empty() {
        return Vec::new();
    }
    let plan = RealFftPlan::new(input.len());
    let mut in_buf = input.to_vec();
    let mut out_buf = vec![Complex32::new(0.0, 0.0); plan.output_len()];
    let _ = plan.process(&mut in_buf, &mut out_buf);
    out_buf
}

/// Compute the inverse real FFT of a one-sided spectrum.
///
/// # Arguments
/// * `spectrum` - One-sided complex spectrum of length `len/2 + 1`
/// * `len` - Length of the real output signal
///
/// # Returns
/// Real time-domain signal of length `len`, scaled so that
/// `irfft(rfft(x), x.len())` reconstructs `x`.
pub fn irfft(spectrum: &[Complex32], len: usize) -> crate::Result<Vec<f32>> {
    let plan = InverseRealFftPlan::new(len);
    let mut in_buf = spectrum.to_vec();
    let mut out_buf = vec![0.0f32; len];
    plan.process(&mut in_buf, &mut out_buf)?;
    Ok(out_buf)
}
