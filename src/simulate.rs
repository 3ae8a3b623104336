use crate::fft::InverseRealFftPlan;
use num_complex::{Complex32, Complex64};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hubble-constant factor H0/h100 in SI units (1/s).
const H0_FACTOR: f64 = 3.240_779_290_3e-18;

/// Parameters for the gravitational-wave energy-density spectrum.
#[derive(Debug, Clone)]
pub struct OmegaGwParams {
    /// Number of frequency bins, `num_points/2 + 1` for a one-sided
    /// spectrum.
    pub length: usize,
    /// Frequency of the first bin in Hz (0 for baseband data).
    pub f0: f64,
    /// Frequency spacing in Hz.
    pub delta_f: f64,
    /// Power-law exponent.
    pub alpha: f64,
    /// Reference frequency in Hz.
    pub f_ref: f64,
    /// Energy density at the reference frequency.
    pub omega_ref: f64,
}

/// Power-law gravitational-wave energy-density spectrum.
///
/// `Omega(f) = omega_ref * (f / f_ref)^alpha`, with bins at or below zero
/// frequency set to zero.
///
/// # Errors
/// Returns `InvalidSize`/`InvalidParameter` for non-positive `length`,
/// `delta_f`, `f_ref`, or `omega_ref`, or negative `f0`.
///
/// # Example
/// ```
/// use rumble::simulate::{omega_gw, OmegaGwParams};
///
/// let omega = omega_gw(&OmegaGwParams {
///     length: 4097,
///     f0: 0.0,
///     delta_f: 0.015625,
///     alpha: 0.0,
///     f_ref: 100.0,
///     omega_ref: 1e-5,
/// })
/// .unwrap();
/// assert_eq!(omega.len(), 4097);
/// assert_eq!(omega[0], 0.0);
/// assert!((omega[1] - 1e-5).abs() < 1e-12);
/// ```
pub fn omega_gw(params: &OmegaGwParams) -> crate::Result<Vec<f64>> {
    if params.length == 0 {
        return Err(crate::Error::InvalidSize {
            name: "length",
            value: 0,
            reason: "must be > 0",
        });
    }
    check_positive("delta_f", params.delta_f)?;
    check_positive("f_ref", params.f_ref)?;
    check_positive("omega_ref", params.omega_ref)?;
    if params.f0 < 0.0 {
        return Err(crate::Error::InvalidParameter {
            name: "f0",
            value: params.f0.to_string(),
            reason: String::from("must be >= 0"),
        });
    }

    let out = (0..params.length)
        .map(|k| {
            let f = params.f0 + k as f64 * params.delta_f;
            if f <= 0.0 {
                0.0
            } else {
                params.omega_ref * (f / params.f_ref).powf(params.alpha)
            }
        })
        .collect();
    Ok(out)
}

/// Parameters for the time-domain stochastic-background synthesis.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Number of time-domain samples to generate.
    pub length: usize,
    /// Sample spacing in seconds.
    pub delta_t: f64,
    /// Seed for the Gaussian spectral amplitudes.
    pub seed: u64,
}

/// Simulate the whitened stochastic-background signal in a pair of
/// detectors.
///
/// The one-sided strain power spectral density of an isotropic background
/// is `S_h(f) = (3 H0^2 / (10 pi^2)) * Omega(f) / f^3`. Each bin receives
/// a complex Gaussian amplitude drawn from a seeded generator, shaped by
/// that density and by each detector's response function, and the pair is
/// transformed to the time domain. Both outputs share the same underlying
/// background realization, so they are correlated; overlap-reduction
/// physics between separated detectors is out of scope here.
///
/// Synthesis runs in double precision (the strain densities underflow
/// f32) and returns single-precision whitened detector outputs.
///
/// # Arguments
/// * `omega` - energy-density spectrum, `length/2 + 1` bins
/// * `resp1`, `resp2` - detector response series, same length as `omega`
/// * `params` - output length, sample spacing, and seed
///
/// # Returns
/// The pair of whitened time series, each `params.length` samples.
///
/// # Errors
/// Returns `InvalidSize`/`InvalidParameter` for bad lengths or spacing and
/// `ShapeMismatch` when the spectral inputs disagree with `params.length`.
pub fn stochastic_background(
    omega: &[f64],
    resp1: &[Complex32],
    resp2: &[Complex32],
    params: &SimulationParams,
) -> crate::Result<(Vec<f32>, Vec<f32>)> {
    if params.length == 0 || params.length % 2 != 0 {
        return Err(crate::Error::InvalidSize {
            name: "length",
            value: params.length,
            reason: "must be positive and even",
        });
    }
    check_positive("delta_t", params.delta_t)?;
    let freqlen = params.length / 2 + 1;
    if omega.len() != freqlen || resp1.len() != freqlen || resp2.len() != freqlen {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{freqlen} spectral bins"),
            got: format!("{}, {} and {}", omega.len(), resp1.len(), resp2.len()),
        });
    }

    let n = params.length as f64;
    let delta_f = 1.0 / (n * params.delta_t);
    let psd_norm = 0.3 * H0_FACTOR * H0_FACTOR / (std::f64::consts::PI * std::f64::consts::PI);

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut spec1 = vec![Complex32::new(0.0, 0.0); freqlen];
    let mut spec2 = vec![Complex32::new(0.0, 0.0); freqlen];
    for k in 1..freqlen {
        let f = k as f64 * delta_f;
        let s_h = psd_norm * omega[k] / (f * f * f);
        // Per-component deviation such that the synthesized series has
        // mean square sum_k |R|^2 S_h delta_f.
        let sigma = (n * s_h / (4.0 * params.delta_t)).sqrt();
        let (g1, g2) = gaussian_pair(&mut rng);
        let base = Complex64::new(g1 * sigma, g2 * sigma);
        let shaped1 = base * complex64(resp1[k]);
        let shaped2 = base * complex64(resp2[k]);
        spec1[k] = Complex32::new(shaped1.re as f32, shaped1.im as f32);
        spec2[k] = Complex32::new(shaped2.re as f32, shaped2.im as f32);
    }

    let plan = InverseRealFftPlan::new(params.length);
    let mut out1 = vec![0.0f32; params.length];
    let mut out2 = vec![0.0f32; params.length];
    plan.process(&mut spec1, &mut out1)?;
    plan.process(&mut spec2, &mut out2)?;
    Ok((out1, out2))
}

/// Expected mean square of a whitened output, `sum_k |R|^2 S_h delta_f`.
///
/// This is the normalization the synthesized series is tested against.
pub fn expected_mean_square(omega: &[f64], resp: &[Complex32], delta_t: f64, length: usize) -> f64 {
    let delta_f = 1.0 / (length as f64 * delta_t);
    let psd_norm = 0.3 * H0_FACTOR * H0_FACTOR / (std::f64::consts::PI * std::f64::consts::PI);
    omega
        .iter()
        .zip(resp.iter())
        .enumerate()
        .skip(1)
        .map(|(k, (om, r))| {
            let f = k as f64 * delta_f;
            let r2 = complex64(*r).norm_sqr();
            r2 * psd_norm * om / (f * f * f) * delta_f
        })
        .sum()
}

fn complex64(c: Complex32) -> Complex64 {
    Complex64::new(c.re as f64, c.im as f64)
}

/// Standard Gaussian pair via the Box-Muller transform.
fn gaussian_pair(rng: &mut StdRng) -> (f64, f64) {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * std::f64::consts::PI * u2;
    (r * theta.cos(), r * theta.sin())
}

fn check_positive(name: &'static str, value: f64) -> crate::Result<()> {
    if value <= 0.0 || !value.is_finite() {
        return Err(crate::Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: String::from("must be positive and finite"),
        });
    }
    Ok(())
}
