/// Compute a rectangular (boxcar) window.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Rectangular window of length `n` (all ones)
pub fn rectangular(n: usize) -> Vec<f32> {
    vec![1.0; n]
}

/// Compute a periodic Hann (raised cosine) window.
///
/// The Hann window is one of the most commonly used windows in spectral
/// analysis. It has good frequency resolution and moderate spectral leakage.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Hann window of length `n`
pub fn hann(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Compute a Hamming window.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Hamming window of length `n`
pub fn hamming(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * std::f32::consts::PI * i as f32 / m).cos())
        .collect()
}

/// Compute a Blackman window.
///
/// The Blackman window provides better side lobe suppression than Hann
/// or Hamming windows, at the cost of a wider main lobe.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Blackman window of length `n`
pub fn blackman(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| {
            let a = 2.0 * std::f32::consts::PI * i as f32 / m;
            0.42 - 0.5 * a.cos() + 0.08 * (2.0 * a).cos()
        })
        .collect()
}

/// Compute a Bartlett (triangular) window.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Bartlett window of length `n`
pub fn bartlett(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| 1.0 - ((i as f32 - m / 2.0).abs() / (m / 2.0)))
        .collect()
}

/// Compute a Welch (parabolic) window.
///
/// The Welch window is the classic choice for averaged periodogram
/// spectral estimation of detector noise.
///
/// # Arguments
/// * `n` - Window length
///
/// # Returns
/// Welch window of length `n`
pub fn welch(n: usize) -> Vec<f32> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1.0];
    }
    let m = n as f32;
    (0..n)
        .map(|i| {
            let x = (2.0 * i as f32 - m) / m;
            1.0 - x * x
        })
        .collect()
}

/// Window type specification for the get_window function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Rectangular,
    Hann,
    Hamming,
    Blackman,
    Bartlett,
    Welch,
}

impl WindowType {
    /// Parse a window type from a string.
    ///
    /// # Arguments
    /// * `name` - Window name (case-insensitive)
    ///
    /// # Returns
    /// Some(WindowType) if recognized, None otherwise
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rectangular" | "boxcar" | "none" => Some(WindowType::Rectangular),
            "hann" | "hanning" => Some(WindowType::Hann),
            "hamming" => Some(WindowType::Hamming),
            "blackman" => Some(WindowType::Blackman),
            "bartlett" | "triangle" => Some(WindowType::Bartlett),
            "welch" => Some(WindowType::Welch),
            _ => None,
        }
    }
}

/// Get a window of the specified type and length.
///
/// # Arguments
/// * `window` - Window specification
/// * `n` - Window length
///
/// # Returns
/// Window vector of length n
///
/// # Example
/// ```
/// use rumble::window::{get_window, WindowType};
///
/// let w = get_window(WindowType::Welch, 512);
/// assert_eq!(w.len(), 512);
/// ```
pub fn get_window(window: WindowType, n: usize) -> Vec<f32> {
    match window {
        WindowType::Rectangular => rectangular(n),
        WindowType::Hann => hann(n),
        WindowType::Hamming => hamming(n),
        WindowType::Blackman => blackman(n),
        WindowType::Bartlett => bartlett(n),
        WindowType::Welch => welch(n),
    }
}

/// Get a window from a string specification.
///
/// # Arguments
/// * `name` - Window name (case-insensitive)
/// * `n` - Window length
///
/// # Returns
/// Some(window) if the name is recognized, None otherwise
pub fn get_window_from_str(name: &str, n: usize) -> Option<Vec<f32>> {
    WindowType::parse(name).map(|wtype| get_window(wtype, n))
}

/// Sum of squared window weights.
///
/// Spectral density estimates divide by this quantity to compensate for
/// the power removed by the window taper, so that a windowed periodogram
/// remains an unbiased density estimate.
///
/// # Arguments
/// * `weights` - Window weights
///
/// # Returns
/// Sum over i of weights[i]^2
pub fn power(weights: &[f32]) -> f32 {
    weights.iter().map(|w| w * w).sum()
}
