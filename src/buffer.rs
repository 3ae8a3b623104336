use crate::fft::RealFftPlan;
use crate::frame::{FrameArchive, FrameSource, ReadOutcome};
use crate::response::ResponseModel;
use crate::spectrum::Periodogram;
use crate::window::WindowType;
use num_complex::Complex32;
use std::path::PathBuf;

/// Configuration for a [`DataBuffer`], immutable after creation.
///
/// The FFT plan is owned by the configuration and moves into the buffer,
/// which releases it on drop; a plan can therefore never be shared between
/// buffers or freed twice.
pub struct DataBufferConfig {
    /// Number of raw sub-segments averaged per output spectrum.
    pub num_spec: usize,
    /// Samples per raw sub-segment (FFT length, power of two).
    pub num_points: usize,
    /// Window applied to each sub-segment before transforming.
    pub window: WindowType,
    /// Forward real-FFT plan sized to `num_points`.
    pub plan: RealFftPlan,
    /// Frame-archive directory.
    pub frame_path: PathBuf,
    /// Calibration response model for the spectrum's frequency bins.
    pub response: ResponseModel,
}

/// One analysis segment handed to the caller per [`DataBuffer::get_data`]
/// call.
///
/// The caller allocates the storage once, before its processing loop, and
/// the buffer writes into it in place on every call. When `end_of_data` is
/// true the other fields were not touched by that call.
pub struct DataSegment {
    /// Time-domain payload: the `stride` newest raw samples.
    pub data: Vec<i16>,
    /// Averaged one-sided power spectral density, `num_points/2 + 1` bins.
    pub spec: Vec<f32>,
    /// Complex calibration response, `num_points/2 + 1` bins.
    pub resp: Vec<Complex32>,
    /// Set by the buffer when the archive is exhausted. Not an error.
    pub end_of_data: bool,
}

impl DataSegment {
    /// Allocate segment storage for a given configuration.
    ///
    /// # Arguments
    /// * `num_points` - FFT length of the owning buffer
    /// * `stride` - samples advanced (and emitted) per call
    pub fn new(num_points: usize, stride: usize) -> Self {
        let bins = num_points / 2 + 1;
        Self {
            data: vec![0; stride],
            spec: vec![0.0; bins],
            resp: vec![Complex32::new(0.0, 0.0); bins],
            end_of_data: false,
        }
    }
}

/// Fixed-capacity ring of raw sub-segments.
///
/// Capacity is the averaging depth; pushing a segment beyond capacity
/// overwrites the oldest entry. Indexing wraps internally, so callers
/// never touch slot positions.
struct SegmentRing {
    slots: Vec<Vec<f32>>,
    /// Index of the slot the next push writes into.
    head: usize,
    len: usize,
}

impl SegmentRing {
    fn new(capacity: usize, seg_len: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| vec![0.0; seg_len]).collect(),
            head: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Copy `samples` into the oldest slot, making it the newest entry.
    fn push(&mut self, samples: &[f32]) {
        self.slots[self.head].copy_from_slice(samples);
        self.head = (self.head + 1) % self.capacity();
        self.len = (self.len + 1).min(self.capacity());
    }

    /// The most recently pushed segment.
    fn newest(&self) -> &[f32] {
        let idx = (self.head + self.capacity() - 1) % self.capacity();
        &self.slots[idx]
    }

    /// Iterate stored segments, oldest first.
    fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        let oldest = (self.head + self.capacity() - self.len) % self.capacity();
        let cap = self.capacity();
        (0..self.len).map(move |i| self.slots[(oldest + i) % cap].as_slice())
    }
}

/// Buffered reader of overlapping, FFT-ready analysis segments from a
/// frame archive.
///
/// The buffer maintains a ring of the `num_spec` most recent raw
/// sub-segments. Each [`get_data`](Self::get_data) call advances the
/// archive cursor by a caller-chosen stride, forms one new sub-segment
/// from the previous one's tail plus the freshly read samples, and emits
/// a fully assembled [`DataSegment`]: the new time-domain samples, the
/// Welch-averaged spectrum over the ring, and the calibration response.
///
/// The first call primes the whole ring (reading
/// `num_points + (num_spec-1)*stride` samples), so every successful call
/// returns a fully averaged spectrum; partially averaged output is never
/// observable. Steady-state calls read each archive sample exactly once
/// and perform no allocation.
///
/// Single-threaded by design: one instance per archive path, no internal
/// locking, retries, or timeouts. A read error leaves the buffer in an
/// undefined state; drop it and create a new one.
pub struct DataBuffer<S: FrameSource = FrameArchive> {
    source: S,
    engine: Periodogram,
    ring: SegmentRing,
    response: Vec<Complex32>,
    num_spec: usize,
    num_points: usize,
    cursor: u64,
    exhausted: bool,
    /// Fresh-sample scratch, sized to the current read span.
    raw: Vec<i16>,
    /// Assembly scratch for one sub-segment.
    assembled: Vec<f32>,
}

impl<S: FrameSource> std::fmt::Debug for DataBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataBuffer")
            .field("num_spec", &self.num_spec)
            .field("num_points", &self.num_points)
            .field("cursor", &self.cursor)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

impl DataBuffer<FrameArchive> {
    /// Create a buffer over an on-disk frame archive.
    ///
    /// Validates the configuration, opens the archive (header scan only —
    /// no sample data is read until the first [`get_data`](Self::get_data)
    /// call), and allocates the ring and scratch storage.
    ///
    /// # Errors
    /// * `InvalidSize` / `InvalidParameter` - bad configuration
    /// * `ArchiveError::Unavailable` - the path cannot be opened
    /// * `ArchiveError::Empty` / `Inconsistent` / `Header` - bad archive
    pub fn create(config: DataBufferConfig) -> crate::Result<Self> {
        if config.frame_path.as_os_str().is_empty() {
            return Err(crate::Error::InvalidParameter {
                name: "frame_path",
                value: String::from("\"\""),
                reason: String::from("archive path must not be empty"),
            });
        }
        let archive = FrameArchive::open(&config.frame_path)?;
        Self::with_source(config, archive)
    }
}

impl<S: FrameSource> DataBuffer<S> {
    /// Create a buffer over any [`FrameSource`].
    ///
    /// This is the seam used by tests and synthetic pipelines; the
    /// configuration's `frame_path` is ignored in favor of `source`.
    pub fn with_source(config: DataBufferConfig, source: S) -> crate::Result<Self> {
        validate(&config)?;
        let DataBufferConfig {
            num_spec,
            num_points,
            window,
            plan,
            response,
            ..
        } = config;

        let resp_series = response.series(num_points, source.sample_rate());
        Ok(Self {
            source,
            engine: Periodogram::with_plan(plan, window),
            ring: SegmentRing::new(num_spec, num_points),
            response: resp_series,
            num_spec,
            num_points,
            cursor: 0,
            exhausted: false,
            raw: Vec::new(),
            assembled: vec![0.0; num_points],
        })
    }

    /// Samples per raw sub-segment.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Averaging depth.
    pub fn num_spec(&self) -> usize {
        self.num_spec
    }

    /// Sample rate of the underlying source in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.source.sample_rate()
    }

    /// Absolute sample index of the next unread archive sample.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Retrieve the next analysis segment.
    ///
    /// Advances the archive cursor by `stride` samples and fills the
    /// caller-owned `out` storage: the `stride` newest raw samples, the
    /// spectrum averaged over all `num_spec` ring sub-segments, and the
    /// calibration response. Sets `out.end_of_data` instead when the
    /// archive cannot supply the requested span; this is the normal
    /// terminal condition and later calls keep reporting it.
    ///
    /// # Arguments
    /// * `out` - caller-owned segment storage, shaped by [`DataSegment::new`]
    /// * `stride` - new samples to consume, `0 < stride <= num_points`
    ///
    /// # Errors
    /// * `InvalidParameter` - stride out of range
    /// * `ShapeMismatch` - `out` storage disagrees with the configuration
    /// * `ArchiveError::Read` - I/O failure mid-read; the buffer must be
    ///   dropped afterwards
    pub fn get_data(&mut self, out: &mut DataSegment, stride: usize) -> crate::Result<()> {
        if stride == 0 || stride > self.num_points {
            return Err(crate::Error::InvalidParameter {
                name: "stride",
                value: stride.to_string(),
                reason: format!("must be in 1..={}", self.num_points),
            });
        }
        let bins = self.num_points / 2 + 1;
        if out.data.len() != stride {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("time series of length {stride}"),
                got: out.data.len().to_string(),
            });
        }
        if out.spec.len() != bins || out.resp.len() != bins {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("spectrum and response of length {bins}"),
                got: format!("{} and {}", out.spec.len(), out.resp.len()),
            });
        }

        if self.exhausted {
            out.end_of_data = true;
            return Ok(());
        }

        if !self.ring.is_full() {
            // Prime the full averaging window on the first call.
            let span = self.num_points + (self.num_spec - 1) * stride;
            self.raw.resize(span, 0);
            match self.source.read_samples(self.cursor, &mut self.raw)? {
                ReadOutcome::EndOfData => {
                    self.exhausted = true;
                    out.end_of_data = true;
                    return Ok(());
                }
                ReadOutcome::Samples => {}
            }
            for j in 0..self.num_spec {
                let start = j * stride;
                for (dst, src) in self
                    .assembled
                    .iter_mut()
                    .zip(self.raw[start..start + self.num_points].iter())
                {
                    *dst = *src as f32;
                }
                self.ring.push(&self.assembled);
            }
            out.data.copy_from_slice(&self.raw[span - stride..]);
            self.cursor += span as u64;
        } else {
            self.raw.resize(stride, 0);
            match self.source.read_samples(self.cursor, &mut self.raw)? {
                ReadOutcome::EndOfData => {
                    self.exhausted = true;
                    out.end_of_data = true;
                    return Ok(());
                }
                ReadOutcome::Samples => {}
            }
            // New sub-segment = previous tail + fresh samples; each archive
            // sample is read exactly once in steady state.
            let keep = self.num_points - stride;
            self.assembled[..keep].copy_from_slice(&self.ring.newest()[stride..]);
            for (dst, src) in self.assembled[keep..].iter_mut().zip(self.raw.iter()) {
                *dst = *src as f32;
            }
            self.ring.push(&self.assembled);
            out.data.copy_from_slice(&self.raw);
            self.cursor += stride as u64;
        }

        out.spec.fill(0.0);
        for seg in self.ring.iter() {
            self.engine.accumulate(seg, &mut out.spec)?;
        }
        self.engine
            .scale_density(&mut out.spec, self.num_spec, self.source.sample_rate());

        out.resp.copy_from_slice(&self.response);
        out.end_of_data = false;
        Ok(())
    }
}

fn validate(config: &DataBufferConfig) -> crate::Result<()> {
    if config.num_points == 0 {
        return Err(crate::Error::InvalidSize {
            name: "num_points",
            value: 0,
            reason: "must be > 0",
        });
    }
    if !config.num_points.is_power_of_two() {
        return Err(crate::Error::InvalidParameter {
            name: "num_points",
            value: config.num_points.to_string(),
            reason: String::from("must be a power of two"),
        });
    }
    if config.num_spec == 0 {
        return Err(crate::Error::InvalidSize {
            name: "num_spec",
            value: 0,
            reason: "must be > 0",
        });
    }
    if config.plan.len() != config.num_points {
        return Err(crate::Error::InvalidParameter {
            name: "plan",
            value: config.plan.len().to_string(),
            reason: format!("plan length must equal num_points ({})", config.num_points),
        });
    }
    Ok(())
}
