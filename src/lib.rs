//! Gravitational-wave detector data analysis library for Rust.
//!
//! Rumble covers the data-handling layer of a stochastic-background
//! search: reading buffered, FFT-ready analysis segments out of an
//! on-disk frame archive, Welch-averaged power spectral estimation with
//! calibration response functions, synthetic detector data generation,
//! and rank statistics.
//!
//! # Features
//!
//! - **Data buffering** — [`buffer::DataBuffer`] reads overlapping,
//!   windowed segments from a frame archive, maintains a ring of raw
//!   sub-segments, and hands each caller-visible analysis segment a time
//!   series, an averaged one-sided spectrum, and a complex calibration
//!   response, tracking end-of-data across file boundaries
//! - **Spectral estimation** — periodogram accumulation and
//!   Welch-averaged PSDs with window-power bias correction
//! - **Frame archives** — directory-of-WAV sample streams with absolute
//!   sample addressing, plus an in-memory source for synthetic pipelines
//! - **Simulation** — power-law gravitational-wave energy-density
//!   spectra and seeded synthesis of whitened stochastic-background
//!   detector pairs
//! - **Statistics** — average-tie rank statistics
//!
//! # Quick Start
//!
//! ```rust
//! use rumble::buffer::{DataBuffer, DataBufferConfig, DataSegment};
//! use rumble::fft::RealFftPlan;
//! use rumble::frame::MemorySource;
//! use rumble::response::ResponseModel;
//! use rumble::window::WindowType;
//!
//! let num_points = 1024;
//! let stride = 3 * num_points / 4;
//!
//! // Synthetic archive: 8192 samples at 1024 Hz.
//! let source = MemorySource::new(vec![0i16; 8192], 1024);
//!
//! let config = DataBufferConfig {
//!     num_spec: 4,
//!     num_points,
//!     window: WindowType::Welch,
//!     plan: RealFftPlan::new(num_points),
//!     frame_path: std::path::PathBuf::new(),
//!     response: ResponseModel::default(),
//! };
//! let mut buffer = DataBuffer::with_source(config, source).unwrap();
//!
//! let mut segment = DataSegment::new(num_points, stride);
//! buffer.get_data(&mut segment, stride).unwrap();
//! assert!(!segment.end_of_data);
//! assert_eq!(segment.spec.len(), num_points / 2 + 1);
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`buffer`] | Buffered analysis-segment pipeline over a frame archive |
//! | [`frame`] | Frame archives, the `FrameSource` seam, in-memory sources |
//! | [`spectrum`] | Periodograms, Welch PSD averaging, per-segment spectra |
//! | [`response`] | Detector calibration response models |
//! | [`simulate`] | Stochastic-background spectra and time-series synthesis |
//! | [`stats`] | Rank statistics |
//! | [`window`] | Window functions (rectangular through Welch) |
//! | [`fft`] | Owned forward/inverse real-FFT plans |
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. End of data is *not* an error: the
//! buffer reports it through `DataSegment::end_of_data` and treats it as
//! a normal terminal condition.
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]` — no unsafe Rust anywhere.

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, Result};

pub mod buffer;
pub mod fft;
pub mod frame;
pub mod response;
pub mod simulate;
pub mod spectrum;
pub mod stats;
pub mod window;
