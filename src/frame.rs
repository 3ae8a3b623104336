use hound::{SampleFormat, WavReader};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Frame-archive errors.
///
/// `Unavailable` and `Empty` can only occur while opening an archive;
/// `Read` occurs mid-stream and is fatal for the reading pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The archive directory cannot be opened for reading.
    #[error("frame archive `{}` unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The archive directory contains no frame files.
    #[error("frame archive `{}` contains no frame files", .path.display())]
    Empty { path: PathBuf },

    /// A frame file disagrees with the rest of the archive.
    #[error("inconsistent frame file `{}`: {reason}", .path.display())]
    Inconsistent { path: PathBuf, reason: String },

    /// A frame file header could not be parsed.
    #[error("bad frame file `{}`: {source}", .path.display())]
    Header {
        path: PathBuf,
        source: hound::Error,
    },

    /// An I/O failure occurred while reading samples.
    #[error("read error in frame file `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: hound::Error,
    },
}

/// Outcome of a successful [`FrameSource::read_samples`] call.
///
/// End of data is a normal terminal condition, not an error: the archive
/// simply has no further samples at the requested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The output buffer was completely filled.
    Samples,
    /// The archive cannot supply the requested span.
    EndOfData,
}

/// A source of raw detector samples addressed by absolute sample index.
///
/// Implementations must fill the whole output buffer or report
/// [`ReadOutcome::EndOfData`]; partial reads are not part of the contract.
/// No retry policy exists at this layer: read errors are fatal to the
/// caller's pipeline.
pub trait FrameSource {
    /// Sample rate of the stored data in Hz.
    fn sample_rate(&self) -> u32;

    /// Read `out.len()` samples starting at absolute sample index `cursor`.
    fn read_samples(&mut self, cursor: u64, out: &mut [i16]) -> crate::Result<ReadOutcome>;
}

struct FrameFile {
    path: PathBuf,
    /// Absolute sample index of this file's first sample.
    offset: u64,
    len: u64,
}

struct OpenFrame {
    index: usize,
    /// Position within the file, in samples.
    pos: u64,
    reader: WavReader<BufReader<File>>,
}

/// An on-disk frame archive: a directory of mono 16-bit PCM WAV files,
/// ordered by file name, presenting one continuous sample stream.
///
/// All file headers are scanned when the archive is opened; no sample data
/// is read until [`FrameArchive::read_samples`] is called. Reads may span
/// file boundaries. The archive keeps at most one frame file open at a
/// time and reads sequentially without reopening when possible.
///
/// # Example
/// ```no_run
/// use rumble::frame::{FrameArchive, FrameSource, ReadOutcome};
///
/// let mut archive = FrameArchive::open("/data/frames")?;
/// let mut chunk = vec![0i16; 4096];
/// match archive.read_samples(0, &mut chunk)? {
///     ReadOutcome::Samples => println!("got {} samples", chunk.len()),
///     ReadOutcome::EndOfData => println!("archive shorter than one chunk"),
/// }
/// # Ok::<(), rumble::Error>(())
/// ```
pub struct FrameArchive {
    files: Vec<FrameFile>,
    sample_rate: u32,
    total: u64,
    current: Option<OpenFrame>,
}

impl std::fmt::Debug for FrameArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameArchive")
            .field("files", &self.files.len())
            .field("sample_rate", &self.sample_rate)
            .field("total", &self.total)
            .field("current", &self.current.is_some())
            .finish()
    }
}

impl FrameArchive {
    /// Open a frame archive directory.
    ///
    /// Scans the directory for `.wav` files, validates that every file is
    /// mono 16-bit integer PCM at a single common sample rate, and records
    /// the absolute sample offset of each file.
    ///
    /// # Errors
    /// * `ArchiveError::Unavailable` - the directory cannot be read
    /// * `ArchiveError::Empty` - no frame files found
    /// * `ArchiveError::Header` - a file header fails to parse
    /// * `ArchiveError::Inconsistent` - format or sample-rate mismatch
    pub fn open<P: AsRef<Path>>(dir: P) -> crate::Result<Self> {
        let dir = dir.as_ref();
        let paths = scan_dir(dir)?;
        if paths.is_empty() {
            return Err(ArchiveError::Empty {
                path: dir.to_path_buf(),
            }
            .into());
        }

        let mut files = Vec::with_capacity(paths.len());
        let mut sample_rate = 0u32;
        let mut offset = 0u64;
        for path in paths {
            let reader = WavReader::open(&path).map_err(|source| ArchiveError::Header {
                path: path.clone(),
                source,
            })?;
            let spec = reader.spec();
            if spec.channels != 1
                || spec.bits_per_sample != 16
                || spec.sample_format != SampleFormat::Int
            {
                return Err(ArchiveError::Inconsistent {
                    path,
                    reason: format!(
                        "expected mono 16-bit integer PCM, got {} ch {} bit {:?}",
                        spec.channels, spec.bits_per_sample, spec.sample_format
                    ),
                }
                .into());
            }
            if sample_rate == 0 {
                sample_rate = spec.sample_rate;
            } else if spec.sample_rate != sample_rate {
                return Err(ArchiveError::Inconsistent {
                    path,
                    reason: format!(
                        "sample rate {} differs from archive rate {}",
                        spec.sample_rate, sample_rate
                    ),
                }
                .into());
            }
            let len = reader.duration() as u64;
            files.push(FrameFile { path, offset, len });
            offset += len;
        }

        Ok(Self {
            files,
            sample_rate,
            total: offset,
            current: None,
        })
    }

    /// Total number of samples across all frame files.
    pub fn total_samples(&self) -> u64 {
        self.total
    }

    /// Number of frame files in the archive.
    pub fn num_files(&self) -> usize {
        self.files.len()
    }
}

impl FrameSource for FrameArchive {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_samples(&mut self, cursor: u64, out: &mut [i16]) -> crate::Result<ReadOutcome> {
        let want = out.len() as u64;
        if cursor.checked_add(want).map_or(true, |end| end > self.total) {
            return Ok(ReadOutcome::EndOfData);
        }

        let mut pos = cursor;
        let mut filled = 0usize;
        // First file whose span contains pos.
        let mut index = self.files.partition_point(|f| f.offset + f.len <= pos);

        // The cached reader is taken for the duration of the read; any
        // error path therefore drops it, and the next call starts clean.
        let mut cached = self.current.take();

        while filled < out.len() {
            let file = &self.files[index];
            let in_file = pos - file.offset;
            let here = ((file.len - in_file) as usize).min(out.len() - filled);

            let mut open = match cached.take() {
                Some(open) if open.index == index => open,
                _ => open_frame(file, index)?,
            };
            if open.pos != in_file {
                open.reader
                    .seek(in_file as u32)
                    .map_err(|source| ArchiveError::Read {
                        path: file.path.clone(),
                        source: hound::Error::IoError(source),
                    })?;
                open.pos = in_file;
            }

            let mut samples = open.reader.samples::<i16>();
            for slot in out[filled..filled + here].iter_mut() {
                match samples.next() {
                    Some(Ok(s)) => *slot = s,
                    Some(Err(source)) => {
                        return Err(ArchiveError::Read {
                            path: file.path.clone(),
                            source,
                        }
                        .into());
                    }
                    None => {
                        // Header promised more samples than the file holds.
                        return Err(ArchiveError::Inconsistent {
                            path: file.path.clone(),
                            reason: "file shorter than its header declares".into(),
                        }
                        .into());
                    }
                }
            }
            drop(samples);
            open.pos += here as u64;
            pos += here as u64;
            filled += here;
            if pos >= file.offset + file.len {
                index += 1;
            }
            cached = Some(open);
        }
        self.current = cached;
        Ok(ReadOutcome::Samples)
    }
}

/// Open a frame file positioned at its first sample.
fn open_frame(file: &FrameFile, index: usize) -> crate::Result<OpenFrame> {
    let reader = WavReader::open(&file.path).map_err(|source| ArchiveError::Read {
        path: file.path.clone(),
        source,
    })?;
    Ok(OpenFrame {
        index,
        pos: 0,
        reader,
    })
}

/// An in-memory frame source, for synthetic data and tests.
///
/// # Example
/// ```
/// use rumble::frame::{FrameSource, MemorySource, ReadOutcome};
///
/// let mut source = MemorySource::new(vec![1i16, 2, 3, 4], 128);
/// let mut out = vec![0i16; 2];
/// assert_eq!(source.read_samples(1, &mut out).unwrap(), ReadOutcome::Samples);
/// assert_eq!(out, vec![2, 3]);
/// ```
pub struct MemorySource {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl MemorySource {
    /// Create a source over a vector of raw samples.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a source from floating-point detector counts, rounding and
    /// saturating to the 16-bit sample range.
    pub fn from_counts(counts: &[f32], sample_rate: u32) -> Self {
        let samples = counts
            .iter()
            .map(|c| c.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Total number of samples held by the source.
    pub fn total_samples(&self) -> u64 {
        self.samples.len() as u64
    }
}

impl FrameSource for MemorySource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_samples(&mut self, cursor: u64, out: &mut [i16]) -> crate::Result<ReadOutcome> {
        let want = out.len() as u64;
        if cursor
            .checked_add(want)
            .map_or(true, |end| end > self.samples.len() as u64)
        {
            return Ok(ReadOutcome::EndOfData);
        }
        let start = cursor as usize;
        out.copy_from_slice(&self.samples[start..start + out.len()]);
        Ok(ReadOutcome::Samples)
    }
}

fn scan_dir(dir: &Path) -> crate::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| ArchiveError::Unavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    // BTreeSet keeps frame files in name order, which is archive order.
    let mut found = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| ArchiveError::Unavailable {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_frame && path.is_file() {
            found.insert(path);
        }
    }
    Ok(found.into_iter().collect())
}
