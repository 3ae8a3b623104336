use hound::{SampleFormat, WavSpec, WavWriter};
use rumble::buffer::{DataBuffer, DataBufferConfig, DataSegment};
use rumble::fft::RealFftPlan;
use rumble::frame::{ArchiveError, FrameSource, MemorySource, ReadOutcome};
use rumble::response::ResponseModel;
use rumble::spectrum;
use rumble::window::WindowType;
use std::path::{Path, PathBuf};

fn config(num_points: usize, num_spec: usize, path: &Path) -> DataBufferConfig {
    DataBufferConfig {
        num_spec,
        num_points,
        window: WindowType::Welch,
        plan: RealFftPlan::new(num_points),
        frame_path: path.to_path_buf(),
        response: ResponseModel::default(),
    }
}

fn memory_config(num_points: usize, num_spec: usize) -> DataBufferConfig {
    config(num_points, num_spec, Path::new("unused"))
}

/// Write a WAV frame archive into a fresh temp directory.
fn write_archive(name: &str, files: &[Vec<i16>], sample_rate: u32) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rumble_test_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    for (i, samples) in files.iter().enumerate() {
        let mut writer = WavWriter::create(dir.join(format!("frame-{i:03}.wav")), spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    dir
}

fn ramp(len: usize) -> Vec<i16> {
    (0..len).map(|i| (i % 1000) as i16).collect()
}

#[test]
fn first_call_returns_fully_averaged_spectrum() {
    let num_points = 65536;
    let num_spec = 8;
    let stride = 3 * num_points / 4;
    // Ten strides' worth of archive.
    let total = num_points + 9 * stride;

    let source = MemorySource::new(vec![0i16; total], 16384);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, num_spec), source).unwrap();
    let mut segment = DataSegment::new(num_points, stride);

    buffer.get_data(&mut segment, stride).unwrap();
    assert!(!segment.end_of_data);
    assert_eq!(segment.spec.len(), 32769);
    assert_eq!(segment.resp.len(), 32769);
    assert_eq!(segment.data.len(), stride);
}

#[test]
fn cursor_advances_by_stride_until_end_of_data() {
    let num_points = 256;
    let num_spec = 4;
    let stride = 192;
    let prime = num_points + (num_spec - 1) * stride;
    let steady = 5;
    // A tail shorter than one stride must not produce another segment.
    let total = prime + steady * stride + 100;

    let source = MemorySource::new(ramp(total), 1024);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, num_spec), source).unwrap();
    let mut segment = DataSegment::new(num_points, stride);

    buffer.get_data(&mut segment, stride).unwrap();
    assert!(!segment.end_of_data);
    assert_eq!(buffer.cursor(), prime as u64);

    for call in 0..steady {
        let before = buffer.cursor();
        buffer.get_data(&mut segment, stride).unwrap();
        assert!(!segment.end_of_data, "call {call} hit end of data early");
        assert_eq!(buffer.cursor() - before, stride as u64);
    }

    buffer.get_data(&mut segment, stride).unwrap();
    assert!(segment.end_of_data);

    // The terminal condition is sticky and benign.
    buffer.get_data(&mut segment, stride).unwrap();
    assert!(segment.end_of_data);
}

#[test]
fn payload_matches_archive_stream() {
    let num_points = 256;
    let num_spec = 4;
    let stride = 192;
    let prime = num_points + (num_spec - 1) * stride;
    let samples = ramp(prime + 2 * stride);

    let source = MemorySource::new(samples.clone(), 1024);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, num_spec), source).unwrap();
    let mut segment = DataSegment::new(num_points, stride);

    buffer.get_data(&mut segment, stride).unwrap();
    assert_eq!(&segment.data[..], &samples[prime - stride..prime]);

    buffer.get_data(&mut segment, stride).unwrap();
    assert_eq!(&segment.data[..], &samples[prime..prime + stride]);

    buffer.get_data(&mut segment, stride).unwrap();
    assert_eq!(&segment.data[..], &samples[prime + stride..prime + 2 * stride]);
}

#[test]
fn spectrum_matches_standalone_welch_average() {
    let num_points = 256;
    let num_spec = 4;
    let stride = 192;
    let sample_rate = 1024;
    let prime = num_points + (num_spec - 1) * stride;
    let samples: Vec<i16> = (0..prime)
        .map(|i| (900.0 * (0.013 * i as f32).sin()) as i16)
        .collect();

    let source = MemorySource::new(samples.clone(), sample_rate);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, num_spec), source).unwrap();
    let mut segment = DataSegment::new(num_points, stride);
    buffer.get_data(&mut segment, stride).unwrap();
    assert!(!segment.end_of_data);

    // The primed ring holds windows at 0, stride, ..., which is exactly a
    // Welch pass with hop = stride over the primed span.
    let as_f32: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
    let reference = spectrum::welch_psd(
        &as_f32,
        num_points,
        stride,
        WindowType::Welch,
        sample_rate,
    )
    .unwrap();

    for (k, (got, want)) in segment.spec.iter().zip(reference.iter()).enumerate() {
        let diff = (got - want).abs();
        let tol = 1e-5 * want.abs().max(1.0);
        assert!(diff <= tol, "bin {k}: got {got}, want {want}");
    }
}

#[test]
fn sinusoid_concentrates_power_in_one_bin() {
    let num_points = 256;
    let num_spec = 4;
    let stride = 192;
    let sample_rate = 1024;
    let bin = 8;
    let prime = num_points + (num_spec - 1) * stride;
    // 8 cycles per 256 samples and 6 per stride: every window is coherent.
    let samples: Vec<i16> = (0..prime + 4 * stride)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * bin as f32 * i as f32 / num_points as f32;
            (8000.0 * phase.sin()).round() as i16
        })
        .collect();

    let mut cfg = memory_config(num_points, num_spec);
    cfg.window = WindowType::Rectangular;
    let source = MemorySource::new(samples, sample_rate);
    let mut buffer = DataBuffer::with_source(cfg, source).unwrap();
    let mut segment = DataSegment::new(num_points, stride);
    buffer.get_data(&mut segment, stride).unwrap();

    let peak = segment.spec[bin];
    assert!(peak > 0.0);
    for (k, &v) in segment.spec.iter().enumerate() {
        if k != bin {
            assert!(
                v < peak / 100.0,
                "bin {k} holds {v}, too much power next to peak {peak}"
            );
        }
    }
}

#[test]
fn response_series_is_populated() {
    let num_points = 1024;
    let source = MemorySource::new(vec![0i16; 8192], 16384);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, 4), source).unwrap();
    let stride = 3 * num_points / 4;
    let mut segment = DataSegment::new(num_points, stride);
    buffer.get_data(&mut segment, stride).unwrap();

    assert_eq!(segment.resp[0], num_complex::Complex32::new(0.0, 0.0));
    for (k, r) in segment.resp.iter().enumerate().skip(1) {
        assert!(r.re > 0.0, "bin {k} response not positive");
        assert_eq!(r.im, 0.0);
    }
}

#[test]
fn archive_reads_match_memory_source_across_file_boundaries() {
    let num_points = 256;
    let num_spec = 4;
    let stride = 192;
    let sample_rate = 1024;
    let prime = num_points + (num_spec - 1) * stride;
    let total = prime + 3 * stride;
    let samples: Vec<i16> = (0..total)
        .map(|i| (700.0 * (0.021 * i as f32).sin()) as i16)
        .collect();

    // Uneven file sizes force reads to span boundaries.
    let splits = [500usize, 131, 777, 350];
    let mut files = Vec::new();
    let mut at = 0usize;
    for len in splits {
        files.push(samples[at..at + len].to_vec());
        at += len;
    }
    files.push(samples[at..].to_vec());
    let dir = write_archive("boundaries", &files, sample_rate);

    let mut from_disk = DataBuffer::create(config(num_points, num_spec, &dir)).unwrap();
    let mut from_memory = DataBuffer::with_source(
        memory_config(num_points, num_spec),
        MemorySource::new(samples, sample_rate),
    )
    .unwrap();

    let mut seg_disk = DataSegment::new(num_points, stride);
    let mut seg_mem = DataSegment::new(num_points, stride);
    loop {
        from_disk.get_data(&mut seg_disk, stride).unwrap();
        from_memory.get_data(&mut seg_mem, stride).unwrap();
        assert_eq!(seg_disk.end_of_data, seg_mem.end_of_data);
        if seg_disk.end_of_data {
            break;
        }
        assert_eq!(seg_disk.data, seg_mem.data);
        assert_eq!(seg_disk.spec, seg_mem.spec);
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn create_rejects_bad_configuration() {
    let dir = write_archive("validation", &[ramp(64)], 1024);

    let mut zero_points = config(256, 8, &dir);
    zero_points.num_points = 0;
    let err = DataBuffer::create(zero_points).unwrap_err();
    assert!(matches!(err, rumble::Error::InvalidSize { name: "num_points", .. }));

    let err = DataBuffer::create(config(1000, 8, &dir)).unwrap_err();
    assert!(matches!(
        err,
        rumble::Error::InvalidParameter { name: "num_points", .. }
    ));

    let err = DataBuffer::create(config(256, 0, &dir)).unwrap_err();
    assert!(matches!(err, rumble::Error::InvalidSize { name: "num_spec", .. }));

    let mut mismatched = config(256, 8, &dir);
    mismatched.plan = RealFftPlan::new(512);
    let err = DataBuffer::create(mismatched).unwrap_err();
    assert!(matches!(err, rumble::Error::InvalidParameter { name: "plan", .. }));

    let err = DataBuffer::create(config(256, 8, Path::new(""))).unwrap_err();
    assert!(matches!(
        err,
        rumble::Error::InvalidParameter { name: "frame_path", .. }
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn create_reports_unavailable_archive() {
    let missing = std::env::temp_dir().join("rumble_test_no_such_archive");
    let _ = std::fs::remove_dir_all(&missing);
    let err = DataBuffer::create(config(256, 8, &missing)).unwrap_err();
    assert!(matches!(
        err,
        rumble::Error::Archive(ArchiveError::Unavailable { .. })
    ));
}

#[test]
fn get_data_validates_stride_and_shapes() {
    let num_points = 256;
    let source = MemorySource::new(ramp(4096), 1024);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, 4), source).unwrap();

    let mut segment = DataSegment::new(num_points, 192);
    let err = buffer.get_data(&mut segment, 0).unwrap_err();
    assert!(matches!(
        err,
        rumble::Error::InvalidParameter { name: "stride", .. }
    ));
    let err = buffer.get_data(&mut segment, num_points + 1).unwrap_err();
    assert!(matches!(
        err,
        rumble::Error::InvalidParameter { name: "stride", .. }
    ));

    // Stride disagrees with the allocated payload length.
    let err = buffer.get_data(&mut segment, 128).unwrap_err();
    assert!(matches!(err, rumble::Error::ShapeMismatch { .. }));

    let mut wrong_spec = DataSegment::new(num_points, 192);
    wrong_spec.spec = vec![0.0; 7];
    let err = buffer.get_data(&mut wrong_spec, 192).unwrap_err();
    assert!(matches!(err, rumble::Error::ShapeMismatch { .. }));
}

/// Source that serves the priming read, then fails.
struct FailingSource {
    calls: usize,
}

impl FrameSource for FailingSource {
    fn sample_rate(&self) -> u32 {
        1024
    }

    fn read_samples(&mut self, _cursor: u64, out: &mut [i16]) -> rumble::Result<ReadOutcome> {
        self.calls += 1;
        if self.calls > 1 {
            return Err(ArchiveError::Read {
                path: PathBuf::from("injected"),
                source: hound::Error::IoError(std::io::Error::other("simulated fault")),
            }
            .into());
        }
        out.fill(0);
        Ok(ReadOutcome::Samples)
    }
}

#[test]
fn read_error_mid_stream_is_fatal() {
    let num_points = 256;
    let stride = 192;
    let mut buffer =
        DataBuffer::with_source(memory_config(num_points, 4), FailingSource { calls: 0 }).unwrap();
    let mut segment = DataSegment::new(num_points, stride);

    buffer.get_data(&mut segment, stride).unwrap();
    assert!(!segment.end_of_data);

    let err = buffer.get_data(&mut segment, stride).unwrap_err();
    assert!(matches!(
        err,
        rumble::Error::Archive(ArchiveError::Read { .. })
    ));
}

#[test]
fn archive_shorter_than_priming_span_ends_immediately() {
    let num_points = 256;
    let num_spec = 4;
    let stride = 192;
    let prime = num_points + (num_spec - 1) * stride;

    let source = MemorySource::new(ramp(prime - 1), 1024);
    let mut buffer = DataBuffer::with_source(memory_config(num_points, num_spec), source).unwrap();
    let mut segment = DataSegment::new(num_points, stride);
    buffer.get_data(&mut segment, stride).unwrap();
    assert!(segment.end_of_data);
}
