//! Frame-Archive Scanning Example
//!
//! Walks a frame archive segment by segment and dumps each analysis
//! segment's artifacts: the time series, the averaged spectrum, and the
//! calibration response (magnitude and phase).
//!
//! Usage: scan_archive [ARCHIVE_DIR] [NUM_POINTS] [NUM_SPEC]
//!
//! The archive directory falls back to the RUMBLE_FRAME_PATH environment
//! variable when not given on the command line.

use log::info;
use rumble::buffer::{DataBuffer, DataBufferConfig, DataSegment};
use rumble::fft::RealFftPlan;
use rumble::response::ResponseModel;
use rumble::window::WindowType;
use std::io::Write;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let frame_path = args
        .next()
        .or_else(|| std::env::var("RUMBLE_FRAME_PATH").ok())
        .unwrap_or_else(|| {
            eprintln!("error: no archive path given and RUMBLE_FRAME_PATH undefined");
            std::process::exit(2);
        });
    let num_points: usize = args.next().map(|a| a.parse().unwrap()).unwrap_or(4096);
    let num_spec: usize = args.next().map(|a| a.parse().unwrap()).unwrap_or(8);
    let stride = 3 * num_points / 4;

    info!("scanning {frame_path} with num_points={num_points}, num_spec={num_spec}");

    let config = DataBufferConfig {
        num_spec,
        num_points,
        window: WindowType::Welch,
        plan: RealFftPlan::new(num_points),
        frame_path: frame_path.into(),
        response: ResponseModel::default(),
    };
    let mut buffer = match DataBuffer::create(config) {
        Ok(buffer) => buffer,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut segment = DataSegment::new(num_points, stride);
    let mut index = 0usize;
    loop {
        if let Err(err) = buffer.get_data(&mut segment, stride) {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
        if segment.end_of_data {
            info!("segment {index}: end of data");
            break;
        }
        info!("segment {index}: cursor now {}", buffer.cursor());

        dump(&format!("Segment.{index:03}"), |out| {
            for (i, s) in segment.data.iter().enumerate() {
                writeln!(out, "{i}\t{s}")?;
            }
            Ok(())
        });
        dump(&format!("Spectrum.{index:03}"), |out| {
            for (i, p) in segment.spec.iter().enumerate() {
                writeln!(out, "{i}\t{p:e}")?;
            }
            Ok(())
        });
        dump(&format!("Response.{index:03}"), |out| {
            for (i, r) in segment.resp.iter().enumerate() {
                writeln!(out, "{i}\t{:e}\t{:e}", r.norm(), r.arg())?;
            }
            Ok(())
        });

        index += 1;
    }
}

fn dump<F>(name: &str, write: F)
where
    F: FnOnce(&mut std::io::BufWriter<std::fs::File>) -> std::io::Result<()>,
{
    let result = std::fs::File::create(name)
        .map(std::io::BufWriter::new)
        .and_then(|mut out| write(&mut out));
    if let Err(err) = result {
        eprintln!("error writing {name}: {err}");
        std::process::exit(1);
    }
}
