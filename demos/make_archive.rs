//! Synthetic Archive Generation Example
//!
//! Simulates a whitened stochastic-background detector output and writes
//! it out as a frame archive that scan_archive (or any [`FrameArchive`]
//! consumer) can read back.
//!
//! Usage: make_archive [ARCHIVE_DIR] [NUM_FILES] [SAMPLES_PER_FILE] [SEED]

use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use rumble::response::ResponseModel;
use rumble::simulate::{omega_gw, stochastic_background, OmegaGwParams, SimulationParams};

const SAMPLE_RATE: u32 = 16384;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| String::from("frames"));
    let num_files: usize = args.next().map(|a| a.parse().unwrap()).unwrap_or(10);
    let per_file: usize = args.next().map(|a| a.parse().unwrap()).unwrap_or(65536);
    let seed: u64 = args.next().map(|a| a.parse().unwrap()).unwrap_or(123);

    let length = num_files * per_file;
    if length % 2 != 0 {
        eprintln!("error: total sample count must be even");
        std::process::exit(2);
    }
    let delta_t = 1.0 / SAMPLE_RATE as f64;
    let delta_f = 1.0 / (length as f64 * delta_t);
    info!("simulating {length} samples at {SAMPLE_RATE} Hz (seed {seed})");

    let omega = omega_gw(&OmegaGwParams {
        length: length / 2 + 1,
        f0: 0.0,
        delta_f,
        alpha: 0.0,
        f_ref: 100.0,
        omega_ref: 1e-5,
    })
    .unwrap_or_else(fatal);

    let response = ResponseModel::default().series(length, SAMPLE_RATE);
    let params = SimulationParams {
        length,
        delta_t,
        seed,
    };
    let (counts, _) =
        stochastic_background(&omega, &response, &response, &params).unwrap_or_else(fatal);

    std::fs::create_dir_all(&dir).unwrap_or_else(|err| {
        eprintln!("error creating {dir}: {err}");
        std::process::exit(1);
    });

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    for file in 0..num_files {
        let name = format!("{dir}/frame-{file:04}.wav");
        let mut writer = WavWriter::create(&name, spec).unwrap_or_else(|err| {
            eprintln!("error creating {name}: {err}");
            std::process::exit(1);
        });
        for &c in &counts[file * per_file..(file + 1) * per_file] {
            let sample = c.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        info!("wrote {name}");
    }
    info!("archive complete: {num_files} files, {length} samples");
}

fn fatal<T>(err: rumble::Error) -> T {
    eprintln!("error: {err}");
    std::process::exit(1);
}
