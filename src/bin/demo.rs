//! Command-line driver exercising the engine on a synthetic spectrum.
//!
//! Runs the typical interactive sequence (load, baseline, smooth,
//! normalize, peak detection, undo/redo) and prints the session journal.

use spectra_engine::{
    EngineConfig, Limit, PeakParams, SpectraEngine, TransformKind,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!(
        "spectra-engine demo v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Synthetic spectrum: three Gaussian bands on a sloped baseline with a
    // deterministic ripple standing in for noise.
    let n = 2048;
    let x: Vec<f64> = (0..n).map(|i| 400.0 + i as f64 * 0.8).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| {
            let band = |center: f64, width: f64, height: f64| {
                height * (-((xi - center) / width).powi(2)).exp()
            };
            0.002 * xi + 1.5
                + band(620.0, 14.0, 9.0)
                + band(1030.0, 22.0, 5.5)
                + band(1410.0, 9.0, 7.0)
                + 0.05 * (xi * 1.7).sin()
        })
        .collect();

    let mut engine = SpectraEngine::new();
    let config = EngineConfig::default();

    if let Err(e) = run(&mut engine, x, y, &config) {
        ::log::error!("demo failed: {e}");
        std::process::exit(1);
    }

    println!("{}", engine.session().to_text());
}

fn run(
    engine: &mut SpectraEngine,
    x: Vec<f64>,
    y: Vec<f64>,
    config: &EngineConfig,
) -> Result<(), spectra_engine::EngineError> {
    engine.load_curve(x, y, "synthetic")?;
    engine.set_axis_labels("Raman Shift (cm⁻¹)", "Intensity");

    engine.apply_transform(TransformKind::Baseline, config)?;
    engine.apply_transform(TransformKind::Smooth, config)?;
    engine.apply_transform(TransformKind::NormalizeMinMax, config)?;

    let params = PeakParams {
        height: Some(Limit::Min(0.2)),
        prominence: Some(Limit::Min(0.1)),
        distance: Some(10.0),
        ..PeakParams::default()
    };
    engine.find_peaks(&params)?;

    let export = engine.export_curve("synthetic")?;
    if let Some(peaks_x) = &export.peaks_x {
        println!("detected {} peaks at:", peaks_x.len());
        for px in peaks_x {
            println!("  {px:8.1} cm⁻¹");
        }
    } else {
        println!("no peaks detected");
    }

    // one step back and forward again, for good measure
    let undone = engine.undo();
    let redone = engine.redo();
    ::log::info!(
        "undo/redo cycle: {:?} → {:?}",
        undone.map(|r| r.kind),
        redone.map(|r| r.kind)
    );

    Ok(())
}
