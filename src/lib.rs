//! Spectrum-editing core: a curve registry, signal-processing transforms
//! (Savitzky-Golay smoothing, asymmetric-least-squares baseline removal,
//! Min-Max and Z-score normalization, peak detection), manual peak
//! annotation, and a tagged undo/redo log over all of it.
//!
//! The crate is display-agnostic: hosts pass in plain numeric arrays and
//! parameter records, and get back arrays, [`ActionRecord`]s and id-based
//! references to re-render from. File dialogs, CSV parsing and plotting all
//! live on the host side.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod log;
pub mod processing;

pub use config::{BaselineParams, EngineConfig, Limit, PeakParams, SmoothParams};
pub use data::curve::{Curve, CurveId, Tristate};
pub use data::peaks::{ManualPeakTable, PeakSet};
pub use data::registry::CurveRegistry;
pub use engine::{ActionKind, ActionRecord, Axis, CurveExport, SpectraEngine, Viewport};
pub use error::EngineError;
pub use processing::TransformKind;
