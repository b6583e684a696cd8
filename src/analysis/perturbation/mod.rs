// Waveform- and contour-derived voice quality features
//
// Module organization:
// - cepstral: cepstral peak prominence
// - spectral: spectral tilt, breathiness (H1-H2)
// - temporal: voice breaks, tremor band power, loudness decay
//
// Every function returns its own FeatureResult so one failing feature never
// takes its siblings down with it.

mod cepstral;
mod spectral;
mod temporal;

pub use cepstral::cepstral_peak_prominence;
pub use spectral::{breathiness_h1h2, spectral_tilt};
pub use temporal::{interpolate_contour, loudness_decay, tremor_band_power, voice_break_rate};
