// Analysis module - Signal, contour and timing feature computations
//
// Every computation here is a pure function of borrowed inputs that returns
// a FeatureResult (or a small typed result) per feature. Grouping the
// results into a FeatureSet is the composer's job.
//
// Module organization:
// - spectrum: FFT processor, windows, sliding-frame analysis
// - stats: mean/SD, least-squares line, interpolation
// - perturbation: CPP, spectral tilt, H1-H2, voice breaks, tremor, loudness
// - pitch: F0 summary, pitch period entropy, voiced fraction
// - rhythm: DDK onset statistics and festination
// - articulation: formant means, articulatory ratio, vowel space area

pub mod articulation;
pub mod perturbation;
pub mod pitch;
pub mod rhythm;
pub mod spectrum;
pub mod stats;
