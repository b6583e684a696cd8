// Feature groups - each one owns a fixed set of keys
//
// A group always emits every key it owns. A failed prerequisite (missing
// pitch contour, absent engine) marks the dependent keys unavailable and
// the group carries on with the rest.

use crate::analysis::articulation::{
    articulatory_ratio, f1_mean, f2_mean, formant_bandwidth, vowel_space_area,
};
use crate::analysis::perturbation::{
    breathiness_h1h2, cepstral_peak_prominence, loudness_decay, spectral_tilt,
    tremor_band_power, voice_break_rate,
};
use crate::analysis::pitch::{articulation_rate, pitch_period_entropy, pitch_summary};
use crate::analysis::rhythm::{ddk_rate, festination, interval_stats};
use crate::analysis::spectrum::FrameAnalyzer;
use crate::config::AnalysisConfig;
use crate::engines::{
    decimation_step, harmonic_energy_ratio, mfcc_row_mean, noise_to_harmonics, Engines,
    JitterKind, ShimmerKind,
};
use crate::error::FeatureError;
use crate::features::{FeatureResult, FeatureSet, FeatureValue};
use crate::signal::{FormantFrame, PitchContour, Waveform, WordTimestamp};
use crate::temporal::temporal_indicators;

pub const PITCH_TRACKER: &str = "pitch tracker";
pub const FORMANT_TRACKER: &str = "formant tracker";
pub const ONSET_DETECTOR: &str = "onset detector";

/// MFCC rows requested from the cepstral engine
const MFCC_COEFFICIENTS: usize = 13;
/// Row reported as `mfcc2_mean`
const MFCC_REPORTED_ROW: usize = 1;

const CORE_VOICE_KEYS: &[&str] = &[
    "f0_mean",
    "f0_sd",
    "f0_range",
    "jitter_local",
    "shimmer_local",
    "hnr",
    "mfcc2_mean",
];

const ADVANCED_KEYS: &[&str] = &[
    "rpde",
    "dfa",
    "ppe",
    "cpp",
    "articulation_rate",
    "f1_mean",
    "f2_mean",
    "spectral_harmonicity",
];

const SUSTAINED_VOWEL_KEYS: &[&str] = &[
    "jitter_local",
    "jitter_local_abs",
    "jitter_rap",
    "jitter_ppq5",
    "jitter_ddp",
    "shimmer_local",
    "shimmer_local_db",
    "shimmer_apq3",
    "shimmer_apq5",
    "shimmer_apq11",
    "shimmer_dda",
    "hnr",
    "nhr",
    "cpp",
    "f0_mean",
    "f0_sd",
    "f0_min",
    "f0_max",
    "f0_range",
    "rpde",
    "dfa",
    "ppe",
    "d2",
];

const VOWEL_SPACE_KEYS: &[&str] = &["f1_mean", "f2_mean", "vsa", "vai"];

const PERTURBATION_KEYS: &[&str] = &[
    "formant_bandwidth",
    "spectral_tilt",
    "voice_breaks",
    "tremor_freq_power",
    "breathiness_h1h2",
    "loudness_decay",
];

const RHYTHM_KEYS: &[&str] = &[
    "onset_count",
    "ddk_rate",
    "ddk_regularity_cv",
    "ddk_mean_ioi",
    "ddk_sd_ioi",
    "festination",
];

const TEMPORAL_KEYS: &[&str] = &[
    "pause_before_noun",
    "pause_variability",
    "syllable_rate_decay",
    "word_duration_mean",
    "voiced_ratio",
];

/// Independent unit of feature computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    /// F0 summary, local jitter/shimmer, HNR, MFCC 2
    CoreVoice,
    /// Nonlinear dynamics, PPE, CPP, voicing, formant means, harmonicity
    Advanced,
    /// Full perturbation suite for a held vowel
    SustainedVowel,
    /// Formant means and articulatory ratio
    VowelSpace,
    /// Spectral tilt, voice breaks, tremor, H1-H2, loudness decay, F1 bandwidth
    Perturbation,
    /// DDK onset statistics
    Rhythm,
    /// Word-timestamp indicators
    Temporal,
}

impl FeatureGroup {
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            FeatureGroup::CoreVoice => CORE_VOICE_KEYS,
            FeatureGroup::Advanced => ADVANCED_KEYS,
            FeatureGroup::SustainedVowel => SUSTAINED_VOWEL_KEYS,
            FeatureGroup::VowelSpace => VOWEL_SPACE_KEYS,
            FeatureGroup::Perturbation => PERTURBATION_KEYS,
            FeatureGroup::Rhythm => RHYTHM_KEYS,
            FeatureGroup::Temporal => TEMPORAL_KEYS,
        }
    }

    pub fn compute(&self, ctx: &GroupContext<'_>) -> FeatureSet {
        match self {
            FeatureGroup::CoreVoice => core_voice(ctx),
            FeatureGroup::Advanced => advanced(ctx),
            FeatureGroup::SustainedVowel => sustained_vowel(ctx),
            FeatureGroup::VowelSpace => vowel_space(ctx),
            FeatureGroup::Perturbation => perturbation(ctx),
            FeatureGroup::Rhythm => rhythm(ctx),
            FeatureGroup::Temporal => temporal(ctx),
        }
    }
}

/// Everything one composition reads, borrowed for its duration
///
/// `None` for a producer output means that collaborator failed or was not
/// run; only the keys depending on it become unavailable.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInputs<'a> {
    pub waveform: &'a Waveform,
    pub pitch: Option<&'a PitchContour>,
    pub formants: Option<&'a [FormantFrame]>,
    pub onsets: Option<&'a [f64]>,
    pub transcript: Option<&'a [WordTimestamp]>,
    /// Recording length in seconds for the transcript indicators; waveform
    /// features always use the waveform's own duration
    pub total_duration: f64,
}

impl<'a> AnalysisInputs<'a> {
    /// Inputs with only a waveform; the duration is taken from it
    pub fn new(waveform: &'a Waveform) -> Self {
        Self {
            waveform,
            pitch: None,
            formants: None,
            onsets: None,
            transcript: None,
            total_duration: waveform.duration_secs(),
        }
    }

    pub fn with_pitch(mut self, pitch: &'a PitchContour) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn with_formants(mut self, formants: &'a [FormantFrame]) -> Self {
        self.formants = Some(formants);
        self
    }

    pub fn with_onsets(mut self, onsets: &'a [f64]) -> Self {
        self.onsets = Some(onsets);
        self
    }

    pub fn with_transcript(mut self, transcript: &'a [WordTimestamp]) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn with_total_duration(mut self, total_duration: f64) -> Self {
        self.total_duration = total_duration;
        self
    }
}

/// Shared state handed to every group of one composition
pub struct GroupContext<'a> {
    pub config: &'a AnalysisConfig,
    pub analyzer: &'a FrameAnalyzer,
    pub inputs: &'a AnalysisInputs<'a>,
    pub engines: &'a Engines<'a>,
}

impl<'a> GroupContext<'a> {
    fn samples(&self) -> &'a [f32] {
        self.inputs.waveform.samples()
    }

    fn pitch(&self) -> Result<&'a PitchContour, FeatureError> {
        self.inputs
            .pitch
            .ok_or(FeatureError::EngineUnavailable {
                engine: PITCH_TRACKER,
            })
    }

    fn formants(&self) -> Result<&'a [FormantFrame], FeatureError> {
        self.inputs
            .formants
            .ok_or(FeatureError::EngineUnavailable {
                engine: FORMANT_TRACKER,
            })
    }

    fn onsets(&self) -> Result<&'a [f64], FeatureError> {
        self.inputs
            .onsets
            .ok_or(FeatureError::EngineUnavailable {
                engine: ONSET_DETECTOR,
            })
    }

    fn cpp(&self) -> FeatureResult {
        cepstral_peak_prominence(self.analyzer, self.samples(), &self.config.cepstral)
    }

    fn ppe(&self) -> FeatureResult {
        pitch_period_entropy(self.pitch()?, &self.config.pitch_entropy)
    }

    fn sample_entropy(&self) -> FeatureResult {
        let nonlinear = &self.config.nonlinear;
        let engine = self.engines.nonlinear()?;
        let waveform = self.inputs.waveform;
        let series = waveform.decimated(decimation_step(waveform.len(), nonlinear.entropy_target_len));
        engine.sample_entropy(&series, nonlinear.sample_entropy_emb_dim)
    }

    fn detrended_fluctuation(&self) -> FeatureResult {
        let engine = self.engines.nonlinear()?;
        let waveform = self.inputs.waveform;
        let step = decimation_step(waveform.len(), self.config.nonlinear.entropy_target_len);
        engine.detrended_fluctuation(&waveform.decimated(step))
    }

    fn correlation_dimension(&self) -> FeatureResult {
        let nonlinear = &self.config.nonlinear;
        let engine = self.engines.nonlinear()?;
        let waveform = self.inputs.waveform;
        let series =
            waveform.decimated(decimation_step(waveform.len(), nonlinear.correlation_target_len));
        engine.correlation_dimension(&series, nonlinear.correlation_emb_dim)
    }

    fn jitter(&self, kind: JitterKind) -> FeatureResult {
        self.engines.perturbation()?.jitter(self.inputs.waveform, kind)
    }

    fn shimmer(&self, kind: ShimmerKind) -> FeatureResult {
        self.engines.perturbation()?.shimmer(self.inputs.waveform, kind)
    }

    fn hnr(&self) -> FeatureResult {
        self.engines.perturbation()?.harmonicity(self.inputs.waveform)
    }

    fn mfcc2_mean(&self) -> FeatureResult {
        let rows = self
            .engines
            .cepstral()?
            .mfcc(self.inputs.waveform, MFCC_COEFFICIENTS)?;
        mfcc_row_mean(&rows, MFCC_REPORTED_ROW)
    }

    fn spectral_harmonicity(&self) -> FeatureResult {
        let harmonic = self.engines.harmonic()?.harmonic(self.inputs.waveform)?;
        harmonic_energy_ratio(self.inputs.waveform, &harmonic)
    }
}

/// Insert the F0 summary keys; `with_extremes` adds f0_min / f0_max
fn insert_pitch_summary(features: &mut FeatureSet, ctx: &GroupContext<'_>, with_extremes: bool) {
    let mut keys = vec!["f0_mean", "f0_sd", "f0_range"];
    if with_extremes {
        keys.extend(["f0_min", "f0_max"]);
    }

    match ctx.pitch().and_then(pitch_summary) {
        Ok(summary) => {
            features.insert("f0_mean", summary.mean);
            features.insert("f0_sd", summary.sd);
            features.insert("f0_range", summary.range());
            if with_extremes {
                features.insert("f0_min", summary.min);
                features.insert("f0_max", summary.max);
            }
        }
        Err(err) => features.insert_all_unavailable(&keys, &err),
    }
}

fn core_voice(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    insert_pitch_summary(&mut features, ctx, false);
    features.insert_result("jitter_local", ctx.jitter(JitterKind::Local));
    features.insert_result("shimmer_local", ctx.shimmer(ShimmerKind::Local));
    features.insert_result("hnr", ctx.hnr());
    features.insert_result("mfcc2_mean", ctx.mfcc2_mean());
    features
}

fn advanced(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    features.insert_result("rpde", ctx.sample_entropy());
    features.insert_result("dfa", ctx.detrended_fluctuation());
    features.insert_result("ppe", ctx.ppe());
    features.insert_result("cpp", ctx.cpp());
    features.insert_result(
        "articulation_rate",
        ctx.pitch().and_then(articulation_rate),
    );
    match ctx.formants() {
        Ok(track) => {
            features.insert_result("f1_mean", f1_mean(track));
            features.insert_result("f2_mean", f2_mean(track));
        }
        Err(err) => features.insert_all_unavailable(&["f1_mean", "f2_mean"], &err),
    }
    features.insert_result("spectral_harmonicity", ctx.spectral_harmonicity());
    features
}

fn sustained_vowel(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    for kind in JitterKind::ALL {
        features.insert_result(kind.key(), ctx.jitter(kind));
    }
    for kind in ShimmerKind::ALL {
        features.insert_result(kind.key(), ctx.shimmer(kind));
    }

    let hnr = ctx.hnr();
    features.insert_result("nhr", hnr.clone().and_then(noise_to_harmonics));
    features.insert_result("hnr", hnr);

    features.insert_result("cpp", ctx.cpp());
    insert_pitch_summary(&mut features, ctx, true);
    features.insert_result("rpde", ctx.sample_entropy());
    features.insert_result("dfa", ctx.detrended_fluctuation());
    features.insert_result("ppe", ctx.ppe());
    features.insert_result("d2", ctx.correlation_dimension());
    features
}

fn vowel_space(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    match ctx.formants() {
        Ok(track) => {
            let f1 = f1_mean(track);
            let f2 = f2_mean(track);
            features.insert_result("vai", articulatory_ratio(&f1, &f2));
            features.insert_result("f1_mean", f1);
            features.insert_result("f2_mean", f2);
        }
        Err(err) => features.insert_all_unavailable(&["f1_mean", "f2_mean", "vai"], &err),
    }
    features.insert_result("vsa", vowel_space_area());
    features
}

fn perturbation(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    let config = ctx.config;
    let samples = ctx.samples();

    features.insert_result(
        "formant_bandwidth",
        ctx.formants().and_then(formant_bandwidth),
    );
    features.insert_result(
        "spectral_tilt",
        spectral_tilt(ctx.analyzer, samples, &config.spectral_tilt),
    );
    features.insert_result(
        "voice_breaks",
        ctx.pitch()
            .and_then(|pitch| voice_break_rate(pitch, ctx.inputs.waveform.duration_secs())),
    );
    features.insert_result(
        "tremor_freq_power",
        ctx.pitch()
            .and_then(|pitch| tremor_band_power(ctx.analyzer.fft(), pitch, &config.tremor)),
    );
    features.insert_result(
        "breathiness_h1h2",
        ctx.pitch().and_then(|pitch| {
            breathiness_h1h2(ctx.analyzer, samples, pitch, &config.breathiness)
        }),
    );
    features.insert_result(
        "loudness_decay",
        loudness_decay(samples, ctx.analyzer.sample_rate(), &config.loudness),
    );
    features
}

fn rhythm(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    let onsets = match ctx.onsets() {
        Ok(onsets) => onsets,
        Err(err) => {
            features.insert_all_unavailable(RHYTHM_KEYS, &err);
            return features;
        }
    };

    features.insert("onset_count", FeatureValue::Count(onsets.len() as u64));
    features.insert_result("ddk_rate", ddk_rate(onsets));
    match interval_stats(onsets) {
        Ok(stats) => {
            features.insert("ddk_mean_ioi", stats.mean);
            features.insert("ddk_sd_ioi", stats.sd);
            features.insert_result("ddk_regularity_cv", stats.coefficient_of_variation());
        }
        Err(err) => features.insert_all_unavailable(
            &["ddk_mean_ioi", "ddk_sd_ioi", "ddk_regularity_cv"],
            &err,
        ),
    }
    match festination(onsets, &ctx.config.rhythm) {
        Ok(flag) => features.insert("festination", flag),
        Err(err) => features.insert_all_unavailable(&["festination"], &err),
    }
    features
}

fn temporal(ctx: &GroupContext<'_>) -> FeatureSet {
    let mut features = FeatureSet::new();
    let words = ctx.inputs.transcript.unwrap_or_default();
    let indicators = temporal_indicators(words, ctx.inputs.total_duration, &ctx.config.temporal);
    features.insert_result("pause_before_noun", indicators.pause_before_noun);
    features.insert_result("pause_variability", indicators.pause_variability);
    features.insert_result("syllable_rate_decay", indicators.syllable_rate_decay);
    features.insert_result("word_duration_mean", indicators.word_duration_mean);
    features.insert_result("voiced_ratio", indicators.voiced_ratio);
    features
}
