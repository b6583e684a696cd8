//! Analysis requests for the command-line shell
//!
//! A request is a JSON document naming a WAV file plus whatever the external
//! collaborators produced for it (pitch contour, formant track, onsets,
//! transcript, engine measures). Relative audio paths resolve against the
//! request file's directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::compose::{AnalysisInputs, FeatureComposer, TaskType};
use crate::config::AnalysisConfig;
use crate::engines::{Engines, PrecomputedMeasures};
use crate::features::{round_to, FeatureSet};
use crate::signal::{FormantTrack, OnsetTimes, PitchContour, Transcript, Waveform};

/// Speaker sex used to pick the F0 reference norm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(anyhow!("gender must be 'male' or 'female' (got '{}')", other)),
        }
    }
}

/// Population F0 reference in Hz for downstream normalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct F0Norm {
    pub mean: f64,
    pub sd: f64,
}

impl Gender {
    pub fn f0_norm(&self) -> F0Norm {
        match self {
            Gender::Male => F0Norm {
                mean: 120.0,
                sd: 20.0,
            },
            Gender::Female => F0Norm {
                mean: 210.0,
                sd: 30.0,
            },
        }
    }
}

/// One recording plus its collaborator outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// WAV file to analyse
    pub audio: PathBuf,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub pitch: Option<PitchContour>,
    #[serde(default)]
    pub formants: Option<FormantTrack>,
    #[serde(default)]
    pub onsets: Option<OnsetTimes>,
    #[serde(default)]
    pub transcript: Option<Transcript>,
    /// Overrides the recording length used by the transcript indicators
    #[serde(default)]
    pub total_duration: Option<f64>,
    /// Values for the measurement engines; omitted engines are unavailable
    #[serde(default)]
    pub measures: Option<PrecomputedMeasures>,
}

/// JSON document written by the CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub status: &'static str,
    pub task_type: TaskType,
    pub gender: Gender,
    /// Recording length, rounded to milliseconds
    pub duration_s: f64,
    pub sample_rate: u32,
    pub f0_norm_ref: F0Norm,
    pub features: FeatureSet,
}

impl AnalysisRequest {
    /// Minimal request for an audio file with no collaborator outputs
    pub fn for_audio(audio: impl Into<PathBuf>) -> Self {
        Self {
            audio: audio.into(),
            task_type: None,
            gender: None,
            pitch: None,
            formants: None,
            onsets: None,
            transcript: None,
            total_duration: None,
            measures: None,
        }
    }

    /// Read a request file and resolve its audio path
    pub fn load(path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading request {}", path.display()))?;
        let mut request: AnalysisRequest =
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;

        if request.audio.is_relative() {
            if let Some(dir) = path.parent() {
                request.audio = dir.join(&request.audio);
            }
        }
        Ok(request)
    }

    /// Decode the audio and compute the feature set
    ///
    /// `task_override` wins over the task named in the request; one of the
    /// two must be present.
    pub fn run(
        &self,
        task_override: Option<TaskType>,
        config: &AnalysisConfig,
    ) -> Result<AnalysisReport> {
        let task = task_override
            .or(self.task_type)
            .ok_or_else(|| anyhow!("No task type given in request or on the command line"))?;

        let (samples, sample_rate) = read_wav(&self.audio)?;
        let waveform = Waveform::new(samples, sample_rate);

        let mut inputs = AnalysisInputs::new(&waveform);
        if let Some(pitch) = &self.pitch {
            inputs = inputs.with_pitch(pitch);
        }
        if let Some(formants) = &self.formants {
            inputs = inputs.with_formants(formants);
        }
        if let Some(onsets) = &self.onsets {
            inputs = inputs.with_onsets(onsets);
        }
        if let Some(transcript) = &self.transcript {
            inputs = inputs.with_transcript(transcript);
        }
        if let Some(duration) = self.total_duration {
            inputs = inputs.with_total_duration(duration);
        }

        let engines = match &self.measures {
            Some(measures) => Engines::all(measures),
            None => Engines::none(),
        };

        let features = FeatureComposer::new(config.clone())
            .compute(task, &inputs, &engines)
            .with_context(|| format!("analysing {}", self.audio.display()))?;

        let gender = self.gender.unwrap_or_default();
        Ok(AnalysisReport {
            status: "ok",
            task_type: task,
            gender,
            duration_s: round_to(waveform.duration_secs(), 3),
            sample_rate,
            f0_norm_ref: gender.f0_norm(),
            features,
        })
    }
}

/// Decode a WAV file to mono f32 samples in [-1, 1]
///
/// Multi-channel audio is averaged across channels per frame.
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) - 1;
            match spec.bits_per_sample {
                16 => reader
                    .samples::<i16>()
                    .map(|sample| {
                        sample
                            .map(|value| value as f32 / max as f32)
                            .map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample
                            .map(|value| value as f32 / max as f32)
                            .map_err(|err| anyhow!(err))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                other => {
                    return Err(anyhow!(
                        "Unsupported bits per sample {} in {}",
                        other,
                        path.display()
                    ))
                }
            }
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok((samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::WordTimestamp;

    fn write_wav(path: &Path, channels: u16, frames: &[Vec<i16>]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &sample in frame {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_wav_averages_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[vec![i16::MAX, 0], vec![0, i16::MAX]]);

        let (samples, sample_rate) = read_wav(&path).unwrap();
        assert_eq!(sample_rate, 16_000);
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_request_resolves_relative_audio() {
        let dir = tempfile::tempdir().unwrap();
        let request_path = dir.path().join("request.json");
        fs::write(
            &request_path,
            r#"{"audio": "take1.wav", "task_type": "ddk", "onsets": [0.1, 0.4, 0.7]}"#,
        )
        .unwrap();

        let request = AnalysisRequest::load(&request_path).unwrap();
        assert_eq!(request.audio, dir.path().join("take1.wav"));
        assert_eq!(request.task_type, Some(TaskType::Ddk));
        assert_eq!(request.onsets, Some(vec![0.1, 0.4, 0.7]));
        assert!(request.pitch.is_none());
    }

    #[test]
    fn test_run_requires_task() {
        let request = AnalysisRequest::for_audio("/nonexistent.wav");
        let err = request.run(None, &AnalysisConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No task type"));
    }

    #[test]
    fn test_duration_override_only_reaches_transcript_indicators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.wav");
        let frames: Vec<Vec<i16>> = (0..16_000)
            .map(|i| vec![((i % 100) as i16 - 50) * 100])
            .collect();
        write_wav(&path, 1, &frames);

        let mut request = AnalysisRequest::for_audio(&path);
        request.total_duration = Some(4.0);
        request.transcript = Some(vec![
            WordTimestamp::new("the", 0.0, 0.1),
            WordTimestamp::new("elephant", 0.3, 0.9),
        ]);
        let report = request
            .run(Some(TaskType::Ddk), &AnalysisConfig::default())
            .unwrap();

        assert_eq!(report.duration_s, 1.0);
        // 0.7 s of words over the 4 s override
        assert_eq!(
            report.features.get("voiced_ratio").and_then(|v| v.as_f64()),
            Some(0.175)
        );
    }

    #[test]
    fn test_run_ddk_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddk.wav");
        let frames: Vec<Vec<i16>> = (0..16_000)
            .map(|i| vec![((i % 100) as i16 - 50) * 100])
            .collect();
        write_wav(&path, 1, &frames);

        let mut request = AnalysisRequest::for_audio(&path);
        request.onsets = Some(vec![0.0, 0.3, 0.6, 0.9, 1.2, 1.5]);
        let report = request
            .run(Some(TaskType::Ddk), &AnalysisConfig::default())
            .unwrap();

        assert_eq!(report.status, "ok");
        assert_eq!(report.gender, Gender::Female);
        assert_eq!(report.f0_norm_ref.mean, 210.0);
        assert_eq!(report.sample_rate, 16_000);
        assert_eq!(report.duration_s, 1.0);
        assert_eq!(report.features.len(), 6);
        assert_eq!(
            report.features.get("festination").and_then(|v| v.as_bool()),
            Some(false)
        );
    }
}
