// Spectral-frame analysis shared by the waveform features
//
// Module organization:
// - fft: FFT processor (magnitude spectrum, power cepstrum) and frequency axes
// - window: Hann windows and sample/second conversions
// - mod.rs: FrameAnalyzer, sliding-frame iteration over a waveform

mod fft;
mod window;

pub use fft::{linspace, rfft_frequencies, FftProcessor, POWER_FLOOR};
pub use window::{apply_window, hann_periodic, hann_symmetric, secs_to_samples};

/// Sliding-frame spectral analysis over one waveform's samples
///
/// Owns the FFT processor so consecutive frames of the same length reuse a
/// single plan.
#[derive(Clone)]
pub struct FrameAnalyzer {
    fft: FftProcessor,
    sample_rate: u32,
}

impl FrameAnalyzer {
    /// Create a new frame analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (e.g., 16000)
    pub fn new(sample_rate: u32) -> Self {
        Self {
            fft: FftProcessor::new(),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn fft(&self) -> &FftProcessor {
        &self.fft
    }

    /// Start offsets of sliding frames
    ///
    /// Frames start at `0, hop, 2·hop, …` strictly before `len − frame_len`,
    /// so the final sample position is never the start of a partial frame.
    pub fn frame_starts(len: usize, frame_len: usize, hop: usize) -> impl Iterator<Item = usize> {
        let end = len.saturating_sub(frame_len);
        (0..end).step_by(hop.max(1))
    }

    /// Power cepstrum of every periodic-Hann windowed frame
    pub fn cepstra<'a>(
        &'a self,
        samples: &'a [f32],
        frame_len: usize,
        hop: usize,
    ) -> impl Iterator<Item = Vec<f64>> + 'a {
        let window = hann_periodic(frame_len);
        Self::frame_starts(samples.len(), frame_len, hop).map(move |start| {
            let frame = apply_window(&samples[start..start + frame_len], &window);
            self.fft.power_cepstrum(&frame)
        })
    }

    /// Magnitude spectrum of a segment after symmetric Hann windowing
    pub fn hann_magnitude(&self, segment: &[f32]) -> Vec<f64> {
        let window = hann_symmetric(segment.len());
        self.fft.magnitude_spectrum(&apply_window(segment, &window))
    }

    /// RMS energy of consecutive frames covering the whole signal
    ///
    /// Produces `1 + (len − frame_len) / hop` frames; empty when the signal
    /// is shorter than one frame.
    pub fn rms_frames(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f64> {
        if frame_len == 0 || hop == 0 || samples.len() < frame_len {
            return Vec::new();
        }
        let count = 1 + (samples.len() - frame_len) / hop;
        (0..count)
            .map(|i| {
                let frame = &samples[i * hop..i * hop + frame_len];
                let energy: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
                (energy / frame_len as f64).sqrt()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_starts_exclude_final_position() {
        let starts: Vec<usize> = FrameAnalyzer::frame_starts(1000, 640, 160).collect();
        assert_eq!(starts, vec![0, 160, 320]);

        // Exactly one frame long: no frame
        assert_eq!(FrameAnalyzer::frame_starts(640, 640, 160).count(), 0);
        assert_eq!(FrameAnalyzer::frame_starts(100, 640, 160).count(), 0);
    }

    #[test]
    fn test_rms_frames_count_and_value() {
        let samples = vec![0.5f32; 1000];
        let rms = FrameAnalyzer::rms_frames(&samples, 400, 160);
        assert_eq!(rms.len(), 1 + (1000 - 400) / 160);
        assert!(rms.iter().all(|&r| (r - 0.5).abs() < 1e-9));

        assert!(FrameAnalyzer::rms_frames(&samples[..399], 400, 160).is_empty());
    }

    #[test]
    fn test_cepstra_one_per_frame() {
        let analyzer = FrameAnalyzer::new(16_000);
        let samples = vec![0.1f32; 1000];
        let cepstra: Vec<Vec<f64>> = analyzer.cepstra(&samples, 640, 160).collect();
        assert_eq!(cepstra.len(), 3);
        assert!(cepstra.iter().all(|c| c.len() == 640));
    }
}
