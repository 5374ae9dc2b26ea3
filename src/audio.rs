//! Splash sounds using the Web Audio API
//!
//! Each droplet impact plays a short filtered noise burst, procedurally
//! generated; no external files needed. The voice parameters are plain data so
//! they can be checked without a browser.

use rand::Rng;

/// Burst length (seconds)
pub const SPLASH_DURATION: f64 = 0.09;
/// Attack time to peak gain (seconds)
pub const SPLASH_ATTACK: f64 = 0.012;
/// Gain floor for the exponential ramps (must be > 0)
pub const SPLASH_FLOOR_GAIN: f32 = 0.0001;
/// Peak gain at full power
pub const SPLASH_MAX_GAIN: f32 = 0.006;
pub const BANDPASS_HZ: f32 = 850.0;
pub const BANDPASS_Q: f32 = 0.7;
pub const LOWPASS_HZ: f32 = 1600.0;
/// Envelope exponent of the noise burst
pub const ENVELOPE_EXPONENT: f32 = 2.2;

/// Parameters for one splash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactVoice {
    /// Peak gain
    pub volume: f32,
    /// Seconds
    pub duration: f64,
}

impl ImpactVoice {
    /// Voice for an impact of `power`, scaled by the master volume
    pub fn for_power(power: f32, master_volume: f32) -> Self {
        let power = if power.is_nan() { 0.0 } else { power };
        let volume = SPLASH_MAX_GAIN * (power / 3.0).clamp(0.35, 1.0) * master_volume.clamp(0.0, 1.0);
        Self {
            volume,
            duration: SPLASH_DURATION,
        }
    }

    /// Number of samples in the burst
    pub fn sample_count(&self, sample_rate: f32) -> usize {
        (sample_rate as f64 * self.duration).floor().max(1.0) as usize
    }
}

/// Decaying white noise: uniform noise shaped by `(1 - i/n)^2.2`
pub fn noise_burst<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f32> {
    let n = len as f32;
    (0..len)
        .map(|i| {
            let env = (1.0 - i as f32 / n).powf(ENVELOPE_EXPONENT);
            (rng.random::<f32>() * 2.0 - 1.0) * env
        })
        .collect()
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, BiquadFilterType};

    use super::*;
    use crate::session::ImpactSink;

    /// Lazily created audio context plus the user's sound toggle
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        enabled: bool,
        master_volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        /// No context yet; browsers only allow one after a user gesture
        pub fn new() -> Self {
            Self {
                ctx: None,
                enabled: false,
                master_volume: 1.0,
            }
        }

        /// Sound button: create the context on first use and switch sound on
        pub fn enable(&mut self) -> bool {
            if self.ctx.is_none() {
                self.ctx = AudioContext::new().ok();
                if self.ctx.is_none() {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    return false;
                }
            }
            self.resume();
            self.enabled = true;
            log::info!("Sound enabled");
            true
        }

        pub fn is_enabled(&self) -> bool {
            self.enabled && self.ctx.is_some()
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Noise -> band-pass -> low-pass -> gain envelope -> speakers
        fn play_splash(&self, ctx: &AudioContext, voice: ImpactVoice) -> Option<()> {
            let t = ctx.current_time();
            let sample_rate = ctx.sample_rate();
            let len = voice.sample_count(sample_rate);

            let mut data = noise_burst(len, &mut rand::rng());
            let buffer = ctx.create_buffer(1, len as u32, sample_rate).ok()?;
            buffer.copy_to_channel(&mut data, 0).ok()?;

            let src = ctx.create_buffer_source().ok()?;
            src.set_buffer(Some(&buffer));

            let bandpass = ctx.create_biquad_filter().ok()?;
            bandpass.set_type(BiquadFilterType::Bandpass);
            bandpass.frequency().set_value(BANDPASS_HZ);
            bandpass.q().set_value(BANDPASS_Q);

            let lowpass = ctx.create_biquad_filter().ok()?;
            lowpass.set_type(BiquadFilterType::Lowpass);
            lowpass.frequency().set_value(LOWPASS_HZ);

            let gain = ctx.create_gain().ok()?;
            let peak = voice.volume.max(SPLASH_FLOOR_GAIN);
            gain.gain().set_value_at_time(SPLASH_FLOOR_GAIN, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(peak, t + SPLASH_ATTACK)
                .ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(SPLASH_FLOOR_GAIN, t + voice.duration)
                .ok()?;

            src.connect_with_audio_node(&bandpass).ok()?;
            bandpass.connect_with_audio_node(&lowpass).ok()?;
            lowpass.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            src.start_with_when(t).ok()?;
            src.stop_with_when(t + voice.duration).ok()?;
            Some(())
        }
    }

    impl ImpactSink for AudioManager {
        fn play_impact(&mut self, power: f32) {
            if !self.enabled {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let voice = ImpactVoice::for_power(power, self.master_volume);
            if self.play_splash(ctx, voice).is_none() {
                log::debug!("Splash voice could not be built");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_voice_volume_scaling() {
        let quiet = ImpactVoice::for_power(0.3, 1.0);
        assert!((quiet.volume - 0.006 * 0.35).abs() < 1e-8);
        let loud = ImpactVoice::for_power(9.0, 1.0);
        assert!((loud.volume - 0.006).abs() < 1e-8);
        let mid = ImpactVoice::for_power(1.5, 1.0);
        assert!((mid.volume - 0.003).abs() < 1e-8);
        assert_eq!(mid.duration, 0.09);
    }

    #[test]
    fn test_voice_master_volume() {
        let v = ImpactVoice::for_power(3.0, 0.5);
        assert!((v.volume - 0.003).abs() < 1e-8);
        assert_eq!(ImpactVoice::for_power(3.0, 0.0).volume, 0.0);
    }

    #[test]
    fn test_sample_count() {
        let v = ImpactVoice::for_power(1.0, 1.0);
        assert_eq!(v.sample_count(48_000.0), 4320);
        assert_eq!(v.sample_count(44_100.0), 3969);
    }

    #[test]
    fn test_noise_burst_envelope() {
        let mut rng = Pcg32::seed_from_u64(9);
        let n = 400;
        let burst = noise_burst(n, &mut rng);
        assert_eq!(burst.len(), n);
        for (i, s) in burst.iter().enumerate() {
            let env = (1.0 - i as f32 / n as f32).powf(2.2);
            assert!(s.abs() <= env + 1e-6);
        }
        // Tail is much quieter than the head
        let head: f32 = burst[..40].iter().map(|s| s.abs()).sum();
        let tail: f32 = burst[n - 40..].iter().map(|s| s.abs()).sum();
        assert!(tail < head * 0.05);
    }
}
