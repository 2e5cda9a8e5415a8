use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::HeapRb;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The loudness scalar is the Euclidean norm of one analysis frame scaled
/// by this factor.
const NORM_SCALE: f32 = 10.0;

/// Latest loudness reading, written only by the analyzer thread and read
/// lock-free by anything else. Readers get most-recent-value semantics; the
/// staleness window is one analysis frame.
pub struct AtomicLevel(AtomicU32);

impl AtomicLevel {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn store(&self, level: f32) {
        self.0.store(level.to_bits(), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new()
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

/// Microphone capture plus a background analyzer that keeps the latest
/// loudness scalar current for the render loop. Missing input devices fail
/// here, at startup, rather than yielding silent zero loudness forever.
pub struct AudioMonitor {
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    level: Arc<AtomicLevel>,
    pub sample_rate_hz: u32,
}

impl AudioMonitor {
    pub fn start(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(4);
        let rb = HeapRb::<f32>::new(rb_capacity);
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let level = Arc::new(AtomicLevel::new());
        let level_for_thread = Arc::clone(&level);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| tracing::warn!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };

        stream.play().context("start input stream")?;

        let analyzer_handle = thread::spawn(move || {
            level_loop(
                &mut cons,
                sample_rate_hz,
                &stop_for_thread,
                &level_for_thread,
            )
        });

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            level,
            sample_rate_hz,
        })
    }

    pub fn level_cell(&self) -> Arc<AtomicLevel> {
        Arc::clone(&self.level)
    }

    pub fn level(&self) -> f32 {
        self.level.load()
    }
}

impl Drop for AudioMonitor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    let devices = host
        .input_devices()
        .context("enumerate input devices")?
        .collect::<Vec<_>>();

    let want = device_query.map(|s| s.to_lowercase());
    if let Some(want) = want.as_deref() {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(want))
                .unwrap_or(false)
        }) {
            return Ok(dev.clone());
        }
        return Err(anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels as f32;
        let _ = prod.try_push(mono);
    }
}

/// Accumulate tenth-of-a-second frames off the ring buffer and publish the
/// scaled Euclidean norm of each completed frame.
fn level_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    sample_rate_hz: u32,
    stop: &AtomicBool,
    level: &AtomicLevel,
) {
    let frame_len = (sample_rate_hz as usize / 10).max(1);
    let mut scratch: Vec<f32> = Vec::with_capacity(frame_len);

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            scratch.push(s);
            if scratch.len() == frame_len {
                level.store(frame_norm(&scratch));
                scratch.clear();
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Loudness of one analysis frame: Euclidean norm of its samples, scaled.
pub fn frame_norm(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s * s).sum::<f32>().sqrt() * NORM_SCALE
}
