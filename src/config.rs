use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "storm-show",
    version,
    about = "Audio-reactive image slideshow with fractal lightning transitions"
)]
pub struct Config {
    /// Directory holding one sub-directory per scene.
    #[arg(long, default_value = "images")]
    pub images: PathBuf,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Substring match against input device names; default device if unset.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Lightning strikes precomputed before the render loop starts.
    #[arg(long, default_value_t = 50)]
    pub bolts: usize,

    /// Top-level branches per bolt.
    #[arg(long, default_value_t = 7)]
    pub branches: u32,

    /// Maximum branching recursion depth.
    #[arg(long, default_value_t = 3)]
    pub max_depth: u32,

    /// Seconds a scene is shown before the transition arms.
    #[arg(long, default_value_t = 5.0)]
    pub seconds_per_scene: f32,

    /// Flash/blank phase duration during a transition, in milliseconds.
    #[arg(long, default_value_t = 300)]
    pub strike_ms: u64,

    /// Loudness above threshold * sensitivity counts as "loud".
    #[arg(long, default_value_t = 0.9)]
    pub loud_threshold: f32,

    #[arg(long, default_value_t = 1.0)]
    pub sensitivity: f32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    Kitty,
}
