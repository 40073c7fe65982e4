use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::configs::{Buffering, CodecKind, MixerConfig};

/// One raw L16 input file fed into the mixer by the demo binary.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DemoSource {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DemoConfig {
    #[serde(default)]
    pub sources: Vec<DemoSource>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Pace the file readers at the frame duration instead of as fast as possible.
    #[serde(default)]
    pub realtime: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            output: default_output(),
            realtime: false,
        }
    }
}

impl DemoConfig {
    /// Mixer settings the demo runs with.
    ///
    /// Inputs are raw L16 files. Unpaced readers outrun the mix clock, so
    /// they get the flushable accumulator instead of an overwriting ring.
    pub fn effective_mixer(&self, mixer: &MixerConfig) -> MixerConfig {
        let mut mixer = mixer.clone();
        mixer.codec = CodecKind::L16;
        if !self.realtime {
            mixer.buffering = Buffering::Flush;
        }
        mixer
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("output.pcm")
}
