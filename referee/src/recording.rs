use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Writes every request and response of a match to a JSON file.
pub struct Recorder {
    num: usize,
    directory: PathBuf,
    exchanges: Vec<Exchange>,
}

#[derive(Serialize, Deserialize)]
pub struct Exchange {
    pub request: serde_json::Value,
    pub response: serde_json::Value,
}

impl Recorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self {
            num: 1,
            directory,
            exchanges: Vec::new(),
        })
    }

    pub fn store_exchange(&mut self, request: serde_json::Value, response: serde_json::Value) {
        self.exchanges.push(Exchange { request, response });
    }

    pub fn has_pending(&self) -> bool {
        !self.exchanges.is_empty()
    }

    /// Writes out everything stored since the last recording, and starts a new one.
    pub fn write_match_recording(&mut self) -> anyhow::Result<PathBuf> {
        let filepath = self.directory.join(format!("match_{:0>6}.json", self.num));
        let writer = BufWriter::new(File::create(&filepath)?);
        serde_json::to_writer_pretty(writer, &std::mem::take(&mut self.exchanges))?;
        self.num += 1;
        Ok(filepath)
    }
}
