use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use collapsi::{BoardLayout, Difficulty, GameEvent, GameSummary};
use serde::{Deserialize, Serialize};

/// Everything needed to replay one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecording {
    pub seed: u64,
    pub layout: BoardLayout,
    /// The bots in seating order.
    pub seats: Vec<Difficulty>,
    pub events: Vec<GameEvent>,
    pub summary: GameSummary,
}

/// Writes recordings as numbered JSON files into a directory.
pub struct Recorder {
    num: usize,
    directory: PathBuf,
}

impl Recorder {
    pub fn new(directory: PathBuf) -> anyhow::Result<Self> {
        if !directory.is_dir() {
            anyhow::bail!("Directory '{}' does not exist", directory.display());
        }
        Ok(Self { num: 1, directory })
    }

    pub fn write_game_recording(&mut self, recording: &GameRecording) -> anyhow::Result<PathBuf> {
        let filepath = self.directory.join(format!("game_{:0>6}.json", self.num));
        let mut writer = BufWriter::new(File::create(&filepath)?);
        serde_json::to_writer_pretty(&mut writer, recording)?;
        writer.flush()?;
        self.num += 1;
        Ok(filepath)
    }
}
