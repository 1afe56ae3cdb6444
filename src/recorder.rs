//! Match result persistence. The state machine hands a finished match to a
//! recorder exactly once, at the MatchOver transition; everything about the
//! storage medium lives here.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::info;

use crate::types::{MatchRecord, Winner};

/// Sink for completed matches. Failures are the recorder's concern; the
/// state machine logs them and keeps its in-memory result.
pub trait MatchRecorder: Send {
    fn record(&mut self, record: &MatchRecord) -> Result<()>;
}

/// Aggregates over the stored score history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub total_matches: usize,
    pub player_wins: usize,
    pub opponent_wins: usize,
    /// Player win percentage, rounded to one decimal.
    pub win_rate_pct: f32,
}

// =========================================================================
// JSON score book
// =========================================================================

/// Keeps only this many matches on disk, newest last.
const MAX_STORED_MATCHES: usize = 100;

/// Score history persisted as pretty-printed JSON.
pub struct JsonScoreBook {
    path: PathBuf,
    entries: Vec<MatchRecord>,
}

impl JsonScoreBook {
    /// Open a score book, loading any existing history. A missing or
    /// unparseable file starts an empty book rather than failing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read score book {}", path.display()))?;
            match serde_json::from_str::<Vec<MatchRecord>>(&content) {
                Ok(entries) => {
                    info!("loaded {} stored matches from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    info!("score book {} unreadable ({}), starting empty", path.display(), e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        Ok(Self { path, entries })
    }

    pub fn entries(&self) -> &[MatchRecord] {
        &self.entries
    }

    pub fn stats(&self) -> ScoreStats {
        stats_over(&self.entries)
    }

    fn save(&self) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("failed to create score book {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, &self.entries)?;
        Ok(())
    }
}

impl MatchRecorder for JsonScoreBook {
    fn record(&mut self, record: &MatchRecord) -> Result<()> {
        self.entries.push(record.clone());
        if self.entries.len() > MAX_STORED_MATCHES {
            let excess = self.entries.len() - MAX_STORED_MATCHES;
            self.entries.drain(..excess);
        }
        self.save()?;
        info!(
            "recorded match: winner={} {}-{} over {} rounds",
            record.winner.as_str(),
            record.player_score,
            record.opponent_score,
            record.rounds.len(),
        );
        Ok(())
    }
}

/// Compute stats over any record slice.
pub fn stats_over(entries: &[MatchRecord]) -> ScoreStats {
    let total_matches = entries.len();
    let player_wins = entries.iter().filter(|r| r.winner == Winner::Player).count();
    let opponent_wins = total_matches - player_wins;
    let win_rate_pct = if total_matches > 0 {
        let raw = player_wins as f32 / total_matches as f32 * 100.0;
        (raw * 10.0).round() / 10.0
    } else {
        0.0
    };
    ScoreStats {
        total_matches,
        player_wins,
        opponent_wins,
        win_rate_pct,
    }
}

// =========================================================================
// In-memory recorder
// =========================================================================

/// Shared-handle recorder for tests and headless hosts: clones see the same
/// record list.
#[derive(Clone, Default)]
pub struct MemoryRecorder {
    records: Arc<Mutex<Vec<MatchRecord>>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<MatchRecord> {
        self.records.lock().expect("recorder lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("recorder lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MatchRecorder for MemoryRecorder {
    fn record(&mut self, record: &MatchRecord) -> Result<()> {
        self.records
            .lock()
            .expect("recorder lock poisoned")
            .push(record.clone());
        Ok(())
    }
}
