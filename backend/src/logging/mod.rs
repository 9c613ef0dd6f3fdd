//! Run logging
//!
//! JSONL sinks for one run: an action stream, an epoch summary stream, a
//! config snapshot, and run metadata patched with the end time when the run
//! finishes. The engine also keeps these records in memory, so the logger
//! is optional; attach one to get files on disk.
//!
//! Layout under the output root:
//!
//! ```text
//! {unix_secs}_{uuid8}_{run_name}/
//!   simulation_log.jsonl    one record per agent turn
//!   epoch_summary.jsonl     one record per epoch
//!   config_snapshot.json    the exact config the run used
//!   run_meta.json           identity, roster, config hash, start/end time
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::config::RunConfig;
use crate::orchestrator::{EffectRecord, TurnStatus};
use crate::systems::market::PoolDistribution;

/// One agent turn, as logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub epoch: usize,
    pub turn_index: usize,
    pub agent_id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
    pub provider: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: String,
    /// True when the provider's first reply failed and a retry was issued,
    /// whatever the retry's outcome
    #[serde(default)]
    pub retried: bool,
    #[serde(flatten)]
    pub status: TurnStatus,
    pub effects: Vec<EffectRecord>,
}

/// Per-agent line in the epoch summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub energy: i64,
    pub influence: i64,
    pub tier: String,
    pub location: String,
}

/// One epoch, as logged after settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub distribution: PoolDistribution,
    /// Surplus retired by the treasury cap this epoch
    pub overflow_burned: i64,
    pub treasury_balance: i64,
    /// Announcement on the board during this epoch, if any
    #[serde(default)]
    pub announcement: Option<String>,
    pub agent_count: usize,
    pub total_energy: i64,
    pub gini_energy: f64,
    pub agents: Vec<AgentSnapshot>,
}

/// One roster line in the run metadata: who played, as whom, decided by what
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub persona: String,
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Run identity, roster, and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: String,
    pub name: String,
    pub seed: u64,
    pub total_epochs: usize,
    pub agent_count: usize,
    #[serde(default)]
    pub roster: Vec<RosterEntry>,
    pub config_hash: String,
    pub start_time: u64,
    #[serde(default)]
    pub end_time: Option<u64>,
}

/// SHA-256 over canonical JSON (object keys sorted recursively), so the
/// same config always hashes the same regardless of field order.
pub fn config_hash(config: &RunConfig) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(config)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(&value).as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .iter()
                .map(|k| format!("{}:{}", serde_json::to_string(k).unwrap_or_default(), canonical_json(&map[*k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", rendered.join(","))
        }
        other => other.to_string(),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// File sink for one run
pub struct RunLogger {
    run_dir: PathBuf,
    action_log: File,
    epoch_log: File,
    meta: RunMeta,
}

impl RunLogger {
    /// Create the run directory under `output_root` and write the config
    /// snapshot and initial metadata.
    pub fn create(output_root: &Path, config: &RunConfig) -> Result<Self, std::io::Error> {
        let start_time = unix_now();
        let run_id = config
            .simulation
            .run_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let short_id: String = run_id.chars().take(8).collect();
        let run_dir = output_root.join(format!(
            "{}_{}_{}",
            start_time, short_id, config.simulation.name
        ));
        fs::create_dir_all(&run_dir)?;

        let hash = config_hash(config).map_err(std::io::Error::other)?;
        let meta = RunMeta {
            run_id,
            name: config.simulation.name.clone(),
            seed: config.simulation.seed(),
            total_epochs: config.simulation.total_epochs,
            agent_count: config.agents.len(),
            roster: config
                .agents
                .iter()
                .map(|spec| RosterEntry {
                    id: spec.id.clone(),
                    persona: spec.persona.clone(),
                    provider: spec.provider.clone(),
                    model: spec.model.clone(),
                })
                .collect(),
            config_hash: hash,
            start_time,
            end_time: None,
        };

        let snapshot = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;
        fs::write(run_dir.join("config_snapshot.json"), snapshot)?;
        fs::write(
            run_dir.join("run_meta.json"),
            serde_json::to_string_pretty(&meta).map_err(std::io::Error::other)?,
        )?;

        let action_log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(run_dir.join("simulation_log.jsonl"))?;
        let epoch_log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(run_dir.join("epoch_summary.jsonl"))?;

        Ok(Self {
            run_dir,
            action_log,
            epoch_log,
            meta,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn run_id(&self) -> &str {
        &self.meta.run_id
    }

    pub fn log_action(&mut self, record: &ActionRecord) -> Result<(), std::io::Error> {
        let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        writeln!(self.action_log, "{line}")
    }

    pub fn log_epoch(&mut self, record: &EpochRecord) -> Result<(), std::io::Error> {
        let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        writeln!(self.epoch_log, "{line}")
    }

    /// Patch run metadata with the end time. Call once, when the run ends.
    pub fn finalize(&mut self) -> Result<(), std::io::Error> {
        self.meta.end_time = Some(unix_now());
        fs::write(
            self.run_dir.join("run_meta.json"),
            serde_json::to_string_pretty(&self.meta).map_err(std::io::Error::other)?,
        )
    }
}
