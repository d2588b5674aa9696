use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered steps of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Initialize,
    RetrieveCatalog,
    InstallVm,
    InstallDatabase,
    InstallVmStorage,
    InstallSupport,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Initialize,
        Phase::RetrieveCatalog,
        Phase::InstallVm,
        Phase::InstallDatabase,
        Phase::InstallVmStorage,
        Phase::InstallSupport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initialize => "initialize",
            Phase::RetrieveCatalog => "retrieve-catalog",
            Phase::InstallVm => "install-vm",
            Phase::InstallDatabase => "install-database",
            Phase::InstallVmStorage => "install-vm-storage",
            Phase::InstallSupport => "install-support",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::InstallSupport)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress record of one run, published to operational tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatus {
    pub node: String,
    pub phase: Option<Phase>,
    pub workload: u32,
    pub done: u32,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    pub failed: bool,

    pub nb_locations: usize,
    pub nb_instance_types: usize,
    pub nb_instance_prices: usize,
    pub nb_database_types: usize,
    pub nb_database_prices: usize,
    pub nb_storage_types: usize,
    pub nb_storage_prices: usize,
    pub nb_support_prices: usize,
    pub nb_skipped: usize,
    pub nb_changed: usize,
}

impl ImportStatus {
    pub fn new(node: &str) -> Self {
        Self {
            node: node.to_string(),
            phase: None,
            workload: Phase::ALL.len() as u32,
            done: 0,
            start: Utc::now(),
            end: None,
            failed: false,
            nb_locations: 0,
            nb_instance_types: 0,
            nb_instance_prices: 0,
            nb_database_types: 0,
            nb_database_prices: 0,
            nb_storage_types: 0,
            nb_storage_prices: 0,
            nb_support_prices: 0,
            nb_skipped: 0,
            nb_changed: 0,
        }
    }

    /// Enter `phase`, counting the previous one as done.
    pub fn advance(&mut self, phase: Phase) {
        if self.phase.is_some() {
            self.done += 1;
        }
        self.phase = Some(phase);
    }

    pub fn finish(&mut self, failed: bool) {
        if !failed && self.phase.is_some() {
            self.done += 1;
        }
        self.failed = failed;
        self.end = Some(Utc::now());
    }

    pub fn is_complete(&self) -> bool {
        !self.failed && self.done == self.workload
    }
}
