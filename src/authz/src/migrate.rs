//! Migration of unscoped legacy keys
//!
//! Legacy keys become scoped keys with an empty grant set, so they keep
//! working exactly as before (unrestricted) until an operator narrows them.

use scopegate_core::{KeyRecord, LegacyKeyRecord};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::store::InMemoryCredentialStore;

/// What happened to one legacy key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated,
    WouldMigrate,
    /// A scoped key with the same prefix already exists
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEntry {
    pub name: String,
    pub prefix: String,
    pub outcome: MigrationOutcome,
}

impl fmt::Display for MigrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            MigrationOutcome::Migrated => write!(f, "  MIGRATED: {} ({})", self.name, self.prefix),
            MigrationOutcome::WouldMigrate => {
                write!(f, "  WOULD MIGRATE: {} ({})", self.name, self.prefix)
            }
            MigrationOutcome::Skipped => write!(
                f,
                "  SKIP: {} (prefix {} already exists)",
                self.name, self.prefix
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub dry_run: bool,
    pub entries: Vec<MigrationEntry>,
}

impl MigrationReport {
    /// Keys migrated, or that would be in a dry run
    pub fn migrated(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome != MigrationOutcome::Skipped)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome == MigrationOutcome::Skipped)
            .count()
    }

    pub fn summary(&self) -> String {
        if self.dry_run {
            format!(
                "Would migrate {} keys, skip {} duplicates",
                self.migrated(),
                self.skipped()
            )
        } else {
            format!("Migrated {} keys, skipped {} duplicates", self.migrated(), self.skipped())
        }
    }
}

/// Copy legacy keys into the scoped store
///
/// Keys whose prefix is already present (in the store or earlier in the
/// batch) are skipped. With `dry_run` the store is left untouched.
pub fn migrate_legacy_keys<I>(legacy: I, store: &InMemoryCredentialStore, dry_run: bool) -> MigrationReport
where
    I: IntoIterator<Item = LegacyKeyRecord>,
{
    let mut seen: HashSet<String> = store.records().into_iter().map(|r| r.prefix).collect();
    let mut report = MigrationReport {
        dry_run,
        entries: Vec::new(),
    };

    for old in legacy {
        let name = old.name.clone();
        let prefix = old.prefix.clone();

        let outcome = if !seen.insert(prefix.clone()) {
            debug!(prefix = %prefix, "Skipping legacy key with existing prefix");
            MigrationOutcome::Skipped
        } else if dry_run {
            MigrationOutcome::WouldMigrate
        } else {
            store.insert(KeyRecord::from(old));
            MigrationOutcome::Migrated
        };

        report.entries.push(MigrationEntry {
            name,
            prefix,
            outcome,
        });
    }

    info!(
        dry_run,
        migrated = report.migrated(),
        skipped = report.skipped(),
        "Legacy key migration finished"
    );
    report
}
