use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::api::{IdentificationLogEntry, IdentificationResult, Stats, VoiceprintRecord};

/// Locally held display state: the record list, identification log, stats
/// snapshot, and the outcome of the most recent identify call.
///
/// Single writer, single consumer, same task; the reconciliation rules in
/// `view::sync` are the only thing that mutates it.
#[derive(Debug, Default)]
pub struct ViewState {
    /// User whose records are currently displayed
    pub selected_user: Option<String>,
    /// Voiceprint records for the selected user
    pub records: Vec<VoiceprintRecord>,
    /// Remote identification log
    pub logs: Vec<IdentificationLogEntry>,
    /// Aggregate stats snapshot, if fetched
    pub stats: Option<Stats>,
    /// When the stats snapshot was taken
    pub stats_refreshed_at: Option<DateTime<Utc>>,
    /// Outcome of the most recent identify call
    pub last_identification: Option<IdentificationResult>,
}

impl ViewState {
    pub fn render_records(&self) -> String {
        if self.records.is_empty() {
            return "(no voiceprints)".to_string();
        }
        let mut out = String::new();
        for record in &self.records {
            let _ = writeln!(out, "{:>8}  {}", record.id, record.create_time);
        }
        out
    }

    pub fn render_logs(&self) -> String {
        if self.logs.is_empty() {
            return "(no identification logs)".to_string();
        }
        let mut out = String::new();
        for entry in &self.logs {
            let user = entry.user_id.as_deref().unwrap_or("-");
            let score = entry
                .score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:>8}  {:<16}  {:>6}  {}",
                entry.id, user, score, entry.create_time
            );
        }
        out
    }

    pub fn render_stats(&self) -> String {
        let stats = self.stats.unwrap_or_default();
        match self.stats_refreshed_at {
            Some(at) => format!(
                "total: {}, today: {} (as of {})",
                stats.total,
                stats.today,
                at.to_rfc3339()
            ),
            None => format!("total: {}, today: {}", stats.total, stats.today),
        }
    }

    pub fn render_identification(&self) -> String {
        match &self.last_identification {
            None => "(no identification has been run)".to_string(),
            Some(result) => match &result.user_id {
                None => "no match".to_string(),
                Some(user) => match result.score {
                    Some(score) => format!("matched user {} (score: {})", user, score),
                    None => format!("matched user {}", user),
                },
            },
        }
    }
}
