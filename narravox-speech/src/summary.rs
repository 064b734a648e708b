//! Summary generation
//!
//! Builds the narration text for a profile. The primary path is a pluggable
//! [`SummarySource`] (in production typically backed by an external model);
//! when it fails, [`fallback_summary`] produces a deterministic local
//! template instead. The fallback is the terminal recovery path and never
//! fails for a well-formed record.

use crate::error::NarrationError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use narravox_core::ProfileRecord;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// How many skills the primary summary reads out.
const PRIMARY_SKILL_LIMIT: usize = 5;

/// How many skills the fallback template reads out.
const FALLBACK_SKILL_LIMIT: usize = 8;

/// A generated narration text. Regenerated on demand; a new value replaces
/// the prior one entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryText {
    pub text: String,
    /// True when the local fallback template produced this text.
    pub via_fallback: bool,
    pub generated_at: DateTime<Utc>,
    /// Generation sequence number (last-writer-wins ordering).
    pub seq: u64,
}

/// Pluggable primary summary source.
#[async_trait]
pub trait SummarySource: Send + Sync {
    async fn generate(&self, profile: &ProfileRecord) -> Result<String, NarrationError>;
}

/// Default primary source: a structured template over the profile fields.
///
/// The "years of experience" figure is `experience entries * 3` — a
/// deliberate heuristic carried over from the profile page, not real
/// date-range arithmetic.
pub struct ProfileSummarySource;

#[async_trait]
impl SummarySource for ProfileSummarySource {
    async fn generate(&self, profile: &ProfileRecord) -> Result<String, NarrationError> {
        if profile.name.trim().is_empty() {
            return Err(NarrationError::Generation(
                "Profile has no name".to_string(),
            ));
        }

        let mut sentences = Vec::new();

        if profile.headline.is_empty() {
            sentences.push(format!("This is the profile of {}.", profile.name));
        } else {
            sentences.push(format!("{} is {}.", profile.name, profile.headline));
        }

        let years = profile.experience.len() * 3;
        if !profile.location.is_empty() {
            sentences.push(format!(
                "Based in {}, with around {} years of experience.",
                profile.location, years
            ));
        } else if years > 0 {
            sentences.push(format!("Around {} years of experience.", years));
        }

        if !profile.about.is_empty() {
            sentences.push(profile.about.clone());
        }

        if !profile.experience.is_empty() {
            let entries: Vec<String> = profile
                .experience
                .iter()
                .map(|e| format!("{} at {}", e.title, e.company))
                .collect();
            sentences.push(format!("Experience includes {}.", entries.join(", ")));
        }

        if !profile.education.is_empty() {
            let entries: Vec<String> = profile
                .education
                .iter()
                .map(|e| format!("{} from {}", e.degree, e.school))
                .collect();
            sentences.push(format!("Education includes {}.", entries.join(", ")));
        }

        if !profile.skills.is_empty() {
            let listed: Vec<&str> = profile
                .skills
                .iter()
                .take(PRIMARY_SKILL_LIMIT)
                .map(String::as_str)
                .collect();
            sentences.push(format!("Key skills include {}.", listed.join(", ")));
        }

        sentences.push(format!(
            "{} has {} connections and {} profile views.",
            profile.name, profile.connections, profile.profile_views
        ));

        Ok(sentences.join(" "))
    }
}

/// Deterministic fallback template.
///
/// Same fields as the primary path, but lists up to eight skills and carries
/// date ranges in the work-history phrases. Date ranges use "(start to end)"
/// so the education sentence stays the only place "from" joins phrases.
pub fn fallback_summary(profile: &ProfileRecord) -> String {
    let name = if profile.name.trim().is_empty() {
        "This member"
    } else {
        profile.name.as_str()
    };

    let mut sentences = vec![format!("Profile summary for {}.", name)];

    if !profile.headline.is_empty() {
        sentences.push(format!("{}.", profile.headline));
    }

    if !profile.location.is_empty() {
        sentences.push(format!("Located in {}.", profile.location));
    }

    let years = profile.experience.len() * 3;
    if years > 0 {
        sentences.push(format!("About {} years of experience.", years));
    }

    if !profile.about.is_empty() {
        sentences.push(profile.about.clone());
    }

    if !profile.experience.is_empty() {
        let entries: Vec<String> = profile
            .experience
            .iter()
            .map(|e| {
                if e.start_date.is_empty() && e.end_date.is_empty() {
                    format!("{} at {}", e.title, e.company)
                } else {
                    format!("{} at {} ({} to {})", e.title, e.company, e.start_date, e.end_date)
                }
            })
            .collect();
        sentences.push(format!("Work history: {}.", entries.join(", ")));
    }

    if !profile.education.is_empty() {
        let entries: Vec<String> = profile
            .education
            .iter()
            .map(|e| format!("{} from {}", e.degree, e.school))
            .collect();
        sentences.push(format!("Education: {}.", entries.join(", ")));
    }

    if !profile.skills.is_empty() {
        let listed: Vec<&str> = profile
            .skills
            .iter()
            .take(FALLBACK_SKILL_LIMIT)
            .map(String::as_str)
            .collect();
        sentences.push(format!("Skills: {}.", listed.join(", ")));
    }

    sentences.push(format!(
        "{} connections and {} profile views.",
        profile.connections, profile.profile_views
    ));

    sentences.join(" ")
}

/// Generator wrapping the primary source with last-writer-wins sequencing.
///
/// A second `begin` supersedes any in-flight generation: when the first call
/// resolves late, its sequence number no longer matches and the caller drops
/// the result instead of storing it.
pub struct SummaryGenerator {
    source: Box<dyn SummarySource>,
    seq: AtomicU64,
}

impl SummaryGenerator {
    pub fn new(source: Box<dyn SummarySource>) -> Self {
        Self {
            source,
            seq: AtomicU64::new(0),
        }
    }

    /// Generator over the built-in template source.
    pub fn builtin() -> Self {
        Self::new(Box::new(ProfileSummarySource))
    }

    /// Start a generation; returns its sequence number.
    pub fn begin(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `seq` is still the most recent generation.
    pub fn is_current(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == seq
    }

    /// Run the primary source for a generation started with [`begin`].
    ///
    /// [`begin`]: SummaryGenerator::begin
    pub async fn generate(
        &self,
        seq: u64,
        profile: &ProfileRecord,
    ) -> Result<SummaryText, NarrationError> {
        let text = self.source.generate(profile).await?;
        debug!(seq, len = text.len(), "summary generated");
        Ok(SummaryText {
            text,
            via_fallback: false,
            generated_at: Utc::now(),
            seq,
        })
    }

    /// Build the terminal-recovery fallback for a generation.
    pub fn fallback(&self, seq: u64, profile: &ProfileRecord) -> SummaryText {
        SummaryText {
            text: fallback_summary(profile),
            via_fallback: true,
            generated_at: Utc::now(),
            seq,
        }
    }
}
