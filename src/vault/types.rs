//! Core vault type definitions.
//!
//! Defines [`Tier`] (the four lifecycle tiers with their authoritative colors
//! and descriptions), [`FileType`], [`Document`] (a full record), and
//! [`DocumentSummary`] (the wire representation shared by every endpoint).

use serde::{Deserialize, Serialize};

use crate::config::TierConfig;

/// Lifecycle tier — a coarse bucketing of the cognitive score.
///
/// Colors and descriptions live here so every endpoint reports identical tier
/// metadata from one authoritative source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Hot tier — frequently accessed, highly relevant.
    Active,
    /// Warm tier — moderately relevant, recent context.
    Contextual,
    /// Cold tier — low activity, infrequent access.
    Archived,
    /// Deep archive — rarely accessed, low relevance.
    Dormant,
}

/// All tiers in classifier order, hottest first.
pub const TIER_ORDER: [Tier; 4] = [Tier::Active, Tier::Contextual, Tier::Archived, Tier::Dormant];

impl Tier {
    /// Classify a score against the configured thresholds, checked in
    /// descending order; boundaries are closed on the lower edge.
    pub fn classify(score: f64, config: &TierConfig) -> Tier {
        if score >= config.active_threshold {
            Tier::Active
        } else if score >= config.contextual_threshold {
            Tier::Contextual
        } else if score >= config.archived_threshold {
            Tier::Archived
        } else {
            Tier::Dormant
        }
    }

    /// SQL- and wire-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Contextual => "Contextual",
            Self::Archived => "Archived",
            Self::Dormant => "Dormant",
        }
    }

    /// Display color used by the front-end for this tier.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Active => "#00ff88",
            Self::Contextual => "#00d4ff",
            Self::Archived => "#ff9500",
            Self::Dormant => "#666688",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Active => "Hot Tier — frequently accessed, highly relevant",
            Self::Contextual => "Warm Tier — moderately relevant, recent context",
            Self::Archived => "Cold Tier — low activity, infrequent access",
            Self::Dormant => "Deep Archive — rarely accessed, low relevance",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Contextual" => Ok(Self::Contextual),
            "Archived" => Ok(Self::Archived),
            "Dormant" => Ok(Self::Dormant),
            _ => Err(format!("unknown tier: {s}")),
        }
    }
}

/// Recognized upload file types. Anything else maps to [`FileType::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
    Md,
    Png,
    Jpg,
    Jpeg,
    Tiff,
    Bmp,
    Other,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Other => "other",
        }
    }

    /// Derive the file type from a filename extension.
    pub fn from_filename(filename: &str) -> FileType {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" => Self::Txt,
            "md" => Self::Md,
            "png" => Self::Png,
            "jpg" => Self::Jpg,
            "jpeg" => Self::Jpeg,
            "tiff" => Self::Tiff,
            "bmp" => Self::Bmp,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            "md" => Ok(Self::Md),
            "png" => Ok(Self::Png),
            "jpg" => Ok(Self::Jpg),
            "jpeg" => Ok(Self::Jpeg),
            "tiff" => Ok(Self::Tiff),
            "bmp" => Ok(Self::Bmp),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown file type: {s}")),
        }
    }
}

/// A full document record, matching the `documents` table schema.
#[derive(Debug, Clone)]
pub struct Document {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// Owner of the document. Every owner-scoped operation takes this explicitly.
    pub user_id: String,
    pub filename: String,
    pub file_type: String,
    pub file_size: u64,
    pub chunk_count: u32,
    pub description: Option<String>,
    /// Extracted text retained for snippets and previews.
    pub content_text: Option<String>,
    /// Derived lifecycle tier, kept consistent with `cognitive_score`.
    pub tier: String,
    /// Composite cognitive score in `[0, 1]`.
    pub cognitive_score: f64,
    /// Last known query similarity; 0.0 until the document matches a search.
    pub semantic_score: f64,
    pub access_count: u32,
    /// ISO 8601 timestamp of the last recorded access, `None` until first access.
    pub last_accessed: Option<String>,
    /// ISO 8601 creation timestamp, immutable.
    pub created_at: String,
}

/// The document summary returned by every document-bearing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub file_type: String,
    pub tier: String,
    pub cognitive_score: f64,
    pub semantic_score: f64,
    pub access_count: u32,
    pub last_accessed: Option<String>,
    pub created_at: String,
    pub chunk_count: u32,
    pub file_size: u64,
    pub description: Option<String>,
}

impl Document {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            filename: self.filename.clone(),
            file_type: self.file_type.clone(),
            tier: self.tier.clone(),
            cognitive_score: self.cognitive_score,
            semantic_score: self.semantic_score,
            access_count: self.access_count,
            last_accessed: self.last_accessed.clone(),
            created_at: self.created_at.clone(),
            chunk_count: self.chunk_count,
            file_size: self.file_size,
            description: self.description.clone(),
        }
    }
}

/// One append-only usage record.
#[derive(Debug, Clone, Serialize)]
pub struct AccessEvent {
    pub document_id: String,
    pub accessed_at: String,
    pub query_used: Option<String>,
    pub relevance_score: Option<f64>,
}
