//! # Analyzer — Real Phone Number Analysis with Memoization
//!
//! Parses caller-supplied numbers through the metadata provider, assembles a
//! structured `AnalysisRecord`, and memoizes it keyed by the exact input
//! string. A cache hit returns the stored record with zero provider calls —
//! at most one computation per distinct input for the process lifetime. Two
//! differently formatted spellings of the same number are distinct cache
//! entries; normalizing the key would trade that simplicity away.
//!
//! Invalid or merely-possible numbers are expected outcomes carried as
//! booleans on the record, never errors. Errors are reserved for input the
//! provider cannot parse and for provider faults, both recoverable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::MetadataProvider;

/// Closed line-type classification. Provider labels outside the known set
/// collapse to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Mobile,
    FixedLine,
    FixedOrMobile,
    TollFree,
    PremiumRate,
    SharedCost,
    Voip,
    Personal,
    Pager,
    Uan,
    Unknown,
}

impl LineType {
    pub fn from_provider_label(label: &str) -> Self {
        match label {
            "mobile" => LineType::Mobile,
            "fixed_line" => LineType::FixedLine,
            "fixed_line_or_mobile" => LineType::FixedOrMobile,
            "toll_free" => LineType::TollFree,
            "premium_rate" => LineType::PremiumRate,
            "shared_cost" => LineType::SharedCost,
            "voip" => LineType::Voip,
            "personal_number" => LineType::Personal,
            "pager" => LineType::Pager,
            "uan" => LineType::Uan,
            _ => LineType::Unknown,
        }
    }
}

/// Who asked and when; stamped into every record this analyzer produces.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub requesting_user: String,
    pub timestamp: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(requesting_user: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        RequestContext {
            requesting_user: requesting_user.into(),
            timestamp,
        }
    }
}

/// The structured result of analyzing one number. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub original_input: String,
    pub formatted_national: String,
    pub formatted_international: String,
    pub country_name: String,
    pub country_calling_code: u16,
    pub carrier_name: String,
    pub time_zones: Vec<String>,
    pub line_type: LineType,
    pub is_valid: bool,
    pub is_possible: bool,
    pub timestamp: DateTime<Utc>,
    pub requesting_user: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("cannot parse {input:?}: {reason}")]
    Unparsable { input: String, reason: String },
    #[error("metadata provider failed for {input:?}: {message}")]
    Provider { input: String, message: String },
}

/// Provider-backed analyzer owning the memoization cache.
pub struct PhoneAnalyzer<P: MetadataProvider> {
    provider: P,
    cache: HashMap<String, AnalysisRecord>,
}

impl<P: MetadataProvider> PhoneAnalyzer<P> {
    pub fn new(provider: P) -> Self {
        PhoneAnalyzer {
            provider,
            cache: HashMap::new(),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// The provider this analyzer consults on cache misses. Exposed so tests
    /// can observe invocation counts on scripted providers.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Analyze `raw`, reusing the cached record when this exact string was
    /// analyzed before. A hit makes no provider calls and returns the record
    /// as first computed (original timestamp and user included).
    pub fn analyze(
        &mut self,
        raw: &str,
        ctx: &RequestContext,
    ) -> Result<AnalysisRecord, AnalysisError> {
        if let Some(record) = self.cache.get(raw) {
            debug!(input = raw, "analysis cache hit");
            return Ok(record.clone());
        }

        let parsed = self
            .provider
            .parse(raw)
            .map_err(|failure| AnalysisError::Unparsable {
                input: raw.to_string(),
                reason: failure.reason,
            })?;

        let fault = |f: crate::ProviderFault| AnalysisError::Provider {
            input: raw.to_string(),
            message: f.message,
        };
        let canonical = parsed.canonical.as_str();
        let record = AnalysisRecord {
            original_input: raw.to_string(),
            formatted_national: parsed.national.clone(),
            formatted_international: parsed.international.clone(),
            country_name: self.provider.country_for(canonical).map_err(fault)?,
            country_calling_code: parsed.calling_code,
            carrier_name: self.provider.carrier_for(canonical).map_err(fault)?,
            time_zones: self.provider.time_zones_for(canonical).map_err(fault)?,
            line_type: LineType::from_provider_label(
                &self.provider.number_type(canonical).map_err(fault)?,
            ),
            is_valid: self.provider.is_valid(canonical).map_err(fault)?,
            is_possible: self.provider.is_possible(canonical).map_err(fault)?,
            timestamp: ctx.timestamp,
            requesting_user: ctx.requesting_user.clone(),
        };

        info!(
            input = raw,
            valid = record.is_valid,
            country = %record.country_name,
            "number analyzed"
        );
        self.cache.insert(raw.to_string(), record.clone());
        Ok(record)
    }
}
