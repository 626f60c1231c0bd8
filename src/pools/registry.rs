//! Mining pool registry
//!
//! Parsed from the remote pools document. Two layouts are understood:
//!
//! - **Sections**: an object with optional `coinbase_tags` (pattern → {name, link}),
//!   `payout_addresses` (address → {name, link}), `slugs` (name → slug) and
//!   `pools` ([{name, link, addresses}]) keys.
//! - **Pool list**: a top-level array of `{name, link, slug?, addresses, tags, regexes}`.
//!
//! Tag patterns keep document order, which is the attribution priority order.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::errors::{ScanError, ScanResult};
use crate::types::PoolInfo;

/// Registry pattern with its matching interpretation
#[derive(Debug, Clone)]
pub enum TagPattern {
    /// Compiled case-insensitive regular expression
    Regex(Regex),
    /// Lowercased literal, matched as a case-insensitive substring
    Literal(String),
}

impl TagPattern {
    /// Compile `pattern` case-insensitively, degrading to a literal on failure
    pub fn compile(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => TagPattern::Regex(regex),
            Err(e) => {
                let err = ScanError::MalformedPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                };
                warn!("{}; using substring match", err);
                TagPattern::literal(pattern)
            }
        }
    }

    pub fn literal(text: &str) -> Self {
        TagPattern::Literal(text.to_lowercase())
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TagPattern::Regex(regex) => regex.is_match(text),
            TagPattern::Literal(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// Coinbase tag rule
#[derive(Debug, Clone)]
pub struct TagEntry {
    /// Pattern text as it appeared in the document
    pub source: String,
    pub pattern: TagPattern,
    pub pool: PoolInfo,
}

/// Loaded pool metadata
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    tag_patterns: Vec<TagEntry>,
    payout_addresses: HashMap<String, PoolInfo>,
    name_to_slug: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct SectionsDocument {
    #[serde(default)]
    coinbase_tags: Map<String, Value>,
    #[serde(default)]
    payout_addresses: Map<String, Value>,
    #[serde(default)]
    slugs: Map<String, Value>,
    #[serde(default)]
    pools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PoolRef {
    name: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    slug: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PoolDefinition {
    name: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    addresses: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    regexes: Vec<String>,
}

impl PoolRegistry {
    /// Registry with no entries; attribution falls through to the built-in table
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a registry document
    pub fn from_json(document: &str) -> ScanResult<Self> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| ScanError::RegistryLoadFailed(format!("invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> ScanResult<Self> {
        let mut registry = match value {
            Value::Object(_) => {
                let document: SectionsDocument = serde_json::from_value(value).map_err(|e| {
                    ScanError::RegistryLoadFailed(format!("malformed sections: {}", e))
                })?;
                Self::from_sections(document)
            }
            Value::Array(entries) => Self::from_pool_list(entries),
            other => {
                return Err(ScanError::RegistryLoadFailed(format!(
                    "unexpected document type: {}",
                    json_type_name(&other)
                )))
            }
        };

        registry.link_slugs();
        debug!(
            "Pool registry parsed: {} tag patterns, {} payout addresses, {} slugs",
            registry.tag_patterns.len(),
            registry.payout_addresses.len(),
            registry.name_to_slug.len()
        );
        Ok(registry)
    }

    fn from_sections(document: SectionsDocument) -> Self {
        let mut registry = Self::empty();

        for (name, slug) in document.slugs {
            if let Value::String(slug) = slug {
                registry.name_to_slug.insert(name, slug);
            }
        }

        for (pattern, entry) in document.coinbase_tags {
            match serde_json::from_value::<PoolRef>(entry) {
                Ok(pool) => registry.tag_patterns.push(TagEntry {
                    pattern: TagPattern::compile(&pattern),
                    source: pattern,
                    pool: PoolInfo::new(pool.name, pool.link, pool.slug),
                }),
                Err(e) => debug!("Skipping coinbase tag {}: {}", pattern, e),
            }
        }

        for (address, entry) in document.payout_addresses {
            match serde_json::from_value::<PoolRef>(entry) {
                Ok(pool) => {
                    registry
                        .payout_addresses
                        .insert(address, PoolInfo::new(pool.name, pool.link, pool.slug));
                }
                Err(e) => debug!("Skipping payout address {}: {}", address, e),
            }
        }

        // Pool address lists only fill gaps left by the explicit address table
        for entry in document.pools {
            let Ok(pool) = serde_json::from_value::<PoolDefinition>(entry) else {
                continue;
            };
            let info = PoolInfo::new(pool.name, pool.link, pool.slug);
            for address in pool.addresses {
                registry
                    .payout_addresses
                    .entry(address)
                    .or_insert_with(|| info.clone());
            }
        }

        registry
    }

    fn from_pool_list(entries: Vec<Value>) -> Self {
        let mut registry = Self::empty();

        for entry in entries {
            let pool = match serde_json::from_value::<PoolDefinition>(entry) {
                Ok(pool) => pool,
                Err(e) => {
                    debug!("Skipping pool definition: {}", e);
                    continue;
                }
            };
            let slug = pool.slug.or_else(|| slugify(&pool.name));
            let info = PoolInfo::new(pool.name.clone(), pool.link, slug);

            if let Some(slug) = &info.slug {
                registry
                    .name_to_slug
                    .entry(pool.name)
                    .or_insert_with(|| slug.clone());
            }

            for tag in pool.tags {
                registry.tag_patterns.push(TagEntry {
                    pattern: TagPattern::literal(&tag),
                    source: tag,
                    pool: info.clone(),
                });
            }
            for regex in pool.regexes {
                registry.tag_patterns.push(TagEntry {
                    pattern: TagPattern::compile(&regex),
                    source: regex,
                    pool: info.clone(),
                });
            }
            for address in pool.addresses {
                registry
                    .payout_addresses
                    .entry(address)
                    .or_insert_with(|| info.clone());
            }
        }

        registry
    }

    /// Give every tag and address entry without a slug the aliased one, when known
    fn link_slugs(&mut self) {
        let aliases = &self.name_to_slug;
        let pools = self
            .tag_patterns
            .iter_mut()
            .map(|entry| &mut entry.pool)
            .chain(self.payout_addresses.values_mut());

        for pool in pools {
            if pool.slug.is_none() {
                pool.slug = aliases.get(&pool.name).cloned();
            }
        }
    }

    pub fn tag_patterns(&self) -> &[TagEntry] {
        &self.tag_patterns
    }

    pub fn payout_pool(&self, address: &str) -> Option<&PoolInfo> {
        self.payout_addresses.get(address)
    }

    pub fn slug_for(&self, name: &str) -> Option<&str> {
        self.name_to_slug.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tag_patterns.is_empty()
            && self.payout_addresses.is_empty()
            && self.name_to_slug.is_empty()
    }
}

/// Logo slug derived from a pool name: lowercase ASCII alphanumerics only
fn slugify(name: &str) -> Option<String> {
    let slug: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!slug.is_empty()).then_some(slug)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
