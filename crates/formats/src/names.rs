//! Region name lookup tables (`[{ "name", "alpha-2", "country-code" }]`).

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub name: String,
    pub alpha2: String,
    /// Normalized with [`normalize_region_code`].
    pub code: String,
}

#[derive(Debug)]
pub enum NameTableError {
    InvalidJson(String),
    InvalidRecord { index: usize, reason: String },
}

impl std::fmt::Display for NameTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameTableError::InvalidJson(e) => write!(f, "invalid name table: {e}"),
            NameTableError::InvalidRecord { index, reason } => {
                write!(f, "invalid name record {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for NameTableError {}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeValue {
    Text(String),
    Number(i64),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    name: Option<String>,
    #[serde(rename = "alpha-2", default)]
    alpha2: Option<String>,
    #[serde(rename = "country-code")]
    code: Option<CodeValue>,
}

/// Normalizes numeric region codes to three zero-padded digits (`4` and
/// `"004"` both become `"004"`). Non-numeric codes are only trimmed.
pub fn normalize_region_code(raw: &str) -> String {
    let t = raw.trim();
    match t.parse::<u32>() {
        Ok(n) => format!("{n:03}"),
        Err(_) => t.to_string(),
    }
}

pub fn parse_name_table(payload: &str) -> Result<Vec<NameRecord>, NameTableError> {
    let raw: Vec<RawRecord> =
        serde_json::from_str(payload).map_err(|e| NameTableError::InvalidJson(e.to_string()))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, r)| {
            let code = match r.code {
                Some(CodeValue::Text(s)) => normalize_region_code(&s),
                Some(CodeValue::Number(n)) => normalize_region_code(&n.to_string()),
                None => {
                    return Err(NameTableError::InvalidRecord {
                        index,
                        reason: "missing country-code".to_string(),
                    });
                }
            };
            Ok(NameRecord {
                name: r.name.unwrap_or_default(),
                alpha2: r.alpha2.unwrap_or_default(),
                code,
            })
        })
        .collect()
}

/// Lookup keyed by normalized code. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    by_code: HashMap<String, NameRecord>,
}

impl NameTable {
    pub fn new(records: Vec<NameRecord>) -> Self {
        Self {
            by_code: records.into_iter().map(|r| (r.code.clone(), r)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn get(&self, raw_code: &str) -> Option<&NameRecord> {
        self.by_code.get(&normalize_region_code(raw_code))
    }
}
