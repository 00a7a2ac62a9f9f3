//! On-disk artifact format
//!
//! ```text
//! stanza-artifact <format-version> <checksum>
//! deps:<path>;<path>
//! <CompiledUnit as JSON>
//! ```
//!
//! The `deps:` line is omitted when the template has no ancestors. The
//! checksum is XXH3-128 (hex) over everything after the header line.

use std::path::PathBuf;
use xxhash_rust::xxh3::xxh3_128;

use super::error::CacheError;
use crate::config::consts::artifact::{FORMAT_VERSION, MAGIC};
use crate::template::CompiledUnit;

const DEPS_PREFIX: &str = "deps:";
const DEPS_SEPARATOR: char = ';';

/// Decoded artifact contents
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub unit: CompiledUnit,
    /// Ancestor source files, nearest parent first
    pub dependencies: Vec<PathBuf>,
}

pub(crate) fn encode(artifact: &Artifact) -> Result<String, CacheError> {
    let mut body = String::new();

    if !artifact.dependencies.is_empty() {
        let mut deps = Vec::with_capacity(artifact.dependencies.len());
        for path in &artifact.dependencies {
            let text = path.to_str().ok_or_else(|| {
                CacheError::Serialization(format!("non UTF-8 path {}", path.display()))
            })?;
            if text.contains(DEPS_SEPARATOR) || text.contains('\n') {
                return Err(CacheError::Serialization(format!(
                    "dependency path cannot contain ';' or newlines: {}",
                    text
                )));
            }
            deps.push(text);
        }
        body.push_str(DEPS_PREFIX);
        body.push_str(&deps.join(";"));
        body.push('\n');
    }

    let json = serde_json::to_string(&artifact.unit)
        .map_err(|e| CacheError::Serialization(e.to_string()))?;
    body.push_str(&json);

    Ok(format!(
        "{} {} {}\n{}",
        MAGIC,
        FORMAT_VERSION,
        checksum(&body),
        body
    ))
}

pub(crate) fn decode(text: &str) -> Result<Artifact, CacheError> {
    let corrupt = |reason: &str| CacheError::Corrupt(reason.to_string());

    let (header, body) = text.split_once('\n').ok_or_else(|| corrupt("missing header"))?;
    let mut fields = header.split(' ');
    if fields.next() != Some(MAGIC) {
        return Err(corrupt("bad magic"));
    }
    let version: u32 = fields
        .next()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| corrupt("bad format version"))?;
    if version != FORMAT_VERSION {
        return Err(CacheError::Corrupt(format!(
            "format version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }
    let expected = fields.next().ok_or_else(|| corrupt("missing checksum"))?;
    if fields.next().is_some() {
        return Err(corrupt("trailing header fields"));
    }
    if checksum(body) != expected {
        return Err(corrupt("checksum mismatch"));
    }

    let (dependencies, json) = match body.strip_prefix(DEPS_PREFIX) {
        Some(rest) => {
            let (line, json) = rest.split_once('\n').ok_or_else(|| corrupt("truncated deps line"))?;
            let deps = line
                .split(DEPS_SEPARATOR)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect();
            (deps, json)
        }
        None => (Vec::new(), body),
    };

    let unit = serde_json::from_str(json).map_err(|e| CacheError::Corrupt(e.to_string()))?;
    Ok(Artifact { unit, dependencies })
}

fn checksum(body: &str) -> String {
    format!("{:032x}", xxh3_128(body.as_bytes()))
}
