//! Claim assembly: merging user input with the reserved claims.

use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{idp, Claims, Error, Result};

pub const DEFAULT_AUDIENCE: &str = "https://fake-resource.solo.io";
pub const DEFAULT_EXPIRES_IN: &str = "8766h";
pub const DEFAULT_SUBJECT: &str = "glooey@solo.io";

// Claim names the assembler owns. User-supplied values under these names
// never survive assembly.
const RESERVED: [&str; 5] = ["iss", "sub", "aud", "exp", "scopes"];

/// Per-invocation token recipe.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw `key=value` strings.
    pub claims: Vec<String>,
    pub scopes: Vec<String>,
    pub audiences: Vec<String>,
    /// Go `time.ParseDuration` grammar, e.g. `1h30m`.
    pub expires_in: String,
    pub subject: String,
    pub pretty_print: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            claims: Vec::new(),
            scopes: Vec::new(),
            audiences: vec![DEFAULT_AUDIENCE.to_string()],
            expires_in: DEFAULT_EXPIRES_IN.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            pretty_print: false,
        }
    }
}

/// Build the finalized claim set for one invocation.
///
/// Every input problem is collected before failing, so one error report
/// names all malformed claims and a bad duration at once. Reserved claims
/// are written after user claims and therefore always win.
pub fn assemble(config: &Config) -> Result<Claims> {
    let mut errs = Vec::new();
    let mut extra = Map::new();

    for raw in &config.claims {
        match split_key_value(raw) {
            Some((k, v)) => {
                // Later duplicates overwrite earlier ones.
                extra.insert(k.to_string(), Value::String(v.to_string()));
            }
            None => errs.push(format!("arg '{}' must be in format key=value", raw)),
        }
    }

    let exp_offset_nanos = match go_parse_duration::parse_duration(&config.expires_in) {
        Ok(nanos) => nanos,
        Err(go_parse_duration::Error::ParseError(detail)) => {
            errs.push(format!(
                "invalid time duration '{}': {}",
                config.expires_in, detail
            ));
            0
        }
    };

    if !errs.is_empty() {
        return Err(Error::ClaimsValidation(errs));
    }

    extra.insert(
        "beer_of_the_day".to_string(),
        Value::String(fakeit::beer::name()),
    );

    // The reserved writes land last; whatever the user put under these
    // names is dropped here.
    for name in RESERVED {
        extra.remove(name);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    Ok(Claims {
        iss: idp::ISSUER.to_string(),
        sub: config.subject.clone(),
        aud: config.audiences.clone(),
        exp: now + exp_offset_nanos.div_euclid(1_000_000_000),
        scopes: config.scopes.clone(),
        extra,
    })
}

// Split on the first '='; both halves must be non-empty.
fn split_key_value(raw: &str) -> Option<(&str, &str)> {
    let (k, v) = raw.split_once('=')?;
    if k.is_empty() || v.is_empty() {
        return None;
    }
    Some((k, v))
}
