use serde_json::{Map, Value};
use url::Url;

/// Fixed challenge category table: (key, label, description).
/// Order here is the emission order of the nested export document.
pub const CATEGORIES: &[(&str, &str, &str)] = &[
    (
        "tryhackme",
        "TryHackMe",
        "Hands-on room walkthroughs and blue/red team challenge writeups.",
    ),
    (
        "hackthebox",
        "HackTheBox",
        "Machine and challenge writeups from HackTheBox labs.",
    ),
    (
        "picoctf",
        "PicoCTF",
        "Beginner to intermediate CTF challenge solutions.",
    ),
    (
        "ctfroom",
        "CTFROOM",
        "Room-based challenge notes from CTFROOM platform.",
    ),
    (
        "ctfzone",
        "CTFZone",
        "Challenge walkthroughs and labs from CTFZone events and practice sets.",
    ),
    (
        "others",
        "Others",
        "Custom entries from any CTF or challenge source.",
    ),
];

pub const DEFAULT_CATEGORY: &str = "others";

/// Shorthand → display-name table for challenge platforms. Matched
/// case-insensitively; anything not listed passes through trimmed.
const PLATFORM_ALIASES: &[(&str, &str)] = &[
    ("htb", "HackTheBox"),
    ("hack the box", "HackTheBox"),
    ("thm", "TryHackMe"),
    ("try hack me", "TryHackMe"),
    ("pico", "PicoCTF"),
    ("picoctf", "PicoCTF"),
    ("otw", "OverTheWire"),
    ("portswigger", "PortSwigger Labs"),
    ("rootme", "Root-Me"),
    ("root-me", "Root-Me"),
];

/// First non-empty string among the canonical field name and its aliases,
/// trimmed. Canonical name always wins over any alias.
pub fn pick_str(raw: &Value, names: &[&str]) -> String {
    for name in names {
        if let Some(v) = raw.get(name) {
            let s = match v {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            if !s.is_empty() {
                return s;
            }
        }
    }
    String::new()
}

/// Collection fields accept either a JSON array or a comma-separated string.
/// Both normalize to trimmed, empty-filtered, order-preserving strings.
pub fn pick_list(raw: &Value, names: &[&str]) -> Vec<String> {
    for name in names {
        match raw.get(name) {
            Some(Value::Array(items)) => {
                let out: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if !out.is_empty() {
                    return out;
                }
            }
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return s
                    .split(',')
                    .map(|x| x.trim().to_string())
                    .filter(|x| !x.is_empty())
                    .collect();
            }
            _ => {}
        }
    }
    Vec::new()
}

/// Lenient published coercion: only an explicit false / 0 / "false" / "0"
/// reads as unpublished. Missing or unknown values stay published.
pub fn pick_published(raw: &Value) -> bool {
    match raw.get("published") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => {
            let t = s.trim();
            !(t.eq_ignore_ascii_case("false") || t == "0")
        }
        _ => true,
    }
}

/// Numeric identifier, coerced from a JSON number or numeric string.
/// Absent or non-numeric ids get a fresh one.
pub fn pick_id(raw: &Value) -> i64 {
    match raw.get("id") {
        Some(Value::Number(n)) if n.as_i64().map(|v| v > 0).unwrap_or(false) => {
            n.as_i64().unwrap_or_else(fresh_id)
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().ok().filter(|v| *v > 0).unwrap_or_else(fresh_id),
        _ => fresh_id(),
    }
}

/// Epoch-millis plus a random suffix; unique enough within a session.
pub fn fresh_id() -> i64 {
    let millis = chrono::Utc::now().timestamp_millis();
    millis + (rand::random::<u16>() % 10_000) as i64
}

/// Canonicalize a platform label against the shorthand table. Unmatched
/// values pass through unchanged apart from trimming.
pub fn canonical_platform(value: &str) -> String {
    let trimmed = value.trim();
    let lower = trimmed.to_lowercase();
    for (alias, display) in PLATFORM_ALIASES {
        if lower == *alias {
            return (*display).to_string();
        }
    }
    trimmed.to_string()
}

/// Validate a challenge category key, falling back to the default bucket.
pub fn canonical_category(value: &str) -> String {
    let key = value.trim().to_lowercase();
    if CATEGORIES.iter().any(|(k, _, _)| *k == key) {
        key
    } else if key.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        // Unknown keys survive; the exporter groups them ad hoc.
        key
    }
}

/// Everything not claimed by a canonical field or alias is kept verbatim so
/// re-export does not lose fields the engine does not know about.
pub fn passthrough(raw: &Value, known: &[&str]) -> Map<String, Value> {
    match raw.as_object() {
        Some(obj) => obj
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        None => Map::new(),
    }
}

/// External links are only rendered when they are absolute http(s)/mailto
/// URLs and not left-over template placeholders.
pub fn is_safe_external_url(raw: &str) -> bool {
    if raw.trim().is_empty() {
        return false;
    }
    let parsed = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => return false,
    };
    if !matches!(parsed.scheme(), "http" | "https" | "mailto") {
        return false;
    }
    let lower = raw.to_lowercase();
    const PLACEHOLDERS: &[&str] = &["your-username", "your-profile", "example.com"];
    !PLACEHOLDERS.iter().any(|tok| lower.contains(tok))
}
