//! Header derivation: complete a document's front matter from its filename,
//! filesystem timestamps, and content scans.
//!
//! Only missing keys are filled; a field the author wrote is never
//! overwritten. The lookup vocabularies (platforms, tools) are constant
//! data, not control flow: extending them is an edit to a table, and the
//! scanning code never changes.

use crate::config::ConverterConfig;
use crate::frontmatter::FrontMatter;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::Path;

// ── Lookup vocabularies ──────────────────────────────────────────────────

/// Platform names matched as case-insensitive substrings anywhere in the
/// document. Emitted in this order.
const PLATFORM_KEYWORDS: [&str; 5] = [
    "hackthebox",
    "tryhackme",
    "picoctf",
    "vulnhub",
    "overthewire",
];

static RE_DIFFICULTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bdifficulty["\s:]+(beginner|intermediate|advanced)"#).unwrap()
});

// Tool vocabularies, word-boundary matched. Longer variants precede their
// prefixes (docker-compose before docker) so the specific name wins.
static RE_SECURITY_TOOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(nmap|netcat|nc|telnet|ssh|wireshark|burpsuite|burp|sqlmap|metasploit|msfvenom|john|hashcat|gobuster|dirbuster|dirb|nikto|nessus|openvas)\b",
    )
    .unwrap()
});

static RE_DEVOPS_TOOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(github|gitlab|git|docker-compose|docker|kubectl|helm|ansible|terraform|jenkins)\b",
    )
    .unwrap()
});

static RE_LANGUAGES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(python3|python|bash|sh|powershell|cmd|java|node|npm|yarn)\b").unwrap()
});

static RE_MARKDOWN_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_`#\[\]()]+").unwrap());

/// Description length cap, ellipsis included.
const DESCRIPTION_MAX: usize = 160;

// ── Derivation ───────────────────────────────────────────────────────────

/// Complete a header so that title, date, draft, and categories are always
/// populated, plus whatever content-derived fields the body yields.
///
/// When `create_missing_frontmatter` is off and the document already has a
/// header, it is returned exactly as written.
pub fn complete(
    mut front: FrontMatter,
    source: &Path,
    body: &str,
    config: &ConverterConfig,
) -> FrontMatter {
    if !config.create_missing_frontmatter && !front.is_empty() {
        return front;
    }

    if !front.contains_key("title") {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        front.insert_str("title", title_from_filename(&stem));
    }

    if !front.contains_key("date") {
        front.insert_str("date", file_date(source));
    }

    if !front.contains_key("draft") {
        front.insert("draft", Value::Bool(config.default_draft));
    }

    if !front.contains_key("categories") {
        front.insert_list("categories", config.default_categories.iter().cloned());
    }

    fill_from_content(&mut front, body);

    front
}

/// Turn a filename stem into a display title: underscores and hyphens become
/// spaces, each word capitalized ("my_htb-notes" → "My Htb Notes").
pub fn title_from_filename(stem: &str) -> String {
    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// ISO-8601 timestamp with offset from the file's creation time, falling
/// back to modification time, then the current time.
fn file_date(path: &Path) -> String {
    let stamp = std::fs::metadata(path)
        .ok()
        .and_then(|m| m.created().or_else(|_| m.modified()).ok())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(Local::now);
    stamp.format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

/// Fill difficulty, platforms, tools, and description from content scans.
/// Each key is only added when absent and when the scan found something.
fn fill_from_content(front: &mut FrontMatter, body: &str) {
    if !front.contains_key("difficulties") {
        if let Some(caps) = RE_DIFFICULTY.captures(body) {
            front.insert_list("difficulties", [caps[1].to_lowercase()]);
        }
    }

    if !front.contains_key("platforms") {
        let lowered = body.to_lowercase();
        let platforms: Vec<String> = PLATFORM_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();
        if !platforms.is_empty() {
            front.insert_list("platforms", platforms);
        }
    }

    if !front.contains_key("tools") {
        let mut tools = BTreeSet::new();
        for re in [&RE_SECURITY_TOOLS, &RE_DEVOPS_TOOLS, &RE_LANGUAGES] {
            for caps in re.captures_iter(body) {
                tools.insert(caps[1].to_lowercase());
            }
        }
        if !tools.is_empty() {
            front.insert_list("tools", tools);
        }
    }

    if !front.contains_key("description") {
        if let Some(desc) = derive_description(body) {
            front.insert_str("description", desc);
        }
    }
}

/// First non-blank paragraph, markdown punctuation stripped, truncated to
/// 157 chars + "..." when longer than 160. No paragraph ⇒ `None`, never an
/// empty string.
fn derive_description(body: &str) -> Option<String> {
    let first = body.split("\n\n").map(str::trim).find(|p| !p.is_empty())?;
    let plain = RE_MARKDOWN_PUNCT.replace_all(first, "").into_owned();
    let plain = plain.trim();
    if plain.is_empty() {
        return None;
    }
    if plain.chars().count() > DESCRIPTION_MAX {
        let head: String = plain.chars().take(DESCRIPTION_MAX - 3).collect();
        Some(format!("{head}..."))
    } else {
        Some(plain.to_string())
    }
}
