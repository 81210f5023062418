//! Syntax rewriting: the three ordered text substitutions that turn
//! Obsidian-flavoured markdown into Hugo-compatible markdown.
//!
//! All three are regex substitutions with deliberately narrow, line-prefix /
//! non-greedy scanning. Nested callouts and fences-inside-fences are not
//! parsed; the target input is single-author vault content.
//!
//! Order matters and is fixed: wikilinks → callouts → code fences.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Apply the full rewrite sequence to a document body.
pub fn rewrite_syntax(content: &str) -> String {
    let s = convert_wikilinks(content);
    let s = convert_callouts(&s);
    tag_code_fences(&s)
}

// ── Wikilinks ────────────────────────────────────────────────────────────

static RE_WIKILINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());

/// `[[Target]]` / `[[Target|label]]` → `[label](/target-slug)`.
///
/// The target slug is the lowercased target with spaces and underscores
/// collapsed to hyphens, rooted at the site root. Standard markdown links
/// never match (no double brackets), so the rewrite is idempotent.
pub fn convert_wikilinks(content: &str) -> String {
    RE_WIKILINK
        .replace_all(content, |caps: &Captures<'_>| {
            let target = caps[1].trim();
            let label = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .unwrap_or(target);
            format!("[{}](/{})", label, link_slug(target))
        })
        .into_owned()
}

fn link_slug(target: &str) -> String {
    target.to_lowercase().replace([' ', '_'], "-")
}

// ── Callouts ─────────────────────────────────────────────────────────────

/// Recognized callout kinds: (kind, css class, icon).
const CALLOUT_KINDS: [(&str, &str, &str); 9] = [
    ("note", "callout-info", "📝"),
    ("info", "callout-info", "ℹ️"),
    ("tip", "callout-success", "💡"),
    ("success", "callout-success", "✅"),
    ("warning", "callout-warning", "⚠️"),
    ("danger", "callout-danger", "🚨"),
    ("question", "callout-info", "❓"),
    ("abstract", "callout-info", "📄"),
    ("example", "callout-success", "📌"),
];

/// Style applied to kinds outside the vocabulary.
const CALLOUT_FALLBACK: (&str, &str) = ("callout-info", "📄");

static RE_CALLOUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^> \[!(\w+)\][ \t]*([^\n]+)?\n?((?:>[^\n]*\n?)*)").unwrap());

/// `> [!kind] title` blocks → styled HTML containers.
///
/// The kind is matched case-insensitively against [`CALLOUT_KINDS`]; a
/// missing title is synthesized as "{icon} {Kind}". Quoted-line prefixes are
/// stripped from the nested content.
pub fn convert_callouts(content: &str) -> String {
    RE_CALLOUT
        .replace_all(content, |caps: &Captures<'_>| {
            let kind = caps[1].to_lowercase();
            let (class, icon) = callout_style(&kind);
            let title = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{icon} {}", capitalize_kind(&kind)));
            let body = strip_quote_prefixes(&caps[3]);
            format!(
                "<div class=\"callout {class}\">\n<div class=\"callout-title\">{title}</div>\n{body}\n</div>"
            )
        })
        .into_owned()
}

fn callout_style(kind: &str) -> (&'static str, &'static str) {
    CALLOUT_KINDS
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|(_, class, icon)| (*class, *icon))
        .unwrap_or(CALLOUT_FALLBACK)
}

fn capitalize_kind(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn strip_quote_prefixes(quoted: &str) -> String {
    quoted
        .lines()
        .map(|line| line.strip_prefix("> ").unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Code fences ──────────────────────────────────────────────────────────

static RE_CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```(\w+)?\n(.*?)```").unwrap());

/// Append a copy-button marker comment after each fenced code block.
///
/// The marker tells the downstream renderer to attach clipboard controls;
/// the block content itself is untouched. Matching is non-greedy so two
/// blocks in one document never merge into a single match.
pub fn tag_code_fences(content: &str) -> String {
    RE_CODE_FENCE
        .replace_all(content, |caps: &Captures<'_>| {
            let lang = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            format!("```{lang}\n{}```\n\n<!-- COPY_BUTTON -->", &caps[2])
        })
        .into_owned()
}
