//! CORS allow-list edits
//!
//! Appends an `https://<domain>` origin to the allow-lists a framework keeps
//! in source. Lists already containing the origin, or a wildcard, are left
//! alone, so running twice changes nothing.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::cors::{ELEMENT_INDENT, MAX_DOMAIN_LEN};
use crate::types::{FrameworkKind, FunnelError, Result};

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?$").expect("valid regex")
});

static DJANGO_ALLOW_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*CORS_ALLOW_ALL_ORIGINS\s*=\s*True\b").expect("valid regex")
});

/// Allow-list syntax a framework uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsStyle {
    /// `CSRF_TRUSTED_ORIGINS = [...]` and `CORS_ALLOWED_ORIGINS = [...]`
    Django,
    /// `CORSMiddleware(allow_origins=[...])`
    FastApi,
    /// `cors({ origin: [...] })`
    Express,
}

impl CorsStyle {
    pub fn for_framework(framework: FrameworkKind) -> Option<Self> {
        match framework {
            FrameworkKind::Django => Some(Self::Django),
            FrameworkKind::FastApi => Some(Self::FastApi),
            FrameworkKind::Express | FrameworkKind::NestJs => Some(Self::Express),
            _ => None,
        }
    }

    fn quote(&self) -> char {
        match self {
            Self::Express => '\'',
            Self::Django | Self::FastApi => '"',
        }
    }

    /// (list name, pattern capturing the list body)
    fn lists(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Django => &[
                (
                    "CSRF_TRUSTED_ORIGINS",
                    r"CSRF_TRUSTED_ORIGINS\s*=\s*[\[(]([^\])]*)[\])]",
                ),
                (
                    "CORS_ALLOWED_ORIGINS",
                    r"CORS_ALLOWED_ORIGINS\s*=\s*[\[(]([^\])]*)[\])]",
                ),
            ],
            Self::FastApi => &[("allow_origins", r"allow_origins\s*=\s*\[([^\]]*)\]")],
            Self::Express => &[("origin", r"origin\s*:\s*\[([^\]]*)\]")],
        }
    }
}

/// What happened to one allow-list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    Added,
    AlreadyPresent,
    /// Wildcard or allow-all setting already admits every origin
    AllowsAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsEdit {
    pub content: String,
    pub lists: Vec<(&'static str, ListChange)>,
}

/// Check a bare hostname such as `machine.tailnet.ts.net`
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.len() <= MAX_DOMAIN_LEN && DOMAIN.is_match(domain) {
        Ok(())
    } else {
        Err(FunnelError::InvalidDomain(domain.to_string()))
    }
}

pub fn origin_for(domain: &str) -> String {
    format!("https://{}", domain)
}

/// Add `origin` to every allow-list of `style` found in `content`.
///
/// Returns `None` when the file holds none of the style's lists.
pub fn add_origin(content: &str, style: CorsStyle, origin: &str) -> Option<CorsEdit> {
    let mut edited = content.to_string();
    let mut lists = Vec::new();

    for (name, pattern) in style.lists() {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        let Some(body) = re.captures(&edited).and_then(|c| c.get(1)) else {
            continue;
        };

        let existing = body.as_str();
        let change = if *name == "CORS_ALLOWED_ORIGINS" && DJANGO_ALLOW_ALL.is_match(&edited) {
            ListChange::AllowsAll
        } else if contains_quoted(existing, "*") {
            ListChange::AllowsAll
        } else if contains_quoted(existing, origin) {
            ListChange::AlreadyPresent
        } else {
            ListChange::Added
        };

        if change == ListChange::Added {
            let range = body.range();
            let replacement = format_new_origins(existing, origin, style.quote());
            edited.replace_range(range, &replacement);
        }
        lists.push((*name, change));
    }

    if lists.is_empty() {
        None
    } else {
        Some(CorsEdit {
            content: edited,
            lists,
        })
    }
}

fn contains_quoted(list: &str, value: &str) -> bool {
    list.contains(&format!("\"{}\"", value)) || list.contains(&format!("'{}'", value))
}

/// List body with `origin` appended as its own line, keeping a trailing comma
fn format_new_origins(existing: &str, origin: &str, quote: char) -> String {
    let element = format!("{}{}{}{},\n", ELEMENT_INDENT, quote, origin, quote);
    let trimmed = existing.trim_end();

    if trimmed.trim_start().is_empty() {
        format!("\n{}", element)
    } else if trimmed.ends_with(',') {
        format!("{}\n{}", trimmed, element)
    } else {
        format!("{},\n{}", trimmed, element)
    }
}
