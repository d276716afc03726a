// Heuristic spam-link detector for ordinary chat messages.
//
// Each link is percent-decoded and probed. Insecure or dead links, redirects,
// clickbait wording and raw-IP hosts each produce one warning.
//
// NO Discord dependencies here. The HTTP probe is behind `LinkProber`.

use async_trait::async_trait;
use regex::Regex;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use url::{Host, Url};

/// Keyword families typical of scam and clickbait messages.
const CLICKBAIT_FAMILIES: &[(&str, &[&str])] = &[
    ("limited", &["limited", "exclusive", "restricted", "one-time", "few", "rare"]),
    ("sale", &["sale", "discount", "bargain", "deal", "offer", "promotion"]),
    ("free", &["free", "gratis", "complimentary", "no cost", "freebie"]),
    (
        "hurry",
        &["hurry", "act now", "rush", "don't wait", "limited time", "while supplies last"],
    ),
    (
        "win",
        &["win", "won", "jackpot", "prize", "congratulations", "reward", "victory"],
    ),
    ("money", &["bank"]),
    (
        "action",
        &["confirm", "confirmation", "login", "verify", "verification"],
    ),
];

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url regex is valid"))
}

fn clickbait_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let words: Vec<String> = CLICKBAIT_FAMILIES
            .iter()
            .flat_map(|(_, words)| words.iter())
            .map(|word| regex::escape(word))
            .collect();
        Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|"))).expect("clickbait regex is valid")
    })
}

/// Outcome of probing one link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// 2xx over https.
    Valid,
    /// 3xx over https.
    Redirect,
    /// Not https, unreachable, or any other status.
    Invalid,
}

#[async_trait]
pub trait LinkProber: Send + Sync {
    /// Probe an https URL. Failures of any kind are `Invalid`.
    async fn probe(&self, url: &str) -> LinkStatus;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkWarning {
    Insecure(String),
    Redirect(String),
    Clickbait(String),
    RawIp(String),
}

impl LinkWarning {
    pub fn message(&self) -> String {
        match self {
            LinkWarning::Insecure(url) => format!(
                "⚠️ The link **{}** might not have a valid SSL certificate or could be insecure.",
                url
            ),
            LinkWarning::Redirect(url) => {
                format!("⚠️ The link **{}** appears to redirect to another URL.", url)
            }
            LinkWarning::Clickbait(url) => {
                format!("⚠️ The link **{}** may contain clickbait content.", url)
            }
            LinkWarning::RawIp(url) => format!(
                "⚠️ The link **{}** points to a bare IP address instead of a domain.",
                url
            ),
        }
    }
}

/// All `http(s)://` links in `content`, as written.
pub fn extract_urls(content: &str) -> Vec<&str> {
    url_regex().find_iter(content).map(|m| m.as_str()).collect()
}

/// Percent-decode a link; undecodable input is returned unchanged.
pub fn decode_url(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

pub fn contains_clickbait(content: &str) -> bool {
    clickbait_regex().is_match(content)
}

/// Whether the link's host is an IPv4 or IPv6 literal.
pub fn is_raw_ip(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .host()
                .map(|host| matches!(host, Host::Ipv4(_) | Host::Ipv6(_)))
        })
        .unwrap_or(false)
}

pub struct LinkScanner {
    prober: Arc<dyn LinkProber>,
}

impl LinkScanner {
    pub fn new(prober: Arc<dyn LinkProber>) -> Self {
        Self { prober }
    }

    /// Warnings for every link in `content`, in order of appearance.
    pub async fn scan(&self, content: &str) -> Vec<LinkWarning> {
        let urls = extract_urls(content);
        if urls.is_empty() {
            return Vec::new();
        }

        let clickbait = contains_clickbait(content);
        let mut warnings = Vec::new();

        for raw in urls {
            let decoded = decode_url(raw);
            let status = if decoded.starts_with("https://") {
                self.prober.probe(&decoded).await
            } else {
                LinkStatus::Invalid
            };
            tracing::debug!(url = %decoded, ?status, "Probed link");

            match status {
                LinkStatus::Invalid => warnings.push(LinkWarning::Insecure(raw.to_string())),
                LinkStatus::Redirect => warnings.push(LinkWarning::Redirect(raw.to_string())),
                LinkStatus::Valid => {}
            }
            if clickbait {
                warnings.push(LinkWarning::Clickbait(raw.to_string()));
            }
            if is_raw_ip(&decoded) {
                warnings.push(LinkWarning::RawIp(raw.to_string()));
            }
        }

        warnings
    }
}
