//! Chinese-to-Latin query conversion
//!
//! The weather endpoint matches city names best in Latin script, so Han input
//! such as `北京` is romanized to `beijing` before the first request. The
//! `deunicode` table is compiled in, so "loading" it is a first lookup run on
//! a blocking task under a timeout. The outcome is cached, so the load is
//! tried once per process. When the table is disabled or unavailable the raw
//! input is searched instead.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::TransliterationConfig;

/// Converts text to a Latin query form
#[async_trait]
pub trait Romanizer: Send + Sync {
    /// Latin form of `text`, or `None` when no conversion is available.
    async fn romanize(&self, text: &str) -> Option<String>;
}

/// True when any character of `text` belongs to the Han script
#[must_use]
pub fn contains_han(text: &str) -> bool {
    text.chars().any(is_han)
}

fn is_han(c: char) -> bool {
    matches!(c as u32,
        0x2E80..=0x2E99 | 0x2E9B..=0x2EF3 // CJK radicals supplement
        | 0x2F00..=0x2FD5                 // Kangxi radicals
        | 0x3005 | 0x3007                 // 々 〇
        | 0x3021..=0x3029 | 0x3038..=0x303B
        | 0x3400..=0x4DBF                 // extension A
        | 0x4E00..=0x9FFF                 // unified ideographs
        | 0xF900..=0xFA6D | 0xFA70..=0xFAD9
        | 0x20000..=0x2A6DF               // extension B
        | 0x2A700..=0x2EE5D               // extensions C to F, I
        | 0x2F800..=0x2FA1D               // compatibility supplement
        | 0x30000..=0x3134A               // extension G
        | 0x31350..=0x323AF)              // extension H
}

/// Romanize with the transliteration table directly: tone-less, lowercased,
/// whitespace removed. Characters without a mapping are dropped.
#[must_use]
pub fn to_latin_query(text: &str) -> String {
    deunicode::deunicode_with_tofu(text, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Lazily loaded romanizer backed by `deunicode`
#[derive(Debug)]
pub struct Transliterator {
    enabled: bool,
    load_timeout: Duration,
    loaded: OnceCell<bool>,
}

impl Transliterator {
    #[must_use]
    pub fn new(enabled: bool, load_timeout: Duration) -> Self {
        Self {
            enabled,
            load_timeout,
            loaded: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &TransliterationConfig) -> Self {
        Self::new(config.enabled, config.load_timeout())
    }

    /// A romanizer that never converts
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO)
    }

    /// Load the table on first call; later calls reuse the cached outcome.
    pub async fn ensure_loaded(&self) -> bool {
        if !self.enabled {
            return false;
        }

        let load_timeout = self.load_timeout;
        *self
            .loaded
            .get_or_init(|| {
                load_table(
                    || deunicode::deunicode_char('中').is_some(),
                    load_timeout,
                )
            })
            .await
    }
}

/// Run `load` on a blocking task, giving up after `load_timeout`.
/// A panicking or overdue load counts as unavailable.
async fn load_table<F>(load: F, load_timeout: Duration) -> bool
where
    F: FnOnce() -> bool + Send + 'static,
{
    match tokio::time::timeout(load_timeout, tokio::task::spawn_blocking(load)).await {
        Ok(Ok(available)) => {
            debug!("Transliteration table loaded (available: {})", available);
            available
        }
        Ok(Err(e)) => {
            warn!("Transliteration table failed to load: {}", e);
            false
        }
        Err(_) => {
            warn!(
                "Transliteration table load timed out after {}ms",
                load_timeout.as_millis()
            );
            false
        }
    }
}

#[async_trait]
impl Romanizer for Transliterator {
    async fn romanize(&self, text: &str) -> Option<String> {
        if !self.ensure_loaded().await {
            return None;
        }
        let latin = to_latin_query(text);
        if latin.is_empty() {
            None
        } else {
            debug!("Romanized '{}' to '{}'", text, latin);
            Some(latin)
        }
    }
}
