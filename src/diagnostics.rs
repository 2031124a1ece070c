//! Diagnostics dump with the share URL redacted.

use std::sync::Arc;

use serde::Serialize;
use sharewatch_types::Snapshot;

use crate::settings::Settings;

/// Characters of the share URL kept in diagnostics.
pub const SHARE_URL_VISIBLE_CHARS: usize = 32;

/// Settings and last table, safe to paste into a bug report.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub settings: Settings,
    pub last_data: Arc<Snapshot>,
}

impl Diagnostics {
    pub fn collect(settings: &Settings, snapshot: Arc<Snapshot>) -> Self {
        let mut settings = settings.clone();
        settings.share_url = settings.share_url.as_deref().map(redact_url);
        Self {
            settings,
            last_data: snapshot,
        }
    }
}

/// Keep the first 32 characters of a share URL and mark the cut.
pub fn redact_url(url: &str) -> String {
    let visible: String = url.chars().take(SHARE_URL_VISIBLE_CHARS).collect();
    format!("{}…", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharewatch_types::{UnitRecord, UnitTable};

    #[test]
    fn test_redact_url() {
        let url = "https://api.sizzapp.com/app/location_sharing/info?shared_code=SECRET";
        assert_eq!(redact_url(url), "https://api.sizzapp.com/app/loca…");
        assert_eq!(redact_url("short"), "short…");
    }

    #[test]
    fn redaction_respects_char_boundaries() {
        let url = "é".repeat(40);
        assert_eq!(redact_url(&url).chars().count(), SHARE_URL_VISIBLE_CHARS + 1);
    }

    #[test]
    fn test_collect() {
        let settings = Settings {
            shared_code: Some("AbC".to_string()),
            share_url: Some("https://example.com/share/0123456789abcdefghij".to_string()),
            ..Settings::default()
        };
        let mut table = UnitTable::new();
        table.insert(7, UnitRecord::builder(7).name("Van").build());
        let snapshot = Arc::new(Snapshot::empty().succeeded(table, 1_000));

        let diagnostics = Diagnostics::collect(&settings, snapshot);
        let json = serde_json::to_value(&diagnostics).unwrap();

        assert_eq!(json["settings"]["share_url"], "https://example.com/share/012345…");
        assert_eq!(json["settings"]["shared_code"], "AbC");
        assert_eq!(json["last_data"]["table"]["7"]["name"], "Van");
        assert_eq!(json["last_data"]["last_success"], true);
    }
}
