//! Read-side projections of an overlay.
//!
//! Live frames come straight from the store. Shared frames are rebuilt from
//! the browser-source URL and count down on their own, so they keep working
//! after the creating session is gone.

use serde::Serialize;

use crate::models::locale::Locale;
use crate::models::overlay::OverlayRecord;
use crate::models::payment::PaymentMethod;
use crate::services::payment_target::{self, is_payment_uri};

pub const DEFAULT_METHOD: &str = "pix";
pub const DEFAULT_DURATION_MINUTES: i64 = 5;

/// What a browser source shows. An expired frame shows nothing at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFrame {
    pub description: String,
    pub payment_target: String,
    pub caption: String,
    pub remaining: String,
    pub remaining_seconds: u64,
    pub expired: bool,
}

impl OverlayFrame {
    pub fn hidden() -> Self {
        Self {
            description: String::new(),
            payment_target: String::new(),
            caption: String::new(),
            remaining: format_remaining(0),
            remaining_seconds: 0,
            expired: true,
        }
    }

    fn visible(
        method: &str,
        identifier: &str,
        description: &str,
        remaining_seconds: u64,
        locale: Locale,
    ) -> Self {
        if remaining_seconds == 0 {
            return Self::hidden();
        }
        Self {
            description: description.to_string(),
            payment_target: payment_target::resolve(method, identifier),
            caption: caption(method, identifier, locale),
            remaining: format_remaining(remaining_seconds),
            remaining_seconds,
            expired: false,
        }
    }
}

/// `M:SS` with unpadded minutes.
pub fn format_remaining(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Short line under the QR code telling the viewer what they are paying.
pub fn caption(method: &str, identifier: &str, locale: Locale) -> String {
    match method.parse::<PaymentMethod>() {
        Ok(PaymentMethod::Pix) if is_payment_uri(identifier) => {
            locale.scanned_pix_caption().to_string()
        }
        Ok(PaymentMethod::Pix) => locale.pix_key_caption(identifier),
        Ok(other) => format!("{}: {}", other.label(), identifier),
        Err(_) => identifier.to_string(),
    }
}

/// Frame for the control surface, reflecting store ticks as they happen.
pub fn live_frame(record: Option<&OverlayRecord>, locale: Locale) -> OverlayFrame {
    match record {
        Some(record) if record.active => OverlayFrame::visible(
            record.payment_method.as_str(),
            &record.payment_identifier,
            &record.description,
            record.remaining_seconds,
            locale,
        ),
        _ => OverlayFrame::hidden(),
    }
}

/// Query string of the browser-source URL. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ShareParams {
    /// The `type` parameter.
    pub method: Option<String>,
    pub details: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
}

impl ShareParams {
    /// First occurrence of each key wins; anything unparseable is ignored.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "type" => &mut params.method,
                "details" => &mut params.details,
                "name" => &mut params.name,
                "description" => &mut params.description,
                "duration" => &mut params.duration,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// Read-only overlay rebuilt from a shared URL, with its own countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedOverlay {
    method: String,
    details: String,
    description: String,
    remaining_seconds: u64,
    expired: bool,
    locale: Locale,
}

impl SharedOverlay {
    pub fn load(params: &ShareParams, locale: Locale) -> Self {
        let method = non_empty(params.method.as_deref()).unwrap_or(DEFAULT_METHOD);
        let details = params.details.as_deref().unwrap_or_default();
        let name = non_empty(params.name.as_deref()).unwrap_or(locale.default_recipient());
        let description = non_empty(params.description.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| locale.help_description(name));

        let minutes = params
            .duration
            .as_deref()
            .and_then(parse_leading_int)
            .unwrap_or(DEFAULT_DURATION_MINUTES);
        let remaining_seconds = if minutes > 0 {
            (minutes as u64).saturating_mul(60)
        } else {
            0
        };

        Self {
            method: method.to_string(),
            details: details.to_string(),
            description,
            remaining_seconds,
            expired: remaining_seconds == 0,
            locale,
        }
    }

    /// One second passes. Returns true on the tick that expires the overlay.
    pub fn tick(&mut self) -> bool {
        if self.expired {
            return false;
        }
        if self.remaining_seconds <= 1 {
            self.remaining_seconds = 0;
            self.expired = true;
            return true;
        }
        self.remaining_seconds -= 1;
        false
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn frame(&self) -> OverlayFrame {
        if self.expired {
            return OverlayFrame::hidden();
        }
        OverlayFrame::visible(
            &self.method,
            &self.details,
            &self.description,
            self.remaining_seconds,
            self.locale,
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Base-10 parse of a leading integer, ignoring anything after the digits.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = &digits[..digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }

    let value = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -value } else { value })
}
