use axum::{
    extract::{RawQuery, State},
    response::{Html, Json},
};
use qrcode::{render::svg, QrCode};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::state::AppState;
use crate::models::locale::Locale;
use crate::services::renderer::{OverlayFrame, ShareParams, SharedOverlay};

/// Browser source page. Needs no session: everything comes from the query.
pub async fn page(State(state): State<Arc<AppState>>, RawQuery(query): RawQuery) -> Html<String> {
    let shared = load(&state, query.as_deref());
    Html(render_page(&shared.frame(), shared.locale()))
}

/// The frame the page starts from, as JSON.
pub async fn frame(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<OverlayFrame> {
    Json(load(&state, query.as_deref()).frame())
}

fn load(state: &AppState, query: Option<&str>) -> SharedOverlay {
    let params = ShareParams::from_query(query.unwrap_or_default());
    let shared = SharedOverlay::load(&params, state.service.locale());
    debug!(
        "Shared overlay loaded with {}s remaining",
        shared.remaining_seconds()
    );
    shared
}

const EMPTY_BODY: &str = r#"<body style="margin:0;background:transparent"></body>"#;

// Decrements once per second and blanks the page when it reaches zero.
const COUNTDOWN_SCRIPT: &str = r#"<script>
(function () {
  var seconds = __SECONDS__;
  var label = document.getElementById("remaining");
  var timer = setInterval(function () {
    if (seconds <= 1) {
      clearInterval(timer);
      document.body.innerHTML = "";
      return;
    }
    seconds -= 1;
    label.textContent = Math.floor(seconds / 60) + ":" + String(seconds % 60).padStart(2, "0");
  }, 1000);
})();
</script>"#;

pub fn render_page(frame: &OverlayFrame, locale: Locale) -> String {
    let body = if frame.expired {
        EMPTY_BODY.to_string()
    } else {
        let target = escape_html(&frame.payment_target);
        format!(
            concat!(
                r#"<body style="margin:0;background:transparent;font-family:sans-serif">"#,
                r#"<div id="card" data-payment-target="{target}" style="max-width:300px;margin:16px auto;padding:16px;background:rgba(255,255,255,0.9);border-radius:8px;text-align:center">"#,
                r#"<div style="font-weight:600;margin-bottom:8px">{description}</div>"#,
                r#"<div id="qr" style="display:inline-block;padding:8px;background:#fff;border-radius:4px;margin-bottom:8px">{qr}</div>"#,
                r#"<div style="font-size:12px;color:#6b7280">{available} <span id="remaining">{remaining}</span></div>"#,
                r#"<div style="font-size:12px;margin-top:8px"><a href="{target}" target="_blank" rel="noopener noreferrer">{caption}</a></div>"#,
                "</div>{script}</body>"
            ),
            target = target,
            description = escape_html(&frame.description),
            qr = qr_svg(&frame.payment_target).unwrap_or_default(),
            available = escape_html(locale.available_for()),
            remaining = escape_html(&frame.remaining),
            caption = escape_html(&frame.caption),
            script = COUNTDOWN_SCRIPT.replace("__SECONDS__", &frame.remaining_seconds.to_string()),
        )
    };

    format!(
        "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"utf-8\"><title>Overlay</title></head>{}</html>",
        locale.html_lang(),
        body
    )
}

/// Inline SVG QR code of the payment target, without the XML prolog.
fn qr_svg(target: &str) -> Option<String> {
    let code = match QrCode::new(target.as_bytes()) {
        Ok(code) => code,
        Err(e) => {
            warn!("Payment target cannot be encoded as a QR code: {}", e);
            return None;
        }
    };

    let image = code
        .render::<svg::Color>()
        .min_dimensions(120, 120)
        .quiet_zone(false)
        .build();
    let start = image.find("<svg").unwrap_or(0);
    Some(image[start..].to_string())
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
