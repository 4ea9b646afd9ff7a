use url::Url;

use crate::models::overlay::OverlayRecord;

/// Browser-source URL that renders `record` without any live session.
pub fn share_url(base: &Url, record: &OverlayRecord) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("overlay");
    }
    url.set_query(None);
    url.query_pairs_mut()
        .append_pair("type", record.payment_method.as_str())
        .append_pair("details", &record.payment_identifier)
        .append_pair("name", &record.recipient_name)
        .append_pair("description", &record.description)
        .append_pair("duration", &record.duration_minutes.to_string());
    url
}
