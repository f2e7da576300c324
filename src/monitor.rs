use crate::error::{Error, Result};
use reqwest::Url;

pub mod render;
pub mod session;
pub mod transition;

pub use session::{spawn, MonitorEvent, MonitorHandle};

/// Machine id named by a monitoring target: a bare id, a query string such
/// as `?id=7`, or a full page URL carrying an `id` parameter.
pub fn machine_id_from_target(target: &str) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::validation("no machine id was given"));
    }
    if !target.contains('?') && !target.contains('=') {
        return Ok(target.to_string());
    }

    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => {
            let query = target.rsplit('?').next().unwrap_or(target);
            Url::parse(&format!("http://localhost/?{query}"))
                .map_err(|e| Error::validation(format!("unreadable monitoring target: {e}")))?
        }
    };
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::validation("no machine id was given"))
}
