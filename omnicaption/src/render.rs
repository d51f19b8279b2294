//! Terminal rendering of captions, tones, and health

use omnicaption_client::{CaptionsResponse, HealthStatus, Tone};

/// Shown in place of a caption the service left empty
pub const PLACEHOLDER: &str = "Waiting for generation...";

/// One titled card per platform, in fixed platform order
pub fn cards(results: &CaptionsResponse) -> String {
    results
        .iter()
        .map(|(platform, caption)| {
            let body = if caption.trim().is_empty() { PLACEHOLDER } else { caption };
            format!("== {} ==\n{body}", platform.label())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Tone labels, one per line, with the default marked
pub fn tones() -> String {
    Tone::all()
        .into_iter()
        .map(|tone| {
            if tone == Tone::default() {
                format!("{tone} (default)")
            } else {
                tone.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn health(status: &HealthStatus) -> String {
    match &status.model {
        Some(model) => format!("status: {} (model: {model})", status.status),
        None => format!("status: {}", status.status),
    }
}
