use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::error::{CaptionClientError, Result};

// -- Tone --

/// Stylistic register requested for the generated captions
///
/// Parsing is case-insensitive and also accepts the Indonesian labels used
/// by the caption service's web form.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Tone {
    #[default]
    #[strum(to_string = "Professional", serialize = "Profesional")]
    Professional,
    #[strum(to_string = "Casual", serialize = "Santai/Gaul", serialize = "Santai")]
    Casual,
    #[strum(to_string = "Inspirational", serialize = "Inspiratif")]
    Inspirational,
    #[strum(to_string = "Promotional", serialize = "Jualan/Promosi", serialize = "Promosi")]
    Promotional,
    #[strum(to_string = "Humorous", serialize = "Lucu/Receh", serialize = "Lucu")]
    Humorous,
    #[strum(to_string = "Educational", serialize = "Edukatif")]
    Educational,
}

impl Tone {
    /// Value sent in the `tone` form field
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// All tones in selector order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// Parse a user-supplied tone label
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the accepted tones
    pub fn parse(label: &str) -> Result<Self> {
        label.trim().parse().map_err(|_| {
            let accepted = Self::iter().map(Self::as_str).collect::<Vec<_>>().join(", ");
            CaptionClientError::Validation(format!(
                "unknown tone `{}` (expected one of: {accepted})",
                label.trim()
            ))
        })
    }
}

// -- Platform --

/// Output channel receiving its own generated caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum Platform {
    Twitter,
    LinkedIn,
    Instagram,
    YouTube,
}

impl Platform {
    /// JSON key carrying this platform's caption
    pub const fn key(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::LinkedIn => "linkedin",
            Self::Instagram => "instagram",
            Self::YouTube => "youtube",
        }
    }

    /// Heading shown above the caption
    pub const fn label(self) -> &'static str {
        match self {
            Self::Twitter => "X (Twitter)",
            Self::LinkedIn => "LinkedIn",
            Self::Instagram => "Instagram",
            Self::YouTube => "YouTube",
        }
    }
}

// -- Request --

/// Image attached to a generation request
///
/// No type or size checks are made; the MIME type is only a label guessed
/// from the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    bytes: Bytes,
}

impl ImageUpload {
    /// Wrap in-memory image data
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an image from disk
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            CaptionClientError::Config(format!("failed to read image {}: {e}", path.display()))
        })?;

        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |name| name.to_string_lossy().into_owned());

        Ok(Self::new(file_name, bytes))
    }

    /// Original file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Raw file contents
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type guessed from the file name
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned()
    }
}

/// One submission to the caption service
///
/// The topic is stored trimmed; an all-whitespace topic counts as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: Option<String>,
    tone: Tone,
    image: Option<ImageUpload>,
}

impl GenerationRequest {
    /// Build a request from raw form input
    pub fn new(topic: &str, tone: Tone, image: Option<ImageUpload>) -> Self {
        let topic = topic.trim();

        Self {
            topic: (!topic.is_empty()).then(|| topic.to_owned()),
            tone,
            image,
        }
    }

    /// Trimmed topic, if any
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Requested tone
    pub const fn tone(&self) -> Tone {
        self.tone
    }

    /// Attached image, if any
    pub const fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub const fn has_topic(&self) -> bool {
        self.topic.is_some()
    }

    pub const fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Check that there is something to caption
    ///
    /// # Errors
    ///
    /// Returns a validation error when neither topic nor image is present
    pub fn validate(&self) -> Result<()> {
        if !self.has_topic() && !self.has_image() {
            return Err(CaptionClientError::Validation(
                "either a topic or an image must be provided".to_owned(),
            ));
        }

        Ok(())
    }

    /// Multipart fields in send order: `tone`, then `topic`, then `image`
    pub fn form_fields(&self) -> Vec<FormField<'_>> {
        let mut fields = vec![FormField::Text {
            name: "tone",
            value: self.tone.as_str(),
        }];

        if let Some(topic) = &self.topic {
            fields.push(FormField::Text { name: "topic", value: topic });
        }

        if let Some(image) = &self.image {
            fields.push(FormField::File { name: "image", upload: image });
        }

        fields
    }
}

/// A single multipart field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField<'a> {
    Text { name: &'static str, value: &'a str },
    File { name: &'static str, upload: &'a ImageUpload },
}

impl FormField<'_> {
    /// Field name on the wire
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

// -- Response --

/// Four generated captions, one per platform
///
/// A field the service leaves out decodes as an empty string. Values that are
/// not strings are flattened: arrays are joined with newlines, objects yield
/// their `caption` member, anything else its JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionsResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub twitter: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub instagram: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub youtube: String,
}

impl CaptionsResponse {
    /// Caption for one platform
    pub fn caption(&self, platform: Platform) -> &str {
        match platform {
            Platform::Twitter => &self.twitter,
            Platform::LinkedIn => &self.linkedin,
            Platform::Instagram => &self.instagram,
            Platform::YouTube => &self.youtube,
        }
    }

    /// Captions in display order
    pub fn iter(&self) -> impl Iterator<Item = (Platform, &str)> {
        Platform::iter().map(|platform| (platform, self.caption(platform)))
    }

    /// Platforms whose caption came back empty or missing
    pub fn missing_platforms(&self) -> Vec<Platform> {
        self.iter()
            .filter(|(_, caption)| caption.is_empty())
            .map(|(platform, _)| platform)
            .collect()
    }

    /// Whether every platform received a caption
    pub fn is_complete(&self) -> bool {
        self.missing_platforms().is_empty()
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(flatten_caption)
}

fn flatten_caption(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Array(items) => items
            .into_iter()
            .map(flatten_caption)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(mut fields) => match fields.remove("caption") {
            Some(caption) => flatten_caption(caption),
            None => Value::Object(fields).to_string(),
        },
        other => other.to_string(),
    }
}

// -- Health --

/// Reply from the service health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    /// `ok` when the service is up
    pub status: String,
    /// Model the service generates with
    #[serde(default)]
    pub model: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
