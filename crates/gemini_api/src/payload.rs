use serde::{Deserialize, Serialize};

/// Canonical request payload shape for the generateContent endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            generation_config: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: crate::config::DEFAULT_TEMPERATURE,
            max_output_tokens: crate::config::DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

/// One transcript turn. The wire contract knows only `user` and `model`
/// roles; assistants map to `model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
    pub role: String,
}

impl Content {
    #[must_use]
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            parts,
            role: "user".to_string(),
        }
    }

    #[must_use]
    pub fn model(parts: Vec<Part>) -> Self {
        Self {
            parts,
            role: "model".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Splits a `data:<mime>;base64,<payload>` data URL into its MIME type and
/// raw base64 payload. Returns `None` when either piece is missing.
#[must_use]
pub fn split_data_url(data_url: &str) -> Option<(String, String)> {
    let (header, payload) = data_url.split_once(',')?;
    let mime = header.split(';').next()?.strip_prefix("data:")?;
    if mime.is_empty() || payload.is_empty() {
        return None;
    }

    Some((mime.to_string(), payload.to_string()))
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, or `None` when the
    /// response carries no text at all.
    #[must_use]
    pub fn first_candidate_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut out = String::new();
        for part in &content.parts {
            if let Part::Text { text } = part {
                out.push_str(text);
            }
        }

        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}
