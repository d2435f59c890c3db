use serde::{Deserialize, Serialize};

/// Opaque host context handed to every solver call. It is never inspected.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Typed view of the `/v2/query` JSON output.
///
/// Only the fields the expansion reads are declared; everything else
/// Wolfram Alpha sends is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredResult {
    pub queryresult: QueryResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub pods: Vec<Pod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub title: String,
    pub subpods: Vec<Subpod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subpod {
    pub img: SubpodImage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubpodImage {
    pub alt: String,
    pub title: String,
    pub src: String,
}

/// One chunk of an expanded answer: speakable text, an illustration, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl Step {
    pub fn summary(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: Some(summary.into()),
            img: None,
        }
    }

    pub fn image(title: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: None,
            img: Some(src.into()),
        }
    }
}
