use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of a source document, decoded leniently.
///
/// Source files are hand-edited, so every scalar accepts strings, numbers or
/// booleans. Values of any other shape are dropped rather than failing the
/// whole document.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawConferenceRecord {
    #[serde(default, deserialize_with = "loose_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "loose_text")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub abstract_deadline: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub deadlines: Option<Vec<DeadlineEntry>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct DeadlineEntry {
    #[serde(rename = "type", default, deserialize_with = "loose_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedDeadline {
    pub name: String,
    pub year: i32,
    pub date: String,
    pub link: String,
    pub location: String,
    pub abstract_deadline: String,
    pub venue: String,
    pub timezone: String,
}

/// Joins city and country, dropping whichever side is missing.
pub fn compose_location(city: Option<&str>, country: Option<&str>) -> String {
    format!("{}, {}", city.unwrap_or_default(), country.unwrap_or_default())
        .trim_matches(|ch: char| ch == ',' || ch == ' ')
        .to_owned()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Other(IgnoredAny),
}

impl Scalar {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            Self::Other(_) => None,
        }
    }

    fn into_year(self) -> Option<i32> {
        match self {
            Self::Integer(value) => i32::try_from(value).ok(),
            Self::Text(text) => text.trim().parse::<i32>().ok(),
            Self::Float(value) if value.fract() == 0.0 => i32::try_from(value as i64).ok(),
            _ => None,
        }
    }
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_text))
}

fn loose_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_year))
}
