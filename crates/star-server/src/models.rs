//! JSON request and response models for the HTTP API.
//!
//! Browser forms submit numbers and flags as strings, so numeric request
//! fields accept either JSON numbers or numeric strings, and flags accept
//! booleans, `0`/`1`, or their string forms.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use star_core::sky::SearchStatistics;

/// Client error for fewer than three polygon vertices.
pub const ERROR_NOT_ENOUGH_POINTS: &str = "Number of points must be greater than 2!";

/// Client error for a vertex outside the sky coordinate limits.
pub const ERROR_POINTS_OUT_OF_RANGE: &str =
    "'Dec' must be from -90 to 90, 'Ra' must be from -24 to 24!";

/// Client error for an unknown constellation tag.
pub const ERROR_CONSTELLATION_DOES_NOT_EXIST: &str = "The constellation does not exist!";

/// Request body for `POST /api/search_constellation`.
///
/// # Example
///
/// ```
/// use star_server::models::ConstellationRequest;
///
/// let req: ConstellationRequest = serde_json::from_str(r#"{"tag": "ori"}"#).unwrap();
/// assert_eq!(req.tag, "ori");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConstellationRequest {
    /// Three-letter constellation tag, e.g. `"uma"`.
    pub tag: String,
}

/// One polygon vertex in the body of `POST /api/search_points`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PointRequest {
    #[serde(deserialize_with = "number")]
    pub ra: f64,
    #[serde(deserialize_with = "number")]
    pub dec: f64,
}

/// Request body for `POST /api/segment_search`.
///
/// # Example
///
/// ```
/// use star_server::models::SegmentRequest;
///
/// let req: SegmentRequest =
///     serde_json::from_str(r#"{"type": "mag", "minimum": "-1.5", "maximum": 4}"#).unwrap();
/// assert_eq!(req.attribute, "mag");
/// assert_eq!(req.minimum, -1.5);
/// assert_eq!(req.maximum, 4.0);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRequest {
    /// Attribute wire name: `dist`, `mag`, or `absmag`.
    #[serde(rename = "type")]
    pub attribute: String,
    #[serde(deserialize_with = "number")]
    pub minimum: f64,
    #[serde(deserialize_with = "number")]
    pub maximum: f64,
}

/// Request body for `POST /api/sort_search`.
///
/// # Example
///
/// ```
/// use star_server::models::SortRequest;
///
/// let req: SortRequest =
///     serde_json::from_str(r#"{"type": "dist", "page": "2", "descending": "1"}"#).unwrap();
/// assert_eq!(req.page, 2);
/// assert!(req.descending);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SortRequest {
    #[serde(rename = "type")]
    pub attribute: String,
    /// 1-based page number.
    #[serde(deserialize_with = "page")]
    pub page: usize,
    #[serde(default, deserialize_with = "flag")]
    pub descending: bool,
}

/// Response body of both search endpoints.
///
/// The statistics are flattened next to the session key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Key to send back in `x-session-key` on follow-up requests.
    pub session: String,
    #[serde(flatten)]
    pub statistics: SearchStatistics,
}

/// Response body for `/api/delete_all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Number of indices released.
    pub deleted: usize,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Raw scalar as it may arrive from a form.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Int(n) => Ok(n as f64),
        Loose::Float(x) => Ok(x),
        Loose::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
        Loose::Bool(b) => Err(de::Error::custom(format!("expected a number, got {b}"))),
    }
}

fn page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let invalid = |raw: String| -> D::Error {
        de::Error::custom(format!("expected a page number, got {raw}"))
    };
    match Loose::deserialize(deserializer)? {
        Loose::Int(n) => usize::try_from(n).map_err(|_| invalid(n.to_string())),
        Loose::Text(s) => s.trim().parse::<usize>().map_err(|_| invalid(format!("{s:?}"))),
        Loose::Float(x) => Err(invalid(x.to_string())),
        Loose::Bool(b) => Err(invalid(b.to_string())),
    }
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Ok(b),
        Loose::Int(n) => Ok(n != 0),
        Loose::Float(x) => Ok(x != 0.0),
        Loose::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            _ => Err(de::Error::custom(format!("expected a flag, got {s:?}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_accepts_numbers_and_strings() {
        let req: SegmentRequest =
            serde_json::from_str(r#"{"type": "dist", "minimum": 1, "maximum": "2.5"}"#).unwrap();
        assert_eq!(req.minimum, 1.0);
        assert_eq!(req.maximum, 2.5);
    }

    #[test]
    fn segment_rejects_garbage_number() {
        let res: Result<SegmentRequest, _> =
            serde_json::from_str(r#"{"type": "dist", "minimum": "far", "maximum": 2}"#);
        assert!(res.is_err());
    }

    #[test]
    fn sort_flag_forms() {
        for (raw, want) in [
            ("true", true),
            ("false", false),
            ("1", true),
            ("0", false),
            (r#""1""#, true),
            (r#""0""#, false),
        ] {
            let json = format!(r#"{{"type": "mag", "page": 1, "descending": {raw}}}"#);
            let req: SortRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(req.descending, want, "descending = {raw}");
        }
    }

    #[test]
    fn sort_descending_defaults_to_false() {
        let req: SortRequest = serde_json::from_str(r#"{"type": "mag", "page": 3}"#).unwrap();
        assert_eq!(req.page, 3);
        assert!(!req.descending);
    }

    #[test]
    fn sort_rejects_negative_page() {
        let res: Result<SortRequest, _> = serde_json::from_str(r#"{"type": "mag", "page": -1}"#);
        assert!(res.is_err());
    }

    #[test]
    fn point_rejects_extra_fields() {
        let res: Result<PointRequest, _> =
            serde_json::from_str(r#"{"ra": 1, "dec": 2, "alt": 3}"#);
        assert!(res.is_err());
    }

    #[test]
    fn search_response_flattens_statistics() {
        let resp = SearchResponse {
            session: "k".into(),
            statistics: SearchStatistics {
                number_of_stars: 0,
                catalogs: Vec::new(),
                spects: Vec::new(),
                constellations: Vec::new(),
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["session"], "k");
        assert_eq!(json["number_of_stars"], 0);
    }
}
