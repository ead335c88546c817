//! Data models for the Douban scraper
//!
//! Every record is a plain value produced fresh by an extractor. Rust field
//! names describe the data; the serialized names match the JSON that existing
//! clients (the Jellyfin and calibre metadata plugins) already consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A row of a movie search listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Movie {
    /// Listing category, `电影` or `电视剧`
    #[serde(rename = "cat")]
    pub category: String,
    /// Douban subject id
    #[serde(rename = "sid")]
    pub id: String,
    /// Display title
    #[serde(rename = "name")]
    pub title: String,
    /// Average rating, `"0"` when unrated
    pub rating: String,
    /// Poster URL
    #[serde(rename = "img")]
    pub image: String,
    /// Release year, taken from the last `/` segment of the cast line
    pub year: String,
}

/// Full movie record from a subject page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct MovieInfo {
    #[serde(rename = "sid")]
    pub id: String,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "originalName")]
    pub original_title: String,
    pub rating: String,
    #[serde(rename = "img")]
    pub image: String,
    pub year: String,
    #[serde(rename = "intro")]
    pub synopsis: String,
    pub director: String,
    pub writer: String,
    #[serde(rename = "actor")]
    pub cast: String,
    pub genre: String,
    pub site: String,
    pub country: String,
    pub language: String,
    #[serde(rename = "screen")]
    pub release_date: String,
    #[serde(rename = "duration")]
    pub runtime: String,
    #[serde(rename = "episodes")]
    pub episode_count: String,
    #[serde(rename = "subname")]
    pub aka_titles: String,
    /// IMDb id
    #[serde(rename = "imdb")]
    pub external_id: String,
    /// First row of the cast block only
    #[serde(rename = "celebrities")]
    pub people: Vec<Celebrity>,
}

/// A person attached to a movie
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Celebrity {
    pub id: String,
    #[serde(rename = "img")]
    pub image: String,
    pub name: String,
    /// First word of the role text (`导演`, `演员`, ...); not serialized
    #[serde(skip)]
    pub role_category: String,
    /// Played character when given, otherwise the role category
    pub role: String,
}

/// Celebrity profile page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CelebrityInfo {
    pub id: String,
    #[serde(rename = "img")]
    pub image: String,
    pub name: String,
    /// Occupations
    pub role: String,
    #[serde(rename = "intro")]
    pub biography: String,
    pub gender: String,
    #[serde(rename = "constellation")]
    pub star_sign: String,
    #[serde(rename = "birthdate")]
    pub birth_date: String,
    #[serde(rename = "birthplace")]
    pub birth_place: String,
    #[serde(rename = "nickname")]
    pub aka_names: String,
    #[serde(rename = "imdb")]
    pub external_id: String,
    #[serde(rename = "family")]
    pub relatives: String,
}

/// A wallpaper photo; URLs are built from the id
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Photo {
    pub id: String,
    #[serde(rename = "small")]
    pub small_url: String,
    #[serde(rename = "medium")]
    pub medium_url: String,
    #[serde(rename = "large")]
    pub large_url: String,
    /// Dimension label as shown on the page, e.g. `1920x1080`
    #[serde(rename = "size")]
    pub dimension_label: String,
    pub width: String,
    pub height: String,
}

/// Book cover images
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BookImages {
    pub small: String,
    pub medium: String,
    pub large: String,
}

/// Book tag
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BookTag {
    pub name: String,
}

/// Book rating
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookRating {
    pub average: f32,
}

/// Book record; listing rows fill a subset, subject pages fill everything
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Book {
    pub id: String,
    pub author: Vec<String>,
    pub author_intro: String,
    pub translators: Vec<String>,
    pub images: BookImages,
    pub binding: String,
    pub category: String,
    pub rating: BookRating,
    pub isbn13: String,
    pub pages: String,
    pub price: String,
    pub pubdate: String,
    pub publisher: String,
    pub producer: String,
    pub serials: String,
    pub subtitle: String,
    pub summary: String,
    pub title: String,
    pub tags: Vec<BookTag>,
    /// Original title of a translated work
    pub origin: String,
}

/// Book search envelope, shaped after the retired v2 API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookSearchResult {
    pub code: u32,
    pub msg: String,
    pub books: Vec<Book>,
}

/// Response of the rexxar "recent hot" API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HotMediaResponse {
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub total: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<HotMediaTag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommend_tags: Vec<HotMediaOption>,
    #[serde(default)]
    pub items: Vec<HotMediaItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HotMediaTag {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<HotMediaOption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HotMediaOption {
    #[serde(default)]
    pub selected: bool,
    #[serde(rename = "type", default)]
    pub option_type: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HotMediaItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub year: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub card_subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<HotMediaRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<HotMediaPic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playable: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub null_rating_reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub episodes_info: String,
    /// Passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub honor_infos: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HotMediaRating {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub max: i64,
    #[serde(default)]
    pub star_count: f64,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HotMediaPic {
    #[serde(default)]
    pub large: String,
    #[serde(default)]
    pub normal: String,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub message: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_timestamp(message, Utc::now())
    }

    /// Create a new API error response with a custom timestamp
    pub fn with_timestamp(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: false,
            message: message.into(),
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_serializes_with_wire_names() {
        let movie = Movie {
            category: "电影".to_string(),
            id: "1292052".to_string(),
            title: "肖申克的救赎".to_string(),
            rating: "9.7".to_string(),
            image: "https://img.example/p.jpg".to_string(),
            year: "1994".to_string(),
        };
        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["cat"], "电影");
        assert_eq!(json["sid"], "1292052");
        assert_eq!(json["name"], "肖申克的救赎");
        assert_eq!(json["img"], "https://img.example/p.jpg");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_movie_info_wire_names() {
        let info = MovieInfo {
            original_title: "Stranger Things".to_string(),
            external_id: "tt4574334".to_string(),
            ..MovieInfo::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["originalName"], "Stranger Things");
        assert_eq!(json["imdb"], "tt4574334");
        assert!(json["celebrities"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_celebrity_hides_role_category() {
        let celebrity = Celebrity {
            id: "1".to_string(),
            role_category: "演员".to_string(),
            role: "Jim Hopper".to_string(),
            ..Celebrity::default()
        };
        let json = serde_json::to_string(&celebrity).unwrap();
        assert!(!json.contains("演员"));
        assert!(json.contains("\"role\":\"Jim Hopper\""));
    }

    #[test]
    fn test_photo_wire_names() {
        let photo = Photo {
            id: "123".to_string(),
            dimension_label: "1920x1080".to_string(),
            ..Photo::default()
        };
        let json = serde_json::to_value(&photo).unwrap();
        assert_eq!(json["size"], "1920x1080");
        assert!(json.get("small").is_some());
    }

    #[test]
    fn test_hot_media_deserializes_partial_payload() {
        let payload = r#"{
            "category": "热门",
            "type": "全部",
            "total": 1,
            "items": [{
                "id": "35",
                "type": "movie",
                "title": "片名",
                "rating": {"count": 10, "max": 10, "star_count": 4.5, "value": 8.9},
                "honor_infos": [{"title": "top"}]
            }]
        }"#;
        let response: HotMediaResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.items[0].title, "片名");
        assert_eq!(response.items[0].rating.as_ref().unwrap().value, 8.9);
        assert!(response.items[0].honor_infos.is_some());
        assert!(response.tags.is_empty());
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("boom");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "boom");
        assert!(json["timestamp"].as_str().is_some());
    }
}
