//! The article record and its wire shape.

use serde::{Deserialize, Serialize};

/// A single article.
///
/// On the wire the description travels under the key `color`; existing
/// clients depend on that name. Missing fields decode as empty strings and
/// unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "color")]
    pub description: String,
}

impl Article {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            description: description.into(),
        }
    }
}

/// The two articles a fresh process starts with.
pub fn seed() -> Vec<Article> {
    vec![
        Article::new("1", "Article 1", "Article Content 1", "#ff2"),
        Article::new("2", "Article 2", "Article Content 2", "#0bdcab"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn description_travels_as_color() {
        let value = serde_json::to_value(&seed()[0]).unwrap();
        assert_eq!(
            value,
            json!({"id": "1", "title": "Article 1", "content": "Article Content 1", "color": "#ff2"})
        );
    }

    #[test]
    fn decoding_is_lenient_about_missing_and_unknown_fields() {
        let article: Article =
            serde_json::from_str(r##"{"title": "Draft", "color": "#000", "tags": ["x"]}"##).unwrap();
        assert_eq!(article, Article::new("", "Draft", "", "#000"));
    }

    #[test]
    fn description_key_is_not_accepted() {
        let article: Article = serde_json::from_str(r#"{"description": "ignored"}"#).unwrap();
        assert!(article.description.is_empty());
    }
}
