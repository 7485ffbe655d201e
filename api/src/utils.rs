use serde::{Deserialize, Deserializer};

// build an ILIKE pattern matching `query` anywhere, with LIKE wildcards in the
// query taken literally
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// clients send tags either as a list or as one comma separated string
pub fn tags_from_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        One(String),
        Many(Vec<String>),
    }

    let tags = match Tags::deserialize(deserializer)? {
        Tags::One(s) => s.split(',').map(str::to_string).collect(),
        Tags::Many(v) => v,
    };

    Ok(tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct WithTags {
        #[serde(deserialize_with = "tags_from_string_or_list")]
        tags: Vec<String>,
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn tags_accept_string_and_list() {
        let t: WithTags = serde_json::from_str(r#"{"tags": "rust, web,,"}"#).unwrap();
        assert_eq!(t.tags, vec!["rust", "web"]);

        let t: WithTags = serde_json::from_str(r#"{"tags": [" rust ", ""]}"#).unwrap();
        assert_eq!(t.tags, vec!["rust"]);
    }

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }
}
