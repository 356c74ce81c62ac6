//! Post field normalization

use crate::AppError;

pub const MAX_HASHTAGS: usize = 30;
const MAX_MEDIA_URLS: usize = 10;

/// Strip leading `#`, trim, drop empties and duplicates (order kept).
pub fn normalize_hashtags(tags: &[String]) -> Result<Vec<String>, AppError> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').trim();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(AppError::InvalidInput(format!(
                "Hashtag '{}' must not contain spaces",
                tag
            )));
        }
        if !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    if out.len() > MAX_HASHTAGS {
        return Err(AppError::InvalidInput(format!(
            "At most {} hashtags are allowed",
            MAX_HASHTAGS
        )));
    }
    Ok(out)
}

pub fn validate_media_urls(urls: &[String]) -> Result<(), AppError> {
    if urls.len() > MAX_MEDIA_URLS {
        return Err(AppError::InvalidInput(format!(
            "At most {} media URLs are allowed",
            MAX_MEDIA_URLS
        )));
    }
    for url in urls {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::InvalidInput(format!(
                "Media URL '{}' must be an absolute http(s) URL",
                url
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtags_normalized() {
        let tags = vec![
            "#launch".to_string(),
            " Launch ".to_string(),
            "".to_string(),
            "##rust".to_string(),
        ];
        assert_eq!(normalize_hashtags(&tags).unwrap(), vec!["launch", "rust"]);
    }

    #[test]
    fn test_hashtag_with_space_rejected() {
        assert!(normalize_hashtags(&["two words".to_string()]).is_err());
    }

    #[test]
    fn test_media_urls() {
        assert!(validate_media_urls(&["https://cdn.example/a.png".to_string()]).is_ok());
        assert!(validate_media_urls(&["ftp://x".to_string()]).is_err());
    }
}
