//! Video reference links attached to exercises.
//!
//! Only YouTube links are accepted, in the three shapes people actually
//! paste: `watch?v=`, `youtu.be/` and `shorts/`.

use crate::{Error, Result};

const VIDEO_ID_LEN: usize = 11;

/// Which URL shape the link was given in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoLinkKind {
    Watch,
    Short,
    Shorts,
}

/// A validated video link
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoLink {
    pub kind: VideoLinkKind,
    id: String,
    url: String,
}

impl VideoLink {
    pub fn video_id(&self) -> &str {
        &self.id
    }

    /// The URL as entered (trimmed)
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn embed_url(&self) -> String {
        format!("https://www.youtube.com/embed/{}", self.id)
    }
}

/// Validate a user-supplied video URL
///
/// Empty input is valid and means "no video" (returns `Ok(None)`).
pub fn parse_video_url(input: &str) -> Result<Option<VideoLink>> {
    let url = input.trim();
    if url.is_empty() {
        return Ok(None);
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix("m.").unwrap_or(rest);

    let (kind, tail) = if let Some(tail) = rest.strip_prefix("youtube.com/watch?") {
        let id = tail
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .unwrap_or("");
        (VideoLinkKind::Watch, id)
    } else if let Some(tail) = rest.strip_prefix("youtu.be/") {
        (VideoLinkKind::Short, tail)
    } else if let Some(tail) = rest.strip_prefix("youtube.com/shorts/") {
        (VideoLinkKind::Shorts, tail)
    } else {
        return Err(Error::InvalidInput(format!(
            "unsupported video URL (expected a YouTube link): {}",
            url
        )));
    };

    let id: String = tail
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if id.len() != VIDEO_ID_LEN {
        return Err(Error::InvalidInput(format!(
            "video id must be {} characters: {}",
            VIDEO_ID_LEN, url
        )));
    }

    Ok(Some(VideoLink {
        kind,
        id,
        url: url.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_watch_links() {
        let link = parse_video_url("https://www.youtube.com/watch?v=IODxDxX7oi4")
            .unwrap()
            .unwrap();
        assert_eq!(link.kind, VideoLinkKind::Watch);
        assert_eq!(link.video_id(), "IODxDxX7oi4");
        assert_eq!(link.embed_url(), "https://www.youtube.com/embed/IODxDxX7oi4");
    }

    #[test]
    fn test_accepts_watch_with_extra_params() {
        let link = parse_video_url("youtube.com/watch?feature=share&v=IODxDxX7oi4&t=30")
            .unwrap()
            .unwrap();
        assert_eq!(link.video_id(), "IODxDxX7oi4");
    }

    #[test]
    fn test_accepts_short_and_shorts_links() {
        let short = parse_video_url("https://youtu.be/IODxDxX7oi4?si=abc").unwrap().unwrap();
        assert_eq!(short.kind, VideoLinkKind::Short);
        assert_eq!(short.video_id(), "IODxDxX7oi4");

        let shorts = parse_video_url("https://youtube.com/shorts/IODxDxX7oi4").unwrap().unwrap();
        assert_eq!(shorts.kind, VideoLinkKind::Shorts);
    }

    #[test]
    fn test_empty_clears() {
        assert!(parse_video_url("   ").unwrap().is_none());
    }

    #[test]
    fn test_rejects_other_hosts_and_bad_ids() {
        assert!(parse_video_url("https://vimeo.com/12345").is_err());
        assert!(parse_video_url("https://youtu.be/short").is_err());
        assert!(parse_video_url("https://www.youtube.com/watch?list=abc").is_err());
    }
}
