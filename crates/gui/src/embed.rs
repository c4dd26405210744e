//! Descriptor for a third-party hosted 3D viewer.
//!
//! The hosted viewer is opened in the system browser; nothing flows back
//! into the application.

use reqwest::Url;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmbedError {
    #[error("invalid embed URL {0:?}")]
    InvalidUrl(String),
    #[error("embed URL must use http or https, got {0}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedPanel {
    pub title: String,
    url: Url,
}

impl EmbedPanel {
    /// Validate `url` and make sure the viewer starts playing on open
    pub fn new(title: impl Into<String>, url: &str) -> Result<Self, EmbedError> {
        let mut url = Url::parse(url).map_err(|_| EmbedError::InvalidUrl(url.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(EmbedError::UnsupportedScheme(url.scheme().to_string()));
        }

        let has_autostart = url.query_pairs().any(|(k, v)| k == "autostart" && v == "1");
        if !has_autostart {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "autostart")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair("autostart", "1");
        }

        Ok(Self {
            title: title.into(),
            url,
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_autostart_kept() {
        let url = "https://sketchfab.com/models/abc/embed?autostart=1";
        let panel = EmbedPanel::new("Cráneo", url).unwrap();
        assert_eq!(panel.url(), url);
        assert_eq!(panel.title, "Cráneo");
    }

    #[test]
    fn test_autostart_added() {
        let panel = EmbedPanel::new("x", "https://sketchfab.com/models/abc/embed").unwrap();
        assert_eq!(panel.url(), "https://sketchfab.com/models/abc/embed?autostart=1");
    }

    #[test]
    fn test_autostart_zero_replaced() {
        let panel =
            EmbedPanel::new("x", "https://sketchfab.com/models/abc/embed?autostart=0&ui_theme=dark")
                .unwrap();
        assert_eq!(
            panel.url(),
            "https://sketchfab.com/models/abc/embed?ui_theme=dark&autostart=1"
        );
    }

    #[test]
    fn test_rejects_non_http() {
        assert_eq!(
            EmbedPanel::new("x", "file:///etc/passwd"),
            Err(EmbedError::UnsupportedScheme("file".into()))
        );
        assert!(matches!(
            EmbedPanel::new("x", "not a url"),
            Err(EmbedError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_catalog_urls_are_valid() {
        for bone in shared::BoneId::ALL {
            assert!(EmbedPanel::new(bone.info().name, bone.info().embed_url).is_ok());
        }
        assert!(EmbedPanel::new("Cráneo", shared::anatomy::SKULL_EMBED_URL).is_ok());
    }
}
