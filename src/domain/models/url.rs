use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Cover,
    Contain,
    Fill,
}

impl ResizeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::Cover => "cover",
            ResizeMode::Contain => "contain",
            ResizeMode::Fill => "fill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// Image transformation parameters.
///
/// Opaque to this crate: they are forwarded into URLs, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct TransformOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resize: Option<ResizeMode>,
    pub quality: Option<u8>,
    pub format: Option<ImageFormat>,
}

impl TransformOptions {
    pub fn is_empty(&self) -> bool {
        self == &TransformOptions::default()
    }

    /// Query string pairs in a fixed order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(width) = self.width {
            pairs.push(("width", width.to_string()));
        }
        if let Some(height) = self.height {
            pairs.push(("height", height.to_string()));
        }
        if let Some(resize) = self.resize {
            pairs.push(("resize", resize.as_str().to_string()));
        }
        if let Some(quality) = self.quality {
            pairs.push(("quality", quality.to_string()));
        }
        if let Some(format) = self.format {
            pairs.push(("format", format.as_str().to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicUrlOptions {
    pub transform: Option<TransformOptions>,
}

impl PublicUrlOptions {
    /// Transform that was actually requested; an all-empty bag counts as none
    pub fn requested_transform(&self) -> Option<&TransformOptions> {
        self.transform.as_ref().filter(|t| !t.is_empty())
    }
}

/// `download` flag of a signed URL: a plain flag or a filename to save as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DownloadOption {
    Flag(bool),
    Filename(String),
}

/// Options accepted by `signed_url`
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct SignedUrlOptions {
    /// Lifetime of the URL in seconds
    pub expires_in: u64,
    pub download: Option<DownloadOption>,
    pub transform: Option<TransformOptions>,
}

impl SignedUrlOptions {
    pub fn requested_transform(&self) -> Option<&TransformOptions> {
        self.transform.as_ref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedUploadUrlOptions {
    pub expires_in: u64,
}

/// Pre-authorized upload target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUploadUrl {
    pub url: String,
    pub token: String,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_order() {
        let transform = TransformOptions::builder()
            .format(ImageFormat::Webp)
            .width(200)
            .resize(ResizeMode::Cover)
            .build();

        assert_eq!(
            transform.query_pairs(),
            vec![
                ("width", "200".to_string()),
                ("resize", "cover".to_string()),
                ("format", "webp".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_transform_is_not_a_request() {
        let options = PublicUrlOptions {
            transform: Some(TransformOptions::default()),
        };
        assert!(options.requested_transform().is_none());
    }

    #[test]
    fn test_download_option_wire_shapes() {
        let flag: DownloadOption = serde_json::from_str("true").unwrap();
        assert_eq!(flag, DownloadOption::Flag(true));

        let name: DownloadOption = serde_json::from_str("\"report.pdf\"").unwrap();
        assert_eq!(name, DownloadOption::Filename("report.pdf".to_string()));
    }
}
