use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    errors::{StorageError, StorageResult},
    models::{DownloadOption, TransformOptions},
    value_objects::{BucketName, ObjectPath},
};

/// Deterministic URL construction shared by the storage adapters.
///
/// Layout under the base URL:
/// - `public/{bucket}/{path}` plain public object
/// - `render/{bucket}/{path}?width=..` transformed public object
/// - `signed/{bucket}/{path}?token=..&expires=..` time-limited access
/// - `upload/{bucket}/{path}?token=..&expires=..` pre-authorized upload
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn public_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        transform: Option<&TransformOptions>,
    ) -> String {
        match transform {
            Some(transform) => {
                let url = self.object_url("render", bucket, path);
                with_query(url, transform.query_pairs())
            }
            None => self.object_url("public", bucket, path),
        }
    }

    pub fn signed_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        token: &str,
        expires_at: DateTime<Utc>,
        download: Option<&DownloadOption>,
        transform: Option<&TransformOptions>,
    ) -> String {
        let mut pairs = vec![
            ("token", token.to_string()),
            ("expires", expires_at.timestamp().to_string()),
        ];

        match download {
            Some(DownloadOption::Flag(true)) => pairs.push(("download", String::new())),
            Some(DownloadOption::Filename(name)) => pairs.push(("download", name.clone())),
            Some(DownloadOption::Flag(false)) | None => {}
        }

        if let Some(transform) = transform {
            pairs.extend(transform.query_pairs());
        }

        with_query(self.object_url("signed", bucket, path), pairs)
    }

    pub fn signed_upload_url(
        &self,
        bucket: &BucketName,
        path: &ObjectPath,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> String {
        with_query(
            self.object_url("upload", bucket, path),
            vec![
                ("token", token.to_string()),
                ("expires", expires_at.timestamp().to_string()),
            ],
        )
    }

    fn object_url(&self, kind: &str, bucket: &BucketName, path: &ObjectPath) -> String {
        let encoded_path = path
            .as_str()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/{}/{}/{}",
            self.base_url,
            kind,
            urlencoding::encode(bucket.as_str()),
            encoded_path
        )
    }
}

/// Absolute expiry `expires_in` seconds after `now`.
pub fn expiry_after(now: DateTime<Utc>, expires_in: u64) -> StorageResult<DateTime<Utc>> {
    i64::try_from(expires_in)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| StorageError::InvalidRequest {
            message: format!("expiresIn of {} seconds is out of range", expires_in),
        })
}

fn with_query(url: String, pairs: Vec<(&'static str, String)>) -> String {
    if pairs.is_empty() {
        return url;
    }

    let query = pairs
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.to_string()
            } else {
                format!("{}={}", key, urlencoding::encode(value))
            }
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", url, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ImageFormat, ResizeMode};
    use chrono::TimeZone;

    fn names() -> (BucketName, ObjectPath) {
        (
            BucketName::new("avatars").unwrap(),
            ObjectPath::new("users/jane doe.png").unwrap(),
        )
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let urls = UrlBuilder::new("https://files.example.com//");
        assert_eq!(urls.base_url(), "https://files.example.com");
    }

    #[test]
    fn test_public_url() {
        let urls = UrlBuilder::new("http://localhost:3000/");
        let (bucket, path) = names();

        assert_eq!(
            urls.public_url(&bucket, &path, None),
            "http://localhost:3000/public/avatars/users/jane%20doe.png"
        );

        let transform = TransformOptions::builder()
            .width(64)
            .height(64)
            .resize(ResizeMode::Contain)
            .format(ImageFormat::Png)
            .build();
        assert_eq!(
            urls.public_url(&bucket, &path, Some(&transform)),
            "http://localhost:3000/render/avatars/users/jane%20doe.png?width=64&height=64&resize=contain&format=png"
        );
    }

    #[test]
    fn test_signed_url() {
        let urls = UrlBuilder::new("https://files.example.com");
        let (bucket, path) = names();
        let expires = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();

        let url = urls.signed_url(
            &bucket,
            &path,
            "abc",
            expires,
            Some(&DownloadOption::Filename("me.png".to_string())),
            None,
        );
        assert_eq!(
            url,
            "https://files.example.com/signed/avatars/users/jane%20doe.png?token=abc&expires=1704070800&download=me.png"
        );

        let url = urls.signed_url(
            &bucket,
            &path,
            "abc",
            expires,
            Some(&DownloadOption::Flag(true)),
            None,
        );
        assert!(url.ends_with("&download"));
    }

    #[test]
    fn test_signed_upload_url() {
        let urls = UrlBuilder::new("http://localhost");
        let (bucket, path) = names();
        assert_eq!(
            urls.signed_upload_url(
                &bucket,
                &path,
                "t1",
                Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap()
            ),
            "http://localhost/upload/avatars/users/jane%20doe.png?token=t1&expires=1704074400"
        );
    }

    #[test]
    fn test_expiry_after() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            expiry_after(now, 3600).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );

        for too_far in [10_000_000_000_000_000, u64::MAX] {
            let err = expiry_after(now, too_far).unwrap_err();
            assert_eq!(err.code(), "INVALID_REQUEST");
        }
    }
}
