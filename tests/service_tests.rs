use bucket_storage::{
    adapters::outbound::storage::in_memory_capabilities, create_in_memory_app,
    create_object_store_memory_app, domain::models::DownloadOption, BucketName, CreateBucketOptions, DeleteTarget, Feature,
    InMemoryStorageAdapter, ListOptions, ObjectPath, SignedUploadUrlOptions, SignedUrlOptions,
    StorageService, StorageServiceImpl, UploadOptions, UploadPayload,
};
use std::sync::Arc;

fn bucket(name: &str) -> BucketName {
    BucketName::new(name).unwrap()
}

fn path(value: &str) -> ObjectPath {
    ObjectPath::new(value).unwrap()
}

fn limited_service(max_size_bytes: u64) -> StorageServiceImpl {
    let mut capabilities = in_memory_capabilities();
    capabilities.files.max_size_bytes = max_size_bytes;

    let adapter = InMemoryStorageAdapter::default()
        .with_capabilities(capabilities)
        .unwrap();
    StorageServiceImpl::new(Arc::new(adapter))
}

#[tokio::test]
async fn upload_size_limit_is_inclusive() {
    let service = limited_service(100);
    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();

    let err = service
        .upload(
            &bucket("media"),
            &path("too-big.bin"),
            UploadPayload::from(vec![7u8; 101]),
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FILE_TOO_LARGE");
    assert_eq!(err.status().as_u16(), 413);
    assert!(service
        .get_file_info(&bucket("media"), &path("too-big.bin"))
        .await
        .unwrap()
        .is_none());

    let record = service
        .upload(
            &bucket("media"),
            &path("fits.bin"),
            UploadPayload::from(vec![7u8; 100]),
            UploadOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(record.size, 100);
}

#[tokio::test]
async fn text_payload_length_is_encoded_length() {
    let service = limited_service(5);
    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();

    // Five characters, six bytes
    let err = service
        .upload(
            &bucket("media"),
            &path("greeting.txt"),
            UploadPayload::from("héllo"),
            UploadOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FILE_TOO_LARGE");

    service
        .upload(
            &bucket("media"),
            &path("greeting.txt"),
            UploadPayload::from("hello"),
            UploadOptions::default(),
        )
        .await
        .unwrap();
    let data = service
        .download(&bucket("media"), &path("greeting.txt"))
        .await
        .unwrap();
    assert_eq!(&data[..], b"hello");
}

#[tokio::test]
async fn delete_accepts_single_or_many() {
    let app = create_in_memory_app().await.unwrap();
    let service = app.storage_service;
    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();

    for file in ["a.txt", "b.txt", "c.txt"] {
        service
            .upload(&bucket("media"), &path(file), file.into(), UploadOptions::default())
            .await
            .unwrap();
    }

    service
        .delete(&bucket("media"), path("a.txt").into())
        .await
        .unwrap();
    service
        .delete(
            &bucket("media"),
            DeleteTarget::from(vec![path("b.txt"), path("c.txt")]),
        )
        .await
        .unwrap();

    let listed = service
        .list(&bucket("media"), ListOptions::default())
        .await
        .unwrap();
    assert!(listed.files.is_empty());
}

#[tokio::test]
async fn adapter_errors_pass_through_unchanged() {
    let app = create_in_memory_app().await.unwrap();
    let service = app.storage_service;

    let err = service
        .delete_bucket(&bucket("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "BUCKET_NOT_FOUND");

    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();
    let err = service
        .signed_url(
            &bucket("media"),
            &path("missing.txt"),
            SignedUrlOptions::builder().expires_in(60).build(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FILE_NOT_FOUND");
}

#[tokio::test]
async fn in_memory_backend_signs_urls() {
    let app = create_in_memory_app().await.unwrap();
    let service = app.storage_service;
    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();
    service
        .upload(
            &bucket("media"),
            &path("a.txt"),
            "a".into(),
            UploadOptions::default(),
        )
        .await
        .unwrap();

    let url = service
        .signed_url(
            &bucket("media"),
            &path("a.txt"),
            SignedUrlOptions::builder()
                .expires_in(3600)
                .download(DownloadOption::Filename("copy.txt".to_string()))
                .build(),
        )
        .await
        .unwrap();
    assert!(url.contains("/signed/media/a.txt?token="));
    assert!(url.ends_with("&download=copy.txt"));

    let upload = service
        .create_signed_upload_url(
            &bucket("media"),
            &path("incoming/b.txt"),
            SignedUploadUrlOptions { expires_in: 600 },
        )
        .await
        .unwrap();
    assert_eq!(upload.path, "incoming/b.txt");
    assert!(upload
        .url
        .contains(&format!("?token={}&expires=", upload.token)));
}

#[tokio::test]
async fn object_store_backend_reports_its_gaps() {
    let app = create_object_store_memory_app().await.unwrap();
    let service = app.storage_service;

    assert!(service.has_feature(Feature::Folders));
    assert!(!service.has_feature(Feature::Versioning));
    assert!(service.is_mime_type_allowed("application/pdf"));

    let err = service
        .signed_url(
            &bucket("media"),
            &path("a.txt"),
            SignedUrlOptions::builder().expires_in(60).build(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SIGNED_URLS_NOT_SUPPORTED");

    let err = service
        .create_signed_upload_url(
            &bucket("media"),
            &path("a.txt"),
            SignedUploadUrlOptions { expires_in: 60 },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SIGNED_UPLOAD_URL_NOT_SUPPORTED");
    assert_eq!(err.status().as_u16(), 400);
}

#[tokio::test]
async fn signed_upload_url_lifetime_is_checked() {
    let app = create_in_memory_app().await.unwrap();
    let service = app.storage_service;
    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();

    let err = service
        .create_signed_upload_url(
            &bucket("media"),
            &path("a.txt"),
            SignedUploadUrlOptions { expires_in: 0 },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_REQUEST");

    let err = service
        .create_signed_upload_url(
            &bucket("media"),
            &path("a.txt"),
            SignedUploadUrlOptions {
                expires_in: 10_000_000_000,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "EXPIRY_TOO_LONG");

    let max_age = service.capabilities().files.signed_url_max_age.unwrap();
    service
        .create_signed_upload_url(
            &bucket("media"),
            &path("a.txt"),
            SignedUploadUrlOptions {
                expires_in: max_age,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn huge_signed_url_lifetime_is_rejected_not_panicking() {
    let mut capabilities = in_memory_capabilities();
    capabilities.files.signed_url_max_age = Some(u64::MAX);
    let adapter = InMemoryStorageAdapter::default()
        .with_capabilities(capabilities)
        .unwrap();
    let service = StorageServiceImpl::new(Arc::new(adapter));

    service
        .create_bucket(&bucket("media"), CreateBucketOptions::default())
        .await
        .unwrap();
    service
        .upload(&bucket("media"), &path("a.txt"), "a".into(), UploadOptions::default())
        .await
        .unwrap();

    for expires_in in [10_000_000_000_000_000, u64::MAX] {
        let err = service
            .signed_url(
                &bucket("media"),
                &path("a.txt"),
                SignedUrlOptions::builder().expires_in(expires_in).build(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_REQUEST");
    }
}
