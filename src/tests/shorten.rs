use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_shorten() {
    let (mut app, _) = helper::setup_test_app();

    let (status_code, mapping, error) =
        helper::maybe_shorten(&mut app, "https://www.example.com/some/path?q=1", None).await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert!(error.is_none());

    let mapping = mapping.unwrap();
    assert_eq!(7, mapping.short_code.len());
    assert!(mapping.short_code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(
        format!("{}/{}", helper::BASE_URL, mapping.short_code),
        mapping.short_url
    );
    assert_eq!("https://www.example.com/some/path?q=1", mapping.long_url);
    assert_eq!(None, mapping.expiry_at);
}

#[tokio::test]
async fn test_shorten_same_url_twice() {
    let (mut app, _) = helper::setup_test_app();

    let first = helper::shorten(&mut app, "https://www.example.com/").await;
    let second = helper::shorten(&mut app, "https://www.example.com/").await;

    assert_ne!(first.short_code, second.short_code);
    assert_eq!(2, helper::list(&mut app).await.len());
}

#[tokio::test]
async fn test_shorten_with_expiry() {
    let (mut app, _) = helper::setup_test_app();

    let (status_code, mapping, _) =
        helper::maybe_shorten(&mut app, "https://www.example.com/", Some("2099-01-01T00:00:00Z"))
            .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let expiry_at = mapping.unwrap().expiry_at.unwrap();
    assert!(expiry_at.starts_with("2099-01-01T00:00:00"));

    // without time zone, taken as UTC
    let (status_code, mapping, _) =
        helper::maybe_shorten(&mut app, "https://www.example.com/", Some("2099-06-30T12:30"))
            .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let expiry_at = mapping.unwrap().expiry_at.unwrap();
    assert!(expiry_at.starts_with("2099-06-30T12:30:00"));

    // blank means never
    let (status_code, mapping, _) =
        helper::maybe_shorten(&mut app, "https://www.example.com/", Some("  ")).await;
    assert_eq!(StatusCode::CREATED, status_code);
    assert_eq!(None, mapping.unwrap().expiry_at);
}

#[tokio::test]
async fn test_shorten_with_invalid_expiry() {
    let (mut app, _) = helper::setup_test_app();

    for expiry_at in ["2000-01-01T00:00:00Z", "tomorrow", "2099-13-01T00:00:00Z"] {
        let (status_code, mapping, error) =
            helper::maybe_shorten(&mut app, "https://www.example.com/", Some(expiry_at)).await;
        assert_eq!(StatusCode::BAD_REQUEST, status_code, "{expiry_at}");
        assert!(mapping.is_none());

        let error = error.unwrap();
        assert_eq!("invalid_expiry", error.error);
        assert_eq!("Invalid expiry date", error.message);
        assert!(error.description.is_some());
    }

    assert!(helper::list(&mut app).await.is_empty());
}

#[tokio::test]
async fn test_shorten_with_invalid_url() {
    let (mut app, _) = helper::setup_test_app();

    let too_long = format!("https://www.example.com/{}", "a".repeat(2048));

    for long_url in [
        "",
        "   ",
        "not a url",
        "www.example.com",
        "/relative/path",
        "ftp://example.com/file",
        "javascript:alert(1)",
        too_long.as_str(),
    ] {
        let (status_code, mapping, error) =
            helper::maybe_shorten(&mut app, long_url, None).await;
        assert_eq!(StatusCode::BAD_REQUEST, status_code, "{long_url}");
        assert!(mapping.is_none());

        let error = error.unwrap();
        assert_eq!("invalid_url", error.error);
        assert_eq!("Invalid URL", error.message);
    }

    assert!(helper::list(&mut app).await.is_empty());
}

#[tokio::test]
async fn test_shorten_with_unavailable_storage() {
    use crate::api::ShortUrls;
    use crate::cache::MappingCache;
    use crate::create_router;
    use crate::generator::RandomGenerator;
    use crate::service::RetryPolicy;
    use crate::service::UrlService;
    use crate::service::tests::UnreachableStorage;

    let service = UrlService::new(
        UnreachableStorage,
        RandomGenerator::default(),
        MappingCache::default(),
    )
    .with_retry_policy(RetryPolicy::no_retry());

    let mut app = create_router(service, ShortUrls::new(helper::BASE_URL));

    let (status_code, mapping, error) =
        helper::maybe_shorten(&mut app, "https://www.example.com/", None).await;
    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status_code);
    assert!(mapping.is_none());
    assert_eq!("store_unavailable", error.unwrap().error);
}
