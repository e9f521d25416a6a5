use axum::http::StatusCode;
use chrono::Duration;
use chrono::Utc;

use crate::tests::helper;

#[tokio::test]
async fn test_list_empty() {
    let (mut app, _) = helper::setup_test_app();

    assert!(helper::list(&mut app).await.is_empty());
}

#[tokio::test]
async fn test_list() {
    let (mut app, storage) = helper::setup_test_app();

    let first = helper::shorten(&mut app, "https://www.example.com/1").await;
    let (status_code, second, _) =
        helper::maybe_shorten(&mut app, "https://www.example.com/2", Some("2099-01-01T00:00:00Z"))
            .await;
    assert_eq!(StatusCode::CREATED, status_code);
    let second = second.unwrap();

    let expired_at = Utc::now() - Duration::minutes(1);
    helper::insert_mapping(&storage, "oldcode", "https://www.example.com/3", Some(expired_at))
        .await;

    let mappings = helper::list(&mut app).await;
    assert_eq!(3, mappings.len());

    // oldest first
    assert_eq!(first.short_code, mappings[0].short_code);
    assert_eq!(second.short_code, mappings[1].short_code);
    assert_eq!("oldcode", mappings[2].short_code);

    assert_eq!(first.short_url, mappings[0].short_url);
    assert_eq!("https://www.example.com/1", mappings[0].long_url);
    assert_eq!(None, mappings[0].expiry_at);
    assert_eq!(Some("active".to_string()), mappings[0].status);
    assert_eq!(Some(0), mappings[0].click_count);

    assert_eq!(second.expiry_at, mappings[1].expiry_at);
    assert_eq!(Some("active".to_string()), mappings[1].status);

    // expired mappings are listed until swept
    assert_eq!(format!("{}/oldcode", helper::BASE_URL), mappings[2].short_url);
    assert_eq!(Some("expired".to_string()), mappings[2].status);
}

#[tokio::test]
async fn test_list_with_unavailable_storage() {
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

    let (status_code, mappings) = helper::list_at(&mut app, "/all").await;
    assert_eq!(StatusCode::SERVICE_UNAVAILABLE, status_code);
    assert!(mappings.is_none());
}
