use std::collections::HashSet;

use axum::http::StatusCode;
use tokio::task::JoinSet;

use crate::tests::helper;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_shorten() {
    let (app, _) = helper::setup_test_app();

    let mut tasks = JoinSet::new();
    for i in 0..200 {
        let mut app = app.clone();
        tasks.spawn(async move {
            let long_url = format!("https://www.example.com/{i}");
            let (status_code, mapping, error) =
                helper::maybe_shorten(&mut app, &long_url, None).await;
            assert_eq!(StatusCode::CREATED, status_code, "{error:?}");

            let mapping = mapping.unwrap();
            assert_eq!(long_url, mapping.long_url);

            mapping.short_code
        });
    }

    let mut short_codes = HashSet::new();
    while let Some(short_code) = tasks.join_next().await {
        assert!(short_codes.insert(short_code.unwrap()));
    }
    assert_eq!(200, short_codes.len());

    let mut app = app;
    let mappings = helper::list(&mut app).await;
    assert_eq!(200, mappings.len());

    // every code redirects to its own URL
    for mapping in mappings {
        let (status_code, location, _) = helper::root(&mut app, &mapping.short_code).await;
        assert_eq!(StatusCode::FOUND, status_code);
        assert_eq!(Some(mapping.long_url), location);
    }
}
