#[cfg(test)]
mod integration_tests {
    use crate::{
        build_router, AppState, Config, MenuService, PageSnapshot, ScrapeError, SnapshotProvider,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use calamine::{Reader, Xlsx};
    use http_body_util::BodyExt;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const MENU_PAGE: &str = r#"
        <html><body>
          <h1>Corner Cafe</h1>
          <h2>Drinks</h2>
          <div data-testid="card">
            <h3>Latte</h3>
            <span data-testid="card-item-price">$4.00</span>
            <p class="styles_description__a1b2c">Hot espresso drink</p>
            <span>Unavailable</span>
          </div>
        </body></html>
    "#;

    /// In-memory snapshot source; counts acquisitions so tests can assert
    /// that rejected requests never reach the provider.
    struct StubProvider {
        html: Option<String>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn serving(html: &str) -> Arc<Self> {
            Arc::new(Self {
                html: Some(html.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                html: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SnapshotProvider for StubProvider {
        async fn acquire(&self, url: &str) -> Result<PageSnapshot, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.html {
                Some(html) => Ok(PageSnapshot {
                    url: url.to_string(),
                    html: html.clone(),
                    card_found: true,
                }),
                None => Err(ScrapeError::NavigationFailed("connection refused".to_string())),
            }
        }
    }

    fn test_router(provider: Arc<StubProvider>) -> Router {
        let service =
            MenuService::with_provider(Config::default(), provider).expect("service creation");
        build_router(AppState {
            service: Arc::new(service),
        })
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, body.to_vec(), disposition)
    }

    #[test]
    fn config_default() {
        let config = Config::default();
        assert_eq!(config.browser_pool_size, 2);
        assert_eq!(config.max_concurrent_extractions, 16);
        assert_eq!(config.page_timeout, Duration::from_secs(60));
        assert_eq!(config.card_timeout, Duration::from_secs(15));
        assert_eq!(config.selectors.card, r#"[data-testid="card"]"#);
        assert_eq!(config.selectors.item_name.len(), 3);
    }

    #[test]
    fn validate_config_rejects_degenerate_values() {
        let mut config = Config::default();
        config.browser_pool_size = 0;
        assert!(crate::validate_config(&config).is_err());

        let mut config = Config::default();
        config.selectors.card = "[[[".to_string();
        assert!(crate::validate_config(&config).is_err());

        assert!(crate::validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn render_failures_are_classified() {
        assert!(ScrapeError::NavigationFailed("x".to_string()).is_render_failure());
        assert!(ScrapeError::NavigationTimeout(Duration::from_secs(60)).is_render_failure());
        assert!(ScrapeError::BrowserUnavailable.is_render_failure());
        assert!(ScrapeError::PageError("x".to_string()).is_render_failure());
        assert!(!ScrapeError::InvalidUrl("x".to_string()).is_render_failure());
        assert!(!ScrapeError::InvalidSelector("x".to_string()).is_render_failure());
        assert!(!ScrapeError::ExportFailed("x".to_string()).is_render_failure());
    }

    #[test]
    fn error_severity_levels() {
        use crate::ErrorSeverity;

        assert_eq!(
            ScrapeError::InvalidUrl("x".to_string()).severity(),
            ErrorSeverity::Low
        );
        assert_eq!(
            ScrapeError::NavigationTimeout(Duration::from_secs(60)).severity(),
            ErrorSeverity::Medium
        );
        assert_eq!(
            ScrapeError::ConfigurationError("x".to_string()).severity(),
            ErrorSeverity::High
        );
        assert_eq!(
            ScrapeError::BrowserLaunchFailed("x".to_string()).severity(),
            ErrorSeverity::High
        );
    }

    #[tokio::test]
    async fn missing_url_is_rejected_before_extraction() {
        let provider = StubProvider::serving(MENU_PAGE);

        let (status, body, _) = get(test_router(provider.clone()), "/fetch-menu").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(error["error"].as_str().unwrap().contains("URL"));

        let (status, _, _) = get(test_router(provider.clone()), "/fetch-menu-excel").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_url_is_a_bad_request() {
        let provider = StubProvider::serving(MENU_PAGE);
        let (status, _, _) =
            get(test_router(provider.clone()), "/fetch-menu?url=not-a-url").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn fetch_menu_returns_records_as_json() {
        let provider = StubProvider::serving(MENU_PAGE);
        let (status, body, _) = get(
            test_router(provider),
            "/fetch-menu?url=https://example.com/menu",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let records: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(records.as_array().unwrap().len(), 1);
        assert_eq!(records[0]["Category"], "Drinks");
        assert_eq!(records[0]["Item"], "Latte");
        assert_eq!(records[0]["Description"], "Hot espresso drink");
        assert_eq!(records[0]["Price"], "$4.00");
        assert_eq!(records[0]["Comment"], "Unavailable");
    }

    #[tokio::test]
    async fn empty_extraction_diverges_between_json_and_excel_paths() {
        let empty_page = StubProvider::serving("<html><body><p>closed</p></body></html>");

        let (status, body, _) = get(
            test_router(empty_page.clone()),
            "/fetch-menu?url=https://example.com/menu",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<serde_json::Value>(&body).unwrap(), serde_json::json!([]));

        let (status, _, _) = get(
            test_router(empty_page),
            "/fetch-menu-excel?url=https://example.com/menu",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fetch_menu_excel_streams_a_workbook_attachment() {
        let provider = StubProvider::serving(MENU_PAGE);
        let (status, body, disposition) = get(
            test_router(provider),
            "/fetch-menu-excel?url=https://example.com/menu",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let disposition = disposition.expect("content-disposition header");
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(".xlsx"));

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(body)).unwrap();
        let range = workbook.worksheet_range("Menu").unwrap();
        assert_eq!(range.rows().count(), 2);
        let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(header, ["Category", "Item", "Description", "Price", "Comment"]);
    }

    #[tokio::test]
    async fn simultaneous_downloads_each_get_a_complete_workbook() {
        let provider = StubProvider::serving(MENU_PAGE);
        let router = test_router(provider);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let router = router.clone();
            handles.push(tokio::spawn(async move {
                get(router, "/fetch-menu-excel?url=https://example.com/menu").await
            }));
        }

        for handle in handles {
            let (status, body, _) = handle.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(body)).unwrap();
            let range = workbook.worksheet_range("Menu").unwrap();
            assert_eq!(range.rows().count(), 2);
        }
    }

    #[tokio::test]
    async fn render_failure_is_absorbed_into_an_empty_result() {
        let provider = StubProvider::failing();
        let service = MenuService::with_provider(Config::default(), provider.clone()).unwrap();

        let records = service
            .fetch_menu("https://unreachable.example.com/menu")
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn render_failure_maps_to_no_data_on_the_download_path() {
        let provider = StubProvider::failing();
        let (status, _, _) = get(
            test_router(provider),
            "/fetch-menu-excel?url=https://unreachable.example.com/menu",
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let provider = StubProvider::serving(MENU_PAGE);
        let service = Arc::new(
            MenuService::with_provider(Config::default(), provider.clone()).unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.fetch_menu("https://example.com/menu").await
            }));
        }

        for handle in handles {
            let records = handle.await.unwrap().unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].category, "Drinks");
        }
        assert_eq!(provider.call_count(), 8);
    }
}
