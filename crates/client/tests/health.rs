mod common;

use common::{spawn_relay, unreachable_url};
use reqwest::Url;
use train_r_client::health::{self, HealthError};

#[tokio::test]
async fn test_health_check_against_running_server() {
    let server = spawn_relay().await;
    let ws_url = Url::parse(&server.ws_url).unwrap();

    let status = health::check(&ws_url).await.unwrap();

    assert!(status.is_healthy());
    assert_eq!(status.service, "train-r-api");
    assert_eq!(status.version, "0.2.0");
}

#[tokio::test]
async fn test_health_check_reports_unreachable_server() {
    let ws_url = Url::parse(&unreachable_url().await).unwrap();

    let err = health::check(&ws_url).await.unwrap_err();
    assert!(matches!(err, HealthError::Request(_)));
}
