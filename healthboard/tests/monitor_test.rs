//! ヘルスモニター統合テスト
//!
//! 購読のライフサイクル（即時初回プローブ、定期実行、強制リフレッシュ、
//! 退去、集合の差し替え）を実タイマーと wiremock で検証する。

mod support;

use healthboard::health::{HealthFetcher, HealthMonitor};
use healthboard::types::endpoint::{ApiEndpoint, Environment};
use healthboard::types::health::OverallStatus;
use serde_json::json;
use std::time::Duration;
use support::wait_until;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_healthy(mock: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/health/ready"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "status": "Healthy",
                    "results": [{"source": "DB", "status": "Healthy"}]
                }))
                .set_delay(delay),
        )
        .mount(mock)
        .await;
}

fn endpoint_for(mock: &MockServer) -> ApiEndpoint {
    ApiEndpoint::new(
        "Monitored".to_string(),
        format!("{}/health/ready", mock.uri()),
        Environment::Dev,
    )
}

fn test_monitor(interval: Duration) -> HealthMonitor {
    HealthMonitor::new(HealthFetcher::with_timeout(Duration::from_secs(2))).with_interval(interval)
}

async fn request_count(mock: &MockServer) -> usize {
    mock.received_requests().await.unwrap_or_default().len()
}

#[tokio::test]
async fn test_first_probe_fires_immediately() {
    let mock = MockServer::start().await;
    mount_healthy(&mock, Duration::ZERO).await;

    // 間隔は60秒: 初回プローブがタイマーを待たないことの検証になる
    let monitor = test_monitor(Duration::from_secs(60));
    let endpoint = endpoint_for(&mock);
    let endpoint_id = endpoint.id;
    monitor.watch(endpoint).await;

    let resolved = wait_until(|| async {
        monitor.snapshot().await.statuses.len() == 1
    })
    .await;
    assert!(resolved, "first probe should complete without waiting for the interval");

    let status = monitor.status_of(endpoint_id).await.unwrap();
    assert_eq!(status.overall_status, OverallStatus::Healthy);
}

#[tokio::test]
async fn test_loading_and_refreshing_lifecycle() {
    let fast = MockServer::start().await;
    mount_healthy(&fast, Duration::ZERO).await;
    let slow = MockServer::start().await;
    mount_healthy(&slow, Duration::from_millis(300)).await;

    let monitor = test_monitor(Duration::from_secs(60));
    let endpoints = vec![endpoint_for(&fast), endpoint_for(&slow)];
    monitor.reconcile(&endpoints).await;

    // 遅い方の初回プローブが終わるまではローディング中
    assert!(monitor.snapshot().await.is_loading);

    // 遅いプローブが実行中の間はリフレッシュ中として見える
    assert!(wait_until(|| async { monitor.snapshot().await.is_refreshing }).await);

    let settled = wait_until(|| async { !monitor.snapshot().await.is_loading }).await;
    assert!(settled);

    // 両方の初回プローブ完了後はどちらのフラグも落ち、ステータスは2件
    let snapshot = monitor.snapshot().await;
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_refreshing);
    assert_eq!(snapshot.statuses.len(), 2);
}

#[tokio::test]
async fn test_periodic_refetch_repeats_on_interval() {
    let mock = MockServer::start().await;
    mount_healthy(&mock, Duration::ZERO).await;

    let monitor = test_monitor(Duration::from_millis(100));
    monitor.watch(endpoint_for(&mock)).await;

    tokio::time::sleep(Duration::from_millis(550)).await;

    // 初回 + 約5回分の定期プローブ
    let count = request_count(&mock).await;
    assert!(count >= 3, "expected repeated probes, got {}", count);
}

#[tokio::test]
async fn test_refetch_one_probes_out_of_band() {
    let mock = MockServer::start().await;
    mount_healthy(&mock, Duration::ZERO).await;

    let monitor = test_monitor(Duration::from_secs(60));
    let endpoint = endpoint_for(&mock);
    let endpoint_id = endpoint.id;
    monitor.watch(endpoint).await;

    assert!(wait_until(|| async { request_count(&mock).await >= 1 }).await);

    // タイマーとは無関係に追加プローブが走る
    assert!(monitor.refetch_one(endpoint_id).await);
    assert!(wait_until(|| async { request_count(&mock).await >= 2 }).await);

    // 購読の無いIDはfalse
    assert!(!monitor.refetch_one(uuid::Uuid::new_v4()).await);
}

#[tokio::test]
async fn test_refetch_all_probes_every_subscription() {
    let mock_a = MockServer::start().await;
    mount_healthy(&mock_a, Duration::ZERO).await;
    let mock_b = MockServer::start().await;
    mount_healthy(&mock_b, Duration::ZERO).await;

    let monitor = test_monitor(Duration::from_secs(60));
    monitor
        .reconcile(&[endpoint_for(&mock_a), endpoint_for(&mock_b)])
        .await;

    assert!(
        wait_until(|| async {
            request_count(&mock_a).await >= 1 && request_count(&mock_b).await >= 1
        })
        .await
    );

    let requested = monitor.refetch_all().await;
    assert_eq!(requested, 2);

    assert!(
        wait_until(|| async {
            request_count(&mock_a).await >= 2 && request_count(&mock_b).await >= 2
        })
        .await
    );
}

#[tokio::test]
async fn test_evict_discards_in_flight_result() {
    let mock = MockServer::start().await;
    mount_healthy(&mock, Duration::from_millis(300)).await;

    let monitor = test_monitor(Duration::from_secs(60));
    let endpoint = endpoint_for(&mock);
    let endpoint_id = endpoint.id;
    monitor.watch(endpoint).await;

    // 初回プローブが実行中のうちに退去させる
    tokio::time::sleep(Duration::from_millis(50)).await;
    monitor.evict(endpoint_id).await;

    // 実行中だったプローブが完走しても結果は現れない
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(monitor.status_of(endpoint_id).await.is_none());
    assert!(monitor.snapshot().await.statuses.is_empty());
    assert_eq!(monitor.subscription_count().await, 0);
}

#[tokio::test]
async fn test_evict_stops_further_polling() {
    let mock = MockServer::start().await;
    mount_healthy(&mock, Duration::ZERO).await;

    let monitor = test_monitor(Duration::from_millis(100));
    let endpoint = endpoint_for(&mock);
    let endpoint_id = endpoint.id;
    monitor.watch(endpoint).await;

    assert!(wait_until(|| async { request_count(&mock).await >= 2 }).await);

    monitor.evict(endpoint_id).await;

    // 退去直前に発行済みのプローブを吐き切ってから基準値を取る
    tokio::time::sleep(Duration::from_millis(150)).await;
    let count_at_evict = request_count(&mock).await;

    // タイマーが止まり、以後リクエストは増えない
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(request_count(&mock).await, count_at_evict);
}

#[tokio::test]
async fn test_reconcile_swaps_observed_set() {
    let mock_a = MockServer::start().await;
    mount_healthy(&mock_a, Duration::ZERO).await;
    let mock_b = MockServer::start().await;
    mount_healthy(&mock_b, Duration::ZERO).await;

    let monitor = test_monitor(Duration::from_secs(60));
    let endpoint_a = endpoint_for(&mock_a);
    let endpoint_b = endpoint_for(&mock_b);

    monitor.reconcile(std::slice::from_ref(&endpoint_a)).await;
    assert!(wait_until(|| async { monitor.status_of(endpoint_a.id).await.is_some() }).await);

    // Aを外してBへ差し替え: Aのステータスは破棄、Bは即座に購読開始
    monitor.reconcile(std::slice::from_ref(&endpoint_b)).await;

    assert!(wait_until(|| async { monitor.status_of(endpoint_b.id).await.is_some() }).await);
    assert!(monitor.status_of(endpoint_a.id).await.is_none());
    assert_eq!(monitor.subscription_count().await, 1);
}

#[tokio::test]
async fn test_reconcile_keeps_existing_subscription() {
    let mock = MockServer::start().await;
    mount_healthy(&mock, Duration::ZERO).await;

    let monitor = test_monitor(Duration::from_secs(60));
    let endpoint = endpoint_for(&mock);

    monitor.reconcile(std::slice::from_ref(&endpoint)).await;
    assert!(wait_until(|| async { request_count(&mock).await >= 1 }).await);
    let count_after_first = request_count(&mock).await;

    // 同じ集合での再リコンサイルは初回プローブを焼き直さない
    monitor.reconcile(std::slice::from_ref(&endpoint)).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(request_count(&mock).await, count_after_first);
    assert_eq!(monitor.subscription_count().await, 1);
}
