//! ヘルスポーリングモニター
//!
//! エンドポイントごとに独立した定期プローブ購読を管理する。
//! 購読は作成と同時に初回プローブを実行し、以後は購読作成時刻を起点と
//! する固定間隔で繰り返す。購読同士のタイマーは同期しない。

use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::health::fetcher::HealthFetcher;
use crate::types::endpoint::ApiEndpoint;
use crate::types::health::HealthStatus;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// ヘルススナップショット
///
/// ステータスマップの現在値と、集合全体のローディング状態。
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// エンドポイントごとの最新ステータス（初回プローブ完了後のみ存在）
    pub statuses: Vec<HealthStatus>,
    /// 初回プローブが未完了の購読が1つでもあるか
    pub is_loading: bool,
    /// 実行中のプローブが1つでもあるか（定期・強制を問わない）
    pub is_refreshing: bool,
}

/// 購読ごとの進行状況
#[derive(Default)]
struct ProbeState {
    /// 実行中プローブ数
    in_flight: AtomicU32,
    /// 初回プローブが完了したか
    first_done: AtomicBool,
    /// 発行済みプローブの通し番号
    issued: AtomicU64,
    /// 反映済みプローブの通し番号
    applied: AtomicU64,
    /// 退去済みフラグ（以後の完了結果は破棄）
    evicted: AtomicBool,
}

/// 1エンドポイント分の購読
struct Subscription {
    /// 定期実行タスク
    task: JoinHandle<()>,
    /// 強制リフレッシュ通知
    refresh: Arc<Notify>,
    /// 進行状況
    state: Arc<ProbeState>,
}

/// ヘルスモニター
///
/// 監視対象集合をエンドポイントIDをキーとした購読マップで保持し、
/// 完了したプローブ結果を共有ステータスマップへ完了順に反映する。
#[derive(Clone)]
pub struct HealthMonitor {
    /// プローブ実行部
    fetcher: HealthFetcher,
    /// 定期チェック間隔
    interval: Duration,
    /// 購読マップ
    subscriptions: Arc<RwLock<HashMap<Uuid, Subscription>>>,
    /// エンドポイントID → 最新ステータス
    statuses: Arc<RwLock<HashMap<Uuid, HealthStatus>>>,
}

impl HealthMonitor {
    /// 新しいモニターを作成（間隔はデフォルトの60秒）
    pub fn new(fetcher: HealthFetcher) -> Self {
        Self {
            fetcher,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            statuses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// チェック間隔を設定
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 監視対象集合を差し替える
    ///
    /// 集合から消えたIDは購読を退去し、新しく現れたIDは即座に購読を
    /// 開始する（初回プローブは遅延なしで走る）。既存のIDのタイマーは
    /// 影響を受けない。
    pub async fn reconcile(&self, endpoints: &[ApiEndpoint]) {
        let desired: HashMap<Uuid, ()> = endpoints.iter().map(|e| (e.id, ())).collect();

        let removed: Vec<Uuid> = {
            let subs = self.subscriptions.read().await;
            subs.keys()
                .filter(|id| !desired.contains_key(id))
                .copied()
                .collect()
        };
        for id in removed {
            self.evict(id).await;
        }

        let mut subs = self.subscriptions.write().await;
        for endpoint in endpoints {
            if !subs.contains_key(&endpoint.id) {
                subs.insert(endpoint.id, self.subscribe(endpoint.clone()));
            }
        }
    }

    /// 単一エンドポイントの購読を開始（既に購読中なら何もしない）
    pub async fn watch(&self, endpoint: ApiEndpoint) {
        let mut subs = self.subscriptions.write().await;
        if !subs.contains_key(&endpoint.id) {
            subs.insert(endpoint.id, self.subscribe(endpoint));
        }
    }

    /// 購読を停止し、キャッシュ済みステータスを破棄する
    ///
    /// 実行中のプローブは完走を許すが、退去フラグにより結果は
    /// ステータスマップへ書き込まれない。
    pub async fn evict(&self, id: Uuid) {
        let removed = self.subscriptions.write().await.remove(&id);
        if let Some(sub) = removed {
            sub.state.evicted.store(true, Ordering::SeqCst);
            sub.task.abort();
            self.statuses.write().await.remove(&id);
            info!(endpoint_id = %id, "Subscription evicted");
        }
    }

    /// 1購読だけ時間外のプローブを要求する
    ///
    /// 定期タイマーは進めない（間隔は購読作成時刻に固定）。
    /// 購読が存在しない場合はfalseを返す。
    pub async fn refetch_one(&self, id: Uuid) -> bool {
        let subs = self.subscriptions.read().await;
        match subs.get(&id) {
            Some(sub) => {
                sub.refresh.notify_one();
                true
            }
            None => false,
        }
    }

    /// すべての購読に時間外プローブを要求する
    ///
    /// 要求を出した購読数を返す。
    pub async fn refetch_all(&self) -> usize {
        let subs = self.subscriptions.read().await;
        for sub in subs.values() {
            sub.refresh.notify_one();
        }
        subs.len()
    }

    /// 現在のスナップショットを取得
    pub async fn snapshot(&self) -> HealthSnapshot {
        let (is_loading, is_refreshing) = {
            let subs = self.subscriptions.read().await;
            let is_loading = subs
                .values()
                .any(|s| !s.state.first_done.load(Ordering::SeqCst));
            let is_refreshing = subs
                .values()
                .any(|s| s.state.in_flight.load(Ordering::SeqCst) > 0);
            (is_loading, is_refreshing)
        };

        let statuses = self.statuses.read().await.values().cloned().collect();

        HealthSnapshot {
            statuses,
            is_loading,
            is_refreshing,
        }
    }

    /// 特定エンドポイントの現在のステータスを取得
    pub async fn status_of(&self, id: Uuid) -> Option<HealthStatus> {
        self.statuses.read().await.get(&id).cloned()
    }

    /// 購読中のエンドポイント数
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// 購読タスクを起動する
    fn subscribe(&self, endpoint: ApiEndpoint) -> Subscription {
        let refresh = Arc::new(Notify::new());
        let state = Arc::new(ProbeState::default());

        let fetcher = self.fetcher.clone();
        let statuses = Arc::clone(&self.statuses);
        let task_refresh = Arc::clone(&refresh);
        let task_state = Arc::clone(&state);
        let interval = self.interval;

        debug!(
            endpoint_id = %endpoint.id,
            endpoint_name = %endpoint.name,
            "Subscription started"
        );

        let task = tokio::spawn(async move {
            // interval()は初回tickが即時に完了するため、購読開始と同時に
            // 最初のプローブが走る。強制リフレッシュはタイマーに触れない。
            let mut timer = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        spawn_probe(&fetcher, &endpoint, &task_state, &statuses);
                    }
                    _ = task_refresh.notified() => {
                        spawn_probe(&fetcher, &endpoint, &task_state, &statuses);
                    }
                }
            }
        });

        Subscription {
            task,
            refresh,
            state,
        }
    }
}

/// プローブを独立タスクとして実行する
///
/// 購読ループから切り離して起動するため、定期tickと強制リフレッシュの
/// プローブは同一エンドポイントでも同時実行になり得る。重複完了は
/// 通し番号で直列化し、追い越された古い結果を破棄する。
fn spawn_probe(
    fetcher: &HealthFetcher,
    endpoint: &ApiEndpoint,
    state: &Arc<ProbeState>,
    statuses: &Arc<RwLock<HashMap<Uuid, HealthStatus>>>,
) {
    let seq = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
    state.in_flight.fetch_add(1, Ordering::SeqCst);

    let fetcher = fetcher.clone();
    let endpoint = endpoint.clone();
    let state = Arc::clone(state);
    let statuses = Arc::clone(statuses);

    tokio::spawn(async move {
        let status = fetcher.probe(&endpoint).await;

        {
            let mut map = statuses.write().await;
            // 退去後の完了は反映しない。applied/insertは書き込みロック下で
            // 行うため、他の完了と交錯しない。
            if !state.evicted.load(Ordering::SeqCst)
                && seq > state.applied.load(Ordering::SeqCst)
            {
                state.applied.store(seq, Ordering::SeqCst);
                map.insert(endpoint.id, status);
            } else {
                debug!(
                    endpoint_id = %endpoint.id,
                    seq,
                    "Discarded stale or evicted probe result"
                );
            }
        }

        state.first_done.store(true, Ordering::SeqCst);
        state.in_flight.fetch_sub(1, Ordering::SeqCst);
    });
}
