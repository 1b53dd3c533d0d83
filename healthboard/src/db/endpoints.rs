//! エンドポイントデータベース操作

use crate::types::endpoint::{ApiEndpoint, Environment};
use sqlx::SqlitePool;
use uuid::Uuid;

/// エンドポイントを登録
pub async fn create_endpoint(pool: &SqlitePool, endpoint: &ApiEndpoint) -> Result<(), sqlx::Error> {
    let id = endpoint.id.to_string();
    let environment = endpoint.environment.as_str();
    let registered_at = endpoint.registered_at.to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO endpoints (id, name, url, environment, registered_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&endpoint.name)
    .bind(&endpoint.url)
    .bind(environment)
    .bind(&registered_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// エンドポイント一覧を取得
pub async fn list_endpoints(pool: &SqlitePool) -> Result<Vec<ApiEndpoint>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EndpointRow>(
        r#"
        SELECT id, name, url, environment, registered_at
        FROM endpoints
        ORDER BY registered_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// 環境でフィルタしてエンドポイント一覧を取得
pub async fn list_endpoints_by_environment(
    pool: &SqlitePool,
    environment: Environment,
) -> Result<Vec<ApiEndpoint>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EndpointRow>(
        r#"
        SELECT id, name, url, environment, registered_at
        FROM endpoints
        WHERE environment = ?
        ORDER BY registered_at DESC
        "#,
    )
    .bind(environment.as_str())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// IDでエンドポイントを取得
pub async fn get_endpoint(
    pool: &SqlitePool,
    id: Uuid,
) -> Result<Option<ApiEndpoint>, sqlx::Error> {
    let row = sqlx::query_as::<_, EndpointRow>(
        r#"
        SELECT id, name, url, environment, registered_at
        FROM endpoints
        WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// 名前と環境でエンドポイントを検索（シードの重複チェック用）
pub async fn find_by_name_and_environment(
    pool: &SqlitePool,
    name: &str,
    environment: Environment,
) -> Result<Option<ApiEndpoint>, sqlx::Error> {
    let row = sqlx::query_as::<_, EndpointRow>(
        r#"
        SELECT id, name, url, environment, registered_at
        FROM endpoints
        WHERE name = ? AND environment = ?
        "#,
    )
    .bind(name)
    .bind(environment.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// エンドポイントを削除
pub async fn delete_endpoint(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM endpoints WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct EndpointRow {
    id: String,
    name: String,
    url: String,
    environment: String,
    registered_at: String,
}

impl From<EndpointRow> for ApiEndpoint {
    fn from(row: EndpointRow) -> Self {
        ApiEndpoint {
            id: Uuid::parse_str(&row.id).unwrap_or_default(),
            name: row.name,
            url: row.url,
            environment: row.environment.parse().unwrap_or_default(),
            registered_at: chrono::DateTime::parse_from_rfc3339(&row.registered_at)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        }
    }
}
