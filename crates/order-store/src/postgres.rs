use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, Page, PageRequest, UserId};
use domain::Order;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Row};

use crate::{
    OrderFilter, OrderStoreError, Result,
    store::{OrderStore, OrderStream},
};

/// PostgreSQL-backed order store.
///
/// Orders are persisted as documents: the whole aggregate is serialised
/// into the `doc` column, with the fields needed for filtering and sorting
/// extracted into indexed columns at write time.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let doc: serde_json::Value = row.try_get("doc")?;
        Ok(serde_json::from_value(doc)?)
    }

    async fn write_order(&self, order: &Order, is_update: bool) -> Result<()> {
        let doc = serde_json::to_value(order)?;

        if is_update {
            let result = sqlx::query(
                r#"
                UPDATE orders
                SET status = $2, total_cents = $3, order_date = $4, is_removed = $5,
                    updated_at = $6, doc = $7
                WHERE id = $1
                "#,
            )
            .bind(order.id().as_uuid())
            .bind(order.status().as_str())
            .bind(order.total().cents())
            .bind(order.order_date())
            .bind(order.is_removed())
            .bind(order.updated_at())
            .bind(&doc)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(OrderStoreError::NotFound(order.id()));
            }
        } else {
            sqlx::query(
                r#"
                INSERT INTO orders (id, user_id, status, total_cents, order_date,
                                    is_removed, created_at, updated_at, doc)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(order.id().as_uuid())
            .bind(order.user_id().as_uuid())
            .bind(order.status().as_str())
            .bind(order.total().cents())
            .bind(order.order_date())
            .bind(order.is_removed())
            .bind(order.created_at())
            .bind(order.updated_at())
            .bind(&doc)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Translates the populated filter fields into a SQL fragment with
    /// incrementally numbered parameters. [`bind_filter`] must bind values
    /// in the same order the placeholders are emitted here.
    fn filter_sql(filter: &OrderFilter, param_count: &mut usize) -> String {
        let mut sql = String::new();

        if !filter.include_removed {
            sql.push_str(" AND is_removed = FALSE");
        }
        if filter.exclude_pending {
            sql.push_str(" AND status <> 'Pending'");
        }
        if filter.user_id.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if filter.statuses.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND status = ANY(${param_count})"));
        }
        if filter.placed_after.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND order_date >= ${param_count}"));
        }
        if filter.placed_before.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND order_date <= ${param_count}"));
        }
        if filter.min_total.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND total_cents >= ${param_count}"));
        }
        if filter.max_total.is_some() {
            *param_count += 1;
            sql.push_str(&format!(" AND total_cents <= ${param_count}"));
        }
        if filter.keyword.is_some() {
            *param_count += 1;
            sql.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM jsonb_array_elements(doc->'items') AS item \
                 WHERE item->>'product_name' ILIKE ${param_count})"
            ));
        }

        sql
    }

    fn bind_filter<'q>(mut query: PgQuery<'q>, filter: &'q OrderFilter) -> PgQuery<'q> {
        if let Some(user_id) = filter.user_id {
            query = query.bind(user_id.as_uuid());
        }
        if let Some(statuses) = &filter.statuses {
            let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
            query = query.bind(names);
        }
        if let Some(after) = filter.placed_after {
            query = query.bind(after);
        }
        if let Some(before) = filter.placed_before {
            query = query.bind(before);
        }
        if let Some(min) = filter.min_total {
            query = query.bind(min.cents());
        }
        if let Some(max) = filter.max_total {
            query = query.bind(max.cents());
        }
        if let Some(keyword) = &filter.keyword {
            query = query.bind(format!("%{keyword}%"));
        }
        query
    }

    async fn count_matching(&self, filter: &OrderFilter, where_sql: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM orders WHERE 1=1{where_sql}");
        let row = Self::bind_filter(sqlx::query(&sql), filter)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get(0)?;
        Ok(total as u64)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        let now = Utc::now();
        order.set_timestamps(now, now);
        self.write_order(&order, false).await?;
        Ok(order)
    }

    async fn save(&self, mut order: Order) -> Result<Order> {
        let created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM orders WHERE id = $1")
                .bind(order.id().as_uuid())
                .fetch_optional(&self.pool)
                .await?;
        let created_at = created_at.ok_or(OrderStoreError::NotFound(order.id()))?;

        order.set_timestamps(created_at, Utc::now());
        self.write_order(&order, true).await?;
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT doc FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn latest_pending_for_user(&self, user_id: UserId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT doc FROM orders
            WHERE user_id = $1 AND status = 'Pending' AND is_removed = FALSE
            ORDER BY updated_at DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_for_user(&self, user_id: UserId, page: PageRequest) -> Result<Page<Order>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE user_id = $1 AND is_removed = FALSE",
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            r#"
            SELECT doc FROM orders
            WHERE user_id = $1 AND is_removed = FALSE
            ORDER BY updated_at DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(orders, total as u64, page))
    }

    async fn search(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
        let mut param_count = 0;
        let where_sql = Self::filter_sql(filter, &mut param_count);

        let total = self.count_matching(filter, &where_sql).await?;

        let sql = format!(
            "SELECT doc FROM orders WHERE 1=1{where_sql} \
             ORDER BY updated_at DESC, created_at DESC LIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        );
        let rows = Self::bind_filter(sqlx::query(&sql), filter)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let orders = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(orders, total, page))
    }

    async fn find_all(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let mut param_count = 0;
        let where_sql = Self::filter_sql(filter, &mut param_count);

        let sql = format!(
            "SELECT doc FROM orders WHERE 1=1{where_sql} \
             ORDER BY updated_at DESC, created_at DESC"
        );
        let rows = Self::bind_filter(sqlx::query(&sql), filter)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn stream_all(&self) -> Result<OrderStream> {
        use futures_util::StreamExt;

        let stream = sqlx::query("SELECT doc FROM orders ORDER BY created_at ASC, id ASC")
            .fetch(&self.pool)
            .map(|result| match result {
                Ok(row) => Self::row_to_order(row),
                Err(e) => Err(OrderStoreError::Database(e)),
            });

        Ok(Box::pin(stream))
    }
}
