//! Order persistence and the order status workflow.
//!
//! Every status change, including creation, appends a row to
//! `commerce.order_status_history` in the same transaction.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;

use distrimart_core::{OrderId, OrderStatus, ProductId};

use super::{RepositoryError, quantity_from_db, quantity_to_db};
use crate::models::{NewOrder, Order, OrderDetail, OrderItem, StatusChange};

const ORDER_COLUMNS: &str = "id, distributor_id, customer_email, customer_name, status, \
     subtotal, quote_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: ProductId,
    sku: String,
    name: String,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
    price_source: String,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            sku: row.sku,
            name: row.name,
            quantity: quantity_from_db(row.quantity)?,
            unit_price: row.unit_price,
            line_total: row.line_total,
            price_source: row.price_source,
        })
    }
}

/// Insert an order with its lines and initial history row.
///
/// Runs on the caller's connection so it can join a larger transaction
/// (quote conversion).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    new: &NewOrder,
) -> Result<OrderId, RepositoryError> {
    let order_id: OrderId = sqlx::query_scalar(
        r"
        INSERT INTO commerce.customer_order
            (distributor_id, customer_email, customer_name, status, subtotal, quote_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(new.distributor_id)
    .bind(&new.customer_email)
    .bind(&new.customer_name)
    .bind(OrderStatus::Pending)
    .bind(new.cart.subtotal)
    .bind(new.quote_id)
    .fetch_one(&mut *conn)
    .await?;

    for line in &new.cart.lines {
        sqlx::query(
            r"
            INSERT INTO commerce.order_item
                (order_id, product_id, sku, name, quantity, unit_price, line_total, price_source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(order_id)
        .bind(line.price.product_id)
        .bind(&line.sku)
        .bind(&line.name)
        .bind(quantity_to_db(line.price.quantity)?)
        .bind(line.price.unit_price)
        .bind(line.line_total)
        .bind(line.price.source.as_str())
        .execute(&mut *conn)
        .await?;
    }

    insert_history(conn, order_id, None, OrderStatus::Pending, new.note.as_deref()).await?;

    Ok(order_id)
}

async fn insert_history(
    conn: &mut PgConnection,
    order_id: OrderId,
    from: Option<OrderStatus>,
    to: OrderStatus,
    note: Option<&str>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO commerce.order_status_history (order_id, from_status, to_status, note)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(order_id)
    .bind(from)
    .bind(to)
    .bind(note)
    .execute(conn)
    .await?;
    Ok(())
}

/// Repository for orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a priced cart as a pending order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    #[instrument(skip(self, new), fields(lines = new.cart.lines.len()))]
    pub async fn create(&self, new: &NewOrder) -> Result<OrderDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let order_id = insert_order(&mut tx, new).await?;
        tx.commit().await?;

        self.get(order_id).await?.ok_or(RepositoryError::NotFound)
    }

    /// An order with its lines and history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` for unreadable rows.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM commerce.customer_order WHERE id = $1");
        let Some(order) = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT product_id, sku, name, quantity, unit_price, line_total, price_source
            FROM commerce.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let history = sqlx::query_as::<_, StatusChange>(
            r"
            SELECT from_status, to_status, note, changed_at
            FROM commerce.order_status_history
            WHERE order_id = $1
            ORDER BY changed_at, id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            order,
            items,
            history,
        }))
    }

    /// Order headers, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM commerce.customer_order \
             WHERE ($1::commerce.order_status IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// Move an order to `to`, recording the change.
    ///
    /// The current status is locked for the duration of the transaction so
    /// concurrent updates cannot both pass the transition check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown orders and
    /// `RepositoryError::Conflict` for transitions the workflow does not allow.
    #[instrument(skip(self, note))]
    pub async fn update_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        note: Option<&str>,
    ) -> Result<OrderDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus = sqlx::query_scalar(
            "SELECT status FROM commerce.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if current.is_terminal() {
            return Err(RepositoryError::Conflict(format!(
                "order {id} is already {current}"
            )));
        }
        if !current.can_transition_to(to) {
            return Err(RepositoryError::Conflict(format!(
                "order {id} cannot move from {current} to {to}"
            )));
        }

        sqlx::query("UPDATE commerce.customer_order SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(to)
            .execute(&mut *tx)
            .await?;
        insert_history(&mut tx, id, Some(current), to, note).await?;

        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }
}
