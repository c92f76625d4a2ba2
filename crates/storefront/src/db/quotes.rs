//! Quote requests and their conversion into orders.

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, instrument};

use distrimart_core::pricing::{
    PriceSource, PricedCart, PricedLine, PricingSource, ProductPricing, ResolvedPrice,
    price_product,
};
use distrimart_core::{DistributorId, MoneyError, ProductId, QuoteId, QuoteStatus, round_money};

use super::orders::insert_order;
use super::{OrderRepository, RepositoryError, quantity_from_db, quantity_to_db};
use crate::models::{
    NewOrder, NewQuote, OrderDetail, Quote, QuoteDetail, QuoteItem, QuotedPrice,
};

/// Price one quote item: the agreed unit price when one was recorded,
/// otherwise the distributor's rules at the time of the call.
pub async fn price_quote_item<S: PricingSource>(
    source: &S,
    product: &ProductPricing,
    distributor: Option<DistributorId>,
    item: &QuoteItem,
) -> ResolvedPrice {
    match item.quoted_unit_price {
        Some(agreed) => ResolvedPrice {
            product_id: product.id,
            quantity: item.quantity,
            base_price: product.base_price,
            unit_price: round_money(agreed),
            source: PriceSource::Quoted,
        },
        None => price_product(source, product, distributor, item.quantity).await,
    }
}

const QUOTE_COLUMNS: &str = "id, distributor_id, customer_email, customer_name, company, \
     message, status, order_id, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct QuoteItemRow {
    product_id: ProductId,
    quantity: i32,
    quoted_unit_price: Option<Decimal>,
}

impl TryFrom<QuoteItemRow> for QuoteItem {
    type Error = RepositoryError;

    fn try_from(row: QuoteItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            quantity: quantity_from_db(row.quantity)?,
            quoted_unit_price: row.quoted_unit_price,
        })
    }
}

fn too_large(id: QuoteId, e: &MoneyError) -> RepositoryError {
    RepositoryError::Conflict(format!("quote {id} cannot be converted: {e}"))
}

/// Repository for quote requests.
pub struct QuoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> QuoteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new pending quote request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails (including
    /// unknown product IDs, which violate the item foreign key).
    #[instrument(skip(self, new), fields(items = new.items.len()))]
    pub async fn create(&self, new: &NewQuote) -> Result<QuoteDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let quote_id: QuoteId = sqlx::query_scalar(
            r"
            INSERT INTO commerce.quote_request
                (distributor_id, customer_email, customer_name, company, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(new.distributor_id)
        .bind(&new.customer_email)
        .bind(&new.customer_name)
        .bind(new.company.as_deref())
        .bind(new.message.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for item in &new.items {
            sqlx::query(
                r"
                INSERT INTO commerce.quote_item (quote_id, product_id, quantity, quoted_unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(quote_id)
            .bind(item.product_id)
            .bind(quantity_to_db(item.quantity)?)
            .bind(item.quoted_unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(quote_id).await?.ok_or(RepositoryError::NotFound)
    }

    /// A quote request with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: QuoteId) -> Result<Option<QuoteDetail>, RepositoryError> {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM commerce.quote_request WHERE id = $1");
        let Some(quote) = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.items(id).await?;
        Ok(Some(QuoteDetail { quote, items }))
    }

    async fn items(&self, id: QuoteId) -> Result<Vec<QuoteItem>, RepositoryError> {
        sqlx::query_as::<_, QuoteItemRow>(
            r"
            SELECT product_id, quantity, quoted_unit_price
            FROM commerce.quote_item
            WHERE quote_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(QuoteItem::try_from)
        .collect()
    }

    /// Quote headers, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<QuoteStatus>) -> Result<Vec<Quote>, RepositoryError> {
        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM commerce.quote_request \
             WHERE ($1::commerce.quote_status IS NULL OR status = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        let quotes = sqlx::query_as::<_, Quote>(&sql)
            .bind(status)
            .fetch_all(self.pool)
            .await?;
        Ok(quotes)
    }

    /// Record a quoting decision, together with any agreed unit prices.
    ///
    /// Setting `converted` goes through [`Self::convert`] instead. Prices
    /// replace earlier ones for the same product and commit with the status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown quotes and
    /// `RepositoryError::Conflict` for disallowed transitions or prices for
    /// products the quote does not contain.
    #[instrument(skip(self, prices), fields(prices = prices.len()))]
    pub async fn update_status(
        &self,
        id: QuoteId,
        to: QuoteStatus,
        prices: &[QuotedPrice],
    ) -> Result<QuoteDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: QuoteStatus = sqlx::query_scalar(
            "SELECT status FROM commerce.quote_request WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(to) {
            return Err(RepositoryError::Conflict(format!(
                "quote {id} cannot move from {current} to {to}"
            )));
        }

        for price in prices {
            let updated = sqlx::query(
                r"
                UPDATE commerce.quote_item SET quoted_unit_price = $3
                WHERE quote_id = $1 AND product_id = $2
                ",
            )
            .bind(id)
            .bind(price.product_id)
            .bind(price.quoted_unit_price)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(format!(
                    "quote {id} has no item for product {}",
                    price.product_id
                )));
            }
        }

        sqlx::query("UPDATE commerce.quote_request SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(to)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Turn a quote into a pending order.
    ///
    /// Items with an agreed `quoted_unit_price` keep it; the rest are priced
    /// for the quote's distributor at conversion time. The order insert and the
    /// quote update commit together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown quotes,
    /// `RepositoryError::Conflict` if the quote is not convertible or
    /// references a product that is no longer active.
    #[instrument(skip(self, source, note))]
    pub async fn convert<S>(
        &self,
        id: QuoteId,
        source: &S,
        note: Option<&str>,
    ) -> Result<OrderDetail, RepositoryError>
    where
        S: PricingSource<Error = RepositoryError>,
    {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {QUOTE_COLUMNS} FROM commerce.quote_request WHERE id = $1 FOR UPDATE"
        );
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        if !quote.status.can_convert() {
            return Err(RepositoryError::Conflict(format!(
                "quote {id} is {} and cannot be converted",
                quote.status
            )));
        }

        let items = self.items(id).await?;
        if items.is_empty() {
            return Err(RepositoryError::Conflict(format!("quote {id} has no items")));
        }

        let mut lines = Vec::with_capacity(items.len());
        for item in &items {
            let product = source
                .product(item.product_id)
                .await?
                .ok_or_else(|| {
                    RepositoryError::Conflict(format!(
                        "product {} is no longer available",
                        item.product_id
                    ))
                })?;

            let price = price_quote_item(source, &product, quote.distributor_id, item).await;
            lines.push(PricedLine::new(&product, price).map_err(|e| too_large(id, &e))?);
        }
        let cart = PricedCart::from_lines(lines).map_err(|e| too_large(id, &e))?;

        let new_order = NewOrder {
            distributor_id: quote.distributor_id,
            customer_email: quote.customer_email,
            customer_name: quote.customer_name,
            cart,
            quote_id: Some(id),
            note: Some(note.map_or_else(|| format!("converted from quote {id}"), str::to_owned)),
        };
        let order_id = insert_order(&mut tx, &new_order).await?;

        sqlx::query(
            r"
            UPDATE commerce.quote_request
            SET status = $2, order_id = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(QuoteStatus::Converted)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(quote_id = %id, order_id = %order_id, "Quote converted to order");

        OrderRepository::new(self.pool)
            .get(order_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
