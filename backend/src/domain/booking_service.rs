//! Order creation and listing.
//!
//! `create_order` is the only path that issues tickets. Each requested seat
//! is range-checked against the journey's train, then the whole order is
//! written in one transaction; the unique constraint on
//! `tickets(journey_id, cargo, seat)` decides contended seats.

use chrono::Utc;
use tracing::{info, warn};

use crate::db::{DbConnection, ValidatedTicket};
use crate::domain::error::BookingError;
use crate::domain::seating;
use shared::{CreateOrderRequest, Order, OrderListResponse, OrderResponse, PaginationInfo};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct BookingService {
    db: DbConnection,
}

impl BookingService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create an order with all of its tickets, atomically.
    ///
    /// Any failure, whether a range error, an unknown journey, or a seat
    /// collision, leaves no order and no ticket behind.
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, BookingError> {
        info!(
            "Creating order for user {} with {} ticket(s)",
            request.user_id,
            request.tickets.len()
        );

        if request.tickets.is_empty() {
            return Err(BookingError::InvalidInput {
                field: "tickets",
                message: "an order must contain at least one ticket".to_string(),
            });
        }

        let mut validated = Vec::with_capacity(request.tickets.len());
        for ticket in &request.tickets {
            let journey = self
                .db
                .get_journey(ticket.journey_id)
                .await?
                .ok_or_else(|| BookingError::not_found("journey", ticket.journey_id))?;
            let train = self
                .db
                .get_train(journey.train_id)
                .await?
                .ok_or_else(|| BookingError::not_found("train", journey.train_id))?;

            seating::validate_seat(ticket.cargo, ticket.seat, &train)?;

            validated.push(ValidatedTicket {
                journey_id: ticket.journey_id,
                cargo: ticket.cargo,
                seat: ticket.seat,
            });
        }

        let created_at = Utc::now().to_rfc3339();
        let order = self
            .db
            .insert_order_with_tickets(request.user_id, &created_at, &validated)
            .await
            .map_err(|e| {
                if let BookingError::SeatAlreadyTaken { journey_id, cargo, seat } = &e {
                    warn!(
                        "Seat collision on journey {}: cargo {}, seat {}",
                        journey_id, cargo, seat
                    );
                }
                e
            })?;

        info!(
            "Created order {} with {} ticket(s)",
            order.id,
            order.tickets.len()
        );

        Ok(OrderResponse {
            order,
            success_message: "Order created successfully".to_string(),
        })
    }

    /// List a user's orders with page-number pagination, newest first.
    pub async fn list_orders(
        &self,
        user_id: i64,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<OrderListResponse, BookingError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        // page is client-supplied and may be arbitrarily large
        let offset = page.saturating_sub(1).saturating_mul(page_size);

        let total = self.db.count_orders(user_id).await?;
        let orders = self.db.list_orders(user_id, page_size, offset).await?;

        info!(
            "Listing orders for user {}: page {} ({} of {} total)",
            user_id,
            page,
            orders.len(),
            total
        );

        Ok(OrderListResponse {
            orders,
            pagination: PaginationInfo {
                page,
                page_size,
                total,
                has_more: (offset as i64 + page_size as i64) < total,
            },
        })
    }

    pub async fn get_order(&self, order_id: i64) -> Result<Order, BookingError> {
        self.db
            .get_order(order_id)
            .await?
            .ok_or_else(|| BookingError::not_found("order", order_id))
    }
}
