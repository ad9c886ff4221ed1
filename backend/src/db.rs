//! SQLite storage layer.
//!
//! `DbConnection` wraps the connection pool and owns all SQL. The one piece
//! of schema that carries correctness weight is the unique constraint on
//! `tickets(journey_id, cargo, seat)`: ticket inserts run unconditionally and
//! a constraint violation is translated to `SeatAlreadyTaken`, so concurrent
//! purchases race at the storage layer instead of in application code.

use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::domain::error::BookingError;
use shared::{
    CreateCrewRequest, CreateJourneyRequest, CreateRouteRequest, CreateStationRequest,
    CreateTrainRequest, CreateTrainTypeRequest, Crew, Journey, JourneyListItem, Order, Route,
    RouteListItem, Station, Ticket, Train, TrainType,
};

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:station.db";

/// Filters applied to journey listings.
#[derive(Debug, Clone, Default)]
pub struct JourneyFilter {
    pub train_ids: Option<Vec<i64>>,
    /// Calendar date the departure must fall on (UTC).
    pub departure_date: Option<chrono::NaiveDate>,
    /// Calendar date the arrival must fall on (UTC).
    pub arrival_date: Option<chrono::NaiveDate>,
}

/// A ticket request that already passed seat validation.
#[derive(Debug, Clone)]
pub struct ValidatedTicket {
    pub journey_id: i64,
    pub cargo: i64,
    pub seat: i64,
}

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self, BookingError> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize the standard database, honouring `STATION_DB_URL`.
    pub async fn init() -> Result<Self, BookingError> {
        let url =
            std::env::var("STATION_DB_URL").unwrap_or_else(|_| DATABASE_URL.to_string());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self, BookingError> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<(), BookingError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS stations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS routes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_id INTEGER NOT NULL REFERENCES stations(id) ON DELETE CASCADE,
                destination_id INTEGER NOT NULL REFERENCES stations(id) ON DELETE CASCADE,
                distance INTEGER NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS crews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS train_types (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS trains (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                cargo_num INTEGER NOT NULL,
                places_in_cargo INTEGER NOT NULL,
                train_type_id INTEGER NOT NULL REFERENCES train_types(id) ON DELETE CASCADE
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS journeys (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                route_id INTEGER NOT NULL REFERENCES routes(id) ON DELETE CASCADE,
                train_id INTEGER NOT NULL REFERENCES trains(id) ON DELETE CASCADE,
                departure_time TEXT NOT NULL,
                arrival_time TEXT NOT NULL
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS journey_crews (
                journey_id INTEGER NOT NULL REFERENCES journeys(id) ON DELETE CASCADE,
                crew_id INTEGER NOT NULL REFERENCES crews(id) ON DELETE CASCADE,
                PRIMARY KEY (journey_id, crew_id)
            );
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
            // The UNIQUE constraint below is the authority on seat
            // reservations; nothing else guards against double booking.
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cargo INTEGER NOT NULL,
                seat INTEGER NOT NULL,
                journey_id INTEGER NOT NULL REFERENCES journeys(id) ON DELETE CASCADE,
                order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                UNIQUE (journey_id, cargo, seat)
            );
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_journeys_departure
            ON journeys(departure_time DESC);
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_orders_user
            ON orders(user_id, created_at DESC);
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(pool).await?;
        }

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // --- stations ---

    pub async fn insert_station(
        &self,
        request: &CreateStationRequest,
    ) -> Result<Station, BookingError> {
        let result = sqlx::query(
            "INSERT INTO stations (name, latitude, longitude) VALUES (?, ?, ?)",
        )
        .bind(&request.name)
        .bind(request.latitude)
        .bind(request.longitude)
        .execute(&*self.pool)
        .await?;

        Ok(Station {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            latitude: request.latitude,
            longitude: request.longitude,
        })
    }

    pub async fn get_station(&self, id: i64) -> Result<Option<Station>, BookingError> {
        let row = sqlx::query("SELECT id, name, latitude, longitude FROM stations WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| Station {
            id: r.get("id"),
            name: r.get("name"),
            latitude: r.get("latitude"),
            longitude: r.get("longitude"),
        }))
    }

    pub async fn list_stations(&self) -> Result<Vec<Station>, BookingError> {
        let rows = sqlx::query("SELECT id, name, latitude, longitude FROM stations ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Station {
                id: r.get("id"),
                name: r.get("name"),
                latitude: r.get("latitude"),
                longitude: r.get("longitude"),
            })
            .collect())
    }

    // --- routes ---

    pub async fn insert_route(
        &self,
        request: &CreateRouteRequest,
    ) -> Result<Route, BookingError> {
        let result = sqlx::query(
            "INSERT INTO routes (source_id, destination_id, distance) VALUES (?, ?, ?)",
        )
        .bind(request.source_id)
        .bind(request.destination_id)
        .bind(request.distance)
        .execute(&*self.pool)
        .await?;

        Ok(Route {
            id: result.last_insert_rowid(),
            source_id: request.source_id,
            destination_id: request.destination_id,
            distance: request.distance,
        })
    }

    pub async fn get_route(&self, id: i64) -> Result<Option<Route>, BookingError> {
        let row = sqlx::query(
            "SELECT id, source_id, destination_id, distance FROM routes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| Route {
            id: r.get("id"),
            source_id: r.get("source_id"),
            destination_id: r.get("destination_id"),
            distance: r.get("distance"),
        }))
    }

    /// List routes with station names resolved, optionally filtered by
    /// source station ids.
    pub async fn list_routes(
        &self,
        source_ids: Option<&[i64]>,
    ) -> Result<Vec<RouteListItem>, BookingError> {
        let mut sql = String::from(
            r#"
            SELECT r.id, r.distance, src.name AS source_name, dst.name AS destination_name
            FROM routes r
            JOIN stations src ON src.id = r.source_id
            JOIN stations dst ON dst.id = r.destination_id
            "#,
        );

        if let Some(ids) = source_ids {
            // ids are already parsed integers, safe to inline
            let id_list = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            sql.push_str(&format!(" WHERE r.source_id IN ({})", id_list));
        }
        sql.push_str(" ORDER BY r.id");

        let rows = sqlx::query(&sql).fetch_all(&*self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|r| RouteListItem {
                id: r.get("id"),
                source: r.get("source_name"),
                destination: r.get("destination_name"),
                distance: r.get("distance"),
            })
            .collect())
    }

    // --- crews ---

    pub async fn insert_crew(&self, request: &CreateCrewRequest) -> Result<Crew, BookingError> {
        let result = sqlx::query("INSERT INTO crews (first_name, last_name) VALUES (?, ?)")
            .bind(&request.first_name)
            .bind(&request.last_name)
            .execute(&*self.pool)
            .await?;

        Ok(Crew {
            id: result.last_insert_rowid(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
        })
    }

    pub async fn get_crew(&self, id: i64) -> Result<Option<Crew>, BookingError> {
        let row = sqlx::query("SELECT id, first_name, last_name FROM crews WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| Crew {
            id: r.get("id"),
            first_name: r.get("first_name"),
            last_name: r.get("last_name"),
        }))
    }

    pub async fn list_crews(&self) -> Result<Vec<Crew>, BookingError> {
        let rows = sqlx::query("SELECT id, first_name, last_name FROM crews ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Crew {
                id: r.get("id"),
                first_name: r.get("first_name"),
                last_name: r.get("last_name"),
            })
            .collect())
    }

    // --- train types ---

    pub async fn insert_train_type(
        &self,
        request: &CreateTrainTypeRequest,
    ) -> Result<TrainType, BookingError> {
        let result = sqlx::query("INSERT INTO train_types (name) VALUES (?)")
            .bind(&request.name)
            .execute(&*self.pool)
            .await?;

        Ok(TrainType {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
        })
    }

    pub async fn get_train_type(&self, id: i64) -> Result<Option<TrainType>, BookingError> {
        let row = sqlx::query("SELECT id, name FROM train_types WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| TrainType {
            id: r.get("id"),
            name: r.get("name"),
        }))
    }

    pub async fn list_train_types(&self) -> Result<Vec<TrainType>, BookingError> {
        let rows = sqlx::query("SELECT id, name FROM train_types ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| TrainType {
                id: r.get("id"),
                name: r.get("name"),
            })
            .collect())
    }

    // --- trains ---

    pub async fn insert_train(
        &self,
        request: &CreateTrainRequest,
    ) -> Result<Train, BookingError> {
        let result = sqlx::query(
            r#"
            INSERT INTO trains (name, cargo_num, places_in_cargo, train_type_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&request.name)
        .bind(request.cargo_num)
        .bind(request.places_in_cargo)
        .bind(request.train_type_id)
        .execute(&*self.pool)
        .await?;

        Ok(Train {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            cargo_num: request.cargo_num,
            places_in_cargo: request.places_in_cargo,
            train_type_id: request.train_type_id,
        })
    }

    pub async fn get_train(&self, id: i64) -> Result<Option<Train>, BookingError> {
        let row = sqlx::query(
            "SELECT id, name, cargo_num, places_in_cargo, train_type_id FROM trains WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| Train {
            id: r.get("id"),
            name: r.get("name"),
            cargo_num: r.get("cargo_num"),
            places_in_cargo: r.get("places_in_cargo"),
            train_type_id: r.get("train_type_id"),
        }))
    }

    pub async fn list_trains(&self) -> Result<Vec<Train>, BookingError> {
        let rows = sqlx::query(
            "SELECT id, name, cargo_num, places_in_cargo, train_type_id FROM trains ORDER BY id",
        )
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Train {
                id: r.get("id"),
                name: r.get("name"),
                cargo_num: r.get("cargo_num"),
                places_in_cargo: r.get("places_in_cargo"),
                train_type_id: r.get("train_type_id"),
            })
            .collect())
    }

    // --- journeys ---

    /// Insert a journey and its crew assignments in one transaction.
    pub async fn insert_journey(
        &self,
        request: &CreateJourneyRequest,
        departure_time: &str,
        arrival_time: &str,
    ) -> Result<Journey, BookingError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO journeys (route_id, train_id, departure_time, arrival_time)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(request.route_id)
        .bind(request.train_id)
        .bind(departure_time)
        .bind(arrival_time)
        .execute(&mut *tx)
        .await?;

        let journey_id = result.last_insert_rowid();

        for crew_id in &request.crew_ids {
            sqlx::query("INSERT INTO journey_crews (journey_id, crew_id) VALUES (?, ?)")
                .bind(journey_id)
                .bind(crew_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Journey {
            id: journey_id,
            route_id: request.route_id,
            train_id: request.train_id,
            departure_time: departure_time.to_string(),
            arrival_time: arrival_time.to_string(),
            crew_ids: request.crew_ids.clone(),
        })
    }

    pub async fn get_journey(&self, id: i64) -> Result<Option<Journey>, BookingError> {
        let row = sqlx::query(
            "SELECT id, route_id, train_id, departure_time, arrival_time FROM journeys WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let crew_rows = sqlx::query("SELECT crew_id FROM journey_crews WHERE journey_id = ?")
            .bind(id)
            .fetch_all(&*self.pool)
            .await?;

        Ok(Some(Journey {
            id: r.get("id"),
            route_id: r.get("route_id"),
            train_id: r.get("train_id"),
            departure_time: r.get("departure_time"),
            arrival_time: r.get("arrival_time"),
            crew_ids: crew_rows.into_iter().map(|c| c.get("crew_id")).collect(),
        }))
    }

    pub async fn journey_crews(&self, journey_id: i64) -> Result<Vec<Crew>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.first_name, c.last_name
            FROM crews c
            JOIN journey_crews jc ON jc.crew_id = c.id
            WHERE jc.journey_id = ?
            ORDER BY c.id
            "#,
        )
        .bind(journey_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Crew {
                id: r.get("id"),
                first_name: r.get("first_name"),
                last_name: r.get("last_name"),
            })
            .collect())
    }

    /// List journeys with route/train context and ticket counts, most recent
    /// departure first.
    pub async fn list_journeys(
        &self,
        filter: &JourneyFilter,
    ) -> Result<Vec<JourneyListItem>, BookingError> {
        let mut sql = String::from(
            r#"
            SELECT j.id, j.departure_time, j.arrival_time,
                   t.name AS train_name, t.cargo_num, t.places_in_cargo,
                   r.id AS route_id, r.distance,
                   src.name AS source_name, dst.name AS destination_name,
                   (SELECT COUNT(*) FROM tickets WHERE tickets.journey_id = j.id) AS tickets_taken
            FROM journeys j
            JOIN trains t ON t.id = j.train_id
            JOIN routes r ON r.id = j.route_id
            JOIN stations src ON src.id = r.source_id
            JOIN stations dst ON dst.id = r.destination_id
            "#,
        );

        let mut clauses: Vec<String> = Vec::new();
        if let Some(ids) = &filter.train_ids {
            let id_list = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");
            clauses.push(format!("j.train_id IN ({})", id_list));
        }
        if filter.departure_date.is_some() {
            clauses.push("date(j.departure_time) = ?".to_string());
        }
        if filter.arrival_date.is_some() {
            clauses.push("date(j.arrival_time) = ?".to_string());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY j.departure_time DESC");

        let mut query = sqlx::query(&sql);
        if let Some(date) = filter.departure_date {
            query = query.bind(date.to_string());
        }
        if let Some(date) = filter.arrival_date {
            query = query.bind(date.to_string());
        }

        let rows = query.fetch_all(&*self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let cargo_num: i64 = r.get("cargo_num");
                let places_in_cargo: i64 = r.get("places_in_cargo");
                let capacity = cargo_num.saturating_mul(places_in_cargo);
                let tickets_taken: i64 = r.get("tickets_taken");
                JourneyListItem {
                    id: r.get("id"),
                    route: RouteListItem {
                        id: r.get("route_id"),
                        source: r.get("source_name"),
                        destination: r.get("destination_name"),
                        distance: r.get("distance"),
                    },
                    train_name: r.get("train_name"),
                    departure_time: r.get("departure_time"),
                    arrival_time: r.get("arrival_time"),
                    capacity,
                    tickets_taken,
                    seats_available: capacity - tickets_taken,
                }
            })
            .collect())
    }

    pub async fn count_tickets(&self, journey_id: i64) -> Result<i64, BookingError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM tickets WHERE journey_id = ?")
            .bind(journey_id)
            .fetch_one(&*self.pool)
            .await?;

        Ok(row.get("count"))
    }

    // --- orders and tickets ---

    /// Persist an order together with all of its tickets atomically.
    ///
    /// Tickets must already be range-validated. Uniqueness is left to the
    /// `tickets` constraint: a violation rolls back the whole order and
    /// surfaces as `SeatAlreadyTaken`.
    pub async fn insert_order_with_tickets(
        &self,
        user_id: i64,
        created_at: &str,
        tickets: &[ValidatedTicket],
    ) -> Result<Order, BookingError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO orders (user_id, created_at) VALUES (?, ?)")
            .bind(user_id)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

        let order_id = result.last_insert_rowid();
        let mut issued = Vec::with_capacity(tickets.len());

        for ticket in tickets {
            let inserted = sqlx::query(
                r#"
                INSERT INTO tickets (cargo, seat, journey_id, order_id)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(ticket.cargo)
            .bind(ticket.seat)
            .bind(ticket.journey_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await;

            let ticket_id = match inserted {
                Ok(result) => result.last_insert_rowid(),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    // tx drops here, rolling back the order and any
                    // previously inserted tickets
                    return Err(BookingError::SeatAlreadyTaken {
                        journey_id: ticket.journey_id,
                        cargo: ticket.cargo,
                        seat: ticket.seat,
                    });
                }
                Err(e) => return Err(e.into()),
            };

            issued.push(Ticket {
                id: ticket_id,
                cargo: ticket.cargo,
                seat: ticket.seat,
                journey_id: ticket.journey_id,
                order_id,
            });
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            user_id,
            created_at: created_at.to_string(),
            tickets: issued,
        })
    }

    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, BookingError> {
        let row = sqlx::query("SELECT id, user_id, created_at FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let tickets = self.order_tickets(id).await?;

        Ok(Some(Order {
            id: r.get("id"),
            user_id: r.get("user_id"),
            created_at: r.get("created_at"),
            tickets,
        }))
    }

    pub async fn count_orders(&self, user_id: i64) -> Result<i64, BookingError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM orders WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&*self.pool)
            .await?;

        Ok(row.get("count"))
    }

    /// List a user's orders, newest first, with their tickets attached.
    pub async fn list_orders(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Order>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, created_at
            FROM orders
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&*self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for r in rows {
            let id: i64 = r.get("id");
            let tickets = self.order_tickets(id).await?;
            orders.push(Order {
                id,
                user_id: r.get("user_id"),
                created_at: r.get("created_at"),
                tickets,
            });
        }

        Ok(orders)
    }

    async fn order_tickets(&self, order_id: i64) -> Result<Vec<Ticket>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT id, cargo, seat, journey_id, order_id
            FROM tickets
            WHERE order_id = ?
            ORDER BY cargo, seat
            "#,
        )
        .bind(order_id)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Ticket {
                id: r.get("id"),
                cargo: r.get("cargo"),
                seat: r.get("seat"),
                journey_id: r.get("journey_id"),
                order_id: r.get("order_id"),
            })
            .collect())
    }
}
