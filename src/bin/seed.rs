use chrono::{Duration, Utc};
use shareit::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let owner_id = ensure_user(&pool, "Olga Owner", "owner@example.com").await?;
    let booker_id = ensure_user(&pool, "Boris Booker", "booker@example.com").await?;
    let request_id = ensure_request(&pool, booker_id, "Looking for a ladder for a weekend").await?;
    let drill_id = seed_items(&pool, owner_id, request_id).await?;
    seed_booking(&pool, drill_id, booker_id).await?;

    println!("Seed completed. Owner ID: {owner_id}, Booker ID: {booker_id}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, name: &str, email: &str) -> anyhow::Result<Uuid> {
    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn ensure_request(
    pool: &sqlx::PgPool,
    requestor_id: Uuid,
    description: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM item_requests WHERE requestor_id = $1 AND description = $2",
    )
    .bind(requestor_id)
    .bind(description)
    .fetch_optional(pool)
    .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO item_requests (id, description, requestor_id) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(description)
        .bind(requestor_id)
        .execute(pool)
        .await?;
    Ok(id)
}

/// Returns the id of the drill, the item the demo booking is made against.
async fn seed_items(pool: &sqlx::PgPool, owner_id: Uuid, request_id: Uuid) -> anyhow::Result<Uuid> {
    let items = vec![
        ("Cordless drill", "18V drill with two batteries", true, None),
        ("Camping tent", "Four person tent, waterproof", true, None),
        ("Folding ladder", "Aluminium ladder, 3 metres", true, Some(request_id)),
        ("Pressure washer", "Currently under repair", false, None),
    ];

    let mut drill_id = None;
    for (name, description, available, request) in items {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM items WHERE owner_id = $1 AND name = $2")
                .bind(owner_id)
                .bind(name)
                .fetch_optional(pool)
                .await?;
        let id = match existing {
            Some((id,)) => id,
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO items (id, owner_id, request_id, name, description, available)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(id)
                .bind(owner_id)
                .bind(request)
                .bind(name)
                .bind(description)
                .bind(available)
                .execute(pool)
                .await?;
                id
            }
        };
        if drill_id.is_none() {
            drill_id = Some(id);
        }
    }

    println!("Seeded items");
    drill_id.ok_or_else(|| anyhow::anyhow!("no items seeded"))
}

async fn seed_booking(pool: &sqlx::PgPool, item_id: Uuid, booker_id: Uuid) -> anyhow::Result<()> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE item_id = $1 AND booker_id = $2")
            .bind(item_id)
            .bind(booker_id)
            .fetch_one(pool)
            .await?;
    if count > 0 {
        return Ok(());
    }

    let start = Utc::now() + Duration::days(1);
    sqlx::query(
        r#"
        INSERT INTO bookings (id, item_id, booker_id, start_date, end_date, status)
        VALUES ($1, $2, $3, $4, $5, 'WAITING')
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(item_id)
    .bind(booker_id)
    .bind(start)
    .bind(start + Duration::days(2))
    .execute(pool)
    .await?;

    println!("Seeded booking");
    Ok(())
}
