//! Integration tests against PostgreSQL
//!
//! Requires `DATABASE_URL`; every test returns early when it is not set. The
//! fixture tables are created and seeded once per test binary and only read
//! afterwards.

use listquery::prelude::*;
use tokio::sync::OnceCell;

#[model]
#[record(table = "lq_test_users")]
pub struct TestUser {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    #[record(relation(table = "lq_test_orders", foreign_key = "user_id"))]
    pub orders: Vec<TestOrder>,
}

#[model]
#[record(table = "lq_test_orders")]
pub struct TestOrder {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
}

#[model]
pub struct UserListItem {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

static SEEDED: OnceCell<()> = OnceCell::const_new();

async fn setup_pool() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    // each test runs on its own runtime, so each gets its own pool
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    SEEDED.get_or_init(|| seed(&pool)).await;
    Some(pool)
}

async fn seed(pool: &PgPool) {
    let statements = [
        "DROP TABLE IF EXISTS lq_test_orders",
        "DROP TABLE IF EXISTS lq_test_users",
        "CREATE TABLE lq_test_users (
            id BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            age BIGINT NOT NULL,
            email TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE TABLE lq_test_orders (
            id BIGINT PRIMARY KEY,
            user_id BIGINT NOT NULL REFERENCES lq_test_users(id),
            amount DOUBLE PRECISION NOT NULL
        )",
        "INSERT INTO lq_test_users (id, name, age, email, created_at)
         SELECT i, 'user' || lpad(i::text, 2, '0'), 20 + i % 5,
                CASE WHEN i % 2 = 0 THEN 'user' || i || '@example.com' END,
                TIMESTAMPTZ '2024-01-01 00:00:00+00' + i * INTERVAL '1 day'
         FROM generate_series(1, 25) AS i",
        "INSERT INTO lq_test_orders (id, user_id, amount) VALUES (1, 1, 9.5), (2, 1, 20.0), (3, 2, 1.0)",
    ];
    for sql in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .expect("Failed to seed fixture tables");
    }
}

fn list_query(pool: PgPool) -> ListQuery {
    ListQuery::from_pool(pool, QueryConfig::default())
}

#[tokio::test]
async fn test_count_and_page() {
    let Some(pool) = setup_pool().await else { return };
    let listquery = list_query(pool);

    let options = listquery
        .options()
        .page_info(PageInfo::new(3, 10))
        .default_order("id");
    let (users, total) = listquery
        .query(TestUser::default(), options)
        .build()
        .await
        .get_result()
        .await
        .unwrap();

    assert_eq!(total, 25);
    assert_eq!(users.len(), 5);
    assert_eq!(users[0].name, "user21");
}

#[tokio::test]
async fn test_fuzzy_search_and_sorting() {
    let Some(pool) = setup_pool().await else { return };
    let listquery = list_query(pool);

    let options = listquery
        .options()
        .page_info(PageInfo::new(1, 50).with_key("user1").with_order("age:desc,name"))
        .likes(&["name", "email"])
        .allowed_sorts(&["age", "name"]);
    let (users, total) = listquery
        .query(TestUser::default(), options)
        .build()
        .await
        .get_result()
        .await
        .unwrap();

    assert_eq!(total, 10);
    assert_eq!(users[0].name, "user14");
    assert_eq!(users[0].age, 24);
}

#[tokio::test]
async fn test_model_filter_join_and_where() {
    let Some(pool) = setup_pool().await else { return };
    let listquery = list_query(pool);

    let model = TestUser {
        age: 21,
        ..TestUser::default()
    };
    let options = listquery
        .options()
        .join(
            JoinCondition::inner(
                "lq_test_orders o",
                "o.user_id = lq_test_users.id AND o.amount > ?",
            )
            .arg(5.0),
        )
        .where_filter(QueryFilter::raw("lq_test_users.id < ?", vec![10.into()]))
        .select_fields(&["id", "name"]);
    let (users, total) = listquery
        .query(model, options)
        .build()
        .await
        .get_result()
        .await
        .unwrap();

    // user01 has two orders above 5.0
    assert_eq!(total, 2);
    assert!(users.iter().all(|u| u.id == 1 && u.age == 0));
}

#[tokio::test]
async fn test_preload_orders() {
    let Some(pool) = setup_pool().await else { return };
    let listquery = list_query(pool);

    let options = listquery
        .options()
        .preloads(&["orders"])
        .default_order("id");
    let (users, _) = listquery
        .query(TestUser::default(), options)
        .build()
        .await
        .get_result()
        .await
        .unwrap();

    let mut amounts: Vec<f64> = users[0].orders.iter().map(|o| o.amount).collect();
    amounts.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(amounts, vec![9.5, 20.0]);
    assert!(users[2].orders.is_empty());
}

#[tokio::test]
async fn test_map_to_view_records() {
    let Some(pool) = setup_pool().await else { return };
    let listquery = list_query(pool);

    let options = listquery
        .options()
        .page_info(PageInfo::new(1, 2))
        .default_order("id");
    let mut rows: Vec<UserListItem> = Vec::new();
    let total = listquery
        .query(TestUser::default(), options)
        .build()
        .await
        .map_to_target(&mut rows, &["name"])
        .await
        .unwrap();

    assert_eq!(total, 25);
    assert_eq!(rows[1].id, "2");
    assert_eq!(rows[1].name, "");
    assert_eq!(rows[1].created_at, "2024-01-03T00:00:00Z");
}

#[tokio::test]
async fn test_invalid_join_table_issues_no_sql() {
    let Some(pool) = setup_pool().await else { return };
    let listquery = list_query(pool);

    let options = listquery
        .options()
        .join(JoinCondition::left("lq_test_orders; DROP TABLE lq_test_users", ""));
    let err = listquery
        .query(TestUser::default(), options)
        .build()
        .await
        .get_result()
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::JoinConditionInvalid(_)));
    listquery.health_check().await.unwrap();
}
