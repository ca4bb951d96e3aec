//! Facade tests over the in-memory executor
//!
//! Records are declared through `listquery::prelude` only, the way a
//! downstream crate would.

use listquery::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[model]
#[record(table = "articles")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub views: i64,
    pub published: bool,
}

#[model]
#[derive(PartialEq)]
pub struct ArticleCard {
    pub id: i64,
    pub title: String,
    pub views: String,
}

fn articles() -> Vec<Article> {
    (1..=12)
        .map(|i| Article {
            id: i,
            title: format!("Rust tip #{}", i),
            views: i * 100,
            published: i % 3 != 0,
        })
        .collect()
}

fn executor() -> Arc<MemoryExecutor> {
    Arc::new(MemoryExecutor::new().with_records(&articles()))
}

#[tokio::test]
async fn test_options_from_query_config() {
    let exec = executor();
    let config = QueryConfig {
        max_limit: 5,
        default_limit: 3,
        ..QueryConfig::default()
    };

    let options = Options::from_config(&config).page_info(PageInfo::new(1, 40));
    let (page, total) = QueryBuilder::new(exec.clone(), Article::default(), options)
        .build()
        .await
        .get_result()
        .await
        .unwrap();

    assert_eq!(total, 12);
    assert_eq!(page.len(), 3);
}

#[tokio::test]
async fn test_boolean_model_field_filters() {
    let exec = executor();
    let model = Article {
        published: true,
        ..Article::default()
    };
    let (page, total) = QueryBuilder::new(exec.clone(), model, Options::new())
        .build()
        .await
        .get_result()
        .await
        .unwrap();

    assert_eq!(total, 8);
    assert!(page.iter().all(|a| a.published));
}

#[tokio::test]
async fn test_cards_from_query() {
    let exec = executor();
    let cache = Arc::new(FieldMapCache::new());
    let options = Options::new()
        .page_info(PageInfo::new(1, 3).with_order("views:desc"))
        .allowed_sorts(&["views"]);

    let (cards, total) = QueryBuilder::new(exec.clone(), Article::default(), options)
        .with_field_cache(cache.clone())
        .build()
        .await
        .map_to::<ArticleCard>(&[])
        .await
        .unwrap();

    assert_eq!(total, 12);
    assert_eq!(
        cards[0],
        ArticleCard {
            id: 12,
            title: "Rust tip #12".to_string(),
            views: "1200".to_string(),
        }
    );
    assert_eq!(cache.builds(), 1);
}

#[tokio::test]
async fn test_scalar_target_after_successful_count() {
    let exec = executor();
    let options = Options::new()
        .context(QueryContext::new().with_timeout(Duration::from_secs(5)))
        .default_order("id");
    let builder = QueryBuilder::new(exec.clone(), Article::default(), options)
        .build()
        .await;
    assert_eq!(builder.total(), 12);

    let err = builder
        .map_to::<u64>(&[])
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::TargetNotRecord(_)));
}

#[test]
fn test_shape_of_declared_record() {
    let shape = Article::record_shape();
    assert_eq!(shape.table, "articles");
    assert_eq!(shape.field_names().collect::<Vec<_>>(), vec!["id", "title", "views", "published"]);
    assert_eq!(ArticleCard::record_shape().table, "article_cards");
}
