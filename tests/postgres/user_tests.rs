//! `PostgreSQL` integration tests for user registration.

use kanban::board::{
    domain::{Category, UserId},
    services::{CreateUserRequest, OrderingError},
};
use rstest::rstest;

use crate::postgres::helpers::{BoxError, PgContext, context, unique_email};

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_create_user_initializes_empty_lists(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let user = ctx
        .engine
        .create_user(CreateUserRequest::new("alice", unique_email("alice"), "hash"))
        .await?;

    let board = ctx.engine.list_tasks(user.id()).await?;

    let columns: Vec<Category> = board.columns().map(|(category, _)| category).collect();
    assert_eq!(columns, Category::ALL);
    assert_eq!(board.task_count(), 0);
    Ok(())
}

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_duplicate_email_is_rejected(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let email = unique_email("dup");
    let original = ctx
        .engine
        .create_user(CreateUserRequest::new("first", email.clone(), "hash"))
        .await?;

    let duplicate = ctx
        .engine
        .create_user(CreateUserRequest::new(
            "second",
            email.to_uppercase(),
            "hash",
        ))
        .await;

    assert!(matches!(duplicate, Err(OrderingError::DuplicateEmail(_))));
    let found = ctx
        .engine
        .find_user_by_email(&email)
        .await?
        .ok_or("original user should remain")?;
    assert_eq!(found.id(), original.id());
    assert_eq!(found.username().as_str(), "first");
    Ok(())
}

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_unknown_user_is_reported(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let stranger = UserId::new();

    let listed = ctx.engine.list_tasks(stranger).await;
    let created = ctx.engine.create_task(stranger, "orphan").await;

    assert!(matches!(listed, Err(OrderingError::UserNotFound(id)) if id == stranger));
    assert!(matches!(created, Err(OrderingError::UserNotFound(id)) if id == stranger));
    Ok(())
}
