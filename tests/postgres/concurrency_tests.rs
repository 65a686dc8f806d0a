//! `PostgreSQL` integration tests for row locking between concurrent movers.

use std::collections::HashMap;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use kanban::board::{
    domain::{Category, Task, TaskId, TaskOrder},
    ports::{BoardStore, BoardStoreError},
    services::OrderingError,
};
use rstest::rstest;

use crate::postgres::helpers::{BoxError, PgContext, context, user_with_tasks};
use crate::test_helpers::ensure_board_consistent;

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_stale_concurrent_move_is_rejected(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let (user_id, task_ids) = user_with_tasks(&ctx.engine, &["A", "B", "C"]).await?;
    let a = *task_ids.first().ok_or("expected a task")?;

    let first = tokio::spawn({
        let mover = Arc::clone(&ctx.engine);
        async move {
            mover
                .move_within_category(user_id, a, 0, 2, Category::Todo)
                .await
        }
    });
    let second = tokio::spawn({
        let mover = Arc::clone(&ctx.engine);
        async move {
            mover
                .move_within_category(user_id, a, 0, 1, Category::Todo)
                .await
        }
    });
    let outcomes = [first.await?, second.await?];

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1, "exactly one stale mover may succeed");
    assert!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(OrderingError::is_retryable_after_refresh)
    );
    ensure_board_consistent(&*ctx.engine, user_id, &task_ids).await?;
    Ok(())
}

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_opposite_cross_moves_complete(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let (user_id, task_ids) = user_with_tasks(&ctx.engine, &["A", "B"]).await?;
    let [a, b] =
        <[TaskId; 2]>::try_from(task_ids.as_slice()).map_err(|_| "expected two tasks")?;
    ctx.engine
        .move_across_categories(user_id, b, 1, 0, Category::Todo, Category::Done)
        .await?;

    let forward = tokio::spawn({
        let mover = Arc::clone(&ctx.engine);
        async move {
            mover
                .move_across_categories(user_id, a, 0, 0, Category::Todo, Category::Done)
                .await
        }
    });
    let backward = tokio::spawn({
        let mover = Arc::clone(&ctx.engine);
        async move {
            mover
                .move_across_categories(user_id, b, 0, 0, Category::Done, Category::Todo)
                .await
        }
    });
    let forward_outcome = forward.await?;
    let backward_outcome = backward.await?;

    assert!(forward_outcome.is_ok() || backward_outcome.is_ok());
    ensure_board_consistent(&*ctx.engine, user_id, &task_ids).await?;
    Ok(())
}

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_concurrent_inserts_are_all_listed(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let (user_id, _) = user_with_tasks(&ctx.engine, &[]).await?;

    let handles: Vec<_> = (0..8)
        .map(|index| {
            let mover = Arc::clone(&ctx.engine);
            tokio::spawn(async move { mover.create_task(user_id, format!("task {index}")).await })
        })
        .collect();
    let mut created = Vec::with_capacity(handles.len());
    for handle in handles {
        created.push(handle.await??.id());
    }

    let board = ensure_board_consistent(&*ctx.engine, user_id, &created).await?;
    assert_eq!(board.column(Category::Todo).len(), 8);
    Ok(())
}

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_snapshot_does_not_observe_a_move_committed_mid_read(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let (user_id, task_ids) = user_with_tasks(&ctx.engine, &["A", "B", "C"]).await?;
    let b = *task_ids.get(1).ok_or("expected three tasks")?;
    let (first_read_tx, first_read_rx) = mpsc::channel::<()>();
    let (moved_tx, moved_rx) = mpsc::channel::<()>();

    let reader = tokio::spawn({
        let store = Arc::clone(&ctx.store);
        async move {
            store
                .snapshot(
                    move |unit| -> Result<(Vec<TaskOrder>, HashMap<TaskId, Task>), BoardStoreError> {
                        let mut orders = vec![unit.order(user_id, Category::Todo)?];
                        first_read_tx.send(()).map_err(BoardStoreError::persistence)?;
                        moved_rx
                            .recv_timeout(Duration::from_secs(10))
                            .map_err(BoardStoreError::persistence)?;
                        for category in [Category::InProgress, Category::Testing, Category::Done] {
                            orders.push(unit.order(user_id, category)?);
                        }
                        Ok((orders, unit.tasks_by_user(user_id)?))
                    },
                )
                .await
        }
    });

    tokio::task::spawn_blocking(move || first_read_rx.recv()).await??;
    ctx.engine
        .move_across_categories(user_id, b, 1, 0, Category::Todo, Category::Testing)
        .await?;
    moved_tx.send(())?;
    let (orders, tasks) = reader.await??;

    let placements: Vec<Category> = orders
        .iter()
        .filter(|order| order.contains(b))
        .map(TaskOrder::category)
        .collect();
    assert_eq!(placements, [Category::Todo]);
    let seen = tasks.get(&b).ok_or("moved task should be readable")?;
    assert_eq!(seen.category(), Category::Todo);

    let board = ensure_board_consistent(&*ctx.engine, user_id, &task_ids).await?;
    assert_eq!(board.task_ids(Category::Testing), vec![b]);
    Ok(())
}

#[rstest]
#[ignore = "needs KANBAN_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn postgres_listing_during_cross_moves_is_never_torn(
    #[future] context: Result<PgContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context.await?;
    let (user_id, task_ids) = user_with_tasks(&ctx.engine, &["A", "B", "C", "D"]).await?;
    let a = *task_ids.first().ok_or("expected four tasks")?;

    let mover = tokio::spawn({
        let walker = Arc::clone(&ctx.engine);
        async move {
            let mut from = (Category::Todo, Category::Done);
            for _ in 0..20 {
                let (source, destination) = from;
                let board = walker.list_tasks(user_id).await?;
                let index = board
                    .task_ids(source)
                    .iter()
                    .position(|id| *id == a)
                    .ok_or(OrderingError::TaskNotFound(a))?;
                walker
                    .move_across_categories(user_id, a, index, 0, source, destination)
                    .await?;
                from = (destination, source);
            }
            Ok::<(), OrderingError>(())
        }
    });

    while !mover.is_finished() {
        ensure_board_consistent(&*ctx.engine, user_id, &task_ids).await?;
    }
    mover.await??;
    ensure_board_consistent(&*ctx.engine, user_id, &task_ids).await?;
    Ok(())
}
