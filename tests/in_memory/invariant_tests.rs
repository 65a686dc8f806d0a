//! Category consistency checks across sequences of operations.

use kanban::board::domain::{Category, TaskId};
use rstest::rstest;

use crate::in_memory::helpers::{MemoryEngine, engine, user_with_tasks};
use crate::test_helpers::ensure_board_consistent;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mixed_moves_keep_every_task_in_exactly_one_list(
    engine: MemoryEngine,
) -> Result<(), eyre::Report> {
    let (user_id, task_ids) =
        user_with_tasks(&engine, "mixed@example.com", &["A", "B", "C", "D", "E"]).await?;
    let [a, b, c, d, e] = <[TaskId; 5]>::try_from(task_ids.clone())
        .map_err(|_| eyre::eyre!("expected five tasks"))?;

    // TODO: [A, B, C, D, E]
    engine
        .move_across_categories(user_id, b, 1, 0, Category::Todo, Category::InProgress)
        .await?;
    // TODO: [A, C, D, E], IN PROGRESS: [B]
    engine
        .move_across_categories(user_id, d, 2, 1, Category::Todo, Category::InProgress)
        .await?;
    // TODO: [A, C, E], IN PROGRESS: [B, D]
    engine
        .move_within_category(user_id, d, 1, 0, Category::InProgress)
        .await?;
    // IN PROGRESS: [D, B]
    engine
        .move_across_categories(user_id, d, 0, 0, Category::InProgress, Category::Testing)
        .await?;
    engine
        .move_across_categories(user_id, e, 2, 0, Category::Todo, Category::Done)
        .await?;
    // Rejected: stale index, nothing changes.
    let stale = engine
        .move_across_categories(user_id, a, 1, 0, Category::Todo, Category::Done)
        .await;
    eyre::ensure!(stale.is_err(), "stale source index must be rejected");

    let board = ensure_board_consistent(&engine, user_id, &task_ids).await?;
    eyre::ensure!(board.task_ids(Category::Todo) == vec![a, c], "TODO column");
    eyre::ensure!(board.task_ids(Category::InProgress) == vec![b], "IN PROGRESS column");
    eyre::ensure!(board.task_ids(Category::Testing) == vec![d], "TESTING column");
    eyre::ensure!(board.task_ids(Category::Done) == vec![e], "DONE column");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_cross_move_leaves_no_partial_state(
    engine: MemoryEngine,
) -> Result<(), eyre::Report> {
    let (user_id, task_ids) =
        user_with_tasks(&engine, "rollback@example.com", &["A", "B", "C"]).await?;
    let moved = *task_ids.get(1).ok_or_else(|| eyre::eyre!("expected a task"))?;

    let result = engine
        .move_across_categories(user_id, moved, 1, 5, Category::Todo, Category::Testing)
        .await;

    eyre::ensure!(result.is_err(), "out-of-range destination must be rejected");
    let board = ensure_board_consistent(&engine, user_id, &task_ids).await?;
    eyre::ensure!(
        board.task_ids(Category::Todo) == task_ids,
        "source list must be restored"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn long_random_walk_stays_consistent(engine: MemoryEngine) -> Result<(), eyre::Report> {
    let contents = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"];
    let (user_id, task_ids) = user_with_tasks(&engine, "walk@example.com", &contents).await?;

    // Deterministic walk: step k moves the task at the head of the fullest
    // column into the next column, at a position derived from k.
    for step in 0..40_usize {
        let board = engine.list_tasks(user_id).await?;
        let (source, column) = board
            .columns()
            .max_by_key(|(_, tasks)| tasks.len())
            .ok_or_else(|| eyre::eyre!("board has no columns"))?;
        let task_id = column
            .first()
            .map(kanban::board::domain::Task::id)
            .ok_or_else(|| eyre::eyre!("fullest column is empty"))?;
        let destination = Category::ALL
            .into_iter()
            .cycle()
            .skip_while(|category| *category != source)
            .nth(1)
            .ok_or_else(|| eyre::eyre!("category cycle ended"))?;
        let destination_len = board.column(destination).len();
        let destination_index = step % (destination_len + 1);

        engine
            .move_across_categories(user_id, task_id, 0, destination_index, source, destination)
            .await?;
    }

    ensure_board_consistent(&engine, user_id, &task_ids).await?;
    Ok(())
}
