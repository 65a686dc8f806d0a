//! When steps for task ordering BDD scenarios.

use super::world::{BoardWorld, run_async};
use eyre::WrapErr;
use kanban::board::{domain::Category, services::CreateUserRequest};
use rstest_bdd_macros::when;

fn parse_category(label: &str) -> Result<Category, eyre::Report> {
    label
        .parse::<Category>()
        .map_err(|err| eyre::eyre!("invalid category in scenario: {err}"))
}

fn to_index(value: u64) -> Result<usize, eyre::Report> {
    usize::try_from(value).wrap_err("index does not fit in usize")
}

#[when(r#"another user registers with "{email}""#)]
fn another_user_registers(world: &mut BoardWorld, email: String) {
    let result = run_async(
        world
            .engine
            .create_user(CreateUserRequest::new("second-user", email, "salted-hash")),
    );
    world.registration_result = Some(result);
}

#[when(r#"a task "{content}" is created"#)]
fn task_is_created(world: &mut BoardWorld, content: String) -> Result<(), eyre::Report> {
    let user_id = world.user()?;
    let task = run_async(world.engine.create_task(user_id, content.clone()))
        .wrap_err("create task in scenario")?;
    world.tasks_by_content.insert(content, task.id());
    world.last_created_task = Some(task);
    Ok(())
}

#[when(r#"task "{content}" is moved within "{category}" from {source:u64} to {destination:u64}"#)]
fn task_moved_within(
    world: &mut BoardWorld,
    content: String,
    category: String,
    source: u64,
    destination: u64,
) -> Result<(), eyre::Report> {
    let user_id = world.user()?;
    let task_id = world.task(&content)?;
    let result = run_async(world.engine.move_within_category(
        user_id,
        task_id,
        to_index(source)?,
        to_index(destination)?,
        parse_category(&category)?,
    ));
    world.move_results.push(result);
    Ok(())
}

#[when(
    r#"task "{content}" is moved from "{source_category}" index {source:u64} to "{destination_category}" index {destination:u64}"#
)]
fn task_moved_across(
    world: &mut BoardWorld,
    content: String,
    source_category: String,
    source: u64,
    destination_category: String,
    destination: u64,
) -> Result<(), eyre::Report> {
    let user_id = world.user()?;
    let task_id = world.task(&content)?;
    let result = run_async(world.engine.move_across_categories(
        user_id,
        task_id,
        to_index(source)?,
        to_index(destination)?,
        parse_category(&source_category)?,
        parse_category(&destination_category)?,
    ));
    world.move_results.push(result);
    Ok(())
}
