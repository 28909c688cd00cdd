//! Counter and custom exercise CLI command handlers

use crate::api::{CustomExercise, ExerciseHandler};
use crate::cli::commands::{ChangeArg, CountArgs, CustomCommand};
use crate::cli::{confirm, resume_session};
use crate::core::counter::{ExerciseChange, ExerciseKind, OptimisticCounter};
use crate::error::Result;

/// Handle `peak count`
pub async fn handle_count(args: CountArgs) -> Result<()> {
    let (session, _) = resume_session().await?;
    let handler = ExerciseHandler::new(session.api());
    let kind = ExerciseKind::from(args.exercise);

    let mut counter = OptimisticCounter::from_server(handler.get_count(kind).await?);

    if let Some(change) = args.change {
        let change = ExerciseChange::from(change);
        let pending = counter.apply(change);
        let outcome = handler.update_count(kind, change).await;
        report_change(&kind.to_string(), change, counter.settle(pending, outcome))?;
    }

    println!("{}: {}", kind, counter.value());
    Ok(())
}

/// Handle `peak custom`
pub async fn handle_custom(command: CustomCommand) -> Result<()> {
    match command {
        CustomCommand::List => handle_list().await,
        CustomCommand::Add { name } => handle_add(name).await,
        CustomCommand::Delete { id, force } => handle_delete(id, force).await,
        CustomCommand::Count { id, change } => handle_custom_count(id, change).await,
    }
}

async fn handle_list() -> Result<()> {
    let (session, _) = resume_session().await?;
    let exercises = ExerciseHandler::new(session.api()).list_custom().await?;

    if exercises.is_empty() {
        println!("No custom exercises yet.");
        println!();
        println!("  Add one with: peak custom add <name>");
        return Ok(());
    }

    println!("{}", format_exercise_table(&exercises));
    Ok(())
}

async fn handle_add(name: String) -> Result<()> {
    let (session, _) = resume_session().await?;
    let message = ExerciseHandler::new(session.api())
        .add_custom(&name)
        .await?;
    println!("✓ {}", message);
    Ok(())
}

async fn handle_delete(id: i64, force: bool) -> Result<()> {
    let (session, _) = resume_session().await?;
    let handler = ExerciseHandler::new(session.api());

    let exercise = handler.find_custom(id).await?;

    // Confirm deletion unless --force
    if !force && !confirm(&format!("Delete '{}' ({} reps)?", exercise.name, exercise.count))? {
        println!("Cancelled.");
        return Ok(());
    }

    let message = handler.delete_custom(id).await?;
    println!("✓ {}", message);
    Ok(())
}

async fn handle_custom_count(id: i64, change: Option<ChangeArg>) -> Result<()> {
    let (session, _) = resume_session().await?;
    let handler = ExerciseHandler::new(session.api());

    let exercise = handler.find_custom(id).await?;
    let mut counter = OptimisticCounter::from_server(exercise.count);

    if let Some(change) = change {
        let change = ExerciseChange::from(change);
        let pending = counter.apply(change);
        let outcome = handler.update_custom(id, change).await;
        report_change(&exercise.name, change, counter.settle(pending, outcome))?;
    }

    println!("{}: {}", exercise.name, counter.value());
    Ok(())
}

fn report_change(name: &str, change: ExerciseChange, outcome: Result<i64>) -> Result<()> {
    match outcome {
        Ok(_) => {
            println!("✓ {} {}", name, change.label());
            Ok(())
        }
        Err(e) => {
            tracing::warn!(change = change.as_str(), "Counter change rolled back");
            Err(e)
        }
    }
}

fn format_exercise_table(exercises: &[CustomExercise]) -> String {
    let name_width = exercises
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut lines = vec![format!("  {:>4}  {:<name_width$}  {:>6}", "ID", "NAME", "COUNT")];
    lines.extend(
        exercises
            .iter()
            .map(|e| format!("  {:>4}  {:<name_width$}  {:>6}", e.id, e.name, e.count)),
    );
    lines.join("\n")
}
