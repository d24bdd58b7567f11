//! Query commands (order, ready, blocked, board, kpi, show, check)
//!
//! Every command renders a [`Plan`]'s graph; tasks are labelled with their
//! plan key where they have one.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde_json::json;

use super::output::Output;
use crate::domain::{Task, TaskId, TaskStatus};
use crate::storage::Plan;

/// Print every task in execution order
pub fn order(output: &Output, plan: &Plan) -> Result<()> {
    let graph = plan.graph();
    let tasks: Vec<&Task> = graph
        .topological_order()
        .into_iter()
        .filter_map(|id| graph.get_task(id))
        .collect();

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let mut item = task_json(plan, task);
                item["position"] = json!(i + 1);
                item
            })
            .collect();
        output.data(&items);
    } else if tasks.is_empty() {
        println!("No tasks.");
    } else {
        println!("Execution order ({}):", tasks.len());
        println!(
            "{:<4} {:<16} {:<9} {:<12} {:<17} TITLE",
            "#", "KEY", "PRIORITY", "STATUS", "DEADLINE"
        );
        println!("{}", "-".repeat(80));
        for (i, task) in tasks.iter().enumerate() {
            println!(
                "{:<4} {:<16} {:<9} {:<12} {:<17} {}",
                i + 1,
                label(plan, task.id()),
                task.priority(),
                task.status(),
                format_deadline(task.deadline()),
                task.title()
            );
        }
    }

    Ok(())
}

/// Show tasks ready to work on
pub fn ready(output: &Output, plan: &Plan) -> Result<()> {
    let graph = plan.graph();
    let ready_tasks: Vec<&Task> = graph
        .ready_tasks()
        .into_iter()
        .filter_map(|id| graph.get_task(id))
        .collect();

    if output.is_json() {
        let items: Vec<_> = ready_tasks.iter().map(|t| task_json(plan, t)).collect();
        output.data(&items);
    } else if ready_tasks.is_empty() {
        println!("No tasks ready to work on.");
    } else {
        println!("Ready tasks ({}):", ready_tasks.len());
        println!("{:<16} {:<9} {:<12} TITLE", "KEY", "PRIORITY", "ASSIGNEE");
        println!("{}", "-".repeat(60));
        for task in ready_tasks {
            println!(
                "{:<16} {:<9} {:<12} {}",
                label(plan, task.id()),
                task.priority(),
                assignee(task),
                task.title()
            );
        }
    }

    Ok(())
}

/// Show blocked tasks
///
/// A task is listed when its status is `blocked` or when it is unfinished
/// and waits on dependencies that are not done.
pub fn blocked(output: &Output, plan: &Plan) -> Result<()> {
    let graph = plan.graph();
    let mut waiting: HashMap<TaskId, Vec<TaskId>> =
        graph.blocked_tasks().into_iter().collect();
    let blocked_tasks: Vec<(&Task, Vec<String>)> = graph
        .topological_order()
        .into_iter()
        .filter_map(|id| graph.get_task(id))
        .filter_map(|task| {
            let unmet = waiting.remove(&task.id()).unwrap_or_default();
            if unmet.is_empty() && task.status() != TaskStatus::Blocked {
                return None;
            }
            let blockers = unmet.into_iter().map(|dep| label(plan, dep)).collect();
            Some((task, blockers))
        })
        .collect();

    if output.is_json() {
        let items: Vec<_> = blocked_tasks
            .iter()
            .map(|(task, blockers)| {
                json!({
                    "id": task.id(),
                    "key": plan.key_of(task.id()),
                    "title": task.title(),
                    "status": task.status(),
                    "reason": block_reason(task, blockers),
                    "blocked_by": blockers,
                })
            })
            .collect();
        output.data(&items);
    } else if blocked_tasks.is_empty() {
        println!("No blocked tasks.");
    } else {
        println!("Blocked tasks ({}):", blocked_tasks.len());
        println!("{:<16} {:<30} {:<13} BLOCKED BY", "KEY", "TITLE", "REASON");
        println!("{}", "-".repeat(80));
        for (task, blockers) in blocked_tasks {
            let blocked_by = if blockers.is_empty() {
                "-".to_string()
            } else {
                blockers.join(", ")
            };
            println!(
                "{:<16} {:<30} {:<13} {}",
                label(plan, task.id()),
                task.title(),
                block_reason(task, &blockers),
                blocked_by
            );
        }
    }

    Ok(())
}

/// Show tasks grouped by status
pub fn board(output: &Output, plan: &Plan) -> Result<()> {
    let graph = plan.graph();
    let columns = graph.board();

    if output.is_json() {
        let items: Vec<_> = columns
            .iter()
            .map(|column| {
                let tasks: Vec<_> = column
                    .tasks
                    .iter()
                    .filter_map(|id| graph.get_task(*id))
                    .map(|task| task_json(plan, task))
                    .collect();
                json!({
                    "status": column.status,
                    "tasks": tasks,
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} ({})",
            column.status.as_str().to_uppercase(),
            column.tasks.len()
        );
        for task in column.tasks.iter().filter_map(|id| graph.get_task(*id)) {
            let points = task
                .points()
                .map(|p| format!(" ({} pts)", p))
                .unwrap_or_default();
            println!(
                "  {:<16} [{}] {}{}",
                label(plan, task.id()),
                task.priority(),
                task.title(),
                points
            );
        }
    }

    Ok(())
}

/// Show completed work per assignee
pub fn kpi(output: &Output, plan: &Plan) -> Result<()> {
    let summary = plan.graph().assignee_summary();

    if output.is_json() {
        output.data(&summary);
    } else if summary.is_empty() {
        println!("No assigned tasks.");
    } else {
        println!("Team performance ({}):", summary.len());
        println!(
            "{:<16} {:>6} {:>9} {:>8}  LAST COMPLETED",
            "ASSIGNEE", "POINTS", "COMPLETED", "ASSIGNED"
        );
        println!("{}", "-".repeat(64));
        for member in summary {
            let last = member
                .last_completed_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<16} {:>6} {:>9} {:>8}  {}",
                member.assignee, member.points, member.completed, member.assigned, last
            );
        }
    }

    Ok(())
}

/// Show task details
pub fn show(output: &Output, plan: &Plan, key_or_id: &str) -> Result<()> {
    let graph = plan.graph();
    let task = plan
        .resolve(key_or_id)
        .and_then(|id| graph.get_task(id))
        .ok_or_else(|| anyhow::anyhow!("Task not found in plan: {}", key_or_id))?;

    let dependents: Vec<String> = graph
        .dependents(task.id())
        .into_iter()
        .map(|id| label(plan, id))
        .collect();

    if output.is_json() {
        let mut item = task_json(plan, task);
        item["dependents"] = json!(dependents);
        item["created_at"] = json!(task.created_at());
        item["updated_at"] = json!(task.updated_at());
        item["completed_at"] = json!(task.completed_at());
        output.data(&item);
        return Ok(());
    }

    println!("ID:          {}", task.id());
    if let Some(key) = plan.key_of(task.id()) {
        println!("Key:         {}", key);
    }
    println!("Title:       {}", task.title());
    println!("Assignee:    {}", assignee(task));
    println!("Priority:    {}", task.priority());
    println!("Status:      {}", task.status());
    println!("Deadline:    {}", format_deadline(task.deadline()));
    if let Some(points) = task.points() {
        println!("Points:      {}", points);
    }
    if let Some(description) = task.description() {
        println!("Description: {}", description);
    }

    let dependencies: Vec<String> = task
        .dependencies()
        .iter()
        .map(|id| label(plan, *id))
        .collect();
    if !dependencies.is_empty() {
        println!("Depends on:  {}", dependencies.join(", "));
    }
    if !dependents.is_empty() {
        println!("Needed by:   {}", dependents.join(", "));
    }

    Ok(())
}

/// Validate a plan file
pub fn check(output: &Output, plan: &Plan) -> Result<()> {
    let graph = plan.graph();

    if output.is_json() {
        output.data(&json!({
            "valid": true,
            "tasks": graph.len(),
            "dependencies": graph.edge_count(),
        }));
    } else {
        output.success(&format!(
            "Plan OK: {} tasks, {} dependencies",
            graph.len(),
            graph.edge_count()
        ));
    }

    Ok(())
}

fn task_json(plan: &Plan, task: &Task) -> serde_json::Value {
    let depends_on: Vec<String> = task
        .dependencies()
        .iter()
        .map(|id| label(plan, *id))
        .collect();

    json!({
        "id": task.id(),
        "key": plan.key_of(task.id()),
        "title": task.title(),
        "assignee": task.assignee(),
        "priority": task.priority(),
        "status": task.status(),
        "deadline": format_deadline(task.deadline()),
        "depends_on": depends_on,
        "points": task.points(),
        "description": task.description(),
    })
}

/// Plan key, or the task id when the task has none
fn label(plan: &Plan, id: TaskId) -> String {
    plan.key_of(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

fn block_reason(task: &Task, blockers: &[String]) -> &'static str {
    match (task.status() == TaskStatus::Blocked, blockers.is_empty()) {
        (true, true) => "status",
        (true, false) => "status, deps",
        _ => "dependencies",
    }
}

fn assignee(task: &Task) -> &str {
    if task.is_assigned() {
        task.assignee()
    } else {
        "-"
    }
}

fn format_deadline(deadline: NaiveDateTime) -> String {
    deadline.format("%Y-%m-%d %H:%M").to_string()
}
