//! Built-in example: a database task and an API task that waits on it

use anyhow::{Context, Result};

use super::output::Output;
use super::query;
use crate::domain::Priority;
use crate::storage::{Plan, PlanFile, PlanTask};

/// Builds the example plan
pub fn example_plan() -> PlanFile {
    PlanFile {
        tasks: vec![
            PlanTask {
                key: "database".to_string(),
                title: "Setup Database".to_string(),
                assignee: "John".to_string(),
                priority: Some("high".to_string()),
                deadline: "2024-04-01".to_string(),
                status: None,
                depends_on: vec![],
                description: None,
                points: None,
            },
            PlanTask {
                key: "api".to_string(),
                title: "Create API".to_string(),
                assignee: "Alice".to_string(),
                priority: Some("medium".to_string()),
                deadline: "2024-04-15".to_string(),
                status: None,
                depends_on: vec!["database".to_string()],
                description: None,
                points: None,
            },
        ],
    }
}

pub fn run(output: &Output) -> Result<()> {
    let plan = Plan::build(example_plan(), Priority::Medium).context("Failed to build demo plan")?;
    query::order(output, &plan)
}
