//! Task edit form prefill

use super::html::{AlertKind, alert, escape_html};
use super::{Effect, RenderContext, Rendered};
use crate::page::attrs;
use crate::payload::{self, Task};
use serde_json::Value;

/// Form fields filled from a task record
pub const PREFILL_FIELDS: [&str; 5] = ["title", "status", "description", "assigned_to", "due_date"];

const DEFAULT_STATUS: &str = "todo";

pub(super) fn task_prefill(ctx: &RenderContext<'_>) -> Rendered {
    let task_id = ctx.target.data(attrs::TASK_ID);
    let form = ctx
        .target
        .data(attrs::PREFILL_FORM)
        .filter(|selector| ctx.page.element(selector).is_some());

    let (Some(task_id), Some(form)) = (task_id, form) else {
        return Rendered::html(alert(AlertKind::Warning, "Unable to load task details."));
    };

    let Some(task) = find_task(ctx.payload, task_id) else {
        return Rendered::html(alert(
            AlertKind::Warning,
            &format!("Task {} not found.", escape_html(task_id)),
        ));
    };
    let task: Task = payload::record(task);

    let values = [
        task.title.unwrap_or_default(),
        task.status
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        task.description.unwrap_or_default(),
        task.assigned_to.map(|id| id.to_string()).unwrap_or_default(),
        date_for_input(task.due_date.as_deref()),
    ];

    let mut effects: Vec<Effect> = PREFILL_FIELDS
        .iter()
        .zip(values)
        .map(|(name, value)| Effect::SetField {
            form: form.to_string(),
            name: (*name).to_string(),
            value,
        })
        .collect();
    effects.push(Effect::HideTarget);

    Rendered {
        html: String::new(),
        effects,
    }
}

/// Locate a task by id across the payload shapes the API has used
///
/// Candidates are searched in order: a top-level array, `data`, `data.tasks`,
/// then `tasks`; the first id match wins. This is a compatibility shim over
/// historical response shapes rather than a contract.
pub fn find_task<'a>(payload: &'a Value, task_id: &str) -> Option<&'a Value> {
    let pools = [
        payload.as_array(),
        payload.get("data").and_then(Value::as_array),
        payload
            .get("data")
            .and_then(|data| data.get("tasks"))
            .and_then(Value::as_array),
        payload.get("tasks").and_then(Value::as_array),
    ];

    pools
        .into_iter()
        .flatten()
        .find_map(|pool| pool.iter().find(|item| id_matches(item, task_id)))
}

fn id_matches(item: &Value, task_id: &str) -> bool {
    match item.get("id") {
        Some(Value::String(id)) => id == task_id,
        Some(Value::Number(id)) => id.to_string() == task_id,
        _ => false,
    }
}

/// `YYYY-MM-DD` prefix of a date or timestamp, as date inputs expect
fn date_for_input(raw: Option<&str>) -> String {
    raw.map(|raw| raw.chars().take(10).collect())
        .unwrap_or_default()
}
