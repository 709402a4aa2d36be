//! End-of-run report rendering.

use std::fmt::Write;

use tidepool_autoscale::ScalingRecord;
use tidepool_control::Controller;
use tidepool_state::{TaskRegistry, TaskStatus};

/// Render the full report: task outcomes followed by the scaling record.
pub fn render(controller: &Controller) -> String {
    let mut out = String::new();
    out.push_str(&render_task_table(controller.tasks()));
    out.push_str(&render_scaling_record(controller.record()));
    out
}

fn render_task_table(tasks: &TaskRegistry) -> String {
    let mut out = String::new();
    out.push_str("========== TASKS ==========\n");
    out.push_str("ID        STATUS        CAPACITY\n");
    for task in tasks.tasks() {
        let _ = writeln!(
            out,
            "{:<10}{:<14}{}",
            task.id,
            status_label(task.status),
            task.required_capacity
        );
    }

    let succeeded = tasks
        .tasks()
        .filter(|t| t.status == TaskStatus::Success)
        .count();
    let failed = tasks
        .tasks()
        .filter(|t| t.status == TaskStatus::Failed)
        .count();
    let _ = writeln!(
        out,
        "{} tasks: {succeeded} succeeded, {failed} failed\n",
        tasks.len()
    );
    out
}

fn render_scaling_record(record: &ScalingRecord) -> String {
    let mut out = String::new();
    out.push_str("========== SCALING ==========\n");
    for sample in record.samples() {
        let _ = writeln!(out, "t={:<8} active={}", format!("{}ms", sample.at), sample.active);
    }
    let _ = writeln!(
        out,
        "{} ticks, peak {} active, trough {} active",
        record.len(),
        record.peak().unwrap_or(0),
        record.trough().unwrap_or(0)
    );
    out
}

fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Created => "created",
        TaskStatus::Queued => "queued",
        TaskStatus::InExecution => "in execution",
        TaskStatus::Success => "success",
        TaskStatus::Failed => "failed",
    }
}
