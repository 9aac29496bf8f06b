use crate::storage::Database;
use crate::task::{Task, sort_for_display};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Export all uncompleted tasks as an HTML table. Returns how many tasks were
/// written.
pub fn export_tasks_to_html(db: &Database, path: &Path) -> Result<usize> {
    let mut tasks = db.list_uncompleted_tasks()?;
    sort_for_display(&mut tasks);

    let html = render_html(&tasks);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write export to {path:?}"))?;

    tracing::info!(count = tasks.len(), "exported tasks to {}", path.display());
    Ok(tasks.len())
}

fn render_html(tasks: &[Task]) -> String {
    let mut html = String::new();
    html.push_str("<html><body>");
    html.push_str("<h1>Uncompleted Tasks</h1>");
    html.push_str("<table border='1'>");
    html.push_str(
        "<tr><th>ID</th><th>Name</th><th>Description</th><th>Date</th><th>Time</th>\
         <th>Duration</th><th>Location</th><th>Status</th></tr>",
    );

    for task in tasks {
        html.push_str("<tr>");
        push_cell(&mut html, &task.id.to_string());
        push_cell(&mut html, &task.short_name);
        push_cell(&mut html, task.description.as_deref().unwrap_or(""));
        push_cell(&mut html, &task.date);
        push_cell(&mut html, &task.start_time);
        push_cell(&mut html, &format!("{}h", task.duration_hours));
        push_cell(&mut html, task.location.as_deref().unwrap_or(""));
        push_cell(&mut html, task.status.as_str());
        html.push_str("</tr>");
    }

    html.push_str("</table></body></html>");
    html
}

fn push_cell(html: &mut String, value: &str) {
    html.push_str("<td>");
    html.push_str(&escape(value));
    html.push_str("</td>");
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn sample(name: &str) -> Task {
        Task::new(
            name.to_string(),
            "01/07/2025".to_string(),
            "08:00".to_string(),
            1,
        )
    }

    #[test]
    fn test_render_includes_fields() {
        let mut task = sample("Standup");
        task.id = 3;
        task.location = Some("Room 2".to_string());

        let html = render_html(&[task]);
        assert!(html.contains("<td>3</td>"));
        assert!(html.contains("<td>Standup</td>"));
        assert!(html.contains("<td>Room 2</td>"));
        assert!(html.contains("<td>recorded</td>"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let task = sample("<script>alert(1)</script>");
        let html = render_html(&[task]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_export_skips_completed_tasks() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&sample("open")).unwrap();
        let mut done = sample("done");
        done.status = TaskStatus::Completed;
        db.insert_task(&done).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.html");
        let count = export_tasks_to_html(&db, &path).unwrap();

        assert_eq!(count, 1);
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("open"));
        assert!(!html.contains("done"));
    }
}
