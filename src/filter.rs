//! Free-text search over task titles and descriptions

use crate::task::Task;

/// Case-insensitive substring match on title or description.
/// An empty query matches everything.
pub fn matches(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    task.title.to_lowercase().contains(&needle)
        || task
            .description()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

/// Tasks matching `query`, in their original order
pub fn filter_tasks<'a, I>(tasks: I, query: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|t| matches(t, query)).collect()
}
