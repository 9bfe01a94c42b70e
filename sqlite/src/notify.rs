//! Insert lifecycle notifications.
//!
//! A gateway announces every insert twice: once with the merged payload
//! before anything is filtered or sent, and once with the generated id and
//! the payload actually written. Subscribers implement [`Notifier`]; plain
//! closures work too.

use rowgate_core::Row;
use tracing::info;

/// An insert lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertEvent<'a> {
    /// Defaults merged, nothing filtered or sent yet.
    PreInsert { tag: &'a str, data: &'a Row },
    /// Row written with the generated `id`; `data` is the filtered payload.
    PostInsert { tag: &'a str, id: i64, data: &'a Row },
}

impl InsertEvent<'_> {
    /// The caller-supplied event tag.
    pub fn tag(&self) -> &str {
        match self {
            InsertEvent::PreInsert { tag, .. } | InsertEvent::PostInsert { tag, .. } => tag,
        }
    }

    pub fn data(&self) -> &Row {
        match self {
            InsertEvent::PreInsert { data, .. } | InsertEvent::PostInsert { data, .. } => data,
        }
    }

    /// `pre_insert_<tag>` or `post_insert_<tag>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rowgate_core::Row;
    /// use rowgate_sqlite::InsertEvent;
    ///
    /// let data = Row::new();
    /// let event = InsertEvent::PostInsert { tag: "order", id: 1, data: &data };
    /// assert_eq!(event.hook_name(), "post_insert_order");
    /// ```
    pub fn hook_name(&self) -> String {
        match self {
            InsertEvent::PreInsert { tag, .. } => format!("pre_insert_{tag}"),
            InsertEvent::PostInsert { tag, .. } => format!("post_insert_{tag}"),
        }
    }
}

/// Receives insert lifecycle events.
pub trait Notifier {
    fn notify(&self, event: &InsertEvent<'_>);
}

impl<F> Notifier for F
where
    F: Fn(&InsertEvent<'_>),
{
    fn notify(&self, event: &InsertEvent<'_>) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: &InsertEvent<'_>) {}
}

/// Logs every event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &InsertEvent<'_>) {
        match event {
            InsertEvent::PreInsert { data, .. } => {
                info!(hook = %event.hook_name(), columns = data.len(), "insert event")
            }
            InsertEvent::PostInsert { id, data, .. } => {
                info!(hook = %event.hook_name(), id, columns = data.len(), "insert event")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_hook_names() {
        let data = Row::new().with("a", 1);
        let pre = InsertEvent::PreInsert { tag: "order", data: &data };
        assert_eq!(pre.hook_name(), "pre_insert_order");
        assert_eq!(pre.tag(), "order");
        assert_eq!(pre.data(), &data);
    }

    #[test]
    fn test_closure_notifier() {
        let seen = RefCell::new(Vec::new());
        let notifier = |event: &InsertEvent<'_>| seen.borrow_mut().push(event.hook_name());
        let data = Row::new();
        notifier.notify(&InsertEvent::PreInsert { tag: "t", data: &data });
        notifier.notify(&InsertEvent::PostInsert { tag: "t", id: 3, data: &data });
        assert_eq!(*seen.borrow(), vec!["pre_insert_t", "post_insert_t"]);
    }
}
