//! Presentation model for a list of todos with a search box.
//!
//! # Design
//! The view owns nothing but its search text. The todo collection and the
//! mutation callbacks belong to the caller; the view filters the former and
//! hands the latter through to each rendered item untouched. It never talks
//! to the server itself.

use crate::types::Todo;

/// Mutations a list item can request. Implemented by whoever owns the data.
pub trait TodoActions {
    fn toggle_completed(&self, id: &str, is_completed: bool);
    fn update_text(&self, id: &str, text: &str);
    fn delete(&self, id: &str);
}

/// Todos whose text contains `query`, ignoring case and the query's
/// surrounding whitespace. A blank query keeps everything. Input order is
/// preserved.
pub fn filter_todos<'a>(todos: &'a [Todo], query: &str) -> Vec<&'a Todo> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return todos.iter().collect();
    }
    todos
        .iter()
        .filter(|t| t.text.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListView {
    search: String,
}

impl TodoListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Re-derived on every call from the current collection and search text.
    pub fn visible<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        filter_todos(todos, &self.search)
    }

    /// One item per visible todo, each wired to the caller's callbacks.
    pub fn render<'a, A: TodoActions>(&self, todos: &'a [Todo], actions: &'a A) -> Vec<TodoItem<'a, A>> {
        self.visible(todos)
            .into_iter()
            .map(|todo| TodoItem { todo, actions })
            .collect()
    }
}

/// A rendered row: the todo plus pass-through callbacks.
#[derive(Debug)]
pub struct TodoItem<'a, A> {
    todo: &'a Todo,
    actions: &'a A,
}

impl<A: TodoActions> TodoItem<'_, A> {
    pub fn todo(&self) -> &Todo {
        self.todo
    }

    pub fn toggle_completed(&self, is_completed: bool) {
        self.actions.toggle_completed(&self.todo.id, is_completed);
    }

    pub fn update_text(&self, text: &str) {
        self.actions.update_text(&self.todo.id, text);
    }

    pub fn delete(&self) {
        self.actions.delete(&self.todo.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::RefCell;

    fn todo(id: &str, text: &str) -> Todo {
        Todo {
            id: id.to_string(),
            text: text.to_string(),
            is_completed: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn texts(todos: &[&Todo]) -> Vec<String> {
        todos.iter().map(|t| t.text.clone()).collect()
    }

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl TodoActions for Recorder {
        fn toggle_completed(&self, id: &str, is_completed: bool) {
            self.calls.borrow_mut().push(format!("toggle {id} {is_completed}"));
        }
        fn update_text(&self, id: &str, text: &str) {
            self.calls.borrow_mut().push(format!("text {id} {text}"));
        }
        fn delete(&self, id: &str) {
            self.calls.borrow_mut().push(format!("delete {id}"));
        }
    }

    #[test]
    fn filters_case_insensitively_in_order() {
        let todos = vec![todo("1", "Buy milk"), todo("2", "Clean house"), todo("3", "buy bread")];
        let found = filter_todos(&todos, "buy");
        assert_eq!(texts(&found), ["Buy milk", "buy bread"]);
    }

    #[test]
    fn query_is_trimmed_and_folded() {
        let todos = vec![todo("1", "Buy milk"), todo("2", "Clean house")];
        assert_eq!(texts(&filter_todos(&todos, "  HOUSE ")), ["Clean house"]);
    }

    #[test]
    fn blank_query_returns_everything() {
        let todos = vec![todo("1", "b"), todo("2", "a"), todo("3", "")];
        for query in ["", "   "] {
            assert_eq!(texts(&filter_todos(&todos, query)), ["b", "a", ""]);
        }
    }

    #[test]
    fn empty_text_matches_only_blank_query() {
        let todos = vec![todo("1", "")];
        assert!(filter_todos(&todos, "x").is_empty());
    }

    #[test]
    fn view_starts_empty_and_rederives() {
        let mut view = TodoListView::new();
        assert_eq!(view.search(), "");

        let mut todos = vec![todo("1", "Buy milk"), todo("2", "Clean house")];
        assert_eq!(view.visible(&todos).len(), 2);

        view.set_search("milk");
        assert_eq!(texts(&view.visible(&todos)), ["Buy milk"]);

        todos.push(todo("3", "Milk the cow"));
        assert_eq!(texts(&view.visible(&todos)), ["Buy milk", "Milk the cow"]);
    }

    #[test]
    fn items_forward_callbacks_unchanged() {
        let todos = vec![todo("a", "Buy milk"), todo("b", "Clean house")];
        let recorder = Recorder::default();
        let mut view = TodoListView::new();
        view.set_search("clean");

        let items = view.render(&todos, &recorder);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.todo().id, "b");

        item.toggle_completed(true);
        item.update_text("Clean garage");
        item.delete();

        assert_eq!(
            *recorder.calls.borrow(),
            ["toggle b true", "text b Clean garage", "delete b"]
        );
    }
}
