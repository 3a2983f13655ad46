//! Secure TODO Vault - TODO List Store
//!
//! In-memory list that is only changed after the matching write has reached
//! storage. Mutations run one at a time through an async mutation lock, so
//! overlapping calls cannot drop each other's changes.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::{TodoError, TodoResult};
use crate::models::{validate_description, TodoItem};
use crate::repository::TodoRepository;

/// Seeded on first launch: (description, completed)
pub const SAMPLE_TODOS: [(&str, bool); 3] = [
    ("Task 1: Create a secure TODO app", false),
    ("Task 2: Swipe left on any task to delete it", false),
    (
        "Task 3: Tap the checkbox to toggle completion, tap the text to edit",
        true,
    ),
];

/// Observable store state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListState {
    pub todos: Vec<TodoItem>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// TODO list store
pub struct TodoListStore {
    repository: Arc<TodoRepository>,
    clock: Arc<dyn Clock>,
    state: RwLock<TodoListState>,
    mutation: Mutex<()>,
}

impl TodoListStore {
    pub fn new(repository: Arc<TodoRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            state: RwLock::new(TodoListState::default()),
            mutation: Mutex::new(()),
        }
    }

    pub fn todos(&self) -> Vec<TodoItem> {
        self.state.read().todos.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    pub fn snapshot(&self) -> TodoListState {
        self.state.read().clone()
    }

    /// Append a new item; returns the committed item
    pub async fn add_todo(&self, description: &str) -> TodoResult<TodoItem> {
        let description = validate_description(description)?;
        let item = TodoItem::new(description, self.clock.now_millis());

        let added = item.clone();
        self.commit_with(move |todos| {
            let mut updated = todos.to_vec();
            updated.push(added);
            updated
        })
        .await?;

        Ok(item)
    }

    /// Replace the description of the matching item
    pub async fn update_todo(&self, id: &str, description: &str) -> TodoResult<()> {
        let description = validate_description(description)?;

        self.commit_with(|todos| {
            todos
                .iter()
                .map(|todo| {
                    if todo.id == id {
                        TodoItem {
                            description: description.clone(),
                            ..todo.clone()
                        }
                    } else {
                        todo.clone()
                    }
                })
                .collect()
        })
        .await
    }

    /// Flip the completion flag of the matching item
    pub async fn toggle_todo(&self, id: &str) -> TodoResult<()> {
        self.commit_with(|todos| {
            todos
                .iter()
                .map(|todo| {
                    if todo.id == id {
                        TodoItem {
                            is_completed: !todo.is_completed,
                            ..todo.clone()
                        }
                    } else {
                        todo.clone()
                    }
                })
                .collect()
        })
        .await
    }

    /// Remove the matching item
    pub async fn delete_todo(&self, id: &str) -> TodoResult<()> {
        self.commit_with(|todos| todos.iter().filter(|todo| todo.id != id).cloned().collect())
            .await
    }

    /// Replace the in-memory list with what storage holds
    pub async fn load_todos(&self) -> TodoResult<()> {
        let _guard = self.mutation.lock().await;
        self.begin();

        match self.repository.load_todos().await {
            Ok(todos) => {
                self.commit(todos);
                Ok(())
            }
            Err(e) => Err(self.fail("loadTodos", e)),
        }
    }

    /// Seed sample items on first launch, otherwise load
    pub async fn initialize_with_sample_data(&self) -> TodoResult<()> {
        let _guard = self.mutation.lock().await;
        self.begin();

        match self.initialize_locked().await {
            Ok(todos) => {
                self.commit(todos);
                Ok(())
            }
            Err(e) => Err(self.fail("initializeWithSampleData", e)),
        }
    }

    async fn initialize_locked(&self) -> TodoResult<Vec<TodoItem>> {
        if !self.repository.is_first_launch().await? {
            return self.repository.load_todos().await;
        }

        let now = self.clock.now_millis();
        let samples: Vec<TodoItem> = SAMPLE_TODOS
            .iter()
            .map(|(description, completed)| TodoItem {
                is_completed: *completed,
                ..TodoItem::new(*description, now)
            })
            .collect();

        self.repository.save_todos(&samples).await?;
        self.repository.set_first_launch_complete().await?;
        log::info!("[TodoListStore] first launch, seeded {} sample items", samples.len());

        Ok(samples)
    }

    /// Persist `change(current)` and only then make it the in-memory list
    async fn commit_with<F>(&self, change: F) -> TodoResult<()>
    where
        F: FnOnce(&[TodoItem]) -> Vec<TodoItem>,
    {
        let _guard = self.mutation.lock().await;
        self.begin();

        let updated = change(&self.state.read().todos);

        match self.repository.save_todos(&updated).await {
            Ok(()) => {
                self.commit(updated);
                Ok(())
            }
            Err(e) => Err(self.fail("saveTodos", e)),
        }
    }

    fn begin(&self) {
        let mut state = self.state.write();
        state.is_loading = true;
        state.error = None;
    }

    fn commit(&self, todos: Vec<TodoItem>) {
        let mut state = self.state.write();
        state.todos = todos;
        state.is_loading = false;
    }

    fn fail(&self, operation: &str, e: TodoError) -> TodoError {
        log::error!("[TodoListStore] {} failed: {}", operation, e);
        let mut state = self.state.write();
        state.error = Some(e.to_string());
        state.is_loading = false;
        e
    }
}
