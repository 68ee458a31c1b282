use std::future::Future;

use crate::error::ApiResult;

/// LoadState
///
/// `Idle → Loading → {Ready, Failed}`. A later load starts over from `Loading`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// What a list view shows.
#[derive(Debug, PartialEq)]
pub enum ListRender<'a, T> {
    Loading,
    /// The static error message, with whatever the last successful load left behind.
    Failed { message: &'a str, stale: &'a [T] },
    Empty(&'a str),
    Items(&'a [T]),
}

/// ResourceList
///
/// Local copy of a remote collection. Every successful load replaces the whole
/// collection with the server's response; nothing is merged or patched.
#[derive(Debug, Clone)]
pub struct ResourceList<T> {
    items: Vec<T>,
    state: LoadState,
    error_message: String,
    empty_message: String,
}

impl<T> ResourceList<T> {
    pub fn new(error_message: impl Into<String>, empty_message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            error_message: error_message.into(),
            empty_message: empty_message.into(),
        }
    }

    pub async fn load<F>(&mut self, fetch: F)
    where
        F: Future<Output = ApiResult<Vec<T>>>,
    {
        self.state = LoadState::Loading;
        match fetch.await {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("list load failed: {}", e);
                self.state = LoadState::Failed(self.error_message.clone());
            }
        }
    }

    /// Marks the list failed without fetching, e.g. when no token is available.
    pub fn fail(&mut self) {
        self.state = LoadState::Failed(self.error_message.clone());
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn render(&self) -> ListRender<'_, T> {
        match &self.state {
            LoadState::Idle | LoadState::Loading => ListRender::Loading,
            LoadState::Failed(message) => ListRender::Failed {
                message,
                stale: &self.items,
            },
            LoadState::Ready if self.items.is_empty() => ListRender::Empty(&self.empty_message),
            LoadState::Ready => ListRender::Items(&self.items),
        }
    }
}

/// What a detail view shows.
#[derive(Debug, PartialEq)]
pub enum DetailRender<'a, T> {
    Loading,
    Failed(&'a str),
    NotFound(&'a str),
    Ready(&'a T),
}

/// ResourceDetail
///
/// Local copy of a single remote record. A 404 is an empty state, not an error.
#[derive(Debug, Clone)]
pub struct ResourceDetail<T> {
    value: Option<T>,
    state: LoadState,
    not_found: bool,
    error_message: String,
    not_found_message: String,
}

impl<T> ResourceDetail<T> {
    pub fn new(error_message: impl Into<String>, not_found_message: impl Into<String>) -> Self {
        Self {
            value: None,
            state: LoadState::Idle,
            not_found: false,
            error_message: error_message.into(),
            not_found_message: not_found_message.into(),
        }
    }

    pub async fn load<F>(&mut self, fetch: F)
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.state = LoadState::Loading;
        match fetch.await {
            Ok(value) => self.replace(value),
            Err(e) if e.is_not_found() => {
                self.value = None;
                self.not_found = true;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("detail load failed: {}", e);
                self.state = LoadState::Failed(self.error_message.clone());
            }
        }
    }

    pub fn fail(&mut self) {
        self.not_found = false;
        self.state = LoadState::Failed(self.error_message.clone());
    }

    /// Full replace with a value the server returned from some other call.
    pub fn replace(&mut self, value: T) {
        self.value = Some(value);
        self.not_found = false;
        self.state = LoadState::Ready;
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn render(&self) -> DetailRender<'_, T> {
        match (&self.state, &self.value) {
            (LoadState::Idle | LoadState::Loading, _) => DetailRender::Loading,
            (LoadState::Failed(message), _) => DetailRender::Failed(message),
            (LoadState::Ready, Some(value)) => DetailRender::Ready(value),
            (LoadState::Ready, None) => DetailRender::NotFound(&self.not_found_message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.not_found
    }
}
