//! The lifecycle of one asynchronous fetch.

use crate::error::UserError;

/// Where a fetch currently stands.
///
/// A fresh [`ReloadableSource`](crate::ReloadableSource) reports `Loading`
/// before anything has been fetched, so there is no separate "idle" variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T, E = UserError> {
    Loading,
    Done(T),
    Failed(E),
}

impl<T, E> LoadState<T, E> {
    /// The payload, only when `Done`.
    pub fn value(&self) -> Option<&T> {
        match self {
            LoadState::Done(value) => Some(value),
            LoadState::Loading | LoadState::Failed(_) => None,
        }
    }

    /// The error, only when `Failed`.
    pub fn error(&self) -> Option<&E> {
        match self {
            LoadState::Failed(error) => Some(error),
            LoadState::Loading | LoadState::Done(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_done(&self) -> bool {
        matches!(self, LoadState::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadState::Failed(_))
    }

    /// Transform the `Done` payload; other variants pass through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U, E> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Done(value) => LoadState::Done(f(value)),
            LoadState::Failed(error) => LoadState::Failed(error),
        }
    }

    /// Transform the `Failed` payload; other variants pass through.
    pub fn map_err<F>(self, f: impl FnOnce(E) -> F) -> LoadState<T, F> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Done(value) => LoadState::Done(value),
            LoadState::Failed(error) => LoadState::Failed(f(error)),
        }
    }

    pub fn as_ref(&self) -> LoadState<&T, &E> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Done(value) => LoadState::Done(value),
            LoadState::Failed(error) => LoadState::Failed(error),
        }
    }
}

impl<T, E> From<Result<T, E>> for LoadState<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => LoadState::Done(value),
            Err(error) => LoadState::Failed(error),
        }
    }
}
