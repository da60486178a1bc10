//! Live filtering of a loaded collection.
//!
//! Two tasks make up the pipeline:
//!
//! ```text
//!  raw text ──► FilterInput ──(throttled, deduped)──► active filter ─┐
//!                                                                    ├─► FilteredCollection
//!  loaded items ─────────────────────────────────────────────────────┘          │
//!                                                                               ▼ view
//! ```
//!
//! Both publish on [`watch`] channels.  The actual sort/match step is the pure
//! function [`apply_filter`], driven by each record's [`Filterable`] impl.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::throttle::{Throttle, TokioClock};

/// A record that can be shown in a filtered list.
pub trait Filterable: Clone + PartialEq + Send + Sync + 'static {
    /// Put a freshly loaded list into display order.  Must be stable.
    /// Defaults to keeping the source order.
    fn arrange(_items: &mut Vec<Self>) {}

    /// Whether this record matches `needle`, which is already lowercase.
    fn matches(&self, needle: &str) -> bool;
}

/// Arrange `items` and keep the ones matching `filter`, case-insensitively.
/// An empty filter keeps everything.
pub fn apply_filter<T: Filterable>(items: &[T], filter: &str) -> Vec<T> {
    let mut arranged = items.to_vec();
    T::arrange(&mut arranged);
    if filter.is_empty() {
        return arranged;
    }
    let needle = filter.to_lowercase();
    arranged.retain(|item| item.matches(&needle));
    arranged
}

// ---------------------------------------------------------------------------
// Filter input — raw text in, throttled active filter out
// ---------------------------------------------------------------------------

/// Owns the active filter string.
///
/// Raw text goes through a [`Throttle`] before becoming active, and an active
/// value equal to the previous one is not republished.
pub struct FilterInput {
    raw: mpsc::UnboundedSender<String>,
    active: watch::Receiver<String>,
    task: JoinHandle<()>,
}

impl FilterInput {
    pub fn spawn(runtime: &Handle, interval: Duration) -> Self {
        let (raw, raw_rx) = mpsc::unbounded_channel();
        let (active_tx, active) = watch::channel(String::new());
        let task = runtime.spawn(run_filter_input(raw_rx, active_tx, interval));
        Self { raw, active, task }
    }

    /// Submit text as typed.  `None` clears the filter.
    pub fn set(&self, text: Option<&str>) {
        // Only fails once the task is gone, and then nobody is listening.
        let _ = self.raw.send(text.unwrap_or_default().to_owned());
    }

    /// Receiver of the active (throttled) filter.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.active.clone()
    }

    pub fn current(&self) -> String {
        self.active.borrow().clone()
    }
}

impl Drop for FilterInput {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_filter_input(
    mut raw: mpsc::UnboundedReceiver<String>,
    active: watch::Sender<String>,
    interval: Duration,
) {
    let mut throttle = Throttle::new(interval, TokioClock);
    let publish = |value: String| {
        active.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                trace!(filter = %value, "active filter changed");
                *current = value;
                true
            }
        });
    };

    loop {
        let released = match throttle.deadline() {
            Some(deadline) => tokio::select! {
                text = raw.recv() => match text {
                    Some(text) => throttle.offer(text),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => throttle.poll_due(),
            },
            None => match raw.recv().await {
                Some(text) => throttle.offer(text),
                None => break,
            },
        };
        if let Some(value) = released {
            publish(value);
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered collection — items × active filter → view
// ---------------------------------------------------------------------------

/// A continuously updated, arranged and filtered view over a collection.
pub struct FilteredCollection<T> {
    items: watch::Sender<Vec<T>>,
    view: watch::Receiver<Vec<T>>,
    task: JoinHandle<()>,
}

impl<T: Filterable> FilteredCollection<T> {
    /// Start deriving a view of `items` under the filter published on
    /// `filter`.  The first view is computed before this returns.
    pub fn spawn(runtime: &Handle, items: Vec<T>, filter: watch::Receiver<String>) -> Self {
        let initial = apply_filter(&items, &filter.borrow());
        let (items_tx, items_rx) = watch::channel(items);
        let (view_tx, view) = watch::channel(initial);
        let task = runtime.spawn(run_filtered(items_rx, filter, view_tx));
        Self {
            items: items_tx,
            view,
            task,
        }
    }

    /// Receiver of the current view.
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.view.clone()
    }

    pub fn current(&self) -> Vec<T> {
        self.view.borrow().clone()
    }

    /// Swap in a new source collection.  Ignored if identical.
    pub fn replace_items(&self, items: Vec<T>) {
        self.items.send_if_modified(|current| {
            if *current == items {
                false
            } else {
                *current = items;
                true
            }
        });
    }

    /// The source collection, before arranging or filtering.
    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Number of records before filtering.
    pub fn total(&self) -> usize {
        self.items.borrow().len()
    }
}

impl<T> Drop for FilteredCollection<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_filtered<T: Filterable>(
    mut items: watch::Receiver<Vec<T>>,
    mut filter: watch::Receiver<String>,
    view: watch::Sender<Vec<T>>,
) {
    items.mark_unchanged();
    filter.mark_unchanged();
    loop {
        tokio::select! {
            changed = items.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = filter.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let next = {
            let items = items.borrow_and_update();
            let filter = filter.borrow_and_update();
            apply_filter(&items, &filter)
        };
        view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                trace!(len = next.len(), "view recomputed");
                *current = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{League, Team};

    fn nba() -> League {
        League::new("NBA G League", "gleague")
    }

    fn big3() -> League {
        League::new("BIG3", "big3")
    }

    fn cba() -> League {
        League::new("CBA League", "cba3")
    }

    fn teams() -> Vec<Team> {
        vec![
            Team::new("team-name-1", "team-full-1").with_location("team-location-1"),
            Team::new("team-name-2", ""),
            Team::new("", "team-full-3"),
            Team::new("", "").with_location("team-location-4"),
        ]
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    // -- apply_filter --------------------------------------------------------

    #[test]
    fn leagues_sort_by_full_name() {
        assert_eq!(apply_filter(&[nba(), big3()], ""), vec![big3(), nba()]);
        assert_eq!(apply_filter(&[big3(), nba()], ""), vec![big3(), nba()]);
    }

    #[test]
    fn leagues_sort_whole_alphabet() {
        let sorted: Vec<League> = ('a'..='z')
            .map(|c| League::new(c.to_string(), format!("slug{c}")))
            .collect();
        let mut shuffled = sorted.clone();
        shuffled.reverse();
        shuffled.swap(3, 17);
        assert_eq!(apply_filter(&shuffled, ""), sorted);
    }

    #[test]
    fn leagues_filter_on_name_and_slug() {
        let all = [nba(), big3(), cba()];
        assert_eq!(apply_filter(&all, ""), vec![big3(), cba(), nba()]);
        assert_eq!(apply_filter(&all, "league"), vec![cba(), nba()]);
        assert_eq!(apply_filter(&all, "LEAGUE"), vec![cba(), nba()]);
        assert_eq!(apply_filter(&all, "3"), vec![big3(), cba()]);
        assert!(apply_filter(&all, "hockey").is_empty());
    }

    #[test]
    fn teams_keep_source_order() {
        let t = teams();
        assert_eq!(apply_filter(&t, ""), t);
        assert_eq!(apply_filter(&t, "name"), vec![t[0].clone(), t[1].clone()]);
        assert_eq!(apply_filter(&t, "full"), vec![t[0].clone(), t[2].clone()]);
        assert_eq!(apply_filter(&t, "location"), vec![t[0].clone(), t[3].clone()]);
        assert_eq!(apply_filter(&t, "team"), t);
    }

    // -- FilterInput ---------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn first_value_is_active_immediately() {
        let input = FilterInput::spawn(&Handle::current(), Duration::from_millis(500));
        let mut rx = input.subscribe();

        input.set(Some("basket"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "basket");
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_is_throttled_to_last_value() {
        let input = FilterInput::spawn(&Handle::current(), Duration::from_millis(500));
        let mut rx = input.subscribe();

        input.set(Some("b"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "b");

        input.set(Some("ba"));
        input.set(Some("bas"));
        settle().await;
        assert!(!rx.has_changed().unwrap(), "held back inside the window");

        tokio::time::advance(Duration::from_millis(500)).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "bas");
    }

    #[tokio::test(start_paused = true)]
    async fn none_clears_and_repeats_are_skipped() {
        let input = FilterInput::spawn(&Handle::current(), Duration::from_millis(500));
        let mut rx = input.subscribe();

        input.set(None);
        settle().await;
        assert!(!rx.has_changed().unwrap(), "empty is already active");

        input.set(Some("x"));
        rx.changed().await.unwrap();
        rx.borrow_and_update();

        tokio::time::advance(Duration::from_secs(1)).await;
        input.set(Some("x"));
        settle().await;
        assert!(!rx.has_changed().unwrap(), "same value twice");

        tokio::time::advance(Duration::from_secs(1)).await;
        input.set(None);
        rx.changed().await.unwrap();
        assert_eq!(input.current(), "");
    }

    // -- FilteredCollection --------------------------------------------------

    #[tokio::test]
    async fn view_follows_filter() {
        let (filter_tx, filter_rx) = watch::channel(String::new());
        let items = vec![nba(), big3(), cba()];
        let view = FilteredCollection::spawn(&Handle::current(), items, filter_rx);
        let mut rx = view.subscribe();
        assert_eq!(*rx.borrow_and_update(), vec![big3(), cba(), nba()]);

        filter_tx.send_replace("league".into());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec![cba(), nba()]);

        filter_tx.send_replace("3".into());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec![big3(), cba()]);

        filter_tx.send_replace(String::new());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec![big3(), cba(), nba()]);
        assert_eq!(view.total(), 3);
    }

    #[tokio::test]
    async fn unchanged_result_is_not_republished() {
        let (filter_tx, filter_rx) = watch::channel(String::new());
        let view = FilteredCollection::spawn(&Handle::current(), vec![nba(), cba()], filter_rx);
        let mut rx = view.subscribe();
        rx.borrow_and_update();

        // "league" and "LEAGUE" both keep every record.
        filter_tx.send_replace("league".into());
        settle().await;
        assert!(!rx.has_changed().unwrap());

        filter_tx.send_replace("LEAGUE".into());
        settle().await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn view_follows_items() {
        let (_filter_tx, filter_rx) = watch::channel(String::new());
        let view = FilteredCollection::spawn(&Handle::current(), vec![nba(), big3()], filter_rx);
        let mut rx = view.subscribe();
        assert_eq!(*rx.borrow_and_update(), vec![big3(), nba()]);

        view.replace_items(vec![nba()]);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), vec![nba()]);
        assert_eq!(view.current(), vec![nba()]);
    }

    #[tokio::test]
    async fn initial_view_uses_current_filter() {
        let (_filter_tx, filter_rx) = watch::channel("3".to_string());
        let items = vec![nba(), big3(), cba()];
        let view = FilteredCollection::spawn(&Handle::current(), items, filter_rx);
        assert_eq!(view.current(), vec![big3(), cba()]);
    }
}
