//! Tokio driver for the debounced search pipeline
//!
//! Each accepted input spawns a timer task tagged with the input's generation.
//! A newer input aborts the previous timer, and a timer that still fires late
//! is discarded by the generation check. States are published on a `watch`
//! channel; bracket promotions go out on an `mpsc` channel so the owner of the
//! facet set can apply them.
//!
//! All methods that schedule timers must be called from within a tokio runtime.

use super::facets::TagFacetSet;
use super::matcher::Searchable;
use super::pipeline::{DebouncedSearch, Promotion, Resolution, SearchState};
use crate::config::{PatternOptions, SearchSettings};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

struct DriverInner<T> {
    pipeline: DebouncedSearch<T>,
    timer: Option<JoinHandle<()>>,
}

struct Shared<T> {
    inner: Mutex<DriverInner<T>>,
    states: watch::Sender<SearchState<T>>,
    promotions: mpsc::UnboundedSender<Promotion>,
}

/// Live handle over a [`DebouncedSearch`] driven by tokio timers
///
/// Dropping the handle disposes the pipeline.
pub struct SearchDriver<T> {
    shared: Arc<Shared<T>>,
}

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, DriverInner<T>> {
        // A poisoned lock still holds a consistent pipeline: every mutation
        // completes before any call that could panic
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Shared<T>
where
    T: Searchable + Clone + Send + Sync + 'static,
{
    fn schedule(self: &Arc<Self>, inner: &mut DriverInner<T>, generation: u64) {
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        let quantum = inner.pipeline.quantum();
        let shared = Arc::clone(self);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quantum).await;
            shared.fire(generation);
        }));
    }

    fn fire(self: &Arc<Self>, generation: u64) {
        let mut inner = self.lock();
        // The stored handle is ours only while our generation is pending; a
        // stale timer must leave the newer handle in place
        if inner.pipeline.pending_generation() == Some(generation) {
            inner.timer = None;
        }

        let Some(resolution) = inner.pipeline.resolve(generation, now()) else {
            trace!("Timer for generation {} discarded", generation);
            return;
        };

        if let Resolution::Promoted(promotion) = &resolution {
            if self.promotions.send(promotion.clone()).is_err() {
                debug!("Promotion receiver dropped; tags {:?} not applied", promotion.tags);
            }
        }

        if let Some(next) = inner.pipeline.pending_generation() {
            self.schedule(&mut inner, next);
        }

        self.states.send_replace(inner.pipeline.snapshot());
    }

    fn accept(self: &Arc<Self>, apply: impl FnOnce(&mut DebouncedSearch<T>, Instant) -> u64) {
        let mut inner = self.lock();
        if inner.pipeline.is_disposed() {
            trace!("Input after dispose ignored");
            return;
        }

        let generation = apply(&mut inner.pipeline, now());
        self.schedule(&mut inner, generation);
        self.states.send_replace(inner.pipeline.snapshot());
    }
}

impl<T> SearchDriver<T>
where
    T: Searchable + Clone + Send + Sync + 'static,
{
    /// Create a driver from resolved settings
    ///
    /// Returns the driver and the receiving end of the promotion channel.
    pub fn new(settings: &SearchSettings) -> (Self, mpsc::UnboundedReceiver<Promotion>) {
        Self::with_quantum(settings.debounce, settings.pattern)
    }

    /// Create a driver with an explicit quantum and pattern limits
    pub fn with_quantum(
        quantum: Duration,
        options: PatternOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Promotion>) {
        let (promotions, promotion_rx) = mpsc::unbounded_channel();
        let (states, _) = watch::channel(SearchState::default());

        let shared = Arc::new(Shared {
            inner: Mutex::new(DriverInner {
                pipeline: DebouncedSearch::with_options(quantum, options),
                timer: None,
            }),
            states,
            promotions,
        });

        (Self { shared }, promotion_rx)
    }

    /// Subscribe to published states
    pub fn subscribe(&self) -> watch::Receiver<SearchState<T>> {
        self.shared.states.subscribe()
    }

    /// Current state
    pub fn state(&self) -> SearchState<T> {
        self.shared.lock().pipeline.snapshot()
    }

    /// Replace the search text
    pub fn set_input_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared
            .accept(move |pipeline, now| pipeline.set_input_text(text, now));
    }

    /// Replace the candidate collection
    pub fn set_items(&self, items: Option<Arc<[T]>>) {
        self.shared
            .accept(move |pipeline, now| pipeline.set_items(items, now));
    }

    /// Replace the facet set
    pub fn set_facets(&self, facets: TagFacetSet) {
        self.shared
            .accept(move |pipeline, now| pipeline.set_facets(facets, now));
    }

    /// Merge a promotion into the caller's facets and hand the result back
    pub fn apply_promotion(&self, promotion: &Promotion, facets: &mut TagFacetSet) {
        promotion.apply_to(facets);
        self.set_facets(facets.clone());
    }

    /// Cancel the pending timer and stop publishing
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        inner.pipeline.dispose();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }
}

impl<T> Drop for SearchDriver<T> {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        inner.pipeline.dispose();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageRecord;
    use tokio::time::sleep;

    const QUANTUM: Duration = Duration::from_millis(500);

    fn catalog() -> Arc<[ImageRecord]> {
        vec![
            ImageRecord::new(1, "cat.png").with_tags(["pet"]),
            ImageRecord::new(2, "car.png"),
            ImageRecord::new(3, "dog.png").with_tags(["pet"]),
        ]
        .into()
    }

    fn ids(state: &SearchState<ImageRecord>) -> Option<Vec<u64>> {
        state
            .result
            .as_ref()
            .map(|r| r.iter().map(|i| i.id).collect())
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_publishes_last_only() {
        let (driver, _promotions) = SearchDriver::with_quantum(QUANTUM, PatternOptions::default());
        driver.set_items(Some(catalog()));

        for text in ["d", "do", "c", "ca"] {
            driver.set_input_text(text);
            sleep(Duration::from_millis(300)).await;
            let state = driver.state();
            assert!(state.loading);
            assert!(state.result.is_none());
            assert_eq!(state.evaluations, 0);
        }

        driver.set_input_text("cat");
        sleep(QUANTUM + Duration::from_millis(1)).await;

        let state = driver.state();
        assert!(!state.loading);
        assert_eq!(state.input_text, "cat");
        assert_eq!(ids(&state), Some(vec![1]));
        assert_eq!(state.evaluations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_loading_then_result() {
        let (driver, _promotions) = SearchDriver::with_quantum(QUANTUM, PatternOptions::default());
        let mut states = driver.subscribe();

        driver.set_items(Some(catalog()));
        driver.set_input_text("dog");
        assert!(states.borrow_and_update().loading);

        states.changed().await.unwrap();
        let state = states.borrow_and_update().clone();
        assert!(!state.loading);
        assert_eq!(ids(&state), Some(vec![3]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_before_elapse() {
        let (driver, _promotions) = SearchDriver::with_quantum(QUANTUM, PatternOptions::default());
        driver.set_items(Some(catalog()));
        driver.set_input_text("cat");
        driver.dispose();

        sleep(QUANTUM * 3).await;
        let state = driver.state();
        assert_eq!(state.evaluations, 0);
        assert!(state.result.is_none());

        driver.set_input_text("dog");
        sleep(QUANTUM * 3).await;
        assert_eq!(driver.state().input_text, "cat");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timer() {
        let (driver, _promotions) = SearchDriver::with_quantum(QUANTUM, PatternOptions::default());
        let mut states = driver.subscribe();
        driver.set_items(Some(catalog()));
        drop(driver);

        sleep(QUANTUM * 3).await;
        // Last published state is still the loading one from set_items
        let state = states.borrow().clone();
        assert!(state.loading);
        assert_eq!(state.evaluations, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_timer_keeps_newer_handle() {
        let (driver, _promotions) = SearchDriver::with_quantum(QUANTUM, PatternOptions::default());
        driver.set_items(Some(catalog()));
        let stale = driver.shared.lock().pipeline.generation();
        driver.set_input_text("cat");

        // A superseded timer finishing late must not forget the live one
        driver.shared.fire(stale);
        assert!(driver.shared.lock().timer.is_some());
        assert_eq!(driver.state().evaluations, 0);

        sleep(QUANTUM + Duration::from_millis(1)).await;
        let state = driver.state();
        assert_eq!(state.evaluations, 1);
        assert_eq!(ids(&state), Some(vec![1]));
        assert!(driver.shared.lock().timer.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_promotion_flows_back_to_caller() {
        let (driver, mut promotions) =
            SearchDriver::with_quantum(QUANTUM, PatternOptions::default());
        let mut facets = TagFacetSet::new();
        driver.set_items(Some(catalog()));
        driver.set_input_text("[pet]c");

        let promotion = promotions.recv().await.unwrap();
        assert_eq!(promotion.tags, vec!["pet".to_string()]);
        assert_eq!(promotion.residual, "c");
        assert_eq!(driver.state().input_text, "c");

        driver.apply_promotion(&promotion, &mut facets);
        assert!(facets.contains("pet"));

        sleep(QUANTUM + Duration::from_millis(1)).await;
        let state = driver.state();
        assert!(!state.loading);
        assert_eq!(ids(&state), Some(vec![1]));
    }
}
