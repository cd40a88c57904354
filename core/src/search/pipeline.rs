//! Debounced filter pipeline
//!
//! Holds the latest `(text, items, facets)` input and evaluates it only once
//! the input has been quiet for a full debounce quantum. Every change bumps a
//! generation counter; an evaluation that does not carry the current
//! generation is stale and is dropped.
//!
//! The state machine is clock-agnostic: callers pass `now` in, which keeps it
//! deterministic under test. [`super::driver::SearchDriver`] runs it on tokio
//! timers.

use super::facets::TagFacetSet;
use super::matcher::{filter_items, Searchable};
use super::query::extract_query_with;
use crate::config::{PatternOptions, SearchSettings};
use crate::error::PatternError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Tags typed inline as a bracket expression, to be moved into the caller's facets
///
/// The pipeline has already replaced its input text with `residual`; the
/// caller applies `tags` to the facet set it owns and passes the set back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    /// Tags not yet present in the facet set, in sorted order
    pub tags: Vec<String>,
    /// Input text left once the bracket expression is removed
    pub residual: String,
}

impl Promotion {
    /// Merge the promoted tags into a facet set; returns how many were new
    pub fn apply_to(&self, facets: &mut TagFacetSet) -> usize {
        facets.merge(&self.tags)
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A bracket expression was consumed instead of filtering
    Promoted(Promotion),
    /// Items were filtered; `matched` is the result length
    Filtered { matched: usize },
    /// No collection loaded yet, so there is nothing to filter
    NoData,
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Nothing received yet
    Idle,
    /// Timer armed for the latest input
    Pending,
    /// Latest input has been evaluated
    Resolved,
    /// Torn down; all further activity is ignored
    Disposed,
}

/// Snapshot of what a search box renders
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState<T> {
    pub input_text: String,
    pub loading: bool,
    /// `None` until a collection has been filtered at least once
    pub result: Option<Vec<T>>,
    /// Why the last evaluated pattern failed to compile
    pub error: Option<PatternError>,
    /// Completed evaluations so far
    pub evaluations: u64,
}

impl<T> Default for SearchState<T> {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            loading: false,
            result: None,
            error: None,
            evaluations: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    generation: u64,
    deadline: Instant,
}

/// Debounced search state machine
#[derive(Debug)]
pub struct DebouncedSearch<T> {
    quantum: Duration,
    options: PatternOptions,
    text: String,
    items: Option<Arc<[T]>>,
    facets: TagFacetSet,
    generation: u64,
    pending: Option<Pending>,
    result: Option<Vec<T>>,
    error: Option<PatternError>,
    loading: bool,
    evaluations: u64,
    disposed: bool,
}

impl<T> DebouncedSearch<T> {
    /// Create a pipeline with the given debounce quantum
    pub fn new(quantum: Duration) -> Self {
        Self::with_options(quantum, PatternOptions::default())
    }

    /// Create a pipeline with explicit pattern limits
    pub fn with_options(quantum: Duration, options: PatternOptions) -> Self {
        Self {
            quantum,
            options,
            text: String::new(),
            items: None,
            facets: TagFacetSet::new(),
            generation: 0,
            pending: None,
            result: None,
            error: None,
            loading: false,
            evaluations: 0,
            disposed: false,
        }
    }

    /// Create a pipeline from resolved settings
    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self::with_options(settings.debounce, settings.pattern)
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    pub fn input_text(&self) -> &str {
        &self.text
    }

    pub fn facets(&self) -> &TagFacetSet {
        &self.facets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&[T]> {
        self.result.as_deref()
    }

    pub fn last_error(&self) -> Option<&PatternError> {
        self.error.as_ref()
    }

    /// Generation of the latest accepted input
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation waiting on the timer, if any
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.map(|p| p.generation)
    }

    /// When the pending evaluation becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn phase(&self) -> PipelinePhase {
        if self.disposed {
            PipelinePhase::Disposed
        } else if self.pending.is_some() {
            PipelinePhase::Pending
        } else if self.generation == 0 {
            PipelinePhase::Idle
        } else {
            PipelinePhase::Resolved
        }
    }

    /// Replace the search text
    pub fn set_input_text(&mut self, text: impl Into<String>, now: Instant) -> u64 {
        if self.disposed {
            trace!("Ignoring input text after dispose");
            return self.generation;
        }
        self.text = text.into();
        self.arm(now)
    }

    /// Replace the candidate collection; `None` means not loaded yet
    pub fn set_items(&mut self, items: Option<Arc<[T]>>, now: Instant) -> u64 {
        if self.disposed {
            trace!("Ignoring items after dispose");
            return self.generation;
        }
        self.items = items;
        self.arm(now)
    }

    /// Replace the caller's facet set
    pub fn set_facets(&mut self, facets: TagFacetSet, now: Instant) -> u64 {
        if self.disposed {
            trace!("Ignoring facets after dispose");
            return self.generation;
        }
        self.facets = facets;
        self.arm(now)
    }

    /// Replace all three inputs at once
    pub fn update(
        &mut self,
        text: impl Into<String>,
        items: Option<Arc<[T]>>,
        facets: TagFacetSet,
        now: Instant,
    ) -> u64 {
        if self.disposed {
            trace!("Ignoring update after dispose");
            return self.generation;
        }
        self.text = text.into();
        self.items = items;
        self.facets = facets;
        self.arm(now)
    }

    /// Cancel any pending evaluation and ignore everything from now on
    pub fn dispose(&mut self) {
        if !self.disposed {
            debug!("Disposing search pipeline at generation {}", self.generation);
        }
        self.disposed = true;
        self.pending = None;
        self.loading = false;
    }

    fn arm(&mut self, now: Instant) -> u64 {
        if let Some(previous) = self.pending {
            trace!(
                "Generation {} superseded by {}",
                previous.generation,
                self.generation + 1
            );
        }
        self.generation += 1;
        self.pending = Some(Pending {
            generation: self.generation,
            deadline: now + self.quantum,
        });
        self.loading = true;
        self.generation
    }
}

impl<T: Searchable + Clone> DebouncedSearch<T> {
    /// Evaluate the pending input if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<Resolution> {
        if self.disposed {
            return None;
        }
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        Some(self.evaluate(now))
    }

    /// Evaluate on behalf of a timer armed for `generation`
    ///
    /// Returns `None` when that generation has been superseded or the pipeline
    /// was disposed; the caller must then publish nothing.
    pub fn resolve(&mut self, generation: u64, now: Instant) -> Option<Resolution> {
        if self.disposed {
            trace!("Dropping timer for generation {} after dispose", generation);
            return None;
        }
        match self.pending {
            Some(pending) if pending.generation == generation => Some(self.evaluate(now)),
            _ => {
                trace!("Dropping stale timer for generation {}", generation);
                None
            }
        }
    }

    /// Owned snapshot of the rendered state
    pub fn snapshot(&self) -> SearchState<T> {
        SearchState {
            input_text: self.text.clone(),
            loading: self.loading,
            result: self.result.clone(),
            error: self.error.clone(),
            evaluations: self.evaluations,
        }
    }

    fn evaluate(&mut self, now: Instant) -> Resolution {
        self.pending = None;
        self.loading = false;
        self.evaluations += 1;

        let query = extract_query_with(&self.text, &self.options);
        self.error = query.error.clone();

        if query.bracket_consumed {
            let tags: Vec<String> = query
                .facet_tags
                .iter()
                .filter(|tag| !self.facets.contains(tag))
                .cloned()
                .collect();
            debug!(
                "Promoting {} tag(s) out of the search text at generation {}",
                tags.len(),
                self.generation
            );
            let promotion = Promotion {
                tags,
                residual: query.residual,
            };
            // The rewritten text is new input in its own right
            self.text = promotion.residual.clone();
            self.arm(now);
            return Resolution::Promoted(promotion);
        }

        let Some(items) = &self.items else {
            debug!("No collection loaded at generation {}", self.generation);
            self.result = None;
            return Resolution::NoData;
        };

        let filtered = filter_items(items, &query, &self.facets);
        let matched = filtered.len();
        debug!(
            "Generation {} matched {} of {} item(s)",
            self.generation,
            matched,
            items.len()
        );
        self.result = Some(filtered);
        Resolution::Filtered { matched }
    }
}
