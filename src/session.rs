//! Step Controller
//!
//! Drives the guided flow one question at a time and decides when the match
//! engine runs. All state changes go through the named operations below; the
//! bundle they change is a plain [`SessionState`] that can be snapshotted and
//! restored.
//!
//! States: `Asking(i)` for each of the N steps, then `Results`.
//! - `answer`: records the value; `Asking(N-1)` moves to `Results`
//! - `back`: `Asking(i)` to `Asking(i-1)`, keeping the recorded answer
//! - `reset`: clears everything, back to `Asking(0)`
//!
//! Evaluation timing follows [`SearchPolicy`].

use crate::catalog::Catalog;
use crate::config::{EmptyQuery, SearchPolicy, SessionConfig};
use crate::error::IdentifyError;
use crate::match_engine::{match_indices, MatchOutcome};
use crate::state::{AdvancedFilterState, FilterCategory, Phase, SelectionState, SessionState};
use crate::steps::{QuestionSequence, QuestionStep};
use crate::utils::is_blank;

/// What the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentStep<'a> {
    Asking { index: usize, step: &'a QuestionStep },
    Results,
}

/// One interactive identification session
///
/// Borrows the catalog and question sequence for its whole lifetime and owns
/// its state exclusively.
#[derive(Debug, Clone)]
pub struct IdentificationSession<'a> {
    catalog: &'a Catalog,
    steps: &'a QuestionSequence,
    config: SessionConfig,
    state: SessionState,
    /// Matched catalog indices; `None` until the engine runs for current inputs
    evaluation: Option<Vec<usize>>,
}

impl<'a> IdentificationSession<'a> {
    pub fn new(catalog: &'a Catalog, steps: &'a QuestionSequence, config: SessionConfig) -> Self {
        tracing::debug!(
            "New session: {} plants, {} steps, {:?}",
            catalog.len(),
            steps.len(),
            config
        );
        Self {
            catalog,
            steps,
            config,
            state: SessionState::default(),
            evaluation: None,
        }
    }

    /// Resume from a snapshot taken with [`snapshot`](Self::snapshot)
    ///
    /// The phase must lie inside the sequence and every recorded answer must
    /// be an option some step offers under that trait key. Filters and query
    /// are free-form and taken as they are.
    pub fn restore(
        catalog: &'a Catalog,
        steps: &'a QuestionSequence,
        config: SessionConfig,
        state: SessionState,
    ) -> Result<Self, IdentifyError> {
        if let Phase::Asking(index) = state.phase {
            if index >= steps.len() {
                return Err(IdentifyError::InvalidSnapshot(format!(
                    "step index {} out of range for {} steps",
                    index,
                    steps.len()
                )));
            }
        }

        for (trait_key, value) in state.selection.iter() {
            let offered = steps
                .iter()
                .any(|step| step.trait_key == trait_key && step.offers(value));
            if !offered {
                return Err(IdentifyError::InvalidSnapshot(format!(
                    "answer {}={} is not offered by any step",
                    trait_key, value
                )));
            }
        }

        let mut session = Self::new(catalog, steps, config);
        session.state = state;
        session.refresh();
        Ok(session)
    }

    /// Step being asked, or the results sentinel
    pub fn current_step(&self) -> CurrentStep<'a> {
        let steps: &'a QuestionSequence = self.steps;
        match self.state.phase {
            Phase::Asking(index) => CurrentStep::Asking {
                index,
                step: &steps[index],
            },
            Phase::Results => CurrentStep::Results,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Answer the current step
    ///
    /// On error nothing changes: earlier answers, filters and query stay.
    pub fn answer(&mut self, trait_key: &str, value: &str) -> Result<Phase, IdentifyError> {
        if is_blank(trait_key) {
            return Err(IdentifyError::MalformedOption("option has no trait key".to_string()));
        }
        if is_blank(value) {
            return Err(IdentifyError::MalformedOption(format!(
                "option for '{}' has no value",
                trait_key
            )));
        }

        let index = match self.state.phase {
            Phase::Asking(index) => index,
            Phase::Results => return Err(IdentifyError::SequenceComplete),
        };

        let step = &self.steps[index];
        if step.trait_key != trait_key || !step.offers(value) {
            tracing::debug!(
                "Rejected answer {}={} at step {} (expects '{}')",
                trait_key,
                value,
                index,
                step.trait_key
            );
            return Err(IdentifyError::InvalidOption {
                step: index,
                trait_key: trait_key.to_string(),
                value: value.to_string(),
            });
        }

        self.state.selection.select(trait_key, value);
        self.state.phase = if index == self.steps.last_index() {
            Phase::Results
        } else {
            Phase::Asking(index + 1)
        };
        tracing::debug!("Answered {}={}: {:?}", trait_key, value, self.state.phase);

        self.refresh();
        Ok(self.state.phase)
    }

    /// Go back one step; answers already given are kept
    ///
    /// No-op at the first step. From results only when revising is enabled.
    pub fn back(&mut self) -> Phase {
        let target = match self.state.phase {
            Phase::Asking(index) if index > 0 => Phase::Asking(index - 1),
            Phase::Asking(_) => return self.state.phase,
            Phase::Results if self.config.allow_revise_results => {
                Phase::Asking(self.steps.last_index())
            }
            Phase::Results => return self.state.phase,
        };

        tracing::debug!("Back: {:?} -> {:?}", self.state.phase, target);
        self.state.phase = target;
        self.refresh();
        self.state.phase
    }

    /// Clear answers, filters and query; start over
    pub fn reset(&mut self) -> Phase {
        tracing::debug!("Reset session");
        self.state.clear();
        self.evaluation = None;
        self.state.phase
    }

    /// Replace the free-text query
    ///
    /// The text is kept as given unless `trim_query` is set; only an empty
    /// query drops the text constraint.
    pub fn set_query_text(&mut self, text: &str) -> MatchOutcome<'a> {
        let text = if self.config.trim_query { text.trim() } else { text };
        if text.is_empty() && self.config.empty_query == EmptyQuery::Ignored {
            tracing::debug!("Ignoring empty query; keeping {:?}", self.state.query);
            return self.matches();
        }

        self.state.query = text.to_string();
        self.refresh();
        self.matches()
    }

    /// Flip one advanced-filter value on or off
    pub fn toggle_advanced_filter(&mut self, category: FilterCategory, value: &str) -> MatchOutcome<'a> {
        if is_blank(value) {
            tracing::debug!("Ignoring blank value for filter {}", category);
            return self.matches();
        }

        let active = self.state.filters.toggle(category, value);
        tracing::debug!("Filter {}={} {}", category, value, if active { "on" } else { "off" });
        self.refresh();
        self.matches()
    }

    /// Latest evaluation
    pub fn matches(&self) -> MatchOutcome<'a> {
        let catalog: &'a Catalog = self.catalog;
        match &self.evaluation {
            None => MatchOutcome::NotRun,
            Some(indices) => MatchOutcome::from_matches(
                indices.iter().filter_map(|&i| catalog.get(i)).collect(),
            ),
        }
    }

    /// (answered steps, total steps) for progress display
    pub fn progress(&self) -> (usize, usize) {
        let total = self.steps.len();
        match self.state.phase {
            Phase::Asking(index) => (index, total),
            Phase::Results => (total, total),
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.state.selection
    }

    pub fn filters(&self) -> &AdvancedFilterState {
        &self.state.filters
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn steps(&self) -> &'a QuestionSequence {
        self.steps
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Copy of the full session state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Whether current inputs should be evaluated now
    fn evaluation_due(&self) -> bool {
        match self.config.search_policy {
            SearchPolicy::Live => true,
            SearchPolicy::Gated => self.state.phase.is_results(),
        }
    }

    /// Re-run the engine if the policy calls for it, otherwise mark not-run
    fn refresh(&mut self) {
        self.evaluation = if self.evaluation_due() {
            Some(match_indices(
                self.catalog,
                &self.state.selection,
                &self.state.filters,
                &self.state.query,
            ))
        } else {
            None
        };
    }
}
