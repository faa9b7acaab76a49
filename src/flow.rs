//! Submission flow
//!
//! One submission walks a linear state machine:
//!
//! ```text
//! Idle ─▶ Validating ─▶ Querying ─┬─▶ NoData
//!                                 ├─▶ Presenting ─▶ (Error if encoding fails)
//!                                 └─▶ Error
//! ```
//!
//! `NoData`, `Presenting` and `Error` are terminal. Every failure is turned
//! into a [`SubmissionOutcome::Failed`]; nothing escapes [`submit`].

use serde::Serialize;

use crate::config::ChartConfig;
use crate::error::{Error, ErrorCategory, TendenciaErrorTrait};
use crate::export::{encode_csv, encode_png, Download};
use crate::i18n::t;
use crate::models::{InterestTable, QueryRequest, RelatedQueries};
use crate::normalize::QueryForm;
use crate::present::{present, related_text, table_text, ChartImage, ChartLabels, TabularView};
use crate::trends::{self, QueryOutcome, TrendsApi};

/// States of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlowState {
    Idle,
    Validating,
    Querying,
    NoData,
    Presenting,
    Error,
}

impl FlowState {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoData | Self::Presenting | Self::Error)
    }

    /// Allowed edges of the state machine
    pub fn can_transition_to(&self, next: FlowState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Querying)
                | (Self::Querying, Self::NoData)
                | (Self::Querying, Self::Presenting)
                | (Self::Querying, Self::Error)
                | (Self::Presenting, Self::Error)
        )
    }
}

/// Settings that shape a presentation
#[derive(Debug, Clone)]
pub struct PresentSettings {
    pub chart: ChartConfig,
    pub labels: ChartLabels,
    /// Language of download labels and messages
    pub locale: &'static str,
}

impl PresentSettings {
    pub fn new(chart: ChartConfig, locale: &str) -> Self {
        let locale = crate::i18n::normalize_locale(locale);
        Self {
            chart,
            labels: ChartLabels::for_locale(locale),
            locale,
        }
    }
}

impl Default for PresentSettings {
    fn default() -> Self {
        Self::new(ChartConfig::default(), "en")
    }
}

/// Everything shown to the user for a successful query
#[derive(Debug, Clone)]
pub struct Presentation {
    pub request: QueryRequest,
    /// Full table, including the partial-data marker
    pub table: InterestTable,
    pub view: TabularView,
    pub chart: ChartImage,
    pub related: RelatedQueries,
    pub png: Download,
    pub csv: Download,
}

impl Presentation {
    /// Table and related queries as plain text, closed by the success notice
    pub fn to_text(&self, locale: &str) -> String {
        format!(
            "{}\n{}\n{}\n",
            table_text(&self.view, locale),
            related_text(&self.related, locale),
            t!("flow.success", locale = locale)
        )
    }
}

/// Terminal result of one submission
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// The query succeeded with an empty table
    NoData { request: QueryRequest, message: String },

    /// Data was presented
    Presented(Box<Presentation>),

    /// The submission failed; `message` is user-facing
    Failed {
        message: String,
        category: ErrorCategory,
    },
}

impl SubmissionOutcome {
    pub fn presentation(&self) -> Option<&Presentation> {
        match self {
            Self::Presented(p) => Some(p),
            _ => None,
        }
    }
}

/// Outcome plus the states visited on the way
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub outcome: SubmissionOutcome,
    pub transitions: Vec<FlowState>,
}

impl SubmissionReport {
    /// State the submission ended in
    pub fn final_state(&self) -> FlowState {
        self.transitions.last().copied().unwrap_or(FlowState::Idle)
    }
}

/// State tracker for one submission
#[derive(Debug)]
struct Submission {
    state: FlowState,
    transitions: Vec<FlowState>,
}

impl Submission {
    fn new() -> Self {
        Self {
            state: FlowState::Idle,
            transitions: vec![FlowState::Idle],
        }
    }

    fn advance(&mut self, next: FlowState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(from = ?self.state, to = ?next, "Submission transition");
        self.state = next;
        self.transitions.push(next);
    }

    fn finish(self, outcome: SubmissionOutcome) -> SubmissionReport {
        debug_assert!(self.state.is_terminal());
        SubmissionReport {
            outcome,
            transitions: self.transitions,
        }
    }

    fn fail(mut self, err: Error, locale: &str) -> SubmissionReport {
        tracing::error!(
            error = %err,
            category = ?err.category(),
            recoverable = err.is_recoverable(),
            "Submission failed"
        );
        self.advance(FlowState::Error);
        let message = t!("flow.failed", locale = locale, reason = err.localized_desc(locale)).to_string();
        self.finish(SubmissionOutcome::Failed {
            message,
            category: err.category(),
        })
    }
}

/// Build the presentation of a non-empty query result
///
/// # Errors
///
/// Presentation or encoding failures.
pub fn build_presentation(
    request: QueryRequest,
    table: InterestTable,
    related: RelatedQueries,
    settings: &PresentSettings,
) -> Result<Presentation, Error> {
    let (view, chart) = present(&table, &request.keywords, &settings.labels)?;
    let png = Download::png(encode_png(&chart, &settings.chart)?, settings.locale);
    let csv = Download::csv(encode_csv(&table)?, settings.locale);

    Ok(Presentation {
        request,
        table,
        view,
        chart,
        related,
        png,
        csv,
    })
}

/// Run one submission from form input to terminal state
pub async fn submit(api: &dyn TrendsApi, form: &QueryForm, settings: &PresentSettings) -> SubmissionReport {
    let locale = settings.locale;
    let mut submission = Submission::new();

    submission.advance(FlowState::Validating);
    let request = form.to_request();

    submission.advance(FlowState::Querying);
    let outcome = match trends::query(api, &request).await {
        Ok(outcome) => outcome,
        Err(e) => return submission.fail(e.into(), locale),
    };

    match outcome {
        QueryOutcome::NoData => {
            submission.advance(FlowState::NoData);
            submission.finish(SubmissionOutcome::NoData {
                request,
                message: t!("flow.no_data", locale = locale).to_string(),
            })
        }
        QueryOutcome::Data { table, related } => {
            submission.advance(FlowState::Presenting);
            match build_presentation(request, table, related, settings) {
                Ok(presentation) => {
                    tracing::info!(
                        keywords = ?presentation.request.keywords,
                        rows = presentation.table.len(),
                        "Submission presented"
                    );
                    submission.finish(SubmissionOutcome::Presented(Box::new(presentation)))
                }
                Err(e) => submission.fail(e, locale),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(FlowState::Idle.can_transition_to(FlowState::Validating));
        assert!(FlowState::Validating.can_transition_to(FlowState::Querying));
        assert!(FlowState::Querying.can_transition_to(FlowState::NoData));
        assert!(FlowState::Querying.can_transition_to(FlowState::Presenting));
        assert!(FlowState::Querying.can_transition_to(FlowState::Error));

        assert!(!FlowState::Idle.can_transition_to(FlowState::Querying));
        assert!(!FlowState::Validating.can_transition_to(FlowState::Error));
        assert!(!FlowState::NoData.can_transition_to(FlowState::Presenting));
        assert!(!FlowState::Error.can_transition_to(FlowState::Idle));
    }

    #[test]
    fn test_terminal_states() {
        assert!(FlowState::NoData.is_terminal());
        assert!(FlowState::Presenting.is_terminal());
        assert!(FlowState::Error.is_terminal());
        assert!(!FlowState::Querying.is_terminal());
    }

    #[test]
    fn test_present_settings_locale() {
        let settings = PresentSettings::new(ChartConfig::default(), "es-ES");
        assert_eq!(settings.locale, "es");
        assert_eq!(settings.labels.x_label, "Fecha");
    }
}
