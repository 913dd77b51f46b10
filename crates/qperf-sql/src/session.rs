//! One test's instrumentation: activation, recording and verification.
//!
//! ```
//! use qperf_core::Expectation;
//! use qperf_sql::PerfSession;
//!
//! let session = PerfSession::activate(&[Expectation::max_select(1)])?;
//! let sink = session.sink();
//! session.enter_body()?;
//! // ... the interception layer calls `sink.notify_statement_executed(..)` ...
//! session.exit_body()?;
//! let outcome = session.finalize_and_verify()?;
//! assert!(outcome.is_clean());
//! # drop(sink);
//! # Ok::<(), qperf_sql::SqlPerfError>(())
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;

use qperf_config::{DisplayConfig, QperfConfig};
use qperf_core::{Expectation, ExpectationKind, PerfIssue};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SqlPerfError;
use crate::framework::{ConfiguredFrameworks, FrameworkCapabilities, NoFrameworks};
use crate::recorder::{EventRecorder, Phase, Recorder, RecorderKind};
use crate::registry::{ExpectationConfig, ExpectationRegistry};
use crate::sink::RecordingSink;
use crate::verify::{VerifierInput, VerifyContext};

/// An issue raised by one declared expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundIssue {
    pub kind: ExpectationKind,
    pub expectation: Expectation,
    pub issue: PerfIssue,
}

/// Result of [`PerfSession::finalize_and_verify`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    /// Non-NONE issues, in declaration order.
    pub issues: Vec<FoundIssue>,
    /// Rendered output of display-style expectations.
    pub reports: Vec<String>,
}

impl VerificationOutcome {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn issue_for(&self, kind: ExpectationKind) -> Option<&PerfIssue> {
        self.issues
            .iter()
            .find(|found| found.kind == kind)
            .map(|found| &found.issue)
    }

    /// All issue descriptions, each under a `[PERF]` header.
    #[must_use]
    pub fn failure_report(&self) -> String {
        let mut report = String::from("a performance-related property is not respected\n");
        for found in &self.issues {
            let _ = write!(
                report,
                "\n[PERF] {} ({})\n\n{}",
                found.expectation,
                found.kind,
                found.issue
            );
        }
        report
    }

    /// Turn any issue into an error for the test runner.
    ///
    /// # Errors
    ///
    /// Returns `SqlPerfError::PerfIssues` when at least one issue was found.
    pub fn into_result(self) -> Result<Self, SqlPerfError> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(SqlPerfError::PerfIssues {
                count: self.issues.len(),
                report: self.failure_report(),
            })
        }
    }

    /// # Errors
    ///
    /// Returns `SqlPerfError::Other` if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value, SqlPerfError> {
        serde_json::to_value(self).map_err(|e| SqlPerfError::Other(e.into()))
    }
}

/// A declaration that survived cancellation, with its registry entry.
#[derive(Debug, Clone, Copy)]
struct ActiveExpectation<'r> {
    expectation: &'r Expectation,
    config: &'r ExpectationConfig,
}

pub struct SessionBuilder<'r> {
    registry: &'r ExpectationRegistry,
    global: Vec<Expectation>,
    declarations: Vec<Expectation>,
    frameworks: Box<dyn FrameworkCapabilities>,
    display: DisplayConfig,
}

impl Default for SessionBuilder<'static> {
    fn default() -> Self {
        Self {
            registry: ExpectationRegistry::global(),
            global: Vec::new(),
            declarations: Vec::new(),
            frameworks: Box::new(NoFrameworks),
            display: DisplayConfig::default(),
        }
    }
}

impl<'r> SessionBuilder<'r> {
    /// Resolve against a custom registry instead of the standard one.
    #[must_use]
    pub fn registry<'s>(self, registry: &'s ExpectationRegistry) -> SessionBuilder<'s> {
        SessionBuilder {
            registry,
            global: self.global,
            declarations: self.declarations,
            frameworks: self.frameworks,
            display: self.display,
        }
    }

    /// Apply globally-enabled expectations, framework overrides and display
    /// options from configuration.
    #[must_use]
    pub fn config(mut self, config: &QperfConfig) -> Self {
        self.global.clone_from(&config.global.expectations);
        self.frameworks = Box::new(ConfiguredFrameworks::from(&config.frameworks));
        self.display = config.display;
        self
    }

    #[must_use]
    pub fn frameworks(mut self, frameworks: impl FrameworkCapabilities + 'static) -> Self {
        self.frameworks = Box::new(frameworks);
        self
    }

    #[must_use]
    pub const fn display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.declarations.push(expectation);
        self
    }

    #[must_use]
    pub fn expectations(mut self, expectations: impl IntoIterator<Item = Expectation>) -> Self {
        self.declarations.extend(expectations);
        self
    }

    /// Validate and resolve every declaration, apply cancellations and
    /// create one empty recorder per needed variant.
    ///
    /// Global declarations come first, so a test's own declaration of the
    /// same kind replaces the global one. A cancel entry suppresses its
    /// sibling wherever either was declared.
    ///
    /// # Errors
    ///
    /// Returns `SqlPerfError::InvalidDeclaration` for malformed parameters
    /// and `SqlPerfError::UnknownExpectation` for unregistered kinds.
    pub fn activate(self) -> Result<PerfSession<'r>, SqlPerfError> {
        let mut declarations = self.global;
        declarations.extend(self.declarations);

        let mut cancelled = BTreeSet::new();
        for declaration in &declarations {
            declaration.validate()?;
            if let Some(kind) = self.registry.resolve(declaration.kind)?.cancels {
                cancelled.insert(kind);
            }
        }

        let mut kept: Vec<Expectation> = Vec::new();
        for declaration in declarations {
            if self.registry.resolve(declaration.kind)?.is_cancel() {
                continue;
            }
            if cancelled.contains(&declaration.kind) {
                debug!(kind = %declaration.kind, "expectation cancelled for this session");
                continue;
            }
            match kept.iter_mut().find(|e| e.kind == declaration.kind) {
                Some(existing) => {
                    debug!(kind = %declaration.kind, "later declaration replaces earlier one");
                    *existing = declaration;
                }
                None => kept.push(declaration),
            }
        }

        let recorder_kinds: BTreeSet<RecorderKind> = kept
            .iter()
            .map(|e| self.registry.resolve(e.kind).map(|config| config.recorder))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();
        let recorders = recorder_kinds.iter().copied().map(Recorder::new).collect();

        debug!(
            active = ?kept.iter().map(|e| e.kind.as_str()).collect::<Vec<_>>(),
            recorders = ?recorder_kinds,
            cancelled = ?cancelled,
            "session activated"
        );

        Ok(PerfSession {
            registry: self.registry,
            expectations: kept,
            cancelled: cancelled.into_iter().collect(),
            sink: RecordingSink::new(recorders),
            frameworks: self.frameworks,
            display: self.display,
        })
    }
}

/// Instrumentation state of one test execution.
pub struct PerfSession<'r> {
    registry: &'r ExpectationRegistry,
    expectations: Vec<Expectation>,
    cancelled: Vec<ExpectationKind>,
    sink: RecordingSink,
    frameworks: Box<dyn FrameworkCapabilities>,
    display: DisplayConfig,
}

impl PerfSession<'static> {
    #[must_use]
    pub fn builder() -> SessionBuilder<'static> {
        SessionBuilder::default()
    }

    /// Activate against the standard registry with no framework hints.
    ///
    /// # Errors
    ///
    /// See [`SessionBuilder::activate`].
    pub fn activate(declarations: &[Expectation]) -> Result<Self, SqlPerfError> {
        Self::builder()
            .expectations(declarations.iter().cloned())
            .activate()
    }

    /// Activate with configuration: global expectations, framework capabilities
    /// and display options.
    ///
    /// # Errors
    ///
    /// See [`SessionBuilder::activate`].
    pub fn activate_with_config(
        declarations: &[Expectation],
        config: &QperfConfig,
    ) -> Result<Self, SqlPerfError> {
        Self::builder()
            .config(config)
            .expectations(declarations.iter().cloned())
            .activate()
    }
}

impl PerfSession<'_> {
    /// Handle for the driver-interception collaborator.
    #[must_use]
    pub fn sink(&self) -> RecordingSink {
        self.sink.clone()
    }

    /// Kinds that will be verified or displayed, in activation order.
    #[must_use]
    pub fn active_kinds(&self) -> Vec<ExpectationKind> {
        self.expectations.iter().map(|e| e.kind).collect()
    }

    #[must_use]
    pub fn is_active(&self, kind: ExpectationKind) -> bool {
        self.expectations.iter().any(|e| e.kind == kind)
    }

    /// Kinds suppressed by cancel declarations.
    #[must_use]
    pub fn cancelled_kinds(&self) -> &[ExpectationKind] {
        &self.cancelled
    }

    /// # Errors
    ///
    /// Returns `SqlPerfError::Instrumentation` once torn down.
    pub fn enter_body(&self) -> Result<(), SqlPerfError> {
        Ok(self.sink.set_phase(Phase::Body)?)
    }

    /// # Errors
    ///
    /// Returns `SqlPerfError::Instrumentation` once torn down.
    pub fn exit_body(&self) -> Result<(), SqlPerfError> {
        Ok(self.sink.set_phase(Phase::Setup)?)
    }

    /// Tear down, then extract and verify every active expectation.
    ///
    /// Late notifications on any clone of the sink fail from here on.
    ///
    /// # Errors
    ///
    /// Returns `SqlPerfError::Instrumentation` if the sink was already torn
    /// down or poisoned, and verifier errors for miswired registry entries.
    pub fn finalize_and_verify(self) -> Result<VerificationOutcome, SqlPerfError> {
        let recorders = self.sink.teardown()?;
        let mut outcome = VerificationOutcome::default();

        for expectation in &self.expectations {
            let active = ActiveExpectation {
                expectation,
                config: self.registry.resolve(expectation.kind)?,
            };
            let Some(recorder_kind) = active.config.recorder else {
                continue;
            };
            let Some(recorder) = recorders.iter().find(|r| r.kind() == recorder_kind) else {
                return Err(SqlPerfError::Other(anyhow::anyhow!(
                    "no {recorder_kind} recorder was activated for '{}'",
                    expectation.kind
                )));
            };
            self.verify_one(active, recorder, &mut outcome)?;
        }

        if outcome.is_clean() {
            debug!(reports = outcome.reports.len(), "verification passed");
        } else {
            warn!(issues = outcome.issues.len(), "performance issues found");
        }
        Ok(outcome)
    }

    fn verify_one(
        &self,
        active: ActiveExpectation<'_>,
        recorder: &Recorder,
        outcome: &mut VerificationOutcome,
    ) -> Result<(), SqlPerfError> {
        let ctx = VerifyContext {
            expectation: active.expectation,
            frameworks: self.frameworks.as_ref(),
            display: &self.display,
        };
        let Some(verifier) = active.config.verifier else {
            if let Some(report) = recorder.report(&self.display) {
                info!("{report}");
                outcome.reports.push(report);
            }
            return Ok(());
        };

        let measure = active
            .config
            .extractor
            .map(|extractor| extractor.extract(recorder.collected_events()));
        let input = measure
            .as_ref()
            .map_or(VerifierInput::Recorder(recorder), VerifierInput::Measure);

        if let Some(report) = verifier.report(&ctx, input)? {
            info!("{report}");
            outcome.reports.push(report);
        }
        let issue = verifier.verify(&ctx, input)?;
        if issue.is_issue() {
            debug!(kind = %active.expectation.kind, "expectation violated");
            outcome.issues.push(FoundIssue {
                kind: active.expectation.kind,
                expectation: active.expectation.clone(),
                issue,
            });
        }
        Ok(())
    }
}
