//! Expectation registry.
//!
//! Maps every [`ExpectationKind`] to the recorder, extractor and verifier
//! that implement it. The standard table is built once, on first use of
//! [`ExpectationRegistry::global`], and is read-only afterwards.
//!
//! Entries come in three forms:
//! - a *pipeline* (recorder, optional extractor, verifier);
//! - a *display* entry (recorder only, which prints what it saw);
//! - a *cancel* entry, which deactivates another kind for one session.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use qperf_core::ExpectationKind;

use crate::error::SqlPerfError;
use crate::extract::{self, MeasureExtractor};
use crate::recorder::RecorderKind;
use crate::verify::{
    AnalyzeSqlVerifier, BatchingVerifier, Bound, ConnectionLeakVerifier, CountVerifier,
    ExecutionTimeVerifier, PerfIssueVerifier, SameSelectTypesVerifier, SameSelectsVerifier,
    StatementCheck, StatementListVerifier, Subject,
};

static EXACT_EXECUTIONS: CountVerifier = CountVerifier::new(Bound::Exactly, Subject::Executions);
static MAX_EXECUTIONS: CountVerifier = CountVerifier::new(Bound::AtMost, Subject::Executions);
static EXACT_SELECTS: CountVerifier = CountVerifier::new(Bound::Exactly, Subject::Selects);
static MAX_SELECTS: CountVerifier = CountVerifier::new(Bound::AtMost, Subject::Selects);
static EXACT_INSERTS: CountVerifier = CountVerifier::new(Bound::Exactly, Subject::Inserts);
static MAX_INSERTS: CountVerifier = CountVerifier::new(Bound::AtMost, Subject::Inserts);
static EXACT_UPDATES: CountVerifier = CountVerifier::new(Bound::Exactly, Subject::Updates);
static MAX_UPDATES: CountVerifier = CountVerifier::new(Bound::AtMost, Subject::Updates);
static EXACT_DELETES: CountVerifier = CountVerifier::new(Bound::Exactly, Subject::Deletes);
static MAX_DELETES: CountVerifier = CountVerifier::new(Bound::AtMost, Subject::Deletes);
static EXACT_SELECTED_COLUMNS: CountVerifier =
    CountVerifier::new(Bound::Exactly, Subject::SelectedColumns);
static MAX_SELECTED_COLUMNS: CountVerifier =
    CountVerifier::new(Bound::AtMost, Subject::MaxSelectedColumns);
static EXACT_UPDATED_COLUMNS: CountVerifier =
    CountVerifier::new(Bound::Exactly, Subject::UpdatedColumns);
static MAX_UPDATED_COLUMNS: CountVerifier =
    CountVerifier::new(Bound::AtMost, Subject::MaxUpdatedColumns);
static UNBOUND: StatementListVerifier = StatementListVerifier::new(StatementCheck::BindParameters);
static LEADING_WILDCARD: StatementListVerifier =
    StatementListVerifier::new(StatementCheck::LeadingWildcard);
static PLAIN_STATEMENTS: StatementListVerifier =
    StatementListVerifier::new(StatementCheck::PlainStatements);

/// One registry entry.
#[derive(Clone, Copy)]
pub struct ExpectationConfig {
    pub kind: ExpectationKind,
    pub recorder: Option<RecorderKind>,
    pub extractor: Option<&'static dyn MeasureExtractor>,
    pub verifier: Option<&'static dyn PerfIssueVerifier>,
    /// Set on cancel entries only.
    pub cancels: Option<ExpectationKind>,
}

impl ExpectationConfig {
    /// Recorder feeding an optional extractor and a verifier. Without an
    /// extractor the verifier reads the recorder directly.
    #[must_use]
    pub const fn pipeline(
        kind: ExpectationKind,
        recorder: RecorderKind,
        extractor: Option<&'static dyn MeasureExtractor>,
        verifier: &'static dyn PerfIssueVerifier,
    ) -> Self {
        Self {
            kind,
            recorder: Some(recorder),
            extractor,
            verifier: Some(verifier),
            cancels: None,
        }
    }

    /// Recorder whose report is printed; nothing is verified.
    #[must_use]
    pub const fn display(kind: ExpectationKind, recorder: RecorderKind) -> Self {
        Self {
            kind,
            recorder: Some(recorder),
            extractor: None,
            verifier: None,
            cancels: None,
        }
    }

    /// Deactivates `cancelled` for the session declaring `kind`.
    #[must_use]
    pub const fn cancel(kind: ExpectationKind, cancelled: ExpectationKind) -> Self {
        Self {
            kind,
            recorder: None,
            extractor: None,
            verifier: None,
            cancels: Some(cancelled),
        }
    }

    #[must_use]
    pub const fn is_cancel(&self) -> bool {
        self.cancels.is_some()
    }

    /// Check the shape of this entry on its own.
    ///
    /// # Errors
    ///
    /// Returns `SqlPerfError::InvalidRegistry` when a cancel entry carries a
    /// pipeline, a cancel entry cancels itself, a non-cancel entry has no
    /// recorder, or an extractor has no verifier to feed.
    pub fn validate(&self) -> Result<(), SqlPerfError> {
        let invalid = |reason| SqlPerfError::InvalidRegistry {
            kind: self.kind,
            reason,
        };
        match self.cancels {
            Some(cancelled) => {
                if self.recorder.is_some() || self.extractor.is_some() || self.verifier.is_some() {
                    return Err(invalid("cancel entries supply no recorder, extractor or verifier"));
                }
                if cancelled == self.kind {
                    return Err(invalid("an entry cannot cancel itself"));
                }
            }
            None => {
                if self.recorder.is_none() {
                    return Err(invalid("entry has no recorder"));
                }
                if self.extractor.is_some() && self.verifier.is_none() {
                    return Err(invalid("extractor has no verifier"));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ExpectationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectationConfig")
            .field("kind", &self.kind)
            .field("recorder", &self.recorder)
            .field("extractor", &self.extractor.map(|e| e.name()))
            .field("verifier", &self.verifier.is_some())
            .field("cancels", &self.cancels)
            .finish()
    }
}

/// Lookup table from expectation kind to its configuration.
#[derive(Debug)]
pub struct ExpectationRegistry {
    entries: HashMap<ExpectationKind, ExpectationConfig>,
}

impl ExpectationRegistry {
    /// The process-wide standard registry.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ExpectationRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::standard)
    }

    /// Every built-in expectation kind.
    #[must_use]
    pub fn standard() -> Self {
        use ExpectationKind as K;
        use RecorderKind as R;

        let persisted = |kind,
                         extractor: &'static dyn MeasureExtractor,
                         verifier: &'static dyn PerfIssueVerifier| {
            ExpectationConfig::pipeline(kind, R::Persistence, Some(extractor), verifier)
        };

        let entries = [
            persisted(
                K::ExpectJdbcQueryExecution,
                &extract::EXECUTION_COUNT,
                &EXACT_EXECUTIONS,
            ),
            persisted(
                K::ExpectMaxJdbcQueryExecution,
                &extract::EXECUTION_COUNT,
                &MAX_EXECUTIONS,
            ),
            persisted(K::ExpectSelect, &extract::SELECT_COUNT, &EXACT_SELECTS),
            persisted(K::ExpectMaxSelect, &extract::SELECT_COUNT, &MAX_SELECTS),
            persisted(K::ExpectInsert, &extract::INSERT_COUNT, &EXACT_INSERTS),
            persisted(K::ExpectMaxInsert, &extract::INSERT_COUNT, &MAX_INSERTS),
            persisted(K::ExpectUpdate, &extract::UPDATE_COUNT, &EXACT_UPDATES),
            persisted(K::ExpectMaxUpdate, &extract::UPDATE_COUNT, &MAX_UPDATES),
            persisted(K::ExpectDelete, &extract::DELETE_COUNT, &EXACT_DELETES),
            persisted(K::ExpectMaxDelete, &extract::DELETE_COUNT, &MAX_DELETES),
            persisted(
                K::ExpectSelectedColumn,
                &extract::SELECTED_COLUMNS,
                &EXACT_SELECTED_COLUMNS,
            ),
            persisted(
                K::ExpectMaxSelectedColumn,
                &extract::MAX_SELECTED_COLUMNS,
                &MAX_SELECTED_COLUMNS,
            ),
            persisted(
                K::ExpectUpdatedColumn,
                &extract::UPDATED_COLUMNS,
                &EXACT_UPDATED_COLUMNS,
            ),
            persisted(
                K::ExpectMaxUpdatedColumn,
                &extract::MAX_UPDATED_COLUMNS,
                &MAX_UPDATED_COLUMNS,
            ),
            persisted(
                K::DisableSameSelects,
                &extract::SELECT_STATEMENTS,
                &SameSelectsVerifier,
            ),
            persisted(
                K::DisableSameSelectTypesWithDifferentParamValues,
                &extract::SELECT_STATEMENTS,
                &SameSelectTypesVerifier,
            ),
            persisted(
                K::DisableLikeWithLeadingWildcard,
                &extract::LEADING_WILDCARD_SELECTS,
                &LEADING_WILDCARD,
            ),
            persisted(
                K::DisableQueriesWithoutBindParameters,
                &extract::UNBOUND_STATEMENTS,
                &UNBOUND,
            ),
            persisted(
                K::DisableStatements,
                &extract::NON_PREPARED_STATEMENTS,
                &PLAIN_STATEMENTS,
            ),
            persisted(
                K::ExpectMaxQueryExecutionTime,
                &extract::MAX_EXECUTION_TIME,
                &ExecutionTimeVerifier,
            ),
            persisted(K::AnalyzeSql, &extract::SQL_ANALYSIS, &AnalyzeSqlVerifier),
            ExpectationConfig::pipeline(
                K::ExpectJdbcBatching,
                R::Batch,
                None,
                &BatchingVerifier,
            ),
            ExpectationConfig::pipeline(
                K::ExpectNoConnectionLeak,
                R::ConnectionLeak,
                None,
                &ConnectionLeakVerifier,
            ),
            ExpectationConfig::display(K::DisplaySql, R::Display),
            ExpectationConfig::display(K::DisplaySqlOfTestMethodBody, R::DisplayBody),
            ExpectationConfig::display(K::ProfileConnection, R::ConnectionProfiler),
        ];

        let mut map: HashMap<ExpectationKind, ExpectationConfig> =
            entries.into_iter().map(|config| (config.kind, config)).collect();
        for kind in ExpectationKind::ALL {
            if let Some(cancelled) = kind.cancels() {
                map.insert(kind, ExpectationConfig::cancel(kind, cancelled));
            }
        }
        Self { entries: map }
    }

    /// A custom registry, checked as a whole.
    ///
    /// # Errors
    ///
    /// Returns `SqlPerfError::InvalidRegistry` if an entry is malformed, a
    /// kind is registered twice, or a cancel entry targets an unregistered
    /// kind.
    pub fn from_entries(
        entries: impl IntoIterator<Item = ExpectationConfig>,
    ) -> Result<Self, SqlPerfError> {
        let mut map = HashMap::new();
        for config in entries {
            config.validate()?;
            if map.insert(config.kind, config).is_some() {
                return Err(SqlPerfError::InvalidRegistry {
                    kind: config.kind,
                    reason: "kind registered twice",
                });
            }
        }
        let registry = Self { entries: map };
        registry.validate_cancel_targets()?;
        Ok(registry)
    }

    /// # Errors
    ///
    /// Returns `SqlPerfError::UnknownExpectation` if `kind` was never registered.
    pub fn resolve(&self, kind: ExpectationKind) -> Result<&ExpectationConfig, SqlPerfError> {
        self.entries
            .get(&kind)
            .ok_or(SqlPerfError::UnknownExpectation(kind))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered kinds, in declaration order of [`ExpectationKind::ALL`].
    #[must_use]
    pub fn kinds(&self) -> Vec<ExpectationKind> {
        ExpectationKind::ALL
            .into_iter()
            .filter(|kind| self.entries.contains_key(kind))
            .collect()
    }

    fn validate_cancel_targets(&self) -> Result<(), SqlPerfError> {
        for config in self.entries.values() {
            if let Some(cancelled) = config.cancels {
                if !self.entries.contains_key(&cancelled) {
                    return Err(SqlPerfError::InvalidRegistry {
                        kind: config.kind,
                        reason: "cancels an unregistered kind",
                    });
                }
            }
        }
        Ok(())
    }
}
