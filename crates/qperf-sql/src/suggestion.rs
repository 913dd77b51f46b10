//! Framework-aware hints appended to issue descriptions.

use crate::framework::FrameworkCapabilities;

/// The family of advice an issue calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suggestion {
    /// Repeated selects of one shape: the N+1 select pattern.
    NPlusOneSelect,
    /// Write statements sent one round-trip at a time.
    Batching,
    /// Values inlined into statement text.
    BindParameters,
    /// More columns fetched than the caller needs.
    SelectedColumns,
    /// More columns written than the caller changed.
    UpdatedColumns,
    /// Connections acquired and never given back.
    ConnectionLeak,
    /// `LIKE` patterns starting with a wildcard.
    LeadingWildcard,
    /// Statements sent as plain text.
    PreparedStatements,
}

impl Suggestion {
    const fn generic(self) -> &'static str {
        match self {
            Self::NPlusOneSelect => {
                "Perhaps you are facing an N+1 select issue: the same query runs once per \
                 parent row. Fetch the children with one query (a join or an IN list) instead."
            }
            Self::Batching => {
                "Perhaps statements are sent one by one. Group them into a single batch \
                 or a multi-row statement to save round-trips."
            }
            Self::BindParameters => {
                "Use bind parameters so the database can reuse execution plans \
                 and values cannot inject SQL."
            }
            Self::SelectedColumns => {
                "Select only the columns the code reads instead of whole rows."
            }
            Self::UpdatedColumns => "Write only the columns whose values changed.",
            Self::ConnectionLeak => "Close every connection you acquire, also on error paths.",
            Self::LeadingWildcard => {
                "A pattern starting with % or _ cannot use an index range scan. \
                 Anchor the pattern or use a full-text index."
            }
            Self::PreparedStatements => {
                "Prepared statements let the database reuse execution plans."
            }
        }
    }

    const fn with_orm(self) -> Option<&'static str> {
        match self {
            Self::NPlusOneSelect => Some(
                "With an ORM, an eagerly loaded or lazily iterated association usually causes \
                 this. Load the association with a join fetch or a batched preload.",
            ),
            Self::Batching => Some(
                "With an ORM, configure a write batch size and keep inserts and updates \
                 of one entity type together so the ORM can batch them.",
            ),
            Self::SelectedColumns => Some(
                "With an ORM, load a projection (a dedicated read model) instead of full \
                 entities.",
            ),
            Self::UpdatedColumns => Some(
                "With an ORM, enable dynamic updates so only dirty fields are written.",
            ),
            Self::ConnectionLeak => Some(
                "With an ORM, let it scope sessions to a unit of work instead of opening \
                 them by hand.",
            ),
            Self::PreparedStatements => Some(
                "With an ORM, avoid native query strings built by concatenation; use its \
                 query API with parameters.",
            ),
            Self::BindParameters | Self::LeadingWildcard => None,
        }
    }

    const fn with_orm_and_web(self) -> Option<&'static str> {
        match self {
            Self::NPlusOneSelect => Some(
                "With repository-based data access, declare the association fetch on the \
                 repository query rather than traversing it from the web layer.",
            ),
            Self::Batching => Some(
                "With repository-based data access, prefer a save-all style call \
                 over saving entities in a loop.",
            ),
            Self::ConnectionLeak => Some(
                "With a web framework, bind the connection to the request and release it \
                 when the response is written.",
            ),
            Self::LeadingWildcard => Some(
                "With repository-based data access, prefer starts-with queries over \
                 contains or ends-with queries.",
            ),
            Self::BindParameters
            | Self::SelectedColumns
            | Self::UpdatedColumns
            | Self::PreparedStatements => None,
        }
    }

    /// Append the applicable hints, one per tab-indented line.
    pub fn append_to(self, description: &mut String, frameworks: &dyn FrameworkCapabilities) {
        let orm = frameworks.orm_present();
        let hints = [
            Some(self.generic()),
            self.with_orm().filter(|_| orm),
            self.with_orm_and_web()
                .filter(|_| orm && frameworks.web_framework_present()),
        ];
        for hint in hints.into_iter().flatten() {
            description.push('\t');
            description.push_str(hint);
            description.push('\n');
        }
    }
}
