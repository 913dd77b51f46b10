use std::fmt::Write as _;

use qperf_core::PerfIssue;

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, statements_input};
use crate::analysis::AnalyzedStatement;
use crate::error::SqlPerfError;
use crate::render::{render_statement, render_statements};
use crate::suggestion::Suggestion;

/// Which property the offending statements break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCheck {
    BindParameters,
    LeadingWildcard,
    PlainStatements,
}

/// Flags when the extracted statement subset is non-empty and lists it.
#[derive(Debug, Clone, Copy)]
pub struct StatementListVerifier {
    check: StatementCheck,
}

impl StatementListVerifier {
    #[must_use]
    pub const fn new(check: StatementCheck) -> Self {
        Self { check }
    }
}

impl PerfIssueVerifier for StatementListVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let offending = statements_input(ctx, input)?;
        if offending.is_empty() {
            return Ok(PerfIssue::NONE);
        }

        let mut description = String::new();
        match self.check {
            StatementCheck::BindParameters => {
                let _ = writeln!(
                    description,
                    "Statements with values written inline instead of bind parameters ({}):\n",
                    offending.len()
                );
                for event in offending {
                    let literals = AnalyzedStatement::new(event).inline_literals();
                    let _ = writeln!(
                        description,
                        "\t{} (inline: {})",
                        render_statement(event, ctx.display),
                        literals.join(", ")
                    );
                }
                description.push('\n');
                Suggestion::BindParameters.append_to(&mut description, ctx.frameworks);
            }
            StatementCheck::LeadingWildcard => {
                let _ = writeln!(
                    description,
                    "LIKE with a leading wildcard ({}):\n",
                    offending.len()
                );
                for event in offending {
                    let analyzed = AnalyzedStatement::new(event);
                    for pattern in analyzed
                        .like_patterns()
                        .into_iter()
                        .filter(|p| p.has_leading_wildcard())
                    {
                        let _ = writeln!(
                            description,
                            "\t'{}' in {}",
                            pattern.pattern,
                            render_statement(event, ctx.display)
                        );
                    }
                }
                description.push('\n');
                Suggestion::LeadingWildcard.append_to(&mut description, ctx.frameworks);
            }
            StatementCheck::PlainStatements => {
                let _ = writeln!(
                    description,
                    "Statements sent as plain text instead of prepared statements ({}):\n",
                    offending.len()
                );
                description.push_str(&render_statements(offending, ctx.display));
                description.push('\n');
                Suggestion::PreparedStatements.append_to(&mut description, ctx.frameworks);
            }
        }
        Ok(PerfIssue::new(description))
    }
}
