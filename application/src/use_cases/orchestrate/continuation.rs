//! Continuation engine: which agent follows a successful step.

use forge_domain::{AgentOutput, AgentType, TaskType};
use tracing::{debug, warn};

/// The next agent after `previous` succeeded with `data`, or `None` to stop.
///
/// - Product continues to Coder only with a non-empty story list.
/// - Coder always continues to Test.
/// - Test continues to Security only on a passing verdict.
/// - Security ends the chain.
pub fn determine_continuation_agent(
    previous: AgentType,
    data: Option<&AgentOutput>,
    task_type: Option<TaskType>,
) -> Option<AgentType> {
    let next = match previous {
        AgentType::Product => match data {
            Some(AgentOutput::UserStories(stories)) if !stories.is_empty() => {
                Some(AgentType::Coder)
            }
            _ => None,
        },
        AgentType::Coder => Some(AgentType::Test),
        AgentType::Test => match data {
            Some(AgentOutput::TestReport(report)) if report.success == Some(true) => {
                Some(AgentType::Security)
            }
            _ => None,
        },
        AgentType::Security => None,
    };
    debug!(
        previous = %previous,
        task_type = ?task_type,
        next = ?next,
        "Continuation determined"
    );
    next
}

/// Same as [`determine_continuation_agent`] for an agent given by name.
/// Unknown names stop the chain.
pub fn determine_continuation_by_name(
    previous: &str,
    data: Option<&AgentOutput>,
    task_type: Option<TaskType>,
) -> Option<AgentType> {
    match previous.parse::<AgentType>() {
        Ok(agent) => determine_continuation_agent(agent, data, task_type),
        Err(e) => {
            warn!(agent = previous, error = %e, "Unknown agent, no continuation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::{GeneratedCode, SecurityReport, TestReport, UserStory};

    #[test]
    fn test_product_needs_stories() {
        let empty = AgentOutput::UserStories(vec![]);
        assert_eq!(
            determine_continuation_agent(AgentType::Product, Some(&empty), None),
            None
        );

        let one = AgentOutput::UserStories(vec![UserStory::new("US-1", "Create todo")]);
        assert_eq!(
            determine_continuation_agent(AgentType::Product, Some(&one), None),
            Some(AgentType::Coder)
        );
        assert_eq!(determine_continuation_agent(AgentType::Product, None, None), None);
    }

    #[test]
    fn test_coder_always_goes_to_test() {
        let code = AgentOutput::Code(GeneratedCode::default());
        assert_eq!(
            determine_continuation_agent(AgentType::Coder, Some(&code), Some(TaskType::Fix)),
            Some(AgentType::Test)
        );
        assert_eq!(
            determine_continuation_agent(AgentType::Coder, None, None),
            Some(AgentType::Test)
        );
    }

    #[test]
    fn test_test_needs_passing_verdict() {
        let passed = AgentOutput::TestReport(TestReport::passed());
        let failed = AgentOutput::TestReport(TestReport::failed(vec!["x".to_string()]));
        let unknown = AgentOutput::TestReport(TestReport::default());

        assert_eq!(
            determine_continuation_agent(AgentType::Test, Some(&passed), None),
            Some(AgentType::Security)
        );
        assert_eq!(determine_continuation_agent(AgentType::Test, Some(&failed), None), None);
        assert_eq!(determine_continuation_agent(AgentType::Test, Some(&unknown), None), None);
    }

    #[test]
    fn test_security_ends_chain() {
        let report = AgentOutput::SecurityReport(SecurityReport::default());
        assert_eq!(
            determine_continuation_agent(AgentType::Security, Some(&report), None),
            None
        );
    }

    #[test]
    fn test_by_name() {
        let code = AgentOutput::Code(GeneratedCode::default());
        assert_eq!(
            determine_continuation_by_name("coder", Some(&code), None),
            Some(AgentType::Test)
        );
        assert_eq!(determine_continuation_by_name("designer", Some(&code), None), None);
    }
}
