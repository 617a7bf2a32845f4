//! Input checks for callers that want an error instead of a no-op.

use crate::error::ValidationError;
use crate::session::LearningObjective;

/// Trimmed goal, or [`ValidationError::EmptyGoal`].
pub fn validate_goal(goal: &str) -> Result<&str, ValidationError> {
    let goal = goal.trim();
    if goal.is_empty() {
        Err(ValidationError::EmptyGoal)
    } else {
        Ok(goal)
    }
}

/// A completion percentage in `0..=100`.
pub fn validate_completion(field: &str, value: i64) -> Result<u8, ValidationError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| ValidationError::CompletionOutOfRange {
            field: field.to_string(),
            value,
        })
}

/// Pair objective texts with collected completion values, in order.
pub fn objectives_with_completion(
    objectives: &[LearningObjective],
    completion: &[i64],
) -> Result<Vec<LearningObjective>, ValidationError> {
    if objectives.len() != completion.len() {
        return Err(ValidationError::InvalidValue {
            field: "completion".into(),
            message: format!(
                "expected {} value(s), one per objective, got {}",
                objectives.len(),
                completion.len()
            ),
        });
    }
    objectives
        .iter()
        .zip(completion)
        .enumerate()
        .map(|(i, (objective, value))| {
            validate_completion(&format!("objectives[{i}]"), *value).map(|completed| {
                LearningObjective {
                    text: objective.text.clone(),
                    completed,
                }
            })
        })
        .collect()
}
