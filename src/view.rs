//! Declarative view description for the wizard.
//!
//! The controller never touches a widget tree: every mutation ends in a
//! fresh [`WizardView`] built from the current draft, and a renderer binds
//! it to whatever surface hosts the wizard. Structural edits regenerate the
//! whole step; weight keystrokes only refresh the running total.

use serde::Serialize;

use crate::domain::{Draft, RubricDraft, RubricMode};

/// Fixed step definitions, in order.
pub const STEPS: [StepDef; 3] = [
  StepDef { icon: "📚", label: "Registro del curso" },
  StepDef { icon: "🎯", label: "Registro del tópico" },
  StepDef { icon: "📋", label: "Configuración de la rúbrica" },
];

/// Index of the final step.
pub const LAST_STEP: usize = STEPS.len() - 1;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct StepDef {
  pub icon: &'static str,
  pub label: &'static str,
}

/// Derived per-step status, from comparing against the active index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Completed,
  Active,
  Pending,
}

/// What a mutation asks of the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderEffect {
  /// Regenerate the step's whole markup and rebind events.
  Full,
  /// Only refresh the live total-weight display.
  TotalOnly,
}

#[derive(Clone, Debug, Serialize)]
pub struct StepView {
  pub icon: &'static str,
  pub label: &'static str,
  pub status: StepStatus,
}

/// Full description of the wizard at one instant.
#[derive(Clone, Debug, Serialize)]
pub struct WizardView {
  pub title: &'static str,
  pub subtitle: &'static str,
  pub steps: Vec<StepView>,
  pub current: usize,
  pub body: StepBody,
  /// Finish is disabled while a submission is in flight.
  pub submitting: bool,
}

/// Step-local form state, ready for display.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepBody {
  CourseInfo {
    course_id: Option<i64>,
    course_name: String,
    course_code: String,
    instructor: String,
    period: String,
  },
  TopicDetails {
    topic: String,
    topic_description: String,
  },
  RubricConfig {
    mode: RubricMode,
    rubric_id: Option<i64>,
    rubric: RubricDraft,
    total_weight: u32,
    /// True when the live total already sits at exactly 100.
    weights_balanced: bool,
  },
}

/// Build the view for the given step index and draft.
pub fn build_view(current: usize, draft: &Draft, submitting: bool) -> WizardView {
  let steps = STEPS
    .iter()
    .enumerate()
    .map(|(i, def)| StepView {
      icon: def.icon,
      label: def.label,
      status: status_of(i, current),
    })
    .collect();

  let body = match current {
    0 => StepBody::CourseInfo {
      course_id: draft.course_id,
      course_name: draft.course_name.clone(),
      course_code: draft.course_code.clone(),
      instructor: draft.instructor.clone(),
      period: draft.period.clone(),
    },
    1 => StepBody::TopicDetails {
      topic: draft.topic.clone(),
      topic_description: draft.topic_description.clone(),
    },
    _ => {
      let total = draft.rubric.total_weight_percent();
      StepBody::RubricConfig {
        mode: draft.rubric_mode,
        rubric_id: draft.rubric_id,
        rubric: draft.rubric.clone(),
        total_weight: total,
        weights_balanced: total == 100,
      }
    }
  };

  WizardView {
    title: "Configuración inicial",
    subtitle: "Configura el curso, tema y rúbrica antes de comenzar el análisis de documentos",
    steps,
    current,
    body,
    submitting,
  }
}

fn status_of(index: usize, current: usize) -> StepStatus {
  use std::cmp::Ordering;
  match index.cmp(&current) {
    Ordering::Less => StepStatus::Completed,
    Ordering::Equal => StepStatus::Active,
    Ordering::Greater => StepStatus::Pending,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_derive_from_index_comparison() {
    let draft = Draft::default();
    let v = build_view(1, &draft, false);
    let statuses: Vec<StepStatus> = v.steps.iter().map(|s| s.status).collect();
    assert_eq!(
      statuses,
      vec![StepStatus::Completed, StepStatus::Active, StepStatus::Pending]
    );
  }

  #[test]
  fn final_step_body_carries_the_live_total() {
    let mut draft = Draft::default();
    draft.rubric.criteria[0].weight = 1.0;
    let v = build_view(2, &draft, false);
    match v.body {
      StepBody::RubricConfig { total_weight, weights_balanced, .. } => {
        assert_eq!(total_weight, 100);
        assert!(weights_balanced);
      }
      other => panic!("unexpected body: {other:?}"),
    }
  }
}
