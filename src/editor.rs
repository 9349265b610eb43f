//! Nested rubric editor: fine-grained edits over the rubric -> criteria ->
//! levels -> descriptors tree, keeping its invariants intact.
//!
//! Invariants maintained here:
//!   - at least one criterion exists at all times
//!   - at least one level per criterion
//!   - `order` fields stay contiguous 1..n after any insert/delete
//!   - weights stay inside (0, 1]; level scores inside [0, 20]
//!   - free text passes through the sanitizer before it is stored

use thiserror::Error;
use tracing::debug;

use crate::config::WizardDefaults;
use crate::domain::{CriterionDraft, LevelDraft, RubricDraft, SCORE_MAX, SCORE_MIN};
use crate::validate::sanitize_typing;

/// Invariant violations reported by the editor. All are recoverable: the
/// offending operation becomes a no-op.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EditorError {
  #[error("Debe haber al menos un criterio")]
  LastCriterion,
  #[error("Cada criterio necesita al menos un nivel")]
  LastLevel,
  #[error("Índice fuera de rango")]
  BadIndex,
}

impl RubricDraft {
  /// Append a new criterion built from the configured defaults.
  pub fn add_criterion(&mut self, defaults: &WizardDefaults) {
    let order = self.criteria.len() as u32 + 1;
    let mut c = CriterionDraft::starter(order);
    c.weight = defaults.default_weight;
    if let Some(level) = c.levels.first_mut() {
      level.name = defaults.default_level_name.clone();
      level.min_score = defaults.default_level_score;
      level.max_score = defaults.default_level_score;
    }
    debug!(target: "wizard", order, "Criterio agregado");
    self.criteria.push(c);
  }

  /// Remove the criterion at `index`. Rejected when it is the last one.
  pub fn delete_criterion(&mut self, index: usize) -> Result<(), EditorError> {
    if index >= self.criteria.len() {
      return Err(EditorError::BadIndex);
    }
    if self.criteria.len() == 1 {
      return Err(EditorError::LastCriterion);
    }
    self.criteria.remove(index);
    self.renumber_criteria();
    debug!(target: "wizard", index, remaining = self.criteria.len(), "Criterio eliminado");
    Ok(())
  }

  pub fn set_name(&mut self, value: &str) {
    self.name = sanitize_typing(value);
  }

  pub fn set_description(&mut self, value: &str) {
    self.description = sanitize_typing(value);
  }

  pub fn set_criterion_name(&mut self, index: usize, value: &str) -> Result<(), EditorError> {
    let c = self.criteria.get_mut(index).ok_or(EditorError::BadIndex)?;
    c.name = sanitize_typing(value);
    Ok(())
  }

  pub fn set_criterion_description(&mut self, index: usize, value: &str) -> Result<(), EditorError> {
    let c = self.criteria.get_mut(index).ok_or(EditorError::BadIndex)?;
    c.description = sanitize_typing(value);
    Ok(())
  }

  /// Store a criterion weight given as a whole percent. The input is clamped
  /// to [1, 100] and kept as a fraction; returns the fresh total so callers
  /// can refresh the live percentage display.
  pub fn set_criterion_weight_percent(
    &mut self,
    index: usize,
    percent: f64,
  ) -> Result<u32, EditorError> {
    let c = self.criteria.get_mut(index).ok_or(EditorError::BadIndex)?;
    let percent = if percent.is_finite() { percent.clamp(1.0, 100.0) } else { 1.0 };
    c.weight = percent / 100.0;
    Ok(self.total_weight_percent())
  }

  /// Append a new level to the criterion at `criterion_index`.
  pub fn add_level(
    &mut self,
    criterion_index: usize,
    defaults: &WizardDefaults,
  ) -> Result<(), EditorError> {
    let c = self
      .criteria
      .get_mut(criterion_index)
      .ok_or(EditorError::BadIndex)?;
    let order = c.levels.len() as u32 + 1;
    let mut level = LevelDraft::starter(order);
    level.name = defaults.default_level_name.clone();
    level.min_score = defaults.default_level_score;
    level.max_score = defaults.default_level_score;
    c.levels.push(level);
    Ok(())
  }

  /// Remove a level. Rejected when it is the criterion's last one.
  pub fn delete_level(
    &mut self,
    criterion_index: usize,
    level_index: usize,
  ) -> Result<(), EditorError> {
    let c = self
      .criteria
      .get_mut(criterion_index)
      .ok_or(EditorError::BadIndex)?;
    if level_index >= c.levels.len() {
      return Err(EditorError::BadIndex);
    }
    if c.levels.len() == 1 {
      return Err(EditorError::LastLevel);
    }
    c.levels.remove(level_index);
    for (i, level) in c.levels.iter_mut().enumerate() {
      level.order = (i + 1) as u32;
    }
    Ok(())
  }

  pub fn set_level_name(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: &str,
  ) -> Result<(), EditorError> {
    let level = self.level_mut(criterion_index, level_index)?;
    level.name = sanitize_typing(value);
    Ok(())
  }

  /// Overwrite the level's single descriptor. Add/remove of descriptors is
  /// intentionally not exposed: current policy is exactly one per level.
  pub fn set_level_descriptor(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: &str,
  ) -> Result<(), EditorError> {
    let level = self.level_mut(criterion_index, level_index)?;
    let text = sanitize_typing(value);
    if level.descriptors.is_empty() {
      level.descriptors.push(text);
    } else {
      level.descriptors[0] = text;
    }
    Ok(())
  }

  pub fn set_level_min_score(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: f64,
  ) -> Result<(), EditorError> {
    let level = self.level_mut(criterion_index, level_index)?;
    level.min_score = clamp_score(value);
    Ok(())
  }

  pub fn set_level_max_score(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: f64,
  ) -> Result<(), EditorError> {
    let level = self.level_mut(criterion_index, level_index)?;
    level.max_score = clamp_score(value);
    Ok(())
  }

  /// Sum of all criteria weights, rounded to a whole percent. The live
  /// display uses this; finishing requires it to be exactly 100.
  pub fn total_weight_percent(&self) -> u32 {
    let total: f64 = self.criteria.iter().map(|c| c.weight).sum();
    (total * 100.0).round().max(0.0) as u32
  }

  fn renumber_criteria(&mut self) {
    for (i, c) in self.criteria.iter_mut().enumerate() {
      c.order = (i + 1) as u32;
    }
  }

  fn level_mut(
    &mut self,
    criterion_index: usize,
    level_index: usize,
  ) -> Result<&mut LevelDraft, EditorError> {
    self
      .criteria
      .get_mut(criterion_index)
      .ok_or(EditorError::BadIndex)?
      .levels
      .get_mut(level_index)
      .ok_or(EditorError::BadIndex)
  }
}

fn clamp_score(value: f64) -> f64 {
  if value.is_finite() {
    value.clamp(SCORE_MIN, SCORE_MAX)
  } else {
    SCORE_MIN
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn defaults() -> WizardDefaults {
    WizardDefaults::default()
  }

  #[test]
  fn total_weight_is_rounded_sum_of_percents() {
    let mut r = RubricDraft::default();
    let d = defaults();
    r.add_criterion(&d);
    r.add_criterion(&d);
    r.criteria[0].weight = 1.0 / 3.0;
    r.criteria[1].weight = 1.0 / 3.0;
    r.criteria[2].weight = 1.0 / 3.0;
    assert_eq!(r.total_weight_percent(), 100);

    r.criteria[2].weight = 0.24;
    // 0.3333 + 0.3333 + 0.24 = 0.9066 -> 91
    assert_eq!(r.total_weight_percent(), 91);
  }

  #[test]
  fn deleting_the_sole_criterion_is_rejected() {
    let mut r = RubricDraft::default();
    assert_eq!(r.delete_criterion(0), Err(EditorError::LastCriterion));
    assert_eq!(r.criteria.len(), 1);
  }

  #[test]
  fn deleting_the_sole_level_is_rejected() {
    let mut r = RubricDraft::default();
    assert_eq!(r.delete_level(0, 0), Err(EditorError::LastLevel));
    assert_eq!(r.criteria[0].levels.len(), 1);
  }

  #[test]
  fn orders_stay_contiguous_after_add_and_delete() {
    let mut r = RubricDraft::default();
    let d = defaults();
    r.add_criterion(&d);
    r.add_criterion(&d);
    r.add_criterion(&d);
    r.delete_criterion(1).unwrap();
    let orders: Vec<u32> = r.criteria.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);

    r.delete_criterion(0).unwrap();
    let orders: Vec<u32> = r.criteria.iter().map(|c| c.order).collect();
    assert_eq!(orders, vec![1, 2]);
  }

  #[test]
  fn level_orders_renumber_after_delete() {
    let mut r = RubricDraft::default();
    let d = defaults();
    r.add_level(0, &d).unwrap();
    r.add_level(0, &d).unwrap();
    r.delete_level(0, 0).unwrap();
    let orders: Vec<u32> = r.criteria[0].levels.iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![1, 2]);
  }

  #[test]
  fn weight_percent_is_clamped_and_stored_as_fraction() {
    let mut r = RubricDraft::default();
    let total = r.set_criterion_weight_percent(0, 250.0).unwrap();
    assert!((r.criteria[0].weight - 1.0).abs() < f64::EPSILON);
    assert_eq!(total, 100);

    r.set_criterion_weight_percent(0, 0.0).unwrap();
    assert!((r.criteria[0].weight - 0.01).abs() < f64::EPSILON);

    r.set_criterion_weight_percent(0, f64::NAN).unwrap();
    assert!((r.criteria[0].weight - 0.01).abs() < f64::EPSILON);
  }

  #[test]
  fn scores_are_clamped_to_the_band() {
    let mut r = RubricDraft::default();
    r.set_level_min_score(0, 0, -5.0).unwrap();
    r.set_level_max_score(0, 0, 99.0).unwrap();
    let level = &r.criteria[0].levels[0];
    assert_eq!(level.min_score, 0.0);
    assert_eq!(level.max_score, 20.0);
  }

  #[test]
  fn text_setters_sanitize_before_storing() {
    let mut r = RubricDraft::default();
    r.set_criterion_name(0, "Claridad 100%").unwrap();
    assert_eq!(r.criteria[0].name, "Claridad");
    r.set_level_descriptor(0, 0, "Usa  3   fuentes").unwrap();
    assert_eq!(r.criteria[0].levels[0].descriptors[0], "Usa fuentes");
    r.set_name("Rúbrica <final>");
    assert_eq!(r.name, "Rúbrica final");
  }

  #[test]
  fn bad_indices_are_reported() {
    let mut r = RubricDraft::default();
    assert_eq!(r.delete_criterion(7), Err(EditorError::BadIndex));
    assert_eq!(r.set_criterion_name(7, "x"), Err(EditorError::BadIndex));
    assert_eq!(r.set_level_name(0, 7, "x"), Err(EditorError::BadIndex));
  }
}
