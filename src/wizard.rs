//! Step wizard controller: owns the draft and the step index, gates
//! navigation on validation, persists on every edit, and hands the finished
//! configuration to the remote collaborators.
//!
//! All mutation is synchronous and single-owner; the only awaited work is
//! the rubric submission inside `finish()`, which is guarded against
//! re-entry by an in-flight flag (the disabled Finish button).

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::WizardDefaults;
use crate::domain::{Curso, Draft, Rubrica, RubricMode};
use crate::editor::EditorError;
use crate::services::{CourseService, Notifier, RubricService, ServiceError, SessionProvider};
use crate::store::{persist_draft, restore_draft, DraftStore};
use crate::validate::{
  is_valid_course_code, is_valid_description_text, is_valid_person_name, is_valid_semester,
  sanitize,
};
use crate::view::{build_view, RenderEffect, WizardView, LAST_STEP};

/// Failures surfaced by the controller. Validation errors leave all state
/// untouched; submission errors leave the draft as-is so the user can retry.
#[derive(Debug, Error)]
pub enum WizardError {
  #[error("{message}")]
  Validation { field: String, message: String },
  #[error("No se pudo enviar la rúbrica: {0}")]
  Submission(#[from] ServiceError),
  #[error("Operación no disponible en este paso")]
  StepOutOfRange,
  #[error("Hay un envío en curso")]
  SubmissionInFlight,
}

impl WizardError {
  fn invalid(field: &str, message: impl Into<String>) -> Self {
    Self::Validation { field: field.into(), message: message.into() }
  }
}

impl From<EditorError> for WizardError {
  fn from(e: EditorError) -> Self {
    WizardError::invalid("rubrica", e.to_string())
  }
}

/// Result of a successful `finish()`.
#[derive(Clone, Copy, Debug)]
pub struct FinishOutcome {
  /// Server id of the rubric the configuration points at, when one exists.
  pub rubric_id: Option<i64>,
}

/// The wizard controller. Collaborators are injected at construction; there
/// are no globals.
pub struct WizardController {
  current: usize,
  draft: Draft,
  defaults: WizardDefaults,
  store: Arc<dyn DraftStore>,
  rubrics: Arc<dyn RubricService>,
  courses: Arc<dyn CourseService>,
  session: Arc<dyn SessionProvider>,
  notifier: Arc<dyn Notifier>,
  submitting: bool,
  full_renders: u64,
  total_refreshes: u64,
}

impl WizardController {
  /// Build the controller, restoring a previously persisted draft when one
  /// exists. A blank instructor is pre-filled from the session user.
  #[instrument(level = "info", skip_all)]
  pub fn new(
    store: Arc<dyn DraftStore>,
    rubrics: Arc<dyn RubricService>,
    courses: Arc<dyn CourseService>,
    session: Arc<dyn SessionProvider>,
    notifier: Arc<dyn Notifier>,
    defaults: WizardDefaults,
  ) -> Self {
    let draft = match restore_draft(store.as_ref()) {
      Some(d) => {
        info!(target: "wizard", "Borrador restaurado del almacén de sesión");
        d
      }
      None => Draft::default(),
    };
    let mut ctrl = Self {
      current: 0,
      draft,
      defaults,
      store,
      rubrics,
      courses,
      session,
      notifier,
      submitting: false,
      full_renders: 0,
      total_refreshes: 0,
    };
    ctrl.prefill_instructor();
    ctrl
  }

  pub fn current_step(&self) -> usize {
    self.current
  }

  pub fn draft(&self) -> &Draft {
    &self.draft
  }

  /// Declarative description of the wizard right now.
  pub fn view(&self) -> WizardView {
    build_view(self.current, &self.draft, self.submitting)
  }

  /// How many times the active step was fully regenerated. Lets a renderer
  /// (and the tests) observe the re-render loop.
  pub fn full_renders(&self) -> u64 {
    self.full_renders
  }

  /// How many times only the total-weight display was refreshed.
  pub fn total_refreshes(&self) -> u64 {
    self.total_refreshes
  }

  //
  // Step 0 / step 1 field edits. Every edit lands in the draft, is persisted,
  // and regenerates the step.
  //

  pub fn select_course(&mut self, curso: &Curso) {
    self.draft.course_id = Some(curso.id);
    self.draft.course_name = curso.nombre.clone();
    self.draft.course_code = curso.codigo.trim().to_string();
    self.touch();
  }

  pub fn set_course_code(&mut self, value: &str) {
    self.draft.course_code = value.trim().to_string();
    self.touch();
  }

  // Topic and instructor text is stored as typed; step validation rejects it
  // outright instead of silently rewriting it.
  pub fn set_instructor(&mut self, value: &str) {
    self.draft.instructor = value.to_string();
    self.touch();
  }

  pub fn set_period(&mut self, value: &str) {
    self.draft.period = value.trim().to_string();
    self.touch();
  }

  pub fn set_topic(&mut self, value: &str) {
    self.draft.topic = value.to_string();
    self.touch();
  }

  pub fn set_topic_description(&mut self, value: &str) {
    self.draft.topic_description = value.to_string();
    self.touch();
  }

  //
  // Step 2: rubric mode and nested editing. Structural edits re-render in
  // full; a weight keystroke only refreshes the total.
  //

  pub fn set_rubric_mode(&mut self, mode: RubricMode) {
    self.draft.rubric_mode = mode;
    self.touch();
  }

  pub fn select_existing_rubric(&mut self, id: i64) {
    self.draft.rubric_id = Some(id);
    self.touch();
  }

  pub fn set_save_rubric(&mut self, save: bool) {
    self.draft.save_rubric = save;
    self.touch();
  }

  pub fn set_rubric_name(&mut self, value: &str) {
    self.draft.rubric.set_name(value);
    self.touch();
  }

  pub fn set_rubric_description(&mut self, value: &str) {
    self.draft.rubric.set_description(value);
    self.touch();
  }

  pub fn add_criterion(&mut self) -> RenderEffect {
    self.draft.rubric.add_criterion(&self.defaults);
    self.touch();
    RenderEffect::Full
  }

  pub fn delete_criterion(&mut self, index: usize) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.delete_criterion(index))
  }

  pub fn set_criterion_name(&mut self, index: usize, value: &str) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.set_criterion_name(index, value))
  }

  pub fn set_criterion_description(
    &mut self,
    index: usize,
    value: &str,
  ) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.set_criterion_description(index, value))
  }

  /// Weight edits take the light path: persist, recompute the total, no full
  /// re-render. Returns the fresh total percent.
  pub fn set_criterion_weight_percent(
    &mut self,
    index: usize,
    percent: f64,
  ) -> Result<u32, WizardError> {
    match self.draft.rubric.set_criterion_weight_percent(index, percent) {
      Ok(total) => {
        persist_draft(self.store.as_ref(), &self.draft);
        self.total_refreshes += 1;
        Ok(total)
      }
      Err(e) => {
        let err = WizardError::from(e);
        self.notifier.show_error(&err.to_string());
        Err(err)
      }
    }
  }

  pub fn add_level(&mut self, criterion_index: usize) -> Result<RenderEffect, WizardError> {
    let defaults = self.defaults.clone();
    self.guarded(|d| d.rubric.add_level(criterion_index, &defaults))
  }

  pub fn delete_level(
    &mut self,
    criterion_index: usize,
    level_index: usize,
  ) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.delete_level(criterion_index, level_index))
  }

  pub fn set_level_name(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: &str,
  ) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.set_level_name(criterion_index, level_index, value))
  }

  pub fn set_level_descriptor(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: &str,
  ) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.set_level_descriptor(criterion_index, level_index, value))
  }

  pub fn set_level_min_score(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: f64,
  ) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.set_level_min_score(criterion_index, level_index, value))
  }

  pub fn set_level_max_score(
    &mut self,
    criterion_index: usize,
    level_index: usize,
    value: f64,
  ) -> Result<RenderEffect, WizardError> {
    self.guarded(|d| d.rubric.set_level_max_score(criterion_index, level_index, value))
  }

  //
  // Navigation
  //

  /// Advance after step-local validation. On failure the step index stays
  /// put and the message goes to the notifier.
  #[instrument(level = "info", skip(self), fields(step = self.current))]
  pub fn next(&mut self) -> Result<(), WizardError> {
    if self.current >= LAST_STEP {
      return Err(WizardError::StepOutOfRange);
    }
    let check = match self.current {
      0 => self.validate_step0(),
      _ => self.validate_step1(),
    };
    if let Err(e) = check {
      self.notifier.show_error(&e.to_string());
      return Err(e);
    }
    self.current += 1;
    self.touch();
    info!(target: "wizard", step = self.current, "Paso avanzado");
    Ok(())
  }

  /// Go back one step. Never validates; floor at the first step.
  pub fn previous(&mut self) {
    self.current = self.current.saturating_sub(1);
    self.full_renders += 1;
  }

  /// Close the wizard from the last step: full-tree validation, optional
  /// remote rubric creation, final persistence.
  #[instrument(level = "info", skip(self))]
  pub async fn finish(&mut self) -> Result<FinishOutcome, WizardError> {
    if self.current != LAST_STEP {
      return Err(WizardError::StepOutOfRange);
    }
    if self.submitting {
      warn!(target: "wizard", "Finalizar ignorado: envío en curso");
      return Err(WizardError::SubmissionInFlight);
    }
    self.submitting = true;
    self.full_renders += 1;
    let result = self.finish_inner().await;
    self.submitting = false;
    self.full_renders += 1;
    match &result {
      Ok(outcome) => {
        info!(target: "wizard", rubric_id = ?outcome.rubric_id, "Configuración completada");
        self.notifier.show_success("Configuración completada");
      }
      Err(e) => {
        self.notifier.show_error(&e.to_string());
      }
    }
    result
  }

  async fn finish_inner(&mut self) -> Result<FinishOutcome, WizardError> {
    match self.draft.rubric_mode {
      RubricMode::Existing => {
        if self.draft.rubric_id.is_none() {
          return Err(WizardError::invalid("rubrica", "Selecciona una rúbrica existente"));
        }
      }
      RubricMode::New => {
        self.commit_rubric_text();
        self.validate_rubric_tree()?;
        if self.draft.save_rubric {
          let payload = self.draft.rubric.to_payload();
          let created = self.rubrics.create(&payload).await?;
          // A rubric created here is not deleted if a later step fails;
          // retries may leave an orphan on the server.
          self.draft.rubric_id = Some(created.id);
          persist_draft(self.store.as_ref(), &self.draft);
          info!(target: "wizard", rubric_id = created.id, "Rúbrica creada en el servidor");
        }
      }
    }
    persist_draft(self.store.as_ref(), &self.draft);
    Ok(FinishOutcome { rubric_id: self.draft.rubric_id })
  }

  //
  // Collaborator pass-throughs for populating step selectors.
  //

  pub async fn available_courses(&self) -> Result<Vec<Curso>, WizardError> {
    Ok(self.courses.list_enabled().await?)
  }

  pub async fn available_rubrics(&self) -> Result<Vec<Rubrica>, WizardError> {
    Ok(self.rubrics.list().await?)
  }

  //
  // Validation
  //

  fn validate_step0(&mut self) -> Result<(), WizardError> {
    if self.draft.course_id.is_none() || self.draft.course_name.trim().is_empty() {
      return Err(WizardError::invalid("curso", "Selecciona un curso habilitado"));
    }
    if !is_valid_course_code(&self.draft.course_code) {
      return Err(WizardError::invalid(
        "codigo",
        "El código del curso debe tener 4 o 5 dígitos",
      ));
    }
    self.prefill_instructor();
    if !is_valid_person_name(&self.draft.instructor) {
      return Err(WizardError::invalid(
        "instructor",
        "El nombre del instructor no es válido",
      ));
    }
    if !is_valid_semester(&self.draft.period) {
      return Err(WizardError::invalid(
        "periodo",
        "El período debe tener el formato AAAA-1 o AAAA-2",
      ));
    }
    Ok(())
  }

  fn validate_step1(&self) -> Result<(), WizardError> {
    if !is_valid_description_text(&self.draft.topic) {
      return Err(WizardError::invalid(
        "tema",
        "El tema es obligatorio y solo admite letras y puntuación básica",
      ));
    }
    if !is_valid_description_text(&self.draft.topic_description) {
      return Err(WizardError::invalid(
        "descripcion",
        "La descripción del tema es obligatoria y solo admite letras y puntuación básica",
      ));
    }
    Ok(())
  }

  fn validate_rubric_tree(&self) -> Result<(), WizardError> {
    let r = &self.draft.rubric;
    if !is_valid_description_text(&r.name) {
      return Err(WizardError::invalid("rubrica", "El nombre de la rúbrica no es válido"));
    }
    if !is_valid_description_text(&r.description) {
      return Err(WizardError::invalid(
        "rubrica",
        "La descripción de la rúbrica no es válida",
      ));
    }
    if r.criteria.is_empty() {
      return Err(WizardError::invalid("rubrica", "Debe haber al menos un criterio"));
    }
    for (i, c) in r.criteria.iter().enumerate() {
      let n = i + 1;
      if !is_valid_description_text(&c.name) {
        return Err(WizardError::invalid(
          "criterio",
          format!("El criterio {n} necesita un nombre válido"),
        ));
      }
      if !is_valid_description_text(&c.description) {
        return Err(WizardError::invalid(
          "criterio",
          format!("El criterio {n} necesita una descripción válida"),
        ));
      }
      if c.levels.is_empty() {
        return Err(WizardError::invalid(
          "criterio",
          format!("El criterio {n} necesita al menos un nivel"),
        ));
      }
      for (j, level) in c.levels.iter().enumerate() {
        let m = j + 1;
        if !is_valid_description_text(&level.name) {
          return Err(WizardError::invalid(
            "nivel",
            format!("El nivel {m} del criterio {n} necesita un nombre válido"),
          ));
        }
        if !level.descriptors.iter().any(|d| is_valid_description_text(d)) {
          return Err(WizardError::invalid(
            "nivel",
            format!("El nivel {m} del criterio {n} necesita un descriptor"),
          ));
        }
      }
    }
    let total = r.total_weight_percent();
    if total != 100 {
      return Err(WizardError::invalid(
        "pesos",
        format!("La suma de los pesos debe ser 100 (actual: {total})"),
      ));
    }
    Ok(())
  }

  //
  // Internals
  //

  fn prefill_instructor(&mut self) {
    if self.draft.instructor.trim().is_empty() {
      if let Some(user) = self.session.current_user() {
        self.draft.instructor = user.nombre;
      }
    }
  }

  /// Final trim pass over rubric text before the hard validation: the
  /// typing-friendly trailing spaces are dropped here.
  fn commit_rubric_text(&mut self) {
    let r = &mut self.draft.rubric;
    r.name = sanitize(&r.name);
    r.description = sanitize(&r.description);
    for c in &mut r.criteria {
      c.name = sanitize(&c.name);
      c.description = sanitize(&c.description);
      for level in &mut c.levels {
        level.name = sanitize(&level.name);
        for d in &mut level.descriptors {
          *d = sanitize(d);
        }
      }
    }
  }

  /// Persist + full re-render, the tail of every structural mutation.
  fn touch(&mut self) {
    persist_draft(self.store.as_ref(), &self.draft);
    self.full_renders += 1;
  }

  fn guarded<F>(&mut self, op: F) -> Result<RenderEffect, WizardError>
  where
    F: FnOnce(&mut Draft) -> Result<(), EditorError>,
  {
    match op(&mut self.draft) {
      Ok(()) => {
        self.touch();
        Ok(RenderEffect::Full)
      }
      Err(e) => {
        let err = WizardError::from(e);
        self.notifier.show_error(&err.to_string());
        Err(err)
      }
    }
  }
}
