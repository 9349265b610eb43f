//! End-to-end wizard flow against mock collaborators: register a course,
//! describe the topic, author a balanced rubric, and finish with a remote
//! submission.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use analitica_config::domain::{Curso, Rubrica, RubricaPayload, Usuario};
use analitica_config::{
  CourseService, DraftStore, MemoryStore, Notifier, RubricService, ServiceError, SessionProvider,
  StepStatus, WizardController, WizardDefaults, CONFIG_DATA_KEY,
};

struct FakeRubrics {
  created: Mutex<Vec<RubricaPayload>>,
}

#[async_trait]
impl RubricService for FakeRubrics {
  async fn list(&self) -> Result<Vec<Rubrica>, ServiceError> {
    Ok(Vec::new())
  }

  async fn create(&self, payload: &RubricaPayload) -> Result<Rubrica, ServiceError> {
    analitica_config::services::validate_rubrica_payload(payload)?;
    self.created.lock().unwrap().push(payload.clone());
    Ok(Rubrica {
      id: 42,
      nombre_rubrica: payload.nombre_rubrica.clone(),
      descripcion: Some(payload.descripcion.clone()),
      activo: true,
    })
  }
}

struct FakeCourses;

#[async_trait]
impl CourseService for FakeCourses {
  async fn list_enabled(&self) -> Result<Vec<Curso>, ServiceError> {
    Ok(vec![Curso {
      id: 3,
      nombre: "Metodología de la investigación".into(),
      codigo: "1048".into(),
    }])
  }
}

struct FakeSession;

impl SessionProvider for FakeSession {
  fn current_user(&self) -> Option<Usuario> {
    Some(Usuario {
      nombre: "María de los Ángeles".into(),
      email: "maria@uni.edu".into(),
      rol: "docente".into(),
    })
  }
}

#[derive(Default)]
struct RecordingNotifier {
  errors: Mutex<Vec<String>>,
  successes: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
  fn show_error(&self, message: &str) {
    self.errors.lock().unwrap().push(message.to_string());
  }

  fn show_success(&self, message: &str) {
    self.successes.lock().unwrap().push(message.to_string());
  }
}

#[tokio::test]
async fn full_configuration_flow_reaches_the_upload_stage() {
  let store = Arc::new(MemoryStore::new());
  let rubrics = Arc::new(FakeRubrics { created: Mutex::new(Vec::new()) });
  let notifier = Arc::new(RecordingNotifier::default());

  let mut ctrl = WizardController::new(
    store.clone(),
    rubrics.clone(),
    Arc::new(FakeCourses),
    Arc::new(FakeSession),
    notifier.clone(),
    WizardDefaults::default(),
  );

  // Step 0: pick the course from the remote catalog.
  let cursos = ctrl.available_courses().await.unwrap();
  ctrl.select_course(&cursos[0]);
  ctrl.set_period("2025-1");
  ctrl.next().unwrap();

  // Step 1: topic details, both fields mandatory.
  assert!(ctrl.next().is_err());
  ctrl.set_topic("Investigación cualitativa");
  ctrl.set_topic_description("Diseño y defensa de un protocolo de investigación");
  ctrl.next().unwrap();

  // Step indicator reflects the walk.
  let view = ctrl.view();
  let statuses: Vec<StepStatus> = view.steps.iter().map(|s| s.status).collect();
  assert_eq!(
    statuses,
    vec![StepStatus::Completed, StepStatus::Completed, StepStatus::Active]
  );

  // Step 2: author a two-criterion rubric, balanced 60/40.
  ctrl.set_rubric_name("Rúbrica de protocolo");
  ctrl.set_rubric_description("Evalúa el protocolo de investigación");
  ctrl.add_criterion();
  for i in 0..2 {
    ctrl.set_criterion_name(i, "Aplicación de conceptos").unwrap();
    ctrl
      .set_criterion_description(i, "Usa los conceptos del curso correctamente")
      .unwrap();
    ctrl.set_level_descriptor(i, 0, "Justifica la problemática").unwrap();
  }
  ctrl.set_criterion_weight_percent(0, 60.0).unwrap();
  let total = ctrl.set_criterion_weight_percent(1, 40.0).unwrap();
  assert_eq!(total, 100);
  ctrl.set_save_rubric(true);

  let outcome = ctrl.finish().await.unwrap();
  assert_eq!(outcome.rubric_id, Some(42));
  assert_eq!(notifier.successes.lock().unwrap().as_slice(), ["Configuración completada"]);

  // The submitted payload uses the backend's field names and orders.
  let sent = rubrics.created.lock().unwrap();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].criterios[0].orden, 1);
  assert_eq!(sent[0].criterios[1].orden, 2);
  assert_eq!(sent[0].criterios[0].niveles[0].nombre_nivel, "Excelente");

  // The persisted draft is ready for the upload stage.
  let blob = store.load(CONFIG_DATA_KEY).unwrap();
  assert_eq!(blob["courseCode"], "1048");
  assert_eq!(blob["rubricId"], 42);
  assert_eq!(blob["instructor"], "María de los Ángeles");
}

#[tokio::test]
async fn draft_survives_a_reload_mid_wizard() {
  let store = Arc::new(MemoryStore::new());
  let rubrics = Arc::new(FakeRubrics { created: Mutex::new(Vec::new()) });

  {
    let mut ctrl = WizardController::new(
      store.clone(),
      rubrics.clone(),
      Arc::new(FakeCourses),
      Arc::new(FakeSession),
      Arc::new(RecordingNotifier::default()),
      WizardDefaults::default(),
    );
    let cursos = ctrl.available_courses().await.unwrap();
    ctrl.select_course(&cursos[0]);
    ctrl.set_period("2024-2");
    ctrl.add_criterion();
  }

  // "Reload": a fresh controller over the same session store.
  let ctrl = WizardController::new(
    store,
    rubrics,
    Arc::new(FakeCourses),
    Arc::new(FakeSession),
    Arc::new(RecordingNotifier::default()),
    WizardDefaults::default(),
  );
  assert_eq!(ctrl.draft().course_code, "1048");
  assert_eq!(ctrl.draft().period, "2024-2");
  assert_eq!(ctrl.draft().rubric.criteria.len(), 2);
}
