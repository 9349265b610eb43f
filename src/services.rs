//! External collaborator seams: remote rubric/course services, the session
//! context, and the notification surface.
//!
//! The wizard core only knows these traits. HTTP implementations live in
//! `api`; tests plug in mocks.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{Curso, Rubrica, RubricaPayload, Usuario};

/// Failures talking to (or pre-validating for) the remote API.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("error de red: {0}")]
  Network(#[from] reqwest::Error),
  #[error("el servidor respondió {status}: {body}")]
  Status { status: u16, body: String },
  #[error("respuesta con forma inesperada: {0}")]
  Decode(#[from] serde_json::Error),
  /// Payload rejected before leaving the client.
  #[error("{0}")]
  Invalid(String),
}

/// Remote rubric catalog: list existing rubrics, create new ones.
#[async_trait]
pub trait RubricService: Send + Sync {
  async fn list(&self) -> Result<Vec<Rubrica>, ServiceError>;
  async fn create(&self, payload: &RubricaPayload) -> Result<Rubrica, ServiceError>;
}

/// Remote course catalog, restricted to courses enabled for analysis.
#[async_trait]
pub trait CourseService: Send + Sync {
  async fn list_enabled(&self) -> Result<Vec<Curso>, ServiceError>;
}

/// Session context injected at construction; replaces the old global
/// auth singleton.
pub trait SessionProvider: Send + Sync {
  fn current_user(&self) -> Option<Usuario>;
}

/// Fire-and-forget user-facing notifications.
pub trait Notifier: Send + Sync {
  fn show_error(&self, message: &str);
  fn show_success(&self, message: &str);
}

/// Notifier that routes messages to the log. Useful as a default and in
/// headless runs.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn show_error(&self, message: &str) {
    error!(target: "wizard", %message, "Aviso de error al usuario");
  }

  fn show_success(&self, message: &str) {
    info!(target: "wizard", %message, "Aviso de éxito al usuario");
  }
}

/// Client-side pre-check of a rubric creation payload, mirroring what the
/// server enforces: every criterion named, weights summing to 1.0 (±0.01).
pub fn validate_rubrica_payload(payload: &RubricaPayload) -> Result<(), ServiceError> {
  if payload.nombre_rubrica.trim().is_empty() {
    return Err(ServiceError::Invalid(
      "El nombre de la rúbrica es requerido".into(),
    ));
  }
  if payload.criterios.is_empty() {
    return Err(ServiceError::Invalid("Debe haber al menos un criterio".into()));
  }
  for (i, c) in payload.criterios.iter().enumerate() {
    if c.nombre_criterio.trim().is_empty() {
      return Err(ServiceError::Invalid(format!(
        "El criterio {} necesita un nombre",
        i + 1
      )));
    }
    if c.peso < 0.0 || c.peso > 1.0 {
      return Err(ServiceError::Invalid(format!(
        "El peso del criterio \"{}\" debe estar entre 0 y 1",
        c.nombre_criterio
      )));
    }
  }
  let suma: f64 = payload.criterios.iter().map(|c| c.peso).sum();
  if (suma - 1.0).abs() > 0.01 {
    return Err(ServiceError::Invalid(format!(
      "La suma de los pesos debe ser 1.0 (actual: {suma:.2})"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::CriterioPayload;

  fn payload(pesos: &[f64]) -> RubricaPayload {
    RubricaPayload {
      nombre_rubrica: "Ensayo".into(),
      descripcion: String::new(),
      criterios: pesos
        .iter()
        .enumerate()
        .map(|(i, p)| CriterioPayload {
          nombre_criterio: format!("Criterio {}", i + 1),
          descripcion_criterio: String::new(),
          peso: *p,
          orden: (i + 1) as u32,
          niveles: Vec::new(),
        })
        .collect(),
    }
  }

  #[test]
  fn weights_within_tolerance_pass() {
    assert!(validate_rubrica_payload(&payload(&[0.25, 0.25, 0.25, 0.25])).is_ok());
    assert!(validate_rubrica_payload(&payload(&[0.333, 0.333, 0.333])).is_ok());
  }

  #[test]
  fn weights_outside_tolerance_fail() {
    let err = validate_rubrica_payload(&payload(&[0.25, 0.25, 0.25])).unwrap_err();
    assert!(err.to_string().contains("suma de los pesos"));
  }

  #[test]
  fn unnamed_criterion_fails() {
    let mut p = payload(&[0.5, 0.5]);
    p.criterios[1].nombre_criterio = "  ".into();
    let err = validate_rubrica_payload(&p).unwrap_err();
    assert!(err.to_string().contains("necesita un nombre"));
  }

  #[test]
  fn empty_rubric_fails() {
    let mut p = payload(&[1.0]);
    p.criterios.clear();
    assert!(validate_rubrica_payload(&p).is_err());
    p = payload(&[1.0]);
    p.nombre_rubrica = String::new();
    assert!(validate_rubrica_payload(&p).is_err());
  }
}
