//! Domain models for the configuration wizard: the working draft, the nested
//! rubric tree, and the DTOs exchanged with the remote API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score bounds for rubric levels.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 20.0;

/// How the wizard obtains its rubric at finish time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricMode {
  /// Author a new rubric inside the wizard.
  #[default]
  New,
  /// Reference a rubric that already exists on the server.
  Existing,
}

/// The working configuration, mirrored to the draft store on every edit.
/// Serialized camelCase so the persisted blob matches the `configData` shape
/// the upload stage reads.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
  pub course_id: Option<i64>,
  pub course_name: String,
  pub course_code: String,
  pub instructor: String,
  pub period: String,
  pub topic: String,
  pub topic_description: String,
  pub rubric_mode: RubricMode,
  pub rubric_id: Option<i64>,
  /// Whether a newly authored rubric should be persisted on the server.
  pub save_rubric: bool,
  pub rubric: RubricDraft,
}

/// A rubric being authored: name, description, and ordered criteria.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RubricDraft {
  pub name: String,
  pub description: String,
  pub criteria: Vec<CriterionDraft>,
}

/// A weighted evaluation dimension. `order` is 1-based and contiguous;
/// `weight` is a fraction in (0, 1].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriterionDraft {
  pub id: String,
  pub name: String,
  pub description: String,
  pub weight: f64,
  pub order: u32,
  pub levels: Vec<LevelDraft>,
}

/// A named score band within a criterion. Policy caps descriptors at exactly
/// one; they stay modeled as a sequence so stored rubrics with several keep
/// loading.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelDraft {
  pub id: String,
  pub name: String,
  pub min_score: f64,
  pub max_score: f64,
  pub descriptors: Vec<String>,
  pub order: u32,
}

impl Default for RubricDraft {
  /// A fresh rubric always carries one default criterion: the editor never
  /// lets the criteria list become empty, so neither does the starting state.
  fn default() -> Self {
    Self {
      name: String::new(),
      description: String::new(),
      criteria: vec![CriterionDraft::starter(1)],
    }
  }
}

impl Default for CriterionDraft {
  fn default() -> Self {
    CriterionDraft::starter(0)
  }
}

impl Default for LevelDraft {
  fn default() -> Self {
    LevelDraft::starter(0)
  }
}

impl CriterionDraft {
  /// New criterion with the stock defaults: weight 0.10 and one starter level.
  pub fn starter(order: u32) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      name: String::new(),
      description: String::new(),
      weight: 0.10,
      order,
      levels: vec![LevelDraft::starter(1)],
    }
  }
}

impl LevelDraft {
  /// New level with the stock defaults: "Excelente", min = max = 3, one
  /// empty descriptor awaiting text.
  pub fn starter(order: u32) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      name: "Excelente".to_string(),
      min_score: 3.0,
      max_score: 3.0,
      descriptors: vec![String::new()],
      order,
    }
  }
}

//
// Remote DTOs. Field names are the backend's own (Spanish, snake_case), so
// these serialize straight into the wire payloads.
//

/// Course as listed by the course service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Curso {
  pub id: i64,
  pub nombre: String,
  pub codigo: String,
}

/// Persisted rubric as returned by the rubric service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rubrica {
  pub id: i64,
  pub nombre_rubrica: String,
  #[serde(default)]
  pub descripcion: Option<String>,
  #[serde(default)]
  pub activo: bool,
}

/// Authenticated user provided by the session context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Usuario {
  pub nombre: String,
  pub email: String,
  pub rol: String,
}

/// Rubric creation payload (`POST /rubricas/`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RubricaPayload {
  pub nombre_rubrica: String,
  pub descripcion: String,
  pub criterios: Vec<CriterioPayload>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CriterioPayload {
  pub nombre_criterio: String,
  pub descripcion_criterio: String,
  pub peso: f64,
  pub orden: u32,
  pub niveles: Vec<NivelPayload>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NivelPayload {
  pub nombre_nivel: String,
  pub puntaje_min: f64,
  pub puntaje_max: f64,
  pub descriptores: Vec<String>,
  pub orden: u32,
}

impl RubricDraft {
  /// Build the wire payload for rubric creation.
  pub fn to_payload(&self) -> RubricaPayload {
    RubricaPayload {
      nombre_rubrica: self.name.clone(),
      descripcion: self.description.clone(),
      criterios: self
        .criteria
        .iter()
        .map(|c| CriterioPayload {
          nombre_criterio: c.name.clone(),
          descripcion_criterio: c.description.clone(),
          peso: c.weight,
          orden: c.order,
          niveles: c
            .levels
            .iter()
            .map(|l| NivelPayload {
              nombre_nivel: l.name.clone(),
              puntaje_min: l.min_score,
              puntaje_max: l.max_score,
              descriptores: l.descriptors.clone(),
              orden: l.order,
            })
            .collect(),
        })
        .collect(),
    }
  }
}

/// Legacy point-based rubric, as exported by older course setups.
#[derive(Clone, Debug, Deserialize)]
pub struct RubricaPuntos {
  pub nombre_rubrica: String,
  #[serde(default)]
  pub descripcion: Option<String>,
  #[serde(default)]
  pub total_puntos: Option<f64>,
  pub criterios: Vec<CriterioPuntos>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CriterioPuntos {
  pub nombre: String,
  #[serde(default)]
  pub descripcion: Option<String>,
  pub puntaje: f64,
}

/// Convert a legacy point-based rubric into a weight-based creation payload.
/// Each weight is `puntaje / total_puntos` (total defaults to 20) and orders
/// are renumbered 1..n.
pub fn payload_from_puntos(old: &RubricaPuntos) -> RubricaPayload {
  let total = old.total_puntos.unwrap_or(20.0);
  RubricaPayload {
    nombre_rubrica: old.nombre_rubrica.clone(),
    descripcion: old.descripcion.clone().unwrap_or_default(),
    criterios: old
      .criterios
      .iter()
      .enumerate()
      .map(|(i, c)| CriterioPayload {
        nombre_criterio: c.nombre.clone(),
        descripcion_criterio: c.descripcion.clone().unwrap_or_default(),
        peso: c.puntaje / total,
        orden: (i + 1) as u32,
        niveles: Vec::new(),
      })
      .collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn starter_criterion_carries_stock_defaults() {
    let c = CriterionDraft::starter(1);
    assert!((c.weight - 0.10).abs() < f64::EPSILON);
    assert_eq!(c.levels.len(), 1);
    let l = &c.levels[0];
    assert_eq!(l.name, "Excelente");
    assert_eq!(l.min_score, 3.0);
    assert_eq!(l.max_score, 3.0);
    assert_eq!(l.descriptors, vec![String::new()]);
  }

  #[test]
  fn puntos_conversion_normalizes_weights_and_orders() {
    let old = RubricaPuntos {
      nombre_rubrica: "Informe final".into(),
      descripcion: None,
      total_puntos: Some(10.0),
      criterios: vec![
        CriterioPuntos { nombre: "Claridad".into(), descripcion: None, puntaje: 4.0 },
        CriterioPuntos { nombre: "Rigor".into(), descripcion: Some("Fuentes".into()), puntaje: 6.0 },
      ],
    };
    let p = payload_from_puntos(&old);
    assert_eq!(p.criterios.len(), 2);
    assert!((p.criterios[0].peso - 0.4).abs() < 1e-9);
    assert!((p.criterios[1].peso - 0.6).abs() < 1e-9);
    assert_eq!(p.criterios[0].orden, 1);
    assert_eq!(p.criterios[1].orden, 2);
  }

  #[test]
  fn draft_round_trips_as_camel_case_json() {
    let d = Draft { course_code: "1048".into(), ..Draft::default() };
    let v = serde_json::to_value(&d).unwrap();
    assert_eq!(v["courseCode"], "1048");
    let back: Draft = serde_json::from_value(v).unwrap();
    assert_eq!(back.course_code, "1048");
  }
}
