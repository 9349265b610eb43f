//! Analítica Académica · Configuration Wizard Core
//!
//! The step-gated configuration flow of the academic-evaluation client:
//! course/topic registration, nested rubric authoring with weight
//! invariants, session-scoped draft persistence, and hand-off to the remote
//! rubric API.
//!
//! The crate owns the wizard's state machine and editing semantics only.
//! Rendering, routing, authentication, and the upload/analysis stages are
//! external collaborators reached through the traits in [`services`] and
//! the store in [`store`].
//!
//! Important env variables:
//!   API_BASE_URL       : REST API root (default "http://127.0.0.1:8000")
//!   API_TOKEN          : optional bearer token
//!   WIZARD_CONFIG_PATH : TOML overrides for editor defaults
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

pub mod api;
pub mod config;
pub mod domain;
pub mod editor;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod validate;
pub mod view;
pub mod wizard;

pub use config::{ApiConfig, WizardDefaults};
pub use domain::{CriterionDraft, Draft, LevelDraft, RubricDraft, RubricMode};
pub use editor::EditorError;
pub use services::{CourseService, Notifier, RubricService, ServiceError, SessionProvider};
pub use store::{DraftStore, MemoryStore, CONFIG_DATA_KEY};
pub use view::{RenderEffect, StepStatus, WizardView};
pub use wizard::{FinishOutcome, WizardController, WizardError};
