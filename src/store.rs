//! Session-scoped draft persistence: a key -> JSON mapping that survives an
//! accidental reload during the wizard but not the end of the session.
//!
//! All operations are non-fatal. Save failures are logged and reported as
//! `false`; load failures (missing key, parse error) come back as `None`.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::domain::Draft;

/// Well-known key holding the serialized wizard draft.
pub const CONFIG_DATA_KEY: &str = "configData";
/// Boolean gate written by the router once `finish()` succeeds. This core
/// only names the key; the router owns the value.
pub const CONFIGURATION_COMPLETE_KEY: &str = "configurationComplete";

/// Key/value persistence for JSON-serializable state.
pub trait DraftStore: Send + Sync {
  fn save(&self, key: &str, value: &serde_json::Value) -> bool;
  fn load(&self, key: &str) -> Option<serde_json::Value>;
  fn remove(&self, key: &str) -> bool;
  fn clear(&self);
}

/// In-memory store with session-storage semantics: values live as serialized
/// strings, so a load re-parses and tolerates corrupt entries.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store a raw string without serializing. Lets tests (and imports) seed
  /// entries that may not be valid JSON.
  pub fn put_raw(&self, key: &str, raw: String) {
    self.entries.lock().unwrap().insert(key.to_string(), raw);
  }
}

impl DraftStore for MemoryStore {
  fn save(&self, key: &str, value: &serde_json::Value) -> bool {
    let serialized = match serde_json::to_string(value) {
      Ok(s) => s,
      Err(e) => {
        warn!(target: "analitica_config", %key, error = %e, "No se pudo serializar; se omite el guardado");
        return false;
      }
    };
    self.entries.lock().unwrap().insert(key.to_string(), serialized);
    debug!(target: "analitica_config", %key, "Guardado en el almacén de sesión");
    true
  }

  fn load(&self, key: &str) -> Option<serde_json::Value> {
    let raw = { self.entries.lock().unwrap().get(key).cloned() }?;
    match serde_json::from_str(&raw) {
      Ok(v) => Some(v),
      Err(e) => {
        warn!(target: "analitica_config", %key, error = %e, "Entrada corrupta en el almacén; se ignora");
        None
      }
    }
  }

  fn remove(&self, key: &str) -> bool {
    self.entries.lock().unwrap().remove(key).is_some()
  }

  fn clear(&self) {
    self.entries.lock().unwrap().clear();
  }
}

/// Persist the draft under [`CONFIG_DATA_KEY`]. Serialization failures are
/// logged and swallowed.
pub fn persist_draft(store: &dyn DraftStore, draft: &Draft) -> bool {
  match serde_json::to_value(draft) {
    Ok(v) => store.save(CONFIG_DATA_KEY, &v),
    Err(e) => {
      warn!(target: "analitica_config", error = %e, "No se pudo serializar el borrador");
      false
    }
  }
}

/// Restore the draft from [`CONFIG_DATA_KEY`], or `None` when absent or
/// unreadable.
pub fn restore_draft(store: &dyn DraftStore) -> Option<Draft> {
  let v = store.load(CONFIG_DATA_KEY)?;
  match serde_json::from_value(v) {
    Ok(d) => Some(d),
    Err(e) => {
      warn!(target: "analitica_config", error = %e, "Borrador guardado con forma inesperada; se descarta");
      None
    }
  }
}
