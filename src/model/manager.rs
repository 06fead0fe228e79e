use serde::{Deserialize, Serialize};

fn default_nome_chefe() -> String {
    "Chefe da Lotação".to_string()
}

/// Manager contact for one lotação, as returned by the SARH chefia query.
/// Held in memory for the duration of a run, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerInfo {
    pub codigo_lotacao: String,
    #[serde(default = "default_nome_chefe")]
    pub nome_chefe: String,
    #[serde(default)]
    pub email_chefe: Option<String>,
}
