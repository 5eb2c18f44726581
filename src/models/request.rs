use serde::{Deserialize, Serialize};

/// Input to `createRepository`. The name doubles as the upstream
/// repository identifier handed to the `MetadataSource`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub languages: Vec<String>,
}
