//! Shared setup for commands: opening the workspace and the AI service.
//!
//! Commands that only read or edit topics need a [`Workspace`]; commands that
//! call the model need a full [`PulseService`] and therefore an API key.

use anyhow::{Context, Result};
use pulse_core::ai::GeminiClient;
use pulse_core::store::StateOrigin;
use pulse_core::{PulseService, Store, Workspace};
use tracing::info;

use crate::config::Config;

/// Open the store under the configured data directory and load state.
pub fn open_workspace(config: &Config) -> Result<Workspace> {
    let store = Store::open(&config.paths.data_dir).with_context(|| {
        format!(
            "Failed to open store in {}",
            config.paths.data_dir.display()
        )
    })?;
    let workspace = Workspace::load(store).context("Failed to load saved topics")?;

    if workspace.origin() == StateOrigin::MigratedFromV2 {
        info!("Loaded legacy (v2) topics; they will be saved in the current format on the next change");
    }
    Ok(workspace)
}

/// Open the workspace together with the Gemini provider.
pub fn open_service(config: &Config) -> Result<PulseService<GeminiClient>> {
    let workspace = open_workspace(config)?;
    let provider = GeminiClient::new(config.gemini()).context("Failed to set up Gemini client")?;
    Ok(PulseService::new(workspace, provider, config.prompt_style()))
}

/// Resolve a user-supplied topic reference (full id or prefix) to a full id.
pub fn resolve_id(workspace: &Workspace, reference: &str) -> Result<String> {
    Ok(workspace.tree().resolve(reference)?.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::types::NewTopic;
    use tempfile::{TempDir, tempdir};

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.data_dir = dir.path().to_path_buf();
        config
    }

    #[test]
    fn test_workspace_persists_between_opens() {
        let dir = tempdir().unwrap();
        let config = config_in(&dir);

        let mut workspace = open_workspace(&config).unwrap();
        assert_eq!(workspace.origin(), StateOrigin::Empty);
        let topic = workspace
            .edit(|tree| {
                tree.add_topic(NewTopic {
                    title: "Fusion".into(),
                    ..NewTopic::default()
                })
            })
            .unwrap();
        drop(workspace);

        let reopened = open_workspace(&config).unwrap();
        assert_eq!(reopened.origin(), StateOrigin::Current);
        assert_eq!(resolve_id(&reopened, &topic.id[..8]).unwrap(), topic.id);
        assert!(resolve_id(&reopened, "zzzzzzzz").is_err());
    }

    #[test]
    fn test_service_opens_with_configured_key() {
        let dir = tempdir().unwrap();
        let mut config = config_in(&dir);
        config.ai.api_key = Some("test-key".into());
        assert!(open_service(&config).is_ok());
    }
}
