//! Application state machine for Marsh
//!
//! Manages scene loading, gameplay, and exiting.

/// The current application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationState {
    /// A scene load is pending
    Loading(PendingLoad),
    /// Active gameplay
    Playing,
    /// Application is exiting
    Exiting,
}

/// A level waiting to load, and what to load instead if it fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub scene: String,
    pub fallback: Option<String>,
}

impl ApplicationState {
    /// First level of the session; nothing to fall back to
    pub fn start(scene: impl Into<String>) -> Self {
        Self::Loading(PendingLoad {
            scene: scene.into(),
            fallback: None,
        })
    }

    /// Gate travel. A scene left by teleport cannot be played on, so a
    /// failed load restarts the level the player came from.
    pub fn travel(target: impl Into<String>, from: Option<String>) -> Self {
        Self::Loading(PendingLoad {
            scene: target.into(),
            fallback: from,
        })
    }
}

impl PendingLoad {
    /// State after attempting this load
    pub fn resolve(self, loaded: bool) -> ApplicationState {
        if loaded {
            return ApplicationState::Playing;
        }
        match self.fallback {
            Some(scene) => ApplicationState::start(scene),
            None => ApplicationState::Exiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(state: ApplicationState) -> PendingLoad {
        match state {
            ApplicationState::Loading(pending) => pending,
            other => panic!("expected a pending load, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_first_load_exits() {
        let load = pending(ApplicationState::start("swamp"));
        assert_eq!(load.resolve(false), ApplicationState::Exiting);
    }

    #[test]
    fn test_successful_load_plays() {
        let load = pending(ApplicationState::travel("castle", Some("swamp".into())));
        assert_eq!(load.resolve(true), ApplicationState::Playing);
    }

    #[test]
    fn test_failed_travel_restarts_previous_level() {
        let load = pending(ApplicationState::travel("missing", Some("swamp".into())));
        let retry = load.resolve(false);
        assert_eq!(retry, ApplicationState::start("swamp"));

        // The restart has no fallback of its own
        assert_eq!(pending(retry).resolve(false), ApplicationState::Exiting);
    }

    #[test]
    fn test_travel_without_current_scene_exits_on_failure() {
        let load = pending(ApplicationState::travel("missing", None));
        assert_eq!(load.resolve(false), ApplicationState::Exiting);
    }
}
