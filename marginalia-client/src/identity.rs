use std::sync::{Arc, OnceLock};

use rand::seq::SliceRandom;
use serde_json::Value;

use crate::api::Identity;

const ANONYMOUS: &str = "Anonymous";

// Same palette hosts use for collaborator cursors
const COLORS: &[&str] = &[
    "var(--jp-collaborator-color1)",
    "var(--jp-collaborator-color2)",
    "var(--jp-collaborator-color3)",
    "var(--jp-collaborator-color4)",
    "var(--jp-collaborator-color5)",
    "var(--jp-collaborator-color6)",
    "var(--jp-collaborator-color7)",
];

/// Presence state shared with the other collaborators of a session
pub trait Awareness: Send + Sync {
    /// The local collaborator's state, typically
    /// `{"user": {"name": .., "display_name": .., "color": ..}}`
    fn local_state(&self) -> Option<Value>;
}

/// Awareness state that never changes, for hosts that know the user upfront
#[derive(Clone, Debug, Default)]
pub struct StaticAwareness(pub Option<Value>);

impl Awareness for StaticAwareness {
    fn local_state(&self) -> Option<Value> {
        self.0.clone()
    }
}

pub trait IdentityProvider: Send + Sync {
    fn identity(&self) -> Identity;
}

impl IdentityProvider for Identity {
    fn identity(&self) -> Identity {
        self.clone()
    }
}

/// Derives the identity from awareness on first use and sticks to it for the
/// rest of the session
pub struct SessionIdentity {
    awareness: Arc<dyn Awareness>,
    derived: OnceLock<Identity>,
}

impl SessionIdentity {
    pub fn new(awareness: Arc<dyn Awareness>) -> SessionIdentity {
        SessionIdentity {
            awareness,
            derived: OnceLock::new(),
        }
    }

    fn derive(state: Option<&Value>) -> Identity {
        let user = state.and_then(|s| s.get("user"));
        let field = |name: &str| {
            user.and_then(|u| u.get(name))
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let name = field("display_name").or_else(|| field("name"));
        let color = field("color");
        if name.is_none() {
            tracing::debug!("no user name in awareness state, commenting anonymously");
        }
        Identity {
            name: String::from(name.unwrap_or(ANONYMOUS)),
            color: match color {
                Some(c) => String::from(c),
                None => String::from(
                    *COLORS
                        .choose(&mut rand::thread_rng())
                        .unwrap_or(&COLORS[0]),
                ),
            },
        }
    }
}

impl IdentityProvider for SessionIdentity {
    fn identity(&self) -> Identity {
        self.derived
            .get_or_init(|| SessionIdentity::derive(self.awareness.local_state().as_ref()))
            .clone()
    }
}
