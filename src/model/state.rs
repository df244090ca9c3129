//! # Lifecycle State
//!
//! Secrets carry an integer lifecycle code plus a description string. The
//! code set is sparse: `4` is not assigned and is rejected like any other
//! unknown value.
//!
//! | Code | Description      | Readiness |
//! |------|------------------|-----------|
//! | 0    | `pre_activation` | Transient |
//! | 1    | `active`         | Ready     |
//! | 2    | `suspended`      | Ready     |
//! | 3    | `deactivated`    | Ready     |
//! | 5    | `destroyed`      | Failed    |

use crate::error::{Error, Result};
use std::fmt;

/// Server-reported lifecycle state of a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    PreActivation,
    Active,
    Suspended,
    Deactivated,
    Destroyed,
}

/// How the convergence poller reacts to a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Keep polling
    Transient,
    /// Usable, stop polling
    Ready,
    /// Will never become usable, stop polling with an error
    Failed,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 5] = [
        LifecycleState::PreActivation,
        LifecycleState::Active,
        LifecycleState::Suspended,
        LifecycleState::Deactivated,
        LifecycleState::Destroyed,
    ];

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            LifecycleState::PreActivation => 0,
            LifecycleState::Active => 1,
            LifecycleState::Suspended => 2,
            LifecycleState::Deactivated => 3,
            LifecycleState::Destroyed => 5,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            LifecycleState::PreActivation => "pre_activation",
            LifecycleState::Active => "active",
            LifecycleState::Suspended => "suspended",
            LifecycleState::Deactivated => "deactivated",
            LifecycleState::Destroyed => "destroyed",
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.code() == code)
            .ok_or_else(|| Error::UnrecognizedVariant {
                family: "lifecycle state",
                tag: code.to_string(),
            })
    }

    pub fn from_description(description: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.description() == description)
            .ok_or_else(|| Error::UnrecognizedVariant {
                family: "lifecycle state",
                tag: description.to_string(),
            })
    }

    #[must_use]
    pub fn classify(self) -> Readiness {
        match self {
            LifecycleState::PreActivation => Readiness::Transient,
            LifecycleState::Active | LifecycleState::Suspended | LifecycleState::Deactivated => {
                Readiness::Ready
            }
            LifecycleState::Destroyed => Readiness::Failed,
        }
    }

    /// States a create-time wait may legitimately end in
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Active | LifecycleState::Destroyed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Classify a raw wire code
pub fn classify_code(code: i64) -> Result<Readiness> {
    LifecycleState::from_code(code).map(LifecycleState::classify)
}

/// Lifecycle information as the remote reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleStatus {
    pub state: LifecycleState,
    /// Companion description string, kept as reported
    pub description: String,
}

impl LifecycleStatus {
    #[must_use]
    pub fn new(state: LifecycleState) -> Self {
        Self {
            state,
            description: state.description().to_string(),
        }
    }

    /// Decode the `state` / `state_description` pair.
    ///
    /// The integer code wins when both are present; a description that names
    /// a different state is a codec error. Neither present means the resource
    /// type does not track lifecycle.
    pub fn from_wire(
        kind: &'static str,
        code: Option<i64>,
        description: Option<&str>,
    ) -> Result<Option<Self>> {
        let state = match (code, description) {
            (None, None) => return Ok(None),
            (Some(code), _) => LifecycleState::from_code(code)?,
            (None, Some(description)) => LifecycleState::from_description(description)?,
        };

        if let Some(description) = description {
            if LifecycleState::from_description(description)? != state {
                return Err(Error::codec(
                    kind,
                    "state_description",
                    format!("'{description}' contradicts state code {}", state.code()),
                ));
            }
        }

        Ok(Some(Self {
            state,
            description: description
                .map_or_else(|| state.description().to_string(), ToString::to_string),
        }))
    }
}
