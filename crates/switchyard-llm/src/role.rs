//! Task roles and the role catalogue
//!
//! A role picks the system prompt sent to the backend and, through the
//! routing table, an ordered backend preference list.

use crate::backend::BackendId;
use crate::error::Error;
use crate::router::RoutingTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Fixed task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Role {
    /// System and module design
    Architect,
    /// Writing and modifying code
    Coder,
    /// Code review
    Reviewer,
    /// Writing tests
    Tester,
    /// Diagnosing failures
    Debugger,
    /// Performance work
    Optimizer,
    /// Security analysis
    Security,
    /// Build, deploy and infrastructure
    Devops,
}

impl Role {
    /// Every role
    pub const ALL: [Role; 8] = [
        Role::Architect,
        Role::Coder,
        Role::Reviewer,
        Role::Tester,
        Role::Debugger,
        Role::Optimizer,
        Role::Security,
        Role::Devops,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architect => "architect",
            Self::Coder => "coder",
            Self::Reviewer => "reviewer",
            Self::Tester => "tester",
            Self::Debugger => "debugger",
            Self::Optimizer => "optimizer",
            Self::Security => "security",
            Self::Devops => "devops",
        }
    }

    /// System prompt describing the persona for this role
    #[must_use]
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Architect => {
                "You are a senior software architect. Propose clear module boundaries, \
                 data flows and trade-offs. Prefer simple designs and name the risks."
            }
            Self::Coder => {
                "You are an expert programmer. Write correct, idiomatic, well-structured \
                 code. Keep explanations short and put code in fenced blocks."
            }
            Self::Reviewer => {
                "You are a meticulous code reviewer. Point out bugs, unclear naming, \
                 missing error handling and untested paths, ordered by severity."
            }
            Self::Tester => {
                "You are a test engineer. Write focused unit and integration tests that \
                 cover edge cases and failure paths, using the project's test framework."
            }
            Self::Debugger => {
                "You are a debugging specialist. Reason from the symptoms to the root \
                 cause, say how to confirm it, then give the minimal fix."
            }
            Self::Optimizer => {
                "You are a performance engineer. Identify the hot paths, explain the cost \
                 model, and propose measurable optimizations."
            }
            Self::Security => {
                "You are an application security expert. Find vulnerabilities, explain \
                 how they could be exploited, and give concrete mitigations."
            }
            Self::Devops => {
                "You are a DevOps engineer. Help with builds, CI pipelines, containers, \
                 deployment and observability, favouring reproducible setups."
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| Error::Config(format!("unknown role '{s}'")))
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One catalogue entry
#[derive(Debug, Clone)]
struct RoleEntry {
    prompt: &'static str,
    preferences: Vec<BackendId>,
}

/// Immutable table of roles with their prompts and backend preferences
#[derive(Debug, Clone)]
pub struct RoleCatalogue {
    entries: HashMap<Role, RoleEntry>,
}

impl RoleCatalogue {
    /// Build the catalogue from a routing table's role preferences
    #[must_use]
    pub fn new(table: &RoutingTable) -> Self {
        let entries = Role::ALL
            .into_iter()
            .map(|role| {
                let entry = RoleEntry {
                    prompt: role.system_prompt(),
                    preferences: table.role_preferences(role).to_vec(),
                };
                (role, entry)
            })
            .collect();
        Self { entries }
    }

    /// System prompt for a role
    #[must_use]
    pub fn system_prompt(&self, role: Role) -> &str {
        self.entries
            .get(&role)
            .map_or_else(|| role.system_prompt(), |e| e.prompt)
    }

    /// Backend preference list for a role, most preferred first
    #[must_use]
    pub fn preferences(&self, role: Role) -> &[BackendId] {
        self.entries
            .get(&role)
            .map(|e| e.preferences.as_slice())
            .unwrap_or_default()
    }
}

impl Default for RoleCatalogue {
    fn default() -> Self {
        Self::new(&RoutingTable::default())
    }
}
