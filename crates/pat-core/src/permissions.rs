//! Project/repository scope reconciliation.
//!
//! Stash grants one repository permission and one project permission per
//! token. The repository grant is never weaker than the project grant and the
//! project grant is never downgraded by the repository scope.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("unrecognized permission scope '{0}'; expected read|write|admin")]
    UnknownScope(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
/// Access level requested for a project or repository, ordered `read < write < admin`.
pub enum Scope {
    Read,
    #[default]
    Write,
    Admin,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Read, Scope::Write, Scope::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Read => "read",
            Scope::Write => "write",
            Scope::Admin => "admin",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = PermissionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Scope::Read),
            "write" => Ok(Scope::Write),
            "admin" => Ok(Scope::Admin),
            _ => Err(PermissionError::UnknownScope(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Stash permission codes accepted by the access-token API.
pub enum PermissionCode {
    RepoRead,
    RepoWrite,
    RepoAdmin,
    ProjectRead,
    ProjectWrite,
    ProjectAdmin,
}

impl PermissionCode {
    pub fn repository(scope: Scope) -> Self {
        match scope {
            Scope::Read => PermissionCode::RepoRead,
            Scope::Write => PermissionCode::RepoWrite,
            Scope::Admin => PermissionCode::RepoAdmin,
        }
    }

    pub fn project(scope: Scope) -> Self {
        match scope {
            Scope::Read => PermissionCode::ProjectRead,
            Scope::Write => PermissionCode::ProjectWrite,
            Scope::Admin => PermissionCode::ProjectAdmin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionCode::RepoRead => "REPO_READ",
            PermissionCode::RepoWrite => "REPO_WRITE",
            PermissionCode::RepoAdmin => "REPO_ADMIN",
            PermissionCode::ProjectRead => "PROJECT_READ",
            PermissionCode::ProjectWrite => "PROJECT_WRITE",
            PermissionCode::ProjectAdmin => "PROJECT_ADMIN",
        }
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Scopes requested on the command line.
pub struct PermissionRequest {
    pub project: Scope,
    pub repository: Scope,
}

impl PermissionRequest {
    pub fn parse(project: &str, repository: &str) -> Result<Self, PermissionError> {
        Ok(Self {
            project: project.parse()?,
            repository: repository.parse()?,
        })
    }

    pub fn grant(self) -> PermissionGrant {
        map_permissions(self.project, self.repository)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Concrete grant sent to Stash: repository code first, then project code.
///
/// Holding exactly one scope per level keeps the set non-empty and free of
/// duplicates.
pub struct PermissionGrant {
    repository: Scope,
    project: Scope,
}

impl PermissionGrant {
    pub fn repository_scope(&self) -> Scope {
        self.repository
    }

    pub fn project_scope(&self) -> Scope {
        self.project
    }

    pub fn codes(&self) -> [PermissionCode; 2] {
        [
            PermissionCode::repository(self.repository),
            PermissionCode::project(self.project),
        ]
    }
}

impl fmt::Display for PermissionGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [repository, project] = self.codes();
        write!(f, "{repository},{project}")
    }
}

impl Serialize for PermissionGrant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.codes())
    }
}

pub fn map_permissions(project: Scope, repository: Scope) -> PermissionGrant {
    match project {
        // Admin on the project implies admin on every repository beneath it.
        Scope::Admin => PermissionGrant {
            repository: Scope::Admin,
            project: Scope::Admin,
        },
        Scope::Write => PermissionGrant {
            repository: if repository == Scope::Admin {
                Scope::Admin
            } else {
                Scope::Write
            },
            project: Scope::Write,
        },
        Scope::Read => PermissionGrant {
            repository,
            project: Scope::Read,
        },
    }
}
