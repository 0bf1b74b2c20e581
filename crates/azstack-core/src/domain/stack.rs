//! Stack identity: the execution context of a program run and the
//! three-part key used to reference another stack's state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Fully-qualified stack key: `organization/project/stack`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackRef {
    organization: String,
    project: String,
    stack: String,
}

impl StackRef {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        stack: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let stack_ref = Self {
            organization: organization.into(),
            project: project.into(),
            stack: stack.into(),
        };
        stack_ref.validate()?;
        Ok(stack_ref)
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }
    pub fn project(&self) -> &str {
        &self.project
    }
    pub fn stack(&self) -> &str {
        &self.stack
    }

    fn validate(&self) -> Result<(), DomainError> {
        for (part, value) in [
            ("organization", &self.organization),
            ("project", &self.project),
            ("stack", &self.stack),
        ] {
            if value.is_empty() {
                return Err(DomainError::InvalidStackRef {
                    value: self.to_string(),
                    reason: format!("{part} is empty"),
                });
            }
            if value.contains('/') || value.chars().any(char::is_whitespace) {
                return Err(DomainError::InvalidStackRef {
                    value: self.to_string(),
                    reason: format!("{part} '{value}' contains '/' or whitespace"),
                });
            }
            if value == "." || value == ".." {
                return Err(DomainError::InvalidStackRef {
                    value: self.to_string(),
                    reason: format!("{part} cannot be '{value}'"),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for StackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.organization, self.project, self.stack)
    }
}

impl FromStr for StackRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [org, project, stack] => Self::new(*org, *project, *stack),
            _ => Err(DomainError::InvalidStackRef {
                value: s.into(),
                reason: "expected <organization>/<project>/<stack>".into(),
            }),
        }
    }
}

/// Where a program is running: organization, project and stack (stage) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackContext {
    stack_ref: StackRef,
}

impl StackContext {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        stack: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            stack_ref: StackRef::new(organization, project, stack)?,
        })
    }

    pub fn organization(&self) -> &str {
        self.stack_ref.organization()
    }
    pub fn project(&self) -> &str {
        self.stack_ref.project()
    }
    pub fn stack(&self) -> &str {
        self.stack_ref.stack()
    }

    pub fn stack_ref(&self) -> &StackRef {
        &self.stack_ref
    }

    /// The same organization and stage of another project.
    pub fn sibling(&self, project: &str) -> Result<StackRef, DomainError> {
        StackRef::new(self.organization(), project, self.stack())
    }
}

impl From<StackRef> for StackContext {
    fn from(stack_ref: StackRef) -> Self {
        Self { stack_ref }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_segments_are_rejected() {
        for input in [
            "./base-infra/dev",
            "acme/../dev",
            "acme/base-infra/.",
            "acme/base-infra/..",
        ] {
            let err = input.parse::<StackRef>().unwrap_err();
            assert!(
                matches!(err, DomainError::InvalidStackRef { .. }),
                "{input}: {err:?}"
            );
        }
        assert!(StackContext::new("acme", "..", "dev").is_err());
        assert!("acme/base.infra/dev..old".parse::<StackRef>().is_ok());
    }

    #[test]
    fn parses_three_parts() {
        let r: StackRef = "acme/base-infra/dev".parse().unwrap();
        assert_eq!(r.organization(), "acme");
        assert_eq!(r.project(), "base-infra");
        assert_eq!(r.stack(), "dev");
        assert_eq!(r.to_string(), "acme/base-infra/dev");
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!("acme/dev".parse::<StackRef>().is_err());
        assert!("a/b/c/d".parse::<StackRef>().is_err());
        assert!("acme//dev".parse::<StackRef>().is_err());
        assert!(StackRef::new("acme", "my project", "dev").is_err());
    }

    #[test]
    fn sibling_keeps_org_and_stage() {
        let ctx = StackContext::new("acme", "logic-app", "prod").unwrap();
        let base = ctx.sibling("base-infra").unwrap();
        assert_eq!(base.to_string(), "acme/base-infra/prod");
    }
}
