//! The declaration collector for one program run.
//!
//! A [`Deployment`] is threaded by mutable reference through every resource
//! constructor. It owns the stack context, the stack configuration and the
//! [`DeploymentPolicy`]; transforms registered on it apply to every
//! declaration made afterwards, in the order the program makes them.

use std::sync::Arc;

use crate::domain::{
    config::StackConfig,
    error::{DomainError, DomainResult},
    input::Input,
    policy::{DeploymentPolicy, ResourceTransform},
    resource::{Props, ResourceDeclaration, ResourceOptions, ResourceType, Urn},
    stack::StackContext,
};

/// A named stack output.
#[derive(Debug, Clone)]
pub struct Export {
    pub name: String,
    pub value: Input,
}

#[derive(Debug)]
pub struct Deployment {
    context: StackContext,
    config: StackConfig,
    policy: DeploymentPolicy,
    resources: Vec<ResourceDeclaration>,
    exports: Vec<Export>,
}

impl Deployment {
    pub fn new(context: StackContext, config: StackConfig) -> Self {
        Self {
            context,
            config,
            policy: DeploymentPolicy::new(),
            resources: Vec::new(),
            exports: Vec::new(),
        }
    }

    pub fn context(&self) -> &StackContext {
        &self.context
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn policy(&self) -> &DeploymentPolicy {
        &self.policy
    }

    /// Register a transform for all resources declared from now on.
    pub fn register_transform(&mut self, transform: Arc<dyn ResourceTransform>) -> DomainResult<()> {
        self.policy.register(transform)
    }

    /// Add a resource to the deployment and return its identity.
    ///
    /// Registered transforms run before dependency validation, so a transform
    /// may add inputs but every resource it references must already exist.
    pub fn declare(
        &mut self,
        resource_type: ResourceType,
        name: &str,
        mut inputs: Props,
        mut options: ResourceOptions,
    ) -> DomainResult<Urn> {
        if name.trim().is_empty() {
            return Err(DomainError::InvalidResourceName {
                name: name.into(),
                reason: "name must not be empty".into(),
            });
        }
        if name.contains("::") {
            return Err(DomainError::InvalidResourceName {
                name: name.into(),
                reason: "name must not contain '::'".into(),
            });
        }

        let urn = Urn::new(
            self.context.stack(),
            self.context.project(),
            resource_type,
            name,
        );
        if self.resource(&urn).is_some() {
            return Err(DomainError::DuplicateResource {
                urn: urn.to_string(),
            });
        }

        let applied_transforms = self
            .policy
            .apply(resource_type, name, &mut inputs, &mut options);

        let declaration = ResourceDeclaration {
            urn: urn.clone(),
            resource_type,
            name: name.to_string(),
            inputs,
            options,
            applied_transforms,
        };

        if let Some(missing) = declaration
            .dependencies()
            .into_iter()
            .find(|dep| self.resource(dep).is_none())
        {
            return Err(DomainError::UnknownDependency {
                resource: urn.to_string(),
                dependency: missing.to_string(),
            });
        }

        self.resources.push(declaration);
        Ok(urn)
    }

    /// Publish a named stack output.
    pub fn export(&mut self, name: impl Into<String>, value: impl Into<Input>) -> DomainResult<()> {
        let name = name.into();
        if self.exports.iter().any(|e| e.name == name) {
            return Err(DomainError::DuplicateExport { name });
        }
        self.exports.push(Export {
            name,
            value: value.into(),
        });
        Ok(())
    }

    pub fn resources(&self) -> &[ResourceDeclaration] {
        &self.resources
    }

    pub fn resource(&self, urn: &Urn) -> Option<&ResourceDeclaration> {
        self.resources.iter().find(|r| &r.urn == urn)
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{output::Output, policy::ProtectTransform};

    fn deployment() -> Deployment {
        Deployment::new(
            StackContext::new("org", "base-infra", "dev").unwrap(),
            StackConfig::new("base-infra"),
        )
    }

    #[test]
    fn transform_applies_only_after_registration() {
        let mut d = deployment();
        let before = d
            .declare(ResourceType::ResourceGroup, "rg", Props::new(), ResourceOptions::new())
            .unwrap();
        d.register_transform(Arc::new(ProtectTransform::new(true)))
            .unwrap();
        let after = d
            .declare(ResourceType::StorageAccount, "sa", Props::new(), ResourceOptions::new())
            .unwrap();

        let before = d.resource(&before).unwrap();
        let after = d.resource(&after).unwrap();
        assert!(!before.is_protected());
        assert!(before.applied_transforms().is_empty());
        assert!(after.is_protected());
        assert_eq!(after.applied_transforms(), ["protect".to_string()]);
    }

    #[test]
    fn protect_transform_wins_over_explicit_option() {
        let mut d = deployment();
        d.register_transform(Arc::new(ProtectTransform::new(true)))
            .unwrap();
        let urn = d
            .declare(
                ResourceType::StorageAccount,
                "sa",
                Props::new(),
                ResourceOptions::protect(false),
            )
            .unwrap();
        assert!(d.resource(&urn).unwrap().is_protected());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut d = deployment();
        d.declare(ResourceType::ResourceGroup, "rg", Props::new(), ResourceOptions::new())
            .unwrap();
        let err = d
            .declare(ResourceType::ResourceGroup, "rg", Props::new(), ResourceOptions::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateResource { .. }));

        // Same logical name under another type is a different resource.
        assert!(
            d.declare(ResourceType::StorageAccount, "rg", Props::new(), ResourceOptions::new())
                .is_ok()
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut d = deployment();
        let err = d
            .declare(ResourceType::Workflow, " ", Props::new(), ResourceOptions::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidResourceName { .. }));
    }

    #[test]
    fn references_must_point_at_declared_resources() {
        let mut d = deployment();
        let ghost = Urn::new("dev", "base-infra", ResourceType::ResourceGroup, "ghost");
        let mut inputs = Props::new();
        inputs.insert(
            "resourceGroupName".into(),
            Output::property(ghost.clone(), "name").into(),
        );
        let err = d
            .declare(ResourceType::StorageAccount, "sa", inputs, ResourceOptions::new())
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownDependency {
                resource: Urn::new("dev", "base-infra", ResourceType::StorageAccount, "sa")
                    .to_string(),
                dependency: ghost.to_string(),
            }
        );

        let err = d
            .declare(
                ResourceType::Workflow,
                "wf",
                Props::new(),
                ResourceOptions::new().depends_on(&ghost),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownDependency { .. }));
        assert!(d.resources().is_empty());
    }

    #[test]
    fn exports_are_unique() {
        let mut d = deployment();
        d.export("db_name", "sqldb").unwrap();
        assert_eq!(
            d.export("db_name", "other").unwrap_err(),
            DomainError::DuplicateExport {
                name: "db_name".into()
            }
        );
        assert_eq!(d.exports().len(), 1);
    }
}
