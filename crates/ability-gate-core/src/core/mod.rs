// crates/ability-gate-core/src/core/mod.rs
// ============================================================================
// Module: Ability Gate Core Types
// Description: Data model for actors, resources, abilities, and switches.
// Purpose: Group the serializable vocabulary shared by runtime and policies.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain data. Nothing here performs I/O or evaluates rules;
//! the runtime layer interprets these values against collaborator state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod ability;
pub mod actor;
pub mod custom_role;
pub mod features;
pub mod identifiers;
pub mod resource;
pub mod role;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use ability::Ability;
pub use ability::AbilityCategory;
pub use actor::Actor;
pub use actor::ActorKind;
pub use actor::ActorRef;
pub use actor::BotActor;
pub use actor::BotKind;
pub use actor::CiJobActor;
pub use actor::DeployKeyActor;
pub use actor::DeployKeyLink;
pub use actor::DeployTokenActor;
pub use actor::DeployTokenScope;
pub use actor::DeployTokenTarget;
pub use actor::UserActor;
pub use custom_role::CustomPermission;
pub use custom_role::MemberRole;
pub use features::FeatureAccessLevel;
pub use features::FeatureFlag;
pub use features::FeatureLevels;
pub use features::FlagScope;
pub use features::InstanceSetting;
pub use features::InstanceSettings;
pub use features::LicensedFeature;
pub use features::ProjectFeature;
pub use features::RequestContext;
pub use features::Visibility;
pub use identifiers::DeployKeyId;
pub use identifiers::DeployTokenId;
pub use identifiers::GroupId;
pub use identifiers::InvalidIdentifier;
pub use identifiers::IssueId;
pub use identifiers::JobId;
pub use identifiers::MemberRoleId;
pub use identifiers::ProjectId;
pub use identifiers::UserId;
pub use identifiers::VulnerabilityId;
pub use identifiers::WorkItemId;
pub use resource::CiCancellationRestriction;
pub use resource::GroupSnapshot;
pub use resource::IssueSnapshot;
pub use resource::MembershipTarget;
pub use resource::NamespaceSnapshot;
pub use resource::ProjectSettings;
pub use resource::ProjectSnapshot;
pub use resource::Resource;
pub use resource::ResourceKind;
pub use resource::ResourceRef;
pub use resource::ResourceSnapshot;
pub use resource::SsoSettings;
pub use resource::VulnerabilitySnapshot;
pub use resource::WorkItemContainer;
pub use resource::WorkItemSnapshot;
pub use resource::WorkItemType;
pub use role::AccessLevel;
