// crates/ability-gate-core/src/core/actor.rs
// ============================================================================
// Module: Actors
// Description: The identities a policy decision is made for.
// Purpose: Model every credential kind that can reach the engine as a closed sum.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An actor is whoever presents a credential: nobody, a human user (possibly
//! an administrator or auditor), a bot account, a deploy token, a deploy key,
//! or a CI job acting on behalf of the user who started it. Administrators
//! are users with the admin flag set; their elevated access only applies
//! while admin mode is on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::DeployKeyId;
use crate::core::identifiers::DeployTokenId;
use crate::core::identifiers::GroupId;
use crate::core::identifiers::JobId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Actor
// ============================================================================

/// Identity a decision is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    /// Unauthenticated visitor.
    Anonymous,
    /// Human user account.
    User(UserActor),
    /// Bot or service account.
    Bot(BotActor),
    /// Deploy token credential.
    DeployToken(DeployTokenActor),
    /// Deploy key credential.
    DeployKey(DeployKeyActor),
    /// CI job authenticated with its job token.
    CiJob(CiJobActor),
}

/// Human user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserActor {
    /// Account identifier.
    pub id: UserId,
    /// Instance administrator flag.
    #[serde(default)]
    pub admin: bool,
    /// Admin mode is active for this session.
    #[serde(default)]
    pub admin_mode: bool,
    /// Read-only auditor account.
    #[serde(default)]
    pub auditor: bool,
    /// External user; excluded from internal visibility.
    #[serde(default)]
    pub external: bool,
}

impl UserActor {
    /// Creates a regular (non-admin, non-auditor, internal) user.
    #[must_use]
    pub const fn regular(id: UserId) -> Self {
        Self {
            id,
            admin: false,
            admin_mode: false,
            auditor: false,
            external: false,
        }
    }

    /// Returns true when administrator powers are active.
    #[must_use]
    pub const fn admin_active(&self) -> bool {
        self.admin && self.admin_mode
    }
}

/// Bot account categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotKind {
    /// Service desk bot that files issues for external requesters.
    SupportBot,
    /// Alert management bot.
    AlertBot,
    /// Security scanning bot.
    SecurityBot,
    /// Security policy enforcement bot.
    SecurityPolicyBot,
    /// Automation bot.
    AutomationBot,
    /// Service account.
    ServiceAccount,
    /// Project or group access token bot.
    ProjectBot,
}

/// Bot or service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotActor {
    /// Account identifier.
    pub id: UserId,
    /// Bot category.
    pub bot: BotKind,
    /// External flag.
    #[serde(default)]
    pub external: bool,
}

/// Entity a deploy token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DeployTokenTarget {
    /// Token for a single project.
    Project(ProjectId),
    /// Token for every project in a group hierarchy.
    Group(GroupId),
}

/// Scope carried by a deploy token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployTokenScope {
    /// Clone the repository.
    ReadRepository,
    /// Pull container images.
    ReadRegistry,
    /// Push container images.
    WriteRegistry,
    /// Download packages.
    ReadPackageRegistry,
    /// Publish packages.
    WritePackageRegistry,
}

/// Deploy token credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployTokenActor {
    /// Token identifier.
    pub id: DeployTokenId,
    /// Project or group the token is bound to.
    pub target: DeployTokenTarget,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: BTreeSet<DeployTokenScope>,
    /// Revoked or expired tokens grant nothing.
    #[serde(default)]
    pub revoked: bool,
}

/// Project a deploy key is enabled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployKeyLink {
    /// Linked project.
    pub project: ProjectId,
    /// Key may push to this project.
    #[serde(default)]
    pub can_push: bool,
}

/// Deploy key credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployKeyActor {
    /// Key identifier.
    pub id: DeployKeyId,
    /// Projects the key is enabled for.
    #[serde(default)]
    pub links: Vec<DeployKeyLink>,
}

impl DeployKeyActor {
    /// Returns the link for `project`, if the key is enabled there.
    #[must_use]
    pub fn link(&self, project: ProjectId) -> Option<&DeployKeyLink> {
        self.links.iter().find(|link| link.project == project)
    }
}

/// CI job acting on behalf of the user that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CiJobActor {
    /// Job identifier.
    pub job: JobId,
    /// User the job runs as.
    pub user: UserActor,
    /// Project the job runs in.
    pub origin: ProjectId,
    /// Groups containing the origin project, nearest first.
    #[serde(default)]
    pub origin_namespace: Vec<GroupId>,
    /// Origin restricts which projects its token may reach.
    #[serde(default)]
    pub outbound_scope_enabled: bool,
}

// ============================================================================
// SECTION: Actor Queries
// ============================================================================

/// Coarse actor category used in audit records and explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Unauthenticated visitor.
    Anonymous,
    /// Human user.
    User,
    /// Bot account.
    Bot,
    /// Deploy token.
    DeployToken,
    /// Deploy key.
    DeployKey,
    /// CI job.
    CiJob,
}

impl ActorKind {
    /// Returns the stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::User => "user",
            Self::Bot => "bot",
            Self::DeployToken => "deploy_token",
            Self::DeployKey => "deploy_key",
            Self::CiJob => "ci_job",
        }
    }
}

/// Serializable actor reference: kind plus credential identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorRef {
    /// Actor category.
    pub kind: ActorKind,
    /// Credential identifier; absent for anonymous visitors.
    pub id: Option<u64>,
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}:{id}", self.kind.as_str()),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

impl Actor {
    /// Returns the actor category.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        match self {
            Self::Anonymous => ActorKind::Anonymous,
            Self::User(_) => ActorKind::User,
            Self::Bot(_) => ActorKind::Bot,
            Self::DeployToken(_) => ActorKind::DeployToken,
            Self::DeployKey(_) => ActorKind::DeployKey,
            Self::CiJob(_) => ActorKind::CiJob,
        }
    }

    /// Returns the serializable reference for this actor.
    #[must_use]
    pub const fn reference(&self) -> ActorRef {
        let id = match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user.id.get()),
            Self::Bot(bot) => Some(bot.id.get()),
            Self::DeployToken(token) => Some(token.id.get()),
            Self::DeployKey(key) => Some(key.id.get()),
            Self::CiJob(job) => Some(job.job.get()),
        };
        ActorRef {
            kind: self.kind(),
            id,
        }
    }

    /// Returns the user account whose memberships apply, if any.
    ///
    /// CI jobs act with the memberships of the user that started them.
    /// Deploy credentials are not user accounts.
    #[must_use]
    pub const fn subject_user(&self) -> Option<UserId> {
        match self {
            Self::User(user) => Some(user.id),
            Self::Bot(bot) => Some(bot.id),
            Self::CiJob(job) => Some(job.user.id),
            Self::Anonymous | Self::DeployToken(_) | Self::DeployKey(_) => None,
        }
    }

    /// Returns the human account backing this actor, if any.
    #[must_use]
    pub const fn human(&self) -> Option<&UserActor> {
        match self {
            Self::User(user) => Some(user),
            Self::CiJob(job) => Some(&job.user),
            Self::Anonymous | Self::Bot(_) | Self::DeployToken(_) | Self::DeployKey(_) => None,
        }
    }

    /// Returns true for unauthenticated visitors.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Returns true for an administrator with admin mode active.
    ///
    /// Jobs never inherit administrator powers from their user.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        match self {
            Self::User(user) => user.admin_active(),
            _ => false,
        }
    }

    /// Returns true for auditor accounts.
    #[must_use]
    pub const fn is_auditor(&self) -> bool {
        match self {
            Self::User(user) => user.auditor,
            _ => false,
        }
    }

    /// Returns true for external accounts.
    #[must_use]
    pub const fn is_external(&self) -> bool {
        match self {
            Self::User(user) => user.external,
            Self::Bot(bot) => bot.external,
            Self::CiJob(job) => job.user.external,
            Self::Anonymous | Self::DeployToken(_) | Self::DeployKey(_) => false,
        }
    }
}
