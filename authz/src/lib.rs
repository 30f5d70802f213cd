//! CEDAR-based authorization for the dashboard API.
//!
//! Every mutating request is checked against one static policy set before
//! the resource managers run. The policies encode the product's three
//! authorization tiers:
//!
//! 1. **Owner-only** — profile edits, avatar upload, password change and
//!    sub-record attach/detach are permitted only when the resource's owner
//!    is the caller. There is deliberately no admin override on this tier.
//! 2. **Admin-only** — user, group, news, achievement and carousel
//!    management plus password resets require the admin flag.
//! 3. **Open** — blog, file, document and image operations are open to any
//!    authenticated member.
//!
//! Anything else is denied: the engine is deny-by-default, and evaluation
//! errors fail closed.
//!
//! The entity store is rebuilt per request from authenticated data only: the
//! principal's admin flag comes from the validated token, the resource owner
//! from the database row being acted on.

pub mod error;
pub mod types;

use cedar_policy::{
    Authorizer, Context, Decision, Entities, EntityId, EntityTypeName, EntityUid, PolicySet,
    Request,
};
use std::str::FromStr;

use error::{AuthzError, Result};
use types::{Action, Principal, Resource};

/// The product's authorization policy, one tier per policy.
const POLICY_SRC: &str = r#"
    permit(
        principal,
        action in [Action::"update_profile", Action::"upload_avatar",
                   Action::"change_password", Action::"attach_record",
                   Action::"detach_record"],
        resource
    ) when { resource has owner && resource.owner == principal };

    permit(
        principal,
        action in [Action::"manage_users", Action::"manage_groups",
                   Action::"manage_news", Action::"manage_achievements",
                   Action::"manage_carousel", Action::"reset_password"],
        resource
    ) when { principal has admin && principal.admin == true };

    permit(
        principal,
        action in [Action::"read_profile", Action::"read_groups",
                   Action::"write_blog", Action::"read_blog",
                   Action::"delete_blog", Action::"upload_images",
                   Action::"upload_document", Action::"list_documents",
                   Action::"delete_document", Action::"download_file",
                   Action::"delete_file"],
        resource
    );
"#;

/// The authorization engine: a parsed policy set plus the CEDAR authorizer.
/// Built once at startup and shared behind an `Arc`.
pub struct PolicyEngine {
    authorizer: Authorizer,
    policies: PolicySet,
}

impl PolicyEngine {
    pub fn new() -> Result<Self> {
        let policies =
            PolicySet::from_str(POLICY_SRC).map_err(|e| AuthzError::PolicyParse(e.to_string()))?;
        Ok(Self {
            authorizer: Authorizer::new(),
            policies,
        })
    }

    /// Evaluate one request. `Ok(true)` means explicitly allowed; everything
    /// else, including evaluation errors, is a deny.
    pub fn is_authorized(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> Result<bool> {
        let entities = self.build_entities(principal, action, resource)?;
        let request = self.build_request(principal, action, resource)?;

        let response = self
            .authorizer
            .is_authorized(&request, &self.policies, &entities);

        Ok(response.decision() == Decision::Allow)
    }

    /// Build the per-request entity store: the principal with its admin
    /// attribute, the action, and the resource with its owner reference when
    /// it has one.
    fn build_entities(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> Result<Entities> {
        let resource_attrs = match &resource.owner {
            Some(owner) => serde_json::json!({
                "owner": { "__entity": { "type": "User", "id": owner } }
            }),
            None => serde_json::json!({}),
        };

        let entities_json = serde_json::json!([
            {
                "uid": { "type": "User", "id": principal.id },
                "attrs": { "admin": principal.admin },
                "parents": []
            },
            {
                "uid": { "type": "Action", "id": action.name() },
                "attrs": {},
                "parents": []
            },
            {
                "uid": { "type": resource.kind, "id": resource.id },
                "attrs": resource_attrs,
                "parents": []
            }
        ]);

        Entities::from_json_value(entities_json, None)
            .map_err(|e| AuthzError::EntityCreation(e.to_string()))
    }

    fn build_request(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> Result<Request> {
        let principal_uid = EntityUid::from_type_name_and_id(
            EntityTypeName::from_str("User")
                .map_err(|e| AuthzError::EntityCreation(format!("Invalid principal type: {}", e)))?,
            EntityId::new(&principal.id),
        );

        let action_uid = EntityUid::from_type_name_and_id(
            EntityTypeName::from_str("Action")
                .map_err(|e| AuthzError::EntityCreation(format!("Invalid action type: {}", e)))?,
            EntityId::new(action.name()),
        );

        let resource_uid = EntityUid::from_type_name_and_id(
            EntityTypeName::from_str(resource.kind)
                .map_err(|e| AuthzError::EntityCreation(format!("Invalid resource type: {}", e)))?,
            EntityId::new(&resource.id),
        );

        Request::new(
            Some(principal_uid),
            Some(action_uid),
            Some(resource_uid),
            Context::empty(),
            None,
        )
        .map_err(|e| AuthzError::EvaluationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PolicyEngine {
        PolicyEngine::new().unwrap()
    }

    fn member(id: &str) -> Principal {
        Principal::new(id, false)
    }

    fn admin(id: &str) -> Principal {
        Principal::new(id, true)
    }

    #[test]
    fn policies_parse() {
        assert!(PolicyEngine::new().is_ok());
    }

    #[test]
    fn owner_may_edit_own_profile() {
        let e = engine();
        let resource = Resource::new("Account", "u1").owned_by("u1");
        assert!(e
            .is_authorized(&member("u1"), Action::UpdateProfile, &resource)
            .unwrap());
    }

    #[test]
    fn non_owner_is_denied_even_with_the_right_id_in_hand() {
        let e = engine();
        let resource = Resource::new("Account", "u2").owned_by("u2");
        assert!(!e
            .is_authorized(&member("u1"), Action::UpdateProfile, &resource)
            .unwrap());
    }

    #[test]
    fn admin_gets_no_override_on_owner_tier() {
        let e = engine();
        let resource = Resource::new("Account", "u2").owned_by("u2");
        assert!(!e
            .is_authorized(&admin("root"), Action::UpdateProfile, &resource)
            .unwrap());
        assert!(!e
            .is_authorized(&admin("root"), Action::DetachRecord, &resource)
            .unwrap());
    }

    #[test]
    fn ownerless_resource_denies_owner_tier_actions() {
        let e = engine();
        let resource = Resource::new("Account", "u1");
        assert!(!e
            .is_authorized(&member("u1"), Action::UpdateProfile, &resource)
            .unwrap());
    }

    #[test]
    fn admin_tier_requires_the_admin_flag() {
        let e = engine();
        let actions = [
            Action::ManageUsers,
            Action::ManageGroups,
            Action::ManageNews,
            Action::ManageAchievements,
            Action::ManageCarousel,
            Action::ResetPassword,
        ];
        for action in actions {
            let resource = Resource::collection("Account");
            assert!(
                e.is_authorized(&admin("root"), action, &resource).unwrap(),
                "admin should be allowed {}",
                action.name()
            );
            assert!(
                !e.is_authorized(&member("u1"), action, &resource).unwrap(),
                "member should be denied {}",
                action.name()
            );
        }
    }

    #[test]
    fn open_tier_allows_any_authenticated_member() {
        let e = engine();
        let actions = [
            Action::ReadProfile,
            Action::ReadGroups,
            Action::WriteBlog,
            Action::ReadBlog,
            Action::DeleteBlog,
            Action::UploadImages,
            Action::UploadDocument,
            Action::ListDocuments,
            Action::DeleteDocument,
            Action::DownloadFile,
            Action::DeleteFile,
        ];
        for action in actions {
            let resource = Resource::collection("Blog");
            assert!(
                e.is_authorized(&member("u1"), action, &resource).unwrap(),
                "member should be allowed {}",
                action.name()
            );
            assert!(
                e.is_authorized(&admin("root"), action, &resource).unwrap(),
                "admin should be allowed {}",
                action.name()
            );
        }
    }

    #[test]
    fn attach_and_detach_follow_ownership() {
        let e = engine();
        let own = Resource::new("Record", "p1").owned_by("u1");
        let other = Resource::new("Record", "p2").owned_by("u2");

        assert!(e
            .is_authorized(&member("u1"), Action::AttachRecord, &own)
            .unwrap());
        assert!(e
            .is_authorized(&member("u1"), Action::DetachRecord, &own)
            .unwrap());
        assert!(!e
            .is_authorized(&member("u1"), Action::DetachRecord, &other)
            .unwrap());
    }
}
