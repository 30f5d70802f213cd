//! Core authorization types: who is asking ([`Principal`]), what they want to
//! do ([`Action`]) and what they want to do it to ([`Resource`]).

/// The authenticated caller, as established by token validation. There is no
/// anonymous principal: public routes never consult the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub admin: bool,
}

impl Principal {
    pub fn new(id: impl Into<String>, admin: bool) -> Self {
        Self {
            id: id.into(),
            admin,
        }
    }
}

/// Every operation the dashboard exposes, named for what it does. The policy
/// groups these into three tiers: owner-only, admin-only and
/// any-authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Owner-only operations on one's own account and sub-records.
    UpdateProfile,
    UploadAvatar,
    ChangePassword,
    AttachRecord,
    DetachRecord,
    // Administrative surface.
    ManageUsers,
    ManageGroups,
    ManageNews,
    ManageAchievements,
    ManageCarousel,
    ResetPassword,
    // Open to any authenticated member.
    ReadProfile,
    ReadGroups,
    WriteBlog,
    ReadBlog,
    DeleteBlog,
    UploadImages,
    UploadDocument,
    ListDocuments,
    DeleteDocument,
    DownloadFile,
    DeleteFile,
}

impl Action {
    /// The Cedar action id this variant evaluates as.
    pub fn name(&self) -> &'static str {
        match self {
            Action::UpdateProfile => "update_profile",
            Action::UploadAvatar => "upload_avatar",
            Action::ChangePassword => "change_password",
            Action::AttachRecord => "attach_record",
            Action::DetachRecord => "detach_record",
            Action::ManageUsers => "manage_users",
            Action::ManageGroups => "manage_groups",
            Action::ManageNews => "manage_news",
            Action::ManageAchievements => "manage_achievements",
            Action::ManageCarousel => "manage_carousel",
            Action::ResetPassword => "reset_password",
            Action::ReadProfile => "read_profile",
            Action::ReadGroups => "read_groups",
            Action::WriteBlog => "write_blog",
            Action::ReadBlog => "read_blog",
            Action::DeleteBlog => "delete_blog",
            Action::UploadImages => "upload_images",
            Action::UploadDocument => "upload_document",
            Action::ListDocuments => "list_documents",
            Action::DeleteDocument => "delete_document",
            Action::DownloadFile => "download_file",
            Action::DeleteFile => "delete_file",
        }
    }
}

/// The target of an operation. `owner` is the account the resource belongs
/// to, loaded from storage (or derived from the token for the caller's own
/// account) — never taken from client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: &'static str,
    pub id: String,
    pub owner: Option<String>,
}

impl Resource {
    pub fn new(kind: &'static str, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            owner: None,
        }
    }

    /// A whole entity family, for operations with no single target yet
    /// (create, list).
    pub fn collection(kind: &'static str) -> Self {
        Self::new(kind, "collection")
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}
