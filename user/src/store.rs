//! Account persistence: the credential store plus every account-side
//! operation the dashboard and the public member pages need.
//!
//! Ownership of sub-records (publications, educations, awards) is a column on
//! the record itself, so attaching and detaching cannot drift out of sync
//! with the owning account.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{info, warn};
use uuid::Uuid;

use database::Database;
use entities::{
    Account, AccountSummary, Award, Education, Group, GroupSummary, Publication, Role,
};

use crate::auth::password;
use crate::error::{Result, UserError};

/// The password an admin reset assigns. A deliberately weak, well-known
/// first-login value, not a secure default; the operation carrying it is
/// named accordingly, and members are expected to change it immediately.
pub const DEFAULT_RESET_PASSWORD: &str = "123456";

/// Fields accepted when creating an account, via signup or the admin form.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub name: String,
    pub name_en: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub role: Role,
    pub supervisor_id: Option<String>,
    pub interests: Option<String>,
    pub introduction: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
}

/// Partial update of an account's own profile fields. Username, password and
/// the admin flag are deliberately absent: the first is immutable, the other
/// two have dedicated, separately authorized paths.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub supervisor_id: Option<String>,
    pub interests: Option<String>,
    pub introduction: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
    pub graduate: Option<bool>,
}

/// Partial update applied by an administrator to any account. Extends the
/// profile fields with role, admin flag and group membership; still never
/// touches the password.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminAccountUpdate {
    #[serde(flatten)]
    pub profile: ProfileUpdate,
    pub role: Option<Role>,
    pub admin: Option<bool>,
    pub groups: Option<Vec<String>>,
}

/// Admin user-list filter: students are everyone below faculty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCategory {
    Student,
    Supervisor,
}

/// The dashboard profile view: safe account fields with owned sub-records
/// expanded. Password and admin flag are excluded.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub username: String,
    pub name: String,
    pub name_en: String,
    pub supervisor_id: Option<String>,
    pub role: Role,
    pub interests: Option<String>,
    pub introduction: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
    pub photo: String,
    pub graduate: bool,
    pub publications: Vec<Publication>,
    pub educations: Vec<Education>,
    pub awards: Vec<Award>,
    pub groups: Vec<GroupSummary>,
}

/// One row of the admin user list.
#[derive(Debug, Serialize)]
pub struct AdminUserView {
    pub id: String,
    pub username: String,
    pub name: String,
    pub name_en: String,
    pub photo: String,
    pub admin: bool,
    pub role: Role,
    pub graduate: bool,
    pub supervisor: Option<AccountSummary>,
    pub groups: Vec<GroupSummary>,
}

/// A faculty card on the public member directory.
#[derive(Debug, Serialize, FromRow)]
pub struct FacultyCard {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub photo: String,
    pub interests: Option<String>,
    pub homepage: Option<String>,
}

/// A student card on the public member directory.
#[derive(Debug, Serialize, FromRow)]
pub struct StudentCard {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub photo: String,
    pub homepage: Option<String>,
    pub graduate: bool,
    pub role: Role,
    pub supervisor_name: Option<String>,
    pub supervisor_name_en: Option<String>,
}

/// The public member page: everything a visitor may see about one member.
#[derive(Debug, Serialize)]
pub struct PublicMemberView {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub role: Role,
    pub interests: Option<String>,
    pub introduction: Option<String>,
    pub email: Option<String>,
    pub homepage: Option<String>,
    pub photo: String,
    pub graduate: bool,
    pub supervisor: Option<AccountSummary>,
    pub groups: Vec<Group>,
    pub educations: Vec<Education>,
    pub publications: Vec<Publication>,
    pub awards: Vec<Award>,
}

#[derive(FromRow)]
struct AdminUserRow {
    id: String,
    username: String,
    name: String,
    name_en: String,
    photo: String,
    admin: bool,
    role: Role,
    graduate: bool,
    supervisor_id: Option<String>,
    supervisor_name: Option<String>,
    supervisor_name_en: Option<String>,
}

/// Account operations over the shared pool.
pub struct AccountStore<'a> {
    db: &'a Database,
}

impl<'a> AccountStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an account, hashing the password before it is stored.
    ///
    /// The username must be unused (case-sensitive exact match); a duplicate
    /// fails with [`UserError::UsernameTaken`] and inserts nothing.
    pub async fn create(&self, new: NewAccount) -> Result<Account> {
        let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(&new.username)
            .fetch_one(self.db.pool())
            .await?;
        if taken > 0 {
            return Err(UserError::UsernameTaken(new.username));
        }

        let id = Uuid::new_v4().to_string();
        let password_hash = password::hash_password(&new.password)?;

        let insert = sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, name, name_en, supervisor_id,
                admin, role, interests, introduction, email, homepage
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.username)
        .bind(&password_hash)
        .bind(&new.name)
        .bind(&new.name_en)
        .bind(&new.supervisor_id)
        .bind(new.admin)
        .bind(new.role)
        .bind(&new.interests)
        .bind(&new.introduction)
        .bind(&new.email)
        .bind(&new.homepage)
        .execute(self.db.pool())
        .await;

        if let Err(e) = insert {
            // Two signups racing on the same username: the UNIQUE constraint
            // catches what the pre-check missed.
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false)
            {
                return Err(UserError::UsernameTaken(new.username));
            }
            return Err(e.into());
        }

        info!("Created account {} ({})", new.username, id);
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| UserError::UserNotFound(id))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(account)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(account)
    }

    /// The dashboard profile of one account, sub-records expanded.
    pub async fn profile(&self, id: &str) -> Result<ProfileView> {
        let account = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::UserNotFound(id.to_string()))?;

        let (publications, educations, awards, groups) = tokio::try_join!(
            self.publications_of(id),
            self.educations_of(id),
            self.awards_of(id),
            self.group_summaries_of(id),
        )?;

        Ok(ProfileView {
            id: account.id,
            username: account.username,
            name: account.name,
            name_en: account.name_en,
            supervisor_id: account.supervisor_id,
            role: account.role,
            interests: account.interests,
            introduction: account.introduction,
            email: account.email,
            homepage: account.homepage,
            photo: account.photo,
            graduate: account.graduate,
            publications,
            educations,
            awards,
            groups,
        })
    }

    /// Partial update of the account's own profile fields.
    pub async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                name_en = COALESCE(?, name_en),
                supervisor_id = COALESCE(?, supervisor_id),
                interests = COALESCE(?, interests),
                introduction = COALESCE(?, introduction),
                email = COALESCE(?, email),
                homepage = COALESCE(?, homepage),
                graduate = COALESCE(?, graduate)
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.name_en)
        .bind(&update.supervisor_id)
        .bind(&update.interests)
        .bind(&update.introduction)
        .bind(&update.email)
        .bind(&update.homepage)
        .bind(update.graduate)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Record a freshly stored avatar path.
    pub async fn set_photo(&self, id: &str, photo: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET photo = ? WHERE id = ?")
            .bind(photo)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Self-service password change: the current password must verify.
    pub async fn change_password(&self, id: &str, old: &str, new: &str) -> Result<()> {
        let account = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::UserNotFound(id.to_string()))?;

        if !password::verify_password(&account.password_hash, old) {
            return Err(UserError::InvalidCredentials);
        }

        self.store_password(id, new).await
    }

    /// Admin reset: sets the documented fixed default password
    /// ([`DEFAULT_RESET_PASSWORD`]). Not a secure default; members are
    /// expected to change it on next login.
    pub async fn reset_password_to_default(&self, id: &str) -> Result<()> {
        if self.find_by_id(id).await?.is_none() {
            return Err(UserError::UserNotFound(id.to_string()));
        }
        self.store_password(id, DEFAULT_RESET_PASSWORD).await?;
        warn!("Password for account {} reset to the fixed default", id);
        Ok(())
    }

    async fn store_password(&self, id: &str, new: &str) -> Result<()> {
        let hash = password::hash_password(new)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(&hash)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    /// Admin user list with supervisor and group summaries expanded.
    pub async fn list(&self, category: Option<UserCategory>) -> Result<Vec<AdminUserView>> {
        let filter = category.map(|c| match c {
            UserCategory::Student => "student",
            UserCategory::Supervisor => "supervisor",
        });

        let rows = sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT u.id, u.username, u.name, u.name_en, u.photo, u.admin, u.role,
                   u.graduate, u.supervisor_id,
                   s.name AS supervisor_name, s.name_en AS supervisor_name_en
            FROM users u
            LEFT JOIN users s ON s.id = u.supervisor_id
            WHERE ?1 IS NULL
               OR (?1 = 'student' AND u.role <> 3)
               OR (?1 = 'supervisor' AND u.role = 3)
            ORDER BY u.username
            "#,
        )
        .bind(filter)
        .fetch_all(self.db.pool())
        .await?;

        let memberships = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT ug.user_id, g.id, g.name
            FROM user_groups ug
            JOIN groups g ON g.id = ug.group_id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut groups_by_user: HashMap<String, Vec<GroupSummary>> = HashMap::new();
        for (user_id, group_id, group_name) in memberships {
            groups_by_user.entry(user_id).or_default().push(GroupSummary {
                id: group_id,
                name: group_name,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let supervisor = match (row.supervisor_id, row.supervisor_name) {
                    (Some(id), Some(name)) => Some(AccountSummary {
                        id,
                        name,
                        name_en: row.supervisor_name_en.unwrap_or_default(),
                    }),
                    _ => None,
                };
                let groups = groups_by_user.remove(&row.id).unwrap_or_default();
                AdminUserView {
                    id: row.id,
                    username: row.username,
                    name: row.name,
                    name_en: row.name_en,
                    photo: row.photo,
                    admin: row.admin,
                    role: row.role,
                    graduate: row.graduate,
                    supervisor,
                    groups,
                }
            })
            .collect())
    }

    /// Admin update of any account, including role, admin flag and group
    /// membership. The membership set is replaced atomically with the field
    /// updates.
    pub async fn admin_update(&self, id: &str, update: AdminAccountUpdate) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        let p = &update.profile;
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                name_en = COALESCE(?, name_en),
                supervisor_id = COALESCE(?, supervisor_id),
                interests = COALESCE(?, interests),
                introduction = COALESCE(?, introduction),
                email = COALESCE(?, email),
                homepage = COALESCE(?, homepage),
                graduate = COALESCE(?, graduate),
                role = COALESCE(?, role),
                admin = COALESCE(?, admin)
            WHERE id = ?
            "#,
        )
        .bind(&p.name)
        .bind(&p.name_en)
        .bind(&p.supervisor_id)
        .bind(&p.interests)
        .bind(&p.introduction)
        .bind(&p.email)
        .bind(&p.homepage)
        .bind(p.graduate)
        .bind(update.role)
        .bind(update.admin)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound(id.to_string()));
        }

        if let Some(groups) = update.groups {
            sqlx::query("DELETE FROM user_groups WHERE user_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for group_id in groups {
                sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_id) VALUES (?, ?)")
                    .bind(id)
                    .bind(&group_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete an account, returning the removed row so the caller can unlink
    /// a stored avatar. Owned sub-records and memberships go with it.
    pub async fn delete(&self, id: &str) -> Result<Account> {
        let account = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::UserNotFound(id.to_string()))?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        info!("Deleted account {} ({})", account.username, id);
        Ok(account)
    }

    /// The public member directory: faculty and students, read concurrently.
    /// A failed section degrades to an empty list rather than failing the
    /// page.
    pub async fn member_directory(&self) -> (Vec<FacultyCard>, Vec<StudentCard>) {
        let faculty = sqlx::query_as::<_, FacultyCard>(
            r#"
            SELECT id, name, name_en, photo, interests, homepage
            FROM users WHERE role = 3
            ORDER BY name
            "#,
        )
        .fetch_all(self.db.pool());

        let students = sqlx::query_as::<_, StudentCard>(
            r#"
            SELECT u.id, u.name, u.name_en, u.photo, u.homepage, u.graduate, u.role,
                   s.name AS supervisor_name, s.name_en AS supervisor_name_en
            FROM users u
            LEFT JOIN users s ON s.id = u.supervisor_id
            WHERE u.role <> 3
            ORDER BY u.name
            "#,
        )
        .fetch_all(self.db.pool());

        let (faculty, students) = tokio::join!(faculty, students);

        let faculty = faculty.unwrap_or_else(|e| {
            warn!("Failed to retrieve the faculty list: {}", e);
            Vec::new()
        });
        let students = students.unwrap_or_else(|e| {
            warn!("Failed to retrieve the student list: {}", e);
            Vec::new()
        });

        (faculty, students)
    }

    /// The public member page for one account.
    pub async fn public_profile(&self, id: &str) -> Result<PublicMemberView> {
        let account = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::UserNotFound(id.to_string()))?;

        let supervisor = match &account.supervisor_id {
            Some(sid) => {
                sqlx::query_as::<_, AccountSummary>(
                    "SELECT id, name, name_en FROM users WHERE id = ?",
                )
                .bind(sid)
                .fetch_optional(self.db.pool())
                .await?
            }
            None => None,
        };

        let (groups, educations, publications, awards) = tokio::try_join!(
            self.groups_of(id),
            self.educations_of(id),
            self.publications_of(id),
            self.awards_of(id),
        )?;

        Ok(PublicMemberView {
            id: account.id,
            name: account.name,
            name_en: account.name_en,
            role: account.role,
            interests: account.interests,
            introduction: account.introduction,
            email: account.email,
            homepage: account.homepage,
            photo: account.photo,
            graduate: account.graduate,
            supervisor,
            groups,
            educations,
            publications,
            awards,
        })
    }

    async fn publications_of(&self, id: &str) -> std::result::Result<Vec<Publication>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM publications WHERE owner_id = ? ORDER BY date DESC")
            .bind(id)
            .fetch_all(self.db.pool())
            .await
    }

    async fn educations_of(&self, id: &str) -> std::result::Result<Vec<Education>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM educations WHERE owner_id = ? ORDER BY start DESC")
            .bind(id)
            .fetch_all(self.db.pool())
            .await
    }

    async fn awards_of(&self, id: &str) -> std::result::Result<Vec<Award>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM awards WHERE owner_id = ?")
            .bind(id)
            .fetch_all(self.db.pool())
            .await
    }

    async fn group_summaries_of(
        &self,
        id: &str,
    ) -> std::result::Result<Vec<GroupSummary>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT g.id, g.name
            FROM groups g
            JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(self.db.pool())
        .await
    }

    async fn groups_of(&self, id: &str) -> std::result::Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT g.*
            FROM groups g
            JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(id)
        .fetch_all(self.db.pool())
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (dir, db)
    }

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password: "secret".to_string(),
            name: "测试".to_string(),
            name_en: "Test User".to_string(),
            admin: false,
            role: Role::Master,
            supervisor_id: None,
            interests: None,
            introduction: None,
            email: None,
            homepage: None,
        }
    }

    #[tokio::test]
    async fn create_hashes_password_and_applies_defaults() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);

        let account = store.create(new_account("alice")).await.unwrap();
        assert_ne!(account.password_hash, "secret");
        assert!(password::verify_password(&account.password_hash, "secret"));
        assert_eq!(account.photo, entities::DEFAULT_AVATAR);
        assert!(!account.graduate);
    }

    #[tokio::test]
    async fn duplicate_username_fails_and_inserts_nothing() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);

        store.create(new_account("alice")).await.unwrap();
        let err = store.create(new_account("alice")).await.unwrap_err();
        assert!(matches!(err, UserError::UsernameTaken(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn username_match_is_case_sensitive() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);

        store.create(new_account("alice")).await.unwrap();
        assert!(store.create(new_account("Alice")).await.is_ok());
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);
        let account = store.create(new_account("alice")).await.unwrap();

        store
            .update_profile(
                &account.id,
                ProfileUpdate {
                    interests: Some("distributed systems".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_eq!(updated.interests.as_deref(), Some("distributed systems"));
        // Untouched fields keep their values.
        assert_eq!(updated.name_en, "Test User");
        assert_eq!(updated.role, Role::Master);
    }

    #[tokio::test]
    async fn change_password_requires_correct_old_password() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);
        let account = store.create(new_account("alice")).await.unwrap();

        let err = store
            .change_password(&account.id, "wrong", "next")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));

        store
            .change_password(&account.id, "secret", "next")
            .await
            .unwrap();
        let updated = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(password::verify_password(&updated.password_hash, "next"));
    }

    #[tokio::test]
    async fn reset_sets_the_fixed_default() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);
        let account = store.create(new_account("alice")).await.unwrap();

        store.reset_password_to_default(&account.id).await.unwrap();
        let updated = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(password::verify_password(
            &updated.password_hash,
            DEFAULT_RESET_PASSWORD
        ));

        let err = store.reset_password_to_default("missing").await.unwrap_err();
        assert!(matches!(err, UserError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);

        let mut prof = new_account("prof");
        prof.role = Role::Faculty;
        store.create(prof).await.unwrap();
        store.create(new_account("student")).await.unwrap();

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let students = store.list(Some(UserCategory::Student)).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].username, "student");

        let supervisors = store.list(Some(UserCategory::Supervisor)).await.unwrap();
        assert_eq!(supervisors.len(), 1);
        assert_eq!(supervisors[0].username, "prof");
    }

    #[tokio::test]
    async fn delete_removes_account_and_owned_records() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);
        let account = store.create(new_account("alice")).await.unwrap();

        sqlx::query(
            "INSERT INTO awards (id, owner_id, name, date) VALUES ('a1', ?, 'Best Demo', '2024')",
        )
        .bind(&account.id)
        .execute(db.pool())
        .await
        .unwrap();

        store.delete(&account.id).await.unwrap();

        let awards: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM awards")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(awards, 0);

        let err = store.delete(&account.id).await.unwrap_err();
        assert!(matches!(err, UserError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn member_directory_splits_faculty_and_students() {
        let (_dir, db) = test_db().await;
        let store = AccountStore::new(&db);

        let mut prof = new_account("prof");
        prof.role = Role::Faculty;
        let prof = store.create(prof).await.unwrap();

        let mut student = new_account("student");
        student.supervisor_id = Some(prof.id.clone());
        store.create(student).await.unwrap();

        let (faculty, students) = store.member_directory().await;
        assert_eq!(faculty.len(), 1);
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].supervisor_name.as_deref(), Some("测试"));
    }
}
