//! Group management. Groups are referenced from accounts (membership set)
//! and from activity posts; deleting a group must drop the membership rows
//! with it, in the same transaction, so no account is left pointing at a
//! group that no longer exists.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use database::Database;
use entities::{Group, GroupCategory};

use crate::error::{ContentError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub category: GroupCategory,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub category: Option<GroupCategory>,
    pub parent_id: Option<String>,
}

/// List row with the parent group's name expanded.
#[derive(Debug, Serialize, FromRow)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub category: GroupCategory,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
}

pub struct GroupStore<'a> {
    db: &'a Database,
}

impl<'a> GroupStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a group. The name must be unused.
    pub async fn create(&self, new: NewGroup) -> Result<Group> {
        let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups WHERE name = ?")
            .bind(&new.name)
            .fetch_one(self.db.pool())
            .await?;
        if taken > 0 {
            return Err(ContentError::NameTaken("group"));
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO groups (id, name, category, parent_id) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&new.name)
            .bind(new.category)
            .bind(&new.parent_id)
            .execute(self.db.pool())
            .await
            .map_err(|e| {
                if e.as_database_error()
                    .map(|d| d.is_unique_violation())
                    .unwrap_or(false)
                {
                    ContentError::NameTaken("group")
                } else {
                    e.into()
                }
            })?;

        info!("Created group {} ({})", new.name, id);
        self.find(&id).await
    }

    pub async fn update(&self, id: &str, update: GroupUpdate) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups SET
                name = COALESCE(?, name),
                category = COALESCE(?, category),
                parent_id = COALESCE(?, parent_id)
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(update.category)
        .bind(&update.parent_id)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map(|d| d.is_unique_violation())
                .unwrap_or(false)
            {
                ContentError::NameTaken("group")
            } else {
                ContentError::from(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound("group"));
        }
        Ok(())
    }

    pub async fn find(&self, id: &str) -> Result<Group> {
        sqlx::query_as("SELECT * FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or(ContentError::NotFound("group"))
    }

    /// All groups with parent names expanded.
    pub async fn list(&self) -> Result<Vec<GroupView>> {
        Ok(sqlx::query_as(
            r#"
            SELECT g.id, g.name, g.category, g.parent_id, p.name AS parent_name
            FROM groups g
            LEFT JOIN groups p ON p.id = g.parent_id
            ORDER BY g.name
            "#,
        )
        .fetch_all(self.db.pool())
        .await?)
    }

    /// The groups one account belongs to. Fails with NotFound when the
    /// account itself is absent, as opposed to an empty membership set.
    pub async fn groups_of_user(&self, user_id: &str) -> Result<Vec<Group>> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        if exists == 0 {
            return Err(ContentError::NotFound("user"));
        }

        Ok(sqlx::query_as(
            r#"
            SELECT g.*
            FROM groups g
            JOIN user_groups ug ON ug.group_id = g.id
            WHERE ug.user_id = ?
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?)
    }

    /// Delete a group and every membership reference to it in one
    /// transaction: the record and its references go together or not at all.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM user_groups WHERE group_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE groups SET parent_id = NULL WHERE parent_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound("group"));
        }

        tx.commit().await?;
        info!("Deleted group {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use user::{AccountStore, NewAccount};

    async fn test_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("groups.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (dir, db)
    }

    fn group(name: &str) -> NewGroup {
        NewGroup {
            name: name.to_string(),
            category: GroupCategory::Student,
            parent_id: None,
        }
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let (_dir, db) = test_db().await;
        let store = GroupStore::new(&db);

        store.create(group("系统组")).await.unwrap();
        assert!(matches!(
            store.create(group("系统组")).await,
            Err(ContentError::NameTaken(_))
        ));
    }

    #[tokio::test]
    async fn list_expands_parent_name() {
        let (_dir, db) = test_db().await;
        let store = GroupStore::new(&db);

        let parent = store.create(group("编译组")).await.unwrap();
        let mut child = group("LLVM 讨论班");
        child.parent_id = Some(parent.id.clone());
        store.create(child).await.unwrap();

        let listed = store.list().await.unwrap();
        let child_row = listed.iter().find(|g| g.name == "LLVM 讨论班").unwrap();
        assert_eq!(child_row.parent_name.as_deref(), Some("编译组"));
    }

    #[tokio::test]
    async fn delete_removes_memberships_with_the_group() {
        let (_dir, db) = test_db().await;
        let groups = GroupStore::new(&db);
        let accounts = AccountStore::new(&db);

        let g1 = groups.create(group("G1")).await.unwrap();
        let u = accounts
            .create(NewAccount {
                username: "u".to_string(),
                password: "pw".to_string(),
                name: "成员".to_string(),
                name_en: "Member".to_string(),
                admin: false,
                role: Default::default(),
                supervisor_id: None,
                interests: None,
                introduction: None,
                email: None,
                homepage: None,
            })
            .await
            .unwrap();

        sqlx::query("INSERT INTO user_groups (user_id, group_id) VALUES (?, ?)")
            .bind(&u.id)
            .bind(&g1.id)
            .execute(db.pool())
            .await
            .unwrap();

        groups.delete(&g1.id).await.unwrap();

        let remaining = groups.groups_of_user(&u.id).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn groups_of_missing_user_is_not_found() {
        let (_dir, db) = test_db().await;
        let store = GroupStore::new(&db);
        assert!(matches!(
            store.groups_of_user("missing").await,
            Err(ContentError::NotFound("user"))
        ));
    }
}
