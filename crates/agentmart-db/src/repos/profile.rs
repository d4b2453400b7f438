//! Profile repository

use sqlx::{SqliteConnection, SqlitePool};

use agentmart_types::{Profile, ProfileId, Role, UserId};

use crate::models::convert_all;
use crate::{DbError, DbProfile, DbResult};

/// Profile repository, one row per caller identity
pub struct ProfileRepo {
    pool: SqlitePool,
}

impl ProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new profile, claiming the first-admin slot in the same
    /// transaction. The profile's role is `admin` if the claim succeeded and
    /// `user` otherwise, whatever `profile.role` held.
    ///
    /// Fails with `Duplicate` on `profiles_user_id_key` if the identity
    /// already has a profile; the claim is rolled back with the insert.
    pub async fn create_claiming_bootstrap(&self, mut profile: Profile) -> DbResult<Profile> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE bootstrap SET claimed_by = ?, claimed_at = ? WHERE id = 1 AND claimed_by IS NULL",
        )
        .bind(profile.user_id.0)
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;
        profile.role = if claimed { Role::Admin } else { Role::User };

        insert(&mut tx, &profile)
            .await
            .map_err(|e| DbError::on_unique(e, "profiles", "profiles_user_id_key", profile.user_id))?;

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn find_by_id(&self, id: ProfileId) -> DbResult<Option<Profile>> {
        let row = sqlx::query_as::<_, DbProfile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Profile::try_from).transpose()
    }

    pub async fn find_by_user(&self, user_id: UserId) -> DbResult<Option<Profile>> {
        let row = sqlx::query_as::<_, DbProfile>("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Profile::try_from).transpose()
    }

    pub async fn list_all(&self) -> DbResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, DbProfile>("SELECT * FROM profiles ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    /// Apply `update` to the stored profile inside one write transaction.
    /// The role column is left alone; use [`ProfileRepo::set_role`].
    pub async fn update<F>(&self, id: ProfileId, update: F) -> DbResult<Profile>
    where
        F: FnOnce(&mut Profile),
    {
        let mut tx = self.pool.begin().await?;

        // Take the write lock before reading so the patch cannot interleave
        let touched = sqlx::query("UPDATE profiles SET id = id WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Err(DbError::not_found("profiles", id));
        }

        let row = sqlx::query_as::<_, DbProfile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        let mut profile = Profile::try_from(row)?;
        update(&mut profile);

        let row = sqlx::query_as::<_, DbProfile>(
            r#"
            UPDATE profiles SET name = ?, email = ?, avatar = ?, bio = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.avatar)
        .bind(&profile.bio)
        .bind(id.0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Profile::try_from(row)
    }

    /// Change a profile's role, refusing to remove the last admin.
    ///
    /// The admin count is checked inside the UPDATE itself, so two
    /// concurrent demotions cannot both pass it.
    pub async fn set_role(&self, id: ProfileId, role: Role) -> DbResult<SetRoleOutcome> {
        let updated = sqlx::query_as::<_, DbProfile>(
            r#"
            UPDATE profiles SET role = ?
            WHERE id = ?
              AND (? = 'admin'
                   OR role <> 'admin'
                   OR (SELECT COUNT(*) FROM profiles WHERE role = 'admin') > 1)
            RETURNING *
            "#,
        )
        .bind(role.as_str())
        .bind(id.0)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Ok(SetRoleOutcome::Updated(Profile::try_from(row)?)),
            None => match self.find_by_id(id).await? {
                Some(_) => Ok(SetRoleOutcome::LastAdmin),
                None => Err(DbError::not_found("profiles", id)),
            },
        }
    }
}

async fn insert(conn: &mut SqliteConnection, profile: &Profile) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, user_id, name, email, role, avatar, bio, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(profile.id.0)
    .bind(profile.user_id.0)
    .bind(&profile.name)
    .bind(&profile.email)
    .bind(profile.role.as_str())
    .bind(&profile.avatar)
    .bind(&profile.bio)
    .bind(profile.created_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Result of [`ProfileRepo::set_role`]
#[derive(Debug, Clone, PartialEq)]
pub enum SetRoleOutcome {
    Updated(Profile),
    /// The target is the only admin and the new role is not admin
    LastAdmin,
}
