use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// A schema change owned by one slice of the platform.
#[derive(Debug)]
pub(crate) struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub script: &'static str,
}

impl Migration {
    /// Fingerprint of the script, stored with the applied migration.
    pub(crate) fn checksum(&self) -> String {
        format!("{:016x}", fxhash::hash64(self.script))
    }

    fn id(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }

    fn to_applied(&self) -> AppliedMigration {
        AppliedMigration {
            slice: self.slice.to_owned(),
            version: self.version.to_owned(),
            checksum: self.checksum(),
        }
    }
}

/// Built-in migrations in application order.
///
/// The registration index is not unique: registering checks for an existing record
/// before inserting, and two concurrent registrations may both pass that check.
pub(crate) const MIGRATIONS: &[Migration] = &[
    Migration {
        slice: "courses",
        version: "0001",
        description: "Course registrations and student groups",
        script: "
            DEFINE TABLE IF NOT EXISTS registration SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS registration_course_user ON registration FIELDS courseid, username;
            DEFINE TABLE IF NOT EXISTS groups SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS groups_course ON groups FIELDS course_id;
            DEFINE INDEX IF NOT EXISTS groups_users ON groups FIELDS users;
        ",
    },
    Migration {
        slice: "users",
        version: "0001",
        description: "User profiles and cached course statistics",
        script: "
            DEFINE TABLE IF NOT EXISTS user_profile SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS user_profile_username ON user_profile FIELDS username UNIQUE;
            DEFINE TABLE IF NOT EXISTS user_course SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS user_course_user ON user_course FIELDS username, courseid UNIQUE;
        ",
    },
];

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, SurrealValue)]
pub(crate) struct AppliedMigration {
    pub slice: String,
    pub version: String,
    pub checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
    migrations: &'a [Migration],
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db, migrations: MIGRATIONS }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query("DEFINE TABLE IF NOT EXISTS migration SCHEMALESS;")
            .await
            .context("Preparing migration table")?
            .check()
            .map_err(surrealdb::Error::from)?;

        let applied = self.applied_migrations().await?;
        let mut report = MigrationReport::default();

        for migration in self.migrations {
            if let Some(existing) = applied.get(&migration.id()) {
                ensure_checksum_match(migration, &existing.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{
                slice: $slice,
                version: $version,
                description: $description,
                checksum: $checksum,
                applied_at: time::now()
            }};
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("description", migration.description))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!("Applying migration {}", migration.id()))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Migration {} failed", migration.id()))?;

        Ok(())
    }

    async fn applied_migrations(
        &self,
    ) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    let expected = migration.checksum();
    if existing != expected {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (stored {existing}, built-in {expected})",
                migration.id()
            )
            .into(),
            context: Some("Migration already applied with a different script".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_unique() {
        let mut ids: Vec<String> = MIGRATIONS.iter().map(Migration::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MIGRATIONS.len());
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let migration = &MIGRATIONS[0];
        assert!(ensure_checksum_match(migration, &migration.checksum()).is_ok());

        let err = ensure_checksum_match(migration, "0000000000000000").unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }
}
