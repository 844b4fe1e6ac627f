//! EditApprovalQueue - staged changes against already published entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;

use crate::common::{EditId, GameVersionId, ModId, ModVersionId, StoreError, StoreResult, UserId};
use crate::domains::mods::models::{Mod, ModVersion};

pub const MODS_TABLE: &str = "mods";
pub const MOD_VERSIONS_TABLE: &str = "modVersions";

/// Field-level changes proposed for a mod. Absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    /// Raw category; only applied when it names a known category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<UserId>>,
}

impl ModChanges {
    pub fn is_empty(&self) -> bool {
        self == &ModChanges::default()
    }
}

/// Field-level changes proposed for a mod version.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModVersionChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_version: Option<String>,
    /// Raw platform; only applied when it names a known platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Replaces the supported game version list wholesale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_versions: Option<Vec<GameVersionId>>,
    /// Mods this release depends on; each must exist
    #[serde(
        default,
        rename = "dependancies",
        alias = "dependencies",
        skip_serializing_if = "Option::is_none"
    )]
    pub dependencies: Option<Vec<ModId>>,
}

impl ModVersionChanges {
    pub fn is_empty(&self) -> bool {
        self == &ModVersionChanges::default()
    }
}

/// What a queued edit targets. The tag decides the payload shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "objTableName")]
pub enum EditSubject {
    #[serde(rename = "mods")]
    Mod {
        #[serde(rename = "objId")]
        obj_id: ModId,
        obj: ModChanges,
    },
    #[serde(rename = "modVersions")]
    ModVersion {
        #[serde(rename = "objId")]
        obj_id: ModVersionId,
        obj: ModVersionChanges,
    },
}

impl EditSubject {
    pub fn table_name(&self) -> &'static str {
        match self {
            EditSubject::Mod { .. } => MODS_TABLE,
            EditSubject::ModVersion { .. } => MOD_VERSIONS_TABLE,
        }
    }

    pub fn target_id(&self) -> i64 {
        match self {
            EditSubject::Mod { obj_id, .. } => obj_id.get(),
            EditSubject::ModVersion { obj_id, .. } => obj_id.get(),
        }
    }

    pub fn payload_json(&self) -> serde_json::Value {
        let encoded = match self {
            EditSubject::Mod { obj, .. } => serde_json::to_value(obj),
            EditSubject::ModVersion { obj, .. } => serde_json::to_value(obj),
        };
        // Both payload types are plain structs of strings and integers.
        encoded.unwrap_or(serde_json::Value::Null)
    }

    /// Rebuild a subject from its persisted parts.
    ///
    /// A `mods` payload must carry `name` and a `modVersions` payload must
    /// carry `modVersion`; anything else is an integrity failure.
    pub fn decode(table: &str, obj_id: i64, obj: serde_json::Value) -> StoreResult<Self> {
        let required = match table {
            MODS_TABLE => "name",
            MOD_VERSIONS_TABLE => "modVersion",
            other => {
                return Err(StoreError::Integrity(format!(
                    "Unknown edit target table {}",
                    other
                )))
            }
        };

        if obj.get(required).is_none() {
            return Err(StoreError::Integrity(format!(
                "Edit payload for table {} is missing {}",
                table, required
            )));
        }

        let invalid = |e: serde_json::Error| {
            StoreError::Integrity(format!("Edit payload for table {} is malformed: {}", table, e))
        };

        match table {
            MODS_TABLE => Ok(EditSubject::Mod {
                obj_id: ModId::new(obj_id),
                obj: serde_json::from_value(obj).map_err(invalid)?,
            }),
            _ => Ok(EditSubject::ModVersion {
                obj_id: ModVersionId::new(obj_id),
                obj: serde_json::from_value(obj).map_err(invalid)?,
            }),
        }
    }
}

/// A pending (or approved) edit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditApproval {
    pub id: EditId,
    #[serde(flatten)]
    pub subject: EditSubject,
    pub submitter_id: UserId,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for queueing an edit
#[derive(Debug, Clone)]
pub struct NewEditApproval {
    pub subject: EditSubject,
    pub submitter_id: UserId,
}

/// Target of an accepted edit with the edit's changes already applied
#[derive(Debug, Clone, PartialEq)]
pub enum MergedTarget {
    Mod(Mod),
    ModVersion(ModVersion),
}

/// Persisted shape of a queue row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EditApprovalRow {
    pub id: EditId,
    pub obj_table_name: String,
    pub obj_id: i64,
    pub obj: serde_json::Value,
    pub submitter_id: UserId,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EditApprovalRow> for EditApproval {
    type Error = StoreError;

    fn try_from(row: EditApprovalRow) -> Result<Self, Self::Error> {
        let subject = EditSubject::decode(&row.obj_table_name, row.obj_id, row.obj)
            .map_err(|e| StoreError::Integrity(format!("Edit {}: {}", row.id, e)))?;

        Ok(EditApproval {
            id: row.id,
            subject,
            submitter_id: row.submitter_id,
            approved: row.approved,
            created_at: row.created_at,
        })
    }
}

/// Decode queue rows for listing. A row that fails its integrity check is
/// logged and left out so the rest of the queue stays reviewable.
pub fn decode_listable(rows: Vec<EditApprovalRow>) -> Vec<EditApproval> {
    rows.into_iter()
        .filter_map(|row| {
            let edit_id = row.id;
            match EditApproval::try_from(row) {
                Ok(edit) => Some(edit),
                Err(e) => {
                    warn!(edit_id = %edit_id, error = %e, "Skipping undecodable edit row");
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// SQL Queries
// =============================================================================

impl EditApproval {
    /// Find an edit that has not been approved yet
    pub async fn find_pending(id: EditId, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, EditApprovalRow>(
            "SELECT * FROM edit_approval_queue WHERE id = $1 AND approved = false",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(EditApproval::try_from)
        .transpose()
    }

    pub async fn find_all_pending(pool: &PgPool) -> StoreResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, EditApprovalRow>(
            "SELECT * FROM edit_approval_queue WHERE approved = false ORDER BY created_at ASC",
        )
        .fetch_all(pool)
        .await?;

        Ok(decode_listable(rows))
    }

    pub async fn create(input: NewEditApproval, pool: &PgPool) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, EditApprovalRow>(
            r#"
            INSERT INTO edit_approval_queue (obj_table_name, obj_id, obj, submitter_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(input.subject.table_name())
        .bind(input.subject.target_id())
        .bind(input.subject.payload_json())
        .bind(input.submitter_id)
        .fetch_one(pool)
        .await?;

        EditApproval::try_from(row)
    }

    /// Persist the payload and approved flag of `edit`
    pub async fn update(edit: &EditApproval, pool: &PgPool) -> StoreResult<Self> {
        let row = sqlx::query_as::<_, EditApprovalRow>(
            r#"
            UPDATE edit_approval_queue
            SET obj = $2, approved = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(edit.id)
        .bind(edit.subject.payload_json())
        .bind(edit.approved)
        .fetch_one(pool)
        .await?;

        EditApproval::try_from(row)
    }

    /// Write the merged target and mark `edit` approved in one transaction.
    ///
    /// Fails without writing anything when the edit has already been
    /// resolved.
    pub async fn apply(
        target: &MergedTarget,
        edit: &EditApproval,
        pool: &PgPool,
    ) -> StoreResult<Self> {
        let mut tx = pool.begin().await?;

        match target {
            MergedTarget::Mod(m) => {
                Mod::update(m, &mut *tx).await?;
            }
            MergedTarget::ModVersion(v) => {
                ModVersion::update(v, &mut *tx).await?;
            }
        }

        let row = sqlx::query_as::<_, EditApprovalRow>(
            r#"
            UPDATE edit_approval_queue
            SET obj = $2, approved = true
            WHERE id = $1 AND approved = false
            RETURNING *
            "#,
        )
        .bind(edit.id)
        .bind(edit.subject.payload_json())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            StoreError::ConstraintViolation(format!("Edit {} is no longer pending", edit.id))
        })?;

        tx.commit().await?;

        EditApproval::try_from(row)
    }

    pub async fn delete(id: EditId, pool: &PgPool) -> StoreResult<()> {
        sqlx::query("DELETE FROM edit_approval_queue WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_mod_payload() {
        let subject = EditSubject::decode(
            MODS_TABLE,
            4,
            json!({ "name": "Chroma", "gitUrl": "https://github.com/Aeroluna/Heck" }),
        )
        .unwrap();

        match subject {
            EditSubject::Mod { obj_id, obj } => {
                assert_eq!(obj_id, ModId::new(4));
                assert_eq!(obj.name.as_deref(), Some("Chroma"));
                assert_eq!(obj.git_url.as_deref(), Some("https://github.com/Aeroluna/Heck"));
            }
            other => panic!("expected mod subject, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_payload_of_wrong_shape() {
        let result = EditSubject::decode(MODS_TABLE, 4, json!({ "modVersion": "1.0.0" }));
        assert!(matches!(result, Err(StoreError::Integrity(_))));

        let result = EditSubject::decode(MOD_VERSIONS_TABLE, 4, json!({ "name": "Chroma" }));
        assert!(matches!(result, Err(StoreError::Integrity(_))));
    }

    #[test]
    fn test_decode_rejects_unknown_table() {
        let result = EditSubject::decode("users", 1, json!({ "name": "x" }));
        assert!(matches!(result, Err(StoreError::Integrity(_))));
    }

    #[test]
    fn test_version_payload_accepts_legacy_dependency_spelling() {
        let subject = EditSubject::decode(
            MOD_VERSIONS_TABLE,
            9,
            json!({ "modVersion": "1.2.0", "dependancies": [1, 2] }),
        )
        .unwrap();

        let EditSubject::ModVersion { obj, .. } = subject else {
            panic!("expected mod version subject");
        };
        assert_eq!(obj.dependencies, Some(vec![ModId::new(1), ModId::new(2)]));
        assert_eq!(subject_payload_keys(&obj), vec!["dependancies", "modVersion"]);
    }

    fn subject_payload_keys(obj: &ModVersionChanges) -> Vec<String> {
        let value = serde_json::to_value(obj).unwrap();
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_serialized_edit_is_tagged() {
        let edit = EditApproval {
            id: EditId::new(1),
            subject: EditSubject::Mod {
                obj_id: ModId::new(2),
                obj: ModChanges {
                    name: Some("Heck".into()),
                    ..Default::default()
                },
            },
            submitter_id: UserId::new(3),
            approved: false,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&edit).unwrap();
        assert_eq!(value["objTableName"], "mods");
        assert_eq!(value["objId"], 2);
        assert_eq!(value["obj"]["name"], "Heck");
        assert_eq!(value["submitterId"], 3);
    }

    #[test]
    fn test_serialized_version_edit_uses_camel_case_target_id() {
        let subject = EditSubject::ModVersion {
            obj_id: ModVersionId::new(7),
            obj: ModVersionChanges {
                mod_version: Some("1.0.0".into()),
                ..Default::default()
            },
        };

        let value = serde_json::to_value(&subject).unwrap();
        assert_eq!(value["objTableName"], "modVersions");
        assert_eq!(value["objId"], 7);
        assert!(value.get("obj_id").is_none());
    }

    fn row(id: i64, table: &str, obj: serde_json::Value) -> EditApprovalRow {
        EditApprovalRow {
            id: EditId::new(id),
            obj_table_name: table.to_string(),
            obj_id: 1,
            obj,
            submitter_id: UserId::new(1),
            approved: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_listing_skips_rows_failing_integrity() {
        let rows = vec![
            row(1, MODS_TABLE, json!({ "name": "SongCore" })),
            row(2, MOD_VERSIONS_TABLE, json!({ "platform": "steampc" })),
            row(3, "users", json!({ "name": "x" })),
            row(4, MOD_VERSIONS_TABLE, json!({ "modVersion": "2.0.0" })),
        ];

        let ids: Vec<EditId> = decode_listable(rows).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EditId::new(1), EditId::new(4)]);
    }
}
