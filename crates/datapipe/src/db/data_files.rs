//! Bookkeeping for walked directories and loaded files
//!
//! Every query goes through a [`Request`], so the progress update issued by
//! the loader shares the transaction of the batch it accounts for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::debug;
use uuid::{uuid, Uuid};

use datapipe_common::checksum::{path_hash, path_hash_hex};
use datapipe_common::{Code, ErrorContext, Result, ResultExt};

use crate::request::Request;

/// Lifecycle of a directory or a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum FileStatus {
    Pending = 100,
    InProgress = 200,
    Done = 300,
    Ignored = 400,
    Failed = 500,
}

impl FileStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::Pending),
            200 => Some(Self::InProgress),
            300 => Some(Self::Done),
            400 => Some(Self::Ignored),
            500 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Finished entries are never walked or loaded again.
    pub fn is_final(self) -> bool {
        matches!(self, Self::Done | Self::Ignored)
    }
}

const DIRECTORY_COLUMNS: &str =
    "id, created_at, updated_at, meta, partner_id, parent_directory_id, status, path, name, priorities";

const OBJECT_COLUMNS: &str = "id, created_at, updated_at, meta, directory_id, parent_file_id, file_type, hash, \
     status, record_count, file_dir, file_name, file_size, priorities, worker_id";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataFileDirectory {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub meta: Option<Value>,
    pub partner_id: Uuid,
    pub parent_directory_id: Option<Uuid>,
    pub status: i32,
    pub path: String,
    pub name: String,
    pub priorities: Option<Vec<i32>>,
}

impl DataFileDirectory {
    pub fn status(&self) -> Option<FileStatus> {
        FileStatus::from_code(self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataFileObject {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub meta: Option<Value>,
    pub directory_id: Option<Uuid>,
    pub parent_file_id: Option<Uuid>,
    pub file_type: i32,
    pub hash: Vec<u8>,
    pub status: i32,
    pub record_count: i64,
    pub file_dir: String,
    pub file_name: String,
    pub file_size: i64,
    pub priorities: Vec<i32>,
    pub worker_id: Option<Uuid>,
}

impl DataFileObject {
    pub fn status(&self) -> Option<FileStatus> {
        FileStatus::from_code(self.status)
    }

    pub fn path(&self) -> String {
        format!("{}/{}", self.file_dir.trim_end_matches('/'), self.file_name)
    }
}

/// Identity and attributes of a file about to be tracked
#[derive(Debug, Clone)]
pub struct NewDataFileObject<'a> {
    pub file_type: i32,
    pub directory_id: Option<Uuid>,
    pub parent_file_id: Option<Uuid>,
    pub file_dir: &'a str,
    pub file_name: &'a str,
    pub file_size: i64,
    pub priorities: &'a [i32],
}

impl NewDataFileObject<'_> {
    pub fn path(&self) -> String {
        format!("{}/{}", self.file_dir.trim_end_matches('/'), self.file_name)
    }
}

/// Select the directory by partner and path or insert it as pending.
pub async fn ensure_directory(
    request: &Request,
    key: &str,
    partner_id: Uuid,
    parent_directory_id: Option<Uuid>,
    path: &str,
    name: &str,
) -> Result<DataFileDirectory> {
    let sql = format!(
        "SELECT {} FROM data_file_directories WHERE partner_id = $1 AND path = $2",
        DIRECTORY_COLUMNS
    );
    let row = request
        .fetch_optional(key, sqlx::query(&sql).bind(partner_id).bind(path))
        .await
        .forward(uuid!("1f0f89a2-6b78-4dda-a866-900600c8654c"))?;

    if let Some(row) = row {
        return DataFileDirectory::from_row(&row).site(
            uuid!("a05d4f0d-49ca-4a66-9b9a-36c31822b73a"),
            Code::Unknown,
            "Failed to decode directory row.",
        );
    }

    let sql = format!(
        "INSERT INTO data_file_directories (id, partner_id, parent_directory_id, status, path, name) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
        DIRECTORY_COLUMNS
    );
    let row = request
        .fetch_one(
            key,
            sqlx::query(&sql)
                .bind(Uuid::now_v7())
                .bind(partner_id)
                .bind(parent_directory_id)
                .bind(FileStatus::Pending.code())
                .bind(path)
                .bind(name),
        )
        .await
        .forward(uuid!("9f16dbe1-5a3f-459b-9589-33043ff76656"))?;

    DataFileDirectory::from_row(&row).site(
        uuid!("97796ed0-30f6-44ab-a8ec-9485b4b15d09"),
        Code::Unknown,
        "Failed to decode directory row.",
    )
}

pub async fn update_directory_status(request: &Request, key: &str, id: Uuid, status: FileStatus) -> Result<()> {
    request
        .execute(
            key,
            sqlx::query("UPDATE data_file_directories SET status = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(status.code()),
        )
        .await
        .forward(uuid!("119530a1-fb3e-4333-879a-aa6ad11e2169"))?;
    Ok(())
}

/// Select the file by path hash, type, directory and parent archive, or
/// insert it as pending.
pub async fn ensure_object(request: &Request, key: &str, new: &NewDataFileObject<'_>) -> Result<DataFileObject> {
    let hash = path_hash(&new.path());

    let sql = format!(
        "SELECT {} FROM data_file_objects \
         WHERE hash = $1 AND file_type = $2 \
           AND directory_id IS NOT DISTINCT FROM $3 \
           AND parent_file_id IS NOT DISTINCT FROM $4",
        OBJECT_COLUMNS
    );
    let row = request
        .fetch_optional(
            key,
            sqlx::query(&sql)
                .bind(&hash)
                .bind(new.file_type)
                .bind(new.directory_id)
                .bind(new.parent_file_id),
        )
        .await
        .forward(uuid!("c0494b34-4266-466f-8678-37a55a064b3c"))?;

    if let Some(row) = row {
        return DataFileObject::from_row(&row).site(
            uuid!("437bb8dd-e51d-49f6-bb6d-a1c07fe6eedd"),
            Code::Unknown,
            "Failed to decode file row.",
        );
    }

    debug!(path = %new.path(), hash = %path_hash_hex(&new.path()), "Tracking new data file");
    let sql = format!(
        "INSERT INTO data_file_objects \
         (id, directory_id, parent_file_id, file_type, hash, status, record_count, file_dir, file_name, file_size, priorities) \
         VALUES ($1, $2, $3, $4, $5, $6, 0, $7, $8, $9, $10) RETURNING {}",
        OBJECT_COLUMNS
    );
    let row = request
        .fetch_one(
            key,
            sqlx::query(&sql)
                .bind(Uuid::now_v7())
                .bind(new.directory_id)
                .bind(new.parent_file_id)
                .bind(new.file_type)
                .bind(&hash)
                .bind(FileStatus::Pending.code())
                .bind(new.file_dir)
                .bind(new.file_name)
                .bind(new.file_size)
                .bind(new.priorities),
        )
        .await
        .forward(uuid!("8bc55a8f-b1fe-444d-9369-fd5902de55de"))?;

    DataFileObject::from_row(&row).site(
        uuid!("36c9f717-97b5-4e5c-9511-70d1daffe8b3"),
        Code::Unknown,
        "Failed to decode file row.",
    )
}

pub async fn update_object_priorities(request: &Request, key: &str, id: Uuid, priorities: &[i32]) -> Result<()> {
    request
        .execute(
            key,
            sqlx::query("UPDATE data_file_objects SET priorities = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(priorities),
        )
        .await
        .forward(uuid!("d886f36b-f70d-4cb7-941f-a405257a540e"))?;
    Ok(())
}

/// Set the status and merge `meta` into the stored metadata.
pub async fn update_object_status(
    request: &Request,
    key: &str,
    id: Uuid,
    status: FileStatus,
    meta: Option<Value>,
) -> Result<()> {
    request
        .execute(
            key,
            sqlx::query(
                "UPDATE data_file_objects \
                 SET status = $2, meta = COALESCE(meta, '{}'::jsonb) || COALESCE($3, '{}'::jsonb), updated_at = now() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(status.code())
            .bind(meta),
        )
        .await
        .forward(uuid!("3ae2e448-1f9b-4a35-af0c-d6657ac09011"))?;
    Ok(())
}

/// Account for a committed batch. Returns the new record count.
pub async fn increment_progress(request: &Request, key: &str, id: Uuid, records: i64) -> Result<i64> {
    let row = request
        .fetch_one(
            key,
            sqlx::query(
                "UPDATE data_file_objects \
                 SET record_count = record_count + $2, status = $3, updated_at = now() \
                 WHERE id = $1 RETURNING record_count",
            )
            .bind(id)
            .bind(records)
            .bind(FileStatus::InProgress.code()),
        )
        .await
        .forward(uuid!("86d56118-c018-463f-ba10-f929bceb5fac"))?;

    sqlx::Row::try_get::<i64, _>(&row, "record_count").site(
        uuid!("3ef7a729-9e95-45f5-9bae-57d2c1a5c1d8"),
        Code::Unknown,
        "Failed to decode record count.",
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(FileStatus::Pending.code(), 100);
        assert_eq!(FileStatus::Failed.code(), 500);
        assert_eq!(FileStatus::from_code(300), Some(FileStatus::Done));
        assert_eq!(FileStatus::from_code(42), None);
        assert!(FileStatus::Ignored.is_final());
        assert!(!FileStatus::InProgress.is_final());
    }

    #[test]
    fn test_new_object_path() {
        let new = NewDataFileObject {
            file_type: 1,
            directory_id: None,
            parent_file_id: None,
            file_dir: "/ftp/",
            file_name: "a.zip",
            file_size: 0,
            priorities: &[],
        };
        assert_eq!(new.path(), "/ftp/a.zip");
    }
}
