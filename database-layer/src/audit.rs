// Audit trail columns shared by every table
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Creation, modification and soft-delete bookkeeping
///
/// Embedded (flattened) into every entity so the columns live on the
/// entity's own table. `actor` is the acting user; `None` marks a system
/// action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<Uuid>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl AuditInfo {
    pub fn new(actor: Option<Uuid>) -> Self {
        let mut audit = Self::empty(Utc::now());
        audit.stamp_created(actor, audit.created_at);
        audit
    }

    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            created_by: None,
            updated_at: now,
            updated_by: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn stamp_created(&mut self, actor: Option<Uuid>, now: DateTime<Utc>) {
        self.created_at = now;
        self.created_by = actor;
        self.updated_at = now;
        self.updated_by = actor;
        self.is_deleted = false;
        self.deleted_at = None;
        self.deleted_by = None;
    }

    pub fn stamp_updated(&mut self, actor: Option<Uuid>, now: DateTime<Utc>) {
        self.updated_at = now;
        self.updated_by = actor;
    }

    pub fn mark_deleted(&mut self, actor: Option<Uuid>, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = actor;
        self.stamp_updated(actor, now);
    }

    pub fn restore(&mut self, actor: Option<Uuid>, now: DateTime<Utc>) {
        self.is_deleted = false;
        self.deleted_at = None;
        self.deleted_by = None;
        self.stamp_updated(actor, now);
    }

    pub fn is_live(&self) -> bool {
        !self.is_deleted
    }
}

impl Default for AuditInfo {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_update_keeps_creation_stamp() {
        let creator = Some(Uuid::new_v4());
        let editor = Some(Uuid::new_v4());
        let mut audit = AuditInfo::new(creator);
        let created_at = audit.created_at;

        let later = created_at + Duration::minutes(5);
        audit.stamp_updated(editor, later);

        assert_eq!(audit.created_at, created_at);
        assert_eq!(audit.created_by, creator);
        assert_eq!(audit.updated_at, later);
        assert_eq!(audit.updated_by, editor);
    }

    #[test]
    fn test_delete_and_restore() {
        let actor = Some(Uuid::new_v4());
        let mut audit = AuditInfo::new(None);
        let now = Utc::now();

        audit.mark_deleted(actor, now);
        assert!(audit.is_deleted);
        assert_eq!(audit.deleted_at, Some(now));
        assert_eq!(audit.deleted_by, actor);
        assert_eq!(audit.updated_by, actor);

        audit.restore(None, now + Duration::seconds(1));
        assert!(audit.is_live());
        assert_eq!(audit.deleted_at, None);
        assert_eq!(audit.deleted_by, None);
        assert_eq!(audit.updated_by, None);
    }

    #[test]
    fn test_stamp_created_clears_delete_fields() {
        let mut audit = AuditInfo::new(None);
        audit.mark_deleted(None, Utc::now());
        audit.stamp_created(None, Utc::now());
        assert!(!audit.is_deleted);
        assert!(audit.deleted_at.is_none());
    }
}
