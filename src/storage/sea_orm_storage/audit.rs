//! 审计日志存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::audit_logs::{ActiveModel, Column, Entity as AuditLogs, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse,
    audit::{AuditListParams, AuditLog, NewAuditLog},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

impl SeaOrmStorage {
    pub async fn create_audit_log_impl(&self, log: NewAuditLog) -> Result<AuditLog> {
        let model = ActiveModel {
            user_id: Set(log.user_id),
            action: Set(log.action),
            entity_type: Set(log.entity_type),
            entity_id: Set(log.entity_id),
            details: Set(log.details),
            ip_address: Set(log.ip_address),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("写入审计日志失败"))?;

        Ok(result.into_audit_log())
    }

    pub async fn list_audit_logs_impl(
        &self,
        query: AuditListParams,
    ) -> Result<PaginatedResponse<AuditLog>> {
        let mut select = AuditLogs::find();

        if let Some(user_id) = query.user_id {
            select = select.filter(Column::UserId.eq(user_id));
        }
        if let Some(ref action) = query.action {
            select = select.filter(Column::Action.eq(action.as_str()));
        }
        if let Some(ref entity_type) = query.entity_type {
            select = select.filter(Column::EntityType.eq(entity_type.as_str()));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        self.fetch_page(select, query.pagination, "查询审计日志失败", Model::into_audit_log)
            .await
    }

    pub async fn list_recent_audit_logs_impl(&self, limit: u64) -> Result<Vec<AuditLog>> {
        let result = AuditLogs::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(db_err("查询审计日志失败"))?;

        Ok(result.into_iter().map(Model::into_audit_log).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::memory_storage;
    use super::*;
    use crate::models::audit::actions;

    #[tokio::test]
    async fn test_audit_filter_by_action() {
        let storage = memory_storage().await;

        for (action, entity_id) in [(actions::USER_CREATE, 1), (actions::USER_DELETE, 2)] {
            storage
                .create_audit_log_impl(NewAuditLog {
                    user_id: None,
                    action: action.to_string(),
                    entity_type: "user".to_string(),
                    entity_id: Some(entity_id),
                    details: None,
                    ip_address: Some("127.0.0.1".to_string()),
                })
                .await
                .unwrap();
        }

        let page = storage
            .list_audit_logs_impl(AuditListParams {
                action: Some(actions::USER_DELETE.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].entity_id, Some(2));

        let recent = storage.list_recent_audit_logs_impl(1).await.unwrap();
        assert_eq!(recent.len(), 1);
    }
}
