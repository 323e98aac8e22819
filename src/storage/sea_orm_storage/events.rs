//! 日程存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::events::{ActiveModel, Column, Entity as Events, Model};
use crate::errors::Result;
use crate::models::events::{Event, EventQuery, NewEvent, UpdateEventRequest};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_event_impl(&self, event: NewEvent) -> Result<Event> {
        let model = ActiveModel {
            class_id: Set(event.class_id),
            created_by: Set(event.created_by),
            title: Set(event.title),
            description: Set(event.description),
            location: Set(event.location),
            starts_at: Set(event.starts_at.timestamp()),
            ends_at: Set(event.ends_at.timestamp()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建日程失败"))?;

        Ok(result.into_event())
    }

    pub async fn get_event_by_id_impl(&self, id: i64) -> Result<Option<Event>> {
        let result = Events::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询日程失败"))?;

        Ok(result.map(Model::into_event))
    }

    /// 查询与时间区间有交集的日程
    ///
    /// `class_ids` 为 `Some` 时只返回全校日程和这些班级的日程。
    pub async fn list_events_impl(&self, query: EventQuery) -> Result<Vec<Event>> {
        let mut select = Events::find();

        if let Some(from) = query.from {
            select = select.filter(Column::EndsAt.gte(from.timestamp()));
        }
        if let Some(to) = query.to {
            select = select.filter(Column::StartsAt.lte(to.timestamp()));
        }
        if let Some(class_ids) = query.class_ids {
            select = select.filter(
                Condition::any()
                    .add(Column::ClassId.is_null())
                    .add(Column::ClassId.is_in(class_ids)),
            );
        }

        let result = select
            .order_by_asc(Column::StartsAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询日程失败"))?;

        Ok(result.into_iter().map(Model::into_event).collect())
    }

    pub async fn update_event_impl(
        &self,
        id: i64,
        update: UpdateEventRequest,
    ) -> Result<Option<Event>> {
        let Some(existing) = Events::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询日程失败"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(location) = update.location {
            model.location = Set(Some(location));
        }
        if let Some(starts_at) = update.starts_at {
            model.starts_at = Set(starts_at.timestamp());
        }
        if let Some(ends_at) = update.ends_at {
            model.ends_at = Set(ends_at.timestamp());
        }

        let updated = model.update(&self.db).await.map_err(db_err("更新日程失败"))?;

        Ok(Some(updated.into_event()))
    }

    pub async fn delete_event_impl(&self, id: i64) -> Result<bool> {
        let result = Events::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除日程失败"))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::models::users::entities::UserRole;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_list_events_by_overlap() {
        let storage = memory_storage().await;
        let admin = seed_user(&storage, "admin01", UserRole::Admin).await;
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        for (title, offset) in [("Assembly", 0), ("Sports day", 5)] {
            storage
                .create_event_impl(NewEvent {
                    class_id: None,
                    created_by: admin.id,
                    title: title.to_string(),
                    description: None,
                    location: None,
                    starts_at: base + Duration::days(offset),
                    ends_at: base + Duration::days(offset) + Duration::hours(2),
                })
                .await
                .unwrap();
        }

        let events = storage
            .list_events_impl(EventQuery {
                from: Some(base - Duration::days(1)),
                to: Some(base + Duration::days(1)),
                class_ids: None,
            })
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Assembly");
    }
}
