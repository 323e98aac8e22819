use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::EventService;
use crate::models::ErrorCode;
use crate::models::events::{
    CreateEventRequest, Event, EventListParams, EventQuery, NewEvent, UpdateEventRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::services::access::{class_context, current_user, manager_context, visible_class_ids};
use crate::services::responses::{
    ServiceResult, bad_request, created, forbidden, internal, not_found, ok, ok_message,
};
use crate::storage::Storage;
use crate::utils::validate::validate_text;

fn validate_range(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<(), HttpResponse> {
    if ends_at < starts_at {
        return Err(bad_request(
            ErrorCode::EventInvalid,
            "Event end time cannot be before its start time",
        ));
    }
    Ok(())
}

fn validate_fields(
    title: Option<&str>,
    description: Option<&str>,
    location: Option<&str>,
) -> Result<(), HttpResponse> {
    let checks = [
        title.map(|t| validate_text("Title", t, 1, 200)),
        description.map(|d| validate_text("Description", d, 0, 2000)),
        location.map(|l| validate_text("Location", l, 0, 200)),
    ];
    for check in checks.into_iter().flatten() {
        check.map_err(|e| bad_request(ErrorCode::EventInvalid, e))?;
    }
    Ok(())
}

/// 创建者或管理员才能修改日程
async fn owned_event(
    storage: &Arc<dyn Storage>,
    user: &User,
    event_id: i64,
) -> Result<Event, HttpResponse> {
    let event = storage
        .get_event_by_id(event_id)
        .await
        .map_err(internal("Failed to load event"))?
        .ok_or_else(|| not_found(ErrorCode::EventNotFound, "Event not found"))?;

    if event.created_by != user.id && user.role != UserRole::Admin {
        return Err(forbidden(
            ErrorCode::Forbidden,
            "Only the creator or an admin can change this event",
        ));
    }
    Ok(event)
}

pub async fn list_events(
    service: &EventService,
    request: &HttpRequest,
    query: EventListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    if let (Some(from), Some(to)) = (query.from, query.to)
        && to < from
    {
        return Err(bad_request(
            ErrorCode::BadRequest,
            "'to' cannot be before 'from'",
        ));
    }

    let class_ids = match query.class_id {
        Some(class_id) => {
            class_context(&storage, &user, class_id).await?;
            Some(vec![class_id])
        }
        None => visible_class_ids(&storage, &user).await?,
    };

    let mut events = storage
        .list_events(EventQuery {
            from: query.from,
            to: query.to,
            class_ids,
        })
        .await
        .map_err(internal("Failed to list events"))?;

    // 按班级筛选时不返回全校日程
    if let Some(class_id) = query.class_id {
        events.retain(|e| e.class_id == Some(class_id));
    }

    ok(events, "Events retrieved successfully")
}

pub async fn create_event(
    service: &EventService,
    request: &HttpRequest,
    event_data: CreateEventRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    validate_fields(
        Some(&event_data.title),
        event_data.description.as_deref(),
        event_data.location.as_deref(),
    )?;
    validate_range(event_data.starts_at, event_data.ends_at)?;

    match event_data.class_id {
        Some(class_id) => {
            manager_context(&storage, &user, class_id).await?;
        }
        None if user.role != UserRole::Admin => {
            return Err(forbidden(
                ErrorCode::Forbidden,
                "Only admins can create school-wide events",
            ));
        }
        None => {}
    }

    let event = storage
        .create_event(NewEvent {
            class_id: event_data.class_id,
            created_by: user.id,
            title: event_data.title.trim().to_string(),
            description: event_data.description,
            location: event_data.location,
            starts_at: event_data.starts_at,
            ends_at: event_data.ends_at,
        })
        .await
        .map_err(internal("Failed to create event"))?;

    info!("Event {} created by {}", event.id, user.username);
    created(event, "Event created successfully")
}

pub async fn update_event(
    service: &EventService,
    request: &HttpRequest,
    event_id: i64,
    update_data: UpdateEventRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let event = owned_event(&storage, &user, event_id).await?;

    validate_fields(
        update_data.title.as_deref(),
        update_data.description.as_deref(),
        update_data.location.as_deref(),
    )?;
    validate_range(
        update_data.starts_at.unwrap_or(event.starts_at),
        update_data.ends_at.unwrap_or(event.ends_at),
    )?;

    let update_data = UpdateEventRequest {
        title: update_data.title.map(|t| t.trim().to_string()),
        ..update_data
    };
    let updated = storage
        .update_event(event.id, update_data)
        .await
        .map_err(internal("Failed to update event"))?
        .ok_or_else(|| not_found(ErrorCode::EventNotFound, "Event not found"))?;

    ok(updated, "Event updated successfully")
}

pub async fn delete_event(
    service: &EventService,
    request: &HttpRequest,
    event_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let event = owned_event(&storage, &user, event_id).await?;

    let deleted = storage
        .delete_event(event.id)
        .await
        .map_err(internal("Failed to delete event"))?;
    if !deleted {
        return Err(not_found(ErrorCode::EventNotFound, "Event not found"));
    }

    info!("Event {} deleted by {}", event.id, user.username);
    ok_message("Event deleted successfully")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_event_range_allows_equal_bounds() {
        let now = Utc::now();
        assert!(validate_range(now, now).is_ok());
        assert!(validate_range(now, now + Duration::hours(1)).is_ok());
        assert!(validate_range(now, now - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_event_fields() {
        assert!(validate_fields(Some("Sports day"), None, Some("Field")).is_ok());
        assert!(validate_fields(Some(" "), None, None).is_err());
        assert!(validate_fields(None, Some(&"x".repeat(2001)), None).is_err());
    }
}
