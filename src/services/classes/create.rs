use actix_web::HttpRequest;
use std::sync::Arc;
use tracing::{info, warn};

use super::{ClassService, validate_capacity};
use crate::errors::EduConnectError;
use crate::models::ErrorCode;
use crate::models::classes::requests::{CreateClassRequest, NewClass};
use crate::models::users::entities::{User, UserRole};
use crate::services::access::current_user;
use crate::services::responses::{
    ServiceResult, bad_request, conflict, created, forbidden, internal, not_found,
};
use crate::storage::Storage;
use crate::utils::random_code::generate_class_code;
use crate::utils::validate::validate_text;

// 班级码冲突时的重试次数
const CODE_ATTEMPTS: usize = 5;

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    validate_text("Class name", &class_data.name, 1, 100)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    validate_capacity(class_data.capacity).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;

    let teacher_id = resolve_teacher(&storage, &user, class_data.teacher_id).await?;

    let mut new_class = NewClass {
        teacher_id,
        name: class_data.name.trim().to_string(),
        subject: class_data.subject,
        description: class_data.description,
        room: class_data.room,
        schedule: class_data.schedule,
        capacity: class_data.capacity,
        class_code: generate_class_code(),
    };

    for attempt in 1..=CODE_ATTEMPTS {
        match storage.create_class(new_class.clone()).await {
            Ok(class) => {
                info!(
                    "Class {} ({}) created by {}",
                    class.name, class.class_code, user.username
                );
                return created(class, "Class created successfully");
            }
            Err(EduConnectError::Conflict(msg)) => {
                warn!("Class code collision on attempt {}: {}", attempt, msg);
                new_class.class_code = generate_class_code();
            }
            Err(e) => return Err(internal("Failed to create class")(e)),
        }
    }

    Err(conflict(
        ErrorCode::ClassAlreadyExists,
        "Unable to allocate a unique class code, please retry",
    ))
}

/// 教师只能为自己建班，管理员必须指定一名教师
async fn resolve_teacher(
    storage: &Arc<dyn Storage>,
    user: &User,
    requested: Option<i64>,
) -> Result<i64, actix_web::HttpResponse> {
    match user.role {
        UserRole::Teacher => match requested {
            Some(id) if id != user.id => Err(forbidden(
                ErrorCode::ClassPermissionDenied,
                "You do not have permission to create a class for another teacher",
            )),
            _ => Ok(user.id),
        },
        UserRole::Admin => {
            let Some(teacher_id) = requested else {
                return Err(bad_request(
                    ErrorCode::BadRequest,
                    "teacher_id is required when an admin creates a class",
                ));
            };
            let teacher = storage
                .get_user_by_id(teacher_id)
                .await
                .map_err(internal("Failed to load teacher"))?
                .ok_or_else(|| not_found(ErrorCode::UserNotFound, "Teacher not found"))?;
            if teacher.role != UserRole::Teacher {
                return Err(bad_request(
                    ErrorCode::BadRequest,
                    "Classes can only be assigned to teachers",
                ));
            }
            Ok(teacher.id)
        }
        UserRole::Student => Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "You do not have permission to create a class",
        )),
    }
}
