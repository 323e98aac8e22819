//! 业务层的身份与班级权限检查

use actix_web::{HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::sync::Arc;

use super::responses::{forbidden, internal, not_found, unauthorized};
use crate::middlewares::require_class_access::{ClassAccess, resolve_class_access};
use crate::middlewares::{ClassContext, RequireClassAccess, RequireJWT};
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserRole, UserSummary};
use crate::storage::Storage;

pub fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request)
        .ok_or_else(|| unauthorized("Unauthorized: missing user information"))
}

pub fn require_student(user: &User) -> Result<(), HttpResponse> {
    if user.role == UserRole::Student {
        Ok(())
    } else {
        Err(forbidden(
            ErrorCode::Forbidden,
            "Only students can perform this action",
        ))
    }
}

/// 路由上 RequireClassAccess 已经放入的班级上下文
pub fn route_class_context(request: &HttpRequest) -> Result<ClassContext, HttpResponse> {
    RequireClassAccess::extract_context(request).ok_or_else(|| {
        forbidden(
            ErrorCode::ClassPermissionDenied,
            "No permission for this class",
        )
    })
}

/// 班级成员访问：教师本人、管理员、已批准学生
pub async fn class_context(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
) -> Result<ClassContext, HttpResponse> {
    match resolve_class_access(storage.as_ref(), user, class_id)
        .await
        .map_err(internal("Failed to check class access"))?
    {
        ClassAccess::Granted(ctx) => Ok(ctx),
        ClassAccess::Missing => Err(not_found(ErrorCode::ClassNotFound, "Class not found")),
        ClassAccess::Denied => Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "No permission for this class",
        )),
    }
}

/// 班级管理访问：教师本人或管理员
pub async fn manager_context(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
) -> Result<ClassContext, HttpResponse> {
    let ctx = class_context(storage, user, class_id).await?;
    if ctx.role.is_manager() {
        Ok(ctx)
    } else {
        Err(forbidden(
            ErrorCode::ClassPermissionDenied,
            "Only the class teacher or an admin can do this",
        ))
    }
}

/// 用户可见的班级范围，管理员返回 None 表示全部
pub async fn visible_class_ids(
    storage: &Arc<dyn Storage>,
    user: &User,
) -> Result<Option<Vec<i64>>, HttpResponse> {
    let ids = match user.role {
        UserRole::Admin => return Ok(None),
        UserRole::Teacher => storage.list_teacher_class_ids(user.id).await,
        UserRole::Student => storage.list_approved_class_ids(user.id).await,
    };
    ids.map(Some).map_err(internal("Failed to load classes"))
}

/// 批量加载用户简要信息，用于给列表附带学生
pub async fn user_summaries(
    storage: &Arc<dyn Storage>,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, UserSummary>, HttpResponse> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = storage
        .get_users_by_ids(&ids)
        .await
        .map_err(internal("Failed to load users"))?;
    Ok(users.into_iter().map(|u| (u.id, u.summary())).collect())
}
