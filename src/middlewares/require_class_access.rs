/*!
 * 班级访问控制中间件
 *
 * 必须在 RequireJWT 之后使用，从路径参数 `class_id` 读取班级。
 *
 * - `members()`：班级教师、管理员、已批准的学生
 * - `managers()`：班级教师、管理员
 *
 * 班级不存在返回 404，无权限返回 403。通过后把 `ClassContext` 放进请求扩展。
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{error, info};

use super::create_error_response;
use crate::errors::Result;
use crate::models::{
    ErrorCode,
    classes::entities::Class,
    enrollments::EnrollmentStatus,
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

/// 用户在班级中的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRole {
    Admin,
    /// 班级所属教师
    Owner,
    /// 已批准的学生
    Student,
}

impl ClassRole {
    pub fn is_manager(&self) -> bool {
        matches!(self, ClassRole::Admin | ClassRole::Owner)
    }
}

#[derive(Debug, Clone)]
pub struct ClassContext {
    pub class: Class,
    pub role: ClassRole,
}

pub enum ClassAccess {
    Missing,
    Denied,
    Granted(ClassContext),
}

/// 判断用户对班级的访问身份
///
/// 待审核或已拒绝的选课不授予任何访问权。
pub async fn resolve_class_access(
    storage: &dyn Storage,
    user: &User,
    class_id: i64,
) -> Result<ClassAccess> {
    let Some(class) = storage.get_class_by_id(class_id).await? else {
        return Ok(ClassAccess::Missing);
    };

    let role = match user.role {
        UserRole::Admin => Some(ClassRole::Admin),
        UserRole::Teacher if class.teacher_id == user.id => Some(ClassRole::Owner),
        UserRole::Teacher => None,
        UserRole::Student => storage
            .get_enrollment(class_id, user.id)
            .await?
            .filter(|e| e.status == EnrollmentStatus::Approved)
            .map(|_| ClassRole::Student),
    };

    Ok(match role {
        Some(role) => ClassAccess::Granted(ClassContext { class, role }),
        None => ClassAccess::Denied,
    })
}

#[derive(Clone)]
pub struct RequireClassAccess {
    managers_only: bool,
}

impl RequireClassAccess {
    pub fn members() -> Self {
        Self {
            managers_only: false,
        }
    }

    pub fn managers() -> Self {
        Self {
            managers_only: true,
        }
    }

    /// 从请求扩展中取出班级上下文
    pub fn extract_context(req: &HttpRequest) -> Option<ClassContext> {
        req.extensions().get::<ClassContext>().cloned()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireClassAccess
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassAccessMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassAccessMiddleware {
            service: Rc::new(service),
            managers_only: self.managers_only,
        }))
    }
}

fn reject<B>(
    req: ServiceRequest,
    status: StatusCode,
    code: ErrorCode,
    message: &str,
) -> std::result::Result<ServiceResponse<EitherBody<B>>, Error> {
    Ok(req.into_response(create_error_response(status, code, message).map_into_right_body()))
}

pub struct RequireClassAccessMiddleware<S> {
    service: Rc<S>,
    managers_only: bool,
}

impl<S, B> Service<ServiceRequest> for RequireClassAccessMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let managers_only = self.managers_only;

        Box::pin(async move {
            let user = req.extensions().get::<User>().cloned();
            let Some(user) = user else {
                return reject(
                    req,
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::Unauthorized,
                    "Authentication required",
                );
            };

            let Some(class_id) = req
                .match_info()
                .get("class_id")
                .and_then(|s| s.parse::<i64>().ok())
            else {
                return reject(
                    req,
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    "Missing or invalid class_id",
                );
            };

            let Some(storage) = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .map(|data| data.get_ref().clone())
            else {
                error!("Storage is not registered in app data");
                return reject(
                    req,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Internal server error",
                );
            };

            match resolve_class_access(storage.as_ref(), &user, class_id).await {
                Ok(ClassAccess::Granted(ctx)) if !managers_only || ctx.role.is_manager() => {
                    req.extensions_mut().insert(ctx);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Ok(ClassAccess::Missing) => reject(
                    req,
                    StatusCode::NOT_FOUND,
                    ErrorCode::ClassNotFound,
                    "Class not found",
                ),
                Ok(_) => {
                    info!(
                        "Class access denied for user {} on class {} (managers only: {})",
                        user.id, class_id, managers_only
                    );
                    reject(
                        req,
                        StatusCode::FORBIDDEN,
                        ErrorCode::ClassPermissionDenied,
                        "No permission for this class",
                    )
                }
                Err(e) => {
                    error!("Failed to resolve access to class {}: {}", class_id, e);
                    reject(
                        req,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorCode::InternalServerError,
                        "Internal server error",
                    )
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::requests::NewClass;
    use crate::storage::sea_orm_storage::test_support::{memory_storage, seed_user};

    #[tokio::test]
    async fn test_resolve_access_by_role_and_enrollment() {
        let storage = memory_storage().await;
        let teacher = seed_user(&storage, "teacher1", UserRole::Teacher).await;
        let other = seed_user(&storage, "teacher2", UserRole::Teacher).await;
        let student = seed_user(&storage, "student1", UserRole::Student).await;
        let admin = seed_user(&storage, "admin001", UserRole::Admin).await;

        let class = storage
            .create_class(NewClass {
                teacher_id: teacher.id,
                name: "Chemistry".into(),
                subject: None,
                description: None,
                room: None,
                schedule: None,
                capacity: None,
                class_code: "CHEM2345".into(),
            })
            .await
            .unwrap();

        let role_of = |access: ClassAccess| match access {
            ClassAccess::Granted(ctx) => Some(ctx.role),
            _ => None,
        };

        let access = resolve_class_access(&storage, &teacher, class.id).await.unwrap();
        assert_eq!(role_of(access), Some(ClassRole::Owner));
        let access = resolve_class_access(&storage, &admin, class.id).await.unwrap();
        assert_eq!(role_of(access), Some(ClassRole::Admin));
        let access = resolve_class_access(&storage, &other, class.id).await.unwrap();
        assert_eq!(role_of(access), None);

        // 待审核不授予访问权
        let enrollment = storage
            .request_enrollment(class.id, student.id, None)
            .await
            .unwrap();
        let access = resolve_class_access(&storage, &student, class.id).await.unwrap();
        assert_eq!(role_of(access), None);

        storage
            .decide_enrollment(enrollment.id, EnrollmentStatus::Approved, teacher.id)
            .await
            .unwrap();
        let access = resolve_class_access(&storage, &student, class.id).await.unwrap();
        assert_eq!(role_of(access), Some(ClassRole::Student));

        let missing = resolve_class_access(&storage, &student, 9999).await.unwrap();
        assert!(matches!(missing, ClassAccess::Missing));
    }
}
