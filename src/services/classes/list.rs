use actix_web::HttpRequest;

use super::ClassService;
use crate::models::classes::requests::{ClassListParams, ClassListQuery};
use crate::models::users::entities::UserRole;
use crate::services::access::current_user;
use crate::services::responses::{ServiceResult, internal, ok};

pub async fn list_classes(
    service: &ClassService,
    request: &HttpRequest,
    query: ClassListParams,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    // 管理员可按教师筛选，教师只看自己的，学生只看已加入的
    let mut list_query = ClassListQuery {
        pagination: query.pagination,
        search: query.search,
        ..Default::default()
    };
    match user.role {
        UserRole::Admin => list_query.teacher_id = query.teacher_id,
        UserRole::Teacher => list_query.teacher_id = Some(user.id),
        UserRole::Student => list_query.student_id = Some(user.id),
    }

    let page = storage
        .list_classes_with_pagination(list_query)
        .await
        .map_err(internal("Failed to list classes"))?;

    ok(page, "Classes retrieved successfully")
}
