use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::{assignments, attendance, enrollments, exams, materials};
use crate::middlewares::{self, RequireClassAccess};
use crate::models::classes::requests::{ClassListParams, CreateClassRequest, UpdateClassRequest};
use crate::models::users::entities::UserRole;
use crate::services::ClassService;

// 懒加载的全局 CLASS_SERVICE 实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);

// HTTP处理程序
pub async fn list_classes(
    req: HttpRequest,
    query: web::Query<ClassListParams>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_classes(&req, query.into_inner()).await
}

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn get_class_by_code(
    req: HttpRequest,
    code: web::Path<String>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .get_class_by_code(&req, code.into_inner())
        .await
}

pub async fn get_class(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_class(&req).await
}

pub async fn update_class(
    req: HttpRequest,
    update_data: web::Json<UpdateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .update_class(&req, update_data.into_inner())
        .await
}

pub async fn delete_class(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.delete_class(&req).await
}

// 配置路由
//
// `/{class_id}/...` 下的资源由班级权限中间件放入 ClassContext，
// members 为教师、管理员和已批准学生，managers 为教师和管理员。
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/classes")
            .wrap(middlewares::RequireJWT)
            .service(
                // 按角色返回可见班级
                web::resource("").route(web::get().to(list_classes)).route(
                    web::post()
                        .to(create_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/code/{code}").route(
                    web::get()
                        .to(get_class_by_code)
                        // 防止枚举班级码
                        .wrap(middlewares::RateLimit::class_code()),
                ),
            )
            .service(
                web::resource("/{class_id}")
                    .route(
                        web::get()
                            .to(get_class)
                            .wrap(RequireClassAccess::members()),
                    )
                    .route(
                        web::put()
                            .to(update_class)
                            .wrap(RequireClassAccess::managers()),
                    )
                    .route(
                        web::delete()
                            .to(delete_class)
                            .wrap(RequireClassAccess::managers()),
                    ),
            )
            .service(
                web::resource("/{class_id}/enrollments").route(
                    web::get()
                        .to(enrollments::list_class_enrollments)
                        .wrap(RequireClassAccess::managers()),
                ),
            )
            .service(
                web::resource("/{class_id}/assignments")
                    .route(
                        web::get()
                            .to(assignments::list_class_assignments)
                            .wrap(RequireClassAccess::members()),
                    )
                    .route(
                        web::post()
                            .to(assignments::create_assignment)
                            .wrap(RequireClassAccess::managers()),
                    ),
            )
            .service(
                web::resource("/{class_id}/exams")
                    .route(
                        web::get()
                            .to(exams::list_class_exams)
                            .wrap(RequireClassAccess::members()),
                    )
                    .route(
                        web::post()
                            .to(exams::create_exam)
                            .wrap(RequireClassAccess::managers()),
                    ),
            )
            .service(
                web::resource("/{class_id}/attendance")
                    .route(
                        web::get()
                            .to(attendance::list_sessions)
                            .wrap(RequireClassAccess::members()),
                    )
                    .route(
                        web::post()
                            .to(attendance::create_session)
                            .wrap(RequireClassAccess::managers()),
                    ),
            )
            .service(
                web::resource("/{class_id}/materials")
                    .route(
                        web::get()
                            .to(materials::list_materials)
                            .wrap(RequireClassAccess::members()),
                    )
                    .route(
                        web::post()
                            .to(materials::create_material)
                            .wrap(RequireClassAccess::managers()),
                    ),
            ),
    );
}
