pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::classes::requests::{ClassListParams, CreateClassRequest, UpdateClassRequest};

declare_service!(ClassService);

impl ClassService {
    // 获取班级列表
    pub async fn list_classes(
        &self,
        request: &HttpRequest,
        query: ClassListParams,
    ) -> ActixResult<HttpResponse> {
        finish(list::list_classes(self, request, query).await)
    }

    pub async fn create_class(
        &self,
        request: &HttpRequest,
        class_data: CreateClassRequest,
    ) -> ActixResult<HttpResponse> {
        finish(create::create_class(self, request, class_data).await)
    }

    // 班级详情，路由上已校验成员身份
    pub async fn get_class(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(get::get_class(self, request).await)
    }

    // 根据班级码获取公开信息
    pub async fn get_class_by_code(
        &self,
        request: &HttpRequest,
        code: String,
    ) -> ActixResult<HttpResponse> {
        finish(get::get_class_by_code(self, request, code).await)
    }

    pub async fn update_class(
        &self,
        request: &HttpRequest,
        update_data: UpdateClassRequest,
    ) -> ActixResult<HttpResponse> {
        finish(update::update_class(self, request, update_data).await)
    }

    pub async fn delete_class(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        finish(delete::delete_class(self, request).await)
    }
}

/// 班级容量必须为正数
pub(crate) fn validate_capacity(capacity: Option<i32>) -> Result<(), &'static str> {
    match capacity {
        Some(c) if !(1..=1000).contains(&c) => Err("Capacity must be between 1 and 1000"),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_capacity() {
        assert!(validate_capacity(None).is_ok());
        assert!(validate_capacity(Some(30)).is_ok());
        assert!(validate_capacity(Some(0)).is_err());
        assert!(validate_capacity(Some(-3)).is_err());
    }
}
