pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::declare_service;
use super::responses::finish;
use crate::models::PaginationQuery;
use crate::models::materials::{CreateMaterialRequest, UpdateMaterialRequest};

declare_service!(MaterialService);

impl MaterialService {
    pub async fn list_materials(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        finish(manage::list_materials(self, request, query).await)
    }

    pub async fn create_material(
        &self,
        request: &HttpRequest,
        material_data: CreateMaterialRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::create_material(self, request, material_data).await)
    }

    pub async fn update_material(
        &self,
        request: &HttpRequest,
        material_id: i64,
        update_data: UpdateMaterialRequest,
    ) -> ActixResult<HttpResponse> {
        finish(manage::update_material(self, request, material_id, update_data).await)
    }

    pub async fn delete_material(
        &self,
        request: &HttpRequest,
        material_id: i64,
    ) -> ActixResult<HttpResponse> {
        finish(manage::delete_material(self, request, material_id).await)
    }
}
