//! 学习资料只保存外部链接，不处理文件上传

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use tracing::info;

use super::MaterialService;
use crate::models::materials::{
    CreateMaterialRequest, Material, NewMaterial, UpdateMaterialRequest,
};
use crate::models::users::entities::User;
use crate::models::{ErrorCode, PaginationQuery};
use crate::services::access::{current_user, manager_context, route_class_context};
use crate::services::responses::{
    ServiceResult, bad_request, created, internal, not_found, ok, ok_message,
};
use crate::storage::Storage;
use crate::utils::validate::{validate_text, validate_url};

async fn managed_material(
    storage: &Arc<dyn Storage>,
    user: &User,
    material_id: i64,
) -> Result<Material, HttpResponse> {
    let material = storage
        .get_material_by_id(material_id)
        .await
        .map_err(internal("Failed to load material"))?
        .ok_or_else(|| not_found(ErrorCode::MaterialNotFound, "Material not found"))?;
    manager_context(storage, user, material.class_id).await?;
    Ok(material)
}

pub async fn list_materials(
    service: &MaterialService,
    request: &HttpRequest,
    query: PaginationQuery,
) -> ServiceResult {
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    let page = storage
        .list_class_materials(ctx.class.id, query)
        .await
        .map_err(internal("Failed to list materials"))?;

    ok(page, "Materials retrieved successfully")
}

pub async fn create_material(
    service: &MaterialService,
    request: &HttpRequest,
    material_data: CreateMaterialRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let ctx = route_class_context(request)?;
    let storage = service.get_storage(request)?;

    validate_text("Title", &material_data.title, 1, 200)
        .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    if let Some(description) = &material_data.description {
        validate_text("Description", description, 0, 2000)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    let url = material_data.url.trim();
    validate_url(url).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;

    let material = storage
        .create_material(NewMaterial {
            class_id: ctx.class.id,
            uploaded_by: user.id,
            title: material_data.title.trim().to_string(),
            description: material_data.description,
            material_type: material_data.material_type,
            url: url.to_string(),
        })
        .await
        .map_err(internal("Failed to create material"))?;

    info!(
        "Material {} added to class {} by {}",
        material.id, ctx.class.id, user.username
    );
    created(material, "Material created successfully")
}

pub async fn update_material(
    service: &MaterialService,
    request: &HttpRequest,
    material_id: i64,
    update_data: UpdateMaterialRequest,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let material = managed_material(&storage, &user, material_id).await?;

    if let Some(title) = &update_data.title {
        validate_text("Title", title, 1, 200)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if let Some(description) = &update_data.description {
        validate_text("Description", description, 0, 2000)
            .map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }
    if let Some(url) = &update_data.url {
        validate_url(url.trim()).map_err(|e| bad_request(ErrorCode::BadRequest, e))?;
    }

    let update_data = UpdateMaterialRequest {
        title: update_data.title.map(|t| t.trim().to_string()),
        url: update_data.url.map(|u| u.trim().to_string()),
        ..update_data
    };
    let updated = storage
        .update_material(material.id, update_data)
        .await
        .map_err(internal("Failed to update material"))?
        .ok_or_else(|| not_found(ErrorCode::MaterialNotFound, "Material not found"))?;

    ok(updated, "Material updated successfully")
}

pub async fn delete_material(
    service: &MaterialService,
    request: &HttpRequest,
    material_id: i64,
) -> ServiceResult {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let material = managed_material(&storage, &user, material_id).await?;

    let deleted = storage
        .delete_material(material.id)
        .await
        .map_err(internal("Failed to delete material"))?;
    if !deleted {
        return Err(not_found(ErrorCode::MaterialNotFound, "Material not found"));
    }

    info!("Material {} deleted by {}", material.id, user.username);
    ok_message("Material deleted successfully")
}
