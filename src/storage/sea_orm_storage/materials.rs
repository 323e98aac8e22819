//! 学习资料存储操作

use super::{SeaOrmStorage, db_err};
use crate::entity::materials::{ActiveModel, Column, Entity as Materials, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse, PaginationQuery,
    materials::{Material, NewMaterial, UpdateMaterialRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_material_impl(&self, material: NewMaterial) -> Result<Material> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            class_id: Set(material.class_id),
            uploaded_by: Set(material.uploaded_by),
            title: Set(material.title),
            description: Set(material.description),
            material_type: Set(material.material_type.to_string()),
            url: Set(material.url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建资料失败"))?;

        Ok(result.into_material())
    }

    pub async fn get_material_by_id_impl(&self, id: i64) -> Result<Option<Material>> {
        let result = Materials::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询资料失败"))?;

        Ok(result.map(Model::into_material))
    }

    pub async fn list_class_materials_impl(
        &self,
        class_id: i64,
        pagination: PaginationQuery,
    ) -> Result<PaginatedResponse<Material>> {
        let select = Materials::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        self.fetch_page(select, pagination, "查询资料列表失败", Model::into_material)
            .await
    }

    pub async fn update_material_impl(
        &self,
        id: i64,
        update: UpdateMaterialRequest,
    ) -> Result<Option<Material>> {
        let Some(existing) = Materials::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询资料失败"))?
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
        if let Some(material_type) = update.material_type {
            model.material_type = Set(material_type.to_string());
        }
        if let Some(url) = update.url {
            model.url = Set(url);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(db_err("更新资料失败"))?;

        Ok(Some(updated.into_material()))
    }

    pub async fn delete_material_impl(&self, id: i64) -> Result<bool> {
        let result = Materials::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除资料失败"))?;

        Ok(result.rows_affected > 0)
    }
}
