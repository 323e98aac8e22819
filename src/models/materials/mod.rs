use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::string_enum;

string_enum! {
    #[ts(export, export_to = "material.ts")]
    pub enum MaterialType {
        Document => "document",
        Video => "video",
        Link => "link",
        Other => "other",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "material.ts")]
pub struct Material {
    pub id: i64,
    pub class_id: i64,
    pub uploaded_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "material.ts")]
pub struct CreateMaterialRequest {
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub url: String,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "material.ts")]
pub struct UpdateMaterialRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub material_type: Option<MaterialType>,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub class_id: i64,
    pub uploaded_by: i64,
    pub title: String,
    pub description: Option<String>,
    pub material_type: MaterialType,
    pub url: String,
}
