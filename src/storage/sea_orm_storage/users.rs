use super::{SeaOrmStorage, db_err};
use crate::entity::users::{ActiveModel, Column, Entity as Users, Model};
use crate::errors::Result;
use crate::models::{
    PaginatedResponse,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{NewUser, UserChanges, UserListParams},
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, user: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            status: Set(user.status.to_string()),
            display_name: Set(user.display_name),
            grade_level: Set(user.grade_level),
            department: Set(user.department),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(db_err("创建用户失败"))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(Model::into_user))
    }

    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(Model::into_user))
    }

    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(Model::into_user))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        Ok(result.map(Model::into_user))
    }

    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(db_err("批量查询用户失败"))?;

        Ok(result.into_iter().map(Model::into_user).collect())
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListParams,
    ) -> Result<PaginatedResponse<User>> {
        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::DisplayName.contains(&escaped)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(Column::Role.eq(role.as_str()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        select = select.order_by_desc(Column::CreatedAt).order_by_desc(Column::Id);

        self.fetch_page(select, query.pagination, "查询用户列表失败", Model::into_user)
            .await
    }

    /// 所有激活用户的 ID，用于全校公告分发
    pub async fn list_active_user_ids_impl(&self) -> Result<Vec<i64>> {
        Users::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Status.eq(UserStatus::Active.as_str()))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_err("查询用户失败"))
    }

    /// 更新最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err("更新最后登录时间失败"))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息，`None` 字段保持不变
    pub async fn update_user_impl(&self, id: i64, changes: UserChanges) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?
        else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(existing.into_user()));
        }

        let mut model: ActiveModel = existing.into();

        if let Some(email) = changes.email {
            model.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            model.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = changes.status {
            model.status = Set(status.to_string());
        }
        if let Some(display_name) = changes.display_name {
            model.display_name = Set(Some(display_name));
        }
        if let Some(avatar_url) = changes.avatar_url {
            model.avatar_url = Set(Some(avatar_url));
        }
        if let Some(grade_level) = changes.grade_level {
            model.grade_level = Set(Some(grade_level));
        }
        if let Some(department) = changes.department {
            model.department = Set(Some(department));
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(db_err("更新用户失败"))?;

        Ok(Some(updated.into_user()))
    }

    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err("删除用户失败"))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_users_impl(&self, role: Option<UserRole>) -> Result<u64> {
        let mut select = Users::find();
        if let Some(role) = role {
            select = select.filter(Column::Role.eq(role.as_str()));
        }

        select.count(&self.db).await.map_err(db_err("统计用户失败"))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{memory_storage, seed_user};
    use super::*;
    use crate::errors::EduConnectError;
    use crate::models::PaginationQuery;

    #[tokio::test]
    async fn test_create_and_lookup_user() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "alice01", UserRole::Student).await;

        let by_name = storage.get_user_by_username_impl("alice01").await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(user.id));

        let by_email = storage
            .get_user_by_username_or_email_impl("alice01@school.test")
            .await
            .unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let storage = memory_storage().await;
        seed_user(&storage, "bobby01", UserRole::Teacher).await;

        let err = storage
            .create_user_impl(NewUser {
                username: "bobby01".to_string(),
                email: "other@school.test".to_string(),
                password_hash: "hash".to_string(),
                role: UserRole::Teacher,
                status: UserStatus::Active,
                display_name: None,
                grade_level: None,
                department: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EduConnectError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_users_filters_by_role() {
        let storage = memory_storage().await;
        seed_user(&storage, "student1", UserRole::Student).await;
        seed_user(&storage, "student2", UserRole::Student).await;
        seed_user(&storage, "teacher1", UserRole::Teacher).await;

        let page = storage
            .list_users_with_pagination_impl(UserListParams {
                pagination: PaginationQuery::new(1, 10),
                role: Some(UserRole::Student),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 2);
        assert!(page.items.iter().all(|u| u.role == UserRole::Student));
        assert_eq!(storage.count_users_impl(None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_user_keeps_unset_fields() {
        let storage = memory_storage().await;
        let user = seed_user(&storage, "carol01", UserRole::Student).await;

        let updated = storage
            .update_user_impl(
                user.id,
                UserChanges {
                    display_name: Some("Carol".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.display_name.as_deref(), Some("Carol"));
        assert_eq!(updated.email, "carol01@school.test");
        assert!(storage.update_user_impl(9999, UserChanges::default()).await.unwrap().is_none());
    }
}
