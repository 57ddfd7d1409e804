use anyhow::Context as _;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use uuid::Uuid;

use soilscan_domain::pagination::OffsetPage;
use soilscan_soil_schema::{soil_analyses, users};

use crate::domain::repository::{AnalysisRepository, UserRepository};
use crate::domain::types::{AnalysisRecord, User};
use crate::error::SoilServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn create(&self, user: &User) -> Result<(), SoilServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_verified: Set(user.verified),
            created_at: Set(user.created_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(SoilServiceError::EmailAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, SoilServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, SoilServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::IsVerified, true.into())
            .filter(users::Column::Email.eq(email))
            .exec(&self.db)
            .await
            .context("mark user verified")?;
        Ok(result.rows_affected > 0)
    }
}

fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        verified: model.is_verified,
        created_at: model.created_at,
    }
}

// ── Analysis repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAnalysisRepository {
    pub db: DatabaseConnection,
}

impl AnalysisRepository for DbAnalysisRepository {
    async fn create(&self, record: &AnalysisRecord) -> Result<(), SoilServiceError> {
        soil_analyses::ActiveModel {
            id: Set(record.id),
            user_id: Set(record.user_id),
            image_filename: Set(record.image_filename.clone()),
            image_path: Set(record.image_path.clone()),
            soil_type: Set(record.soil_type.clone()),
            confidence: Set(record.confidence),
            description: Set(record.description.clone()),
            characteristics: Set(record.characteristics.clone()),
            recommended_crops: Set(record.recommended_crops.clone()),
            recommendations: Set(record.recommendations.clone()),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert soil analysis")
        .map_err(SoilServiceError::PersistenceFailure)?;
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: OffsetPage,
    ) -> Result<Vec<AnalysisRecord>, SoilServiceError> {
        let models = soil_analyses::Entity::find()
            .filter(soil_analyses::Column::UserId.eq(user_id))
            .order_by_desc(soil_analyses::Column::CreatedAt)
            .order_by_desc(soil_analyses::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.db)
            .await
            .context("list soil analyses")?;
        Ok(models.into_iter().map(analysis_from_model).collect())
    }

    async fn count(&self, user_id: Uuid) -> Result<u64, SoilServiceError> {
        let count = soil_analyses::Entity::find()
            .filter(soil_analyses::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count soil analyses")?;
        Ok(count)
    }

    async fn find(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<AnalysisRecord>, SoilServiceError> {
        let model = soil_analyses::Entity::find_by_id(id)
            .filter(soil_analyses::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find soil analysis")?;
        Ok(model.map(analysis_from_model))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, SoilServiceError> {
        let result = soil_analyses::Entity::delete_many()
            .filter(soil_analyses::Column::Id.eq(id))
            .filter(soil_analyses::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete soil analysis")?;
        Ok(result.rows_affected > 0)
    }
}

fn analysis_from_model(model: soil_analyses::Model) -> AnalysisRecord {
    AnalysisRecord {
        id: model.id,
        user_id: model.user_id,
        image_filename: model.image_filename,
        image_path: model.image_path,
        soil_type: model.soil_type,
        confidence: model.confidence,
        description: model.description,
        characteristics: model.characteristics,
        recommended_crops: model.recommended_crops,
        recommendations: model.recommendations,
        created_at: model.created_at,
    }
}
