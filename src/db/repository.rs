use super::paper::{self, Entity as PaperEntity};
use super::{NewPaper, Paper, PaperStore};
use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// SeaORM-backed paper store
#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = sea_orm::ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(true);

        let db = sea_orm::Database::connect(opt)
            .await
            .map_err(|e| AppError::Persistence(format!("failed to connect: {}", e)))?;
        Ok(Self { db })
    }
}

fn to_domain(model: paper::Model) -> Paper {
    Paper {
        id: model.id,
        user_id: model.user_id,
        title: model.title,
        authors: serde_json::from_value(model.authors).unwrap_or_default(),
        abstract_text: model.abstract_text,
        tags: serde_json::from_value(model.tags).unwrap_or_default(),
        file_url: model.file_url,
        external_id: model.external_id,
        file_path: model.file_path,
        extracted_text: model.extracted_text,
        content_hash: model.content_hash,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[async_trait]
impl PaperStore for Repository {
    async fn insert(&self, new: NewPaper) -> Result<Paper> {
        let authors = serde_json::to_value(&new.authors)
            .map_err(|e| AppError::Persistence(format!("failed to encode authors: {}", e)))?;
        let tags = serde_json::to_value(&new.tags)
            .map_err(|e| AppError::Persistence(format!("failed to encode tags: {}", e)))?;

        let model = paper::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            title: Set(new.title),
            authors: Set(authors),
            abstract_text: Set(new.abstract_text),
            tags: Set(tags),
            file_url: Set(new.file_url),
            external_id: Set(new.external_id),
            file_path: Set(new.file_path),
            extracted_text: Set(new.extracted_text),
            content_hash: Set(new.content_hash),
            created_at: Set(Utc::now().into()),
        };

        let inserted = model.insert(&self.db).await?;
        Ok(to_domain(inserted))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Paper>> {
        let models = PaperEntity::find()
            .filter(paper::Column::UserId.eq(user_id))
            .order_by_desc(paper::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn find_by_id(&self, user_id: &str, id: Uuid) -> Result<Option<Paper>> {
        let model = PaperEntity::find_by_id(id)
            .filter(paper::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(model.map(to_domain))
    }

    async fn search_by_title(&self, user_id: &str, title: &str) -> Result<Vec<Paper>> {
        let models = PaperEntity::find()
            .filter(paper::Column::UserId.eq(user_id))
            .filter(paper::Column::Title.eq(title))
            .order_by_desc(paper::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn delete_by_id(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = PaperEntity::delete_many()
            .filter(paper::Column::Id.eq(id))
            .filter(paper::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::Persistence(format!("ping failed: {}", e)))?;
        Ok(())
    }
}
