//! Paper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub user_id: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub authors: Json,

    #[sea_orm(column_type = "Text")]
    pub abstract_text: String, // 'abstract' is a reserved keyword in Rust

    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    #[sea_orm(column_type = "Text")]
    pub file_url: String,

    /// Identifier reported by the model (DOI/arXiv id or generated token)
    #[sea_orm(column_type = "Text")]
    pub external_id: String,

    /// Blob-store key of the original bytes
    #[sea_orm(column_type = "Text")]
    pub file_path: String,

    /// Text extracted at ingestion, cached for the chat flow
    #[sea_orm(column_type = "Text")]
    pub extracted_text: String,

    #[sea_orm(column_type = "Text")]
    pub content_hash: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
