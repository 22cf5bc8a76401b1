//! Post entity for SeaORM.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// JSON array of tag strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,
    pub category_id: Option<Uuid>,
    pub author_id: Uuid,
    pub cover_image: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub views: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for folio_core::domain::Post {
    fn from(model: Model) -> Self {
        let tags = serde_json::from_value::<BTreeSet<String>>(model.tags).unwrap_or_else(|e| {
            tracing::warn!(post_id = %model.id, error = %e, "Ignoring malformed tags column");
            BTreeSet::new()
        });

        Self {
            id: Some(model.id),
            title: model.title,
            body: model.body,
            tags,
            category_id: model.category_id,
            author_id: Some(model.author_id),
            cover_image: model.cover_image,
            published: model.published,
            featured: model.featured,
            views: model.views,
            created_at: Some(model.created_at.into()),
            updated_at: Some(model.updated_at.into()),
        }
    }
}
