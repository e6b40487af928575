use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed-size content pieces, written as upload bytes arrive. Rows without a
/// matching `files` row are staging leftovers and get swept at startup.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_chunks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub seq: i32,
    pub data: Vec<u8>,
}

// No relation to `files`: chunk rows are inserted before their parent row
// exists, and schema generation turns a `belongs_to` into a foreign key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
