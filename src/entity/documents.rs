use sea_orm::entity::prelude::*;

/// One uploaded file of an order. Print options are flattened into
/// `print_*` columns.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_path: String,
    pub print_copies: i32,
    pub print_pages: String,
    pub print_color: String,
    pub print_paper_size: String,
    pub print_double_sided: bool,
    pub uploaded_at: Option<DateTimeWithTimeZone>,
    pub printed_at: Option<DateTimeWithTimeZone>,
    pub storage_deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_delete = "Cascade"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
