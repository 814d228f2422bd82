use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub user_uid: String,
    pub center_id: Uuid,
    pub status: String,
    pub print_mode: String,
    pub total_cost: i64,
    pub currency: String,
    pub pickup_time: Option<DateTimeWithTimeZone>,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::print_centers::Entity",
        from = "Column::CenterId",
        to = "super::print_centers::Column::Id"
    )]
    PrintCenters,
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,
}

impl Related<super::print_centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PrintCenters.def()
    }
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
