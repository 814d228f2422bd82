use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity::{
        documents::{
            ActiveModel as DocumentActive, Column as DocCol, Entity as Documents,
            Model as DocumentModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        print_centers::{
            ActiveModel as CenterActive, Column as CenterCol, Entity as PrintCenters,
            Model as CenterModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    models::{CenterStatus, Document, Order, PrintCenter, PrintOptions, Role, User},
    store::{
        CenterChanges, CenterLookup, CenterStore, NewOrder, NewPrintCenter, OrderChanges,
        OrderStore, ProfileChanges, StoreError, UserStore,
    },
};

/// Constraint violations get their own variants, everything else stays a database error.
fn map_db_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(constraint)) => StoreError::Conflict(constraint),
        Some(SqlErr::ForeignKeyConstraintViolation(constraint)) => {
            StoreError::Referenced(constraint)
        }
        _ => StoreError::Database(err),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn parse<T: std::str::FromStr<Err = String>>(value: &str) -> Result<T, StoreError> {
    value.parse().map_err(StoreError::InvalidData)
}

#[derive(Clone)]
pub struct OrmOrderStore {
    conn: DatabaseConnection,
}

impl OrmOrderStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn load(&self, model: OrderModel) -> Result<Order, StoreError> {
        let documents = model
            .find_related(Documents)
            .order_by_asc(DocCol::Position)
            .all(&self.conn)
            .await?;
        order_from_entity(model, documents)
    }

    async fn load_many(&self, models: Vec<OrderModel>) -> Result<Vec<Order>, StoreError> {
        let mut orders = Vec::with_capacity(models.len());
        for model in models {
            orders.push(self.load(model).await?);
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderStore for OrmOrderStore {
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError> {
        let txn = self.conn.begin().await?;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let inserted = OrderActive {
            id: Set(order_id),
            code: Set(order.code),
            user_uid: Set(order.user_uid),
            center_id: Set(order.center_id),
            status: Set(order.status.to_string()),
            print_mode: Set(order.print_mode.as_str().to_string()),
            total_cost: Set(order.total_cost),
            currency: Set(order.currency),
            pickup_time: Set(None),
            paid_at: Set(None),
            cancelled_at: Set(None),
            created_by: Set(order.created_by.clone()),
            updated_by: Set(order.created_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        let mut documents = Vec::with_capacity(order.documents.len());
        for (position, doc) in order.documents.into_iter().enumerate() {
            let model = DocumentActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                position: Set(position as i32),
                file_name: Set(doc.file_name),
                mime_type: Set(doc.mime_type),
                size: Set(doc.size),
                storage_path: Set(doc.storage_path),
                print_copies: Set(doc.print_options.copies),
                print_pages: Set(doc.print_options.pages),
                print_color: Set(doc.print_options.color.as_str().to_string()),
                print_paper_size: Set(doc.print_options.paper_size.as_str().to_string()),
                print_double_sided: Set(doc.print_options.double_sided),
                uploaded_at: Set(Some(doc.uploaded_at.into())),
                printed_at: Set(None),
                storage_deleted_at: Set(None),
            }
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
            documents.push(model);
        }

        txn.commit().await?;

        order_from_entity(inserted, documents)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        match Orders::find_by_id(id).one(&self.conn).await? {
            Some(model) => Ok(Some(self.load(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Order>, StoreError> {
        let model = Orders::find()
            .filter(OrderCol::Code.eq(code))
            .one(&self.conn)
            .await?;
        match model {
            Some(model) => Ok(Some(self.load(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_center(&self, center_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let models = Orders::find()
            .filter(OrderCol::CenterId.eq(center_id))
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?;
        self.load_many(models).await
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        let models = Orders::find()
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.conn)
            .await?;
        self.load_many(models).await
    }

    async fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Order, StoreError> {
        let existing = Orders::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: OrderActive = existing.into();
        active.status = Set(changes.status.to_string());
        active.updated_by = Set(changes.updated_by);
        active.updated_at = Set(changes.updated_at.into());
        if let Some(paid_at) = changes.paid_at {
            active.paid_at = Set(Some(paid_at.into()));
        }
        if let Some(cancelled_at) = changes.cancelled_at {
            active.cancelled_at = Set(Some(cancelled_at.into()));
        }
        let updated = active.update(&self.conn).await?;

        self.load(updated).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = Orders::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct OrmCenterStore {
    conn: DatabaseConnection,
}

impl OrmCenterStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CenterLookup for OrmCenterStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PrintCenter>, StoreError> {
        PrintCenters::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(center_from_entity)
            .transpose()
    }
}

#[async_trait]
impl CenterStore for OrmCenterStore {
    async fn save(&self, center: NewPrintCenter) -> Result<PrintCenter, StoreError> {
        let now = Utc::now();
        let model = CenterActive {
            id: Set(Uuid::new_v4()),
            name: Set(center.name),
            email: Set(center.email),
            phone_number: Set(center.phone_number),
            owner_uid: Set(center.owner_uid),
            status: Set(CenterStatus::Pending.to_string()),
            location: Set(Some(to_json(&center.location)?)),
            working_hours: Set(to_json(&center.working_hours)?),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.conn)
        .await
        .map_err(map_db_err)?;
        center_from_entity(model)
    }

    async fn find_all(&self) -> Result<Vec<PrintCenter>, StoreError> {
        PrintCenters::find()
            .order_by_asc(CenterCol::Name)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(center_from_entity)
            .collect()
    }

    async fn find_by_status(&self, status: CenterStatus) -> Result<Vec<PrintCenter>, StoreError> {
        PrintCenters::find()
            .filter(CenterCol::Status.eq(status.as_str()))
            .order_by_asc(CenterCol::Name)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(center_from_entity)
            .collect()
    }

    async fn update_status(&self, id: Uuid, status: CenterStatus) -> Result<PrintCenter, StoreError> {
        let existing = PrintCenters::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: CenterActive = existing.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now().into());
        center_from_entity(active.update(&self.conn).await?)
    }

    async fn update(&self, id: Uuid, changes: CenterChanges) -> Result<PrintCenter, StoreError> {
        let existing = PrintCenters::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: CenterActive = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(phone_number) = changes.phone_number {
            active.phone_number = Set(phone_number);
        }
        if let Some(location) = changes.location {
            active.location = Set(Some(to_json(&location)?));
        }
        if let Some(working_hours) = changes.working_hours {
            active.working_hours = Set(to_json(&working_hours)?);
        }
        active.updated_at = Set(Utc::now().into());
        center_from_entity(active.update(&self.conn).await?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = PrintCenters::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct OrmUserStore {
    conn: DatabaseConnection,
}

impl OrmUserStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl UserStore for OrmUserStore {
    async fn save(&self, user: User) -> Result<User, StoreError> {
        let model = UserActive {
            uid: Set(user.uid),
            role: Set(user.role.as_str().to_string()),
            email: Set(user.email),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            phone_number: Set(user.phone_number),
            center_id: Set(user.center_id),
            created_at: Set(user.created_at.into()),
            updated_at: Set(user.updated_at.into()),
        }
        .insert(&self.conn)
        .await
        .map_err(map_db_err)?;
        user_from_entity(model)
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, StoreError> {
        Users::find_by_id(uid.to_string())
            .one(&self.conn)
            .await?
            .map(user_from_entity)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Users::find()
            .all(&self.conn)
            .await?
            .into_iter()
            .map(user_from_entity)
            .collect()
    }

    async fn update_role(&self, uid: &str, role: Role) -> Result<User, StoreError> {
        let existing = Users::find_by_id(uid.to_string())
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: UserActive = existing.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now().into());
        user_from_entity(active.update(&self.conn).await?)
    }

    async fn update_profile(&self, uid: &str, changes: ProfileChanges) -> Result<User, StoreError> {
        let existing = Users::find()
            .filter(UserCol::Uid.eq(uid))
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound)?;

        let mut active: UserActive = existing.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone_number) = changes.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        active.updated_at = Set(Utc::now().into());
        user_from_entity(active.update(&self.conn).await?)
    }

    async fn delete(&self, uid: &str) -> Result<(), StoreError> {
        let result = Users::delete_by_id(uid.to_string()).exec(&self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

fn order_from_entity(model: OrderModel, documents: Vec<DocumentModel>) -> Result<Order, StoreError> {
    Ok(Order {
        id: model.id,
        code: model.code,
        user_uid: model.user_uid,
        center_id: model.center_id,
        status: parse(&model.status)?,
        print_mode: parse(&model.print_mode)?,
        total_cost: model.total_cost,
        currency: model.currency,
        pickup_time: model.pickup_time.map(|dt| dt.with_timezone(&Utc)),
        paid_at: model.paid_at.map(|dt| dt.with_timezone(&Utc)),
        cancelled_at: model.cancelled_at.map(|dt| dt.with_timezone(&Utc)),
        created_by: model.created_by,
        updated_by: model.updated_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        documents: documents
            .into_iter()
            .map(document_from_entity)
            .collect::<Result<_, _>>()?,
    })
}

fn document_from_entity(model: DocumentModel) -> Result<Document, StoreError> {
    Ok(Document {
        id: model.id,
        order_id: model.order_id,
        file_name: model.file_name,
        mime_type: model.mime_type,
        size: model.size,
        storage_path: model.storage_path,
        print_options: PrintOptions {
            copies: model.print_copies,
            pages: model.print_pages,
            color: parse(&model.print_color)?,
            paper_size: parse(&model.print_paper_size)?,
            double_sided: model.print_double_sided,
        },
        uploaded_at: model.uploaded_at.map(|dt| dt.with_timezone(&Utc)),
        printed_at: model.printed_at.map(|dt| dt.with_timezone(&Utc)),
        storage_deleted_at: model.storage_deleted_at.map(|dt| dt.with_timezone(&Utc)),
    })
}

fn center_from_entity(model: CenterModel) -> Result<PrintCenter, StoreError> {
    Ok(PrintCenter {
        id: model.id,
        name: model.name,
        email: model.email,
        phone_number: model.phone_number,
        owner_uid: model.owner_uid,
        status: parse(&model.status)?,
        location: model.location.map(from_json).transpose()?,
        working_hours: from_json(model.working_hours)?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn user_from_entity(model: UserModel) -> Result<User, StoreError> {
    Ok(User {
        uid: model.uid,
        role: parse(&model.role)?,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        phone_number: model.phone_number,
        center_id: model.center_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
