#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use printshop_api::{
    adapters::{
        blob::{BlobError, BlobStore},
        identity::{AccountProfile, IdentityError, IdentityProvider},
    },
    audit::{AuditEntry, AuditLog},
    dto::{
        centers::CreatePrintCenterRequest,
        orders::{CreateOrderRequest, DocumentUpload},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{
        CenterStatus, ColorMode, Document, Location, Order, OrderStatus, PaperSize, PrintCenter,
        PrintMode, PrintOptions, Role, User, WorkingHour,
    },
    services::{
        compensation::{CompensatingWriteCoordinator, OrphanedResource, ReconciliationHook},
        order_service::OrderService,
    },
    store::{
        CenterChanges, CenterLookup, CenterStore, NewOrder, NewPrintCenter, OrderChanges,
        OrderStore, ProfileChanges, StoreError, UserStore,
    },
};

pub fn auth(uid: &str, role: Role) -> AuthUser {
    AuthUser {
        uid: uid.to_string(),
        role,
    }
}

pub fn options() -> PrintOptions {
    PrintOptions {
        copies: 1,
        pages: "all".into(),
        color: ColorMode::BlackAndWhite,
        paper_size: PaperSize::A4,
        double_sided: false,
    }
}

pub fn upload(name: &str, size: usize) -> DocumentUpload {
    DocumentUpload {
        file_name: name.to_string(),
        mime_type: "application/pdf".into(),
        content: Bytes::from(vec![b'x'; size]),
        print_options: options(),
    }
}

pub fn order_request(count: usize) -> CreateOrderRequest {
    CreateOrderRequest {
        print_mode: PrintMode::PrePrint,
        documents: (0..count)
            .map(|i| upload(&format!("doc-{i}.pdf"), 1_000))
            .collect(),
    }
}

pub fn location() -> Location {
    Location {
        number: Some(12),
        street_type: Some("Rue".into()),
        street: "de la Paix".into(),
        city: "Paris".into(),
        geo_point: None,
    }
}

pub fn working_hours() -> Vec<WorkingHour> {
    vec![WorkingHour {
        day: "Monday".into(),
        start: "08:00".into(),
        end: "18:00".into(),
    }]
}

pub fn center_request(name: &str) -> CreatePrintCenterRequest {
    CreatePrintCenterRequest {
        name: name.to_string(),
        email: "desk@copycorner.test".into(),
        phone_number: "+49 30 1234567".into(),
        location: location(),
        working_hours: working_hours(),
    }
}

/// A stored-looking order without documents.
pub fn order_with_status(status: OrderStatus, owner: &str) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        code: "ABC123".into(),
        user_uid: owner.to_string(),
        center_id: Uuid::new_v4(),
        status,
        print_mode: PrintMode::PrePrint,
        total_cost: 10,
        currency: "EUR".into(),
        pickup_time: None,
        paid_at: None,
        cancelled_at: None,
        created_by: owner.to_string(),
        updated_by: owner.to_string(),
        created_at: now,
        updated_at: now,
        documents: Vec::new(),
    }
}

// ---- order store ----

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<Uuid, Order>>,
    /// Upcoming inserts to reject with a unique-code conflict, as if another request won the race.
    racing_codes: AtomicUsize,
    fail_saves: AtomicBool,
    pub save_calls: AtomicUsize,
}

impl MemoryOrderStore {
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    /// The next `n` inserts fail with a unique-code conflict.
    pub fn race_next_inserts(&self, n: usize) {
        self.racing_codes.store(n, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn insert(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id, order);
    }

    pub fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        let racing = self.racing_codes.load(Ordering::SeqCst);
        if racing > 0 {
            self.racing_codes.store(racing - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict("uq_orders_code".into()));
        }

        let mut orders = self.orders.lock().unwrap();
        if orders.values().any(|o| o.code == order.code) {
            return Err(StoreError::Conflict("uq_orders_code".into()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let documents = order
            .documents
            .into_iter()
            .map(|doc| Document {
                id: Uuid::new_v4(),
                order_id: id,
                file_name: doc.file_name,
                mime_type: doc.mime_type,
                size: doc.size,
                storage_path: doc.storage_path,
                print_options: doc.print_options,
                uploaded_at: Some(doc.uploaded_at),
                printed_at: None,
                storage_deleted_at: None,
            })
            .collect();
        let saved = Order {
            id,
            code: order.code,
            user_uid: order.user_uid,
            center_id: order.center_id,
            status: order.status,
            print_mode: order.print_mode,
            total_cost: order.total_cost,
            currency: order.currency,
            pickup_time: None,
            paid_at: None,
            cancelled_at: None,
            created_by: order.created_by.clone(),
            updated_by: order.created_by,
            created_at: now,
            updated_at: now,
            documents,
        };
        orders.insert(id, saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.get(id))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.code == code)
            .cloned())
    }

    async fn find_by_center(&self, center_id: Uuid) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.center_id == center_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.lock().unwrap().values().cloned().collect())
    }

    async fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Order, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.status = changes.status;
        order.updated_by = changes.updated_by;
        order.updated_at = changes.updated_at;
        if changes.paid_at.is_some() {
            order.paid_at = changes.paid_at;
        }
        if changes.cancelled_at.is_some() {
            order.cancelled_at = changes.cancelled_at;
        }
        Ok(order.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.orders
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

// ---- print centers ----

#[derive(Default)]
pub struct MemoryCenterStore {
    centers: Mutex<HashMap<Uuid, PrintCenter>>,
    /// Centers that still have orders and refuse deletion.
    referenced: Mutex<Vec<Uuid>>,
}

impl MemoryCenterStore {
    pub fn mark_referenced(&self, id: Uuid) {
        self.referenced.lock().unwrap().push(id);
    }

    pub fn len(&self) -> usize {
        self.centers.lock().unwrap().len()
    }

    pub fn add(&self, status: CenterStatus) -> Uuid {
        let now = Utc::now();
        let center = PrintCenter {
            id: Uuid::new_v4(),
            name: "Copy Corner".into(),
            email: "desk@copycorner.test".into(),
            phone_number: "+49 30 1234567".into(),
            owner_uid: "owner-1".into(),
            status,
            location: Some(location()),
            working_hours: working_hours(),
            created_at: now,
            updated_at: now,
        };
        let id = center.id;
        self.centers.lock().unwrap().insert(id, center);
        id
    }
}

#[async_trait]
impl CenterLookup for MemoryCenterStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PrintCenter>, StoreError> {
        Ok(self.centers.lock().unwrap().get(&id).cloned())
    }
}

#[async_trait]
impl CenterStore for MemoryCenterStore {
    async fn save(&self, center: NewPrintCenter) -> Result<PrintCenter, StoreError> {
        let now = Utc::now();
        let saved = PrintCenter {
            id: Uuid::new_v4(),
            name: center.name,
            email: center.email,
            phone_number: center.phone_number,
            owner_uid: center.owner_uid,
            status: CenterStatus::Pending,
            location: Some(center.location),
            working_hours: center.working_hours,
            created_at: now,
            updated_at: now,
        };
        self.centers.lock().unwrap().insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<PrintCenter>, StoreError> {
        Ok(self.centers.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_status(&self, status: CenterStatus) -> Result<Vec<PrintCenter>, StoreError> {
        Ok(self
            .centers
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == status)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: CenterStatus) -> Result<PrintCenter, StoreError> {
        let mut centers = self.centers.lock().unwrap();
        let center = centers.get_mut(&id).ok_or(StoreError::NotFound)?;
        center.status = status;
        center.updated_at = Utc::now();
        Ok(center.clone())
    }

    async fn update(&self, id: Uuid, changes: CenterChanges) -> Result<PrintCenter, StoreError> {
        let mut centers = self.centers.lock().unwrap();
        let center = centers.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = changes.name {
            center.name = name;
        }
        if let Some(phone_number) = changes.phone_number {
            center.phone_number = phone_number;
        }
        if let Some(location) = changes.location {
            center.location = Some(location);
        }
        if let Some(working_hours) = changes.working_hours {
            center.working_hours = working_hours;
        }
        center.updated_at = Utc::now();
        Ok(center.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        if self.referenced.lock().unwrap().contains(&id) {
            return Err(StoreError::Referenced("orders_center_id_fkey".into()));
        }
        self.centers
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

// ---- blob store ----

#[derive(Default)]
pub struct RecordingBlobStore {
    pub puts: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    /// 1-based index of the put that fails; 0 disables.
    fail_put_at: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl RecordingBlobStore {
    pub fn fail_put_at(&self, n: usize) {
        self.fail_put_at.store(n, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    async fn put(&self, _content: Bytes, file_name: &str, owner: &str) -> Result<String, BlobError> {
        let mut puts = self.puts.lock().unwrap();
        if self.fail_put_at.load(Ordering::SeqCst) == puts.len() + 1 {
            return Err(BlobError::Backend("injected upload failure".into()));
        }
        let path = format!("{owner}/{}-{file_name}", puts.len() + 1);
        puts.push(path.clone());
        Ok(path)
    }

    async fn delete(&self, storage_path: &str) -> Result<(), BlobError> {
        self.deletes.lock().unwrap().push(storage_path.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Backend("injected delete failure".into()));
        }
        Ok(())
    }
}

// ---- identity provider ----

#[derive(Default)]
pub struct RecordingIdentity {
    accounts: Mutex<HashMap<String, AccountProfile>>,
    pub deletes: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl RecordingIdentity {
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.accounts.lock().unwrap().contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityProvider for RecordingIdentity {
    async fn create_account(&self, profile: &AccountProfile, _secret: &str) -> Result<String, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.email == profile.email) {
            return Err(IdentityError::EmailExists(profile.email.clone()));
        }
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(uid.clone(), profile.clone());
        Ok(uid)
    }

    async fn delete_account(&self, uid: &str) -> Result<(), IdentityError> {
        self.deletes.lock().unwrap().push(uid.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("injected delete failure".into()));
        }
        self.accounts
            .lock()
            .unwrap()
            .remove(uid)
            .map(|_| ())
            .ok_or(IdentityError::NotFound)
    }
}

// ---- users ----

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
    fail_saves: AtomicBool,
}

impl MemoryUserStore {
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn save(&self, user: User) -> Result<User, StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        users.insert(user.uid.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_uid(&self, uid: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(uid).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn update_role(&self, uid: &str, role: Role) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(uid).ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }

    async fn update_profile(&self, uid: &str, changes: ProfileChanges) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(uid).ok_or(StoreError::NotFound)?;
        if let Some(first_name) = changes.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name;
        }
        if changes.phone_number.is_some() {
            user.phone_number = changes.phone_number;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, uid: &str) -> Result<(), StoreError> {
        self.users
            .lock()
            .unwrap()
            .remove(uid)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

// ---- audit and reconciliation ----

#[derive(Default)]
pub struct RecordingHook {
    pub orphans: Mutex<Vec<OrphanedResource>>,
}

impl RecordingHook {
    pub fn recorded(&self) -> Vec<OrphanedResource> {
        self.orphans.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReconciliationHook for RecordingHook {
    async fn record(&self, orphan: &OrphanedResource) {
        self.orphans.lock().unwrap().push(orphan.clone());
    }
}

#[derive(Default)]
pub struct MemoryAudit {
    pub entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub fn actions(&self) -> Vec<&'static str> {
        self.entries.lock().unwrap().iter().map(|e| e.action).collect()
    }
}

#[async_trait]
impl AuditLog for MemoryAudit {
    async fn record(&self, entry: AuditEntry) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// An `OrderService` over in-memory doubles, with handles to inspect them.
pub struct OrderHarness {
    pub orders: Arc<MemoryOrderStore>,
    pub centers: Arc<MemoryCenterStore>,
    pub blobs: Arc<RecordingBlobStore>,
    pub hook: Arc<RecordingHook>,
    pub audit: Arc<MemoryAudit>,
    pub service: OrderService,
}

impl OrderHarness {
    pub fn new() -> Self {
        let orders = Arc::new(MemoryOrderStore::default());
        let centers = Arc::new(MemoryCenterStore::default());
        let blobs = Arc::new(RecordingBlobStore::default());
        let hook = Arc::new(RecordingHook::default());
        let audit = Arc::new(MemoryAudit::default());
        let service = OrderService::new(
            orders.clone(),
            centers.clone(),
            blobs.clone(),
            audit.clone(),
            CompensatingWriteCoordinator::new(hook.clone()),
        );
        Self {
            orders,
            centers,
            blobs,
            hook,
            audit,
            service,
        }
    }

    pub async fn place_order(&self, owner: &AuthUser, documents: usize) -> Order {
        let center = self.centers.add(CenterStatus::Approved);
        self.service
            .create_order(owner, center, order_request(documents))
            .await
            .expect("order created")
    }
}
