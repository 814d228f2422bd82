mod common;

use std::sync::atomic::Ordering;

use printshop_api::{
    error::ErrorKind,
    models::{CenterStatus, OrderStatus, Role},
    services::{
        compensation::ResourceKind,
        pickup_code::{DEFAULT_ALPHABET, PickupCodeGenerator},
    },
};
use uuid::Uuid;

use common::{OrderHarness, auth, order_request, order_with_status, upload};

#[tokio::test]
async fn create_order_persists_every_document() {
    let h = OrderHarness::new();
    let customer = auth("cust-1", Role::User);
    let center = h.centers.add(CenterStatus::Approved);

    let order = h
        .service
        .create_order(&customer, center, order_request(3))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::PendingPayment);
    assert_eq!(order.code.len(), 6);
    assert!(order.code.bytes().all(|b| DEFAULT_ALPHABET.contains(&b)));
    assert_eq!(order.documents.len(), 3);
    assert!(order.documents.iter().all(|d| d.order_id == order.id));
    assert_eq!(order.user_uid, "cust-1");
    assert_eq!(order.currency, "EUR");
    // three one-page black and white documents at the default rate
    assert_eq!(order.total_cost, 30);
    assert_eq!(h.blobs.put_count(), 3);
    assert!(h.blobs.deleted().is_empty());
    assert_eq!(h.audit.actions(), vec!["order_created"]);
}

#[tokio::test]
async fn local_failure_deletes_every_staged_file() {
    let h = OrderHarness::new();
    h.orders.fail_saves();
    let center = h.centers.add(CenterStatus::Approved);

    let err = h
        .service
        .create_order(&auth("cust-1", Role::User), center, order_request(4))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocalWriteFailed);
    assert_eq!(err.root().kind(), ErrorKind::Internal);
    let staged = h.blobs.puts.lock().unwrap().clone();
    assert_eq!(staged.len(), 4);
    assert_eq!(h.blobs.deleted(), staged);
    assert!(h.hook.recorded().is_empty());
    assert_eq!(h.orders.len(), 0);
}

#[tokio::test]
async fn upload_failure_removes_earlier_files_and_skips_the_save() {
    let h = OrderHarness::new();
    h.blobs.fail_put_at(3);
    let center = h.centers.add(CenterStatus::Approved);

    let err = h
        .service
        .create_order(&auth("cust-1", Role::User), center, order_request(5))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExternalWriteFailed);
    assert!(err.to_string().contains("doc-2.pdf"), "{err}");
    assert_eq!(h.blobs.put_count(), 2);
    assert_eq!(h.blobs.deleted().len(), 2);
    assert_eq!(h.orders.save_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_cleanup_is_reported_but_keeps_the_local_error() {
    let h = OrderHarness::new();
    h.orders.fail_saves();
    h.blobs.fail_deletes();
    let center = h.centers.add(CenterStatus::Approved);

    let err = h
        .service
        .create_order(&auth("cust-1", Role::User), center, order_request(2))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocalWriteFailed);
    let orphans = h.hook.recorded();
    assert_eq!(orphans.len(), 2);
    assert!(orphans.iter().all(|o| o.kind == ResourceKind::Blob));
    assert!(orphans.iter().all(|o| o.operation == "create_order"));
}

#[tokio::test]
async fn code_conflict_at_insert_regenerates_the_code() {
    let h = OrderHarness::new();
    h.orders.race_next_inserts(2);
    let center = h.centers.add(CenterStatus::Approved);

    let order = h
        .service
        .create_order(&auth("cust-1", Role::User), center, order_request(1))
        .await
        .unwrap();

    assert_eq!(h.orders.save_calls.load(Ordering::SeqCst), 3);
    assert_eq!(order.documents.len(), 1);
    assert!(h.blobs.deleted().is_empty());
}

#[tokio::test]
async fn persistent_code_conflicts_exhaust_the_retry_budget() {
    let h = OrderHarness::new();
    let service = h
        .service
        .clone()
        .with_pickup_codes(PickupCodeGenerator::default().with_max_attempts(3));
    h.orders.race_next_inserts(10);
    let center = h.centers.add(CenterStatus::Approved);

    let err = service
        .create_order(&auth("cust-1", Role::User), center, order_request(2))
        .await
        .unwrap_err();

    assert_eq!(err.root().kind(), ErrorKind::ResourceExhausted);
    assert_eq!(h.orders.save_calls.load(Ordering::SeqCst), 3);
    assert_eq!(h.blobs.deleted().len(), 2);
}

#[tokio::test]
async fn center_must_exist_and_be_approved() {
    let h = OrderHarness::new();
    let customer = auth("cust-1", Role::User);

    let err = h
        .service
        .create_order(&customer, Uuid::new_v4(), order_request(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let pending = h.centers.add(CenterStatus::Pending);
    let err = h
        .service
        .create_order(&customer, pending, order_request(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(h.blobs.put_count(), 0);
}

#[tokio::test]
async fn invalid_documents_are_rejected_before_upload() {
    let h = OrderHarness::new();
    let customer = auth("cust-1", Role::User);
    let center = h.centers.add(CenterStatus::Approved);

    let err = h
        .service
        .create_order(&customer, center, order_request(0))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut request = order_request(1);
    request.documents.push(upload("empty.pdf", 0));
    let err = h
        .service
        .create_order(&customer, center, request)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut request = order_request(1);
    request.documents[0].print_options.copies = 0;
    let err = h
        .service
        .create_order(&customer, center, request)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(h.blobs.put_count(), 0);
}

#[tokio::test]
async fn status_updates_follow_the_state_machine() {
    let h = OrderHarness::new();
    let staff = auth("staff-1", Role::Manager);
    let order = h.place_order(&auth("cust-1", Role::User), 1).await;

    let paid = h
        .service
        .update_order_status(&staff, order.id, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.updated_by, "staff-1");
    assert!(paid.paid_at.is_some());

    let err = h
        .service
        .update_order_status(&staff, order.id, OrderStatus::Completed)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let err = h
        .service
        .update_order_status(&staff, Uuid::new_v4(), OrderStatus::Paid)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn owner_can_cancel_an_unpaid_order() {
    let h = OrderHarness::new();
    let customer = auth("cust-1", Role::User);
    let order = h.place_order(&customer, 1).await;

    let cancelled = h.service.cancel_order(&customer, order.id).await.unwrap();

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert!(cancelled.cancelled_at.is_some());
}

#[tokio::test]
async fn cancel_rejects_strangers_and_finished_orders() {
    let h = OrderHarness::new();
    let order = h.place_order(&auth("cust-1", Role::User), 1).await;

    let err = h
        .service
        .cancel_order(&auth("someone-else", Role::User), order.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let completed = order_with_status(OrderStatus::Completed, "cust-1");
    h.orders.insert(completed.clone());
    let err = h
        .service
        .cancel_order(&auth("cust-1", Role::User), completed.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

    // staff may cancel on the customer's behalf
    let cancelled = h
        .service
        .cancel_order(&auth("admin-1", Role::Admin), order.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn delete_order_removes_rows_then_blobs() {
    let h = OrderHarness::new();
    let admin = auth("admin-1", Role::Admin);
    let order = h.place_order(&auth("cust-1", Role::User), 2).await;

    h.service.delete_order(&admin, order.id).await.unwrap();

    assert!(h.orders.get(order.id).is_none());
    let mut expected: Vec<String> = order
        .documents
        .iter()
        .map(|d| d.storage_path.clone())
        .collect();
    let mut deleted = h.blobs.deleted();
    expected.sort();
    deleted.sort();
    assert_eq!(deleted, expected);

    let err = h.service.delete_order(&admin, order.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn lookups_respect_ownership() {
    let h = OrderHarness::new();
    let customer = auth("cust-1", Role::User);
    let order = h.place_order(&customer, 1).await;

    assert_eq!(h.service.get_order(&customer, order.id).await.unwrap().id, order.id);
    assert_eq!(
        h.service
            .get_order(&auth("other", Role::User), order.id)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Unauthorized
    );
    assert!(h.service.get_order(&auth("m", Role::Manager), order.id).await.is_ok());

    let by_code = h
        .service
        .get_order_by_code(&order.code.to_lowercase())
        .await
        .unwrap();
    assert_eq!(by_code.id, order.id);
    assert_eq!(
        h.service.get_order_by_code("SHORT").await.unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[tokio::test]
async fn listings_filter_by_center_and_status() {
    let h = OrderHarness::new();
    let customer = auth("cust-1", Role::User);
    let first = h.place_order(&customer, 1).await;
    let _second = h.place_order(&customer, 1).await;

    let for_center = h
        .service
        .list_orders_for_center(first.center_id)
        .await
        .unwrap();
    assert_eq!(for_center.len(), 1);
    assert_eq!(for_center[0].id, first.id);

    h.service.cancel_order(&customer, first.id).await.unwrap();
    let cancelled = h
        .service
        .list_all_orders(Some(OrderStatus::Cancelled))
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(h.service.list_all_orders(None).await.unwrap().len(), 2);

    assert_eq!(
        h.service
            .list_orders_for_center(Uuid::new_v4())
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}
