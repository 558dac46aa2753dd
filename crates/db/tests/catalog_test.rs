//! Integration tests for parties, categories and items.

mod common;

use hisaab_core::category::CategoryError;
use hisaab_db::RepositoryError;
use hisaab_db::entities::sea_orm_active_enums::PartyType;
use hisaab_db::repositories::{
    CategoryRepository, CreateCategoryInput, ItemFilter, ItemRepository, PartyFilter,
    PartyRepository, UpdateCategoryInput, UpdatePartyInput,
};
use hisaab_shared::types::PageRequest;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_party_crud() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let repo = PartyRepository::new(db.clone());
    let party = common::party(&db, PartyType::Customer, "Maharashtra").await;

    let fetched = repo.get(party.id).await.unwrap();
    assert_eq!(fetched.name, party.name);
    assert_eq!(fetched.payment_terms, 15);

    let updated = repo
        .update(
            party.id,
            UpdatePartyInput {
                state: Some(Some("Karnataka".to_string())),
                email: Some(None),
                ..UpdatePartyInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.state.as_deref(), Some("Karnataka"));
    assert_eq!(updated.name, party.name);

    let page = repo
        .list(
            PartyFilter {
                search: Some(party.name.clone()),
                ..PartyFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.meta.total, 1);

    repo.delete(party.id).await.unwrap();
    assert!(matches!(
        repo.get(party.id).await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_category_cycle_rejected() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let repo = CategoryRepository::new(db.clone());
    let root = repo
        .create(CreateCategoryInput {
            name: "Groceries".into(),
            description: None,
            parent_id: None,
        })
        .await
        .unwrap();
    let child = repo
        .create(CreateCategoryInput {
            name: "Rice".into(),
            description: None,
            parent_id: Some(root.id),
        })
        .await
        .unwrap();

    let err = repo
        .update(
            root.id,
            UpdateCategoryInput {
                parent_id: Some(Some(child.id)),
                ..UpdateCategoryInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Category(_)));

    // A parent with children cannot be deleted.
    assert!(matches!(
        repo.delete(root.id).await,
        Err(RepositoryError::Category(_))
    ));
    repo.delete(child.id).await.unwrap();
    repo.delete(root.id).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_reparenting_cannot_form_a_cycle() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let repo = CategoryRepository::new(db.clone());
    let root = |name: &str| CreateCategoryInput {
        name: format!("{name} {}", uuid::Uuid::new_v4()),
        description: None,
        parent_id: None,
    };
    let a = repo.create(root("Spices")).await.unwrap();
    let b = repo.create(root("Masala")).await.unwrap();
    let reparent = |parent: uuid::Uuid| UpdateCategoryInput {
        parent_id: Some(Some(parent)),
        ..UpdateCategoryInput::default()
    };

    let (a_under_b, b_under_a) = tokio::join!(
        repo.update(a.id, reparent(b.id)),
        repo.update(b.id, reparent(a.id)),
    );

    let applied = [a_under_b.is_ok(), b_under_a.is_ok()];
    assert_eq!(applied.iter().filter(|ok| **ok).count(), 1, "{applied:?}");
    let rejected = a_under_b.err().or(b_under_a.err()).unwrap();
    assert!(
        matches!(rejected, RepositoryError::Category(CategoryError::Cycle { .. })),
        "{rejected:?}"
    );

    for id in [a.id, b.id] {
        repo.update(
            id,
            UpdateCategoryInput {
                parent_id: Some(None),
                ..UpdateCategoryInput::default()
            },
        )
        .await
        .unwrap();
    }
    repo.delete(a.id).await.unwrap();
    repo.delete(b.id).await.unwrap();
}

#[tokio::test]
async fn test_item_sku_unique_and_low_stock_filter() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let repo = ItemRepository::new(db.clone());
    let low = common::item(&db, dec!(40), dec!(1)).await;

    let err = repo
        .create(hisaab_db::repositories::CreateItemInput {
            name: "Duplicate".into(),
            sku: low.sku.clone(),
            description: None,
            category_id: None,
            unit: "pcs".into(),
            hsn_code: None,
            unit_price: dec!(1),
            cost_price: dec!(1),
            stock_quantity: dec!(0),
            min_stock_level: dec!(0),
            gst_rate: dec!(5),
            is_active: true,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let page = repo
        .list(
            ItemFilter {
                low_stock: true,
                search: Some(low.sku.clone()),
                ..ItemFilter::default()
            },
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, low.id);
}
