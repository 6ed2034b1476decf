//! Shopping business logic - Lists, items, purchase marking, and
//! generation from approved meals.

use crate::{
    entities::{
        Meal, ShoppingItem, ShoppingList, meal, member, shopping_item,
        shopping_list::{self, ShoppingStatus},
    },
    errors::{Error, Result},
};
use sea_orm::{ActiveEnum, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;

/// Parameters for creating a shopping list.
#[derive(Debug, Clone)]
pub struct NewShoppingList {
    /// Human-readable name
    pub name: String,
    /// Date the purchases are needed by
    pub date_needed: Date,
}

/// Optional field changes for updating a shopping list.
#[derive(Debug, Clone, Default)]
pub struct ShoppingListChanges {
    /// New name
    pub name: Option<String>,
    /// New needed-by date
    pub date_needed: Option<Date>,
    /// New progress status
    pub status: Option<ShoppingStatus>,
}

/// Parameters for adding an item to a shopping list.
#[derive(Debug, Clone)]
pub struct NewShoppingItem {
    /// Item name
    pub name: String,
    /// Quantity in the given unit
    pub quantity: f64,
    /// Free-form measurement unit
    pub unit: String,
    /// Estimated cost in dollars
    pub estimated_cost: f64,
    /// Free-form notes
    pub notes: String,
}

/// Outcome of generating shopping items from meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// Distinct items created
    pub item_count: usize,
    /// Approved meals whose ingredients were aggregated
    pub meal_count: usize,
}

/// Creates a shopping list in `pending` status, owned by the acting member.
pub async fn create_shopping_list(
    db: &DatabaseConnection,
    actor: &member::Model,
    new: NewShoppingList,
) -> Result<shopping_list::Model> {
    if new.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Shopping list name cannot be empty".to_string(),
        });
    }

    let model = shopping_list::ActiveModel {
        name: Set(new.name.trim().to_string()),
        date_created: Set(chrono::Utc::now()),
        date_needed: Set(new.date_needed),
        status: Set(ShoppingStatus::Pending),
        created_by: Set(actor.id),
        total_estimated_cost: Set(0.0),
        total_actual_cost: Set(None),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Retrieves shopping lists, newest first, optionally filtered by status.
pub async fn list_shopping_lists(
    db: &DatabaseConnection,
    status: Option<ShoppingStatus>,
) -> Result<Vec<shopping_list::Model>> {
    let mut query = ShoppingList::find();
    if let Some(status) = status {
        query = query.filter(shopping_list::Column::Status.eq(status));
    }
    query
        .order_by_desc(shopping_list::Column::DateCreated)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a shopping list by its unique ID.
pub async fn get_shopping_list_by_id(
    db: &DatabaseConnection,
    list_id: i64,
) -> Result<Option<shopping_list::Model>> {
    ShoppingList::find_by_id(list_id)
        .one(db)
        .await
        .map_err(Into::into)
}

fn require_list(list: Option<shopping_list::Model>, list_id: i64) -> Result<shopping_list::Model> {
    list.ok_or_else(|| Error::NotFound {
        entity: "shopping list",
        id: list_id.to_string(),
    })
}

/// Retrieves the items of a shopping list.
pub async fn list_items(
    db: &DatabaseConnection,
    list_id: i64,
) -> Result<Vec<shopping_item::Model>> {
    ShoppingItem::find()
        .filter(shopping_item::Column::ShoppingListId.eq(list_id))
        .order_by_asc(shopping_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies the given field changes to a shopping list.
pub async fn update_shopping_list(
    db: &DatabaseConnection,
    list_id: i64,
    changes: ShoppingListChanges,
) -> Result<shopping_list::Model> {
    let list = require_list(get_shopping_list_by_id(db, list_id).await?, list_id)?;

    let mut active: shopping_list::ActiveModel = list.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(date_needed) = changes.date_needed {
        active.date_needed = Set(date_needed);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }

    active.update(db).await.map_err(Into::into)
}

/// Deletes a shopping list and its items.
pub async fn delete_shopping_list(db: &DatabaseConnection, list_id: i64) -> Result<()> {
    let list = require_list(get_shopping_list_by_id(db, list_id).await?, list_id)?;

    let txn = db.begin().await?;
    ShoppingItem::delete_many()
        .filter(shopping_item::Column::ShoppingListId.eq(list_id))
        .exec(&txn)
        .await?;
    let active: shopping_list::ActiveModel = list.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(())
}

/// Adds an item to a shopping list and re-sums the list's estimated total.
pub async fn add_item(
    db: &DatabaseConnection,
    list_id: i64,
    new: NewShoppingItem,
) -> Result<shopping_item::Model> {
    require_list(get_shopping_list_by_id(db, list_id).await?, list_id)?;

    if new.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Item name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let model = shopping_item::ActiveModel {
        shopping_list_id: Set(list_id),
        name: Set(new.name.trim().to_string()),
        quantity: Set(new.quantity),
        unit: Set(new.unit),
        estimated_cost: Set(new.estimated_cost),
        actual_cost: Set(None),
        is_purchased: Set(false),
        notes: Set(new.notes),
        ..Default::default()
    };
    let result = model.insert(&txn).await?;

    resum_estimated_total(&txn, list_id).await?;

    txn.commit().await?;
    Ok(result)
}

/// Marks one item on a list as purchased, optionally recording its actual
/// cost, and re-sums the list's actual total over purchased items.
pub async fn mark_item_purchased(
    db: &DatabaseConnection,
    list_id: i64,
    item_id: i64,
    actual_cost: Option<f64>,
) -> Result<shopping_item::Model> {
    require_list(get_shopping_list_by_id(db, list_id).await?, list_id)?;

    let txn = db.begin().await?;

    let item = ShoppingItem::find_by_id(item_id)
        .filter(shopping_item::Column::ShoppingListId.eq(list_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "shopping item",
            id: item_id.to_string(),
        })?;

    let mut active: shopping_item::ActiveModel = item.into();
    active.is_purchased = Set(true);
    if let Some(cost) = actual_cost {
        active.actual_cost = Set(Some(cost));
    }
    let item = active.update(&txn).await?;

    // Re-sum actual cost over purchased items that have one recorded
    let purchased = ShoppingItem::find()
        .filter(shopping_item::Column::ShoppingListId.eq(list_id))
        .filter(shopping_item::Column::IsPurchased.eq(true))
        .all(&txn)
        .await?;
    let total_actual: f64 = purchased.iter().filter_map(|i| i.actual_cost).sum();

    let list = require_list(
        ShoppingList::find_by_id(list_id).one(&txn).await?,
        list_id,
    )?;
    let mut active: shopping_list::ActiveModel = list.into();
    active.total_actual_cost = Set(Some(total_actual));
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(item)
}

/// Generates shopping items from the ingredients of approved meals in a
/// date range.
///
/// Ingredients are aggregated by `(name, unit)`, summing quantity and
/// estimated cost, and appended to the list; the list's estimated total is
/// re-summed afterwards. Only meals in `approved` status contribute.
pub async fn generate_from_meals(
    db: &DatabaseConnection,
    list_id: i64,
    start_date: Date,
    end_date: Date,
) -> Result<GenerationOutcome> {
    if end_date < start_date {
        return Err(Error::Validation {
            message: "End date must not precede start date".to_string(),
        });
    }

    require_list(get_shopping_list_by_id(db, list_id).await?, list_id)?;

    let txn = db.begin().await?;

    let meals = Meal::find()
        .filter(meal::Column::Status.eq(meal::MealStatus::Approved))
        .filter(meal::Column::Date.gte(start_date))
        .filter(meal::Column::Date.lte(end_date))
        .find_with_related(crate::entities::Ingredient)
        .all(&txn)
        .await?;
    let meal_count = meals.len();

    // Aggregate by (name, unit); BTreeMap keeps item creation order stable
    let mut totals: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
    for (_, ingredients) in &meals {
        for line in ingredients {
            let key = (line.name.clone(), line.unit.to_value());
            let entry = totals.entry(key).or_insert((0.0, 0.0));
            entry.0 += line.quantity;
            entry.1 += line.estimated_cost;
        }
    }

    let item_count = totals.len();
    for ((name, unit), (quantity, cost)) in totals {
        let model = shopping_item::ActiveModel {
            shopping_list_id: Set(list_id),
            name: Set(name),
            quantity: Set(quantity),
            unit: Set(unit),
            estimated_cost: Set(cost),
            actual_cost: Set(None),
            is_purchased: Set(false),
            notes: Set(String::new()),
            ..Default::default()
        };
        model.insert(&txn).await?;
    }

    resum_estimated_total(&txn, list_id).await?;

    txn.commit().await?;
    Ok(GenerationOutcome {
        item_count,
        meal_count,
    })
}

async fn resum_estimated_total<C>(db: &C, list_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let items = ShoppingItem::find()
        .filter(shopping_item::Column::ShoppingListId.eq(list_id))
        .all(db)
        .await?;
    let total: f64 = items.iter().map(|i| i.estimated_cost).sum();

    let list = ShoppingList::find_by_id(list_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "shopping list",
            id: list_id.to_string(),
        })?;
    let mut active: shopping_list::ActiveModel = list.into();
    active.total_estimated_cost = Set(total);
    active.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        core::meal::{NewIngredient, approve_meal},
        entities::ingredient,
        test_utils::*,
    };
    use chrono::NaiveDate;

    fn new_item(name: &str, cost: f64) -> NewShoppingItem {
        NewShoppingItem {
            name: name.to_string(),
            quantity: 1.0,
            unit: "pcs".to_string(),
            estimated_cost: cost,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_list_and_add_items() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list = create_test_shopping_list(&db, &member, "Weekly run").await?;
        assert_eq!(list.status, ShoppingStatus::Pending);

        add_item(&db, list.id, new_item("rice", 6.0)).await?;
        add_item(&db, list.id, new_item("oil", 4.5)).await?;

        let reloaded = get_shopping_list_by_id(&db, list.id).await?.unwrap();
        assert_eq!(reloaded.total_estimated_cost, 10.5);
        assert_eq!(list_items(&db, list.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_item_purchased_resums_actual_total() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list = create_test_shopping_list(&db, &member, "Weekly run").await?;

        let a = add_item(&db, list.id, new_item("rice", 6.0)).await?;
        let b = add_item(&db, list.id, new_item("oil", 4.5)).await?;

        let purchased = mark_item_purchased(&db, list.id, a.id, Some(5.75)).await?;
        assert!(purchased.is_purchased);
        assert_eq!(purchased.actual_cost, Some(5.75));

        let reloaded = get_shopping_list_by_id(&db, list.id).await?.unwrap();
        assert_eq!(reloaded.total_actual_cost, Some(5.75));

        mark_item_purchased(&db, list.id, b.id, Some(4.0)).await?;
        let reloaded = get_shopping_list_by_id(&db, list.id).await?.unwrap();
        assert_eq!(reloaded.total_actual_cost, Some(9.75));

        Ok(())
    }

    #[tokio::test]
    async fn test_mark_item_purchased_wrong_list() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list_a = create_test_shopping_list(&db, &member, "A").await?;
        let list_b = create_test_shopping_list(&db, &member, "B").await?;
        let item = add_item(&db, list_a.id, new_item("rice", 6.0)).await?;

        let result = mark_item_purchased(&db, list_b.id, item.id, None).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_from_meals_aggregates_by_name_and_unit() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list = create_test_shopping_list(&db, &member, "Generated").await?;

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut new = test_new_meal("Curry");
        new.date = date;
        let curry = crate::core::meal::create_meal(&db, &member, new).await?;
        let mut new = test_new_meal("Pulao");
        new.date = date;
        let pulao = crate::core::meal::create_meal(&db, &member, new).await?;

        for (meal_id, qty, cost) in [(curry.id, 2.0, 6.0), (pulao.id, 1.5, 4.5)] {
            crate::core::meal::add_ingredient(
                &db,
                meal_id,
                NewIngredient {
                    name: "rice".to_string(),
                    quantity: qty,
                    unit: ingredient::IngredientUnit::Kg,
                    estimated_cost: cost,
                },
            )
            .await?;
        }
        crate::core::meal::add_ingredient(
            &db,
            curry.id,
            NewIngredient {
                name: "chicken".to_string(),
                quantity: 1.0,
                unit: ingredient::IngredientUnit::Kg,
                estimated_cost: 8.0,
            },
        )
        .await?;

        approve_meal(&db, curry.id).await?;
        approve_meal(&db, pulao.id).await?;

        let outcome = generate_from_meals(
            &db,
            list.id,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .await?;
        assert_eq!(outcome.meal_count, 2);
        assert_eq!(outcome.item_count, 2);

        let items = list_items(&db, list.id).await?;
        assert_eq!(items.len(), 2);
        let rice = items.iter().find(|i| i.name == "rice").unwrap();
        assert_eq!(rice.quantity, 3.5);
        assert_eq!(rice.estimated_cost, 10.5);

        let reloaded = get_shopping_list_by_id(&db, list.id).await?.unwrap();
        assert_eq!(reloaded.total_estimated_cost, 18.5);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_skips_unapproved_meals() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list = create_test_shopping_list(&db, &member, "Generated").await?;

        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut new = test_new_meal("Planned only");
        new.date = date;
        let planned = crate::core::meal::create_meal(&db, &member, new).await?;
        crate::core::meal::add_ingredient(
            &db,
            planned.id,
            NewIngredient {
                name: "rice".to_string(),
                quantity: 1.0,
                unit: ingredient::IngredientUnit::Kg,
                estimated_cost: 3.0,
            },
        )
        .await?;

        let outcome = generate_from_meals(&db, list.id, date, date).await?;
        assert_eq!(outcome.meal_count, 0);
        assert_eq!(outcome.item_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_rejects_inverted_range() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list = create_test_shopping_list(&db, &member, "Generated").await?;

        let result = generate_from_meals(
            &db,
            list.id,
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_list_cascades_items() -> Result<()> {
        let (db, member) = setup_with_member().await?;
        let list = create_test_shopping_list(&db, &member, "Doomed").await?;
        add_item(&db, list.id, new_item("rice", 6.0)).await?;

        delete_shopping_list(&db, list.id).await?;

        assert!(get_shopping_list_by_id(&db, list.id).await?.is_none());
        assert!(list_items(&db, list.id).await?.is_empty());

        Ok(())
    }
}
