//! Partitioning a category's items into orderable groups.

use std::collections::HashMap;

use serde::Serialize;

use super::{Positioned, sort_by_position};
use crate::types::{Category, Product, Subcategory, SubcategoryId};

/// Group key for products without a (known) subcategory.
pub const UNASSIGNED: &str = "Unassigned";

/// Group key for categories that are not split into subcategories.
pub const ALL_PRODUCTS: &str = "All Products";

/// Display name identifying a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn unassigned() -> Self {
        Self::new(UNASSIGNED)
    }

    #[must_use]
    pub fn all_products() -> Self {
        Self::new(ALL_PRODUCTS)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One independently orderable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<T> {
    pub key: GroupKey,
    /// Members in display order.
    pub items: Vec<T>,
}

impl<T> Group<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An ordered partition of items into groups.
///
/// Derived state only: rebuilt from the item list after every fetch and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping<T> {
    groups: Vec<Group<T>>,
}

impl<T> Default for Grouping<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T: Positioned + Clone> Grouping<T> {
    /// Partition `items` using `key_of`.
    ///
    /// Items are first put into display order (see [`sort_by_position`]);
    /// groups then appear in the order their first member does.
    pub fn build<F>(items: &[T], key_of: F) -> Self
    where
        F: Fn(&T) -> GroupKey,
    {
        let mut ordered = items.to_vec();
        sort_by_position(&mut ordered);

        let mut groups: Vec<Group<T>> = Vec::new();
        for item in ordered {
            let key = key_of(&item);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.items.push(item),
                None => groups.push(Group {
                    key,
                    items: vec![item],
                }),
            }
        }
        Self { groups }
    }

    /// Put every item into a single group named `key`.
    pub fn single(key: GroupKey, items: &[T]) -> Self {
        if items.is_empty() {
            return Self::default();
        }
        Self::build(items, |_| key.clone())
    }

    /// Key of the group containing the item with `id`.
    pub fn group_of(&self, id: &T::Id) -> Option<&GroupKey> {
        self.groups
            .iter()
            .find(|g| g.items.iter().any(|item| item.id() == id))
            .map(|g| &g.key)
    }

    /// All items, group after group.
    #[must_use]
    pub fn flatten(&self) -> Vec<T> {
        self.groups
            .iter()
            .flat_map(|g| g.items.iter().cloned())
            .collect()
    }
}

impl<T> Grouping<T> {
    #[must_use]
    pub fn groups(&self) -> &[Group<T>] {
        &self.groups
    }

    pub fn group(&self, key: &GroupKey) -> Option<&Group<T>> {
        self.groups.iter().find(|g| &g.key == key)
    }

    /// Group keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.iter().map(|g| &g.key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of grouped items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<Group<T>> {
        &mut self.groups
    }
}

/// Group a category's products by primary subcategory.
///
/// - A category with `has_subcategory == false`, or with no subcategories
///   defined, yields a single [`ALL_PRODUCTS`] group whatever associations
///   the products carry.
/// - Otherwise each product goes into the group named after its primary
///   subcategory, or [`UNASSIGNED`] when it has none or the subcategory is
///   unknown (e.g. deleted since the product was tagged).
///
/// `products` is expected to be scoped to `category` already; `subcategories`
/// may span every category, since a product's primary subcategory is looked
/// up by ID.
pub fn group_products(
    products: &[Product],
    category: &Category,
    subcategories: &[Subcategory],
) -> Grouping<Product> {
    let has_own_subcategories = subcategories.iter().any(|s| s.belongs_to(&category.id));
    if !category.has_subcategory || !has_own_subcategories {
        return Grouping::single(GroupKey::all_products(), products);
    }

    let names: HashMap<&SubcategoryId, &str> = subcategories
        .iter()
        .map(|s| (&s.id, s.name.as_str()))
        .collect();

    Grouping::build(products, |product| {
        product
            .primary_subcategory()
            .and_then(|id| names.get(id))
            .filter(|name| !name.trim().is_empty())
            .map_or_else(GroupKey::unassigned, |name| GroupKey::new(*name))
    })
}

/// Group a category's subcategories.
///
/// Subcategories have a single implicit group: their owning category.
pub fn group_subcategories(
    subcategories: &[Subcategory],
    category: &Category,
) -> Grouping<Subcategory> {
    let owned: Vec<Subcategory> = subcategories
        .iter()
        .filter(|s| s.belongs_to(&category.id))
        .cloned()
        .collect();
    Grouping::single(GroupKey::new(category.name.clone()), &owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::test_support::{ids, product};
    use serde_json::json;

    fn category(has_subcategory: bool) -> Category {
        serde_json::from_value(json!({
            "_id": "cat",
            "name": "Grains",
            "hasSubcategory": has_subcategory,
        }))
        .expect("category parses")
    }

    fn subcategory(id: &str, name: &str, owner: &str) -> Subcategory {
        serde_json::from_value(json!({ "_id": id, "name": name, "categoryId": owner }))
            .expect("subcategory parses")
    }

    fn keys(grouping: &Grouping<Product>) -> Vec<&str> {
        grouping.keys().map(GroupKey::as_str).collect()
    }

    #[test]
    fn test_groups_by_primary_subcategory_in_position_order() {
        let products = vec![
            product("A", Some(2), &["x"]),
            product("B", Some(1), &["x"]),
            product("D", Some(1), &["y"]),
        ];
        let subs = vec![subcategory("x", "Rice", "cat"), subcategory("y", "Dal", "cat")];

        let grouping = group_products(&products, &category(true), &subs);

        assert_eq!(keys(&grouping), vec!["Rice", "Dal"]);
        let rice = grouping.group(&GroupKey::new("Rice")).expect("rice group");
        assert_eq!(ids(&rice.items), vec!["B", "A"]);
        let dal = grouping.group(&GroupKey::new("Dal")).expect("dal group");
        assert_eq!(ids(&dal.items), vec!["D"]);
    }

    #[test]
    fn test_category_without_subcategory_flag_is_one_flat_group() {
        let products = vec![
            product("A", Some(1), &["x"]),
            product("B", Some(2), &["y"]),
            product("C", None, &[]),
        ];
        let subs = vec![subcategory("x", "Rice", "cat"), subcategory("y", "Dal", "cat")];

        let grouping = group_products(&products, &category(false), &subs);

        assert_eq!(keys(&grouping), vec![ALL_PRODUCTS]);
        assert_eq!(grouping.item_count(), 3);
    }

    #[test]
    fn test_category_with_no_subcategories_defined_is_one_flat_group() {
        let products = vec![product("A", Some(1), &["x"])];
        let subs = vec![subcategory("x", "Rice", "other-cat")];

        let grouping = group_products(&products, &category(true), &subs);

        assert_eq!(keys(&grouping), vec![ALL_PRODUCTS]);
    }

    #[test]
    fn test_missing_or_deleted_subcategory_falls_back_to_unassigned() {
        let products = vec![
            product("A", Some(1), &["x"]),
            product("B", Some(2), &[]),
            product("C", Some(3), &["deleted"]),
        ];
        let subs = vec![subcategory("x", "Rice", "cat")];

        let grouping = group_products(&products, &category(true), &subs);

        assert_eq!(keys(&grouping), vec!["Rice", UNASSIGNED]);
        let unassigned = grouping.group(&GroupKey::unassigned()).expect("unassigned");
        assert_eq!(ids(&unassigned.items), vec!["B", "C"]);
    }

    #[test]
    fn test_only_primary_subcategory_decides_membership() {
        let products = vec![product("A", Some(1), &["y", "x"])];
        let subs = vec![subcategory("x", "Rice", "cat"), subcategory("y", "Dal", "cat")];

        let grouping = group_products(&products, &category(true), &subs);

        assert_eq!(keys(&grouping), vec!["Dal"]);
        assert_eq!(
            grouping.group_of(&crate::types::ProductId::new("A")),
            Some(&GroupKey::new("Dal"))
        );
    }

    #[test]
    fn test_empty_product_list_has_no_groups() {
        let grouping = group_products(&[], &category(false), &[]);
        assert!(grouping.is_empty());
    }

    #[test]
    fn test_subcategories_group_under_owning_category() {
        let mut second = subcategory("s2", "Dal", "cat");
        second.position = Some(1);
        let subs = vec![
            subcategory("s1", "Rice", "cat"),
            second,
            subcategory("s3", "Soap", "household"),
        ];

        let grouping = group_subcategories(&subs, &category(true));

        assert_eq!(grouping.len(), 1);
        let group = grouping.group(&GroupKey::new("Grains")).expect("category group");
        let names: Vec<_> = group.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Dal", "Rice"]);
    }
}
