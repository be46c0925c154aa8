//! # Variation Groups
//!
//! Rebuilds variable products from the flat ERP item feed.
//!
//! ## Reconstruction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Flat feed (one scan)                 Groups (first-appearance order)   │
//! │                                                                         │
//! │  TS-RED-M   MPARTNAME=TS  Color=Red ─┐                                  │
//! │  MUG-1      MPARTNAME=-             │   TS ─┬─ TS-RED-M  {Color: Red}   │
//! │  TS-BLUE-M  MPARTNAME=TS  Color=Blue┴──►    └─ TS-BLUE-M {Color: Blue}  │
//! │  CAP-X      MPARTNAME=CAP (inactive) ──►  (no group opened)             │
//! │                                                                         │
//! │  Parent attributes = union of distinct non-empty child values:          │
//! │      Color: [Red, Blue]                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A row becomes a child only when it has a SKU and a master part number
//! (not empty, not `-`), is active, and has at least one spec other than
//! `Material`.

use std::collections::HashMap;

use crate::erp::ErpItem;
use crate::money::Money;
use crate::types::{
    AttributeValue, ProductAttribute, StockStatus, VariableProductDraft, VariationDraft,
};

// =============================================================================
// Types
// =============================================================================

/// One child row of a variation group.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationChild {
    pub sku: String,
    pub title: String,
    /// Master description as carried on this child row.
    pub parent_title: String,
    pub regular_price: Money,
    pub stock_status: StockStatus,
    pub attributes: Vec<AttributeValue>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub cross_sell: Option<String>,
}

impl VariationChild {
    fn from_item(item: &ErpItem, attributes: Vec<AttributeValue>) -> Self {
        VariationChild {
            sku: item.sku().to_string(),
            title: item.title().to_string(),
            parent_title: item.master_description.clone().unwrap_or_default(),
            regular_price: Money::from_decimal(item.base_price.unwrap_or(0.0)),
            stock_status: StockStatus::from_inventory_flag(item.inventory_flag.as_deref()),
            attributes,
            categories: item.categories(),
            tags: item.tags(),
            cross_sell: item.cross_sell().map(str::to_string),
        }
    }
}

/// A parent keyed by master part number and its ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationGroup {
    /// Master part number, the parent's SKU.
    pub master_sku: String,

    /// The group's own title (master description of the last child row read).
    pub own_title: String,

    /// Children in insertion order; a repeated SKU replaces in place.
    children: Vec<VariationChild>,

    positions: HashMap<String, usize>,
}

impl VariationGroup {
    fn new(master_sku: &str, own_title: &str) -> Self {
        VariationGroup {
            master_sku: master_sku.to_string(),
            own_title: own_title.to_string(),
            children: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn insert(&mut self, child: VariationChild) {
        match self.positions.get(&child.sku) {
            Some(&index) => self.children[index] = child,
            None => {
                self.positions.insert(child.sku.clone(), self.children.len());
                self.children.push(child);
            }
        }
    }

    pub fn children(&self) -> &[VariationChild] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn last_child(&self) -> Option<&VariationChild> {
        self.children.last()
    }

    /// Storefront title of the parent.
    ///
    /// Last child's parent title, a space, then the group's own title.
    /// With a uniform feed this repeats the master description
    /// (`"T-Shirt T-Shirt"`); existing storefront titles depend on it.
    pub fn parent_title(&self) -> String {
        let prefix = self
            .last_child()
            .map(|c| c.parent_title.as_str())
            .unwrap_or("");
        format!("{} {}", prefix, self.own_title)
    }

    /// Union of each attribute's distinct non-empty values, first-seen order.
    pub fn merged_attributes(&self) -> Vec<ProductAttribute> {
        let mut merged: Vec<ProductAttribute> = Vec::new();
        for child in &self.children {
            for attribute in &child.attributes {
                if attribute.value.is_empty() {
                    continue;
                }
                match merged.iter_mut().find(|a| a.name == attribute.name) {
                    Some(existing) => {
                        if !existing.values.contains(&attribute.value) {
                            existing.values.push(attribute.value.clone());
                        }
                    }
                    None => merged.push(ProductAttribute {
                        name: attribute.name.clone(),
                        values: vec![attribute.value.clone()],
                    }),
                }
            }
        }
        merged
    }

    /// Cross-sell key of the group (last child that declares one).
    pub fn cross_sell_key(&self) -> Option<&str> {
        self.children
            .iter()
            .rev()
            .find_map(|child| child.cross_sell.as_deref())
    }

    /// Variable parent draft; categories and tags come from the last child.
    pub fn to_parent_draft(&self) -> VariableProductDraft {
        let (categories, tags) = self
            .last_child()
            .map(|c| (c.categories.clone(), c.tags.clone()))
            .unwrap_or_default();

        VariableProductDraft {
            sku: self.master_sku.clone(),
            title: self.parent_title(),
            attributes: self.merged_attributes(),
            categories,
            tags,
            stock_status: StockStatus::InStock,
        }
    }

    /// One draft per child, in insertion order.
    pub fn variation_drafts(&self) -> Vec<VariationDraft> {
        self.children
            .iter()
            .map(|child| VariationDraft {
                sku: child.sku.clone(),
                regular_price: child.regular_price,
                stock_status: child.stock_status,
                attributes: child.attributes.clone(),
            })
            .collect()
    }
}

// =============================================================================
// Reconstruction
// =============================================================================

/// Builds variation groups from the feed in one scan.
///
/// Groups are ordered by the first qualifying row of their master part
/// number; rows that never qualify do not open a group.
///
/// ## Example
/// ```rust
/// use ledgerlink_core::erp::{ErpFeed, ErpItem};
/// use ledgerlink_core::variation::build_variation_groups;
///
/// let feed = ErpFeed::<ErpItem>::decode("LOGPART", r#"{"value":[
///   {"PARTNAME":"TS-R","MPARTNAME":"TS","MPARTDES":"Tee",
///    "PARTUNSPECS_SUBFORM":[{"SPECNAME":"Color","VALUE":"Red"}]}
/// ]}"#).unwrap();
///
/// let groups = build_variation_groups(&feed.value);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].parent_title(), "Tee Tee");
/// ```
pub fn build_variation_groups(items: &[ErpItem]) -> Vec<VariationGroup> {
    let mut groups: Vec<VariationGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let Some(master) = item.master_part() else {
            continue;
        };

        if !item.is_active() || item.sku().trim().is_empty() {
            continue;
        }

        let attributes = item.spec_attributes();
        if attributes.is_empty() {
            continue;
        }

        let own_title = item.master_description.as_deref().unwrap_or("");
        let position = *index.entry(master.to_string()).or_insert_with(|| {
            groups.push(VariationGroup::new(master, own_title));
            groups.len() - 1
        });

        let group = &mut groups[position];
        group.own_title = own_title.to_string();
        group.insert(VariationChild::from_item(item, attributes));
    }

    groups
}

/// Cross-sell ids for every parent that declares a cross-sell key.
///
/// `parents` pairs each written group with its storefront product id.
/// Parents are indexed by their group's own title; a parent never lists
/// itself. Parents without a key are left out of the result.
pub fn resolve_cross_sells(parents: &[(&VariationGroup, i64)]) -> Vec<(i64, Vec<i64>)> {
    let mut by_title: HashMap<&str, Vec<i64>> = HashMap::new();
    for (group, product_id) in parents {
        by_title
            .entry(group.own_title.as_str())
            .or_default()
            .push(*product_id);
    }

    parents
        .iter()
        .filter_map(|(group, product_id)| {
            let key = group.cross_sell_key()?;
            let ids = by_title
                .get(key)
                .map(|ids| ids.iter().copied().filter(|id| id != product_id).collect())
                .unwrap_or_default();
            Some((*product_id, ids))
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erp::ErpSpec;

    fn child(sku: &str, master: &str, master_des: &str, specs: &[(&str, &str)]) -> ErpItem {
        ErpItem {
            part_name: Some(sku.into()),
            description: Some(format!("{} item", sku)),
            base_price: Some(10.0),
            inventory_flag: Some("Y".into()),
            master_part_name: Some(master.into()),
            master_description: Some(master_des.into()),
            active_flag: Some("Y".into()),
            specs: Some(
                specs
                    .iter()
                    .map(|(n, v)| ErpSpec { name: (*n).into(), value: Some((*v).into()) })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_follow_first_appearance() {
        let items = vec![
            child("B-1", "B", "Bag", &[("Color", "Black")]),
            child("A-1", "A", "Apron", &[("Size", "S")]),
            child("B-2", "B", "Bag", &[("Color", "Brown")]),
        ];

        let groups = build_variation_groups(&items);
        let skus: Vec<&str> = groups.iter().map(|g| g.master_sku.as_str()).collect();
        assert_eq!(skus, vec!["B", "A"]);
        assert_eq!(groups[0].children().len(), 2);
    }

    #[test]
    fn test_attribute_merge_keeps_distinct_values_in_order() {
        let items = vec![
            child("TS-1", "TS", "Tee", &[("Color", "Red")]),
            child("TS-2", "TS", "Tee", &[("Color", "Red")]),
            child("TS-3", "TS", "Tee", &[("Color", "Blue")]),
        ];

        let groups = build_variation_groups(&items);
        assert_eq!(
            groups[0].merged_attributes(),
            vec![ProductAttribute {
                name: "Color".into(),
                values: vec!["Red".into(), "Blue".into()],
            }]
        );
    }

    #[test]
    fn test_group_without_qualifying_children_is_dropped() {
        let mut inactive = child("CAP-1", "CAP", "Cap", &[("Color", "Red")]);
        inactive.active_flag = Some("N".into());
        let material_only = child("CAP-2", "CAP", "Cap", &[("Material", "Wool")]);

        let groups = build_variation_groups(&[inactive, material_only]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_placeholder_master_is_ignored() {
        let groups = build_variation_groups(&[child("X-1", "-", "", &[("Color", "Red")])]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_repeated_child_sku_replaces_in_place() {
        let items = vec![
            child("TS-1", "TS", "Tee", &[("Color", "Red")]),
            child("TS-2", "TS", "Tee", &[("Color", "Blue")]),
            child("TS-1", "TS", "Tee", &[("Color", "Green")]),
        ];

        let groups = build_variation_groups(&items);
        let children = groups[0].children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].sku, "TS-1");
        assert_eq!(children[0].attributes[0].value, "Green");
    }

    #[test]
    fn test_parent_title_uses_last_child() {
        let items = vec![
            child("TS-1", "TS", "Tee", &[("Color", "Red")]),
            child("TS-2", "TS", "Tee Shirt", &[("Color", "Blue")]),
        ];

        let groups = build_variation_groups(&items);
        assert_eq!(groups[0].parent_title(), "Tee Shirt Tee Shirt");
    }

    #[test]
    fn test_excluded_rows_do_not_shape_the_group() {
        let mut retired = child("X-0", "X", "Old", &[("Color", "Red")]);
        retired.active_flag = Some("N".into());
        let items = vec![
            retired,
            child("B-1", "B", "Bag", &[("Color", "Black")]),
            child("X-1", "X", "New", &[("Color", "Blue")]),
        ];

        let groups = build_variation_groups(&items);
        let skus: Vec<&str> = groups.iter().map(|g| g.master_sku.as_str()).collect();
        assert_eq!(skus, vec!["B", "X"]);
        assert_eq!(groups[1].own_title, "New");
        assert_eq!(groups[1].parent_title(), "New New");
    }

    #[test]
    fn test_parent_draft_takes_categories_from_last_child() {
        let mut first = child("TS-1", "TS", "Tee", &[("Color", "Red")]);
        first.family = Some("Old".into());
        let mut last = child("TS-2", "TS", "Tee", &[("Color", "Blue")]);
        last.category_spec = Some("Shirts".into());

        let draft = build_variation_groups(&[first, last])[0].to_parent_draft();
        assert_eq!(draft.sku, "TS");
        assert_eq!(draft.categories, vec!["Shirts"]);
        assert_eq!(draft.stock_status, StockStatus::InStock);
    }

    #[test]
    fn test_variation_drafts_carry_stock_status() {
        let mut out = child("TS-2", "TS", "Tee", &[("Color", "Blue")]);
        out.inventory_flag = Some("N".into());
        let items = vec![child("TS-1", "TS", "Tee", &[("Color", "Red")]), out];

        let drafts = build_variation_groups(&items)[0].variation_drafts();
        assert_eq!(drafts[0].stock_status, StockStatus::InStock);
        assert_eq!(drafts[1].stock_status, StockStatus::OutOfStock);
        assert_eq!(drafts[1].regular_price, Money::from_cents(1000));
    }

    #[test]
    fn test_cross_sells_exclude_self_and_skip_keyless() {
        let mut tee = child("TS-1", "TS", "Tee", &[("Color", "Red")]);
        tee.cross_sell_key = Some("Cap".into());
        let mut cap = child("CAP-1", "CAP", "Cap", &[("Color", "Red")]);
        cap.cross_sell_key = Some("Cap".into());
        let mut cap_two = child("CAP2-1", "CAP2", "Cap", &[("Color", "Blue")]);
        cap_two.cross_sell_key = None;
        let bag = child("BAG-1", "BAG", "Bag", &[("Color", "Black")]);

        let groups = build_variation_groups(&[tee, cap, cap_two, bag]);
        let parents: Vec<(&VariationGroup, i64)> =
            groups.iter().zip([10_i64, 20, 30, 40]).collect();

        let links = resolve_cross_sells(&parents);
        assert_eq!(links, vec![(10, vec![20, 30]), (20, vec![30])]);
    }
}
