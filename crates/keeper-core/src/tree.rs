//! # Category Tree
//!
//! Pure tree math for the category/item hierarchy: ancestor chains,
//! denormalized `full_path` strings, leaf checks, and the transitive
//! path rebuild that runs after a rename.
//!
//! ## Denormalized Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   Drinks                         full_path: "Drinks"                   │
//! │   └── Sodas                      full_path: "Drinks > Sodas"           │
//! │       └── [item] Cola 330ml      full_path: "Drinks > Sodas > Cola…"   │
//! │                                                                         │
//! │   Renaming "Drinks" → "Beverages" must rewrite the full_path (and      │
//! │   ancestors) of EVERY descendant category and EVERY item under them.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persistence of the rebuilt records is the catalog flow's job; this
//! module only computes.

use std::collections::HashMap;

use crate::types::{Category, Item, PathSegment};
use crate::PATH_SEPARATOR;

// =============================================================================
// Path Helpers
// =============================================================================

/// Joins ancestor names plus the record's own name into the display path.
pub fn join_path(ancestors: &[PathSegment], name: &str) -> String {
    let mut parts: Vec<&str> = ancestors.iter().map(|a| a.name.as_str()).collect();
    parts.push(name);
    parts.join(PATH_SEPARATOR)
}

/// Ancestor chain for a child of `parent`: the parent's own chain plus the
/// parent itself.
pub fn child_ancestors(parent: &Category) -> Vec<PathSegment> {
    let mut ancestors = parent.ancestors.clone();
    ancestors.push(PathSegment::new(parent.id.clone(), parent.name.clone()));
    ancestors
}

// =============================================================================
// Leaf Checks
// =============================================================================

/// A category is a leaf iff no other category names it as parent.
/// Only leaves may hold items.
pub fn is_leaf(categories: &[Category], category_id: &str) -> bool {
    !categories
        .iter()
        .any(|c| c.parent_id.as_deref() == Some(category_id))
}

/// Number of direct subcategories under `category_id`.
pub fn subcategory_count(categories: &[Category], category_id: &str) -> usize {
    categories
        .iter()
        .filter(|c| c.parent_id.as_deref() == Some(category_id))
        .count()
}

// =============================================================================
// Path Rebuild
// =============================================================================

/// Recomputes `ancestors` and `full_path` for every category and item.
///
/// Run after any category rename. Walks each category's parent chain from
/// the current records (a missing parent truncates the chain rather than
/// failing), then derives each item's chain from its owning category.
///
/// Returns the ids of categories and items whose records changed, so the
/// caller can persist exactly those.
pub fn rebuild_paths(categories: &mut [Category], items: &mut [Item]) -> (Vec<String>, Vec<String>) {
    // id → (parent_id, name) snapshot; chains are walked against this, not
    // against half-rewritten records
    let by_id: HashMap<String, (Option<String>, String)> = categories
        .iter()
        .map(|c| (c.id.clone(), (c.parent_id.clone(), c.name.clone())))
        .collect();

    fn chain_of<'a>(
        by_id: &'a HashMap<String, (Option<String>, String)>,
        mut parent_id: Option<&'a str>,
    ) -> Vec<PathSegment> {
        let mut ancestors = Vec::new();
        while let Some(pid) = parent_id {
            match by_id.get(pid) {
                Some((grand, name)) => {
                    ancestors.insert(0, PathSegment::new(pid.to_string(), name.clone()));
                    parent_id = grand.as_deref();
                }
                None => break,
            }
        }
        ancestors
    }

    let mut changed_categories = Vec::new();
    for category in categories.iter_mut() {
        let ancestors = chain_of(&by_id, category.parent_id.as_deref());
        let full_path = join_path(&ancestors, &category.name);
        if category.ancestors != ancestors || category.full_path != full_path {
            category.ancestors = ancestors;
            category.full_path = full_path;
            changed_categories.push(category.id.clone());
        }
    }

    // Items inherit the owning category's chain plus the category itself
    let category_chains: HashMap<String, Vec<PathSegment>> = categories
        .iter()
        .map(|c| {
            let mut chain = c.ancestors.clone();
            chain.push(PathSegment::new(c.id.clone(), c.name.clone()));
            (c.id.clone(), chain)
        })
        .collect();

    let mut changed_items = Vec::new();
    for item in items.iter_mut() {
        let Some(chain) = category_chains.get(&item.category_id) else {
            continue;
        };
        let full_path = join_path(chain, &item.name);
        if item.ancestors != *chain || item.full_path != full_path {
            item.ancestors = chain.clone();
            item.full_path = full_path;
            changed_items.push(item.id.clone());
        }
    }

    (changed_categories, changed_items)
}

// =============================================================================
// Tree Snapshot
// =============================================================================

/// One rendered node of the category tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub category: Category,
    pub children: Vec<TreeNode>,
    pub items: Vec<Item>,
}

impl TreeNode {
    pub fn subcategory_count(&self) -> usize {
        self.children.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// A render-ready snapshot of the whole tree, rebuilt whenever the store's
/// change feed fires.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    pub roots: Vec<TreeNode>,
}

impl CategoryTree {
    /// Assembles the tree from flat record lists.
    ///
    /// Categories whose parent is missing are treated as roots (same
    /// tolerance as the path rebuild). Siblings keep creation order.
    pub fn build(categories: &[Category], items: &[Item]) -> Self {
        let mut sorted: Vec<&Category> = categories.iter().collect();
        sorted.sort_by_key(|c| (c.created_at, c.id.clone()));

        let known: HashMap<&str, ()> = categories.iter().map(|c| (c.id.as_str(), ())).collect();

        let mut items_by_category: HashMap<&str, Vec<Item>> = HashMap::new();
        for item in items {
            items_by_category
                .entry(item.category_id.as_str())
                .or_default()
                .push(item.clone());
        }
        for bucket in items_by_category.values_mut() {
            bucket.sort_by_key(|i| (i.created_at, i.id.clone()));
        }

        fn assemble(
            parent_id: Option<&str>,
            sorted: &[&Category],
            known: &HashMap<&str, ()>,
            items_by_category: &mut HashMap<&str, Vec<Item>>,
        ) -> Vec<TreeNode> {
            sorted
                .iter()
                .filter(|c| {
                    match (&c.parent_id, parent_id) {
                        (Some(pid), Some(target)) => pid == target,
                        (None, None) => true,
                        // Orphans surface at the root rather than vanishing
                        (Some(pid), None) => !known.contains_key(pid.as_str()),
                        (None, Some(_)) => false,
                    }
                })
                .map(|c| TreeNode {
                    category: (*c).clone(),
                    children: assemble(Some(&c.id), sorted, known, items_by_category),
                    items: items_by_category.remove(c.id.as_str()).unwrap_or_default(),
                })
                .collect()
        }

        CategoryTree {
            roots: assemble(None, &sorted, &known, &mut items_by_category),
        }
    }

    /// Finds a node by category id.
    pub fn find(&self, category_id: &str) -> Option<&TreeNode> {
        fn walk<'a>(nodes: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
            for node in nodes {
                if node.category.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, category_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
