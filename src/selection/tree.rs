//! The selection tree: one category node per kind.

use crate::selection::category::{Category, CategoryKind};

/// Count and total size of the checked rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub count: usize,
    pub total_bytes: u64,
}

/// All categories of one browsing session.
#[derive(Debug, Clone)]
pub struct SelectionTree {
    /// Indexed by [`CategoryKind::index`].
    categories: Vec<Category>,
}

impl SelectionTree {
    /// Build a tree with every category unloaded. Kinds listed in
    /// `default_checked` start with their checkbox ticked.
    pub fn new(default_checked: &[CategoryKind]) -> Self {
        let categories = CategoryKind::ALL
            .iter()
            .map(|&kind| Category::new(kind, default_checked.contains(&kind)))
            .collect();
        Self { categories }
    }

    pub fn category(&self, kind: CategoryKind) -> &Category {
        &self.categories[kind.index()]
    }

    pub fn category_mut(&mut self, kind: CategoryKind) -> &mut Category {
        &mut self.categories[kind.index()]
    }

    /// Categories in display order.
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        CategoryKind::DISPLAY_ORDER
            .iter()
            .map(move |kind| self.category(*kind))
    }

    pub fn categories_mut(&mut self) -> impl Iterator<Item = &mut Category> {
        self.categories.iter_mut()
    }

    /// Sum over every checked item row. Category checkboxes do not count.
    pub fn stats(&self) -> SelectionStats {
        self.categories
            .iter()
            .flat_map(|category| category.rows())
            .filter(|row| row.checked)
            .fold(SelectionStats::default(), |mut stats, row| {
                stats.count += 1;
                stats.total_bytes += row.snapshot.size.unwrap_or(0);
                stats
            })
    }
}
