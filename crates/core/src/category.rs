//! Category tree rules.
//!
//! Categories form a forest through `parent_id`. A category may never be
//! its own ancestor.

use std::collections::{HashMap, HashSet};

use hisaab_shared::AppError;
use hisaab_shared::types::CategoryId;
use thiserror::Error;

/// Errors raised by category tree rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    /// A category was made its own parent.
    #[error("Category {0} cannot be its own parent")]
    SelfParent(CategoryId),

    /// The proposed parent is a descendant of the category.
    #[error("Setting parent {parent} on category {category} would create a cycle")]
    Cycle {
        /// Category being updated.
        category: CategoryId,
        /// Proposed parent.
        parent: CategoryId,
    },

    /// The proposed parent does not exist.
    #[error("Parent category {0} not found")]
    ParentNotFound(CategoryId),

    /// Deletion blocked by child categories or items.
    #[error("Category has {children} child categories and {items} items")]
    InUse {
        /// Number of child categories.
        children: u64,
        /// Number of items in the category.
        items: u64,
    },
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        let message = err.to_string();
        match err {
            CategoryError::ParentNotFound(_) => Self::NotFound(message),
            CategoryError::SelfParent(_) | CategoryError::Cycle { .. } | CategoryError::InUse { .. } => {
                Self::ConstraintViolation(message)
            }
        }
    }
}

/// Checks that `proposed_parent` can become the parent of `category`.
///
/// `parents` maps every existing category to its current parent. The walk
/// up from `proposed_parent` stops at a root or at a chain that already
/// loops, so corrupt data cannot hang it.
///
/// # Errors
///
/// Returns `CategoryError` for self-parenting, an unknown parent, or a cycle.
pub fn validate_parent(
    category: CategoryId,
    proposed_parent: Option<CategoryId>,
    parents: &HashMap<CategoryId, Option<CategoryId>>,
) -> Result<(), CategoryError> {
    let Some(parent) = proposed_parent else {
        return Ok(());
    };
    if parent == category {
        return Err(CategoryError::SelfParent(category));
    }
    if !parents.contains_key(&parent) {
        return Err(CategoryError::ParentNotFound(parent));
    }

    let mut seen = HashSet::new();
    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if current == category {
            return Err(CategoryError::Cycle { category, parent });
        }
        if !seen.insert(current) {
            break;
        }
        cursor = parents.get(&current).copied().flatten();
    }
    Ok(())
}

/// Checks that a category with the given dependants can be deleted.
///
/// # Errors
///
/// Returns `CategoryError::InUse` while either count is non-zero.
pub fn ensure_deletable(children: u64, items: u64) -> Result<(), CategoryError> {
    if children > 0 || items > 0 {
        return Err(CategoryError::InUse { children, items });
    }
    Ok(())
}
