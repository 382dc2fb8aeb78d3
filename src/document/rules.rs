//! Per-category capture rules.
//!
//! Every category is walked the same way; the table decides which assets in
//! it are worth capturing.

use crate::document::types::{Asset, AssetCategory, ImageKind};

/// Inclusion and exclusion predicates for one asset category.
#[derive(Clone, Copy)]
pub struct CategoryRule {
    pub category: AssetCategory,
    /// Asset must satisfy this to be captured.
    pub include: fn(&Asset) -> bool,
    /// Asset is dropped if this holds.
    pub exclude: fn(&Asset) -> bool,
}

impl CategoryRule {
    pub fn admits(&self, asset: &Asset) -> bool {
        (self.include)(asset) && !(self.exclude)(asset)
    }
}

impl std::fmt::Debug for CategoryRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryRule")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// The rules applied to every document.
pub const CATEGORY_RULES: [CategoryRule; 4] = [
    CategoryRule {
        category: AssetCategory::Font,
        include: any,
        exclude: Asset::is_builtin,
    },
    CategoryRule {
        category: AssetCategory::Image,
        include: file_backed_image,
        exclude: none,
    },
    CategoryRule {
        category: AssetCategory::Library,
        include: any,
        exclude: none,
    },
    CategoryRule {
        category: AssetCategory::Sound,
        include: any,
        exclude: none,
    },
];

fn any(_: &Asset) -> bool {
    true
}

fn none(_: &Asset) -> bool {
    false
}

fn file_backed_image(asset: &Asset) -> bool {
    asset.image_kind.unwrap_or_default() == ImageKind::Image
}
