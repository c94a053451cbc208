//! # Product Catalog
//!
//! The built-in products that ship with the studio, the [`Category`] taxonomy and
//! the [`Product`] record shared with the storage layer.
//!
//! Built-in products are immutable and use IDs 1 through 40. Their images live
//! under `/assets/`, named after the product.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// Product categories. `All` is a filter sentinel and is never stored on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    All,
    Shirts,
    Pants,
    Shoes,
    Accessories,
    Outerwear,
    Hats,
    Eyewear,
    Models,
}

impl Category {
    /// Lowercase identifier, as persisted.
    pub fn id(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Shirts => "shirts",
            Category::Pants => "pants",
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
            Category::Outerwear => "outerwear",
            Category::Hats => "hats",
            Category::Eyewear => "eyewear",
            Category::Models => "models",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Shirts => "Shirts",
            Category::Pants => "Pants",
            Category::Shoes => "Shoes",
            Category::Accessories => "Accessories",
            Category::Outerwear => "Outerwear",
            Category::Hats => "Hats",
            Category::Eyewear => "Eyewear",
            Category::Models => "Models",
        }
    }

    /// Whether a product may carry this category.
    pub fn is_storable(self) -> bool {
        self != Category::All
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_CATEGORIES
            .iter()
            .copied()
            .find(|c| c.id() == wanted)
            .ok_or_else(|| StudioError::validation("category", "unknown category", s))
    }
}

const ALL_CATEGORIES: [Category; 9] = [
    Category::All,
    Category::Shirts,
    Category::Pants,
    Category::Shoes,
    Category::Accessories,
    Category::Outerwear,
    Category::Hats,
    Category::Eyewear,
    Category::Models,
];

/// Categories offered in the filter bar, in display order.
pub const CATEGORIES: [Category; 7] = [
    Category::All,
    Category::Shirts,
    Category::Pants,
    Category::Shoes,
    Category::Outerwear,
    Category::Hats,
    Category::Eyewear,
];

/// A catalog entry. `image_src` is either an asset path or a base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: Category,
    /// Display-formatted, never parsed.
    pub price: String,
    pub image_src: String,
}

impl Product {
    /// True when the image is embedded rather than referenced by path.
    pub fn has_embedded_image(&self) -> bool {
        self.image_src.starts_with("data:")
    }
}

/// Highest ID among `products`, or 0 for an empty slice.
pub fn max_id<'a>(products: impl IntoIterator<Item = &'a Product>) -> u32 {
    products.into_iter().map(|p| p.id).max().unwrap_or(0)
}

/// The immutable built-in catalog.
pub fn builtin_products() -> &'static [Product] {
    &BUILTIN_PRODUCTS
}

/// Look up a built-in product by ID.
pub fn builtin_by_id(id: u32) -> Option<&'static Product> {
    BUILTIN_PRODUCTS.iter().find(|p| p.id == id)
}

static BUILTIN_PRODUCTS: LazyLock<Vec<Product>> = LazyLock::new(|| {
    BUILTIN_ROWS
        .iter()
        .map(|&(id, name, category, price)| Product {
            id,
            name: name.to_string(),
            category,
            price: price.to_string(),
            image_src: format!("/assets/{}.jpg", name),
        })
        .collect()
});

const BUILTIN_ROWS: &[(u32, &str, Category, &str)] = &[
    (1, "Classic gray jacket", Category::Outerwear, "$69.99"),
    (2, "Lee 101 Storm Rider Lined Denim Jacket - Classic Fit", Category::Outerwear, "$119.99"),
    (3, "Chic Black Faux Leather Biker Jacket", Category::Outerwear, "$149.99"),
    (4, "Olive jacket for winter", Category::Outerwear, "$129.99"),
    (5, "Chic Nude Cat-Eye Sunglasses", Category::Eyewear, "$89.99"),
    (6, "Classic Browline Sunglasses | Gradient UV Lenses", Category::Eyewear, "$99.99"),
    (7, "Classic Mirrored Clubmaster Sunglasses | UV Protection", Category::Eyewear, "$109.99"),
    (8, "Iconic Ray-Ban Wayfarer P Polarized Sunglasses", Category::Eyewear, "$159.99"),
    (9, "Ray-Ban Aviator Classic Gold Frame Gradient", Category::Eyewear, "$149.99"),
    (10, "Modern Black Frame Round Eyeglasses", Category::Eyewear, "$79.99"),
    (11, "Minimalist Desk Setup: Apple Keyboard, Mouse & Ray-Bans", Category::Eyewear, "$49.99"),
    (12, "Classic White Flat Brim Cap - Blank & Customizable", Category::Hats, "$24.99"),
    (13, "Dope Embroidered Blue Snapback Cap | Urban Style Headwear", Category::Hats, "$29.99"),
    (14, "Gray Stylish Cap", Category::Hats, "$21.99"),
    (15, "Olive hat with black streep", Category::Hats, "$22.99"),
    (16, "Plain white cap", Category::Hats, "$19.99"),
    (17, "RVCA Grey Logo Trucker Cap - Adjustable Mesh Snapback", Category::Hats, "$27.99"),
    (18, "Rust Mountain Landscape Cap", Category::Hats, "$25.99"),
    (19, "Vintage black cap", Category::Hats, "$23.99"),
    (20, "Classic Nike Air Force 1 Low Black White Sneakers", Category::Shoes, "$129.99"),
    (21, "Dynamic Multi-Color Chunky Sneakers | Bold Fashion Footwear", Category::Shoes, "$139.99"),
    (22, "Light green Shoe", Category::Shoes, "$89.99"),
    (23, "New Balance 247 Olive Green REVlite Lifestyle Sneaker", Category::Shoes, "$149.99"),
    (24, "Pink white sneakers", Category::Shoes, "$99.99"),
    (25, "Sleek Black Performance Trainer | Dynamic Comfort & Support", Category::Shoes, "$119.99"),
    (26, "The Puma sneakers", Category::Shoes, "$159.99"),
    (27, "Vibrant Orange Converse Chuck 70 High-Top Sneaker", Category::Shoes, "$139.99"),
    (28, "Light Yellow Tshirt", Category::Shirts, "$24.99"),
    (29, "Purple friends forever tshirt", Category::Shirts, "$19.99"),
    (30, "Red cartoon Tshirt", Category::Shirts, "$21.99"),
    (31, "White Bheem Tshirt", Category::Shirts, "$22.99"),
    (32, "Yellow Warrior Tshirt", Category::Shirts, "$21.99"),
    (33, "Formal Jeans", Category::Pants, "$59.99"),
    (34, "Funky blue jeans", Category::Pants, "$49.99"),
    (35, "Gray Jeans", Category::Pants, "$54.99"),
    (36, "Slim Fit Jeans", Category::Pants, "$64.99"),
    (37, "TIght Fit Jeans", Category::Pants, "$64.99"),
    (38, "Yello Funky Jeans", Category::Pants, "$44.99"),
    (39, "Army Mobile pant", Category::Pants, "$39.99"),
    (40, "Black Leather Jacket", Category::Outerwear, "$179.99"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_are_unique_and_sequential() {
        let ids: Vec<u32> = builtin_products().iter().map(|p| p.id).collect();
        assert_eq!(ids, (1..=40).collect::<Vec<_>>());
        assert_eq!(max_id(builtin_products()), 40);
    }

    #[test]
    fn test_builtin_image_paths() {
        let jacket = builtin_by_id(1).unwrap();
        assert_eq!(jacket.image_src, "/assets/Classic gray jacket.jpg");
        assert!(!jacket.has_embedded_image());
        assert!(builtin_products().iter().all(|p| p.category.is_storable()));
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!("Outerwear".parse::<Category>().unwrap(), Category::Outerwear);
        assert_eq!(Category::Eyewear.to_string(), "eyewear");
        assert!("sandals".parse::<Category>().is_err());
        assert!(!Category::All.is_storable());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let p = builtin_by_id(14).unwrap();
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["imageSrc"], "/assets/Gray Stylish Cap.jpg");
        assert_eq!(json["category"], "hats");
    }

    #[test]
    fn test_filter_bar_starts_with_all() {
        assert_eq!(CATEGORIES[0], Category::All);
        assert!(!CATEGORIES.contains(&Category::Models));
    }
}
