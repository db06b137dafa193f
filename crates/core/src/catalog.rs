use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// One catalog entry. The `id` is assigned during ingestion and is unique
/// within the catalog it was ingested into.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    name: String,
    brand: String,
    category: String,
    description: String,
    #[serde(default)]
    image: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<RawProduct>,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Parse a `{ "products": [...] }` document and assign ids.
    ///
    /// Ids are slugs of the product name; when two names normalize to the
    /// same slug the later entries get a `-2`, `-3`, ... suffix so every id
    /// in the ingested catalog is unique.
    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(data)?;
        let mut products: Vec<Product> = Vec::with_capacity(file.products.len());
        for raw in file.products {
            let base = slug(&raw.name);
            let mut id = base.clone();
            let mut n = 1usize;
            while products.iter().any(|p| p.id == id) {
                n += 1;
                id = format!("{}-{}", base, n);
            }
            products.push(Product {
                id,
                name: raw.name,
                brand: raw.brand,
                category: raw.category,
                description: raw.description,
                image: raw.image,
            });
        }
        debug!(target: "core::catalog", "ingested {} products", products.len());
        Ok(Self { products })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Distinct categories, sorted, for the category picker.
    pub fn categories(&self) -> Vec<String> {
        let mut cats: Vec<String> = Vec::new();
        for p in &self.products {
            if !cats.iter().any(|c| c == &p.category) {
                cats.push(p.category.clone());
            }
        }
        cats.sort();
        cats
    }
}

/// Lowercase the name and collapse runs of non-alphanumerics to one hyphen.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            for lc in ch.to_lowercase() {
                out.push(lc);
            }
        } else {
            pending_sep = true;
        }
    }
    out
}
