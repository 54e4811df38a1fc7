//! Retail products.

use kora_core::lenient::{f64_or_zero, i64_or_zero};
use kora_core::validate::{non_negative_amount, non_negative_int, optional_text, positive_int, required_text};
use kora_core::{DomainResult, Entity, Flag, ProductoId};
use serde::{Deserialize, Serialize};

/// A product as listed by `GET /productos`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProductoWire")]
pub struct Producto {
    pub id_producto: Option<ProductoId>,
    pub nombre: String,
    pub marca: Option<String>,
    pub precio: f64,
    pub stock: i64,
    pub stock_minimo: i64,
    pub activo: Flag,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The id arrives as `id_producto`, `id` or `producto_id` depending on the
/// endpoint; the first present one wins.
#[derive(Deserialize)]
struct ProductoWire {
    #[serde(default)]
    id_producto: Option<ProductoId>,
    #[serde(default)]
    id: Option<ProductoId>,
    #[serde(default)]
    producto_id: Option<ProductoId>,
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    marca: Option<String>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    precio: f64,
    #[serde(default, deserialize_with = "i64_or_zero")]
    stock: i64,
    #[serde(default, deserialize_with = "i64_or_zero")]
    stock_minimo: i64,
    #[serde(default)]
    activo: Flag,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<ProductoWire> for Producto {
    fn from(w: ProductoWire) -> Self {
        Self {
            id_producto: w.id_producto.or(w.id).or(w.producto_id),
            nombre: w.nombre,
            marca: w.marca,
            precio: w.precio,
            stock: w.stock,
            stock_minimo: w.stock_minimo,
            activo: w.activo,
            extra: w.extra,
        }
    }
}

impl Producto {
    pub fn is_active(&self) -> bool {
        self.activo.is_set()
    }

    /// At or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.stock_minimo
    }
}

impl Entity for Producto {
    type Id = ProductoId;

    fn id(&self) -> Option<ProductoId> {
        self.id_producto
    }
}

/// Raw form input for product create/edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductoForm {
    pub nombre: String,
    pub marca: Option<String>,
    pub precio: f64,
    pub stock: i64,
    pub stock_minimo: i64,
}

/// Body of `POST /productos` and `PUT /productos/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductoPayload {
    pub nombre: String,
    pub marca: Option<String>,
    pub precio: f64,
    pub stock: i64,
    pub stock_minimo: i64,
}

impl ProductoForm {
    pub fn into_payload(self) -> DomainResult<ProductoPayload> {
        Ok(ProductoPayload {
            nombre: required_text("nombre", &self.nombre)?,
            marca: optional_text(self.marca.as_deref()),
            precio: non_negative_amount("precio", self.precio)?,
            stock: non_negative_int("stock", self.stock)?,
            stock_minimo: non_negative_int("stock_minimo", self.stock_minimo)?,
        })
    }
}

/// Body of `PUT /productos/:id/sumar-stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumarStock {
    pub cantidad: i64,
}

impl SumarStock {
    pub fn new(cantidad: i64) -> DomainResult<Self> {
        Ok(Self {
            cantidad: positive_int("cantidad", cantidad)?,
        })
    }
}

/// Case-insensitive search over name and brand, restricted to active (or,
/// with `show_inactive`, only inactive) products, sorted by name.
pub fn search<'a>(items: &'a [Producto], term: &str, show_inactive: bool) -> Vec<&'a Producto> {
    let term = term.trim().to_lowercase();
    let mut found: Vec<&Producto> = items
        .iter()
        .filter(|p| p.is_active() != show_inactive)
        .filter(|p| {
            term.is_empty()
                || p.nombre.to_lowercase().contains(&term)
                || p.marca
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase().contains(&term))
        })
        .collect();
    found.sort_by_key(|p| p.nombre.to_lowercase());
    found
}

/// Active products at or below their minimum stock.
pub fn low_stock(items: &[Producto]) -> Vec<&Producto> {
    items
        .iter()
        .filter(|p| p.is_active() && p.is_low_stock())
        .collect()
}
