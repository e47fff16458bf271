use crate::cart::persist::CartStorage;
use crate::error::AppResult;
use crate::models::Temp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    pub code: String,
    pub label: String,
    pub price_delta_idr: i64,
}

/// One cart line. `key` identifies the (product, size, temp) combination;
/// adding the same combination again merges quantities instead of
/// duplicating the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub key: String,
    pub product_id: String,
    pub name: String,
    pub base_price_idr: i64,
    pub qty: i64,
    pub size: Option<SizeOption>,
    pub temp: Option<Temp>,
    pub unit_price_idr: i64,
    pub line_total_idr: i64,
}

#[derive(Debug, Clone)]
pub struct AddItemInput {
    pub product_id: String,
    pub name: String,
    pub base_price_idr: i64,
    pub qty: i64,
    pub size: Option<SizeOption>,
    pub temp: Option<Temp>,
}

fn make_key(product_id: &str, size_code: Option<&str>, temp: Option<Temp>) -> String {
    let temp = match temp {
        Some(Temp::Hot) => "hot",
        Some(Temp::Ice) => "ice",
        None => "-",
    };
    format!("{}|{}|{}", product_id, size_code.unwrap_or("-"), temp)
}

fn compute_unit(base: i64, delta: i64) -> i64 {
    (base + delta).max(0)
}

/// Client-held cart: an ordered list of lines with derived pricing,
/// persisted through an injected storage adapter after every mutation.
/// Prices computed here are optimistic; the order creator recomputes
/// everything from authoritative data.
pub struct CartStore<S: CartStorage> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    pub fn new(storage: S) -> AppResult<Self> {
        let lines = storage.load()?;
        Ok(Self { lines, storage })
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn add_item(&mut self, input: AddItemInput) -> AppResult<()> {
        let size_code = input.size.as_ref().map(|s| s.code.as_str());
        let key = make_key(&input.product_id, size_code, input.temp);
        let delta = input.size.as_ref().map(|s| s.price_delta_idr).unwrap_or(0);
        let unit = compute_unit(input.base_price_idr, delta);
        let qty = input.qty.max(1);

        if let Some(existing) = self.lines.iter_mut().find(|l| l.key == key) {
            existing.qty += qty;
            existing.unit_price_idr = unit;
            existing.line_total_idr = unit * existing.qty;
        } else {
            // Newest line goes first, matching how the shop UI shows it.
            self.lines.insert(
                0,
                CartLine {
                    key,
                    product_id: input.product_id,
                    name: input.name,
                    base_price_idr: input.base_price_idr,
                    qty,
                    size: input.size,
                    temp: input.temp,
                    unit_price_idr: unit,
                    line_total_idr: unit * qty,
                },
            );
        }

        self.storage.save(&self.lines)
    }

    pub fn set_qty(&mut self, key: &str, qty: i64) -> AppResult<()> {
        let safe_qty = qty.max(1);
        if let Some(line) = self.lines.iter_mut().find(|l| l.key == key) {
            line.qty = safe_qty;
            line.line_total_idr = line.unit_price_idr * safe_qty;
        }
        self.storage.save(&self.lines)
    }

    pub fn remove_item(&mut self, key: &str) -> AppResult<()> {
        self.lines.retain(|l| l.key != key);
        self.storage.save(&self.lines)
    }

    pub fn clear(&mut self) -> AppResult<()> {
        self.lines.clear();
        self.storage.save(&self.lines)
    }

    pub fn subtotal(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_idr).sum()
    }

    pub fn count(&self) -> i64 {
        self.lines.iter().map(|l| l.qty).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::persist::MemoryStorage;

    fn store() -> CartStore<MemoryStorage> {
        CartStore::new(MemoryStorage::new()).unwrap()
    }

    fn latte(qty: i64, size: Option<SizeOption>, temp: Option<Temp>) -> AddItemInput {
        AddItemInput {
            product_id: "p-latte".into(),
            name: "Latte".into(),
            base_price_idr: 25_000,
            qty,
            size,
            temp,
        }
    }

    fn size_l() -> SizeOption {
        SizeOption {
            code: "L".into(),
            label: "Large".into(),
            price_delta_idr: 5_000,
        }
    }

    #[test]
    fn test_add_computes_unit_and_line_total() {
        let mut cart = store();
        cart.add_item(latte(2, Some(size_l()), Some(Temp::Ice))).unwrap();

        let line = &cart.lines()[0];
        assert_eq!(line.unit_price_idr, 30_000);
        assert_eq!(line.line_total_idr, 60_000);
        assert_eq!(cart.subtotal(), 60_000);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_unit_price_floors_at_zero() {
        let mut cart = store();
        let mut input = latte(1, Some(size_l()), None);
        input.base_price_idr = 2_000;
        input.size.as_mut().unwrap().price_delta_idr = -5_000;
        cart.add_item(input).unwrap();

        assert_eq!(cart.lines()[0].unit_price_idr, 0);
        assert_eq!(cart.subtotal(), 0);
    }

    #[test]
    fn test_same_key_merges_quantities() {
        let mut cart = store();
        cart.add_item(latte(1, Some(size_l()), Some(Temp::Hot))).unwrap();
        cart.add_item(latte(2, Some(size_l()), Some(Temp::Hot))).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 3);
        assert_eq!(cart.lines()[0].line_total_idr, 90_000);
    }

    #[test]
    fn test_different_temp_is_a_new_line() {
        let mut cart = store();
        cart.add_item(latte(1, Some(size_l()), Some(Temp::Hot))).unwrap();
        cart.add_item(latte(1, Some(size_l()), Some(Temp::Ice))).unwrap();

        assert_eq!(cart.lines().len(), 2);
        // Newest first.
        assert_eq!(cart.lines()[0].temp, Some(Temp::Ice));
    }

    #[test]
    fn test_set_qty_clamps_to_one() {
        let mut cart = store();
        cart.add_item(latte(3, None, None)).unwrap();
        let key = cart.lines()[0].key.clone();

        cart.set_qty(&key, 0).unwrap();
        assert_eq!(cart.lines()[0].qty, 1);
        assert_eq!(cart.lines()[0].line_total_idr, 25_000);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = store();
        cart.add_item(latte(1, None, None)).unwrap();
        cart.add_item(latte(1, Some(size_l()), None)).unwrap();

        let key = cart.lines()[0].key.clone();
        cart.remove_item(&key).unwrap();
        assert_eq!(cart.lines().len(), 1);

        cart.clear().unwrap();
        assert!(cart.lines().is_empty());
        assert_eq!(cart.subtotal(), 0);
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_subtotal_is_sum_of_line_totals() {
        let mut cart = store();
        cart.add_item(latte(2, None, None)).unwrap();
        cart.add_item(latte(1, Some(size_l()), Some(Temp::Ice))).unwrap();

        let expected: i64 = cart.lines().iter().map(|l| l.line_total_idr).sum();
        assert_eq!(cart.subtotal(), expected);
        assert_eq!(cart.subtotal(), 80_000);
    }

    #[test]
    fn test_persists_through_storage_adapter() {
        let storage = MemoryStorage::new();
        {
            let mut cart = CartStore::new(&storage).unwrap();
            cart.add_item(latte(2, None, None)).unwrap();
        }
        let reloaded = CartStore::new(&storage).unwrap();
        assert_eq!(reloaded.count(), 2);
        assert_eq!(reloaded.subtotal(), 50_000);
    }
}
