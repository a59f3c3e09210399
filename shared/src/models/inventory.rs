//! Inventory snapshot models
//!
//! Field names on the wire follow the ERP column names so that snapshot files
//! written by earlier deployments stay readable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quantities are written as JSON numbers. Reading accepts numbers, numeric
/// strings and `null`, which older snapshot files carry for uncommitted stock.
mod quantity {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match value.to_f64() {
            Some(n) => serializer.serialize_f64(n),
            None => serializer.collect_str(value),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        Ok(Option::<Decimal>::deserialize(deserializer)?.unwrap_or_default())
    }
}

mod optional_quantity {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => super::quantity::serialize(n, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Decimal>, D::Error> {
        Option::<Decimal>::deserialize(deserializer)
    }
}

/// Stock of one item in one warehouse at capture time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarehouseStock {
    #[serde(rename = "WhsCode")]
    pub warehouse_code: String,
    #[serde(rename = "WhsName")]
    pub warehouse_name: String,
    #[serde(rename = "OnHand", with = "quantity")]
    pub on_hand: Decimal,
    #[serde(rename = "IsCommited", default, with = "quantity")]
    pub committed: Decimal,
    /// `on_hand - committed`, as computed by the source query
    #[serde(rename = "DisponibleFinal", with = "quantity")]
    pub available: Decimal,
}

/// An inventory item with its per-warehouse stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    #[serde(rename = "ItemCode")]
    pub item_code: String,
    #[serde(rename = "ItemName")]
    pub item_name: String,
    #[serde(rename = "PrecioVenta", default, with = "optional_quantity")]
    pub list_price: Option<Decimal>,
    #[serde(rename = "bodegas", default)]
    pub warehouse_stocks: Vec<WarehouseStock>,
    #[serde(rename = "Transito_Total", default, with = "quantity")]
    pub transit_total: Decimal,
    #[serde(rename = "Transito_Disponible", default, with = "quantity")]
    pub transit_available: Decimal,
}

impl InventoryItem {
    /// Total available units across all warehouses
    pub fn total_available(&self) -> Decimal {
        self.warehouse_stocks.iter().map(|w| w.available).sum()
    }

    /// Total on-hand units across all warehouses
    pub fn total_on_hand(&self) -> Decimal {
        self.warehouse_stocks.iter().map(|w| w.on_hand).sum()
    }
}

/// A complete, immutable, timestamped copy of the inventory dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventorySnapshot {
    /// Items in first-seen order; item codes are unique
    #[serde(rename = "productos")]
    pub items: Vec<InventoryItem>,
    #[serde(rename = "ultimaActualizacion")]
    pub captured_at: DateTime<Utc>,
}

impl InventorySnapshot {
    /// Fold flat item×warehouse rows into nested items, keyed by item code in
    /// first-seen order. Item-level fields are taken from the first row of
    /// each item.
    pub fn from_rows<I>(rows: I, captured_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = InventoryRow>,
    {
        let mut items: Vec<InventoryItem> = Vec::new();
        let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

        for row in rows {
            let stock = WarehouseStock {
                warehouse_code: row.warehouse_code,
                warehouse_name: row.warehouse_name,
                on_hand: row.on_hand,
                committed: row.committed.unwrap_or_default(),
                available: row.available,
            };

            match index.get(&row.item_code) {
                Some(&pos) => items[pos].warehouse_stocks.push(stock),
                None => {
                    index.insert(row.item_code.clone(), items.len());
                    items.push(InventoryItem {
                        item_code: row.item_code,
                        item_name: row.item_name,
                        list_price: row.list_price,
                        warehouse_stocks: vec![stock],
                        transit_total: row.transit_total.unwrap_or_default(),
                        transit_available: row.transit_available.unwrap_or_default(),
                    });
                }
            }
        }

        Self { items, captured_at }
    }

    /// Look up an item by its code
    pub fn item(&self, item_code: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.item_code == item_code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One flat inventory row as returned by the data source (one per item×warehouse)
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub item_code: String,
    pub item_name: String,
    pub list_price: Option<Decimal>,
    pub warehouse_code: String,
    pub warehouse_name: String,
    pub on_hand: Decimal,
    pub committed: Option<Decimal>,
    pub available: Decimal,
    pub transit_total: Option<Decimal>,
    pub transit_available: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(item: &str, whs: &str, on_hand: i64, committed: i64) -> InventoryRow {
        InventoryRow {
            item_code: item.to_string(),
            item_name: format!("Item {}", item),
            list_price: Some(Decimal::from(10)),
            warehouse_code: whs.to_string(),
            warehouse_name: format!("Bodega {}", whs),
            on_hand: Decimal::from(on_hand),
            committed: Some(Decimal::from(committed)),
            available: Decimal::from(on_hand - committed),
            transit_total: None,
            transit_available: Some(Decimal::from(3)),
        }
    }

    #[test]
    fn test_fold_groups_by_item_code_in_first_seen_order() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let rows = vec![
            row("B200", "01", 5, 1),
            row("A100", "01", 7, 0),
            row("B200", "02", 2, 2),
        ];

        let snapshot = InventorySnapshot::from_rows(rows, at);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.items[0].item_code, "B200");
        assert_eq!(snapshot.items[1].item_code, "A100");
        assert_eq!(snapshot.items[0].warehouse_stocks.len(), 2);
        assert_eq!(snapshot.items[0].total_available(), Decimal::from(4));
        assert_eq!(snapshot.items[0].transit_total, Decimal::ZERO);
        assert_eq!(snapshot.items[0].transit_available, Decimal::from(3));
        assert_eq!(snapshot.captured_at, at);
    }

    #[test]
    fn test_snapshot_json_uses_erp_field_names() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let snapshot = InventorySnapshot::from_rows(vec![row("X001", "01", 3, 1)], at);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert!(json.get("productos").is_some());
        assert!(json.get("ultimaActualizacion").is_some());
        let item = &json["productos"][0];
        assert_eq!(item["ItemCode"], "X001");
        assert_eq!(item["bodegas"][0]["WhsCode"], "01");
    }

    #[test]
    fn test_snapshot_accepts_numeric_and_string_quantities() {
        let raw = r#"{
            "productos": [{
                "ItemCode": "X001",
                "ItemName": "Sofa",
                "PrecioVenta": null,
                "bodegas": [{"WhsCode": "01", "WhsName": "Bosque", "OnHand": "4.000000", "IsCommited": 1, "DisponibleFinal": 3}],
                "Transito_Total": 0,
                "Transito_Disponible": "2"
            }],
            "ultimaActualizacion": "2024-05-01T08:00:00.000Z"
        }"#;

        let snapshot: InventorySnapshot = serde_json::from_str(raw).unwrap();
        let item = snapshot.item("X001").unwrap();
        assert_eq!(item.list_price, None);
        assert_eq!(item.warehouse_stocks[0].on_hand, Decimal::from(4));
        assert_eq!(item.transit_available, Decimal::from(2));
    }

    #[test]
    fn test_snapshot_accepts_null_quantities() {
        let raw = r#"{
            "productos": [{
                "ItemCode": "X001",
                "ItemName": "Sofa",
                "PrecioVenta": 199.9,
                "bodegas": [{"WhsCode": "01", "WhsName": "Bosque", "OnHand": 4, "IsCommited": null, "DisponibleFinal": 4}],
                "Transito_Total": null,
                "Transito_Disponible": null
            }],
            "ultimaActualizacion": "2024-05-01T08:00:00.000Z"
        }"#;

        let snapshot: InventorySnapshot = serde_json::from_str(raw).unwrap();
        let item = snapshot.item("X001").unwrap();
        assert_eq!(item.warehouse_stocks[0].committed, Decimal::ZERO);
        assert_eq!(item.transit_total, Decimal::ZERO);
        assert_eq!(item.list_price, Some(Decimal::new(1999, 1)));
    }

    #[test]
    fn test_quantities_are_written_as_numbers() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let snapshot = InventorySnapshot::from_rows(vec![row("X001", "01", 3, 1)], at);
        let json = serde_json::to_value(&snapshot).unwrap();

        let stock = &json["productos"][0]["bodegas"][0];
        assert!(stock["OnHand"].is_number());
        assert_eq!(stock["DisponibleFinal"].as_f64(), Some(2.0));

        let back: InventorySnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
