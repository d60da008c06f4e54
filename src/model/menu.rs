use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which known payload layout a menu was located in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    BookingFlowV1,
    BookingFlowBare,
    NextData,
}

impl SchemaVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::BookingFlowV1 => "booking_flow_v1",
            SchemaVersion::BookingFlowBare => "booking_flow_bare",
            SchemaVersion::NextData => "next_data",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SalonInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Item {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Category {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MenuDocument {
    pub schema: SchemaVersion,
    pub salon: SalonInfo,
    pub categories: Vec<Category>,
}

impl MenuDocument {
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

/// ITEMS sheet columns, in sheet order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    CategoryNameEn,
    CategoryNameAr,
    CategoryDescEn,
    CategoryDescAr,
    ItemNameEn,
    ItemNameAr,
    ItemDescEn,
    ItemDescAr,
    Price,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::CategoryNameEn,
        Column::CategoryNameAr,
        Column::CategoryDescEn,
        Column::CategoryDescAr,
        Column::ItemNameEn,
        Column::ItemNameAr,
        Column::ItemDescEn,
        Column::ItemDescAr,
        Column::Price,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::CategoryNameEn => "Cat Name (EN)",
            Column::CategoryNameAr => "Cat Name (AR)",
            Column::CategoryDescEn => "Cat Desc (EN)",
            Column::CategoryDescAr => "Cat Desc (AR)",
            Column::ItemNameEn => "Item Name (EN)",
            Column::ItemNameAr => "Item Name (AR)",
            Column::ItemDescEn => "Item Desc (EN)",
            Column::ItemDescAr => "Item Desc (AR)",
            Column::Price => "Price",
        }
    }
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct MenuRow {
    pub cells: [String; 9],
    pub highlights: BTreeSet<Column>,
}

impl MenuRow {
    pub fn cell(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    pub fn is_highlighted(&self, column: Column) -> bool {
        self.highlights.contains(&column)
    }
}
