/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The table schema an `Assembler` consults to resolve attribute ids and
//! check that two attributes may be compared directly. The core never
//! owns table metadata itself; callers supply an implementation.

/// Where a column's storage lives. `READ_PARTIAL_ATTR_TO_MEM` and the
/// sized program-memory opcodes only ever make sense against main-memory
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    MainMemory,
    Disk,
}

/// A column's underlying SQL-ish type. `Blob`/`Text` columns are never
/// bindable, regardless of how their other attributes line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    Fixed,
    VarChar,
    Bit,
    Blob,
    Text,
}

impl ColumnType {
    fn is_large_object(self) -> bool {
        matches!(self, ColumnType::Blob | ColumnType::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnInfo {
    pub attribute_id: u16,
    pub column_type: ColumnType,
    pub byte_length: u32,
    pub array_size: u32,
    /// Declared bit width for `Bit`-typed columns; meaningless otherwise.
    /// `BRANCH_ATTR_OP_ARG` masks literal bits beyond this width so the
    /// executor can do a plain word-wise compare.
    pub bit_length: u32,
    pub precision: u8,
    pub scale: u8,
    pub charset: u16,
    pub storage: StorageKind,
}

/// Read-only lookup the encoder consults while building `BRANCH_ATTR_*`
/// and attribute I/O instructions. A reference implementation backed by a
/// `HashMap` lives in this crate's tests; production callers wrap their
/// own catalog.
pub trait TableSchema {
    fn column(&self, attribute_id: u16) -> Option<&ColumnInfo>;

    /// Whether `lhs` and `rhs` may appear on either side of
    /// `BRANCH_ATTR_OP_ATTR` — identical type, length, precision, scale,
    /// and character set, and neither a BLOB/TEXT variant.
    fn bindable(&self, lhs: u16, rhs: u16) -> bool {
        match (self.column(lhs), self.column(rhs)) {
            (Some(a), Some(b)) => {
                !a.column_type.is_large_object()
                    && !b.column_type.is_large_object()
                    && a.column_type == b.column_type
                    && a.byte_length == b.byte_length
                    && a.array_size == b.array_size
                    && a.bit_length == b.bit_length
                    && a.precision == b.precision
                    && a.scale == b.scale
                    && a.charset == b.charset
            }
            _ => false,
        }
    }
}

/// A `HashMap`-backed reference schema, exposed for tests — both the
/// unit tests in this crate and downstream integration tests that need a
/// schema without standing up a real catalog.
pub mod test_support {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct MapSchema {
        columns: HashMap<u16, ColumnInfo>,
    }

    impl MapSchema {
        pub fn new() -> Self {
            Self {
                columns: HashMap::new(),
            }
        }

        pub fn with_column(mut self, info: ColumnInfo) -> Self {
            self.columns.insert(info.attribute_id, info);
            self
        }
    }

    impl TableSchema for MapSchema {
        fn column(&self, attribute_id: u16) -> Option<&ColumnInfo> {
            self.columns.get(&attribute_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::MapSchema;
    use super::*;

    fn schema() -> MapSchema {
        MapSchema::new()
            .with_column(ColumnInfo {
                attribute_id: 1,
                byte_length: 4,
                array_size: 1,
                ..Default::default()
            })
            .with_column(ColumnInfo {
                attribute_id: 2,
                byte_length: 4,
                array_size: 1,
                ..Default::default()
            })
            .with_column(ColumnInfo {
                attribute_id: 3,
                byte_length: 8,
                array_size: 1,
                ..Default::default()
            })
            .with_column(ColumnInfo {
                attribute_id: 4,
                byte_length: 4,
                array_size: 1,
                precision: 10,
                ..Default::default()
            })
            .with_column(ColumnInfo {
                attribute_id: 5,
                byte_length: 4,
                array_size: 1,
                column_type: ColumnType::Blob,
                ..Default::default()
            })
            .with_column(ColumnInfo {
                attribute_id: 6,
                byte_length: 4,
                array_size: 1,
                column_type: ColumnType::Blob,
                ..Default::default()
            })
    }

    #[test]
    fn same_shape_columns_are_bindable() {
        assert!(schema().bindable(1, 2));
    }

    #[test]
    fn different_byte_length_is_not_bindable() {
        assert!(!schema().bindable(1, 3));
    }

    #[test]
    fn unknown_attribute_is_not_bindable() {
        assert!(!schema().bindable(1, 99));
    }

    #[test]
    fn differing_precision_is_not_bindable() {
        assert!(!schema().bindable(1, 4));
    }

    #[test]
    fn blob_columns_are_never_bindable_even_to_each_other() {
        assert!(!schema().bindable(5, 6));
    }
}
