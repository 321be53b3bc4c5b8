//! Output row shapes.
//!
//! A decoded row is delivered in one of three shapes:
//! - array: values by column position,
//! - object: values keyed by column name (the default),
//! - nested: values keyed by table name, then column name.
//!
//! The shape is chosen once per fetch from [`FetchOptions`] and never mixed
//! within one call.

use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::protocol::types::{ColumnMetadata, MysqlValue};

/// Options for the fetch operations.
///
/// # Example
///
/// ```
/// use mysql_result_rs::FetchOptions;
///
/// let options = FetchOptions::default().with_nest_tables(true);
/// assert!(options.nest_tables);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Deliver rows as arrays of values.
    pub as_array: bool,
    /// Deliver rows keyed by table, then column.
    pub nest_tables: bool,
}

impl FetchOptions {
    /// Create options for the default (object) shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether rows are delivered as arrays.
    pub fn with_as_array(mut self, as_array: bool) -> Self {
        self.as_array = as_array;
        self
    }

    /// Set whether rows are nested by table.
    pub fn with_nest_tables(mut self, nest_tables: bool) -> Self {
        self.nest_tables = nest_tables;
        self
    }
}

/// Validated row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    Array,
    Object,
    NestTables,
}

impl RowShape {
    /// Pick the shape for a set of options.
    ///
    /// Array and nested output cannot be combined.
    pub fn from_options(options: &FetchOptions) -> Result<Self> {
        match (options.as_array, options.nest_tables) {
            (true, true) => Err(Error::configuration(
                "You can't mix 'asArray' and 'nestTables' options",
            )),
            (true, false) => Ok(RowShape::Array),
            (false, true) => Ok(RowShape::NestTables),
            (false, false) => Ok(RowShape::Object),
        }
    }
}

/// Insertion-ordered string-keyed map.
///
/// Rows have few columns, so lookups are a linear scan.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap<V = MysqlValue> {
    entries: Vec<(String, V)>,
}

impl<V> Default for FieldMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> FieldMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a mutable value by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert a value. An existing key keeps its position and gets the new
    /// value; the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Get the value for `key`, inserting one built by `make` if absent.
    pub fn get_or_insert_with(&mut self, key: &str, make: impl FnOnce() -> V) -> &mut V {
        let idx = match self.entries.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Index<&str> for FieldMap<V> {
    type Output = V;

    fn index(&self, key: &str) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no field named {:?}", key),
        }
    }
}

impl<V> IntoIterator for FieldMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// One delivered row.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapedRow {
    /// Values by column position.
    Array(Vec<MysqlValue>),
    /// Values by column name.
    Object(FieldMap),
    /// Values by table name, then column name.
    Nested(FieldMap<FieldMap>),
}

impl ShapedRow {
    /// Values by position, if the row is an array.
    pub fn as_array(&self) -> Option<&[MysqlValue]> {
        match self {
            ShapedRow::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Values by column name, if the row is an object.
    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            ShapedRow::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Values by table and column name, if the row is nested.
    pub fn as_nested(&self) -> Option<&FieldMap<FieldMap>> {
        match self {
            ShapedRow::Nested(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for ShapedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_map(f: &mut fmt::Formatter<'_>, map: &FieldMap) -> fmt::Result {
            write!(f, "{{")?;
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", k, v)?;
            }
            write!(f, "}}")
        }

        match self {
            ShapedRow::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            ShapedRow::Object(map) => write_map(f, map),
            ShapedRow::Nested(tables) => {
                write!(f, "{{")?;
                for (i, (table, map)) in tables.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", table)?;
                    write_map(f, map)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Assemble decoded values into one row of the given shape.
///
/// `values[j]` belongs to `columns[j]`.
pub fn shape_row(
    columns: &[ColumnMetadata],
    values: Vec<MysqlValue>,
    shape: RowShape,
) -> ShapedRow {
    match shape {
        RowShape::Array => ShapedRow::Array(values),
        RowShape::Object => {
            let mut map = FieldMap::with_capacity(columns.len());
            for (column, value) in columns.iter().zip(values) {
                map.insert(column.name.as_str(), value);
            }
            ShapedRow::Object(map)
        }
        RowShape::NestTables => {
            let mut tables: FieldMap<FieldMap> = FieldMap::new();
            for (column, value) in columns.iter().zip(values) {
                tables
                    .get_or_insert_with(&column.table, FieldMap::new)
                    .insert(column.name.as_str(), value);
            }
            ShapedRow::Nested(tables)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::FieldType;

    fn columns() -> Vec<ColumnMetadata> {
        vec![
            ColumnMetadata::new("id", FieldType::Long).with_table("t1"),
            ColumnMetadata::new("name", FieldType::VarString).with_table("t1"),
        ]
    }

    fn values() -> Vec<MysqlValue> {
        vec![MysqlValue::Int(1), MysqlValue::String("a".to_string())]
    }

    #[test]
    fn test_from_options() {
        assert_eq!(RowShape::from_options(&FetchOptions::new()).unwrap(), RowShape::Object);
        assert_eq!(
            RowShape::from_options(&FetchOptions::new().with_as_array(true)).unwrap(),
            RowShape::Array
        );
        assert_eq!(
            RowShape::from_options(&FetchOptions::new().with_nest_tables(true)).unwrap(),
            RowShape::NestTables
        );

        let both = FetchOptions::new().with_as_array(true).with_nest_tables(true);
        assert!(matches!(
            RowShape::from_options(&both),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_array_shape() {
        let row = shape_row(&columns(), values(), RowShape::Array);
        assert_eq!(row, ShapedRow::Array(values()));
    }

    #[test]
    fn test_object_shape() {
        let row = shape_row(&columns(), values(), RowShape::Object);
        let map = row.as_object().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(map["id"], MysqlValue::Int(1));
        assert_eq!(map["name"], MysqlValue::String("a".to_string()));
    }

    #[test]
    fn test_object_duplicate_name_overwrites() {
        let columns = vec![
            ColumnMetadata::new("id", FieldType::Long).with_table("a"),
            ColumnMetadata::new("x", FieldType::Long).with_table("a"),
            ColumnMetadata::new("id", FieldType::Long).with_table("b"),
        ];
        let values = vec![MysqlValue::Int(1), MysqlValue::Int(2), MysqlValue::Int(3)];
        let row = shape_row(&columns, values, RowShape::Object);
        let map = row.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "x"]);
        assert_eq!(map["id"], MysqlValue::Int(3));
    }

    #[test]
    fn test_nested_shape_merges_tables() {
        let columns = vec![
            ColumnMetadata::new("id", FieldType::Long).with_table("t1"),
            ColumnMetadata::new("id", FieldType::Long).with_table("t2"),
            ColumnMetadata::new("name", FieldType::VarString).with_table("t1"),
        ];
        let values = vec![
            MysqlValue::Int(1),
            MysqlValue::Int(2),
            MysqlValue::String("a".to_string()),
        ];
        let row = shape_row(&columns, values, RowShape::NestTables);
        let tables = row.as_nested().unwrap();
        assert_eq!(tables.keys().collect::<Vec<_>>(), vec!["t1", "t2"]);
        assert_eq!(tables["t1"]["id"], MysqlValue::Int(1));
        assert_eq!(tables["t1"]["name"], MysqlValue::String("a".to_string()));
        assert_eq!(tables["t2"]["id"], MysqlValue::Int(2));
    }

    #[test]
    fn test_display() {
        let row = shape_row(&columns(), values(), RowShape::NestTables);
        assert_eq!(row.to_string(), "{t1: {id: 1, name: a}}");
    }
}
