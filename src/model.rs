/// Tables keyed by name, kept in first-declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    /// Empty when the table carries no `comment:` option.
    pub comment: String,
    pub columns: Vec<Column>,
    /// Referenced tables in directive order; `None` until a foreign key is added.
    pub foreign_tables: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub typ: String,
    pub kind: ColumnKind,
    pub options: Vec<ColumnOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Regular { name: String },
    Index { keys: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnOption {
    pub key: String,
    pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Str(String),
    Ident(String),
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table. A table with the same name is replaced in place.
    pub fn insert(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            columns: Vec::new(),
            foreign_tables: None,
        }
    }

    /// Appends `target` without deduplicating.
    pub fn add_foreign_table(&mut self, target: impl Into<String>) {
        self.foreign_tables
            .get_or_insert_with(Vec::new)
            .push(target.into());
    }
}

impl Column {
    pub fn regular(typ: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            kind: ColumnKind::Regular { name: name.into() },
            options: Vec::new(),
        }
    }

    pub fn index(keys: Vec<String>) -> Self {
        Self {
            typ: "index".to_string(),
            kind: ColumnKind::Index { keys },
            options: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ColumnKind::Regular { name } => Some(name),
            ColumnKind::Index { .. } => None,
        }
    }

    pub fn keys(&self) -> Option<&[String]> {
        match &self.kind {
            ColumnKind::Index { keys } => Some(keys),
            ColumnKind::Regular { .. } => None,
        }
    }

    /// Sets an option; a repeated key overwrites the earlier value.
    pub fn set_option(&mut self, key: impl Into<String>, value: OptionValue) {
        let key = key.into();
        match self.options.iter_mut().find(|o| o.key == key) {
            Some(existing) => existing.value = value,
            None => self.options.push(ColumnOption { key, value }),
        }
    }

    pub fn option(&self, key: &str) -> Option<&OptionValue> {
        self.options.iter().find(|o| o.key == key).map(|o| &o.value)
    }
}

impl OptionValue {
    pub fn as_str(&self) -> &str {
        match self {
            OptionValue::Str(s) | OptionValue::Ident(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut schema = Schema::new();
        schema.insert(Table::new("users"));
        schema.insert(Table::new("posts"));

        let mut users = Table::new("users");
        users.columns.push(Column::regular("string", "email"));
        schema.insert(users);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.tables[0].name, "users");
        assert_eq!(schema.tables[0].columns.len(), 1);
    }

    #[test]
    fn test_foreign_tables_keep_duplicates() {
        let mut table = Table::new("posts");
        assert!(table.foreign_tables.is_none());
        table.add_foreign_table("users");
        table.add_foreign_table("users");
        assert_eq!(table.foreign_tables, Some(vec!["users".into(), "users".into()]));
    }

    #[test]
    fn test_column_kinds() {
        let column = Column::regular("string", "email");
        assert_eq!(column.name(), Some("email"));
        assert!(column.keys().is_none());

        let index = Column::index(vec!["email".into()]);
        assert_eq!(index.typ, "index");
        assert!(index.name().is_none());
        assert_eq!(index.keys(), Some(&["email".to_string()][..]));
    }

    #[test]
    fn test_set_option_overwrites() {
        let mut column = Column::regular("string", "email");
        column.set_option("null", OptionValue::Ident("true".into()));
        column.set_option("null", OptionValue::Ident("false".into()));
        assert_eq!(column.options.len(), 1);
        assert_eq!(column.option("null").map(OptionValue::as_str), Some("false"));
    }
}
