//! Mermaid flowchart output for a [`Schema`].

use crate::model::Schema;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Top down
    #[default]
    TD,
    TB,
    BT,
    LR,
    RL,
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "TD" => Some(Self::TD),
            "TB" => Some(Self::TB),
            "BT" => Some(Self::BT),
            "LR" => Some(Self::LR),
            "RL" => Some(Self::RL),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TD => "TD",
            Self::TB => "TB",
            Self::BT => "BT",
            Self::LR => "LR",
            Self::RL => "RL",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MermaidRenderer {
    direction: Direction,
}

impl MermaidRenderer {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Header line, then per table either its bare name or one
    /// `table --> target` line per foreign table.
    pub fn render(&self, schema: &Schema) -> Vec<String> {
        let mut lines = vec![format!("graph {}", self.direction.as_str())];

        for table in &schema.tables {
            match &table.foreign_tables {
                None => lines.push(format!("{}{}", INDENT, table.name)),
                Some(targets) => {
                    for target in targets {
                        lines.push(format!("{}{} --> {}", INDENT, table.name, target));
                    }
                }
            }
        }

        lines
    }

    pub fn render_to_string(&self, schema: &Schema) -> String {
        self.render(schema).join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    fn schema(tables: Vec<Table>) -> Schema {
        let mut schema = Schema::new();
        for table in tables {
            schema.insert(table);
        }
        schema
    }

    #[test]
    fn test_empty_schema() {
        let lines = MermaidRenderer::default().render(&Schema::new());
        assert_eq!(lines, vec!["graph TD"]);
    }

    #[test]
    fn test_standalone_tables_in_order() {
        let schema = schema(vec![Table::new("users"), Table::new("accounts"), Table::new("posts")]);
        let lines = MermaidRenderer::default().render(&schema);
        assert_eq!(lines, vec!["graph TD", "    users", "    accounts", "    posts"]);
    }

    #[test]
    fn test_edges_replace_standalone_line() {
        let mut posts = Table::new("posts");
        posts.add_foreign_table("users");
        posts.add_foreign_table("categories");
        let schema = schema(vec![Table::new("users"), posts]);

        let out = MermaidRenderer::default().render_to_string(&schema);
        assert_eq!(
            out,
            "graph TD\n    users\n    posts --> users\n    posts --> categories"
        );
        assert!(!out.lines().any(|l| l == "    posts"));
    }

    #[test]
    fn test_duplicate_edges_are_rendered() {
        let mut posts = Table::new("posts");
        posts.add_foreign_table("users");
        posts.add_foreign_table("users");
        let lines = MermaidRenderer::default().render(&schema(vec![posts]));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn test_direction() {
        let lines = MermaidRenderer::new(Direction::LR).render(&Schema::new());
        assert_eq!(lines[0], "graph LR");
        assert_eq!(Direction::from_str("lr"), Some(Direction::LR));
        assert_eq!(Direction::from_str("sideways"), None);
    }
}
