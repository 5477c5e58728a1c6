use serde::{Deserialize, Serialize};

use crate::soap::XmlNode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub level: u32,
}

impl Category {
    fn new(category_id: i64, name: &str, parent_id: Option<i64>, level: u32) -> Self {
        Self {
            category_id,
            name: name.to_string(),
            parent_id,
            level,
        }
    }

    /// Top-level categories returned when the category tree cannot be read.
    pub fn placeholders() -> Vec<Category> {
        vec![
            Category::new(12, "Electronics", None, 1),
            Category::new(11, "Books", None, 1),
            Category::new(16, "Clothing", None, 1),
        ]
    }

    /// Flatten a `GetCategoriesResult` tree. Tradera nests sub-categories
    /// inside their parent `<Category>` element.
    pub fn flatten_tree(result: &XmlNode) -> Vec<Category> {
        let mut out = Vec::new();
        for node in result.list("Categories", "Category") {
            Self::collect(node, None, 1, &mut out);
        }
        out
    }

    fn collect(node: &XmlNode, parent_id: Option<i64>, level: u32, out: &mut Vec<Category>) {
        let category_id = node
            .parse_of("Id")
            .or_else(|| node.parse_of("CategoryId"))
            .unwrap_or(0);
        let name = node.text_of("Name").unwrap_or("Unknown");
        out.push(Category::new(category_id, name, parent_id, level));

        for child in node.children_named("Category") {
            Self::collect(child, Some(category_id), level + 1, out);
        }
    }
}

/// One entry of `GetItemFieldValues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: String,
    pub required: bool,
    pub values: Vec<String>,
    pub description: String,
}

impl FieldDefinition {
    fn placeholder(name: &str, field_type: &str, required: bool, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            required,
            values: Vec::new(),
            description: description.to_string(),
        }
    }

    /// The minimal item field table, used when the reply cannot be read.
    pub fn placeholders() -> Vec<FieldDefinition> {
        vec![
            Self::placeholder("Title", "string", true, "Item title"),
            Self::placeholder("Description", "text", false, "Item description"),
            Self::placeholder("StartingPrice", "decimal", true, "Starting price"),
            Self::placeholder("CategoryId", "integer", true, "Category ID"),
        ]
    }

    pub fn from_node(node: &XmlNode) -> Self {
        let values = match node.child("Values") {
            Some(values) => values
                .children
                .iter()
                .map(|v| v.text.clone())
                .filter(|v| !v.is_empty())
                .collect(),
            None => Vec::new(),
        };
        Self {
            name: node.string_of("Name").unwrap_or_else(|| "Unknown".to_string()),
            field_type: node.string_of("Type").unwrap_or_else(|| "Unknown".to_string()),
            required: node.bool_of("Required").unwrap_or(false),
            values,
            description: node.string_of("Description").unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soap::response::parse_document;

    #[test]
    fn test_flatten_nested_categories() {
        let xml = r#"<GetCategoriesResult>
            <Category Id="12" Name="Electronics">
                <Category Id="1201" Name="Phones">
                    <Category Id="120101" Name="Smartphones"/>
                </Category>
            </Category>
            <Category Id="11" Name="Books"/>
        </GetCategoriesResult>"#;
        let node = parse_document(xml).unwrap();
        let categories = Category::flatten_tree(&node);

        assert_eq!(categories.len(), 4);
        assert_eq!(categories[0], Category::new(12, "Electronics", None, 1));
        assert_eq!(categories[1], Category::new(1201, "Phones", Some(12), 2));
        assert_eq!(categories[2], Category::new(120101, "Smartphones", Some(1201), 3));
        assert_eq!(categories[3].name, "Books");
    }

    #[test]
    fn test_placeholder_ids() {
        let ids: Vec<i64> = Category::placeholders().iter().map(|c| c.category_id).collect();
        assert_eq!(ids, vec![12, 11, 16]);
    }

    #[test]
    fn test_field_definition_from_node() {
        let xml = r#"<Field>
            <Name>Condition</Name>
            <Type>enum</Type>
            <Required>true</Required>
            <Values><string>New</string><string>Used</string></Values>
        </Field>"#;
        let field = FieldDefinition::from_node(&parse_document(xml).unwrap());
        assert_eq!(field.name, "Condition");
        assert!(field.required);
        assert_eq!(field.values, vec!["New", "Used"]);
        assert_eq!(field.description, "");
    }
}
