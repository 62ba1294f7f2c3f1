use comfy_table::{Cell, Table};
use serde::Serialize;
use serde_json::Value as JsonValue;

use searchnorm::{Conditions, Document, Filter, SortSpec, Value, flatten_document};

use crate::output::{GlobalOptions, TableDisplay, add_table_header, themed_table};
use crate::theme::ICONS;

/// A normalized filter. Serializes as the store-facing filter document.
#[derive(Serialize)]
#[serde(transparent)]
pub struct FilterReport {
    json: JsonValue,
    #[serde(skip)]
    filter: Filter,
}

impl FilterReport {
    pub fn new(filter: Filter) -> Self {
        Self {
            json: filter.to_json(),
            filter,
        }
    }
}

fn add_condition_rows(table: &mut Table, scope: &str, conditions: &Conditions) {
    for (field, predicate) in conditions.iter() {
        table.add_row(vec![
            Cell::new(scope),
            Cell::new(field),
            Cell::new(predicate.to_json().to_string()),
        ]);
    }
    for clause in conditions.all() {
        table.add_row(vec![
            Cell::new(format!("{scope} $and")),
            Cell::new(&clause.field),
            Cell::new(clause.predicate.to_json().to_string()),
        ]);
    }
}

impl TableDisplay for FilterReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, &["Scope", "Field", "Predicate"]);

        if self.filter.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new("(none)"), Cell::new("matches everything")]);
            return table;
        }

        add_condition_rows(&mut table, "all", &self.filter.conditions);
        for (index, branch) in self.filter.branches().iter().enumerate() {
            add_condition_rows(&mut table, &format!("{} {}", ICONS.branch, index + 1), branch);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.json.to_string()
    }
}

/// Normalized sort keys. Serializes as `{"field": 1 | -1}`.
#[derive(Serialize)]
#[serde(transparent)]
pub struct SortReport {
    json: JsonValue,
    #[serde(skip)]
    spec: SortSpec,
}

impl SortReport {
    pub fn new(spec: SortSpec) -> Self {
        Self {
            json: spec.to_json(),
            spec,
        }
    }
}

impl TableDisplay for SortReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, &["#", "Field", "Order"]);
        for (index, (field, order)) in self.spec.iter().enumerate() {
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(field),
                Cell::new(order.as_str()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.spec
            .iter()
            .map(|(field, order)| format!("{field}:{}", order.signum()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// A merged document, shown flattened to dotted keys in table form.
#[derive(Serialize)]
#[serde(transparent)]
pub struct DocumentReport {
    json: JsonValue,
    #[serde(skip)]
    flat: Document,
}

impl DocumentReport {
    pub fn new(value: &Value) -> Self {
        let flat = value.as_object().map(flatten_document).unwrap_or_default();
        Self {
            json: value.to_json(),
            flat,
        }
    }
}

impl TableDisplay for DocumentReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options);
        add_table_header(&mut table, options, &["Key", "Value"]);
        if self.flat.is_empty() {
            table.add_row(vec![Cell::new("(empty)"), Cell::new("")]);
        }
        for (key, value) in &self.flat {
            table.add_row(vec![Cell::new(key), Cell::new(value.to_json().to_string())]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.json.to_string()
    }
}
