//! Plain-text rendering of a resolved schema

use xsd_ir::{Element, Schema, Type};

/// Render types and root elements as an indented listing
pub fn text(schema: &Schema) -> String {
    let mut lines = vec![format!("Types ({}):", schema.types().len())];
    for ty in schema.types().values() {
        lines.push(type_line(ty));
        lines.extend(ty.members().iter().map(|member| format!("    {}", element_line(member))));
    }

    lines.push(format!("Root elements ({}):", schema.root_elements().len()));
    lines.extend(
        schema
            .root_elements()
            .values()
            .map(|element| format!("  {}", element_line(element))),
    );

    lines.join("\n")
}

fn type_line(ty: &Type) -> String {
    let mut line = format!("  {} {}", ty.kind_label(), ty.name());
    if let Some(base) = ty.base_type() {
        line.push_str(&format!(" : {}", base.name()));
    }
    if let Some(location) = ty.location() {
        line.push_str(&format!(" (line {})", location.line));
    }
    line
}

fn element_line(element: &Element) -> String {
    format!(
        "{}: {} [{}..{}]",
        element.name(),
        element.type_name(),
        element.min_occurs(),
        element.max_occurs()
    )
}
