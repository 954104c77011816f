//! Change-driven merge compiler.
//!
//! Compares two [`BusinessContent`] records field by field and compiles the
//! differences into an ordered list of human-readable change descriptors.
//! The surgical-update path hands these descriptors to the content model so
//! it makes minimal, targeted edits instead of regenerating the document;
//! untouched fields and manual styling from prior free-text edits must
//! survive unchanged.
//!
//! Scalars compare by equality; collections compare by serialized form, so
//! a list-level change is reported as one coarse descriptor and finer
//! per-item reasoning is delegated to the model.

use serde::Serialize;

use crate::content::BusinessContent;

/// One field-level difference between two content versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    /// Stable field identifier (snake_case, matches the form schema).
    pub field: &'static str,
    /// Instruction-ready description, e.g. `phone number changed from
    /// "555-0100" to "555-0199"`.
    pub description: String,
}

/// Compare two content versions and compile the ordered change list.
///
/// Returns an empty list when nothing differs; callers treat that as a
/// no-op success and must not invoke the model.
pub fn diff_content(prev: &BusinessContent, next: &BusinessContent) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    scalar_change(
        &mut changes,
        "business_name",
        "business name",
        &prev.business_name,
        &next.business_name,
    );
    optional_change(&mut changes, "tagline", "tagline", &prev.tagline, &next.tagline);
    scalar_change(
        &mut changes,
        "description",
        "business description",
        &prev.description,
        &next.description,
    );
    optional_change(&mut changes, "industry", "industry", &prev.industry, &next.industry);

    // Collections: serialized equality only. Reported as a count-level
    // change; the model decides what moved inside the list.
    if serde_json::to_string(&prev.services).unwrap_or_default()
        != serde_json::to_string(&next.services).unwrap_or_default()
    {
        changes.push(FieldChange {
            field: "services",
            description: format!(
                "services changed from {} entries ({}) to {} entries ({})",
                prev.services.len(),
                prev.services.join(", "),
                next.services.len(),
                next.services.join(", "),
            ),
        });
    }

    optional_change(
        &mut changes,
        "primary_color",
        "primary brand color",
        &prev.primary_color,
        &next.primary_color,
    );
    optional_change(
        &mut changes,
        "secondary_color",
        "secondary brand color",
        &prev.secondary_color,
        &next.secondary_color,
    );
    optional_change(&mut changes, "phone", "phone number", &prev.phone, &next.phone);
    optional_change(&mut changes, "email", "contact email", &prev.email, &next.email);
    optional_change(&mut changes, "address", "address", &prev.address, &next.address);

    changes
}

fn scalar_change(
    changes: &mut Vec<FieldChange>,
    field: &'static str,
    label: &str,
    prev: &str,
    next: &str,
) {
    if prev != next {
        changes.push(FieldChange {
            field,
            description: format!("{label} changed from \"{prev}\" to \"{next}\""),
        });
    }
}

fn optional_change(
    changes: &mut Vec<FieldChange>,
    field: &'static str,
    label: &str,
    prev: &Option<String>,
    next: &Option<String>,
) {
    if prev == next {
        return;
    }
    let description = match (prev, next) {
        (None, Some(new)) => format!("{label} added: \"{new}\""),
        (Some(old), None) => format!("{label} removed (was \"{old}\")"),
        (Some(old), Some(new)) => format!("{label} changed from \"{old}\" to \"{new}\""),
        (None, None) => unreachable!(),
    };
    changes.push(FieldChange { field, description });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_content() -> BusinessContent {
        BusinessContent {
            business_name: "Bluebird Bakery".to_string(),
            tagline: None,
            description: "A neighbourhood bakery.".to_string(),
            industry: None,
            services: vec!["Sourdough".to_string()],
            primary_color: Some("#1a6b54".to_string()),
            secondary_color: None,
            phone: Some("555-0100".to_string()),
            email: None,
            address: None,
        }
    }

    #[test]
    fn identical_content_yields_no_changes() {
        let content = base_content();
        assert!(diff_content(&content, &content).is_empty());
    }

    #[test]
    fn scalar_change_describes_old_and_new() {
        let prev = base_content();
        let mut next = base_content();
        next.phone = Some("555-0199".to_string());

        let changes = diff_content(&prev, &next);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "phone");
        assert!(changes[0].description.contains("555-0100"));
        assert!(changes[0].description.contains("555-0199"));
    }

    #[test]
    fn added_and_removed_optionals() {
        let prev = base_content();
        let mut next = base_content();
        next.tagline = Some("Fresh daily".to_string());
        next.phone = None;

        let changes = diff_content(&prev, &next);
        let fields: Vec<&str> = changes.iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["tagline", "phone"]);
        assert!(changes[0].description.contains("added"));
        assert!(changes[1].description.contains("removed"));
    }

    #[test]
    fn service_list_reports_counts() {
        let prev = base_content();
        let mut next = base_content();
        next.services.push("Wedding cakes".to_string());

        let changes = diff_content(&prev, &next);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "services");
        assert!(changes[0].description.contains("1 entries"));
        assert!(changes[0].description.contains("2 entries"));
        assert!(changes[0].description.contains("Wedding cakes"));
    }

    #[test]
    fn reordered_services_still_count_as_a_change() {
        let mut prev = base_content();
        prev.services = vec!["A".to_string(), "B".to_string()];
        let mut next = base_content();
        next.services = vec!["B".to_string(), "A".to_string()];

        assert_eq!(diff_content(&prev, &next).len(), 1);
    }

    #[test]
    fn changes_follow_form_field_order() {
        let prev = base_content();
        let mut next = base_content();
        next.address = Some("12 Elm Street".to_string());
        next.business_name = "Redbird Bakery".to_string();

        let fields: Vec<&str> = diff_content(&prev, &next).iter().map(|c| c.field).collect();
        assert_eq!(fields, vec!["business_name", "address"]);
    }
}
