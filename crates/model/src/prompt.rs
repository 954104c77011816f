//! Prompt builders for the three generation flows.
//!
//! The model is always instructed to return only the document body; the
//! orchestrator still strips code fences and validates structure, since the
//! instruction is not a guarantee.

use siteforge_core::content::BusinessContent;
use siteforge_core::content_diff::FieldChange;

/// System prompt shared by all three flows.
pub const SYSTEM_PROMPT: &str = "\
You are a website generator. You produce complete, self-contained, \
single-file HTML websites with inline CSS. Respond with only the HTML \
document, beginning with <!DOCTYPE html>. Do not wrap the document in \
Markdown code fences and do not add commentary before or after it.";

/// Build the user prompt for first-time site creation.
pub fn create_site(content: &BusinessContent, hero_image_url: Option<&str>) -> String {
    let mut prompt = String::from(
        "Create a modern, responsive single-page website for the following business.\n\n",
    );
    prompt.push_str(&render_facts(content));
    if let Some(url) = hero_image_url {
        prompt.push_str(&format!("\nUse this image as the hero image: {url}\n"));
    }
    prompt.push_str(
        "\nInclude a hero section, an about section, a services section when \
         services are listed, and a contact section with the details given. \
         Use the brand colors when provided.",
    );
    prompt
}

/// Build the user prompt for a paid free-text edit.
pub fn edit_site(document: &str, request_text: &str) -> String {
    format!(
        "Here is an existing website:\n\n{document}\n\n\
         Apply this change request to it: {request_text}\n\n\
         Keep everything else exactly as it is. Return the full updated document."
    )
}

/// Build the user prompt for a surgical update driven by field changes.
///
/// The change descriptors are the whole instruction: the model must touch
/// only what they name, preserving every manual edit made previously.
pub fn surgical_update(document: &str, changes: &[FieldChange]) -> String {
    let mut prompt = format!(
        "Here is an existing website:\n\n{document}\n\n\
         The business details were updated. Apply exactly these changes:\n"
    );
    for change in changes {
        prompt.push_str(&format!("- {}\n", change.description));
    }
    prompt.push_str(
        "\nMake minimal, targeted edits. Do not redesign or restructure the \
         page, and preserve all styling and content not named above -- \
         including changes made by earlier edit requests. Return the full \
         updated document.",
    );
    prompt
}

fn render_facts(content: &BusinessContent) -> String {
    let mut facts = format!("Business name: {}\n", content.business_name);
    if let Some(tagline) = &content.tagline {
        facts.push_str(&format!("Tagline: {tagline}\n"));
    }
    facts.push_str(&format!("Description: {}\n", content.description));
    if let Some(industry) = &content.industry {
        facts.push_str(&format!("Industry: {industry}\n"));
    }
    if !content.services.is_empty() {
        facts.push_str(&format!("Services: {}\n", content.services.join(", ")));
    }
    if let Some(color) = &content.primary_color {
        facts.push_str(&format!("Primary brand color: {color}\n"));
    }
    if let Some(color) = &content.secondary_color {
        facts.push_str(&format!("Secondary brand color: {color}\n"));
    }
    if let Some(phone) = &content.phone {
        facts.push_str(&format!("Phone: {phone}\n"));
    }
    if let Some(email) = &content.email {
        facts.push_str(&format!("Email: {email}\n"));
    }
    if let Some(address) = &content.address {
        facts.push_str(&format!("Address: {address}\n"));
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> BusinessContent {
        BusinessContent {
            business_name: "Bluebird Bakery".to_string(),
            tagline: None,
            description: "A neighbourhood bakery.".to_string(),
            industry: None,
            services: vec!["Sourdough".to_string(), "Wedding cakes".to_string()],
            primary_color: Some("#1a6b54".to_string()),
            secondary_color: None,
            phone: Some("555-0100".to_string()),
            email: None,
            address: None,
        }
    }

    #[test]
    fn create_prompt_carries_the_facts() {
        let prompt = create_site(&content(), None);
        assert!(prompt.contains("Bluebird Bakery"));
        assert!(prompt.contains("Sourdough, Wedding cakes"));
        assert!(prompt.contains("#1a6b54"));
        assert!(prompt.contains("555-0100"));
        assert!(!prompt.contains("Tagline:"));
    }

    #[test]
    fn create_prompt_references_hero_image_when_given() {
        let prompt = create_site(&content(), Some("https://cdn.example/hero.png"));
        assert!(prompt.contains("https://cdn.example/hero.png"));
    }

    #[test]
    fn edit_prompt_contains_document_and_request() {
        let prompt = edit_site("<!DOCTYPE html><html></html>", "make the header teal");
        assert!(prompt.contains("<!DOCTYPE html>"));
        assert!(prompt.contains("make the header teal"));
    }

    #[test]
    fn surgical_prompt_lists_every_change_and_demands_preservation() {
        let changes = vec![
            FieldChange {
                field: "phone",
                description: "phone number changed from \"555-0100\" to \"555-0199\"".to_string(),
            },
            FieldChange {
                field: "services",
                description: "services changed from 1 entries (A) to 2 entries (A, B)".to_string(),
            },
        ];
        let prompt = surgical_update("<!DOCTYPE html><html></html>", &changes);
        assert!(prompt.contains("555-0199"));
        assert!(prompt.contains("2 entries"));
        assert!(prompt.contains("minimal, targeted edits"));
        assert!(prompt.contains("earlier edit requests"));
    }

    #[test]
    fn system_prompt_pins_the_output_contract() {
        assert!(SYSTEM_PROMPT.contains("<!DOCTYPE html>"));
        assert!(SYSTEM_PROMPT.contains("code fences"));
    }
}
