//! Business page: details, owner edits and reviews.

use std::str::FromStr;

use rust_decimal::Decimal;
use sol_city_core::editor::EditorControls;
use sol_city_core::records::{BusinessPatch, MenuItem};
use sol_city_core::types::{BusinessId, Rating};
use sol_city_portal::pages::business::BusinessPage;
use sol_city_portal::{AuthorizationError, PortalError, PortalState};

use crate::commands::parse_id;
use crate::{CliError, output};

/// Fields an owner can change. Omitted flags keep the current value; an
/// empty string clears an optional field.
#[derive(Debug, Default, clap::Args)]
pub struct EditFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub hours: Option<String>,

    /// Comma-separated list, replaces the current services
    #[arg(long, value_delimiter = ',')]
    pub services: Option<Vec<String>>,

    /// Menu entry as `Name=4.50`; repeat to build the menu, replaces the current one
    #[arg(long = "menu-item", value_parser = parse_menu_item)]
    pub menu: Vec<MenuItem>,
}

impl EditFields {
    fn apply(self, patch: &mut BusinessPatch) {
        if let Some(name) = self.name {
            patch.name = name;
        }
        set_optional(&mut patch.description, self.description);
        set_optional(&mut patch.address, self.address);
        set_optional(&mut patch.phone, self.phone);
        set_optional(&mut patch.hours, self.hours);
        if let Some(services) = self.services {
            patch.services = services
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if !self.menu.is_empty() {
            patch.menu.items = self.menu;
        }
    }
}

fn set_optional(field: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        *field = (!value.is_empty()).then(|| value.to_string());
    }
}

fn parse_menu_item(raw: &str) -> Result<MenuItem, String> {
    let (name, price) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=PRICE, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("menu item name is empty".to_string());
    }
    let price = Decimal::from_str(price.trim().trim_start_matches('$'))
        .map_err(|e| format!("invalid price {price:?}: {e}"))?;
    Ok(MenuItem {
        name: name.to_string(),
        price,
    })
}

pub async fn show(state: &PortalState, id: &str) -> Result<(), CliError> {
    let id: BusinessId = parse_id(id, "Business")?;
    let session = state.start_session();
    let viewer = session.ready().await.user_id();
    session.close().await;

    let page = BusinessPage::load(state.records(), id).await?;
    let business = page.business();

    output::heading(&business.name);
    output::field("category", Some(&business.category));
    output::field("about", business.description.as_deref());
    output::field("address", business.address.as_deref());
    output::field("phone", business.phone.as_deref());
    output::field("hours", business.hours.as_deref());
    output::field("owner", business.owner_name.as_deref());
    if !business.services.is_empty() {
        output::field("services", Some(&business.services.join(", ")));
    }
    if !business.menu.is_empty() {
        output::line("   menu:");
        for item in &business.menu.items {
            output::line(format!("     {} {}", item.name, item.display_price()));
        }
    }
    if page.controls(viewer) != EditorControls::Hidden {
        output::line("   (you own this listing: `sol-city business edit` to change it)");
    }

    output::heading(format!(
        "Reviews ({}, average {})",
        page.reviews().len(),
        page.average_label()
    ));
    if page.reviews().is_empty() {
        output::line("No reviews yet.");
    }
    for review in page.reviews() {
        let stars = "*".repeat(usize::from(review.rating.get()));
        let name = review.reviewer_name.as_deref().unwrap_or("Anonymous");
        output::line(format!(
            " {stars:<5}  {name}  {}",
            review.created_at.format("%Y-%m-%d")
        ));
        if let Some(comment) = &review.comment {
            output::line(format!("        {comment}"));
        }
    }
    Ok(())
}

/// Apply `fields` to a business the signed-in user owns.
pub async fn edit(state: &PortalState, id: &str, fields: EditFields) -> Result<(), CliError> {
    let id: BusinessId = parse_id(id, "Business")?;
    let session = state.start_session();
    let viewer = session.ready().await.user_id();
    session.close().await;

    let mut page = BusinessPage::load(state.records(), id).await?;
    if !page.begin_edit(viewer) {
        let refused = if viewer.is_some() {
            AuthorizationError::NotOwner
        } else {
            AuthorizationError::AuthenticationRequired
        };
        return Err(PortalError::from(refused).into());
    }
    if let Some(buffer) = page.buffer_mut(viewer) {
        fields.apply(buffer);
    }
    page.save(viewer).await?;

    output::line(format!("Saved {}.", page.business().name));
    Ok(())
}

pub async fn review(
    state: &PortalState,
    business_id: &str,
    rating: i64,
    comment: Option<String>,
) -> Result<(), CliError> {
    let id: BusinessId = parse_id(business_id, "Business")?;
    let rating = Rating::new(rating).map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    let session = state.start_session();
    let identity = session.ready().await.identity;
    session.close().await;

    let mut page = BusinessPage::load(state.records(), id).await?;
    let form = page.review_form_mut();
    form.open = true;
    form.rating = rating;
    form.comment = comment.unwrap_or_default();

    let completed = page.submit_review(identity.as_ref()).await?;
    output::line(format!("Thanks! Your review of {} was posted.", page.business().name));
    if completed.refresh_error.is_some() {
        output::line("The review list could not be reloaded; run `business show` to see it.");
    } else {
        output::line(format!("Average rating is now {}.", page.average_label()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn patch() -> BusinessPatch {
        BusinessPatch {
            name: "The Grind".to_string(),
            description: Some("Coffee and books".to_string()),
            address: None,
            phone: Some("(555) 000-0000".to_string()),
            hours: None,
            services: vec!["WiFi".to_string()],
            menu: sol_city_core::records::Menu::default(),
        }
    }

    #[test]
    fn test_parse_menu_item() {
        let item = parse_menu_item("Oat Latte=$4.50").unwrap();
        assert_eq!(item.name, "Oat Latte");
        assert_eq!(item.price, Decimal::new(450, 2));

        assert!(parse_menu_item("Latte").is_err());
        assert!(parse_menu_item("=3").is_err());
        assert!(parse_menu_item("Latte=cheap").is_err());
    }

    #[test]
    fn test_omitted_fields_keep_current_values() {
        let mut patch = patch();
        EditFields {
            phone: Some("(555) 472-6311".to_string()),
            ..EditFields::default()
        }
        .apply(&mut patch);

        assert_eq!(patch.phone.as_deref(), Some("(555) 472-6311"));
        assert_eq!(patch.description.as_deref(), Some("Coffee and books"));
        assert_eq!(patch.services, ["WiFi"]);
    }

    #[test]
    fn test_empty_value_clears_optional_field() {
        let mut patch = patch();
        EditFields {
            description: Some("  ".to_string()),
            services: Some(vec!["Books".to_string(), " ".to_string(), " Events ".to_string()]),
            ..EditFields::default()
        }
        .apply(&mut patch);

        assert_eq!(patch.description, None);
        assert_eq!(patch.services, ["Books", "Events"]);
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let result: Result<BusinessId, _> = parse_id("not-a-uuid", "Business");
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
