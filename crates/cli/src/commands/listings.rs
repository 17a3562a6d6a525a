//! Directory, board and real-estate listings.

use std::path::Path;

use sol_city_core::listing::{DirectoryView, ListingFilter, filter};
use sol_city_core::records::{BoardPost, Business};
use sol_city_portal::PortalState;
use sol_city_portal::pages::directory;

use crate::{CliError, output};

/// Posts shipped with the binary, used when no board file is given.
const BUNDLED_BOARD: &str = include_str!("../../data/board.yaml");

pub async fn directory(state: &PortalState, category: &str, query: &str) -> Result<(), CliError> {
    let records = state.records();
    let businesses = directory::load_businesses(records.as_ref()).await?;
    let view = DirectoryView::build(&businesses, &ListingFilter::new(category, query));

    if view.is_empty() {
        output::empty("businesses");
        return Ok(());
    }
    if !view.featured.is_empty() {
        output::heading("Featured");
        view.featured.iter().for_each(|b| print_business(b));
    }
    if !view.regular.is_empty() {
        output::heading("All businesses");
        view.regular.iter().for_each(|b| print_business(b));
    }
    Ok(())
}

fn print_business(business: &Business) {
    output::line(format!(" * {} [{}]  {}", business.name, business.category, business.id));
    output::field("about", business.description.as_deref());
    output::field("address", business.address.as_deref());
}

pub async fn properties(state: &PortalState, query: &str) -> Result<(), CliError> {
    let records = state.records();
    let properties = directory::load_properties(records.as_ref()).await?;
    let matches = filter(&properties, sol_city_core::listing::ALL, query);

    if matches.is_empty() {
        output::empty("properties");
        return Ok(());
    }
    for property in matches {
        output::line(format!(" * {}  {}", property.title, property.display_price()));
        let address = property.address();
        output::field("address", (!address.is_empty()).then_some(address.as_str()));
        for (feature, value) in &property.interiors.features {
            output::field(feature, Some(&value.to_string()));
        }
        if !property.tags.is_empty() {
            output::field("tags", Some(&property.tags.join(", ")));
        }
    }
    Ok(())
}

/// Board listings come from a local data file or the bundled posts; no
/// backend is involved.
pub async fn board(file: Option<&Path>, category: &str, query: &str) -> Result<(), CliError> {
    let posts = match file {
        Some(path) => directory::load_board(path).await?,
        None => directory::parse_board(BUNDLED_BOARD)?,
    };
    let matches = filter(&posts, category, query);

    if matches.is_empty() {
        output::empty("posts");
        return Ok(());
    }
    let (pinned, regular) = directory::pinned_first(&matches);
    if !pinned.is_empty() {
        output::heading("Pinned");
        pinned.iter().for_each(|p| print_post(p));
    }
    if !regular.is_empty() {
        output::heading("Recent posts");
        regular.iter().for_each(|p| print_post(p));
    }
    Ok(())
}

fn print_post(post: &BoardPost) {
    output::line(format!(" * {} [{}]", post.title, post.category));
    output::line(format!(
        "   by {} {} | {} replies | {} likes",
        post.author, post.posted, post.replies, post.likes
    ));
    output::line(format!("   {}", post.content));
    if !post.tags.is_empty() {
        let tags: Vec<String> = post.tags.iter().map(|t| format!("#{t}")).collect();
        output::line(format!("   {}", tags.join(" ")));
    }
}
