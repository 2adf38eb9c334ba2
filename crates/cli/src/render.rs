//! Plain-text rendering of catalog data.

use std::fmt::{Display, Write};

use u1r_admin::catalog::assets::resolve_asset_url;
use u1r_admin::services::DropOutcome;
use u1r_core::positions::{Grouping, Positioned};
use u1r_core::{Category, Mode, Product, Subcategory};
use url::Url;

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn categories(categories: &[Category]) -> String {
    let mut out = String::new();
    for category in categories {
        let _ = writeln!(
            out,
            "{:<26} {:<28} subcategories: {}",
            category.id,
            category.name,
            yes_no(category.has_subcategory)
        );
    }
    out
}

pub fn subcategories(subcategories: &[Subcategory]) -> String {
    let mut out = String::new();
    for sub in subcategories {
        let position = sub.position.map_or_else(|| "-".to_string(), |p| p.to_string());
        let _ = writeln!(
            out,
            "{:<26} {:>4}  {:<28} {}",
            sub.id,
            position,
            sub.name,
            sub.category_name.as_deref().unwrap_or_default()
        );
    }
    out
}

pub fn products(products: &[Product], mode: Mode, base: &Url) -> String {
    let mut out = String::new();
    for product in products {
        let stock = if product.is_available() { "in stock" } else { "out of stock" };
        let status = if product.status { "active" } else { "inactive" };
        let _ = write!(
            out,
            "{:<26} {:<32} {:>10}  {:<12} {:<8}",
            product.id,
            product.name,
            product.price.to_string(),
            stock,
            status
        );
        if mode == Mode::Wholesale {
            let _ = write!(
                out,
                "  moq {:<4} {}",
                product.moq,
                product.weight.as_deref().unwrap_or("-")
            );
        } else if let Some(mrp) = &product.mrp {
            let _ = write!(out, "  mrp {mrp}");
        }
        if let Some(image) = product
            .image
            .as_deref()
            .or_else(|| product.images.first().map(String::as_str))
            .and_then(|raw| resolve_asset_url(base, raw))
        {
            let _ = write!(out, "  {image}");
        }
        out.push('\n');
    }
    out
}

/// Groups with their members in display order.
pub fn grouping<T, F>(grouping: &Grouping<T>, label: F) -> String
where
    T: Positioned,
    F: Fn(&T) -> String,
{
    let mut out = String::new();
    for group in grouping.groups() {
        let _ = writeln!(out, "{} ({})", group.key, group.len());
        for item in &group.items {
            let position = item
                .position()
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            let _ = writeln!(out, "  {position:>4}  {}", label(item));
        }
    }
    out
}

pub fn drop_outcome<Id: Display>(outcome: &DropOutcome<Id>) -> String {
    match outcome {
        DropOutcome::Saved { group, updates } => {
            let mut out = format!("Saved {} positions in \"{group}\":\n", updates.len());
            for update in updates {
                let _ = writeln!(out, "  {:>4}  {}", update.position, update.id);
            }
            out
        }
        DropOutcome::Rejected(reason) => format!("Nothing changed: {reason}\n"),
        DropOutcome::Busy => "Nothing changed: another reorder is being saved\n".to_string(),
        DropOutcome::NoCategory => "Nothing changed: no category selected\n".to_string(),
    }
}
