//! Read-only catalog listings.

use std::io::Write;

use u1r_admin::CatalogStore;
use u1r_admin::services::ProductList;
use u1r_core::filter::ProductFilter;
use u1r_core::positions::sort_by_position;
use u1r_core::{CategoryId, Mode};

use super::Context;
use crate::render;

pub async fn categories(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let client = ctx.client().await?;
    let categories = client
        .categories(ctx.config.mode)
        .await
        .map_err(|e| ctx.fail(e.during("Unable to load categories")))?;

    tracing::debug!(count = categories.len(), mode = %ctx.config.mode, "Categories loaded");
    write!(std::io::stdout(), "{}", render::categories(&categories))?;
    Ok(())
}

/// List subcategories, optionally only those of one category, by position.
pub async fn subcategories(
    ctx: &Context,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ctx.client().await?;
    let mut subcategories = client
        .subcategories(ctx.config.mode)
        .await
        .map_err(|e| ctx.fail(e.during("Unable to load subcategories")))?;

    if let Some(category) = category.map(CategoryId::new) {
        subcategories.retain(|s| s.belongs_to(&category));
    }
    sort_by_position(&mut subcategories);

    write!(std::io::stdout(), "{}", render::subcategories(&subcategories))?;
    Ok(())
}

pub async fn products(
    ctx: &Context,
    search: Option<String>,
    weight: Option<String>,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mode = ctx.config.mode;
    let list = ProductList::new(ctx.client().await?, mode, ctx.notifier.clone());
    list.refresh().await?;

    if weight.is_some() && mode == Mode::Retail {
        tracing::warn!("Weight filter only applies to the wholesale catalog");
    }
    let filter = ProductFilter { search, weight };
    let mut products = list.filtered(&filter).await;
    if let Some(category) = category.map(CategoryId::new) {
        products.retain(|p| p.belongs_to(&category));
    }

    let mut stdout = std::io::stdout();
    write!(stdout, "{}", render::products(&products, mode, &ctx.config.api_base))?;
    if mode == Mode::Wholesale {
        let weights = list.weight_options().await;
        if !weights.is_empty() {
            writeln!(stdout, "\nweights: {}", weights.join(", "))?;
        }
    }
    Ok(())
}
