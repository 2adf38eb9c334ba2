//! Single-product changes from the product list.

use std::io::Write;

use u1r_admin::CatalogClient;
use u1r_admin::services::ProductList;
use u1r_core::ProductId;

use super::Context;

async fn loaded_list(ctx: &Context) -> Result<ProductList<CatalogClient>, Box<dyn std::error::Error>> {
    let list = ProductList::new(ctx.client().await?, ctx.config.mode, ctx.notifier.clone());
    list.refresh().await?;
    Ok(list)
}

pub async fn toggle_stock(ctx: &Context, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let list = loaded_list(ctx).await?;
    let id = ProductId::new(id);
    let stock = list.toggle_stock(&id).await?;
    let state = if stock > 0 { "in stock" } else { "out of stock" };
    writeln!(std::io::stdout(), "{id}: {state} (stock {stock})")?;
    Ok(())
}

pub async fn toggle_status(ctx: &Context, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let list = loaded_list(ctx).await?;
    let id = ProductId::new(id);
    let active = list.toggle_status(&id).await?;
    let state = if active { "active" } else { "inactive" };
    writeln!(std::io::stdout(), "{id}: {state}")?;
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let list = loaded_list(ctx).await?;
    let id = ProductId::new(id);
    list.delete(&id).await?;
    writeln!(std::io::stdout(), "{id}: deleted")?;
    Ok(())
}
