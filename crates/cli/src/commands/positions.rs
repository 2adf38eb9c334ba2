//! Manual ordering of products and subcategories.
//!
//! A move takes the place of the `--over` item inside the same group, the
//! way a drag-and-drop would. Moves across groups are refused.

use std::io::Write;

use u1r_admin::services::{DropOutcome, ProductBoard, SubcategoryBoard};
use u1r_core::positions::DropEvent;
use u1r_core::{CategoryId, ProductId, SubcategoryId};

use super::Context;
use crate::render;

async fn product_board(
    ctx: &Context,
    category: &str,
) -> Result<ProductBoard<u1r_admin::CatalogClient>, Box<dyn std::error::Error>> {
    let board = ProductBoard::new(ctx.client().await?, ctx.config.mode, ctx.notifier.clone());
    board.load().await?;
    board.select_category(&CategoryId::new(category)).await?;
    Ok(board)
}

async fn subcategory_board(
    ctx: &Context,
    category: &str,
) -> Result<SubcategoryBoard<u1r_admin::CatalogClient>, Box<dyn std::error::Error>> {
    let board = SubcategoryBoard::new(ctx.client().await?, ctx.config.mode, ctx.notifier.clone());
    board.load().await?;
    board.select_category(&CategoryId::new(category)).await?;
    Ok(board)
}

pub async fn show_products(ctx: &Context, category: &str) -> Result<(), Box<dyn std::error::Error>> {
    let board = product_board(ctx, category).await?;
    let grouping = board.grouping().await;
    let text = render::grouping(&grouping, |p| format!("{}  {}", p.id, p.name));
    write!(std::io::stdout(), "{text}")?;
    Ok(())
}

pub async fn move_product(
    ctx: &Context,
    category: &str,
    item: &str,
    over: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = product_board(ctx, category).await?;
    let event = DropEvent::new(ProductId::new(item), over.map(ProductId::new));
    let outcome = board.drop_item(&event).await?;
    print_outcome(&outcome)?;

    if matches!(outcome, DropOutcome::Saved { .. }) {
        let grouping = board.grouping().await;
        let text = render::grouping(&grouping, |p| format!("{}  {}", p.id, p.name));
        write!(std::io::stdout(), "\n{text}")?;
    }
    Ok(())
}

pub async fn show_subcategories(
    ctx: &Context,
    category: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = subcategory_board(ctx, category).await?;
    let grouping = board.grouping().await;
    let text = render::grouping(&grouping, |s| format!("{}  {}", s.id, s.name));
    write!(std::io::stdout(), "{text}")?;
    Ok(())
}

pub async fn move_subcategory(
    ctx: &Context,
    category: &str,
    item: &str,
    over: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = subcategory_board(ctx, category).await?;
    let event = DropEvent::new(SubcategoryId::new(item), over.map(SubcategoryId::new));
    let outcome = board.drop_item(&event).await?;
    print_outcome(&outcome)
}

fn print_outcome<Id: std::fmt::Display>(
    outcome: &DropOutcome<Id>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = render::drop_outcome(outcome);
    match outcome {
        DropOutcome::Saved { .. } => write!(std::io::stdout(), "{text}")?,
        _ => {
            tracing::info!("{}", text.trim_end());
            write!(std::io::stderr(), "{text}")?;
        }
    }
    Ok(())
}
