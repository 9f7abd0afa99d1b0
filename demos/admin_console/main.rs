//! Catalog administration console walkthrough
//!
//! This example demonstrates:
//! - Loading the screen configuration (YAML file or built-in default)
//! - Filtering, sorting and selecting products
//! - Confirmation-gated bulk actions with partial results
//! - Exporting a selection
//! - A cancellable analysis progress run
//!
//! Run with `cargo run --example admin_console [config.yaml]`.

use anyhow::Result;
use catalog::prelude::*;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

fn product(
    sku: &str,
    name: &str,
    price: f64,
    fit: &str,
    occasions: &[&str],
    status: ProductStatus,
) -> Product {
    Product::new(sku, name, price)
        .with_sizes(["S", "M", "L", "XL"])
        .with_colors(["#FFFFFF", "#000080"])
        .with_fit(fit)
        .with_occasions(occasions.iter().copied())
        .with_status(status)
}

fn seed() -> Result<InMemoryCollectionStore<Product>> {
    Ok(InMemoryCollectionStore::seeded([
        product("TSH001", "Classic White T-Shirt", 19.99, "regular", &["casual"], ProductStatus::Active),
        product("POL002", "Navy Blue Polo", 29.99, "slim", &["office", "casual"], ProductStatus::Active),
        product("BLZ003", "Charcoal Blazer", 149.0, "tailored", &["formal", "office"], ProductStatus::Active),
        product("JNS004", "Dark Wash Jeans", 59.5, "straight", &["casual"], ProductStatus::Inactive),
        product("DRS005", "Linen Summer Dress", 79.0, "relaxed", &["party", "casual"], ProductStatus::Draft),
    ])?)
}

fn print_visible(title: &str, view: &CatalogView<Product, InMemoryCollectionStore<Product>>) {
    println!("{} ({} shown, sort {})", title, view.visible().len(), view.sort());
    for p in view.visible() {
        let mark = if view.selection().contains(&p.id) { "[x]" } else { "[ ]" };
        println!(
            "   {} {:<12} {:<24} {:>8.2}  {}",
            mark, p.sku, p.name, p.price, p.status
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalog=info")),
        )
        .init();

    println!("Catalog Admin Console");
    println!("=====================\n");

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => CatalogConfig::from_yaml_file(&path)?,
        None => CatalogConfig::default_config(),
    };
    println!("Loaded configuration with {} screens\n", config.collections.len());

    let store = seed()?;
    let mut view = CatalogView::new(store.clone(), config.collection("products")?.clone())?;
    print_visible("All products", &view);

    // Filter and sort
    view.set_filter("occasion", "casual")?;
    view.sort_by("price")?;
    print_visible("Casual, cheapest first", &view);

    // Select everything, then narrow the filter: hidden rows leave the selection
    view.select_all();
    let pruned = view.set_filter("max_price", "40")?;
    println!("Narrowed to max $40, {} row(s) dropped from selection\n", pruned.len());
    print_visible("Casual under $40", &view);

    // Deactivate, with confirmation
    if let Submission::AwaitingConfirmation(pending) =
        view.submit_bulk_action(BulkActionKind::Deactivate)?
    {
        println!("{}\n   {}", pending.prompt.title, pending.prompt.message);
        let outcome = view.confirm_bulk_action()?;
        println!(
            "   -> {} deactivated, {} missing, {} failed\n",
            outcome.succeeded.len(),
            outcome.missing.len(),
            outcome.failed.len()
        );
    }

    // Duplicate the t-shirt twice
    view.clear_filters()?;
    let tshirt = store
        .all()?
        .into_iter()
        .find(|p| p.sku == "TSH001")
        .map(|p| p.id);
    if let Some(id) = tshirt {
        for _ in 0..2 {
            view.toggle_selection(id)?;
            view.submit_bulk_action(BulkActionKind::Duplicate)?;
            let outcome = view.confirm_bulk_action()?;
            for created in &outcome.created {
                if let Some(copy) = store.get(created)? {
                    println!("Duplicated TSH001 as {} ({})", copy.sku, copy.name);
                }
            }
        }
        println!();
    }

    // Delete with a change of heart
    view.set_filter("status", "draft")?;
    view.select_all();
    view.submit_bulk_action(BulkActionKind::Delete)?;
    if let Some(cancelled) = view.cancel_bulk_action() {
        println!(
            "Cancelled '{}' on {} record(s); selection kept: {}\n",
            cancelled.kind,
            cancelled.target_ids.len(),
            view.selection().len()
        );
    }

    // Export the active catalog
    view.clear_filters()?;
    view.set_filter("status", "active")?;
    view.select_all();
    if let Submission::Applied(outcome) = view.submit_bulk_action(BulkActionKind::Export)? {
        if let Some(export) = &outcome.export {
            println!("Exported {} records to {}", export.record_count, export.file_name());
        }
    }

    let summary = ProductSummary::from_records(&store.all()?);
    println!(
        "\nSummary: {} total, {} active, {} inactive, {} draft, average ${:.2}\n",
        summary.total,
        summary.active,
        summary.inactive,
        summary.draft,
        summary.average_price.unwrap_or_default()
    );

    // Style analysis progress
    let sequence = config
        .sequence("style_analysis")
        .cloned()
        .unwrap_or_else(ProgressSequence::style_analysis);
    let handle = ProgressRunner::spawn(sequence)?;
    let mut updates = handle.updates();
    let mut last_step = None;
    while let Some(snapshot) = updates.next().await {
        if snapshot.step_id != last_step {
            println!(
                "   {:>3}%  {}",
                snapshot.progress,
                snapshot.label.as_deref().unwrap_or("")
            );
            last_step = snapshot.step_id.clone();
        }
        if snapshot.phase.is_terminal() {
            break;
        }
    }
    let last = handle.wait().await?;
    println!("Analysis {:?} at {}%", last.phase, last.progress);

    Ok(())
}
