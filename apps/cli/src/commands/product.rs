//! Product catalog commands.

use billbook_core::money::format_money;
use billbook_core::validation::validate_product;
use billbook_core::{Product, ProductType};
use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::{write_json, write_records, Context};
use crate::error::AppResult;

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    /// Add a product
    Add {
        /// Grade label, e.g. "90" or "120 GSM"
        #[arg(long)]
        gsm: String,
        /// sheet (priced per square meter) or bag (priced per piece)
        #[arg(long = "type")]
        product_type: ProductType,
        #[arg(long)]
        price: f64,
    },
    /// List products
    List,
    /// Delete a product (existing invoices keep their copy)
    Delete { id: String },
}

pub async fn run(ctx: &Context, cmd: ProductCommand, out: &mut dyn Write) -> AppResult<()> {
    match cmd {
        ProductCommand::Add {
            gsm,
            product_type,
            price,
        } => {
            let product = Product {
                id: String::new(),
                gsm: gsm.trim().to_string(),
                product_type,
                unit_price: price,
            };
            validate_product(&product)?;

            let saved = ctx.db.products().insert(&product).await?;
            info!(id = %saved.id, product_type = %saved.product_type, "Product added");

            if ctx.json {
                write_json(out, &saved)
            } else {
                writeln!(out, "{}", saved.id)?;
                Ok(())
            }
        }
        ProductCommand::List => {
            let products = ctx.db.products().list().await?;
            write_records(ctx, out, &products, &["ID", "GSM", "TYPE", "PRICE"], |p| {
                vec![
                    p.id.clone(),
                    p.gsm.clone(),
                    p.product_type.to_string(),
                    format_money(p.unit_price),
                ]
            })
        }
        ProductCommand::Delete { id } => {
            ctx.db.products().delete(&id).await?;
            writeln!(out, "Deleted product {}", id)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, output};
    use crate::error::AppError;

    #[tokio::test]
    async fn test_add_and_list() {
        let ctx = context().await;

        let mut buf = Vec::new();
        run(
            &ctx,
            ProductCommand::Add {
                gsm: " 120 ".to_string(),
                product_type: ProductType::Sheet,
                price: 32.5,
            },
            &mut buf,
        )
        .await
        .unwrap();

        let mut buf = Vec::new();
        run(&ctx, ProductCommand::List, &mut buf).await.unwrap();
        let listing = output(buf);
        let row = listing.lines().nth(1).unwrap();
        assert!(row.contains("120"));
        assert!(row.contains("sheet"));
        assert!(row.ends_with("32.50"));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let ctx = context().await;
        let mut buf = Vec::new();
        let result = run(
            &ctx,
            ProductCommand::Add {
                gsm: "80".to_string(),
                product_type: ProductType::Bag,
                price: -1.0,
            },
            &mut buf,
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(ctx.db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_product() {
        let ctx = context().await;
        let mut buf = Vec::new();
        let result = run(
            &ctx,
            ProductCommand::Delete {
                id: "missing".to_string(),
            },
            &mut buf,
        )
        .await;
        assert!(matches!(result, Err(AppError::Db(_))));
    }
}
