//! Storefront cart shell - drives the cart context from the command line

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use storefront_cart::persistence::wire::{self, RawLineItem};
use storefront_cart::persistence::{FileStore, HttpCartApi, LocalCartCache, PersistenceAdapter};
use storefront_cart::{CartContext, CartError, ItemId, Money, Notice, StorefrontConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storefront-cart", about = "Manage the storefront cart")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the cart and its totals
    Show,
    /// Add one unit of a product
    Add {
        id: String,
        name: String,
        price: f64,
        #[arg(long)]
        original_price: Option<f64>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Add one unit of an item already in the cart
    Inc { id: String },
    /// Remove one unit (the line disappears at zero)
    Dec { id: String },
    Remove { id: String },
    Clear,
    /// Sign in with a bearer token, merging the anonymous cart
    Login { token: String },
    Logout {
        #[arg(long)]
        preserve_cart: bool,
    },
    /// Toggle a product on the wishlist
    Wishlist { id: String, name: String, price: f64 },
    /// Record a successful checkout and clear the cart
    Checkout { order_number: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = StorefrontConfig::from_env()?;
    let store = FileStore::open(&config.data_dir)?;
    let adapter = PersistenceAdapter::new(LocalCartCache::new(Box::new(store)), HttpCartApi::shared(&config)?);
    let mut ctx = CartContext::new(&config, adapter);
    ctx.init().await;

    match cli.command {
        Command::Show => {}
        Command::Add { id, name, price, original_price, image } => {
            let raw = RawLineItem { id: Some(id), name: Some(name), price: Some(price), original_price, image, ..RawLineItem::default() };
            let Some(item) = wire::normalize_item(raw) else { bail!("invalid item") };
            report(ctx.add(item).await)?;
        }
        Command::Inc { id } => ctx.increment(&ItemId::from(id.as_str())).await,
        Command::Dec { id } => ctx.decrement(&ItemId::from(id.as_str())).await,
        Command::Remove { id } => ctx.remove(&ItemId::from(id.as_str())).await,
        Command::Clear => ctx.clear().await,
        Command::Login { token } => {
            report(ctx.login(token).await)?;
        }
        Command::Logout { preserve_cart } => ctx.logout(preserve_cart),
        Command::Wishlist { id, name, price } => {
            let Some(id) = ItemId::new(id) else { bail!("product id must not be empty") };
            let amount = rust_decimal::Decimal::try_from(price)?;
            let product = storefront_cart::Product::new(id, name, Money::new(amount, &config.currency));
            if report(ctx.toggle_wishlist(&product).await)? == Some(true) {
                println!("added to wishlist");
            }
        }
        Command::Checkout { order_number } => {
            if let Some(confirmation) = report(ctx.checkout_success(order_number).await)? {
                println!("{}", serde_json::to_string_pretty(&confirmation)?);
                return Ok(());
            }
        }
    }

    for notice in ctx.drain_notices() {
        match notice {
            Notice::Info(message) => println!("info: {message}"),
            Notice::Warning(message) => println!("warning: {message}"),
        }
    }
    let snapshot = ctx.snapshot();
    let output = json!({
        "cartId": ctx.cart().id(),
        "updatedAt": ctx.cart().updated_at(),
        "session": ctx.session().user().map(|u| u.id.clone()),
        "syncSource": ctx.sync_source(),
        "items": ctx.items(),
        "wishlist": ctx.wishlist().items(),
        "nextTier": snapshot.next_tier().map(|(units, per_unit)| json!({ "units": units, "perUnit": per_unit })),
        "totals": snapshot,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Auth prompts are not failures for the shell.
fn report<T>(result: Result<T, CartError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CartError::AuthRequired) => {
            println!("Please sign in first: storefront-cart login <token>");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
