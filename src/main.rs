//! Storefront demo console.
//!
//! A thin stand-in for the storefront and admin pages: reads commands from
//! stdin, drives the catalog, cart, currency and admin-gate APIs, and
//! renders mutation events as transient notifications.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use middleclass_store::domain::currency::{self, Currency};
use middleclass_store::storage::keys;
use middleclass_store::{
    AddPolicy, AdminConfig, AdminGate, CartEvent, CartSession, CatalogEvent, CatalogStore,
    Category, FileStorage, Level, NotificationCenter, ProductDraft, ProductSnapshot,
    ProductFilter, SortBy, StoragePort,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = std::env::var("STORE_PATH").unwrap_or_else(|_| "middleclass-store.json".to_string());
    let storage: Arc<dyn StoragePort> = Arc::new(FileStorage::open(&path));

    let mut catalog = CatalogStore::new(Arc::clone(&storage));
    let mut cart = CartSession::open(Arc::clone(&storage), keys::STOREFRONT_CART);
    let gate = AdminGate::new(Arc::clone(&storage), AdminConfig::from_env());
    let mut notifications = NotificationCenter::default();

    tracing::info!(store = %path, "storefront console ready");
    println!("middleclass-store console: 'help' lists commands, 'quit' exits");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = args.split_first() else {
            continue;
        };

        match command {
            "quit" | "exit" => break,
            "help" => print_help(),
            "login" => match rest {
                [email, password, rest @ ..] => {
                    let request = middleclass_store::LoginRequest {
                        email: (*email).to_string(),
                        password: (*password).to_string(),
                        remember_me: rest.first().is_some_and(|r| *r == "remember"),
                    };
                    match gate.login(&request) {
                        Ok(session) => notify(
                            &mut notifications,
                            format!("Login successful! ({})", session.email),
                            Level::Success,
                        ),
                        Err(err) => notify(&mut notifications, err.to_string(), Level::Error),
                    }
                }
                _ => println!("usage: login <email> <password> [remember]"),
            },
            "logout" => {
                gate.logout();
                notify(&mut notifications, "Logged out successfully!", Level::Success);
            }
            "list" => match rest.first().and_then(|c| Category::parse(c)) {
                Some(category) => print_products(&catalog.list(category)),
                None => println!("usage: list <fashion|phones|laptops>"),
            },
            "browse" => {
                let sort = match rest.first().copied() {
                    Some("price-low") => SortBy::PriceLowHigh,
                    Some("price-high") => SortBy::PriceHighLow,
                    Some("newest") => SortBy::Newest,
                    _ => SortBy::Name,
                };
                print_products(&catalog.search(&ProductFilter::default(), sort));
            }
            "add" => {
                if !require_admin(&gate, &mut notifications) {
                    continue;
                }
                match rest {
                    [category, name, price, stock] => match Category::parse(category) {
                        Some(category) => {
                            let mut draft = ProductDraft::new(category, *name);
                            draft.price = (*price).to_string();
                            draft.stock = (*stock).to_string();
                            let product = catalog.save(draft);
                            println!("saved {} ({})", product.name, product.id);
                        }
                        None => println!("unknown category: {category}"),
                    },
                    _ => println!("usage: add <category> <name> <price> <stock>"),
                }
            }
            "delete" => {
                if !require_admin(&gate, &mut notifications) {
                    continue;
                }
                match rest {
                    [category, id] => match Category::parse(category) {
                        Some(category) => catalog.delete(id, category),
                        None => println!("unknown category: {category}"),
                    },
                    _ => println!("usage: delete <category> <id>"),
                }
            }
            "stats" => {
                let stats = catalog.stats();
                for (category, count) in &stats.per_category {
                    println!("{category:>8}: {count}");
                }
                println!("   total: {}", stats.total);
            }
            "cart-add" => match rest {
                [category, id, rest @ ..] => {
                    let policy = match rest.first().copied() {
                        Some("append") => AddPolicy::Append,
                        _ => AddPolicy::Merge,
                    };
                    let product = Category::parse(category)
                        .map(|c| catalog.list(c))
                        .unwrap_or_default()
                        .into_iter()
                        .find(|p| p.id == *id);
                    match product {
                        Some(product) => {
                            let snapshot = ProductSnapshot::capture(&product, Currency::Inr);
                            let summary = cart.add(snapshot, policy);
                            println!(
                                "{} items, total {}",
                                summary.total_quantity,
                                currency::format(summary.total_price, Currency::Inr)
                            );
                        }
                        None => println!("no such product in {category}"),
                    }
                }
                _ => println!("usage: cart-add <category> <id> [merge|append]"),
            },
            "cart" => {
                for line in cart.lines() {
                    println!(
                        "{}  {} × {}  {}",
                        line.id,
                        line.snapshot.name,
                        line.quantity,
                        line.snapshot.price
                    );
                }
                println!(
                    "total: {}",
                    currency::format(cart.total(), Currency::Inr)
                );
            }
            "cart-qty" => match rest {
                [line_id, delta] => match delta.parse::<i64>() {
                    Ok(delta) => cart.set_quantity(line_id, delta),
                    Err(_) => println!("usage: cart-qty <line-id> <delta>"),
                },
                _ => println!("usage: cart-qty <line-id> <delta>"),
            },
            "cart-rm" => match rest {
                [line_id] => cart.remove(line_id),
                _ => println!("usage: cart-rm <line-id>"),
            },
            "convert" => match rest {
                [amount, from, to] => {
                    match (
                        amount.parse::<rust_decimal::Decimal>(),
                        Currency::parse(from),
                        Currency::parse(to),
                    ) {
                        (Ok(amount), Some(from), Some(to)) => {
                            let converted = currency::convert(amount, from, to);
                            println!(
                                "{} {} = {}",
                                amount,
                                from,
                                currency::format(converted, to)
                            );
                        }
                        _ => println!("usage: convert <amount> <INR|USD|EUR|GBP|JPY> <code>"),
                    }
                }
                _ => println!("usage: convert <amount> <from> <to>"),
            },
            other => println!("unknown command: {other} (try 'help')"),
        }

        drain_events(&mut catalog, &mut cart, &mut notifications);
        flush_notifications(&mut notifications);
    }

    Ok(())
}

fn print_help() {
    println!("  login <email> <password> [remember]");
    println!("  logout");
    println!("  list <fashion|phones|laptops>");
    println!("  browse [name|price-low|price-high|newest]");
    println!("  add <category> <name> <price> <stock>      (admin)");
    println!("  delete <category> <id>                     (admin)");
    println!("  stats");
    println!("  cart-add <category> <id> [merge|append]");
    println!("  cart | cart-qty <line-id> <delta> | cart-rm <line-id>");
    println!("  convert <amount> <from> <to>");
    println!("  quit");
}

fn print_products(products: &[middleclass_store::Product]) {
    for product in products {
        println!(
            "{}  {:<28} {:>12}  {}  {}",
            product.id,
            product.name,
            currency::format(product.price, Currency::Inr),
            product.stock_label(),
            product.attrs.spec_summary().unwrap_or_default()
        );
    }
    println!("({} products)", products.len());
}

fn require_admin(gate: &AdminGate, notifications: &mut NotificationCenter) -> bool {
    if gate.is_authenticated() {
        return true;
    }
    notify(
        notifications,
        "Access Denied! Please log in first.",
        Level::Error,
    );
    flush_notifications(notifications);
    false
}

fn drain_events(
    catalog: &mut CatalogStore,
    cart: &mut CartSession,
    notifications: &mut NotificationCenter,
) {
    for event in catalog.take_events() {
        let message = match event {
            CatalogEvent::Saved { name, .. } => format!("{name} saved successfully!"),
            CatalogEvent::Deleted { .. } => "Product deleted successfully!".to_string(),
        };
        notify(notifications, message, Level::Success);
    }
    for event in cart.take_events() {
        match event {
            CartEvent::ItemAdded { name, .. } => {
                notify(notifications, format!("{name} added to cart!"), Level::Success)
            }
            CartEvent::QuantityChanged { .. } => {
                notify(notifications, "Cart updated!", Level::Success)
            }
            CartEvent::ItemRemoved { .. } => {
                notify(notifications, "Item removed from cart", Level::Info)
            }
            CartEvent::Cleared => notify(notifications, "Cart cleared", Level::Info),
        }
    }
}

fn notify(notifications: &mut NotificationCenter, message: impl Into<String>, level: Level) {
    notifications.push(message, level, Utc::now());
}

/// The console has no timer loop, so notifications print immediately and
/// are then treated as dismissed.
fn flush_notifications(notifications: &mut NotificationCenter) {
    let far_future = Utc::now() + chrono::Duration::days(1);
    for note in notifications.sweep(far_future) {
        println!("[{:?}] {}", note.level, note.message);
    }
}
